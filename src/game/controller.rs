//! The single mutator of game state.
//!
//! Gestures, opponent timers and analysis updates are all queued and handled one at
//! a time; nothing else touches the store or the selection.

use super::opponent::{MoveSelectionStrategy, OpponentMover};
use super::selection::{PromotionPolicy, SelectionOutcome, SelectionState};
use super::store::PositionStore;
use crate::analysis::{
    AnalysisCoordinator, AnalysisEngine, AnalysisSettings, AnalysisUpdate, DisplayedAnalysis,
    ResultDisposition,
};
use crate::chess::{Color, Fingerprint, Move, RulesEngine, Square};
use crate::presentation::{project, BoardView, ProjectionInput};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    SquareClicked(Square),
    PieceDropped { from: Square, to: Square },
    /// The opponent's deferred move for the position it was scheduled in
    OpponentDue { scheduled_for: Fingerprint },
    NewGame,
    FlipBoard,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    GameOver,
    NotHumanTurn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Gesture(SelectionOutcome),
    GestureIgnored(IgnoreReason),
    OpponentMoved(Move),
    OpponentSkipped,
    Analysis(ResultDisposition),
    NewGame,
    BoardFlipped,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub analysis: AnalysisSettings,
    pub human: Color,
    pub orientation: Color,
    /// Opponent delay after a click-to-move
    pub click_delay: Duration,
    /// Opponent delay after a drag-to-move
    pub drop_delay: Duration,
    pub promotion: PromotionPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            analysis: AnalysisSettings::default(),
            human: Color::White,
            orientation: Color::White,
            click_delay: Duration::from_millis(300),
            drop_delay: Duration::from_millis(500),
            promotion: PromotionPolicy::default(),
        }
    }
}

enum Gesture {
    Click(Square),
    Drop { from: Square, to: Square },
}

pub struct GameController {
    settings: ControllerSettings,
    store: PositionStore,
    selection: SelectionState,
    coordinator: AnalysisCoordinator,
    opponent: OpponentMover,
    orientation: Color,
    events_tx: mpsc::UnboundedSender<GameEvent>,
    events_rx: mpsc::UnboundedReceiver<GameEvent>,
    analysis_rx: mpsc::UnboundedReceiver<AnalysisUpdate>,
    pending_opponent: Option<JoinHandle<()>>,
    views: watch::Sender<BoardView>,
}

impl GameController {
    pub fn new(
        settings: ControllerSettings,
        rules: Arc<dyn RulesEngine>,
        engine: Box<dyn AnalysisEngine>,
        strategy: Box<dyn MoveSelectionStrategy>,
    ) -> Self {
        Self::with_store(settings, PositionStore::new(rules), engine, strategy)
    }

    /// Controller over an existing store, e.g. one set up from FEN
    pub fn with_store(
        settings: ControllerSettings,
        store: PositionStore,
        engine: Box<dyn AnalysisEngine>,
        strategy: Box<dyn MoveSelectionStrategy>,
    ) -> Self {
        let (coordinator, analysis_rx) = AnalysisCoordinator::new(engine, settings.analysis);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let selection = SelectionState::Idle;
        let initial_view = project(&ProjectionInput {
            position: store.current_position(),
            status: store.status(),
            selection: &selection,
            analysis: coordinator.displayed(),
            orientation: settings.orientation,
            human: settings.human,
        });
        let (views, _) = watch::channel(initial_view);

        Self {
            settings,
            store,
            selection,
            coordinator,
            opponent: OpponentMover::new(strategy),
            orientation: settings.orientation,
            events_tx,
            events_rx,
            analysis_rx,
            pending_opponent: None,
            views,
        }
    }

    /// Queue for gestures and commands
    pub fn sender(&self) -> mpsc::UnboundedSender<GameEvent> {
        self.events_tx.clone()
    }

    /// Every view published after an event
    pub fn views(&self) -> watch::Receiver<BoardView> {
        self.views.subscribe()
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn analysis(&self) -> &DisplayedAnalysis {
        self.coordinator.displayed()
    }

    pub fn coordinator(&self) -> &AnalysisCoordinator {
        &self.coordinator
    }

    pub fn has_pending_opponent_move(&self) -> bool {
        self.pending_opponent
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }

    pub fn view(&self) -> BoardView {
        project(&ProjectionInput {
            position: self.store.current_position(),
            status: self.store.status(),
            selection: &self.selection,
            analysis: self.coordinator.displayed(),
            orientation: self.orientation,
            human: self.settings.human,
        })
    }

    /// Analyse the starting position and, if the human plays Black, schedule the
    /// opponent's first move. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        info!("Starting game, human plays {}", self.settings.human);
        self.notify_position_changed();
        self.schedule_opponent(self.settings.click_delay);
        self.publish();
    }

    /// Process events until `Shutdown`
    pub async fn run(mut self) {
        self.start();
        while let Some(outcome) = self.step().await {
            if outcome == EventOutcome::Shutdown {
                break;
            }
        }
        if let Some(pending) = self.pending_opponent.take() {
            pending.abort();
        }
        info!("Game controller stopped");
    }

    /// Wait for the next queued event or analysis update and handle it
    pub async fn step(&mut self) -> Option<EventOutcome> {
        tokio::select! {
            event = self.events_rx.recv() => event.map(|event| self.handle(event)),
            Some(update) = self.analysis_rx.recv() => Some(self.handle_analysis(update)),
        }
    }

    #[instrument(skip(self), level = "debug")]
    pub fn handle(&mut self, event: GameEvent) -> EventOutcome {
        let outcome = match event {
            GameEvent::SquareClicked(square) => self.on_gesture(Gesture::Click(square)),
            GameEvent::PieceDropped { from, to } => self.on_gesture(Gesture::Drop { from, to }),
            GameEvent::OpponentDue { scheduled_for } => self.on_opponent_due(&scheduled_for),
            GameEvent::NewGame => self.on_new_game(),
            GameEvent::FlipBoard => {
                self.orientation = self.orientation.opposite();
                EventOutcome::BoardFlipped
            }
            GameEvent::Shutdown => EventOutcome::Shutdown,
        };
        self.publish();
        outcome
    }

    pub fn handle_analysis(&mut self, update: AnalysisUpdate) -> EventOutcome {
        let disposition = self.coordinator.on_update(update);
        if disposition == ResultDisposition::Accepted {
            self.publish();
        }
        EventOutcome::Analysis(disposition)
    }

    fn on_gesture(&mut self, gesture: Gesture) -> EventOutcome {
        if self.store.status().is_terminal() {
            self.selection.reset();
            return EventOutcome::GestureIgnored(IgnoreReason::GameOver);
        }
        if self.store.current_position().side_to_move() != self.settings.human {
            self.selection.reset();
            return EventOutcome::GestureIgnored(IgnoreReason::NotHumanTurn);
        }

        let policy = self.settings.promotion;
        let (outcome, delay) = match gesture {
            Gesture::Click(square) => (
                self.selection.click(&mut self.store, square, policy),
                self.settings.click_delay,
            ),
            Gesture::Drop { from, to } => (
                self.selection.drop_piece(&mut self.store, from, to, policy),
                self.settings.drop_delay,
            ),
        };

        if let SelectionOutcome::Moved(mv) = &outcome {
            info!("Human played {}", mv);
            self.notify_position_changed();
            self.schedule_opponent(delay);
        }
        EventOutcome::Gesture(outcome)
    }

    fn on_opponent_due(&mut self, scheduled_for: &Fingerprint) -> EventOutcome {
        // The game may have moved on since the timer was set. A newer timer, if
        // any, stays pending.
        let position = self.store.current_position().clone();
        if position.fingerprint() != scheduled_for || position.side_to_move() == self.settings.human
        {
            debug!("Opponent move skipped: position changed");
            return EventOutcome::OpponentSkipped;
        }
        if let Some(pending) = self.pending_opponent.take() {
            pending.abort();
        }

        let status = self.store.status();
        if status.is_terminal() {
            debug!("Opponent move skipped: {}", status);
            return EventOutcome::OpponentSkipped;
        }

        let Some(mv) = self
            .opponent
            .move_for(self.store.rules().as_ref(), &position)
        else {
            return EventOutcome::OpponentSkipped;
        };

        match self.store.apply_move(&mv) {
            Ok(_) => {
                info!("Opponent played {}", mv);
                self.notify_position_changed();
                EventOutcome::OpponentMoved(mv)
            }
            Err(e) => {
                warn!("Opponent move {} rejected: {}", mv, e);
                EventOutcome::OpponentSkipped
            }
        }
    }

    fn on_new_game(&mut self) -> EventOutcome {
        if let Some(pending) = self.pending_opponent.take() {
            pending.abort();
        }
        self.store.reset();
        self.notify_position_changed();
        self.schedule_opponent(self.settings.click_delay);
        EventOutcome::NewGame
    }

    fn notify_position_changed(&mut self) {
        self.selection.reset();
        let status = self.store.status();
        self.coordinator
            .on_position_changed(self.store.current_position(), status);
    }

    /// Defer the opponent's reply, if it is the opponent's turn in a live game
    fn schedule_opponent(&mut self, delay: Duration) {
        let position = self.store.current_position();
        if self.store.status().is_terminal() || position.side_to_move() == self.settings.human {
            return;
        }

        if let Some(pending) = self.pending_opponent.take() {
            pending.abort();
        }
        let scheduled_for = position.fingerprint().clone();
        let events = self.events_tx.clone();
        debug!("Opponent move due in {:?}", delay);
        self.pending_opponent = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(GameEvent::OpponentDue { scheduled_for });
        }));
    }

    fn publish(&self) {
        self.views.send_replace(self.view());
    }
}
