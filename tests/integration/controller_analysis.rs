//! Analysis flowing through the controller into the board view

use crate::common::scripted_engine::{info, info_with_line, ScriptedEngine};
use crate::common::test_data::{rules, sq};
use kibitz::analysis::{
    AnalysisStatus, EngineEvent, EngineMessage, ResultDisposition, UnavailableEngine,
};
use kibitz::chess::{Color, Position};
use kibitz::game::{ControllerSettings, EventOutcome, GameController, GameEvent, RandomMover};
use kibitz::presentation::Arrow;
use std::time::Duration;

fn controller(engine: &ScriptedEngine) -> GameController {
    GameController::new(
        ControllerSettings::default(),
        rules(),
        Box::new(engine.clone()),
        Box::new(RandomMover::seeded(3)),
    )
}

#[cfg(test)]
mod analysis_view_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_start_requests_analysis_of_initial_position() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        assert_eq!(engine.request_count(), 0);

        game.start();
        assert_eq!(engine.request_count(), 1);
        assert_eq!(
            &engine.request(0).fingerprint,
            Position::starting().fingerprint()
        );
        assert_eq!(game.view().evaluation_text, "--");
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_result_updates_view() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        let mut views = game.views();
        game.start();
        views.borrow_and_update();

        engine.send_latest(info_with_line(14, 42, &["e2e4", "e7e5", "g1f3"]));
        let outcome = game.step().await.unwrap();
        assert_eq!(outcome, EventOutcome::Analysis(ResultDisposition::Accepted));

        assert!(views.has_changed().unwrap());
        let view = views.borrow_and_update().clone();
        assert_eq!(view.evaluation_text, "+0.04");
        assert_eq!(view.depth_text, "14");
        assert_eq!(view.best_line, "e2e4 e7e5 g1f3");
        assert_eq!(
            view.arrow,
            Some(Arrow {
                from: sq("e2"),
                to: sq("e4")
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shallow_result_leaves_view_unchanged() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        game.start();
        let before = game.view();

        engine.send_latest(info(5, 250));
        let outcome = game.step().await.unwrap();
        assert_eq!(
            outcome,
            EventOutcome::Analysis(ResultDisposition::BelowMinDepth)
        );
        assert_eq!(game.view(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_black_to_move_score_shown_from_white_side() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        game.start();
        game.handle(GameEvent::PieceDropped {
            from: sq("e2"),
            to: sq("e4"),
        });

        // +50 for Black, who is on move
        engine.send_latest(info(12, 50));
        let outcome = game.step().await.unwrap();
        assert_eq!(outcome, EventOutcome::Analysis(ResultDisposition::Accepted));
        assert_eq!(game.view().evaluation_text, "-0.05");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mate_shown_in_place_of_score() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        game.start();

        engine.send_latest(info(12, 80));
        engine.send_latest(EngineEvent::Info(EngineMessage {
            mate_in: Some(5),
            depth_reached: Some(16),
            ..EngineMessage::default()
        }));
        game.step().await.unwrap();
        game.step().await.unwrap();
        assert_eq!(game.view().evaluation_text, "#5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_for_previous_position_never_shown() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        game.start();
        game.handle(GameEvent::PieceDropped {
            from: sq("e2"),
            to: sq("e4"),
        });
        assert_eq!(engine.request_count(), 2);
        assert!(engine.stop_count() >= 1);

        // Late output of the first search, then the current one
        engine.send(0, info(22, 900));
        engine.send(1, info(12, 30));

        loop {
            match game.step().await.unwrap() {
                EventOutcome::Analysis(ResultDisposition::Accepted) => break,
                EventOutcome::Analysis(disposition) => {
                    assert_eq!(disposition, ResultDisposition::Stale)
                }
                other => panic!("unexpected outcome {:?}", other),
            }
        }
        let view = game.view();
        assert_eq!(view.evaluation_text, "-0.03");
        assert_eq!(view.depth_text, "12");
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_game_survives_late_verdict_for_same_position() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        game.start();

        // The first search finishes, but its verdict is still queued when the
        // starting position is set up again.
        engine.send(0, EngineEvent::BestMove(Some("e2e4".to_string())));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(game.handle(GameEvent::NewGame), EventOutcome::NewGame);
        assert_eq!(engine.request_count(), 2);

        let outcome = game.step().await.unwrap();
        assert_eq!(outcome, EventOutcome::Analysis(ResultDisposition::Stale));
        assert_eq!(game.analysis().status, AnalysisStatus::Pending);

        engine.send(1, info(14, 40));
        let outcome = game.step().await.unwrap();
        assert_eq!(outcome, EventOutcome::Analysis(ResultDisposition::Accepted));
        assert_eq!(game.view().evaluation_text, "+0.04");
        assert_eq!(game.view().depth_text, "14");
    }

    #[tokio::test(start_paused = true)]
    async fn test_analysis_resets_when_position_changes() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        game.start();
        engine.send_latest(info_with_line(14, 20, &["d2d4"]));
        game.step().await.unwrap();
        assert!(game.view().arrow.is_some());

        game.handle(GameEvent::PieceDropped {
            from: sq("e2"),
            to: sq("e4"),
        });
        let view = game.view();
        assert_eq!(view.arrow, None);
        assert_eq!(view.evaluation_text, "--");
        assert_eq!(game.analysis().status, AnalysisStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_death_degrades_but_game_goes_on() {
        let engine = ScriptedEngine::new();
        let mut game = controller(&engine);
        game.start();

        engine.hang_up(0);
        let outcome = game.step().await.unwrap();
        assert_eq!(outcome, EventOutcome::Analysis(ResultDisposition::Accepted));
        assert_eq!(game.analysis().status, AnalysisStatus::Unavailable);
        assert_eq!(game.view().evaluation_text, "n/a");

        let outcome = game.handle(GameEvent::PieceDropped {
            from: sq("e2"),
            to: sq("e4"),
        });
        assert!(matches!(outcome, EventOutcome::Gesture(_)));
        assert_eq!(game.store().history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_without_engine() {
        let mut game = GameController::new(
            ControllerSettings::default(),
            rules(),
            Box::new(UnavailableEngine::new("no engine")),
            Box::new(RandomMover::seeded(9)),
        );
        game.start();
        assert_eq!(game.view().evaluation_text, "n/a");

        game.handle(GameEvent::PieceDropped {
            from: sq("g1"),
            to: sq("f3"),
        });
        let outcome = game.step().await.unwrap();
        assert!(matches!(outcome, EventOutcome::OpponentMoved(_)));
        assert_eq!(game.store().current_position().side_to_move(), Color::White);
        assert_eq!(game.view().evaluation_text, "n/a");
    }
}
