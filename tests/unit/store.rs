use crate::common::test_data::{mv, play, position, store, store_at, FOOLS_MATE_SETUP, STALEMATE};
use kibitz::chess::{Color, DrawReason, GameStatus, MoveRejected, Position};

#[cfg(test)]
mod apply_move_tests {
    use super::*;

    #[test]
    fn test_accepted_move_replaces_position_and_records_history() {
        let mut store = store();
        let before = store.current_position().fingerprint().clone();

        let next = store.apply_move(&mv("e2e4")).unwrap().clone();
        assert_eq!(store.current_position(), &next);
        assert_ne!(next.fingerprint(), &before);

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].mv, mv("e2e4"));
        assert_eq!(history[0].before, before);
        assert_eq!(&history[0].after, next.fingerprint());
    }

    #[test]
    fn test_rejected_move_leaves_store_untouched() {
        let mut store = store();
        let result = store.apply_move(&mv("e2e5"));
        assert_eq!(result.unwrap_err(), MoveRejected::Illegal(mv("e2e5")));
        assert_eq!(store.current_position(), &Position::starting());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_moves_rejected_after_game_over() {
        let mut store = store_at(FOOLS_MATE_SETUP);
        play(&mut store, &["d8h4"]);
        assert!(store.status().is_terminal());

        let result = store.apply_move(&mv("e2e4"));
        assert_eq!(result.unwrap_err(), MoveRejected::GameOver);
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn test_subscribers_see_every_accepted_position() {
        let mut store = store();
        let mut positions = store.subscribe();

        play(&mut store, &["d2d4"]);
        assert!(positions.has_changed().unwrap());
        assert_eq!(
            positions.borrow_and_update().side_to_move(),
            Color::Black
        );

        let _ = store.apply_move(&mv("a1a5"));
        assert!(!positions.has_changed().unwrap());
    }

    #[test]
    fn test_reset_restores_initial_position() {
        let mut store = store_at("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        let initial = store.current_position().clone();
        play(&mut store, &["e2e4", "e8d7"]);

        store.reset();
        assert_eq!(store.current_position(), &initial);
        assert!(store.history().is_empty());
    }
}

#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn test_threefold_repetition() {
        let mut store = store();
        assert_eq!(store.repetition_count(), 1);

        play(&mut store, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(store.repetition_count(), 2);
        assert_eq!(store.status(), GameStatus::Ongoing);

        play(&mut store, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert_eq!(store.repetition_count(), 3);
        assert_eq!(
            store.status(),
            GameStatus::Draw(DrawReason::ThreefoldRepetition)
        );
    }

    #[test]
    fn test_stalemate_is_terminal() {
        let store = store_at(STALEMATE);
        assert_eq!(store.status(), GameStatus::Stalemate);
        assert!(store.legal_moves().is_empty());
    }

    #[test]
    fn test_store_answers_for_current_position() {
        let mut store = store();
        assert_eq!(store.legal_moves_from("e7".parse().unwrap()).len(), 0);
        play(&mut store, &["e2e4"]);
        assert_eq!(store.legal_moves_from("e7".parse().unwrap()).len(), 2);
        assert_eq!(
            store.current_position(),
            &position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
        );
    }
}
