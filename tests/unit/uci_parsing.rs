use kibitz::analysis::{
    parse_uci_line, AnalysisEngine, AnalysisError, EngineMessage, EngineSettings,
    MalformedResult, UciEngine, UciLine, UnavailableEngine, AnalysisRequest,
};
use kibitz::chess::Position;
use std::path::PathBuf;

fn info(line: &str) -> EngineMessage {
    match parse_uci_line(line) {
        Ok(UciLine::Info(message)) => message,
        other => panic!("expected an info message from '{}', got {:?}", line, other),
    }
}

#[cfg(test)]
mod info_line_tests {
    use super::*;

    #[test]
    fn test_full_info_line() {
        let message = info(
            "info depth 18 seldepth 24 multipv 1 score cp 34 nodes 1523412 nps 1200000 time 1270 pv e2e4 e7e5 g1f3",
        );
        assert_eq!(message.depth_reached, Some(18));
        assert_eq!(message.evaluation_centipawns, Some(34));
        assert_eq!(message.mate_in, None);
        assert_eq!(
            message.principal_variation,
            Some(vec!["e2e4".to_string(), "e7e5".to_string(), "g1f3".to_string()])
        );
    }

    #[test]
    fn test_mate_score() {
        let message = info("info depth 22 score mate -3 pv h7h8");
        assert_eq!(message.mate_in, Some(-3));
        assert_eq!(message.evaluation_centipawns, None);
    }

    #[test]
    fn test_partial_messages() {
        let depth_only = info("info depth 5");
        assert_eq!(depth_only.depth_reached, Some(5));
        assert!(depth_only.principal_variation.is_none());

        let score_only = info("info score cp -12");
        assert_eq!(score_only.depth_reached, None);
        assert_eq!(score_only.evaluation_centipawns, Some(-12));
    }

    #[test]
    fn test_lines_without_analysis_are_other() {
        for line in [
            "info currmove e2e4 currmovenumber 1",
            "info hashfull 200 nps 4000",
            "id name Stockfish 16",
            "uciok",
            "readyok",
            "",
        ] {
            assert_eq!(parse_uci_line(line), Ok(UciLine::Other), "line: {}", line);
        }
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_uci_line("info depth x"),
            Err(MalformedResult::InvalidNumber {
                field: "depth",
                value: "x".to_string()
            })
        );
        assert_eq!(
            parse_uci_line("info depth"),
            Err(MalformedResult::MissingValue { field: "depth" })
        );
        assert_eq!(
            parse_uci_line("info depth 10 score wdl 500 400 100"),
            Err(MalformedResult::UnknownScore("wdl".to_string()))
        );
        assert_eq!(
            parse_uci_line("info depth 10 pv"),
            Err(MalformedResult::MissingValue { field: "pv" })
        );
    }
}

#[cfg(test)]
mod bestmove_tests {
    use super::*;

    #[test]
    fn test_bestmove() {
        assert_eq!(
            parse_uci_line("bestmove e2e4 ponder e7e5"),
            Ok(UciLine::BestMove(Some("e2e4".to_string())))
        );
        assert_eq!(
            parse_uci_line("bestmove (none)"),
            Ok(UciLine::BestMove(None))
        );
        assert_eq!(parse_uci_line("bestmove 0000"), Ok(UciLine::BestMove(None)));
    }
}

#[cfg(test)]
mod engine_start_tests {
    use super::*;

    #[test]
    fn test_default_engine_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.path, PathBuf::from("stockfish"));
        assert_eq!(settings.threads, 1);
        assert_eq!(settings.hash_mb, 16);
    }

    #[tokio::test]
    async fn test_missing_engine_fails_to_launch() {
        let settings = EngineSettings {
            path: PathBuf::from("/nonexistent/kibitz-test-engine"),
            ..EngineSettings::default()
        };
        let result = UciEngine::launch(&settings).await;
        assert!(matches!(result, Err(AnalysisError::Spawn { .. })));
    }

    #[test]
    fn test_unavailable_engine_refuses_requests() {
        let mut engine = UnavailableEngine::new("no engine configured");
        let request = AnalysisRequest {
            fingerprint: Position::starting().fingerprint().clone(),
            target_depth: 18,
        };
        match engine.evaluate(&request) {
            Err(AnalysisError::Unavailable(reason)) => assert_eq!(reason, "no engine configured"),
            other => panic!("expected Unavailable, got {:?}", other.map(|_| ())),
        }
    }
}
