use crate::analysis::{AnalysisEngine, AnalysisSettings, EngineSettings, UciEngine, UnavailableEngine};
use crate::chess::{Color, StandardRules};
use crate::cli::display::display_board_view;
use crate::cli::input::{help_text, spawn_line_reader, InputParser, UserCommand};
use crate::game::{ControllerSettings, GameController, GameEvent, PromotionPolicy, RandomMover};
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Opponent timing and randomness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Delay before replying to a click-to-move
    pub click_delay_ms: u64,
    /// Delay before replying to a drag-to-move
    pub drop_delay_ms: u64,
    /// Fixed seed for reproducible games
    pub seed: Option<u64>,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            click_delay_ms: 300,
            drop_delay_ms: 500,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub human_color: Color,
    /// Side shown at the bottom; the human's colour when unset
    pub orientation: Option<Color>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            human_color: Color::White,
            orientation: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineSettings,
    pub analysis: AnalysisSettings,
    pub opponent: OpponentConfig,
    pub board: BoardConfig,
}

impl Config {
    /// Get the default config directory
    pub fn default_config_dir() -> Result<PathBuf> {
        ProjectDirs::from("dev", "kibitz", "kibitz")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    /// Get the default config file path
    pub fn default_config_file() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create_default() -> Result<Self> {
        let config_file = Self::default_config_file()?;

        if config_file.exists() {
            Self::load_from(&config_file)
        } else {
            let config = Config::default();
            config.save_to(&config_file)?;
            Ok(config)
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).context("Failed to parse configuration file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content).context("Failed to write configuration file")?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.target_depth == 0 {
            bail!("analysis.target_depth must be at least 1");
        }
        if self.analysis.min_depth > self.analysis.target_depth {
            bail!(
                "analysis.min_depth ({}) exceeds analysis.target_depth ({})",
                self.analysis.min_depth,
                self.analysis.target_depth
            );
        }
        Ok(())
    }

    pub fn orientation(&self) -> Color {
        self.board.orientation.unwrap_or(self.board.human_color)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            analysis: self.analysis,
            human: self.board.human_color,
            orientation: self.orientation(),
            click_delay: Duration::from_millis(self.opponent.click_delay_ms),
            drop_delay: Duration::from_millis(self.opponent.drop_delay_ms),
            promotion: PromotionPolicy::default(),
        }
    }
}

/// Main application state
pub struct App {
    /// Application configuration
    pub config: Config,
    /// Emit board views as JSON lines for another front end
    pub json_output: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            json_output: false,
        }
    }

    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }

    /// Start the analysis engine, falling back to no analysis if it cannot run
    pub async fn start_engine(&self) -> Box<dyn AnalysisEngine> {
        match UciEngine::launch(&self.config.engine).await {
            Ok(engine) => Box::new(engine),
            Err(e) => {
                warn!("Playing without analysis: {}", e);
                Box::new(UnavailableEngine::new(e.to_string()))
            }
        }
    }

    /// Play a game in the terminal until the user quits or stdin closes
    pub async fn run_play(self) -> Result<()> {
        let engine = self.start_engine().await;
        let strategy = match self.config.opponent.seed {
            Some(seed) => RandomMover::seeded(seed),
            None => RandomMover::new(),
        };
        let controller = GameController::new(
            self.config.controller_settings(),
            Arc::new(StandardRules::new()),
            engine,
            Box::new(strategy),
        );

        let events = controller.sender();
        let mut views = controller.views();
        let game = tokio::spawn(controller.run());

        let json_output = self.json_output;
        let renderer = tokio::spawn(async move {
            while views.changed().await.is_ok() {
                let view = views.borrow_and_update().clone();
                if json_output {
                    match serde_json::to_string(&view) {
                        Ok(line) => println!("{}", line),
                        Err(e) => warn!("Failed to encode board view: {}", e),
                    }
                } else {
                    display_board_view(&view);
                }
            }
        });

        let parser = InputParser::new().context("Failed to build command parser")?;
        if !json_output {
            println!("{}", help_text());
        }
        let mut lines = spawn_line_reader(std::io::stdin());
        loop {
            let line = tokio::select! {
                line = lines.recv() => line.transpose().context("Failed to read from stdin")?,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    None
                }
            };
            let Some(line) = line else {
                break;
            };
            let event = match parser.parse(&line) {
                Ok(UserCommand::Event(event)) => event,
                Ok(UserCommand::Help) => {
                    println!("{}", help_text());
                    continue;
                }
                Ok(UserCommand::Quit) => break,
                Ok(UserCommand::Empty) => continue,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };
            if events.send(event).is_err() {
                break;
            }
        }

        let _ = events.send(GameEvent::Shutdown);
        game.await.context("Game controller task failed")?;
        renderer.abort();
        info!("Goodbye");
        Ok(())
    }
}
