use anyhow::{Context, Result};
use clap::Parser;
use kibitz::cli::{App, Cli, Commands, Config, ConfigCommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load_or_create_default().context("Failed to initialize configuration"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the board
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kibitz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            config,
            engine,
            depth,
            color,
            seed,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(engine) = engine {
                config.engine.path = engine;
            }
            if let Some(depth) = depth {
                config.analysis.target_depth = depth;
                config.analysis.min_depth = config.analysis.min_depth.min(depth);
            }
            if let Some(color) = color {
                config.board.human_color = color;
                config.board.orientation = None;
            }
            if seed.is_some() {
                config.opponent.seed = seed;
            }
            config.validate()?;

            info!("Engine: {}", config.engine.path.display());
            App::new(config).with_json_output(json).run_play().await?;
        }
        Commands::Config { command } => match command {
            ConfigCommand::Path => {
                let path = Config::default_config_file()?;
                println!("{}", path.display());
                if !path.exists() {
                    println!("(not created yet; it is written with defaults on first run)");
                }
            }
            ConfigCommand::Show => {
                let config = load_config(None)?;
                let content = toml::to_string_pretty(&config)
                    .context("Failed to serialize configuration")?;
                println!("{}", content);
            }
        },
    }

    Ok(())
}
