use anyhow::{Context, Result};
use clap::Parser;
use lyricfind::{
    api::HttpTransport,
    config::{Config, ConfigLayer, PRESETS},
    Query, QueryState,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "lyricfind=debug,reqwest=warn";

/// lyricfind - Find song lyrics from the terminal
///
/// Without --artist/--song/--query an interactive form is opened.
#[derive(Parser, Debug)]
#[command(name = "lyricfind", version, about, long_about = None)]
struct Cli {
    /// Artist name; prints the lyrics and exits
    #[arg(short, long)]
    artist: Option<String>,

    /// Song title; prints the lyrics and exits
    #[arg(short, long)]
    song: Option<String>,

    /// Free-text search for endpoints with a {query} placeholder
    #[arg(short, long)]
    query: Option<String>,

    /// Preset name or URL template with {artist}, {song}, {query}, {apikey}
    #[arg(short, long)]
    endpoint: Option<String>,

    /// API key substituted into {apikey}
    #[arg(long)]
    api_key: Option<String>,

    /// Let a new search replace one that is still running
    #[arg(long)]
    supersede: bool,

    /// Config file (defaults to ~/.config/lyricfind/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the built-in endpoint presets
    #[arg(long)]
    list_presets: bool,
}

impl Cli {
    fn one_shot(&self) -> bool {
        self.artist.is_some() || self.song.is_some() || self.query.is_some()
    }

    fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            supersede: self.supersede.then_some(true),
        }
    }

    fn load_config(&self) -> Result<Config> {
        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => lyricfind::paths::get_config_path().ok(),
        };
        Config::load(config_path.as_deref(), self.config_layer()).context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.list_presets {
        for (name, template) in PRESETS {
            println!("{:<12} {}", name, template);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if cli.one_shot() {
        // Logs go to stderr so stdout carries only the lyrics
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "lyricfind=warn".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();

        return run_once(&cli).await;
    }

    // Initialize file-based logging for TUI mode
    let log_dir = lyricfind::paths::get_log_dir()?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "lyricfind.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    run_tui(&cli).await?;
    Ok(ExitCode::SUCCESS)
}

/// Text for stdout on success, or the message for stderr on failure
fn render_outcome(state: QueryState) -> Result<String, String> {
    match state {
        QueryState::Success(result) if result.artist.is_empty() => Ok(result.lyrics_text),
        QueryState::Success(result) => Ok(format!(
            "{} - {}\n\n{}",
            result.artist, result.title, result.lyrics_text
        )),
        QueryState::Failed(e) => Err(e.to_string()),
        state => Err(format!("Lookup ended in unexpected state: {}", state.label())),
    }
}

async fn run_once(cli: &Cli) -> Result<ExitCode> {
    let config = cli.load_config()?;
    let query = Query {
        artist_name: cli.artist.clone(),
        song_title: cli.song.clone(),
        free_text: cli.query.clone(),
    };

    let controller = lyricfind::LyricsQueryController::new(config, HttpTransport::new());
    match render_outcome(controller.run(&query).await) {
        Ok(text) => {
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Err(message) => {
            eprintln!("{}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_tui(cli: &Cli) -> Result<()> {
    tracing::info!("Starting lyricfind");

    let config = cli.load_config()?;
    let variant = config.variant();
    let controller = Arc::new(lyricfind::LyricsQueryController::new(
        config,
        HttpTransport::new(),
    ));

    let (ui_tx, ui_rx) = tokio::sync::mpsc::unbounded_channel();

    // Spawn worker task
    let worker_handle = tokio::spawn(lyricfind::worker::run(controller.clone(), ui_rx));

    // Run TUI
    let mut app = lyricfind::tui::App::new(variant, controller.subscribe(), ui_tx);
    let result = app.run().await;

    // Dropping the app closes the channel so the worker exits
    drop(app);
    worker_handle.await?;

    tracing::info!("lyricfind exiting");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyricfind::error::{ParseError, ValidationError};
    use lyricfind::query::Field;
    use lyricfind::LyricsResult;

    fn result(artist: &str) -> LyricsResult {
        LyricsResult {
            title: "Bohemian Rhapsody".to_string(),
            artist: artist.to_string(),
            lyrics_text: "Is this the real life...".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_render_success() {
        assert_eq!(
            render_outcome(QueryState::Success(result("Queen"))),
            Ok("Queen - Bohemian Rhapsody\n\nIs this the real life...".to_string())
        );
        assert_eq!(
            render_outcome(QueryState::Success(result(""))),
            Ok("Is this the real life...".to_string())
        );
    }

    #[test]
    fn test_render_failure() {
        assert_eq!(
            render_outcome(QueryState::Failed(ParseError::NotFound.into())),
            Err("No lyrics found".to_string())
        );
        assert_eq!(
            render_outcome(QueryState::Failed(
                ValidationError::EmptyField(Field::Song).into()
            )),
            Err("Please fill in the song field".to_string())
        );
        assert!(render_outcome(QueryState::Loading).is_err());
    }

    #[test]
    fn test_cli_modes() {
        let cli = Cli::parse_from(["lyricfind", "-a", "Queen", "-s", "Bohemian Rhapsody"]);
        assert!(cli.one_shot());
        assert_eq!(cli.config_layer().supersede, None);

        let cli = Cli::parse_from(["lyricfind", "--supersede"]);
        assert!(!cli.one_shot());
        assert_eq!(cli.config_layer().supersede, Some(true));
    }
}
