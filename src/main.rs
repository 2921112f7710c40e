mod game;
mod term;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snake::highscore::{HighScoreStore, JsonFileStore, MemoryStore};
use snake::GameConfig;

const LOG_FILE: &str = "snake.log";

fn main() -> anyhow::Result<()> {
    init_logging().context("setting up logging")?;

    let config = GameConfig::resolve(std::env::args_os().nth(1).map(PathBuf::from))
        .context("loading configuration")?;
    info!(?config, "starting");

    let store = high_score_store(&config);
    let mut game = game::SnakeGame::new(config, store)?;
    game.run()?;

    info!("bye");
    Ok(())
}

/// Logs go to a file; the terminal belongs to the game.
fn init_logging() -> anyhow::Result<()> {
    let dir = dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("snake");
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn high_score_store(config: &GameConfig) -> Box<dyn HighScoreStore> {
    if let Some(path) = &config.high_score_path {
        return Box::new(JsonFileStore::new(path));
    }

    match JsonFileStore::in_data_dir() {
        Ok(store) => {
            info!(path = %store.path().display(), "high score file");
            Box::new(store)
        }
        Err(e) => {
            warn!("{}; best score will not be kept", e);
            Box::new(MemoryStore::default())
        }
    }
}
