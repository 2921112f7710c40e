use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("terminal: {0}")]
    Terminal(String),

    #[error("terminal too small: need {need_w}x{need_h}, have {have_w}x{have_h}")]
    TerminalTooSmall { need_w: u16, need_h: u16, have_w: u16, have_h: u16 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, GameError>;

impl GameError {
    pub fn terminal(e: impl std::fmt::Display) -> Self {
        GameError::Terminal(e.to_string())
    }
}
