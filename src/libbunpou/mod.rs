use std::io;
use thiserror::Error;

pub mod db;
pub mod honyaku;
pub mod kotoba;
pub mod naiyou;
pub mod renshuu;
pub mod settei;
pub mod shitsumon;
pub mod tokei;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("malformed content: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot access file: {0}")]
    Io(#[from] io::Error),
    #[error("not enough choices: needed {needed}, only {available} available")]
    NotEnoughChoices { needed: usize, available: usize },
    #[error("missing translation for key: {0}")]
    MissingTranslation(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
