use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open starting points file {}", path.display())]
    StartingPoints {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot open network file {}", path.display())]
    NetworkFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
