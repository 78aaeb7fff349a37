use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    /// Building the client or the chat request failed.
    #[error("provider: {0}")]
    Provider(String),

    #[error(transparent)]
    Core(#[from] stategen_core::Error),
}

pub type Result<T, E = PromptError> = std::result::Result<T, E>;
