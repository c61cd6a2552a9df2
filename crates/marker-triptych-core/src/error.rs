use std::fmt;

use crate::config::ConfigError;
use crate::image::ImageError;
use crate::triptych::TriptychError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pipeline stage a collaborator error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Capture,
    Detect,
    Annotate,
    Caption,
    Display,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Capture => "frame capture",
            Stage::Detect => "marker detection",
            Stage::Annotate => "marker annotation",
            Stage::Caption => "panel captioning",
            Stage::Display => "display",
        };
        f.write_str(name)
    }
}

/// Errors produced by the preview loop and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum PreviewError {
    #[error("Error opening input video source: {input}")]
    SourceOpen { input: String, detail: String },

    #[error("failed to open display: {0}")]
    DisplayOpen(String),

    #[error("{what} is not available in this build")]
    Unsupported { what: String },

    #[error("{stage} failed: {source}")]
    Backend {
        stage: Stage,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Triptych(#[from] TriptychError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PreviewError {
    pub fn source_open(input: impl fmt::Display, detail: impl fmt::Display) -> Self {
        Self::SourceOpen {
            input: input.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn backend(stage: Stage, err: impl Into<BoxError>) -> Self {
        Self::Backend {
            stage,
            source: err.into(),
        }
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported { what: what.into() }
    }
}
