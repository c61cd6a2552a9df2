//! Serde-backed preview configuration.

use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::caption::CaptionStyle;
use crate::image::Bgr;
use crate::triptych::Panel;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Embedded marker dictionary selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DictionaryKind {
    #[default]
    #[serde(rename = "DICT_4X4_50")]
    Dict4x4_50,
    #[serde(rename = "DICT_4X4_100")]
    Dict4x4_100,
}

impl DictionaryKind {
    pub fn name(self) -> &'static str {
        match self {
            DictionaryKind::Dict4x4_50 => "DICT_4X4_50",
            DictionaryKind::Dict4x4_100 => "DICT_4X4_100",
        }
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DictionaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DICT_4X4_50" => Ok(DictionaryKind::Dict4x4_50),
            "DICT_4X4_100" => Ok(DictionaryKind::Dict4x4_100),
            other => Err(format!("unknown dictionary: {other}")),
        }
    }
}

/// Which marker detector to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// OpenCV when compiled in, native otherwise.
    #[default]
    Auto,
    Native,
    #[serde(rename = "opencv")]
    OpenCv,
}

impl FromStr for DetectorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DetectorBackend::Auto),
            "native" => Ok(DetectorBackend::Native),
            "opencv" => Ok(DetectorBackend::OpenCv),
            other => Err(format!("unknown detector backend: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Display window".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelCaptions {
    pub left: String,
    pub mid: String,
    pub right: String,
}

impl Default for PanelCaptions {
    fn default() -> Self {
        Self {
            left: "Original image".to_string(),
            mid: "Image with OpenCV drawing".to_string(),
            right: "Image with custom drawing".to_string(),
        }
    }
}

impl PanelCaptions {
    pub fn get(&self, panel: Panel) -> &str {
        match panel {
            Panel::Left => &self.left,
            Panel::Mid => &self.mid,
            Panel::Right => &self.right,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub captions: PanelCaptions,
    pub caption_style: CaptionStyle,
    /// Quadrilateral fill of the custom overlay.
    pub fill_color: Bgr,
    /// Edge stroke of the custom overlay.
    pub edge_color: Bgr,
    pub stroke_width: u32,
    pub exit_key: i32,
    pub key_poll_ms: u32,
    pub window: WindowConfig,
    pub dictionary: DictionaryKind,
    pub detector: DetectorBackend,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
    /// TrueType font for native captions.
    pub font_path: Option<PathBuf>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            captions: PanelCaptions::default(),
            caption_style: CaptionStyle::default(),
            fill_color: Bgr::BLUE,
            edge_color: Bgr::GREEN,
            stroke_width: 5,
            exit_key: 27,
            key_poll_ms: 5,
            window: WindowConfig::default(),
            dictionary: DictionaryKind::default(),
            detector: DetectorBackend::default(),
            max_frames: None,
            font_path: None,
        }
    }
}

impl PreviewConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

/// Where frames come from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    /// Capture device index.
    Device(i32),
    /// Video file or image directory.
    Path(PathBuf),
    /// Generated marker frames.
    Synthetic { frames: usize },
}

impl Default for SourceSpec {
    fn default() -> Self {
        SourceSpec::Device(0)
    }
}

impl FromStr for SourceSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i32>() {
            Ok(index) => SourceSpec::Device(index),
            Err(_) => SourceSpec::Path(PathBuf::from(s)),
        })
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Device(index) => write!(f, "{index}"),
            SourceSpec::Path(path) => write!(f, "{}", path.display()),
            SourceSpec::Synthetic { frames } => write!(f, "synthetic:{frames}"),
        }
    }
}
