//! Tile image formats.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Image format for rendered tiles.
///
/// The `png*` variants differ only in encoder configuration (bit depth,
/// palette); they all share the `png` file extension. Lossless/lossy mode
/// and quality are render-engine configuration, not core pipeline logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileFormat {
    Jpg,
    Png,
    Png8,
    Png24,
    Png32,
    Png256,
    Webp,
}

impl TileFormat {
    /// File extension used in the `{z}/{x}/{y}.{ext}` layout.
    pub fn extension(&self) -> &'static str {
        match self {
            TileFormat::Jpg => "jpg",
            TileFormat::Webp => "webp",
            _ => "png",
        }
    }

    /// The format name as given on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TileFormat::Jpg => "jpg",
            TileFormat::Png => "png",
            TileFormat::Png8 => "png8",
            TileFormat::Png24 => "png24",
            TileFormat::Png32 => "png32",
            TileFormat::Png256 => "png256",
            TileFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for TileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tile format '{0}' (expected jpg, png, png8, png24, png32, png256, or webp)")]
pub struct UnknownFormat(pub String);

impl FromStr for TileFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" => Ok(TileFormat::Jpg),
            "png" => Ok(TileFormat::Png),
            "png8" => Ok(TileFormat::Png8),
            "png24" => Ok(TileFormat::Png24),
            "png32" => Ok(TileFormat::Png32),
            "png256" => Ok(TileFormat::Png256),
            "webp" => Ok(TileFormat::Webp),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}
