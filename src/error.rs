//! Error types for loading styles, exporting icons and fetching fonts.
//!
//! Composition and serialization never fail: a style with odd values still
//! produces some scene. Only load-time and export-time problems surface here.

use thiserror::Error;

/// A persisted style document could not be loaded.
#[derive(Debug, Error)]
pub enum StyleError {
    /// The document is not valid JSON, or a field has the wrong type.
    #[error("invalid style document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed, but its top level is not a JSON object.
    #[error("style document must be a JSON object")]
    NotAnObject,
}

/// The icon container could not be assembled.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    /// The raster set holds no images at all.
    #[error("raster set has no images")]
    Empty,

    /// One of the required target sizes has no image.
    #[error("raster set is missing the {0}px image")]
    MissingSize(u32),

    /// An image was offered for a size the container does not carry.
    #[error("{0}px is not a supported icon size")]
    UnsupportedSize(u32),

    /// An image is too large for the container's 32-bit size field.
    #[error("{size}px image is {len} bytes, which exceeds the container limit")]
    ImageTooLarge { size: u32, len: usize },
}

/// Exporting a style to an icon container failed.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The rasterizer could not render the markup at the given size.
    #[error("failed to rasterize {size}px image: {reason}")]
    Rasterize { size: u32, reason: String },

    /// The rendered pixels could not be compressed.
    #[error("failed to encode {size}px image")]
    Encode {
        size: u32,
        #[source]
        source: image::ImageError,
    },

    /// The container encoder rejected the raster set.
    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl ExportError {
    pub fn rasterize(size: u32, reason: impl Into<String>) -> Self {
        Self::Rasterize {
            size,
            reason: reason.into(),
        }
    }
}

/// A remote font resource could not be fetched.
///
/// Never fatal: callers log it and keep the markup they already have.
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {reason}")]
pub struct FontFetchError {
    pub url: String,
    pub reason: String,
}

impl FontFetchError {
    pub fn new(url: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
