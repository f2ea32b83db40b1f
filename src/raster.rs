//! Markup rasterization.
//!
//! [`Rasterizer`] is the seam between the pure pipeline and pixel output.
//! [`ResvgRasterizer`] is the bundled implementation; tests and embedders
//! can supply their own.

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree, fontdb};

use crate::container::{RasterSet, TARGET_SIZES};
use crate::error::ExportError;

/// Turns markup into an encoded square image.
pub trait Rasterizer: Sync {
    /// Renders `markup` at `size`×`size` pixels and returns PNG bytes.
    fn rasterize(&self, markup: &str, size: u32) -> Result<Vec<u8>, ExportError>;
}

// ============================================================================
// ResvgRasterizer
// ============================================================================

/// Renders with resvg, resolving text against a shared font database.
#[derive(Debug, Clone)]
pub struct ResvgRasterizer {
    fontdb: Arc<fontdb::Database>,
}

impl ResvgRasterizer {
    /// Creates a rasterizer with the system fonts loaded.
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self::with_fontdb(db)
    }

    /// Creates a rasterizer over an existing font database.
    pub fn with_fontdb(fontdb: fontdb::Database) -> Self {
        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Renders `markup` to straight-alpha pixels at `size`×`size`.
    pub fn render_rgba(&self, markup: &str, size: u32) -> Result<RgbaImage, ExportError> {
        let opts = Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Options::default()
        };
        let tree =
            Tree::from_str(markup, &opts).map_err(|e| ExportError::rasterize(size, e.to_string()))?;

        let mut pixmap = Pixmap::new(size, size)
            .ok_or_else(|| ExportError::rasterize(size, "invalid pixmap size"))?;
        let tree_size = tree.size();
        let scale = size as f32 / tree_size.width().max(tree_size.height());
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        Ok(pixmap_to_rgba_image(&pixmap))
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ResvgRasterizer {
    #[tracing::instrument(level = "debug", skip(self, markup))]
    fn rasterize(&self, markup: &str, size: u32) -> Result<Vec<u8>, ExportError> {
        let image = self.render_rgba(markup, size)?;
        encode_png(&image, size)
    }
}

/// Compresses an image to PNG bytes.
pub fn encode_png(image: &RgbaImage, size: u32) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|source| ExportError::Encode { size, source })?;
    Ok(buf)
}

fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    RgbaImage::from_fn(width, pixmap.height(), |x, y| {
        let pixel = pixmap.pixels()[(y * width + x) as usize];
        // tiny_skia stores premultiplied alpha
        Rgba(unpremultiply(
            pixel.red(),
            pixel.green(),
            pixel.blue(),
            pixel.alpha(),
        ))
    })
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let a_f = a as f32 / 255.0;
    let channel = |c: u8| (c as f32 / a_f).round().min(255.0) as u8;
    [channel(r), channel(g), channel(b), a]
}

// ============================================================================
// Batch
// ============================================================================

/// Rasterizes `markup` at every [`TARGET_SIZES`] entry, one thread per size.
///
/// The first failure, in ascending size order, is returned.
pub fn rasterize_all(markup: &str, rasterizer: &dyn Rasterizer) -> Result<RasterSet, ExportError> {
    let results: Vec<(u32, Result<Vec<u8>, ExportError>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = TARGET_SIZES
            .iter()
            .map(|&size| (size, scope.spawn(move || rasterizer.rasterize(markup, size))))
            .collect();
        handles
            .into_iter()
            .map(|(size, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(ExportError::rasterize(size, "rasterizer panicked")));
                (size, result)
            })
            .collect()
    });

    let mut set = RasterSet::new();
    for (size, result) in results {
        set.insert(size, result?)?;
    }
    Ok(set)
}
