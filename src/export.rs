//! Style to icon container, end to end.
//!
//! ```text
//! StyleDescription ─compose─▶ SceneGraph ─serialize─▶ markup
//!     ─embed fonts─▶ markup ─rasterize × 6─▶ RasterSet ─encode─▶ bytes
//! ```

use image::RgbaImage;

use crate::container;
use crate::effect::compose;
use crate::error::ExportError;
use crate::fonts::{self, FontFetcher};
use crate::markup;
use crate::raster::{self, Rasterizer, ResvgRasterizer};
use crate::style::StyleDescription;

/// Renders a style to standalone markup, inlining its font when a fetcher
/// is given.
pub fn render_markup(style: &StyleDescription, fonts: Option<&dyn FontFetcher>) -> String {
    let markup = markup::serialize(&compose(style));
    match fonts {
        Some(fetcher) => fonts::embed_fonts(&markup, &style.font, fetcher),
        None => markup,
    }
}

/// Exports a style as icon container bytes.
///
/// Font problems only degrade the text rendering. Rasterization and
/// container failures abort the export.
#[tracing::instrument(skip_all, fields(shape = ?style.shape))]
pub fn export_icon(
    style: &StyleDescription,
    rasterizer: &dyn Rasterizer,
    fonts: Option<&dyn FontFetcher>,
) -> Result<Vec<u8>, ExportError> {
    let markup = render_markup(style, fonts);
    let set = raster::rasterize_all(&markup, rasterizer)?;
    let bytes = container::encode(&set)?;
    tracing::info!(bytes = bytes.len(), "exported icon");
    Ok(bytes)
}

/// Renders a single straight-alpha preview without fetching fonts.
pub fn render_preview(style: &StyleDescription, size: u32) -> Result<RgbaImage, ExportError> {
    ResvgRasterizer::new().render_rgba(&render_markup(style, None), size)
}

// ============================================================================
// IconExporter
// ============================================================================

/// A rasterizer and optional font source, reused across exports.
///
/// # Example
///
/// ```no_run
/// use iconforge::{IconExporter, ResvgRasterizer, StyleDescription};
///
/// let exporter = IconExporter::new(ResvgRasterizer::new());
/// let ico = exporter.export(&StyleDescription::default()).unwrap();
/// std::fs::write("icon.ico", ico).unwrap();
/// ```
pub struct IconExporter<R: Rasterizer = ResvgRasterizer> {
    rasterizer: R,
    fonts: Option<Box<dyn FontFetcher>>,
}

impl<R: Rasterizer> IconExporter<R> {
    /// Creates an exporter that renders with whatever fonts the rasterizer has.
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            fonts: None,
        }
    }

    /// Inlines known web fonts through `fetcher` before rasterizing.
    pub fn with_fonts(mut self, fetcher: impl FontFetcher + 'static) -> Self {
        self.fonts = Some(Box::new(fetcher));
        self
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// The markup that [`export`](Self::export) would rasterize.
    pub fn markup(&self, style: &StyleDescription) -> String {
        render_markup(style, self.fonts.as_deref())
    }

    pub fn export(&self, style: &StyleDescription) -> Result<Vec<u8>, ExportError> {
        export_icon(style, &self.rasterizer, self.fonts.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::TARGET_SIZES;
    use crate::error::FontFetchError;
    use std::sync::Mutex;

    /// Records the markup it was given and returns a size-tagged payload.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(u32, String)>>,
    }

    impl Rasterizer for Recorder {
        fn rasterize(&self, markup: &str, size: u32) -> Result<Vec<u8>, ExportError> {
            self.seen.lock().unwrap().push((size, markup.to_string()));
            Ok(vec![size as u8; 4])
        }
    }

    struct Offline;

    impl FontFetcher for Offline {
        fn fetch_text(&self, url: &str) -> Result<String, FontFetchError> {
            Err(FontFetchError::new(url, "offline"))
        }

        fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FontFetchError> {
            Err(FontFetchError::new(url, "offline"))
        }
    }

    struct InlineCss;

    impl FontFetcher for InlineCss {
        fn fetch_text(&self, _url: &str) -> Result<String, FontFetchError> {
            Ok("@font-face{font-family:'Noto Sans JP'}".to_string())
        }

        fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FontFetchError> {
            Err(FontFetchError::new(url, "unused"))
        }
    }

    #[test]
    fn export_rasterizes_every_size_once() {
        let rasterizer = Recorder::default();
        let bytes = export_icon(&StyleDescription::default(), &rasterizer, None).unwrap();

        let mut sizes: Vec<u32> = rasterizer.seen.lock().unwrap().iter().map(|s| s.0).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, TARGET_SIZES);
        assert_eq!(bytes.len(), 6 + 16 * 6 + 4 * 6);
    }

    #[test]
    fn font_failure_still_exports() {
        let rasterizer = Recorder::default();
        let result = export_icon(&StyleDescription::default(), &rasterizer, Some(&Offline));
        assert!(result.is_ok());
        let seen = rasterizer.seen.lock().unwrap();
        assert!(seen.iter().all(|(_, markup)| markup.contains("@import")));
    }

    #[test]
    fn exporter_inlines_fonts() {
        let exporter = IconExporter::new(Recorder::default()).with_fonts(InlineCss);
        exporter.export(&StyleDescription::default()).unwrap();
        let seen = exporter.rasterizer().seen.lock().unwrap();
        assert!(seen.iter().all(|(_, markup)| {
            markup.contains("<style>@font-face{font-family:'Noto Sans JP'}</style>")
                && !markup.contains("@import")
        }));
    }

    struct Broken;

    impl Rasterizer for Broken {
        fn rasterize(&self, _markup: &str, size: u32) -> Result<Vec<u8>, ExportError> {
            if size == 16 {
                Ok(Vec::new())
            } else {
                Err(ExportError::rasterize(size, "no backend"))
            }
        }
    }

    #[test]
    fn rasterizer_failure_aborts() {
        let err = export_icon(&StyleDescription::default(), &Broken, None).unwrap_err();
        assert!(matches!(err, ExportError::Rasterize { size: 32, .. }));
    }
}
