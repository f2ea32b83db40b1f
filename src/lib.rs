//! iconforge: parametric icon compositor
//!
//! This crate turns a flat [`StyleDescription`] (text, a shape, colors, a
//! single light angle and a set of effect toggles) into layered SVG markup
//! and packs rasterized copies of it into a multi-resolution `.ico`
//! container.
//!
//! # Example
//!
//! ```
//! use iconforge::{Shape, ShadowType, StyleDescription, compose, serialize};
//!
//! let style = StyleDescription {
//!     shape: Shape::Circle,
//!     text: "A".to_string(),
//!     shadow_type: ShadowType::Long,
//!     shadow_distance: 8.0,
//!     global_shadow_angle: 45.0,
//!     ..StyleDescription::default()
//! };
//!
//! let scene = compose(&style);
//! let svg = serialize(&scene);
//! assert!(svg.starts_with("<svg"));
//! ```
//!
//! # Exporting
//!
//! Rasterization and font fetching sit behind the [`Rasterizer`] and
//! [`FontFetcher`] traits. The bundled [`ResvgRasterizer`] renders with
//! resvg, and `HttpFontFetcher` (feature `remote-fonts`) inlines web fonts:
//!
//! ```no_run
//! use iconforge::{ResvgRasterizer, StyleDescription, export_icon};
//!
//! let ico = export_icon(&StyleDescription::default(), &ResvgRasterizer::new(), None)?;
//! std::fs::write("icon.ico", ico)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod container;
pub mod effect;
pub mod error;
pub mod export;
pub mod fonts;
pub mod geometry;
pub mod markup;
pub mod raster;
pub mod scene;
pub mod store;
pub mod style;

pub use color::{Harmony, HexColor, harmony, harmony_hex};
pub use container::{RasterSet, TARGET_SIZES, encode};
pub use effect::{ComposeContext, Effect, Light, compose};
pub use error::{ContainerError, ExportError, FontFetchError, StyleError};
pub use export::{IconExporter, export_icon, render_markup, render_preview};
#[cfg(feature = "remote-fonts")]
pub use fonts::HttpFontFetcher;
pub use fonts::{FontFetcher, embed_fonts, import_url};
pub use geometry::{Outline, PathSpec, Shape, StrokeHint, outline};
pub use markup::serialize;
pub use raster::{Rasterizer, ResvgRasterizer, rasterize_all};
pub use scene::{Layer, SceneGraph};
pub use store::{StyleStore, SubscriptionId};
pub use style::{ShadowType, StyleDescription};
