//! Web font lookup and inlining.
//!
//! The serializer only writes an `@import` placeholder for a known font.
//! [`embed_fonts`] swaps that placeholder for the style sheet itself, with
//! every font file inlined as a `data:` URI, so the markup renders the same
//! without network access. Failures never abort: a subset that cannot be
//! fetched keeps its remote URL, and a style sheet that cannot be fetched
//! leaves the markup untouched.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::FontFetchError;

/// Known font families and the style sheets that provide them.
const KNOWN_FONTS: [(&str, &str); 10] = [
    (
        "Material Icons",
        "https://fonts.googleapis.com/icon?family=Material+Icons",
    ),
    (
        "Noto Sans JP",
        "https://fonts.googleapis.com/css2?family=Noto+Sans+JP:wght@400;700&display=swap",
    ),
    (
        "Noto Serif JP",
        "https://fonts.googleapis.com/css2?family=Noto+Serif+JP:wght@400;700&display=swap",
    ),
    (
        "Noto Sans Symbols",
        "https://fonts.googleapis.com/css2?family=Noto+Sans+Symbols&display=swap",
    ),
    (
        "Noto Sans Symbols 2",
        "https://fonts.googleapis.com/css2?family=Noto+Sans+Symbols+2&display=swap",
    ),
    (
        "Noto Music",
        "https://fonts.googleapis.com/css2?family=Noto+Music&display=swap",
    ),
    (
        "Noto Serif Hentaigana",
        "https://fonts.googleapis.com/css2?family=Noto+Serif+Hentaigana&display=swap",
    ),
    (
        "Noto Sans Egyptian Hieroglyphs",
        "https://fonts.googleapis.com/css2?family=Noto+Sans+Egyptian+Hieroglyphs&display=swap",
    ),
    (
        "Noto Color Emoji",
        "https://fonts.googleapis.com/css2?family=Noto+Color+Emoji&display=swap",
    ),
    (
        "Noto Emoji",
        "https://fonts.googleapis.com/css2?family=Noto+Emoji:wght@400;700&display=swap",
    ),
];

const IMPORT_PREFIX: &str = "<style>@import url('";
const IMPORT_SUFFIX: &str = "');</style>";

/// Returns the style-sheet URL for a known font family.
pub fn import_url(font: &str) -> Option<&'static str> {
    KNOWN_FONTS
        .iter()
        .find(|(name, _)| *name == font)
        .map(|(_, url)| *url)
}

/// Names of every font family with a known style sheet.
pub fn known_fonts() -> impl Iterator<Item = &'static str> {
    KNOWN_FONTS.iter().map(|(name, _)| *name)
}

/// The `<style>` element the serializer writes for an imported style sheet.
pub fn import_placeholder(url: &str) -> String {
    format!("{IMPORT_PREFIX}{url}{IMPORT_SUFFIX}")
}

// ============================================================================
// Fetching
// ============================================================================

/// Source of style sheets and font files.
pub trait FontFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FontFetchError>;

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FontFetchError>;
}

/// Blocking HTTP fetcher.
#[cfg(feature = "remote-fonts")]
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFontFetcher;

#[cfg(feature = "remote-fonts")]
impl FontFetcher for HttpFontFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FontFetchError> {
        ureq::get(url)
            .call()
            .map_err(|e| FontFetchError::new(url, e))?
            .body_mut()
            .read_to_string()
            .map_err(|e| FontFetchError::new(url, e))
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FontFetchError> {
        ureq::get(url)
            .call()
            .map_err(|e| FontFetchError::new(url, e))?
            .body_mut()
            .read_to_vec()
            .map_err(|e| FontFetchError::new(url, e))
    }
}

// ============================================================================
// Embedding
// ============================================================================

/// Replaces the font import placeholder in `markup` with an inlined style sheet.
///
/// Unknown fonts, markup without a placeholder, and a failed style-sheet
/// fetch all return `markup` unchanged.
pub fn embed_fonts(markup: &str, font: &str, fetcher: &dyn FontFetcher) -> String {
    let Some(css_url) = import_url(font) else {
        return markup.to_string();
    };
    let Some((start, end)) = find_placeholder(markup) else {
        tracing::debug!(font, "no font import to replace");
        return markup.to_string();
    };

    let css = match fetcher.fetch_text(css_url) {
        Ok(css) => css,
        Err(err) => {
            tracing::warn!(%err, font, "failed to embed font");
            return markup.to_string();
        }
    };
    let css = inline_font_urls(&css, fetcher);

    let mut out = String::with_capacity(markup.len() + css.len());
    out.push_str(&markup[..start]);
    out.push_str("<style>");
    out.push_str(&css);
    out.push_str("</style>");
    out.push_str(&markup[end..]);
    out
}

/// Byte range of the first import placeholder.
fn find_placeholder(markup: &str) -> Option<(usize, usize)> {
    let start = markup.find(IMPORT_PREFIX)?;
    let after = start + IMPORT_PREFIX.len();
    let end = after + markup[after..].find(IMPORT_SUFFIX)? + IMPORT_SUFFIX.len();
    Some((start, end))
}

/// Rewrites every `url(...)` in `css` to a base64 `data:` URI.
fn inline_font_urls(css: &str, fetcher: &dyn FontFetcher) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(open) = rest.find("url(") {
        let args = open + "url(".len();
        let Some(close) = rest[args..].find(')') else {
            break;
        };
        let close = args + close;
        out.push_str(&rest[..open]);

        let url: String = rest[args..close]
            .chars()
            .filter(|c| *c != '\'' && *c != '"')
            .collect();
        let url = url.trim();
        match fetcher.fetch_bytes(url) {
            Ok(bytes) => {
                out.push_str("url('data:");
                out.push_str(mime_type(url));
                out.push_str(";base64,");
                out.push_str(&STANDARD.encode(bytes));
                out.push_str("')");
            }
            Err(err) => {
                tracing::warn!(%err, "failed to fetch font subset");
                out.push_str(&rest[open..=close]);
            }
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

fn mime_type(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "woff2" => "font/woff2",
        Some(ext) if ext == "woff" => "font/woff",
        Some(ext) if ext == "ttf" => "font/ttf",
        Some(ext) if ext == "otf" => "font/otf",
        _ => "application/octet-stream",
    }
}
