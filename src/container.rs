//! The multi-resolution icon container.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! header     reserved: u16 = 0, type: u16 = 1, count: u16
//! directory  count × 16-byte entries, ascending by size
//!            width: u8, height: u8 (0 means 256), colors: u8 = 0,
//!            reserved: u8 = 0, planes: u16 = 1, bpp: u16 = 32,
//!            length: u32, offset: u32
//! images     the encoded images back to back, in directory order
//! ```

use std::collections::BTreeMap;

use crate::error::ContainerError;

/// Pixel sizes every container carries.
pub const TARGET_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];

const HEADER_LEN: usize = 6;
const ENTRY_LEN: usize = 16;

/// Encoded images keyed by pixel size, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterSet {
    images: BTreeMap<u32, Vec<u8>>,
}

impl RasterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the image for `size`, replacing any previous one.
    ///
    /// Sizes outside [`TARGET_SIZES`] are rejected.
    pub fn insert(&mut self, size: u32, bytes: Vec<u8>) -> Result<(), ContainerError> {
        if !TARGET_SIZES.contains(&size) {
            return Err(ContainerError::UnsupportedSize(size));
        }
        self.images.insert(size, bytes);
        Ok(())
    }

    pub fn get(&self, size: u32) -> Option<&[u8]> {
        self.images.get(&size).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Iterates over `(size, bytes)` in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.images.iter().map(|(size, bytes)| (*size, bytes.as_slice()))
    }
}

/// Packs a complete raster set into container bytes.
///
/// Fails without producing output when the set is empty, lacks any of the
/// [`TARGET_SIZES`], or holds an image too large for a 32-bit length.
pub fn encode(set: &RasterSet) -> Result<Vec<u8>, ContainerError> {
    if set.is_empty() {
        return Err(ContainerError::Empty);
    }
    if let Some(missing) = TARGET_SIZES.iter().find(|size| set.get(**size).is_none()) {
        return Err(ContainerError::MissingSize(*missing));
    }

    let count = set.len();
    let data_start = HEADER_LEN + ENTRY_LEN * count;
    let total = data_start + set.iter().map(|(_, bytes)| bytes.len()).sum::<usize>();
    let mut out = Vec::with_capacity(total);

    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&(count as u16).to_le_bytes());

    let mut offset = data_start;
    for (size, bytes) in set.iter() {
        let len = u32::try_from(bytes.len()).map_err(|_| ContainerError::ImageTooLarge {
            size,
            len: bytes.len(),
        })?;
        let start = u32::try_from(offset).map_err(|_| ContainerError::ImageTooLarge {
            size,
            len: bytes.len(),
        })?;
        let dim = if size >= 256 { 0 } else { size as u8 };

        out.extend_from_slice(&[dim, dim, 0, 0]);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&32u16.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&start.to_le_bytes());
        offset += bytes.len();
    }

    for (_, bytes) in set.iter() {
        out.extend_from_slice(bytes);
    }
    tracing::debug!(images = count, bytes = out.len(), "encoded icon container");
    Ok(out)
}
