//! Codec for eLVL map regions.
//!
//! A region is a named set of cells on the 1024×1024 tile grid plus a few
//! gameplay flags. On disk it is the body of a `REGN` super-chunk: a run of
//! tagged sub-chunks, one of which (`rTIL`) holds the cells as a run-length
//! compressed bitmap.
//!
//! Decoding goes bytes → [`chunk`] → [`rle`] → [`TileGrid`] →
//! [`rect::decompose`] → [`Region`]. Encoding runs the same path backwards.

pub mod chunk;
pub mod error;
pub mod grid;
pub mod rect;
pub mod region;
pub mod rle;

pub use chunk::{RegionChunk, RegionField, Tag, UnknownChunk};
pub use error::DecodeError;
pub use grid::{GRID_CELLS, GRID_SIZE, TileGrid};
pub use rect::{TileRect, decompose, rasterize};
pub use region::{ARENA_NAME_MAX, AutoWarp, Region};
pub use rle::RleOp;

/// Decodes a region from the body of a `REGN` super-chunk.
///
/// The caller strips the super-chunk's own tag and length first.
pub fn decode(bytes: &[u8]) -> Result<Region, DecodeError> {
    Region::decode(bytes)
}

/// Encodes a region into a `REGN` super-chunk body.
///
/// The caller adds the super-chunk's own tag and length.
pub fn encode(region: &Region) -> Vec<u8> {
    region.encode()
}
