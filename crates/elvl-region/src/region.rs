//! The [`Region`] value and its encode/decode entry points.

use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

use elvl_bytes::{ByteBuffer, ByteReader};

use crate::chunk::{
    ChunkReader, ChunkWriter, HEADER_LEN, RegionChunk, RegionField, TAG_REGION, UnknownChunk,
    chunk_len, tag_str, write_chunk,
};
use crate::error::DecodeError;
use crate::grid::{GRID_SIZE, TileGrid};
use crate::rect::{TileRect, decompose, rasterize};

/// Longest arena name an `rAWP` chunk can hold. Longer names are cut on
/// encode.
pub const ARENA_NAME_MAX: usize = 15;

/// Where an auto-warp region sends the player.
///
/// The coordinates are a teleport destination and are not limited to the
/// region's own grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoWarp {
    /// Destination column.
    pub x: u16,
    /// Destination row.
    pub y: u16,
    /// Destination arena, if different from the current one.
    pub arena: Option<String>,
}

impl Default for AutoWarp {
    fn default() -> Self {
        Self {
            x: GRID_SIZE as u16 / 2,
            y: GRID_SIZE as u16 / 2,
            arena: None,
        }
    }
}

/// A named, flagged set of tiles from an eLVL map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// Display name.
    pub name: String,
    /// Base in flag games (`rBSE`).
    pub is_base: bool,
    /// Flags cannot be dropped here (`rNFL`).
    pub is_no_flags: bool,
    /// Weapons are disabled here (`rNWP`).
    pub is_no_weapons: bool,
    /// Antiwarp is disabled here (`rNAW`).
    pub is_no_anti_warp: bool,
    /// Warp target (`rAWP`); `None` when the region does not warp.
    pub auto_warp: Option<AutoWarp>,
    /// Rectangles whose union is the region's cells.
    pub rects: Vec<TileRect>,
    /// Chunks this codec does not interpret, written back before the name.
    pub unknown_chunks: Vec<UnknownChunk>,
}

assert_impl_all!(Region: Send, Sync);

impl Region {
    /// Creates an empty region with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if entering the region warps the player.
    pub fn is_auto_warp(&self) -> bool {
        self.auto_warp.is_some()
    }

    /// Rasterizes the region's rectangles.
    pub fn grid(&self) -> TileGrid {
        rasterize(&self.rects)
    }

    /// Returns `true` if both regions cover exactly the same cells,
    /// regardless of how they split into rectangles.
    pub fn same_cells(&self, other: &Region) -> bool {
        self.grid() == other.grid()
    }

    /// Decodes a `REGN` super-chunk body.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let mut region = Region::default();
        for raw in ChunkReader::new(body) {
            let raw = raw?;
            tracing::debug!(
                tag = %tag_str(&raw.tag),
                len = raw.payload.len(),
                "decoding chunk"
            );
            region.apply(RegionChunk::parse(raw)?);
        }
        Ok(region)
    }

    /// Decodes a complete `REGN` super-chunk, header included.
    ///
    /// `bytes` must hold exactly one padded super-chunk. Missing padding and
    /// trailing bytes are both `TrailingOrOverrunData`.
    pub fn decode_super_chunk(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_LEN {
            return Err(DecodeError::TruncatedHeader {
                offset: 0,
                remaining: bytes.len(),
            });
        }
        let mut reader = ByteReader::new(bytes);
        let mut tag = [0u8; 4];
        tag.copy_from_slice(reader.take(4));
        if tag != TAG_REGION {
            return Err(DecodeError::NotARegion { tag: tag_str(&tag) });
        }
        let len = reader.read_u32_le() as usize;
        let consumed = chunk_len(len);
        if consumed != bytes.len() {
            return Err(DecodeError::TrailingOrOverrunData {
                consumed,
                declared: bytes.len(),
            });
        }
        Self::decode(reader.take(len))
    }

    /// Folds one decoded chunk into the region.
    ///
    /// Tiles accumulate; a later name replaces an earlier one.
    pub fn apply(&mut self, chunk: RegionChunk) {
        match chunk {
            RegionChunk::Field(RegionField::Base) => self.is_base = true,
            RegionChunk::Field(RegionField::NoAntiWarp) => self.is_no_anti_warp = true,
            RegionChunk::Field(RegionField::NoWeapons) => self.is_no_weapons = true,
            RegionChunk::Field(RegionField::NoFlags) => self.is_no_flags = true,
            RegionChunk::Field(RegionField::AutoWarp(warp)) => self.auto_warp = Some(warp),
            RegionChunk::Field(RegionField::Name(name)) => self.name = name,
            RegionChunk::Field(RegionField::Tiles(grid)) => {
                let rects = decompose(&grid);
                tracing::debug!(cells = grid.count(), rects = rects.len(), "decoded tiles");
                self.rects.extend(rects);
            }
            RegionChunk::Unknown(chunk) => {
                tracing::debug!(tag = %tag_str(&chunk.tag), "keeping unknown chunk");
                self.unknown_chunks.push(chunk);
            }
        }
    }

    /// The chunks this region encodes to, in file order.
    pub fn chunks(&self) -> Vec<RegionChunk> {
        let flags = [
            (self.is_base, RegionField::Base),
            (self.is_no_flags, RegionField::NoFlags),
            (self.is_no_weapons, RegionField::NoWeapons),
            (self.is_no_anti_warp, RegionField::NoAntiWarp),
        ];
        let mut chunks: Vec<RegionChunk> = flags
            .into_iter()
            .filter(|(set, _)| *set)
            .map(|(_, field)| RegionChunk::Field(field))
            .collect();
        if let Some(warp) = &self.auto_warp {
            chunks.push(RegionChunk::Field(RegionField::AutoWarp(warp.clone())));
        }
        chunks.extend(self.unknown_chunks.iter().cloned().map(RegionChunk::Unknown));
        chunks.push(RegionChunk::Field(RegionField::Name(self.name.clone())));
        chunks.push(RegionChunk::Field(RegionField::Tiles(self.grid())));
        chunks
    }

    /// Encodes the region as a `REGN` super-chunk body.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ChunkWriter::new();
        for chunk in self.chunks() {
            let (tag, payload) = chunk.to_raw();
            writer.push(tag, payload);
        }
        writer.finish()
    }

    /// Encodes the region as a complete `REGN` super-chunk, header and
    /// padding included.
    pub fn encode_super_chunk(&self) -> Vec<u8> {
        let body = self.encode();
        let mut buf = ByteBuffer::with_len(chunk_len(body.len()));
        write_chunk(&mut buf, &TAG_REGION, &body);
        buf.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;

    use super::*;
    use crate::chunk::{TAG_NAME, TAG_TILES};

    fn sample_region() -> Region {
        Region {
            name: "Flag Room".to_string(),
            is_base: true,
            is_no_flags: false,
            is_no_weapons: true,
            is_no_anti_warp: true,
            auto_warp: Some(AutoWarp {
                x: 512,
                y: 300,
                arena: Some("duel".to_string()),
            }),
            rects: vec![TileRect::new(10, 10, 30, 5), TileRect::new(600, 700, 100, 200)],
            unknown_chunks: vec![UnknownChunk {
                tag: *b"rPYC",
                payload: b"print('hi')".to_vec(),
            }],
        }
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let region = sample_region();
        let decoded = Region::decode(&region.encode()).expect("decode failed");
        assert_eq!(decoded.name, region.name);
        assert!(decoded.is_base && decoded.is_no_weapons && decoded.is_no_anti_warp);
        assert!(!decoded.is_no_flags);
        assert_eq!(decoded.auto_warp, region.auto_warp);
        assert_eq!(decoded.unknown_chunks, region.unknown_chunks);
        assert!(decoded.same_cells(&region));
        // Canonical form survives a second pass byte for byte.
        assert_eq!(decoded.encode(), Region::decode(&decoded.encode()).unwrap().encode());
    }

    #[test]
    fn test_chunk_order() {
        let bytes = sample_region().encode();
        let tags: Vec<_> = ChunkReader::new(&bytes)
            .map(|chunk| chunk.unwrap().tag)
            .collect();
        assert_eq!(
            tags,
            vec![*b"rBSE", *b"rNWP", *b"rNAW", *b"rAWP", *b"rPYC", *b"rNAM", *b"rTIL"]
        );
    }

    #[test]
    fn test_minimal_region_bytes() {
        let bytes = Region::new("ab").encode();
        let mut expected = b"rNAM\x02\x00\x00\x00ab\x00\x00".to_vec();
        expected.extend_from_slice(b"rTIL\x02\x00\x00\x00\xA3\xFF\x00\x00");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_unknown_chunk_bytes_pass_through() {
        let mut body = b"zZZZ\x05\x00\x00\x00\x01\x02\x03\x04\x05\x00\x00\x00".to_vec();
        body.extend_from_slice(&Region::new("x").encode());

        let region = Region::decode(&body).unwrap();
        assert_eq!(region.unknown_chunks.len(), 1);
        assert_eq!(region.unknown_chunks[0].tag, *b"zZZZ");

        let encoded = region.encode();
        let needle = &body[..16];
        assert!(encoded.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_missing_name_decodes_empty() {
        let region = Region::decode(&[]).unwrap();
        assert_eq!(region, Region::default());
        assert!(!region.is_auto_warp());
    }

    #[test]
    fn test_single_cell_region() {
        let mut region = Region::new("dot");
        region.rects.push(TileRect::new(5, 5, 1, 1));
        let decoded = Region::decode(&region.encode()).unwrap();
        assert_eq!(decoded.rects, vec![TileRect::new(5, 5, 1, 1)]);
    }

    #[test]
    fn test_full_region_is_one_rect() {
        let mut region = Region::new("all");
        region.rects = vec![TileRect::new(0, 0, 1024, 512), TileRect::new(0, 512, 1024, 512)];
        let decoded = Region::decode(&region.encode()).unwrap();
        assert_eq!(decoded.rects, vec![TileRect::FULL]);
    }

    #[test]
    fn test_overlapping_rects_decode_losslessly() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1234);
        let mut region = Region::new("random");
        for _ in 0..25 {
            let x = rng.gen_range(0..900u16);
            let y = rng.gen_range(0..900u16);
            region.rects.push(TileRect::new(
                x,
                y,
                rng.gen_range(1..=124),
                rng.gen_range(1..=124),
            ));
        }
        let decoded = Region::decode(&region.encode()).unwrap();
        assert!(decoded.same_cells(&region));
    }

    #[test]
    fn test_incomplete_tiles_abort_decode() {
        let mut body = Vec::new();
        let mut buf = ByteBuffer::with_len(12);
        write_chunk(&mut buf, &TAG_TILES, &[0xA3, 0xFE]);
        body.extend(buf.into_inner());
        assert_eq!(
            Region::decode(&body),
            Err(DecodeError::IncompleteGrid { rows: 1023 })
        );
    }

    #[test]
    fn test_truncated_trailing_header() {
        let mut body = Region::new("x").encode();
        body.extend_from_slice(&[b'r', b'B', b'S', b'E']);
        assert!(matches!(
            Region::decode(&body),
            Err(DecodeError::TruncatedHeader { remaining: 4, .. })
        ));
    }

    #[test]
    fn test_super_chunk_wrapping() {
        let region = sample_region();
        let bytes = region.encode_super_chunk();
        assert_eq!(&bytes[..4], b"REGN");
        assert_eq!(bytes.len() % 4, 0);
        let decoded = Region::decode_super_chunk(&bytes).unwrap();
        assert_eq!(decoded.name, region.name);

        let mut wrong = bytes.clone();
        wrong[..4].copy_from_slice(b"TSET");
        assert_eq!(
            Region::decode_super_chunk(&wrong),
            Err(DecodeError::NotARegion {
                tag: "TSET".to_string()
            })
        );
    }

    #[test]
    fn test_super_chunk_rejects_trailing_bytes() {
        let mut bytes = Region::new("x").encode_super_chunk();
        let exact = bytes.len();
        bytes.extend_from_slice(&[0xEE; 64]);
        assert_eq!(
            Region::decode_super_chunk(&bytes),
            Err(DecodeError::TrailingOrOverrunData {
                consumed: exact,
                declared: exact + 64
            })
        );

        bytes.truncate(exact - 1);
        assert_eq!(
            Region::decode_super_chunk(&bytes),
            Err(DecodeError::TrailingOrOverrunData {
                consumed: exact,
                declared: exact - 1
            })
        );
    }

    fn tiles_chunk(rects: &[TileRect]) -> Vec<u8> {
        let payload = crate::rle::compress(&rasterize(rects));
        let mut buf = ByteBuffer::with_len(chunk_len(payload.len()));
        write_chunk(&mut buf, &TAG_TILES, &payload);
        buf.into_inner()
    }

    #[test]
    fn test_tile_chunks_accumulate() {
        let mut body = tiles_chunk(&[TileRect::new(0, 0, 2, 2)]);
        body.extend(tiles_chunk(&[TileRect::new(10, 10, 1, 1)]));

        let region = Region::decode(&body).unwrap();
        assert_eq!(
            region.rects,
            vec![TileRect::new(0, 0, 2, 2), TileRect::new(10, 10, 1, 1)]
        );
        assert_eq!(region.grid().count(), 5);
    }

    #[test]
    fn test_padding_bytes_not_inspected() {
        let body = b"rNAM\x01\x00\x00\x00a\xEE\xEE\xEE";
        assert_eq!(Region::decode(body).unwrap().name, "a");
    }

    #[test]
    fn test_auto_warp_default_is_map_centre() {
        assert_eq!(
            AutoWarp::default(),
            AutoWarp {
                x: 512,
                y: 512,
                arena: None
            }
        );
        let parsed: AutoWarp = ron::from_str("(arena: Some(\"duel\"))").unwrap();
        assert_eq!((parsed.x, parsed.y), (512, 512));
    }

    #[test]
    fn test_last_name_wins() {
        let mut body = Vec::new();
        for name in [&b"one\0"[..], &b"two\0"[..]] {
            let mut buf = ByteBuffer::with_len(12);
            write_chunk(&mut buf, &TAG_NAME, name);
            body.extend(buf.into_inner());
        }
        assert_eq!(Region::decode(&body).unwrap().name, "two");
    }

    #[test]
    fn test_ron_round_trip() {
        let region = sample_region();
        let text = ron::to_string(&region).unwrap();
        let parsed: Region = ron::from_str(&text).unwrap();
        assert_eq!(parsed, region);
    }
}
