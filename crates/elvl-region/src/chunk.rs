//! The chunk container inside a `REGN` super-chunk.
//!
//! ## Binary Layout
//!
//! A super-chunk body is a sequence of sub-chunks:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | ASCII tag, e.g. `rNAM` |
//! | 4 | 4 | Payload length `N` (`u32`, little-endian) |
//! | 8 | N | Payload |
//! | 8+N | 0..=3 | Zero padding to the next 4-byte boundary |
//!
//! Padding is not counted in `N`.

use serde::{Deserialize, Serialize};

use elvl_bytes::{ByteBuffer, ByteReader, CursorWrite, decode_latin1};

use crate::error::DecodeError;
use crate::grid::TileGrid;
use crate::region::{ARENA_NAME_MAX, AutoWarp};
use crate::rle;

/// A four-byte chunk tag.
pub type Tag = [u8; 4];

/// Region is a base in flag games.
pub const TAG_BASE: Tag = *b"rBSE";
/// Antiwarp is disabled inside the region.
pub const TAG_NO_ANTI_WARP: Tag = *b"rNAW";
/// Weapons are disabled inside the region.
pub const TAG_NO_WEAPONS: Tag = *b"rNWP";
/// Flags cannot be dropped inside the region.
pub const TAG_NO_FLAGS: Tag = *b"rNFL";
/// Entering the region warps the player.
pub const TAG_AUTO_WARP: Tag = *b"rAWP";
/// Region name.
pub const TAG_NAME: Tag = *b"rNAM";
/// Run-length compressed tile data.
pub const TAG_TILES: Tag = *b"rTIL";
/// The outer super-chunk holding one region.
pub const TAG_REGION: Tag = *b"REGN";

/// Tag plus length.
pub const HEADER_LEN: usize = 8;

/// Size of an `rAWP` payload without an arena name.
pub const AUTO_WARP_SHORT_LEN: usize = 4;
/// Size of an `rAWP` payload with an arena name field.
pub const AUTO_WARP_LONG_LEN: usize = 20;
const ARENA_FIELD_LEN: usize = AUTO_WARP_LONG_LEN - AUTO_WARP_SHORT_LEN;

/// Zero bytes needed after a payload of `len` bytes.
pub fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Bytes a chunk with a `len`-byte payload occupies, header and padding
/// included.
pub fn chunk_len(len: usize) -> usize {
    HEADER_LEN + len + padding(len)
}

/// Renders a tag for logs and error messages.
pub fn tag_str(tag: &Tag) -> String {
    decode_latin1(tag)
}

/// Trims the way region text has always been read: leading and trailing
/// spaces and control characters go.
fn trim_text(text: &str) -> String {
    text.trim_matches(|c: char| c <= ' ').to_string()
}

/// A chunk as stored: tag and payload, padding already skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    /// Chunk tag.
    pub tag: Tag,
    /// Payload bytes.
    pub payload: &'a [u8],
}

/// Splits a super-chunk body into chunks.
///
/// Yields an error at most once, then stops.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    reader: ByteReader<'a>,
    failed: bool,
}

impl<'a> ChunkReader<'a> {
    /// Creates a reader over a super-chunk body.
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(body),
            failed: false,
        }
    }

    fn read_chunk(&mut self) -> Result<RawChunk<'a>, DecodeError> {
        let offset = self.reader.position();
        let declared = self.reader.get_ref().len();
        if self.reader.remaining() < HEADER_LEN {
            return Err(DecodeError::TruncatedHeader {
                offset,
                remaining: self.reader.remaining(),
            });
        }

        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.reader.take(4));
        let len = self.reader.read_u32_le() as usize;

        let end = offset + HEADER_LEN + len;
        let padded_end = end + padding(len);
        if padded_end > declared {
            return Err(DecodeError::TrailingOrOverrunData {
                consumed: padded_end,
                declared,
            });
        }

        let payload = self.reader.take(len);
        self.reader.skip(padding(len));
        Ok(RawChunk { tag, payload })
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<RawChunk<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_at_end() {
            return None;
        }
        let chunk = self.read_chunk();
        self.failed = chunk.is_err();
        Some(chunk)
    }
}

/// Collects chunks and lays them out in one pre-sized buffer.
#[derive(Debug, Default)]
pub struct ChunkWriter {
    chunks: Vec<(Tag, Vec<u8>)>,
}

impl ChunkWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk.
    pub fn push(&mut self, tag: Tag, payload: Vec<u8>) {
        tracing::debug!(tag = %tag_str(&tag), len = payload.len(), "encoding chunk");
        self.chunks.push((tag, payload));
    }

    /// Total size of the encoded body.
    pub fn encoded_len(&self) -> usize {
        self.chunks.iter().map(|(_, p)| chunk_len(p.len())).sum()
    }

    /// Writes every chunk, padded, into a single body.
    pub fn finish(self) -> Vec<u8> {
        let mut buf = ByteBuffer::with_len(self.encoded_len());
        for (tag, payload) in &self.chunks {
            write_chunk(&mut buf, tag, payload);
        }
        buf.into_inner()
    }
}

/// Writes one chunk (header, payload, padding) at the cursor.
pub fn write_chunk<W: CursorWrite>(out: &mut W, tag: &Tag, payload: &[u8]) {
    out.put_bytes(tag);
    out.put_u32_le(payload.len() as u32);
    out.put_bytes(payload);
    out.put_zeros(padding(payload.len()));
}

/// A chunk the codec does not interpret, kept so it can be written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownChunk {
    /// Chunk tag.
    pub tag: Tag,
    /// Payload, without padding.
    pub payload: Vec<u8>,
}

/// A recognized region field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionField {
    /// `rBSE`, zero length.
    Base,
    /// `rNAW`, zero length.
    NoAntiWarp,
    /// `rNWP`, zero length.
    NoWeapons,
    /// `rNFL`, zero length.
    NoFlags,
    /// `rAWP`, 4 or 20 bytes.
    AutoWarp(AutoWarp),
    /// `rNAM`.
    Name(String),
    /// `rTIL`.
    Tiles(TileGrid),
}

/// One decoded chunk of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionChunk {
    /// A chunk the codec understands.
    Field(RegionField),
    /// Anything else, carried through opaquely.
    Unknown(UnknownChunk),
}

impl RegionChunk {
    /// Interprets a raw chunk.
    ///
    /// Flag tags with a non-zero length and `rAWP` chunks of any length other
    /// than 4 or 20 are not recognized fields and come back as
    /// [`RegionChunk::Unknown`].
    pub fn parse(raw: RawChunk<'_>) -> Result<Self, DecodeError> {
        let field = match (raw.tag, raw.payload.len()) {
            (TAG_BASE, 0) => RegionField::Base,
            (TAG_NO_ANTI_WARP, 0) => RegionField::NoAntiWarp,
            (TAG_NO_WEAPONS, 0) => RegionField::NoWeapons,
            (TAG_NO_FLAGS, 0) => RegionField::NoFlags,
            (TAG_AUTO_WARP, AUTO_WARP_SHORT_LEN | AUTO_WARP_LONG_LEN) => {
                RegionField::AutoWarp(parse_auto_warp(raw.payload))
            }
            (TAG_NAME, _) => RegionField::Name(trim_text(&decode_latin1(raw.payload))),
            (TAG_TILES, _) => RegionField::Tiles(rle::decompress(raw.payload)?),
            _ => {
                return Ok(Self::Unknown(UnknownChunk {
                    tag: raw.tag,
                    payload: raw.payload.to_vec(),
                }));
            }
        };
        Ok(Self::Field(field))
    }

    /// Tag and payload for this chunk.
    pub fn to_raw(&self) -> (Tag, Vec<u8>) {
        match self {
            Self::Field(field) => field.to_raw(),
            Self::Unknown(chunk) => (chunk.tag, chunk.payload.clone()),
        }
    }
}

impl RegionField {
    /// Tag and payload for this field.
    pub fn to_raw(&self) -> (Tag, Vec<u8>) {
        match self {
            Self::Base => (TAG_BASE, Vec::new()),
            Self::NoAntiWarp => (TAG_NO_ANTI_WARP, Vec::new()),
            Self::NoWeapons => (TAG_NO_WEAPONS, Vec::new()),
            Self::NoFlags => (TAG_NO_FLAGS, Vec::new()),
            Self::AutoWarp(warp) => (TAG_AUTO_WARP, auto_warp_payload(warp)),
            Self::Name(name) => {
                let mut buf = ByteBuffer::with_len(name.chars().count());
                buf.put_latin1(name);
                (TAG_NAME, buf.into_inner())
            }
            Self::Tiles(grid) => (TAG_TILES, rle::compress(grid)),
        }
    }
}

fn parse_auto_warp(payload: &[u8]) -> AutoWarp {
    let mut reader = ByteReader::new(payload);
    let x = reader.read_u16_le();
    let y = reader.read_u16_le();
    let arena = if reader.remaining() >= ARENA_FIELD_LEN {
        Some(trim_text(&reader.read_cstr(ARENA_FIELD_LEN))).filter(|name| !name.is_empty())
    } else {
        None
    };
    AutoWarp { x, y, arena }
}

fn auto_warp_payload(warp: &AutoWarp) -> Vec<u8> {
    match warp.arena.as_deref().filter(|name| !name.is_empty()) {
        Some(arena) => {
            if arena.chars().count() > ARENA_NAME_MAX {
                tracing::warn!(arena, "arena name cut to {ARENA_NAME_MAX} characters");
            }
            let arena: String = arena.chars().take(ARENA_NAME_MAX).collect();
            let mut buf = ByteBuffer::with_len(AUTO_WARP_LONG_LEN);
            buf.put_u16_le(warp.x);
            buf.put_u16_le(warp.y);
            buf.put_padded_latin1(&arena, ARENA_FIELD_LEN);
            buf.into_inner()
        }
        None => {
            let mut buf = ByteBuffer::with_len(AUTO_WARP_SHORT_LEN);
            buf.put_u16_le(warp.x);
            buf.put_u16_le(warp.y);
            buf.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(tag: &Tag, payload: &[u8]) -> Vec<u8> {
        let mut buf = ByteBuffer::with_len(chunk_len(payload.len()));
        write_chunk(&mut buf, tag, payload);
        buf.into_inner()
    }

    #[test]
    fn test_padding() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 3);
        assert_eq!(padding(3), 1);
        assert_eq!(padding(4), 0);
        assert_eq!(padding(5), 3);
        assert_eq!(chunk_len(5), 16);
    }

    #[test]
    fn test_chunk_layout() {
        assert_eq!(
            chunk(b"rNAM", b"abcde"),
            b"rNAM\x05\x00\x00\x00abcde\x00\x00\x00".to_vec()
        );
    }

    #[test]
    fn test_reader_splits_chunks() {
        let mut body = chunk(&TAG_BASE, &[]);
        body.extend(chunk(b"xTRA", b"abc"));
        body.extend(chunk(&TAG_NAME, b"four"));

        let chunks: Vec<_> = ChunkReader::new(&body).collect::<Result<_, _>>().unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], RawChunk { tag: TAG_BASE, payload: &[] });
        assert_eq!(chunks[1].tag, *b"xTRA");
        assert_eq!(chunks[1].payload, b"abc");
        assert_eq!(chunks[2].payload, b"four");
    }

    #[test]
    fn test_short_header_fails_once() {
        let mut body = chunk(&TAG_BASE, &[]);
        body.extend_from_slice(b"rNA");
        let mut reader = ChunkReader::new(&body);
        assert!(reader.next().unwrap().is_ok());
        assert_eq!(
            reader.next(),
            Some(Err(DecodeError::TruncatedHeader {
                offset: 8,
                remaining: 3
            }))
        );
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_payload_overrun() {
        let mut body = b"rNAM\x10\x00\x00\x00".to_vec();
        body.extend_from_slice(b"short");
        assert_eq!(
            ChunkReader::new(&body).next(),
            Some(Err(DecodeError::TrailingOrOverrunData {
                consumed: 24,
                declared: 13
            }))
        );
    }

    #[test]
    fn test_missing_padding_is_overrun() {
        let body = b"rNAM\x01\x00\x00\x00a".to_vec();
        assert_eq!(
            ChunkReader::new(&body).next(),
            Some(Err(DecodeError::TrailingOrOverrunData {
                consumed: 12,
                declared: 9
            }))
        );
    }

    #[test]
    fn test_flag_with_payload_is_unknown() {
        let raw = RawChunk {
            tag: TAG_BASE,
            payload: &[1, 2, 3, 4],
        };
        assert_eq!(
            RegionChunk::parse(raw).unwrap(),
            RegionChunk::Unknown(UnknownChunk {
                tag: TAG_BASE,
                payload: vec![1, 2, 3, 4]
            })
        );
    }

    #[test]
    fn test_auto_warp_forms() {
        let short = RegionField::AutoWarp(AutoWarp {
            x: 100,
            y: 900,
            arena: None,
        });
        let (tag, payload) = short.to_raw();
        assert_eq!(tag, TAG_AUTO_WARP);
        assert_eq!(payload, vec![100, 0, 0x84, 0x03]);

        let long = RegionField::AutoWarp(AutoWarp {
            x: 1,
            y: 2,
            arena: Some("duel".to_string()),
        });
        let (_, payload) = long.to_raw();
        assert_eq!(payload.len(), AUTO_WARP_LONG_LEN);
        assert_eq!(&payload[4..8], b"duel");
        assert!(payload[8..].iter().all(|&b| b == 0));

        let parsed = RegionChunk::parse(RawChunk {
            tag: TAG_AUTO_WARP,
            payload: &payload,
        })
        .unwrap();
        assert_eq!(parsed, RegionChunk::Field(long));
    }

    #[test]
    fn test_long_arena_name_keeps_first_fifteen() {
        let field = RegionField::AutoWarp(AutoWarp {
            x: 0,
            y: 0,
            arena: Some("abcdefghijklmnopqrst".to_string()),
        });
        let (_, payload) = field.to_raw();
        assert_eq!(&payload[4..19], b"abcdefghijklmno");
        assert_eq!(payload[19], 0);
    }

    #[test]
    fn test_empty_arena_field_is_none() {
        let payload = [5, 0, 6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let parsed = RegionChunk::parse(RawChunk {
            tag: TAG_AUTO_WARP,
            payload: &payload,
        })
        .unwrap();
        assert_eq!(
            parsed,
            RegionChunk::Field(RegionField::AutoWarp(AutoWarp {
                x: 5,
                y: 6,
                arena: None
            }))
        );
    }

    #[test]
    fn test_odd_auto_warp_length_is_unknown() {
        let parsed = RegionChunk::parse(RawChunk {
            tag: TAG_AUTO_WARP,
            payload: &[1, 2, 3, 4, 5, 6, 7, 8],
        })
        .unwrap();
        assert!(matches!(parsed, RegionChunk::Unknown(_)));
    }

    #[test]
    fn test_name_is_trimmed() {
        let parsed = RegionChunk::parse(RawChunk {
            tag: TAG_NAME,
            payload: b"  flag room\0",
        })
        .unwrap();
        assert_eq!(
            parsed,
            RegionChunk::Field(RegionField::Name("flag room".to_string()))
        );
    }

    #[test]
    fn test_bad_tile_payload_fails() {
        let parsed = RegionChunk::parse(RawChunk {
            tag: TAG_TILES,
            payload: &[0xC0],
        });
        assert_eq!(parsed, Err(DecodeError::RepeatOnFirstRow));
    }
}
