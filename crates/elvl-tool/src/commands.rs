//! Subcommand implementations.

use std::path::{Path, PathBuf};

use elvl_config::Config;
use elvl_region::{Region, chunk};

use crate::error::ToolError;

fn read_file(path: &Path) -> Result<Vec<u8>, ToolError> {
    std::fs::read(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ToolError> {
    std::fs::write(path, bytes).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes region bytes, with or without the outer `REGN` header.
pub fn decode_bytes(path: &Path, bytes: &[u8], config: &Config) -> Result<Region, ToolError> {
    let decoded = if config.codec.super_chunk {
        Region::decode_super_chunk(bytes)
    } else {
        Region::decode(bytes)
    };
    decoded.map_err(|source| ToolError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encodes a region, adding the outer `REGN` header if configured.
pub fn encode_bytes(region: &Region, config: &Config) -> Vec<u8> {
    if config.codec.super_chunk {
        region.encode_super_chunk()
    } else {
        region.encode()
    }
}

/// Reads and decodes a region file.
pub fn read_region(path: &Path, config: &Config) -> Result<Region, ToolError> {
    let bytes = read_file(path)?;
    tracing::debug!(path = %path.display(), len = bytes.len(), "read region file");
    decode_bytes(path, &bytes, config)
}

/// One-screen description of a region.
pub fn summary(region: &Region) -> String {
    let flags: Vec<&str> = [
        (region.is_base, "base"),
        (region.is_no_flags, "no-flags"),
        (region.is_no_weapons, "no-weapons"),
        (region.is_no_anti_warp, "no-antiwarp"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();

    let warp = match &region.auto_warp {
        Some(warp) => match &warp.arena {
            Some(arena) => format!("({}, {}) in arena {arena:?}", warp.x, warp.y),
            None => format!("({}, {})", warp.x, warp.y),
        },
        None => "none".to_string(),
    };

    let unknown: Vec<String> = region
        .unknown_chunks
        .iter()
        .map(|c| format!("{} ({} bytes)", chunk::tag_str(&c.tag), c.payload.len()))
        .collect();

    let mut lines = vec![
        format!("name:           {:?}", region.name),
        format!(
            "flags:          {}",
            if flags.is_empty() { "none".to_string() } else { flags.join(", ") }
        ),
        format!("auto-warp:      {warp}"),
        format!("rectangles:     {}", region.rects.len()),
        format!("cells:          {}", region.grid().count()),
        format!("unknown chunks: {}", unknown.len()),
    ];
    lines.extend(unknown.into_iter().map(|u| format!("  {u}")));
    lines.join("\n")
}

/// Renders a region as RON, dropping whatever the output settings exclude.
pub fn to_ron(region: &Region, config: &Config) -> Result<String, ToolError> {
    let mut region = region.clone();
    if !config.output.include_rectangles {
        region.rects.clear();
    }
    if !config.output.include_unknown_chunks {
        region.unknown_chunks.clear();
    }
    let text = if config.output.pretty {
        ron::ser::to_string_pretty(&region, ron::ser::PrettyConfig::new())
    } else {
        ron::to_string(&region)
    };
    text.map_err(ToolError::Serialize)
}

/// Parses a region from RON text.
pub fn from_ron(path: &Path, text: &str) -> Result<Region, ToolError> {
    ron::from_str(text).map_err(|source| ToolError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Fields that differ between two decodings of the same region.
pub fn differences(before: &Region, after: &Region) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if before.name != after.name {
        fields.push("name");
    }
    if (
        before.is_base,
        before.is_no_flags,
        before.is_no_weapons,
        before.is_no_anti_warp,
    ) != (
        after.is_base,
        after.is_no_flags,
        after.is_no_weapons,
        after.is_no_anti_warp,
    ) {
        fields.push("flags");
    }
    if before.auto_warp != after.auto_warp {
        fields.push("auto-warp");
    }
    if before.unknown_chunks != after.unknown_chunks {
        fields.push("unknown chunks");
    }
    if !before.same_cells(after) {
        fields.push("tiles");
    }
    fields
}

/// `inspect <FILE>`
pub fn inspect(file: &Path, config: &Config) -> Result<String, ToolError> {
    Ok(summary(&read_region(file, config)?))
}

/// `decode <FILE> [-o OUT]`. Returns the RON text when no output path is
/// given.
pub fn decode(
    file: &Path,
    output: Option<&Path>,
    config: &Config,
) -> Result<Option<String>, ToolError> {
    let text = to_ron(&read_region(file, config)?, config)?;
    match output {
        Some(out) => {
            write_file(out, text.as_bytes())?;
            tracing::info!(out = %out.display(), "wrote RON");
            Ok(None)
        }
        None => Ok(Some(text)),
    }
}

/// `encode <RON> -o <OUT>`
pub fn encode(input: &Path, output: &Path, config: &Config) -> Result<(), ToolError> {
    let text = std::fs::read_to_string(input).map_err(|source| ToolError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let region = from_ron(input, &text)?;
    let bytes = encode_bytes(&region, config);
    write_file(output, &bytes)?;
    tracing::info!(out = %output.display(), len = bytes.len(), "wrote region");
    Ok(())
}

/// `roundtrip <FILE>`. Returns a one-line report on success.
pub fn roundtrip(file: &Path, config: &Config) -> Result<String, ToolError> {
    let original = read_file(file)?;
    let first = decode_bytes(file, &original, config)?;
    let encoded = encode_bytes(&first, config);
    let second = decode_bytes(file, &encoded, config)?;

    let fields = differences(&first, &second);
    if !fields.is_empty() {
        return Err(ToolError::RoundTripMismatch {
            path: PathBuf::from(file),
            fields,
        });
    }
    let identical = if encoded == original {
        "byte-identical"
    } else {
        "re-encoded differently"
    };
    Ok(format!(
        "{}: ok, {} -> {} bytes, {identical}",
        file.display(),
        original.len(),
        encoded.len()
    ))
}
