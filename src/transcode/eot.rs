//! Embedded OpenType (version 0x00020001) wrapper around the TTF.

use anyhow::{anyhow, Result};

use super::sfnt::{read_u16, read_u32, Sfnt};
use super::ttf::build_ttf;
use super::Transcoder;
use crate::svg_font::VectorFontDocument;

const EOT_VERSION: u32 = 0x0002_0001;
const EOT_MAGIC: u16 = 0x504C;
const DEFAULT_CHARSET: u8 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct EotTranscoder;

impl Transcoder for EotTranscoder {
    fn transcode(&self, doc: &VectorFontDocument) -> Result<Vec<u8>> {
        let font = doc.parse()?;
        let ttf = build_ttf(&font)?;
        let names = EotNames {
            family: &font.family,
            style: "Regular",
            version: "Version 1.0",
            full: &font.family,
        };
        ttf_to_eot(&ttf, &names)
    }
}

/// Name strings copied into the EOT header
pub struct EotNames<'a> {
    pub family: &'a str,
    pub style: &'a str,
    pub version: &'a str,
    pub full: &'a str,
}

/// Prefix a TTF with an EOT header.
///
/// All header fields are little-endian; the OS/2 and head values are copied
/// from the font's own tables.
pub fn ttf_to_eot(ttf: &[u8], names: &EotNames) -> Result<Vec<u8>> {
    let sfnt = Sfnt::parse(ttf)?;
    let os2 = sfnt
        .table(b"OS/2")
        .ok_or_else(|| anyhow!("font has no OS/2 table"))?;
    let head = sfnt
        .table(b"head")
        .ok_or_else(|| anyhow!("font has no head table"))?;

    let panose = os2
        .get(32..42)
        .ok_or_else(|| anyhow!("OS/2 table too short"))?;
    let weight = read_u16(os2, 4)?;
    let fs_type = read_u16(os2, 8)?;
    let fs_selection = read_u16(os2, 62)?;
    let italic = u8::from(fs_selection & 0x01 != 0);
    let unicode_ranges = [
        read_u32(os2, 42)?,
        read_u32(os2, 46)?,
        read_u32(os2, 50)?,
        read_u32(os2, 54)?,
    ];
    let code_pages = if read_u16(os2, 0)? >= 1 {
        [read_u32(os2, 78)?, read_u32(os2, 82)?]
    } else {
        [0, 0]
    };
    let checksum_adjustment = read_u32(head, 8)?;

    let mut out = Vec::with_capacity(ttf.len() + 256);
    out.extend_from_slice(&0u32.to_le_bytes()); // EOTSize, patched below
    out.extend_from_slice(&(ttf.len() as u32).to_le_bytes());
    out.extend_from_slice(&EOT_VERSION.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // flags
    out.extend_from_slice(panose);
    out.push(DEFAULT_CHARSET);
    out.push(italic);
    out.extend_from_slice(&(weight as u32).to_le_bytes());
    out.extend_from_slice(&fs_type.to_le_bytes());
    out.extend_from_slice(&EOT_MAGIC.to_le_bytes());
    for range in unicode_ranges {
        out.extend_from_slice(&range.to_le_bytes());
    }
    for range in code_pages {
        out.extend_from_slice(&range.to_le_bytes());
    }
    out.extend_from_slice(&checksum_adjustment.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]); // reserved 1-4

    for name in [names.family, names.style, names.version, names.full] {
        out.extend_from_slice(&0u16.to_le_bytes()); // padding
        write_name(&mut out, name)?;
    }
    out.extend_from_slice(&0u16.to_le_bytes()); // padding
    out.extend_from_slice(&0u16.to_le_bytes()); // root string size

    out.extend_from_slice(ttf);

    let size = (out.len() as u32).to_le_bytes();
    out[0..4].copy_from_slice(&size);

    Ok(out)
}

/// Size-prefixed UTF-16LE string
fn write_name(out: &mut Vec<u8>, name: &str) -> Result<()> {
    let encoded: Vec<u8> = name.encode_utf16().flat_map(u16::to_le_bytes).collect();
    let size = u16::try_from(encoded.len())
        .map_err(|_| anyhow!("name of {} bytes is too long for an EOT header", encoded.len()))?;
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&encoded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcode::tests::sample_document;

    fn le_u32(data: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    }

    #[test]
    fn test_eot_header_wraps_ttf() {
        let eot = EotTranscoder.transcode(&sample_document()).unwrap();

        assert_eq!(le_u32(&eot, 0) as usize, eot.len());
        let font_size = le_u32(&eot, 4) as usize;
        assert_eq!(le_u32(&eot, 8), EOT_VERSION);
        assert_eq!(u16::from_le_bytes([eot[34], eot[35]]), EOT_MAGIC);

        let ttf = &eot[eot.len() - font_size..];
        assert_eq!(&ttf[0..4], &[0, 1, 0, 0]);
    }

    #[test]
    fn test_name_is_utf16() {
        let mut out = Vec::new();
        write_name(&mut out, "Ab").unwrap();
        assert_eq!(out, vec![4, 0, b'A', 0, b'b', 0]);

        let long = "x".repeat(40_000);
        assert!(write_name(&mut Vec::new(), &long).is_err());
    }
}
