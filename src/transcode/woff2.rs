//! WOFF 2.0 wrapper around the TTF.
//!
//! Tables are stored with the null transform (glyf and loca included) and
//! compressed together as one Brotli stream.

use std::io::Write;

use anyhow::{Context, Result};

use super::sfnt::{pad4, Sfnt, SfntTable};
use super::ttf::build_ttf;
use super::Transcoder;
use crate::svg_font::VectorFontDocument;

const WOFF2_SIGNATURE: u32 = 0x774F_4632; // 'wOF2'
const HEADER_SIZE: usize = 48;

/// Transform version that marks glyf and loca as untransformed
const NULL_TRANSFORM_GLYF_LOCA: u8 = 3;

/// Flag value announcing an explicit tag after the flags byte
const ARBITRARY_TAG: u8 = 63;

/// Tags with a one-byte encoding in the table directory, by index.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

#[derive(Debug, Clone, Copy)]
pub struct Woff2Transcoder {
    /// Brotli quality, 0..=11
    pub quality: u32,
}

impl Default for Woff2Transcoder {
    fn default() -> Self {
        Self { quality: 11 }
    }
}

impl Transcoder for Woff2Transcoder {
    fn transcode(&self, doc: &VectorFontDocument) -> Result<Vec<u8>> {
        let ttf = build_ttf(&doc.parse()?)?;
        ttf_to_woff2(&ttf, self.quality)
    }
}

/// Wrap a TTF in a WOFF2 container.
pub fn ttf_to_woff2(ttf: &[u8], quality: u32) -> Result<Vec<u8>> {
    let sfnt = Sfnt::parse(ttf)?;
    let tables = directory_order(&sfnt.tables);

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for table in &tables {
        write_directory_entry(&mut directory, table);
        stream.extend_from_slice(table.data);
    }

    let compressed = brotli_compress(&stream, quality).context("Brotli compression failed")?;

    let mut body = Vec::with_capacity(directory.len() + compressed.len() + 3);
    body.extend_from_slice(&directory);
    body.extend_from_slice(&compressed);

    let mut out = Vec::with_capacity(HEADER_SIZE + body.len() + 3);
    out.extend_from_slice(&WOFF2_SIGNATURE.to_be_bytes());
    out.extend_from_slice(&sfnt.flavor.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // length, patched below
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&sfnt.total_sfnt_size().to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // major version
    out.extend_from_slice(&0u16.to_be_bytes()); // minor version
    out.extend_from_slice(&[0u8; 20]); // no metadata or private data
    out.extend_from_slice(&body);
    pad4(&mut out);

    let length = (out.len() as u32).to_be_bytes();
    out[8..12].copy_from_slice(&length);

    Ok(out)
}

/// Tag order, except that loca directly follows glyf
fn directory_order<'s, 'a>(tables: &'s [SfntTable<'a>]) -> Vec<&'s SfntTable<'a>> {
    let mut ordered: Vec<&SfntTable> = tables.iter().filter(|t| &t.tag != b"loca").collect();
    if let Some(loca) = tables.iter().find(|t| &t.tag == b"loca") {
        let at = ordered
            .iter()
            .position(|t| &t.tag == b"glyf")
            .map_or(ordered.len(), |i| i + 1);
        ordered.insert(at, loca);
    }
    ordered
}

fn write_directory_entry(out: &mut Vec<u8>, table: &SfntTable) {
    let transform = if &table.tag == b"glyf" || &table.tag == b"loca" {
        NULL_TRANSFORM_GLYF_LOCA
    } else {
        0
    };

    match KNOWN_TAGS.iter().position(|known| *known == &table.tag) {
        Some(index) => out.push((transform << 6) | index as u8),
        None => {
            out.push((transform << 6) | ARBITRARY_TAG);
            out.extend_from_slice(&table.tag);
        }
    }
    write_uint_base128(out, table.data.len() as u32);
}

/// Variable-length big-endian base-128 integer, 7 bits per byte
fn write_uint_base128(out: &mut Vec<u8>, mut value: u32) {
    let mut bytes = [0u8; 5];
    let mut len = 0;
    loop {
        bytes[len] = (value & 0x7F) as u8;
        len += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(bytes[i] | continuation);
    }
}

fn brotli_compress(data: &[u8], quality: u32) -> Result<Vec<u8>> {
    let mut compressed = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, quality.min(11), 22);
        writer.write_all(data)?;
        writer.flush()?;
    }
    Ok(compressed)
}
