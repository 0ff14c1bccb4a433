//! WOFF 1.0 wrapper around the TTF.

use std::io::Write;

use anyhow::{Context, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::sfnt::{pad4, Sfnt};
use super::ttf::build_ttf;
use super::Transcoder;
use crate::svg_font::VectorFontDocument;

const WOFF_SIGNATURE: u32 = 0x774F_4646; // 'wOFF'
const HEADER_SIZE: usize = 44;
const DIRECTORY_ENTRY_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct WoffTranscoder;

impl Transcoder for WoffTranscoder {
    fn transcode(&self, doc: &VectorFontDocument) -> Result<Vec<u8>> {
        let ttf = build_ttf(&doc.parse()?)?;
        ttf_to_woff(&ttf)
    }
}

/// Wrap a TTF in a WOFF container.
///
/// Each table is zlib-compressed unless that does not make it smaller, in
/// which case it is stored as is.
pub fn ttf_to_woff(ttf: &[u8]) -> Result<Vec<u8>> {
    let sfnt = Sfnt::parse(ttf)?;
    let num_tables = sfnt.tables.len();

    let data_start = HEADER_SIZE + num_tables * DIRECTORY_ENTRY_SIZE;
    let mut directory = Vec::with_capacity(num_tables * DIRECTORY_ENTRY_SIZE);
    let mut body = Vec::new();

    for table in &sfnt.tables {
        let compressed = compress(table.data).with_context(|| {
            format!("Failed to compress '{}'", String::from_utf8_lossy(&table.tag))
        })?;
        let stored: &[u8] = if compressed.len() < table.data.len() {
            &compressed
        } else {
            table.data
        };

        directory.extend_from_slice(&table.tag);
        directory.extend_from_slice(&((data_start + body.len()) as u32).to_be_bytes());
        directory.extend_from_slice(&(stored.len() as u32).to_be_bytes());
        directory.extend_from_slice(&(table.data.len() as u32).to_be_bytes());
        directory.extend_from_slice(&table.checksum.to_be_bytes());

        body.extend_from_slice(stored);
        pad4(&mut body);
    }

    let length = HEADER_SIZE + directory.len() + body.len();

    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(&WOFF_SIGNATURE.to_be_bytes());
    out.extend_from_slice(&sfnt.flavor.to_be_bytes());
    out.extend_from_slice(&(length as u32).to_be_bytes());
    out.extend_from_slice(&(num_tables as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&sfnt.total_sfnt_size().to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // major version
    out.extend_from_slice(&0u16.to_be_bytes()); // minor version
    out.extend_from_slice(&[0u8; 20]); // no metadata or private data
    out.extend_from_slice(&directory);
    out.extend_from_slice(&body);

    Ok(out)
}

fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
