//! Table access for the sfnt wrappers (EOT, WOFF, WOFF2).

use anyhow::{anyhow, Context, Result};
use read_fonts::FontRef;

/// One table of a TrueType font.
pub(super) struct SfntTable<'a> {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub data: &'a [u8],
}

/// A TrueType font split into its tables, sorted by tag.
pub(super) struct Sfnt<'a> {
    pub flavor: u32,
    pub tables: Vec<SfntTable<'a>>,
}

impl<'a> Sfnt<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let font = FontRef::new(data).context("Failed to parse TTF")?;
        let flavor = read_u32(data, 0)?;

        let mut tables = font
            .table_directory
            .table_records()
            .iter()
            .map(|record| {
                let start = record.offset() as usize;
                let end = start + record.length() as usize;
                let bytes = data.get(start..end).ok_or_else(|| {
                    anyhow!("table '{}' lies outside the font data", record.tag())
                })?;
                Ok(SfntTable {
                    tag: record.tag().to_be_bytes(),
                    checksum: record.checksum(),
                    data: bytes,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tables.sort_by_key(|t| t.tag);

        Ok(Self { flavor, tables })
    }

    pub fn table(&self, tag: &[u8; 4]) -> Option<&[u8]> {
        self.tables.iter().find(|t| &t.tag == tag).map(|t| t.data)
    }

    /// Size of the font rebuilt with 4-byte aligned tables
    pub fn total_sfnt_size(&self) -> u32 {
        let header = 12 + 16 * self.tables.len();
        let tables: usize = self.tables.iter().map(|t| padded_len(t.data.len())).sum();
        (header + tables) as u32
    }
}

pub(super) fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub(super) fn pad4(out: &mut Vec<u8>) {
    out.resize(padded_len(out.len()), 0);
}

pub(super) fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| anyhow!("unexpected end of table at offset {offset}"))
}

pub(super) fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| anyhow!("unexpected end of table at offset {offset}"))
}
