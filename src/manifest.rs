use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::codepoints::CodepointAssignment;
use crate::output::write_file;

/// Icon metadata written next to the fonts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest<'a> {
    pub font_family: &'a str,
    pub icons: Vec<ManifestIcon<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ManifestIcon<'a> {
    pub name: &'a str,
    /// Uppercase hex, at least four digits
    pub codepoint: String,
}

impl<'a> Manifest<'a> {
    pub fn new(font_family: &'a str, codepoints: &'a CodepointAssignment) -> Self {
        let icons = codepoints
            .iter()
            .map(|(name, codepoint)| ManifestIcon {
                name,
                codepoint: format!("{codepoint:04X}"),
            })
            .collect();
        Self { font_family, icons }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize manifest")
    }
}

/// Generate a JSON manifest with icon metadata
pub fn write_manifest(
    font_family: &str,
    codepoints: &CodepointAssignment,
    output_path: &Path,
) -> Result<()> {
    let json = Manifest::new(font_family, codepoints).to_json()?;
    write_file(output_path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_json() {
        let codepoints: CodepointAssignment =
            [("home".to_string(), 0xF101), ("a".to_string(), 0x41)]
                .into_iter()
                .collect();
        let json = Manifest::new("icons", &codepoints).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["fontFamily"], "icons");
        assert_eq!(value["icons"][0]["name"], "home");
        assert_eq!(value["icons"][0]["codepoint"], "F101");
        assert_eq!(value["icons"][1]["codepoint"], "0041");
    }
}
