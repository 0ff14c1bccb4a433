//! Collects SVG icons from the filesystem.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use walkdir::WalkDir;

use crate::svg_parser::IconSource;

/// How icon names are derived from file names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IconNaming {
    /// File stem as is
    #[default]
    FileStem,
    /// File stem converted to a snake_case identifier
    SnakeCase,
}

impl IconNaming {
    pub fn name_for(self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self {
            IconNaming::FileStem => stem,
            IconNaming::SnakeCase => filename_to_identifier(&stem),
        }
    }
}

/// Read icons from a mix of directories and files.
///
/// Directories contribute their `*.svg` files sorted by file name; explicit
/// files keep the order they were given in.
pub fn collect_icons(inputs: &[PathBuf], naming: IconNaming) -> Result<Vec<IconSource>> {
    let mut icons = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for path in svg_files_in(input)? {
                icons.push(read_icon(&path, naming)?);
            }
        } else {
            icons.push(read_icon(input, naming)?);
        }
    }
    Ok(icons)
}

/// `*.svg` files directly inside `dir`, sorted by file name
pub fn svg_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let is_svg = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if is_svg {
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));
    Ok(entries.into_iter().map(|e| e.into_path()).collect())
}

fn read_icon(path: &Path, naming: IconNaming) -> Result<IconSource> {
    let markup = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = naming.name_for(path);
    debug!("Read {} as '{name}'", path.display());
    Ok(IconSource::new(name, markup))
}

/// Convert a file stem to a snake_case identifier
/// (e.g. "arrow_down_filled" from "arrowDown-filled").
pub fn filename_to_identifier(filename: &str) -> String {
    let mut result = String::new();
    let mut prev_lower = false;

    for c in filename.chars() {
        if c == '-' || c == ' ' || c == '.' {
            result.push('_');
            prev_lower = false;
        } else if c.is_uppercase() && prev_lower {
            result.push('_');
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            result.push(c.to_ascii_lowercase());
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    // Class names must not start with a digit
    if result.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        result = format!("icon_{result}");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"/>"#;

    #[test]
    fn test_filename_to_identifier() {
        assert_eq!(
            filename_to_identifier("arrowDown-filled"),
            "arrow_down_filled"
        );
        assert_eq!(
            filename_to_identifier("Appliance-stroke"),
            "appliance_stroke"
        );
        assert_eq!(filename_to_identifier("Bank filled"), "bank_filled");
        assert_eq!(filename_to_identifier("123icon"), "icon_123icon");
    }

    #[test]
    fn test_directory_sorted_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let icons_dir = dir.path().join("icons");
        fs::create_dir(&icons_dir).unwrap();
        fs::write(icons_dir.join("b.svg"), SVG).unwrap();
        fs::write(icons_dir.join("a.svg"), SVG).unwrap();
        fs::write(icons_dir.join("notes.txt"), "skip").unwrap();
        fs::create_dir(icons_dir.join("nested")).unwrap();
        fs::write(icons_dir.join("nested").join("c.svg"), SVG).unwrap();

        let extra = dir.path().join("zzz-extra.svg");
        let first = dir.path().join("first.svg");
        fs::write(&extra, SVG).unwrap();
        fs::write(&first, SVG).unwrap();

        let icons = collect_icons(
            &[extra.clone(), icons_dir, first.clone()],
            IconNaming::FileStem,
        )
        .unwrap();
        let names: Vec<_> = icons.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["zzz-extra", "a", "b", "first"]);
        assert_eq!(icons[1].markup, SVG);
    }

    #[test]
    fn test_snake_case_naming() {
        assert_eq!(
            IconNaming::SnakeCase.name_for(Path::new("dir/arrowLeft.svg")),
            "arrow_left"
        );
        assert_eq!(
            IconNaming::FileStem.name_for(Path::new("dir/arrowLeft.svg")),
            "arrowLeft"
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.svg");
        assert!(collect_icons(&[missing], IconNaming::FileStem).is_err());
    }
}
