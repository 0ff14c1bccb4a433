//! Writes a generation result to disk.

use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use crate::pipeline::GenerationResult;

/// Write every font, the stylesheet and the preview to their paths.
///
/// Returns the written paths in write order.
pub fn write_outputs(result: &GenerationResult) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (format, data) in &result.artifacts {
        let path = result.font_path(*format);
        write_file(&path, data)?;
        written.push(path);
    }
    if let Some(css) = &result.css {
        let path = result.outputs().css.clone();
        write_file(&path, css)?;
        written.push(path);
    }
    if let Some(html) = &result.html {
        let path = result.outputs().html.clone();
        write_file(&path, html)?;
        written.push(path);
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

/// Write `data` to `path`, creating the parent directory first.
pub fn write_file(path: &Path, data: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent_dir(path)?;
    write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::format::FontFormat;
    use crate::pipeline::generate;
    use crate::svg_parser::IconSource;

    const ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><rect x="2" y="2" width="20" height="20"/></svg>"#;

    #[test]
    fn test_writes_fonts_and_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("fonts");
        let mut config = GenerationConfig::new(
            "icons",
            &dest,
            vec![IconSource::new("square", ICON)],
            vec![FontFormat::Svg, FontFormat::Woff],
        );
        config.html = true;
        config.css_dest = Some(dir.path().join("css").join("icons.css"));

        let result = generate(config).unwrap();
        let written = write_outputs(&result).unwrap();

        assert_eq!(written.len(), 4);
        assert!(dest.join("icons.svg").is_file());
        assert!(dest.join("icons.woff").is_file());
        assert!(dest.join("icons.html").is_file());

        let css = std::fs::read_to_string(dir.path().join("css").join("icons.css")).unwrap();
        assert!(css.contains("url(\"../fonts/icons.woff\")"));
    }
}
