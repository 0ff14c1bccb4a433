//! Codepoint allocation for icons.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::{Error, Result};

/// Start of automatic assignment when none is configured.
pub const DEFAULT_START_CODEPOINT: u32 = 0xF101;

const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Resolved codepoint for every icon, in icon source order.
pub type CodepointAssignment = IndexMap<String, u32>;

/// Assign a unique codepoint to every name in `names`.
///
/// Explicit codepoints are taken as given. Every explicit value is claimed
/// before automatic assignment starts, so an automatically numbered icon
/// never takes a value requested for a later icon. The cursor only moves
/// forward and skips claimed values, surrogates and other characters XML
/// cannot carry.
pub fn assign<'a>(
    names: impl IntoIterator<Item = &'a str>,
    explicit: &IndexMap<String, u32>,
    start: u32,
) -> Result<CodepointAssignment> {
    check_codepoint(start, "start codepoint")?;

    let mut claimed: HashSet<u32> = HashSet::with_capacity(explicit.len());
    let mut owners: IndexMap<u32, &str> = IndexMap::new();
    for (name, &codepoint) in explicit {
        check_codepoint(codepoint, &format!("codepoint for '{name}'"))?;
        if let Some(other) = owners.insert(codepoint, name) {
            return Err(Error::config(format!(
                "icons '{other}' and '{name}' are both mapped to U+{codepoint:04X}"
            )));
        }
        claimed.insert(codepoint);
    }

    let mut assignment = CodepointAssignment::new();
    let mut cursor = start;

    for name in names {
        let codepoint = match explicit.get(name) {
            Some(&codepoint) => codepoint,
            None => {
                while claimed.contains(&cursor)
                    || (cursor <= MAX_CODEPOINT && !is_xml_char(cursor))
                {
                    cursor += 1;
                }
                if cursor > MAX_CODEPOINT {
                    return Err(Error::config(format!(
                        "ran out of codepoints while numbering '{name}'"
                    )));
                }
                let codepoint = cursor;
                claimed.insert(codepoint);
                cursor += 1;
                codepoint
            }
        };
        debug!("{name} -> U+{codepoint:04X}");
        assignment.insert(name.to_string(), codepoint);
    }

    for name in explicit.keys() {
        if !assignment.contains_key(name) {
            warn!("Codepoint given for unknown icon '{name}'");
        }
    }

    Ok(assignment)
}

fn check_codepoint(codepoint: u32, what: &str) -> Result<()> {
    if char::from_u32(codepoint).is_none() {
        return Err(Error::config(format!(
            "{what} 0x{codepoint:X} is not a Unicode scalar value"
        )));
    }
    if !is_xml_char(codepoint) {
        return Err(Error::config(format!(
            "{what} 0x{codepoint:X} cannot appear in an SVG font"
        )));
    }
    Ok(())
}

/// Characters allowed in XML 1.0 documents
fn is_xml_char(codepoint: u32) -> bool {
    matches!(
        codepoint,
        0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=MAX_CODEPOINT
    )
}
