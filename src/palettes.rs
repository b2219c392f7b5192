use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::LoadError;

/// Color-role key to hex-like color value.
pub type ColorMap = BTreeMap<String, String>;

const DEFINITION_EXTENSION: &str = "json";

/// A named set of colors, one per definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: String,
    pub colors: ColorMap,
}

/// Load every palette definition in `folder`, in rotation order.
///
/// Files are sorted by name with numeric-aware, case-insensitive comparison,
/// so `2.json` precedes `10.json`. When `whitelist` is non-empty only those
/// keys are kept. Files that cannot be read or parsed, or end up with no
/// colors, are skipped with a warning.
pub fn load_palettes(folder: &Path, whitelist: &[String]) -> Result<Vec<Palette>, LoadError> {
    if folder.as_os_str().is_empty() {
        return Err(LoadError::FolderUnset);
    }
    if !folder.is_dir() {
        return Err(LoadError::FolderNotFound {
            path: folder.to_path_buf(),
        });
    }

    let files = definition_files(folder)?;
    if files.is_empty() {
        return Err(LoadError::NoDefinitionFiles {
            path: folder.to_path_buf(),
        });
    }

    let mut palettes = Vec::with_capacity(files.len());
    for path in files {
        let name = palette_name(&path);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping unreadable palette file");
                continue;
            }
        };
        match parse_palette(&name, &text, whitelist) {
            Ok(palette) if palette.colors.is_empty() => {
                warn!(file = %path.display(), "skipping palette with no usable colors");
            }
            Ok(palette) => {
                debug!(palette = %palette.name, colors = palette.colors.len(), "loaded palette");
                palettes.push(palette);
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping unparseable palette file");
            }
        }
    }

    if palettes.is_empty() {
        return Err(LoadError::NoUsablePalettes {
            path: folder.to_path_buf(),
        });
    }
    info!(folder = %folder.display(), count = palettes.len(), "palettes loaded");
    Ok(palettes)
}

/// Parse one definition document.
///
/// A nested `colors` object takes precedence over the top level. Only string
/// values are kept.
pub fn parse_palette(
    name: &str,
    text: &str,
    whitelist: &[String],
) -> Result<Palette, serde_json::Error> {
    let doc: Value = serde_json::from_str(text)?;
    let source = match doc.get("colors") {
        Some(Value::Object(nested)) => Some(nested),
        _ => doc.as_object(),
    };

    let colors = source
        .into_iter()
        .flatten()
        .filter(|(key, _)| whitelist.is_empty() || whitelist.iter().any(|w| w == *key))
        .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())))
        .collect();

    Ok(Palette {
        name: name.to_string(),
        colors,
    })
}

fn definition_files(folder: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let read_err = |source| LoadError::ReadFolder {
        path: folder.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(folder).map_err(read_err)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(err) => {
                warn!(folder = %folder.display(), error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        let recognized = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DEFINITION_EXTENSION));
        if recognized && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| {
        let a = a.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        let b = b.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        natural_cmp(&a, &b)
    });
    Ok(files)
}

fn palette_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Numeric-aware, case-insensitive ordering: digit runs compare by value.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_digits(&mut left);
                let rn = take_digits(&mut right);
                let ordering = ln
                    .len()
                    .cmp(&rn.len())
                    .then_with(|| ln.cmp(&rn));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

/// Consume a run of digits, dropping leading zeros.
fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        if !(digits.is_empty() && c == '0') {
            digits.push(c);
        }
    }
    digits
}
