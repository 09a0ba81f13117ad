//! Output file naming

use chrono::NaiveDateTime;
use std::path::PathBuf;

use super::DEFAULT_NAME;

/// Extension used when the name has none
pub const DEFAULT_EXTENSION: &str = "csv";

/// Timestamp inserted before the extension
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

/// Build the output path from a base name and an optional timestamp.
///
/// `"run"` → `run.csv`, `"run.txt"` → `run.txt`, `""` at a fixed clock →
/// `out 2024-03-09 14.05.07.csv`.
pub fn output_path(name: &str, timestamp: Option<&NaiveDateTime>) -> PathBuf {
    let name = if name.is_empty() { DEFAULT_NAME } else { name };

    let file_start = name
        .rfind(|c: char| c == '/' || c == '\\')
        .map_or(0, |i| i + 1);
    let (base, ext) = match name[file_start..].rfind('.') {
        // A leading dot is a hidden file, not an extension
        Some(dot) if dot > 0 && file_start + dot + 1 < name.len() => {
            let split = file_start + dot;
            (&name[..split], &name[split + 1..])
        }
        Some(dot) if dot > 0 => (&name[..file_start + dot], DEFAULT_EXTENSION),
        _ => (name, DEFAULT_EXTENSION),
    };

    let stamp = timestamp
        .map(|t| format!(" {}", t.format(TIMESTAMP_FORMAT)))
        .unwrap_or_default();
    PathBuf::from(format!("{}{}.{}", base, stamp, ext))
}
