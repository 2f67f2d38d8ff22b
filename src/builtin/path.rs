//! Filesystem path comparison: entry type, then textual content (with
//! optional `.seqpat` masking) for files, or recursive member-wise
//! comparison for directories (§4.1.3, §6 file-level conventions).

use std::path::Path;

use regex::Regex;

use crate::logger::{Logger, Sentinel};

/// Filenames excluded from directory comparisons regardless of extension.
const EXCLUDED_NAMES: &[&str] = &[".DS_Store", ".keep"];
/// Extensions excluded from directory comparisons.
const EXCLUDED_EXTENSIONS: &[&str] = &["seqpat"];

fn is_excluded(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str())
        && EXCLUDED_NAMES.contains(&name)
    {
        return true;
    }
    if let Some(ext) = path.extension().and_then(|e| e.to_str())
        && EXCLUDED_EXTENSIONS.contains(&ext)
    {
        return true;
    }
    false
}

/// Reads the `.seqpat` sidecar next to `path`, if any, as one regular
/// expression per line.
fn seqpat_patterns(path: &Path) -> Vec<Regex> {
    let mut sidecar = path.as_os_str().to_os_string();
    sidecar.push(".seqpat");
    let Ok(contents) = std::fs::read_to_string(sidecar) else {
        return Vec::new();
    };
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| Regex::new(line).ok())
        .collect()
}

fn masked(content: &str, patterns: &[Regex]) -> String {
    let mut out = content.to_string();
    for pattern in patterns {
        out = pattern.replace_all(&out, "").into_owned();
    }
    out
}

/// Compares the predictive file at `predicted` against `obtained`, applying
/// any `.seqpat` masks found next to `predicted` before comparing.
fn check_file_contents(sentinel: &mut Sentinel, obtained: &Path, predicted: &Path) -> bool {
    let obtained_text = std::fs::read_to_string(obtained).unwrap_or_default();
    let predicted_text = std::fs::read_to_string(predicted).unwrap_or_default();
    let patterns = seqpat_patterns(predicted);
    let obtained_masked = masked(&obtained_text, &patterns);
    let predicted_masked = masked(&predicted_text, &patterns);
    let passed = obtained_masked == predicted_masked;
    if !passed {
        sentinel.record(
            false,
            &crate::format::string_diff_message(&obtained_masked, &predicted_masked),
        );
    } else {
        sentinel.record(true, "");
    }
    passed
}

fn sorted_entries(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| !is_excluded(p))
        .collect();
    entries.sort();
    entries
}

fn check_directory(logger: &mut Logger, description: &str, obtained: &Path, predicted: &Path) -> bool {
    let obtained_entries = sorted_entries(obtained);
    let predicted_entries = sorted_entries(predicted);

    let mut sentinel = Sentinel::new(logger, description);
    if obtained_entries.len() != predicted_entries.len() {
        sentinel.record(
            false,
            &format!(
                "directory entry count differs: obtained {}, predicted {}",
                obtained_entries.len(),
                predicted_entries.len()
            ),
        );
        return false;
    }
    sentinel.record(true, "");

    let inner = sentinel.logger_mut();
    let mut all_passed = true;
    for (o, p) in obtained_entries.iter().zip(predicted_entries.iter()) {
        let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        if o.file_name() != p.file_name() {
            all_passed = false;
            continue;
        }
        if !check_path(&format!("{description}/{name}"), inner, o, p) {
            all_passed = false;
        }
    }
    all_passed
}

/// Compares `obtained` against the predictive path `predicted`: entry type
/// first, then content (files) or recursive member-wise comparison
/// (directories).
pub fn check_path(description: &str, logger: &mut Logger, obtained: &Path, predicted: &Path) -> bool {
    if predicted.is_dir() {
        return check_directory(logger, description, obtained, predicted);
    }

    let mut sentinel = Sentinel::new(logger, description);
    if predicted.is_file() != obtained.is_file() {
        sentinel.record(
            false,
            &format!(
                "entry type differs: obtained is_file = {}, predicted is_file = {}",
                obtained.is_file(),
                predicted.is_file()
            ),
        );
        return false;
    }
    check_file_contents(&mut sentinel, obtained, predicted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::TestMode;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn identical_files_pass() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "hello\n").unwrap();
        fs::write(&b, "hello\n").unwrap();
        let mut logger = Logger::new(TestMode::Standard);
        assert!(check_path("f", &mut logger, &a, &b));
    }

    #[test]
    fn seqpat_masks_are_applied_before_comparison() {
        let dir = tempdir().unwrap();
        let obtained = dir.path().join("out.txt");
        let predicted = dir.path().join("expected.txt");
        fs::write(&obtained, "run at 2024-01-01T00:00:00\n").unwrap();
        fs::write(&predicted, "run at TIMESTAMP\n").unwrap();
        fs::write(
            dir.path().join("expected.txt.seqpat"),
            "\\d{4}-\\d{2}-\\d{2}T\\d{2}:\\d{2}:\\d{2}\nTIMESTAMP",
        )
        .unwrap();
        let mut logger = Logger::new(TestMode::Standard);
        assert!(check_path("f", &mut logger, &obtained, &predicted));
    }

    #[test]
    fn directory_excludes_ds_store_and_seqpat() {
        let obtained = tempdir().unwrap();
        let predicted = tempdir().unwrap();
        fs::write(obtained.path().join(".DS_Store"), "junk").unwrap();
        fs::write(obtained.path().join("keep.txt"), "x").unwrap();
        fs::write(predicted.path().join("keep.txt"), "x").unwrap();
        fs::write(predicted.path().join("keep.txt.seqpat"), "x").unwrap();
        let mut logger = Logger::new(TestMode::Standard);
        assert!(check_path("d", &mut logger, obtained.path(), predicted.path()));
    }
}
