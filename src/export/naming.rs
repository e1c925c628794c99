use std::path::{Path, PathBuf};

use crate::watermark::{ExportRule, NamingMode};

/// Output file name for `source`; the extension always follows the output format.
pub fn output_file_name(source: &Path, rule: &ExportRule) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match rule.mode {
        NamingMode::Keep => stem,
        NamingMode::Prefix => format!("{}{}", rule.text, stem),
        NamingMode::Suffix => format!("{}{}", stem, rule.text),
    };

    format!("{}.{}", name, rule.out_format.extension())
}

pub fn output_path(source: &Path, target_dir: &Path, rule: &ExportRule) -> PathBuf {
    target_dir.join(output_file_name(source, rule))
}
