//! Archive entry path normalization.

/// Normalizes a caller-supplied name into a relative archive path.
///
/// - Treats `\` as a path separator and emits `/`
/// - Drops leading `/`, empty and `.` segments
/// - Replaces `..` segments with `_` so entries cannot escape on extraction
/// - Replaces NUL and control characters with `_`
/// - Trims surrounding whitespace from each segment
///
/// Returns an empty string when nothing usable remains.
pub fn normalize_entry_name(name: &str) -> String {
    let mut segments: Vec<String> = Vec::new();

    for raw in name.split(['/', '\\']) {
        let seg = raw.trim();
        if seg.is_empty() || seg == "." {
            continue;
        }
        if seg == ".." {
            segments.push("_".to_string());
            continue;
        }
        let cleaned: String = seg
            .chars()
            .map(|c| if c == '\0' || c.is_control() { '_' } else { c })
            .collect();
        segments.push(cleaned);
    }

    segments.join("/")
}
