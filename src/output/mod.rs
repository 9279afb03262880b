// Output formatting — terminal display for labels, breakdowns and reports.

pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Article text is frequently CJK, so this counts characters rather than
/// slicing bytes, which would panic on a multi-byte boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("台积电发布新工艺", 3), "台积电...");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
