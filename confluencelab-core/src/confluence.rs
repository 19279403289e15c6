//! Confluence tag extraction from the free-text entry field.

use crate::domain::Tag;

/// Split a comma-separated tag field into trimmed, non-empty tags.
///
/// Order of first appearance is preserved and exact duplicates are dropped,
/// so a trade never counts the same tag twice. Case is kept as written.
pub fn extract_confluences(raw: Option<&str>) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for piece in raw.unwrap_or("").split(',') {
        let tag = piece.trim();
        if tag.is_empty() || tags.iter().any(|t| t == tag) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_drops_empty_pieces() {
        assert_eq!(extract_confluences(Some("A, B ,,C")), vec!["A", "B", "C"]);
    }

    #[test]
    fn null_is_empty() {
        assert!(extract_confluences(None).is_empty());
        assert!(extract_confluences(Some("")).is_empty());
        assert!(extract_confluences(Some(" , ,")).is_empty());
    }

    #[test]
    fn keeps_first_appearance_and_case() {
        assert_eq!(
            extract_confluences(Some("OB, fvg, OB, FVG")),
            vec!["OB", "fvg", "FVG"]
        );
    }
}
