//! Purge engine - removal of sections no resource declares

use crate::diff::Edit;
use inikit::Section;

/// Compute `RemoveSection` edits for unclaimed sections, in file order
///
/// Nothing is removed unless `enabled`. Sections named in `claimed` or
/// `reserved` are always kept. Properties are never purged individually.
pub fn purge<S: AsRef<str>>(
    current: &[Section],
    claimed: &[S],
    enabled: bool,
    reserved: &[&str],
) -> Vec<Edit> {
    if !enabled {
        return Vec::new();
    }

    current
        .iter()
        .filter(|section| !claimed.iter().any(|c| c.as_ref() == section.name))
        .filter(|section| !reserved.contains(&section.name.as_str()))
        .map(|section| Edit::RemoveSection {
            section: section.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(names: &[&str]) -> Vec<Section> {
        names.iter().map(|n| Section::new(*n)).collect()
    }

    fn removed(edits: &[Edit]) -> Vec<&str> {
        edits.iter().map(Edit::section).collect()
    }

    #[test]
    fn test_disabled_removes_nothing() {
        let current = sections(&["a", "b"]);
        assert!(purge(&current, &["a"], false, &[]).is_empty());
    }

    #[test]
    fn test_removes_unclaimed_in_file_order() {
        let current = sections(&["z", "a", "m", "b"]);
        let edits = purge(&current, &["a"], true, &[]);
        assert_eq!(removed(&edits), vec!["z", "m", "b"]);
    }

    #[test]
    fn test_reserved_sections_kept() {
        let current = sections(&["default", "settings", "old"]);
        let edits = purge(&current, &Vec::<String>::new(), true, &["default", "settings"]);
        assert_eq!(removed(&edits), vec!["old"]);
    }

    #[test]
    fn test_all_claimed() {
        let current = sections(&["a", "b"]);
        assert!(purge(&current, &["b", "a"], true, &[]).is_empty());
    }
}
