//! Diff computation - desired sections against the file's current sections

use crate::resource::SectionResource;
use crate::types::DesiredValue;
use inikit::{Document, Section};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One minimal change to a settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Append an empty section
    AddSection { section: String },
    /// Set a property, appending it if new
    SetProperty {
        section: String,
        key: String,
        value: String,
        /// Value on disk before the edit
        previous: Option<String>,
    },
    /// Remove a property
    RemoveProperty { section: String, key: String },
    /// Remove a section with all its lines
    RemoveSection { section: String },
}

impl Edit {
    /// Section the edit applies to
    pub fn section(&self) -> &str {
        match self {
            Self::AddSection { section }
            | Self::SetProperty { section, .. }
            | Self::RemoveProperty { section, .. }
            | Self::RemoveSection { section } => section,
        }
    }

    /// Apply the edit to a document in memory
    pub fn apply_to(&self, document: &mut Document) -> inikit::Result<bool> {
        match self {
            Self::AddSection { section } => document.add_section(section),
            Self::SetProperty {
                section,
                key,
                value,
                ..
            } => document.set_property(section, key, value),
            Self::RemoveProperty { section, key } => document.remove_property(section, key),
            Self::RemoveSection { section } => Ok(document.remove_section(section)),
        }
    }

    /// Check if this edit adds something
    pub fn is_addition(&self) -> bool {
        matches!(
            self,
            Self::AddSection { .. }
                | Self::SetProperty {
                    previous: None,
                    ..
                }
        )
    }

    /// Check if this edit removes something
    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            Self::RemoveProperty { .. } | Self::RemoveSection { .. }
        )
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddSection { section } => write!(f, "+ [{section}]"),
            Self::SetProperty {
                section,
                key,
                value,
                previous: Some(previous),
            } => write!(f, "~ [{section}] {key}: {previous} -> {value}"),
            Self::SetProperty {
                section,
                key,
                value,
                previous: None,
            } => write!(f, "+ [{section}] {key} = {value}"),
            Self::RemoveProperty { section, key } => write!(f, "- [{section}] {key}"),
            Self::RemoveSection { section } => write!(f, "- [{section}]"),
        }
    }
}

/// Ordered list of edits for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub edits: Vec<Edit>,
}

impl Plan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of edits
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Iterate over the edits
    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.edits.iter()
    }

    /// Append edits
    pub fn extend(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    /// Apply every edit to a document in memory
    pub fn apply_to(&self, document: &mut Document) -> inikit::Result<()> {
        for edit in &self.edits {
            edit.apply_to(document)?;
        }
        Ok(())
    }

    /// Summary counts
    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_edits(&self.edits)
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

/// Compute the edits that bring `current` to the state `desired` declares
///
/// Edits follow resource declaration order, then property declaration
/// order. Sections no resource mentions are not touched here; see
/// [`purge`](crate::purge::purge).
pub fn diff(current: &[Section], desired: &[SectionResource]) -> Plan {
    let mut plan = Plan::new();

    for resource in desired {
        let existing = current.iter().find(|s| s.name == resource.section);
        if existing.is_none() {
            plan.edits.push(Edit::AddSection {
                section: resource.section.clone(),
            });
        }

        for (key, want) in &resource.properties {
            let have = existing.and_then(|s| s.get(key));
            match (want, have) {
                (DesiredValue::Present(value), Some(current)) if current == value => {}
                (DesiredValue::Present(value), previous) => {
                    plan.edits.push(Edit::SetProperty {
                        section: resource.section.clone(),
                        key: key.clone(),
                        value: value.clone(),
                        previous: previous.map(str::to_string),
                    });
                }
                (DesiredValue::Absent, Some(_)) => {
                    plan.edits.push(Edit::RemoveProperty {
                        section: resource.section.clone(),
                        key: key.clone(),
                    });
                }
                (DesiredValue::Absent, None) => {}
            }
        }
    }

    plan
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Sections or properties to add
    pub additions: usize,
    /// Sections or properties to remove
    pub removals: usize,
    /// Values to change
    pub modifications: usize,
}

impl DiffSummary {
    /// Create a summary from a list of edits
    pub fn from_edits(edits: &[Edit]) -> Self {
        let mut summary = Self::default();
        for edit in edits {
            if edit.is_addition() {
                summary.additions += 1;
            } else if edit.is_removal() {
                summary.removals += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(section: &str) -> SectionResource {
        SectionResource::new("/tmp/outputs.conf", section)
    }

    #[test]
    fn test_no_changes() {
        let current = vec![Section::new("default").with("host", "old")];
        let plan = diff(&current, &[resource("default").set("host", "old")]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_set_and_append() {
        let current = vec![Section::new("default").with("host", "old")];
        let plan = diff(
            &current,
            &[resource("default").set("host", "new").set("port", "9997")],
        );
        assert_eq!(
            plan.edits,
            vec![
                Edit::SetProperty {
                    section: "default".into(),
                    key: "host".into(),
                    value: "new".into(),
                    previous: Some("old".into()),
                },
                Edit::SetProperty {
                    section: "default".into(),
                    key: "port".into(),
                    value: "9997".into(),
                    previous: None,
                },
            ]
        );
    }

    #[test]
    fn test_missing_section_added_first() {
        let plan = diff(&[], &[resource("tcpout").set("defaultGroup", "x")]);
        assert_eq!(
            plan.edits[0],
            Edit::AddSection {
                section: "tcpout".into()
            }
        );
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_missing_section_with_only_tombstones_still_added() {
        let plan = diff(&[], &[resource("tcpout").absent("x")]);
        assert_eq!(
            plan.edits,
            vec![Edit::AddSection {
                section: "tcpout".into()
            }]
        );
    }

    #[test]
    fn test_tombstone_removes_only_that_key() {
        let current = vec![Section::new("a").with("k", "1").with("j", "2")];
        let plan = diff(&current, &[resource("a").absent("k").absent("missing")]);
        assert_eq!(
            plan.edits,
            vec![Edit::RemoveProperty {
                section: "a".into(),
                key: "k".into()
            }]
        );
    }

    #[test]
    fn test_empty_string_is_not_absent() {
        let current = vec![Section::new("a").with("k", "1")];
        let plan = diff(&current, &[resource("a").set("k", "")]);
        assert!(matches!(
            &plan.edits[0],
            Edit::SetProperty { value, .. } if value.is_empty()
        ));

        let current = vec![Section::new("a").with("k", "")];
        assert!(diff(&current, &[resource("a").set("k", "")]).is_empty());
    }

    #[test]
    fn test_order_follows_declaration() {
        let current = vec![Section::new("b"), Section::new("a")];
        let plan = diff(
            &current,
            &[resource("a").set("x", "1"), resource("b").set("y", "2")],
        );
        let sections: Vec<_> = plan.iter().map(Edit::section).collect();
        assert_eq!(sections, vec!["a", "b"]);
    }

    #[test]
    fn test_unmanaged_properties_untouched() {
        let current = vec![Section::new("a").with("other", "keep")];
        let plan = diff(&current, &[resource("a").set("x", "1")]);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_summary() {
        let current = vec![Section::new("a").with("k", "1").with("r", "x")];
        let plan = diff(
            &current,
            &[
                resource("a").set("k", "2").absent("r"),
                resource("b").set("n", "1"),
            ],
        );
        let summary = plan.summary();
        assert_eq!(summary.modifications, 1);
        assert_eq!(summary.removals, 1);
        assert_eq!(summary.additions, 2);
        assert!(summary.has_changes());
    }

    #[test]
    fn test_edit_display() {
        let edit = Edit::SetProperty {
            section: "a".into(),
            key: "k".into(),
            value: "2".into(),
            previous: Some("1".into()),
        };
        assert_eq!(edit.to_string(), "~ [a] k: 1 -> 2");
        assert_eq!(
            Edit::RemoveSection {
                section: "b".into()
            }
            .to_string(),
            "- [b]"
        );
    }
}
