//! Section resources - desired state for one `[section]` of one file
//!
//! A resource is built by the caller from catalog data, handed to a
//! [`Reconciler`](crate::Reconciler), and consumed by one reconciliation
//! pass. It is never persisted: the section it converges to is.

use crate::types::DesiredValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Desired state of one section
///
/// Properties not mentioned are left alone. A property mapped to
/// [`DesiredValue::Absent`] is removed if present.
///
/// # Example
///
/// ```
/// use declarative::SectionResource;
///
/// let resource = SectionResource::new("/opt/splunkforwarder/etc/system/local/outputs.conf", "tcpout")
///     .set("defaultGroup", "indexers")
///     .absent("indexAndForward")
///     .purge(true);
///
/// assert_eq!(resource.properties.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResource {
    /// File the section lives in
    pub target_file: PathBuf,
    /// Section name, without brackets
    pub section: String,
    /// Desired properties in declaration order
    pub properties: Vec<(String, DesiredValue)>,
    /// File-scoped purge declaration, if this resource makes one
    pub purge: Option<bool>,
}

impl SectionResource {
    /// Create a resource with no properties
    pub fn new(target_file: impl Into<PathBuf>, section: impl Into<String>) -> Self {
        Self {
            target_file: target_file.into(),
            section: section.into(),
            properties: Vec::new(),
            purge: None,
        }
    }

    /// Desire a property value
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key.into(), DesiredValue::Present(value.into()));
        self
    }

    /// Desire a property to be absent
    pub fn absent(mut self, key: impl Into<String>) -> Self {
        self.insert(key.into(), DesiredValue::Absent);
        self
    }

    /// Declare whether unmanaged sections of the target file are purged
    pub fn purge(mut self, enabled: bool) -> Self {
        self.purge = Some(enabled);
        self
    }

    /// Desired state of a property, if declared
    pub fn desired(&self, key: &str) -> Option<&DesiredValue> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Stable identifier, e.g. `/etc/outputs.conf[tcpout]`
    pub fn id(&self) -> String {
        format!("{}[{}]", self.target_file.display(), self.section)
    }

    /// Later declarations of a key replace earlier ones in place
    fn insert(&mut self, key: String, value: DesiredValue) {
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((key, value)),
        }
    }
}

impl fmt::Display for SectionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Declare a section resource from a property map and a set of absent keys
///
/// Keys listed in `absent_keys` win over the same key in `properties`.
pub fn declare_resource<K, V, A>(
    target_file: impl Into<PathBuf>,
    section_name: impl Into<String>,
    properties: impl IntoIterator<Item = (K, V)>,
    absent_keys: impl IntoIterator<Item = A>,
) -> SectionResource
where
    K: Into<String>,
    V: Into<String>,
    A: Into<String>,
{
    let mut resource = SectionResource::new(target_file, section_name);
    for (key, value) in properties {
        resource = resource.set(key, value);
    }
    for key in absent_keys {
        resource = resource.absent(key);
    }
    resource
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let r = SectionResource::new("/tmp/a.conf", "s")
            .set("b", "1")
            .set("a", "2")
            .absent("c");
        let keys: Vec<_> = r.properties.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_redeclared_key_replaced_in_place() {
        let r = SectionResource::new("/tmp/a.conf", "s")
            .set("a", "1")
            .set("b", "2")
            .set("a", "3");
        assert_eq!(r.properties.len(), 2);
        assert_eq!(r.desired("a"), Some(&DesiredValue::Present("3".into())));
    }

    #[test]
    fn test_declare_resource_absent_wins() {
        let r = declare_resource(
            "/tmp/outputs.conf",
            "default",
            [("host", "new"), ("port", "9997")],
            ["port"],
        );
        assert_eq!(r.desired("host"), Some(&DesiredValue::Present("new".into())));
        assert_eq!(r.desired("port"), Some(&DesiredValue::Absent));
        assert_eq!(r.purge, None);
    }

    #[test]
    fn test_id() {
        let r = SectionResource::new("/tmp/web.conf", "settings");
        assert_eq!(r.id(), "/tmp/web.conf[settings]");
        assert_eq!(r.to_string(), r.id());
    }
}
