//! Manifest schema
//!
//! The manifest is a TOML file listing the sections stanza manages:
//!
//! ```toml
//! product = "forwarder"
//! conf_dir = "/opt/splunkforwarder/etc/system/local"
//!
//! [purge]
//! outputs = true
//!
//! [[resource]]
//! type = "outputs"
//! section = "tcpout:indexers"
//! absent = ["compressed"]
//!
//! [resource.properties]
//! server = "idx1:9997,idx2:9997"
//! ```

use crate::paths;
use anyhow::{Context, Result, bail};
use declarative::{FileType, Reconciler, SectionResource};
use platform::Product;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Product whose settings are managed
    #[serde(default)]
    pub product: Product,

    /// Product release, `<version>-<build>`, used for package names
    #[serde(default)]
    pub release: Option<String>,

    /// Settings directory; derived from the platform when unset
    #[serde(default)]
    pub conf_dir: Option<String>,

    /// Purge setting per file type
    #[serde(default)]
    pub purge: toml::Table,

    /// Declared sections
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceEntry>,
}

/// One `[[resource]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceEntry {
    /// File type; the file is `<conf_dir>/<type>.conf`
    #[serde(default, rename = "type")]
    pub file_type: Option<FileType>,

    /// Explicit file path, absolute or relative to `conf_dir`
    #[serde(default)]
    pub path: Option<String>,

    /// Section name, without brackets
    pub section: String,

    /// Purge unmanaged sections of this file
    #[serde(default)]
    pub purge: Option<bool>,

    /// Properties that must not exist
    #[serde(default)]
    pub absent: Vec<String>,

    /// Desired properties, in manifest order
    #[serde(default)]
    pub properties: toml::Table,
}

impl ResourceEntry {
    /// Human-readable label for error messages
    fn label(&self) -> String {
        match (&self.file_type, &self.path) {
            (_, Some(path)) => format!("{path}[{}]", self.section),
            (Some(t), None) => format!("{t}[{}]", self.section),
            (None, None) => format!("[{}]", self.section),
        }
    }

    /// File type the entry resolves to
    pub fn effective_type(&self) -> FileType {
        self.file_type.unwrap_or(FileType::Custom)
    }

    /// Target file for this entry
    pub fn target(&self, conf_dir: &Path) -> Result<PathBuf> {
        match (&self.path, self.file_type) {
            (Some(path), _) => Ok(paths::resolve(path, conf_dir)),
            (None, Some(t)) => match t.file_name() {
                Some(name) => Ok(conf_dir.join(name)),
                None => bail!("{}: type 'custom' requires a path", self.label()),
            },
            (None, None) => bail!("{}: needs a type or a path", self.label()),
        }
    }

    /// Properties as strings
    ///
    /// Integers, floats and booleans are written the way TOML prints
    /// them; tables and arrays are rejected.
    pub fn string_properties(&self) -> Result<Vec<(String, String)>> {
        self.properties
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    other => bail!(
                        "{}: property '{key}' must be a string, number or boolean, got {}",
                        self.label(),
                        other.type_str()
                    ),
                };
                Ok((key.clone(), value))
            })
            .collect()
    }
}

impl Manifest {
    /// Load a manifest from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    /// Parse and validate manifest text
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content).context("Invalid TOML format")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        for (key, value) in &self.purge {
            key.parse::<FileType>()
                .map_err(|e| anyhow::anyhow!("[purge]: {e}"))?;
            if !value.is_bool() {
                bail!("[purge]: '{key}' must be true or false");
            }
        }

        for entry in &self.resources {
            if entry.section.trim().is_empty() {
                bail!("resource with empty section name");
            }
            if entry.file_type.is_none() && entry.path.is_none() {
                bail!("{}: needs a type or a path", entry.label());
            }
            if entry.file_type == Some(FileType::Custom) && entry.path.is_none() {
                bail!("{}: type 'custom' requires a path", entry.label());
            }
            entry.string_properties()?;
        }
        Ok(())
    }

    /// Purge settings from the `[purge]` table
    pub fn purge_settings(&self) -> Vec<(FileType, bool)> {
        self.purge
            .iter()
            .filter_map(|(key, value)| Some((key.parse().ok()?, value.as_bool()?)))
            .collect()
    }

    /// Build a reconciler with every declaration in the manifest
    pub fn reconciler(&self, conf_dir: &Path) -> Result<Reconciler> {
        let mut reconciler = Reconciler::new();

        for entry in &self.resources {
            let target = entry.target(conf_dir)?;
            if reconciler.file_type(&target).is_none() {
                reconciler.register_file(&target, entry.effective_type());
            }

            let mut resource = SectionResource::new(&target, &entry.section);
            for (key, value) in entry.string_properties()? {
                resource = resource.set(key, value);
            }
            for key in &entry.absent {
                resource = resource.absent(key);
            }
            if let Some(purge) = entry.purge {
                resource = resource.purge(purge);
            }
            reconciler.declare(resource);
        }

        for (file_type, enabled) in self.purge_settings() {
            if let Some(name) = file_type.file_name() {
                let target = conf_dir.join(name);
                if reconciler.file_type(&target).is_none() {
                    reconciler.register_file(&target, file_type);
                }
                reconciler.set_purge(target, enabled);
            }
        }

        Ok(reconciler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::DesiredValue;

    const SAMPLE: &str = r#"
product = "forwarder"
conf_dir = "/opt/splunkforwarder/etc/system/local"

[purge]
outputs = true

[[resource]]
type = "outputs"
section = "tcpout:indexers"
absent = ["compressed"]

[resource.properties]
server = "idx1:9997,idx2:9997"
useACK = true
maxQueueSize = 7

[[resource]]
path = "apps/search/local/props.conf"
section = "access_combined"

[resource.properties]
TRUNCATE = "0"
"#;

    #[test]
    fn test_parse_sample() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.product, Product::Forwarder);
        assert_eq!(manifest.resources.len(), 2);
        assert_eq!(manifest.purge_settings(), vec![(FileType::Outputs, true)]);
    }

    #[test]
    fn test_properties_keep_manifest_order_and_stringify() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        let props = manifest.resources[0].string_properties().unwrap();
        assert_eq!(
            props,
            vec![
                ("server".to_string(), "idx1:9997,idx2:9997".to_string()),
                ("useACK".to_string(), "true".to_string()),
                ("maxQueueSize".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_targets() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        let conf = Path::new("/opt/splunkforwarder/etc/system/local");
        assert_eq!(
            manifest.resources[0].target(conf).unwrap(),
            conf.join("outputs.conf")
        );
        assert_eq!(
            manifest.resources[1].target(conf).unwrap(),
            conf.join("apps/search/local/props.conf")
        );
    }

    #[test]
    fn test_reconciler_declarations() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        let conf = Path::new("/opt/splunkforwarder/etc/system/local");
        let reconciler = manifest.reconciler(conf).unwrap();

        let outputs = conf.join("outputs.conf");
        assert_eq!(reconciler.targets().len(), 2);
        assert_eq!(reconciler.file_type(&outputs), Some(FileType::Outputs));
        assert!(reconciler.purge_enabled(&outputs).unwrap());

        let resource = &reconciler.resources(&outputs)[0];
        assert_eq!(resource.desired("compressed"), Some(&DesiredValue::Absent));
    }

    #[test]
    fn test_missing_type_and_path() {
        let err = Manifest::parse("[[resource]]\nsection = \"a\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("needs a type or a path"));
    }

    #[test]
    fn test_custom_requires_path() {
        let err = Manifest::parse("[[resource]]\ntype = \"custom\"\nsection = \"a\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("requires a path"));
    }

    #[test]
    fn test_unknown_purge_type() {
        let err = Manifest::parse("[purge]\nbogus = true\n").unwrap_err();
        assert!(format!("{err:#}").contains("unknown file type"));
    }

    #[test]
    fn test_table_property_rejected() {
        let content = "[[resource]]\ntype = \"web\"\nsection = \"settings\"\n[resource.properties.nested]\nx = 1\n";
        let err = Manifest::parse(content).unwrap_err();
        assert!(format!("{err:#}").contains("must be a string"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Manifest::parse("produkt = \"forwarder\"\n").is_err());
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::parse("").unwrap();
        assert!(manifest.resources.is_empty());
        assert_eq!(manifest.product, Product::Forwarder);
    }
}
