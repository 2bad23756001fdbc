//! Applier - executes a plan against the file on disk
//!
//! The target is replaced by renaming a fully written temporary file from
//! the same directory over it, so readers see either the old or the new
//! content. A failed write leaves the target untouched.

use crate::diff::Plan;
use crate::error::{Error, Result};
use crate::planner::read_snapshot;
use crate::types::ApplyResult;
use inikit::ParseOptions;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Apply `plan` to the file at `path`
///
/// When `precondition` is set, the file must still hash to it or nothing
/// is written and [`Error::ConcurrentModification`] is returned. The
/// parent directory must already exist.
pub fn apply(
    path: &Path,
    plan: &Plan,
    precondition: Option<blake3::Hash>,
    options: &ParseOptions,
) -> Result<ApplyResult> {
    if plan.is_empty() {
        return Ok(ApplyResult::unchanged(path));
    }

    let snapshot = read_snapshot(path)?;
    if precondition.is_some_and(|expected| expected != snapshot.hash) {
        return Err(Error::ConcurrentModification {
            path: path.to_path_buf(),
        });
    }

    let mut document = snapshot.document(path, options)?;
    plan.apply_to(&mut document)
        .map_err(|e| Error::from_codec(path, e))?;

    write_atomic(path, &inikit::write_bytes(&document))?;
    log::info!("{}: applied {} edit(s)", path.display(), plan.len());

    Ok(ApplyResult {
        path: path.to_path_buf(),
        changed: true,
        edits: plan.edits.clone(),
    })
}

/// Replace `path` with `content` via temp file and rename
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| Error::io(path, e))?;
    temp.write_all(content).map_err(|e| Error::io(path, e))?;
    temp.as_file().sync_all().map_err(|e| Error::io(path, e))?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::io(path, e))?;
    }

    temp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Edit;
    use tempfile::TempDir;

    fn set(section: &str, key: &str, value: &str) -> Edit {
        Edit::SetProperty {
            section: section.into(),
            key: key.into(),
            value: value.into(),
            previous: None,
        }
    }

    #[test]
    fn test_empty_plan_does_not_touch_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outputs.conf");
        let result = apply(&path, &Plan::new(), None, &ParseOptions::default()).unwrap();
        assert!(!result.changed);
        assert!(!path.exists());
    }

    #[test]
    fn test_apply_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outputs.conf");
        let plan = Plan {
            edits: vec![
                Edit::AddSection {
                    section: "tcpout".into(),
                },
                set("tcpout", "defaultGroup", "indexers"),
            ],
        };

        let result = apply(&path, &plan, None, &ParseOptions::default()).unwrap();
        assert!(result.changed);
        assert_eq!(result.edits.len(), 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[tcpout]\ndefaultGroup = indexers\n"
        );
    }

    #[test]
    fn test_stale_precondition_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("web.conf");
        fs::write(&path, "[settings]\n").unwrap();
        let stale = blake3::hash(b"[settings]\nother = 1\n");
        let plan = Plan {
            edits: vec![set("settings", "httpport", "8000")],
        };

        let err = apply(&path, &plan, Some(stale), &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::ConcurrentModification { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[settings]\n");
    }

    #[test]
    fn test_missing_parent_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("outputs.conf");
        let plan = Plan {
            edits: vec![Edit::AddSection {
                section: "a".into(),
            }],
        };

        let err = apply(&path, &plan, None, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!dir.path().join("nope").exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inputs.conf");
        write_atomic(&path, b"[default]\n").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .map(|e| e.file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("inputs.conf")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.conf");
        fs::write(&path, "[general]\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, b"[general]\nserverName = idx1\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
