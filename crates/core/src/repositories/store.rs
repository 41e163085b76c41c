//! Shared storage helpers used by every repository.

use crate::constants::MAX_ALLOCATION_ATTEMPTS;
use crate::uuid::RecordId;
use crate::{BloodBankError, BloodBankResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Allocates a fresh sharded record directory under `base_dir`.
///
/// Identifiers come from `id_source`. A pre-existing directory (an id collision or external
/// interference) is skipped and a new id drawn, up to [`MAX_ALLOCATION_ATTEMPTS`] times.
///
/// # Errors
///
/// Returns [`BloodBankError::StorageDirCreation`] if a parent directory cannot be created or every
/// attempt collides.
pub(crate) fn create_record_dir(
    base_dir: &Path,
    mut id_source: impl FnMut() -> RecordId,
) -> BloodBankResult<(RecordId, PathBuf)> {
    for _attempt in 0..MAX_ALLOCATION_ATTEMPTS {
        let id = id_source();
        let candidate = id.sharded_dir(base_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(BloodBankError::StorageDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((id, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(BloodBankError::StorageDirCreation(e)),
        }
    }

    Err(BloodBankError::StorageDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        format!(
            "failed to allocate a unique record directory after {} attempts",
            MAX_ALLOCATION_ATTEMPTS
        ),
    )))
}

/// Serialises `value` to YAML and writes it to `path`.
///
/// The content is written to a sibling temporary file first and renamed into place, so readers
/// never observe a half-written record.
pub(crate) fn write_yaml<T: Serialize>(path: &Path, value: &T) -> BloodBankResult<()> {
    let yaml = serde_yaml::to_string(value).map_err(BloodBankError::YamlSerialization)?;
    let tmp = path.with_extension("yaml.tmp");
    fs::write(&tmp, yaml).map_err(BloodBankError::FileWrite)?;
    fs::rename(&tmp, path).map_err(BloodBankError::FileWrite)
}

/// Reads and deserialises a YAML record.
///
/// Uses `serde_path_to_error` so that a schema mismatch names the offending field.
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> BloodBankResult<T> {
    let text = fs::read_to_string(path).map_err(BloodBankError::FileRead)?;
    let deserializer = serde_yaml::Deserializer::from_str(&text);

    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let location = err.path().to_string();
        let location = if location.is_empty() || location == "." {
            "<root>".to_string()
        } else {
            location
        };
        BloodBankError::YamlDeserialization {
            path: path.to_path_buf(),
            location,
            message: err.into_inner().to_string(),
        }
    })
}

/// Reads a record, mapping a missing file to [`BloodBankError::NotFound`].
pub(crate) fn read_existing<T: DeserializeOwned>(
    path: &Path,
    kind: &'static str,
    id: &str,
) -> BloodBankResult<T> {
    if !path.is_file() {
        return Err(BloodBankError::NotFound {
            kind,
            id: id.to_string(),
        });
    }
    read_yaml(path)
}

/// Loads every record named `filename` found up to `depth` directories below `base_dir`.
///
/// A missing `base_dir` is an empty collection. Records that fail to parse are logged and
/// skipped.
pub(crate) fn load_all<T: DeserializeOwned>(
    base_dir: &Path,
    filename: &str,
    depth: usize,
) -> Vec<T> {
    let mut files = Vec::new();
    collect_files(base_dir, filename, depth, &mut files);
    files.sort();

    files
        .into_iter()
        .filter_map(|path| match read_yaml::<T>(&path) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("skipping unreadable record {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

fn collect_files(dir: &Path, filename: &str, depth: usize, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if depth <= 1 {
            let candidate = path.join(filename);
            if candidate.is_file() {
                out.push(candidate);
            }
        } else {
            collect_files(&path, filename, depth - 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_create_record_dir_shards_by_id() {
        let temp = TempDir::new().unwrap();
        let (id, dir) = create_record_dir(temp.path(), RecordId::new).unwrap();

        assert!(dir.is_dir());
        assert_eq!(dir, id.sharded_dir(temp.path()));
    }

    #[test]
    fn test_create_record_dir_retries_on_collision() {
        let temp = TempDir::new().unwrap();
        let taken = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        fs::create_dir_all(taken.sharded_dir(temp.path())).unwrap();

        let fresh = RecordId::parse("00112233445566778899aabbccddeeff").unwrap();
        let mut ids = vec![fresh, taken].into_iter().rev();
        let (id, _) = create_record_dir(temp.path(), || ids.next().unwrap()).unwrap();

        assert_eq!(id, fresh);
    }

    #[test]
    fn test_create_record_dir_gives_up_after_max_attempts() {
        let temp = TempDir::new().unwrap();
        let taken = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        fs::create_dir_all(taken.sharded_dir(temp.path())).unwrap();

        let result = create_record_dir(temp.path(), || taken);
        assert!(matches!(result, Err(BloodBankError::StorageDirCreation(_))));
    }

    #[test]
    fn test_write_then_read_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sample.yaml");
        let sample = Sample {
            name: "unit".into(),
            count: 3,
        };

        write_yaml(&path, &sample).unwrap();
        assert!(!temp.path().join("sample.yaml.tmp").exists());
        assert_eq!(read_yaml::<Sample>(&path).unwrap(), sample);
    }

    #[test]
    fn test_read_yaml_reports_field_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sample.yaml");
        fs::write(&path, "name: unit\ncount: lots\n").unwrap();

        match read_yaml::<Sample>(&path) {
            Err(BloodBankError::YamlDeserialization { location, .. }) => {
                assert_eq!(location, "count");
            }
            other => panic!("Expected YamlDeserialization, got {other:?}"),
        }
    }

    #[test]
    fn test_read_existing_maps_missing_file_to_not_found() {
        let temp = TempDir::new().unwrap();
        let result = read_existing::<Sample>(&temp.path().join("nope.yaml"), "sample", "x");
        assert!(matches!(
            result,
            Err(BloodBankError::NotFound { kind: "sample", .. })
        ));
    }

    #[test]
    fn test_load_all_skips_unparsable_records() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("a");
        let bad = temp.path().join("b");
        fs::create_dir_all(&good).unwrap();
        fs::create_dir_all(&bad).unwrap();
        write_yaml(
            &good.join("sample.yaml"),
            &Sample {
                name: "ok".into(),
                count: 1,
            },
        )
        .unwrap();
        fs::write(bad.join("sample.yaml"), "not: [valid").unwrap();

        let loaded: Vec<Sample> = load_all(temp.path(), "sample.yaml", 1);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "ok");
    }

    #[test]
    fn test_load_all_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let loaded: Vec<Sample> = load_all(&temp.path().join("absent"), "sample.yaml", 3);
        assert!(loaded.is_empty());
    }
}
