//! # File I/O Module
//!
//! JSON file operations:
//! - **Atomic saves**: write to a `.tmp` sibling, sync, verify by re-parsing,
//!   then rename over the target
//! - **Version validation**: projects from an incompatible schema are
//!   rejected on load
//! - **Generic inputs**: beams, frames and settings load through
//!   [`load_json`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use beam_core::file_io::{load_project, save_project};
//! use beam_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("Engineer", "25-001", "Client");
//! let path = Path::new("myproject.beam.json");
//! save_project(&project, path)?;
//! let loaded = load_project(path)?;
//! assert_eq!(loaded.meta.job_id, "25-001");
//! # Ok::<(), beam_core::errors::CalcError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{CalcError, CalcResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Temp path next to `path`: `name.ext` → `name.ext.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_to_string(path: &Path) -> CalcResult<String> {
    fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))
}

/// Write `contents` atomically.
///
/// 1. Write to a temporary file (`.tmp`)
/// 2. Sync to disk (fsync)
/// 3. Rename over the target (atomic on most filesystems)
fn write_atomic(path: &Path, contents: &str) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(contents.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "file written");
    Ok(())
}

/// Save any serializable value as pretty JSON with atomic write semantics.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, &json)
}

/// Load any JSON input (beam, frame, settings, ...).
///
/// # Example
///
/// ```rust,no_run
/// use beam_core::calculations::ContinuousBeamInput;
/// use beam_core::file_io::load_json;
/// use std::path::Path;
///
/// let input: ContinuousBeamInput = load_json(Path::new("beam.json"))?;
/// # Ok::<(), beam_core::errors::CalcError>(())
/// ```
pub fn load_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Save a project atomically.
///
/// The serialized JSON is parsed back before the temp file is written, so
/// a project that would not load again never replaces a good file.
///
/// # Example
///
/// ```rust,no_run
/// use beam_core::file_io::save_project;
/// use beam_core::project::Project;
/// use std::path::Path;
///
/// let project = Project::new("Engineer", "25-001", "Client");
/// save_project(&project, Path::new("myproject.beam.json"))?;
/// # Ok::<(), beam_core::errors::CalcError>(())
/// ```
pub fn save_project(project: &Project, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(project)?;

    let verify: Project = serde_json::from_str(&json).map_err(|e| CalcError::SerializationError {
        reason: format!("Project failed to re-parse before save: {}", e),
    })?;
    if verify.items.len() != project.items.len() {
        return Err(CalcError::SerializationError {
            reason: "Project item count changed during serialization".to_string(),
        });
    }

    write_atomic(path, &json)?;
    info!(
        path = %path.display(),
        items = project.items.len(),
        "project saved"
    );
    Ok(())
}

/// Load a project from a file.
///
/// # Returns
///
/// * `Ok(Project)` - Successfully loaded project
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_project(path: &Path) -> CalcResult<Project> {
    let project: Project = load_json(path)?;
    validate_version(&project.meta.version)?;
    info!(
        path = %path.display(),
        job = %project.meta.job_id,
        items = project.items.len(),
        "project loaded"
    );
    Ok(project)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };

    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);
    let (Some(&file_major), Some(&current_major)) = (file_parts.first(), current_parts.first()) else {
        return Err(mismatch());
    };

    // Major version must match
    if file_major != current_major {
        return Err(mismatch());
    }

    // For 0.x versions a newer minor may contain breaking changes
    if current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{AnalysisItem, ContinuousBeamInput, Span, SupportType};
    use crate::loads::Load;
    use crate::settings::AnalysisSettings;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("beam_core_test_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_tmp_path_generation() {
        let path = Path::new("/path/to/project.beam.json");
        assert_eq!(tmp_path_for(path), Path::new("/path/to/project.beam.json.tmp"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path("roundtrip");

        let mut project = Project::new("Test Engineer", "TEST-001", "Test Client");
        let id = project.add_item(AnalysisItem::ContinuousBeam(ContinuousBeamInput::from_spans(
            "B-1",
            vec![Span::new(4.0, 200e6, 1e-4).with_load(Load::partial_udl(5.0, 1.0, 2.0))],
            &[SupportType::Fixed, SupportType::Free],
        )));
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.engineer, "Test Engineer");
        assert_eq!(loaded.meta.job_id, "TEST-001");
        assert_eq!(loaded.get_item(&id), project.get_item(&id));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_path("atomic");
        let tmp_path = tmp_path_for(&path);

        let project = Project::new("Test", "TEST", "Client");
        save_project(&project, &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_path("newer");
        let mut project = Project::new("Test", "TEST", "Client");
        project.meta.version = "0.9.0".to_string();
        save_json(&project, &path).unwrap();

        assert!(matches!(
            load_project(&path),
            Err(CalcError::VersionMismatch { .. })
        ));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_json_settings_and_errors() {
        let path = temp_path("settings");
        fs::write(&path, r#"{ "max_iterations": 50 }"#).unwrap();
        let settings: AnalysisSettings = load_json(&path).unwrap();
        assert_eq!(settings.max_iterations, 50);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_json::<AnalysisSettings>(&path),
            Err(CalcError::SerializationError { .. })
        ));
        let _ = fs::remove_file(&path);

        assert!(matches!(
            load_json::<AnalysisSettings>(&temp_path("missing")),
            Err(CalcError::FileError { .. })
        ));
    }
}
