//! Project name validation: keeps manifest lookups inside the portal directory.
//!
//! A project name becomes a single path component under the portal root, so
//! it must not contain separators, traversal sequences or hidden-file dots.

use std::path::{Path, PathBuf};

/// Error returned when project name validation fails.
#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    #[error("Project name must not be empty")]
    Empty,

    #[error("Path traversal detected in project name '{name}'")]
    PathTraversal { name: String },

    #[error("Project name '{name}' must be a single directory name")]
    NotSingleComponent { name: String },

    #[error("Project name '{name}' must not start with '.'")]
    Hidden { name: String },
}

/// Validate a project name and return the project directory under `root`.
///
/// Checks:
/// 1. Name is not blank
/// 2. No `..` traversal, in either separator style
/// 3. No path separators or NUL bytes
/// 4. Not a hidden entry
pub fn validate_project_name(root: &Path, name: &str) -> Result<PathBuf, PathValidationError> {
    if name.trim().is_empty() {
        return Err(PathValidationError::Empty);
    }

    let normalized = name.replace('\\', "/");
    if normalized == ".." || normalized.contains("../") || normalized.contains("/..") {
        return Err(PathValidationError::PathTraversal { name: name.into() });
    }

    if normalized.contains('/') || name.contains('\0') {
        return Err(PathValidationError::NotSingleComponent { name: name.into() });
    }

    if name.starts_with('.') {
        return Err(PathValidationError::Hidden { name: name.into() });
    }

    Ok(root.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "/app/portal";

    #[test]
    fn valid_name_joins_root() {
        let dir = validate_project_name(Path::new(ROOT), "sales_mart").unwrap();
        assert_eq!(dir, PathBuf::from("/app/portal/sales_mart"));
    }

    #[test]
    fn path_traversal_blocked() {
        let result = validate_project_name(Path::new(ROOT), "../../etc");
        match result.unwrap_err() {
            PathValidationError::PathTraversal { .. } => {}
            other => panic!("Expected PathTraversal, got: {other}"),
        }
        assert!(validate_project_name(Path::new(ROOT), "..").is_err());
        assert!(validate_project_name(Path::new(ROOT), "..\\secrets").is_err());
    }

    #[test]
    fn separators_blocked() {
        match validate_project_name(Path::new(ROOT), "a/b").unwrap_err() {
            PathValidationError::NotSingleComponent { name } => assert_eq!(name, "a/b"),
            other => panic!("Expected NotSingleComponent, got: {other}"),
        }
        assert!(validate_project_name(Path::new(ROOT), "/etc").is_err());
    }

    #[test]
    fn hidden_and_blank_blocked() {
        assert!(matches!(
            validate_project_name(Path::new(ROOT), ".git"),
            Err(PathValidationError::Hidden { .. })
        ));
        assert!(matches!(
            validate_project_name(Path::new(ROOT), "   "),
            Err(PathValidationError::Empty)
        ));
    }
}
