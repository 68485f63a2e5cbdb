//! Reading and writing documents on disk.
//!
//! The format is either named explicitly or guessed from the path. Encoding
//! happens before the file is touched, so a failed encode leaves any
//! existing file unchanged.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::FormatError;
use crate::format::{Document, FormatOptions, FormatRegistry, Target};
use crate::model::Dom;

fn io_error(path: &Path, e: std::io::Error) -> FormatError {
    FormatError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Reads and decodes a file.
pub fn read_file(
    registry: &FormatRegistry,
    path: impl AsRef<Path>,
    format: Option<&str>,
) -> Result<Document, FormatError> {
    let path = path.as_ref();
    let format = registry.resolve(path, format)?;
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    debug!(path = %path.display(), format = %format, bytes = bytes.len(), "read file");
    format.decode(&bytes)
}

/// Encodes a target and writes it to a file.
pub fn write_file(
    registry: &FormatRegistry,
    path: impl AsRef<Path>,
    format: Option<&str>,
    dom: &Dom,
    target: &Target,
) -> Result<(), FormatError> {
    write_file_with_options(registry, path, format, dom, target, &FormatOptions::default())
}

pub fn write_file_with_options(
    registry: &FormatRegistry,
    path: impl AsRef<Path>,
    format: Option<&str>,
    dom: &Dom,
    target: &Target,
    options: &FormatOptions,
) -> Result<(), FormatError> {
    let path = path.as_ref();
    let format = registry.resolve(path, format)?;
    let bytes = format.encode_with_options(dom, target, options)?;
    fs::write(path, &bytes).map_err(|e| io_error(path, e))?;
    debug!(path = %path.display(), format = %format, bytes = bytes.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Instance, Region3, Value, Vector3};

    fn sample() -> (Dom, Target) {
        let mut dom = Dom::new();
        let part = dom.insert(
            Instance::new("Part").with_property("Name", Value::String("Brick".into())),
        );
        (dom, Target::Instance(part))
    }

    #[test]
    fn test_write_then_read_guessed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brick.rbxmx");
        let registry = FormatRegistry::standard();
        let (dom, target) = sample();

        write_file(&registry, &path, None, &dom, &target).unwrap();
        let doc = read_file(&registry, &path, None).unwrap();
        let objects = doc.objects();
        assert_eq!(objects.len(), 1);
        assert_eq!(doc.dom.get(objects[0]).unwrap().name(), "Brick");
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brick.dat");
        let registry = FormatRegistry::standard();
        let (dom, target) = sample();

        write_file(&registry, &path, Some("rbxm"), &dom, &target).unwrap();
        assert!(read_file(&registry, &path, Some("rbxm")).is_ok());
        assert!(matches!(
            read_file(&registry, &path, None),
            Err(FormatError::NotRegistered { name }) if name == "dat"
        ));
    }

    #[test]
    fn test_unknown_format_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brick.obj");
        let registry = FormatRegistry::standard();
        let (dom, target) = sample();

        let err = write_file(&registry, &path, None, &dom, &target).unwrap_err();
        assert!(matches!(err, FormatError::NotRegistered { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_encode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.rbxm");
        let registry = FormatRegistry::standard();
        let mut dom = Dom::new();
        let part = dom.insert(Instance::new("Part").with_property(
            "Bounds",
            Value::Region3(Region3::new(Vector3::default(), Vector3::new(1.0, 1.0, 1.0))),
        ));

        let err = write_file(&registry, &path, None, &dom, &Target::Instance(part)).unwrap_err();
        assert!(matches!(err, FormatError::Encode { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.rbxl");
        let err = read_file(&FormatRegistry::standard(), &path, None).unwrap_err();
        assert!(matches!(err, FormatError::Io { .. }));
        assert_eq!(err.format_name(), None);
    }
}
