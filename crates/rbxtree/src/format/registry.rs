//! Named formats and format guessing.

use std::path::Path;

use crate::error::FormatError;
use crate::format::{Format, Method, RootShape};

/// Name guessed for paths that are directories. Not registered by default.
pub const DIRECTORY: &str = "directory";

/// An immutable set of formats, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: Vec<Format>,
}

impl FormatRegistry {
    /// The place and model formats in both methods: `rbxl`, `rbxm`, `rbxlx`
    /// and `rbxmx`.
    pub fn standard() -> Self {
        Self::builder().with_standard().build()
    }

    pub fn builder() -> FormatRegistryBuilder {
        FormatRegistryBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Formats in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Format> {
        self.formats.iter()
    }

    pub fn get(&self, name: &str) -> Result<&Format, FormatError> {
        self.formats
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FormatError::NotRegistered {
                name: name.to_string(),
            })
    }

    /// Guesses a format name from a path: directories map to
    /// [`DIRECTORY`], files to their extension.
    pub fn guess_name(path: &Path) -> Result<String, FormatError> {
        if path.is_dir() {
            return Ok(DIRECTORY.to_string());
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .ok_or_else(|| FormatError::CannotGuess {
                path: path.display().to_string(),
            })
    }

    /// Looks up the format guessed for `path`.
    pub fn guess(&self, path: &Path) -> Result<&Format, FormatError> {
        self.get(&Self::guess_name(path)?)
    }

    /// Uses `explicit` when given, otherwise guesses from `path`.
    pub fn resolve(&self, path: &Path, explicit: Option<&str>) -> Result<&Format, FormatError> {
        match explicit {
            Some(name) => self.get(name),
            None => self.guess(path),
        }
    }
}

/// Builds a [`FormatRegistry`]. Registering a name twice replaces the earlier
/// format in place.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistryBuilder {
    formats: Vec<Format>,
}

impl FormatRegistryBuilder {
    pub fn register(mut self, format: Format) -> Self {
        match self.formats.iter_mut().find(|f| f.name == format.name) {
            Some(slot) => *slot = format,
            None => self.formats.push(format),
        }
        self
    }

    pub fn with_standard(self) -> Self {
        self.register(Format::new("rbxl", Method::Binary, RootShape::Place))
            .register(Format::new("rbxm", Method::Binary, RootShape::Model))
            .register(Format::new("rbxlx", Method::Markup, RootShape::Place))
            .register(Format::new("rbxmx", Method::Markup, RootShape::Model))
    }

    pub fn build(self) -> FormatRegistry {
        FormatRegistry {
            formats: self.formats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order() {
        let registry = FormatRegistry::standard();
        let names: Vec<&str> = registry.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["rbxl", "rbxm", "rbxlx", "rbxmx"]);
        assert_eq!(registry.get("rbxmx").unwrap().method, Method::Markup);
        assert_eq!(registry.get("rbxm").unwrap().shape, RootShape::Model);
    }

    #[test]
    fn test_unknown_name() {
        let registry = FormatRegistry::standard();
        assert_eq!(
            registry.get("obj").unwrap_err(),
            FormatError::NotRegistered { name: "obj".into() }
        );
        assert!(matches!(
            registry.get(DIRECTORY),
            Err(FormatError::NotRegistered { .. })
        ));
    }

    #[test]
    fn test_guess() {
        let registry = FormatRegistry::standard();
        assert_eq!(registry.guess(Path::new("place.rbxlx")).unwrap().name, "rbxlx");
        assert!(matches!(
            registry.guess(Path::new("notes.txt")),
            Err(FormatError::NotRegistered { name }) if name == "txt"
        ));
        assert!(matches!(
            FormatRegistry::guess_name(Path::new("Makefile")),
            Err(FormatError::CannotGuess { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FormatRegistry::guess_name(dir.path()).unwrap(), DIRECTORY);
    }

    #[test]
    fn test_builder_replaces_by_name() {
        let registry = FormatRegistry::builder()
            .with_standard()
            .register(Format::new("rbxm", Method::Markup, RootShape::Model))
            .build();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("rbxm").unwrap().method, Method::Markup);

        let empty = FormatRegistry::builder().build();
        assert!(empty.is_empty());
        assert_eq!(
            empty.resolve(Path::new("x.rbxm"), Some("rbxl")).unwrap_err(),
            FormatError::NotRegistered { name: "rbxl".into() }
        );
    }
}
