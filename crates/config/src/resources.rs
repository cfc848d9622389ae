//! Lookup of `classpath:` resources.
//!
//! A resource path is a relative, `/`-separated name. [`ResourceRoots`]
//! searches a list of directories in order; an [`include_dir::Dir`] serves
//! resources compiled into the binary.

use std::{
    env,
    io,
    path::{Path, PathBuf},
};

use tracing::trace;

use crate::error::{ConfigError, Result};

/// Environment variable listing resource root directories.
pub const RESOURCE_PATH_ENV: &str = "WEBCALL_RESOURCE_PATH";

/// Reads named resources.
pub trait ResourceLocator: Send + Sync {
    /// Read the full contents of a resource.
    ///
    /// Returns [`ConfigError::ResourceNotFound`] when no such resource exists.
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Ordered list of directories searched for resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceRoots {
    roots: Vec<PathBuf>,
}

impl ResourceRoots {
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Roots from `WEBCALL_RESOURCE_PATH`, or the current directory.
    pub fn from_env() -> Self {
        match env::var_os(RESOURCE_PATH_ENV) {
            Some(paths) if !paths.is_empty() => Self::new(env::split_paths(&paths)),
            _ => Self::new([PathBuf::from(".")]),
        }
    }

    /// Append a root searched after the existing ones.
    pub fn push(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn candidate(root: &Path, path: &str) -> PathBuf {
        root.join(path.trim_start_matches('/'))
    }
}

impl ResourceLocator for ResourceRoots {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        for root in &self.roots {
            let candidate = Self::candidate(root, path);
            match std::fs::read(&candidate) {
                Ok(bytes) => {
                    trace!(resource = path, file = %candidate.display(), "resolved resource");
                    return Ok(bytes);
                },
                Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
                    continue;
                },
                Err(source) => {
                    return Err(ConfigError::ResourceRead {
                        path: path.to_string(),
                        source,
                    });
                },
            }
        }
        Err(ConfigError::ResourceNotFound {
            path: path.to_string(),
        })
    }
}

impl ResourceLocator for include_dir::Dir<'static> {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.get_file(path.trim_start_matches('/'))
            .map(|f| f.contents().to_vec())
            .ok_or_else(|| ConfigError::ResourceNotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, include_dir::include_dir};

    static FIXTURES: include_dir::Dir<'static> =
        include_dir!("$CARGO_MANIFEST_DIR/tests/fixtures");

    #[test]
    fn searches_roots_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("app.properties"), "from=second").unwrap();
        std::fs::create_dir(first.path().join("conf")).unwrap();
        std::fs::write(first.path().join("conf/app.properties"), "from=first").unwrap();

        let roots = ResourceRoots::new([first.path(), second.path()]);
        assert_eq!(roots.read("app.properties").unwrap(), b"from=second");
        assert_eq!(roots.read("/conf/app.properties").unwrap(), b"from=first");
    }

    #[test]
    fn missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let roots = ResourceRoots::new([dir.path()]);
        let err = roots.read("nope.properties").unwrap_err();
        assert!(matches!(err, ConfigError::ResourceNotFound { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn directory_is_not_a_resource() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let roots = ResourceRoots::new([dir.path()]);
        assert!(roots.read("sub").is_err());
    }

    #[test]
    fn embedded_resources() {
        let bytes = FIXTURES.read("embedded/base.properties").unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("Embedded=yes"));
        assert!(FIXTURES.read("embedded/missing.properties").is_err());
    }
}
