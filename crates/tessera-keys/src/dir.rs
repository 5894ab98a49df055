//! Key directories: where a [`KeyStore`](crate::KeyStore) reads and writes PEM files.
//!
//! A [`KeyDir`] is a flat namespace of files addressed by relative,
//! `/`-separated names. [`FsKeyDir`] maps it onto a directory tree and
//! [`MemoryKeyDir`] keeps everything in memory.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::{KeyError, Result};

/// File suffixes identifying private and public key files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    pub private_suffix: String,
    pub public_suffix: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            private_suffix: ".private.pem".to_string(),
            public_suffix: ".public.pem".to_string(),
        }
    }
}

/// Which half of a key pair a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHalf {
    Private,
    Public,
}

impl KeyLayout {
    pub fn new(private_suffix: impl Into<String>, public_suffix: impl Into<String>) -> Self {
        Self {
            private_suffix: private_suffix.into(),
            public_suffix: public_suffix.into(),
        }
    }

    pub fn private_file(&self, kid: &str) -> String {
        format!("{kid}{}", self.private_suffix)
    }

    pub fn public_file(&self, kid: &str) -> String {
        format!("{kid}{}", self.public_suffix)
    }

    /// Split a file name into its kid and key half.
    ///
    /// Returns `None` for names matching neither suffix or leaving an empty kid.
    /// The longer suffix is tried first so overlapping suffixes resolve the
    /// same way every time.
    pub fn classify<'a>(&self, name: &'a str) -> Option<(&'a str, KeyHalf)> {
        let mut candidates = [
            (self.private_suffix.as_str(), KeyHalf::Private),
            (self.public_suffix.as_str(), KeyHalf::Public),
        ];
        candidates.sort_by_key(|(suffix, _)| std::cmp::Reverse(suffix.len()));

        candidates.into_iter().find_map(|(suffix, half)| {
            name.strip_suffix(suffix)
                .filter(|kid| !kid.is_empty())
                .map(|kid| (kid, half))
        })
    }
}

/// Storage backing a key store's load and save operations.
pub trait KeyDir: Send + Sync + fmt::Debug {
    /// Relative names of every file, including files in subdirectories.
    fn list(&self) -> Result<Vec<String>>;

    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Write a file, replacing any previous content.
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;
}

/// A key directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsKeyDir {
    root: PathBuf,
}

impl FsKeyDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn walk(&self, dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| KeyError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| KeyError::io(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| KeyError::io(&path, e))?;
            let name = format!("{prefix}{}", entry.file_name().to_string_lossy());

            if file_type.is_dir() {
                self.walk(&path, &format!("{name}/"), out)?;
            } else {
                out.push(name);
            }
        }
        Ok(())
    }
}

impl KeyDir for FsKeyDir {
    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        self.walk(&self.root, "", &mut names)?;
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        fs::read(&path).map_err(|e| KeyError::io(path, e))
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        write_secret_file(&self.root.join(name), bytes)
    }
}

/// Write a file readable only by its owner, creating parent directories.
pub(crate) fn write_secret_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| KeyError::io(parent, e))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| KeyError::io(path, e))?;
    std::io::Write::write_all(&mut file, bytes).map_err(|e| KeyError::io(path, e))
}

/// A key directory held in memory.
#[derive(Debug, Default)]
pub struct MemoryKeyDir {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryKeyDir {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyDir for MemoryKeyDir {
    fn list(&self) -> Result<Vec<String>> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        Ok(files.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files.get(name).cloned().ok_or_else(|| {
            KeyError::io(
                name,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such key file"),
            )
        })
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_classify() {
        let layout = KeyLayout::default();

        assert_eq!(layout.classify("k1.private.pem"), Some(("k1", KeyHalf::Private)));
        assert_eq!(layout.classify("k2.public.pem"), Some(("k2", KeyHalf::Public)));
        assert_eq!(layout.classify(".private.pem"), None);
        assert_eq!(layout.classify("notes.txt"), None);
        assert_eq!(layout.private_file("k1"), "k1.private.pem");
        assert_eq!(layout.public_file("k1"), "k1.public.pem");
    }

    #[test]
    fn test_layout_overlapping_suffixes() {
        let layout = KeyLayout::new(".key", ".pub.key");

        assert_eq!(layout.classify("k1.pub.key"), Some(("k1", KeyHalf::Public)));
        assert_eq!(layout.classify("k1.key"), Some(("k1", KeyHalf::Private)));
    }

    #[test]
    fn test_fs_dir_walks_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let dir = FsKeyDir::new(tmp.path());

        dir.write("top.pem", b"a").unwrap();
        dir.write("nested/deeper/inner.pem", b"b").unwrap();

        let mut names = dir.list().unwrap();
        names.sort();
        assert_eq!(names, vec!["nested/deeper/inner.pem", "top.pem"]);
        assert_eq!(dir.read("nested/deeper/inner.pem").unwrap(), b"b");
    }

    #[cfg(unix)]
    #[test]
    fn test_fs_dir_writes_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = FsKeyDir::new(tmp.path());
        dir.write("k.private.pem", b"secret").unwrap();

        let mode = fs::metadata(tmp.path().join("k.private.pem"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_fs_dir_missing_root() {
        let tmp = TempDir::new().unwrap();
        let dir = FsKeyDir::new(tmp.path().join("absent"));
        assert!(matches!(dir.list(), Err(KeyError::Io { .. })));
    }

    #[test]
    fn test_memory_dir() {
        let dir = MemoryKeyDir::new();
        assert!(dir.is_empty());

        dir.write("b", b"2").unwrap();
        dir.write("a", b"1").unwrap();
        dir.write("a", b"3").unwrap();

        assert_eq!(dir.len(), 2);
        assert_eq!(dir.list().unwrap(), vec!["a", "b"]);
        assert_eq!(dir.read("a").unwrap(), b"3");
        assert!(matches!(dir.read("c"), Err(KeyError::Io { .. })));
    }

    proptest! {
        #[test]
        fn prop_layout_file_names_classify_back(kid in "[a-z0-9][a-z0-9_.-]{0,16}") {
            let layout = KeyLayout::default();
            let private = layout.private_file(&kid);
            let public = layout.public_file(&kid);

            prop_assert_eq!(layout.classify(&private), Some((kid.as_str(), KeyHalf::Private)));
            prop_assert_eq!(layout.classify(&public), Some((kid.as_str(), KeyHalf::Public)));
        }
    }
}
