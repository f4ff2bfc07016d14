use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read-only source of named assets.
pub trait AssetStore {
    /// Reads the whole asset. Absent names fail with [`io::ErrorKind::NotFound`].
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Assets resolved relative to a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetStore for DirAssets {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        // Asset names are flat; refuse anything that could escape the root.
        let path = Path::new(name);
        let mut components = path.components();
        let bare = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
        if !bare {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("asset name `{name}` must be a bare file name"),
            ));
        }
        std::fs::read(self.root.join(path))
    }
}

/// In-memory assets, e.g. bytes embedded with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), bytes.into());
    }
}

impl AssetStore for MemoryAssets {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.entries.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("asset `{name}` not found"))
        })
    }
}

/// Failure to produce a bitmap from a named asset.
#[derive(Debug)]
pub enum AssetError {
    Read { name: String, source: io::Error },
    Decode { name: String, source: image::ImageError },
}

impl AssetError {
    pub fn name(&self) -> &str {
        match self {
            AssetError::Read { name, .. } | AssetError::Decode { name, .. } => name,
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Read { name, source } => write!(f, "failed to read asset `{name}`: {source}"),
            AssetError::Decode { name, source } => {
                write!(f, "failed to decode asset `{name}`: {source}")
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Read { source, .. } => Some(source),
            AssetError::Decode { source, .. } => Some(source),
        }
    }
}
