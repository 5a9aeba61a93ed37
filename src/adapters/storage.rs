use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn relative_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_path).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let root = self.base_path.join(dir);
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            for entry in fs::read_dir(&current)? {
                let entry = entry?;
                let path = entry.path();
                if entry.file_type()?.is_dir() {
                    pending.push(path);
                } else if let Some(name) = self.relative_name(&path) {
                    files.push(name);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    async fn exists(&self, path: &str) -> bool {
        self.base_path.join(path).exists()
    }

    async fn clear(&self) -> Result<()> {
        if self.base_path.exists() {
            tracing::debug!("Removing {}", self.base_path.display());
            fs::remove_dir_all(&self.base_path)?;
        }
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }
}
