use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use shared::types::Product;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::StoreError;

/// The whole product list as one JSON array on disk.
///
/// Every `save` is a full replace: the document is written to a sibling
/// temp file and renamed over the original, so readers see either the old
/// list or the new one.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current list, creating an empty document on first access.
    /// Blank content counts as an empty list.
    pub async fn load(&self) -> Result<Vec<Product>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return self.initialize().await,
            Err(source) => return Err(self.io_error("read", source)),
        };

        self.decode(&contents)
    }

    /// Create the empty document without ever truncating one that appeared
    /// since the read, e.g. a concurrent save renaming its temp file in.
    async fn initialize(&self) -> Result<Vec<Product>, StoreError> {
        let created = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await;

        match created {
            Ok(mut file) => {
                info!("Initializing empty product store at {}", self.path.display());
                file.write_all(b"[]")
                    .await
                    .map_err(|source| self.io_error("create", source))?;
                file.flush()
                    .await
                    .map_err(|source| self.io_error("create", source))?;
                Ok(Vec::new())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Product store {} appeared during load, re-reading", self.path.display());
                let contents = tokio::fs::read_to_string(&self.path)
                    .await
                    .map_err(|source| self.io_error("read", source))?;
                self.decode(&contents)
            }
            Err(source) => Err(self.io_error("create", source)),
        }
    }

    fn decode(&self, contents: &str) -> Result<Vec<Product>, StoreError> {
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(contents).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save(&self, products: &[Product]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(products).map_err(StoreError::Encode)?;
        let tmp = self.temp_path();

        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| self.io_error("write", source))?;

        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.io_error("replace", source));
        }

        debug!(
            "Saved {} products ({} bytes) to {}",
            products.len(),
            json.len(),
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "products.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }

    fn io_error(&self, action: &'static str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }
}
