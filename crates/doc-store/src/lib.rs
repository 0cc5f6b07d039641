//! DocumentStore - flat JSON document storage for the kiosk hub.
//!
//! Every named document is one JSON file in the store's data directory.
//! Writes go to a temporary file and are atomically renamed into place,
//! so a crash or a concurrent reader never observes a half-written
//! document. A single store-wide lock serializes all writes (to any
//! document); reads are unsynchronized and re-parse the file on every
//! call, so out-of-band edits are picked up on the next read.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error on document {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("corrupt document {name}: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode document {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Flat-file JSON document store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl DocumentStore {
    /// Open a store rooted at `root`, creating the directory on demand.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::Io {
                name: root.display().to_string(),
                source,
            })?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// The data directory this store reads and writes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read and parse the named document, or return `default` if the
    /// file does not exist. Content that exists but does not parse is a
    /// [`StoreError::Corrupt`].
    pub async fn read<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T> {
        let path = self.path(name);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(default),
            Err(source) => {
                return Err(StoreError::Io {
                    name: name.to_string(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            name: name.to_string(),
            source,
        })
    }

    /// Serialize `value` and persist it as the named document.
    ///
    /// The temp-write-then-rename sequence runs under the store-wide
    /// write lock. The lock covers only this window; callers composing
    /// multi-document updates get no cross-document atomicity.
    pub async fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Encode {
            name: name.to_string(),
            source,
        })?;

        let tmp = self.path(&format!("{name}.tmp"));
        let dst = self.path(name);

        let _guard = self.write_lock.lock().await;
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| StoreError::Io {
                name: name.to_string(),
                source,
            })?;
        tokio::fs::rename(&tmp, &dst)
            .await
            .map_err(|source| StoreError::Io {
                name: name.to_string(),
                source,
            })?;

        debug!(name = %name, bytes = json.len(), "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{json, Value};
    use tempfile::TempDir;

    async fn setup() -> (DocumentStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path().join("data")).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn read_missing_returns_default() {
        let (store, _dir) = setup().await;

        let value: Value = store.read("stock.json", json!([])).await.unwrap();
        assert_eq!(value, json!([]));
        // The default is never persisted.
        assert!(!store.root().join("stock.json").exists());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (store, _dir) = setup().await;

        let doc = json!({"beacons": {"b1": [1.0, 2.0]}, "pixel_width": 675});
        store.write("config.json", &doc).await.unwrap();

        let back: Value = store.read("config.json", json!({})).await.unwrap();
        assert_eq!(back, doc);
    }

    #[tokio::test]
    async fn overwrite_replaces_whole_document() {
        let (store, _dir) = setup().await;

        store.write("doc.json", &json!({"a": 1, "b": 2})).await.unwrap();
        store.write("doc.json", &json!({"a": 9})).await.unwrap();

        let back: Value = store.read("doc.json", json!({})).await.unwrap();
        assert_eq!(back, json!({"a": 9}));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let (store, _dir) = setup().await;

        std::fs::write(store.root().join("bad.json"), b"{not json").unwrap();

        let err = store.read::<Value>("bad.json", json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn out_of_band_edits_are_visible() {
        let (store, _dir) = setup().await;

        store.write("doc.json", &json!({"v": 1})).await.unwrap();
        std::fs::write(store.root().join("doc.json"), b"{\"v\": 2}").unwrap();

        let back: Value = store.read("doc.json", json!({})).await.unwrap();
        assert_eq!(back, json!({"v": 2}));
    }

    #[tokio::test]
    async fn concurrent_writes_never_interleave() {
        let (store, _dir) = setup().await;

        // Two large, distinguishable payloads. The file must end up equal
        // to one of them, never a mix of both.
        let a: Vec<u64> = vec![1; 4096];
        let b: Vec<u64> = vec![2; 4096];

        let (s1, s2) = (store.clone(), store.clone());
        let (a1, b1) = (a.clone(), b.clone());
        let w1 = tokio::spawn(async move { s1.write("doc.json", &a1).await });
        let w2 = tokio::spawn(async move { s2.write("doc.json", &b1).await });
        w1.await.unwrap().unwrap();
        w2.await.unwrap().unwrap();

        let back: Vec<u64> = store.read("doc.json", Vec::new()).await.unwrap();
        assert!(back == a || back == b);
    }
}
