//! Disk Blob Store Module
//!
//! A directory-backed [`BlobStore`]: every blob is a payload file plus a JSON
//! sidecar with its display name and metadata.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use crate::cache::store::{BlobStore, Metadata, StoredBlob};
use crate::error::{IconError, Result};

const PAYLOAD_EXTENSION: &str = "bin";
const SIDECAR_EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    id: String,
    display_name: String,
    #[serde(default)]
    metadata: Metadata,
}

// == Disk Blob Store ==
#[derive(Debug, Clone)]
pub struct DiskBlobStore {
    root: PathBuf,
}

impl DiskBlobStore {
    /// Opens the store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "disk blob store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_stem(id: &str) -> String {
        let digest = Sha256::digest(id.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", Self::file_stem(id), PAYLOAD_EXTENSION))
    }

    pub(crate) fn sidecar_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.{}", Self::file_stem(id), SIDECAR_EXTENSION))
    }

    /// Reads the sidecar for `id`.
    ///
    /// A sidecar that does not parse is reported as absent, so the next
    /// upload replaces it.
    async fn read_sidecar(&self, id: &str) -> Result<Option<Sidecar>> {
        let path = self.sidecar_path(id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(sidecar) => Ok(Some(sidecar)),
            Err(err) => {
                warn!(
                    id,
                    path = %path.display(),
                    error = %err,
                    "unreadable sidecar; treating blob as missing"
                );
                Ok(None)
            }
        }
    }

    /// Writes payload and sidecar to temporary siblings, then renames them
    /// into place. Nothing is renamed unless both writes succeeded.
    async fn commit(&self, id: &str, payload: &[u8], sidecar: &Sidecar) -> Result<()> {
        let payload_path = self.payload_path(id);
        let sidecar_path = self.sidecar_path(id);
        let payload_tmp = temp_path(&payload_path);
        let sidecar_tmp = temp_path(&sidecar_path);

        let staged = async {
            let sidecar_bytes = serde_json::to_vec_pretty(sidecar)?;
            fs::write(&payload_tmp, payload).await?;
            fs::write(&sidecar_tmp, sidecar_bytes).await?;
            Ok::<_, IconError>(())
        }
        .await;

        if let Err(err) = staged {
            discard(&payload_tmp).await;
            discard(&sidecar_tmp).await;
            return Err(err);
        }

        fs::rename(&payload_tmp, &payload_path).await?;
        fs::rename(&sidecar_tmp, &sidecar_path).await?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(TEMP_SUFFIX);
    PathBuf::from(tmp)
}

/// Removes a leftover temporary file, if any.
async fn discard(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to remove temporary file")
        }
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(fs::try_exists(self.payload_path(id)).await?
            && fs::try_exists(self.sidecar_path(id)).await?)
    }

    async fn find(&self, id: &str) -> Result<Option<StoredBlob>> {
        let Some(sidecar) = self.read_sidecar(id).await? else {
            return Ok(None);
        };
        if sidecar.id != id {
            return Err(IconError::Store(format!(
                "Sidecar id mismatch for {}: found {}",
                id, sidecar.id
            )));
        }

        let payload = match fs::read(self.payload_path(id)).await {
            Ok(payload) => payload,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(StoredBlob {
            display_name: sidecar.display_name,
            payload,
            metadata: sidecar.metadata,
        }))
    }

    async fn upload(&self, id: &str, display_name: &str, payload: &[u8]) -> Result<()> {
        let metadata = self
            .read_sidecar(id)
            .await?
            .map(|sidecar| sidecar.metadata)
            .unwrap_or_default();
        self.upload_with_metadata(id, display_name, payload, metadata).await
    }

    async fn set_metadata(&self, id: &str, metadata: Metadata) -> Result<()> {
        let Some(mut sidecar) = self.read_sidecar(id).await? else {
            return Err(IconError::Store(format!(
                "Cannot set metadata on missing blob: {}",
                id
            )));
        };
        sidecar.metadata = metadata;

        let sidecar_path = self.sidecar_path(id);
        let tmp = temp_path(&sidecar_path);
        if let Err(err) = fs::write(&tmp, serde_json::to_vec_pretty(&sidecar)?).await {
            discard(&tmp).await;
            return Err(err.into());
        }
        fs::rename(&tmp, &sidecar_path).await?;
        Ok(())
    }

    async fn upload_with_metadata(
        &self,
        id: &str,
        display_name: &str,
        payload: &[u8],
        metadata: Metadata,
    ) -> Result<()> {
        let sidecar = Sidecar {
            id: id.to_string(),
            display_name: display_name.to_string(),
            metadata,
        };
        self.commit(id, payload, &sidecar).await
    }

    async fn len(&self) -> Result<usize> {
        let mut count = 0;
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(SIDECAR_EXTENSION) {
                count += 1;
            }
        }
        Ok(count)
    }
}
