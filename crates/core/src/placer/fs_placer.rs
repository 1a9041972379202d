use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use super::error::PlacerError;
use super::traits::Placer;
use super::types::{FilePlacement, PlacedFile};

const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Copies files on the local file system.
///
/// The destination is opened with `create_new`, so the file system itself
/// arbitrates between two writers racing for the same path.
pub struct FsPlacer {
    buffer_size: usize,
}

impl FsPlacer {
    pub fn with_defaults() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    #[cfg(test)]
    fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    async fn open_destination(placement: &FilePlacement) -> Result<File, PlacerError> {
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&placement.destination)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => PlacerError::DestinationExists {
                    path: placement.destination.clone(),
                },
                _ => PlacerError::copy_failed(
                    placement.source.clone(),
                    placement.destination.clone(),
                    e,
                ),
            })
    }

    /// Streams source into `dest_file`, hashing along the way when asked.
    async fn copy_into(
        &self,
        placement: &FilePlacement,
        dest_file: File,
    ) -> Result<(u64, Option<String>), PlacerError> {
        let fail = |e: std::io::Error| {
            PlacerError::copy_failed(placement.source.clone(), placement.destination.clone(), e)
        };

        let mut source = File::open(&placement.source).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                PlacerError::SourceNotFound {
                    path: placement.source.clone(),
                }
            } else {
                fail(e)
            }
        })?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, dest_file);
        let mut hasher = placement.verify_checksum.then(Sha256::new);
        let mut buffer = vec![0u8; self.buffer_size];
        let mut copied = 0u64;

        loop {
            let n = source.read(&mut buffer).await.map_err(fail)?;
            if n == 0 {
                break;
            }
            if let Some(h) = hasher.as_mut() {
                h.update(&buffer[..n]);
            }
            writer.write_all(&buffer[..n]).await.map_err(fail)?;
            copied += n as u64;
        }
        writer.flush().await.map_err(fail)?;

        Ok((copied, hasher.map(|h| format!("{:x}", h.finalize()))))
    }

    async fn sha256_of(&self, reader: impl AsyncRead + Unpin) -> std::io::Result<String> {
        let mut reader = reader;
        let mut buffer = vec![0u8; self.buffer_size];
        let mut hasher = Sha256::new();
        loop {
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }

    async fn copy_and_verify(&self, placement: &FilePlacement) -> Result<PlacedFile, PlacerError> {
        let dest_file = Self::open_destination(placement).await?;
        let (size_bytes, checksum) = self.copy_into(placement, dest_file).await?;

        if let Some(expected) = &checksum {
            let fail = |e: std::io::Error| {
                PlacerError::copy_failed(
                    placement.source.clone(),
                    placement.destination.clone(),
                    e,
                )
            };
            let written = File::open(&placement.destination).await.map_err(fail)?;
            let actual = self.sha256_of(written).await.map_err(fail)?;
            if &actual != expected {
                return Err(PlacerError::ChecksumMismatch {
                    path: placement.destination.clone(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        Ok(PlacedFile {
            destination: placement.destination.clone(),
            size_bytes,
            checksum,
        })
    }
}

async fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(destination = ?path, "Failed to remove partial copy: {}", e);
        }
    }
}

#[async_trait]
impl Placer for FsPlacer {
    fn name(&self) -> &str {
        "fs"
    }

    async fn place(&self, placement: FilePlacement) -> Result<PlacedFile, PlacerError> {
        if !placement.source.exists() {
            return Err(PlacerError::SourceNotFound {
                path: placement.source.clone(),
            });
        }

        if let Some(parent) = placement.destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| PlacerError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        match self.copy_and_verify(&placement).await {
            Ok(placed) => {
                debug!(
                    destination = ?placed.destination,
                    bytes = placed.size_bytes,
                    "Placed file"
                );
                Ok(placed)
            }
            // Someone else's file; leave it alone
            Err(e @ PlacerError::DestinationExists { .. }) => Err(e),
            Err(e) => {
                remove_partial(&placement.destination).await;
                Err(e)
            }
        }
    }
}
