//! Writing downloaded archives to disk.

use std::{
    io,
    path::{Path, PathBuf},
};

use arffsplit_util::expand_tilde;
use thiserror::Error;
use tokio::{
    fs,
    io::{AsyncWrite, AsyncWriteExt},
};
use tracing::{info, warn};

/// Upper bound on `name (n).ext` candidates tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Error)]
pub enum SaveError {
    /// The handle was released before the save ran.
    #[error("artifact {0} is no longer available")]
    Released(String),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no free file name for {0} in the download directory")]
    NoFreeName(String),
}

/// Directory archives are saved into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDirectory {
    root: PathBuf,
}

impl DownloadDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `explicit` when given, otherwise the platform download directory,
    /// otherwise the working directory.
    pub fn resolve(explicit: Option<&str>) -> Self {
        if let Some(path) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
            return Self::new(expand_tilde(path));
        }
        Self::new(dirs_next::download_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `file_name`, never overwriting an existing file.
    /// Returns the path actually written.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SaveError> {
        fs::create_dir_all(&self.root).await.map_err(|source| SaveError::Io {
            path: self.root.clone(),
            source,
        })?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = self.root.join(candidate_name(file_name, attempt));
            let file = fs::OpenOptions::new().write(true).create_new(true).open(&path).await;
            let file = match file {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(SaveError::Io { path, source }),
            };
            if let Err(source) = fill_reserved(&path, file, bytes).await {
                return Err(SaveError::Io { path, source });
            }
            info!(path = %path.display(), size = bytes.len(), "archive saved");
            return Ok(path);
        }

        Err(SaveError::NoFreeName(file_name.to_string()))
    }
}

/// Write `bytes` into the freshly reserved `path`. A write that does not
/// complete removes the file, so the name stays free for the next save.
async fn fill_reserved<W>(path: &Path, mut writer: W, bytes: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = match writer.write_all(bytes).await {
        Ok(()) => writer.flush().await,
        Err(err) => Err(err),
    };
    drop(writer);
    if written.is_err() {
        if let Err(err) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %err, "partial archive left behind");
        }
    }
    written
}

/// `report.zip`, `report (1).zip`, `report (2).zip`, ...
pub fn candidate_name(file_name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({attempt}).{ext}"),
        _ => format!("{file_name} ({attempt})"),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        pin::Pin,
        task::{Context, Poll},
    };

    use super::*;
    use tempfile::tempdir;

    #[test]
    fn candidate_names_follow_browser_convention() {
        assert_eq!(candidate_name("splits.zip", 0), "splits.zip");
        assert_eq!(candidate_name("splits.zip", 2), "splits (2).zip");
        assert_eq!(candidate_name("archive", 1), "archive (1)");
        assert_eq!(candidate_name(".hidden", 1), ".hidden (1)");
    }

    #[tokio::test]
    async fn save_never_overwrites() {
        let dir = tempdir().unwrap();
        let downloads = DownloadDirectory::new(dir.path().join("nested"));

        let first = downloads.save("splits.zip", b"one").await.unwrap();
        let second = downloads.save("splits.zip", b"two").await.unwrap();

        assert_eq!(first.file_name().unwrap(), "splits.zip");
        assert_eq!(second.file_name().unwrap(), "splits (1).zip");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    /// Accepts `room` bytes, then reports a full disk.
    struct FullDisk {
        room: usize,
    }

    impl AsyncWrite for FullDisk {
        fn poll_write(mut self: Pin<&mut Self>, _: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
            if self.room == 0 {
                return Poll::Ready(Err(io::Error::other("no space left on device")));
            }
            let n = buf.len().min(self.room);
            self.room -= n;
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn interrupted_write_frees_the_name() {
        let dir = tempdir().unwrap();
        let downloads = DownloadDirectory::new(dir.path());
        let reserved = dir.path().join("result.zip");
        std::fs::write(&reserved, &[0u8; 8]).unwrap();

        let err = fill_reserved(&reserved, FullDisk { room: 8 }, &[7u8; 64]).await.unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
        assert!(!reserved.exists());

        let again = downloads.save("result.zip", b"PK\x03\x04").await.unwrap();
        assert_eq!(again, reserved);
        assert_eq!(std::fs::read(&again).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn explicit_directory_wins() {
        let downloads = DownloadDirectory::resolve(Some("/tmp/arffsplit-out"));
        assert_eq!(downloads.root(), Path::new("/tmp/arffsplit-out"));
    }
}
