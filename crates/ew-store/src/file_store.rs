//! Reference `EnvelopeStore` implementation: a single JSON file written via
//! write-to-temp + atomic rename.

use crate::envelope::Envelope;
use crate::error::Result;
use crate::store::EnvelopeStore;
use std::fs;
use std::path::{Path, PathBuf};

/// Persists the envelope as JSON at a fixed path, using the standard
/// "atomic at the envelope level" pattern: write to a sibling temp file,
/// `fsync`, then rename over the target. A crash between write and rename
/// leaves the old file untouched; a crash after rename leaves the new file
/// in place. Neither leaves a half-written envelope observable.
pub struct FileEnvelopeStore {
    path: PathBuf,
}

impl FileEnvelopeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileEnvelopeStore { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        let file_name = temp
            .file_name()
            .map(|n| format!("{}.tmp", n.to_string_lossy()))
            .unwrap_or_else(|| "envelope.tmp".to_string());
        temp.set_file_name(file_name);
        temp
    }

    fn write_atomic(&self, contents: &[u8]) -> Result<()> {
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path)?;
            use std::io::Write;
            file.write_all(contents)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        if let Some(dir) = self.path.parent() {
            sync_dir_best_effort(dir);
        }
        Ok(())
    }
}

/// Best-effort directory fsync after a rename so the rename itself survives
/// a crash on filesystems that need it. Not fatal if unsupported.
fn sync_dir_best_effort(dir: &Path) {
    if let Ok(dir_file) = fs::File::open(dir) {
        let _ = dir_file.sync_all();
    }
}

impl EnvelopeStore for FileEnvelopeStore {
    fn load(&self) -> Result<Option<Envelope>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, envelope: &Envelope) -> Result<()> {
        let json = serde_json::to_vec_pretty(envelope)?;
        self.write_atomic(&json)
    }

    fn remove_auth_token(&self) -> Result<()> {
        if let Some(mut envelope) = self.load()? {
            envelope.auth_token = String::new();
            self.save(&envelope)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
