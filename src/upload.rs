use crate::Error;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

const NAME_LENGTH: usize = 24;

/// An uploaded file kept on disk for the length of one request.
///
/// The file is removed when the value is dropped, whichever way the request ends.
#[derive(Debug)]
pub struct ScopedUpload {
    path: PathBuf,
}

impl ScopedUpload {
    /// Write `bytes` to a new randomly named file in `directory`.
    pub fn persist(directory: &Path, bytes: &[u8]) -> Result<Self, Error> {
        fs::create_dir_all(directory)?;
        let name: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NAME_LENGTH)
            .map(char::from)
            .collect();
        // Created before writing so a failed write is cleaned up too.
        let upload = ScopedUpload {
            path: directory.join(format!("upload-{}.pdf", name)),
        };
        fs::write(&upload.path, bytes)?;
        log::trace!("Stored upload at `{}`.", upload.path.display());
        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<u8>, Error> {
        Ok(fs::read(&self.path)?)
    }
}

impl Drop for ScopedUpload {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::trace!("Removed upload `{}`.", self.path.display()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => log::warn!(
                "Could not remove upload `{}`: {}",
                self.path.display(),
                err
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join("pdf_compositor_upload_tests")
    }

    #[test]
    fn file_lives_as_long_as_the_upload() {
        let upload = ScopedUpload::persist(&scratch_dir(), b"%PDF-1.7").unwrap();
        let path = upload.path().to_path_buf();
        assert_eq!(upload.read().unwrap(), b"%PDF-1.7".to_vec());
        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn file_is_removed_on_error_path() {
        let mut seen = None;
        let result = (|| -> Result<(), Error> {
            let upload = ScopedUpload::persist(&scratch_dir(), b"bytes")?;
            seen = Some(upload.path().to_path_buf());
            Err(Error::MissingPdf)
        })();
        assert!(result.is_err());
        assert!(!seen.unwrap().exists());
    }

    #[test]
    fn names_do_not_collide() {
        let first = ScopedUpload::persist(&scratch_dir(), b"a").unwrap();
        let second = ScopedUpload::persist(&scratch_dir(), b"b").unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn already_removed_file_is_fine() {
        let upload = ScopedUpload::persist(&scratch_dir(), b"a").unwrap();
        fs::remove_file(upload.path()).unwrap();
        drop(upload);
    }
}
