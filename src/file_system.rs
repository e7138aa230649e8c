use std::{
    fs::{
        self,
        File,
    },
    io::{
        self,
        Read as _,
        Write as _,
    },
    path::Path,
};

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The file holds fewer bytes than were asked for.
    #[error("expected {expected} bytes but only found {found}")]
    ShortRead {
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// This is the set of file system primitives the metadata files are kept
/// with.  Every operation names the directory and the file explicitly and
/// blocks until it completes.
pub trait FileSystem: Send {
    fn exists(
        &self,
        dir: &Path,
        name: &str,
    ) -> io::Result<bool>;

    /// Read the first `exact_size` bytes of the file.  A file which is
    /// shorter than that yields [`ReadError::ShortRead`] rather than a
    /// generic I/O error.
    ///
    /// [`ReadError::ShortRead`]: enum.ReadError.html#variant.ShortRead
    fn read_full(
        &self,
        dir: &Path,
        name: &str,
        exact_size: usize,
    ) -> Result<Vec<u8>, ReadError>;

    /// Make `content` the sole content of the file, creating the file if
    /// needed.  On success the new content is durable.  If interrupted, the
    /// file is left either with its previous content or short, never with
    /// a mixture of old and new bytes.
    fn create_or_replace(
        &self,
        dir: &Path,
        name: &str,
        content: &[u8],
    ) -> io::Result<()>;

    /// Make the directory's entries durable.
    fn sync_directory(
        &self,
        dir: &Path,
    ) -> io::Result<()>;
}

fn write_scratch(
    path: &Path,
    content: &[u8],
) -> io::Result<()> {
    let mut scratch = File::create(path)?;
    scratch.write_all(content)?;
    scratch.sync_all()
}

/// This is the [`FileSystem`] backed by the operating system.
///
/// [`FileSystem`]: trait.FileSystem.html
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn exists(
        &self,
        dir: &Path,
        name: &str,
    ) -> io::Result<bool> {
        match fs::metadata(dir.join(name)) {
            Ok(_) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn read_full(
        &self,
        dir: &Path,
        name: &str,
        exact_size: usize,
    ) -> Result<Vec<u8>, ReadError> {
        let file = File::open(dir.join(name))?;
        let mut content = Vec::with_capacity(exact_size);
        file.take(exact_size as u64).read_to_end(&mut content)?;
        if content.len() < exact_size {
            return Err(ReadError::ShortRead {
                expected: exact_size,
                found: content.len(),
            });
        }
        Ok(content)
    }

    fn create_or_replace(
        &self,
        dir: &Path,
        name: &str,
        content: &[u8],
    ) -> io::Result<()> {
        // The new content goes into a scratch file first, which is then
        // renamed over the real one.
        let scratch_path = dir.join(format!(".{}.tmp", name));
        let replaced = write_scratch(&scratch_path, content)
            .and_then(|()| fs::rename(&scratch_path, dir.join(name)));
        if let Err(error) = replaced {
            let _ = fs::remove_file(&scratch_path);
            return Err(error);
        }
        self.sync_directory(dir)
    }

    #[cfg(unix)]
    fn sync_directory(
        &self,
        dir: &Path,
    ) -> io::Result<()> {
        File::open(dir)?.sync_all()
    }

    #[cfg(not(unix))]
    fn sync_directory(
        &self,
        _dir: &Path,
    ) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_does_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!DiskFileSystem.exists(dir.path(), "metadata1").unwrap());
    }

    #[test]
    fn create_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        DiskFileSystem
            .create_or_replace(dir.path(), "metadata1", b"hello, world")
            .unwrap();
        assert!(DiskFileSystem.exists(dir.path(), "metadata1").unwrap());
        let content =
            DiskFileSystem.read_full(dir.path(), "metadata1", 5).unwrap();
        assert_eq!(b"hello", &content[..]);
    }

    #[test]
    fn replace_leaves_only_the_new_content() {
        let dir = tempfile::tempdir().unwrap();
        DiskFileSystem
            .create_or_replace(dir.path(), "metadata2", b"first version")
            .unwrap();
        DiskFileSystem
            .create_or_replace(dir.path(), "metadata2", b"second")
            .unwrap();
        assert_eq!(
            b"second".to_vec(),
            fs::read(dir.path().join("metadata2")).unwrap()
        );
        let names = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect::<Vec<_>>();
        assert_eq!(vec![std::ffi::OsString::from("metadata2")], names);
    }

    #[test]
    fn failed_replace_leaves_no_scratch_file() {
        let dir = tempfile::tempdir().unwrap();

        // A non-empty directory in the way makes the rename fail.
        fs::create_dir(dir.path().join("metadata1")).unwrap();
        fs::write(dir.path().join("metadata1").join("occupied"), b"x")
            .unwrap();
        assert!(DiskFileSystem
            .create_or_replace(dir.path(), "metadata1", b"new content")
            .is_err());
        assert!(!dir.path().join(".metadata1.tmp").exists());
        let names = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect::<Vec<_>>();
        assert_eq!(vec![std::ffi::OsString::from("metadata1")], names);
    }

    #[test]
    fn short_file_is_short_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("metadata1"), [1, 2, 3]).unwrap();
        assert!(matches!(
            DiskFileSystem.read_full(dir.path(), "metadata1", 32),
            Err(ReadError::ShortRead {
                expected: 32,
                found: 3,
            })
        ));
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DiskFileSystem.read_full(dir.path(), "metadata1", 32),
            Err(ReadError::Io(_))
        ));
    }

    #[test]
    fn sync_directory_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        DiskFileSystem.sync_directory(dir.path()).unwrap();
    }
}
