use crate::{
    codec,
    file_system::ReadError,
    FileSystem,
    MetadataRecord,
};
use std::{
    collections::{
        HashMap,
        HashSet,
    },
    io,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        Arc,
        Mutex,
    },
};

#[derive(Default)]
pub struct Shared {
    pub dirs_touched: HashSet<PathBuf>,
    pub directory_syncs: usize,
    pub fail_directory_sync: bool,
    pub fail_exists: HashSet<String>,
    pub fail_read: HashSet<String>,
    pub fail_write: HashSet<String>,
    pub files: HashMap<String, Vec<u8>>,
    pub writes: Vec<(String, Vec<u8>)>,
}

impl Shared {
    pub fn put_record(
        &mut self,
        name: &str,
        record: MetadataRecord,
    ) {
        self.files.insert(name.into(), codec::encode(&record).to_vec());
    }

    pub fn record(
        &self,
        name: &str,
    ) -> Option<MetadataRecord> {
        self.files.get(name).map(|content| {
            let mut buf = [0; codec::RECORD_SIZE];
            buf.copy_from_slice(&content[..codec::RECORD_SIZE]);
            codec::decode(&buf).expect("mock file holds a bad record")
        })
    }

    /// Return the name of each file written, with the version of the
    /// record written into it, in the order the writes happened.
    pub fn written_versions(&self) -> Vec<(String, u64)> {
        self.writes
            .iter()
            .map(|(name, content)| {
                let mut buf = [0; codec::RECORD_SIZE];
                buf.copy_from_slice(&content[..codec::RECORD_SIZE]);
                let record = codec::decode(&buf)
                    .expect("wrote a bad record into mock file");
                (name.clone(), record.version)
            })
            .collect()
    }
}

fn injected_failure() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "injected failure")
}

pub struct MockFileSystem {
    pub shared: Arc<Mutex<Shared>>,
}

pub struct MockFileSystemBackEnd {
    pub shared: Arc<Mutex<Shared>>,
}

impl MockFileSystem {
    pub fn new() -> (Self, MockFileSystemBackEnd) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                shared: shared.clone(),
            },
            MockFileSystemBackEnd {
                shared,
            },
        )
    }
}

impl FileSystem for MockFileSystem {
    fn exists(
        &self,
        dir: &Path,
        name: &str,
    ) -> io::Result<bool> {
        let mut shared = self.shared.lock().unwrap();
        shared.dirs_touched.insert(dir.to_path_buf());
        if shared.fail_exists.contains(name) {
            return Err(injected_failure());
        }
        Ok(shared.files.contains_key(name))
    }

    fn read_full(
        &self,
        dir: &Path,
        name: &str,
        exact_size: usize,
    ) -> Result<Vec<u8>, ReadError> {
        let mut shared = self.shared.lock().unwrap();
        shared.dirs_touched.insert(dir.to_path_buf());
        if shared.fail_read.contains(name) {
            return Err(ReadError::Io(injected_failure()));
        }
        let content = shared.files.get(name).ok_or_else(|| {
            ReadError::Io(io::Error::from(io::ErrorKind::NotFound))
        })?;
        if content.len() < exact_size {
            return Err(ReadError::ShortRead {
                expected: exact_size,
                found: content.len(),
            });
        }
        Ok(content[..exact_size].to_vec())
    }

    fn create_or_replace(
        &self,
        dir: &Path,
        name: &str,
        content: &[u8],
    ) -> io::Result<()> {
        let mut shared = self.shared.lock().unwrap();
        shared.dirs_touched.insert(dir.to_path_buf());
        if shared.fail_write.contains(name) {
            return Err(injected_failure());
        }
        shared.files.insert(name.into(), content.to_vec());
        shared.writes.push((name.into(), content.to_vec()));
        Ok(())
    }

    fn sync_directory(
        &self,
        dir: &Path,
    ) -> io::Result<()> {
        let mut shared = self.shared.lock().unwrap();
        shared.dirs_touched.insert(dir.to_path_buf());
        if shared.fail_directory_sync {
            return Err(injected_failure());
        }
        shared.directory_syncs += 1;
        Ok(())
    }
}
