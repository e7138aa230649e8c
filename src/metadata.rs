
use crate::{
    codec::{
        self,
        RECORD_SIZE,
    },
    file_system::ReadError,
    Configuration,
    DiskFileSystem,
    Error,
    FileSystem,
    MetadataRecord,
    Slot,
};
use log::{
    debug,
    error,
    warn,
};
use std::path::{
    Path,
    PathBuf,
};

/// This is what recovery found in one of the two metadata files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotState {
    /// The file does not exist.
    Absent,

    /// The file exists but is shorter than a complete record, which is
    /// what a crash in the middle of writing it leaves behind.
    Torn,

    /// The file holds a complete, well-formed record.
    Valid(MetadataRecord),
}

impl SlotState {
    /// Return the record held in the slot, or the empty record if the slot
    /// holds nothing usable.
    pub fn record(&self) -> MetadataRecord {
        match self {
            SlotState::Valid(record) => *record,
            SlotState::Absent | SlotState::Torn => MetadataRecord::default(),
        }
    }
}

/// This is the outcome of reconciling the two metadata files at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Recovery {
    /// This is the authoritative record as it was found on disk, before
    /// both files were rewritten.
    pub record: MetadataRecord,

    /// This is what was found in each metadata file, in slot order.
    pub slots: [SlotState; 2],
}

impl Recovery {
    pub fn slot(
        &self,
        slot: Slot,
    ) -> SlotState {
        match slot {
            Slot::First => self.slots[0],
            Slot::Second => self.slots[1],
        }
    }

    /// Return the record as it is on disk once recovery has rewritten both
    /// metadata files.  Any further write must use a version after this one.
    pub fn committed(&self) -> Result<MetadataRecord, Error> {
        self.record.bump()?.bump()
    }
}

/// This keeps a server's term and vote in two metadata files within one
/// directory, alternating between them so that a crash in the middle of a
/// write always leaves the previous record intact in the other file.
///
/// No locking is done here.  At most one `MetadataStorage` may operate on a
/// directory at any time, and its operations must not overlap.
pub struct MetadataStorage<F> {
    configuration: Configuration,
    dir: PathBuf,
    file_system: F,
}

impl<F> MetadataStorage<F>
where
    F: FileSystem,
{
    pub fn new<P>(
        file_system: F,
        dir: P,
        configuration: Configuration,
    ) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            configuration,
            dir: dir.into(),
            file_system,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(
        &self,
        slot: Slot,
    ) -> String {
        slot.file_name(&self.configuration.file_name_prefix)
    }

    fn load_slot(
        &self,
        slot: Slot,
    ) -> Result<SlotState, Error> {
        let file_name = self.file_name(slot);
        let exists = self
            .file_system
            .exists(&self.dir, &file_name)
            .map_err(|error| {
                Error::io("check existence of", self.dir.join(&file_name), error)
            })?;
        if !exists {
            return Ok(SlotState::Absent);
        }
        let read_result =
            self.file_system.read_full(&self.dir, &file_name, RECORD_SIZE);
        let content = match read_result {
            Ok(content) if content.len() >= RECORD_SIZE => content,
            Ok(_) | Err(ReadError::ShortRead {
                ..
            }) => {
                // The server must have crashed while writing this file,
                // so pretend it was never written at all.
                warn!("read {}: ignore incomplete data", file_name);
                return Ok(SlotState::Torn);
            },
            Err(ReadError::Io(error)) => {
                return Err(Error::io(
                    "load content of",
                    self.dir.join(&file_name),
                    error,
                ));
            },
        };
        let mut buf = [0; RECORD_SIZE];
        buf.copy_from_slice(&content[..RECORD_SIZE]);
        let record = codec::decode(&buf).map_err(|decode_error| {
            error!("load {}: {}", file_name, decode_error);
            decode_error
        })?;
        if record.is_empty() {
            error!("load {}: version is set to zero", file_name);
            return Err(Error::Corrupt(format!(
                "{} has version zero",
                file_name
            )));
        }
        debug!(
            "{}: version {}, term {}, voted for {}",
            file_name, record.version, record.term, record.voted_for
        );
        Ok(SlotState::Valid(record))
    }

    /// Read both metadata files, decide which record is authoritative,
    /// and rewrite both files so that they exist and hold consecutive
    /// versions of that record.
    pub fn recover(&self) -> Result<Recovery, Error> {
        let first = self.load_slot(Slot::First)?;
        let second = self.load_slot(Slot::Second)?;
        let (record1, record2) = (first.record(), second.record());
        let record = if record1.is_empty() && record2.is_empty() {
            debug!("no metadata found in {}", self.dir.display());
            MetadataRecord::default()
        } else if record1.version == record2.version {
            return Err(Error::Corrupt(format!(
                "{} and {} are both at version {}",
                self.file_name(Slot::First),
                self.file_name(Slot::Second),
                record1.version
            )));
        } else if record1.version > record2.version {
            record1
        } else {
            record2
        };
        let recovery = Recovery {
            record,
            slots: [first, second],
        };

        // Both rewrites must have a version to use before either is made.
        recovery.committed().map_err(|overflow| {
            error!("recover {}: {}", self.dir.display(), overflow);
            overflow
        })?;
        self.normalize(record)?;
        Ok(recovery)
    }

    /// Recover, returning only the authoritative record.
    pub fn load(&self) -> Result<MetadataRecord, Error> {
        self.recover().map(|recovery| recovery.record)
    }

    fn normalize(
        &self,
        mut record: MetadataRecord,
    ) -> Result<(), Error> {
        for _ in 0..2 {
            record = record.bump()?;
            self.store(&record)?;
        }
        self.file_system.sync_directory(&self.dir).map_err(|sync_error| {
            error!("sync {}: {}", self.dir.display(), sync_error);
            Error::io("sync", &self.dir, sync_error)
        })
    }

    /// Durably write the given record into the metadata file selected by
    /// its version.  The record must already carry its new version; this
    /// never changes it.
    pub fn store(
        &self,
        record: &MetadataRecord,
    ) -> Result<(), Error> {
        if record.is_empty() {
            return Err(Error::Corrupt(String::from(
                "refusing to store metadata with version zero",
            )));
        }
        let content = codec::encode(record);
        let file_name = self.file_name(Slot::of(record.version));
        debug!(
            "store {}: version {}, term {}, voted for {}",
            file_name, record.version, record.term, record.voted_for
        );
        self.file_system
            .create_or_replace(&self.dir, &file_name, &content)
            .map_err(|write_error| {
                error!("create {}: {}", file_name, write_error);
                Error::io("create", self.dir.join(&file_name), write_error)
            })
    }
}

/// Recover the metadata kept in the given directory on disk, using the
/// default configuration.
pub fn load<P>(dir: P) -> Result<MetadataRecord, Error>
where
    P: AsRef<Path>,
{
    MetadataStorage::new(
        DiskFileSystem,
        dir.as_ref(),
        Configuration::default(),
    )
    .load()
}

/// Write the given record into the given directory on disk, using the
/// default configuration.
pub fn store<P>(
    dir: P,
    record: &MetadataRecord,
) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    MetadataStorage::new(
        DiskFileSystem,
        dir.as_ref(),
        Configuration::default(),
    )
    .store(record)
}
