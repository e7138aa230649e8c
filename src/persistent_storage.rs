
use crate::{
    Error,
    FileSystem,
    MetadataRecord,
    MetadataStorage,
};
use log::info;

/// This is the interface a Raft server uses to keep its current term and
/// vote across restarts.
pub trait PersistentStorage: Send {
    fn term(&self) -> u64;
    fn voted_for(&self) -> Option<u64>;

    /// Durably record a new term and vote.  If this fails, the previous
    /// term and vote remain in effect.
    fn update(
        &mut self,
        term: u64,
        voted_for: Option<u64>,
    ) -> Result<(), Error>;
}

/// This is the [`PersistentStorage`] kept in the two metadata files of a
/// [`MetadataStorage`].
///
/// [`PersistentStorage`]: trait.PersistentStorage.html
/// [`MetadataStorage`]: struct.MetadataStorage.html
pub struct DurableStorage<F> {
    record: MetadataRecord,
    storage: MetadataStorage<F>,
}

impl<F> DurableStorage<F>
where
    F: FileSystem,
{
    /// Recover the metadata from the given storage.
    pub fn open(storage: MetadataStorage<F>) -> Result<Self, Error> {
        let recovery = storage.recover()?;
        let record = recovery.committed()?;
        info!(
            "Recovered term {} (voted for {:?}) from {}",
            record.term,
            record.vote(),
            storage.dir().display()
        );
        Ok(Self {
            record,
            storage,
        })
    }

    /// Return the record most recently committed.
    pub fn record(&self) -> MetadataRecord {
        self.record
    }
}

impl<F> PersistentStorage for DurableStorage<F>
where
    F: FileSystem,
{
    fn term(&self) -> u64 {
        self.record.term
    }

    fn voted_for(&self) -> Option<u64> {
        self.record.vote()
    }

    fn update(
        &mut self,
        term: u64,
        voted_for: Option<u64>,
    ) -> Result<(), Error> {
        let record = self.record.next(term, voted_for)?;
        self.storage.store(&record)?;
        self.record = record;
        Ok(())
    }
}
