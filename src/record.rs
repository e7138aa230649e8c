use crate::Error;
use serde::{
    Deserialize,
    Serialize,
};

/// This is the durable part of a server's state which must survive a crash:
/// the latest term the server has seen and the candidate it voted for in
/// that term.
///
/// The `version` counts how many times the record has been written, and
/// decides which of the two metadata files receives the next write.
/// A version of zero means the record has never been persisted.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
pub struct MetadataRecord {
    pub version: u64,
    pub term: u64,
    pub voted_for: u64,
}

impl MetadataRecord {
    pub fn is_empty(&self) -> bool {
        self.version == 0
    }

    /// Make the record which should be written after this one, carrying
    /// the given term and vote.  There is no record after the one at the
    /// highest representable version.
    pub fn next(
        &self,
        term: u64,
        voted_for: Option<u64>,
    ) -> Result<Self, Error> {
        let version = self.version.checked_add(1).ok_or_else(|| {
            Error::Corrupt(format!(
                "version {} would overflow",
                self.version
            ))
        })?;
        Ok(Self {
            version,
            term,
            voted_for: voted_for.unwrap_or(0),
        })
    }

    /// Return the same term and vote under the following version.
    pub fn bump(&self) -> Result<Self, Error> {
        self.next(self.term, self.vote())
    }

    pub fn vote(&self) -> Option<u64> {
        match self.voted_for {
            0 => None,
            id => Some(id),
        }
    }
}
