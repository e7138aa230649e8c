//! This crate keeps the term and vote of a Raft server in a pair of
//! metadata files, written alternately so that no crash can leave the server
//! without a complete, consistent copy of the most recent record it
//! committed.

mod codec;
mod configuration;
mod error;
mod file_system;
mod metadata;
#[cfg(test)]
mod mock_file_system;
mod persistent_storage;
mod record;
mod slot;
mod worker;

pub use codec::{
    decode,
    encode,
    DISK_FORMAT,
    RECORD_SIZE,
};
pub use configuration::Configuration;
pub use error::Error;
pub use file_system::{
    DiskFileSystem,
    FileSystem,
    ReadError,
};
pub use metadata::{
    load,
    store,
    MetadataStorage,
    Recovery,
    SlotState,
};
pub use persistent_storage::{
    DurableStorage,
    PersistentStorage,
};
pub use record::MetadataRecord;
pub use slot::Slot;
pub use worker::MetadataWorker;
