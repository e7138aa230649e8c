use std::{
    io,
    path::PathBuf,
};

/// This is the enumeration of all the different kinds of errors which this
/// crate generates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file system primitive failed while operating on the given path.
    #[error("unable to {operation} {}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A metadata file carries a format tag this crate doesn't understand.
    #[error("bad metadata format version {found}")]
    Malformed {
        found: u64,
    },

    /// The metadata on disk is structurally valid but can't be right.
    #[error("metadata corrupt: {0}")]
    Corrupt(String),
}

impl Error {
    pub(crate) fn io<P>(
        operation: &'static str,
        path: P,
        source: io::Error,
    ) -> Self
    where
        P: Into<PathBuf>,
    {
        Error::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
