//! Errors returned to collaborators.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::text::Position;

/// An edit the worksheet refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("the worksheet is executing")]
    Busy,
    #[error("result lines can't be edited")]
    ReadOnly,
    #[error("no position {0} in the worksheet")]
    InvalidPosition(Position),
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("no current or specified filename")]
    NoFilename,
    #[error("can't read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },
    #[error("can't write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Edit(#[from] EditError),
}
