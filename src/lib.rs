//! # paged-litedb
//! An embedded, single-file, paged document store in the manner of [LiteDB] v4.
//!
//! The whole database lives in one file of 4096-byte pages. Each collection owns a
//! collection page, a free-space ordered list of data pages and up to 16 skip-list
//! indexes. Writes are serialized by a single reader/writer lock; any number of
//! readers run concurrently.
//!
//! ```no_run
//! use paged_litedb::{BsonAutoId, LiteEngine, LiteSettings, MemoryDisk, Query, document};
//!
//! let engine = LiteEngine::new(LiteSettings::new(MemoryDisk::new()))?;
//! engine.insert("users", vec![document! { "name" => "alice" }], BsonAutoId::Int32)?;
//! let found = engine.find("users", Query::eq("name", "alice"), 0, usize::MAX)?;
//! assert_eq!(found.len(), 1);
//! # Ok::<(), paged_litedb::Error>(())
//! ```
//!
//! [LiteDB]: <https://www.litedb.org/>

#![allow(clippy::too_many_arguments)]

use crate::bson::Value;
use std::fmt::Display;

#[macro_use]
pub mod bson;
#[macro_use]
mod engine;
mod utils;

pub use engine::{
    BsonAutoId, DiskService, FileDisk, IndexInfo, LiteEngine, LiteSettings, MemoryDisk,
    PAGE_SIZE, PageCipher, Query, QueryPredicate,
};
pub use utils::Order;

pub type Result<T> = std::result::Result<T, Error>;

pub struct Error(Box<ErrorImpl>);

use err_impl::Error as ErrorImpl;

mod err_impl {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    pub(crate) enum Error {
        #[error("Invalid database file")]
        InvalidDatabaseFile,
        #[error("Invalid database file version: {0}")]
        InvalidDatabaseVersion(u8),
        #[error("Invalid password")]
        WrongPassword,
        #[error("Invalid page at {0}")]
        InvalidPage(u32),
        #[error("Invalid BSON: {0}")]
        InvalidBson(#[from] bson::ParseError),

        #[error("Collection '{0}' has reached the limit of indexes")]
        IndexLimitExceeded(String),
        #[error("Duplicate index key in unique index `{index}`, key: {key:?}")]
        DuplicateKey { index: String, key: Value },
        #[error("Invalid index key: Index key too long")]
        IndexKeyTooLong,
        #[error("Invalid index key: {0:?} is not supported as index key")]
        InvalidIndexKey(Value),
        #[error("Index '{0}' not found")]
        IndexNotFound(String),
        #[error("Index '{0}' already exists with different options")]
        IndexAlreadyExists(String),
        #[error("Invalid index field: {0}")]
        InvalidIndexField(String),

        #[error("Collection '{0}' not found")]
        CollectionNotFound(String),
        #[error("Collection '{0}' already exists")]
        CollectionAlreadyExists(String),
        #[error("This database has reached the limit of collections")]
        CollectionLimitExceeded,
        #[error("Invalid collection name: {0}")]
        InvalidCollectionName(String),

        #[error("Invalid _id: {0:?}")]
        InvalidId(Value),
        #[error("Document size exceeds {0} bytes")]
        DocumentSizeExceeded(usize),

        #[error("Timeout while acquiring the {0} lock")]
        LockTimeout(&'static str),

        #[error(transparent)]
        Io(#[from] std::io::Error),
    }
}

/// The kind of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    InvalidDatabaseFile,
    InvalidDatabaseVersion,
    WrongPassword,
    InvalidPage,
    InvalidBson,
    IndexLimitExceeded,
    DuplicateKey,
    IndexKeyTooLong,
    InvalidIndexKey,
    IndexNotFound,
    IndexAlreadyExists,
    InvalidIndexField,
    CollectionNotFound,
    CollectionAlreadyExists,
    CollectionLimitExceeded,
    InvalidCollectionName,
    InvalidId,
    DocumentSizeExceeded,
    LockTimeout,
    Io,
}

impl Error {
    fn new(inner: ErrorImpl) -> Error {
        Error(Box::new(inner))
    }

    pub fn kind(&self) -> ErrorKind {
        match self.0.as_ref() {
            ErrorImpl::InvalidDatabaseFile => ErrorKind::InvalidDatabaseFile,
            ErrorImpl::InvalidDatabaseVersion(_) => ErrorKind::InvalidDatabaseVersion,
            ErrorImpl::WrongPassword => ErrorKind::WrongPassword,
            ErrorImpl::InvalidPage(_) => ErrorKind::InvalidPage,
            ErrorImpl::InvalidBson(_) => ErrorKind::InvalidBson,
            ErrorImpl::IndexLimitExceeded(_) => ErrorKind::IndexLimitExceeded,
            ErrorImpl::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            ErrorImpl::IndexKeyTooLong => ErrorKind::IndexKeyTooLong,
            ErrorImpl::InvalidIndexKey(_) => ErrorKind::InvalidIndexKey,
            ErrorImpl::IndexNotFound(_) => ErrorKind::IndexNotFound,
            ErrorImpl::IndexAlreadyExists(_) => ErrorKind::IndexAlreadyExists,
            ErrorImpl::InvalidIndexField(_) => ErrorKind::InvalidIndexField,
            ErrorImpl::CollectionNotFound(_) => ErrorKind::CollectionNotFound,
            ErrorImpl::CollectionAlreadyExists(_) => ErrorKind::CollectionAlreadyExists,
            ErrorImpl::CollectionLimitExceeded => ErrorKind::CollectionLimitExceeded,
            ErrorImpl::InvalidCollectionName(_) => ErrorKind::InvalidCollectionName,
            ErrorImpl::InvalidId(_) => ErrorKind::InvalidId,
            ErrorImpl::DocumentSizeExceeded(_) => ErrorKind::DocumentSizeExceeded,
            ErrorImpl::LockTimeout(_) => ErrorKind::LockTimeout,
            ErrorImpl::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns true if the operation can succeed by retrying later
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::LockTimeout
    }

    /// The disk ended before a whole page could be read
    pub(crate) fn is_unexpected_eof(&self) -> bool {
        matches!(self.0.as_ref(), ErrorImpl::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }

    pub(crate) fn invalid_database() -> Error {
        Error::new(ErrorImpl::InvalidDatabaseFile)
    }

    pub(crate) fn invalid_database_version(version: u8) -> Error {
        Error::new(ErrorImpl::InvalidDatabaseVersion(version))
    }

    pub(crate) fn wrong_password() -> Error {
        Error::new(ErrorImpl::WrongPassword)
    }

    pub(crate) fn invalid_page(page_id: u32) -> Error {
        Error::new(ErrorImpl::InvalidPage(page_id))
    }

    pub(crate) fn index_limit_exceeded(collection: &str) -> Error {
        Error::new(ErrorImpl::IndexLimitExceeded(collection.to_string()))
    }

    pub(crate) fn index_duplicate_key(index: &str, key: Value) -> Error {
        Error::new(ErrorImpl::DuplicateKey {
            index: index.to_string(),
            key,
        })
    }

    pub(crate) fn index_key_too_long() -> Error {
        Error::new(ErrorImpl::IndexKeyTooLong)
    }

    pub(crate) fn invalid_index_key(key: &Value) -> Error {
        Error::new(ErrorImpl::InvalidIndexKey(key.clone()))
    }

    pub(crate) fn index_not_found(field: &str) -> Error {
        Error::new(ErrorImpl::IndexNotFound(field.to_string()))
    }

    pub(crate) fn index_already_exists(field: &str) -> Error {
        Error::new(ErrorImpl::IndexAlreadyExists(field.to_string()))
    }

    pub(crate) fn invalid_index_field(field: &str) -> Error {
        Error::new(ErrorImpl::InvalidIndexField(field.to_string()))
    }

    pub(crate) fn collection_not_found(name: &str) -> Error {
        Error::new(ErrorImpl::CollectionNotFound(name.to_string()))
    }

    pub(crate) fn collection_already_exists(name: &str) -> Error {
        Error::new(ErrorImpl::CollectionAlreadyExists(name.to_string()))
    }

    pub(crate) fn collection_limit_exceeded() -> Error {
        Error::new(ErrorImpl::CollectionLimitExceeded)
    }

    pub(crate) fn invalid_collection_name(name: &str) -> Error {
        Error::new(ErrorImpl::InvalidCollectionName(name.to_string()))
    }

    pub(crate) fn invalid_id(id: &Value) -> Error {
        Error::new(ErrorImpl::InvalidId(id.clone()))
    }

    pub(crate) fn document_size_exceeded(limit: usize) -> Error {
        Error::new(ErrorImpl::DocumentSizeExceeded(limit))
    }

    pub(crate) fn lock_timeout(mode: &'static str) -> Error {
        Error::new(ErrorImpl::LockTimeout(mode))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <ErrorImpl as std::fmt::Debug>::fmt(&self.0, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0.as_ref())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::new(ErrorImpl::Io(value))
    }
}

impl From<bson::ParseError> for Error {
    fn from(value: bson::ParseError) -> Self {
        Error::new(ErrorImpl::InvalidBson(value))
    }
}
