/// The size of each page in disk
pub const PAGE_SIZE: usize = 4096;
/// header size of each page
pub(crate) const PAGE_HEADER_SIZE: usize = 25;
/// bytes available for the content of each page
pub(crate) const PAGE_AVAILABLE_BYTES: usize = PAGE_SIZE - PAGE_HEADER_SIZE;

/// sentinel of page ids meaning "no page"
pub(crate) const NO_PAGE: u32 = u32::MAX;

pub(crate) const HEADER_INFO: &[u8] = b"** This is a LiteDB file **";
pub(crate) const FILE_VERSION: u8 = 7;

pub(crate) const INDEX_PER_COLLECTION: usize = 16;
pub(crate) const MAX_LEVEL_LENGTH: u8 = 32;
pub(crate) const MAX_INDEX_KEY_LENGTH: usize = 512;
/// max length of the (dotted) field name of an index
pub(crate) const MAX_INDEX_FIELD_LENGTH: usize = 32;
pub(crate) const MAX_COLLECTION_NAME_LENGTH: usize = 60;

/// max size of a serialized document
pub(crate) const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// index page is kept in the free list while it has more free bytes than this
pub(crate) const INDEX_RESERVED_BYTES: usize = 100;
/// data page is kept in the free list while it has more free bytes than this
pub(crate) const DATA_RESERVED_BYTES: usize = PAGE_AVAILABLE_BYTES / 2;

pub(crate) const DEFAULT_CHECKPOINT_PAGES: usize = 1000;
pub(crate) const DEFAULT_CACHE_PAGES: usize = 5000;
