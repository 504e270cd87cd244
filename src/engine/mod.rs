#[macro_use]
mod macros;

mod buffer_reader;
mod buffer_writer;
mod collection_index;
mod collection_service;
mod constants;
mod data_block;
mod data_service;
mod disk;
mod index_node;
mod index_service;
mod lite_engine;
mod lock_service;
mod page_address;
mod page_buffer;
mod page_service;
mod pages;
mod query;
mod transaction_pages;
mod transaction_service;

pub(crate) use constants::*;
pub(crate) use page_buffer::*;

pub use constants::PAGE_SIZE;
pub use disk::{DiskService, FileDisk, MemoryDisk, PageCipher};
pub use lite_engine::{BsonAutoId, IndexInfo, LiteEngine, LiteSettings};
pub use query::{Query, QueryPredicate};
