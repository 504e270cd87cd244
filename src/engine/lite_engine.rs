use crate::bson::{Document, Value};
use crate::engine::collection_service::CollectionService;
use crate::engine::data_service::DataService;
use crate::engine::disk::{DiskReader, DiskService, PageCipher};
use crate::engine::index_service::IndexService;
use crate::engine::lock_service::LockService;
use crate::engine::page_address::PageAddress;
use crate::engine::pages::{HeaderPage, Page};
use crate::engine::transaction_pages::TransactionPages;
use crate::engine::transaction_service::{LockMode, TransactionService};
use crate::engine::{DEFAULT_CACHE_PAGES, DEFAULT_CHECKPOINT_PAGES, HEADER_INFO};
use crate::{Error, Result};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;

pub use index::IndexInfo;
pub use insert::BsonAutoId;

macro_rules! transaction_wrapper {
    (
        $mode: ident
        $vis: vis
        fn $name:ident(
            &mut self
            $(
            , $arg_name:ident: $arg_type:ty
            )*
            $(,)?
        ) -> $return_type:ty
    ) => {
        impl LiteEngine {
            $vis fn $name(
                &self,
                $( $arg_name: $arg_type, )*
            ) -> $return_type {
                self.with_transaction(LockMode::$mode, |engine| engine.$name(
                    $( $arg_name, )*
                ))
            }
        }
    };
}

// method implementations
mod collection;
mod delete;
mod index;
mod insert;
mod query;
mod sequence;
mod transaction;
mod update;
mod upsert;

pub struct LiteSettings {
    pub disk: Box<dyn DiskService>,
    /// encryption of every page but the header page
    pub cipher: Option<Box<dyn PageCipher>>,
    pub password: Option<String>,
    /// max wait for the database lock
    pub timeout: Duration,
    /// the dirty page count of write transaction to persist pages
    pub checkpoint_pages: usize,
    pub cache_pages: usize,
    /// the seed of the random levels of index nodes. random if None
    pub level_seed: Option<u64>,
}

impl LiteSettings {
    pub fn new(disk: impl DiskService + 'static) -> Self {
        Self {
            disk: Box::new(disk),
            cipher: None,
            password: None,
            timeout: Duration::from_secs(60),
            checkpoint_pages: DEFAULT_CHECKPOINT_PAGES,
            cache_pages: DEFAULT_CACHE_PAGES,
            level_seed: None,
        }
    }

    pub fn with_cipher(mut self, cipher: impl PageCipher + 'static) -> Self {
        self.cipher = Some(Box::new(cipher));
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_checkpoint_pages(mut self, pages: usize) -> Self {
        self.checkpoint_pages = pages;
        self
    }

    pub fn with_cache_pages(mut self, pages: usize) -> Self {
        self.cache_pages = pages;
        self
    }

    pub fn with_level_seed(mut self, seed: u64) -> Self {
        self.level_seed = Some(seed);
        self
    }
}

/// The database engine. All operations can be called from multiple threads.
pub struct LiteEngine {
    locker: LockService,
    disk: DiskReader,
    levels: Mutex<StdRng>,
    checkpoint_pages: usize,
}

pub(crate) struct TransactionLiteEngine<'a> {
    levels: &'a Mutex<StdRng>,
    transaction: TransactionService<'a>,
}

impl LiteEngine {
    /// Opens the database, initializing the header page if the disk is empty
    pub fn new(settings: LiteSettings) -> Result<Self> {
        let disk = DiskReader::new(settings.disk, settings.cipher, settings.cache_pages);
        let password = settings.password.as_deref();

        if disk.page_count()? == 0 {
            let mut pages = TransactionPages::new(&disk, true);
            pages.set_page(0, Page::Header(HeaderPage::new(password)));
            pages.persist_dirty_pages()?;
            disk.flush()?;
            debug_log!(ENGINE: "initialized new database");
        } else {
            let buffer = match disk.read_page(0) {
                Ok(buffer) => buffer,
                Err(e) if e.is_unexpected_eof() => return Err(Error::invalid_database()),
                Err(e) => return Err(e),
            };
            if !buffer.content().starts_with(HEADER_INFO) {
                return Err(Error::invalid_database());
            }
            let header = Page::load(0, &buffer)?;
            if !header.as_header()?.check_password(password) {
                return Err(Error::wrong_password());
            }
        }

        let levels = match settings.level_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        debug_log!(ENGINE: "initialization completed");

        Ok(Self {
            locker: LockService::new(settings.timeout),
            disk,
            levels: Mutex::new(levels),
            checkpoint_pages: settings.checkpoint_pages,
        })
    }

    /// Waits for the running write transaction and flushes the disk
    pub fn checkpoint(&self) -> Result<()> {
        let _scope = self.locker.enter_write()?;
        self.disk.flush()
    }
}

impl<'a> TransactionLiteEngine<'a> {
    fn pages(&mut self) -> &mut TransactionPages<'a> {
        self.transaction.pages()
    }

    fn collections(&mut self) -> CollectionService<'_, 'a> {
        CollectionService::new(self.transaction.pages(), self.levels)
    }

    fn indexer(&mut self, collection_page: u32) -> IndexService<'_, 'a> {
        IndexService::new(self.transaction.pages(), collection_page, self.levels)
    }

    fn data(&mut self, collection_page: u32) -> DataService<'_, 'a> {
        DataService::new(self.transaction.pages(), collection_page)
    }

    fn read_document(&mut self, collection_page: u32, block: PageAddress) -> Result<Document> {
        let bytes = self.data(collection_page).read(block)?;
        Ok(Document::from_bytes(&bytes)?)
    }

    pub fn user_version(&mut self) -> Result<i32> {
        Ok(self.pages().header()?.user_version)
    }

    pub fn set_user_version(&mut self, version: i32) -> Result<()> {
        self.pages().header_mut()?.user_version = version;
        Ok(())
    }
}

/// The key of the document for the index on `field`. A missing field is Null
fn index_key(doc: &Document, field: &str) -> Value {
    doc.get_path(field).cloned().unwrap_or(Value::Null)
}

transaction_wrapper!(Read pub fn user_version(&mut self) -> Result<i32>);
transaction_wrapper!(Write pub fn set_user_version(&mut self, version: i32) -> Result<()>);
