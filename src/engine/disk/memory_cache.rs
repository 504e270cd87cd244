use crate::engine::PageBuffer;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// The cache of clean (same as disk) pages shared by all transactions.
///
/// There is no LRU: when the cache is full it's cleared.
pub(crate) struct MemoryCache {
    pages: Mutex<HashMap<u32, Arc<PageBuffer>>>,
    capacity: usize,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, page_id: u32) -> Option<Arc<PageBuffer>> {
        self.pages.lock().get(&page_id).cloned()
    }

    pub fn insert(&self, page_id: u32, page: Arc<PageBuffer>) {
        let mut pages = self.pages.lock();
        if pages.len() >= self.capacity && !pages.contains_key(&page_id) {
            pages.clear();
        }
        pages.insert(page_id, page);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }
}
