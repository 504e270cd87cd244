use crate::engine::data_service::DataService;
use crate::engine::index_service::IndexService;
use crate::engine::page_service::PageService;
use crate::engine::pages::{CollectionPage, HeaderPage, Page};
use crate::engine::transaction_pages::TransactionPages;
use crate::engine::MAX_COLLECTION_NAME_LENGTH;
use crate::utils::is_word;
use crate::{Error, Result};
use parking_lot::Mutex;
use rand::rngs::StdRng;

pub(crate) struct CollectionService<'a, 'e> {
    pages: &'a mut TransactionPages<'e>,
    levels: &'a Mutex<StdRng>,
}

impl<'a, 'e> CollectionService<'a, 'e> {
    pub fn new(pages: &'a mut TransactionPages<'e>, levels: &'a Mutex<StdRng>) -> Self {
        Self { pages, levels }
    }
}

impl CollectionService<'_, '_> {
    fn check_name_format(name: &str) -> Result<()> {
        if name.len() > MAX_COLLECTION_NAME_LENGTH || !is_word(name) || name.starts_with('$') {
            return Err(Error::invalid_collection_name(name));
        }
        Ok(())
    }

    pub fn check_name(name: &str, header: &HeaderPage) -> Result<()> {
        Self::check_name_format(name)?;
        if !header.can_add_collection(name) {
            return Err(Error::collection_limit_exceeded());
        }

        Ok(())
    }

    /// Returns the collection page id, creating the collection if `add_if_not_exists`
    pub fn get(&mut self, name: &str, add_if_not_exists: bool) -> Result<Option<u32>> {
        match self.pages.header()?.get_collection_page_id(name) {
            Some(page_id) => Ok(Some(page_id)),
            None if add_if_not_exists => Ok(Some(self.add(name)?)),
            None => Ok(None),
        }
    }

    /// Creates the collection page with the `_id` index
    pub fn add(&mut self, name: &str) -> Result<u32> {
        Self::check_name(name, self.pages.header()?)?;

        let page_id = PageService::new(self.pages)
            .new_page(|id| Page::Collection(CollectionPage::new(id, name.to_string())))?;
        self.pages.header_mut()?.insert_collection(name, page_id);

        IndexService::new(self.pages, page_id, self.levels).create_index(0, "_id", true)?;

        debug_log!(COMMAND: "created collection {name} at page {page_id}");
        Ok(page_id)
    }

    /// Frees every page of the collection. Returns false if the collection does not exist.
    pub fn drop(&mut self, name: &str) -> Result<bool> {
        let Some(page_id) = self.pages.header()?.get_collection_page_id(name) else {
            return Ok(false);
        };

        let slots = self
            .pages
            .collection_page(page_id)?
            .active_indexes()
            .map(|x| x.slot())
            .collect::<Vec<_>>();

        let mut data_blocks = Vec::new();
        for slot in slots {
            let blocks = IndexService::new(self.pages, page_id, self.levels).drop_index(slot)?;
            if slot == 0 {
                data_blocks = blocks;
            }
        }

        let mut data = DataService::new(self.pages, page_id);
        for block in data_blocks {
            data.delete(block)?;
        }

        PageService::new(self.pages).delete_page(page_id)?;
        self.pages.header_mut()?.delete_collection(name);

        debug_log!(COMMAND: "dropped collection {name}");
        Ok(true)
    }

    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let page_id = self
            .pages
            .header()?
            .get_collection_page_id(old_name)
            .ok_or_else(|| Error::collection_not_found(old_name))?;

        let header = self.pages.header()?;
        // renaming to itself in another case is allowed
        if !old_name.eq_ignore_ascii_case(new_name) && header.get_collection_page_id(new_name).is_some() {
            return Err(Error::collection_already_exists(new_name));
        }

        Self::check_name_format(new_name)?;
        if !header.can_rename_collection(old_name, new_name) {
            return Err(Error::collection_limit_exceeded());
        }

        self.pages.header_mut()?.rename_collection(old_name, new_name);
        self.pages.collection_page_mut(page_id)?.name = new_name.to_string();

        debug_log!(COMMAND: "renamed collection {old_name} to {new_name}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bson::Value;
    use crate::engine::disk::{DiskReader, MemoryDisk};
    use crate::ErrorKind;
    use rand::SeedableRng;

    fn with_collections(f: impl FnOnce(&mut CollectionService<'_, '_>)) {
        let disk = DiskReader::new(Box::new(MemoryDisk::new()), None, 100);
        let levels = Mutex::new(StdRng::seed_from_u64(0));
        let mut pages = TransactionPages::new(&disk, true);
        pages.set_page(0, Page::Header(HeaderPage::new(None)));
        f(&mut CollectionService::new(&mut pages, &levels));
    }

    #[test]
    fn names_are_validated() {
        let header = HeaderPage::new(None);
        assert!(CollectionService::check_name("users_2", &header).is_ok());
        for name in ["", "$system", "with space", "dot.ted", "x".repeat(61).as_str()] {
            let err = CollectionService::check_name(name, &header).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidCollectionName, "{name}");
        }
    }

    #[test]
    fn add_creates_pk_index() {
        with_collections(|collections| {
            assert_eq!(collections.get("users", false).unwrap(), None);
            let page_id = collections.get("users", true).unwrap().unwrap();
            assert_eq!(collections.get("USERS", false).unwrap(), Some(page_id));

            let page = collections.pages.collection_page(page_id).unwrap();
            assert_eq!(page.pk_index().field(), "_id");
            assert!(page.pk_index().unique());
            assert!(!page.pk_index().head.is_empty());
        });
    }

    #[test]
    fn drop_recycles_pages() {
        with_collections(|collections| {
            let page_id = collections.add("items").unwrap();
            {
                let levels = collections.levels;
                let mut data = DataService::new(collections.pages, page_id);
                let block = data.insert(vec![1; 5000]).unwrap();
                let mut indexer = IndexService::new(collections.pages, page_id, levels);
                let node = indexer.add_node(0, Value::Int32(1), block).unwrap();
                DataService::new(collections.pages, page_id)
                    .set_index_ref(block, 0, node)
                    .unwrap();
            }
            let last_page = collections.pages.header().unwrap().last_page_id;

            assert!(collections.drop("items").unwrap());
            assert!(!collections.drop("items").unwrap());
            assert_eq!(collections.get("items", false).unwrap(), None);

            // every page but the header is in the empty list
            let mut pager = PageService::new(collections.pages);
            for _ in 0..last_page {
                let id = pager
                    .new_page(|id| Page::Data(crate::engine::pages::DataPage::new(id)))
                    .unwrap();
                assert!(id <= last_page);
            }
            assert_eq!(
                collections.pages.header().unwrap().free_empty_page_id,
                crate::engine::NO_PAGE
            );
        });
    }

    #[test]
    fn rename_checks_names() {
        with_collections(|collections| {
            collections.add("a").unwrap();
            collections.add("b").unwrap();

            let err = collections.rename("a", "b").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::CollectionAlreadyExists);
            let err = collections.rename("missing", "c").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::CollectionNotFound);

            collections.rename("a", "c").unwrap();
            let page_id = collections.get("c", false).unwrap().unwrap();
            assert_eq!(collections.pages.collection_page(page_id).unwrap().name, "c");
            assert_eq!(collections.get("a", false).unwrap(), None);
        });
    }
}
