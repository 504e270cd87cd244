use crate::bson::{TotalOrd, Value};
use crate::engine::collection_index::CollectionIndex;
use crate::engine::index_node::IndexNode;
use crate::engine::page_address::PageAddress;
use crate::engine::page_service::{FreeList, PageService};
use crate::engine::pages::{IndexPage, Page};
use crate::engine::transaction_pages::TransactionPages;
use crate::engine::{MAX_LEVEL_LENGTH, PAGE_SIZE};
use crate::utils::Order;
use crate::{Error, Result};
use parking_lot::Mutex;
use rand::Rng;
use rand::rngs::StdRng;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::Bound;

/// The skip-list indexes of one collection
pub(crate) struct IndexService<'a, 'e> {
    pages: &'a mut TransactionPages<'e>,
    collection_page: u32,
    levels: &'a Mutex<StdRng>,
}

impl<'a, 'e> IndexService<'a, 'e> {
    pub fn new(
        pages: &'a mut TransactionPages<'e>,
        collection_page: u32,
        levels: &'a Mutex<StdRng>,
    ) -> Self {
        Self {
            pages,
            collection_page,
            levels,
        }
    }
}

impl IndexService<'_, '_> {
    fn free_list(&self, slot: u8) -> FreeList {
        FreeList::Index {
            collection_page: self.collection_page,
            slot,
        }
    }

    fn index(&mut self, slot: u8) -> Result<CollectionIndex> {
        Ok(self
            .pages
            .collection_page(self.collection_page)?
            .index(slot)
            .clone())
    }

    pub fn node(&mut self, address: PageAddress) -> Result<&IndexNode> {
        self.pages
            .index_page(address.page_id())?
            .node(address.index())
    }

    fn node_mut(&mut self, address: PageAddress) -> Result<&mut IndexNode> {
        self.pages
            .index_page_mut(address.page_id())?
            .node_mut(address.index())
    }

    /// Chooses the level count of a new node: each extra level with probability 1/2
    fn flip(&self) -> u8 {
        let mut rng = self.levels.lock();
        let mut levels = 1;
        while levels < MAX_LEVEL_LENGTH && rng.random_bool(0.5) {
            levels += 1;
        }
        levels
    }

    /// Stores a node in the index pages of the slot and returns the address
    fn store_node(
        &mut self,
        slot: u8,
        levels: u8,
        key: Value,
        data_block: PageAddress,
    ) -> Result<PageAddress> {
        let length = IndexNode::get_node_length(levels, &key)?;
        let list = self.free_list(slot);

        let mut pager = PageService::new(self.pages);
        let page_id = pager.get_free_page(list, length, |id| Page::Index(IndexPage::new(id)))?;
        let position = self
            .pages
            .index_page_mut(page_id)?
            .insert_node(slot, levels, key, data_block);
        PageService::new(self.pages).reindex_free_list(list, page_id)?;

        Ok(position)
    }

    /// Creates the head and tail node of a new index in the slot of the collection
    pub fn create_index(&mut self, slot: u8, field: &str, unique: bool) -> Result<CollectionIndex> {
        debug_log!(ENGINE: "create index {field} at slot {slot}");

        self.pages
            .collection_page_mut(self.collection_page)?
            .set_index(CollectionIndex::new(slot, field.to_string(), unique));

        let head = self.store_node(slot, MAX_LEVEL_LENGTH, Value::MinValue, PageAddress::EMPTY)?;
        let tail = self.store_node(slot, MAX_LEVEL_LENGTH, Value::MaxValue, PageAddress::EMPTY)?;

        self.node_mut(head)?.next.fill(tail);
        self.node_mut(tail)?.prev.fill(head);

        let index = self
            .pages
            .collection_page_mut(self.collection_page)?
            .index_mut(slot);
        index.head = head;
        index.tail = tail;

        Ok(index.clone())
    }

    /// Inserts the key into the index and returns the address of the new node.
    ///
    /// Fails with DuplicateKey without modification if the index is unique and has the key.
    pub fn add_node(&mut self, slot: u8, key: Value, data_block: PageAddress) -> Result<PageAddress> {
        let index = self.index(slot)?;
        IndexNode::get_node_length(1, &key)?;

        let levels = self.flip();
        let top = index.max_level.max(levels);

        let mut update = vec![index.head; levels as usize];
        let mut current = index.head;

        for level in (0..top as usize).rev() {
            loop {
                let next = self.node(current)?.next[level];
                if next == index.tail {
                    break;
                }
                if self.node(next)?.cmp_position(&key, data_block) == Ordering::Less {
                    current = next;
                } else {
                    break;
                }
            }
            if level < levels as usize {
                update[level] = current;
            }
        }

        if index.unique() {
            let prev = update[0];
            let next = self.node(prev)?.next[0];
            for neighbor in [prev, next] {
                if neighbor == index.head || neighbor == index.tail {
                    continue;
                }
                if self.node(neighbor)?.key().total_cmp(&key) == Ordering::Equal {
                    return Err(Error::index_duplicate_key(index.field(), key));
                }
            }
        }

        let position = self.store_node(slot, levels, key, data_block)?;

        for (level, &prev) in update.iter().enumerate() {
            let next = self.node(prev)?.next[level];

            let node = self.node_mut(position)?;
            node.prev[level] = prev;
            node.next[level] = next;

            self.node_mut(prev)?.next[level] = position;
            self.node_mut(next)?.prev[level] = position;
        }

        if levels > index.max_level {
            self.pages
                .collection_page_mut(self.collection_page)?
                .index_mut(slot)
                .max_level = levels;
        }

        Ok(position)
    }

    /// Unlinks the node from every level and frees its space
    pub fn delete_node(&mut self, address: PageAddress) -> Result<()> {
        let node = self
            .pages
            .index_page_mut(address.page_id())?
            .delete_node(address.index())?;

        for (level, (&prev, &next)) in node.prev.iter().zip(&node.next).enumerate() {
            self.node_mut(prev)?.next[level] = next;
            self.node_mut(next)?.prev[level] = prev;
        }

        let list = self.free_list(node.slot());
        let empty = self.pages.index_page(address.page_id())?.item_count() == 0;
        let mut pager = PageService::new(self.pages);
        if empty {
            pager.delete_list_page(list, address.page_id())
        } else {
            pager.reindex_free_list(list, address.page_id())
        }
    }

    /// Returns the last node before the key (or the head): with `inclusive` equal keys are passed too
    fn find_last_before(&mut self, index: &CollectionIndex, key: &Value, inclusive: bool) -> Result<PageAddress> {
        let mut current = index.head;

        for level in (0..index.max_level as usize).rev() {
            loop {
                let next = self.node(current)?.next[level];
                if next == index.tail {
                    break;
                }
                let order = self.node(next)?.key().total_cmp(key);
                if order == Ordering::Less || (inclusive && order == Ordering::Equal) {
                    current = next;
                } else {
                    break;
                }
            }
        }

        Ok(current)
    }

    /// Finds the first node with the key
    pub fn find(&mut self, slot: u8, key: &Value) -> Result<Option<IndexNode>> {
        let index = self.index(slot)?;
        let before = self.find_last_before(&index, key, false)?;
        let next = self.node(before)?.next[0];
        if next == index.tail {
            return Ok(None);
        }

        let node = self.node(next)?;
        if node.key().total_cmp(key) == Ordering::Equal {
            Ok(Some(node.clone()))
        } else {
            Ok(None)
        }
    }

    /// Creates the cursor over the nodes with keys between the bounds
    pub fn range(
        &mut self,
        slot: u8,
        lower: Bound<&Value>,
        upper: Bound<&Value>,
        order: Order,
    ) -> Result<IndexCursor> {
        let index = self.index(slot)?;

        let next = match order {
            Order::Ascending => match lower {
                Bound::Unbounded => self.node(index.head)?.next[0],
                Bound::Included(key) => {
                    let before = self.find_last_before(&index, key, false)?;
                    self.node(before)?.next[0]
                }
                Bound::Excluded(key) => {
                    let before = self.find_last_before(&index, key, true)?;
                    self.node(before)?.next[0]
                }
            },
            Order::Descending => match upper {
                Bound::Unbounded => self.node(index.tail)?.prev[0],
                Bound::Included(key) => self.find_last_before(&index, key, true)?,
                Bound::Excluded(key) => self.find_last_before(&index, key, false)?,
            },
        };

        let (end, bound) = match order {
            Order::Ascending => (index.tail, upper),
            Order::Descending => (index.head, lower),
        };

        Ok(IndexCursor {
            next,
            end,
            order,
            bound: bound.cloned(),
        })
    }

    /// Number of nodes between head and tail
    #[cfg(test)]
    pub fn count_nodes(&mut self, slot: u8) -> Result<usize> {
        let index = self.index(slot)?;
        let mut count = 0;
        let mut current = self.node(index.head)?.next[0];
        while current != index.tail {
            count += 1;
            current = self.node(current)?.next[0];
        }
        Ok(count)
    }

    /// Removes every node of the index and frees the index pages.
    ///
    /// Returns the data blocks that referenced the index.
    pub fn drop_index(&mut self, slot: u8) -> Result<Vec<PageAddress>> {
        let index = self.index(slot)?;
        debug_log!(ENGINE: "drop index {} at slot {slot}", index.field());

        let guard = (self.pages.header()?.last_page_id as usize + 1) * PAGE_SIZE;
        let mut pages = BTreeSet::new();
        let mut data_blocks = Vec::new();
        let mut current = index.head;

        loop {
            let node = self.node(current)?;
            pages.insert(current.page_id());
            if current == index.tail {
                break;
            }
            if current != index.head {
                data_blocks.push(node.data_block());
            }
            current = node.next[0];
            assert!(data_blocks.len() <= guard, "Detected loop in index {}", index.field());
        }

        let mut pager = PageService::new(self.pages);
        for page_id in pages {
            pager.delete_page(page_id)?;
        }

        self.pages
            .collection_page_mut(self.collection_page)?
            .clear_index(slot);

        Ok(data_blocks)
    }
}

/// A position in an index scan. The scan reads pages only in [`IndexCursor::next`].
pub(crate) struct IndexCursor {
    next: PageAddress,
    end: PageAddress,
    order: Order,
    bound: Bound<Value>,
}

impl IndexCursor {
    pub fn next(&mut self, pages: &mut TransactionPages<'_>) -> Result<Option<IndexNode>> {
        if self.next == self.end || self.next.is_empty() {
            return Ok(None);
        }

        let node = pages
            .index_page(self.next.page_id())?
            .node(self.next.index())?;

        let order = node.key().total_cmp(match &self.bound {
            Bound::Unbounded => &Value::Null,
            Bound::Included(key) | Bound::Excluded(key) => key,
        });
        let in_range = match (&self.bound, self.order) {
            (Bound::Unbounded, _) => true,
            (Bound::Included(_), Order::Ascending) => order != Ordering::Greater,
            (Bound::Excluded(_), Order::Ascending) => order == Ordering::Less,
            (Bound::Included(_), Order::Descending) => order != Ordering::Less,
            (Bound::Excluded(_), Order::Descending) => order == Ordering::Greater,
        };

        if !in_range {
            self.next = self.end;
            return Ok(None);
        }

        self.next = match self.order {
            Order::Ascending => node.next[0],
            Order::Descending => node.prev[0],
        };

        Ok(Some(node.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::disk::{DiskReader, MemoryDisk};
    use crate::engine::pages::{CollectionPage, HeaderPage};
    use crate::ErrorKind;
    use rand::SeedableRng;

    fn with_index(unique: bool, f: impl FnOnce(&mut IndexService<'_, '_>)) {
        let disk = DiskReader::new(Box::new(MemoryDisk::new()), None, 100);
        let levels = Mutex::new(StdRng::seed_from_u64(7));
        let mut pages = TransactionPages::new(&disk, true);
        pages.set_page(0, Page::Header(HeaderPage::new(None)));
        let collection = PageService::new(&mut pages)
            .new_page(|id| Page::Collection(CollectionPage::new(id, "col".into())))
            .unwrap();
        let mut indexer = IndexService::new(&mut pages, collection, &levels);
        indexer.create_index(1, "key", unique).unwrap();
        f(&mut indexer);
    }

    fn block(n: u32) -> PageAddress {
        PageAddress::new(1000 + n, 0)
    }

    fn collect(indexer: &mut IndexService<'_, '_>, lower: Bound<&Value>, upper: Bound<&Value>, order: Order) -> Vec<Value> {
        let mut cursor = indexer.range(1, lower, upper, order).unwrap();
        let mut keys = vec![];
        while let Some(node) = cursor.next(indexer.pages).unwrap() {
            keys.push(node.into_key());
        }
        keys
    }

    /// Checks every level is strictly ordered and prev links mirror next links
    fn check_levels(indexer: &mut IndexService<'_, '_>) -> usize {
        let index = indexer.index(1).unwrap();
        let mut level0 = 0;

        for level in 0..MAX_LEVEL_LENGTH as usize {
            let mut prev: Option<IndexNode> = None;
            let mut current = index.head;
            loop {
                let node = indexer.node(current).unwrap().clone();
                if let Some(prev) = &prev {
                    assert_eq!(node.prev[level], prev.position());
                    if current != index.tail && prev.position() != index.head {
                        assert_eq!(
                            prev.cmp_position(node.key(), node.data_block()),
                            Ordering::Less
                        );
                    }
                }
                if current == index.tail {
                    break;
                }
                if level == 0 && current != index.head {
                    level0 += 1;
                }
                current = node.next[level];
                prev = Some(node);
            }
        }

        level0
    }

    #[test]
    fn keys_are_ordered_on_every_level() {
        with_index(false, |indexer| {
            for i in 0..500u32 {
                let key = Value::Int32(((i * 7919) % 200) as i32);
                indexer.add_node(1, key, block(i)).unwrap();
            }
            assert_eq!(check_levels(indexer), 500);

            let keys = collect(indexer, Bound::Unbounded, Bound::Unbounded, Order::Ascending);
            assert!(keys.windows(2).all(|w| w[0].total_cmp(&w[1]) != Ordering::Greater));
            assert!(indexer.index(1).unwrap().max_level > 1);
        });
    }

    #[test]
    fn unique_index_rejects_duplicates() {
        with_index(true, |indexer| {
            indexer.add_node(1, Value::from("a"), block(1)).unwrap();
            indexer.add_node(1, Value::from("c"), block(2)).unwrap();
            let err = indexer.add_node(1, Value::from("a"), block(3)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DuplicateKey);
            let err = indexer.add_node(1, Value::from("c"), block(0)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DuplicateKey);
            assert_eq!(check_levels(indexer), 2);
        });
    }

    #[test]
    fn find_and_ranges() {
        with_index(false, |indexer| {
            for i in 1..=20 {
                indexer.add_node(1, Value::Int32(i), block(i as u32)).unwrap();
            }

            let node = indexer.find(1, &Value::Int64(5)).unwrap().unwrap();
            assert_eq!(node.data_block(), block(5));
            assert!(indexer.find(1, &Value::Int32(21)).unwrap().is_none());

            let v = |i: i32| Value::Int32(i);
            let keys = collect(indexer, Bound::Included(&v(5)), Bound::Excluded(&v(8)), Order::Ascending);
            assert_eq!(keys, [v(5), v(6), v(7)]);
            let keys = collect(indexer, Bound::Excluded(&v(17)), Bound::Unbounded, Order::Ascending);
            assert_eq!(keys, [v(18), v(19), v(20)]);
            let keys = collect(indexer, Bound::Included(&v(3)), Bound::Included(&v(5)), Order::Descending);
            assert_eq!(keys, [v(5), v(4), v(3)]);
            let keys = collect(indexer, Bound::Unbounded, Bound::Excluded(&v(3)), Order::Descending);
            assert_eq!(keys, [v(2), v(1)]);
        });
    }

    #[test]
    fn delete_nodes_and_drop() {
        with_index(false, |indexer| {
            let mut nodes = vec![];
            for i in 0..300 {
                nodes.push(indexer.add_node(1, Value::from(format!("key{i:04}")), block(i)).unwrap());
            }
            for address in nodes.iter().step_by(2) {
                indexer.delete_node(*address).unwrap();
            }
            assert_eq!(check_levels(indexer), 150);
            assert!(indexer.find(1, &Value::from("key0000")).unwrap().is_none());
            assert!(indexer.find(1, &Value::from("key0001")).unwrap().is_some());

            let blocks = indexer.drop_index(1).unwrap();
            assert_eq!(blocks.len(), 150);
            assert!(indexer.index(1).unwrap().is_empty());
            assert_ne!(indexer.pages.header().unwrap().free_empty_page_id, crate::engine::NO_PAGE);
        });
    }
}
