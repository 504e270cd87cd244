use crate::engine::buffer_reader::BufferReader;
use crate::engine::buffer_writer::BufferWriter;
use crate::engine::pages::{BasePage, PageType};
use crate::engine::{FILE_VERSION, HEADER_INFO, NO_PAGE, PAGE_AVAILABLE_BYTES, PageBuffer};
use crate::utils::{CaseInsensitiveStr, CaseInsensitiveString};
use crate::{Error, Result};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::ops::{Deref, DerefMut};

const HEADER_FIXED_SIZE: usize = HEADER_INFO.len()
    + 1 // version
    + 2 // change id
    + 4 // free empty page id
    + 4 // last page id
    + 4 // user version
    + 32 // password hash
    + 16 // salt
    + 1; // collection count

pub(crate) struct HeaderPage {
    base: BasePage,
    pub change_id: u16,
    /// the head of the empty page list
    pub free_empty_page_id: u32,
    pub last_page_id: u32,
    pub user_version: i32,
    password: [u8; 32],
    salt: [u8; 16],
    collections: IndexMap<CaseInsensitiveString, u32>,
}

impl HeaderPage {
    pub fn new(password: Option<&str>) -> Self {
        let mut header = HeaderPage {
            base: BasePage::new(0, PageType::Header),
            change_id: 0,
            free_empty_page_id: NO_PAGE,
            last_page_id: 0,
            user_version: 0,
            password: [0; 32],
            salt: [0; 16],
            collections: IndexMap::new(),
        };
        if let Some(password) = password {
            header.salt = rand::random();
            header.password = hash_password(&header.salt, password);
        }
        header.update_usage();
        header
    }

    pub fn load(base: BasePage, buffer: &PageBuffer) -> Result<Self> {
        let mut reader = BufferReader::new(0, buffer.content());

        if reader.read_bytes(HEADER_INFO.len())? != HEADER_INFO {
            return Err(Error::invalid_database());
        }
        let version = reader.read_u8()?;
        if version != FILE_VERSION {
            return Err(Error::invalid_database_version(version));
        }

        let change_id = reader.read_u16()?;
        let free_empty_page_id = reader.read_u32()?;
        let last_page_id = reader.read_u32()?;
        let user_version = reader.read_i32()?;
        let password = reader.read_array()?;
        let salt = reader.read_array()?;

        let count = reader.read_u8()?;
        let mut collections = IndexMap::with_capacity(count as usize);
        for _ in 0..count {
            let name = reader.read_short_string()?;
            let page_id = reader.read_u32()?;
            collections.insert(CaseInsensitiveString::new(name), page_id);
        }

        Ok(HeaderPage {
            base,
            change_id,
            free_empty_page_id,
            last_page_id,
            user_version,
            password,
            salt,
            collections,
        })
    }

    pub fn update_buffer(&self, buffer: &mut PageBuffer) -> Result<()> {
        self.base.update_buffer(buffer);
        let mut writer = BufferWriter::new(0, buffer.content_mut());

        writer.write_bytes(HEADER_INFO)?;
        writer.write_u8(FILE_VERSION)?;
        writer.write_u16(self.change_id)?;
        writer.write_u32(self.free_empty_page_id)?;
        writer.write_u32(self.last_page_id)?;
        writer.write_i32(self.user_version)?;
        writer.write_bytes(&self.password)?;
        writer.write_bytes(&self.salt)?;

        writer.write_u8(self.collections.len() as u8)?;
        for (name, page_id) in &self.collections {
            writer.write_short_string(name.as_str())?;
            writer.write_u32(*page_id)?;
        }
        writer.fill_remaining();

        Ok(())
    }

    fn update_usage(&mut self) {
        let used = self.content_size();
        self.base.set_usage(self.collections.len(), used);
    }

    fn content_size(&self) -> usize {
        HEADER_FIXED_SIZE
            + self
                .collections
                .keys()
                .map(|name| 1 + name.as_str().len() + 4)
                .sum::<usize>()
    }

    pub fn has_password(&self) -> bool {
        self.password != [0; 32]
    }

    pub fn check_password(&self, password: Option<&str>) -> bool {
        match password {
            None => !self.has_password(),
            Some(password) => {
                self.has_password() && hash_password(&self.salt, password) == self.password
            }
        }
    }

    /// Returns true if a collection with `name` still fits in the header page
    pub fn can_add_collection(&self, name: &str) -> bool {
        self.collections.len() < u8::MAX as usize
            && self.content_size() + 1 + name.len() + 4 <= PAGE_AVAILABLE_BYTES
    }

    /// Returns true if the renamed entry still fits in the header page
    pub fn can_rename_collection(&self, old_name: &str, new_name: &str) -> bool {
        self.content_size() - old_name.len() + new_name.len() <= PAGE_AVAILABLE_BYTES
    }

    pub fn get_collection_page_id(&self, name: &str) -> Option<u32> {
        self.collections
            .get(CaseInsensitiveStr::new(name))
            .copied()
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(|x| x.as_str())
    }

    pub fn insert_collection(&mut self, name: &str, page_id: u32) {
        self.collections.insert(name.into(), page_id);
        self.update_usage();
    }

    pub fn delete_collection(&mut self, name: &str) -> Option<u32> {
        let removed = self
            .collections
            .shift_remove(CaseInsensitiveStr::new(name));
        self.update_usage();
        removed
    }

    pub fn rename_collection(&mut self, old_name: &str, new_name: &str) {
        if let Some(page_id) = self.delete_collection(old_name) {
            self.insert_collection(new_name, page_id);
        }
    }
}

fn hash_password(salt: &[u8; 16], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

impl Deref for HeaderPage {
    type Target = BasePage;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for HeaderPage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
