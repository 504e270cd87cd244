mod base_page;
mod collection_page;
mod data_page;
mod extend_page;
mod header_page;
mod index_page;

use crate::engine::PageBuffer;
use crate::{Error, Result};
pub(crate) use base_page::*;
pub(crate) use collection_page::*;
pub(crate) use data_page::*;
pub(crate) use extend_page::*;
pub(crate) use header_page::*;
pub(crate) use index_page::*;

/// A decoded page
pub(crate) enum Page {
    Header(HeaderPage),
    Collection(CollectionPage),
    Index(IndexPage),
    Data(DataPage),
    Extend(ExtendPage),
    Empty(BasePage),
}

macro_rules! page_accessors {
    ($($variant: ident($ty: ty) => $as_ref: ident, $as_mut: ident;)*) => {
        impl Page {
            $(
            pub fn $as_ref(&self) -> Result<&$ty> {
                match self {
                    Page::$variant(page) => Ok(page),
                    other => Err(Error::invalid_page(other.base().page_id())),
                }
            }

            pub fn $as_mut(&mut self) -> Result<&mut $ty> {
                match self {
                    Page::$variant(page) => Ok(page),
                    other => Err(Error::invalid_page(other.base().page_id())),
                }
            }
            )*
        }
    };
}

page_accessors! {
    Header(HeaderPage) => as_header, as_header_mut;
    Collection(CollectionPage) => as_collection, as_collection_mut;
    Index(IndexPage) => as_index, as_index_mut;
    Data(DataPage) => as_data, as_data_mut;
    Extend(ExtendPage) => as_extend, as_extend_mut;
}

impl Page {
    /// Decodes the page read from `page_id`
    pub fn load(page_id: u32, buffer: &PageBuffer) -> Result<Page> {
        let base = BasePage::load(page_id, buffer)?;

        Ok(match base.page_type() {
            PageType::Header => Page::Header(HeaderPage::load(base, buffer)?),
            PageType::Collection => Page::Collection(CollectionPage::load(base, buffer)?),
            PageType::Index => Page::Index(IndexPage::load(base, buffer)?),
            PageType::Data => Page::Data(DataPage::load(base, buffer)?),
            PageType::Extend => Page::Extend(ExtendPage::load(base, buffer)?),
            PageType::Empty => Page::Empty(base),
        })
    }

    pub fn update_buffer(&self, buffer: &mut PageBuffer) -> Result<()> {
        match self {
            Page::Header(page) => page.update_buffer(buffer),
            Page::Collection(page) => page.update_buffer(buffer),
            Page::Index(page) => page.update_buffer(buffer),
            Page::Data(page) => page.update_buffer(buffer),
            Page::Extend(page) => page.update_buffer(buffer),
            Page::Empty(base) => {
                base.update_buffer(buffer);
                buffer.content_mut().fill(0);
                Ok(())
            }
        }
    }

    pub fn base(&self) -> &BasePage {
        match self {
            Page::Header(page) => &**page,
            Page::Collection(page) => &**page,
            Page::Index(page) => &**page,
            Page::Data(page) => &**page,
            Page::Extend(page) => &**page,
            Page::Empty(base) => base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BasePage {
        match self {
            Page::Header(page) => &mut **page,
            Page::Collection(page) => &mut **page,
            Page::Index(page) => &mut **page,
            Page::Data(page) => &mut **page,
            Page::Extend(page) => &mut **page,
            Page::Empty(base) => base,
        }
    }
}

/// Returns the lowest item index not in use
pub(super) fn next_free_index(used: impl Iterator<Item = u16>) -> u16 {
    let mut next = 0;
    for index in used {
        if index != next {
            break;
        }
        next += 1;
    }
    next
}
