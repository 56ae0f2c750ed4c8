// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Higher-level Excel API.
//!
//! This module contains types used to examine the game's Excel data. This is mainly
//! accomplished through [ExcelSheet], which provides row access over lazily loaded
//! pages, and [ExcelModule], which caches sheets by name.
//!
//! For the underlying filetypes, see the [EXD](crate::exd), [EXH](crate::exh) and
//! [EXL](crate::exl) modules.
//!
//! # Usage
//!
//! ```no_run
//! # use corolla::{Language, Platform};
//! # use corolla::excel::ExcelModule;
//! # use corolla::sqpack::Pack;
//! # use corolla::Error;
//! let mut pack = Pack::from_existing(Platform::Win32, "SquareEnix/FINAL FANTASY XIV - A Realm Reborn/game")?;
//! let mut excel = ExcelModule::new(Language::English);
//!
//! let sheet = excel.sheet(&mut pack, "Item")?;
//! let row = sheet.row(&mut pack, 1)?; // 1 is the ID for Gil
//! # Ok::<(), Error>(())
//! ```
//!
//! Row views borrow their bytes from the page they live in; decoding the columns
//! out of those bytes (via [EXH::column_definitions](crate::exh::EXH)) is left to
//! the caller.

use std::collections::HashMap;

use crate::common::Language;
use crate::error::Error;
use crate::exd::EXD;
use crate::exh::EXH;
use crate::sqpack::Pack;

mod iterators;
pub use iterators::RowIterator;

/// A non-owning view over one row of a sheet.
///
/// The bytes live inside the page that produced the view; use the sheet's column
/// definitions to pick fields out of them. For subrow sheets, `sub_row_count` says
/// how many sub-records the bytes carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcelRow<'a> {
    /// The row ID.
    pub row_id: u32,
    /// The number of (sub)rows in this row's data section.
    pub sub_row_count: u16,
    /// The row's bytes, starting right behind the preamble.
    pub data: &'a [u8],
}

/// An Excel sheet: a header plus lazily loaded pages of rows.
///
/// Sheets are created through [ExcelModule::sheet]. Pages are read on first access
/// and kept until the sheet is dropped; a page whose load failed stays empty, so a
/// later access can retry it.
pub struct ExcelSheet {
    name: String,
    language: Language,
    exh: EXH,
    pages: Vec<Option<EXD>>,
}

impl ExcelSheet {
    pub(crate) fn new(pack: &mut Pack, name: &str, language: Language) -> Result<Self, Error> {
        let exh: EXH = pack.parsed(&format!("exd/{name}.exh"))?;

        let language = Self::select_language(&exh, name, language)?;

        let pages = exh.pages.iter().map(|_| None).collect();

        Ok(Self {
            name: name.to_string(),
            language,
            exh,
            pages,
        })
    }

    // The preferred language when the sheet has it, the language-agnostic tag when
    // it doesn't; a sheet with neither can't be read at all.
    fn select_language(exh: &EXH, name: &str, preferred: Language) -> Result<Language, Error> {
        if exh.supports_language(preferred) {
            return Ok(preferred);
        }

        if exh.supports_language(Language::None) {
            return Ok(Language::None);
        }

        Err(Error::LanguageNotFound {
            sheet: name.to_string(),
        })
    }

    /// The case-folded name of this sheet.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The language pages are loaded for, after fallback.
    pub fn language(&self) -> Language {
        self.language
    }

    /// The parsed sheet header.
    pub fn exh(&self) -> &EXH {
        &self.exh
    }

    /// The total number of rows, summed over every page.
    pub fn row_count(&self) -> u32 {
        self.exh.pages.iter().map(|page| page.row_count).sum()
    }

    /// Returns the page at `index`, reading its file if this is the first access.
    pub fn page(&mut self, pack: &mut Pack, index: usize) -> Result<&EXD, Error> {
        let Some(pagination) = self.exh.pages.get(index) else {
            return Err(Error::InvalidPageIndex { index });
        };

        if self.pages[index].is_none() {
            let filename = EXD::calculate_filename(&self.name, self.language, pagination);
            let page = pack.parsed(&format!("exd/{filename}"))?;
            self.pages[index] = Some(page);
        }

        self.pages[index]
            .as_ref()
            .ok_or(Error::InvalidPageIndex { index })
    }

    /// Finds the row matching `row_id` and returns a view over its bytes.
    pub fn row(&mut self, pack: &mut Pack, row_id: u32) -> Result<ExcelRow<'_>, Error> {
        let sheet_name = self.name.clone();

        let page_index = self
            .exh
            .page_for_row(row_id)
            .ok_or(Error::RowNotFound { row_id })?;

        let page = self.page(pack, page_index)?;

        let index = page
            .index_for_row(row_id)
            .ok_or(Error::RowNotFound { row_id })?;

        let (row_id, sub_row_count, data) = page
            .row_data(index)
            .ok_or(Error::CorruptExcel { path: sheet_name })?;

        Ok(ExcelRow {
            row_id,
            sub_row_count,
            data,
        })
    }

    /// Returns the `index`-th row of the sheet, counting across pages in order.
    pub fn row_at_index(&mut self, pack: &mut Pack, index: u32) -> Result<ExcelRow<'_>, Error> {
        let sheet_name = self.name.clone();

        let mut accumulated = 0u32;
        let mut located = None;
        for (page_index, pagination) in self.exh.pages.iter().enumerate() {
            if (index as u64) < accumulated as u64 + pagination.row_count as u64 {
                located = Some((page_index, index - accumulated));
                break;
            }
            accumulated += pagination.row_count;
        }

        let (page_index, local_index) =
            located.ok_or(Error::RowNotFound { row_id: index })?;

        let page = self.page(pack, page_index)?;

        if local_index as usize >= page.entry_count() {
            return Err(Error::RowNotFound { row_id: index });
        }

        let (row_id, sub_row_count, data) = page
            .row_data(local_index as usize)
            .ok_or(Error::CorruptExcel { path: sheet_name })?;

        Ok(ExcelRow {
            row_id,
            sub_row_count,
            data,
        })
    }

    /// Iterates every row of the sheet in `(page, index)` order.
    ///
    /// Any page not read yet is read up front; pages are never evicted, so this
    /// reaches the same state row-by-row access would.
    pub fn rows<'a>(&'a mut self, pack: &mut Pack) -> Result<RowIterator<'a>, Error> {
        for index in 0..self.exh.pages.len() {
            self.page(pack, index)?;
        }

        Ok(RowIterator::new(self))
    }
}

/// Owns and hands out [ExcelSheet]s, keyed by their case-folded name.
///
/// The module is the only place sheets are created; returned references stay valid
/// until the module is dropped.
pub struct ExcelModule {
    /// The language sheets are loaded with, when they support it.
    pub language: Language,

    sheets: HashMap<String, ExcelSheet>,
}

impl ExcelModule {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            sheets: HashMap::new(),
        }
    }

    /// Returns the sheet called `name` (case-insensitive), reading its header on
    /// first access.
    pub fn sheet(&mut self, pack: &mut Pack, name: &str) -> Result<&mut ExcelSheet, Error> {
        let key = name.to_lowercase();

        if !self.sheets.contains_key(&key) {
            let sheet = ExcelSheet::new(pack, &key, self.language)?;
            self.sheets.insert(key.clone(), sheet);
        }

        self.sheets
            .get_mut(&key)
            .ok_or(Error::FileNotFound { path: key })
    }
}
