// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(unused_variables)] // just binrw things with br(temp)

use std::collections::HashMap;
use std::io::{Cursor, Seek, SeekFrom};

use binrw::BinRead;
use binrw::{binread, binrw};

use crate::common::{Language, Platform};
use crate::exh::ExcelDataPagination;
use crate::{ByteSpan, ReadableFile};

#[binrw]
#[brw(magic = b"EXDF")]
#[brw(big)]
#[derive(Debug, Clone)]
pub(crate) struct EXDHeader {
    /// Usually 2, I don't think I've seen any other version
    pub(crate) version: u16,
    /// Seems to be 0?
    pub(crate) unk1: u16,
    /// Size of the row offset table in bytes
    pub(crate) data_offset_size: u32,
    #[brw(pad_after = 16)] // padding
    /// Size of the data sections in bytes
    pub(crate) data_section_size: u32,
}

impl EXDHeader {
    pub const SIZE: usize = 0x20;
}

/// One record of the row offset table.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExcelDataOffset {
    /// The row ID associated with this data offset
    pub(crate) row_id: u32,
    /// Offset to its data section in bytes from the start of the file.
    pub(crate) offset: u32,
}

/// The preamble in front of every row's bytes.
#[binrw]
#[brw(big)]
#[derive(Debug)]
pub(crate) struct DataSectionHeader {
    /// Size of the data section in bytes.
    pub(crate) size: u32,
    /// The number of (sub)rows in this data section.
    pub(crate) row_count: u16,
}

impl DataSectionHeader {
    pub const SIZE: usize = 6;
}

/// Excel data file, usually with the `.exd` file extension.
///
/// Represents one page of rows in an Excel sheet. Rows stay inside the raw data
/// blob and are sliced out on demand, so the lookups in [crate::excel] can hand
/// out borrowed views.
#[binread]
#[br(big)]
#[derive(Debug)]
pub struct EXD {
    pub(crate) header: EXDHeader,

    #[br(count = header.data_offset_size / 8)]
    pub(crate) data_offsets: Vec<ExcelDataOffset>,

    #[br(count = header.data_section_size)]
    pub(crate) data: Vec<u8>,

    /// Lookup for rows the direct-index fast path can't reach, built after parsing.
    #[br(calc = HashMap::new())]
    row_to_index: HashMap<u32, usize>,
}

impl ReadableFile for EXD {
    fn from_existing(_platform: Platform, buffer: ByteSpan) -> Option<EXD> {
        let mut exd = EXD::read(&mut Cursor::new(&buffer)).ok()?;
        exd.build_row_lookup();
        Some(exd)
    }
}

impl EXD {
    /// Calculate the filename of an EXD from the `name`, `language`, and `page`.
    pub fn calculate_filename(
        name: &str,
        language: Language,
        page: &ExcelDataPagination,
    ) -> String {
        match language {
            Language::None => {
                format!("{name}_{}.exd", page.start_id)
            }
            lang => {
                format!("{name}_{}_{}.exd", page.start_id, lang.shortname())
            }
        }
    }

    /// How many rows this page actually stores.
    pub fn entry_count(&self) -> usize {
        self.data_offsets.len()
    }

    // Most pages store row n at position n; only rows off that diagonal go into
    // the supplementary map.
    fn build_row_lookup(&mut self) {
        let Some(first) = self.data_offsets.first() else {
            return;
        };

        let first_id = first.row_id;
        for (index, entry) in self.data_offsets.iter().enumerate() {
            if entry.row_id != first_id.wrapping_add(index as u32) {
                self.row_to_index.insert(entry.row_id, index);
            }
        }
    }

    /// Finds the position of `row_id` in the offset table: the direct index first,
    /// the supplementary map second.
    pub(crate) fn index_for_row(&self, row_id: u32) -> Option<usize> {
        let first = self.data_offsets.first()?;

        let direct = row_id.wrapping_sub(first.row_id) as usize;
        if let Some(entry) = self.data_offsets.get(direct) {
            if entry.row_id == row_id {
                return Some(direct);
            }
        }

        self.row_to_index.get(&row_id).copied()
    }

    /// Returns `(row_id, sub_row_count, bytes)` for the row at `index` in the
    /// offset table, or `None` when the preamble doesn't address valid data.
    pub(crate) fn row_data(&self, index: usize) -> Option<(u32, u16, &[u8])> {
        let entry = self.data_offsets.get(index)?;

        let data_start = EXDHeader::SIZE as u32 + self.header.data_offset_size;
        let start = entry.offset.checked_sub(data_start)? as usize;

        let mut cursor = Cursor::new(&self.data);
        cursor.seek(SeekFrom::Start(start as u64)).ok()?;
        let preamble = DataSectionHeader::read(&mut cursor).ok()?;

        let begin = start + DataSectionHeader::SIZE;
        let bytes = self.data.get(begin..begin + preamble.size as usize)?;

        Some((entry.row_id, preamble.row_count, bytes))
    }
}
