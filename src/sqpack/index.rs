// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(clippy::identity_op)]

use std::collections::HashMap;
use std::io::SeekFrom;

use binrw::BinRead;
use binrw::binrw;
use modular_bitfield::prelude::*;

use crate::crc::Jamcrc;
use crate::error::Error;
use crate::sqpack::SqPackHeader;

#[binrw]
#[brw(little)]
pub(crate) struct SqPackIndexHeader {
    size: u32,
    file_type: u32,
    index_data_offset: u32,
    index_data_size: u32,
}

/// Where a file's contents live: the dat file id in the low bits, then the block
/// offset scaled down by 0x80. Bit 0 flags path-hash synonyms.
#[bitfield]
#[binrw]
#[br(map = Self::from_bytes)]
#[derive(Clone, Copy, Debug)]
pub(crate) struct DataLocator {
    pub synonym: B1,
    pub data_file_id: B3,
    pub offset: B28,
}

// The only difference between index and index2 is how the path hash is stored.
// The folder name and the filename are hashed separately in index1 (hence why it's
// 64-bits and not 32-bit), but index2 hashes the whole path at once.
#[binrw]
#[brw(little)]
pub(crate) struct IndexHashTableEntry {
    pub hash: u64,
    #[brw(pad_after = 4)]
    pub(crate) locator: DataLocator,
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
pub(crate) struct Index2HashTableEntry {
    pub hash: u32,
    pub(crate) locator: DataLocator,
}

#[binrw]
#[br(little)]
pub(crate) struct IndexFile {
    sqpack_header: SqPackHeader,

    #[br(seek_before = SeekFrom::Start(sqpack_header.size.into()))]
    index_header: SqPackIndexHeader,

    #[br(seek_before = SeekFrom::Start(index_header.index_data_offset.into()))]
    #[br(count = index_header.index_data_size / 16)]
    pub entries: Vec<IndexHashTableEntry>,
}

#[binrw]
#[br(little)]
pub(crate) struct Index2File {
    sqpack_header: SqPackHeader,

    #[br(seek_before = SeekFrom::Start(sqpack_header.size.into()))]
    index_header: SqPackIndexHeader,

    #[br(seek_before = SeekFrom::Start(index_header.index_data_offset.into()))]
    #[br(count = index_header.index_data_size / 8)]
    pub entries: Vec<Index2HashTableEntry>,
}

/// A resolved index record: which dat file, and the byte offset of the entry header
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub data_file_id: u8,
    pub offset: u64,
}

impl IndexEntry {
    fn from_locator(locator: &DataLocator) -> Self {
        Self {
            data_file_id: locator.data_file_id(),
            // the on-disk field is scaled so 28 bits can span the whole dat
            offset: locator.offset() as u64 * 0x80,
        }
    }
}

enum HashTable {
    /// From an `.index` shard, keyed on `(folder_hash << 32) | file_hash`.
    Split(HashMap<u64, IndexEntry>),
    /// From an `.index2` shard, keyed on the full path hash.
    Full(HashMap<u32, IndexEntry>),
}

/// One parsed index shard, loaded once into a lookup table.
pub struct SqPackIndex {
    table: HashTable,
}

const CRC: Jamcrc = Jamcrc::new();

impl SqPackIndex {
    /// Parses an existing `.index` or `.index2` shard; the extension decides which
    /// hash scheme the table uses.
    pub fn from_existing(path: &str) -> Result<Self, Error> {
        let mut file =
            std::fs::File::open(path).map_err(|err| Error::io("opening index shard", err))?;

        let invalid = |_| Error::InvalidIndex {
            path: path.to_string(),
        };

        let table = if path.ends_with(".index2") {
            let index = Index2File::read(&mut file).map_err(invalid)?;

            HashTable::Full(
                index
                    .entries
                    .iter()
                    .map(|entry| (entry.hash, IndexEntry::from_locator(&entry.locator)))
                    .collect(),
            )
        } else {
            let index = IndexFile::read(&mut file).map_err(invalid)?;

            HashTable::Split(
                index
                    .entries
                    .iter()
                    .map(|entry| (entry.hash, IndexEntry::from_locator(&entry.locator)))
                    .collect(),
            )
        };

        Ok(Self { table })
    }

    /// Looks up a game path in this shard.
    pub fn find_entry(&self, path: &str) -> Option<IndexEntry> {
        match &self.table {
            HashTable::Split(map) => map.get(&Self::split_hash(path)).copied(),
            HashTable::Full(map) => map.get(&Self::full_hash(path)).copied(),
        }
    }

    /// Calculates the hash used by `.index` shards: the folder and filename halves
    /// hashed separately. A path with no separator hashes as a bare filename under
    /// an empty folder.
    pub fn split_hash(path: &str) -> u64 {
        let lowercase = path.to_ascii_lowercase();

        let (directory, filename) = match lowercase.rfind('/') {
            Some(pos) => (&lowercase[..pos], &lowercase[pos + 1..]),
            None => ("", lowercase.as_str()),
        };

        let directory_crc = CRC.checksum(directory.as_bytes());
        let filename_crc = CRC.checksum(filename.as_bytes());

        (directory_crc as u64) << 32 | (filename_crc as u64)
    }

    /// Calculates the hash used by `.index2` shards, over the whole path.
    pub fn full_hash(path: &str) -> u32 {
        CRC.checksum(path.to_ascii_lowercase().as_bytes())
    }
}
