// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{Read, Seek, SeekFrom};

use binrw::{BinRead, binrw};

use crate::common::{Platform, Region};
use crate::compression::no_header_decompress;
use crate::error::Error;

mod data;
pub use data::SqPackData;
use data::{BlockHeader, CompressionMode};

mod index;
pub use index::{IndexEntry, SqPackIndex};

mod pack;
pub use pack::Pack;

/// The type of this SqPack file.
#[binrw]
#[brw(repr = u8)]
#[derive(Debug)]
pub(crate) enum SqPackFileType {
    /// Database files, only seen in the boot directory.
    SQDB = 0x0,
    /// Dat files.
    Data = 0x1,
    /// Index/Index2 files.
    Index = 0x2,
}

/// The 1024-byte preamble every SqPack file starts with.
#[binrw]
#[brw(little)]
#[brw(magic = b"SqPack\0\0")]
#[derive(Debug)]
pub(crate) struct SqPackHeader {
    #[brw(pad_size_to = 4)]
    pub platform_id: Platform,
    pub size: u32,
    // Have only seen version 1
    version: u32,
    #[brw(pad_size_to = 4)]
    file_type: SqPackFileType,

    // zeroed out for index files
    unk1: u32,
    unk2: u32,

    #[brw(pad_size_to = 4)]
    region: Region,

    #[brw(pad_before = 924)]
    #[brw(pad_after = 44)]
    // The SHA1 of the bytes immediately before this
    sha1_hash: [u8; 20],
}

/// Reads one block at `starting_position`: a 16-byte block header followed by either
/// verbatim bytes or a raw deflate stream.
pub(crate) fn read_data_block<T: Read + Seek>(
    mut buf: T,
    starting_position: u64,
) -> Result<Vec<u8>, Error> {
    buf.seek(SeekFrom::Start(starting_position))
        .map_err(|err| Error::io("seeking to dat block", err))?;

    let block_header = BlockHeader::read(&mut buf).map_err(|_| Error::InvalidDat {
        offset: starting_position,
    })?;

    match block_header.compression {
        CompressionMode::Compressed {
            compressed_length,
            decompressed_length,
        } => {
            let mut compressed_data: Vec<u8> = vec![0; compressed_length as usize];
            buf.read_exact(&mut compressed_data)
                .map_err(|err| Error::io("reading compressed dat block", err))?;

            let mut decompressed_data: Vec<u8> = vec![0; decompressed_length as usize];
            if !no_header_decompress(&mut compressed_data, &mut decompressed_data) {
                return Err(Error::DecompressFailed);
            }

            Ok(decompressed_data)
        }
        CompressionMode::Uncompressed { file_size } => {
            let mut local_data: Vec<u8> = vec![0; file_size as usize];
            buf.read_exact(&mut local_data)
                .map_err(|err| Error::io("reading stored dat block", err))?;

            Ok(local_data)
        }
    }
}
