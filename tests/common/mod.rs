// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Builders for synthetic game directories, so the tests don't need a retail
//! install. All of the byte layouts here mirror what the crate parses.

use std::fs;
use std::path::PathBuf;

use corolla::repository::{Category, RepositoryId};
use corolla::sqpack::SqPackIndex;
use corolla::Platform;

/// A block of a dat entry, described by its plaintext.
pub enum Block {
    /// Stored verbatim behind the 32000 sentinel.
    Stored(Vec<u8>),
    /// Carried as a raw deflate stream (stored-mode, which every inflater accepts).
    Deflate(Vec<u8>),
}

impl Block {
    fn plaintext(&self) -> &[u8] {
        match self {
            Block::Stored(data) => data,
            Block::Deflate(data) => data,
        }
    }

    // 16-byte block header plus the encoded body
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Block::Stored(data) => {
                out.extend_from_slice(&16u32.to_le_bytes());
                out.extend_from_slice(&0u32.to_le_bytes());
                out.extend_from_slice(&32000u32.to_le_bytes());
                out.extend_from_slice(&(data.len() as u32).to_le_bytes());
                out.extend_from_slice(data);
            }
            Block::Deflate(data) => {
                // a stored-mode deflate stream: BFINAL=1, BTYPE=00, LEN, NLEN, bytes
                let mut stream = vec![0x01];
                stream.extend_from_slice(&(data.len() as u16).to_le_bytes());
                stream.extend_from_slice(&(!(data.len() as u16)).to_le_bytes());
                stream.extend_from_slice(data);

                out.extend_from_slice(&16u32.to_le_bytes());
                out.extend_from_slice(&0u32.to_le_bytes());
                out.extend_from_slice(&(stream.len() as u32).to_le_bytes());
                out.extend_from_slice(&(data.len() as u32).to_le_bytes());
                out.extend_from_slice(&stream);
            }
        }
        out
    }
}

fn align_to(buffer: &mut Vec<u8>, alignment: usize) {
    while buffer.len() % alignment != 0 {
        buffer.push(0);
    }
}

/// The 1024-byte preamble every SqPack file starts with.
pub fn sqpack_file_header(file_type: u8) -> Vec<u8> {
    let mut buffer = vec![0u8; 1024];
    buffer[0..8].copy_from_slice(b"SqPack\0\0");
    buffer[8] = 0; // win32
    buffer[12..16].copy_from_slice(&1024u32.to_le_bytes()); // header size
    buffer[16..20].copy_from_slice(&1u32.to_le_bytes()); // version
    buffer[20] = file_type;
    buffer[32..34].copy_from_slice(&(-1i16).to_le_bytes()); // global region
    buffer
}

fn index_shard(file_type_entries: &[u8], entry_width_total: u32) -> Vec<u8> {
    let mut buffer = sqpack_file_header(2);

    // segment header right behind the preamble: size, type, data offset, data size
    buffer.extend_from_slice(&1024u32.to_le_bytes());
    buffer.extend_from_slice(&0u32.to_le_bytes());
    buffer.extend_from_slice(&2048u32.to_le_bytes());
    buffer.extend_from_slice(&entry_width_total.to_le_bytes());

    align_to(&mut buffer, 2048);
    buffer.extend_from_slice(file_type_entries);
    buffer
}

/// Encodes a data locator: synonym bit, 3-bit dat id, then the offset scaled by 0x80.
pub fn locator(data_file_id: u8, offset: u64) -> u32 {
    assert_eq!(offset % 0x80, 0);
    ((offset >> 7) as u32) << 4 | (data_file_id as u32) << 1
}

/// A `.index` shard (split folder/file hashes, 16-byte records).
pub fn build_index(entries: &[(u64, u32)]) -> Vec<u8> {
    let mut records = Vec::new();
    for (hash, locator) in entries {
        records.extend_from_slice(&hash.to_le_bytes());
        records.extend_from_slice(&locator.to_le_bytes());
        records.extend_from_slice(&0u32.to_le_bytes());
    }
    index_shard(&records, records.len() as u32)
}

/// A `.index2` shard (full path hashes, 8-byte records).
pub fn build_index2(entries: &[(u32, u32)]) -> Vec<u8> {
    let mut records = Vec::new();
    for (hash, locator) in entries {
        records.extend_from_slice(&hash.to_le_bytes());
        records.extend_from_slice(&locator.to_le_bytes());
    }
    index_shard(&records, records.len() as u32)
}

/// A dat entry plus the payload its reconstruction must produce.
pub struct DatEntry {
    pub bytes: Vec<u8>,
    pub expected: Vec<u8>,
}

/// A standard entry: a header-relative block table, then the blocks back to back.
pub fn standard_entry(blocks: &[Block]) -> DatEntry {
    standard_entry_with_size(blocks, None)
}

/// Like [standard_entry], but lets a test lie about the declared size.
pub fn standard_entry_with_size(blocks: &[Block], declared_size: Option<u32>) -> DatEntry {
    let expected: Vec<u8> = blocks
        .iter()
        .flat_map(|block| block.plaintext().to_vec())
        .collect();
    let file_size = declared_size.unwrap_or(expected.len() as u32);

    let mut header_size = 24 + 8 * blocks.len();
    header_size = header_size.div_ceil(128) * 128;

    let mut body = Vec::new();
    let mut descriptors = Vec::new();
    for block in blocks {
        let encoded = block.encode();
        descriptors.push((
            body.len() as u32,
            encoded.len() as u16,
            block.plaintext().len() as u16,
        ));
        body.extend_from_slice(&encoded);
    }

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(header_size as u32).to_le_bytes());
    bytes.extend_from_slice(&2i32.to_le_bytes());
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);
    bytes.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
    for (offset, size, uncompressed) in descriptors {
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes.extend_from_slice(&uncompressed.to_le_bytes());
    }
    align_to(&mut bytes, header_size);
    bytes.extend_from_slice(&body);

    DatEntry { bytes, expected }
}

/// A model entry with one level of detail: stack and runtime sections, vertex
/// blocks and index blocks, reassembled behind the synthetic 0x44-byte header.
pub fn model_entry(
    version: u32,
    stack: &[Block],
    runtime: &[Block],
    vertex: &[Block],
    index: &[Block],
) -> DatEntry {
    let sections = [stack, runtime, vertex, index];

    let mut body = Vec::new();
    let mut section_offsets = [0u32; 4];
    let mut section_plain = [0u32; 4];
    let mut block_sizes: Vec<u16> = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        section_offsets[i] = body.len() as u32;
        for block in section.iter() {
            let encoded = block.encode();
            block_sizes.push(encoded.len() as u16);
            section_plain[i] += block.plaintext().len() as u32;
            body.extend_from_slice(&encoded);
        }
    }

    let total_blocks: usize = sections.iter().map(|s| s.len()).sum();
    let mut header_size = 208 + 2 * total_blocks;
    header_size = header_size.div_ceil(128) * 128;

    // eleven ranges: stack, runtime, vertex x3, edge x3, index x3
    let spread = |values: [u32; 4]| -> [u32; 11] {
        [
            values[0], values[1], values[2], 0, 0, 0, 0, 0, values[3], 0, 0,
        ]
    };
    let counts: [u32; 4] = [
        stack.len() as u32,
        runtime.len() as u32,
        vertex.len() as u32,
        index.len() as u32,
    ];

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(header_size as u32).to_le_bytes());
    bytes.extend_from_slice(&3i32.to_le_bytes());

    let expected_len =
        0x44 + section_plain.iter().map(|len| *len as usize).sum::<usize>();
    bytes.extend_from_slice(&(expected_len as u32).to_le_bytes());

    bytes.extend_from_slice(&(total_blocks as u32).to_le_bytes());
    bytes.extend_from_slice(&(total_blocks as u32).to_le_bytes());
    bytes.extend_from_slice(&version.to_le_bytes());

    for value in spread(section_plain) {
        bytes.extend_from_slice(&value.to_le_bytes()); // uncompressed sizes
    }
    for value in spread(section_plain) {
        bytes.extend_from_slice(&value.to_le_bytes()); // compressed sizes, close enough
    }
    for value in spread(section_offsets) {
        bytes.extend_from_slice(&value.to_le_bytes()); // section offsets
    }

    let mut running: u16 = 0;
    for count in spread(counts) {
        bytes.extend_from_slice(&running.to_le_bytes()); // starting block index
        running += count as u16;
    }
    for count in spread(counts) {
        bytes.extend_from_slice(&(count as u16).to_le_bytes()); // block counts
    }

    bytes.extend_from_slice(&1u16.to_le_bytes()); // vertex declarations
    bytes.extend_from_slice(&1u16.to_le_bytes()); // materials
    bytes.push(1); // lods
    bytes.push(0); // no index streaming
    bytes.push(0); // no edge geometry
    bytes.push(0);

    for size in &block_sizes {
        bytes.extend_from_slice(&size.to_le_bytes());
    }
    align_to(&mut bytes, header_size);
    bytes.extend_from_slice(&body);

    // what the reassembly must produce
    let mut expected = Vec::new();
    expected.extend_from_slice(&version.to_le_bytes());
    expected.extend_from_slice(&section_plain[0].to_le_bytes());
    expected.extend_from_slice(&section_plain[1].to_le_bytes());
    expected.extend_from_slice(&1u16.to_le_bytes());
    expected.extend_from_slice(&1u16.to_le_bytes());

    let after_runtime = 0x44 + section_plain[0] + section_plain[1];
    let vertex_offset = if section_plain[2] != 0 { after_runtime } else { 0 };
    let index_offset = if section_plain[3] != 0 {
        after_runtime + section_plain[2]
    } else {
        0
    };
    for value in [vertex_offset, 0, 0, index_offset, 0, 0] {
        expected.extend_from_slice(&value.to_le_bytes());
    }
    for value in [section_plain[2], 0, 0, section_plain[3], 0, 0] {
        expected.extend_from_slice(&value.to_le_bytes());
    }
    expected.push(1);
    expected.push(0);
    expected.push(0);
    expected.push(0);
    for section in &sections {
        for block in section.iter() {
            expected.extend_from_slice(block.plaintext());
        }
    }

    DatEntry {
        bytes,
        expected,
    }
}

/// A texture entry: a verbatim header region, then per-mipmap block runs.
pub fn texture_entry(header_region: &[u8], mipmaps: &[Vec<Block>]) -> DatEntry {
    // encode all mipmap blocks, tracking where each mipmap starts
    let mut body = Vec::new();
    let mut lods = Vec::new();
    let mut block_sizes: Vec<u16> = Vec::new();
    for mipmap in mipmaps {
        let compressed_offset = header_region.len() as u32 + body.len() as u32;
        let mut compressed_size = 0u32;
        let mut decompressed_size = 0u32;
        for block in mipmap {
            let encoded = block.encode();
            compressed_size += encoded.len() as u32;
            decompressed_size += block.plaintext().len() as u32;
            block_sizes.push(encoded.len() as u16);
            body.extend_from_slice(&encoded);
        }
        lods.push((
            compressed_offset,
            compressed_size,
            decompressed_size,
            mipmap.len() as u32,
        ));
    }

    let total_blocks = block_sizes.len();
    let mut header_size = 24 + 20 * mipmaps.len() + 2 * total_blocks;
    header_size = header_size.div_ceil(128) * 128;

    let expected_len = header_region.len()
        + mipmaps
            .iter()
            .flatten()
            .map(|block| block.plaintext().len())
            .sum::<usize>();

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(header_size as u32).to_le_bytes());
    bytes.extend_from_slice(&4i32.to_le_bytes());
    bytes.extend_from_slice(&(expected_len as u32).to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);
    bytes.extend_from_slice(&(mipmaps.len() as u32).to_le_bytes());
    let mut block_index = 0u32;
    for (compressed_offset, compressed_size, decompressed_size, block_count) in &lods {
        bytes.extend_from_slice(&compressed_offset.to_le_bytes());
        bytes.extend_from_slice(&compressed_size.to_le_bytes());
        bytes.extend_from_slice(&decompressed_size.to_le_bytes());
        bytes.extend_from_slice(&block_index.to_le_bytes());
        bytes.extend_from_slice(&block_count.to_le_bytes());
        block_index += block_count;
    }
    for size in &block_sizes {
        bytes.extend_from_slice(&size.to_le_bytes());
    }
    align_to(&mut bytes, header_size);
    bytes.extend_from_slice(header_region);
    bytes.extend_from_slice(&body);

    let mut expected = header_region.to_vec();
    for mipmap in mipmaps {
        for block in mipmap {
            expected.extend_from_slice(block.plaintext());
        }
    }

    DatEntry { bytes, expected }
}

/// Assembles one dat file and its index shards for a set of virtual paths.
pub struct ArchiveBuilder {
    category: Category,
    repository: RepositoryId,
    dat: Vec<u8>,
    entries: Vec<(String, u64)>,
}

impl ArchiveBuilder {
    pub fn new(category: Category, repository: RepositoryId) -> Self {
        Self {
            category,
            repository,
            dat: sqpack_file_header(1),
            entries: Vec::new(),
        }
    }

    /// Adds a file at `path`, returning the dat offset it landed on.
    pub fn add_file(&mut self, path: &str, entry: &DatEntry) -> u64 {
        align_to(&mut self.dat, 0x80);
        let offset = self.dat.len() as u64;
        self.dat.extend_from_slice(&entry.bytes);
        self.entries.push((path.to_string(), offset));
        offset
    }

    /// Writes the dat plus the chosen index shards under `root/sqpack/<repo>/`.
    pub fn write(&self, root: &GameRoot, with_index: bool, with_index2: bool) {
        let mut dat = self.dat.clone();
        // slack after the last block header, which peeks ahead while parsing
        dat.extend_from_slice(&[0u8; 16]);

        let repo_name = self.repository.name();
        let repo_dir = root.path.join("sqpack").join(&repo_name);
        fs::create_dir_all(&repo_dir).unwrap();

        fs::write(
            repo_dir.join(self.repository.dat_filename(
                Platform::Win32,
                self.category,
                0,
                0,
            )),
            &dat,
        )
        .unwrap();

        if with_index {
            let records: Vec<(u64, u32)> = self
                .entries
                .iter()
                .map(|(path, offset)| (SqPackIndex::split_hash(path), locator(0, *offset)))
                .collect();
            fs::write(
                repo_dir.join(self.repository.index_filename(
                    Platform::Win32,
                    self.category,
                    0,
                )),
                build_index(&records),
            )
            .unwrap();
        }

        if with_index2 {
            let records: Vec<(u32, u32)> = self
                .entries
                .iter()
                .map(|(path, offset)| (SqPackIndex::full_hash(path), locator(0, *offset)))
                .collect();
            fs::write(
                repo_dir.join(self.repository.index2_filename(
                    Platform::Win32,
                    self.category,
                    0,
                )),
                build_index2(&records),
            )
            .unwrap();
        }
    }
}

/// An `.exh` sheet header: one Int8 column, the given pagination and languages.
pub fn build_exh(
    row_size: u16,
    row_kind: u8,
    row_count: u32,
    pages: &[(u32, u32)],
    languages: &[u8],
) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(b"EXHF");
    buffer.extend_from_slice(&3u16.to_be_bytes()); // version
    buffer.extend_from_slice(&row_size.to_be_bytes());
    buffer.extend_from_slice(&1u16.to_be_bytes()); // columns
    buffer.extend_from_slice(&(pages.len() as u16).to_be_bytes());
    buffer.extend_from_slice(&(languages.len() as u16).to_be_bytes());
    buffer.extend_from_slice(&0u16.to_be_bytes());
    buffer.push(0);
    buffer.push(row_kind);
    buffer.extend_from_slice(&0u16.to_be_bytes());
    buffer.extend_from_slice(&row_count.to_be_bytes());
    buffer.extend_from_slice(&[0u8; 8]);

    // one Int8 column at offset 0
    buffer.extend_from_slice(&2u16.to_be_bytes());
    buffer.extend_from_slice(&0u16.to_be_bytes());

    for (start_id, row_count) in pages {
        buffer.extend_from_slice(&start_id.to_be_bytes());
        buffer.extend_from_slice(&row_count.to_be_bytes());
    }

    for language in languages {
        buffer.push(*language);
        buffer.push(0);
    }

    buffer
}

/// An `.exd` page: the offset table, then `(size, sub_row_count, bytes)` sections.
pub fn build_exd(rows: &[(u32, u16, Vec<u8>)]) -> Vec<u8> {
    let offset_table_size = (rows.len() * 8) as u32;
    let data_start = 0x20 + offset_table_size;

    let mut data = Vec::new();
    let mut offsets = Vec::new();
    for (row_id, sub_row_count, bytes) in rows {
        offsets.push((*row_id, data_start + data.len() as u32));
        data.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        data.extend_from_slice(&sub_row_count.to_be_bytes());
        data.extend_from_slice(bytes);
    }

    let mut buffer = Vec::new();
    buffer.extend_from_slice(b"EXDF");
    buffer.extend_from_slice(&2u16.to_be_bytes());
    buffer.extend_from_slice(&0u16.to_be_bytes());
    buffer.extend_from_slice(&offset_table_size.to_be_bytes());
    buffer.extend_from_slice(&(data.len() as u32).to_be_bytes());
    buffer.extend_from_slice(&[0u8; 16]);
    for (row_id, offset) in offsets {
        buffer.extend_from_slice(&row_id.to_be_bytes());
        buffer.extend_from_slice(&offset.to_be_bytes());
    }
    buffer.extend_from_slice(&data);

    buffer
}

/// A scratch game directory under the target tmpdir.
pub struct GameRoot {
    pub path: PathBuf,
}

impl GameRoot {
    pub fn new(name: &str) -> Self {
        let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(path.join("sqpack").join("ffxiv")).unwrap();
        fs::write(path.join("ffxivgame.ver"), "2024.03.21.0000.0000").unwrap();
        Self { path }
    }

    pub fn dir(&self) -> &str {
        self.path.to_str().unwrap()
    }
}
