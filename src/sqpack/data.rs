// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs::File;
use std::io::Write;
use std::io::{Cursor, Read, Seek, SeekFrom};

use binrw::{BinRead, BinReaderExt, BinWrite, VecArgs, binrw};

use crate::common::ByteBuffer;
use crate::error::Error;
use crate::model::ModelFileHeader;
use crate::sqpack::read_data_block;

#[binrw]
#[brw(repr = i32)]
#[derive(Debug, PartialEq, Eq)]
/// The file type of the data entry.
pub enum FileType {
    /// Empty entry, usually invalid.
    Empty = 1,
    /// Encompasses every file that is not a model or a texture.
    Standard,
    /// Model (.mdl) files.
    Model,
    /// Texture (.tex) files.
    Texture,
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
struct StandardFileBlock {
    #[brw(pad_before = 8)]
    num_blocks: u32,
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
#[allow(dead_code)]
struct TextureLodBlock {
    compressed_offset: u32,
    compressed_size: u32,
    decompressed_size: u32,

    block_offset: u32,
    block_count: u32,
}

pub trait AnyNumberType<'a>:
    BinRead<Args<'a> = ()> + BinWrite<Args<'a> = ()> + std::ops::AddAssign + Copy + Default + 'static
{
}

impl<'a, T> AnyNumberType<'a> for T where
    T: BinRead<Args<'a> = ()>
        + BinWrite<Args<'a> = ()>
        + std::ops::AddAssign
        + Copy
        + Default
        + 'static
{
}

/// The eleven per-section ranges a model entry is fragmented into: stack, runtime,
/// then vertex, edge geometry and index buffers for three levels of detail.
#[binrw]
#[derive(Debug)]
pub struct ModelMemorySizes<T: for<'a> AnyNumberType<'a>> {
    pub stack_size: T,
    pub runtime_size: T,

    pub vertex_buffer_size: [T; 3],
    pub edge_geometry_vertex_buffer_size: [T; 3],
    pub index_buffer_size: [T; 3],
}

impl<T: for<'a> AnyNumberType<'a>> ModelMemorySizes<T> {
    pub fn total(&self) -> T {
        let mut total: T = T::default();

        total += self.stack_size;
        total += self.runtime_size;

        for i in 0..3 {
            total += self.vertex_buffer_size[i];
            total += self.edge_geometry_vertex_buffer_size[i];
            total += self.index_buffer_size[i];
        }

        total
    }
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
#[allow(dead_code)]
pub struct ModelFileBlock {
    pub num_blocks: u32,
    pub num_used_blocks: u32,
    pub version: u32,

    pub uncompressed_size: ModelMemorySizes<u32>,
    pub compressed_size: ModelMemorySizes<u32>,
    pub offset: ModelMemorySizes<u32>,
    pub index: ModelMemorySizes<u16>,
    pub num: ModelMemorySizes<u16>,

    pub vertex_declaration_num: u16,
    pub material_num: u16,
    pub num_lods: u8,

    #[br(map = crate::model::read_bool_from::<u8>)]
    #[bw(map = crate::model::write_bool_as::<u8>)]
    pub index_buffer_streaming_enabled: bool,
    #[brw(pad_after = 1)]
    #[br(map = crate::model::read_bool_from::<u8>)]
    #[bw(map = crate::model::write_bool_as::<u8>)]
    pub edge_geometry_enabled: bool,
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
struct TextureBlock {
    #[brw(pad_before = 8)]
    num_blocks: u32,

    #[br(count = num_blocks)]
    lods: Vec<TextureLodBlock>,
}

/// A SqPack file info header. It can optionally contain extra information, such as
/// texture or model data depending on the file type.
#[binrw]
#[brw(little)]
#[derive(Debug)]
struct FileInfo {
    size: u32,
    file_type: FileType,
    file_size: u32,

    #[br(if (file_type == FileType::Standard))]
    #[bw(if (*file_type == FileType::Standard))]
    standard_info: Option<StandardFileBlock>,

    #[br(if (file_type == FileType::Model))]
    #[bw(if (*file_type == FileType::Model))]
    model_info: Option<ModelFileBlock>,

    #[br(if (file_type == FileType::Texture))]
    #[bw(if (*file_type == FileType::Texture))]
    texture_info: Option<TextureBlock>,
}

/// One entry in a standard file's block table.
#[binrw]
#[brw(little)]
#[derive(Debug)]
#[allow(dead_code)]
struct BlockDescriptor {
    offset: u32,
    size: u16,
    uncompressed_size: u16,
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
#[br(import { x : i32, y : i32 })]
#[br(map = | _ : i32 | if x < 32000 { CompressionMode::Compressed{ compressed_length : x, decompressed_length : y} } else { CompressionMode::Uncompressed { file_size : y } } )]
pub enum CompressionMode {
    // we manually map here, because for this case the enum value is also a raw value we want to extract :-)
    Compressed {
        compressed_length: i32,
        decompressed_length: i32,
    },
    Uncompressed {
        file_size: i32,
    },
}

/// The 16-byte header at the start of every block body. A compressed size of 32000
/// is the sentinel for a stored (uncompressed) block.
#[binrw]
#[brw(little)]
#[derive(Debug)]
pub struct BlockHeader {
    #[brw(pad_after = 4)]
    pub size: u32,

    #[br(temp)]
    #[bw(calc = match compression { CompressionMode::Compressed{ compressed_length, .. } => { *compressed_length } CompressionMode::Uncompressed{ .. } => { 32000 }})]
    x: i32,

    #[br(temp)]
    #[bw(calc = match compression { CompressionMode::Compressed{ decompressed_length, .. } => { *decompressed_length } CompressionMode::Uncompressed{ file_size } => { *file_size }})]
    y: i32,

    #[br(args { x, y })]
    #[brw(restore_position)]
    pub compression: CompressionMode,
}

/// A dat file: the container the actual file contents live in, fragmented into
/// per-block-compressed pieces.
pub struct SqPackData {
    file: File,
}

impl SqPackData {
    /// Creates a new reference to an existing dat file.
    pub fn from_existing(path: &str) -> Result<Self, Error> {
        Ok(Self {
            file: File::open(path).map_err(|err| Error::io("opening dat file", err))?,
        })
    }

    /// Reads an entry from a certain offset inside of the dat file, reconstructing
    /// the original file contents from its blocks.
    pub fn read_from_offset(&mut self, offset: u64) -> Result<ByteBuffer, Error> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|err| Error::io("seeking to dat entry", err))?;

        let file_info =
            FileInfo::read(&mut self.file).map_err(|_| Error::InvalidDat { offset })?;

        let data = match file_info.file_type {
            FileType::Empty => return Err(Error::InvalidDat { offset }),
            FileType::Standard => self.read_standard_file(offset, &file_info)?,
            FileType::Model => self.read_model_file(offset, &file_info)?,
            FileType::Texture => self.read_texture_file(offset, &file_info)?,
        };

        // every layout must reproduce the declared size exactly
        if data.len() != file_info.file_size as usize {
            return Err(Error::InvalidDat { offset });
        }

        Ok(data)
    }

    /// Reads a standard file block.
    fn read_standard_file(&mut self, offset: u64, file_info: &FileInfo) -> Result<ByteBuffer, Error> {
        let standard_file_info = file_info
            .standard_info
            .as_ref()
            .ok_or(Error::InvalidDat { offset })?;

        let mut blocks: Vec<BlockDescriptor> =
            Vec::with_capacity(standard_file_info.num_blocks as usize);

        for _ in 0..standard_file_info.num_blocks {
            blocks.push(
                BlockDescriptor::read(&mut self.file).map_err(|_| Error::InvalidDat { offset })?,
            );
        }

        let mut data: Vec<u8> = Vec::with_capacity(file_info.file_size as usize);

        let starting_position = offset + (file_info.size as u64);

        for block in &blocks {
            data.append(&mut read_data_block(
                &mut self.file,
                starting_position + (block.offset as u64),
            )?);
        }

        Ok(data)
    }

    /// Reads a model file block.
    ///
    /// Models are fragmented into eleven section ranges; the sections are
    /// concatenated in fixed order behind a synthesized [ModelFileHeader].
    fn read_model_file(&mut self, offset: u64, file_info: &FileInfo) -> Result<ByteBuffer, Error> {
        let model_file_info = file_info
            .model_info
            .as_ref()
            .ok_or(Error::InvalidDat { offset })?;

        let mut buffer = Cursor::new(Vec::new());

        let base_offset = offset + (file_info.size as u64);

        let total_blocks = model_file_info.num.total();

        let compressed_block_sizes: Vec<u16> = self
            .file
            .read_le_args(VecArgs::builder().count(total_blocks as usize).finalize())
            .map_err(|_| Error::InvalidDat { offset })?;

        let mut current_block = 0;

        let mut vertex_data_offsets: [u32; 3] = [0; 3];
        let mut vertex_data_sizes: [u32; 3] = [0; 3];

        let mut index_data_offsets: [u32; 3] = [0; 3];
        let mut index_data_sizes: [u32; 3] = [0; 3];

        // leave room for the header, which is written last
        buffer
            .seek(SeekFrom::Start(ModelFileHeader::SIZE as u64))
            .map_err(|err| Error::io("seeking in model buffer", err))?;

        let stack_size = read_block_run(
            &mut self.file,
            &mut buffer,
            base_offset + model_file_info.offset.stack_size as u64,
            model_file_info.num.stack_size as usize,
            &compressed_block_sizes,
            &mut current_block,
        )? as u32;

        let runtime_size = read_block_run(
            &mut self.file,
            &mut buffer,
            base_offset + model_file_info.offset.runtime_size as u64,
            model_file_info.num.runtime_size as usize,
            &compressed_block_sizes,
            &mut current_block,
        )? as u32;

        // process all 3 lods
        for i in 0..3 {
            // vertex buffers
            if model_file_info.num.vertex_buffer_size[i] != 0 {
                let current_offset = buffer.position() as u32;
                if i == 0 || current_offset != vertex_data_offsets[i - 1] {
                    vertex_data_offsets[i] = current_offset;
                } else {
                    vertex_data_offsets[i] = 0;
                }

                vertex_data_sizes[i] = read_block_run(
                    &mut self.file,
                    &mut buffer,
                    base_offset + model_file_info.offset.vertex_buffer_size[i] as u64,
                    model_file_info.num.vertex_buffer_size[i] as usize,
                    &compressed_block_sizes,
                    &mut current_block,
                )? as u32;
            }

            // edge geometry sits between the vertex and index buffers
            if model_file_info.num.edge_geometry_vertex_buffer_size[i] != 0 {
                read_block_run(
                    &mut self.file,
                    &mut buffer,
                    base_offset
                        + model_file_info.offset.edge_geometry_vertex_buffer_size[i] as u64,
                    model_file_info.num.edge_geometry_vertex_buffer_size[i] as usize,
                    &compressed_block_sizes,
                    &mut current_block,
                )?;
            }

            // index buffers
            if model_file_info.num.index_buffer_size[i] != 0 {
                let current_offset = buffer.position() as u32;
                if i == 0 || current_offset != index_data_offsets[i - 1] {
                    index_data_offsets[i] = current_offset;
                } else {
                    index_data_offsets[i] = 0;
                }

                index_data_sizes[i] = read_block_run(
                    &mut self.file,
                    &mut buffer,
                    base_offset + model_file_info.offset.index_buffer_size[i] as u64,
                    model_file_info.num.index_buffer_size[i] as usize,
                    &compressed_block_sizes,
                    &mut current_block,
                )? as u32;
            }
        }

        let header = ModelFileHeader {
            version: model_file_info.version,
            stack_size,
            runtime_size,
            vertex_declaration_count: model_file_info.vertex_declaration_num,
            material_count: model_file_info.material_num,
            vertex_offsets: vertex_data_offsets,
            index_offsets: index_data_offsets,
            vertex_buffer_size: vertex_data_sizes,
            index_buffer_size: index_data_sizes,
            lod_count: model_file_info.num_lods,
            index_buffer_streaming_enabled: model_file_info.index_buffer_streaming_enabled,
            has_edge_geometry: model_file_info.edge_geometry_enabled,
        };

        buffer
            .seek(SeekFrom::Start(0))
            .map_err(|err| Error::io("seeking in model buffer", err))?;

        header
            .write(&mut buffer)
            .map_err(|_| Error::InvalidDat { offset })?;

        Ok(buffer.into_inner())
    }

    /// Reads a texture file block.
    fn read_texture_file(&mut self, offset: u64, file_info: &FileInfo) -> Result<ByteBuffer, Error> {
        let texture_file_info = file_info
            .texture_info
            .as_ref()
            .ok_or(Error::InvalidDat { offset })?;

        let mut data: Vec<u8> = Vec::with_capacity(file_info.file_size as usize);

        let first_lod = texture_file_info
            .lods
            .first()
            .ok_or(Error::InvalidDat { offset })?;

        // the texture header region is not block-compressed, copy it verbatim
        if first_lod.compressed_size != 0 {
            let original_pos = self
                .file
                .stream_position()
                .map_err(|err| Error::io("reading texture entry", err))?;

            self.file
                .seek(SeekFrom::Start(offset + file_info.size as u64))
                .map_err(|err| Error::io("reading texture entry", err))?;

            let mut header = vec![0u8; first_lod.compressed_offset as usize];
            self.file
                .read_exact(&mut header)
                .map_err(|err| Error::io("reading texture header", err))?;

            data.append(&mut header);

            self.file
                .seek(SeekFrom::Start(original_pos))
                .map_err(|err| Error::io("reading texture entry", err))?;
        }

        for lod in &texture_file_info.lods {
            let mut running_block_total =
                (lod.compressed_offset as u64) + offset + (file_info.size as u64);

            for _ in 0..lod.block_count {
                // the stream position walks the u16 table of block sizes
                let original_pos = self
                    .file
                    .stream_position()
                    .map_err(|err| Error::io("reading texture entry", err))?;

                data.append(&mut read_data_block(&mut self.file, running_block_total)?);

                self.file
                    .seek(SeekFrom::Start(original_pos))
                    .map_err(|err| Error::io("reading texture entry", err))?;

                running_block_total += self
                    .file
                    .read_le::<u16>()
                    .map_err(|_| Error::InvalidDat { offset })?
                    as u64;
            }
        }

        Ok(data)
    }
}

/// Reads `count` consecutive blocks of a model section, appending their contents to
/// `buffer`, and returns the number of bytes written.
fn read_block_run(
    file: &mut File,
    buffer: &mut Cursor<Vec<u8>>,
    section_offset: u64,
    count: usize,
    block_sizes: &[u16],
    current_block: &mut usize,
) -> Result<u64, Error> {
    file.seek(SeekFrom::Start(section_offset))
        .map_err(|err| Error::io("seeking to model section", err))?;

    let run_start = buffer.position();

    for _ in 0..count {
        let last_pos = file
            .stream_position()
            .map_err(|err| Error::io("reading model section", err))?;

        let data = read_data_block(&mut *file, last_pos)?;

        buffer
            .write_all(data.as_slice())
            .map_err(|err| Error::io("writing model section", err))?;

        let block_size = *block_sizes
            .get(*current_block)
            .ok_or(Error::InvalidDat { offset: last_pos })?;

        file.seek(SeekFrom::Start(last_pos + block_size as u64))
            .map_err(|err| Error::io("reading model section", err))?;
        *current_block += 1;
    }

    Ok(buffer.position() - run_start)
}
