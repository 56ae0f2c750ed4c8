// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::common::{ByteBuffer, Platform, ReadableFile};
use crate::error::Error;
use crate::repository::{Category, RepositoryId, string_to_category};
use crate::sqpack::{IndexEntry, SqPackData, SqPackIndex};

/// Read access to a set of SqPack archives, in their compressed on-disk format.
///
/// Index shards are opened on first demand and their lookup tables kept for the
/// lifetime of the pack, as are handles to the dat files behind them.
pub struct Pack {
    /// The game directory to operate on.
    pub game_directory: String,

    platform: Platform,
    index_files: HashMap<String, SqPackIndex>,
    dat_files: HashMap<String, SqPackData>,
}

impl Pack {
    /// Creates a pack over an existing game directory.
    ///
    /// Only Win32 archives can be read; any other platform is rejected.
    pub fn from_existing(platform: Platform, directory: &str) -> Result<Self, Error> {
        if platform != Platform::Win32 {
            return Err(Error::UnsupportedPlatform { platform });
        }

        Ok(Self {
            game_directory: String::from(directory),
            platform,
            index_files: HashMap::new(),
            dat_files: HashMap::new(),
        })
    }

    /// Reads the file located at `path`, reconstructing its contents from the
    /// archive blocks. The returned buffer is owned by the caller.
    pub fn read(&mut self, path: &str) -> Result<ByteBuffer, Error> {
        let (entry, repository, category, chunk) = self.find_entry(path)?;

        let dat_file = self.dat_file(repository, category, chunk, entry.data_file_id)?;

        dat_file.read_from_offset(entry.offset)
    }

    /// Reads and parses the file located at `path` in one go.
    pub fn parsed<F: ReadableFile>(&mut self, path: &str) -> Result<F, Error> {
        let bytes = self.read(path)?;

        F::from_existing(self.platform, &bytes).ok_or_else(|| Error::CorruptExcel {
            path: path.to_string(),
        })
    }

    /// Checks if a file exists without reading its contents.
    pub fn exists(&mut self, path: &str) -> bool {
        self.find_entry(path).is_ok()
    }

    /// Parses a path structure and spits out the corresponding category and repository.
    fn parse_repository_category(&self, path: &str) -> Result<(RepositoryId, Category), Error> {
        let mut tokens = path.split('/');

        let first = tokens.next().unwrap_or_default();
        let category = string_to_category(first).ok_or_else(|| Error::UnknownCategory {
            segment: first.to_string(),
        })?;

        // anything that doesn't look like an expansion belongs to the base repository
        let repository = match tokens.next() {
            Some(second) => RepositoryId::from_repository_string(second, true)?,
            None => RepositoryId::Base,
        };

        Ok((repository, category))
    }

    fn find_entry(&mut self, path: &str) -> Result<(IndexEntry, RepositoryId, Category, u8), Error> {
        let (repository, category) = self.parse_repository_category(path)?;

        let repository_directory: PathBuf = [
            self.game_directory.as_str(),
            "sqpack",
            repository.name().as_str(),
        ]
        .iter()
        .collect();

        // chunks are probed upward until a shard family stops existing on disk
        for chunk in 0..=u8::MAX {
            let index2_path =
                repository_directory.join(repository.index2_filename(self.platform, category, chunk));
            let index_path =
                repository_directory.join(repository.index_filename(self.platform, category, chunk));

            let has_index2 = index2_path.is_file();
            let has_index = index_path.is_file();

            if !has_index2 && !has_index {
                break;
            }

            // index2 is the cheaper lookup, prefer it when the shard is present
            if has_index2 {
                let index_file = self.cache_index_file(&index2_path)?;
                if let Some(entry) = index_file.find_entry(path) {
                    return Ok((entry, repository, category, chunk));
                }
            }

            if has_index {
                let index_file = self.cache_index_file(&index_path)?;
                if let Some(entry) = index_file.find_entry(path) {
                    return Ok((entry, repository, category, chunk));
                }
            }
        }

        Err(Error::FileNotFound {
            path: path.to_string(),
        })
    }

    fn cache_index_file(&mut self, path: &Path) -> Result<&SqPackIndex, Error> {
        let key = path.to_string_lossy().into_owned();

        match self.index_files.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                debug!(path = entry.key().as_str(), "Loading index shard");

                let index_file = SqPackIndex::from_existing(entry.key())?;
                Ok(entry.insert(index_file))
            }
        }
    }

    fn dat_file(
        &mut self,
        repository: RepositoryId,
        category: Category,
        chunk: u8,
        data_file_id: u8,
    ) -> Result<&mut SqPackData, Error> {
        let dat_path: PathBuf = [
            self.game_directory.as_str(),
            "sqpack",
            repository.name().as_str(),
            repository
                .dat_filename(self.platform, category, chunk, data_file_id)
                .as_str(),
        ]
        .iter()
        .collect();

        match self.dat_files.entry(dat_path.to_string_lossy().into_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                debug!(path = entry.key().as_str(), "Opening dat file");

                let dat_file = SqPackData::from_existing(entry.key())?;
                Ok(entry.insert(dat_file))
            }
        }
    }
}
