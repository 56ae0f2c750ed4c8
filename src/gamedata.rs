// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::common::{ByteBuffer, Language, Platform, ReadableFile, read_version};
use crate::error::Error;
use crate::excel::{ExcelModule, ExcelSheet};
use crate::exl::EXL;
use crate::sqpack::Pack;

/// The environment variable consulted when no game path is given.
pub const GAME_PATH_VAR: &str = "FFXIV_GAME_PATH";

/// Options for opening a game installation.
#[derive(Debug, Clone)]
pub struct GameDataOptions {
    /// The directory containing `ffxivgame.ver` and `sqpack/`. When absent, the
    /// `FFXIV_GAME_PATH` environment variable is consulted instead.
    pub path: Option<String>,
    /// The platform the archives were packaged for. Only [Platform::Win32] can be
    /// read.
    pub platform: Platform,
    /// The language sheets are loaded with by default.
    pub language: Language,
}

impl Default for GameDataOptions {
    fn default() -> Self {
        Self {
            path: None,
            platform: Platform::Win32,
            language: Language::English,
        }
    }
}

/// Framework for operating on game data.
///
/// Owns the [Pack] the archives are read through and the [ExcelModule] sheets are
/// cached in. Because sheets read their pages through the pack, the two fields are
/// public; access them directly when you need to mix file reads with row reads:
///
/// ```no_run
/// # use corolla::gamedata::GameData;
/// # use corolla::Platform;
/// # use corolla::Error;
/// let mut game = GameData::from_existing(Platform::Win32, "$FFXIV/game")?;
///
/// let sheet = game.excel.sheet(&mut game.pack, "Item")?;
/// let row = sheet.row(&mut game.pack, 1)?;
/// # Ok::<(), Error>(())
/// ```
pub struct GameData {
    /// The game directory to operate on.
    pub game_directory: String,

    /// Read access to the SqPack archives.
    pub pack: Pack,

    /// The cached Excel sheets.
    pub excel: ExcelModule,

    version: Option<String>,
}

impl GameData {
    /// Opens a game installation described by `options`.
    pub fn new(options: GameDataOptions) -> Result<GameData, Error> {
        let directory = match options.path {
            Some(path) => path,
            None => std::env::var(GAME_PATH_VAR).map_err(|_| Error::FileNotFound {
                path: GAME_PATH_VAR.to_string(),
            })?,
        };

        debug!(directory = directory.as_str(), "Loading game directory");

        if !Path::new(&directory).is_dir() {
            warn!("Game directory not found.");
            return Err(Error::FileNotFound { path: directory });
        }

        let version = read_version(&PathBuf::from(&directory).join("ffxivgame.ver"));

        Ok(GameData {
            pack: Pack::from_existing(options.platform, &directory)?,
            excel: ExcelModule::new(options.language),
            game_directory: directory,
            version,
        })
    }

    /// Opens an existing game installation at `directory`, with default options.
    pub fn from_existing(platform: Platform, directory: &str) -> Result<GameData, Error> {
        Self::new(GameDataOptions {
            path: Some(directory.to_string()),
            platform,
            ..GameDataOptions::default()
        })
    }

    /// The version string from `ffxivgame.ver`, if the file was present.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Reads the file located at `path`. See [Pack::read].
    pub fn read(&mut self, path: &str) -> Result<ByteBuffer, Error> {
        self.pack.read(path)
    }

    /// Reads and parses the file located at `path`. See [Pack::parsed].
    pub fn parsed<F: ReadableFile>(&mut self, path: &str) -> Result<F, Error> {
        self.pack.parsed(path)
    }

    /// Returns the sheet called `name`, loading it on first access.
    pub fn sheet(&mut self, name: &str) -> Result<&mut ExcelSheet, Error> {
        self.excel.sheet(&mut self.pack, name)
    }

    /// Returns all known sheet names listed in the root list.
    pub fn sheet_names(&mut self) -> Result<Vec<String>, Error> {
        let root_exl: EXL = self.pack.parsed("exd/root.exl")?;

        Ok(root_exl.entries.into_iter().map(|(name, _)| name).collect())
    }
}
