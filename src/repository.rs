// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::common::{Platform, get_platform_string};
use crate::error::Error;

/// Names a game data repository, discerning base game data from expansion data.
///
/// Repositories translate to directories under `sqpack/`, such as "ffxiv" or "ex1".
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub enum RepositoryId {
    /// The base game repository, named "ffxiv".
    Base,
    /// An expansion repository, named "ex1", "ex2" and so on.
    Expansion(u8),
}

impl RepositoryId {
    /// Parses a repository directory name, such as "ffxiv" or "ex1".
    ///
    /// When `fallback` is set, unrecognized names resolve to the base repository.
    /// Path segments that merely *look* like a repository go through this, hence
    /// the fallback.
    pub fn from_repository_string(name: &str, fallback: bool) -> Result<Self, Error> {
        if name == "ffxiv" {
            return Ok(Self::Base);
        }

        if let Some(number) = name.strip_prefix("ex") {
            if let Ok(number) = number.parse::<u8>() {
                if number > 0 {
                    return Ok(Self::Expansion(number));
                }
            }
        }

        if fallback {
            Ok(Self::Base)
        } else {
            Err(Error::InvalidRepo {
                name: name.to_string(),
            })
        }
    }

    /// The directory name of this repository, such as "ffxiv" or "ex1".
    pub fn name(&self) -> String {
        match self {
            Self::Base => "ffxiv".to_string(),
            Self::Expansion(number) => format!("ex{number}"),
        }
    }

    /// The numeric id stored in shard filenames: 0 for base, the expansion number otherwise.
    pub fn id(&self) -> u8 {
        match self {
            Self::Base => 0,
            Self::Expansion(number) => *number,
        }
    }

    /// The repository a shard filename id refers to.
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => Self::Base,
            number => Self::Expansion(number),
        }
    }

    /// Calculate an index filename for a specific category and chunk, like
    /// _"040000.win32.index"_.
    pub fn index_filename(&self, platform: Platform, category: Category, chunk: u8) -> String {
        format!(
            "{}.{}.index",
            self.shard_stem(category, chunk),
            get_platform_string(&platform)
        )
    }

    /// Calculate an index2 filename for a specific category and chunk.
    pub fn index2_filename(&self, platform: Platform, category: Category, chunk: u8) -> String {
        format!(
            "{}.{}.index2",
            self.shard_stem(category, chunk),
            get_platform_string(&platform)
        )
    }

    /// Calculate a dat filename given a category, chunk and data file id, like
    /// _"040000.win32.dat0"_.
    pub fn dat_filename(
        &self,
        platform: Platform,
        category: Category,
        chunk: u8,
        data_file_id: u8,
    ) -> String {
        format!(
            "{}.{}.dat{data_file_id}",
            self.shard_stem(category, chunk),
            get_platform_string(&platform)
        )
    }

    // Shards are named by category, chunk and repository, two hex digits each.
    fn shard_stem(&self, category: Category, chunk: u8) -> String {
        format!("{:02x}{:02x}{:02x}00", category as u8, chunk, self.id())
    }
}

/// This refers to the specific root directory a file is located in.
/// This is a fixed list of directories, and all of them are known.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[repr(u8)]
pub enum Category {
    /// Common files such as game fonts, and other data that doesn't really fit anywhere else.
    Common = 0x00,
    /// Shared data between game maps.
    BackgroundCommon = 0x01,
    /// Game map data such as models, textures, and so on.
    Background = 0x02,
    /// Cutscene content such as animations.
    Cutscene = 0x03,
    /// Character model files and more.
    Character = 0x04,
    /// Compiled shaders used by the retail client.
    Shader = 0x05,
    /// UI layouts and textures.
    UI = 0x06,
    /// Sound effects, basically anything not under `Music`.
    Sound = 0x07,
    /// This "VFX" means "visual effects", and contains textures and definitions for stuff like battle effects.
    VFX = 0x08,
    /// A leftover from 1.0, where the UI was primarily driven by LUA scripts.
    UIScript = 0x09,
    /// Excel data.
    EXD = 0x0A,
    /// Many game events are driven by LUA scripts, such as cutscenes.
    GameScript = 0x0B,
    /// Music!
    Music = 0x0C,
    /// Unknown purpose, most likely to test SqPack functionality.
    SqPackTest = 0x12,
    /// Unknown purpose, most likely debug files.
    Debug = 0x13,
}

pub fn string_to_category(string: &str) -> Option<Category> {
    use crate::repository::Category::*;

    match string {
        "common" => Some(Common),
        "bgcommon" => Some(BackgroundCommon),
        "bg" => Some(Background),
        "cut" => Some(Cutscene),
        "chara" => Some(Character),
        "shader" => Some(Shader),
        "ui" => Some(UI),
        "sound" => Some(Sound),
        "vfx" => Some(VFX),
        "ui_script" => Some(UIScript),
        "exd" => Some(EXD),
        "game_script" => Some(GameScript),
        "music" => Some(Music),
        "sqpack_test" => Some(SqPackTest),
        "debug" => Some(Debug),
        _ => None,
    }
}
