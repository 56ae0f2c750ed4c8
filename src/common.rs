// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use binrw::binrw;

/// An owned buffer of file contents.
pub type ByteBuffer = Vec<u8>;

/// A borrowed span of file contents.
pub type ByteSpan<'a> = &'a [u8];

#[binrw]
#[brw(repr(u8))]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The language the game data is written for.
pub enum Language {
    /// Used for data that is language-agnostic, such as item data.
    None,
    /// Japanese language.
    Japanese,
    /// English language.
    English,
    /// German language.
    German,
    /// French language.
    French,
    /// Chinese (Simplified) language.
    ChineseSimplified,
    /// Chinese (Traditional) language.
    ChineseTraditional,
    /// Korean language.
    Korean,
}

impl Language {
    /// Returns the shorthand language code. For example, English becomes "en".
    pub fn shortname(&self) -> &'static str {
        match self {
            Language::None => "",
            Language::Japanese => "ja",
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
            Language::ChineseSimplified => "chs",
            Language::ChineseTraditional => "cht",
            Language::Korean => "ko",
        }
    }
}

/// The region of the game client the data was packaged for.
#[binrw]
#[brw(repr = i16)]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Region {
    /// The global region, used for any region not specified.
    Global = -1,
    /// Korea and China clients.
    KoreaChina = 1,
}

#[binrw]
#[brw(repr = u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// The platform an archive set was packaged for.
pub enum Platform {
    /// Windows and macOS
    Win32 = 0x0,
    /// Playstation 3
    PS3 = 0x1,
    /// Playstation 4
    PS4 = 0x2,
    /// Playstation 5
    PS5 = 0x3,
}

pub fn get_platform_string(id: &Platform) -> &'static str {
    match &id {
        Platform::Win32 => "win32",
        Platform::PS3 => "ps3",
        Platform::PS4 => "ps4",
        Platform::PS5 => "ps5",
    }
}

/// A file type that can be constructed from a byte buffer.
///
/// Implementations read everything they need up front; the buffer is not
/// retained past the call.
pub trait ReadableFile: Sized {
    fn from_existing(platform: Platform, buffer: ByteSpan) -> Option<Self>;
}

/// Reads a version file.
pub fn read_version(p: &Path) -> Option<String> {
    fs::read_to_string(p).ok()
}
