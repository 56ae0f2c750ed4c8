// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::common::{Platform, get_platform_string};

/// Everything that can go wrong while reading archives or sheets.
///
/// No variant is retried internally; all of them propagate to the caller.
#[derive(Debug)]
pub enum Error {
    /// The specified path was not found in the archives.
    FileNotFound {
        /// The path to the file that wasn't found.
        path: String,
    },
    /// The first path segment is not a known category.
    UnknownCategory {
        /// The offending segment.
        segment: String,
    },
    /// A repository name could not be parsed.
    InvalidRepo {
        /// The offending name.
        name: String,
    },
    /// The archive set was packaged for a platform we can't read.
    UnsupportedPlatform {
        /// The requested platform.
        platform: Platform,
    },
    /// An index shard had a bad magic or was cut short.
    InvalidIndex {
        /// The path to the shard on disk.
        path: String,
    },
    /// A dat entry failed to parse or reconstruct.
    InvalidDat {
        /// The byte offset of the entry inside the dat file.
        offset: u64,
    },
    /// A compressed block failed to inflate.
    DecompressFailed,
    /// The page index lies outside the sheet's pagination.
    InvalidPageIndex {
        /// The offending page index.
        index: usize,
    },
    /// No row with this id, or no row at this position.
    RowNotFound {
        /// The row id (or position) that was requested.
        row_id: u32,
    },
    /// The sheet provides neither the requested language nor `None`.
    LanguageNotFound {
        /// The name of the sheet.
        sheet: String,
    },
    /// An Excel file or row payload failed to parse.
    CorruptExcel {
        /// The path to the file that failed to parse.
        path: String,
    },
    /// An underlying OS error, tagged with the operation that hit it.
    Io {
        /// What we were doing when the error occurred.
        operation: &'static str,
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(operation: &'static str, source: std::io::Error) -> Self {
        Error::Io { operation, source }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::FileNotFound { path } => write!(f, "file not found: {path}"),
            Error::UnknownCategory { segment } => write!(f, "unknown category: {segment}"),
            Error::InvalidRepo { name } => write!(f, "invalid repository: {name}"),
            Error::UnsupportedPlatform { platform } => {
                write!(f, "unsupported platform: {}", get_platform_string(platform))
            }
            Error::InvalidIndex { path } => write!(f, "invalid index file: {path}"),
            Error::InvalidDat { offset } => write!(f, "invalid dat entry at {offset:#x}"),
            Error::DecompressFailed => write!(f, "failed to decompress block"),
            Error::InvalidPageIndex { index } => write!(f, "invalid page index: {index}"),
            Error::RowNotFound { row_id } => write!(f, "row not found: {row_id}"),
            Error::LanguageNotFound { sheet } => {
                write!(f, "no suitable language in sheet: {sheet}")
            }
            Error::CorruptExcel { path } => write!(f, "corrupt excel file: {path}"),
            Error::Io { operation, source } => write!(f, "i/o error during {operation}: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
