// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{BufRead, BufReader, Cursor};

use crate::common::{ByteSpan, Platform, ReadableFile};

/// Excel list file, usually with the `.exl` file extension.
///
/// Contains a list of every Excel sheet available in-game.
#[derive(Debug)]
pub struct EXL {
    /// The version of the list.
    pub version: i32,

    /// The entries of the list.
    pub entries: Vec<(String, i32)>,
}

impl ReadableFile for EXL {
    fn from_existing(_platform: Platform, buffer: ByteSpan) -> Option<Self> {
        let mut exl = Self {
            version: 0,
            entries: Vec::new(),
        };

        let cursor = Cursor::new(buffer);
        let reader = BufReader::new(cursor);

        for line in reader.lines().map_while(Result::ok) {
            if let Some((name, value)) = line.split_once(',') {
                if let Ok(parsed_value) = value.trim().parse() {
                    if name == "EXLT" {
                        exl.version = parsed_value;
                    } else if !name.starts_with('#') {
                        // Ignore rows with comments
                        exl.entries.push((name.to_string(), parsed_value));
                    }
                }
            }
        }

        Some(exl)
    }
}

impl EXL {
    /// Checks whether or not the list contains `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == key)
    }
}
