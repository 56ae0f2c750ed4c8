// SPDX-FileCopyrightText: 2024 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

#![doc = include_str!("../README.md")]
#![allow(unused_assignments)] // Too many false positives caused by binrw

#[doc(hidden)]
pub const COROLLA_VERSION: &str = env!("CARGO_PKG_VERSION");

// NOTE: Should be brought up to top-level because these are the most used types.
mod common;
pub use common::{
    ByteBuffer, ByteSpan, Language, Platform, ReadableFile, Region, get_platform_string,
    read_version,
};

// NOTE: Should be brought up to the top-level because it's a basic error type.
mod error;
pub use error::Error;

/// Parsing game repositories, such as "ffxiv" and "ex1", and the categories inside them.
pub mod repository;

/// SqPack file formats - Index/Index2 and Data files - and the [sqpack::Pack] that ties them together.
pub mod sqpack;

/// Implementation details for SqPack.
mod compression;

/// The header put in front of reconstructed model (`.mdl`) payloads.
pub mod model;

/// Types for Excel header (`.exh`) files.
pub mod exh;

/// Types for Excel data (`.exd`) files.
pub mod exd;

/// Types for Excel list (`.exl`) files.
pub mod exl;

/// Higher-level Excel API: modules, sheets and row views.
pub mod excel;

/// Framework for operating on game data.
pub mod gamedata;

/// Algorithms used everywhere.
mod crc;
pub use crc::crc32;
