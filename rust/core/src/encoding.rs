// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File encoding parameters
//!
//! The `$MeshFormat` header declares the version, whether payload records
//! are ASCII or binary, and the float width. Binary files follow the header
//! with the integer `1` written in the writer's byte order; reading it back
//! tells us which order the rest of the payload uses.

use std::fmt;

/// Payload encoding declared by the `file-type` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    Ascii,
    Binary,
}

impl FileType {
    /// Decode the header flag (0 = ASCII, 1 = binary).
    pub fn from_flag(flag: u32) -> Option<Self> {
        match flag {
            0 => Some(FileType::Ascii),
            1 => Some(FileType::Binary),
            _ => None,
        }
    }

    pub fn flag(self) -> u32 {
        match self {
            FileType::Ascii => 0,
            FileType::Binary => 1,
        }
    }
}

/// Byte order of binary payload records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Identify the byte order from the raw sentinel bytes.
    ///
    /// Little-endian is tried first; `None` means neither order reads 1.
    pub fn detect(raw: [u8; 4]) -> Option<Self> {
        if i32::from_le_bytes(raw) == 1 {
            Some(ByteOrder::Little)
        } else if i32::from_be_bytes(raw) == 1 {
            Some(ByteOrder::Big)
        } else {
            None
        }
    }

    #[inline]
    pub fn i32(self, raw: [u8; 4]) -> i32 {
        match self {
            ByteOrder::Little => i32::from_le_bytes(raw),
            ByteOrder::Big => i32::from_be_bytes(raw),
        }
    }

    #[inline]
    pub fn f64(self, raw: [u8; 8]) -> f64 {
        match self {
            ByteOrder::Little => f64::from_le_bytes(raw),
            ByteOrder::Big => f64::from_be_bytes(raw),
        }
    }

    #[inline]
    pub fn f32(self, raw: [u8; 4]) -> f32 {
        match self {
            ByteOrder::Little => f32::from_le_bytes(raw),
            ByteOrder::Big => f32::from_be_bytes(raw),
        }
    }
}

/// Decoded `$MeshFormat` header line: `version file-type data-size`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MeshFormat {
    /// Version as written, e.g. `2.2`.
    pub version: String,
    pub major: u32,
    pub minor: u32,
    pub file_type: FileType,
    /// Bytes per floating point value.
    pub data_size: usize,
}

impl MeshFormat {
    /// The header every ASCII 2.2 file written with doubles carries.
    pub fn ascii_v22() -> Self {
        Self {
            version: "2.2".to_string(),
            major: 2,
            minor: 2,
            file_type: FileType::Ascii,
            data_size: 8,
        }
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.version, self.file_type.flag(), self.data_size)
    }
}

/// Encoding parameters threaded through record decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Encoding {
    pub file_type: FileType,
    /// Only meaningful for binary payloads.
    pub byte_order: ByteOrder,
    /// Bytes per float, 4 or 8.
    pub data_size: usize,
}

/// Width of a binary integer field.
pub const INT_SIZE: usize = 4;

impl Encoding {
    pub fn ascii() -> Self {
        Self {
            file_type: FileType::Ascii,
            byte_order: ByteOrder::Little,
            data_size: 8,
        }
    }

    pub fn binary(byte_order: ByteOrder, data_size: usize) -> Self {
        Self {
            file_type: FileType::Binary,
            byte_order,
            data_size,
        }
    }

    #[inline]
    pub fn is_binary(&self) -> bool {
        self.file_type == FileType::Binary
    }

    /// Decode the integer at `index` (in ints) of `bytes`.
    #[inline]
    pub fn int_at(&self, bytes: &[u8], index: usize) -> i32 {
        let start = index * INT_SIZE;
        let mut raw = [0u8; INT_SIZE];
        raw.copy_from_slice(&bytes[start..start + INT_SIZE]);
        self.byte_order.i32(raw)
    }

    /// Decode a float of `data_size` bytes starting at byte `offset`.
    #[inline]
    pub fn float_at(&self, bytes: &[u8], offset: usize) -> f64 {
        if self.data_size == 4 {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[offset..offset + 4]);
            self.byte_order.f32(raw) as f64
        } else {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[offset..offset + 8]);
            self.byte_order.f64(raw)
        }
    }
}
