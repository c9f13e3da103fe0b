// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh parsing.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Where in the input a problem was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// 1-based line number (ASCII content).
    Line(usize),
    /// 1-based record index inside a binary section.
    Record {
        /// Section tag without the leading `$`, e.g. `Nodes`.
        section: &'static str,
        index: usize,
    },
    /// Byte offset from the start of the input.
    Offset(u64),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(line) => write!(f, "line {}", line),
            Position::Record { section, index } => write!(f, "record {} of ${}", index, section),
            Position::Offset(offset) => write!(f, "byte offset {}", offset),
        }
    }
}

/// Errors that abort a parse.
///
/// An observer asking to stop is not an error; see
/// [`ParseStatus::StoppedByObserver`](crate::ParseStatus::StoppedByObserver).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The mesh file could not be opened.
    #[error("could not open {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The binary sentinel after `$MeshFormat` did not decode to 1 in either byte order.
    #[error("endianness sentinel mismatch: read bytes {raw:02x?}, expected the integer 1")]
    EndiannessMismatch { raw: [u8; 4] },

    /// The `$MeshFormat` header declares a version this parser does not read.
    #[error("unsupported mesh format version {version} at {position}")]
    UnsupportedVersion { version: String, position: Position },

    /// Malformed or truncated content.
    #[error("{message} at {position}")]
    Structural { position: Position, message: String },

    /// A binary element block uses a type code with no known node count.
    #[error("element type {type_code} has no known node count at {position}")]
    UnknownElementType { type_code: i32, position: Position },

    /// Read failure other than a premature end of file.
    #[error("I/O error at {position}: {source}")]
    Io {
        position: Position,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a structural error.
    pub fn structural(position: Position, message: impl Into<String>) -> Self {
        Self::Structural {
            position,
            message: message.into(),
        }
    }

    /// Position in the input where the error was detected, if any.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::FileNotFound { .. } | Error::EndiannessMismatch { .. } => None,
            Error::UnsupportedVersion { position, .. }
            | Error::Structural { position, .. }
            | Error::UnknownElementType { position, .. }
            | Error::Io { position, .. } => Some(*position),
        }
    }

    /// Map a read failure, turning premature EOF into a structural error.
    pub(crate) fn from_io(position: Position, err: std::io::Error, context: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::structural(position, format!("unexpected end of file {}", context))
        } else {
            Self::Io {
                position,
                source: err,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::Line(12).to_string(), "line 12");
        assert_eq!(
            Position::Record {
                section: "Nodes",
                index: 3
            }
            .to_string(),
            "record 3 of $Nodes"
        );
        assert_eq!(Position::Offset(40).to_string(), "byte offset 40");
    }

    #[test]
    fn test_unexpected_eof_is_structural() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err = Error::from_io(Position::Line(4), io, "inside $Nodes");
        assert!(matches!(err, Error::Structural { .. }));
        assert_eq!(err.position(), Some(Position::Line(4)));
        assert_eq!(err.to_string(), "unexpected end of file inside $Nodes at line 4");
    }
}
