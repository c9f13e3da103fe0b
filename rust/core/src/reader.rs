// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line and byte cursor over mesh input
//!
//! GMSH files interleave ASCII lines (tags, counts, headers) with raw binary
//! payloads, so the cursor offers both line reads and exact byte reads over
//! one buffered source while tracking line number and byte offset.

use std::io::{self, BufRead};

/// One input line with trailing whitespace and line terminator removed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'b> {
    pub text: &'b [u8],
    /// 1-based line number.
    pub number: usize,
}

pub(crate) struct MshReader<R> {
    inner: R,
    buf: Vec<u8>,
    line: usize,
    offset: u64,
}

impl<R: BufRead> MshReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(256),
            line: 0,
            offset: 0,
        }
    }

    /// Number of lines read so far.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next line. `None` at end of input.
    pub fn next_line(&mut self) -> io::Result<Option<Line<'_>>> {
        self.buf.clear();
        let mut seen_any = false;

        loop {
            let available = match self.inner.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                break;
            }
            seen_any = true;

            match memchr::memchr(b'\n', available) {
                Some(i) => {
                    self.buf.extend_from_slice(&available[..i]);
                    self.inner.consume(i + 1);
                    self.offset += (i + 1) as u64;
                    break;
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.inner.consume(len);
                    self.offset += len as u64;
                }
            }
        }

        if !seen_any {
            return Ok(None);
        }

        self.line += 1;
        Ok(Some(Line {
            text: self.buf.trim_ascii(),
            number: self.line,
        }))
    }

    /// Read the next line that is not blank.
    pub fn next_content_line(&mut self) -> io::Result<Option<Line<'_>>> {
        loop {
            // Re-borrow per iteration; a blank line is discarded before the next read.
            let blank = match self.next_line()? {
                None => return Ok(None),
                Some(line) => line.text.is_empty(),
            };
            if !blank {
                let number = self.line;
                return Ok(Some(Line {
                    text: self.buf.trim_ascii(),
                    number,
                }));
            }
        }
    }

    /// Read exactly `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> io::Result<&[u8]> {
        self.buf.clear();
        self.buf.resize(len, 0);
        self.inner.read_exact(&mut self.buf)?;
        self.offset += len as u64;
        Ok(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_lines_are_trimmed_and_numbered() {
        let mut reader = MshReader::new(Cursor::new("$Nodes\r\n  2 \nlast"));

        let line = reader.next_line().unwrap().unwrap();
        assert_eq!(line.text, b"$Nodes");
        assert_eq!(line.number, 1);

        let line = reader.next_line().unwrap().unwrap();
        assert_eq!(line.text, b"2");
        assert_eq!(line.number, 2);

        let line = reader.next_line().unwrap().unwrap();
        assert_eq!(line.text, b"last");
        assert_eq!(line.number, 3);

        assert!(reader.next_line().unwrap().is_none());
        assert_eq!(reader.offset(), 17);
    }

    #[test]
    fn test_skips_blank_lines() {
        let mut reader = MshReader::new(Cursor::new("\n\n  \n$EndNodes\n"));
        let line = reader.next_content_line().unwrap().unwrap();
        assert_eq!(line.text, b"$EndNodes");
        assert_eq!(line.number, 4);
    }

    #[test]
    fn test_mixed_binary_and_lines() {
        let mut data = b"2.2 1 8\n".to_vec();
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(b"\n$EndMeshFormat\n");

        let mut reader = MshReader::new(Cursor::new(data));
        assert_eq!(reader.next_line().unwrap().unwrap().text, b"2.2 1 8");
        assert_eq!(reader.read_bytes(4).unwrap(), &[1, 0, 0, 0]);
        assert_eq!(reader.offset(), 12);
        assert_eq!(reader.next_content_line().unwrap().unwrap().text, b"$EndMeshFormat");
    }

    #[test]
    fn test_short_binary_read() {
        let mut reader = MshReader::new(Cursor::new(vec![1u8, 2]));
        let err = reader.read_bytes(4).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
