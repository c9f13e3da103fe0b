// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GMSH 2.2 mesh parser
//!
//! Walks the file section by section and streams every decoded node,
//! element and physical name to a [`MeshVisitor`]. Nothing is retained
//! between records except the cursor and the encoding parameters.
//!
//! ```text
//! Start -> $MeshFormat (encoding) -> { $Tag -> count -> N records -> $EndTag }* -> Done
//! ```
//!
//! Terminal states are `Ok` with [`ParseStatus::Completed`], `Ok` with
//! [`ParseStatus::StoppedByObserver`], or `Err`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::ascii::{self, RecordResult};
use crate::binary;
use crate::config::ParserConfig;
use crate::element_types::{element_name, element_node_count};
use crate::encoding::{ByteOrder, Encoding, FileType, MeshFormat, INT_SIZE};
use crate::entities::{Element, Node, PhysicalName};
use crate::error::{Error, Position, Result};
use crate::observer::{MeshVisitor, Observers};
use crate::reader::MshReader;

/// How a successful parse ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseStatus {
    /// Every section was consumed up to end of file.
    Completed,
    /// An observer returned `false`; nothing was dispatched after it.
    StoppedByObserver,
}

/// Summary of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseOutcome {
    pub status: ParseStatus,
    /// Decoded `$MeshFormat` header, `None` if the file had none.
    pub format: Option<MeshFormat>,
    /// Entities dispatched, including the one an observer stopped on.
    pub nodes: usize,
    pub elements: usize,
    pub physical_names: usize,
    /// Elements dispatched whose type code is not in the element table.
    pub unknown_element_types: usize,
    /// Names of sections skipped without decoding.
    pub skipped_sections: Vec<String>,
}

impl ParseOutcome {
    fn new() -> Self {
        Self {
            status: ParseStatus::Completed,
            format: None,
            nodes: 0,
            elements: 0,
            physical_names: 0,
            unknown_element_types: 0,
            skipped_sections: Vec::new(),
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.status == ParseStatus::Completed
    }

    #[inline]
    pub fn stopped_by_observer(&self) -> bool {
        self.status == ParseStatus::StoppedByObserver
    }
}

/// Mesh parser owning a registry of observers.
///
/// ```rust,ignore
/// use msh_lite_core::MeshParser;
///
/// let mut nodes = 0;
/// let mut parser = MeshParser::new();
/// parser.add_node_observer(|_| {
///     nodes += 1;
///     true
/// });
/// let outcome = parser.parse("mesh.msh")?;
/// drop(parser);
/// println!("{} nodes ({:?})", nodes, outcome.status);
/// ```
#[derive(Debug, Default)]
pub struct MeshParser<'a> {
    observers: Observers<'a>,
    config: ParserConfig,
}

impl<'a> MeshParser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            observers: Observers::new(),
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn observers(&self) -> &Observers<'a> {
        &self.observers
    }

    pub fn add_node_observer<F>(&mut self, observer: F) -> &mut Self
    where
        F: FnMut(&Node) -> bool + 'a,
    {
        self.observers.add_node_observer(observer);
        self
    }

    pub fn add_element_observer<F>(&mut self, observer: F) -> &mut Self
    where
        F: FnMut(&Element) -> bool + 'a,
    {
        self.observers.add_element_observer(observer);
        self
    }

    pub fn add_physical_name_observer<F>(&mut self, observer: F) -> &mut Self
    where
        F: FnMut(&PhysicalName) -> bool + 'a,
    {
        self.observers.add_physical_name_observer(observer);
        self
    }

    /// Parse the mesh file at `path`, dispatching to the registered observers.
    pub fn parse<P: AsRef<Path>>(&mut self, path: P) -> Result<ParseOutcome> {
        parse_file_with(path, self.config, &mut self.observers)
    }

    /// Parse mesh content from any buffered reader.
    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<ParseOutcome> {
        parse_reader_with(reader, self.config, &mut self.observers)
    }
}

/// Parse the mesh file at `path` into `visitor`.
///
/// Fails with [`Error::FileNotFound`] before any dispatch when the file
/// cannot be opened. The file handle is closed when this returns.
pub fn parse_file_with<P, V>(path: P, config: ParserConfig, visitor: &mut V) -> Result<ParseOutcome>
where
    P: AsRef<Path>,
    V: MeshVisitor + ?Sized,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "parsing mesh file");
    parse_reader_with(BufReader::new(file), config, visitor)
}

/// Parse mesh content from a buffered reader into `visitor`.
pub fn parse_reader_with<R, V>(reader: R, config: ParserConfig, visitor: &mut V) -> Result<ParseOutcome>
where
    R: BufRead,
    V: MeshVisitor + ?Sized,
{
    Session::new(reader, config, visitor).run()
}

/// Whether the section loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// State of one parse: cursor, encoding, counters
struct Session<'v, R, V: ?Sized> {
    reader: MshReader<R>,
    visitor: &'v mut V,
    config: ParserConfig,
    encoding: Option<Encoding>,
    outcome: ParseOutcome,
    warned_types: FxHashSet<i32>,
}

impl<'v, R: BufRead, V: MeshVisitor + ?Sized> Session<'v, R, V> {
    fn new(reader: R, config: ParserConfig, visitor: &'v mut V) -> Self {
        Self {
            reader: MshReader::new(reader),
            visitor,
            config,
            encoding: None,
            outcome: ParseOutcome::new(),
            warned_types: FxHashSet::default(),
        }
    }

    fn run(mut self) -> Result<ParseOutcome> {
        loop {
            let start = self.reader.offset();
            let eof = self.next_line_position();
            let binary = self.is_binary();

            let line = self
                .reader
                .next_content_line()
                .map_err(|e| Error::from_io(eof, e, "between sections"))?;
            let Some(line) = line else { break };

            let tag_position = if binary {
                Position::Offset(start)
            } else {
                Position::Line(line.number)
            };
            let tag = match ascii::section_tag(line.text) {
                Some(name) => String::from_utf8_lossy(name).into_owned(),
                None => {
                    return Err(Error::structural(
                        tag_position,
                        format!(
                            "expected a section tag, found {:?}",
                            String::from_utf8_lossy(line.text)
                        ),
                    ))
                }
            };

            let flow = match tag.as_str() {
                "MeshFormat" => self.read_mesh_format(tag_position)?,
                "PhysicalNames" => {
                    self.require_format(&tag, tag_position)?;
                    self.read_physical_names()?
                }
                "Nodes" => {
                    self.require_format(&tag, tag_position)?;
                    self.read_nodes()?
                }
                "Elements" => {
                    self.require_format(&tag, tag_position)?;
                    self.read_elements()?
                }
                other if other.starts_with("End") => {
                    return Err(Error::structural(
                        tag_position,
                        format!("closing tag ${} without a matching section", other),
                    ))
                }
                _ => self.skip_section(&tag, tag_position)?,
            };

            if flow == Flow::Stop {
                tracing::debug!(
                    nodes = self.outcome.nodes,
                    elements = self.outcome.elements,
                    "parse stopped by observer"
                );
                self.outcome.status = ParseStatus::StoppedByObserver;
                return Ok(self.outcome);
            }
        }

        if self.config.require_mesh_format && self.outcome.format.is_none() {
            return Err(Error::structural(
                self.next_line_position(),
                "no $MeshFormat section found",
            ));
        }

        tracing::debug!(
            nodes = self.outcome.nodes,
            elements = self.outcome.elements,
            physical_names = self.outcome.physical_names,
            "parse completed"
        );
        Ok(self.outcome)
    }

    // Cursor helpers

    #[inline]
    fn is_binary(&self) -> bool {
        self.encoding.is_some_and(|e| e.is_binary())
    }

    /// Encoding in effect; ASCII when the header was optional and absent.
    #[inline]
    fn encoding(&self) -> Encoding {
        self.encoding.unwrap_or_else(Encoding::ascii)
    }

    /// Position of the line about to be read.
    fn next_line_position(&self) -> Position {
        if self.is_binary() {
            Position::Offset(self.reader.offset())
        } else {
            Position::Line(self.reader.line() + 1)
        }
    }

    fn require_format(&mut self, section: &str, position: Position) -> Result<()> {
        if self.encoding.is_some() {
            return Ok(());
        }
        if self.config.require_mesh_format {
            return Err(Error::structural(
                position,
                format!("${} before $MeshFormat", section),
            ));
        }
        tracing::debug!("no $MeshFormat header, assuming ASCII 2.2");
        self.encoding = Some(Encoding::ascii());
        Ok(())
    }

    /// Read a section's record count line.
    fn read_count(&mut self, section: &'static str) -> Result<usize> {
        let start = self.reader.offset();
        let eof = self.next_line_position();
        let binary = self.is_binary();

        let line = self
            .reader
            .next_content_line()
            .map_err(|e| Error::from_io(eof, e, "reading a record count"))?
            .ok_or_else(|| {
                Error::structural(eof, format!("unexpected end of file: missing ${} count", section))
            })?;

        let position = if binary {
            Position::Offset(start)
        } else {
            Position::Line(line.number)
        };
        ascii::count(line.text).map_err(|msg| Error::structural(position, format!("{} in ${}", msg, section)))
    }

    /// Read and decode one line-based record.
    fn ascii_record<T>(
        &mut self,
        section: &'static str,
        index: usize,
        expected: usize,
        decode: impl FnOnce(&[u8]) -> RecordResult<T>,
    ) -> Result<(T, Position)> {
        let eof = self.next_line_position();
        let binary = self.is_binary();

        let line = self
            .reader
            .next_content_line()
            .map_err(|e| Error::from_io(eof, e, "inside a section"))?;
        let Some(line) = line else {
            return Err(Error::structural(
                eof,
                format!(
                    "unexpected end of file in ${}: expected {} records, found {}",
                    section,
                    expected,
                    index - 1
                ),
            ));
        };

        let position = if binary {
            Position::Record { section, index }
        } else {
            Position::Line(line.number)
        };
        if let Some(tag) = ascii::section_tag(line.text) {
            return Err(Error::structural(
                position,
                format!(
                    "${} after {} of {} records in ${}",
                    String::from_utf8_lossy(tag),
                    index - 1,
                    expected,
                    section
                ),
            ));
        }

        let value = decode(line.text).map_err(|msg| Error::structural(position, msg))?;
        Ok((value, position))
    }

    /// Read raw bytes of a binary record.
    fn binary_record(&mut self, position: Position, len: usize, context: &str) -> Result<&[u8]> {
        self.reader
            .read_bytes(len)
            .map_err(|e| Error::from_io(position, e, context))
    }

    /// Consume blank lines and the `$End<section>` tag.
    fn expect_closing(&mut self, section: &'static str) -> Result<()> {
        let start = self.reader.offset();
        let eof = self.next_line_position();
        let binary = self.is_binary();

        let line = self
            .reader
            .next_content_line()
            .map_err(|e| Error::from_io(eof, e, "reading a closing tag"))?;
        let Some(line) = line else {
            return Err(Error::structural(
                eof,
                format!("unexpected end of file: missing $End{}", section),
            ));
        };

        let closes = line
            .text
            .strip_prefix(b"$End")
            .is_some_and(|name| name == section.as_bytes());
        if closes {
            return Ok(());
        }

        let position = if binary {
            Position::Offset(start)
        } else {
            Position::Line(line.number)
        };
        Err(Error::structural(
            position,
            format!(
                "expected $End{} after the declared records, found {:?}",
                section,
                String::from_utf8_lossy(line.text)
            ),
        ))
    }

    // Section handlers

    fn read_mesh_format(&mut self, tag_position: Position) -> Result<Flow> {
        if self.outcome.format.is_some() {
            return Err(Error::structural(tag_position, "duplicate $MeshFormat section"));
        }
        if self.encoding.is_some() {
            return Err(Error::structural(tag_position, "$MeshFormat after data sections"));
        }

        let eof = self.next_line_position();
        let line = self
            .reader
            .next_content_line()
            .map_err(|e| Error::from_io(eof, e, "reading the $MeshFormat header"))?;
        let Some(line) = line else {
            return Err(Error::structural(eof, "unexpected end of file in $MeshFormat"));
        };
        let position = Position::Line(line.number);
        let format = ascii::mesh_format(line.text).map_err(|msg| Error::structural(position, msg))?;

        if format.major != 2 {
            return Err(Error::UnsupportedVersion {
                version: format.version,
                position,
            });
        }

        let encoding = match format.file_type {
            FileType::Ascii => Encoding {
                data_size: format.data_size,
                ..Encoding::ascii()
            },
            FileType::Binary => {
                if !matches!(format.data_size, 4 | 8) {
                    return Err(Error::structural(
                        position,
                        format!("unsupported binary data size {}", format.data_size),
                    ));
                }
                let sentinel_position = Position::Offset(self.reader.offset());
                let bytes = self.binary_record(sentinel_position, INT_SIZE, "reading the endianness sentinel")?;
                let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
                let byte_order = ByteOrder::detect(raw).ok_or(Error::EndiannessMismatch { raw })?;
                Encoding::binary(byte_order, format.data_size)
            }
        };

        self.expect_closing("MeshFormat")?;

        tracing::debug!(
            version = %format.version,
            file_type = ?format.file_type,
            byte_order = ?encoding.byte_order,
            data_size = format.data_size,
            "read mesh format"
        );
        self.encoding = Some(encoding);
        self.outcome.format = Some(format);
        Ok(Flow::Continue)
    }

    fn read_physical_names(&mut self) -> Result<Flow> {
        let count = self.read_count("PhysicalNames")?;
        tracing::debug!(count, "reading $PhysicalNames");

        for index in 1..=count {
            let (name, _) = self.ascii_record("PhysicalNames", index, count, ascii::physical_name)?;
            self.outcome.physical_names += 1;
            if !self.visitor.on_physical_name(&name) {
                return Ok(Flow::Stop);
            }
        }

        self.expect_closing("PhysicalNames")?;
        Ok(Flow::Continue)
    }

    fn read_nodes(&mut self) -> Result<Flow> {
        let count = self.read_count("Nodes")?;
        let encoding = self.encoding();
        tracing::debug!(count, binary = encoding.is_binary(), "reading $Nodes");

        if encoding.is_binary() {
            let size = binary::node_record_size(&encoding);
            for index in 1..=count {
                let position = Position::Record {
                    section: "Nodes",
                    index,
                };
                let bytes = self.binary_record(position, size, "inside $Nodes")?;
                let node = binary::node(&encoding, bytes).map_err(|msg| Error::structural(position, msg))?;
                if !self.dispatch_node(&node) {
                    return Ok(Flow::Stop);
                }
            }
        } else {
            for index in 1..=count {
                let (node, _) = self.ascii_record("Nodes", index, count, ascii::node)?;
                if !self.dispatch_node(&node) {
                    return Ok(Flow::Stop);
                }
            }
        }

        self.expect_closing("Nodes")?;
        Ok(Flow::Continue)
    }

    fn read_elements(&mut self) -> Result<Flow> {
        let count = self.read_count("Elements")?;
        let encoding = self.encoding();
        tracing::debug!(count, binary = encoding.is_binary(), "reading $Elements");

        let flow = if encoding.is_binary() {
            self.read_binary_elements(&encoding, count)?
        } else {
            self.read_ascii_elements(count)?
        };
        if flow == Flow::Stop {
            return Ok(Flow::Stop);
        }

        self.expect_closing("Elements")?;
        Ok(Flow::Continue)
    }

    fn read_ascii_elements(&mut self, count: usize) -> Result<Flow> {
        for index in 1..=count {
            let (element, position) = self.ascii_record("Elements", index, count, ascii::element)?;
            self.check_element_type(&element, position)?;
            if !self.dispatch_element(&element) {
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }

    /// Elements arrive in blocks: `type count ntags` then `count` fixed-size records.
    fn read_binary_elements(&mut self, encoding: &Encoding, count: usize) -> Result<Flow> {
        let mut index = 0;

        while index < count {
            let header_position = Position::Record {
                section: "Elements",
                index: index + 1,
            };
            let bytes = self.binary_record(
                header_position,
                binary::BLOCK_HEADER_SIZE,
                "reading an element block header",
            )?;
            let header =
                binary::block_header(encoding, bytes).map_err(|msg| Error::structural(header_position, msg))?;

            if header.count > count - index {
                return Err(Error::structural(
                    header_position,
                    format!(
                        "element block of {} records overruns the declared count ({} remaining)",
                        header.count,
                        count - index
                    ),
                ));
            }
            let num_nodes = element_node_count(header.type_code).ok_or(Error::UnknownElementType {
                type_code: header.type_code,
                position: header_position,
            })?;
            let size = binary::element_record_size(header.num_tags, num_nodes).ok_or_else(|| {
                Error::structural(header_position, "element record size overflows")
            })?;
            tracing::trace!(
                type_code = header.type_code,
                count = header.count,
                num_tags = header.num_tags,
                "element block"
            );

            for _ in 0..header.count {
                index += 1;
                let position = Position::Record {
                    section: "Elements",
                    index,
                };
                let bytes = self.binary_record(position, size, "inside $Elements")?;
                let element = binary::element(encoding, &header, num_nodes, bytes)
                    .map_err(|msg| Error::structural(position, msg))?;
                if !self.dispatch_element(&element) {
                    return Ok(Flow::Stop);
                }
            }
        }

        Ok(Flow::Continue)
    }

    /// Unknown types pass through; known types are size-checked in strict mode.
    fn check_element_type(&mut self, element: &Element, position: Position) -> Result<()> {
        match element_node_count(element.type_code) {
            Some(expected) => {
                if self.config.strict_node_counts && element.node_ids.len() != expected {
                    return Err(Error::structural(
                        position,
                        format!(
                            "element {} ({}) has {} nodes, expected {}",
                            element.id,
                            element_name(element.type_code),
                            element.node_ids.len(),
                            expected
                        ),
                    ));
                }
            }
            None => {
                self.outcome.unknown_element_types += 1;
                if self.warned_types.insert(element.type_code) {
                    tracing::warn!(
                        type_code = element.type_code,
                        element_id = element.id,
                        %position,
                        "unknown element type, dispatching without validation"
                    );
                }
            }
        }
        Ok(())
    }

    fn skip_section(&mut self, name: &str, tag_position: Position) -> Result<Flow> {
        if !self.config.skip_unknown_sections {
            return Err(Error::structural(tag_position, format!("unknown section ${}", name)));
        }

        let closing = format!("$End{}", name);
        loop {
            let eof = self.next_line_position();
            let line = self
                .reader
                .next_line()
                .map_err(|e| Error::from_io(eof, e, "while skipping a section"))?;
            match line {
                None => {
                    return Err(Error::structural(
                        tag_position,
                        format!("section ${} is never closed by {}", name, closing),
                    ))
                }
                Some(line) if line.text == closing.as_bytes() => break,
                Some(_) => {}
            }
        }

        tracing::trace!(section = %name, "skipped section");
        self.outcome.skipped_sections.push(name.to_string());
        Ok(Flow::Continue)
    }

    // Dispatch

    #[inline]
    fn dispatch_node(&mut self, node: &Node) -> bool {
        self.outcome.nodes += 1;
        self.visitor.on_node(node)
    }

    #[inline]
    fn dispatch_element(&mut self, element: &Element) -> bool {
        self.outcome.elements += 1;
        self.visitor.on_element(element)
    }
}
