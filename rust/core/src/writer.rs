// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GMSH 2.2 writer
//!
//! Produces files the parser reads back unchanged. Binary output is
//! little-endian with 8-byte floats; consecutive elements sharing type and
//! tag count form one block.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::element_types::element_node_count;
use crate::encoding::{FileType, MeshFormat};
use crate::entities::{Element, Node, PhysicalName};

pub type WriteResult<T> = std::result::Result<T, WriteError>;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary records are sized from the element table.
    #[error("element {id} of type {type_code} with {nodes} nodes cannot be written as binary")]
    UnsizedElement { id: usize, type_code: i32, nodes: usize },

    /// Binary ints are 32-bit.
    #[error("{what} {value} does not fit a 32-bit binary field")]
    OutOfRange { what: &'static str, value: usize },

    #[error("physical name {name:?} contains a quote or line break")]
    InvalidPhysicalName { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MshWriter {
    file_type: FileType,
}

impl MshWriter {
    pub fn new(file_type: FileType) -> Self {
        Self { file_type }
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Write a mesh file at `path`, replacing any existing file.
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        nodes: &[Node],
        elements: &[Element],
        physical_names: &[PhysicalName],
    ) -> WriteResult<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, nodes, elements, physical_names)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(
        &self,
        mut w: W,
        nodes: &[Node],
        elements: &[Element],
        physical_names: &[PhysicalName],
    ) -> WriteResult<()> {
        let binary = self.file_type == FileType::Binary;
        let format = MeshFormat {
            file_type: self.file_type,
            ..MeshFormat::ascii_v22()
        };

        writeln!(w, "$MeshFormat")?;
        writeln!(w, "{}", format)?;
        if binary {
            w.write_all(&1i32.to_le_bytes())?;
            writeln!(w)?;
        }
        writeln!(w, "$EndMeshFormat")?;

        // Always ASCII, even in binary files
        if !physical_names.is_empty() {
            writeln!(w, "$PhysicalNames")?;
            writeln!(w, "{}", physical_names.len())?;
            for name in physical_names {
                if name.name.contains(['"', '\n', '\r']) {
                    return Err(WriteError::InvalidPhysicalName {
                        name: name.name.clone(),
                    });
                }
                writeln!(w, "{} {} \"{}\"", name.dimension, name.id, name.name)?;
            }
            writeln!(w, "$EndPhysicalNames")?;
        }

        writeln!(w, "$Nodes")?;
        writeln!(w, "{}", nodes.len())?;
        if binary {
            for node in nodes {
                w.write_all(&int32("node id", node.id)?.to_le_bytes())?;
                for c in node.coords() {
                    w.write_all(&c.to_le_bytes())?;
                }
            }
            writeln!(w)?;
        } else {
            for node in nodes {
                writeln!(w, "{} {} {} {}", node.id, node.x, node.y, node.z)?;
            }
        }
        writeln!(w, "$EndNodes")?;

        writeln!(w, "$Elements")?;
        writeln!(w, "{}", elements.len())?;
        if binary {
            write_element_blocks(&mut w, elements)?;
            writeln!(w)?;
        } else {
            for e in elements {
                write!(w, "{} {} {}", e.id, e.type_code, e.tags.len())?;
                for tag in &e.tags {
                    write!(w, " {}", tag)?;
                }
                for id in &e.node_ids {
                    write!(w, " {}", id)?;
                }
                writeln!(w)?;
            }
        }
        writeln!(w, "$EndElements")?;

        tracing::debug!(
            file_type = ?self.file_type,
            nodes = nodes.len(),
            elements = elements.len(),
            physical_names = physical_names.len(),
            "wrote mesh"
        );
        Ok(())
    }
}

fn int32(what: &'static str, value: usize) -> WriteResult<i32> {
    i32::try_from(value).map_err(|_| WriteError::OutOfRange { what, value })
}

fn write_element_blocks<W: Write>(w: &mut W, elements: &[Element]) -> WriteResult<()> {
    for block in elements.chunk_by(|a, b| a.type_code == b.type_code && a.tags.len() == b.tags.len()) {
        let first = &block[0];
        let num_tags = first.tags.len();

        w.write_all(&first.type_code.to_le_bytes())?;
        w.write_all(&int32("block element count", block.len())?.to_le_bytes())?;
        w.write_all(&int32("block tag count", num_tags)?.to_le_bytes())?;

        for e in block {
            if element_node_count(e.type_code) != Some(e.node_ids.len()) {
                return Err(WriteError::UnsizedElement {
                    id: e.id,
                    type_code: e.type_code,
                    nodes: e.node_ids.len(),
                });
            }
            w.write_all(&int32("element id", e.id)?.to_le_bytes())?;
            for tag in &e.tags {
                w.write_all(&tag.to_le_bytes())?;
            }
            for &id in &e.node_ids {
                w.write_all(&int32("node id", id)?.to_le_bytes())?;
            }
        }
    }
    Ok(())
}
