// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # MSH-Lite Core Parser
//!
//! Streaming parser for GMSH 2.2 mesh files, ASCII and binary, built with
//! [nom](https://docs.rs/nom) for header records and
//! [memchr](https://docs.rs/memchr) for line scanning.
//!
//! ## Overview
//!
//! - **Parser**: walks `$MeshFormat`, `$PhysicalNames`, `$Nodes` and
//!   `$Elements`, skipping any other section
//! - **Observers**: every decoded entity is pushed to caller callbacks,
//!   which can stop the parse early
//! - **Element tables**: node count, dimension, name and VTK equivalence for
//!   every GMSH element type
//! - **Validator**: node-count and node-reference checks over decoded elements
//! - **Writer**: GMSH 2.2 output in either encoding
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use msh_lite_core::{MeshParser, ParseStatus};
//!
//! let mut nodes = Vec::new();
//! let mut triangles = 0;
//!
//! let mut parser = MeshParser::new();
//! parser
//!     .add_node_observer(|node| {
//!         nodes.push(node.coords());
//!         true
//!     })
//!     .add_element_observer(|element| {
//!         if element.type_code == 2 {
//!             triangles += 1;
//!         }
//!         true
//!     });
//!
//! let outcome = parser.parse("bracket.msh")?;
//! assert_eq!(outcome.status, ParseStatus::Completed);
//! ```
//!
//! ## Visitors
//!
//! Callers holding their own state can implement [`MeshVisitor`] instead of
//! registering closures:
//!
//! ```rust,ignore
//! use msh_lite_core::{parse_file_with, ParserConfig, StreamingValidator};
//!
//! let mut validator = StreamingValidator::new();
//! parse_file_with("bracket.msh", ParserConfig::default(), &mut validator)?;
//! assert!(validator.report().is_valid());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for entities and configuration

mod ascii;
mod binary;
mod reader;

pub mod config;
pub mod element_types;
pub mod encoding;
pub mod entities;
pub mod error;
pub mod observer;
pub mod parser;
pub mod validator;
pub mod writer;

pub use config::ParserConfig;
pub use element_types::{
    element_dimension, element_info, element_name, element_node_count, element_types,
    is_known_element_type, to_gmsh_type, to_vtk_type, vtk_cell_info, vtk_cell_name,
    vtk_cell_types, vtk_dimension, vtk_node_count, ElementTypeInfo, NodeCount,
    UNKNOWN_ELEMENT_NAME,
};
pub use encoding::{ByteOrder, Encoding, FileType, MeshFormat};
pub use entities::{Element, Node, NodeIds, PhysicalName, Tags};
pub use error::{Error, Position, Result};
pub use observer::{ElementObserver, MeshVisitor, NodeObserver, Observers, PhysicalNameObserver};
pub use parser::{parse_file_with, parse_reader_with, MeshParser, ParseOutcome, ParseStatus};
pub use validator::{StreamingValidator, TopologyValidator, ValidationReport};
pub use writer::{MshWriter, WriteError, WriteResult};
