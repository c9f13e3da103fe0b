// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh processing on top of `msh-lite-core`.
//!
//! The core parser only streams entities. This crate collects them into an
//! [`UnstructuredMesh`] through a [`MeshBuilder`] observer and derives
//! summaries, topology reports and VTK cell arrays from it.
//!
//! ```rust,ignore
//! use msh_lite_processing::load_mesh;
//!
//! let (mesh, _outcome) = load_mesh("bracket.msh")?;
//! let summary = mesh.summary();
//! println!("{}", summary.to_json_pretty()?);
//! ```

pub mod error;
pub mod mesh;
pub mod summary;
pub mod vtk;

pub use error::{ProcessingError, Result};
pub use mesh::{load_mesh, load_mesh_with, MeshBuilder, UnstructuredMesh};
pub use summary::MeshSummary;
pub use vtk::VtkCells;
