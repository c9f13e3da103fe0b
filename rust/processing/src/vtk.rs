// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! VTK unstructured-grid cell arrays.
//!
//! Cell types come from the GMSH/VTK equivalence table. Node ordering is
//! taken as written; the two conventions differ for some higher-order
//! cells and no permutation is applied.

use msh_lite_core::{to_vtk_type, Element};
use rayon::prelude::*;
use serde::Serialize;

use crate::mesh::UnstructuredMesh;

/// Flattened cells in the layout of a `.vtu` `<Cells>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VtkCells {
    /// Point indices into [`UnstructuredMesh::points`].
    pub connectivity: Vec<usize>,
    /// End offset of each cell in `connectivity`.
    pub offsets: Vec<usize>,
    pub cell_types: Vec<i32>,
    /// Elements with no VTK equivalent or with undeclared nodes.
    pub skipped: usize,
}

impl VtkCells {
    pub fn from_mesh(mesh: &UnstructuredMesh) -> Self {
        let translated: Vec<Option<(i32, Vec<usize>)>> = mesh
            .elements
            .par_iter()
            .map(|element| translate(mesh, element))
            .collect();

        let total: usize = translated.iter().flatten().map(|(_, points)| points.len()).sum();
        let mut cells = VtkCells {
            connectivity: Vec::with_capacity(total),
            offsets: Vec::with_capacity(translated.len()),
            cell_types: Vec::with_capacity(translated.len()),
            skipped: 0,
        };

        for cell in translated {
            match cell {
                Some((cell_type, points)) => {
                    cells.connectivity.extend(points);
                    cells.offsets.push(cells.connectivity.len());
                    cells.cell_types.push(cell_type);
                }
                None => cells.skipped += 1,
            }
        }

        if cells.skipped > 0 {
            tracing::debug!(skipped = cells.skipped, "Elements without a VTK cell");
        }
        cells
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cell_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_types.is_empty()
    }

    /// Point indices of cell `i`.
    pub fn cell(&self, i: usize) -> Option<&[usize]> {
        let end = *self.offsets.get(i)?;
        let start = if i == 0 { 0 } else { self.offsets[i - 1] };
        Some(&self.connectivity[start..end])
    }
}

fn translate(mesh: &UnstructuredMesh, element: &Element) -> Option<(i32, Vec<usize>)> {
    let cell_type = to_vtk_type(element.type_code)?;
    let points = element
        .node_ids
        .iter()
        .map(|&id| mesh.index_of(id))
        .collect::<Option<Vec<usize>>>()?;
    Some((cell_type, points))
}
