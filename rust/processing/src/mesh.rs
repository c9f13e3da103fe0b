// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory mesh assembled from parser callbacks.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use msh_lite_core::{
    element_dimension, parse_file_with, Element, FileType, MeshVisitor, MshWriter, Node,
    ParseOutcome, ParserConfig, PhysicalName, TopologyValidator, ValidationReport,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::summary::MeshSummary;
use crate::vtk::VtkCells;

/// Nodes, elements and physical names of one mesh file.
///
/// Points are stored densely in declaration order; `node_ids[i]` is the
/// GMSH id of `points[i]`.
#[derive(Debug, Clone, Default)]
pub struct UnstructuredMesh {
    pub points: Vec<[f64; 3]>,
    pub node_ids: Vec<usize>,
    pub elements: Vec<Element>,
    pub physical_names: Vec<PhysicalName>,
    node_index: FxHashMap<usize, usize>,
}

impl UnstructuredMesh {
    pub fn node_count(&self) -> usize {
        self.points.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.elements.is_empty()
    }

    /// Dense point index of a GMSH node id.
    #[inline]
    pub fn index_of(&self, node_id: usize) -> Option<usize> {
        self.node_index.get(&node_id).copied()
    }

    pub fn point(&self, node_id: usize) -> Option<[f64; 3]> {
        self.index_of(node_id).map(|i| self.points[i])
    }

    /// Declared node ids.
    pub fn node_id_set(&self) -> FxHashSet<usize> {
        self.node_ids.iter().copied().collect()
    }

    /// Name of physical group `id`, if one was declared.
    pub fn physical_name(&self, id: i32) -> Option<&str> {
        self.physical_names
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    /// Element indices per physical group (first element tag).
    /// Elements without tags belong to no group.
    pub fn physical_groups(&self) -> BTreeMap<i32, Vec<usize>> {
        let mut groups: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (i, element) in self.elements.iter().enumerate() {
            if let Some(group) = element.physical_group() {
                groups.entry(group).or_default().push(i);
            }
        }
        groups
    }

    /// Elements of a known type with the given spatial dimension.
    pub fn elements_of_dimension(&self, dimension: u8) -> impl Iterator<Item = &Element> + '_ {
        self.elements
            .iter()
            .filter(move |e| element_dimension(e.type_code) == Some(dimension))
    }

    pub fn summary(&self) -> MeshSummary {
        MeshSummary::from_mesh(self)
    }

    /// Check node counts and node references against the declared nodes.
    pub fn validate(&self) -> ValidationReport {
        TopologyValidator::new(&self.elements).validate(&self.node_id_set())
    }

    pub fn to_vtk_cells(&self) -> VtkCells {
        VtkCells::from_mesh(self)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.node_ids
            .iter()
            .zip(&self.points)
            .map(|(&id, &[x, y, z])| Node::new(id, x, y, z))
    }

    /// Write the mesh as GMSH 2.2.
    pub fn save<P: AsRef<Path>>(&self, path: P, file_type: FileType) -> Result<()> {
        let nodes: Vec<Node> = self.nodes().collect();
        MshWriter::new(file_type).write(path, &nodes, &self.elements, &self.physical_names)?;
        Ok(())
    }
}

/// Assembles an [`UnstructuredMesh`] from parser callbacks.
///
/// A node id declared twice keeps its first slot and takes the later
/// coordinates.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: UnstructuredMesh,
    duplicate_nodes: usize,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duplicate_nodes(&self) -> usize {
        self.duplicate_nodes
    }

    pub fn finish(self) -> UnstructuredMesh {
        if self.duplicate_nodes > 0 {
            tracing::warn!(duplicates = self.duplicate_nodes, "Duplicate node ids in mesh");
        }
        self.mesh
    }
}

impl MeshVisitor for MeshBuilder {
    fn on_node(&mut self, node: &Node) -> bool {
        let mesh = &mut self.mesh;
        match mesh.node_index.get(&node.id) {
            Some(&i) => {
                mesh.points[i] = node.coords();
                self.duplicate_nodes += 1;
            }
            None => {
                mesh.node_index.insert(node.id, mesh.points.len());
                mesh.points.push(node.coords());
                mesh.node_ids.push(node.id);
            }
        }
        true
    }

    fn on_element(&mut self, element: &Element) -> bool {
        self.mesh.elements.push(element.clone());
        true
    }

    fn on_physical_name(&mut self, name: &PhysicalName) -> bool {
        self.mesh.physical_names.push(name.clone());
        true
    }
}

/// Load a mesh file with the default parser settings.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<(UnstructuredMesh, ParseOutcome)> {
    load_mesh_with(path, ParserConfig::default())
}

pub fn load_mesh_with<P: AsRef<Path>>(
    path: P,
    config: ParserConfig,
) -> Result<(UnstructuredMesh, ParseOutcome)> {
    let start = Instant::now();
    let path = path.as_ref();

    let mut builder = MeshBuilder::new();
    let outcome = parse_file_with(path, config, &mut builder)?;
    let mesh = builder.finish();

    tracing::info!(
        path = %path.display(),
        nodes = mesh.node_count(),
        elements = mesh.element_count(),
        physical_names = mesh.physical_names.len(),
        status = ?outcome.status,
        load_time_ms = start.elapsed().as_millis(),
        "Mesh loaded"
    );
    Ok((mesh, outcome))
}
