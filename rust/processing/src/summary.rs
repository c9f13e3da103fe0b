// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh statistics for reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mesh::UnstructuredMesh;

/// GMSH type code of the 2-node line.
const LINE_TYPE: i32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshSummary {
    pub node_count: usize,
    pub element_count: usize,
    /// Elements of type 1 (2-node line).
    pub edge_element_count: usize,
    /// Element count per GMSH type code.
    pub elements_by_type: BTreeMap<i32, usize>,
    /// Physical group id to name. A later declaration of the same id wins.
    pub phys_names: BTreeMap<i32, String>,
    /// Physical group id to the ids of its elements.
    pub phys_grps: BTreeMap<i32, Vec<usize>>,
}

impl MeshSummary {
    pub fn from_mesh(mesh: &UnstructuredMesh) -> Self {
        let mut elements_by_type: BTreeMap<i32, usize> = BTreeMap::new();
        for element in &mesh.elements {
            *elements_by_type.entry(element.type_code).or_default() += 1;
        }

        let phys_names = mesh
            .physical_names
            .iter()
            .map(|p| (p.id, p.name.clone()))
            .collect();

        let phys_grps = mesh
            .physical_groups()
            .into_iter()
            .map(|(group, indices)| (group, indices.into_iter().map(|i| mesh.elements[i].id).collect()))
            .collect();

        Self {
            node_count: mesh.node_count(),
            element_count: mesh.element_count(),
            edge_element_count: elements_by_type.get(&LINE_TYPE).copied().unwrap_or(0),
            elements_by_type,
            phys_names,
            phys_grps,
        }
    }

    /// Number of elements in physical group `id`.
    pub fn group_size(&self, id: i32) -> usize {
        self.phys_grps.get(&id).map_or(0, Vec::len)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
