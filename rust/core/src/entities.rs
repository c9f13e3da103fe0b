// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded mesh entities handed to observers.

use smallvec::SmallVec;

use crate::element_types::{element_info, ElementTypeInfo};

/// Tag list storage; GMSH 2.2 files usually carry two or three tags.
pub type Tags = SmallVec<[i32; 4]>;

/// Node list storage; inline up to a linear hexahedron.
pub type NodeIds = SmallVec<[usize; 8]>;

/// A mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Node {
    pub fn new(id: usize, x: f64, y: f64, z: f64) -> Self {
        Self { id, x, y, z }
    }

    #[inline]
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// A mesh element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    pub id: usize,
    /// GMSH element type code.
    pub type_code: i32,
    /// Physical groups the element belongs to (first tag of the record).
    pub physical_group_ids: Tags,
    /// Node ids in the connectivity order of the element type.
    pub node_ids: NodeIds,
    /// Full tag list as stored in the file: physical group, elementary
    /// entity, then partition data if present.
    pub tags: Tags,
}

impl Element {
    /// Build an element from its raw tag list.
    pub fn new(id: usize, type_code: i32, tags: Tags, node_ids: NodeIds) -> Self {
        let physical_group_ids = tags.iter().take(1).copied().collect();
        Self {
            id,
            type_code,
            physical_group_ids,
            node_ids,
            tags,
        }
    }

    /// Physical group id, if the record carried any tag.
    #[inline]
    pub fn physical_group(&self) -> Option<i32> {
        self.physical_group_ids.first().copied()
    }

    /// Elementary (geometric) entity tag.
    #[inline]
    pub fn elementary_tag(&self) -> Option<i32> {
        self.tags.get(1).copied()
    }

    /// Metadata for this element's type, `None` when the code is unknown.
    #[inline]
    pub fn type_info(&self) -> Option<&'static ElementTypeInfo> {
        element_info(self.type_code)
    }
}

/// A named physical group declared in `$PhysicalNames`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalName {
    pub id: i32,
    /// Dimension of the group's elements, 0 to 3.
    pub dimension: u8,
    pub name: String,
}
