// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element Type Tables
//!
//! Static metadata for GMSH element type codes and VTK cell type codes:
//! node count, topological dimension, display name and the equivalence
//! between the two numbering schemes.
//!
//! Every lookup is total. Unknown codes yield `None` (or
//! [`UNKNOWN_ELEMENT_NAME`] for names) so callers can tell "unknown type"
//! apart from "has N nodes".

/// Name returned for type codes missing from the tables.
pub const UNKNOWN_ELEMENT_NAME: &str = "Unknown element type";

/// Number of nodes an element of a given type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NodeCount {
    Fixed(usize),
    /// Node count is stored per cell in the file (VTK poly types).
    Variable,
}

impl NodeCount {
    /// Fixed count, or `None` for variable-count types
    #[inline]
    pub fn fixed(self) -> Option<usize> {
        match self {
            NodeCount::Fixed(n) => Some(n),
            NodeCount::Variable => None,
        }
    }

    #[inline]
    pub fn is_variable(self) -> bool {
        matches!(self, NodeCount::Variable)
    }
}

/// Metadata for one element or cell type code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ElementTypeInfo {
    pub type_code: i32,
    pub node_count: NodeCount,
    /// Topological dimension, 0 to 3.
    pub dimension: u8,
    pub display_name: &'static str,
    /// Code of the equivalent type in the other numbering, if any.
    pub vtk_equivalent: Option<i32>,
}

const fn gmsh(
    type_code: i32,
    nodes: usize,
    dimension: u8,
    display_name: &'static str,
    vtk: Option<i32>,
) -> ElementTypeInfo {
    ElementTypeInfo {
        type_code,
        node_count: NodeCount::Fixed(nodes),
        dimension,
        display_name,
        vtk_equivalent: vtk,
    }
}

const fn vtk(
    type_code: i32,
    node_count: NodeCount,
    dimension: u8,
    display_name: &'static str,
    gmsh: Option<i32>,
) -> ElementTypeInfo {
    ElementTypeInfo {
        type_code,
        node_count,
        dimension,
        display_name,
        vtk_equivalent: gmsh,
    }
}

/// GMSH 2.2 element types, sorted by code.
///
/// `vtk_equivalent` here is the VTK cell code with the same topology and node count.
static GMSH_ELEMENT_TYPES: &[ElementTypeInfo] = &[
    gmsh(1, 2, 1, "2-node line", Some(3)),
    gmsh(2, 3, 2, "3-node triangle", Some(5)),
    gmsh(3, 4, 2, "4-node quadrangle", Some(9)),
    gmsh(4, 4, 3, "4-node tetrahedron", Some(10)),
    gmsh(5, 8, 3, "8-node hexahedron", Some(12)),
    gmsh(6, 6, 3, "6-node prism", Some(13)),
    gmsh(7, 5, 3, "5-node pyramid", Some(14)),
    gmsh(8, 3, 1, "3-node second order line", Some(21)),
    gmsh(9, 6, 2, "6-node second order triangle", Some(22)),
    gmsh(10, 9, 2, "9-node second order quadrangle", Some(28)),
    gmsh(11, 10, 3, "10-node second order tetrahedron", Some(24)),
    gmsh(12, 27, 3, "27-node second order hexahedron", Some(29)),
    gmsh(13, 18, 3, "18-node second order prism", Some(32)),
    gmsh(14, 14, 3, "14-node second order pyramid", None),
    gmsh(15, 1, 0, "1-node point", Some(1)),
    gmsh(16, 8, 2, "8-node second order quadrangle", Some(23)),
    gmsh(17, 20, 3, "20-node second order hexahedron", Some(25)),
    gmsh(18, 15, 3, "15-node second order prism", Some(26)),
    gmsh(19, 13, 3, "13-node second order pyramid", Some(27)),
    gmsh(20, 9, 2, "9-node third order incomplete triangle", None),
    gmsh(21, 10, 2, "10-node third order triangle", None),
    gmsh(22, 12, 2, "12-node fourth order incomplete triangle", None),
    gmsh(23, 15, 2, "15-node fourth order triangle", None),
    gmsh(24, 15, 2, "15-node fifth order incomplete triangle", None),
    gmsh(25, 21, 2, "21-node fifth order triangle", None),
    gmsh(26, 4, 1, "4-node third order edge", Some(35)),
    gmsh(27, 5, 1, "5-node fourth order edge", None),
    gmsh(28, 6, 1, "6-node fifth order edge", None),
    gmsh(29, 20, 3, "20-node third order tetrahedron", None),
    gmsh(30, 35, 3, "35-node fourth order tetrahedron", None),
    gmsh(31, 56, 3, "56-node fifth order tetrahedron", None),
    gmsh(92, 64, 3, "64-node third order hexahedron", None),
    gmsh(93, 125, 3, "125-node fourth order hexahedron", None),
];

/// VTK cell types, sorted by code.
///
/// `vtk_equivalent` holds the GMSH code for this table.
static VTK_CELL_TYPES: &[ElementTypeInfo] = &[
    vtk(1, NodeCount::Fixed(1), 0, "Vertex", Some(15)),
    vtk(2, NodeCount::Variable, 0, "PolyVertex", None),
    vtk(3, NodeCount::Fixed(2), 1, "Line", Some(1)),
    vtk(4, NodeCount::Variable, 1, "PolyLine", None),
    vtk(5, NodeCount::Fixed(3), 2, "Triangle", Some(2)),
    vtk(6, NodeCount::Variable, 2, "TriangleStrip", None),
    vtk(7, NodeCount::Variable, 2, "Polygon", None),
    // Pixel and voxel use lexicographic node order, so GMSH quads/hexes are not equivalent
    vtk(8, NodeCount::Fixed(4), 2, "Pixel", None),
    vtk(9, NodeCount::Fixed(4), 2, "Quad", Some(3)),
    vtk(10, NodeCount::Fixed(4), 3, "Tetra", Some(4)),
    vtk(11, NodeCount::Fixed(8), 3, "Voxel", None),
    vtk(12, NodeCount::Fixed(8), 3, "Hexahedron", Some(5)),
    vtk(13, NodeCount::Fixed(6), 3, "Wedge", Some(6)),
    vtk(14, NodeCount::Fixed(5), 3, "Pyramid", Some(7)),
    vtk(21, NodeCount::Fixed(3), 1, "QuadraticEdge", Some(8)),
    vtk(22, NodeCount::Fixed(6), 2, "QuadraticTriangle", Some(9)),
    vtk(23, NodeCount::Fixed(8), 2, "QuadraticQuad", Some(16)),
    vtk(24, NodeCount::Fixed(10), 3, "QuadraticTetra", Some(11)),
    vtk(25, NodeCount::Fixed(20), 3, "QuadraticHexahedron", Some(17)),
    vtk(26, NodeCount::Fixed(15), 3, "QuadraticWedge", Some(18)),
    vtk(27, NodeCount::Fixed(13), 3, "QuadraticPyramid", Some(19)),
    vtk(28, NodeCount::Fixed(9), 2, "BiQuadraticQuad", Some(10)),
    vtk(29, NodeCount::Fixed(27), 3, "TriQuadraticHexahedron", Some(12)),
    vtk(30, NodeCount::Fixed(6), 2, "QuadraticLinearQuad", None),
    vtk(31, NodeCount::Fixed(12), 3, "QuadraticLinearWedge", None),
    vtk(32, NodeCount::Fixed(18), 3, "BiQuadraticQuadraticWedge", Some(13)),
    vtk(33, NodeCount::Fixed(24), 3, "BiQuadraticQuadraticHexahedron", None),
    vtk(34, NodeCount::Fixed(7), 2, "BiQuadraticTriangle", None),
    vtk(35, NodeCount::Fixed(4), 1, "CubicLine", Some(26)),
];

#[inline]
fn lookup(table: &'static [ElementTypeInfo], type_code: i32) -> Option<&'static ElementTypeInfo> {
    table
        .binary_search_by_key(&type_code, |info| info.type_code)
        .ok()
        .map(|i| &table[i])
}

// GMSH side

/// Metadata for a GMSH element type code.
#[inline]
pub fn element_info(type_code: i32) -> Option<&'static ElementTypeInfo> {
    lookup(GMSH_ELEMENT_TYPES, type_code)
}

#[inline]
pub fn is_known_element_type(type_code: i32) -> bool {
    element_info(type_code).is_some()
}

/// Display name of a GMSH element type, or [`UNKNOWN_ELEMENT_NAME`].
pub fn element_name(type_code: i32) -> &'static str {
    element_info(type_code)
        .map(|info| info.display_name)
        .unwrap_or(UNKNOWN_ELEMENT_NAME)
}

/// Node count of a GMSH element type. Every GMSH 2.2 type has a fixed count.
#[inline]
pub fn element_node_count(type_code: i32) -> Option<usize> {
    element_info(type_code).and_then(|info| info.node_count.fixed())
}

#[inline]
pub fn element_dimension(type_code: i32) -> Option<u8> {
    element_info(type_code).map(|info| info.dimension)
}

/// VTK cell code equivalent to a GMSH element type.
#[inline]
pub fn to_vtk_type(gmsh_type_code: i32) -> Option<i32> {
    element_info(gmsh_type_code).and_then(|info| info.vtk_equivalent)
}

/// Every known GMSH element type, sorted by code.
pub fn element_types() -> &'static [ElementTypeInfo] {
    GMSH_ELEMENT_TYPES
}

// VTK side

#[inline]
pub fn vtk_cell_info(vtk_type_code: i32) -> Option<&'static ElementTypeInfo> {
    lookup(VTK_CELL_TYPES, vtk_type_code)
}

pub fn vtk_cell_name(vtk_type_code: i32) -> &'static str {
    vtk_cell_info(vtk_type_code)
        .map(|info| info.display_name)
        .unwrap_or(UNKNOWN_ELEMENT_NAME)
}

/// Node count of a VTK cell type; poly types report [`NodeCount::Variable`].
#[inline]
pub fn vtk_node_count(vtk_type_code: i32) -> Option<NodeCount> {
    vtk_cell_info(vtk_type_code).map(|info| info.node_count)
}

#[inline]
pub fn vtk_dimension(vtk_type_code: i32) -> Option<u8> {
    vtk_cell_info(vtk_type_code).map(|info| info.dimension)
}

/// GMSH element code equivalent to a VTK cell type.
#[inline]
pub fn to_gmsh_type(vtk_type_code: i32) -> Option<i32> {
    vtk_cell_info(vtk_type_code).and_then(|info| info.vtk_equivalent)
}

pub fn vtk_cell_types() -> &'static [ElementTypeInfo] {
    VTK_CELL_TYPES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_sorted() {
        assert!(GMSH_ELEMENT_TYPES
            .windows(2)
            .all(|w| w[0].type_code < w[1].type_code));
        assert!(VTK_CELL_TYPES
            .windows(2)
            .all(|w| w[0].type_code < w[1].type_code));
    }

    #[test]
    fn test_quadrangle() {
        assert_eq!(element_name(3), "4-node quadrangle");
        assert_eq!(element_node_count(3), Some(4));
        assert_eq!(element_dimension(3), Some(2));
    }

    #[test]
    fn test_unknown_gmsh_type() {
        assert_eq!(element_name(999), UNKNOWN_ELEMENT_NAME);
        assert_eq!(element_node_count(999), None);
        assert_eq!(element_dimension(999), None);
        assert!(!is_known_element_type(0));
        assert!(!is_known_element_type(-1));
        assert_eq!(to_vtk_type(999), None);
    }

    #[test]
    fn test_point_and_high_order() {
        assert_eq!(element_node_count(15), Some(1));
        assert_eq!(element_dimension(15), Some(0));
        assert_eq!(element_node_count(93), Some(125));
        assert_eq!(element_name(93), "125-node fourth order hexahedron");
        assert_eq!(element_node_count(92), Some(64));
    }

    #[test]
    fn test_vtk_variable_types() {
        for code in [2, 4, 6, 7] {
            assert_eq!(vtk_node_count(code), Some(NodeCount::Variable), "code {}", code);
            assert_eq!(to_gmsh_type(code), None);
        }
        assert_eq!(vtk_node_count(12), Some(NodeCount::Fixed(8)));
        assert_eq!(vtk_node_count(99), None);
        assert_eq!(vtk_cell_name(99), UNKNOWN_ELEMENT_NAME);
    }

    #[test]
    fn test_voxel_has_no_equivalent() {
        assert_eq!(vtk_cell_name(11), "Voxel");
        assert_eq!(to_gmsh_type(11), None);
        assert_eq!(to_gmsh_type(12), Some(5));
    }

    #[test]
    fn test_equivalence_is_symmetric() {
        for info in element_types() {
            if let Some(vtk_code) = info.vtk_equivalent {
                assert_eq!(to_gmsh_type(vtk_code), Some(info.type_code));
                let vtk_info = vtk_cell_info(vtk_code).unwrap();
                assert_eq!(vtk_info.node_count, info.node_count);
                assert_eq!(vtk_info.dimension, info.dimension);
            }
        }
        for info in vtk_cell_types() {
            if let Some(gmsh_code) = info.vtk_equivalent {
                assert_eq!(to_vtk_type(gmsh_code), Some(info.type_code));
            }
        }
    }
}
