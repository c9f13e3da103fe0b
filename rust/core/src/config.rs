// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser configuration.

/// Options controlling how strictly a mesh file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserConfig {
    /// Fail on ASCII elements whose node list length disagrees with the
    /// element type table. Off by default: such elements are dispatched and
    /// left to [`TopologyValidator`](crate::TopologyValidator).
    pub strict_node_counts: bool,
    /// Skip sections this parser does not model (`$Comments`, `$NodeData`, ...).
    /// When off, an unknown section is a structural error.
    pub skip_unknown_sections: bool,
    /// Require `$MeshFormat` before any data section. When off, files
    /// without a header are read as ASCII 2.2.
    pub require_mesh_format: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict_node_counts: false,
            skip_unknown_sections: true,
            require_mesh_format: true,
        }
    }
}

impl ParserConfig {
    pub fn with_strict_node_counts(mut self, strict: bool) -> Self {
        self.strict_node_counts = strict;
        self
    }

    pub fn with_skip_unknown_sections(mut self, skip: bool) -> Self {
        self.skip_unknown_sections = skip;
        self
    }

    pub fn with_require_mesh_format(mut self, require: bool) -> Self {
        self.require_mesh_format = require;
        self
    }
}
