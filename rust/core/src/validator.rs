// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology consistency checks
//!
//! Checks return indices of offending elements. Inconsistency is data for
//! the caller to act on, so nothing here fails or panics.

use rustc_hash::FxHashSet;

use crate::element_types::{element_info, element_node_count};
use crate::entities::{Element, Node};
use crate::observer::MeshVisitor;

/// Result of [`TopologyValidator::validate`]; all lists hold ascending element indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationReport {
    pub node_count_mismatches: Vec<usize>,
    pub invalid_references: Vec<usize>,
    pub unknown_types: Vec<usize>,
}

impl ValidationReport {
    /// No mismatched node counts and no dangling references.
    ///
    /// Unknown types alone do not make a mesh invalid.
    pub fn is_valid(&self) -> bool {
        self.node_count_mismatches.is_empty() && self.invalid_references.is_empty()
    }
}

#[inline]
fn has_wrong_node_count(element: &Element) -> bool {
    element_node_count(element.type_code).is_some_and(|n| element.node_ids.len() != n)
}

/// Read-only checks over an assembled element list.
pub struct TopologyValidator<'a> {
    elements: &'a [Element],
}

impl<'a> TopologyValidator<'a> {
    pub fn new(elements: &'a [Element]) -> Self {
        Self { elements }
    }

    /// Indices whose node list length differs from the type's fixed count.
    /// Unknown and variable-count types are never reported.
    pub fn check_consistent_node_counts(&self) -> Vec<usize> {
        self.indices_where(has_wrong_node_count)
    }

    /// Indices referencing any node id outside `[0, max_node_id)`.
    pub fn check_valid_node_references(&self, max_node_id: usize) -> Vec<usize> {
        self.indices_where(|e| e.node_ids.iter().any(|&id| id >= max_node_id))
    }

    /// Indices referencing any node id not in `known_ids`.
    pub fn check_declared_node_references(&self, known_ids: &FxHashSet<usize>) -> Vec<usize> {
        self.indices_where(|e| e.node_ids.iter().any(|id| !known_ids.contains(id)))
    }

    /// Indices whose type code is not in the element table.
    pub fn check_known_types(&self) -> Vec<usize> {
        self.indices_where(|e| element_info(e.type_code).is_none())
    }

    /// Run every check against the declared node ids.
    pub fn validate(&self, known_ids: &FxHashSet<usize>) -> ValidationReport {
        let report = ValidationReport {
            node_count_mismatches: self.check_consistent_node_counts(),
            invalid_references: self.check_declared_node_references(known_ids),
            unknown_types: self.check_known_types(),
        };
        tracing::debug!(
            elements = self.elements.len(),
            node_count_mismatches = report.node_count_mismatches.len(),
            invalid_references = report.invalid_references.len(),
            unknown_types = report.unknown_types.len(),
            "validated topology"
        );
        report
    }

    fn indices_where(&self, mut predicate: impl FnMut(&Element) -> bool) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| predicate(e))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Validates elements as they are parsed.
///
/// Element indices count dispatched elements from zero. A reference is
/// flagged when the node was not dispatched before the element, which is
/// exact for files that keep `$Nodes` ahead of `$Elements`.
#[derive(Debug, Default)]
pub struct StreamingValidator {
    nodes: FxHashSet<usize>,
    elements_seen: usize,
    report: ValidationReport,
}

impl StreamingValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node ids seen so far.
    pub fn node_ids(&self) -> &FxHashSet<usize> {
        &self.nodes
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn into_report(self) -> ValidationReport {
        self.report
    }
}

impl MeshVisitor for StreamingValidator {
    fn on_node(&mut self, node: &Node) -> bool {
        self.nodes.insert(node.id);
        true
    }

    fn on_element(&mut self, element: &Element) -> bool {
        let index = self.elements_seen;
        self.elements_seen += 1;

        if element_info(element.type_code).is_none() {
            self.report.unknown_types.push(index);
        } else if has_wrong_node_count(element) {
            self.report.node_count_mismatches.push(index);
        }
        if element.node_ids.iter().any(|id| !self.nodes.contains(id)) {
            self.report.invalid_references.push(index);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{NodeIds, Tags};

    fn element(id: usize, type_code: i32, nodes: &[usize]) -> Element {
        Element::new(id, type_code, Tags::from_slice(&[1, 1]), NodeIds::from_slice(nodes))
    }

    fn sample() -> Vec<Element> {
        vec![
            element(1, 2, &[1, 2, 3]),
            element(2, 2, &[1, 2]),
            element(3, 999, &[1]),
            element(4, 3, &[1, 2, 3, 9]),
            element(5, 15, &[4]),
        ]
    }

    #[test]
    fn test_node_counts() {
        let elements = sample();
        let v = TopologyValidator::new(&elements);
        assert_eq!(v.check_consistent_node_counts(), vec![1]);
        assert_eq!(v.check_known_types(), vec![2]);
    }

    #[test]
    fn test_references() {
        let elements = sample();
        let v = TopologyValidator::new(&elements);
        assert_eq!(v.check_valid_node_references(5), vec![3]);
        assert_eq!(v.check_valid_node_references(4), vec![3, 4]);

        let known: FxHashSet<usize> = [1, 2, 3].into_iter().collect();
        assert_eq!(v.check_declared_node_references(&known), vec![3, 4]);
    }

    #[test]
    fn test_validate_report() {
        let elements = sample();
        let known: FxHashSet<usize> = [1, 2, 3, 4, 9].into_iter().collect();
        let report = TopologyValidator::new(&elements).validate(&known);
        assert_eq!(report.node_count_mismatches, vec![1]);
        assert!(report.invalid_references.is_empty());
        assert_eq!(report.unknown_types, vec![2]);
        assert!(!report.is_valid());

        assert!(TopologyValidator::new(&[]).validate(&known).is_valid());
    }

    #[test]
    fn test_streaming_matches_batch() {
        let elements = sample();
        let mut streaming = StreamingValidator::new();
        for id in [1, 2, 3, 4] {
            assert!(streaming.on_node(&Node::new(id, 0.0, 0.0, 0.0)));
        }
        for e in &elements {
            assert!(streaming.on_element(e));
        }

        let known = streaming.node_ids().clone();
        let batch = TopologyValidator::new(&elements).validate(&known);
        assert_eq!(streaming.into_report(), batch);
    }

    #[test]
    fn test_streaming_flags_forward_references() {
        let mut streaming = StreamingValidator::new();
        streaming.on_element(&element(1, 15, &[7]));
        streaming.on_node(&Node::new(7, 0.0, 0.0, 0.0));
        streaming.on_element(&element(2, 15, &[7]));
        assert_eq!(streaming.report().invalid_references, vec![0]);
    }
}
