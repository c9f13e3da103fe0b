// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer registry
//!
//! Decoded entities are pushed to callers through [`MeshVisitor`]. The
//! closure registry [`Observers`] is one visitor; callers with their own
//! state can implement the trait directly.
//!
//! Every callback returns `true` to keep parsing and `false` to stop.

use crate::entities::{Element, Node, PhysicalName};

/// Receives decoded entities in file order.
pub trait MeshVisitor {
    fn on_node(&mut self, _node: &Node) -> bool {
        true
    }

    fn on_element(&mut self, _element: &Element) -> bool {
        true
    }

    fn on_physical_name(&mut self, _name: &PhysicalName) -> bool {
        true
    }
}

impl<V: MeshVisitor + ?Sized> MeshVisitor for &mut V {
    fn on_node(&mut self, node: &Node) -> bool {
        (**self).on_node(node)
    }

    fn on_element(&mut self, element: &Element) -> bool {
        (**self).on_element(element)
    }

    fn on_physical_name(&mut self, name: &PhysicalName) -> bool {
        (**self).on_physical_name(name)
    }
}

pub type NodeObserver<'a> = Box<dyn FnMut(&Node) -> bool + 'a>;
pub type ElementObserver<'a> = Box<dyn FnMut(&Element) -> bool + 'a>;
pub type PhysicalNameObserver<'a> = Box<dyn FnMut(&PhysicalName) -> bool + 'a>;

/// Ordered callback lists, one per entity kind.
#[derive(Default)]
pub struct Observers<'a> {
    nodes: Vec<NodeObserver<'a>>,
    elements: Vec<ElementObserver<'a>>,
    physical_names: Vec<PhysicalNameObserver<'a>>,
}

impl<'a> Observers<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Node) -> bool + 'a,
    {
        self.nodes.push(Box::new(observer));
    }

    pub fn add_element_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Element) -> bool + 'a,
    {
        self.elements.push(Box::new(observer));
    }

    pub fn add_physical_name_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&PhysicalName) -> bool + 'a,
    {
        self.physical_names.push(Box::new(observer));
    }

    /// Total number of registered observers.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.elements.len() + self.physical_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.elements.clear();
        self.physical_names.clear();
    }
}

// Dispatch stops at the first observer that returns false.
impl MeshVisitor for Observers<'_> {
    fn on_node(&mut self, node: &Node) -> bool {
        self.nodes.iter_mut().all(|observer| observer(node))
    }

    fn on_element(&mut self, element: &Element) -> bool {
        self.elements.iter_mut().all(|observer| observer(element))
    }

    fn on_physical_name(&mut self, name: &PhysicalName) -> bool {
        self.physical_names.iter_mut().all(|observer| observer(name))
    }
}

impl std::fmt::Debug for Observers<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("nodes", &self.nodes.len())
            .field("elements", &self.elements.len())
            .field("physical_names", &self.physical_names.len())
            .finish()
    }
}
