// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram extraction. [`ClassDiagram`] holds the node/edge sets a renderer
//! consumes and implements the classify/flood/promote discovery that keeps
//! "paths between interesting symbols" diagrams small.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, warn};

use crate::model::{SymbolGraph, SymbolId};

pub mod doodle;

pub use doodle::{
    CallDirection, HierarchyDoodler, PathsBetweenDoodler, ProtocolDoodler,
    TransitiveCallsDoodler,
};

/// Verdict on one call edge during a diagram visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClass {
    /// Drop the edge entirely.
    Boring,
    /// Park the edge in the weak diagram; flooding may promote it later.
    Weak,
    /// Keep the edge and keep traversing through its far node.
    Strong,
    /// Keep the edge but stop traversing there.
    Ok,
}

/// Classifier for [`ClassDiagram::visit_with_helpers`]. Arguments are the
/// graph, the edge `(from, to)`, and which of the two is the node being
/// stepped onto.
pub type EdgeClassifier<'a> =
    dyn FnMut(&SymbolGraph, SymbolId, SymbolId, SymbolId) -> EdgeClass + 'a;

/// A symbol-level diagram: nodes, directed edges with a per-edge bitmask,
/// and an optional parked "weak" diagram of edges that did not make the
/// cut on their own.
///
/// Forward and reverse edge maps mirror each other; every mutation goes
/// through [`ClassDiagram::ensure_edge`] or [`ClassDiagram::or_edge_bit`]
/// to keep that invariant.
#[derive(Debug, Default)]
pub struct ClassDiagram {
    nodes: BTreeSet<SymbolId>,
    node_stylings: BTreeMap<SymbolId, String>,
    forward_edges: BTreeMap<SymbolId, BTreeMap<SymbolId, u64>>,
    reverse_edges: BTreeMap<SymbolId, BTreeMap<SymbolId, u64>>,
    weak_diag: Option<Box<ClassDiagram>>,
}

impl ClassDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, sym: SymbolId) {
        self.nodes.insert(sym);
    }

    pub fn has_node(&self, sym: SymbolId) -> bool {
        self.nodes.contains(&sym)
    }

    pub fn nodes(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach a rendering hint ("red", "dashed", ...) to a node.
    pub fn style_node(&mut self, sym: SymbolId, styling: impl Into<String>) {
        self.node_stylings.insert(sym, styling.into());
    }

    pub fn node_styling(&self, sym: SymbolId) -> Option<&str> {
        self.node_stylings.get(&sym).map(String::as_str)
    }

    /// Record `from -> to`, creating both endpoint nodes. Idempotent and
    /// meta-preserving for existing edges.
    pub fn ensure_edge(&mut self, from: SymbolId, to: SymbolId) {
        self.nodes.insert(from);
        self.nodes.insert(to);
        self.forward_edges.entry(from).or_default().entry(to).or_insert(0);
        self.reverse_edges.entry(to).or_default().entry(from).or_insert(0);
    }

    /// OR `bit` into an edge's mask, in both mirror maps.
    fn or_edge_bit(&mut self, from: SymbolId, to: SymbolId, bit: u64) {
        if let Some(meta) = self
            .forward_edges
            .get_mut(&from)
            .and_then(|tos| tos.get_mut(&to))
        {
            *meta |= bit;
        }
        if let Some(meta) = self
            .reverse_edges
            .get_mut(&to)
            .and_then(|froms| froms.get_mut(&from))
        {
            *meta |= bit;
        }
    }

    pub fn edge_meta(&self, from: SymbolId, to: SymbolId) -> Option<u64> {
        self.forward_edges.get(&from)?.get(&to).copied()
    }

    pub fn edge_count(&self) -> usize {
        self.forward_edges.values().map(BTreeMap::len).sum()
    }

    /// All edges as `(from, to, meta)`, in deterministic order.
    pub fn edges(&self) -> impl Iterator<Item = (SymbolId, SymbolId, u64)> + '_ {
        self.forward_edges.iter().flat_map(|(&from, tos)| {
            tos.iter().map(move |(&to, &meta)| (from, to, meta))
        })
    }

    pub fn successors(&self, sym: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.forward_edges
            .get(&sym)
            .into_iter()
            .flat_map(|tos| tos.keys().copied())
    }

    /// The parked weak edges, if any visit produced some.
    pub fn weak_diagram(&self) -> Option<&ClassDiagram> {
        self.weak_diag.as_deref()
    }

    fn weak_diag_mut(&mut self) -> &mut ClassDiagram {
        self.weak_diag.get_or_insert_with(Default::default)
    }

    /// Classify phase: one shared walk of the call graph out of every
    /// start node, in both call directions, letting `classify` decide each
    /// edge's fate.
    ///
    /// `Strong` edges are kept and the walk continues through their far
    /// node. `Weak` edges are parked in the weak diagram but still
    /// traversed, since a weak edge may sit in the middle of a longer
    /// interesting path. `Ok` edges are kept and suppress any traversal
    /// into their far node, even via later edges. `Boring` edges vanish.
    /// The walk only reads call edges already present in the graph;
    /// fetching is the analyzer's business.
    pub fn visit_with_helpers(
        &mut self,
        graph: &mut SymbolGraph,
        starts: &[SymbolId],
        classify: &mut EdgeClassifier<'_>,
    ) {
        let mut visited: BTreeSet<SymbolId> = starts.iter().copied().collect();
        let mut stack: Vec<SymbolId> = starts.to_vec();
        for &start in starts {
            self.add_node(start);
        }

        while let Some(sym) = stack.pop() {
            graph.ensure_call_edges(sym);

            let outgoing: Vec<SymbolId> =
                graph.symbol(sym).calls_out_to().iter().copied().collect();
            for to in outgoing {
                // Derive the far node's call views so classifiers can read
                // its fan-in.
                graph.ensure_call_edges(to);
                match classify(graph, sym, to, to) {
                    EdgeClass::Boring => {}
                    EdgeClass::Weak => {
                        self.weak_diag_mut().ensure_edge(sym, to);
                        if visited.insert(to) {
                            stack.push(to);
                        }
                    }
                    EdgeClass::Ok => {
                        self.ensure_edge(sym, to);
                        visited.insert(to);
                    }
                    EdgeClass::Strong => {
                        self.ensure_edge(sym, to);
                        if visited.insert(to) {
                            stack.push(to);
                        }
                    }
                }
            }

            let incoming: Vec<SymbolId> = graph
                .symbol(sym)
                .receives_calls_from()
                .iter()
                .copied()
                .collect();
            for from in incoming {
                graph.ensure_call_edges(from);
                match classify(graph, from, sym, from) {
                    EdgeClass::Boring => {}
                    EdgeClass::Weak => {
                        self.weak_diag_mut().ensure_edge(from, sym);
                        if visited.insert(from) {
                            stack.push(from);
                        }
                    }
                    EdgeClass::Ok => {
                        self.ensure_edge(from, sym);
                        visited.insert(from);
                    }
                    EdgeClass::Strong => {
                        self.ensure_edge(from, sym);
                        if visited.insert(from) {
                            stack.push(from);
                        }
                    }
                }
            }
        }
    }

    /// Flood phase: starting at `root`, OR `bit` into every weak edge
    /// reachable forward from it, then every weak edge reaching it
    /// backward. Expansion stops at `terminus` nodes (the other roots), so
    /// floods do not leak through a root onto unrelated paths.
    pub fn flood_weak_diag_for_paths(
        &mut self,
        root: SymbolId,
        bit: u64,
        terminus: &BTreeSet<SymbolId>,
    ) {
        let Some(weak) = self.weak_diag.as_deref_mut() else {
            return;
        };

        for forward in [true, false] {
            let mut visited = BTreeSet::new();
            let mut queue = VecDeque::from([root]);
            while let Some(sym) = queue.pop_front() {
                if !visited.insert(sym) {
                    continue;
                }
                let next: Vec<SymbolId> = if forward {
                    weak.forward_edges
                        .get(&sym)
                        .map(|tos| tos.keys().copied().collect())
                        .unwrap_or_default()
                } else {
                    weak.reverse_edges
                        .get(&sym)
                        .map(|froms| froms.keys().copied().collect())
                        .unwrap_or_default()
                };
                for other in next {
                    if forward {
                        weak.or_edge_bit(sym, other, bit);
                    } else {
                        weak.or_edge_bit(other, sym, bit);
                    }
                    if !terminus.contains(&other) {
                        queue.push_back(other);
                    }
                }
            }
        }
    }

    /// Promote phase: pull every weak edge whose mask holds at least two
    /// flood bits into this diagram. Such an edge was reached from two
    /// different roots, so it lies on a path between them. The weak
    /// diagram is consumed.
    pub fn merge_traversed_weak_diag_in(&mut self) {
        let Some(weak) = self.weak_diag.take() else {
            return;
        };
        let mut promoted = 0usize;
        for (from, to, meta) in weak.edges() {
            if meta.count_ones() >= 2 {
                self.ensure_edge(from, to);
                promoted += 1;
            }
        }
        debug!(
            promoted,
            parked = weak.edge_count(),
            "promoted weak edges onto the diagram"
        );
    }

    /// Flood and promote for every strong root, assigning each one a
    /// distinct mask bit. The bit width of the edge mask caps the flood at
    /// 64 roots; any beyond that are dropped with a warning.
    pub fn discover_paths_between(&mut self, strong_roots: &BTreeSet<SymbolId>) {
        if strong_roots.len() > 64 {
            warn!(
                roots = strong_roots.len(),
                "too many strong roots, flooding from the first 64"
            );
        }
        let flood_roots: Vec<SymbolId> = strong_roots.iter().copied().take(64).collect();
        for (ix, &root) in flood_roots.iter().enumerate() {
            self.flood_weak_diag_for_paths(root, 1 << ix, strong_roots);
        }
        self.merge_traversed_weak_diag_in();
    }
}

#[cfg(test)]
mod tests;
