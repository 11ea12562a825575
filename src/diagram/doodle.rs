// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Doodlers: each knows how to sketch one shape of diagram out of the
//! graph. Sync doodlers read an already-analyzed graph; the transitive
//! calls doodler drives analysis itself as its frontier grows.

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use crate::analyze::AnalysisMode;
use crate::kb::KnowledgeBase;
use crate::model::{SymbolGraph, SymbolId};
use crate::search::SearchError;

use super::{ClassDiagram, EdgeClass};

/// Superclass/subclass hierarchy around one symbol. Edges point from the
/// derived class to its base.
#[derive(Debug, Default)]
pub struct HierarchyDoodler;

impl HierarchyDoodler {
    pub fn doodle(&self, graph: &SymbolGraph, root: SymbolId) -> ClassDiagram {
        let mut diagram = ClassDiagram::new();
        diagram.add_node(root);
        diagram.style_node(root, "bold");

        // Upward through supers, transitively.
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(sym) = queue.pop_front() {
            if !visited.insert(sym) {
                continue;
            }
            if let Some(supers) = graph.symbol(sym).supers() {
                for related in supers {
                    diagram.ensure_edge(sym, related.sym);
                    queue.push_back(related.sym);
                }
            }
        }

        // Downward through subclasses.
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(sym) = queue.pop_front() {
            if !visited.insert(sym) {
                continue;
            }
            if let Some(subclasses) = graph.symbol(sym).subclasses() {
                for related in subclasses {
                    diagram.ensure_edge(related.sym, sym);
                    queue.push_back(related.sym);
                }
            }
        }

        diagram
    }
}

/// Paths between a set of interesting symbols, via classify/flood/promote.
///
/// Only edges within one class or one source file participate; anything
/// crossing both a file and a class boundary is boring. An in-bounds edge
/// touching a root is strong, and its far node becomes a strong root
/// unless the callee is too busy. Interior in-bounds edges are weak and
/// survive only if flooding between the strong roots proves they lie on a
/// path connecting two of them.
#[derive(Debug)]
pub struct PathsBetweenDoodler {
    /// A callee with more incoming calls than this is "too busy" to walk
    /// through.
    pub max_caller_fan_in: usize,
}

impl Default for PathsBetweenDoodler {
    fn default() -> Self {
        Self {
            max_caller_fan_in: 4,
        }
    }
}

impl PathsBetweenDoodler {
    pub fn doodle(&self, graph: &mut SymbolGraph, roots: &[SymbolId]) -> ClassDiagram {
        let mut diagram = ClassDiagram::new();
        let root_set: BTreeSet<SymbolId> = roots.iter().copied().collect();
        for &root in roots {
            diagram.add_node(root);
            diagram.style_node(root, "bold");
        }

        let max_fan_in = self.max_caller_fan_in;
        // Nodes one strong hop away from a root. The flood runs between
        // these, not between the roots themselves.
        let mut strong_roots: BTreeSet<SymbolId> = BTreeSet::new();
        {
            let mut classify = |graph: &SymbolGraph,
                                from: SymbolId,
                                to: SymbolId,
                                _other: SymbolId| {
                let from_info = graph.symbol(from);
                let to_info = graph.symbol(to);
                // Fan-in on the callee end decides whether the edge is
                // worth walking through.
                let too_busy = to_info.receives_calls_from().len() > max_fan_in;
                if !from_info.is_same_source_file_as(to_info)
                    && !from_info.is_same_class_as(to_info)
                {
                    return EdgeClass::Boring;
                }
                if root_set.contains(&from) {
                    if !too_busy {
                        strong_roots.insert(to);
                    }
                    return if too_busy { EdgeClass::Ok } else { EdgeClass::Strong };
                }
                if root_set.contains(&to) {
                    if !too_busy {
                        strong_roots.insert(from);
                    }
                    return if too_busy { EdgeClass::Ok } else { EdgeClass::Strong };
                }
                if too_busy {
                    EdgeClass::Boring
                } else {
                    EdgeClass::Weak
                }
            };
            diagram.visit_with_helpers(graph, roots, &mut classify);
        }

        diagram.discover_paths_between(&strong_roots);
        debug!(
            roots = roots.len(),
            strong_roots = strong_roots.len(),
            nodes = diagram.node_count(),
            edges = diagram.edge_count(),
            "doodled paths-between diagram"
        );
        diagram
    }
}

/// Which way a transitive call walk proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDirection {
    Out,
    In,
}

/// Transitive call tree in one direction, analyzed lazily as the frontier
/// grows. Overloaded nodes (too many calls to follow) are kept, styled
/// red, and not expanded.
#[derive(Debug)]
pub struct TransitiveCallsDoodler {
    /// Do not expand a node with more call edges than this.
    pub max_call_branching: usize,
    /// Only follow calls into symbols defined in the root's directory.
    pub limit_to_module: bool,
}

impl Default for TransitiveCallsDoodler {
    fn default() -> Self {
        Self {
            max_call_branching: 12,
            limit_to_module: true,
        }
    }
}

impl TransitiveCallsDoodler {
    pub async fn doodle(
        &self,
        kb: &KnowledgeBase,
        root: SymbolId,
        direction: CallDirection,
    ) -> Result<ClassDiagram, SearchError> {
        let mode = match direction {
            CallDirection::Out => AnalysisMode::CallsOut,
            CallDirection::In => AnalysisMode::CallsIn,
        };

        let mut diagram = ClassDiagram::new();
        diagram.add_node(root);
        diagram.style_node(root, "bold");

        kb.ensure_symbol_analysis(root, mode).await?;
        // Without a known definition file for the root there is no module
        // to limit to, so the walk runs unfiltered.
        let filter_dirs = self.limit_to_module
            && kb.with_graph(|graph| graph.symbol(root).source_file().is_some());

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(sym) = queue.pop_front() {
            if !visited.insert(sym) {
                continue;
            }
            if sym != root {
                kb.ensure_symbol_analysis(sym, mode).await?;
            }

            let peers: Vec<SymbolId> = kb.with_graph_mut(|graph| {
                graph.ensure_call_edges(sym);
                let info = graph.symbol(sym);
                let set = match direction {
                    CallDirection::Out => info.calls_out_to(),
                    CallDirection::In => info.receives_calls_from(),
                };
                set.iter()
                    .copied()
                    .filter(|&peer| !filter_dirs || graph.same_directory(root, peer))
                    .collect()
            });

            if peers.len() > self.max_call_branching {
                debug!(sym = %sym, peers = peers.len(), "call fan too wide, not expanding");
                diagram.add_node(sym);
                diagram.style_node(sym, "red");
                continue;
            }

            for peer in peers {
                match direction {
                    CallDirection::Out => diagram.ensure_edge(sym, peer),
                    CallDirection::In => diagram.ensure_edge(peer, sym),
                }
                if !visited.contains(&peer) {
                    queue.push_back(peer);
                }
            }
        }

        Ok(diagram)
    }
}

/// Paths between a binding symbol and its send/recv counterparts, the
/// per-protocol flavor of [`PathsBetweenDoodler`].
#[derive(Debug, Default)]
pub struct ProtocolDoodler {
    pub paths: PathsBetweenDoodler,
}

impl ProtocolDoodler {
    pub async fn doodle(
        &self,
        kb: &KnowledgeBase,
        root: SymbolId,
    ) -> Result<ClassDiagram, SearchError> {
        kb.ensure_symbol_analysis(root, AnalysisMode::Context).await?;

        let mut roots = vec![root];
        kb.with_graph(|graph| {
            let info = graph.symbol(root);
            if let Some(src) = info.src_sym {
                roots.push(src);
            }
            if let Some(target) = info.target_sym {
                roots.push(target);
            }
        });

        for &sym in &roots {
            kb.ensure_symbol_analysis(sym, AnalysisMode::CallsOut).await?;
            kb.ensure_symbol_analysis(sym, AnalysisMode::CallsIn).await?;
        }

        Ok(kb.with_graph_mut(|graph| self.paths.doodle(graph, &roots)))
    }
}

#[cfg(test)]
mod tests {
    use super::{HierarchyDoodler, PathsBetweenDoodler};
    use crate::model::{RelatedSymbol, SemanticKind, SymbolGraph, SymbolHints, SymbolId};

    fn class(graph: &mut SymbolGraph, raw: &str, pretty: &str) -> SymbolId {
        graph.intern_symbol(
            raw,
            &SymbolHints {
                pretty_name: Some(pretty.to_owned()),
                semantic_kind: Some(SemanticKind::Class),
                ..SymbolHints::default()
            },
        )
    }

    fn method(graph: &mut SymbolGraph, raw: &str, pretty: &str) -> SymbolId {
        graph.intern_symbol(
            raw,
            &SymbolHints {
                pretty_name: Some(pretty.to_owned()),
                semantic_kind: Some(SemanticKind::Method),
                ..SymbolHints::default()
            },
        )
    }

    #[test]
    fn hierarchy_walks_supers_transitively_and_subclasses_down() {
        let mut graph = SymbolGraph::new();
        let root = class(&mut graph, "SYM_widget", "ui::Widget");
        let base = class(&mut graph, "SYM_base", "ui::Base");
        let top = class(&mut graph, "SYM_top", "ui::Top");
        let button = class(&mut graph, "SYM_button", "ui::Button");

        graph.symbol_mut(root).supers = Some(vec![RelatedSymbol::new(base)]);
        graph.symbol_mut(base).supers = Some(vec![RelatedSymbol::new(top)]);
        graph.symbol_mut(root).subclasses = Some(vec![RelatedSymbol::new(button)]);

        let diagram = HierarchyDoodler::default().doodle(&graph, root);
        assert!(diagram.edge_meta(root, base).is_some());
        assert!(diagram.edge_meta(base, top).is_some());
        assert!(diagram.edge_meta(button, root).is_some());
        assert_eq!(diagram.node_styling(root), Some("bold"));
    }

    #[test]
    fn paths_between_keeps_connecting_chains_and_drops_dead_ends() {
        let mut graph = SymbolGraph::new();
        // One class throughout: a -> s1 -> s2 -> b connects the roots, the
        // interior hop s1 -> s2 riding on the flood; s1 -> dead does not.
        let a = method(&mut graph, "SYM_a", "flow::Pipe::Start");
        let s1 = method(&mut graph, "SYM_s1", "flow::Pipe::Stage1");
        let s2 = method(&mut graph, "SYM_s2", "flow::Pipe::Stage2");
        let b = method(&mut graph, "SYM_b", "flow::Pipe::Finish");
        let dead = method(&mut graph, "SYM_dead", "flow::Pipe::Leaf");
        graph.add_edge(a, s1);
        graph.add_edge(s1, s2);
        graph.add_edge(s2, b);
        graph.add_edge(s1, dead);

        let diagram = PathsBetweenDoodler::default().doodle(&mut graph, &[a, b]);
        assert!(diagram.edge_meta(a, s1).is_some());
        assert!(diagram.edge_meta(s1, s2).is_some());
        assert!(diagram.edge_meta(s2, b).is_some());
        assert!(diagram.edge_meta(s1, dead).is_none());
        assert_eq!(diagram.node_styling(a), Some("bold"));
        assert_eq!(diagram.node_styling(b), Some("bold"));
    }

    #[test]
    fn paths_between_stops_at_busy_symbols() {
        let mut graph = SymbolGraph::new();
        let a = method(&mut graph, "SYM_a", "ui::Widget::Run");
        let hub = method(&mut graph, "SYM_hub", "ui::Widget::Dispatch");
        graph.add_edge(a, hub);
        // Five callers besides a push the hub over the fan-in limit.
        for i in 0..5 {
            let caller = method(&mut graph, &format!("SYM_c{i}"), &format!("mc::C{i}::F"));
            graph.add_edge(caller, hub);
        }

        let diagram = PathsBetweenDoodler::default().doodle(&mut graph, &[a]);
        // The edge onto the hub is kept, but nothing beyond it.
        assert!(diagram.edge_meta(a, hub).is_some());
        assert_eq!(
            diagram
                .edges()
                .filter(|(from, _, _)| *from != a)
                .count(),
            0
        );
    }

    #[test]
    fn paths_between_same_class_edges_on_roots_are_strong() {
        let mut graph = SymbolGraph::new();
        let a = method(&mut graph, "SYM_a", "ui::Widget::Run");
        let helper = method(&mut graph, "SYM_h", "ui::Widget::Helper");
        graph.add_edge(a, helper);

        let diagram = PathsBetweenDoodler::default().doodle(&mut graph, &[a]);
        // Strong edges survive even with a single root and no flooding.
        assert!(diagram.edge_meta(a, helper).is_some());
    }

    #[test]
    fn paths_between_drops_edges_across_files_and_classes() {
        let mut graph = SymbolGraph::new();
        let a = method(&mut graph, "SYM_a", "ma::A::Run");
        let z = method(&mut graph, "SYM_z", "mz::Z::Go");
        graph.add_edge(a, z);

        let diagram = PathsBetweenDoodler::default().doodle(&mut graph, &[a]);
        assert!(diagram.edge_meta(a, z).is_none());
        assert!(!diagram.nodes().any(|sym| sym == z));
    }
}
