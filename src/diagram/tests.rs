// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use super::{ClassDiagram, EdgeClass};
use crate::model::{SemanticKind, SymbolGraph, SymbolHints, SymbolId};

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

fn ids(n: usize) -> Vec<SymbolId> {
    (0..n).map(SymbolId::from_index).collect()
}

#[test]
fn ensure_edge_keeps_forward_and_reverse_mirrored() {
    let mut diagram = ClassDiagram::new();
    let syms = ids(2);
    diagram.ensure_edge(syms[0], syms[1]);

    assert!(diagram.has_node(syms[0]));
    assert!(diagram.has_node(syms[1]));
    assert_eq!(diagram.edge_meta(syms[0], syms[1]), Some(0));
    assert_eq!(diagram.successors(syms[0]).collect::<Vec<_>>(), [syms[1]]);
    assert_eq!(diagram.edge_count(), 1);

    // Re-adding is idempotent.
    diagram.ensure_edge(syms[0], syms[1]);
    assert_eq!(diagram.edge_count(), 1);
}

#[test]
fn visit_traverses_strong_stops_at_ok_and_drops_boring() {
    let mut graph = SymbolGraph::new();
    let a = method(&mut graph, "SYM_a", "mod::A");
    let b = method(&mut graph, "SYM_b", "mod::B");
    let c = method(&mut graph, "SYM_c", "mod::C");
    let d = method(&mut graph, "SYM_d", "mod::D");
    let e = method(&mut graph, "SYM_e", "mod::E");
    graph.add_edge(a, b); // strong, traversed
    graph.add_edge(b, c); // ok, kept but c not expanded
    graph.add_edge(c, d); // never classified: c is not traversed
    graph.add_edge(a, e); // boring, dropped

    let mut diagram = ClassDiagram::new();
    diagram.visit_with_helpers(&mut graph, &[a], &mut |_, _, to, _| {
        if to == b {
            EdgeClass::Strong
        } else if to == c {
            EdgeClass::Ok
        } else {
            EdgeClass::Boring
        }
    });

    assert!(diagram.edge_meta(a, b).is_some());
    assert!(diagram.edge_meta(b, c).is_some());
    assert!(diagram.edge_meta(c, d).is_none());
    assert!(!diagram.has_node(e));
}

#[test]
fn visit_walks_incoming_calls_too() {
    let mut graph = SymbolGraph::new();
    let root = method(&mut graph, "SYM_root", "mod::Root");
    let caller = method(&mut graph, "SYM_caller", "mod::Caller");
    graph.add_edge(caller, root);

    let mut diagram = ClassDiagram::new();
    diagram.visit_with_helpers(&mut graph, &[root], &mut |_, _, _, _| EdgeClass::Ok);
    assert!(diagram.edge_meta(caller, root).is_some());
}

#[test]
fn weak_edges_park_in_the_weak_diagram() {
    let mut graph = SymbolGraph::new();
    let a = method(&mut graph, "SYM_a", "mod::A");
    let b = method(&mut graph, "SYM_b", "mod::B");
    graph.add_edge(a, b);

    let mut diagram = ClassDiagram::new();
    diagram.visit_with_helpers(&mut graph, &[a], &mut |_, _, _, _| EdgeClass::Weak);

    assert_eq!(diagram.edge_count(), 0);
    let weak = diagram.weak_diagram().unwrap();
    assert_eq!(weak.edge_meta(a, b), Some(0));
}

#[test]
fn weak_edges_are_traversed_past() {
    // a -> x -> y: the interior x -> y edge is only reachable by walking
    // through the parked a -> x edge.
    let mut graph = SymbolGraph::new();
    let a = method(&mut graph, "SYM_a", "mod::A");
    let x = method(&mut graph, "SYM_x", "mod::X");
    let y = method(&mut graph, "SYM_y", "mod::Y");
    graph.add_edge(a, x);
    graph.add_edge(x, y);

    let mut diagram = ClassDiagram::new();
    diagram.visit_with_helpers(&mut graph, &[a], &mut |_, _, _, _| EdgeClass::Weak);

    let weak = diagram.weak_diagram().unwrap();
    assert_eq!(weak.edge_meta(a, x), Some(0));
    assert_eq!(weak.edge_meta(x, y), Some(0));
}

#[test]
fn ok_edges_bar_traversal_into_their_far_node() {
    // b is reached via an ok edge first; the later weak edge onto b still
    // parks, but b itself is never expanded, so b -> d stays unseen.
    let mut graph = SymbolGraph::new();
    let a = method(&mut graph, "SYM_a", "mod::A");
    let b = method(&mut graph, "SYM_b", "mod::B");
    let c = method(&mut graph, "SYM_c", "mod::C");
    let d = method(&mut graph, "SYM_d", "mod::D");
    graph.add_edge(a, b);
    graph.add_edge(a, c);
    graph.add_edge(c, b);
    graph.add_edge(b, d);

    let mut diagram = ClassDiagram::new();
    diagram.visit_with_helpers(&mut graph, &[a], &mut |_, from, to, _| {
        if from == a && to == b {
            EdgeClass::Ok
        } else if from == a && to == c {
            EdgeClass::Strong
        } else {
            EdgeClass::Weak
        }
    });

    assert!(diagram.edge_meta(a, b).is_some());
    assert!(diagram.edge_meta(a, c).is_some());
    let weak = diagram.weak_diagram().unwrap();
    assert!(weak.edge_meta(c, b).is_some());
    assert!(weak.edge_meta(b, d).is_none());
}

#[test]
fn flood_marks_reachable_weak_edges_and_stops_at_terminus() {
    // a -> x -> b -> y, with b a terminus: the flood from a must not leak
    // past b onto the b -> y edge.
    let mut diagram = ClassDiagram::new();
    let syms = ids(4);
    let (a, x, b, y) = (syms[0], syms[1], syms[2], syms[3]);
    let weak = diagram.weak_diag_mut();
    weak.ensure_edge(a, x);
    weak.ensure_edge(x, b);
    weak.ensure_edge(b, y);

    let terminus: BTreeSet<SymbolId> = [a, b].into_iter().collect();
    diagram.flood_weak_diag_for_paths(a, 1 << 0, &terminus);

    let weak = diagram.weak_diagram().unwrap();
    assert_eq!(weak.edge_meta(a, x), Some(1));
    assert_eq!(weak.edge_meta(x, b), Some(1));
    assert_eq!(weak.edge_meta(b, y), Some(0));
}

#[test]
fn merge_promotes_edges_seen_from_two_roots() {
    // a -> x -> b lies between roots a and b; a -> y is a dead end.
    let mut diagram = ClassDiagram::new();
    let syms = ids(4);
    let (a, x, b, y) = (syms[0], syms[1], syms[2], syms[3]);
    let weak = diagram.weak_diag_mut();
    weak.ensure_edge(a, x);
    weak.ensure_edge(x, b);
    weak.ensure_edge(a, y);

    let terminus: BTreeSet<SymbolId> = [a, b].into_iter().collect();
    diagram.flood_weak_diag_for_paths(a, 1 << 0, &terminus);
    diagram.flood_weak_diag_for_paths(b, 1 << 1, &terminus);
    diagram.merge_traversed_weak_diag_in();

    assert!(diagram.edge_meta(a, x).is_some());
    assert!(diagram.edge_meta(x, b).is_some());
    assert!(diagram.edge_meta(a, y).is_none());
    assert!(!diagram.has_node(y));
    assert!(diagram.weak_diagram().is_none());
}

#[test]
fn discover_paths_between_runs_the_whole_pipeline() {
    let mut graph = SymbolGraph::new();
    let a = method(&mut graph, "SYM_a", "ma::A");
    let x = method(&mut graph, "SYM_x", "mx::X");
    let b = method(&mut graph, "SYM_b", "mb::B");
    let y = method(&mut graph, "SYM_y", "my::Y");
    graph.add_edge(a, x);
    graph.add_edge(x, b);
    graph.add_edge(a, y);

    let mut diagram = ClassDiagram::new();
    diagram.visit_with_helpers(&mut graph, &[a, b], &mut |_, _, _, _| EdgeClass::Weak);
    let roots: BTreeSet<SymbolId> = [a, b].into_iter().collect();
    diagram.discover_paths_between(&roots);

    assert!(diagram.edge_meta(a, x).is_some());
    assert!(diagram.edge_meta(x, b).is_some());
    assert!(diagram.edge_meta(a, y).is_none());
}

#[test]
fn merge_without_weak_diagram_is_a_no_op() {
    let mut diagram = ClassDiagram::new();
    diagram.merge_traversed_weak_diag_in();
    assert!(diagram.is_empty());
}
