// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use symgrok::diagram::{ClassDiagram, EdgeClass};
use symgrok::model::{SemanticKind, SymbolGraph, SymbolHints, SymbolId};

// Benchmark identity (keep stable):
// - Group name: `diagram.paths`
// - Case IDs: `chain_walk`, `chain_flood`, `lattice_flood`

/// Linear call chain `root -> n1 -> ... -> terminus`.
fn chain_graph(len: usize) -> (SymbolGraph, SymbolId, SymbolId) {
    let mut graph = SymbolGraph::new();
    let mut prev = method(&mut graph, 0);
    let root = prev;
    for ix in 1..len {
        let next = method(&mut graph, ix);
        graph.add_edge(prev, next);
        prev = next;
    }
    (graph, root, prev)
}

/// Dense lattice: `width` columns of `width` nodes, every node calling
/// every node of the next column.
fn lattice_graph(width: usize) -> (SymbolGraph, SymbolId, SymbolId) {
    let mut graph = SymbolGraph::new();
    let mut columns: Vec<Vec<SymbolId>> = Vec::new();
    let mut serial = 0usize;
    for _ in 0..width {
        let column: Vec<SymbolId> = (0..width)
            .map(|_| {
                serial += 1;
                method(&mut graph, serial)
            })
            .collect();
        if let Some(prev) = columns.last() {
            for &from in prev {
                for &to in &column {
                    graph.add_edge(from, to);
                }
            }
        }
        columns.push(column);
    }
    let root = columns.first().unwrap()[0];
    let terminus = columns.last().unwrap()[0];
    (graph, root, terminus)
}

fn method(graph: &mut SymbolGraph, ix: usize) -> SymbolId {
    graph.intern_symbol(
        &format!("SYM_bench_{ix}"),
        &SymbolHints {
            pretty_name: Some(format!("m{ix}::C{ix}::Run")),
            semantic_kind: Some(SemanticKind::Method),
            ..SymbolHints::default()
        },
    )
}

fn benches_flood(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagram.paths");

    // Strong classification: the visit walks the whole chain, so this case
    // is dominated by the classify phase.
    {
        let (mut graph, root, terminus) = chain_graph(512);
        let roots = [root, terminus];
        group.throughput(Throughput::Elements(graph.symbol_count() as u64));
        group.bench_function("chain_walk", |b| {
            b.iter(|| {
                let mut diagram = ClassDiagram::new();
                diagram.visit_with_helpers(
                    black_box(&mut graph),
                    black_box(&roots),
                    &mut |_, _, _, _| EdgeClass::Strong,
                );
                black_box(diagram.edge_count())
            })
        });
    }

    // Every edge weak: the visit parks the whole graph, then each end
    // floods across all of it, so these cases are dominated by the flood
    // and promote phases.
    for (case_id, (mut graph, root, terminus)) in [
        ("chain_flood", chain_graph(64)),
        ("lattice_flood", lattice_graph(8)),
    ] {
        let roots = [root, terminus];
        let ends: BTreeSet<SymbolId> = roots.into_iter().collect();
        group.throughput(Throughput::Elements(graph.symbol_count() as u64));
        group.bench_function(case_id, |b| {
            b.iter(|| {
                let mut diagram = ClassDiagram::new();
                diagram.visit_with_helpers(
                    black_box(&mut graph),
                    black_box(&roots),
                    &mut |_, _, _, _| EdgeClass::Weak,
                );
                diagram.discover_paths_between(black_box(&ends));
                black_box(diagram.edge_count())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benches_flood);
criterion_main!(benches);
