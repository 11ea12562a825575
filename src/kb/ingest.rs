// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Crossref payload ingestion: folds one symbol's backend payload into the
//! graph. Pure graph mutation; cutoffs that concern the scheduler are
//! reported back as an [`IngestOutcome`] so the caller can apply them under
//! the scheduler lock without nesting it inside the graph lock.

use tracing::warn;

use crate::analyze::{AnalyzerLimits, TraversalKind};
use crate::model::{RelatedSymbol, SemanticKind, SourceLocation, SymbolGraph, SymbolHints, SymbolId};
use crate::search::payload::{PathLines, RawMeta, RawSymbolPayload};

/// Scheduler-relevant side effects of an ingest.
#[derive(Debug, Default)]
pub(crate) struct IngestOutcome {
    /// Traversals that hit a cutoff and must be marked excessive.
    pub(crate) excessive: Vec<(SymbolId, TraversalKind)>,
}

/// Fold `payload` into `sym`'s graph entry.
pub(crate) fn process_symbol_payload(
    graph: &mut SymbolGraph,
    limits: &AnalyzerLimits,
    sym: SymbolId,
    payload: &RawSymbolPayload,
) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();

    // A single definition path doubles as the hint that disambiguates
    // namespace-vs-class in the pretty name, so extract it up front.
    let def_path = single_path(payload.hits.get("defs"));

    if let Some(meta) = &payload.meta {
        let cutoffs = apply_meta_inner(graph, sym, meta, limits, def_path.as_deref());
        outcome.excessive.extend(cutoffs);
    }

    for consume in &payload.consumes {
        if consume.sym.is_empty() {
            warn!(sym = %sym, "skipping consume entry without a symbol");
            continue;
        }
        let hints = SymbolHints {
            pretty_name: consume.pretty.clone(),
            semantic_kind: consume.kind.as_deref().map(SemanticKind::parse),
            ..SymbolHints::default()
        };
        let target = graph.intern_symbol(&consume.sym, &hints);
        graph.add_edge(sym, target);
    }

    process_hits(graph, limits, sym, payload, &mut outcome);
    graph.symbol_mut(sym).update_boring(def_path.as_deref());
    graph.symbol_mut(sym).mark_dirty();
    outcome
}

/// Apply just structured crossref meta to a symbol. Used for variant
/// symbols, whose meta arrives nested in the canonical payload.
pub(crate) fn apply_meta(
    graph: &mut SymbolGraph,
    sym: SymbolId,
    meta: &RawMeta,
    limits: &AnalyzerLimits,
) -> Vec<(SymbolId, TraversalKind)> {
    apply_meta_inner(graph, sym, meta, limits, None)
}

fn apply_meta_inner(
    graph: &mut SymbolGraph,
    sym: SymbolId,
    meta: &RawMeta,
    limits: &AnalyzerLimits,
    def_path: Option<&str>,
) -> Vec<(SymbolId, TraversalKind)> {
    let mut excessive = Vec::new();

    if let Some(pretty) = &meta.pretty {
        graph.symbol_mut(sym).update_pretty_name(pretty, def_path);
    }
    if let Some(kind) = &meta.kind {
        graph
            .symbol_mut(sym)
            .update_semantic_kind(SemanticKind::parse(kind));
    }
    if !meta.platforms.is_empty() {
        graph.symbol_mut(sym).platforms = meta.platforms.clone();
    }

    if let Some(parent) = &meta.parentsym {
        let parent = graph.intern_symbol(parent, &SymbolHints::default());
        graph.symbol_mut(sym).parent_sym = Some(parent);
    }
    // Binding-pair symbols (IPC send/recv and the like) are linked both as
    // named fields and as plain edges, so call graphs cross the boundary.
    if let Some(src) = &meta.srcsym {
        let src = graph.intern_symbol(src, &SymbolHints::default());
        graph.symbol_mut(sym).src_sym = Some(src);
        graph.add_edge(src, sym);
    }
    if let Some(target) = &meta.targetsym {
        let target = graph.intern_symbol(target, &SymbolHints::default());
        graph.symbol_mut(sym).target_sym = Some(target);
        graph.add_edge(sym, target);
    }
    // IDL bindings are a naming association, not a call edge.
    if let Some(idl) = &meta.idlsym {
        let idl = graph.intern_symbol(idl, &SymbolHints::default());
        graph.symbol_mut(sym).idl_sym = Some(idl);
    }

    let supers = intern_related(graph, &meta.supers, SemanticKind::Class);
    graph.symbol_mut(sym).supers = Some(supers);

    if meta.subclasses.len() >= limits.excessive_subclasses {
        warn!(
            sym = %sym,
            count = meta.subclasses.len(),
            "dropping excessive subclass list"
        );
        graph.symbol_mut(sym).subclasses = Some(Vec::new());
        excessive.push((sym, TraversalKind::Subclasses));
    } else {
        let subclasses = meta
            .subclasses
            .iter()
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                let id = graph.intern_symbol(
                    raw,
                    &SymbolHints {
                        semantic_kind: Some(SemanticKind::Class),
                        ..SymbolHints::default()
                    },
                );
                RelatedSymbol::new(id)
            })
            .collect();
        graph.symbol_mut(sym).subclasses = Some(subclasses);
    }

    let methods = intern_related(graph, &meta.methods, SemanticKind::Method);
    graph.symbol_mut(sym).methods = Some(methods);

    let mut fields = Vec::with_capacity(meta.fields.len());
    for field in &meta.fields {
        if field.sym.is_empty() {
            warn!(sym = %sym, "skipping field entry without a symbol");
            continue;
        }
        let id = graph.intern_symbol(
            &field.sym,
            &SymbolHints {
                pretty_name: field.pretty.clone(),
                semantic_kind: Some(SemanticKind::Field),
                ..SymbolHints::default()
            },
        );
        let type_sym = field
            .typesym
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(|raw| graph.intern_symbol(raw, &SymbolHints::default()));
        fields.push(RelatedSymbol {
            sym: id,
            pretty: field.pretty.clone(),
            type_sym,
        });
    }
    graph.symbol_mut(sym).fields = Some(fields);

    let overrides = intern_related(graph, &meta.overrides, SemanticKind::Method);
    graph.symbol_mut(sym).overrides = Some(overrides);

    let overridden_by = meta
        .overridden_by
        .iter()
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            let id = graph.intern_symbol(
                raw,
                &SymbolHints {
                    semantic_kind: Some(SemanticKind::Method),
                    ..SymbolHints::default()
                },
            );
            RelatedSymbol::new(id)
        })
        .collect();
    graph.symbol_mut(sym).overridden_by = Some(overridden_by);

    if !meta.variants.is_empty() && graph.symbol(sym).variants().is_none() {
        graph.symbol_mut(sym).pending_variants = meta.variants.clone();
    }

    graph.symbol_mut(sym).mark_dirty();
    excessive
}

fn intern_related(
    graph: &mut SymbolGraph,
    list: &[crate::search::payload::RawRelated],
    kind: SemanticKind,
) -> Vec<RelatedSymbol> {
    let mut out = Vec::with_capacity(list.len());
    for related in list {
        if related.sym.is_empty() {
            warn!("skipping relation entry without a symbol");
            continue;
        }
        let id = graph.intern_symbol(
            &related.sym,
            &SymbolHints {
                pretty_name: related.pretty.clone(),
                semantic_kind: Some(kind),
                ..SymbolHints::default()
            },
        );
        out.push(RelatedSymbol {
            sym: id,
            pretty: related.pretty.clone(),
            type_sym: None,
        });
    }
    out
}

fn process_hits(
    graph: &mut SymbolGraph,
    limits: &AnalyzerLimits,
    sym: SymbolId,
    payload: &RawSymbolPayload,
    outcome: &mut IngestOutcome,
) {
    if let Some(defs) = payload.hits.get("defs") {
        for group in defs {
            let file = graph.intern_file(&group.path);
            if graph.file_mut(file).symbol_defs.insert(sym) {
                graph.file_mut(file).mark_dirty();
            }
        }
        // Peek and location only make sense for a single definition site;
        // per-platform duplicates would pick one arbitrarily.
        if let [group] = defs.as_slice() {
            let file = graph.intern_file(&group.path);
            graph.symbol_mut(sym).source_file = Some(file);
            if let Some(hit) = group.lines.first() {
                graph.symbol_mut(sym).def_location = Some(SourceLocation {
                    lno: hit.lno,
                    bounds: hit.bounds,
                });
                graph.symbol_mut(sym).def_peek =
                    Some(hit.peek_lines.clone().unwrap_or_else(|| hit.line.clone()));
            }
        }
    }

    if let Some(decls) = payload.hits.get("decls") {
        for group in decls {
            let file = graph.intern_file(&group.path);
            if graph.file_mut(file).symbol_decls.insert(sym) {
                graph.file_mut(file).mark_dirty();
            }
        }
        if let [group] = decls.as_slice() {
            let file = graph.intern_file(&group.path);
            graph.symbol_mut(sym).decl_file = Some(file);
            if let Some(hit) = group.lines.first() {
                graph.symbol_mut(sym).decl_location = Some(SourceLocation {
                    lno: hit.lno,
                    bounds: hit.bounds,
                });
                graph.symbol_mut(sym).decl_peek =
                    Some(hit.peek_lines.clone().unwrap_or_else(|| hit.line.clone()));
            }
        }
    }

    if let Some(uses) = payload.hits.get("uses") {
        if uses.len() >= limits.max_use_path_hits {
            warn!(sym = %sym, files = uses.len(), "dropping excessive use hits");
            outcome.excessive.push((sym, TraversalKind::Uses));
            if graph.symbol(sym).is_callable() {
                outcome.excessive.push((sym, TraversalKind::CallsIn));
            }
            return;
        }
        let subject_callable = graph.symbol(sym).is_callable();
        for group in uses {
            for hit in &group.lines {
                let Some(contextsym) = hit.contextsym.as_deref().filter(|c| !c.is_empty()) else {
                    continue;
                };
                let hints = SymbolHints {
                    pretty_name: hit.context.clone(),
                    // A use site of a callable is itself executable code.
                    semantic_kind: subject_callable.then_some(SemanticKind::Function),
                    ..SymbolHints::default()
                };
                let context = graph.intern_symbol(contextsym, &hints);
                graph.add_edge(context, sym);
            }
        }
    }
}

fn single_path(groups: Option<&Vec<PathLines>>) -> Option<String> {
    match groups.map(Vec::as_slice) {
        Some([group]) => Some(group.path.clone()),
        _ => None,
    }
}
