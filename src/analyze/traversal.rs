// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{SymbolGraph, SymbolId};

/// One edge family the analyzer can walk out of a symbol.
///
/// Each kind owns one bit in the per-symbol traversal bitmasks. `SelfData`
/// and `Uses` are the two special bits: `SelfData` marks the symbol's own
/// crossref fetch, and `Uses` only ever appears in the excessive mask, as a
/// marker that use hits were cut off at the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TraversalKind {
    SelfData = 0,
    Uses,
    Superclasses,
    Subclasses,
    Parent,
    CallsOut,
    CallsIn,
    Overrides,
    OverriddenBy,
    Fields,
    Methods,
    Variants,
}

impl TraversalKind {
    pub const ALL: [TraversalKind; 12] = [
        TraversalKind::SelfData,
        TraversalKind::Uses,
        TraversalKind::Superclasses,
        TraversalKind::Subclasses,
        TraversalKind::Parent,
        TraversalKind::CallsOut,
        TraversalKind::CallsIn,
        TraversalKind::Overrides,
        TraversalKind::OverriddenBy,
        TraversalKind::Fields,
        TraversalKind::Methods,
        TraversalKind::Variants,
    ];

    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    pub const fn name(self) -> &'static str {
        match self {
            TraversalKind::SelfData => "self",
            TraversalKind::Uses => "uses",
            TraversalKind::Superclasses => "superclasses",
            TraversalKind::Subclasses => "subclasses",
            TraversalKind::Parent => "parent",
            TraversalKind::CallsOut => "calls-out",
            TraversalKind::CallsIn => "calls-in",
            TraversalKind::Overrides => "overrides",
            TraversalKind::OverriddenBy => "overridden-by",
            TraversalKind::Fields => "fields",
            TraversalKind::Methods => "methods",
            TraversalKind::Variants => "variants",
        }
    }

    /// Traversal kinds to schedule on each symbol this traversal reaches.
    ///
    /// Walking superclasses keeps walking superclasses (and pulls in their
    /// variants), a parent expands into its members, and call/override
    /// walks chase overrides so virtual dispatch targets show up.
    pub fn traverse_next(self) -> &'static [TraversalKind] {
        match self {
            TraversalKind::Superclasses => {
                &[TraversalKind::Superclasses, TraversalKind::Variants]
            }
            TraversalKind::Subclasses => &[TraversalKind::Subclasses],
            TraversalKind::Parent => &[TraversalKind::Fields, TraversalKind::Methods],
            TraversalKind::CallsOut => &[TraversalKind::OverriddenBy],
            TraversalKind::OverriddenBy => &[TraversalKind::OverriddenBy],
            TraversalKind::Variants => &[TraversalKind::Fields, TraversalKind::Methods],
            _ => &[],
        }
    }

    /// The symbols this traversal reaches from `sym`, reading the symbol's
    /// already-ingested crossref data. `Variants` synthesizes its variant
    /// symbols here, on first touch.
    pub(crate) fn targets(
        self,
        graph: &mut SymbolGraph,
        sym: SymbolId,
        limits: &AnalyzerLimits,
    ) -> Vec<SymbolId> {
        fn related(list: Option<&[crate::model::RelatedSymbol]>) -> Vec<SymbolId> {
            list.map(|rel| rel.iter().map(|r| r.sym).collect())
                .unwrap_or_default()
        }

        match self {
            TraversalKind::SelfData | TraversalKind::Uses => Vec::new(),
            TraversalKind::Superclasses => related(graph.symbol(sym).supers()),
            TraversalKind::Subclasses => related(graph.symbol(sym).subclasses()),
            TraversalKind::Parent => graph.symbol(sym).parent_sym().into_iter().collect(),
            TraversalKind::CallsOut => graph.symbol(sym).out_edges().iter().copied().collect(),
            TraversalKind::CallsIn => graph.symbol(sym).in_edges().iter().copied().collect(),
            TraversalKind::Overrides => related(graph.symbol(sym).overrides()),
            TraversalKind::OverriddenBy => related(graph.symbol(sym).overridden_by()),
            TraversalKind::Fields => {
                let info = graph.symbol(sym);
                let mut out = Vec::new();
                if let Some(fields) = info.fields() {
                    for field in fields {
                        out.push(field.sym);
                        if let Some(type_sym) = field.type_sym {
                            out.push(type_sym);
                        }
                    }
                }
                out
            }
            TraversalKind::Methods => related(graph.symbol(sym).methods()),
            TraversalKind::Variants => synthesize_variants(graph, sym, limits),
        }
    }
}

/// Turn a symbol's pending per-platform variant metadata into real variant
/// symbols. Variant symbols share the canonical raw name, never enter the
/// identity map, and point back at their canonical symbol.
fn synthesize_variants(
    graph: &mut SymbolGraph,
    sym: SymbolId,
    limits: &AnalyzerLimits,
) -> Vec<SymbolId> {
    if let Some(existing) = graph.symbol(sym).variants() {
        return existing.to_vec();
    }
    let pending = std::mem::take(&mut graph.symbol_mut(sym).pending_variants);
    let raw_name = graph.symbol(sym).raw_name().to_owned();
    let mut ids = Vec::with_capacity(pending.len());
    for meta in &pending {
        let variant = graph.push_variant_symbol(&raw_name, meta.pretty.as_deref(), sym);
        // Variants never get their subclass lists walked, so any cutoffs
        // their meta would trigger are irrelevant here.
        let _ = crate::kb::ingest::apply_meta(graph, variant, meta, limits);
        ids.push(variant);
    }
    graph.symbol_mut(sym).variants = Some(ids.clone());
    graph.symbol_mut(sym).mark_dirty();
    ids
}

/// What a caller wants analyzed, expanded into the traversal kinds the
/// task plans for its root symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisMode {
    /// Everything needed to show the symbol in context: type hierarchy,
    /// containing class, members, and platform variants.
    Context,
    /// Just the symbol's own crossref data.
    FromFile,
    /// The symbol plus what it calls.
    CallsOut,
    /// The symbol plus what calls it.
    CallsIn,
}

impl AnalysisMode {
    pub fn kinds(self) -> &'static [TraversalKind] {
        match self {
            AnalysisMode::Context => &[
                TraversalKind::SelfData,
                TraversalKind::Superclasses,
                TraversalKind::Subclasses,
                TraversalKind::Parent,
                TraversalKind::Fields,
                TraversalKind::Methods,
                TraversalKind::Variants,
            ],
            AnalysisMode::FromFile => &[TraversalKind::SelfData],
            AnalysisMode::CallsOut => &[TraversalKind::SelfData, TraversalKind::CallsOut],
            AnalysisMode::CallsIn => &[TraversalKind::SelfData, TraversalKind::CallsIn],
        }
    }

    pub fn mask(self) -> u32 {
        self.kinds().iter().fold(0, |acc, k| acc | k.bit())
    }
}

/// Per-symbol traversal progress, owned by the analyzer's scheduler.
///
/// A traversal bit for a symbol lives in at most one of the three masks.
/// `excessive` is the one that skips work: once set, that traversal is
/// treated as done without walking it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalState {
    pub(crate) active: u32,
    pub(crate) completed: u32,
    pub(crate) excessive: u32,
}

impl TraversalState {
    /// True when the kind still has to be scheduled: not running, not done,
    /// not cut off as excessive.
    pub fn needs(&self, kind: TraversalKind) -> bool {
        (self.active | self.completed | self.excessive) & kind.bit() == 0
    }

    pub fn is_active(&self, kind: TraversalKind) -> bool {
        self.active & kind.bit() != 0
    }

    pub fn is_completed(&self, kind: TraversalKind) -> bool {
        self.completed & kind.bit() != 0
    }

    pub fn is_excessive(&self, kind: TraversalKind) -> bool {
        self.excessive & kind.bit() != 0
    }

    pub(crate) fn mark_active(&mut self, kind: TraversalKind) {
        self.active |= kind.bit();
    }

    pub(crate) fn finish(&mut self, kind: TraversalKind) {
        self.active &= !kind.bit();
        self.completed |= kind.bit();
    }

    pub(crate) fn mark_excessive(&mut self, kind: TraversalKind) {
        self.excessive |= kind.bit();
    }
}

/// Tunable cutoffs for the analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerLimits {
    /// Size of the traversal token pool: how many fetch-and-walk steps may
    /// run at once across all tasks.
    pub max_concurrent_traversals: usize,
    /// A class with at least this many subclasses has its subclass list
    /// dropped and the traversal marked excessive.
    pub excessive_subclasses: usize,
    /// More use path-line groups than this marks uses (and incoming calls)
    /// excessive instead of ingesting the hits.
    pub max_use_path_hits: usize,
}

impl Default for AnalyzerLimits {
    fn default() -> Self {
        Self {
            max_concurrent_traversals: 4,
            excessive_subclasses: 16,
            max_use_path_hits: 32,
        }
    }
}
