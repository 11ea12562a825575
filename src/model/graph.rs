// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use tracing::warn;

use super::file::FileInfo;
use super::ids::{FileId, SymbolId};
use super::symbol::{SemanticKind, SymbolInfo};

/// Optional context for a symbol lookup: pretty name, path hints for name
/// decomposition, and the semantic kind when the caller already knows it.
#[derive(Debug, Clone, Default)]
pub struct SymbolHints {
    pub pretty_name: Option<String>,
    pub some_path: Option<String>,
    pub header_path: Option<String>,
    pub source_path: Option<String>,
    pub semantic_kind: Option<SemanticKind>,
}

impl SymbolHints {
    pub fn pretty(pretty_name: impl Into<String>) -> Self {
        Self {
            pretty_name: Some(pretty_name.into()),
            ..Self::default()
        }
    }

    fn path_hint(&self) -> Option<&str> {
        self.source_path
            .as_deref()
            .or(self.header_path.as_deref())
            .or(self.some_path.as_deref())
    }
}

/// Arena-backed store for all [`SymbolInfo`]/[`FileInfo`] instances plus the
/// identity maps that make raw names and paths canonical.
///
/// The graph is an instance-scoped store, not process state: callers decide
/// its lifetime, and entries live exactly as long as the graph does.
#[derive(Debug, Default)]
pub struct SymbolGraph {
    symbols: Vec<SymbolInfo>,
    by_raw_name: BTreeMap<String, SymbolId>,
    files: Vec<FileInfo>,
    by_path: BTreeMap<String, FileId>,
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend "source" records carry comma-delimited symbol unions
    /// (cross-platform variants plus overridden superclass methods). The
    /// first entry is the canonical one. Callers that expect the union pass
    /// `comma_expected`; anything else gets flagged, because it usually means
    /// an unnormalized symbol leaked in from a new code path.
    pub fn normalize_symbol<'a>(raw: &'a str, comma_expected: bool) -> &'a str {
        match raw.split_once(',') {
            Some((first, _)) => {
                if !comma_expected {
                    warn!(symbol = raw, "caller passed comma-delimited symbol name");
                }
                first
            }
            None => raw,
        }
    }

    /// Canonical id for a raw symbol name, creating the entry on first sight.
    ///
    /// On a hit, a pretty-name hint fills in name parts the symbol does not
    /// have yet; hints never overwrite knowledge gained from real crossref
    /// meta.
    pub fn intern_symbol(&mut self, raw_name: &str, hints: &SymbolHints) -> SymbolId {
        let raw_name = Self::normalize_symbol(raw_name, false);

        if let Some(&id) = self.by_raw_name.get(raw_name) {
            let sym = &mut self.symbols[id.index()];
            if sym.full_name.is_none() {
                if let Some(pretty) = &hints.pretty_name {
                    sym.update_pretty_name(pretty, hints.path_hint());
                }
            }
            if sym.semantic_kind == SemanticKind::Unknown {
                if let Some(kind) = hints.semantic_kind {
                    sym.update_semantic_kind(kind);
                }
            }
            return id;
        }

        let id = SymbolId::from_index(self.symbols.len());
        let mut sym = SymbolInfo::new(raw_name);
        if let Some(pretty) = &hints.pretty_name {
            sym.update_pretty_name(pretty, hints.path_hint());
        }
        if let Some(kind) = hints.semantic_kind {
            sym.update_semantic_kind(kind);
        }
        sym.update_boring(None);
        self.symbols.push(sym);
        self.by_raw_name.insert(raw_name.to_owned(), id);
        id
    }

    /// Add a platform-variant symbol. Variants share their canonical
    /// symbol's raw name, so they never enter the identity map; they are
    /// reachable only through `variants` on the canonical symbol.
    pub(crate) fn push_variant_symbol(
        &mut self,
        raw_name: &str,
        pretty_name: Option<&str>,
        canon: SymbolId,
    ) -> SymbolId {
        let id = SymbolId::from_index(self.symbols.len());
        let mut sym = SymbolInfo::new(raw_name);
        if let Some(pretty) = pretty_name {
            sym.update_pretty_name(pretty, None);
        }
        sym.canon_variant = Some(canon);
        self.symbols.push(sym);
        id
    }

    pub fn symbol_by_raw_name(&self, raw_name: &str) -> Option<SymbolId> {
        self.by_raw_name
            .get(Self::normalize_symbol(raw_name, false))
            .copied()
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolInfo {
        &self.symbols[id.index()]
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> &mut SymbolInfo {
        &mut self.symbols[id.index()]
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &SymbolInfo)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(ix, sym)| (SymbolId::from_index(ix), sym))
    }

    pub fn intern_file(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.by_path.get(path) {
            return id;
        }
        let id = FileId::from_index(self.files.len());
        self.files.push(FileInfo::new(path));
        self.by_path.insert(path.to_owned(), id);
        id
    }

    pub fn file_by_path(&self, path: &str) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    pub fn file(&self, id: FileId) -> &FileInfo {
        &self.files[id.index()]
    }

    pub(crate) fn file_mut(&mut self, id: FileId) -> &mut FileInfo {
        &mut self.files[id.index()]
    }

    /// Record `from -> to` in the unfiltered adjacency. Every insertion is
    /// bidirectional and dirties both endpoints so derived call-edge views
    /// recompute.
    pub fn add_edge(&mut self, from: SymbolId, to: SymbolId) {
        {
            let sym = &mut self.symbols[from.index()];
            sym.out_edges.insert(to);
            sym.mark_dirty();
        }
        {
            let sym = &mut self.symbols[to.index()];
            sym.in_edges.insert(from);
            sym.mark_dirty();
        }
    }

    /// Whether both symbols' definitions live in the same directory. False
    /// when either side has no known definition file.
    pub fn same_directory(&self, a: SymbolId, b: SymbolId) -> bool {
        match (
            self.symbols[a.index()].source_file,
            self.symbols[b.index()].source_file,
        ) {
            (Some(fa), Some(fb)) => {
                self.files[fa.index()].dir_path == self.files[fb.index()].dir_path
            }
            _ => false,
        }
    }

    /// Whether `other` may appear in a derived call-edge set.
    fn is_call_peer(&self, other: SymbolId) -> bool {
        let sym = &self.symbols[other.index()];
        sym.semantic_kind.is_callable() && !sym.is_boring
    }

    /// Recompute `calls_out_to`/`receives_calls_from` for `id` if its serial
    /// moved since the last derivation. Cheap no-op otherwise.
    pub fn ensure_call_edges(&mut self, id: SymbolId) {
        let serial = self.symbols[id.index()].serial;
        if self.symbols[id.index()].calls_filtered_serial == Some(serial) {
            return;
        }

        if !self.symbols[id.index()].semantic_kind.is_callable() {
            let sym = &mut self.symbols[id.index()];
            sym.calls_out_to.clear();
            sym.receives_calls_from.clear();
            sym.calls_filtered_serial = Some(serial);
            return;
        }

        let out: Vec<SymbolId> = self.symbols[id.index()].out_edges.iter().copied().collect();
        let inn: Vec<SymbolId> = self.symbols[id.index()].in_edges.iter().copied().collect();
        let calls_out = out.into_iter().filter(|&o| self.is_call_peer(o)).collect();
        let calls_in = inn.into_iter().filter(|&o| self.is_call_peer(o)).collect();

        let sym = &mut self.symbols[id.index()];
        sym.calls_out_to = calls_out;
        sym.receives_calls_from = calls_in;
        sym.calls_filtered_serial = Some(serial);
    }
}
