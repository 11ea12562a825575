// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The [`KnowledgeBase`] facade: one graph, one analyzer, one backend, and
//! the entry points callers actually use.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyze::{AnalysisMode, AnalyzerLimits, SymbolAnalyzer};
use crate::diagram::{
    ClassDiagram, HierarchyDoodler, PathsBetweenDoodler, ProtocolDoodler,
    TransitiveCallsDoodler,
};
use crate::model::{SymbolGraph, SymbolHints, SymbolId};
use crate::search::{SearchBackend, SearchError, SearchQuery};

pub(crate) mod ingest;

/// What shape of diagram [`KnowledgeBase::diagram_symbol`] should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramIntent {
    /// An empty diagram, for callers that assemble their own.
    Empty,
    /// Superclass/subclass hierarchy around the symbol.
    Hierarchy,
    /// Transitive outgoing calls.
    CallsOut,
    /// Transitive incoming calls.
    CallsIn,
}

/// A persisted diagram seed: raw symbol names plus loose identifiers to
/// resolve when the diagram is rebuilt against a fresh index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDef {
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub identifiers: Vec<String>,
}

#[derive(Default)]
struct IdMemo {
    id_to_symbols: BTreeMap<String, Vec<SymbolId>>,
    known_non_ids: BTreeSet<String>,
}

/// Owner of the symbol graph and its analyzer; the crate's front door.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct KnowledgeBase {
    graph: Arc<Mutex<SymbolGraph>>,
    analyzer: Arc<SymbolAnalyzer>,
    backend: Arc<dyn SearchBackend>,
    ids: Mutex<IdMemo>,
}

impl KnowledgeBase {
    pub fn new(backend: Arc<dyn SearchBackend>, limits: AnalyzerLimits) -> Self {
        let graph = Arc::new(Mutex::new(SymbolGraph::new()));
        let analyzer = Arc::new(SymbolAnalyzer::new(
            Arc::clone(&graph),
            Arc::clone(&backend),
            limits,
        ));
        Self {
            graph,
            analyzer,
            backend,
            ids: Mutex::new(IdMemo::default()),
        }
    }

    pub fn analyzer(&self) -> &Arc<SymbolAnalyzer> {
        &self.analyzer
    }

    /// Read access to the graph. The closure runs under the graph lock, so
    /// keep it short and never call back into the knowledge base from it.
    pub fn with_graph<R>(&self, f: impl FnOnce(&SymbolGraph) -> R) -> R {
        f(&self.graph.lock().unwrap())
    }

    pub(crate) fn with_graph_mut<R>(&self, f: impl FnOnce(&mut SymbolGraph) -> R) -> R {
        f(&mut self.graph.lock().unwrap())
    }

    /// Canonical [`SymbolId`] for a raw symbol name, created on first
    /// sight. Never touches the backend.
    pub fn lookup_raw_symbol(&self, raw_name: &str, hints: SymbolHints) -> SymbolId {
        self.graph.lock().unwrap().intern_symbol(raw_name, &hints)
    }

    /// Like [`KnowledgeBase::lookup_raw_symbol`], but also kicks off `mode`
    /// analysis in the background. Requires a tokio runtime; outside one
    /// the lookup still happens and the analysis is skipped with a warning.
    pub fn lookup_and_analyze(
        &self,
        raw_name: &str,
        hints: SymbolHints,
        mode: AnalysisMode,
    ) -> SymbolId {
        let sym = self.lookup_raw_symbol(raw_name, hints);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let analyzer = Arc::clone(&self.analyzer);
                handle.spawn(async move {
                    if let Err(err) = analyzer.ensure_symbol_analysis(sym, mode).await {
                        warn!(sym = %sym, error = %err, "background analysis failed");
                    }
                });
            }
            Err(_) => {
                warn!(sym = %sym, "no async runtime, skipping background analysis");
            }
        }
        sym
    }

    /// Run `mode` analysis rooted at `sym` to completion.
    pub async fn ensure_symbol_analysis(
        &self,
        sym: SymbolId,
        mode: AnalysisMode,
    ) -> Result<(), SearchError> {
        self.analyzer.ensure_symbol_analysis(sym, mode).await
    }

    /// Fetch and ingest just `sym`'s own crossref data.
    pub async fn ensure_symbol_data(&self, sym: SymbolId) -> Result<(), SearchError> {
        self.analyzer.ensure_symbol_data(sym).await
    }

    /// Resolve a loose identifier ("nsDocShell") to the symbols it names.
    ///
    /// Results are memoized both ways: identifiers that resolved, and
    /// strings the backend did not know. Each resolved symbol's payload is
    /// ingested directly and a context analysis run over it, so hits come
    /// back ready to diagram.
    pub async fn find_symbols_given_id(&self, id: &str) -> Result<Vec<SymbolId>, SearchError> {
        {
            let memo = self.ids.lock().unwrap();
            if memo.known_non_ids.contains(id) {
                return Ok(Vec::new());
            }
            if let Some(syms) = memo.id_to_symbols.get(id) {
                return Ok(syms.clone());
            }
        }

        let results = self
            .backend
            .perform_search(&SearchQuery::Id(id.to_owned()))
            .await?;

        let mut syms = Vec::new();
        for (name, payload) in results.semantic_payloads() {
            let sym = self.analyzer.inject_crossref_data(name, payload);
            if !syms.contains(&sym) {
                syms.push(sym);
            }
        }
        debug!(id, hits = syms.len(), "resolved identifier");

        for &sym in &syms {
            if let Err(err) = self.ensure_symbol_analysis(sym, AnalysisMode::Context).await {
                warn!(sym = %sym, error = %err, "context analysis after id lookup failed");
            }
        }

        let mut memo = self.ids.lock().unwrap();
        if syms.is_empty() {
            memo.known_non_ids.insert(id.to_owned());
        } else {
            memo.id_to_symbols.insert(id.to_owned(), syms.clone());
        }
        Ok(syms)
    }

    /// Resolve every symbol a persisted [`GraphDef`] names.
    pub async fn lookup_symbols_from_graph_def(
        &self,
        def: &GraphDef,
    ) -> Result<Vec<SymbolId>, SearchError> {
        let mut syms = Vec::new();
        for raw in &def.symbols {
            let sym = self.lookup_raw_symbol(raw, SymbolHints::default());
            if !syms.contains(&sym) {
                syms.push(sym);
            }
        }
        for id in &def.identifiers {
            for sym in self.find_symbols_given_id(id).await? {
                if !syms.contains(&sym) {
                    syms.push(sym);
                }
            }
        }
        Ok(syms)
    }

    /// Build a diagram of `intent`'s shape around one symbol, running
    /// whatever analysis the shape needs first.
    pub async fn diagram_symbol(
        &self,
        sym: SymbolId,
        intent: DiagramIntent,
    ) -> Result<ClassDiagram, SearchError> {
        match intent {
            DiagramIntent::Empty => Ok(ClassDiagram::new()),
            DiagramIntent::Hierarchy => {
                self.ensure_symbol_analysis(sym, AnalysisMode::Context).await?;
                Ok(self.with_graph(|graph| HierarchyDoodler::default().doodle(graph, sym)))
            }
            DiagramIntent::CallsOut => {
                TransitiveCallsDoodler::default()
                    .doodle(self, sym, crate::diagram::doodle::CallDirection::Out)
                    .await
            }
            DiagramIntent::CallsIn => {
                TransitiveCallsDoodler::default()
                    .doodle(self, sym, crate::diagram::doodle::CallDirection::In)
                    .await
            }
        }
    }

    /// Paths-between diagram over a set of interesting symbols.
    pub async fn paths_between_diagram(
        &self,
        roots: &[SymbolId],
    ) -> Result<ClassDiagram, SearchError> {
        for &root in roots {
            self.ensure_symbol_analysis(root, AnalysisMode::Context).await?;
            self.ensure_symbol_analysis(root, AnalysisMode::CallsOut).await?;
            self.ensure_symbol_analysis(root, AnalysisMode::CallsIn).await?;
        }
        Ok(self.with_graph_mut(|graph| PathsBetweenDoodler::default().doodle(graph, roots)))
    }

    /// Protocol diagram: paths between a binding symbol and its send/recv
    /// counterparts.
    pub async fn protocol_diagram(&self, sym: SymbolId) -> Result<ClassDiagram, SearchError> {
        ProtocolDoodler::default().doodle(self, sym).await
    }
}
