// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::{watch, Semaphore};
use tracing::{debug, trace, warn};

use crate::kb::ingest;
use crate::model::{SymbolGraph, SymbolHints, SymbolId};
use crate::search::{RawSymbolPayload, SearchBackend, SearchError, SearchQuery};

use super::task::{AnalysisTask, WorkItem};
use super::traversal::{AnalysisMode, AnalyzerLimits, TraversalKind, TraversalState};

type LookupOutcome = Option<Result<(), SearchError>>;

/// Scheduler-owned state. Guarded by one mutex that is never held across
/// an await; the graph mutex is never taken while this one is held.
#[derive(Default)]
struct SchedState {
    /// Per-symbol traversal bitmasks, the side table the whole scheduler
    /// pivots on.
    traversal: BTreeMap<SymbolId, TraversalState>,
    /// Live tasks by root symbol.
    tasks: BTreeMap<SymbolId, Arc<AnalysisTask>>,
    /// Task rotation, earlier entries claim work first.
    prioritized: VecDeque<Arc<AnalysisTask>>,
    /// In-flight crossref fetches, for deduplicating concurrent requests.
    active_lookups: BTreeMap<SymbolId, watch::Receiver<LookupOutcome>>,
}

impl SchedState {
    fn state(&self, sym: SymbolId) -> TraversalState {
        self.traversal.get(&sym).copied().unwrap_or_default()
    }

    fn state_mut(&mut self, sym: SymbolId) -> &mut TraversalState {
        self.traversal.entry(sym).or_default()
    }

    /// Queue `kinds` of `sym` onto `task`, skipping kinds already active,
    /// completed, or excessive. Returns how many items were queued.
    fn plan(&mut self, task: &AnalysisTask, sym: SymbolId, kinds: &[TraversalKind]) -> usize {
        let state = self.state(sym);
        let mut queued = 0;
        for &kind in kinds {
            if state.needs(kind) {
                task.push_work(WorkItem { sym, kind });
                queued += 1;
            }
        }
        queued
    }

    fn retire_task(&mut self, root: SymbolId) {
        self.tasks.remove(&root);
        self.prioritized.retain(|t| t.root() != root);
    }
}

/// Drives incremental symbol analysis: plans traversal work, deduplicates
/// crossref fetches, and bounds concurrency with a token pool.
pub struct SymbolAnalyzer {
    graph: Arc<Mutex<SymbolGraph>>,
    backend: Arc<dyn SearchBackend>,
    limits: AnalyzerLimits,
    tokens: Arc<Semaphore>,
    sched: Mutex<SchedState>,
    /// Bumped whenever any traversal bit settles, so waiters can re-check
    /// bits that were active on some other task's worker.
    settled_tx: watch::Sender<u64>,
}

impl SymbolAnalyzer {
    pub(crate) fn new(
        graph: Arc<Mutex<SymbolGraph>>,
        backend: Arc<dyn SearchBackend>,
        limits: AnalyzerLimits,
    ) -> Self {
        let tokens = Arc::new(Semaphore::new(limits.max_concurrent_traversals));
        let (settled_tx, _) = watch::channel(0);
        Self {
            graph,
            backend,
            limits,
            tokens,
            sched: Mutex::new(SchedState::default()),
            settled_tx,
        }
    }

    fn notify_settled(&self) {
        self.settled_tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Wait until no bit of `mask` is still pending or active for `sym`.
    async fn wait_until_settled(&self, sym: SymbolId, mask: u32) {
        let mut settled = self.settled_tx.subscribe();
        loop {
            {
                let sched = self.sched.lock().unwrap();
                let state = sched.state(sym);
                if mask & !(state.completed | state.excessive) == 0 {
                    return;
                }
            }
            if settled.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn limits(&self) -> &AnalyzerLimits {
        &self.limits
    }

    /// Snapshot of a symbol's traversal bitmasks.
    pub fn traversal_state(&self, sym: SymbolId) -> TraversalState {
        self.sched.lock().unwrap().state(sym)
    }

    /// Mark one traversal of a symbol as cut off. The kind is treated as
    /// done from now on; no worker will walk it.
    pub fn mark_excessive(&self, sym: SymbolId, kind: TraversalKind) {
        debug!(sym = %sym, kind = kind.name(), "marking traversal excessive");
        self.sched.lock().unwrap().state_mut(sym).mark_excessive(kind);
        self.notify_settled();
    }

    /// Run `mode`'s traversals rooted at `sym` to completion.
    ///
    /// Joins an existing task for the same root instead of starting a second
    /// one, widening it if `mode` adds traversal kinds. Resolves once the
    /// task's whole frontier drains and every kind of `mode` has settled,
    /// including kinds mid-flight on some other task's worker. The first
    /// backend error observed while working the task is returned, with
    /// whatever data did arrive already ingested.
    pub async fn ensure_symbol_analysis(
        self: &Arc<Self>,
        sym: SymbolId,
        mode: AnalysisMode,
    ) -> Result<(), SearchError> {
        let joined = {
            let mut sched = self.sched.lock().unwrap();

            let existing = match sched.tasks.get(&sym).cloned() {
                // A task that completed but has not been retired yet is no
                // longer claimable; fall through and start fresh.
                Some(task) if task.is_complete() => {
                    sched.retire_task(sym);
                    None
                }
                other => other,
            };

            if let Some(task) = existing {
                let added = task.merge_mode_mask(mode.mask());
                let added_kinds: Vec<TraversalKind> = TraversalKind::ALL
                    .into_iter()
                    .filter(|k| added & k.bit() != 0)
                    .collect();
                sched.plan(&task, sym, &added_kinds);
                trace!(sym = %sym, "joining existing analysis task");
                Some(task)
            } else {
                let state = sched.state(sym);
                if mode.kinds().iter().all(|k| !state.needs(*k)) {
                    trace!(sym = %sym, "analysis already satisfied");
                    None
                } else {
                    let task = Arc::new(AnalysisTask::new(sym, mode.mask()));
                    if sched.plan(&task, sym, mode.kinds()) == 0 {
                        // Every needed kind is mid-flight on some other
                        // task; an empty task would never drain, so do
                        // not register one. The settled wait below still
                        // holds this call open until those kinds land.
                        None
                    } else {
                        debug!(sym = %sym, mask = mode.mask(), "starting analysis task");
                        sched.tasks.insert(sym, Arc::clone(&task));
                        sched.prioritized.push_back(Arc::clone(&task));
                        Some(task)
                    }
                }
            }
        };

        let first_error = if let Some(task) = joined {
            self.spin_up_work();

            let mut done = task.subscribe();
            while !*done.borrow() {
                if done.changed().await.is_err() {
                    break;
                }
            }

            let (considered, traversed) = task.progress();
            debug!(sym = %sym, considered, traversed, "analysis task complete");
            task.first_error()
        } else {
            None
        };

        // Kinds claimed by other tasks may still be running; the analysis
        // only counts as done once every bit of the mode has settled.
        self.wait_until_settled(sym, mode.mask()).await;

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Make sure `sym`'s own crossref data has been fetched and ingested.
    ///
    /// Concurrent callers for the same symbol share one backend query; the
    /// fetch outcome, errors included, is broadcast to every waiter. A
    /// failed fetch still completes the symbol's `SelfData` bit so the
    /// scheduler never wedges on a dead symbol.
    pub async fn ensure_symbol_data(&self, sym: SymbolId) -> Result<(), SearchError> {
        loop {
            let waiter = {
                let mut sched = self.sched.lock().unwrap();
                if sched.state(sym).is_completed(TraversalKind::SelfData) {
                    return Ok(());
                }
                match sched.active_lookups.get(&sym) {
                    Some(rx) => Waiter::Join(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        sched.active_lookups.insert(sym, rx);
                        Waiter::Fetch(tx)
                    }
                }
            };

            match waiter {
                Waiter::Fetch(tx) => {
                    let result = self.fetch_and_ingest(sym).await;
                    {
                        let mut sched = self.sched.lock().unwrap();
                        // Errors complete the bit too; waiters share the
                        // outcome rather than piling on retries.
                        sched.state_mut(sym).finish(TraversalKind::SelfData);
                        sched.active_lookups.remove(&sym);
                    }
                    self.notify_settled();
                    tx.send_replace(Some(result.clone()));
                    return result;
                }
                Waiter::Join(mut rx) => {
                    loop {
                        let outcome = rx.borrow().clone();
                        if let Some(result) = outcome {
                            return result;
                        }
                        if rx.changed().await.is_err() {
                            // The fetching future was dropped. Clear the
                            // stale entry and take over the fetch.
                            let mut sched = self.sched.lock().unwrap();
                            if let Some(stale) = sched.active_lookups.get(&sym) {
                                if stale.borrow().is_none() {
                                    sched.active_lookups.remove(&sym);
                                }
                            }
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Ingest an already-fetched crossref payload, as if the symbol's own
    /// fetch had returned it. Marks the symbol's `SelfData` complete so the
    /// scheduler will not fetch it again.
    pub fn inject_crossref_data(&self, raw_name: &str, payload: &RawSymbolPayload) -> SymbolId {
        let sym = {
            let mut graph = self.graph.lock().unwrap();
            graph.intern_symbol(
                SymbolGraph::normalize_symbol(raw_name, true),
                &SymbolHints::default(),
            )
        };
        {
            let sched = self.sched.lock().unwrap();
            // A fetch already settled or mid-flight wins over the seed.
            if !sched.state(sym).needs(TraversalKind::SelfData) {
                return sym;
            }
        }
        let outcome = {
            let mut graph = self.graph.lock().unwrap();
            ingest::process_symbol_payload(&mut graph, &self.limits, sym, payload)
        };
        {
            let mut sched = self.sched.lock().unwrap();
            sched.state_mut(sym).finish(TraversalKind::SelfData);
            for (excessive_sym, kind) in outcome.excessive {
                sched.state_mut(excessive_sym).mark_excessive(kind);
            }
        }
        self.notify_settled();
        sym
    }

    async fn fetch_and_ingest(&self, sym: SymbolId) -> Result<(), SearchError> {
        let raw_name = {
            let graph = self.graph.lock().unwrap();
            graph.symbol(sym).raw_name().to_owned()
        };
        trace!(sym = %sym, raw = raw_name.as_str(), "fetching crossref data");
        let results = self
            .backend
            .perform_search(&SearchQuery::Symbol(raw_name.clone()))
            .await?;

        let mut excessive = Vec::new();
        {
            let mut graph = self.graph.lock().unwrap();
            let mut matched = false;
            for (name, payload) in results.semantic_payloads() {
                let target = graph.intern_symbol(
                    SymbolGraph::normalize_symbol(name, true),
                    &SymbolHints::default(),
                );
                matched = matched || target == sym;
                let outcome =
                    ingest::process_symbol_payload(&mut graph, &self.limits, target, payload);
                excessive.extend(outcome.excessive);
            }
            if !matched {
                trace!(sym = %sym, raw = raw_name.as_str(), "no crossref data for symbol");
            }
        }
        if !excessive.is_empty() {
            {
                let mut sched = self.sched.lock().unwrap();
                for (excessive_sym, kind) in excessive {
                    sched.state_mut(excessive_sym).mark_excessive(kind);
                }
            }
            self.notify_settled();
        }
        Ok(())
    }

    /// Pull loop: while tokens and queued work both exist, pair them up and
    /// spawn a worker. The single place work gets dispatched from.
    fn spin_up_work(self: &Arc<Self>) {
        loop {
            let Ok(permit) = Arc::clone(&self.tokens).try_acquire_owned() else {
                return;
            };
            let claimed = {
                let mut sched = self.sched.lock().unwrap();
                loop {
                    let Some(front) = sched.prioritized.front().cloned() else {
                        break None;
                    };
                    if front.is_descheduled() {
                        sched.prioritized.pop_front();
                        continue;
                    }
                    if let Some(item) = front.take_todo() {
                        break Some((front, item));
                    }
                    // No queued work, but workers may still plan more;
                    // rotate it to the back and look at the next task.
                    sched.prioritized.pop_front();
                    sched.prioritized.push_back(front);
                    if sched.prioritized.iter().all(|t| !t.has_todo()) {
                        break None;
                    }
                }
            };
            match claimed {
                Some((task, item)) => {
                    let analyzer = Arc::clone(self);
                    tokio::spawn(async move {
                        analyzer.perform_one_traversal(task, item).await;
                        drop(permit);
                        analyzer.spin_up_work();
                    });
                }
                None => return,
            }
        }
    }

    async fn perform_one_traversal(self: &Arc<Self>, task: Arc<AnalysisTask>, item: WorkItem) {
        let claimed = {
            let mut sched = self.sched.lock().unwrap();
            let state = sched.state_mut(item.sym);
            // Re-check under the lock: the bits may have moved since this
            // item was planned.
            if state.needs(item.kind) {
                state.mark_active(item.kind);
                true
            } else {
                false
            }
        };
        if !claimed {
            trace!(sym = %item.sym, kind = item.kind.name(), "skipping settled traversal");
            if task.complete_item(item, None) {
                self.sched.lock().unwrap().retire_task(task.root());
            }
            return;
        }

        let result = self.run_traversal(&task, item).await;
        if let Err(err) = &result {
            warn!(sym = %item.sym, kind = item.kind.name(), error = %err, "traversal failed");
        }

        self.sched
            .lock()
            .unwrap()
            .state_mut(item.sym)
            .finish(item.kind);
        self.notify_settled();
        if task.complete_item(item, result.err()) {
            self.sched.lock().unwrap().retire_task(task.root());
        }
    }

    async fn run_traversal(
        self: &Arc<Self>,
        task: &AnalysisTask,
        item: WorkItem,
    ) -> Result<(), SearchError> {
        self.ensure_symbol_data(item.sym).await?;
        if matches!(item.kind, TraversalKind::SelfData | TraversalKind::Uses) {
            return Ok(());
        }

        let targets = {
            let mut graph = self.graph.lock().unwrap();
            item.kind.targets(&mut graph, item.sym, &self.limits)
        };
        trace!(
            sym = %item.sym,
            kind = item.kind.name(),
            targets = targets.len(),
            "walking traversal"
        );

        let mut first_error = None;
        if item.kind == TraversalKind::Variants {
            // Variant data arrives inline with the canonical payload, so
            // the synthesized symbols are already as complete as they get.
            {
                let mut sched = self.sched.lock().unwrap();
                for &target in &targets {
                    sched.state_mut(target).finish(TraversalKind::SelfData);
                }
            }
            self.notify_settled();
        } else {
            for &target in &targets {
                if let Err(err) = self.ensure_symbol_data(target).await {
                    first_error.get_or_insert(err);
                }
            }
        }

        if matches!(item.kind, TraversalKind::CallsOut | TraversalKind::CallsIn) {
            let mut graph = self.graph.lock().unwrap();
            graph.ensure_call_edges(item.sym);
        }

        let next_kinds = item.kind.traverse_next();
        if !next_kinds.is_empty() {
            let queued = {
                let mut sched = self.sched.lock().unwrap();
                targets
                    .iter()
                    .map(|&target| sched.plan(task, target, next_kinds))
                    .sum::<usize>()
            };
            if queued > 0 {
                // Idle tokens can start on the follow-ups right away.
                self.spin_up_work();
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

enum Waiter {
    Fetch(watch::Sender<LookupOutcome>),
    Join(watch::Receiver<LookupOutcome>),
}
