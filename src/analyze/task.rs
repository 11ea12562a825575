// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::model::SymbolId;
use crate::search::SearchError;

use super::traversal::TraversalKind;

/// One schedulable unit of analysis: walk one edge family out of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub sym: SymbolId,
    pub kind: TraversalKind,
}

#[derive(Debug, Default)]
struct TaskState {
    /// Union of every [`super::AnalysisMode`] mask merged into this task.
    mode_mask: u32,
    todo: VecDeque<WorkItem>,
    active: Vec<WorkItem>,
    /// Items queued over the task's lifetime, duplicates included.
    considered: usize,
    /// Items a worker actually finished.
    traversed: usize,
    active_workers: usize,
    /// Removed from the scheduler's rotation; set once complete.
    descheduled: bool,
    complete: bool,
    errors: Vec<SearchError>,
}

/// A rooted analysis request and its frontier of pending work.
///
/// Several callers may await one task; completion is broadcast through a
/// watch channel. The task is complete exactly when its queue is empty and
/// no worker is mid-traversal, so a worker that plans follow-up items
/// before finishing keeps the task alive.
#[derive(Debug)]
pub struct AnalysisTask {
    root: SymbolId,
    state: Mutex<TaskState>,
    done_tx: watch::Sender<bool>,
}

impl AnalysisTask {
    pub(crate) fn new(root: SymbolId, mode_mask: u32) -> Self {
        let (done_tx, _) = watch::channel(false);
        Self {
            root,
            state: Mutex::new(TaskState {
                mode_mask,
                ..TaskState::default()
            }),
            done_tx,
        }
    }

    pub fn root(&self) -> SymbolId {
        self.root
    }

    pub(crate) fn mode_mask(&self) -> u32 {
        self.state.lock().unwrap().mode_mask
    }

    /// Widen the task to also cover `mask`. Returns the kinds newly added,
    /// so the caller can plan work for them.
    pub(crate) fn merge_mode_mask(&self, mask: u32) -> u32 {
        let mut state = self.state.lock().unwrap();
        let added = mask & !state.mode_mask;
        state.mode_mask |= mask;
        added
    }

    pub(crate) fn push_work(&self, item: WorkItem) {
        let mut state = self.state.lock().unwrap();
        state.considered = state.considered.saturating_add(1);
        state.todo.push_back(item);
    }

    /// Claim the next item for a worker. The item moves to the active list
    /// and the worker count bumps in the same lock hold, so an observer can
    /// never see the queue empty while the item is unaccounted for.
    pub(crate) fn take_todo(&self) -> Option<WorkItem> {
        let mut state = self.state.lock().unwrap();
        let item = state.todo.pop_front()?;
        state.active.push(item);
        state.active_workers += 1;
        Some(item)
    }

    pub(crate) fn has_todo(&self) -> bool {
        !self.state.lock().unwrap().todo.is_empty()
    }

    /// Retire a claimed item. Returns true when this was the last piece of
    /// work and the task just completed.
    pub(crate) fn complete_item(&self, item: WorkItem, error: Option<SearchError>) -> bool {
        let mut state = self.state.lock().unwrap();
        if let Some(pos) = state.active.iter().position(|a| *a == item) {
            state.active.swap_remove(pos);
        }
        state.traversed = state.traversed.saturating_add(1);
        state.active_workers = state.active_workers.saturating_sub(1);
        if let Some(err) = error {
            state.errors.push(err);
        }
        if state.active_workers == 0 && state.todo.is_empty() && !state.complete {
            state.complete = true;
            state.descheduled = true;
            // send_replace stores the value even with no receivers, so a
            // subscriber arriving after completion still reads true.
            self.done_tx.send_replace(true);
            return true;
        }
        false
    }

    pub fn is_complete(&self) -> bool {
        self.state.lock().unwrap().complete
    }

    pub(crate) fn is_descheduled(&self) -> bool {
        self.state.lock().unwrap().descheduled
    }

    /// First error seen while working this task, if any.
    pub fn first_error(&self) -> Option<SearchError> {
        self.state.lock().unwrap().errors.first().cloned()
    }

    /// `(considered, traversed)` counters, mostly for logging and tests.
    pub fn progress(&self) -> (usize, usize) {
        let state = self.state.lock().unwrap();
        (state.considered, state.traversed)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.done_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisTask, WorkItem};
    use crate::analyze::traversal::{AnalysisMode, TraversalKind};
    use crate::model::SymbolId;

    fn item(ix: usize, kind: TraversalKind) -> WorkItem {
        WorkItem {
            sym: SymbolId::from_index(ix),
            kind,
        }
    }

    #[test]
    fn completes_only_when_queue_and_workers_drain() {
        let task = AnalysisTask::new(SymbolId::from_index(0), AnalysisMode::Context.mask());
        task.push_work(item(0, TraversalKind::SelfData));
        task.push_work(item(0, TraversalKind::Superclasses));

        let first = task.take_todo().unwrap();
        let second = task.take_todo().unwrap();
        assert!(task.take_todo().is_none());

        assert!(!task.complete_item(first, None));
        assert!(!task.is_complete());

        assert!(task.complete_item(second, None));
        assert!(task.is_complete());
        assert!(task.is_descheduled());
        assert!(*task.subscribe().borrow());
    }

    #[test]
    fn follow_up_work_keeps_the_task_alive() {
        let task = AnalysisTask::new(SymbolId::from_index(0), AnalysisMode::FromFile.mask());
        task.push_work(item(0, TraversalKind::SelfData));

        let claimed = task.take_todo().unwrap();
        // A worker plans more work before retiring its own item.
        task.push_work(item(1, TraversalKind::SelfData));
        assert!(!task.complete_item(claimed, None));

        let follow_up = task.take_todo().unwrap();
        assert!(task.complete_item(follow_up, None));
    }

    #[test]
    fn merge_mode_mask_reports_only_new_kinds() {
        let task = AnalysisTask::new(SymbolId::from_index(0), AnalysisMode::FromFile.mask());
        let added = task.merge_mode_mask(AnalysisMode::CallsOut.mask());
        assert_eq!(added, TraversalKind::CallsOut.bit());
        assert_eq!(task.merge_mode_mask(AnalysisMode::CallsOut.mask()), 0);
    }

    #[test]
    fn errors_surface_through_first_error() {
        let task = AnalysisTask::new(SymbolId::from_index(0), AnalysisMode::FromFile.mask());
        task.push_work(item(0, TraversalKind::SelfData));
        let claimed = task.take_todo().unwrap();
        task.complete_item(
            claimed,
            Some(crate::search::SearchError::new("backend gone")),
        );
        assert_eq!(task.first_error().unwrap().message(), "backend gone");
    }
}
