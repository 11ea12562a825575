// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory [`SearchBackend`] backed by fixture payloads. Public because
//! integration tests and example harnesses drive the crate through it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::payload::SearchResults;
use super::{BoxFuture, SearchBackend, SearchError, SearchQuery};

#[derive(Default)]
pub struct MockSearchBackend {
    fixtures: Mutex<BTreeMap<String, SearchResults>>,
    counts: Mutex<BTreeMap<String, usize>>,
    total: AtomicUsize,
    outstanding: AtomicUsize,
    peak_outstanding: AtomicUsize,
    latency: Option<Duration>,
}

impl MockSearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every query take `latency` to resolve. Pairs with tokio's
    /// paused-clock test mode to exercise overlap without real waiting.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Register the response for a query, keyed by its rendered form
    /// (for example `"symbol:SYM_widget"`).
    pub fn add_fixture(&self, query: impl Into<String>, results: SearchResults) {
        self.fixtures
            .lock()
            .unwrap()
            .insert(query.into(), results);
    }

    /// Register a response from raw JSON, panicking on malformed fixtures.
    pub fn add_json_fixture(&self, query: impl Into<String>, body: &str) {
        let results: SearchResults =
            serde_json::from_str(body).expect("fixture JSON must parse");
        self.add_fixture(query, results);
    }

    /// How many times `query` has been performed.
    pub fn query_count(&self, query: &str) -> usize {
        self.counts.lock().unwrap().get(query).copied().unwrap_or(0)
    }

    /// Total queries performed across all fixtures.
    pub fn total_queries(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Largest number of queries that were ever in flight at once.
    pub fn peak_outstanding(&self) -> usize {
        self.peak_outstanding.load(Ordering::SeqCst)
    }
}

impl SearchBackend for MockSearchBackend {
    fn perform_search(
        &self,
        query: &SearchQuery,
    ) -> BoxFuture<'_, Result<SearchResults, SearchError>> {
        let rendered = query.to_string();
        Box::pin(async move {
            self.total.fetch_add(1, Ordering::SeqCst);
            let in_flight = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_outstanding.fetch_max(in_flight, Ordering::SeqCst);
            *self.counts.lock().unwrap().entry(rendered.clone()).or_insert(0) += 1;
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            let fixture = self.fixtures.lock().unwrap().get(&rendered).cloned();
            self.outstanding.fetch_sub(1, Ordering::SeqCst);
            match fixture {
                Some(results) => Ok(results),
                // A symbol with no crossref data gets an empty fixture;
                // a query with no fixture at all is a test bug or a
                // simulated backend failure.
                None => Err(SearchError::new(format!("no fixture for `{rendered}`"))),
            }
        })
    }
}
