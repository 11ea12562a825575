// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Search backend abstraction. The analyzer only ever issues structured
//! queries through [`SearchBackend`], so transports (HTTP, local index,
//! test fixtures) stay interchangeable.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub mod mock;
pub mod payload;

pub use mock::MockSearchBackend;
pub use payload::{RawSymbolPayload, SearchResults};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A structured search request. Rendering to the server's query syntax is
/// centralized here so callers never concatenate query strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchQuery {
    /// Exact-symbol crossref lookup.
    Symbol(String),
    /// Identifier-prefix lookup, for resolving loose ids to symbols.
    Id(String),
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchQuery::Symbol(raw) => write!(f, "symbol:{raw}"),
            SearchQuery::Id(id) => write!(f, "id:{id}"),
        }
    }
}

/// Failure while performing a search. Clone-able because one fetch outcome
/// may be shared with every caller waiting on the same symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchError {
    message: String,
}

impl SearchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "search failed: {}", self.message)
    }
}

impl std::error::Error for SearchError {}

/// Transport for search queries. Implementations must be cheap to share;
/// the analyzer holds one behind an `Arc` and may issue concurrent queries.
pub trait SearchBackend: Send + Sync {
    fn perform_search(&self, query: &SearchQuery) -> BoxFuture<'_, Result<SearchResults, SearchError>>;
}
