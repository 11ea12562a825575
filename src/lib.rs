// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Client-side knowledge graph over code-search crossref data.
//!
//! `symgrok` incrementally builds an in-memory graph of code symbols by
//! querying a search backend, coordinates overlapping analysis requests
//! through a bitmask-and-token-pool scheduler, and extracts small diagrams
//! (hierarchies, call trees, paths between symbols) from the result.
//!
//! Entry point is [`kb::KnowledgeBase`]; see the README for a worked
//! example.

pub mod analyze;
pub mod diagram;
pub mod kb;
pub mod model;
pub mod search;

pub use kb::{DiagramIntent, GraphDef, KnowledgeBase};
pub use model::{SymbolGraph, SymbolHints, SymbolId};
pub use search::{SearchBackend, SearchError, SearchQuery};
