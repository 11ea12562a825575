// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Incremental analysis scheduler: traversal kinds and their chaining
//! rules, rooted analysis tasks, and the token-pooled analyzer that runs
//! them.

pub mod analyzer;
pub mod task;
pub mod traversal;

pub use analyzer::SymbolAnalyzer;
pub use task::{AnalysisTask, WorkItem};
pub use traversal::{AnalysisMode, AnalyzerLimits, TraversalKind, TraversalState};
