// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model: symbol and file records, the id arena that owns them,
//! and the name decomposition rules shared across the crate.

pub mod file;
pub mod graph;
pub mod ids;
pub mod symbol;

pub use file::FileInfo;
pub use graph::{SymbolGraph, SymbolHints};
pub use ids::{FileId, SymbolId};
pub use symbol::{RelatedSymbol, SemanticKind, SourceLocation, SymbolInfo};
