// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use super::ids::SymbolId;

/// Knowledge about one source file, keyed by its repo-relative path.
///
/// Mostly a container for the symbols the crossref data places in it; the
/// directory is the unit of module coupling used by the doodlers.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub(crate) serial: u64,
    pub(crate) path: String,
    pub(crate) dir_path: String,
    pub(crate) name: String,
    pub(crate) is_dir: bool,

    /// Symbols whose definition lives in this file.
    pub(crate) symbol_defs: BTreeSet<SymbolId>,
    /// Symbols declared (but not necessarily defined) in this file.
    pub(crate) symbol_decls: BTreeSet<SymbolId>,
}

impl FileInfo {
    pub(crate) fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        // A trailing slash marks a directory listing; the empty final
        // segment must not become the file name.
        let is_dir = path.ends_with('/');
        let trimmed = path.trim_end_matches('/');
        let (dir_path, stem) = match trimmed.rsplit_once('/') {
            Some((dir, stem)) => (dir.to_owned(), stem.to_owned()),
            None => (String::new(), trimmed.to_owned()),
        };
        let name = if is_dir { format!("{stem}/") } else { stem };

        Self {
            serial: 0,
            path,
            dir_path,
            name,
            is_dir,
            symbol_defs: BTreeSet::new(),
            symbol_decls: BTreeSet::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn dir_path(&self) -> &str {
        &self.dir_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn symbol_defs(&self) -> &BTreeSet<SymbolId> {
        &self.symbol_defs
    }

    pub fn symbol_decls(&self) -> &BTreeSet<SymbolId> {
        &self.symbol_decls
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.serial = self.serial.saturating_add(1);
    }
}
