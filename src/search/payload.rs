// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Wire types for the search backend's JSON responses. Field names follow
//! the server payload, so deserialization stays a plain serde derive.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level response for one search query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default, rename = "rawResultsList")]
    pub raw_results_list: Vec<RawResult>,
}

impl SearchResults {
    /// All semantic symbol payloads across every raw result bucket.
    pub fn semantic_payloads(&self) -> impl Iterator<Item = (&str, &RawSymbolPayload)> {
        self.raw_results_list
            .iter()
            .flat_map(|r| r.raw.semantic.iter())
            .map(|(name, payload)| (name.as_str(), payload))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResult {
    #[serde(default)]
    pub raw: RawResultData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResultData {
    /// Symbol-keyed crossref payloads. Keys may be comma-delimited unions.
    #[serde(default)]
    pub semantic: BTreeMap<String, RawSymbolPayload>,
    /// Plain file-name matches. Carried but unused by analysis.
    #[serde(default)]
    pub files: Vec<RawFileMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFileMatch {
    #[serde(default)]
    pub path: String,
}

/// Everything the index knows about one symbol.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSymbolPayload {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub meta: Option<RawMeta>,
    /// Symbols this symbol references, with just enough context to seed
    /// graph entries for them.
    #[serde(default)]
    pub consumes: Vec<RawConsume>,
    /// Source hits keyed by category ("defs", "decls", "uses", ...).
    #[serde(default)]
    pub hits: BTreeMap<String, Vec<PathLines>>,
}

/// Structured crossref metadata for a symbol.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMeta {
    #[serde(default)]
    pub pretty: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub parentsym: Option<String>,
    #[serde(default)]
    pub srcsym: Option<String>,
    #[serde(default)]
    pub targetsym: Option<String>,
    #[serde(default)]
    pub idlsym: Option<String>,
    #[serde(default)]
    pub supers: Vec<RawRelated>,
    #[serde(default)]
    pub subclasses: Vec<String>,
    #[serde(default)]
    pub methods: Vec<RawRelated>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub overrides: Vec<RawRelated>,
    #[serde(default, rename = "overriddenBy")]
    pub overridden_by: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Per-platform variant metadata, present only on the canonical symbol.
    #[serde(default)]
    pub variants: Vec<RawMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRelated {
    #[serde(default)]
    pub sym: String,
    #[serde(default)]
    pub pretty: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawField {
    #[serde(default)]
    pub sym: String,
    #[serde(default)]
    pub pretty: Option<String>,
    #[serde(default)]
    pub typesym: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConsume {
    #[serde(default)]
    pub sym: String,
    #[serde(default)]
    pub pretty: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Hits within one file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathLines {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub lines: Vec<LineHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineHit {
    #[serde(default)]
    pub lno: u32,
    /// Column range of the identifier on the line.
    #[serde(default)]
    pub bounds: Option<(u32, u32)>,
    #[serde(default)]
    pub line: String,
    #[serde(default, rename = "peekLines")]
    pub peek_lines: Option<String>,
    /// Pretty name of the enclosing symbol, when known.
    #[serde(default)]
    pub context: Option<String>,
    /// Raw name of the enclosing symbol, when known.
    #[serde(default)]
    pub contextsym: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::SearchResults;

    #[test]
    fn deserializes_a_semantic_result() {
        let body = r#"{
            "rawResultsList": [{
                "raw": {
                    "semantic": {
                        "SYM_widget": {
                            "symbol": "SYM_widget",
                            "meta": {
                                "pretty": "ui::Widget",
                                "kind": "class",
                                "supers": [{"sym": "SYM_base", "pretty": "ui::Base"}],
                                "subclasses": ["SYM_button"],
                                "methods": [{"sym": "SYM_widget_paint", "pretty": "ui::Widget::Paint"}],
                                "fields": [{"sym": "SYM_widget_rect", "pretty": "ui::Widget::mRect", "typesym": "SYM_rect"}],
                                "overriddenBy": ["SYM_other"]
                            },
                            "consumes": [{"sym": "SYM_rect", "pretty": "gfx::Rect", "kind": "class"}],
                            "hits": {
                                "defs": [{
                                    "path": "ui/Widget.cpp",
                                    "lines": [{"lno": 12, "bounds": [6, 12], "line": "class Widget {", "contextsym": null}]
                                }]
                            }
                        }
                    }
                }
            }]
        }"#;

        let results: SearchResults = serde_json::from_str(body).unwrap();
        let (name, payload) = results.semantic_payloads().next().unwrap();
        assert_eq!(name, "SYM_widget");
        let meta = payload.meta.as_ref().unwrap();
        assert_eq!(meta.pretty.as_deref(), Some("ui::Widget"));
        assert_eq!(meta.supers[0].sym, "SYM_base");
        assert_eq!(meta.fields[0].typesym.as_deref(), Some("SYM_rect"));
        assert_eq!(meta.overridden_by, vec!["SYM_other"]);
        let defs = &payload.hits["defs"][0];
        assert_eq!(defs.path, "ui/Widget.cpp");
        assert_eq!(defs.lines[0].bounds, Some((6, 12)));
    }

    #[test]
    fn empty_object_is_a_valid_response() {
        let results: SearchResults = serde_json::from_str("{}").unwrap();
        assert!(results.raw_results_list.is_empty());
        assert_eq!(results.semantic_payloads().count(), 0);
    }
}
