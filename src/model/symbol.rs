// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Symgrok-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Symgrok and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use smallvec::SmallVec;

use super::ids::{FileId, SymbolId};
use crate::search::payload::RawMeta;

/// Best-effort patterns for decomposing pretty names into component parts.
/// The backend could spoon-feed these parts eventually; until then we guess.
fn re_cpp_symbol() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^((?:[\w() ]+::)*)(\w+)::([\w~]+)$").expect("static regex"))
}

fn re_js_symbol() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^((?:\w+[#.])*)(\w+)#(\w+)$").expect("static regex"))
}

fn starts_lowercase(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_lowercase())
}

/// Class prefixes that start lowercase but still name a class, not a
/// namespace (`nsIFoo`, `mozPersonalDictionary`, ...).
fn has_std_class_prefix(s: &str) -> bool {
    s.starts_with("ns") || s.starts_with("moz")
}

/// The semantic kind reported by the backend for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SemanticKind {
    Class,
    Interface,
    Protocol,
    Struct,
    Enum,
    Union,
    Namespace,
    Method,
    Function,
    Constructor,
    Destructor,
    Field,
    Variable,
    Object,
    #[default]
    Unknown,
}

impl SemanticKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "class" => Self::Class,
            "interface" => Self::Interface,
            "protocol" => Self::Protocol,
            "struct" => Self::Struct,
            "enum" => Self::Enum,
            "union" => Self::Union,
            "namespace" => Self::Namespace,
            "method" => Self::Method,
            "function" => Self::Function,
            "constructor" => Self::Constructor,
            "destructor" => Self::Destructor,
            "field" => Self::Field,
            "variable" => Self::Variable,
            "object" => Self::Object,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Protocol => "protocol",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Namespace => "namespace",
            Self::Method => "method",
            Self::Function => "function",
            Self::Constructor => "constructor",
            Self::Destructor => "destructor",
            Self::Field => "field",
            Self::Variable => "variable",
            Self::Object => "object",
            Self::Unknown => "unknown",
        }
    }

    /// Whether call edges to/from a symbol of this kind are meaningful.
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            Self::Function | Self::Method | Self::Constructor | Self::Destructor
        )
    }
}

impl fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{lno, bounds}` for a def/decl hit; bounds are offsets from the first
/// non-whitespace character on the line, as the backend reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub lno: u32,
    pub bounds: Option<(u32, u32)>,
}

/// One entry of a structured relation list (supers, methods, fields, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedSymbol {
    pub sym: SymbolId,
    /// Pretty name as reported inline in the relation meta, when present.
    pub pretty: Option<String>,
    /// Field type symbol (`typesym`); only populated for field relations.
    pub type_sym: Option<SymbolId>,
}

impl RelatedSymbol {
    pub fn new(sym: SymbolId) -> Self {
        Self {
            sym,
            pretty: None,
            type_sym: None,
        }
    }
}

pub(crate) type NameParts = SmallVec<[String; 4]>;

/// Live-updating knowledge about one code symbol.
///
/// Identity is the raw (usually mangled) backend symbol name; there is exactly
/// one `SymbolInfo` per raw name within a graph. Everything else fills in as
/// crossref payloads are ingested.
///
/// Scheduler state deliberately does NOT live here: the analyzer keeps its
/// traversal bitmasks in a side table keyed by [`SymbolId`], so several
/// analyzers could in principle walk one graph.
#[derive(Debug, Clone, Default)]
pub struct SymbolInfo {
    /// Bumped on every mutation; consumers cache derived state against it.
    pub(crate) serial: u64,

    pub(crate) raw_name: String,

    /// Fully qualified human-readable name, as a debugger would print it.
    pub(crate) full_name: Option<String>,
    /// Class-qualified name for members (`Class::method`), bare class name
    /// for classes.
    pub(crate) simple_name: Option<String>,
    /// Owning namespace; for members this is the namespace of the class.
    pub(crate) namespace: Option<String>,
    /// Containing class for members; the class itself for classes.
    pub(crate) class_name: Option<String>,
    /// Member name without the class, `None` for classes/namespaces.
    pub(crate) local_name: Option<String>,
    pub(crate) fully_qualified_parts: NameParts,

    pub(crate) semantic_kind: SemanticKind,
    pub(crate) platforms: Vec<String>,

    /// Structured relations from the crossref meta. `None` until the meta
    /// has been seen, `Some(vec)` afterwards (possibly empty).
    pub(crate) supers: Option<Vec<RelatedSymbol>>,
    pub(crate) subclasses: Option<Vec<RelatedSymbol>>,
    pub(crate) methods: Option<Vec<RelatedSymbol>>,
    pub(crate) fields: Option<Vec<RelatedSymbol>>,
    pub(crate) overrides: Option<Vec<RelatedSymbol>>,
    pub(crate) overridden_by: Option<Vec<RelatedSymbol>>,

    pub(crate) parent_sym: Option<SymbolId>,
    pub(crate) src_sym: Option<SymbolId>,
    pub(crate) target_sym: Option<SymbolId>,
    pub(crate) idl_sym: Option<SymbolId>,

    /// Platform variant symbols synthesized from the meta; the back-link
    /// marks a synthesized variant itself.
    pub(crate) variants: Option<Vec<SymbolId>>,
    pub(crate) canon_variant: Option<SymbolId>,
    /// Raw per-variant metas held until the VARIANTS traversal runs.
    pub(crate) pending_variants: Vec<RawMeta>,

    /// Unfiltered adjacency. `calls_out_to`/`receives_calls_from` are the
    /// derived view filtered to callable, non-boring peers.
    pub(crate) out_edges: BTreeSet<SymbolId>,
    pub(crate) in_edges: BTreeSet<SymbolId>,
    pub(crate) calls_out_to: BTreeSet<SymbolId>,
    pub(crate) receives_calls_from: BTreeSet<SymbolId>,
    /// Serial the call-edge view was last derived at.
    pub(crate) calls_filtered_serial: Option<u64>,

    pub(crate) def_peek: Option<String>,
    pub(crate) def_location: Option<SourceLocation>,
    pub(crate) source_file: Option<FileId>,
    pub(crate) decl_peek: Option<String>,
    pub(crate) decl_location: Option<SourceLocation>,
    pub(crate) decl_file: Option<FileId>,

    /// Unimportant for program-level understanding (string helpers, refcount
    /// plumbing, assertions, trivial accessors). Boring symbols are excluded
    /// from derived call edges.
    pub(crate) is_boring: bool,
}

impl SymbolInfo {
    pub(crate) fn new(raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            ..Self::default()
        }
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn simple_name(&self) -> Option<&str> {
        self.simple_name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    pub fn fully_qualified_parts(&self) -> &[String] {
        &self.fully_qualified_parts
    }

    pub fn semantic_kind(&self) -> SemanticKind {
        self.semantic_kind
    }

    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn is_boring(&self) -> bool {
        self.is_boring
    }

    pub fn is_callable(&self) -> bool {
        self.semantic_kind.is_callable()
    }

    pub fn supers(&self) -> Option<&[RelatedSymbol]> {
        self.supers.as_deref()
    }

    pub fn subclasses(&self) -> Option<&[RelatedSymbol]> {
        self.subclasses.as_deref()
    }

    pub fn methods(&self) -> Option<&[RelatedSymbol]> {
        self.methods.as_deref()
    }

    pub fn fields(&self) -> Option<&[RelatedSymbol]> {
        self.fields.as_deref()
    }

    pub fn overrides(&self) -> Option<&[RelatedSymbol]> {
        self.overrides.as_deref()
    }

    pub fn overridden_by(&self) -> Option<&[RelatedSymbol]> {
        self.overridden_by.as_deref()
    }

    pub fn parent_sym(&self) -> Option<SymbolId> {
        self.parent_sym
    }

    pub fn variants(&self) -> Option<&[SymbolId]> {
        self.variants.as_deref()
    }

    pub fn canon_variant(&self) -> Option<SymbolId> {
        self.canon_variant
    }

    pub fn out_edges(&self) -> &BTreeSet<SymbolId> {
        &self.out_edges
    }

    pub fn in_edges(&self) -> &BTreeSet<SymbolId> {
        &self.in_edges
    }

    /// Filtered call edges; only valid after
    /// [`SymbolGraph::ensure_call_edges`](super::SymbolGraph::ensure_call_edges)
    /// for the current serial.
    pub fn calls_out_to(&self) -> &BTreeSet<SymbolId> {
        &self.calls_out_to
    }

    pub fn receives_calls_from(&self) -> &BTreeSet<SymbolId> {
        &self.receives_calls_from
    }

    pub fn def_peek(&self) -> Option<&str> {
        self.def_peek.as_deref()
    }

    pub fn def_location(&self) -> Option<SourceLocation> {
        self.def_location
    }

    pub fn source_file(&self) -> Option<FileId> {
        self.source_file
    }

    pub fn decl_peek(&self) -> Option<&str> {
        self.decl_peek.as_deref()
    }

    pub fn decl_location(&self) -> Option<SourceLocation> {
        self.decl_location
    }

    pub fn decl_file(&self) -> Option<FileId> {
        self.decl_file
    }

    /// The best display name currently known.
    pub fn prettiest_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.raw_name)
    }

    pub fn is_same_class_as(&self, other: &SymbolInfo) -> bool {
        match (&self.class_name, &other.class_name) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// False when either side's defining file is unknown.
    pub fn is_same_source_file_as(&self, other: &SymbolInfo) -> bool {
        match (self.source_file, other.source_file) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.serial = self.serial.saturating_add(1);
    }

    /// Decompose a pretty name into namespace/class/local parts, picking the
    /// C++ or JS pattern based on the path hint or the name's own shape.
    pub(crate) fn update_pretty_name(&mut self, pretty: &str, path_hint: Option<&str>) {
        let is_js = match path_hint {
            Some(path) => path.ends_with(".js"),
            None => pretty.contains('#') || !pretty.contains(':'),
        };

        let (namespace, class_name, local_name) = if is_js {
            match re_js_symbol().captures(pretty) {
                Some(caps) => {
                    let ns = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                    let ns = ns.trim_end_matches(['#', '.']);
                    (
                        (!ns.is_empty()).then(|| ns.to_owned()),
                        caps[2].to_owned(),
                        Some(caps[3].to_owned()),
                    )
                }
                None => (None, pretty.to_owned(), None),
            }
        } else {
            match re_cpp_symbol().captures(pretty) {
                Some(caps) => {
                    let ns = caps[1].trim_end_matches(':');
                    let ns = (!ns.is_empty()).then(|| ns.to_owned());
                    // A lowercase "class" is usually one more namespace level,
                    // unless it carries a conventional class prefix.
                    if starts_lowercase(&caps[2]) && !has_std_class_prefix(&caps[2]) {
                        let ns = match ns {
                            Some(ns) => format!("{ns}::{}", &caps[2]),
                            None => caps[2].to_owned(),
                        };
                        (Some(ns), caps[3].to_owned(), None)
                    } else {
                        (ns, caps[2].to_owned(), Some(caps[3].to_owned()))
                    }
                }
                None => (None, pretty.to_owned(), None),
            }
        };

        let mut parts = NameParts::new();
        if let Some(ns) = &namespace {
            let sep: &[char] = if is_js { &['.', '#'] } else { &[':'] };
            parts.extend(ns.split(sep).filter(|p| !p.is_empty()).map(str::to_owned));
        }
        parts.push(class_name.clone());
        if let Some(local) = &local_name {
            parts.push(local.clone());
        }

        self.full_name = Some(pretty.to_owned());
        self.namespace = namespace;
        self.simple_name = Some(match &local_name {
            Some(local) => format!("{class_name}::{local}"),
            None => class_name.clone(),
        });
        self.class_name = Some(class_name);
        self.local_name = local_name;
        self.fully_qualified_parts = parts;

        self.update_boring(None);
        self.mark_dirty();
    }

    pub(crate) fn update_semantic_kind(&mut self, kind: SemanticKind) {
        self.semantic_kind = kind;
        self.mark_dirty();
    }

    /// Refresh `is_boring` from what is currently known. Monotonic: once a
    /// symbol looks boring it stays boring.
    pub(crate) fn update_boring(&mut self, def_path: Option<&str>) {
        if let Some(path) = def_path {
            if path.starts_with("xpcom/string")
                || path.starts_with("mfbt/Ref")
                || (path.starts_with("mfbt/") && path.contains("Ptr"))
            {
                self.is_boring = true;
            }
        }
        if let Some(local) = &self.local_name {
            // Get/Set could each hide real work, but most are straight
            // accessors; a complexity measure would do better here.
            if local.starts_with("Assert")
                || local.starts_with("Is")
                || local.starts_with("Get")
                || local.starts_with("Set")
                || local == "AddRef"
                || local == "Release"
            {
                self.is_boring = true;
            }
        }
        if let Some(full) = &self.full_name {
            if full.starts_with("nsCOMPtr")
                || full.starts_with("RefPtr")
                || full.starts_with("getter_AddRefs")
                || full.starts_with("mozilla::UniquePtr")
            {
                self.is_boring = true;
            }
        }
    }
}
