use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a call site was classified by the parser (and possibly upgraded by
/// the call-graph builder once it resolves to a top-level definition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Function,
    Method,
    External,
    Complex,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Function => "function",
            CallType::Method => "method",
            CallType::External => "external",
            CallType::Complex => "complex",
        }
    }
}

impl std::fmt::Display for CallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single resolved call edge with enough metadata to locate the callee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallReference {
    pub function_name: String,
    /// Defining file of the callee; `"external"` for calls to imported packages.
    pub file: String,
    pub line: u32,
    pub call_type: CallType,
}

impl CallReference {
    pub fn is_valid(&self) -> bool {
        !self.function_name.is_empty() && !self.file.is_empty()
    }
}

/// A single call-site discovered by the parser, before the call-graph
/// builder has had a chance to classify it as local, cross-file, or
/// external. Not part of the persisted data model -- consumed and then
/// left in place (harmless, un-serialized) once both builder passes run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCallSite {
    pub textual: String,
    pub line: u32,
    pub call_type: CallType,
}

/// A function parameter or a named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

/// A top-level callable, or a method (receiver folded into `signature`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub signature: String,
    pub parameters: Vec<Parameter>,
    pub returns: Vec<String>,
    pub start_line: u32,
    pub end_line: u32,
    /// Name of the receiver's underlying type, pointer wrappers stripped.
    /// `None` for free functions.
    pub receiver_type: Option<String>,

    pub local_calls: Vec<String>,
    pub cross_file_calls: Vec<CallReference>,
    pub local_callers: Vec<String>,
    pub cross_file_callers: Vec<CallReference>,

    /// Deprecated flat list: every textual callee, local/cross-file/external alike.
    pub calls: Vec<String>,
    /// Deprecated flat list: every caller that named this function.
    pub called_by: Vec<String>,

    #[serde(skip)]
    pub raw_call_sites: Vec<RawCallSite>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            signature: String::new(),
            parameters: Vec::new(),
            returns: Vec::new(),
            start_line: 0,
            end_line: 0,
            receiver_type: None,
            local_calls: Vec::new(),
            cross_file_calls: Vec::new(),
            local_callers: Vec::new(),
            cross_file_callers: Vec::new(),
            calls: Vec::new(),
            called_by: Vec::new(),
            raw_call_sites: Vec::new(),
        }
    }

    pub fn is_method(&self) -> bool {
        self.receiver_type.is_some()
    }
}

/// Same shape as `Function` minus call edges -- a projection hung off
/// `TypeDef::methods` once the receiver's owner type is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: String,
    pub parameters: Vec<Parameter>,
    pub returns: Vec<String>,
    pub start_line: u32,
    pub end_line: u32,
}

impl From<&Function> for Method {
    fn from(f: &Function) -> Self {
        Method {
            name: f.name.clone(),
            signature: f.signature.clone(),
            parameters: f.parameters.clone(),
            returns: f.returns.clone(),
            start_line: f.start_line,
            end_line: f.end_line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Struct,
    Interface,
    Alias,
    Basic,
    Enum,
    Class,
}

/// A user-defined type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    pub fields: Vec<Parameter>,
    pub methods: Vec<Method>,
    pub embedded: Vec<String>,
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub type_name: String,
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub type_name: String,
    pub value: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
}

/// Aliases `.` and `_` are preserved verbatim -- they are not the package name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    pub alias: Option<String>,
}

impl Import {
    /// The name other code would use to refer to this import: the alias if
    /// present, otherwise the final `/`-segment of the path.
    pub fn effective_name(&self) -> &str {
        match &self.alias {
            Some(a) if !a.is_empty() => a.as_str(),
            _ => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }

    pub fn is_dot_import(&self) -> bool {
        matches!(self.alias.as_deref(), Some("."))
    }

    pub fn is_blank_import(&self) -> bool {
        matches!(self.alias.as_deref(), Some("_"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Function,
    Type,
    Variable,
    Constant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub name: String,
    pub type_name: String,
    pub kind: ExportKind,
}

/// The full structured result of parsing one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContext {
    pub path: String,
    pub language: String,
    pub checksum: String,
    pub mod_time: DateTime<Utc>,

    pub functions: Vec<Function>,
    pub types: Vec<TypeDef>,
    pub variables: Vec<Variable>,
    pub constants: Vec<Constant>,
    pub imports: Vec<Import>,
    pub exports: Vec<Export>,
}

impl FileContext {
    pub fn new(path: impl Into<String>, language: impl Into<String>, checksum: String) -> Self {
        FileContext {
            path: path.into(),
            language: language.into(),
            checksum,
            mod_time: Utc::now(),
            functions: Vec::new(),
            types: Vec::new(),
            variables: Vec::new(),
            constants: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
        }
    }

    /// Known import names: aliases (non-empty, not `.`/`_`) plus trailing
    /// path segments for unaliased imports. Used to classify qualified
    /// call sites as external vs. method (§4.1).
    pub fn known_import_names(&self) -> BTreeSet<String> {
        self.imports
            .iter()
            .filter(|i| !i.is_dot_import() && !i.is_blank_import())
            .map(|i| i.effective_name().to_string())
            .collect()
    }

    pub fn function_index(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.name == name)
    }
}

// --------------------------------------------------------------------------
// Index-side entities (component E)
// --------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Type,
    Variable,
    Constant,
    Import,
    Export,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Type => "type",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Import => "import",
            SymbolKind::Export => "export",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "type" => SymbolKind::Type,
            "variable" => SymbolKind::Variable,
            "constant" => SymbolKind::Constant,
            "import" => SymbolKind::Import,
            "export" => SymbolKind::Export,
            _ => return None,
        })
    }
}

/// One row per top-level symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub chunk_id: String,
    pub signature: String,
}

/// One row per resolved call edge (same-file and cross-file alike).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRelation {
    pub caller: String,
    pub callee: String,
    pub file: String,
    pub line: u32,
    pub caller_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRow {
    pub chunk_id: String,
    pub files: Vec<String>,
    pub token_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkInfo {
    pub files: Vec<String>,
    pub size: u64,
    pub token_count: u64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub chunks: std::collections::BTreeMap<String, ChunkInfo>,
    pub updated_at: DateTime<Utc>,
}

impl Manifest {
    pub const CURRENT_VERSION: &'static str = "1.0.0";

    pub fn new() -> Self {
        Manifest {
            version: Self::CURRENT_VERSION.to_string(),
            chunks: std::collections::BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors surfaced to callers of the core.
#[derive(Debug, thiserror::Error)]
pub enum RepoContextError {
    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("io error: {0}")]
    Io(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("cancelled")]
    Cancelled,

    #[error("database error: {0}")]
    Database(String),
}

impl From<std::io::Error> for RepoContextError {
    fn from(e: std::io::Error) -> Self {
        RepoContextError::Io(e.to_string())
    }
}

impl From<rusqlite::Error> for RepoContextError {
    fn from(e: rusqlite::Error) -> Self {
        RepoContextError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_reference_validity() {
        let valid = CallReference {
            function_name: "Helper".into(),
            file: "a.go".into(),
            line: 3,
            call_type: CallType::Function,
        };
        assert!(valid.is_valid());

        let invalid = CallReference {
            function_name: String::new(),
            file: "a.go".into(),
            line: 3,
            call_type: CallType::Function,
        };
        assert!(!invalid.is_valid());
    }

    #[test]
    fn import_effective_name_prefers_alias() {
        let aliased = Import {
            path: "path/filepath".into(),
            alias: Some("fp".into()),
        };
        assert_eq!(aliased.effective_name(), "fp");

        let plain = Import {
            path: "github.com/spf13/cobra".into(),
            alias: None,
        };
        assert_eq!(plain.effective_name(), "cobra");
    }

    #[test]
    fn dot_and_blank_imports_are_not_known_names() {
        let fc = FileContext {
            imports: vec![
                Import { path: "fmt".into(), alias: None },
                Import { path: "x/y".into(), alias: Some(".".into()) },
                Import { path: "x/z".into(), alias: Some("_".into()) },
            ],
            ..FileContext::new("m.go", "go", "deadbeef".into())
        };
        let known = fc.known_import_names();
        assert!(known.contains("fmt"));
        assert!(!known.contains("."));
        assert!(!known.contains("_"));
        assert_eq!(known.len(), 1);
    }
}
