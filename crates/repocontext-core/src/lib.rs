//! `repocontext-core`: symbol model, call-graph builder, chunker, and
//! persistence for a language-neutral repository context index.
//!
//! Parsing itself lives in `repocontext-parsers`; this crate owns what
//! happens to a `Vec<FileContext>` once it exists -- cross-file call
//! resolution, chunking, and storage under `.repocontext/`.

pub mod blobstore;
pub mod callgraph;
pub mod chunker;
pub mod config;
pub mod hash;
pub mod manifest;
pub mod pipeline;
pub mod sqlite;
pub mod sqlite_queries;
pub mod store;
pub mod types;

pub use store::RepoContextStore;
pub use types::{
    CallReference, CallRelation, CallType, Constant, Export, ExportKind, FileContext, Function,
    Import, IndexEntry, Manifest, Method, Parameter, RepoContextError, SymbolKind, TypeDef,
    TypeKind, Variable,
};
