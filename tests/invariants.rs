#[path = "common/mod.rs"]
mod common;

use repocontext_core::hash::{checksum_bytes, chunk_id_for_path};
use repocontext_core::pipeline::{self, CancellationToken};
use repocontext_core::sqlite::SqliteStore;
use repocontext_core::store::RepoContextStore;
use repocontext_parsers::registry::Registry;

fn parse(root: &std::path::Path, rel: &str) -> repocontext_core::types::FileContext {
    let registry = Registry::with_default_languages();
    let bytes = std::fs::read(root.join(rel)).unwrap();
    let checksum = checksum_bytes(&bytes);
    registry.parser_for(rel).unwrap().parse_file(rel, &bytes, checksum).unwrap()
}

/// Every cross-file call edge on the caller side has a matching reciprocal
/// entry on the callee side.
#[test]
fn invariant_cross_file_edges_are_reciprocal() {
    let (_dir, root) = common::write_project(&[
        ("a.go", "package main\n\nfunc main() {\n\tRun()\n}\n"),
        ("b.go", "package main\n\nfunc Run() {}\n"),
    ]);

    let files = vec![parse(&root, "a.go"), parse(&root, "b.go")];
    let repocontext_dir = root.join(".repocontext");
    pipeline::run(files, &repocontext_dir, &CancellationToken::new()).unwrap();

    let store = SqliteStore::open(&repocontext_dir.join("index.db")).unwrap();
    let from_main = store.calls_from("main").unwrap();
    let to_run = store.calls_to("Run").unwrap();
    assert_eq!(from_main.len(), 1);
    assert_eq!(to_run.len(), 1);
    assert_eq!(from_main[0].caller_file, to_run[0].caller_file);
}

/// chunk_id is always `"chunk_" + 16 lowercase hex characters` and stable
/// for a given path regardless of unrelated repository state.
#[test]
fn invariant_chunk_id_shape_is_stable() {
    let id = chunk_id_for_path("cmd/main.go");
    assert_eq!(id.len(), 22);
    assert!(id.starts_with("chunk_"));
    assert!(id[6..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
}

/// Checksums are pure functions of content: same bytes, same checksum,
/// regardless of how many times it's computed.
#[test]
fn invariant_checksum_is_a_pure_function_of_content() {
    let content = b"package main\n\nfunc main() {}\n";
    let a = checksum_bytes(content);
    let b = checksum_bytes(content);
    let c = checksum_bytes(content);
    assert_eq!(a, b);
    assert_eq!(b, c);
}

/// A function never lists itself twice in `local_calls` even if it calls the
/// same sibling multiple times.
#[test]
fn invariant_local_calls_are_deduplicated_per_function() {
    let (_dir, root) = common::write_project(&[(
        "main.go",
        "package main\n\nfunc main() {\n\tprocess()\n\tprocess()\n\tprocess()\n}\n\nfunc process() {}\n",
    )]);
    let fc = parse(&root, "main.go");
    let main_fn = fc.functions.iter().find(|f| f.name == "main").unwrap();
    assert_eq!(main_fn.local_calls, vec!["process".to_string()]);
}

/// A rebuild over a file whose contents didn't change does not duplicate its
/// index rows (upsert, not insert).
#[test]
fn invariant_rebuild_does_not_duplicate_index_rows() {
    let (_dir, root) = common::write_project(&[("main.go", "package main\n\nfunc main() {}\n")]);
    let repocontext_dir = root.join(".repocontext");

    pipeline::run(vec![parse(&root, "main.go")], &repocontext_dir, &CancellationToken::new()).unwrap();
    pipeline::run(vec![parse(&root, "main.go")], &repocontext_dir, &CancellationToken::new()).unwrap();

    let store = SqliteStore::open(&repocontext_dir.join("index.db")).unwrap();
    assert_eq!(store.find_by_name("main").unwrap().len(), 1);
}
