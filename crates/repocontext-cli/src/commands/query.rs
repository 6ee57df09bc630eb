use std::path::Path;

use repocontext_core::sqlite::SqliteStore;
use repocontext_core::store::RepoContextStore;
use repocontext_core::types::RepoContextError;

pub fn run(path: &Path, name: &str) -> Result<(), RepoContextError> {
    let repocontext_dir = path.join(".repocontext");
    let store = SqliteStore::open(&repocontext_dir.join("index.db"))?;

    let entries = store.find_by_name(name)?;
    if entries.is_empty() {
        println!("no symbol named '{name}'");
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{} ({}) {}:{}-{}",
            entry.name, entry.kind.as_str(), entry.file, entry.start_line, entry.end_line
        );
        println!("  {}", entry.signature);

        let callers = store.calls_to(&entry.name)?;
        if !callers.is_empty() {
            println!("  called by:");
            for c in &callers {
                println!("    {} ({}:{})", c.caller, c.caller_file, c.line);
            }
        }

        let callees = store.calls_from(&entry.name)?;
        if !callees.is_empty() {
            println!("  calls:");
            for c in &callees {
                println!("    {} ({}:{})", c.callee, c.file, c.line);
            }
        }
    }
    Ok(())
}
