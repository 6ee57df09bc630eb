//! Two-pass call-graph construction: same-file resolution first, then a
//! whole-repo pass for anything left unresolved. Both passes are pure
//! functions over `&mut [FileContext]` — no owning references between
//! functions, only names and file paths, so the graph can be cyclic without
//! fighting the borrow checker.

use std::collections::HashMap;

use crate::types::{CallReference, CallType, FileContext};

/// Tail of a (possibly qualified) textual callee: `pkg.Func` -> `Func`,
/// `recv.Method` -> `Method`, `Func` -> `Func`.
fn callee_tail(textual: &str) -> &str {
    textual.rsplit('.').next().unwrap_or(textual)
}

fn operand(textual: &str) -> Option<&str> {
    let mut parts = textual.splitn(2, '.');
    let first = parts.next()?;
    parts.next()?;
    Some(first)
}

/// First pass: resolve call sites against other functions declared in the
/// *same* file. Populates `local_calls`/`local_callers` and the deprecated
/// flat `calls`/`called_by` lists. Leaves non-local-matching, non-external
/// sites in place on `raw_call_sites` for the whole-repo pass.
pub fn build_within_file(file: &mut FileContext) {
    let own_names: HashMap<String, usize> = file
        .functions
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.clone(), i))
        .collect();

    let n = file.functions.len();
    for i in 0..n {
        let sites = file.functions[i].raw_call_sites.clone();
        for site in &sites {
            file.functions[i].calls.push(site.textual.clone());

            if site.call_type == CallType::External {
                continue;
            }

            let tail = callee_tail(&site.textual);
            if let Some(&target_idx) = own_names.get(tail) {
                // A function calling itself (target_idx == i) is still a
                // valid local call and falls through the same path below.
                let target_name = file.functions[target_idx].name.clone();
                let caller_name = file.functions[i].name.clone();

                if !file.functions[i].local_calls.contains(&target_name) {
                    file.functions[i].local_calls.push(target_name.clone());
                }
                if !file.functions[target_idx].local_callers.contains(&caller_name) {
                    file.functions[target_idx].local_callers.push(caller_name.clone());
                }
                if !file.functions[target_idx].called_by.contains(&caller_name) {
                    file.functions[target_idx].called_by.push(caller_name);
                }
            }
        }
    }
}

/// Second pass: for every still-unresolved, non-external call site, look the
/// tail name up across the whole repository. Zero matches: left unresolved
/// (no edge recorded). Exactly one match: a single `CallReference` edge,
/// both directions. More than one: an edge recorded against every candidate
/// (deliberately not disambiguated — name-based resolution never guesses).
pub fn build_across_files(files: &mut [FileContext]) {
    let mut global: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
    for (fi, file) in files.iter().enumerate() {
        for (fni, func) in file.functions.iter().enumerate() {
            global.entry(func.name.clone()).or_default().push((fi, fni));
        }
    }

    let n = files.len();
    for fi in 0..n {
        let m = files[fi].functions.len();
        for fni in 0..m {
            let sites = files[fi].functions[fni].raw_call_sites.clone();
            let already_local: Vec<String> = files[fi].functions[fni].local_calls.clone();

            for site in &sites {
                if site.call_type == CallType::External {
                    continue;
                }
                let tail = callee_tail(&site.textual);
                if already_local.contains(&tail.to_string()) {
                    continue;
                }

                let candidates: Vec<(usize, usize)> = global
                    .get(tail)
                    .map(|v| v.iter().copied().filter(|&(cfi, cfni)| !(cfi == fi && cfni == fni)).collect())
                    .unwrap_or_default();

                if candidates.is_empty() {
                    continue;
                }

                let caller_file = files[fi].path.clone();
                let caller_name = files[fi].functions[fni].name.clone();

                for (cfi, cfni) in candidates {
                    let target_file = files[cfi].path.clone();
                    let target_name = files[cfi].functions[cfni].name.clone();

                    let edge = CallReference {
                        function_name: target_name.clone(),
                        file: target_file.clone(),
                        line: site.line,
                        call_type: site.call_type,
                    };
                    let caller_edge_list = &mut files[fi].functions[fni].cross_file_calls;
                    if !caller_edge_list.contains(&edge) {
                        caller_edge_list.push(edge);
                    }

                    let back_edge = CallReference {
                        function_name: caller_name.clone(),
                        file: caller_file.clone(),
                        line: site.line,
                        call_type: site.call_type,
                    };
                    let callee_back_list = &mut files[cfi].functions[cfni].cross_file_callers;
                    if !callee_back_list.contains(&back_edge) {
                        callee_back_list.push(back_edge);
                    }
                    if !files[cfi].functions[cfni].called_by.contains(&caller_name) {
                        files[cfi].functions[cfni].called_by.push(caller_name.clone());
                    }
                }
            }
        }
    }
}

/// Classify a raw textual callee per §4.1: qualified calls against a known
/// import are external; qualified calls against anything else are method
/// calls; bare identifiers are function calls.
pub fn classify_call(textual: &str, known_imports: &std::collections::BTreeSet<String>) -> CallType {
    match operand(textual) {
        Some(op) if known_imports.contains(op) => CallType::External,
        Some(_) => CallType::Method,
        None => CallType::Function,
    }
}
