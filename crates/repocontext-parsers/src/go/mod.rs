//! Go support: a single tree-sitter pass collects definitions and call
//! sites, a second (pure Rust, no further parsing) pass folds methods onto
//! their receiver's `TypeDef` and resolves same-file call edges.

use std::collections::HashMap;

use repocontext_core::callgraph::{build_within_file, classify_call};
use repocontext_core::{
    CallType, Constant, Export, ExportKind, FileContext, Function, Import, Method, Parameter,
    TypeDef, TypeKind, Variable,
};
use repocontext_core::types::RawCallSite;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor};

use crate::parser::{LanguageParser, ParseError};
use crate::queries::GO_QUERY;
use crate::treesitter::{node_text, parser_for_go, signature_text, strip_pointer};

pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        GoParser
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for GoParser {
    fn language_name(&self) -> &'static str {
        "go"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &[".go"]
    }

    fn parse_file(&self, path: &str, content: &[u8], checksum: String) -> Result<FileContext, ParseError> {
        let source = std::str::from_utf8(content)
            .map_err(|_| ParseError::Encoding { path: path.to_string() })?;

        let mut parser = parser_for_go()?;
        let tree = parser.parse(source, None).ok_or_else(|| ParseError::Syntax {
            path: path.to_string(),
            message: "tree-sitter failed to produce a tree".to_string(),
        })?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax {
                path: path.to_string(),
                message: "malformed Go source (unbalanced delimiters or other syntax error)".to_string(),
            });
        }

        let query = Query::new(&tree_sitter_go::LANGUAGE.into(), GO_QUERY).map_err(|e| ParseError::Syntax {
            path: path.to_string(),
            message: format!("invalid query: {e}"),
        })?;

        let mut fc = FileContext::new(path, "go", checksum);
        let mut raw_calls: Vec<(u32, RawCallSite)> = Vec::new();

        let names = query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source.as_bytes());
        while let Some(m) = matches.next() {
            for cap in m.captures {
                let cap_name = names[cap.index as usize];
                let node = cap.node;
                match cap_name {
                    "function.def" => {
                        fc.functions.push(build_function(node, source, None));
                    }
                    "method.def" => {
                        let receiver = extract_receiver_type(node, source);
                        fc.functions.push(build_function(node, source, receiver));
                    }
                    "type.def" => {
                        fc.types.push(build_type_def(node, source));
                    }
                    "const.def" => {
                        fc.constants.push(build_constant(node, source));
                    }
                    "var.def" => {
                        fc.variables.push(build_variable(node, source));
                    }
                    "import.def" => {
                        fc.imports.push(build_import(node, source));
                    }
                    "call.def" => {
                        let line = node.start_position().row as u32 + 1;
                        match call_textual(node, source) {
                            Some(CallShape::Named(textual)) => {
                                raw_calls.push((
                                    line,
                                    RawCallSite { textual, line, call_type: CallType::Function },
                                ));
                            }
                            Some(CallShape::Complex(textual)) => {
                                raw_calls.push((
                                    line,
                                    RawCallSite { textual, line, call_type: CallType::Complex },
                                ));
                            }
                            None => {}
                        }
                    }
                    _ => {}
                }
            }
        }

        let known_imports = fc.known_import_names();
        for (line, mut site) in raw_calls {
            if site.call_type != CallType::Complex {
                site.call_type = classify_call(&site.textual, &known_imports);
            }
            attach_call_to_owner(&mut fc, line, site);
        }

        fold_methods_onto_types(&mut fc);
        populate_exports(&mut fc);
        build_within_file(&mut fc);

        Ok(fc)
    }
}

fn build_function(def_node: tree_sitter::Node<'_>, source: &str, receiver_type: Option<String>) -> Function {
    let name_node = def_node.child_by_field_name("name");
    let name = name_node.map(|n| node_text(n, source).to_string()).unwrap_or_default();

    let mut f = Function::new(name);
    f.signature = signature_text(def_node, source);
    f.start_line = def_node.start_position().row as u32 + 1;
    f.end_line = def_node.end_position().row as u32 + 1;
    f.receiver_type = receiver_type;
    f.parameters = extract_parameter_list(def_node.child_by_field_name("parameters"), source);
    f.returns = extract_result(def_node.child_by_field_name("result"), source);
    f
}

fn extract_receiver_type(method_def: tree_sitter::Node<'_>, source: &str) -> Option<String> {
    let receiver_list = method_def.child_by_field_name("receiver")?;
    let mut cursor = receiver_list.walk();
    let decl = receiver_list
        .children(&mut cursor)
        .find(|c| c.kind() == "parameter_declaration")?;
    let type_node = decl.child_by_field_name("type")?;
    Some(strip_pointer(node_text(type_node, source)).to_string())
}

fn extract_parameter_list(params: Option<tree_sitter::Node<'_>>, source: &str) -> Vec<Parameter> {
    let Some(params) = params else { return Vec::new() };
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for decl in params.children(&mut cursor) {
        if decl.kind() != "parameter_declaration" {
            continue;
        }
        let type_text = decl
            .child_by_field_name("type")
            .map(|t| node_text(t, source).to_string())
            .unwrap_or_default();
        let mut name_cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| node_text(n, source).to_string())
            .collect();
        if names.is_empty() {
            // Unnamed parameter (interface method signature, func type, etc.)
            out.push(Parameter { name: String::new(), type_name: type_text });
        } else {
            for name in names {
                out.push(Parameter { name, type_name: type_text.clone() });
            }
        }
    }
    out
}

fn extract_result(result: Option<tree_sitter::Node<'_>>, source: &str) -> Vec<String> {
    let Some(result) = result else { return Vec::new() };
    if result.kind() == "parameter_list" {
        extract_parameter_list(Some(result), source)
            .into_iter()
            .map(|p| p.type_name)
            .collect()
    } else {
        vec![node_text(result, source).to_string()]
    }
}

fn build_type_def(spec: tree_sitter::Node<'_>, source: &str) -> TypeDef {
    let name = spec
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
        .unwrap_or_default();
    let type_node = spec.child_by_field_name("type");

    let (kind, fields, embedded) = match type_node.map(|n| n.kind()) {
        Some("struct_type") => {
            let (f, e) = extract_struct_fields(type_node.unwrap(), source);
            (TypeKind::Struct, f, e)
        }
        Some("interface_type") => (TypeKind::Interface, Vec::new(), Vec::new()),
        Some("type_identifier") | Some("qualified_type") => (TypeKind::Alias, Vec::new(), Vec::new()),
        _ => (TypeKind::Basic, Vec::new(), Vec::new()),
    };

    TypeDef {
        name,
        kind,
        fields,
        methods: Vec::new(),
        embedded,
        start_line: spec.start_position().row as u32 + 1,
        end_line: spec.end_position().row as u32 + 1,
    }
}

fn extract_struct_fields(struct_type: tree_sitter::Node<'_>, source: &str) -> (Vec<Parameter>, Vec<String>) {
    let mut fields = Vec::new();
    let mut embedded = Vec::new();
    let Some(list) = struct_type.child_by_field_name("body") else {
        return (fields, embedded);
    };
    let mut cursor = list.walk();
    for field_decl in list.children(&mut cursor) {
        if field_decl.kind() != "field_declaration" {
            continue;
        }
        let type_text = field_decl
            .child_by_field_name("type")
            .map(|t| node_text(t, source).to_string())
            .unwrap_or_default();
        let mut name_cursor = field_decl.walk();
        let names: Vec<String> = field_decl
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| node_text(n, source).to_string())
            .collect();
        if names.is_empty() {
            embedded.push(strip_pointer(&type_text).to_string());
        } else {
            for name in names {
                fields.push(Parameter { name, type_name: type_text.clone() });
            }
        }
    }
    (fields, embedded)
}

fn build_constant(spec: tree_sitter::Node<'_>, source: &str) -> Constant {
    let name = spec
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
        .unwrap_or_default();
    let explicit_type = spec.child_by_field_name("type").map(|t| node_text(t, source).to_string());
    let value_node = spec.child_by_field_name("value");
    let value = value_node.map(|v| node_text(v, source).to_string());
    let type_name = explicit_type.unwrap_or_else(|| {
        value_node.and_then(infer_literal_type).unwrap_or_default().to_string()
    });

    Constant {
        name,
        type_name,
        value,
        start_line: spec.start_position().row as u32 + 1,
        end_line: spec.end_position().row as u32 + 1,
    }
}

fn infer_literal_type(value: tree_sitter::Node<'_>) -> Option<&'static str> {
    let inner = if value.kind() == "expression_list" { value.named_child(0)? } else { value };
    Some(match inner.kind() {
        "interpreted_string_literal" | "raw_string_literal" => "string",
        "int_literal" => "int",
        "float_literal" => "float64",
        "true" | "false" => "bool",
        "rune_literal" => "rune",
        _ => return None,
    })
}

fn build_variable(spec: tree_sitter::Node<'_>, source: &str) -> Variable {
    let name = spec
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
        .unwrap_or_default();
    let explicit_type = spec.child_by_field_name("type").map(|t| node_text(t, source).to_string());
    let type_name = explicit_type
        .or_else(|| spec.child_by_field_name("value").and_then(infer_literal_type).map(str::to_string))
        .unwrap_or_default();

    Variable {
        name,
        type_name,
        start_line: spec.start_position().row as u32 + 1,
        end_line: spec.end_position().row as u32 + 1,
    }
}

fn build_import(spec: tree_sitter::Node<'_>, source: &str) -> Import {
    let path_raw = spec
        .child_by_field_name("path")
        .map(|n| node_text(n, source))
        .unwrap_or("");
    let path = path_raw.trim_matches('"').trim_matches('`').to_string();
    let alias = spec.child_by_field_name("name").map(|n| node_text(n, source).to_string());
    Import { path, alias }
}

/// What a call site's `function` field looks like, and the textual callee
/// name to record for it. `Complex` shapes (inline-invoked func literals,
/// calls of calls, generic indexing, ...) bypass the function/method/
/// external classification entirely -- there's no name to resolve against.
enum CallShape {
    Named(String),
    Complex(String),
}

fn call_textual(call_def: tree_sitter::Node<'_>, source: &str) -> Option<CallShape> {
    let func = call_def.child_by_field_name("function")?;
    classify_call_shape(func, source)
}

fn classify_call_shape(func: tree_sitter::Node<'_>, source: &str) -> Option<CallShape> {
    match func.kind() {
        "identifier" => Some(CallShape::Named(node_text(func, source).to_string())),
        "selector_expression" => {
            let operand = func.child_by_field_name("operand")?;
            let field = func.child_by_field_name("field")?;
            Some(CallShape::Named(format!("{}.{}", node_text(operand, source), node_text(field, source))))
        }
        "func_literal" => Some(CallShape::Complex("<anonymous>".to_string())),
        "parenthesized_expression" => {
            let inner = func.named_child(0)?;
            if inner.kind() == "func_literal" {
                Some(CallShape::Complex("<anonymous>".to_string()))
            } else {
                Some(CallShape::Complex(outermost_selector_name(inner, source)))
            }
        }
        _ => Some(CallShape::Complex(outermost_selector_name(func, source))),
    }
}

/// Walks down through call-of-a-call and generic-indexing wrappers to find
/// the name at the root of the expression, for use as a `Complex` call's
/// textual callee (e.g. `getHandler()()` -> `"getHandler"`).
fn outermost_selector_name(node: tree_sitter::Node<'_>, source: &str) -> String {
    match node.kind() {
        "identifier" => node_text(node, source).to_string(),
        "selector_expression" => node
            .child_by_field_name("field")
            .map(|f| node_text(f, source).to_string())
            .unwrap_or_else(|| node_text(node, source).to_string()),
        "call_expression" => node
            .child_by_field_name("function")
            .map(|f| outermost_selector_name(f, source))
            .unwrap_or_else(|| node_text(node, source).to_string()),
        "index_expression" | "generic_type" => node
            .child_by_field_name("operand")
            .map(|f| outermost_selector_name(f, source))
            .unwrap_or_else(|| node_text(node, source).to_string()),
        _ => node_text(node, source).to_string(),
    }
}

/// Attaches a classified call site to whichever function's line range
/// contains it -- mirrors the "find the owning chunk by start/end line"
/// technique used for reference attribution elsewhere in the corpus.
fn attach_call_to_owner(fc: &mut FileContext, line: u32, site: RawCallSite) {
    if let Some(func) = fc
        .functions
        .iter_mut()
        .find(|f| line >= f.start_line && line <= f.end_line)
    {
        if !func.raw_call_sites.iter().any(|s| s.textual == site.textual) {
            func.raw_call_sites.push(site);
        }
    }
}

fn fold_methods_onto_types(fc: &mut FileContext) {
    let mut by_receiver: HashMap<String, Vec<Method>> = HashMap::new();
    for f in &fc.functions {
        if let Some(receiver) = &f.receiver_type {
            by_receiver.entry(receiver.clone()).or_default().push(Method::from(f));
        }
    }
    for t in &mut fc.types {
        if let Some(methods) = by_receiver.remove(&t.name) {
            t.methods = methods;
        }
    }
}

/// Go's visibility rule: an identifier is exported iff its first character
/// is uppercase.
fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn populate_exports(fc: &mut FileContext) {
    for f in &fc.functions {
        if f.receiver_type.is_none() && is_exported(&f.name) {
            fc.exports.push(Export {
                name: f.name.clone(),
                type_name: f.signature.clone(),
                kind: ExportKind::Function,
            });
        }
    }
    for t in &fc.types {
        if is_exported(&t.name) {
            fc.exports.push(Export {
                name: t.name.clone(),
                type_name: format!("{:?}", t.kind),
                kind: ExportKind::Type,
            });
        }
    }
    for v in &fc.variables {
        if is_exported(&v.name) {
            fc.exports.push(Export {
                name: v.name.clone(),
                type_name: v.type_name.clone(),
                kind: ExportKind::Variable,
            });
        }
    }
    for c in &fc.constants {
        if is_exported(&c.name) {
            fc.exports.push(Export {
                name: c.name.clone(),
                type_name: c.type_name.clone(),
                kind: ExportKind::Constant,
            });
        }
    }
}
