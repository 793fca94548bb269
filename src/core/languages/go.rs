use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;
use tracing::trace;
use tree_sitter::{Node, Parser};

use crate::error::{CallsliceError, Result};
use super::{LanguageFrontend, ModuleSymbols, PackageNames, ParsedSource, TypeKey, TypeTable};
use super::super::{CallSite, CompilationUnit, FunctionBody, FunctionDecl, LineSpan, SymbolId};

/// Predeclared functions; calls to these never name a package function
const BUILTINS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

/// Node kinds that close the scope of a declaration made directly inside them
const SCOPE_KINDS: &[&str] = &[
    "block",
    "if_statement",
    "for_statement",
    "expression_switch_statement",
    "type_switch_statement",
    "select_statement",
    "expression_case",
    "type_case",
    "default_case",
    "communication_case",
    "func_literal",
    "function_declaration",
    "method_declaration",
];

/// Go frontend using Tree-sitter
pub struct GoFrontend {
    parser: Parser,
}

impl GoFrontend {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| CallsliceError::Parser(format!("Failed to set Go language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl LanguageFrontend for GoFrontend {
    fn parse(&mut self, content: String, file_path: &Path) -> Result<ParsedSource> {
        let tree = self.parser.parse(&content, None).ok_or_else(|| {
            CallsliceError::Parser(format!("Failed to parse {}", file_path.display()))
        })?;

        let package_name = package_clause(tree.root_node(), &content);

        Ok(ParsedSource {
            path: file_path.to_path_buf(),
            source: content,
            tree,
            package_name,
        })
    }

    fn declared_types(
        &self,
        parsed: &ParsedSource,
        package_path: &str,
        packages: &PackageNames,
    ) -> TypeTable {
        let root = parsed.tree.root_node();
        let none = TypeTable::default();
        let unit = UnitContext {
            source: &parsed.source,
            path: &parsed.path,
            package: package_path,
            imports: collect_imports(root, &parsed.source, packages),
            types: &none,
        };

        let mut table = TypeTable::default();
        for child in named_children(root) {
            match child.kind() {
                "var_declaration" => {
                    for spec in specs(child, "var_spec", "var_spec_list") {
                        unit.declare_vars(spec, &mut table);
                    }
                }
                "type_declaration" => {
                    for spec in specs(child, "type_spec", "type_spec_list") {
                        unit.declare_fields(spec, &mut table);
                    }
                }
                _ => {}
            }
        }
        table
    }

    fn resolve_unit(
        &self,
        parsed: &ParsedSource,
        package_path: &str,
        symbols: &ModuleSymbols,
    ) -> CompilationUnit {
        let root = parsed.tree.root_node();
        let unit = UnitContext {
            source: &parsed.source,
            path: &parsed.path,
            package: package_path,
            imports: collect_imports(root, &parsed.source, &symbols.packages),
            types: &symbols.types,
        };

        let mut functions = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if matches!(child.kind(), "function_declaration" | "method_declaration") {
                if let Some(decl) = unit.function_decl(child) {
                    functions.push(decl);
                }
            }
        }

        CompilationUnit {
            path: parsed.path.clone(),
            functions,
        }
    }

    fn file_extensions(&self) -> &[&str] {
        &["go"]
    }

    fn language_name(&self) -> &str {
        "go"
    }
}

/// Per-file resolution context
struct UnitContext<'a> {
    source: &'a str,
    path: &'a Path,
    package: &'a str,
    /// Local import name → import path
    imports: HashMap<String, String>,
    /// Package-level declarations of the whole module
    types: &'a TypeTable,
}

impl<'a> UnitContext<'a> {
    fn text(&self, node: Node) -> &'a str {
        &self.source[node.byte_range()]
    }

    fn function_decl(&self, node: Node) -> Option<FunctionDecl> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        let span = line_span(node);

        let mut id = match node.kind() {
            "method_declaration" => {
                let receiver = node
                    .child_by_field_name("receiver")
                    .and_then(|r| self.receiver_type(r))?;
                SymbolId::method(self.package, receiver, name)
            }
            _ => SymbolId::function(self.package, name),
        };
        // Go allows several of these per package
        if id.name == "init" || id.name == "_" {
            id = id.at(self.path.to_path_buf(), span.start);
        }

        let body = node.child_by_field_name("body").map(|body| FunctionBody {
            calls: self.collect_calls(node, body),
        });

        Some(FunctionDecl {
            id,
            doc: doc_spans(node),
            span,
            body,
        })
    }

    fn receiver_type(&self, receiver: Node) -> Option<String> {
        let mut cursor = receiver.walk();
        let param = receiver
            .named_children(&mut cursor)
            .find(|n| n.kind() == "parameter_declaration")?;
        let mut ty = param.child_by_field_name("type")?;
        loop {
            match ty.kind() {
                "pointer_type" | "parenthesized_type" => ty = ty.named_child(0)?,
                "generic_type" => ty = ty.child_by_field_name("type")?,
                "type_identifier" => return Some(self.text(ty).to_string()),
                _ => return None,
            }
        }
    }

    /// Resolve every call expression of `body` in source pre-order
    fn collect_calls(&self, decl: Node, body: Node) -> Vec<CallSite> {
        let nodes = preorder(body);
        let scope = self.build_scope(decl, body, &nodes);

        let mut calls = Vec::new();
        for node in nodes.iter().filter(|n| n.kind() == "call_expression") {
            let Some(callee) = node.child_by_field_name("function") else {
                continue;
            };
            let target = self.resolve_callee(callee, &scope);
            trace!(
                "{}:{} call {} -> {:?}",
                self.path.display(),
                node.start_position().row + 1,
                self.text(callee),
                target
            );
            calls.push(CallSite {
                target,
                line: node.start_position().row + 1,
            });
        }
        calls
    }

    fn resolve_callee(&self, callee: Node, scope: &Scope) -> Option<SymbolId> {
        let at = callee.start_byte();
        let mut callee = callee;
        // Explicit instantiation: F[T](...)
        while callee.kind() == "index_expression" {
            callee = callee.child_by_field_name("operand")?;
        }

        match callee.kind() {
            "identifier" => {
                let name = self.text(callee);
                if scope.lookup(name, at).is_some() || BUILTINS.contains(&name) {
                    return None;
                }
                Some(SymbolId::function(self.package, name))
            }
            "selector_expression" => {
                let operand = callee.child_by_field_name("operand")?;
                let method = self.text(callee.child_by_field_name("field")?);

                if operand.kind() == "identifier" {
                    let qualifier = self.text(operand);
                    if scope.lookup(qualifier, at).is_none() {
                        if let Some(path) = self.imports.get(qualifier) {
                            return Some(SymbolId::function(path.as_str(), method));
                        }
                        if self.types.var(self.package, qualifier).is_none() {
                            // Method expression T.M
                            return Some(SymbolId::method(self.package, qualifier, method));
                        }
                    }
                }
                let ty = self.expr_type(operand, scope, at)?;
                Some(SymbolId::method(ty.package, ty.name, method))
            }
            _ => None,
        }
    }

    /// Named type of an identifier or a field chain such as `s.repo.db`
    fn expr_type(&self, expr: Node, scope: &Scope, at: usize) -> Option<TypeKey> {
        // Outermost field first
        let mut fields = Vec::new();
        let mut base = expr;
        loop {
            match base.kind() {
                "selector_expression" => {
                    fields.push(self.text(base.child_by_field_name("field")?));
                    base = base.child_by_field_name("operand")?;
                }
                "parenthesized_expression" => base = base.named_child(0)?,
                _ => break,
            }
        }
        if base.kind() != "identifier" {
            return None;
        }

        let name = self.text(base);
        let mut ty = match scope.lookup(name, at) {
            Some(binding) => binding.ty.clone()?,
            None => match self.imports.get(name) {
                Some(path) => self.types.var(path, fields.pop()?)?.clone(),
                None => self.types.var(self.package, name)?.clone(),
            },
        };
        while let Some(field) = fields.pop() {
            ty = self.types.field(&ty, field)?.clone();
        }
        Some(ty)
    }

    fn declare_vars(&self, spec: Node, table: &mut TypeTable) {
        let declared = spec.child_by_field_name("type").and_then(|t| self.type_key(t));
        let values = spec
            .child_by_field_name("value")
            .map(named_children)
            .unwrap_or_default();
        for (i, name) in self.field_names(spec).into_iter().enumerate() {
            let ty = declared
                .clone()
                .or_else(|| values.get(i).and_then(|v| self.infer_type(*v)));
            if let Some(ty) = ty {
                table.declare_var(self.package, &name, ty);
            }
        }
    }

    fn declare_fields(&self, spec: Node, table: &mut TypeTable) {
        if spec.kind() != "type_spec" {
            return;
        }
        let (Some(name), Some(ty)) = (
            spec.child_by_field_name("name"),
            spec.child_by_field_name("type"),
        ) else {
            return;
        };
        if ty.kind() != "struct_type" {
            return;
        }
        let owner = TypeKey::new(self.package, self.text(name));
        let Some(list) = named_children(ty)
            .into_iter()
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return;
        };

        for field in named_children(list)
            .into_iter()
            .filter(|n| n.kind() == "field_declaration")
        {
            let Some(field_ty) = field.child_by_field_name("type").and_then(|t| self.type_key(t))
            else {
                continue;
            };
            let names = self.field_names(field);
            if names.is_empty() {
                // Embedded field, named after its type
                let embedded = field_ty.name.clone();
                table.declare_field(owner.clone(), &embedded, field_ty);
                continue;
            }
            for field_name in names {
                table.declare_field(owner.clone(), &field_name, field_ty.clone());
            }
        }
    }

    /// Collect every local name declared by the function, with its visibility range
    fn build_scope(&self, decl: Node, body: Node, nodes: &[Node]) -> Scope {
        let mut scope = Scope::default();
        let body_range = body.start_byte()..body.end_byte();

        for field in ["receiver", "parameters", "result"] {
            if let Some(list) = decl.child_by_field_name(field) {
                self.bind_parameters(list, body_range.clone(), &mut scope);
            }
        }

        for node in nodes {
            match node.kind() {
                "short_var_declaration" => {
                    let left = node
                        .child_by_field_name("left")
                        .map(|n| self.identifiers(n))
                        .unwrap_or_default();
                    let right = node
                        .child_by_field_name("right")
                        .map(named_children)
                        .unwrap_or_default();
                    let visible = node.end_byte()..scope_end(*node);
                    let positional = left.len() == right.len();
                    for (i, name) in left.into_iter().enumerate() {
                        let ty = if positional {
                            self.infer_type(right[i])
                        } else {
                            None
                        };
                        scope.bind(name, ty, visible.clone());
                    }
                }
                "var_spec" | "const_spec" => {
                    let declared = node.child_by_field_name("type").and_then(|t| self.type_key(t));
                    let values = node
                        .child_by_field_name("value")
                        .map(named_children)
                        .unwrap_or_default();
                    let visible = node.end_byte()..scope_end(*node);
                    for (i, name) in self.field_names(*node).into_iter().enumerate() {
                        let ty = declared
                            .clone()
                            .or_else(|| values.get(i).and_then(|v| self.infer_type(*v)));
                        scope.bind(name, ty, visible.clone());
                    }
                }
                "type_spec" | "type_alias" => {
                    for name in self.field_names(*node) {
                        scope.bind(name, None, node.start_byte()..scope_end(*node));
                    }
                }
                "range_clause" => {
                    if let Some(left) = node.child_by_field_name("left") {
                        let visible = node.end_byte()..scope_end(*node);
                        for name in self.identifiers(left) {
                            scope.bind(name, None, visible.clone());
                        }
                    }
                }
                "type_switch_statement" => {
                    if let Some(alias) = node.child_by_field_name("alias") {
                        let visible = alias.end_byte()..node.end_byte();
                        for name in self.identifiers(alias) {
                            scope.bind(name, None, visible.clone());
                        }
                    }
                }
                "receive_statement" => {
                    if let Some(left) = node.child_by_field_name("left") {
                        let visible = node.end_byte()..scope_end(*node);
                        for name in self.identifiers(left) {
                            scope.bind(name, None, visible.clone());
                        }
                    }
                }
                "func_literal" => {
                    let Some(inner) = node.child_by_field_name("body") else {
                        continue;
                    };
                    let inner_range = inner.start_byte()..inner.end_byte();
                    for field in ["parameters", "result"] {
                        if let Some(list) = node.child_by_field_name(field) {
                            self.bind_parameters(list, inner_range.clone(), &mut scope);
                        }
                    }
                }
                _ => {}
            }
        }

        scope
    }

    fn bind_parameters(&self, list: Node, visible: Range<usize>, scope: &mut Scope) {
        if list.kind() != "parameter_list" {
            return;
        }
        for param in named_children(list) {
            let ty = match param.kind() {
                "parameter_declaration" => {
                    param.child_by_field_name("type").and_then(|t| self.type_key(t))
                }
                "variadic_parameter_declaration" => None,
                _ => continue,
            };
            for name in self.field_names(param) {
                scope.bind(name, ty.clone(), visible.clone());
            }
        }
    }

    fn field_names(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        node.children_by_field_name("name", &mut cursor)
            .map(|n| self.text(n).to_string())
            .collect()
    }

    fn identifiers(&self, list: Node) -> Vec<String> {
        if list.kind() == "identifier" {
            return vec![self.text(list).to_string()];
        }
        named_children(list)
            .into_iter()
            .filter(|n| n.kind() == "identifier")
            .map(|n| self.text(n).to_string())
            .collect()
    }

    /// Named type behind pointers, parentheses and type arguments
    fn type_key(&self, node: Node) -> Option<TypeKey> {
        let mut node = node;
        loop {
            match node.kind() {
                "pointer_type" | "parenthesized_type" => node = node.named_child(0)?,
                "generic_type" => node = node.child_by_field_name("type")?,
                "type_identifier" => return Some(TypeKey::new(self.package, self.text(node))),
                "qualified_type" => {
                    let alias = self.text(node.child_by_field_name("package")?);
                    let name = self.text(node.child_by_field_name("name")?);
                    return Some(TypeKey::new(self.imports.get(alias)?.as_str(), name));
                }
                _ => return None,
            }
        }
    }

    /// Named type of `T{}`, `&T{}` or `new(T)`
    fn infer_type(&self, expr: Node) -> Option<TypeKey> {
        match expr.kind() {
            "composite_literal" => self.type_key(expr.child_by_field_name("type")?),
            "unary_expression" => {
                let operator = expr.child_by_field_name("operator")?;
                let operand = expr.child_by_field_name("operand")?;
                if self.text(operator) == "&" && operand.kind() == "composite_literal" {
                    self.type_key(operand.child_by_field_name("type")?)
                } else {
                    None
                }
            }
            "call_expression" => {
                let function = expr.child_by_field_name("function")?;
                if function.kind() != "identifier" || self.text(function) != "new" {
                    return None;
                }
                let argument = expr.child_by_field_name("arguments")?.named_child(0)?;
                // `new(T)` may parse its argument as an expression
                match argument.kind() {
                    "identifier" => Some(TypeKey::new(self.package, self.text(argument))),
                    "selector_expression" => {
                        let alias = self.text(argument.child_by_field_name("operand")?);
                        let name = self.text(argument.child_by_field_name("field")?);
                        Some(TypeKey::new(self.imports.get(alias)?.as_str(), name))
                    }
                    _ => self.type_key(argument),
                }
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Binding {
    name: String,
    ty: Option<TypeKey>,
    visible: Range<usize>,
}

#[derive(Debug, Default)]
struct Scope {
    bindings: Vec<Binding>,
}

impl Scope {
    fn bind(&mut self, name: String, ty: Option<TypeKey>, visible: Range<usize>) {
        if name == "_" {
            return;
        }
        self.bindings.push(Binding { name, ty, visible });
    }

    /// Innermost binding of `name` visible at byte offset `at`
    fn lookup(&self, name: &str, at: usize) -> Option<&Binding> {
        self.bindings
            .iter()
            .filter(|b| b.name == name && b.visible.contains(&at))
            .max_by_key(|b| b.visible.start)
    }
}

/// All nodes below `root` (inclusive) in pre-order, without recursion
fn preorder(root: Node) -> Vec<Node> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        out.push(node);
        let mut children = named_children(node);
        children.reverse();
        stack.extend(children);
    }
    out
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Specs of a `var`/`type` declaration, single or parenthesized
fn specs<'t>(decl: Node<'t>, kind: &str, list: &str) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    for child in named_children(decl) {
        if child.kind() == kind {
            out.push(child);
        } else if child.kind() == list {
            out.extend(named_children(child).into_iter().filter(|n| n.kind() == kind));
        }
    }
    out
}

fn scope_end(node: Node) -> usize {
    let mut current = node.parent();
    while let Some(parent) = current {
        if SCOPE_KINDS.contains(&parent.kind()) {
            return parent.end_byte();
        }
        current = parent.parent();
    }
    node.end_byte()
}

fn line_span(node: Node) -> LineSpan {
    let start = node.start_position();
    let end = node.end_position();
    let end_row = if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    };
    LineSpan::new(start.row + 1, end_row + 1)
}

/// Comment lines directly above a declaration, in source order
fn doc_spans(decl: Node) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    let mut next_row = decl.start_position().row;
    let mut current = decl.prev_named_sibling();

    while let Some(comment) = current {
        if comment.kind() != "comment" {
            break;
        }
        let span = line_span(comment);
        if span.end != next_row {
            // blank line (or same line) between comment and what follows
            break;
        }
        let previous = comment.prev_named_sibling();
        if let Some(before) = previous {
            if before.kind() != "comment"
                && before.end_position().row == comment.start_position().row
            {
                // trailing comment of the previous declaration
                break;
            }
        }
        spans.push(span);
        next_row = span.start - 1;
        current = previous;
    }

    spans.reverse();
    spans
}

fn package_clause(root: Node, source: &str) -> Option<String> {
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_clause")?;
    let mut inner = clause.walk();
    let name = clause
        .named_children(&mut inner)
        .find(|n| n.kind() == "package_identifier")?;
    Some(source[name.byte_range()].to_string())
}

fn collect_imports(root: Node, source: &str, packages: &PackageNames) -> HashMap<String, String> {
    let mut imports = HashMap::new();
    for decl in named_children(root)
        .into_iter()
        .filter(|n| n.kind() == "import_declaration")
    {
        for spec in preorder(decl).into_iter().filter(|n| n.kind() == "import_spec") {
            let Some(path_node) = spec.child_by_field_name("path") else {
                continue;
            };
            let path = source[path_node.byte_range()]
                .trim_matches(|c| c == '"' || c == '`')
                .to_string();

            let alias = match spec.child_by_field_name("name") {
                Some(name) if name.kind() == "package_identifier" || name.kind() == "identifier" => {
                    source[name.byte_range()].to_string()
                }
                // dot and blank imports introduce no qualifier
                Some(_) => continue,
                None => packages
                    .get(&path)
                    .cloned()
                    .unwrap_or_else(|| default_import_name(&path)),
            };
            imports.insert(alias, path);
        }
    }
    imports
}

/// Best guess at the package name of an import outside the module
fn default_import_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    let is_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    if is_version {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }
    let last = last.split('.').next().unwrap_or(last);
    last.strip_prefix("go-").unwrap_or(last).replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PKG: &str = "example.com/app";

    fn resolve(source: &str) -> CompilationUnit {
        resolve_with(source, &PackageNames::new())
    }

    fn resolve_with(source: &str, packages: &PackageNames) -> CompilationUnit {
        let mut frontend = GoFrontend::new().unwrap();
        let parsed = frontend
            .parse(source.to_string(), &PathBuf::from("/m/app.go"))
            .unwrap();
        let symbols = ModuleSymbols {
            packages: packages.clone(),
            types: frontend.declared_types(&parsed, PKG, packages),
        };
        frontend.resolve_unit(&parsed, PKG, &symbols)
    }

    fn decl<'a>(unit: &'a CompilationUnit, name: &str) -> &'a FunctionDecl {
        unit.functions
            .iter()
            .find(|f| f.id.display_name() == name)
            .unwrap()
    }

    fn targets(unit: &CompilationUnit, name: &str) -> Vec<Option<SymbolId>> {
        decl(unit, name)
            .body
            .as_ref()
            .unwrap()
            .calls
            .iter()
            .map(|c| c.target.clone())
            .collect()
    }

    #[test]
    fn reads_package_clause() {
        let mut frontend = GoFrontend::new().unwrap();
        let parsed = frontend
            .parse("package store\n".to_string(), Path::new("/m/a.go"))
            .unwrap();
        assert_eq!(parsed.package_name.as_deref(), Some("store"));
        assert!(!parsed.has_syntax_errors());
    }

    #[test]
    fn declarations_with_spans_and_docs() {
        let unit = resolve(
            "package app\n\nvar x = 1 // trailing\nfunc A() {}\n\n// Run starts.\n// It blocks.\nfunc Run() {\n\tA()\n}\n\n// stray\n\nfunc B() {}\n",
        );
        let a = decl(&unit, "A");
        assert!(a.doc.is_empty());
        assert_eq!(a.span, LineSpan::new(4, 4));

        let run = decl(&unit, "Run");
        assert_eq!(run.doc, vec![LineSpan::new(6, 6), LineSpan::new(7, 7)]);
        assert_eq!(run.span, LineSpan::new(8, 10));

        assert!(decl(&unit, "B").doc.is_empty());
    }

    #[test]
    fn block_comment_doc_spans_lines() {
        let unit = resolve("package app\n\n/*\n Multi\n*/\nfunc M() {}\n");
        assert_eq!(decl(&unit, "M").doc, vec![LineSpan::new(3, 5)]);
    }

    #[test]
    fn bodyless_declaration() {
        let unit = resolve("package app\n\nfunc Asm(x int) int\n");
        assert!(decl(&unit, "Asm").body.is_none());
    }

    #[test]
    fn method_ids_strip_pointer_and_type_params() {
        let unit = resolve(
            "package app\n\ntype S struct{}\ntype L[T any] struct{}\n\nfunc (s *S) Get() {}\nfunc (l L[T]) Len() int { return 0 }\n",
        );
        assert_eq!(decl(&unit, "S.Get").id, SymbolId::method(PKG, "S", "Get"));
        assert_eq!(decl(&unit, "L.Len").id, SymbolId::method(PKG, "L", "Len"));
    }

    #[test]
    fn init_functions_are_distinct() {
        let unit = resolve("package app\n\nfunc init() {}\n\nfunc init() {}\n");
        assert_eq!(unit.functions.len(), 2);
        assert_ne!(unit.functions[0].id, unit.functions[1].id);
    }

    #[test]
    fn calls_in_preorder_with_builtins_skipped() {
        let unit = resolve(
            "package app\n\nfunc Run() {\n\tfirst(second())\n\tn := len(third())\n\t_ = n\n}\n",
        );
        assert_eq!(
            targets(&unit, "Run"),
            vec![
                Some(SymbolId::function(PKG, "first")),
                Some(SymbolId::function(PKG, "second")),
                None,
                Some(SymbolId::function(PKG, "third")),
            ]
        );
    }

    #[test]
    fn local_function_values_shadow_package_functions() {
        let unit = resolve(
            "package app\n\nfunc helper() {}\n\nfunc Run(cb func()) {\n\thelper()\n\tcb()\n\tif true {\n\t\thelper := func() {}\n\t\thelper()\n\t}\n\thelper()\n}\n",
        );
        assert_eq!(
            targets(&unit, "Run"),
            vec![
                Some(SymbolId::function(PKG, "helper")),
                None,
                None,
                Some(SymbolId::function(PKG, "helper")),
            ]
        );
    }

    #[test]
    fn selectors_resolve_through_imports_and_receivers() {
        let mut packages = PackageNames::new();
        packages.insert("example.com/app/internal/db".to_string(), "store".to_string());
        let unit = resolve_with(
            "package app\n\nimport (\n\t\"fmt\"\n\t\"example.com/app/internal/db\"\n\tyml \"gopkg.in/yaml.v3\"\n)\n\ntype S struct{}\n\nfunc (s *S) Run(c *store.Conn) {\n\tfmt.Println()\n\tstore.Open()\n\tyml.Marshal()\n\ts.step()\n\tc.Close()\n\tw := &Worker{}\n\tw.Do()\n\tS.Run(nil, nil)\n}\n",
            &packages,
        );
        assert_eq!(
            targets(&unit, "S.Run"),
            vec![
                Some(SymbolId::function("fmt", "Println")),
                Some(SymbolId::function("example.com/app/internal/db", "Open")),
                Some(SymbolId::function("gopkg.in/yaml.v3", "Marshal")),
                Some(SymbolId::method(PKG, "S", "step")),
                Some(SymbolId::method("example.com/app/internal/db", "Conn", "Close")),
                Some(SymbolId::method(PKG, "Worker", "Do")),
                Some(SymbolId::method(PKG, "S", "Run")),
            ]
        );
    }

    #[test]
    fn struct_field_chains_resolve_to_methods() {
        let unit = resolve(
            "package app\n\ntype Repo struct{}\n\ntype Cache struct {\n\trepo *Repo\n}\n\ntype Service struct {\n\trepo, backup *Repo\n\tcache Cache\n\t*Logger\n\tnames []string\n}\n\nfunc (s *Service) Handle() {\n\ts.repo.Find()\n\ts.backup.Find()\n\ts.cache.repo.Find()\n\t(s.cache).repo.Find()\n\ts.Logger.Log()\n\ts.names.Len()\n\ts.missing.Find()\n}\n",
        );
        assert_eq!(
            targets(&unit, "Service.Handle"),
            vec![
                Some(SymbolId::method(PKG, "Repo", "Find")),
                Some(SymbolId::method(PKG, "Repo", "Find")),
                Some(SymbolId::method(PKG, "Repo", "Find")),
                Some(SymbolId::method(PKG, "Repo", "Find")),
                Some(SymbolId::method(PKG, "Logger", "Log")),
                None,
                None,
            ]
        );
    }

    #[test]
    fn typed_package_vars_resolve_to_methods() {
        let unit = resolve(
            "package app\n\ntype Repo struct{}\n\ntype Holder struct {\n\trepo *Repo\n}\n\nvar defaultRepo = &Repo{}\n\nvar (\n\tfallback Repo\n\theld     = Holder{}\n\tcounter  = 3\n)\n\nfunc Top() {\n\tdefaultRepo.Find()\n\tfallback.Find()\n\theld.repo.Find()\n\tcounter.Find()\n\tRepo.Find(Repo{})\n}\n\nfunc Shadow() {\n\tdefaultRepo := makeRepo()\n\tdefaultRepo.Find()\n}\n",
        );
        assert_eq!(
            targets(&unit, "Top"),
            vec![
                Some(SymbolId::method(PKG, "Repo", "Find")),
                Some(SymbolId::method(PKG, "Repo", "Find")),
                Some(SymbolId::method(PKG, "Repo", "Find")),
                // untyped package value, never in the index
                Some(SymbolId::method(PKG, "counter", "Find")),
                Some(SymbolId::method(PKG, "Repo", "Find")),
            ]
        );
        assert_eq!(
            targets(&unit, "Shadow"),
            vec![Some(SymbolId::function(PKG, "makeRepo")), None]
        );
    }

    #[test]
    fn fields_and_vars_of_other_packages() {
        const DB: &str = "example.com/app/db";
        let mut packages = PackageNames::new();
        packages.insert(DB.to_string(), "db".to_string());

        let mut frontend = GoFrontend::new().unwrap();
        let db = frontend
            .parse(
                "package db\n\ntype Pool struct {\n\tconn *Conn\n}\n\nvar Default = new(Pool)\n".to_string(),
                Path::new("/m/db/db.go"),
            )
            .unwrap();
        let app = frontend
            .parse(
                "package app\n\nimport \"example.com/app/db\"\n\ntype Service struct {\n\tpool *db.Pool\n}\n\nfunc (s Service) Run() {\n\ts.pool.conn.Close()\n\tdb.Default.conn.Close()\n}\n".to_string(),
                Path::new("/m/app.go"),
            )
            .unwrap();

        let mut types = frontend.declared_types(&db, DB, &packages);
        types.merge(frontend.declared_types(&app, PKG, &packages));
        assert_eq!(types.var(DB, "Default"), Some(&TypeKey::new(DB, "Pool")));

        let symbols = ModuleSymbols { packages, types };
        let unit = frontend.resolve_unit(&app, PKG, &symbols);
        assert_eq!(
            targets(&unit, "Service.Run"),
            vec![
                Some(SymbolId::method(DB, "Conn", "Close")),
                Some(SymbolId::method(DB, "Conn", "Close")),
            ]
        );
    }

    #[test]
    fn untyped_locals_are_unresolved() {
        let unit = resolve(
            "package app\n\nfunc Run() {\n\tw := NewWorker()\n\tw.Do()\n}\n",
        );
        assert_eq!(
            targets(&unit, "Run"),
            vec![Some(SymbolId::function(PKG, "NewWorker")), None]
        );
    }

    #[test]
    fn import_names_for_external_paths() {
        assert_eq!(default_import_name("fmt"), "fmt");
        assert_eq!(default_import_name("github.com/a/go-redis"), "redis");
        assert_eq!(default_import_name("github.com/a/chi/v5"), "chi");
        assert_eq!(default_import_name("gopkg.in/yaml.v3"), "yaml");
    }
}
