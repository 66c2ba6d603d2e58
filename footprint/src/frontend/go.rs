//! Go front end built on tree-sitter
//!
//! Walks the syntax tree of one file and turns every instrumentable block
//! into builder calls. The walk follows lexical order, so frame paths are
//! stable for a given source.
//!
//! Recognized blocks:
//! - function and method declarations (`f`, `T_f`, `*T_f`)
//! - `if` / `else if` / `else` branches, one frame each
//! - every `case` / `default` clause of `switch`, type switch and `select`
//! - `for` and `for ... range` bodies
//! - `go` launches, named (`go f(x)`, `go s.f(x)`) or inline (`go func(){}()`)
//! - function literals that are assigned, returned, deferred, called in
//!   place or passed as call arguments

use log::debug;
use tree_sitter::{Node, Parser, Point};

use crate::domain::{Anchor, InstrumentError};
use crate::frame::{BuildCursor, FrameKind, FrameTree, GoAnchor, ImportSpec};

const CASE_CLAUSES: [&str; 4] = ["expression_case", "type_case", "communication_case", "default_case"];

/// Statements after which nothing in the same clause runs
const JUMP_STATEMENTS: [&str; 4] = [
    "fallthrough_statement",
    "break_statement",
    "continue_statement",
    "goto_statement",
];

/// Parse one Go source file into its frame tree
pub fn parse(source: &str) -> Result<FrameTree, InstrumentError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| InstrumentError::LanguageInit(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(InstrumentError::ParseFailed { line: 1 })?;
    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(root).map_or(1, start_line);
        return Err(InstrumentError::ParseFailed { line });
    }

    let package = named_children(root)
        .into_iter()
        .find(|node| node.kind() == "package_clause")
        .and_then(first_named)
        .ok_or(InstrumentError::ParseFailed { line: 1 })?;

    let walker = GoWalker {
        source,
        cursor: BuildCursor::new(text_of(source, package), 1, line_count(source)),
    };
    walker.walk_file(root)
}

/// Number of lines of a source text, a missing final terminator included
pub fn line_count(source: &str) -> usize {
    source.lines().count().max(1)
}

struct GoWalker<'s> {
    source: &'s str,
    cursor: BuildCursor,
}

impl<'s> GoWalker<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        text_of(self.source, node)
    }

    fn indent(&self) -> String {
        "  ".repeat(self.cursor.depth())
    }

    fn walk_file(mut self, root: Node<'_>) -> Result<FrameTree, InstrumentError> {
        for decl in named_children(root) {
            if decl.kind() == "package_clause" {
                continue;
            }
            self.cursor.set_import_anchor(start_line(decl));

            match decl.kind() {
                "import_declaration" => self.walk_imports(decl),
                "function_declaration" | "method_declaration" => self.walk_function(decl)?,
                "var_declaration" => self.walk_var_declaration(decl)?,
                _ => {}
            }
        }
        self.cursor.finish()
    }

    fn walk_imports(&mut self, node: Node<'_>) {
        for child in named_children(node) {
            match child.kind() {
                "import_spec" => {
                    if let Some(path) = child.child_by_field_name("path") {
                        let alias = child.child_by_field_name("name").map(|name| self.text(name));
                        debug!("found import {}", self.text(path));
                        self.cursor.record_import(ImportSpec::new(alias, self.text(path)));
                    }
                }
                "import_spec_list" => self.walk_imports(child),
                _ => {}
            }
        }
    }

    fn walk_function(&mut self, decl: Node<'_>) -> Result<(), InstrumentError> {
        // declarations without a body are implemented elsewhere (assembly, linkname)
        let Some(body) = decl.child_by_field_name("body") else {
            return Ok(());
        };
        let name = decl.child_by_field_name("name").map_or("", |n| self.text(n));
        let discriminator = if decl.kind() == "method_declaration" {
            format!("{}_{name}", self.receiver_name(decl)?)
        } else {
            name.to_string()
        };
        debug!("found func `{discriminator}` at {}..{}", start_line(decl), end_line(decl));

        let kind = FrameKind::Function {
            has_result: decl.child_by_field_name("result").is_some(),
        };
        self.walk_block(kind, &discriminator, start_line(decl), body)
    }

    fn receiver_name(&self, decl: Node<'_>) -> Result<String, InstrumentError> {
        decl.child_by_field_name("receiver")
            .and_then(|list| {
                named_children(list)
                    .into_iter()
                    .find(|param| param.kind() == "parameter_declaration")
            })
            .and_then(|param| param.child_by_field_name("type"))
            .and_then(|ty| self.receiver_type(ty, false))
            .ok_or(InstrumentError::MalformedReceiver { line: start_line(decl) })
    }

    /// `T`, `*T`, `T[K]` and `*T[K]`, parenthesized or not
    fn receiver_type(&self, ty: Node<'_>, behind_pointer: bool) -> Option<String> {
        match ty.kind() {
            "type_identifier" => Some(self.text(ty).to_string()),
            "generic_type" => ty
                .child_by_field_name("type")
                .filter(|base| base.kind() == "type_identifier")
                .map(|base| self.text(base).to_string()),
            "pointer_type" if !behind_pointer => first_named(ty)
                .and_then(|inner| self.receiver_type(inner, true))
                .map(|name| format!("*{name}")),
            "parenthesized_type" => first_named(ty).and_then(|inner| self.receiver_type(inner, behind_pointer)),
            _ => None,
        }
    }

    /// Open a frame spanning `body`, walk its statements and close it again
    fn walk_block(
        &mut self,
        kind: FrameKind,
        discriminator: &str,
        head_line: usize,
        body: Node<'_>,
    ) -> Result<(), InstrumentError> {
        self.cursor.enter_frame(kind, discriminator, head_line, start_line(body));
        let (open, close) = brace_anchors(body);
        self.cursor.set_open_anchor(open);
        self.cursor.set_close_anchor(close);
        self.walk_statements(body)?;
        self.cursor.exit_frame(end_line(body))?;
        Ok(())
    }

    fn walk_statements(&mut self, block: Node<'_>) -> Result<(), InstrumentError> {
        for stmt in block_statements(block) {
            self.walk_statement(stmt)?;
        }
        Ok(())
    }

    fn walk_statement(&mut self, stmt: Node<'_>) -> Result<(), InstrumentError> {
        match stmt.kind() {
            "return_statement" => {
                for list in named_children(stmt) {
                    self.walk_values(list, "return")?;
                }
                debug!("{}found return at {}", self.indent(), start_line(stmt));
                self.cursor.mark_return(start_line(stmt));
            }
            "if_statement" => self.walk_if(stmt)?,
            "expression_switch_statement" => self.walk_cases(stmt, "switch")?,
            "type_switch_statement" => self.walk_cases(stmt, "typed-switch")?,
            "select_statement" => self.walk_cases(stmt, "select")?,
            "for_statement" => {
                let ranged = named_children(stmt).iter().any(|c| c.kind() == "range_clause");
                let discriminator = if ranged { "for-range" } else { "for" };
                if let Some(body) = stmt.child_by_field_name("body") {
                    debug!("{}found {discriminator} at {}", self.indent(), start_line(stmt));
                    self.walk_block(FrameKind::For, discriminator, start_line(stmt), body)?;
                }
            }
            "labeled_statement" => {
                for inner in named_children(stmt) {
                    if inner.kind() != "label_name" {
                        self.walk_statement(inner)?;
                    }
                }
            }
            "var_declaration" => self.walk_var_declaration(stmt)?,
            "short_var_declaration" | "assignment_statement" => {
                if let Some(right) = stmt.child_by_field_name("right") {
                    self.walk_values(right, "assign")?;
                }
            }
            "expression_statement" => {
                if let Some(call) = first_named(stmt).map(unwrap_parens) {
                    if call.kind() == "call_expression" {
                        self.walk_call(call, "call")?;
                    }
                }
            }
            "defer_statement" => {
                if let Some(call) = first_named(stmt).map(unwrap_parens) {
                    if call.kind() == "call_expression" {
                        self.walk_call(call, "defer")?;
                    }
                }
            }
            "go_statement" => self.walk_go(stmt)?,
            "block" => self.walk_statements(stmt)?,
            _ => {}
        }
        Ok(())
    }

    fn walk_if(&mut self, stmt: Node<'_>) -> Result<(), InstrumentError> {
        debug!("{}found if at {}", self.indent(), start_line(stmt));
        if let Some(body) = stmt.child_by_field_name("consequence") {
            self.walk_block(FrameKind::IfElse, "if", start_line(stmt), body)?;
        }
        match stmt.child_by_field_name("alternative") {
            Some(alt) if alt.kind() == "if_statement" => self.walk_if(alt),
            Some(alt) if alt.kind() == "block" => {
                debug!("{}found else at {}", self.indent(), start_line(alt));
                self.walk_block(FrameKind::IfElse, "else", start_line(alt), alt)
            }
            _ => Ok(()),
        }
    }

    /// `switch`, type switch and `select` open no frame; each clause does
    fn walk_cases(&mut self, stmt: Node<'_>, discriminator: &str) -> Result<(), InstrumentError> {
        debug!("{}found {discriminator} at {}", self.indent(), start_line(stmt));
        let clauses: Vec<Node<'_>> = named_children(stmt)
            .into_iter()
            .filter(|clause| CASE_CLAUSES.contains(&clause.kind()))
            .collect();
        // a clause ends where the next one starts, the last one at the closing brace
        let switch_end = stmt.end_position();
        let switch_close = Anchor::new(switch_end.row + 1, switch_end.column.saturating_sub(1));

        for (index, clause) in clauses.iter().enumerate() {
            let head = start_line(*clause);
            let body = case_statements(*clause);
            let close = match body.last() {
                Some(last) if JUMP_STATEMENTS.contains(&last.kind()) => anchor_at(last.start_position()),
                _ => clauses.get(index + 1).map_or(switch_close, |next| anchor_at(next.start_position())),
            };

            self.cursor.enter_frame(FrameKind::Case, discriminator, head, head);
            self.cursor.set_close_anchor(close);
            for stmt in &body {
                self.walk_statement(*stmt)?;
            }
            self.cursor.exit_frame(close.line)?;
        }
        Ok(())
    }

    fn walk_var_declaration(&mut self, decl: Node<'_>) -> Result<(), InstrumentError> {
        for child in named_children(decl) {
            match child.kind() {
                "var_spec" => {
                    if let Some(values) = child.child_by_field_name("value") {
                        self.walk_values(values, "decl-assign")?;
                    }
                }
                "var_spec_list" => self.walk_var_declaration(child)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Right-hand side of an assignment, declaration or `return`
    fn walk_values(&mut self, list: Node<'_>, context: &str) -> Result<(), InstrumentError> {
        let values = if list.kind() == "expression_list" { named_children(list) } else { vec![list] };
        for value in values.into_iter().map(unwrap_parens) {
            match value.kind() {
                "func_literal" => self.walk_closure(value, &format!("anonymous-{context}"))?,
                "call_expression" => self.walk_call(value, &format!("{context}-call"))?,
                _ => {}
            }
        }
        Ok(())
    }

    fn walk_call(&mut self, call: Node<'_>, suffix: &str) -> Result<(), InstrumentError> {
        if let Some(callee) = call.child_by_field_name("function").map(unwrap_parens) {
            if callee.kind() == "func_literal" {
                self.walk_closure(callee, &format!("anonymous-{suffix}"))?;
            }
        }
        if let Some(args) = call.child_by_field_name("arguments") {
            self.walk_arguments(args, &format!("{suffix}-args"))?;
        }
        Ok(())
    }

    fn walk_arguments(&mut self, args: Node<'_>, suffix: &str) -> Result<(), InstrumentError> {
        for arg in named_children(args).into_iter().map(unwrap_parens) {
            match arg.kind() {
                "call_expression" => self.walk_call(arg, suffix)?,
                "func_literal" => self.walk_closure(arg, &format!("anonymous-{suffix}"))?,
                _ => {}
            }
        }
        Ok(())
    }

    fn walk_closure(&mut self, literal: Node<'_>, discriminator: &str) -> Result<(), InstrumentError> {
        let Some(body) = literal.child_by_field_name("body") else {
            return Ok(());
        };
        debug!("{}found {discriminator} at {}", self.indent(), start_line(literal));
        let kind = FrameKind::Function {
            has_result: literal.child_by_field_name("result").is_some(),
        };
        self.walk_block(kind, discriminator, start_line(literal), body)
    }

    fn walk_go(&mut self, stmt: Node<'_>) -> Result<(), InstrumentError> {
        let Some(call) = first_named(stmt).map(unwrap_parens).filter(|c| c.kind() == "call_expression") else {
            return Ok(());
        };
        let Some(callee) = call.child_by_field_name("function") else {
            return Ok(());
        };

        match unwrap_parens(callee).kind() {
            "func_literal" => {
                let literal = unwrap_parens(callee);
                if let Some(body) = literal.child_by_field_name("body") {
                    debug!("{}found go func literal at {}", self.indent(), start_line(literal));
                    let end = body.end_position();
                    let anchor = GoAnchor {
                        open: Anchor::new(start_line(body), body.start_position().column + 1),
                        close: Anchor::new(end.row + 1, end.column.saturating_sub(1)),
                    };
                    let kind = FrameKind::GoRoutine { target: String::new(), anchor: Some(anchor) };
                    self.walk_block(kind, "go-anonymous", start_line(literal), body)?;
                }
            }
            // the wrapper is spliced in front of the target text, parentheses would split it
            "identifier" | "selector_expression" if callee.kind() != "parenthesized_expression" => {
                let target = self.text(callee);
                debug!("{}found go `{target}` at {}", self.indent(), start_line(stmt));
                let anchor = GoAnchor {
                    open: anchor_at(callee.start_position()),
                    close: anchor_at(call.end_position()),
                };
                let discriminator = format!("go-{}", target.replace('.', "-"));
                let line = start_line(stmt);
                let kind = FrameKind::GoRoutine { target: target.to_string(), anchor: Some(anchor) };
                self.cursor.enter_frame(kind, &discriminator, line, line);
                // literals among the arguments sit inside the wrapper
                self.walk_go_arguments(call)?;
                self.cursor.exit_frame(end_line(call))?;
                return Ok(());
            }
            other => debug!("{}skip go launch of a `{other}` at {}", self.indent(), start_line(stmt)),
        }
        self.walk_go_arguments(call)
    }

    fn walk_go_arguments(&mut self, call: Node<'_>) -> Result<(), InstrumentError> {
        match call.child_by_field_name("arguments") {
            Some(args) => self.walk_arguments(args, "go-args"),
            None => Ok(()),
        }
    }
}

fn text_of<'s>(source: &'s str, node: Node<'_>) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn start_line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// 1-based line of the last character of `node`
fn end_line(node: Node<'_>) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row
    } else {
        end.row + 1
    }
}

fn anchor_at(point: Point) -> Anchor {
    Anchor::new(point.row + 1, point.column)
}

/// Right after a block's `{` and at its `}`
fn brace_anchors(block: Node<'_>) -> (Anchor, Anchor) {
    let start = block.start_position();
    let end = block.end_position();
    (
        Anchor::new(start.row + 1, start.column + 1),
        Anchor::new(end.row + 1, end.column.saturating_sub(1)),
    )
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).filter(|child| child.kind() != "comment").collect()
}

fn first_named<'t>(node: Node<'t>) -> Option<Node<'t>> {
    named_children(node).into_iter().next()
}

fn unwrap_parens<'t>(node: Node<'t>) -> Node<'t> {
    let mut node = node;
    while node.kind() == "parenthesized_expression" {
        match first_named(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Statements of a block, whether or not the grammar groups them in a `statement_list`
fn block_statements<'t>(block: Node<'t>) -> Vec<Node<'t>> {
    let mut statements = Vec::new();
    for child in named_children(block) {
        if child.kind() == "statement_list" {
            statements.extend(named_children(child));
        } else {
            statements.push(child);
        }
    }
    statements
}

/// Statements after a clause's `:`
fn case_statements<'t>(clause: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = clause.walk();
    let children: Vec<Node<'t>> = clause.children(&mut cursor).collect();

    let mut after_colon = false;
    let mut statements = Vec::new();
    for child in children {
        if !after_colon {
            after_colon = child.kind() == ":" && !child.is_named();
            continue;
        }
        if !child.is_named() || child.kind() == "comment" {
            continue;
        }
        if child.kind() == "statement_list" {
            statements.extend(named_children(child));
        } else {
            statements.push(child);
        }
    }
    statements
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children.into_iter().filter(|child| child.has_error()).find_map(first_error)
}
