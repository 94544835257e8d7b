//! Debug dumps: the AST as a graphviz digraph and the symbol table as
//! plain text.
//!
//! The DOT walk assigns a fresh integer id to every node (root is 0,
//! children in pre-order) and emits three sections: invisible edges first
//! to pin child ordering in the rendered layout, then the node
//! declarations, then the visible edges labeled with each child's role.

use std::io::{self, Write};

use crate::ast::{Ast, NodeId, NodeKind};
use crate::symbol_table::SymbolTable;

struct DotEdge {
    from: u32,
    to: u32,
    label: String,
}

struct DotBuilder<'a> {
    ast: &'a Ast,
    nodes: Vec<(u32, String)>,
    edges: Vec<DotEdge>,
    next_id: u32,
}

impl<'a> DotBuilder<'a> {
    fn new(ast: &'a Ast) -> Self {
        Self { ast, nodes: Vec::new(), edges: Vec::new(), next_id: 0 }
    }

    fn fresh_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn label(&self, node: NodeId) -> String {
        match &self.ast[node].kind {
            NodeKind::Number(v) => format!("Number {v}"),
            NodeKind::Var(name) => format!("Variable {name}"),
            NodeKind::LVal(name) => format!("Left value {name}"),
            NodeKind::Empty => "empty".into(),
            NodeKind::Read => "Read".into(),
            NodeKind::BinOp { op, .. } => op.symbol().into(),
            NodeKind::UnOp { op, .. } => op.symbol().into(),
            NodeKind::Seq(_) => "Statements".into(),
            NodeKind::Scope(_) => "Scope".into(),
            NodeKind::If { .. } => "if".into(),
            NodeKind::IfElse { .. } => "if else".into(),
            NodeKind::While { .. } => "while".into(),
        }
    }

    fn child(&mut self, parent: u32, node: NodeId, role: String) {
        let id = self.fresh_id();
        self.edges.push(DotEdge { from: parent, to: id, label: role });
        self.walk(node, id);
    }

    fn walk(&mut self, node: NodeId, id: u32) {
        let label = self.label(node);
        self.nodes.push((id, label));
        match &self.ast[node].kind {
            NodeKind::Number(_)
            | NodeKind::Var(_)
            | NodeKind::LVal(_)
            | NodeKind::Empty
            | NodeKind::Read => {}

            NodeKind::BinOp { lhs, rhs, .. } => {
                let (lhs, rhs) = (*lhs, *rhs);
                self.child(id, lhs, "lhs".into());
                self.child(id, rhs, "rhs".into());
            }

            NodeKind::UnOp { arg, .. } => {
                let arg = *arg;
                self.child(id, arg, "operand".into());
            }

            NodeKind::Seq(children) | NodeKind::Scope(children) => {
                for (index, &stmt) in children.clone().iter().enumerate() {
                    self.child(id, stmt, index.to_string());
                }
            }

            NodeKind::If { cond, then } => {
                let (cond, then) = (*cond, *then);
                self.child(id, cond, "cond".into());
                self.child(id, then, "body".into());
            }

            NodeKind::IfElse { cond, then, else_body } => {
                let (cond, then, else_body) = (*cond, *then, *else_body);
                self.child(id, cond, "cond".into());
                self.child(id, then, "body".into());
                self.child(id, else_body, "else_body".into());
            }

            NodeKind::While { cond, body } => {
                let (cond, body) = (*cond, *body);
                self.child(id, cond, "cond".into());
                self.child(id, body, "body".into());
            }
        }
    }
}

/// Write the tree rooted in `ast` as a graphviz digraph.
pub fn dump_ast<W: Write>(ast: &Ast, out: &mut W) -> io::Result<()> {
    let mut builder = DotBuilder::new(ast);
    if let Some(root) = ast.root() {
        let id = builder.fresh_id();
        builder.walk(root, id);
    }

    writeln!(out, "digraph \"AST\"")?;
    writeln!(out, "{{")?;
    for edge in &builder.edges {
        writeln!(out, "\t{} -> {} [style=invis]", edge.from, edge.to)?;
    }
    for (id, label) in &builder.nodes {
        writeln!(out, "\t{} [label=\"{}\"]", id, label)?;
    }
    for edge in &builder.edges {
        writeln!(out, "\t{} -> {} [style=solid label=\"{}\"]", edge.from, edge.to, edge.label)?;
    }
    writeln!(out, "}}")
}

/// Write the live bindings of the symbol table.
pub fn dump_symbols<W: Write>(symtab: &SymbolTable, out: &mut W) -> io::Result<()> {
    writeln!(out, "Symbol table dump:")?;
    if symtab.is_empty() {
        return writeln!(out, "[EMPTY]");
    }
    writeln!(out, "(Size) {}", symtab.len())?;
    writeln!(out, "(Names)")?;
    let mut names: Vec<&str> = symtab.iter().map(|(name, _)| name).collect();
    names.sort_unstable();
    for name in names {
        writeln!(out, "\t{name}")?;
    }
    Ok(())
}
