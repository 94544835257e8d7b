//! The tree-walking evaluator.
//!
//! A recursive post-order walk over the arena: children first, strictly
//! left to right, with one documented exception (assignment evaluates its
//! right side before the target). Control-flow nodes drive their children
//! themselves. The interpreter owns the two standard streams for the run,
//! so tests substitute in-memory buffers.

use std::io::{BufRead, Write};

use crate::ast::{Ast, BinOp, NodeId, NodeKind, UnOp};
use crate::diag::Loc;
use crate::error::{Error, Phase, Result};
use crate::symbol_table::SymbolTable;
use crate::value::{self, Value};

pub struct Interpreter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Evaluate the program root and discard its value.
    pub fn run(&mut self, ast: &Ast, symtab: &mut SymbolTable) -> Result<()> {
        if let Some(root) = ast.root() {
            self.eval(ast, root, symtab)?;
        }
        Ok(())
    }

    fn eval(&mut self, ast: &Ast, id: NodeId, symtab: &mut SymbolTable) -> Result<Value> {
        let node = ast.node(id);
        match &node.kind {
            NodeKind::Number(v) => Ok(Value::Int(*v)),

            NodeKind::Var(name) => match symtab.lookup(name) {
                Some(slot) => Ok(Value::Int(symtab.get(slot))),
                // Reachable: a block-local name is re-declared at runtime
                // by its LVal, and that LVal may sit behind an if/while
                // body that never ran. The read then has no slot.
                None => Err(Error::UndefinedVariable {
                    loc: node.loc,
                    name: name.clone(),
                    phase: Phase::Runtime,
                }),
            },

            // Create-or-return: a block-local slot reclaimed after the
            // parse comes back here, inside the scope the runtime pushed.
            NodeKind::LVal(name) => Ok(Value::LRef(symtab.declare(name))),

            NodeKind::Empty => Ok(Value::Int(0)),

            NodeKind::Read => self.read_int(node.loc),

            NodeKind::Seq(children) => self.eval_seq(ast, children, symtab),

            NodeKind::Scope(children) => {
                symtab.push_scope();
                let result = self.eval_seq(ast, children, symtab);
                // Pop unconditionally so an error propagates over a
                // balanced scope stack.
                symtab.pop_scope();
                result
            }

            NodeKind::BinOp { op: BinOp::Assign, lhs, rhs } => {
                let v = self.eval(ast, *rhs, symtab)?.as_int(ast.node(*rhs).loc)?;
                match self.eval(ast, *lhs, symtab)? {
                    Value::LRef(slot) => {
                        symtab.set(slot, v);
                        Ok(Value::Int(v))
                    }
                    Value::Int(_) => Err(Error::InvalidOperand { loc: ast.node(*lhs).loc }),
                }
            }

            NodeKind::BinOp { op, lhs, rhs } => {
                let a = self.eval(ast, *lhs, symtab)?;
                let b = self.eval(ast, *rhs, symtab)?;
                value::binary(*op, a, b, node.loc)
            }

            NodeKind::UnOp { op: UnOp::Print, arg } => {
                let v = self.eval(ast, *arg, symtab)?.as_int(ast.node(*arg).loc)?;
                writeln!(self.output, "{v}")?;
                Ok(Value::Int(v))
            }

            NodeKind::UnOp { op, arg } => {
                let v = self.eval(ast, *arg, symtab)?;
                value::unary(*op, v, node.loc)
            }

            NodeKind::If { cond, then } => {
                if self.eval(ast, *cond, symtab)?.truthy(ast.node(*cond).loc)? {
                    self.eval(ast, *then, symtab)
                } else {
                    Ok(Value::Int(0))
                }
            }

            NodeKind::IfElse { cond, then, else_body } => {
                if self.eval(ast, *cond, symtab)?.truthy(ast.node(*cond).loc)? {
                    self.eval(ast, *then, symtab)
                } else {
                    self.eval(ast, *else_body, symtab)
                }
            }

            NodeKind::While { cond, body } => {
                let mut last = Value::Int(0);
                while self.eval(ast, *cond, symtab)?.truthy(ast.node(*cond).loc)? {
                    last = self.eval(ast, *body, symtab)?;
                }
                Ok(last)
            }
        }
    }

    fn eval_seq(&mut self, ast: &Ast, children: &[NodeId], symtab: &mut SymbolTable) -> Result<Value> {
        let mut last = Value::Int(0);
        for &child in children {
            last = self.eval(ast, child, symtab)?;
        }
        Ok(last)
    }

    /// Read one whitespace-delimited token from the input stream and parse
    /// it as an integer. An unreadable stream is an I/O error; a missing or
    /// malformed token is an input-format error.
    fn read_int(&mut self, loc: Loc) -> Result<Value> {
        let mut token = Vec::new();

        // Skip leading whitespace.
        loop {
            let buf = self.input.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            let skipped = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            let done = skipped < buf.len();
            self.input.consume(skipped);
            if done {
                break;
            }
        }

        // Collect until the next whitespace or end of stream.
        loop {
            let buf = self.input.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            let taken = buf.iter().take_while(|b| !b.is_ascii_whitespace()).count();
            token.extend_from_slice(&buf[..taken]);
            let done = taken < buf.len();
            self.input.consume(taken);
            if done {
                break;
            }
        }

        std::str::from_utf8(&token)
            .ok()
            .and_then(|text| text.parse().ok())
            .map(Value::Int)
            .ok_or(Error::InputFormat { loc })
    }
}
