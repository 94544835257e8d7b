//! Compilation driver: source text in, executable program out.

use std::io::{BufRead, Write};

use crate::ast::Ast;
use crate::error::Result;
use crate::interp::Interpreter;
use crate::parser::{tokenize, Parser};
use crate::symbol_table::SymbolTable;

/// The arena and the symbol table built alongside it. Both live until the
/// driver drops them; the global scope stays pushed in between compile and
/// execute so the top-level bindings carry over.
pub struct CompiledProgram {
    pub ast: Ast,
    pub symtab: SymbolTable,
}

/// Tokenize and parse `source`, binding names as the grammar reduces.
/// The first error aborts.
pub fn compile(source: &str) -> Result<CompiledProgram> {
    let tokens = tokenize(source)?;
    let mut symtab = SymbolTable::new();
    symtab.push_scope();
    let ast = Parser::new(&tokens, &mut symtab).parse_program()?;
    Ok(CompiledProgram { ast, symtab })
}

impl CompiledProgram {
    /// Run the program against the given streams.
    pub fn execute<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<()> {
        Interpreter::new(input, output).run(&self.ast, &mut self.symtab)
    }
}
