//! Tokenizer and parser for ParaCL.
//!
//! The tokenizer walks the source characters once, tracking zero-based
//! line/column so every token carries a four-component range. The parser is
//! recursive descent with C-family precedence and builds arena nodes while
//! binding names against the symbol table: an identifier on the left of `=`
//! is declared (create-or-return), any other identifier must already be
//! bound or compilation stops with an undefined-variable error. `{` and `}`
//! push and pop a scope during the parse, so block-local names are gone by
//! the time the text after the block is reduced.

use crate::ast::{Ast, BinOp, NodeId, NodeKind, UnOp};
use crate::diag::Loc;
use crate::error::{Error, Phase, Result};
use crate::symbol_table::SymbolTable;
use crate::value::Int;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Non-negative decimal literal. Negative values are spelled with
    /// unary minus.
    Number(Int),
    Ident(String),
    KwIf,
    KwElse,
    KwWhile,
    KwPrint,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Bang,
    Assign,
    Question,
    Semicolon,
    LBrace,
    RBrace,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
}

/// Tokenize source text. Stops at the first unrecognized character.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 0;
    let mut col = 0;

    while i < chars.len() {
        let c = chars[i];
        let start_col = col;

        match c {
            '\n' => {
                i += 1;
                line += 1;
                col = 0;
            }

            c if c.is_ascii_whitespace() => {
                i += 1;
                col += 1;
            }

            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                    col += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let loc = Loc::new(line, start_col, line, col - 1);
                // An overflowing literal has no representable value; treat
                // it like any other malformed lexeme.
                let value = text.parse::<Int>().map_err(|_| Error::Lex { loc })?;
                tokens.push(Token { kind: TokenKind::Number(value), loc });
            }

            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                    col += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let kind = match word.as_str() {
                    "if" => TokenKind::KwIf,
                    "else" => TokenKind::KwElse,
                    "while" => TokenKind::KwWhile,
                    "print" => TokenKind::KwPrint,
                    _ => TokenKind::Ident(word),
                };
                tokens.push(Token { kind, loc: Loc::new(line, start_col, line, col - 1) });
            }

            _ => {
                let next = chars.get(i + 1).copied();
                let (kind, len) = match (c, next) {
                    ('<', Some('=')) => (TokenKind::LessEq, 2),
                    ('>', Some('=')) => (TokenKind::GreaterEq, 2),
                    ('=', Some('=')) => (TokenKind::EqEq, 2),
                    ('!', Some('=')) => (TokenKind::NotEq, 2),
                    ('&', Some('&')) => (TokenKind::AndAnd, 2),
                    ('|', Some('|')) => (TokenKind::OrOr, 2),
                    ('<', _) => (TokenKind::Less, 1),
                    ('>', _) => (TokenKind::Greater, 1),
                    ('=', _) => (TokenKind::Assign, 1),
                    ('!', _) => (TokenKind::Bang, 1),
                    ('+', _) => (TokenKind::Plus, 1),
                    ('-', _) => (TokenKind::Minus, 1),
                    ('*', _) => (TokenKind::Star, 1),
                    ('/', _) => (TokenKind::Slash, 1),
                    ('%', _) => (TokenKind::Percent, 1),
                    ('?', _) => (TokenKind::Question, 1),
                    (';', _) => (TokenKind::Semicolon, 1),
                    ('{', _) => (TokenKind::LBrace, 1),
                    ('}', _) => (TokenKind::RBrace, 1),
                    ('(', _) => (TokenKind::LParen, 1),
                    (')', _) => (TokenKind::RParen, 1),
                    // A lone & or | is not a token either.
                    _ => return Err(Error::Lex { loc: Loc::at(line, col) }),
                };
                i += len;
                col += len;
                tokens.push(Token { kind, loc: Loc::new(line, start_col, line, col - 1) });
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser over a token slice. Consumes itself on
/// `parse_program` and hands back the finished arena.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    ast: Ast,
    symtab: &'a mut SymbolTable,
}

impl<'a> Parser<'a> {
    /// `symtab` must have its global scope pushed already; the parser adds
    /// and removes block scopes around it.
    pub fn new(tokens: &'a [Token], symtab: &'a mut SymbolTable) -> Self {
        Self { tokens, pos: 0, ast: Ast::new(), symtab }
    }

    /// Parse every statement to the end of input. The root is a `Seq`.
    pub fn parse_program(mut self) -> Result<Ast> {
        let mut children = Vec::new();
        while self.at().is_some() {
            children.push(self.statement()?);
        }
        let loc = match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => first.loc.to(last.loc),
            _ => Loc::default(),
        };
        let root = self.ast.add(NodeKind::Seq(children), loc);
        self.ast.set_root(root);
        Ok(self.ast)
    }

    fn at(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// Location to blame when input runs out.
    fn eof_loc(&self) -> Loc {
        self.tokens.last().map(|t| t.loc).unwrap_or_default()
    }

    /// Consume the current token if it matches, returning its location.
    fn eat(&mut self, kind: &TokenKind) -> Option<Loc> {
        match self.at() {
            Some(tok) if tok.kind == *kind => {
                let loc = tok.loc;
                self.bump();
                Some(loc)
            }
            _ => None,
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Loc> {
        let fallback = self.at().map(|t| t.loc).unwrap_or_else(|| self.eof_loc());
        self.eat(kind).ok_or_else(|| Error::Parse {
            loc: fallback,
            message: format!("expected {what}"),
        })
    }

    fn statement(&mut self) -> Result<NodeId> {
        match self.at().map(|t| &t.kind) {
            Some(TokenKind::Semicolon) => {
                let loc = self.at().map(|t| t.loc).unwrap_or_default();
                self.bump();
                Ok(self.ast.add(NodeKind::Empty, loc))
            }
            Some(TokenKind::LBrace) => self.block(),
            Some(TokenKind::KwIf) => self.if_statement(),
            Some(TokenKind::KwWhile) => self.while_statement(),
            Some(_) => {
                let expr = self.expression()?;
                self.expect(&TokenKind::Semicolon, "';' after expression")?;
                Ok(expr)
            }
            None => Err(Error::Parse {
                loc: self.eof_loc(),
                message: "expected statement".into(),
            }),
        }
    }

    fn block(&mut self) -> Result<NodeId> {
        let open = self.expect(&TokenKind::LBrace, "'{'")?;
        self.symtab.push_scope();

        let mut children = Vec::new();
        let closed = loop {
            match self.at() {
                Some(tok) if tok.kind == TokenKind::RBrace => break Ok(tok.loc),
                Some(_) => match self.statement() {
                    Ok(stmt) => children.push(stmt),
                    Err(err) => break Err(err),
                },
                None => {
                    break Err(Error::Parse {
                        loc: self.eof_loc(),
                        message: "expected '}'".into(),
                    })
                }
            }
        };

        // The scope closes whether or not the block parsed, so an error
        // propagates over a balanced stack.
        self.symtab.pop_scope();
        let close = closed?;
        self.bump();
        Ok(self.ast.add(NodeKind::Scope(children), open.to(close)))
    }

    fn if_statement(&mut self) -> Result<NodeId> {
        let kw = self.expect(&TokenKind::KwIf, "'if'")?;
        self.expect(&TokenKind::LParen, "'(' after 'if'")?;
        let cond = self.expression()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let then = self.statement()?;

        // An else binds to the innermost if.
        if self.eat(&TokenKind::KwElse).is_some() {
            let else_body = self.statement()?;
            let loc = kw.to(self.ast[else_body].loc);
            Ok(self.ast.add(NodeKind::IfElse { cond, then, else_body }, loc))
        } else {
            let loc = kw.to(self.ast[then].loc);
            Ok(self.ast.add(NodeKind::If { cond, then }, loc))
        }
    }

    fn while_statement(&mut self) -> Result<NodeId> {
        let kw = self.expect(&TokenKind::KwWhile, "'while'")?;
        self.expect(&TokenKind::LParen, "'(' after 'while'")?;
        let cond = self.expression()?;
        self.expect(&TokenKind::RParen, "')' after condition")?;
        let body = self.statement()?;
        let loc = kw.to(self.ast[body].loc);
        Ok(self.ast.add(NodeKind::While { cond, body }, loc))
    }

    /// `print` sits below assignment, so `print a * b + 1` prints the
    /// whole sum.
    fn expression(&mut self) -> Result<NodeId> {
        if let Some(kw) = self.eat(&TokenKind::KwPrint) {
            let arg = self.expression()?;
            let loc = kw.to(self.ast[arg].loc);
            return Ok(self.ast.add(NodeKind::UnOp { op: UnOp::Print, arg }, loc));
        }
        self.assignment()
    }

    /// Right-associative; the parsed LHS must be a bare identifier that
    /// the primary recognized as an l-value.
    fn assignment(&mut self) -> Result<NodeId> {
        let lhs = self.logic_or()?;
        if let Some(eq) = self.eat(&TokenKind::Assign) {
            if !matches!(self.ast[lhs].kind, NodeKind::LVal(_)) {
                return Err(Error::Parse {
                    loc: eq,
                    message: "destination of assignment is not an l-value".into(),
                });
            }
            let rhs = self.expression()?;
            let loc = self.ast[lhs].loc.to(self.ast[rhs].loc);
            return Ok(self.ast.add(NodeKind::BinOp { op: BinOp::Assign, lhs, rhs }, loc));
        }
        Ok(lhs)
    }

    fn left_assoc(
        &mut self,
        next: fn(&mut Self) -> Result<NodeId>,
        ops: &[(TokenKind, BinOp)],
    ) -> Result<NodeId> {
        let mut lhs = next(self)?;
        loop {
            let Some(tok) = self.at() else { break };
            let Some(&(_, op)) = ops.iter().find(|(kind, _)| *kind == tok.kind) else { break };
            self.bump();
            let rhs = next(self)?;
            let loc = self.ast[lhs].loc.to(self.ast[rhs].loc);
            lhs = self.ast.add(NodeKind::BinOp { op, lhs, rhs }, loc);
        }
        Ok(lhs)
    }

    fn logic_or(&mut self) -> Result<NodeId> {
        self.left_assoc(Self::logic_and, &[(TokenKind::OrOr, BinOp::Or)])
    }

    fn logic_and(&mut self) -> Result<NodeId> {
        self.left_assoc(Self::equality, &[(TokenKind::AndAnd, BinOp::And)])
    }

    fn equality(&mut self) -> Result<NodeId> {
        self.left_assoc(
            Self::relational,
            &[(TokenKind::EqEq, BinOp::Equal), (TokenKind::NotEq, BinOp::NotEqual)],
        )
    }

    fn relational(&mut self) -> Result<NodeId> {
        self.left_assoc(
            Self::additive,
            &[
                (TokenKind::Less, BinOp::Less),
                (TokenKind::LessEq, BinOp::LessEq),
                (TokenKind::Greater, BinOp::Greater),
                (TokenKind::GreaterEq, BinOp::GreaterEq),
            ],
        )
    }

    fn additive(&mut self) -> Result<NodeId> {
        self.left_assoc(
            Self::multiplicative,
            &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
        )
    }

    fn multiplicative(&mut self) -> Result<NodeId> {
        self.left_assoc(
            Self::unary,
            &[
                (TokenKind::Star, BinOp::Mul),
                (TokenKind::Slash, BinOp::Div),
                (TokenKind::Percent, BinOp::Mod),
            ],
        )
    }

    fn unary(&mut self) -> Result<NodeId> {
        let op = match self.at().map(|t| &t.kind) {
            Some(TokenKind::Plus) => Some(UnOp::Plus),
            Some(TokenKind::Minus) => Some(UnOp::Minus),
            Some(TokenKind::Bang) => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let loc = self.at().map(|t| t.loc).unwrap_or_default();
            self.bump();
            let arg = self.unary()?;
            let span = loc.to(self.ast[arg].loc);
            return Ok(self.ast.add(NodeKind::UnOp { op, arg }, span));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<NodeId> {
        let Some(tok) = self.at().cloned() else {
            return Err(Error::Parse {
                loc: self.eof_loc(),
                message: "expected expression".into(),
            });
        };

        match tok.kind {
            TokenKind::Number(value) => {
                self.bump();
                Ok(self.ast.add(NodeKind::Number(value), tok.loc))
            }

            TokenKind::Ident(name) => {
                self.bump();
                let followed_by_assign =
                    matches!(self.at(), Some(next) if next.kind == TokenKind::Assign);
                if followed_by_assign {
                    // Assignment target: first use declares the name in the
                    // innermost open scope.
                    self.symtab.declare(&name);
                    Ok(self.ast.add(NodeKind::LVal(name), tok.loc))
                } else if self.symtab.lookup(&name).is_some() {
                    Ok(self.ast.add(NodeKind::Var(name), tok.loc))
                } else {
                    Err(Error::UndefinedVariable { loc: tok.loc, name, phase: Phase::Compile })
                }
            }

            TokenKind::Question => {
                self.bump();
                Ok(self.ast.add(NodeKind::Read, tok.loc))
            }

            TokenKind::LParen => {
                self.bump();
                let expr = self.expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(expr)
            }

            _ => Err(Error::Parse {
                loc: tok.loc,
                message: "expected expression".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<(Ast, SymbolTable)> {
        let tokens = tokenize(source)?;
        let mut symtab = SymbolTable::new();
        symtab.push_scope();
        let ast = Parser::new(&tokens, &mut symtab).parse_program()?;
        Ok((ast, symtab))
    }

    fn parse_ok(source: &str) -> (Ast, SymbolTable) {
        parse(source).expect("program should parse")
    }

    #[test]
    fn tokenize_tracks_locations() {
        let tokens = tokenize("a = 10;\n  print a;").unwrap();
        assert_eq!(tokens[0].loc, Loc::new(0, 0, 0, 0));
        assert_eq!(tokens[2].loc, Loc::new(0, 4, 0, 5)); // "10"
        assert_eq!(tokens[4].loc, Loc::new(1, 2, 1, 6)); // "print"
    }

    #[test]
    fn tokenize_two_character_operators() {
        let kinds: Vec<TokenKind> =
            tokenize("<= >= == != && || < > = !").unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Assign,
                TokenKind::Bang,
            ]
        );
    }

    #[test]
    fn tokenize_rejects_unknown_characters() {
        let err = tokenize("a = 1 @ 2;").unwrap_err();
        match err {
            Error::Lex { loc } => assert_eq!(loc, Loc::at(0, 6)),
            other => panic!("expected lex error, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_rejects_lone_ampersand() {
        assert!(matches!(tokenize("a & b"), Err(Error::Lex { .. })));
    }

    #[test]
    fn tokenize_rejects_overflowing_literal() {
        assert!(matches!(tokenize("99999999999999999999;"), Err(Error::Lex { .. })));
    }

    #[test]
    fn precedence_multiplication_binds_tighter() {
        let (ast, _) = parse_ok("a = 2; b = 3; c = a + b * 2;");
        // Root -> Seq, third statement is c = (a + (b * 2)).
        let root = ast.root().unwrap();
        let NodeKind::Seq(stmts) = &ast[root].kind else { panic!("root is not a Seq") };
        let NodeKind::BinOp { op: BinOp::Assign, rhs, .. } = &ast[stmts[2]].kind else {
            panic!("expected assignment");
        };
        let NodeKind::BinOp { op: BinOp::Add, rhs: mul, .. } = &ast[*rhs].kind else {
            panic!("expected addition at the top of the RHS");
        };
        assert!(matches!(ast[*mul].kind, NodeKind::BinOp { op: BinOp::Mul, .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let (ast, _) = parse_ok("a = b = 3;");
        let root = ast.root().unwrap();
        let NodeKind::Seq(stmts) = &ast[root].kind else { panic!() };
        let NodeKind::BinOp { op: BinOp::Assign, lhs, rhs } = &ast[stmts[0]].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(ast[*lhs].kind, NodeKind::LVal(_)));
        assert!(matches!(ast[*rhs].kind, NodeKind::BinOp { op: BinOp::Assign, .. }));
    }

    #[test]
    fn undefined_variable_is_a_compile_error() {
        let err = parse("print y;").unwrap_err();
        match err {
            Error::UndefinedVariable { name, loc, phase } => {
                assert_eq!(name, "y");
                assert_eq!(loc, Loc::new(0, 6, 0, 6));
                assert_eq!(phase, Phase::Compile);
            }
            other => panic!("expected undefined variable, got {other:?}"),
        }
    }

    #[test]
    fn block_scope_reclaims_names_at_parse_time() {
        let err = parse("{ y = 7; } print y;").unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { name, .. } if name == "y"));
    }

    #[test]
    fn outer_names_stay_visible_inside_blocks() {
        let (_, symtab) = parse_ok("x = 1; { x = 2; y = 3; } print x;");
        assert_eq!(symtab.len(), 1);
        assert!(symtab.lookup("x").is_some());
        assert!(symtab.lookup("y").is_none());
    }

    #[test]
    fn assignment_to_non_lvalue_is_rejected() {
        let err = parse("a = 1; a + 1 = 2;").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        let err = parse("a = 1; (a) = 2;").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn else_binds_to_the_innermost_if() {
        let (ast, _) = parse_ok("a = 1; if (a) if (a) print 1; else print 2;");
        let root = ast.root().unwrap();
        let NodeKind::Seq(stmts) = &ast[root].kind else { panic!() };
        let NodeKind::If { then, .. } = &ast[stmts[1]].kind else {
            panic!("outer if must have no else branch");
        };
        assert!(matches!(ast[*then].kind, NodeKind::IfElse { .. }));
    }

    #[test]
    fn empty_statement_parses_to_empty_node() {
        let (ast, _) = parse_ok(";;");
        let root = ast.root().unwrap();
        let NodeKind::Seq(stmts) = &ast[root].kind else { panic!() };
        assert_eq!(stmts.len(), 2);
        assert!(matches!(ast[stmts[0]].kind, NodeKind::Empty));
    }

    #[test]
    fn empty_program_parses_to_empty_seq() {
        let (ast, _) = parse_ok("");
        let root = ast.root().unwrap();
        let NodeKind::Seq(stmts) = &ast[root].kind else { panic!() };
        assert!(stmts.is_empty());
    }

    #[test]
    fn missing_semicolon_is_a_parse_error() {
        let err = parse("a = 1").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn unclosed_block_is_a_parse_error_with_balanced_scopes() {
        let err = parse("{ a = 1;").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
