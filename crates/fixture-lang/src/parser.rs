// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recursive-descent parser building a [`codeshift_cst::Tree`] from the fixture token stream.
//!
//! Suites are block-form only (`def f():` followed by an indented body on the next line) — the
//! single-line `if x: pass` form isn't supported, since this grammar exists to exercise the
//! pattern matcher and IMR on realistic multi-line definitions, not to be a complete parser.

use codeshift_cst::{NonterminalKind, NodeId, Tree, TokenKind};

use crate::tokenizer::{RawToken, fold_compound_operators, tokenize};
use crate::FixtureError;

pub(crate) fn parse(src: &str) -> Result<Tree, FixtureError> {
    let tokens = fold_compound_operators(tokenize(src)?);
    let mut parser = Parser {
        tokens,
        pos: 0,
        tree: Tree::new(NonterminalKind::FileInput),
    };
    let stmts = parser.parse_block(-1)?;
    let root = parser.tree.root();
    parser.tree.set_children(root, stmts);
    if !parser.at_end() {
        let tok = parser.peek();
        return Err(FixtureError::UnexpectedToken {
            found: tok.value.clone(),
            line: tok.line,
            col: tok.col,
        });
    }
    Ok(parser.tree)
}

struct Parser {
    tokens: Vec<RawToken>,
    pos: usize,
    tree: Tree,
}

impl Parser {
    fn peek(&self) -> &RawToken {
        &self.tokens[self.pos]
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndMarker
    }

    fn advance(&mut self) -> RawToken {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn leaf(&mut self) -> NodeId {
        let tok = self.advance();
        self.tree.new_leaf(tok.kind, tok.value, tok.prefix)
    }

    fn is_value(&self, value: &str) -> bool {
        self.peek().kind == TokenKind::Name && self.peek().value == value
    }

    fn expect_kind(&mut self, kind: TokenKind, what: &'static str) -> Result<NodeId, FixtureError> {
        if self.peek().kind == kind {
            Ok(self.leaf())
        } else {
            let tok = self.peek();
            Err(FixtureError::Expected {
                expected: what,
                found: tok.value.clone(),
                line: tok.line,
                col: tok.col,
            })
        }
    }

    fn expect_value(&mut self, value: &'static str) -> Result<NodeId, FixtureError> {
        if self.is_value(value) {
            Ok(self.leaf())
        } else {
            let tok = self.peek();
            Err(FixtureError::Expected {
                expected: value,
                found: tok.value.clone(),
                line: tok.line,
                col: tok.col,
            })
        }
    }

    /// Parses statements whose column equals the first statement's column, which must exceed
    /// `enclosing_indent`. Used both for the file's top level (`enclosing_indent == -1`) and for
    /// a `def`/`class` suite body.
    fn parse_block(&mut self, enclosing_indent: isize) -> Result<Vec<NodeId>, FixtureError> {
        if self.at_end() {
            return Ok(Vec::new());
        }
        let block_indent = self.peek().col as isize;
        if block_indent <= enclosing_indent {
            let tok = self.peek();
            return Err(FixtureError::BadIndent {
                line: tok.line,
                col: tok.col,
            });
        }
        let mut stmts = Vec::new();
        while !self.at_end() && self.peek().col as isize == block_indent {
            stmts.push(self.parse_statement(block_indent)?);
        }
        Ok(stmts)
    }

    fn parse_statement(&mut self, indent: isize) -> Result<NodeId, FixtureError> {
        if self.peek().kind == TokenKind::At {
            return self.parse_decorated(indent);
        }
        if self.is_value("def") {
            return self.parse_funcdef(indent);
        }
        if self.is_value("class") {
            return self.parse_classdef(indent);
        }
        self.parse_simple_stmt()
    }

    fn parse_decorated(&mut self, indent: isize) -> Result<NodeId, FixtureError> {
        let decorator_indent = self.peek().col as isize;
        let mut decorators = Vec::new();
        while self.peek().kind == TokenKind::At {
            decorators.push(self.parse_decorator()?);
        }
        let inner = if self.is_value("def") {
            self.parse_funcdef(indent)?
        } else {
            self.parse_classdef(indent)?
        };
        let _ = decorator_indent;
        let decorators_node = self.tree.new_node(NonterminalKind::Decorators, decorators);
        Ok(self
            .tree
            .new_node(NonterminalKind::Decorated, vec![decorators_node, inner]))
    }

    fn parse_decorator(&mut self) -> Result<NodeId, FixtureError> {
        let at = self.leaf();
        let name = self.parse_dotted_name()?;
        let mut children = vec![at, name];
        if self.peek().kind == TokenKind::LPar {
            children.push(self.leaf());
            if self.peek().kind != TokenKind::RPar {
                children.push(self.parse_arglist()?);
            }
            children.push(self.expect_kind(TokenKind::RPar, "`)`")?);
        }
        Ok(self.tree.new_node(NonterminalKind::Decorator, children))
    }

    fn parse_funcdef(&mut self, indent: isize) -> Result<NodeId, FixtureError> {
        let def_kw = self.expect_value("def")?;
        let name = self.expect_kind(TokenKind::Name, "a function name")?;
        let parameters = self.parse_parameters()?;
        let colon = self.expect_kind(TokenKind::Colon, "`:`")?;
        let body = self.parse_block(indent)?;
        let suite = self.tree.new_node(NonterminalKind::Suite, body);
        Ok(self
            .tree
            .new_node(NonterminalKind::Funcdef, vec![def_kw, name, parameters, colon, suite]))
    }

    fn parse_classdef(&mut self, indent: isize) -> Result<NodeId, FixtureError> {
        let class_kw = self.expect_value("class")?;
        let name = self.expect_kind(TokenKind::Name, "a class name")?;
        let mut children = vec![class_kw, name];
        if self.peek().kind == TokenKind::LPar {
            children.push(self.leaf());
            if self.peek().kind != TokenKind::RPar {
                children.push(self.parse_arglist()?);
            }
            children.push(self.expect_kind(TokenKind::RPar, "`)`")?);
        }
        children.push(self.expect_kind(TokenKind::Colon, "`:`")?);
        let body = self.parse_block(indent)?;
        children.push(self.tree.new_node(NonterminalKind::Suite, body));
        Ok(self.tree.new_node(NonterminalKind::Classdef, children))
    }

    fn parse_parameters(&mut self) -> Result<NodeId, FixtureError> {
        let lpar = self.expect_kind(TokenKind::LPar, "`(`")?;
        let mut children = vec![lpar];
        if self.peek().kind != TokenKind::RPar {
            children.push(self.parse_typedargslist()?);
        }
        children.push(self.expect_kind(TokenKind::RPar, "`)`")?);
        Ok(self.tree.new_node(NonterminalKind::Parameters, children))
    }

    fn parse_typedargslist(&mut self) -> Result<NodeId, FixtureError> {
        let mut children = vec![self.parse_tname_or_star()?];
        while self.peek().kind == TokenKind::Comma {
            children.push(self.leaf());
            if matches!(self.peek().kind, TokenKind::RPar) {
                break; // trailing comma
            }
            children.push(self.parse_tname_or_star()?);
        }
        Ok(self.tree.new_node(NonterminalKind::Typedargslist, children))
    }

    fn parse_tname_or_star(&mut self) -> Result<NodeId, FixtureError> {
        if matches!(self.peek().kind, TokenKind::Star | TokenKind::DoubleStar) {
            let op = self.leaf();
            let name = self.expect_kind(TokenKind::Name, "a parameter name")?;
            return Ok(self.tree.new_node(NonterminalKind::StarExpr, vec![op, name]));
        }
        let name = self.expect_kind(TokenKind::Name, "a parameter name")?;
        let mut children = vec![name];
        if self.peek().kind == TokenKind::Equal {
            children.push(self.leaf());
            children.push(self.parse_test()?);
        }
        Ok(self.tree.new_node(NonterminalKind::Tname, children))
    }

    fn parse_arglist(&mut self) -> Result<NodeId, FixtureError> {
        let mut children = vec![self.parse_argument()?];
        while self.peek().kind == TokenKind::Comma {
            children.push(self.leaf());
            if matches!(self.peek().kind, TokenKind::RPar) {
                break;
            }
            children.push(self.parse_argument()?);
        }
        Ok(self.tree.new_node(NonterminalKind::Arglist, children))
    }

    fn parse_argument(&mut self) -> Result<NodeId, FixtureError> {
        if matches!(self.peek().kind, TokenKind::Star | TokenKind::DoubleStar) {
            let op = self.leaf();
            let value = self.parse_test()?;
            return Ok(self.tree.new_node(NonterminalKind::Argument, vec![op, value]));
        }
        let is_keyword = self.peek().kind == TokenKind::Name && self.tokens[self.pos + 1].kind == TokenKind::Equal;
        if is_keyword {
            let name = self.leaf();
            let equal = self.leaf();
            let value = self.parse_test()?;
            return Ok(self
                .tree
                .new_node(NonterminalKind::Argument, vec![name, equal, value]));
        }
        let value = self.parse_test()?;
        Ok(self.tree.new_node(NonterminalKind::Argument, vec![value]))
    }

    fn parse_simple_stmt(&mut self) -> Result<NodeId, FixtureError> {
        let inner = if self.is_value("pass") {
            let kw = self.leaf();
            self.tree.new_node(NonterminalKind::PassStmt, vec![kw])
        } else if self.is_value("return") {
            let kw = self.leaf();
            let mut children = vec![kw];
            if !self.starts_test() {
                // bare return
            } else {
                children.push(self.parse_testlist()?);
            }
            self.tree.new_node(NonterminalKind::ReturnStmt, children)
        } else if self.is_value("import") {
            self.parse_import_name()?
        } else if self.is_value("from") {
            self.parse_import_from()?
        } else {
            self.parse_expr_stmt()?
        };
        Ok(self.tree.new_node(NonterminalKind::SimpleStmt, vec![inner]))
    }

    fn parse_import_name(&mut self) -> Result<NodeId, FixtureError> {
        let kw = self.expect_value("import")?;
        let mut children = vec![kw, self.parse_dotted_as_name()?];
        while self.peek().kind == TokenKind::Comma {
            children.push(self.leaf());
            children.push(self.parse_dotted_as_name()?);
        }
        Ok(self.tree.new_node(NonterminalKind::ImportName, children))
    }

    fn parse_import_from(&mut self) -> Result<NodeId, FixtureError> {
        let kw = self.expect_value("from")?;
        let module = self.parse_dotted_name()?;
        let import_kw = self.expect_value("import")?;
        let mut children = vec![kw, module, import_kw];
        if self.peek().kind == TokenKind::Star {
            children.push(self.leaf());
        } else {
            let mut names = vec![self.parse_dotted_as_name()?];
            while self.peek().kind == TokenKind::Comma {
                names.push(self.leaf());
                names.push(self.parse_dotted_as_name()?);
            }
            children.push(self.tree.new_node(NonterminalKind::ImportAsNames, names));
        }
        Ok(self.tree.new_node(NonterminalKind::ImportFrom, children))
    }

    fn parse_dotted_as_name(&mut self) -> Result<NodeId, FixtureError> {
        let name = self.parse_dotted_name()?;
        if self.is_value("as") {
            let as_kw = self.leaf();
            let alias = self.expect_kind(TokenKind::Name, "an alias")?;
            return Ok(self
                .tree
                .new_node(NonterminalKind::DottedAsName, vec![name, as_kw, alias]));
        }
        Ok(name)
    }

    fn parse_dotted_name(&mut self) -> Result<NodeId, FixtureError> {
        let mut children = vec![self.expect_kind(TokenKind::Name, "a name")?];
        while self.peek().kind == TokenKind::Dot {
            children.push(self.leaf());
            children.push(self.expect_kind(TokenKind::Name, "a name")?);
        }
        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            self.tree.new_node(NonterminalKind::DottedName, children)
        })
    }

    fn parse_expr_stmt(&mut self) -> Result<NodeId, FixtureError> {
        let lhs = self.parse_testlist()?;
        if self.peek().kind == TokenKind::Equal {
            let equal = self.leaf();
            let rhs = self.parse_testlist()?;
            return Ok(self
                .tree
                .new_node(NonterminalKind::ExprStmt, vec![lhs, equal, rhs]));
        }
        Ok(self.tree.new_node(NonterminalKind::ExprStmt, vec![lhs]))
    }

    fn starts_test(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Name | TokenKind::Number | TokenKind::StringTok | TokenKind::LPar | TokenKind::LSqb
        )
    }

    fn parse_testlist(&mut self) -> Result<NodeId, FixtureError> {
        let mut children = vec![self.parse_test()?];
        while self.peek().kind == TokenKind::Comma {
            children.push(self.leaf());
            if !self.starts_test() {
                break; // trailing comma
            }
            children.push(self.parse_test()?);
        }
        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            self.tree.new_node(NonterminalKind::Testlist, children)
        })
    }

    fn parse_test(&mut self) -> Result<NodeId, FixtureError> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<NodeId, FixtureError> {
        let lhs = self.parse_arith_expr()?;
        if matches!(
            self.peek().kind,
            TokenKind::EqEqual
                | TokenKind::NotEqual
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
        ) {
            let op = self.leaf();
            let rhs = self.parse_arith_expr()?;
            return Ok(self
                .tree
                .new_node(NonterminalKind::Comparison, vec![lhs, op, rhs]));
        }
        Ok(lhs)
    }

    fn parse_arith_expr(&mut self) -> Result<NodeId, FixtureError> {
        let mut children = vec![self.parse_term()?];
        while matches!(self.peek().kind, TokenKind::Plus | TokenKind::Minus) {
            children.push(self.leaf());
            children.push(self.parse_term()?);
        }
        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            self.tree.new_node(NonterminalKind::ArithExpr, children)
        })
    }

    fn parse_term(&mut self) -> Result<NodeId, FixtureError> {
        let mut children = vec![self.parse_power()?];
        while matches!(self.peek().kind, TokenKind::Star | TokenKind::Slash | TokenKind::Percent) {
            children.push(self.leaf());
            children.push(self.parse_power()?);
        }
        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            self.tree.new_node(NonterminalKind::Term, children)
        })
    }

    fn parse_power(&mut self) -> Result<NodeId, FixtureError> {
        let atom = self.parse_atom()?;
        let mut children = vec![atom];
        while matches!(self.peek().kind, TokenKind::Dot | TokenKind::LPar | TokenKind::LSqb) {
            children.push(self.parse_trailer()?);
        }
        Ok(if children.len() == 1 {
            children.pop().unwrap()
        } else {
            self.tree.new_node(NonterminalKind::Power, children)
        })
    }

    fn parse_trailer(&mut self) -> Result<NodeId, FixtureError> {
        match self.peek().kind {
            TokenKind::Dot => {
                let dot = self.leaf();
                let name = self.expect_kind(TokenKind::Name, "an attribute name")?;
                Ok(self.tree.new_node(NonterminalKind::Trailer, vec![dot, name]))
            }
            TokenKind::LPar => {
                let lpar = self.leaf();
                let mut children = vec![lpar];
                if self.peek().kind != TokenKind::RPar {
                    children.push(self.parse_arglist()?);
                }
                children.push(self.expect_kind(TokenKind::RPar, "`)`")?);
                Ok(self.tree.new_node(NonterminalKind::Trailer, children))
            }
            TokenKind::LSqb => {
                let lsqb = self.leaf();
                let index = self.parse_test()?;
                let rsqb = self.expect_kind(TokenKind::RSqb, "`]`")?;
                Ok(self
                    .tree
                    .new_node(NonterminalKind::Trailer, vec![lsqb, index, rsqb]))
            }
            _ => unreachable!("parse_trailer called without a trailer lookahead"),
        }
    }

    fn parse_atom(&mut self) -> Result<NodeId, FixtureError> {
        match self.peek().kind {
            TokenKind::Name | TokenKind::Number | TokenKind::StringTok => Ok(self.leaf()),
            TokenKind::LPar => {
                let lpar = self.leaf();
                let inner = self.parse_testlist()?;
                let rpar = self.expect_kind(TokenKind::RPar, "`)`")?;
                Ok(self.tree.new_node(NonterminalKind::Atom, vec![lpar, inner, rpar]))
            }
            TokenKind::LSqb => {
                let lsqb = self.leaf();
                let mut children = vec![lsqb];
                if self.peek().kind != TokenKind::RSqb {
                    children.push(self.parse_testlist()?);
                }
                children.push(self.expect_kind(TokenKind::RSqb, "`]`")?);
                Ok(self.tree.new_node(NonterminalKind::List, children))
            }
            _ => {
                let tok = self.peek();
                Err(FixtureError::Expected {
                    expected: "an expression",
                    found: tok.value.clone(),
                    line: tok.line,
                    col: tok.col,
                })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_and_round_trips_funcdef() {
        let src = "def greet(name, greeting='hi'):\n    return greeting\n";
        let tree = parse(src).unwrap();
        assert_eq!(tree.text(tree.root()), src);
    }

    #[test]
    fn parses_call_site_with_keyword_argument() {
        let src = "result = greet(user.name, greeting='hello')\n";
        let tree = parse(src).unwrap();
        assert_eq!(tree.text(tree.root()), src);
    }

    #[test]
    fn parses_classdef_with_bases_and_decorator() {
        let src = "@final\nclass Dog(Animal):\n    def bark(self):\n        pass\n";
        let tree = parse(src).unwrap();
        assert_eq!(tree.text(tree.root()), src);
    }

    #[test]
    fn rejects_bad_indentation() {
        let src = "def f():\n    pass\n   pass\n";
        let err = parse(src).unwrap_err();
        assert!(matches!(err, FixtureError::UnexpectedToken { .. } | FixtureError::BadIndent { .. }));
    }
}
