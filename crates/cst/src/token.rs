// SPDX-License-Identifier: MIT OR Apache-2.0
//! Symbolic token and nonterminal kinds.
//!
//! The concrete grammar is an external collaborator (ยง1): this module only defines the
//! *symbolic enumeration* the pattern matcher and selector templates are written against.
//! [`crate::fixture`] style parsers populate a [`crate::Tree`] with these kinds; a production
//! deployment would swap in a lossless parser for the target language without touching the
//! matcher.

use std::fmt;

/// Kind of a leaf token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
    Name,
    Number,
    StringTok,
    Newline,
    Indent,
    Dedent,
    EndMarker,
    Comment,
    LPar,
    RPar,
    LSqb,
    RSqb,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Equal,
    Star,
    DoubleStar,
    Plus,
    Minus,
    Slash,
    Percent,
    EqEqual,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Semi,
    Arrow,
    At,
    /// An opaque, pre-rendered chunk of source text. The IMR uses this to splice an argument's
    /// value back into a rebuilt argument list without re-parsing it: the rebuilt list is a
    /// terminal edit (ยง5 — a replaced subtree is never re-matched), so the value never needs to
    /// be anything more than its own exact text again.
    Verbatim,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Number => "NUMBER",
            Self::StringTok => "STRING",
            Self::Newline => "NEWLINE",
            Self::Indent => "INDENT",
            Self::Dedent => "DEDENT",
            Self::EndMarker => "ENDMARKER",
            Self::Comment => "COMMENT",
            Self::LPar => "LPAR",
            Self::RPar => "RPAR",
            Self::LSqb => "LSQB",
            Self::RSqb => "RSQB",
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::Comma => "COMMA",
            Self::Colon => "COLON",
            Self::Dot => "DOT",
            Self::Equal => "EQUAL",
            Self::Star => "STAR",
            Self::DoubleStar => "DOUBLESTAR",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Slash => "SLASH",
            Self::Percent => "PERCENT",
            Self::EqEqual => "EQEQUAL",
            Self::NotEqual => "NOTEQUAL",
            Self::Less => "LESS",
            Self::Greater => "GREATER",
            Self::LessEqual => "LESSEQUAL",
            Self::GreaterEqual => "GREATEREQUAL",
            Self::Semi => "SEMI",
            Self::Arrow => "ARROW",
            Self::At => "AT",
            Self::Verbatim => "VERBATIM",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "NAME" => Self::Name,
            "NUMBER" => Self::Number,
            "STRING" => Self::StringTok,
            "NEWLINE" => Self::Newline,
            "INDENT" => Self::Indent,
            "DEDENT" => Self::Dedent,
            "ENDMARKER" => Self::EndMarker,
            "COMMENT" => Self::Comment,
            "LPAR" => Self::LPar,
            "RPAR" => Self::RPar,
            "LSQB" => Self::LSqb,
            "RSQB" => Self::RSqb,
            "LBRACE" => Self::LBrace,
            "RBRACE" => Self::RBrace,
            "COMMA" => Self::Comma,
            "COLON" => Self::Colon,
            "DOT" => Self::Dot,
            "EQUAL" => Self::Equal,
            "STAR" => Self::Star,
            "DOUBLESTAR" => Self::DoubleStar,
            "PLUS" => Self::Plus,
            "MINUS" => Self::Minus,
            "SLASH" => Self::Slash,
            "PERCENT" => Self::Percent,
            "EQEQUAL" => Self::EqEqual,
            "NOTEQUAL" => Self::NotEqual,
            "LESS" => Self::Less,
            "GREATER" => Self::Greater,
            "LESSEQUAL" => Self::LessEqual,
            "GREATEREQUAL" => Self::GreaterEqual,
            "SEMI" => Self::Semi,
            "ARROW" => Self::Arrow,
            "AT" => Self::At,
            "VERBATIM" => Self::Verbatim,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an interior (non-leaf) node.
///
/// Names mirror the spec's grammar vocabulary (ยง4.2-4.3) so that selector templates and
/// pattern text read the same as the component design: `funcdef`, `classdef`, `power`,
/// `trailer`, `typedargslist`, `arglist`, `argument`, `star_expr`, `tname`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NonterminalKind {
    FileInput,
    Suite,
    SimpleStmt,
    ExprStmt,
    Funcdef,
    Parameters,
    Typedargslist,
    Tname,
    Tfpdef,
    Classdef,
    Arglist,
    Argument,
    StarExpr,
    Power,
    Trailer,
    Atom,
    Testlist,
    DottedName,
    DottedAsName,
    ImportName,
    ImportFrom,
    ImportAsNames,
    ArithExpr,
    Term,
    Comparison,
    Decorator,
    Decorators,
    Decorated,
    ReturnStmt,
    PassStmt,
    List,
}

impl NonterminalKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileInput => "file_input",
            Self::Suite => "suite",
            Self::SimpleStmt => "simple_stmt",
            Self::ExprStmt => "expr_stmt",
            Self::Funcdef => "funcdef",
            Self::Parameters => "parameters",
            Self::Typedargslist => "typedargslist",
            Self::Tname => "tname",
            Self::Tfpdef => "tfpdef",
            Self::Classdef => "classdef",
            Self::Arglist => "arglist",
            Self::Argument => "argument",
            Self::StarExpr => "star_expr",
            Self::Power => "power",
            Self::Trailer => "trailer",
            Self::Atom => "atom",
            Self::Testlist => "testlist",
            Self::DottedName => "dotted_name",
            Self::DottedAsName => "dotted_as_name",
            Self::ImportName => "import_name",
            Self::ImportFrom => "import_from",
            Self::ImportAsNames => "import_as_names",
            Self::ArithExpr => "arith_expr",
            Self::Term => "term",
            Self::Comparison => "comparison",
            Self::Decorator => "decorator",
            Self::Decorators => "decorators",
            Self::Decorated => "decorated",
            Self::ReturnStmt => "return_stmt",
            Self::PassStmt => "pass_stmt",
            Self::List => "list",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "file_input" => Self::FileInput,
            "suite" => Self::Suite,
            "simple_stmt" => Self::SimpleStmt,
            "expr_stmt" => Self::ExprStmt,
            "funcdef" => Self::Funcdef,
            "parameters" => Self::Parameters,
            "typedargslist" => Self::Typedargslist,
            "tname" => Self::Tname,
            "tfpdef" => Self::Tfpdef,
            "classdef" => Self::Classdef,
            "arglist" => Self::Arglist,
            "argument" => Self::Argument,
            "star_expr" => Self::StarExpr,
            "power" => Self::Power,
            "trailer" => Self::Trailer,
            "atom" => Self::Atom,
            "testlist" => Self::Testlist,
            "dotted_name" => Self::DottedName,
            "dotted_as_name" => Self::DottedAsName,
            "import_name" => Self::ImportName,
            "import_from" => Self::ImportFrom,
            "import_as_names" => Self::ImportAsNames,
            "arith_expr" => Self::ArithExpr,
            "term" => Self::Term,
            "comparison" => Self::Comparison,
            "decorator" => Self::Decorator,
            "decorators" => Self::Decorators,
            "decorated" => Self::Decorated,
            "return_stmt" => Self::ReturnStmt,
            "pass_stmt" => Self::PassStmt,
            "list" => Self::List,
            _ => return None,
        })
    }
}

impl fmt::Display for NonterminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
