// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recursive-descent compiler from pattern text to a [`Pattern`] tree.

use super::lexer::{Lexer, Tok};
use super::{Pattern, PatternError};

/// Compiles pattern text into a [`Pattern`]. Fails loudly on malformed input: a bad pattern is a
/// programmer error that should surface at `Query` build time, never mid-refactor.
pub fn compile(src: &str) -> Result<Pattern, PatternError> {
    let mut parser = Parser::new(src)?;
    let pattern = parser.parse_alternation()?;
    let (tok, offset) = parser.peek().clone();
    if tok != Tok::Eof {
        return Err(PatternError::TrailingInput {
            rest: src[offset..].to_string(),
        });
    }
    Ok(pattern)
}

struct Parser {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Result<Self, PatternError> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        loop {
            let (tok, offset) = lexer.next_token()?;
            let done = tok == Tok::Eof;
            tokens.push((tok, offset));
            if done {
                break;
            }
        }
        Ok(Self { tokens, pos: 0 })
    }

    fn peek(&self) -> &(Tok, usize) {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> (Tok, usize) {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &'static str, pred: impl Fn(&Tok) -> bool) -> Result<Tok, PatternError> {
        if pred(&self.peek().0) {
            Ok(self.advance().0)
        } else {
            let (tok, offset) = self.peek().clone();
            Err(PatternError::Expected {
                expected,
                found: format!("{tok:?}"),
                offset,
            })
        }
    }

    fn parse_alternation(&mut self) -> Result<Pattern, PatternError> {
        let mut branches = vec![self.parse_sequence()?];
        while self.peek().0 == Tok::Pipe {
            self.advance();
            branches.push(self.parse_sequence()?);
        }
        Ok(if branches.len() == 1 {
            branches.pop().unwrap()
        } else {
            Pattern::Alternation(branches)
        })
    }

    fn parse_sequence(&mut self) -> Result<Pattern, PatternError> {
        let mut terms = Vec::new();
        while self.starts_term() {
            terms.push(self.parse_term()?);
        }
        if terms.is_empty() {
            let (tok, offset) = self.peek().clone();
            return Err(PatternError::Expected {
                expected: "a pattern term",
                found: format!("{tok:?}"),
                offset,
            });
        }
        Ok(if terms.len() == 1 {
            terms.pop().unwrap()
        } else {
            Pattern::Sequence(terms)
        })
    }

    fn starts_term(&self) -> bool {
        matches!(
            self.peek().0,
            Tok::Ident(_) | Tok::Str(_) | Tok::LParen | Tok::LBracket
        )
    }

    fn parse_term(&mut self) -> Result<Pattern, PatternError> {
        let atom = self.parse_atom()?;
        if self.peek().0 == Tok::Star {
            self.advance();
            Ok(Pattern::Repeat(Box::new(atom)))
        } else {
            Ok(atom)
        }
    }

    fn parse_atom(&mut self) -> Result<Pattern, PatternError> {
        match self.peek().0.clone() {
            Tok::Str(s) => {
                self.advance();
                Ok(Pattern::Literal(s))
            }
            Tok::LParen => {
                self.advance();
                let inner = self.parse_alternation()?;
                self.expect("`)`", |t| *t == Tok::RParen)?;
                Ok(inner)
            }
            Tok::LBracket => {
                self.advance();
                let inner = self.parse_alternation()?;
                self.expect("`]`", |t| *t == Tok::RBracket)?;
                Ok(Pattern::Optional(Box::new(inner)))
            }
            Tok::Ident(name) => {
                self.advance();
                if name == "any" {
                    return Ok(Pattern::WildcardAny);
                }
                match self.peek().0 {
                    Tok::Equal => {
                        self.advance();
                        let inner = self.parse_atom()?;
                        Ok(Pattern::Capture {
                            name,
                            inner: Box::new(inner),
                        })
                    }
                    Tok::LAngle => {
                        self.advance();
                        let mut children = Vec::new();
                        while self.starts_term() {
                            children.push(self.parse_term()?);
                        }
                        self.expect("`>`", |t| *t == Tok::RAngle)?;
                        Ok(Pattern::ChildrenAnchor { kind: name, children })
                    }
                    _ => Ok(Pattern::TypeAtom(name)),
                }
            }
            other => {
                let offset = self.peek().1;
                Err(PatternError::Expected {
                    expected: "a pattern atom",
                    found: format!("{other:?}"),
                    offset,
                })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn compiles_children_anchor_with_capture() {
        let pattern = compile("funcdef< 'def' name=NAME parameters suite=suite >").unwrap();
        match pattern {
            Pattern::ChildrenAnchor { kind, children } => {
                assert_eq!(kind, "funcdef");
                assert_eq!(children.len(), 4);
                assert_eq!(children[0], Pattern::Literal("def".into()));
                assert_eq!(
                    children[1],
                    Pattern::Capture {
                        name: "name".into(),
                        inner: Box::new(Pattern::TypeAtom("NAME".into())),
                    }
                );
                assert_eq!(children[2], Pattern::TypeAtom("parameters".into()));
            }
            other => panic!("unexpected pattern: {other:?}"),
        }
    }

    #[test]
    fn compiles_alternation_and_optional_and_repeat() {
        let pattern = compile("[ decorators ] (NAME | STRING)* ").unwrap();
        match pattern {
            Pattern::Sequence(terms) => {
                assert_eq!(
                    terms[0],
                    Pattern::Optional(Box::new(Pattern::TypeAtom("decorators".into())))
                );
                assert_eq!(
                    terms[1],
                    Pattern::Repeat(Box::new(Pattern::Alternation(vec![
                        Pattern::TypeAtom("NAME".into()),
                        Pattern::TypeAtom("STRING".into()),
                    ])))
                );
            }
            other => panic!("unexpected pattern: {other:?}"),
        }
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = compile("NAME )").unwrap_err();
        assert!(matches!(err, PatternError::TrailingInput { .. }));
    }

    #[test]
    fn rejects_unclosed_angle() {
        let err = compile("funcdef< 'def' name=NAME").unwrap_err();
        assert!(matches!(err, PatternError::Expected { expected: "`>`", .. }));
    }
}
