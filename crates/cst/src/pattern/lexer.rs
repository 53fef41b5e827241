// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tokenizer for the pattern language.

use super::PatternError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Tok {
    Ident(String),
    Str(String),
    LAngle,
    RAngle,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Pipe,
    Star,
    Equal,
    Eof,
}

pub(super) struct Lexer<'a> {
    src: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub(super) fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn read_ident(&mut self, start: usize) -> &'a str {
        let mut end = start;
        while let Some(&(idx, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                end = idx + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        &self.src[start..end]
    }

    fn read_string(&mut self, quote: char, start: usize) -> Result<String, PatternError> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, c)) => out.push(c),
                None => return Err(PatternError::UnterminatedString { offset: start }),
            }
        }
    }

    pub(super) fn next_token(&mut self) -> Result<(Tok, usize), PatternError> {
        self.skip_whitespace();
        let Some(&(offset, c)) = self.chars.peek() else {
            return Ok((Tok::Eof, self.src.len()));
        };
        match c {
            '<' => {
                self.chars.next();
                Ok((Tok::LAngle, offset))
            }
            '>' => {
                self.chars.next();
                Ok((Tok::RAngle, offset))
            }
            '(' => {
                self.chars.next();
                Ok((Tok::LParen, offset))
            }
            ')' => {
                self.chars.next();
                Ok((Tok::RParen, offset))
            }
            '[' => {
                self.chars.next();
                Ok((Tok::LBracket, offset))
            }
            ']' => {
                self.chars.next();
                Ok((Tok::RBracket, offset))
            }
            '|' => {
                self.chars.next();
                Ok((Tok::Pipe, offset))
            }
            '*' => {
                self.chars.next();
                Ok((Tok::Star, offset))
            }
            '=' => {
                self.chars.next();
                Ok((Tok::Equal, offset))
            }
            '\'' | '"' => {
                self.chars.next();
                let s = self.read_string(c, offset)?;
                Ok((Tok::Str(s), offset))
            }
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_ident(offset);
                Ok((Tok::Ident(ident.to_string()), offset))
            }
            other => Err(PatternError::UnexpectedChar {
                found: other,
                offset,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(src: &str) -> Vec<Tok> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let (tok, _) = lexer.next_token().unwrap();
            if tok == Tok::Eof {
                break;
            }
            out.push(tok);
        }
        out
    }

    #[test]
    fn lexes_children_anchor() {
        let toks = tokens("funcdef< 'def' name=NAME >");
        assert_eq!(
            toks,
            vec![
                Tok::Ident("funcdef".into()),
                Tok::LAngle,
                Tok::Str("def".into()),
                Tok::Ident("name".into()),
                Tok::Equal,
                Tok::Ident("NAME".into()),
                Tok::RAngle,
            ]
        );
    }

    #[test]
    fn unterminated_string_errors() {
        let mut lexer = Lexer::new("'abc");
        let err = loop {
            match lexer.next_token() {
                Ok((Tok::Eof, _)) => panic!("expected error"),
                Ok(_) => continue,
                Err(e) => break e,
            }
        };
        assert!(matches!(err, PatternError::UnterminatedString { .. }));
    }
}
