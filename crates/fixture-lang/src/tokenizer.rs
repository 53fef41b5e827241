// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lossless tokenizer for the reduced Python-like fixture grammar.
//!
//! Every token carries the exact whitespace and `#`-comment text that preceded it as its
//! `prefix`, and its starting column so the parser can apply the off-side (indentation) rule
//! without the tokenizer emitting synthetic `INDENT`/`DEDENT` leaves itself — those kinds stay
//! in [`codeshift_cst::TokenKind`] for a real lossless grammar to use, but folding the
//! indentation whitespace into the next token's prefix is simpler here and just as lossless.

use codeshift_cst::TokenKind;

use crate::FixtureError;

#[derive(Debug, Clone)]
pub(crate) struct RawToken {
    pub kind: TokenKind,
    pub value: String,
    pub prefix: String,
    pub col: usize,
    pub line: usize,
}

pub(crate) fn tokenize(src: &str) -> Result<Vec<RawToken>, FixtureError> {
    let mut out = Vec::new();
    let mut chars: Vec<char> = src.chars().collect();
    chars.push('\0'); // sentinel
    let mut i = 0usize;
    let mut line = 1usize;
    let mut col = 0usize;
    let mut prefix = String::new();

    macro_rules! bump {
        () => {{
            let c = chars[i];
            i += 1;
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
            c
        }};
    }

    loop {
        // Accumulate whitespace and comments into `prefix`.
        loop {
            match chars[i] {
                '\0' => break,
                c if c.is_whitespace() => {
                    prefix.push(c);
                    bump!();
                }
                '#' => {
                    while chars[i] != '\n' && chars[i] != '\0' {
                        prefix.push(bump!());
                    }
                }
                _ => break,
            }
        }

        if chars[i] == '\0' {
            break;
        }

        let start_col = col;
        let start_line = line;
        let c = chars[i];

        let (kind, value) = if c.is_alphabetic() || c == '_' {
            let mut value = String::new();
            while chars[i].is_alphanumeric() || chars[i] == '_' {
                value.push(bump!());
            }
            (TokenKind::Name, value)
        } else if c.is_ascii_digit() {
            let mut value = String::new();
            while chars[i].is_ascii_digit() || chars[i] == '.' {
                value.push(bump!());
            }
            (TokenKind::Number, value)
        } else if c == '\'' || c == '"' {
            let quote = c;
            let mut value = String::new();
            value.push(bump!());
            loop {
                match chars[i] {
                    '\0' => {
                        return Err(FixtureError::UnterminatedString {
                            line: start_line,
                            col: start_col,
                        });
                    }
                    q if q == quote => {
                        value.push(bump!());
                        break;
                    }
                    '\\' => {
                        value.push(bump!());
                        if chars[i] != '\0' {
                            value.push(bump!());
                        }
                    }
                    _ => value.push(bump!()),
                }
            }
            (TokenKind::StringTok, value)
        } else {
            single_char_token(&mut || bump!(), c, start_line, start_col)?
        };

        out.push(RawToken {
            kind,
            value,
            prefix: std::mem::take(&mut prefix),
            col: start_col,
            line: start_line,
        });
    }

    out.push(RawToken {
        kind: TokenKind::EndMarker,
        value: String::new(),
        prefix: std::mem::take(&mut prefix),
        col,
        line,
    });
    Ok(out)
}

fn single_char_token(
    bump: &mut impl FnMut() -> char,
    c: char,
    line: usize,
    col: usize,
) -> Result<(TokenKind, String), FixtureError> {
    // Two-character operators are checked by peeking via a second bump only when the first
    // char matches one of the compound operators' leading characters.
    let first = bump();
    debug_assert_eq!(first, c);
    Ok(match c {
        '(' => (TokenKind::LPar, "(".into()),
        ')' => (TokenKind::RPar, ")".into()),
        '[' => (TokenKind::LSqb, "[".into()),
        ']' => (TokenKind::RSqb, "]".into()),
        '{' => (TokenKind::LBrace, "{".into()),
        '}' => (TokenKind::RBrace, "}".into()),
        ',' => (TokenKind::Comma, ",".into()),
        ':' => (TokenKind::Colon, ":".into()),
        '.' => (TokenKind::Dot, ".".into()),
        ';' => (TokenKind::Semi, ";".into()),
        '@' => (TokenKind::At, "@".into()),
        '+' => (TokenKind::Plus, "+".into()),
        '-' => (TokenKind::Minus, "-".into()),
        '/' => (TokenKind::Slash, "/".into()),
        '%' => (TokenKind::Percent, "%".into()),
        '*' => (TokenKind::Star, "*".into()),
        '=' => (TokenKind::Equal, "=".into()),
        '<' => (TokenKind::Less, "<".into()),
        '>' => (TokenKind::Greater, ">".into()),
        '!' => (TokenKind::NotEqual, "!".into()),
        other => return Err(FixtureError::UnexpectedChar { found: other, line, col }),
    })
}

/// Folds adjacent `*`/`**`, `==`/`!=`/`<=`/`>=`, and `->` pairs produced by the single-character
/// scan above into their compound forms. Kept as a post-pass so the scanner above stays a
/// straightforward one-char-at-a-time loop.
pub(crate) fn fold_compound_operators(tokens: Vec<RawToken>) -> Vec<RawToken> {
    let mut out: Vec<RawToken> = Vec::with_capacity(tokens.len());
    for tok in tokens {
        let fold = out.last().is_some_and(|prev| {
            prev.prefix.is_empty()
                && matches!(
                    (prev.kind, tok.kind),
                    (TokenKind::Star, TokenKind::Star)
                        | (TokenKind::Equal, TokenKind::Equal)
                        | (TokenKind::NotEqual, TokenKind::Equal)
                        | (TokenKind::Less, TokenKind::Equal)
                        | (TokenKind::Greater, TokenKind::Equal)
                        | (TokenKind::Minus, TokenKind::Greater)
                )
        });
        if fold {
            let prev = out.last_mut().unwrap();
            let new_kind = match (prev.kind, tok.kind) {
                (TokenKind::Star, TokenKind::Star) => TokenKind::DoubleStar,
                (TokenKind::Equal, TokenKind::Equal) => TokenKind::EqEqual,
                (TokenKind::NotEqual, TokenKind::Equal) => TokenKind::NotEqual,
                (TokenKind::Less, TokenKind::Equal) => TokenKind::LessEqual,
                (TokenKind::Greater, TokenKind::Equal) => TokenKind::GreaterEqual,
                (TokenKind::Minus, TokenKind::Greater) => TokenKind::Arrow,
                _ => unreachable!(),
            };
            prev.kind = new_kind;
            prev.value.push_str(&tok.value);
        } else {
            out.push(tok);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn values(src: &str) -> Vec<(TokenKind, String)> {
        let toks = fold_compound_operators(tokenize(src).unwrap());
        toks.into_iter().map(|t| (t.kind, t.value)).collect()
    }

    #[test]
    fn tokenizes_simple_assignment() {
        let toks = values("x = 1");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Name, "x".into()),
                (TokenKind::Equal, "=".into()),
                (TokenKind::Number, "1".into()),
                (TokenKind::EndMarker, String::new()),
            ]
        );
    }

    #[test]
    fn folds_compound_operators() {
        let toks = values("a ** b != c");
        assert_eq!(toks[1].0, TokenKind::DoubleStar);
        assert_eq!(toks[3].0, TokenKind::NotEqual);
    }

    #[test]
    fn comment_becomes_prefix_of_next_token() {
        let toks = fold_compound_operators(tokenize("x = 1  # trailing\ny = 2").unwrap());
        let y_tok = toks.iter().find(|t| t.value == "y").unwrap();
        assert!(y_tok.prefix.contains("# trailing"));
    }
}
