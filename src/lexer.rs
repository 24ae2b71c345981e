use crate::error::{Diag, LexError, LexErrorKind, Span};
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

// =============================================================================
// 0. Shared helpers
// =============================================================================

/// Byte length of the `·lit` prefix of an anonymous-separator token.
pub const ANON_PREFIX_LEN: usize = "·lit".len();

/// Digits following `·lit`, if any.
#[inline]
pub fn anon_digits(slice: &str) -> &str {
    slice.get(ANON_PREFIX_LEN..).unwrap_or_default()
}

// =============================================================================
// 1. Token definition (RawTok)
// =============================================================================

#[repr(u8)]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t]+")]
#[rustfmt::skip]
enum RawTok {
    // Anonymous function separator with optional index: `·lit`, `·lit12`
    #[regex(r"·lit[0-9]*")] AnonLit,

    // Opaque text: identifiers, path segments, type expressions, values.
    #[regex(r"[^.()*\[\]@{}:,·\s\x00-\x1F\x7F]+")] Text,

    // Structural glyphs
    #[token(".")] Dot,
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("*")] Star,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("@")] At,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(":")] Colon,
    #[token(",")] Comma,

    // Catch-all (lowest priority)
    #[regex(r".", priority = 0)] Error,
}

// =============================================================================
// 2. Raw -> public token
// =============================================================================

impl RawTok {
    #[inline]
    const fn to_token<'src>(self, slice: &'src str) -> Tok<'src> {
        macro_rules! simple_tok {
            ($($raw:ident => $tok:ident),* $(,)?) => {
                match self {
                    Self::Text => Tok::Text(slice),
                    Self::AnonLit => Tok::AnonLit(slice),
                    $(Self::$raw => Tok::$tok,)*
                }
            };
        }

        simple_tok! {
            Dot => Dot, LParen => LParen, RParen => RParen, Star => Star, LBrack => LBrack,
            RBrack => RBrack, At => At, LBrace => LBrace, RBrace => RBrace, Colon => Colon,
            Comma => Comma, Error => Error,
        }
    }
}

// =============================================================================
// 3. Public token definition (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'input> {
    Text(&'input str),
    AnonLit(&'input str),

    Dot,
    LParen,
    RParen,
    Star,
    LBrack,
    RBrack,
    At,
    LBrace,
    RBrace,
    Colon,
    Comma,

    Error,
}

impl<'input> Tok<'input> {
    /// Single-glyph tokens reserved by the canonical grammar.
    #[inline]
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Tok::Text(_) | Tok::AnonLit(_) | Tok::Error)
    }
}

impl<'input> std::fmt::Display for Tok<'input> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Text(s) | Tok::AnonLit(s) => f.write_str(s),
            Tok::Dot => f.write_str("."),
            Tok::LParen => f.write_str("("),
            Tok::RParen => f.write_str(")"),
            Tok::Star => f.write_str("*"),
            Tok::LBrack => f.write_str("["),
            Tok::RBrack => f.write_str("]"),
            Tok::At => f.write_str("@"),
            Tok::LBrace => f.write_str("{"),
            Tok::RBrace => f.write_str("}"),
            Tok::Colon => f.write_str(":"),
            Tok::Comma => f.write_str(","),
            Tok::Error => f.write_str("<error>"),
        }
    }
}

// =============================================================================
// 4. Lexer wrapper: spans + diags
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    diags: Vec<Diag>,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            diags: Vec::new(),
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    #[inline]
    fn push_lex_diag(&mut self, kind: LexErrorKind, span: Range<usize>) {
        let sp = Span::from_range(span);
        self.diags.push(LexError { kind, span: sp }.diag());
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.logos.next()?;
        let span = self.logos.span();

        match raw {
            Ok(RawTok::Error) => {
                self.push_lex_diag(LexErrorKind::InvalidCharacter, span.clone());
                Some((span.start, Tok::Error, span.end))
            }
            Ok(raw) => Some((span.start, raw.to_token(self.logos.slice()), span.end)),
            Err(kind) => {
                self.push_lex_diag(kind, span.clone());
                Some((span.start, Tok::Error, span.end))
            }
        }
    }
}

/// Lex the whole input, returning tokens and any lexical diagnostics.
pub fn lex_all(input: &str) -> (Vec<(usize, Tok<'_>, usize)>, Vec<Diag>) {
    let mut lx = Lexer::new(input);
    let toks: Vec<_> = lx.by_ref().collect();
    let diags = lx.take_diags();
    (toks, diags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_digits_after_prefix() {
        assert_eq!(anon_digits("·lit"), "");
        assert_eq!(anon_digits("·lit42"), "42");
    }

    #[test]
    fn structural_classification() {
        assert!(Tok::Dot.is_structural());
        assert!(Tok::Comma.is_structural());
        assert!(!Tok::Text("x").is_structural());
        assert!(!Tok::AnonLit("·lit").is_structural());
        assert!(!Tok::Error.is_structural());
    }
}
