//! # Canonical parser
//!
//! Decodes canonical notation into a [`Symbol`]. The grammar is ambiguous when
//! read left to right (a `.` may separate package segments, the package from
//! the member, or the receiver from the method), so decoding peels the input
//! from the outside in. Rules are applied in this order over the token stream
//! produced by [`crate::lexer::Lexer`]:
//!
//! ```text
//! symbol    := head context? metadata?
//! metadata  := '{' entry (',' entry)* '}'        -- outermost trailing group, '[' depth 0
//! entry     := key ':' value                     -- split at top-level ',' and first ':'
//! context   := '@' TEXT ...                      -- first '@' at '[' / '(' depth 0
//! head      := package '.' member                -- split rule below
//! member    := 'init'
//!            | mname ANON_LIT targs?             -- `name·lit3[int]`
//!            | receiver '.' name targs?
//!            | name targs?
//! mname     := receiver '.' name | name
//! receiver  := '(' '*'? TEXT targs? ')'
//! targs     := '[' list ']'                      -- first '[' .. last ']'
//! ```
//!
//! The package/member split prefers the receiver: the last `).` pair selects
//! the receiver whose `(` is preceded by the package dot. Without a receiver,
//! the split is the last `.` before the first `[`, or the last `.` overall.
//!
//! Opaque parts (type expressions, context, metadata values) are sliced out of
//! the source between token spans, so their inner whitespace is preserved.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{ParseError, ParseErrorKind, Span};
use crate::lexer::{anon_digits, lex_all, Tok};
use crate::symbol::{Metadata, Receiver, Symbol};

type Spanned<'src> = (usize, Tok<'src>, usize);

/// Parse a canonical symbol string.
pub fn parse(input: &str) -> Result<Symbol, ParseError> {
    let result = parse_inner(input);
    match &result {
        Ok(sym) => trace!(input, package = %sym.package_path, name = %sym.name, "parsed symbol"),
        Err(err) => debug!(input, kind = ?err.kind, fragment = %err.fragment, "rejected symbol"),
    }
    result
}

/// Parse a canonical symbol string, panicking on malformed input.
///
/// Intended for literals in tests and static tables.
pub fn must_parse(input: &str) -> Symbol {
    match parse(input) {
        Ok(sym) => sym,
        Err(err) => panic!("{err}"),
    }
}

impl std::str::FromStr for Symbol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

fn parse_inner(input: &str) -> Result<Symbol, ParseError> {
    if input.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::EmptyInput,
            input,
            Span::empty_at(0),
        ));
    }

    let (toks, diags) = lex_all(input);
    if let Some(d) = diags.first() {
        return Err(ParseError::new(
            ParseErrorKind::InvalidCharacter,
            input,
            d.span,
        ));
    }
    if toks.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::EmptyInput,
            input,
            Span::new(0, input.len()),
        ));
    }

    Parser { src: input, toks: &toks }.symbol()
}

// =============================================================================
// Nested-list splitting
// =============================================================================

/// Split `s` on `sep` where `[`, `(` and `{` depth are all zero.
///
/// Pieces are trimmed; empty pieces are kept so callers decide how to treat
/// them.
pub(crate) fn split_top_level(s: &str, sep: u8) -> SmallVec<[&str; 4]> {
    let mut out = SmallVec::new();
    let bytes = s.as_bytes();
    let (mut brack, mut paren, mut brace) = (0i32, 0i32, 0i32);
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'[' => brack += 1,
            b']' => brack -= 1,
            b'(' => paren += 1,
            b')' => paren -= 1,
            b'{' => brace += 1,
            b'}' => brace -= 1,
            _ if b == sep && brack == 0 && paren == 0 && brace == 0 => {
                out.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(s[start..].trim());
    out
}

/// Split a comma-separated type-argument list, respecting nesting.
///
/// `"Map[K, V], List[T]"` yields `["Map[K, V]", "List[T]"]`; an empty or
/// blank input yields no elements.
pub fn split_type_args(s: &str) -> Vec<String> {
    split_top_level(s, b',')
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a, 'src> {
    src: &'src str,
    toks: &'a [Spanned<'src>],
}

impl<'a, 'src> Parser<'a, 'src> {
    #[inline]
    fn tok(&self, i: usize) -> Tok<'src> {
        self.toks[i].1
    }

    #[inline]
    fn is(&self, i: usize, t: Tok<'src>) -> bool {
        i < self.toks.len() && self.toks[i].1 == t
    }

    /// Byte span covering tokens `lo..hi`; empty ranges collapse to a point.
    fn span(&self, lo: usize, hi: usize) -> Span {
        if lo < hi {
            Span::new(self.toks[lo].0, self.toks[hi - 1].2)
        } else if lo < self.toks.len() {
            Span::empty_at(self.toks[lo].0)
        } else {
            Span::empty_at(self.src.len())
        }
    }

    /// Source text covered by tokens `lo..hi`, inner whitespace included.
    fn text(&self, lo: usize, hi: usize) -> &'src str {
        if lo >= hi {
            return "";
        }
        &self.src[self.toks[lo].0..self.toks[hi - 1].2]
    }

    fn error(&self, kind: ParseErrorKind, lo: usize, hi: usize) -> ParseError {
        ParseError::new(kind, self.src, self.span(lo, hi))
    }

    fn symbol(&self) -> Result<Symbol, ParseError> {
        let hi = self.toks.len();
        let (hi, metadata) = self.metadata(hi)?;
        let (hi, context) = self.context(hi)?;
        let dot = self.package_split(hi)?;

        let mut sym = Symbol {
            package_path: self.text(0, dot).to_string(),
            context,
            metadata,
            ..Symbol::default()
        };
        self.member(&mut sym, dot + 1, hi)?;
        Ok(sym)
    }

    // -------------------------------------------------------------------------
    // Phase 1: trailing `{...}` metadata
    // -------------------------------------------------------------------------

    fn metadata(&self, hi: usize) -> Result<(usize, Metadata), ParseError> {
        if hi == 0 || self.tok(hi - 1) != Tok::RBrace {
            return Ok((hi, Metadata::default()));
        }

        let mut depth = 0i32;
        let mut open = None;
        for i in (0..hi).rev() {
            match self.tok(i) {
                Tok::RBrace => depth += 1,
                Tok::LBrace => {
                    depth -= 1;
                    if depth == 0 {
                        open = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        let Some(open) = open else {
            return Ok((hi, Metadata::default()));
        };
        if open == 0 || self.bracket_depth(0, open) != 0 {
            return Ok((hi, Metadata::default()));
        }
        // `}{` would leave a brace group glued to the name or context.
        if self.tok(open - 1) == Tok::RBrace {
            return Err(self.error(ParseErrorKind::TrailingInput, open, hi));
        }

        let interior = &self.src[self.toks[open].2..self.toks[hi - 1].0];
        Ok((open, parse_metadata(interior)))
    }

    fn bracket_depth(&self, lo: usize, hi: usize) -> i32 {
        self.toks[lo..hi].iter().fold(0, |d, (_, t, _)| match t {
            Tok::LBrack => d + 1,
            Tok::RBrack => d - 1,
            _ => d,
        })
    }

    // -------------------------------------------------------------------------
    // Phase 2: `@context`
    // -------------------------------------------------------------------------

    fn context(&self, hi: usize) -> Result<(usize, Option<String>), ParseError> {
        let (mut brack, mut paren) = (0i32, 0i32);
        let mut at = None;
        for i in 0..hi {
            match self.tok(i) {
                Tok::LBrack => brack += 1,
                Tok::RBrack => brack -= 1,
                Tok::LParen => paren += 1,
                Tok::RParen => paren -= 1,
                Tok::At if i > 0 && brack == 0 && paren == 0 => {
                    at = Some(i);
                    break;
                }
                _ => {}
            }
        }

        let Some(at) = at else {
            return Ok((hi, None));
        };
        if at + 1 >= hi || self.tok(at + 1).is_structural() {
            return Err(self.error(ParseErrorKind::EmptyContext, at, hi));
        }
        Ok((at, Some(self.text(at + 1, hi).to_string())))
    }

    // -------------------------------------------------------------------------
    // Phase 3: package / member split
    // -------------------------------------------------------------------------

    /// Index of the dot separating the package path from the member.
    fn package_split(&self, hi: usize) -> Result<usize, ParseError> {
        let method_sep = (0..hi.saturating_sub(1))
            .rev()
            .find(|&i| self.tok(i) == Tok::RParen && self.tok(i + 1) == Tok::Dot);

        let dot = match method_sep {
            Some(close) => match self.matching_open(close) {
                Some(open) if open > 0 && self.tok(open - 1) == Tok::Dot => Some(open - 1),
                _ => {
                    let first_paren = (0..hi).find(|&i| self.tok(i) == Tok::LParen);
                    first_paren.and_then(|p| self.last_dot(0, p))
                }
            },
            None => {
                if let Some(i) =
                    (0..hi.saturating_sub(1)).find(|&i| self.is(i, Tok::Dot) && self.is(i + 1, Tok::LParen))
                {
                    return Err(self.error(ParseErrorKind::IncompleteReceiver, i, hi));
                }
                match (0..hi).find(|&i| self.tok(i) == Tok::LBrack) {
                    Some(brack) => self.last_dot(0, brack),
                    None => self.last_dot(0, hi),
                }
            }
        };

        let dot = match dot {
            Some(d) if d > 0 && d + 1 < hi => d,
            _ => return Err(self.error(ParseErrorKind::NoPackageSeparator, 0, hi)),
        };

        if let Some(bad) =
            (0..dot).find(|&i| !matches!(self.tok(i), Tok::Text(_) | Tok::Dot))
        {
            return Err(self.error(ParseErrorKind::InvalidPackagePath, bad, bad + 1));
        }
        Ok(dot)
    }

    fn last_dot(&self, lo: usize, hi: usize) -> Option<usize> {
        (lo..hi).rev().find(|&i| self.tok(i) == Tok::Dot)
    }

    fn matching_open(&self, close: usize) -> Option<usize> {
        let mut depth = 0i32;
        for i in (0..=close).rev() {
            match self.tok(i) {
                Tok::RParen => depth += 1,
                Tok::LParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn matching_close(&self, open: usize, hi: usize) -> Option<usize> {
        let mut depth = 0i32;
        for i in open..hi {
            match self.tok(i) {
                Tok::LParen => depth += 1,
                Tok::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    // -------------------------------------------------------------------------
    // Phase 4: member classification
    // -------------------------------------------------------------------------

    fn member(&self, sym: &mut Symbol, lo: usize, hi: usize) -> Result<(), ParseError> {
        if hi - lo == 1 && self.tok(lo) == Tok::Text("init") {
            sym.is_init = true;
            sym.name = "init".to_string();
            return Ok(());
        }

        let (mut brack, mut paren) = (0i32, 0i32);
        let anon = (lo..hi).find_map(|i| {
            match self.tok(i) {
                Tok::LBrack => brack += 1,
                Tok::RBrack => brack -= 1,
                Tok::LParen => paren += 1,
                Tok::RParen => paren -= 1,
                Tok::AnonLit(lit) if brack == 0 && paren == 0 => return Some((i, lit)),
                _ => {}
            }
            None
        });
        if let Some((a, lit)) = anon {
            return self.anonymous(sym, lo, (a, lit), hi);
        }

        let (receiver, name, type_args) = self.callable(lo, hi)?;
        sym.receiver = receiver;
        sym.name = name;
        sym.type_args = type_args;
        Ok(())
    }

    /// `name·litN[args]`, where `name` may carry a receiver.
    fn anonymous(
        &self,
        sym: &mut Symbol,
        lo: usize,
        (a, lit): (usize, &str),
        hi: usize,
    ) -> Result<(), ParseError> {
        let (receiver, name, mut type_args) = self.callable(lo, a)?;

        let digits = anon_digits(lit);
        let index = if digits.is_empty() {
            0
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| self.error(ParseErrorKind::InvalidAnonIndex, a, a + 1))?
        };

        if a + 1 < hi {
            if !type_args.is_empty() || self.tok(a + 1) != Tok::LBrack {
                return Err(self.error(ParseErrorKind::TrailingInput, a + 1, hi));
            }
            type_args = self.bracket_list(a + 1, hi)?;
        }

        sym.receiver = receiver;
        sym.name = name;
        sym.type_args = type_args;
        sym.is_anonymous = true;
        sym.anon_index = index;
        sym.anon_parent = sym.enclosing_name();
        Ok(())
    }

    /// Method (`(recv).name[args]`) or plain (`name[args]`) member.
    #[allow(clippy::type_complexity)]
    fn callable(
        &self,
        lo: usize,
        hi: usize,
    ) -> Result<(Option<Receiver>, String, Vec<String>), ParseError> {
        if lo >= hi {
            return Err(self.error(ParseErrorKind::EmptyName, lo, hi));
        }
        if self.tok(lo) != Tok::LParen {
            let (name, args) = self.name_with_args(lo, hi)?;
            return Ok((None, name, args));
        }

        let Some(close) = self.matching_close(lo, hi) else {
            return Err(self.error(ParseErrorKind::IncompleteReceiver, lo, hi));
        };
        let is_pointer = self.is(lo + 1, Tok::Star);
        let type_lo = lo + 1 + usize::from(is_pointer);
        if type_lo >= close {
            return Err(self.error(ParseErrorKind::IncompleteReceiver, lo, close + 1));
        }
        let (type_name, recv_args) = self.name_with_args(type_lo, close)?;

        if close + 1 >= hi || self.tok(close + 1) != Tok::Dot {
            return Err(self.error(ParseErrorKind::IncompleteReceiver, lo, hi));
        }
        if close + 2 >= hi {
            return Err(self.error(ParseErrorKind::MissingMethodName, lo, hi));
        }
        let (name, args) = self.name_with_args(close + 2, hi)?;

        let receiver = Receiver {
            type_name,
            is_pointer,
            type_args: recv_args,
        };
        Ok((Some(receiver), name, args))
    }

    // -------------------------------------------------------------------------
    // Phase 5: generic arguments on a name
    // -------------------------------------------------------------------------

    fn name_with_args(&self, lo: usize, hi: usize) -> Result<(String, Vec<String>), ParseError> {
        if lo >= hi {
            return Err(self.error(ParseErrorKind::EmptyName, lo, hi));
        }
        match (lo..hi).find(|&i| self.tok(i) == Tok::LBrack) {
            None => Ok((self.text(lo, hi).to_string(), Vec::new())),
            Some(open) if open == lo => Err(self.error(ParseErrorKind::EmptyName, lo, hi)),
            Some(open) => {
                let args = self.bracket_list(open, hi)?;
                Ok((self.text(lo, open).to_string(), args))
            }
        }
    }

    /// `[ ... ]` spanning `open..hi`, closed by the last `]`.
    fn bracket_list(&self, open: usize, hi: usize) -> Result<Vec<String>, ParseError> {
        let Some(close) = (open + 1..hi).rev().find(|&i| self.tok(i) == Tok::RBrack) else {
            return Err(self.error(ParseErrorKind::UnclosedBracket, open, hi));
        };
        if close + 1 != hi {
            return Err(self.error(ParseErrorKind::TrailingInput, close + 1, hi));
        }
        let interior = &self.src[self.toks[open].2..self.toks[close].0];
        Ok(split_type_args(interior))
    }
}

/// Interior of a `{...}` block.
fn parse_metadata(interior: &str) -> Metadata {
    let mut metadata = Metadata::default();
    for entry in split_top_level(interior, b',') {
        let Some((key, value)) = entry.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match key {
            "" => {}
            "via" => metadata.via = value.to_string(),
            "alias" => metadata.alias = value.to_string(),
            "pos" => metadata.position = value.to_string(),
            _ => {
                metadata.custom.insert(key.to_string(), value.to_string());
            }
        }
    }
    metadata
}
