use thiserror::Error;

/// Compact byte-span into the decoded input.
///
/// Offsets are `u32`; symbol strings never come close to 4GiB, so the
/// constructors clamp instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32, // exclusive
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        let s = if start > u32::MAX as usize {
            u32::MAX
        } else {
            start as u32
        };
        let e = if end > u32::MAX as usize {
            u32::MAX
        } else {
            end as u32
        };
        Self { start: s, end: e }
    }

    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    #[inline]
    pub const fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub const fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    Lex,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: DiagKind,
    pub span: Span,
    pub message: String,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("invalid character")]
    InvalidCharacter,
}

impl Default for LexErrorKind {
    #[inline]
    fn default() -> Self {
        LexErrorKind::InvalidCharacter
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Lex,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

/// Structural failures of the canonical parser.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    #[error("empty symbol")]
    EmptyInput,
    #[error("no package separator found")]
    NoPackageSeparator,
    #[error("package path contains a structural character")]
    InvalidPackagePath,
    #[error("incomplete method receiver")]
    IncompleteReceiver,
    #[error("receiver without method name")]
    MissingMethodName,
    #[error("empty context modifier")]
    EmptyContext,
    #[error("unclosed type parameter bracket")]
    UnclosedBracket,
    #[error("empty symbol name")]
    EmptyName,
    #[error("unexpected trailing input")]
    TrailingInput,
    #[error("anonymous function index out of range")]
    InvalidAnonIndex,
    #[error("invalid character")]
    InvalidCharacter,
}

/// A structural error together with the offending part of the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid GSRF symbol: {kind} at {}..{}: {fragment:?}", .span.start, .span.end)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub fragment: String,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, src: &str, span: Span) -> Self {
        let fragment = src.get(span.range()).unwrap_or_default().to_string();
        Self {
            kind,
            span,
            fragment,
        }
    }

    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Parse,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

/// Which foreign notation an adapter decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotationKind {
    Trace,
    Ssa,
}

impl std::fmt::Display for NotationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotationKind::Trace => f.write_str("stack trace"),
            NotationKind::Ssa => f.write_str("SSA"),
        }
    }
}

/// No sub-pattern of the adapter's notation matched the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {notation} format: {input}")]
pub struct AdapterError {
    pub notation: NotationKind,
    pub input: String,
}

impl AdapterError {
    #[inline]
    pub(crate) fn new(notation: NotationKind, input: &str) -> Self {
        Self {
            notation,
            input: input.to_string(),
        }
    }
}
