//! # Foreign notations
//!
//! Best-effort, lossy translation between [`Symbol`] and the two notations
//! other Go tooling prints:
//!
//! - [`trace`]: runtime stack frames (`main.(*Server).Start.func2`).
//! - [`ssa`]: `go/ssa` function names (`pkg.init#1`, `pkg.Handler$3@f.go:1:2`).
//!
//! Each adapter classifies its input with the same layered strategy as the
//! canonical parser: strip the location suffix, then try init, method,
//! anonymous and plain-function patterns in that order, first match wins.
//! Only `from(to(s)) == s` for symbols the adapter itself decoded is
//! guaranteed; canonical fields with no counterpart in the notation (context,
//! most metadata, anonymous indices of `init`) are dropped on encode.

pub mod ssa;
pub mod trace;

use crate::error::{AdapterError, NotationKind};
use crate::parser::split_type_args;
use crate::symbol::{render_receiver, Receiver, Symbol};

pub use ssa::{from_ssa, to_ssa};
pub use trace::{from_trace, to_trace};

/// A foreign symbol notation with a decoder and a total encoder.
pub trait Notation {
    fn kind(&self) -> NotationKind;

    fn decode(&self, input: &str) -> Result<Symbol, AdapterError>;

    fn encode(&self, sym: &Symbol) -> String;
}

/// Runtime stack-trace notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trace;

/// `go/ssa` notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ssa;

impl Notation for Trace {
    fn kind(&self) -> NotationKind {
        NotationKind::Trace
    }

    fn decode(&self, input: &str) -> Result<Symbol, AdapterError> {
        from_trace(input)
    }

    fn encode(&self, sym: &Symbol) -> String {
        to_trace(sym)
    }
}

impl Notation for Ssa {
    fn kind(&self) -> NotationKind {
        NotationKind::Ssa
    }

    fn decode(&self, input: &str) -> Result<Symbol, AdapterError> {
        from_ssa(input)
    }

    fn encode(&self, sym: &Symbol) -> String {
        to_ssa(sym)
    }
}

// =============================================================================
// Shared decoding helpers
// =============================================================================

/// `Name[A, B]` -> (`Name`, `[A, B]`); `Name` -> (`Name`, `[]`).
///
/// `None` when the bracket list is unterminated or has no name before it.
pub(crate) fn split_generic(s: &str) -> Option<(&str, Vec<String>)> {
    match s.find('[') {
        None => Some((s, Vec::new())),
        Some(0) => None,
        Some(open) => {
            let inner = s[open + 1..].strip_suffix(']')?;
            Some((&s[..open], split_type_args(inner)))
        }
    }
}

/// Split `pkg.Member` at the last `.` before any `[`.
pub(crate) fn split_member(s: &str) -> Option<(&str, &str)> {
    let head_end = s.find('[').unwrap_or(s.len());
    let dot = s[..head_end].rfind('.')?;
    if dot == 0 || dot + 1 == s.len() {
        return None;
    }
    Some((&s[..dot], &s[dot + 1..]))
}

/// Receiver type text `Type[A, B]` to a [`Receiver`].
pub(crate) fn decode_receiver(text: &str, is_pointer: bool) -> Option<Receiver> {
    let (type_name, args) = split_generic(text)?;
    if type_name.is_empty() {
        return None;
    }
    Some(Receiver::new(type_name, is_pointer).with_type_args(args))
}

// =============================================================================
// Shared encoding helpers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReceiverStyle {
    /// Keep the receiver's pointer marker.
    AsIs,
    /// Runtime frames always print `(*T)`.
    AlwaysPointer,
}

/// `pkg.(*T[A]).Name` or `pkg.Name[A]`. Methods carry no type arguments of
/// their own in either foreign notation.
pub(crate) fn render_callable(sym: &Symbol, style: ReceiverStyle) -> String {
    let mut out = String::with_capacity(sym.package_path.len() + sym.name.len() + 16);
    out.push_str(&sym.package_path);
    out.push('.');

    match &sym.receiver {
        Some(recv) => {
            let rendered = match style {
                ReceiverStyle::AsIs => render_receiver(recv),
                ReceiverStyle::AlwaysPointer => render_receiver(&Receiver {
                    is_pointer: true,
                    ..recv.clone()
                }),
            };
            out.push_str(&rendered);
            out.push('.');
            out.push_str(&sym.name);
        }
        None => {
            out.push_str(&sym.name);
            if !sym.type_args.is_empty() {
                out.push('[');
                out.push_str(&sym.type_args.join(", "));
                out.push(']');
            }
        }
    }
    out
}
