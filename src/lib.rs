//! Go Symbol Representation Format (GSRF) codec.
//!
//! - Canonical notation: `net/http.(*Server).Serve`, `pkg.Map[K, V]`,
//!   `main.main·lit2`, `syscall.Syscall@linux`, `io.(*Buffer).Write{via:Writer}`.
//! - [`parse`] decodes it over a Logos token stream, [`format`] renders it back;
//!   `parse(&format(&s)) == Ok(s)` for every `s` the parser can produce.
//! - [`adapters`] translate, lossily, to and from runtime stack-trace and
//!   `go/ssa` names.
//!
//! All operations are pure functions over their arguments and are safe to
//! call from any thread.

pub mod adapters;
pub mod error;
pub mod format;
pub mod lexer;
pub mod parser;
pub mod symbol;

// Re-exports for convenience
pub use adapters::{from_ssa, from_trace, to_ssa, to_trace, Notation, Ssa, Trace};
pub use error::{AdapterError, NotationKind, ParseError, ParseErrorKind, Span};
pub use format::format;
pub use lexer::Lexer;
pub use parser::{must_parse, parse, split_type_args};
pub use symbol::{Metadata, Receiver, Symbol, TypeParam};
