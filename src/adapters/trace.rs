//! Runtime stack-trace notation.
//!
//! ```text
//! main.main()                           plain function, call arguments dropped
//! net/http.(*Server).Serve              receiver is always printed as a pointer
//! main.(*Server).Start.func2            closure #2 inside a method
//! main.(*Server).Start.func1.3          closure #3 nested in closure #1
//! example.com/lib.Map[...].func1        closure inside a generic function
//! main.init.func1                       package initialiser
//! main.run /home/u/main.go:12 +0x1d     trailing file location dropped
//! ```

use std::sync::LazyLock;

use memchr::memmem;
use regex::Regex;
use tracing::{debug, trace};

use super::{decode_receiver, render_callable, split_generic, ReceiverStyle};
use crate::error::{AdapterError, NotationKind};
use crate::symbol::Symbol;

static INIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^()\[\]*\s]+)\.init(?:\.func\d+)?$").expect("init pattern")
});

static ANON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.func(\d+)$").expect("closure pattern"));

// Nested closures since Go 1.21: `outer.func1.2`.
static NESTED_ANON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+\.func\d+(?:\.\d+)*)\.(\d+)$").expect("nested closure pattern")
});

const NAME_RESERVED: &[char] = &['[', ']', '(', ')', '*', ' ', '\t', '\n'];

/// Decode a stack-trace frame.
pub fn from_trace(input: &str) -> Result<Symbol, AdapterError> {
    let frame = strip_call_args(strip_location(input));
    match decode(frame) {
        Some(sym) => {
            trace!(input, frame, "decoded trace frame");
            Ok(sym)
        }
        None => {
            debug!(input, "no trace pattern matched");
            Err(AdapterError::new(NotationKind::Trace, input))
        }
    }
}

/// Encode as a stack-trace frame.
///
/// Closures render as `<parent>.funcN` (unindexed closures as `func1`);
/// `init` always renders as its first closure, `pkg.init.func1`. Context and
/// metadata have no trace spelling and are dropped.
pub fn to_trace(sym: &Symbol) -> String {
    if sym.is_anonymous {
        let parent = if sym.anon_parent.is_empty() {
            render_callable(sym, ReceiverStyle::AlwaysPointer)
        } else {
            sym.anon_parent.clone()
        };
        return format!("{parent}.func{}", sym.anon_index.max(1));
    }
    if sym.is_init {
        return format!("{}.init.func1", sym.package_path);
    }
    render_callable(sym, ReceiverStyle::AlwaysPointer)
}

// =============================================================================
// Frame cleanup
// =============================================================================

/// Drop a trailing ` /path/file.go:12 +0x1d` without cutting spaces inside
/// type arguments such as `Map[K, V]`.
fn strip_location(s: &str) -> &str {
    if let Some(idx) = memmem::find(s.as_bytes(), b" /").filter(|&i| i > 0) {
        return &s[..idx];
    }
    match s.rfind(' ') {
        Some(idx) if idx > 0 => {
            let tail = &s[idx + 1..];
            if tail.contains(".go:") || tail.contains('/') {
                &s[..idx]
            } else {
                s
            }
        }
        _ => s,
    }
}

/// Drop a trailing `(0x1, 0x2)` argument list. A `(` right after `.` opens a
/// receiver and is kept.
fn strip_call_args(s: &str) -> &str {
    if !s.ends_with(')') {
        return s;
    }
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b')' => depth += 1,
            b'(' => {
                depth -= 1;
                if depth == 0 {
                    return if i > 0 && bytes[i - 1] != b'.' { &s[..i] } else { s };
                }
            }
            _ => {}
        }
    }
    s
}

// =============================================================================
// Patterns, first match wins
// =============================================================================

fn decode(frame: &str) -> Option<Symbol> {
    if let Some(caps) = INIT.captures(frame) {
        return Some(Symbol::init(&caps[1]));
    }
    method(frame)
        .or_else(|| anonymous(frame))
        .or_else(|| generic_function(frame))
        .or_else(|| function(frame))
}

/// `pkg.(*Type[args]).Method`
fn method(frame: &str) -> Option<Symbol> {
    let start = memmem::find(frame.as_bytes(), b".(*").filter(|&i| i > 0)?;
    let pkg = &frame[..start];
    let rest = &frame[start + 3..];

    let (mut brack, mut paren) = (0i32, 1i32);
    let close = rest.bytes().position(|b| {
        match b {
            b'[' => brack += 1,
            b']' => brack -= 1,
            b'(' if brack == 0 => paren += 1,
            b')' if brack == 0 => paren -= 1,
            _ => {}
        }
        paren == 0
    })?;

    let name = rest[close + 1..].strip_prefix('.')?;
    if name.is_empty() || name.contains('.') {
        return None;
    }
    let receiver = decode_receiver(&rest[..close], true)?;
    Some(Symbol::method(pkg, receiver, name))
}

/// `<base>.funcN` or `<closure>.N`, N >= 1. `base` is a method, function or
/// enclosing closure frame; only the innermost numbering is kept.
fn anonymous(frame: &str) -> Option<Symbol> {
    let (base, index) = closure_split(frame)?;

    let mut sym = anonymous(base)
        .or_else(|| method(base))
        .or_else(|| generic_function(base))
        .or_else(|| function(base))?;
    sym.is_anonymous = true;
    sym.anon_index = index;
    sym.anon_parent = base.to_string();
    Some(sym)
}

fn closure_split(frame: &str) -> Option<(&str, u32)> {
    let caps = ANON
        .captures(frame)
        .or_else(|| NESTED_ANON.captures(frame))?;
    let index = caps[2].parse::<u32>().ok().filter(|&n| n >= 1)?;
    Some((caps.get(1)?.as_str(), index))
}

/// `pkg.Name[args]`
fn generic_function(frame: &str) -> Option<Symbol> {
    let open = frame.find('[').filter(|&i| i > 0)?;
    if !frame.ends_with(']') {
        return None;
    }
    let dot = frame[..open].rfind('.').filter(|&i| i > 0)?;
    let pkg = &frame[..dot];
    if pkg.contains(NAME_RESERVED) {
        return None;
    }
    let (name, args) = split_generic(&frame[dot + 1..])?;
    if name.contains(NAME_RESERVED) {
        return None;
    }
    Some(Symbol::function(pkg, name).with_type_args(args))
}

/// `pkg.Name`
fn function(frame: &str) -> Option<Symbol> {
    let dot = frame.rfind('.').filter(|&i| i > 0)?;
    let (pkg, name) = (&frame[..dot], &frame[dot + 1..]);
    if name.is_empty() || name.contains(NAME_RESERVED) || pkg.contains(NAME_RESERVED) {
        return None;
    }
    Some(Symbol::function(pkg, name))
}
