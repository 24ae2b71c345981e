//! `go/ssa` notation.
//!
//! ```text
//! pkg.init#1                            numbered package initialiser
//! pkg.(*Server).Start                   receiver keeps its pointer marker
//! (*example.com/pkg.Server).Start       receiver-qualified method
//! pkg.Handler$3                         third closure inside pkg.Handler
//! pkg.(*T).Close$bound                  method value wrapper
//! pkg.Map[int, string]                  instantiated generic
//! pkg.Run@main.go:10:2                  trailing source location
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::{decode_receiver, render_callable, split_generic, split_member, ReceiverStyle};
use crate::error::{AdapterError, NotationKind};
use crate::symbol::{Metadata, Symbol};

static LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)@([^:]+):(\d+):(\d+)$").expect("location pattern"));

static INIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.init#(\d+)$").expect("init pattern"));

static METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^()]+)\.\((\*?)([^()]+)\)\.([^.()]+)$").expect("method pattern")
});

static QUALIFIED_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\((\*?)([^()]+)\)\.([^.()]+)$").expect("method pattern"));

static ANON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\$(\d+)$").expect("closure pattern"));

/// Decode an SSA function name.
pub fn from_ssa(input: &str) -> Result<Symbol, AdapterError> {
    let (name, position) = match LOCATION.captures(input) {
        Some(caps) => {
            let position = format!("{}:{}:{}", &caps[2], &caps[3], &caps[4]);
            (caps.get(1).map_or(input, |m| m.as_str()), Some(position))
        }
        None => (input, None),
    };

    let Some(mut sym) = decode(name) else {
        debug!(input, "no SSA pattern matched");
        return Err(AdapterError::new(NotationKind::Ssa, input));
    };
    if let Some(position) = position {
        sym.metadata = Metadata::with_position(position);
    }
    trace!(input, package = %sym.package_path, name = %sym.name, "decoded SSA name");
    Ok(sym)
}

/// Encode as an SSA function name.
///
/// `init` renders as `pkg.init#1`, closures as `<enclosing>$N` (unindexed
/// closures as `$1`). `metadata.position` becomes the `@file:line:col`
/// suffix; context and the remaining metadata are dropped.
pub fn to_ssa(sym: &Symbol) -> String {
    let mut out = if sym.is_init {
        format!("{}.init#1", sym.package_path)
    } else if sym.is_anonymous {
        let base = render_callable(sym, ReceiverStyle::AsIs);
        format!("{base}${}", sym.anon_index.max(1))
    } else {
        render_callable(sym, ReceiverStyle::AsIs)
    };

    if !sym.metadata.position.is_empty() {
        out.push('@');
        out.push_str(&sym.metadata.position);
    }
    out
}

// =============================================================================
// Patterns, first match wins
// =============================================================================

fn decode(name: &str) -> Option<Symbol> {
    if let Some(caps) = INIT.captures(name) {
        return Some(Symbol::init(&caps[1]));
    }
    method(name)
        .or_else(|| anonymous(name))
        .or_else(|| function(name))
}

/// `pkg.(*Type[args]).Method` or `(*pkg.Type[args]).Method`. Wrapper
/// suffixes such as `$bound` stay part of the name; a closure suffix `$N` does
/// not.
fn method(name: &str) -> Option<Symbol> {
    if closure_split(name).is_some() {
        return None;
    }
    if let Some(caps) = METHOD.captures(name) {
        let receiver = decode_receiver(&caps[3], &caps[2] == "*")?;
        return Some(Symbol::method(&caps[1], receiver, &caps[4]));
    }

    let caps = QUALIFIED_METHOD.captures(name)?;
    let (pkg, type_text) = split_member(&caps[2])?;
    let receiver = decode_receiver(type_text, &caps[1] == "*")?;
    Some(Symbol::method(pkg, receiver, &caps[3]))
}

/// `<base>$N`, N >= 1, where `base` is a method, function or enclosing
/// closure name. Only the innermost numbering is kept.
fn anonymous(name: &str) -> Option<Symbol> {
    let (base, index) = closure_split(name)?;

    let mut sym = anonymous(base)
        .or_else(|| method(base))
        .or_else(|| function(base))?;
    sym.is_anonymous = true;
    sym.anon_index = index;
    sym.anon_parent = sym.enclosing_name();
    Some(sym)
}

fn closure_split(name: &str) -> Option<(&str, u32)> {
    let caps = ANON.captures(name)?;
    let index = caps[2].parse::<u32>().ok().filter(|&n| n >= 1)?;
    Some((caps.get(1)?.as_str(), index))
}

/// `pkg.Name` or `pkg.Name[args]`.
fn function(name: &str) -> Option<Symbol> {
    let (pkg, member) = split_member(name)?;
    if pkg.contains(['(', ')']) {
        return None;
    }
    let (fname, args) = split_generic(member)?;
    if fname.contains(['(', ')']) {
        return None;
    }
    Some(Symbol::function(pkg, fname).with_type_args(args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_receiver_form() {
        let sym = decode("(*example.com/pkg.Server).Start").expect("method");
        assert_eq!(sym.package_path, "example.com/pkg");
        let recv = sym.receiver.expect("receiver");
        assert_eq!(recv.type_name, "Server");
        assert!(recv.is_pointer);
        assert_eq!(sym.name, "Start");
    }

    #[test]
    fn closure_in_method_keeps_receiver() {
        let sym = decode("pkg.(*T).Run$2").expect("closure");
        assert!(sym.is_anonymous);
        assert_eq!(sym.anon_index, 2);
        assert_eq!(sym.anon_parent, "pkg.(*T).Run");
        assert!(sym.is_method());
    }

    #[test]
    fn bound_wrapper_is_a_plain_name() {
        let sym = decode("pkg.F$bound").expect("function");
        assert!(!sym.is_anonymous);
        assert_eq!(sym.name, "F$bound");
    }

    #[test]
    fn method_wrappers_keep_their_suffix() {
        let sym = decode("pkg.(*T).Close$bound").expect("method");
        assert!(!sym.is_anonymous);
        assert_eq!(sym.name, "Close$bound");

        let sym = decode("(time.Duration).String$thunk").expect("method");
        assert_eq!(sym.package_path, "time");
        assert_eq!(sym.receiver, Some(crate::Receiver::value("Duration")));
        assert_eq!(sym.name, "String$thunk");
    }

    #[test]
    fn nested_closure_keeps_innermost_index() {
        let sym = decode("pkg.(*T).M$1$2").expect("closure");
        assert!(sym.is_anonymous);
        assert_eq!(sym.name, "M");
        assert_eq!(sym.anon_index, 2);
        assert_eq!(sym.anon_parent, "pkg.(*T).M");

        let sym = decode("pkg.F$1$2").expect("closure");
        assert_eq!(sym.name, "F");
        assert_eq!(sym.anon_parent, "pkg.F");
    }
}
