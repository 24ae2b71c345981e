//! # Canonical formatter
//!
//! Renders a [`Symbol`] as canonical notation. Output is built as a list of
//! fragments and joined once:
//!
//! ```text
//! pkg . [ (*Recv[A]) . ] name [ ·litN ] [ [args] ] [ @ctx ] [ {entries} ]
//! ```
//!
//! Instantiation-site `type_args` win over definition-site `type_params`.
//! Metadata entries are emitted as `via`, `alias`, `pos`, then custom keys in
//! ascending order, and the block is omitted when no entry is set.

use std::fmt;

use crate::symbol::{render_receiver, Symbol, TypeParam, ANON_LITERAL, ANON_SEPARATOR};

/// Canonical string for `sym`. Total: never fails, never validates.
pub fn format(sym: &Symbol) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(10);

    parts.push(sym.package_path.clone());
    parts.push(".".into());

    if sym.is_init {
        parts.push("init".into());
    } else {
        if let Some(recv) = &sym.receiver {
            parts.push(render_receiver(recv));
            parts.push(".".into());
        }
        parts.push(sym.name.clone());
    }

    if sym.is_anonymous {
        parts.push(ANON_SEPARATOR.into());
        parts.push(ANON_LITERAL.into());
        if sym.anon_index > 0 {
            parts.push(sym.anon_index.to_string());
        }
    }

    if !sym.type_args.is_empty() {
        parts.push(format!("[{}]", sym.type_args.join(", ")));
    } else if !sym.type_params.is_empty() {
        let params: Vec<String> = sym.type_params.iter().map(render_type_param).collect();
        parts.push(format!("[{}]", params.join(", ")));
    }

    if let Some(ctx) = sym.context.as_deref().filter(|c| !c.is_empty()) {
        parts.push(format!("@{ctx}"));
    }

    if !sym.metadata.is_empty() {
        let m = &sym.metadata;
        let mut entries = Vec::with_capacity(3 + m.custom.len());
        if !m.via.is_empty() {
            entries.push(format!("via:{}", m.via));
        }
        if !m.alias.is_empty() {
            entries.push(format!("alias:{}", m.alias));
        }
        if !m.position.is_empty() {
            entries.push(format!("pos:{}", m.position));
        }
        // BTreeMap iterates in key order.
        entries.extend(m.custom.iter().map(|(k, v)| format!("{k}:{v}")));
        parts.push(format!("{{{}}}", entries.join(",")));
    }

    parts.concat()
}

fn render_type_param(param: &TypeParam) -> String {
    match param.effective_constraint() {
        Some(c) => format!("{} {c}", param.name),
        None => param.name.clone(),
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{Metadata, Receiver};

    #[test]
    fn type_args_win_over_params() {
        let mut sym = Symbol::function("pkg", "Map").with_type_args(["int"]);
        sym.type_params = vec![TypeParam::new("T", "comparable")];
        assert_eq!(format(&sym), "pkg.Map[int]");

        sym.type_args.clear();
        assert_eq!(format(&sym), "pkg.Map[T comparable]");
    }

    #[test]
    fn unindexed_anonymous() {
        let sym = Symbol::anonymous("main", "main", 0);
        assert_eq!(format(&sym), "main.main·lit");
    }

    #[test]
    fn custom_metadata_is_sorted() {
        let mut m = Metadata::with_position("a.go:1:2");
        m.custom.insert("zeta".into(), "1".into());
        m.custom.insert("alpha".into(), "2".into());
        let sym = Symbol::method("p", Receiver::value("T"), "M").with_metadata(m);
        assert_eq!(sym.to_string(), "p.(T).M{pos:a.go:1:2,alpha:2,zeta:1}");
    }

    #[test]
    fn empty_context_is_omitted() {
        let sym = Symbol::function("p", "F").with_context("");
        assert_eq!(format(&sym), "p.F");
    }
}
