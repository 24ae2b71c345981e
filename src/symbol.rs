//! # Symbol model
//!
//! One parsed symbol in canonical form. Every decoder (`crate::parse`, the
//! trace and SSA adapters) produces a [`Symbol`]; the canonical formatter and
//! the adapters' encoders are the only consumers that turn it back into text.
//!
//! The model carries no validation: fixtures may be constructed directly and
//! are never rejected here. Structural checks belong to the decoders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Glyph that introduces an anonymous function literal in canonical notation.
pub const ANON_SEPARATOR: &str = "·";

/// Literal token following [`ANON_SEPARATOR`].
pub const ANON_LITERAL: &str = "lit";

/// Constraint spelling that is equivalent to "no constraint".
pub const ANY_CONSTRAINT: &str = "any";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Symbol {
    /// Full import path of the owning package (may contain `/` and `.`).
    pub package_path: String,
    /// Function, method or type name; for anonymous functions, the name of
    /// the enclosing function or method.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Receiver>,
    #[serde(default)]
    pub is_init: bool,

    #[serde(default)]
    pub is_anonymous: bool,
    /// Fully qualified name of the enclosing symbol (`pkg.Func`,
    /// `pkg.(*T).Method`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub anon_parent: String,
    /// `0` means "unindexed".
    #[serde(default)]
    pub anon_index: u32,

    /// Definition-site generics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    /// Instantiation-site generics; rendered in preference to `type_params`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<String>,

    /// Opaque platform or build tag (`linux`, `cgo`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// Method receiver. Its `type_args` are independent of the method's own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Receiver {
    pub type_name: String,
    #[serde(default)]
    pub is_pointer: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    /// Empty and `"any"` both mean unconstrained.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub constraint: String,
}

/// Trailing `{key:value,...}` block.
///
/// `custom` is ordered so that formatting is deterministic regardless of the
/// order entries were inserted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Source of a promoted method; may itself be `Name{via:...}`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub via: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    /// `file:line:col`, not validated.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub position: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, String>,
}

impl Metadata {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.via.is_empty()
            && self.alias.is_empty()
            && self.position.is_empty()
            && self.custom.is_empty()
    }

    pub fn with_position(position: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            ..Self::default()
        }
    }
}

impl TypeParam {
    pub fn new(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.into(),
        }
    }

    /// Constraint as rendered, `None` when unconstrained.
    #[inline]
    pub fn effective_constraint(&self) -> Option<&str> {
        match self.constraint.as_str() {
            "" | ANY_CONSTRAINT => None,
            c => Some(c),
        }
    }
}

impl Receiver {
    pub fn new(type_name: impl Into<String>, is_pointer: bool) -> Self {
        Self {
            type_name: type_name.into(),
            is_pointer,
            type_args: Vec::new(),
        }
    }

    pub fn pointer(type_name: impl Into<String>) -> Self {
        Self::new(type_name, true)
    }

    pub fn value(type_name: impl Into<String>) -> Self {
        Self::new(type_name, false)
    }

    pub fn with_type_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Symbol {
    /// `pkg.Name`
    pub fn function(package_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// `pkg.(Recv).Name`
    pub fn method(
        package_path: impl Into<String>,
        receiver: Receiver,
        name: impl Into<String>,
    ) -> Self {
        Self {
            receiver: Some(receiver),
            ..Self::function(package_path, name)
        }
    }

    /// `pkg.init`
    pub fn init(package_path: impl Into<String>) -> Self {
        Self {
            is_init: true,
            ..Self::function(package_path, "init")
        }
    }

    /// Closure nested in the plain function `pkg.name`.
    pub fn anonymous(package_path: impl Into<String>, name: impl Into<String>, index: u32) -> Self {
        let mut sym = Self::function(package_path, name);
        sym.is_anonymous = true;
        sym.anon_index = index;
        sym.anon_parent = sym.enclosing_name();
        sym
    }

    #[inline]
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    pub fn with_type_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Fully qualified name of the function or method this symbol names,
    /// ignoring anonymous, generic, context and metadata parts:
    /// `pkg.Name` or `pkg.(*Type[A]).Name`.
    pub fn enclosing_name(&self) -> String {
        let mut out = String::with_capacity(self.package_path.len() + self.name.len() + 1);
        out.push_str(&self.package_path);
        out.push('.');
        if let Some(recv) = &self.receiver {
            out.push_str(&render_receiver(recv));
            out.push('.');
        }
        out.push_str(&self.name);
        out
    }
}

/// `(*Type[A, B])`
pub(crate) fn render_receiver(recv: &Receiver) -> String {
    let mut out = String::with_capacity(recv.type_name.len() + 3);
    out.push('(');
    if recv.is_pointer {
        out.push('*');
    }
    out.push_str(&recv.type_name);
    if !recv.type_args.is_empty() {
        out.push('[');
        out.push_str(&recv.type_args.join(", "));
        out.push(']');
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metadata_is_empty() {
        assert!(Metadata::default().is_empty());

        let mut m = Metadata::default();
        m.custom.insert("k".into(), String::new());
        assert!(!m.is_empty());
    }

    #[test]
    fn any_constraint_is_unconstrained() {
        assert_eq!(TypeParam::new("T", "any").effective_constraint(), None);
        assert_eq!(TypeParam::new("T", "").effective_constraint(), None);
        assert_eq!(
            TypeParam::new("T", "comparable").effective_constraint(),
            Some("comparable")
        );
    }

    #[test]
    fn enclosing_name_includes_receiver() {
        let sym = Symbol::method(
            "main",
            Receiver::pointer("Server").with_type_args(["K", "V"]),
            "Start",
        );
        assert_eq!(sym.enclosing_name(), "main.(*Server[K, V]).Start");
        assert_eq!(Symbol::function("fmt", "Println").enclosing_name(), "fmt.Println");
    }

    #[test]
    fn anonymous_constructor_sets_parent() {
        let sym = Symbol::anonymous("main", "handler", 3);
        assert!(sym.is_anonymous);
        assert_eq!(sym.anon_parent, "main.handler");
        assert_eq!(sym.anon_index, 3);
    }
}
