//! Non-fatal diagnostics accumulated across scanning, resolution and
//! transformation. Each one names the package, the item (type or function)
//! and, where relevant, the member (field or enum value) it concerns.

use crate::types::{Primitive, TypeKind, UnresolvedReason};
use derive_more::{Deref, Display, IntoIterator};
use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;

///
/// TagProblem
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagProblem {
    #[display("must be at least 1")]
    NotPositive,

    #[display("falls inside the reserved range 19000-19999")]
    Reserved,

    #[display("exceeds the maximum field number 536870911")]
    TooLarge,
}

///
/// SkipReason
///

#[derive(Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    #[display("expected exactly one parameter and one result, found {params} and {results}")]
    Arity { params: usize, results: usize },

    #[display("method name is already bound by an earlier function")]
    DuplicateMethod,

    #[display("{position} type '{ty}' is not a known record")]
    NotRecord { position: &'static str, ty: String },
}

///
/// DiagnosticKind
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[remain::sorted]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    #[error("value {value} is already used by '{existing}'; entry dropped")]
    DuplicateEnumValue { value: i64, existing: String },

    #[error("field name '{name}' is already used in this message; number {number} reserved")]
    DuplicateField { name: String, number: u32 },

    #[error("package was requested more than once; later copies ignored")]
    DuplicatePackage,

    #[error("{declared} collides with an earlier {existing} of the same name; first declaration wins")]
    DuplicateType {
        declared: TypeKind,
        existing: TypeKind,
    },

    #[error("enum declares no values; enum dropped")]
    EmptyEnum,

    #[error("first value is {value}, expected 0; values emitted as declared")]
    EnumBaseline { value: i64 },

    #[error("value {value} does not fit a 32-bit enum number; entry dropped")]
    EnumValueRange { value: i64 },

    #[error("explicit tag {tag} {problem}; message dropped")]
    InvalidTag { tag: i64, problem: TagProblem },

    #[error("optional {primitive} has no distinct encoding; emitted as a singular field")]
    NullablePrimitive { primitive: Primitive },

    #[error("function skipped: {reason}")]
    SkippedFunction { reason: SkipReason },

    #[error("tag {tag} is claimed by both '{first}' and '{second}'; message dropped")]
    TagCollision {
        tag: u32,
        first: String,
        second: String,
    },

    #[error("type '{descriptor}' could not be resolved: {reason}; field dropped")]
    UnresolvedField {
        descriptor: String,
        reason: UnresolvedReason,
    },

    #[error("{shape} cannot be expressed as a schema field; field dropped")]
    UnsupportedShape { shape: String },
}

///
/// Diagnostic
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub package: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,

    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Diagnostic about a package as a whole.
    #[must_use]
    pub fn package(package: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            package: package.into(),
            item: None,
            member: None,
            kind,
        }
    }

    /// Diagnostic about a type or function.
    #[must_use]
    pub fn item(package: impl Into<String>, item: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            package: package.into(),
            item: Some(item.into()),
            member: None,
            kind,
        }
    }

    /// Diagnostic about a field or enum value.
    #[must_use]
    pub fn member(
        package: impl Into<String>,
        item: impl Into<String>,
        member: impl Into<String>,
        kind: DiagnosticKind,
    ) -> Self {
        Self {
            package: package.into(),
            item: Some(item.into()),
            member: Some(member.into()),
            kind,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.package)?;
        if let Some(item) = &self.item {
            write!(f, "::{item}")?;
        }
        if let Some(member) = &self.member {
            write!(f, ".{member}")?;
        }

        write!(f, ": {}", self.kind)
    }
}

///
/// Diagnostics
///
/// Ordered diagnostic list. Order follows the phase and declaration order
/// that produced each entry, so two runs over the same input agree.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(#[into_iterator(owned, ref)] Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn append(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Split off every diagnostic that belongs to `package`.
    #[must_use]
    pub fn take_package(&mut self, package: &str) -> Self {
        let (taken, kept) = std::mem::take(&mut self.0)
            .into_iter()
            .partition(|d| d.package == package);
        self.0 = kept;

        Self(taken)
    }

    /// `Ok` when nothing was reported, otherwise the diagnostics themselves.
    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_full_context() {
        let d = Diagnostic::member(
            "example.com/shop",
            "Order",
            "buyer",
            DiagnosticKind::UnresolvedField {
                descriptor: "example.com/gone.Person".to_string(),
                reason: UnresolvedReason::UnknownType,
            },
        );

        let text = d.to_string();
        assert!(text.starts_with("example.com/shop::Order.buyer: "));
        assert!(text.contains("example.com/gone.Person"));
    }

    #[test]
    fn package_level_display_has_no_item() {
        let d = Diagnostic::package("example.com/a", DiagnosticKind::DuplicatePackage);

        assert_eq!(
            d.to_string(),
            "example.com/a: package was requested more than once; later copies ignored"
        );
    }

    #[test]
    fn take_package_partitions_in_order() {
        let mut all: Diagnostics = [
            Diagnostic::item("a", "X", DiagnosticKind::EmptyEnum),
            Diagnostic::item("b", "Y", DiagnosticKind::EmptyEnum),
            Diagnostic::item("a", "Z", DiagnosticKind::EnumBaseline { value: 1 }),
        ]
        .into_iter()
        .collect();

        let a = all.take_package("a");

        assert_eq!(a.len(), 2);
        assert_eq!(a[0].item.as_deref(), Some("X"));
        assert_eq!(a[1].item.as_deref(), Some("Z"));
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn into_result_reflects_emptiness() {
        assert!(Diagnostics::new().into_result().is_ok());

        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::package("a", DiagnosticKind::DuplicatePackage));
        assert_eq!(diags.clone().into_result().unwrap_err(), diags);
    }

    #[test]
    fn serializes_kind_inline() {
        let d = Diagnostic::item("a", "Status", DiagnosticKind::EnumBaseline { value: 1 });
        let json = serde_json::to_value(&d).unwrap();

        assert_eq!(json["kind"], "enum_baseline");
        assert_eq!(json["value"], 1);
        assert_eq!(json["item"], "Status");
        assert!(json.get("member").is_none());
    }

    #[test]
    fn duplicate_type_serializes_without_clashing_tag() {
        let d = Diagnostic::item(
            "a",
            "Thing",
            DiagnosticKind::DuplicateType {
                declared: TypeKind::Enum,
                existing: TypeKind::Record,
            },
        );
        let json = serde_json::to_string(&d).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(json.matches("\"kind\"").count(), 1);
        assert_eq!(value["kind"], "duplicate_type");
        assert_eq!(value["declared"], "enum");
        assert_eq!(value["existing"], "record");
    }
}
