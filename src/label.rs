//! Label Registry.
//!
//! Interns string or numeric labels into compact, stable integer indices.
//! Equality between two labels reduces to equality of their indices once
//! interned; lookup uses a linear scan over the interned table, since
//! registries in practice hold a small number of distinct labels relative
//! to the size of the host graph.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A single interned label value: either a string or a floating point
/// number. The input grammar decides which kind a token becomes by
/// attempting to parse it as a float first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Str(String),
    Num(OrderedFloat<f64>),
}

impl Label {
    pub fn str(s: impl Into<String>) -> Self {
        Label::Str(s.into())
    }

    pub fn num(n: f64) -> Self {
        Label::Num(OrderedFloat(n))
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Str(s) if s.chars().any(char::is_whitespace) => write!(f, "\"{s}\""),
            Label::Str(s) => write!(f, "{s}"),
            Label::Num(n) => write!(f, "{}", n.0),
        }
    }
}

/// A dense, stable index into a [`LabelRegistry`].
///
/// Once assigned, an index is stable for the registry's lifetime: interning
/// the same label again always returns the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub u32);

/// A mismatch strategy: given two interned labels, how costly is it to
/// substitute one for the other? Exposed as a pluggable strategy so
/// numeric-tolerance matching can be layered in without touching the
/// subgraph or inexact matchers.
pub type MismatchFn = Box<dyn Fn(&Label, &Label) -> f64>;

pub struct LabelRegistry {
    labels: Vec<Label>,
    mismatch: MismatchFn,
}

impl std::fmt::Debug for LabelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelRegistry")
            .field("labels", &self.labels)
            .finish()
    }
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelRegistry {
    /// Creates a registry using the default exact-match mismatch rule:
    /// 0 when indices are equal, 1 otherwise.
    pub fn new() -> Self {
        LabelRegistry {
            labels: Vec::new(),
            mismatch: Box::new(|_, _| 1.0),
        }
    }

    /// Creates a registry whose mismatch rule treats numeric labels as
    /// tolerant: the cost is the normalized absolute difference, clamped to
    /// `[0, 1]`. String labels still compare exactly.
    pub fn with_numeric_tolerance(scale: f64) -> Self {
        LabelRegistry {
            labels: Vec::new(),
            mismatch: Box::new(move |a, b| match (a, b) {
                (Label::Num(x), Label::Num(y)) => {
                    let diff = (x.0 - y.0).abs();
                    (diff / scale.max(f64::EPSILON)).min(1.0)
                }
                _ if a == b => 0.0,
                _ => 1.0,
            }),
        }
    }

    /// Interns `label`, returning the existing index if already present, or
    /// allocating a new one otherwise.
    pub fn intern(&mut self, label: Label) -> LabelId {
        if let Some(pos) = self.labels.iter().position(|l| l == &label) {
            return LabelId(pos as u32);
        }
        self.labels.push(label);
        LabelId((self.labels.len() - 1) as u32)
    }

    /// Looks up a previously interned label by index.
    ///
    /// # Panics
    /// Panics if `index` was never returned by [`LabelRegistry::intern`] on
    /// this registry.
    pub fn get(&self, index: LabelId) -> &Label {
        &self.labels[index.0 as usize]
    }

    /// Finds the index of an already-interned label, if any.
    pub fn find(&self, label: &Label) -> Option<LabelId> {
        self.labels.iter().position(|l| l == label).map(|p| LabelId(p as u32))
    }

    /// Mismatch cost in `[0, 1]` between two label indices: 0 when equal,
    /// otherwise the registered mismatch strategy's output.
    pub fn mismatch(&self, a: LabelId, b: LabelId) -> f64 {
        if a == b {
            return 0.0;
        }
        (self.mismatch)(self.get(a), self.get(b)).clamp(0.0, 1.0)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabelId, &Label)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (LabelId(i as u32), l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut reg = LabelRegistry::new();
        let a = reg.intern(Label::str("X"));
        let b = reg.intern(Label::str("Y"));
        let a2 = reg.intern(Label::str("X"));
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(reg.get(a), &Label::str("X"));
        assert_eq!(reg.get(b), &Label::str("Y"));
    }

    #[test]
    fn mismatch_default() {
        let mut reg = LabelRegistry::new();
        let a = reg.intern(Label::str("X"));
        let b = reg.intern(Label::str("Y"));
        assert_eq!(reg.mismatch(a, a), 0.0);
        assert_eq!(reg.mismatch(a, b), 1.0);
    }

    #[test]
    fn mismatch_numeric_tolerance() {
        let mut reg = LabelRegistry::with_numeric_tolerance(10.0);
        let a = reg.intern(Label::num(1.0));
        let b = reg.intern(Label::num(2.0));
        assert!((reg.mismatch(a, b) - 0.1).abs() < 1e-9);
    }
}
