//! Evaluation result values.
//!
//! The template language produces text; the comparison builtins (`eq`,
//! `starts`, `not`, `in-git-repo`) produce booleans that only `if` and
//! block guards consume.  Branch sites test for `Bool(true)` specifically:
//! text, including non-empty text, never selects a then-branch.

/// The result of evaluating a template node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bool(bool),
}

impl Default for Value {
    fn default() -> Self {
        Value::Text(String::new())
    }
}

impl Value {
    /// True exactly for `Bool(true)`.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// The text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Bool(_) => None,
        }
    }

    /// Whether displaying this value writes anything.
    pub fn is_visible(&self) -> bool {
        matches!(self, Value::Text(s) if !s.is_empty())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_bool_true_is_true() {
        assert!(Value::Bool(true).is_true());
        assert!(!Value::Bool(false).is_true());
        assert!(!Value::Text("true".into()).is_true());
        assert!(!Value::Text("yes".into()).is_true());
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Value::Text("a".into()), Value::Text("a".into()));
        assert_ne!(Value::Text("a".into()), Value::Text("b".into()));
        assert_eq!(Value::Bool(true), Value::Bool(true));
        // Cross-kind comparison is always unequal.
        assert_ne!(Value::Bool(true), Value::Text("true".into()));
    }

    #[test]
    fn visibility() {
        assert!(Value::Text("x".into()).is_visible());
        assert!(!Value::Text("".into()).is_visible());
        assert!(!Value::Bool(true).is_visible());
    }
}
