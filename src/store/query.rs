use serde_json::Value;

/// Comparison used by a [`Predicate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
}

/// A field condition evaluated against stored documents.
///
/// `field` may be a dotted path into nested objects (`stage.kind`). A missing
/// field compares as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Predicate {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: Op::Eq,
            value: value.into(),
        }
    }

    pub fn not_equals(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: Op::Ne,
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        let actual = lookup(document, &self.field).unwrap_or(&Value::Null);
        match self.op {
            Op::Eq => *actual == self.value,
            Op::Ne => *actual != self.value,
        }
    }
}

/// True when every predicate holds
pub fn matches_all(document: &Value, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| p.matches(document))
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_paths_resolve() {
        let doc = json!({"stage": {"kind": "in_igms"}, "partnerRef": "JOHN7766"});
        assert!(Predicate::equals("stage.kind", "in_igms").matches(&doc));
        assert!(Predicate::not_equals("stage.kind", "resolved").matches(&doc));
        assert!(Predicate::equals("partnerRef", "JOHN7766").matches(&doc));
    }

    #[test]
    fn missing_fields_compare_as_null() {
        let doc = json!({"name": "Asha"});
        assert!(Predicate::equals("email", Value::Null).matches(&doc));
        assert!(!Predicate::equals("stage.kind", "created").matches(&doc));
    }

    #[test]
    fn all_predicates_must_hold() {
        let doc = json!({"a": 1, "b": 2});
        assert!(matches_all(&doc, &[]));
        assert!(matches_all(&doc, &[Predicate::equals("a", 1), Predicate::equals("b", 2)]));
        assert!(!matches_all(&doc, &[Predicate::equals("a", 1), Predicate::equals("b", 3)]));
    }
}
