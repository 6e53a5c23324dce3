//! Protect expressions.
//!
//! An expression is a path with `*` wildcards, each matching any run of
//! characters (including `/` and the empty string). Expressions that do not
//! already end with `*` get one appended, so `/api` protects `/api`,
//! `/api/users` and `/api-v2` alike.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectPattern {
    expression: String,
}

impl ProtectPattern {
    pub fn new(expression: &str) -> Self {
        let mut expression = expression.to_string();
        if !expression.ends_with('*') {
            expression.push('*');
        }
        Self { expression }
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut parts = self.expression.split('*');
        // split always yields at least one item
        let first = parts.next().unwrap_or_default();
        let Some(mut rest) = path.strip_prefix(first) else {
            return false;
        };

        let parts: Vec<&str> = parts.collect();
        let Some((last, middle)) = parts.split_last() else {
            // literal expression, exact match
            return rest.is_empty();
        };

        for part in middle {
            match rest.find(part) {
                Some(idx) => rest = &rest[idx + part.len()..],
                None => return false,
            }
        }

        rest.ends_with(last)
    }
}
