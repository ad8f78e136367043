#![allow(dead_code)]

use std::collections::HashMap;

use formula_expr::Value;

/// Build a record scope from `(field, value)` pairs.
pub fn record<const N: usize>(fields: [(&str, Value); N]) -> HashMap<String, Value> {
    fields
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

pub const NO_FIELDS: [&str; 0] = [];
