//! Partial-update expression compiler.
//!
//! Turns an arbitrary attribute mapping into a `SET` expression plus the
//! values bound to its placeholders. Items have no schema, so the compiler
//! accepts any attribute names and derives a legal placeholder from each.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::storage::Item;

/// Separator between the segments of a nested document path.
pub const PATH_SEPARATOR: char = '.';

/// One `<path> = <placeholder>` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetClause {
    path: String,
    placeholder: String,
}

impl SetClause {
    /// The attribute name as supplied by the caller.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The attribute path split into nested document segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split(PATH_SEPARATOR)
    }

    /// The value placeholder, including its leading `:`.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }
}

/// A compiled partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateExpression {
    clauses: Vec<SetClause>,
    values: BTreeMap<String, Value>,
}

/// An update expression whose attribute names go through `#name` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedExpression {
    pub expression: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, Value>,
}

impl UpdateExpression {
    pub fn clauses(&self) -> &[SetClause] {
        &self.clauses
    }

    /// Placeholder to value bindings.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// The value bound to a clause.
    pub fn value_of(&self, clause: &SetClause) -> Option<&Value> {
        self.values.get(&clause.placeholder)
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders `SET a = :a, b = :b`.
    pub fn expression(&self) -> String {
        let clauses: Vec<String> = self
            .clauses
            .iter()
            .map(|c| format!("{} = {}", c.path, c.placeholder))
            .collect();
        format!("SET {}", clauses.join(", "))
    }

    /// Renders the expression with every path segment replaced by a `#name`
    /// placeholder, so reserved words can be used as attribute names.
    pub fn aliased(&self) -> AliasedExpression {
        let mut aliases: BTreeMap<&str, String> = BTreeMap::new();
        let mut used = HashSet::new();
        let mut names = BTreeMap::new();

        let clauses: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let path: Vec<String> = clause
                    .segments()
                    .map(|segment| {
                        aliases
                            .entry(segment)
                            .or_insert_with(|| {
                                let alias = unique_placeholder('#', segment, &mut used);
                                names.insert(alias.clone(), segment.to_string());
                                alias
                            })
                            .clone()
                    })
                    .collect();
                format!("{} = {}", path.join("."), clause.placeholder)
            })
            .collect();

        AliasedExpression {
            expression: format!("SET {}", clauses.join(", ")),
            names,
            values: self.values.clone(),
        }
    }
}

/// Compiles an attribute mapping into a `SET` update expression.
///
/// Produces exactly one clause and one bound value per attribute.
pub fn compile(attributes: &Item) -> UpdateExpression {
    let mut used = HashSet::new();
    let mut expression = UpdateExpression::default();

    for (key, value) in attributes {
        let placeholder = unique_placeholder(':', key, &mut used);
        expression.values.insert(placeholder.clone(), value.clone());
        expression.clauses.push(SetClause {
            path: key.clone(),
            placeholder,
        });
    }

    expression
}

/// Replaces every character that can't appear in a placeholder with `_`.
pub fn sanitize(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

fn unique_placeholder(prefix: char, name: &str, used: &mut HashSet<String>) -> String {
    let base = format!("{prefix}{}", sanitize(name));
    let mut candidate = base.clone();
    let mut suffix = 1;
    while !used.insert(candidate.clone()) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            _ => panic!("test item must be an object"),
        }
    }

    fn is_legal_placeholder(placeholder: &str) -> bool {
        let mut chars = placeholder.chars();
        matches!(chars.next(), Some(':') | Some('#'))
            && placeholder.len() > 1
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    #[test]
    fn test_compile_single_attribute() {
        let update = compile(&item(json!({"qty": 5})));

        assert_eq!(update.expression(), "SET qty = :qty");
        assert_eq!(update.values().get(":qty"), Some(&json!(5)));
    }

    #[test]
    fn test_compile_one_clause_per_attribute() {
        let attributes = item(json!({
            "name": "widget",
            "qty": 3,
            "price": 9.99,
            "tags": ["a"],
            "meta": {"color": "red"}
        }));

        let update = compile(&attributes);
        let expression = update.expression();
        let clauses: Vec<&str> = expression
            .strip_prefix("SET ")
            .unwrap()
            .split(", ")
            .collect();

        assert_eq!(update.len(), attributes.len());
        assert_eq!(clauses.len(), attributes.len());
        assert_eq!(update.values().len(), attributes.len());
        for placeholder in update.values().keys() {
            assert!(expression.contains(placeholder.as_str()));
        }
        for key in attributes.keys() {
            assert!(clauses.iter().any(|c| c.starts_with(&format!("{key} = "))));
        }
    }

    #[test]
    fn test_compile_empty_mapping() {
        let update = compile(&Item::new());

        assert!(update.is_empty());
        assert!(update.values().is_empty());
        assert_eq!(update.expression(), "SET ");
    }

    #[test]
    fn test_dotted_key_gets_legal_placeholder() {
        let update = compile(&item(json!({"dimensions.width": 10})));

        assert_eq!(update.expression(), "SET dimensions.width = :dimensions_width");
        assert_eq!(
            update.values().get(":dimensions_width"),
            Some(&json!(10))
        );
    }

    #[test]
    fn test_illegal_characters_never_reach_placeholders() {
        let update = compile(&item(json!({
            "a.b": 1,
            "with space": 2,
            "dash-ed": 3,
            "ünïcode": 4,
            "": 5
        })));

        assert_eq!(update.values().len(), 5);
        for placeholder in update.values().keys() {
            assert!(is_legal_placeholder(placeholder), "{placeholder}");
        }
    }

    #[test]
    fn test_colliding_placeholders_are_disambiguated() {
        let update = compile(&item(json!({"a.b": 1, "a_b": 2, "a-b": 3})));

        assert_eq!(update.len(), 3);
        assert_eq!(update.values().len(), 3);
        for clause in update.clauses() {
            assert!(update.value_of(clause).is_some());
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let attributes = item(json!({"x.y": 1, "z": "two"}));
        assert_eq!(compile(&attributes), compile(&attributes));
    }

    #[test]
    fn test_segments_split_nested_paths() {
        let update = compile(&item(json!({"meta.color.primary": "red"})));
        let segments: Vec<&str> = update.clauses()[0].segments().collect();
        assert_eq!(segments, vec!["meta", "color", "primary"]);
    }

    #[test]
    fn test_aliased_expression_uses_name_placeholders() {
        let update = compile(&item(json!({"meta.name": "inner", "name": "gadget"})));
        let aliased = update.aliased();

        assert_eq!(
            aliased.expression,
            "SET #meta.#name = :meta_name, #name = :name"
        );
        assert_eq!(aliased.names.len(), 2);
        assert_eq!(aliased.names.get("#name").map(String::as_str), Some("name"));
        assert_eq!(aliased.names.get("#meta").map(String::as_str), Some("meta"));
        assert_eq!(aliased.values, *update.values());
    }

    #[test]
    fn test_aliased_names_are_legal() {
        let update = compile(&item(json!({"first name": 1, "first-name": 2})));
        let aliased = update.aliased();

        assert_eq!(aliased.names.len(), 2);
        for alias in aliased.names.keys() {
            assert!(is_legal_placeholder(alias), "{alias}");
        }
    }
}
