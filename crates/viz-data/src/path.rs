//! Minimal JSONPath-style selection for the JSON source.
//!
//! Supports the subset dataset configurations actually use: `$` (root),
//! `.key` / `['key']` member access, `[n]` index access and `[*]` / `.*`
//! wildcards. The default expression `$[*]` selects every top-level element.

use serde_json::Value;
use viz_core::VizError;

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Member(String),
    Index(usize),
    Wild,
}

fn parse(expression: &str) -> Result<Vec<Step>, VizError> {
    let expr = expression.trim();
    let mut chars = expr.chars().peekable();

    match chars.next() {
        Some('$') => {}
        _ => {
            return Err(VizError::parse(
                format!("path expression {expr:?}"),
                "expression must start with '$'",
            ))
        }
    }

    let mut steps = Vec::new();
    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    steps.push(Step::Wild);
                    continue;
                }
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '.' || next == '[' {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(VizError::parse(
                        format!("path expression {expr:?}"),
                        "empty member name",
                    ));
                }
                steps.push(Step::Member(name));
            }
            '[' => {
                let mut inner = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(next);
                }
                if !closed {
                    return Err(VizError::parse(
                        format!("path expression {expr:?}"),
                        "unterminated bracket",
                    ));
                }
                let inner = inner.trim();
                if inner == "*" {
                    steps.push(Step::Wild);
                } else if (inner.starts_with('\'') && inner.ends_with('\'') && inner.len() >= 2)
                    || (inner.starts_with('"') && inner.ends_with('"') && inner.len() >= 2)
                {
                    steps.push(Step::Member(inner[1..inner.len() - 1].to_string()));
                } else {
                    let index = inner.parse::<usize>().map_err(|_| {
                        VizError::parse(
                            format!("path expression {expr:?}"),
                            format!("invalid bracket selector {inner:?}"),
                        )
                    })?;
                    steps.push(Step::Index(index));
                }
            }
            other => {
                return Err(VizError::parse(
                    format!("path expression {expr:?}"),
                    format!("unexpected character {other:?}"),
                ))
            }
        }
    }

    Ok(steps)
}

/// Selects the values matching `expression` within `document`. An empty
/// expression defaults to `$[*]`.
pub fn select(document: &Value, expression: &str) -> Result<Vec<Value>, VizError> {
    let expression = if expression.trim().is_empty() {
        "$[*]"
    } else {
        expression
    };
    let steps = parse(expression)?;

    let mut current: Vec<&Value> = vec![document];
    for step in &steps {
        let mut next = Vec::new();
        for value in current {
            match step {
                Step::Member(name) => {
                    if let Some(found) = value.get(name.as_str()) {
                        next.push(found);
                    }
                }
                Step::Index(index) => {
                    if let Some(found) = value.get(index) {
                        next.push(found);
                    }
                }
                Step::Wild => match value {
                    Value::Array(items) => next.extend(items.iter()),
                    Value::Object(map) => next.extend(map.values()),
                    _ => {}
                },
            }
        }
        current = next;
    }

    Ok(current.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_expression_selects_all_elements() {
        let doc = json!([{"a": 1}, {"a": 2}]);
        let selected = select(&doc, "").unwrap();
        assert_eq!(selected, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn member_and_index_access() {
        let doc = json!({"result": {"rows": [{"x": 1}, {"x": 2}, {"x": 3}]}});
        assert_eq!(
            select(&doc, "$.result.rows[*]").unwrap(),
            vec![json!({"x": 1}), json!({"x": 2}), json!({"x": 3})]
        );
        assert_eq!(select(&doc, "$.result.rows[1]").unwrap(), vec![json!({"x": 2})]);
        assert_eq!(select(&doc, "$['result']['rows'][0]").unwrap(), vec![json!({"x": 1})]);
    }

    #[test]
    fn wildcard_over_object_values() {
        let doc = json!({"a": {"v": 1}, "b": {"v": 2}});
        assert_eq!(select(&doc, "$.*").unwrap(), vec![json!({"v": 1}), json!({"v": 2})]);
    }

    #[test]
    fn missing_members_select_nothing() {
        let doc = json!({"a": 1});
        assert!(select(&doc, "$.b[*]").unwrap().is_empty());
    }

    #[test]
    fn invalid_expressions_error() {
        let doc = json!([]);
        assert!(select(&doc, "rows[*]").is_err());
        assert!(select(&doc, "$[").is_err());
        assert!(select(&doc, "$[abc]").is_err());
        assert!(select(&doc, "$..a").is_err());
    }
}
