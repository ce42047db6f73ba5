//! Reference resolver — expands `${...}` tokens against a run context
//!
//! Pure functions, no side effects. A token names a dotted path into the
//! execution context (`${inputs.user_query}`, `${sql_query.sql}`). A path
//! that does not resolve deletes the placeholder from the string rather
//! than raising: plans routinely template optional fields, and a missing
//! upstream value must degrade to an empty substitution. This
//! delete-on-miss behavior is load-bearing; tests pin it.

use serde_json::{Map, Value};

/// Recursively resolve `${...}` tokens in `value` against `context`.
/// Mappings and sequences are rebuilt with resolved members; non-string
/// scalars pass through unchanged.
pub fn resolve(value: &Value, context: &Map<String, Value>) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve(v, context)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| resolve(v, context)).collect())
        }
        Value::String(s) => Value::String(resolve_str(s, context)),
        other => other.clone(),
    }
}

fn resolve_str(raw: &str, context: &Map<String, Value>) -> String {
    // cheap pre-check: strings without a delimiter pair are returned as-is
    if !(raw.contains("${") && raw.contains('}')) {
        return raw.to_string();
    }

    let mut out = raw.to_string();
    let mut start = 0;
    loop {
        let Some(open) = out[start..].find("${").map(|i| i + start) else {
            break;
        };
        // An unterminated token halts scanning; the remainder stays literal.
        let Some(close) = out[open..].find('}').map(|i| i + open) else {
            break;
        };
        let token = &out[open + 2..close];
        match lookup(token, context) {
            Some(value) => {
                let rendered = render(value);
                out.replace_range(open..=close, &rendered);
                // resume after the replacement so substituted text is
                // never rescanned
                start = open + rendered.len();
            }
            None => {
                out.replace_range(open..=close, "");
                start = open;
            }
        }
    }
    out
}

/// Walk a dotted path through the context. Only object indexing; a path
/// segment that hits a non-object or a missing key fails the whole lookup.
fn lookup<'a>(token: &str, context: &'a Map<String, Value>) -> Option<&'a Value> {
    let mut parts = token.split('.');
    let mut current = context.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// String rendering of a resolved value: strings verbatim, everything
/// else as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "inputs": { "x": "hello", "n": 5 },
            "sql_query": { "sql": "SELECT 1", "confidence": 0.8 },
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn plain_string_passthrough() {
        assert_eq!(resolve(&json!("no tokens here"), &ctx()), json!("no tokens here"));
    }

    #[test]
    fn simple_substitution() {
        assert_eq!(resolve(&json!("${inputs.x}"), &ctx()), json!("hello"));
    }

    #[test]
    fn missing_token_deleted() {
        assert_eq!(
            resolve(&json!("pfx-${missing.key}-sfx"), &ctx()),
            json!("pfx--sfx")
        );
    }

    #[test]
    fn multiple_tokens_one_string() {
        assert_eq!(
            resolve(&json!("${inputs.x}:${sql_query.sql}"), &ctx()),
            json!("hello:SELECT 1")
        );
    }

    #[test]
    fn unterminated_token_left_literal() {
        assert_eq!(resolve(&json!("a ${inputs.x"), &ctx()), json!("a ${inputs.x"));
        // first token resolves, the dangling one stays
        assert_eq!(
            resolve(&json!("${inputs.x} ${rest"), &ctx()),
            json!("hello ${rest")
        );
    }

    #[test]
    fn non_object_segment_fails_lookup() {
        // inputs.x is a string; indexing further misses
        assert_eq!(resolve(&json!("${inputs.x.deeper}"), &ctx()), json!(""));
    }

    #[test]
    fn non_string_values_rendered_as_json() {
        assert_eq!(resolve(&json!("n=${inputs.n}"), &ctx()), json!("n=5"));
        // object keys render in serde_json's map order (sorted)
        assert_eq!(
            resolve(&json!("${sql_query}"), &ctx()),
            json!(r#"{"confidence":0.8,"sql":"SELECT 1"}"#)
        );
    }

    #[test]
    fn nested_structures_resolved() {
        let input = json!({
            "a": ["${inputs.x}", {"b": "${sql_query.sql}"}],
            "c": 7,
            "d": true,
        });
        let resolved = resolve(&input, &ctx());
        assert_eq!(
            resolved,
            json!({"a": ["hello", {"b": "SELECT 1"}], "c": 7, "d": true})
        );
    }

    #[test]
    fn resolution_is_idempotent_on_token_free_values() {
        let input = json!({"v": "plain", "n": [1, 2, 3]});
        let once = resolve(&input, &ctx());
        let twice = resolve(&once, &ctx());
        assert_eq!(once, twice);
    }
}
