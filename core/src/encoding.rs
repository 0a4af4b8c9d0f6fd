//! URL and body encoding helpers shared by the affix, params and payload
//! stages.

use serde_json::Value;
use url::form_urlencoded;

use crate::options::Params;

/// Insert `suffix` right before the first `?`, or append it when the URL has
/// no query string.
pub fn insert_suffix(url: &str, suffix: &str) -> String {
    match url.find('?') {
        Some(idx) => format!("{}{}{}", &url[..idx], suffix, &url[idx..]),
        None => format!("{url}{suffix}"),
    }
}

/// Append `params` to the query string of `url`.
///
/// Existing query pairs are kept and a `#fragment` stays at the end. An empty
/// parameter set leaves the URL untouched.
pub fn append_query(url: &str, params: &Params) -> String {
    let query = encode_pairs(params.iter());
    if query.is_empty() {
        return url.to_string();
    }

    let (base, fragment) = match url.find('#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    let separator = if !base.contains('?') {
        "?"
    } else if base.ends_with('?') || base.ends_with('&') {
        ""
    } else {
        "&"
    };
    format!("{base}{separator}{query}{fragment}")
}

/// Encode a payload as `application/x-www-form-urlencoded`.
///
/// Objects become key/value pairs; a string is taken as already encoded; any
/// other value is sent as its JSON text.
pub fn form_encode(payload: &Value) -> String {
    match payload {
        Value::Object(map) => encode_pairs(map.iter()),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a String, &'a Value)>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        serializer.append_pair(key, &text);
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    serializer.append_pair(key, &text);
                }
            }
        }
    }
    serializer.finish()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
