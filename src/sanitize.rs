//! Request body sanitization applied to every JSON payload.
//!
//! Object keys that look like query operators (`$where`, `a.b`) are dropped and
//! markup is stripped from string values before the payload is deserialized.

use std::sync::LazyLock;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*(script|style)[^>]*>.*?<\s*/\s*(script|style)\s*>").expect("valid regex")
});
// Only tag-shaped input: `<` followed by a name, an optional `/`, or a comment.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?[a-zA-Z][^>]*>").expect("valid regex")
});
static JS_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("valid regex"));

pub fn is_forbidden_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.')
}

pub fn clean_text(input: &str) -> String {
    if !input.contains('<') && !input.to_ascii_lowercase().contains("javascript") {
        return input.to_string();
    }
    let s = SCRIPT_BLOCK.replace_all(input, "");
    let s = TAG.replace_all(&s, "");
    JS_URI.replace_all(&s, "").into_owned()
}

pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, _| !is_forbidden_key(key));
            map.values_mut().for_each(sanitize_value);
        }
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        Value::String(s) => *s = clean_text(s),
        _ => {}
    }
}

/// `Json<T>` that sanitizes the payload before deserializing it.
#[derive(Debug)]
pub struct SanitizedJson<T>(pub T);

impl<T, S> FromRequest<S> for SanitizedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        sanitize_value(&mut value);
        let payload =
            serde_json::from_value(value).map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok(Self(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_operator_keys_recursively() {
        let mut value = json!({
            "email": { "$gt": "" },
            "profile.role": "admin",
            "items": [{ "$where": "1", "quantity": 2 }],
        });
        sanitize_value(&mut value);
        assert_eq!(value, json!({ "email": {}, "items": [{ "quantity": 2 }] }));
    }

    #[test]
    fn strips_markup_from_strings() {
        assert_eq!(clean_text("<b>Extra</b> cheese"), "Extra cheese");
        assert_eq!(
            clean_text("hi<script>alert('x')</script> there"),
            "hi there"
        );
        assert_eq!(clean_text("JavaScript:alert(1)"), "alert(1)");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(clean_text("  no onions, please  "), "  no onions, please  ");
        assert_eq!(clean_text("5 > 3"), "5 > 3");
    }

    #[test]
    fn comparisons_are_not_mistaken_for_tags() {
        assert_eq!(clean_text("2 < 3 and 5 > 4"), "2 < 3 and 5 > 4");
        assert_eq!(clean_text("x<!-- hidden -->y"), "xy");
        assert_eq!(clean_text("a </i>b"), "a b");
    }

    #[test]
    fn keeps_numbers_and_booleans() {
        let mut value = json!({ "rating": 5, "is_default": true, "notes": null });
        let expected = value.clone();
        sanitize_value(&mut value);
        assert_eq!(value, expected);
    }
}
