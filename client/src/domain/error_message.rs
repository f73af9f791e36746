//! Human-readable messages from backend error bodies.
//!
//! The backend reports failures in several shapes: a `detail`, `message` or
//! `error` string, or a map of field names to lists of validation messages.
//! Extractors run in that order and the first hit wins.

use serde_json::Value;

use super::api_result::REQUEST_FAILED_MESSAGE;

type Extractor = fn(&Value) -> Option<String>;

const EXTRACTORS: [Extractor; 4] = [detail, message, error, field_errors];

/// Derive the message shown to the user for an error body.
///
/// Falls back to `"Request failed"` when no extractor matches.
///
/// # Examples
/// ```
/// use chakula_client::domain::describe_error;
/// use serde_json::json;
///
/// assert_eq!(describe_error(&json!({ "detail": "Not found." })), "Not found.");
/// assert_eq!(
///     describe_error(&json!({ "phone_number": ["This field is required."] })),
///     "phone number: This field is required."
/// );
/// assert_eq!(describe_error(&json!({})), "Request failed");
/// ```
pub fn describe_error(body: &Value) -> String {
    EXTRACTORS
        .iter()
        .find_map(|extract| extract(body))
        .unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_owned())
}

fn detail(body: &Value) -> Option<String> {
    non_empty_string(body, "detail")
}

fn message(body: &Value) -> Option<String> {
    non_empty_string(body, "message")
}

fn error(body: &Value) -> Option<String> {
    non_empty_string(body, "error")
}

fn non_empty_string(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

fn field_errors(body: &Value) -> Option<String> {
    let clauses: Vec<String> = body
        .as_object()?
        .iter()
        .filter_map(|(field, messages)| {
            let messages = messages.as_array()?;
            let joined = messages
                .iter()
                .map(render_message)
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!("{}: {joined}", field.replace('_', " ")))
        })
        .collect();
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join("; "))
    }
}

fn render_message(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::detail_wins(json!({ "detail": "d", "message": "m", "error": "e" }), "d")]
    #[case::message_before_error(json!({ "message": "m", "error": "e" }), "m")]
    #[case::error_field(json!({ "error": "e" }), "e")]
    #[case::empty_detail_skipped(json!({ "detail": "", "message": "m" }), "m")]
    #[case::non_string_detail_skipped(json!({ "detail": 3, "error": "e" }), "e")]
    #[case::string_fields_beat_field_map(json!({ "error": "e", "email": ["bad"] }), "e")]
    #[case::empty_object(json!({}), "Request failed")]
    #[case::null_body(Value::Null, "Request failed")]
    #[case::array_body(json!(["oops"]), "Request failed")]
    #[case::map_without_arrays(json!({ "code": "x" }), "Request failed")]
    fn extractors_run_in_precedence_order(#[case] body: Value, #[case] expected: &str) {
        assert_eq!(describe_error(&body), expected);
    }

    #[test]
    fn field_errors_humanise_names_and_join_clauses() {
        let body = json!({
            "phone_number": ["This field is required."],
            "password": ["Too short.", "Too common."],
        });
        assert_eq!(
            describe_error(&body),
            "password: Too short., Too common.; phone number: This field is required."
        );
    }

    #[test]
    fn field_errors_skip_non_array_entries() {
        let body = json!({
            "non_field_errors": ["Invalid credentials."],
            "status_code": 400,
        });
        assert_eq!(describe_error(&body), "non field errors: Invalid credentials.");
    }

    #[test]
    fn field_errors_render_non_string_items_as_json() {
        let body = json!({ "limits": [3, { "max": 5 }] });
        assert_eq!(describe_error(&body), r#"limits: 3, {"max":5}"#);
    }
}
