// Reply extraction for upstreams whose response schema is not guaranteed.
// Shapes are tried in order: choices[0].message, result, response, raw payload.

use crate::traits::{Reply, ReplySource, TokenUsage};
use serde_json::Value;

/// Pull the reply text out of a successful completion payload
pub fn extract_reply(data: &Value) -> Reply {
    let usage = extract_usage(data);

    if let Some(message) = data
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .filter(|message| is_truthy(message))
    {
        let content = match message.get("content") {
            None | Some(Value::Null) => String::new(),
            Some(content) => text_of(content),
        };
        return Reply {
            content,
            source: ReplySource::Choices,
            usage,
        };
    }

    if let Some(result) = data.get("result").filter(|v| is_truthy(v)) {
        return Reply {
            content: text_of(result),
            source: ReplySource::Result,
            usage,
        };
    }

    if let Some(response) = data.get("response").filter(|v| is_truthy(v)) {
        return Reply {
            content: text_of(response),
            source: ReplySource::Response,
            usage,
        };
    }

    tracing::warn!(payload = %data, "Unknown upstream response shape, relaying raw payload");
    Reply {
        content: data.to_string(),
        source: ReplySource::RawPayload,
        usage,
    }
}

fn extract_usage(data: &Value) -> Option<TokenUsage> {
    let usage = data.get("usage").filter(|u| u.is_object())?;
    serde_json::from_value(usage.clone()).ok()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose truthiness: null, false, 0 and "" count as absent
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
