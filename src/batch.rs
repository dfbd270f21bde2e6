//! The single-invocation batch adapter: one JSON event in, one JSON object
//! out. Every failure becomes `{"error": <message>}`; nothing panics or
//! escapes past the handler boundary.

use crate::invoker::Invoke;
use crate::pipeline::Pipeline;
use serde_json::{json, Value};
use tracing::warn;

/// Handle one event of the shape `{"input": {"image": .., "mask": ..}}`.
pub fn handle_event<I: Invoke>(pipeline: &Pipeline<I>, event: &Value) -> Value {
    let payload = event.get("input");
    let image = payload.and_then(|p| p.get("image")).and_then(Value::as_str);
    let mask = payload.and_then(|p| p.get("mask")).and_then(Value::as_str);

    let (image, mask) = match (image, mask) {
        (Some(image), Some(mask)) if !image.is_empty() && !mask.is_empty() => (image, mask),
        _ => return json!({ "error": "missing 'image' or 'mask' base64" }),
    };

    match pipeline.run(image, mask) {
        Ok(result) => json!({ "result": result }),
        Err(err) => {
            warn!("batch request failed: {err}");
            json!({ "error": err.to_string() })
        }
    }
}
