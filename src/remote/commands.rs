use serde_json::{Value, json};

use crate::{
    engine::TransitionTableEngine,
    foundation::core::DurationMs,
    foundation::error::TableError,
};

/// Vendor name under which the requests are registered.
pub const VENDOR_NAME: &str = "transition-table";

/// Request names understood by [`handle_request`].
pub const REQUESTS: [&str; 3] = ["get_transition", "set_transition", "get_table"];

#[derive(Debug, Default)]
struct RuleRequest {
    canvas: Option<String>,
    from_scene: Option<String>,
    to_scene: Option<String>,
    transition: Option<String>,
    duration: Option<DurationMs>,
}

impl RuleRequest {
    /// Fields are read independently; a field of the wrong type reads as unset.
    fn parse(payload: &Value) -> Self {
        let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);
        let duration = payload.get("duration").and_then(|v| {
            v.as_i64()
                .map(DurationMs::from_i64)
                .or_else(|| v.as_u64().map(|_| DurationMs(u32::MAX)))
                .or_else(|| v.as_f64().map(DurationMs::from_f64))
        });
        Self {
            canvas: text("canvas"),
            from_scene: text("from_scene"),
            to_scene: text("to_scene"),
            transition: text("transition"),
            duration,
        }
    }
}

fn failure(error: impl Into<String>) -> Value {
    json!({ "success": false, "error": error.into() })
}

/// Dispatch a vendor request by name.
///
/// Every outcome is a structured response; unknown names yield `success: false`.
#[tracing::instrument(skip(engine, payload))]
pub fn handle_request(engine: &TransitionTableEngine, name: &str, payload: &Value) -> Value {
    match name {
        "get_transition" => get_transition(engine, payload),
        "set_transition" => set_transition(engine, payload),
        "get_table" => get_table(engine),
        other => failure(format!("unknown request '{other}'")),
    }
}

/// `get_transition {canvas?, from_scene, to_scene}`: the resolved rule, or `("", 0)`.
pub fn get_transition(engine: &TransitionTableEngine, payload: &Value) -> Value {
    let req = RuleRequest::parse(payload);
    let (transition, duration) = lookup(
        engine,
        req.canvas.as_deref(),
        req.from_scene.as_deref().unwrap_or_default(),
        req.to_scene.as_deref().unwrap_or_default(),
    );
    json!({ "transition": transition, "duration": duration, "success": true })
}

/// `set_transition {canvas?, from_scene, to_scene, transition?, duration?}`.
///
/// An empty or absent transition deletes the exact rule.
pub fn set_transition(engine: &TransitionTableEngine, payload: &Value) -> Value {
    let req = RuleRequest::parse(payload);
    let from = req.from_scene.unwrap_or_default();
    if from.is_empty() {
        return failure("'from_scene' not set");
    }
    let to = req.to_scene.unwrap_or_default();
    if to.is_empty() {
        return failure("'to_scene' not set");
    }
    let canvas = req.canvas.as_deref();
    let transition = req.transition.unwrap_or_default();

    let outcome = if transition.is_empty() {
        engine.try_erase_rule(canvas, &from, &to).map(drop)
    } else {
        engine
            .set_rule(
                canvas,
                &from,
                &to,
                &transition,
                req.duration.unwrap_or_default(),
            )
            .map(drop)
    };
    match outcome {
        Ok(()) => json!({ "success": true }),
        // Lookup failures carry the bare message remote callers expect.
        Err(TableError::NotFound(msg)) => failure(msg),
        Err(e) => failure(e.to_string()),
    }
}

/// `get_table {}`: every rule of every canvas.
pub fn get_table(engine: &TransitionTableEngine) -> Value {
    json!({ "success": true, "transitions": engine.records() })
}

/// Host procedure `get_transition_table_transition(canvas?, from_scene, to_scene)`.
pub fn proc_get_transition_table_transition(
    engine: &TransitionTableEngine,
    canvas: Option<&str>,
    from_scene: &str,
    to_scene: &str,
) -> (String, i64) {
    let (transition, duration) = lookup(engine, canvas, from_scene, to_scene);
    (transition, duration.as_i64())
}

fn lookup(
    engine: &TransitionTableEngine,
    canvas: Option<&str>,
    from: &str,
    to: &str,
) -> (String, DurationMs) {
    engine
        .resolve(canvas, from, to)
        .map(|r| (r.transition, r.duration))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/remote/commands.rs"]
mod tests;
