use crate::{
    host::{DURATION_KEY, Host, TRANSITION_KEY},
    table::lookup::TransitionTable,
    table::rule::TransitionRule,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Resolved override for one destination scene.
pub struct SceneOverride {
    /// Destination scene whose private settings are written.
    pub scene: String,
    /// Rule to stage, or `None` to erase any staged override.
    pub rule: Option<TransitionRule>,
}

/// Resolve the override of every scene in `scenes` when leaving `from`.
///
/// Returns `None` when `canvas` has no entry in the table: canvases the table never touched keep
/// whatever overrides the host (or the user) configured.
pub fn plan_overrides(
    table: &TransitionTable,
    canvas: &str,
    from: Option<&str>,
    scenes: &[String],
) -> Option<Vec<SceneOverride>> {
    if !table.has_canvas(canvas) {
        return None;
    }
    // An unknown current scene still matches `Any -> ...` rules.
    let from = from.unwrap_or_default();
    Some(
        scenes
            .iter()
            .map(|to| SceneOverride {
                scene: to.clone(),
                rule: table.resolve(canvas, from, to).cloned(),
            })
            .collect(),
    )
}

/// Write a planned set of overrides into the host's private settings.
pub fn write_overrides(host: &dyn Host, plan: &[SceneOverride]) {
    for ov in plan {
        match &ov.rule {
            Some(rule) => {
                tracing::debug!(scene = %ov.scene, transition = %rule.transition, duration = %rule.duration, "stage override");
                host.set_private_string(&ov.scene, TRANSITION_KEY, &rule.transition);
                host.set_private_int(&ov.scene, DURATION_KEY, rule.duration.as_i64());
            }
            None => erase_override(host, &ov.scene),
        }
    }
}

/// Erase the staged override of every scene of `canvas`; returns the number of scenes touched.
pub fn clear_overrides(host: &dyn Host, canvas: &str) -> usize {
    let scenes = host.scenes(canvas);
    for scene in &scenes {
        erase_override(host, scene);
    }
    scenes.len()
}

fn erase_override(host: &dyn Host, scene: &str) {
    host.erase_private(scene, TRANSITION_KEY);
    host.erase_private(scene, DURATION_KEY);
}

#[cfg(test)]
#[path = "../../tests/unit/sync/overrides.rs"]
mod tests;
