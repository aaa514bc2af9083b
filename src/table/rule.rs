use crate::foundation::core::DurationMs;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Transition effect and duration applied for one `(from, to)` scene pair.
pub struct TransitionRule {
    /// Name of a transition known to the host.
    pub transition: String,
    /// Duration of the transition.
    pub duration: DurationMs,
}

impl TransitionRule {
    /// Construct a rule.
    pub fn new(transition: impl Into<String>, duration: DurationMs) -> Self {
        Self {
            transition: transition.into(),
            duration,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Flat `(canvas?, from, to) -> (transition, duration)` record.
///
/// This is the unit of persistence, file export/import and remote listing. Missing string fields
/// deserialize as empty, mirroring how host settings stores report absent keys.
pub struct RuleRecord {
    /// Owning canvas; `None` means "the canvas chosen by the reader".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<String>,
    /// Source scene or `"Any"`.
    #[serde(default)]
    pub from_scene: String,
    /// Destination scene or `"Any"`.
    #[serde(default)]
    pub to_scene: String,
    /// Transition name.
    #[serde(default)]
    pub transition: String,
    /// Duration in milliseconds.
    #[serde(default)]
    pub duration: DurationMs,
}

impl RuleRecord {
    /// Build a record without a canvas.
    pub fn new(
        from_scene: impl Into<String>,
        to_scene: impl Into<String>,
        transition: impl Into<String>,
        duration: DurationMs,
    ) -> Self {
        Self {
            canvas: None,
            from_scene: from_scene.into(),
            to_scene: to_scene.into(),
            transition: transition.into(),
            duration,
        }
    }

    /// Attach a canvas name.
    pub fn with_canvas(mut self, canvas: impl Into<String>) -> Self {
        self.canvas = Some(canvas.into());
        self
    }

    /// Records with an empty key or transition carry no rule.
    pub fn is_storable(&self) -> bool {
        !self.from_scene.is_empty() && !self.to_scene.is_empty() && !self.transition.is_empty()
    }

    /// Canvas to store this record under, falling back to `default_canvas`.
    pub fn canvas_or<'a>(&'a self, default_canvas: &'a str) -> &'a str {
        match self.canvas.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => default_canvas,
        }
    }

    /// The rule carried by this record.
    pub fn rule(&self) -> TransitionRule {
        TransitionRule::new(self.transition.clone(), self.duration)
    }
}
