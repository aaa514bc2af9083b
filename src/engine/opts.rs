use crate::foundation::core::DialogSize;

/// Engine construction options.
#[derive(Clone, Debug)]
pub struct EngineOpts {
    /// Dialog sizes at or below this are not persisted.
    pub dialog_floor: DialogSize,
    /// Suffix appended when duplicating a rule set.
    pub duplicate_suffix: String,
    /// Name of the set created for fresh, flat or legacy data.
    pub default_set_name: String,
    /// Whether overrides are applied right after construction.
    pub enabled_on_start: bool,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            dialog_floor: DialogSize::new(500, 300),
            duplicate_suffix: " copy".to_string(),
            default_set_name: "Default".to_string(),
            enabled_on_start: true,
        }
    }
}
