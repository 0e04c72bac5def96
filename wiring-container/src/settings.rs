//! Registry configuration.

use serde::Deserialize;

/// Knobs for a [`Registry`](crate::registry::Registry).
///
/// Deserialisable so applications can keep them next to the rest of their
/// configuration; missing fields fall back to the defaults.
///
/// # Examples
/// ```
/// use wiring_container::settings::RegistrySettings;
///
/// let settings = RegistrySettings::default()
///     .allow_override(false)
///     .validate_on_build(true);
/// assert!(!settings.allow_override);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Re-registering an identity replaces its descriptor. When `false`
    /// it fails with `AlreadyRegistered`.
    pub allow_override: bool,

    /// Check declared Injected dependencies (missing names, cycles,
    /// lifetimes) in `build()` instead of waiting for the first retrieve.
    pub validate_on_build: bool,

    /// Maximum number of "did you mean" names in unknown-name errors.
    pub max_suggestions: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            allow_override: true,
            validate_on_build: false,
            max_suggestions: 3,
        }
    }
}

impl RegistrySettings {
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.allow_override = allow;
        self
    }

    pub fn validate_on_build(mut self, validate: bool) -> Self {
        self.validate_on_build = validate;
        self
    }

    pub fn max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_replace_on_reregistration() {
        let settings = RegistrySettings::default();
        assert!(settings.allow_override);
        assert!(!settings.validate_on_build);
        assert_eq!(settings.max_suggestions, 3);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let settings: RegistrySettings =
            serde_json::from_str(r#"{ "validate_on_build": true }"#).unwrap();
        assert!(settings.validate_on_build);
        assert!(settings.allow_override);
        assert_eq!(settings.max_suggestions, 3);
    }
}
