//! Process-start activation gate for the metrics subsystem.
//!
//! The subsystem only activates when the host process actually serves
//! traffic, the operator has not opted out via the environment, and the
//! host configuration enables business metrics. All three conditions are
//! evaluated once, before the registration driver runs.

use serde::Deserialize;

/// Environment variable disabling telemetry when set to anything but
/// `"false"`.
pub const OPT_OUT_ENV: &str = "NO_TELEMETRY";

/// How the host process was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Default invocation with no explicit command.
    Default,
    /// Explicit serve command.
    Serve,
    /// Explicit run command.
    Run,
    /// Any other command (build, deploy, code generation, ...).
    Other,
}

impl InvocationMode {
    /// Classify a CLI command string.
    pub fn from_command(command: &str) -> Self {
        match command {
            "" => Self::Default,
            "serve" => Self::Serve,
            "run" => Self::Run,
            _ => Self::Other,
        }
    }

    /// Whether this mode serves live traffic.
    pub fn is_serving(self) -> bool {
        matches!(self, Self::Default | Self::Serve | Self::Run)
    }
}

/// Telemetry settings supplied by the host configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetrySettings {
    /// Master switch for annotation-driven business metrics.
    #[serde(default)]
    pub enable_business_metrics: bool,
}

/// Decides at process start whether the subsystem activates.
///
/// # Examples
///
/// ```rust
/// use entity_metrics::bootstrap::{ActivationGate, InvocationMode, TelemetrySettings};
///
/// let gate = ActivationGate::new(
///     InvocationMode::Serve,
///     None,
///     TelemetrySettings { enable_business_metrics: true },
/// );
/// assert!(gate.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct ActivationGate {
    mode: InvocationMode,
    opt_out: Option<String>,
    settings: TelemetrySettings,
}

impl ActivationGate {
    /// Build a gate from explicit inputs.
    ///
    /// `opt_out` is the raw value of the opt-out environment variable, if
    /// set.
    pub fn new(mode: InvocationMode, opt_out: Option<String>, settings: TelemetrySettings) -> Self {
        Self {
            mode,
            opt_out,
            settings,
        }
    }

    /// Build a gate reading the opt-out flag from the process environment.
    pub fn from_env(mode: InvocationMode, settings: TelemetrySettings) -> Self {
        Self::new(mode, std::env::var(OPT_OUT_ENV).ok(), settings)
    }

    /// Whether the subsystem activates: serving mode, no opt-out, and
    /// business metrics enabled in configuration.
    pub fn is_active(&self) -> bool {
        self.mode.is_serving() && !self.opted_out() && self.settings.enable_business_metrics
    }

    // Set-but-empty and "false" both mean "not opted out".
    fn opted_out(&self) -> bool {
        self.opt_out
            .as_deref()
            .is_some_and(|value| !value.is_empty() && value != "false")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> TelemetrySettings {
        TelemetrySettings {
            enable_business_metrics: true,
        }
    }

    #[test]
    fn serving_modes_activate_when_enabled() {
        for mode in [InvocationMode::Default, InvocationMode::Serve, InvocationMode::Run] {
            let gate = ActivationGate::new(mode, None, enabled());
            assert!(gate.is_active(), "{mode:?} should activate");
        }
    }

    #[test]
    fn non_serving_command_stays_inert() {
        let gate = ActivationGate::new(InvocationMode::from_command("build"), None, enabled());
        assert!(!gate.is_active());
    }

    #[test]
    fn opt_out_env_disables() {
        let gate = ActivationGate::new(InvocationMode::Serve, Some("1".to_owned()), enabled());
        assert!(!gate.is_active());
    }

    #[test]
    fn opt_out_false_or_empty_does_not_disable() {
        let gate = ActivationGate::new(InvocationMode::Serve, Some("false".to_owned()), enabled());
        assert!(gate.is_active());
        let gate = ActivationGate::new(InvocationMode::Serve, Some(String::new()), enabled());
        assert!(gate.is_active());
    }

    #[test]
    fn disabled_settings_stay_inert() {
        let gate = ActivationGate::new(InvocationMode::Serve, None, TelemetrySettings::default());
        assert!(!gate.is_active());
    }

    #[test]
    fn command_classification() {
        assert_eq!(InvocationMode::from_command(""), InvocationMode::Default);
        assert_eq!(InvocationMode::from_command("serve"), InvocationMode::Serve);
        assert_eq!(InvocationMode::from_command("run"), InvocationMode::Run);
        assert_eq!(InvocationMode::from_command("deploy"), InvocationMode::Other);
    }

    #[test]
    fn settings_deserialize_with_default() {
        let settings: TelemetrySettings = serde_json::from_str("{}").unwrap();
        assert!(!settings.enable_business_metrics);
        let settings: TelemetrySettings =
            serde_json::from_str(r#"{"enable_business_metrics": true}"#).unwrap();
        assert!(settings.enable_business_metrics);
    }
}
