use std::time::Duration;

use serde::Deserialize;

/// How payloads reach the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryMode {
    /// Evaluate the callback script after a fixed delay.
    #[default]
    Timed,
    /// Queue until the page invokes the `ready` command.
    OnReady,
}

/// Plugin configuration, read from `plugins.pdfshare` in `tauri.conf.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub delivery: DeliveryMode,
    pub initial_delay_ms: u64,
    pub retry_delay_ms: u64,
    pub webview_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delivery: DeliveryMode::Timed,
            initial_delay_ms: 1500,
            retry_delay_ms: 1000,
            webview_label: "main".to_string(),
        }
    }
}

impl Config {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.delivery, DeliveryMode::Timed);
        assert_eq!(config.initial_delay(), Duration::from_millis(1500));
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.webview_label, "main");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "delivery": "onReady" }"#).unwrap();
        assert_eq!(config.delivery, DeliveryMode::OnReady);
        assert_eq!(config.initial_delay_ms, 1500);
        assert_eq!(config.webview_label, "main");
    }

    #[test]
    fn test_camel_case_keys() {
        let config: Config = serde_json::from_str(
            r#"{ "initialDelayMs": 2500, "retryDelayMs": 400, "webviewLabel": "catalog" }"#,
        )
        .unwrap();
        assert_eq!(config.initial_delay(), Duration::from_millis(2500));
        assert_eq!(config.retry_delay(), Duration::from_millis(400));
        assert_eq!(config.webview_label, "catalog");
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{ "delivery": "sometimes" }"#).is_err());
    }
}
