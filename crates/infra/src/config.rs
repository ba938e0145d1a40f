use chrono_tz::{Tz, UTC};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Timezone given to `User`s that are created without one
    pub default_timezone: Tz,
    /// Upper bound in millis for a single notification dispatch. A hung
    /// gateway must not keep a firing job from being rescheduled.
    pub notification_timeout_millis: u64,
    /// Endpoint of the SMS gateway. When missing notifications are only logged.
    pub sms_webhook_url: Option<String>,
    /// Endpoint of the email gateway. When missing notifications are only logged.
    pub email_webhook_url: Option<String>,
    /// Sent along with every gateway request so that the gateway can verify
    /// the sender
    pub webhook_key: String,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                5000
            }
        };

        let default_timezone = match std::env::var("DEFAULT_TIMEZONE") {
            Ok(tz) => match tz.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given DEFAULT_TIMEZONE: {} is not a valid timezone, falling back to UTC.",
                        tz
                    );
                    UTC
                }
            },
            Err(_) => UTC,
        };

        let default_timeout = 10_000;
        let notification_timeout_millis = match std::env::var("NOTIFICATION_TIMEOUT_MS") {
            Ok(timeout) => timeout.parse::<u64>().unwrap_or_else(|_| {
                warn!(
                    "The given NOTIFICATION_TIMEOUT_MS: {} is not valid, falling back to: {}.",
                    timeout, default_timeout
                );
                default_timeout
            }),
            Err(_) => default_timeout,
        };

        let sms_webhook_url = std::env::var("SMS_WEBHOOK_URL").ok();
        let email_webhook_url = std::env::var("EMAIL_WEBHOOK_URL").ok();
        if sms_webhook_url.is_none() || email_webhook_url.is_none() {
            info!("SMS_WEBHOOK_URL or EMAIL_WEBHOOK_URL is not set, the missing channels will only log notifications.");
        }
        let webhook_key = std::env::var("NOTIFICATION_WEBHOOK_KEY").unwrap_or_default();

        Self {
            port,
            default_timezone,
            notification_timeout_millis,
            sms_webhook_url,
            email_webhook_url,
            webhook_key,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "PORT",
            "DEFAULT_TIMEZONE",
            "NOTIFICATION_TIMEOUT_MS",
            "SMS_WEBHOOK_URL",
            "EMAIL_WEBHOOK_URL",
            "NOTIFICATION_WEBHOOK_KEY",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn uses_defaults_without_env() {
        clear_env();
        let config = Config::new();
        assert_eq!(config.port, 5000);
        assert_eq!(config.default_timezone, UTC);
        assert_eq!(config.notification_timeout_millis, 10_000);
        assert!(config.sms_webhook_url.is_none());
        assert!(config.email_webhook_url.is_none());
    }

    #[test]
    #[serial]
    fn reads_env_and_falls_back_on_invalid_values() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("DEFAULT_TIMEZONE", "Europe/Oslo");
        std::env::set_var("NOTIFICATION_TIMEOUT_MS", "2500");
        std::env::set_var("SMS_WEBHOOK_URL", "http://localhost:9000/sms");
        let config = Config::new();
        assert_eq!(config.port, 5000);
        assert_eq!(config.default_timezone, chrono_tz::Europe::Oslo);
        assert_eq!(config.notification_timeout_millis, 2500);
        assert_eq!(
            config.sms_webhook_url.as_deref(),
            Some("http://localhost:9000/sms")
        );

        std::env::set_var("DEFAULT_TIMEZONE", "Nowhere/Special");
        assert_eq!(Config::new().default_timezone, UTC);
        clear_env();
    }
}
