use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://app.caaficare.so";
pub const DEFAULT_HORIZON_DAYS: u32 = 14;
pub const DEFAULT_SLOT_STEP_MINUTES: u32 = 15;
pub const DEFAULT_SUCCESS_REDIRECT_MS: u64 = 2500;
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub caaficare_api_url: String,
    pub booking_horizon_days: u32,
    pub slot_step_minutes: u32,
    pub success_redirect_ms: u64,
    pub remote_timeout_secs: u64,
    /// Idle time after which a booking session is dropped.
    pub session_ttl_secs: u64,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            caaficare_api_url: DEFAULT_API_URL.to_string(),
            booking_horizon_days: DEFAULT_HORIZON_DAYS,
            slot_step_minutes: DEFAULT_SLOT_STEP_MINUTES,
            success_redirect_ms: DEFAULT_SUCCESS_REDIRECT_MS,
            remote_timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            caaficare_api_url: env::var("CAAFICARE_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| {
                    warn!("CAAFICARE_API_URL not set, using default");
                    DEFAULT_API_URL.to_string()
                }),
            booking_horizon_days: parse_or("BOOKING_HORIZON_DAYS", DEFAULT_HORIZON_DAYS),
            slot_step_minutes: parse_or("SLOT_STEP_MINUTES", DEFAULT_SLOT_STEP_MINUTES),
            success_redirect_ms: parse_or("SUCCESS_REDIRECT_MS", DEFAULT_SUCCESS_REDIRECT_MS),
            remote_timeout_secs: parse_or("REMOTE_TIMEOUT_SECS", DEFAULT_REMOTE_TIMEOUT_SECS),
            session_ttl_secs: parse_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
            port: parse_or("PORT", DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - slot step and horizon must be positive");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.caaficare_api_url.is_empty()
            && self.booking_horizon_days > 0
            && self.slot_step_minutes > 0
    }

    pub fn success_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.success_redirect_ms)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_booking_constants() {
        let config = AppConfig::default();

        assert_eq!(config.caaficare_api_url, "https://app.caaficare.so");
        assert_eq!(config.booking_horizon_days, 14);
        assert_eq!(config.slot_step_minutes, 15);
        assert_eq!(config.success_redirect_delay(), Duration::from_millis(2500));
        assert_eq!(config.session_ttl(), Duration::from_secs(1800));
        assert!(config.is_configured());
    }

    #[test]
    fn test_zero_step_is_not_configured() {
        let config = AppConfig {
            slot_step_minutes: 0,
            ..AppConfig::default()
        };

        assert!(!config.is_configured());
    }
}
