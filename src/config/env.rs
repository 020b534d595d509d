//! Environment variable configuration
//!
//! Overrides for the client settings, read from `GREEN_CHECK_*`.

use std::env;

use super::ClientConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "GREEN_CHECK";

/// Settings found in the environment
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// GREEN_CHECK_CLIENT_ID
    pub client_id: Option<String>,
    /// GREEN_CHECK_API_PASSWORD
    pub api_password: Option<String>,
    /// GREEN_CHECK_LIVE
    pub live: Option<bool>,
    /// GREEN_CHECK_CONNECT_TIMEOUT, in seconds
    pub connect_timeout: Option<u64>,
    /// GREEN_CHECK_CONFIG
    pub config_file: Option<String>,
    /// GREEN_CHECK_BASE_URL
    pub base_url: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            client_id: get_env("CLIENT_ID"),
            api_password: get_env("API_PASSWORD"),
            live: get_env_bool("LIVE"),
            connect_timeout: get_env_parse("CONNECT_TIMEOUT"),
            config_file: get_env("CONFIG"),
            base_url: get_env("BASE_URL"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.client_id.is_some()
            || self.api_password.is_some()
            || self.live.is_some()
            || self.connect_timeout.is_some()
            || self.config_file.is_some()
            || self.base_url.is_some()
    }

    /// Overwrite the settings this environment defines
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(client_id) = &self.client_id {
            config.client_id = client_id.clone();
        }
        if let Some(api_password) = &self.api_password {
            config.api_password = api_password.clone();
        }
        if let Some(live) = self.live {
            config.live = live;
        }
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout_secs = timeout;
        }
        if let Some(url) = &self.base_url {
            config.base_url = Some(url.clone());
        }
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        let password = self.api_password.as_ref().map(|_| "********");
        println!("Environment Configuration:");
        if !self.has_any() {
            println!("  (no {ENV_PREFIX}_* variables set)");
            return;
        }
        println!("  {}_CLIENT_ID:       {:?}", ENV_PREFIX, self.client_id);
        println!("  {}_API_PASSWORD:    {:?}", ENV_PREFIX, password);
        println!("  {}_LIVE:            {:?}", ENV_PREFIX, self.live);
        println!("  {}_CONNECT_TIMEOUT: {:?}", ENV_PREFIX, self.connect_timeout);
        println!("  {}_CONFIG:          {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_BASE_URL:        {:?}", ENV_PREFIX, self.base_url);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables in tests
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_CLIENT_ID"), client_id.into()));
        self
    }

    pub fn api_password(mut self, api_password: impl Into<String>) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_API_PASSWORD"), api_password.into()));
        self
    }

    pub fn live(mut self, live: bool) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_LIVE"), live.to_string()));
        self
    }

    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_CONNECT_TIMEOUT"), secs.to_string()));
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_BASE_URL"), url.into()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all GREEN_CHECK environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_CLIENT_ID        Merchant client id");
    println!("  {ENV_PREFIX}_API_PASSWORD     API password");
    println!("  {ENV_PREFIX}_LIVE             Use the live system (true/false)");
    println!("  {ENV_PREFIX}_CONNECT_TIMEOUT  Connect timeout in seconds");
    println!("  {ENV_PREFIX}_CONFIG           Path to configuration file");
    println!("  {ENV_PREFIX}_BASE_URL         Endpoint override");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_CLIENT_ID=123456");
    println!("  export {ENV_PREFIX}_API_PASSWORD=secret");
    println!("  green-check status 12322");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.client_id.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _guard = EnvBuilder::new()
            .client_id("777")
            .api_password("env-pw")
            .live(true)
            .apply_scoped();

        let env = EnvConfig::load();
        assert_eq!(env.client_id.as_deref(), Some("777"));
        assert_eq!(env.api_password.as_deref(), Some("env-pw"));
        assert_eq!(env.live, Some(true));
        assert!(env.has_any());
    }

    #[test]
    fn test_env_parse_number() {
        let _guard = EnvBuilder::new().connect_timeout(9).apply_scoped();

        let env = EnvConfig::load();
        assert_eq!(env.connect_timeout, Some(9));
    }

    #[test]
    fn test_apply_to_overrides_only_set_values() {
        let mut config = ClientConfig {
            client_id: "file-id".to_string(),
            api_password: "file-pw".to_string(),
            ..ClientConfig::default()
        };
        let env = EnvConfig {
            api_password: Some("env-pw".to_string()),
            base_url: Some("http://localhost:9000".to_string()),
            ..Default::default()
        };

        env.apply_to(&mut config);
        assert_eq!(config.client_id, "file-id");
        assert_eq!(config.api_password, "env-pw");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000"));
        assert!(!config.live);
    }
}
