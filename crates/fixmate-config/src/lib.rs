//! Configuration module for the FIX-MATE backend.
//!
//! This module provides structures and utilities for managing backend
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files for better organization:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files

mod loader;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the FIX-MATE backend.
///
/// Contains all sections required for the backend to operate: service
/// identity, HTTP API, storage, auth, notifications, and revenue rates.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this backend instance.
	pub service: ServiceConfig,
	/// Configuration for the HTTP API server.
	#[serde(default)]
	pub api: ApiConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for bearer-token authentication.
	pub auth: AuthConfig,
	/// Configuration for notification backends.
	#[serde(default)]
	pub notify: NotifyConfig,
	/// Revenue split rates.
	#[serde(default)]
	pub revenue: RevenueConfig,
}

/// Configuration specific to this backend instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this instance, used in logs.
	pub id: String,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
			timeout_seconds: default_api_timeout(),
			max_request_size: default_max_request_size(),
		}
	}
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
	/// Interval in seconds for cleaning up expired storage entries.
	#[serde(default = "default_cleanup_interval")]
	pub cleanup_interval_seconds: u64,
}

/// Configuration for bearer-token authentication.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of auth implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for notification backends.
///
/// Every configured implementation receives every lifecycle event; an empty
/// map disables notifications.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotifyConfig {
	/// Map of notifier implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Revenue split rates.
///
/// Defaults match the platform's standard terms: a 20% platform fee, a 10%
/// delivery pool, and an 80% driver share of that pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevenueConfig {
	/// Platform fee taken from every order's gross value.
	#[serde(default = "default_platform_fee_rate")]
	pub platform_fee_rate: Decimal,
	/// Share of a supply order's gross value set aside for delivery.
	#[serde(default = "default_delivery_pool_rate")]
	pub delivery_pool_rate: Decimal,
	/// The driver's share of the delivery pool.
	#[serde(default = "default_driver_share")]
	pub driver_share: Decimal,
}

impl Default for RevenueConfig {
	fn default() -> Self {
		Self {
			platform_fee_rate: default_platform_fee_rate(),
			delivery_pool_rate: default_delivery_pool_rate(),
			driver_share: default_driver_share(),
		}
	}
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_api_timeout() -> u64 {
	30
}

fn default_max_request_size() -> usize {
	1024 * 1024 // 1MB
}

fn default_cleanup_interval() -> u64 {
	3600
}

/// 20% platform fee.
fn default_platform_fee_rate() -> Decimal {
	Decimal::new(20, 2)
}

/// 10% delivery pool.
fn default_delivery_pool_rate() -> Decimal {
	Decimal::new(10, 2)
}

/// Drivers keep 80% of the delivery pool.
fn default_driver_share() -> Decimal {
	Decimal::new(80, 2)
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to keep the regex pass bounded.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				},
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file with environment variable resolution.
	///
	/// Supports modular configuration through `include = [...]` directives.
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}
		if self.storage.cleanup_interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"Storage cleanup_interval_seconds must be greater than 0".into(),
			));
		}
		if self.storage.cleanup_interval_seconds > 86400 {
			return Err(ConfigError::Validation(
				"Storage cleanup_interval_seconds cannot exceed 86400 (24 hours)".into(),
			));
		}

		// Validate auth config
		if self.auth.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one auth implementation must be configured".into(),
			));
		}
		if !self.auth.implementations.contains_key(&self.auth.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary auth '{}' not found in implementations",
				self.auth.primary
			)));
		}

		// Validate revenue rates
		let r = &self.revenue;
		let between_zero_and_one =
			|v: Decimal| v > Decimal::ZERO && v < Decimal::ONE;
		if !between_zero_and_one(r.platform_fee_rate) {
			return Err(ConfigError::Validation(
				"revenue.platform_fee_rate must be between 0 and 1 exclusive".into(),
			));
		}
		if !between_zero_and_one(r.delivery_pool_rate) {
			return Err(ConfigError::Validation(
				"revenue.delivery_pool_rate must be between 0 and 1 exclusive".into(),
			));
		}
		if r.driver_share <= Decimal::ZERO || r.driver_share > Decimal::ONE {
			return Err(ConfigError::Validation(
				"revenue.driver_share must be in (0, 1]".into(),
			));
		}
		if r.platform_fee_rate + r.delivery_pool_rate >= Decimal::ONE {
			return Err(ConfigError::Validation(
				"platform_fee_rate + delivery_pool_rate must stay below 1".into(),
			));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is automatically
/// validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[service]
id = "fixmate-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[auth]
primary = "static"
[auth.implementations.static]
[[auth.implementations.static.tokens]]
token = "t-admin"
user_id = "u-admin"
name = "Root"
role = "admin"
"#;

	#[test]
	fn minimal_config_parses_with_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.service.id, "fixmate-test");
		assert_eq!(config.api.port, 3000);
		assert_eq!(config.storage.cleanup_interval_seconds, 3600);
		assert_eq!(config.revenue.platform_fee_rate, Decimal::new(20, 2));
		assert_eq!(config.revenue.delivery_pool_rate, Decimal::new(10, 2));
		assert_eq!(config.revenue.driver_share, Decimal::new(80, 2));
	}

	#[test]
	fn env_var_resolution() {
		std::env::set_var("FIXMATE_TEST_HOST", "localhost");
		std::env::set_var("FIXMATE_TEST_PORT", "5432");

		let input = "host = \"${FIXMATE_TEST_HOST}:${FIXMATE_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("FIXMATE_TEST_HOST");
		std::env::remove_var("FIXMATE_TEST_PORT");
	}

	#[test]
	fn env_var_with_default() {
		let input = "value = \"${FIXMATE_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn missing_env_var_is_an_error() {
		let input = "value = \"${FIXMATE_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("FIXMATE_MISSING_VAR"));
	}

	#[test]
	fn unknown_primary_storage_is_rejected() {
		let bad = MINIMAL.replace("primary = \"memory\"", "primary = \"redis\"");
		let result: Result<Config, _> = bad.parse();
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary storage 'redis' not found"));
	}

	#[test]
	fn out_of_range_rates_are_rejected() {
		let bad = format!("{}\n[revenue]\nplatform_fee_rate = 1.5\n", MINIMAL);
		let result: Result<Config, _> = bad.parse();
		assert!(result.is_err());
	}

	#[test]
	fn fee_plus_pool_must_stay_below_one() {
		let bad = format!(
			"{}\n[revenue]\nplatform_fee_rate = 0.6\ndelivery_pool_rate = 0.5\n",
			MINIMAL
		);
		let result: Result<Config, _> = bad.parse();
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("must stay below 1"));
	}
}
