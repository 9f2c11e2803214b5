// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Client configuration loading
//!
//! Resolves merchant settings from a config file and/or `LLPAY_*` environment
//! variables. The signing core never reads configuration itself; it only
//! receives the [`Credentials`] built here.
//!
//! Keys are flat (`oid_partner`, `private_key`, `ll_public_key`, ...). Nested
//! tables are only used for the optional `endpoints` base-URL overrides, which
//! map to `LLPAY_ENDPOINTS__ACCOUNT__SANDBOX` style variables.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::credentials::{Credentials, EndpointTable, Environment};
use crate::error::ClientError;
use crate::signer::{HashAlgorithm, SignatureScheme};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LLPAY";

/// Default request timeout in milliseconds (can be overridden by LLPAY_TIMEOUT_MS)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Separator for list values given through environment variables
pub const LIST_SEPARATOR: &str = ",";

fn default_timeout_ms() -> u64 {
	DEFAULT_TIMEOUT_MS
}

/// Merchant configuration as loaded from file or environment
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Partner id issued by the gateway
	pub oid_partner: String,
	/// Platform identifier sent with instant-pay requests
	#[serde(default)]
	pub platform: Option<String>,
	/// Merchant RSA private key (PEM or bare base64 body)
	pub private_key: String,
	/// Gateway RSA public key (PEM or bare base64 body)
	#[serde(default)]
	pub ll_public_key: Option<String>,
	/// Additional gateway public keys accepted during key rotation
	#[serde(default)]
	pub ll_public_keys: Vec<String>,
	#[serde(default)]
	pub environment: Environment,
	/// Default asynchronous notification URL
	#[serde(default)]
	pub notify_url: Option<String>,
	#[serde(default)]
	pub hash_algorithm: HashAlgorithm,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	/// Base-URL overrides; gateway defaults are used when absent
	#[serde(default)]
	pub endpoints: Option<EndpointTable>,
}

impl fmt::Debug for ClientConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientConfig")
			.field("oid_partner", &self.oid_partner)
			.field("platform", &self.platform)
			.field("environment", &self.environment)
			.field("notify_url", &self.notify_url)
			.field("hash_algorithm", &self.hash_algorithm)
			.field("timeout_ms", &self.timeout_ms)
			.field("endpoints", &self.endpoints)
			.finish_non_exhaustive()
	}
}

impl ClientConfig {
	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		Self::from_vars(None)
	}

	/// Load from an explicit variable map instead of the process environment
	fn from_vars(vars: Option<config::Map<String, String>>) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(env_source().source(vars))
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file, with environment variables on top
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(env_source())
			.build()?;

		cfg.try_deserialize()
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	/// Parse key material and resolve the credentials
	pub fn into_credentials(self) -> Result<Credentials, ClientError> {
		let mut builder = Credentials::builder(self.oid_partner)
			.private_key_pem(self.private_key)
			.environment(self.environment)
			.signature_scheme(SignatureScheme::new(self.hash_algorithm))
			.endpoints(self.endpoints.unwrap_or_default());

		if let Some(platform) = self.platform {
			builder = builder.platform(platform);
		}
		if let Some(notify_url) = self.notify_url {
			builder = builder.notify_url(notify_url);
		}
		for key in self.ll_public_key.into_iter().chain(self.ll_public_keys) {
			builder = builder.gateway_public_key_pem(key);
		}

		builder.build()
	}

	/// Build a ready-to-use client
	pub fn into_client(self) -> Result<Client, ClientError> {
		let timeout = self.timeout();
		Client::with_timeout(self.into_credentials()?, timeout)
	}
}

/// `LLPAY_LL_PUBLIC_KEYS` holds comma-separated keys; PEM bodies never contain commas
fn env_source() -> config::Environment {
	config::Environment::with_prefix(ENV_PREFIX)
		.prefix_separator("_")
		.separator("__")
		.try_parsing(true)
		.list_separator(LIST_SEPARATOR)
		.with_list_parse_key("ll_public_keys")
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	const MERCHANT_KEY: &str = include_str!("../tests/fixtures/merchant_private.pem");
	const GATEWAY_PUB: &str = include_str!("../tests/fixtures/gateway_public.pem");
	const MERCHANT_PUB: &str = include_str!("../tests/fixtures/merchant_public.pem");

	fn write_config(contents: &str) -> tempfile::NamedTempFile {
		let mut file = tempfile::Builder::new()
			.suffix(".toml")
			.tempfile()
			.unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		file
	}

	#[test]
	fn test_from_file_with_defaults() {
		let file = write_config(&format!(
			"oid_partner = \"201903250002\"\nprivate_key = \"\"\"\n{}\"\"\"\nll_public_key = \"\"\"\n{}\"\"\"\n",
			MERCHANT_KEY, GATEWAY_PUB
		));

		let config = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();
		assert_eq!(config.oid_partner, "201903250002");
		assert_eq!(config.environment, Environment::Sandbox);
		assert_eq!(config.hash_algorithm, HashAlgorithm::Md5);
		assert_eq!(config.timeout(), Duration::from_millis(DEFAULT_TIMEOUT_MS));
		assert!(config.endpoints.is_none());

		let credentials = config.into_credentials().unwrap();
		assert_eq!(credentials.partner_id(), "201903250002");
		assert_eq!(credentials.gateway_public_keys().len(), 1);
		assert_eq!(credentials.endpoints(), &EndpointTable::default());
	}

	#[test]
	fn test_from_file_with_overrides() {
		let file = write_config(&format!(
			r#"oid_partner = "P1"
platform = "yoka.com"
environment = "production"
notify_url = "https://merchant.example/notify"
hash_algorithm = "sha256"
timeout_ms = 2500
private_key = """
{}"""
ll_public_keys = ["""
{}"""]

[endpoints.account]
sandbox = "http://127.0.0.1:1/"
production = "http://127.0.0.1:2/"

[endpoints.instant_pay]
sandbox = "http://127.0.0.1:3/"
production = "http://127.0.0.1:4/"

[endpoints.upload]
sandbox = "http://127.0.0.1:5/"
production = "http://127.0.0.1:6/"
"#,
			MERCHANT_KEY, GATEWAY_PUB
		));

		let config = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();
		assert_eq!(config.timeout(), Duration::from_millis(2500));

		let credentials = config.into_credentials().unwrap();
		assert_eq!(credentials.environment(), Environment::Production);
		assert_eq!(credentials.platform(), Some("yoka.com"));
		assert_eq!(credentials.notify_url(), Some("https://merchant.example/notify"));
		assert_eq!(credentials.signature_scheme().hash, HashAlgorithm::Sha256);
		assert_eq!(credentials.endpoints().instant_pay.production, "http://127.0.0.1:4/");
	}

	fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn test_from_env_flat_keys() {
		let config = ClientConfig::from_vars(Some(vars(&[
			("LLPAY_OID_PARTNER", "201903250002"),
			("LLPAY_PRIVATE_KEY", MERCHANT_KEY),
			("LLPAY_LL_PUBLIC_KEY", GATEWAY_PUB),
			("LLPAY_ENVIRONMENT", "production"),
			("LLPAY_TIMEOUT_MS", "2500"),
			("LLPAY_ENDPOINTS__ACCOUNT__SANDBOX", "http://127.0.0.1:1/"),
			("LLPAY_ENDPOINTS__ACCOUNT__PRODUCTION", "http://127.0.0.1:2/"),
			("LLPAY_ENDPOINTS__INSTANT_PAY__SANDBOX", "http://127.0.0.1:3/"),
			("LLPAY_ENDPOINTS__INSTANT_PAY__PRODUCTION", "http://127.0.0.1:4/"),
			("LLPAY_ENDPOINTS__UPLOAD__SANDBOX", "http://127.0.0.1:5/"),
			("LLPAY_ENDPOINTS__UPLOAD__PRODUCTION", "http://127.0.0.1:6/"),
		])))
		.unwrap();

		assert_eq!(config.oid_partner, "201903250002");
		assert_eq!(config.timeout(), Duration::from_millis(2500));
		assert_eq!(config.environment, Environment::Production);
		assert!(config.ll_public_keys.is_empty());

		let credentials = config.into_credentials().unwrap();
		assert_eq!(credentials.gateway_public_keys().len(), 1);
		assert_eq!(credentials.endpoints().instant_pay.production, "http://127.0.0.1:4/");
	}

	#[test]
	fn test_from_env_gateway_key_list() {
		let two_keys = format!("{},{}", GATEWAY_PUB, MERCHANT_PUB);
		let config = ClientConfig::from_vars(Some(vars(&[
			("LLPAY_OID_PARTNER", "P1"),
			("LLPAY_PRIVATE_KEY", MERCHANT_KEY),
			("LLPAY_LL_PUBLIC_KEYS", &two_keys),
		])))
		.unwrap();
		assert_eq!(config.ll_public_keys.len(), 2);
		assert_eq!(config.into_credentials().unwrap().gateway_public_keys().len(), 2);

		let config = ClientConfig::from_vars(Some(vars(&[
			("LLPAY_OID_PARTNER", "P1"),
			("LLPAY_PRIVATE_KEY", MERCHANT_KEY),
			("LLPAY_LL_PUBLIC_KEYS", GATEWAY_PUB),
		])))
		.unwrap();
		assert_eq!(config.ll_public_keys.len(), 1);
		assert!(config.into_credentials().is_ok());
	}

	#[test]
	fn test_missing_gateway_key_is_configuration_error() {
		let file = write_config(&format!(
			"oid_partner = \"P1\"\nprivate_key = \"\"\"\n{}\"\"\"\n",
			MERCHANT_KEY
		));
		let config = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();
		assert!(matches!(
			config.into_credentials(),
			Err(ClientError::Configuration(_))
		));
	}

	#[test]
	fn test_debug_omits_private_key() {
		let file = write_config(&format!(
			"oid_partner = \"P1\"\nprivate_key = \"\"\"\n{}\"\"\"\n",
			MERCHANT_KEY
		));
		let config = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();
		assert!(!format!("{:?}", config).contains("PRIVATE KEY"));
	}
}
