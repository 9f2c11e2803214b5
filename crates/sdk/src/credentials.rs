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

//! Credential store
//!
//! Holds everything the client needs to talk to the gateway on behalf of one
//! merchant: the partner id, the merchant RSA private key, the gateway public
//! key(s) used for notification verification, and the target environment.
//!
//! Credentials are immutable once built and are shared read-only between
//! clones of the client.

use std::{fmt, str::FromStr, sync::Arc};

use rsa::{
	RsaPrivateKey, RsaPublicKey,
	pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
	pkcs8::{DecodePrivateKey, DecodePublicKey},
};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::signer::SignatureScheme;

const PEM_LINE_WIDTH: usize = 64;

/// Gateway deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	#[default]
	Sandbox,
	Production,
}

impl Environment {
	pub fn is_production(self) -> bool {
		self == Environment::Production
	}
}

impl FromStr for Environment {
	type Err = ClientError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"sandbox" | "test" => Ok(Environment::Sandbox),
			"production" | "prod" => Ok(Environment::Production),
			other => Err(ClientError::Configuration(format!(
				"Unknown environment: {}",
				other
			))),
		}
	}
}

/// Logical service area; each area has its own host per environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceArea {
	/// Account management (`acctmgr/*`)
	AccountManagement,
	/// Instant pay (`paymentapi/*`)
	InstantPay,
	/// File service
	FileUpload,
}

/// Sandbox and production base URL of one service area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseUrls {
	pub sandbox: String,
	pub production: String,
}

impl BaseUrls {
	pub fn new(sandbox: impl Into<String>, production: impl Into<String>) -> Self {
		Self {
			sandbox: sandbox.into(),
			production: production.into(),
		}
	}

	pub fn for_env(&self, environment: Environment) -> &str {
		match environment {
			Environment::Sandbox => &self.sandbox,
			Environment::Production => &self.production,
		}
	}
}

/// Base URLs for every service area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTable {
	pub account: BaseUrls,
	pub instant_pay: BaseUrls,
	pub upload: BaseUrls,
}

impl Default for EndpointTable {
	fn default() -> Self {
		Self {
			account: BaseUrls::new(
				"https://accptest.lianlianpay-inc.com/v1/",
				"https://accpapi.lianlianpay.com/v1/",
			),
			instant_pay: BaseUrls::new(
				"https://test.lianlianpay-inc.com/",
				"https://instantpay.lianlianpay.com/",
			),
			upload: BaseUrls::new(
				"https://accpfiletest.lianlianpay-inc.com/v1/",
				"https://accpfile.lianlianpay.com/v1/",
			),
		}
	}
}

impl EndpointTable {
	/// Point every service area at the same host (mock servers, proxies)
	pub fn uniform(base_url: impl Into<String>) -> Self {
		let base_url = base_url.into();
		let urls = BaseUrls::new(base_url.clone(), base_url);
		Self {
			account: urls.clone(),
			instant_pay: urls.clone(),
			upload: urls,
		}
	}

	pub fn base_url(&self, area: ServiceArea, environment: Environment) -> &str {
		let urls = match area {
			ServiceArea::AccountManagement => &self.account,
			ServiceArea::InstantPay => &self.instant_pay,
			ServiceArea::FileUpload => &self.upload,
		};
		urls.for_env(environment)
	}

	/// Join a base URL and an endpoint path with exactly one `/`
	pub fn resolve(&self, area: ServiceArea, environment: Environment, path: &str) -> String {
		let base = self.base_url(area, environment).trim_end_matches('/');
		let path = path.trim_start_matches('/');
		format!("{}/{}", base, path)
	}
}

/// Merchant credentials and gateway settings
#[derive(Clone)]
pub struct Credentials {
	inner: Arc<CredentialsInner>,
}

struct CredentialsInner {
	partner_id: String,
	platform: Option<String>,
	private_key: RsaPrivateKey,
	gateway_public_keys: Vec<RsaPublicKey>,
	environment: Environment,
	notify_url: Option<String>,
	signature_scheme: SignatureScheme,
	endpoints: EndpointTable,
}

impl Credentials {
	/// Start building credentials for the given partner id (`oid_partner`)
	pub fn builder(partner_id: impl Into<String>) -> CredentialsBuilder {
		CredentialsBuilder {
			partner_id: partner_id.into(),
			..CredentialsBuilder::default()
		}
	}

	pub fn partner_id(&self) -> &str {
		&self.inner.partner_id
	}

	pub fn platform(&self) -> Option<&str> {
		self.inner.platform.as_deref()
	}

	pub fn private_key(&self) -> &RsaPrivateKey {
		&self.inner.private_key
	}

	pub fn gateway_public_keys(&self) -> &[RsaPublicKey] {
		&self.inner.gateway_public_keys
	}

	pub fn environment(&self) -> Environment {
		self.inner.environment
	}

	pub fn notify_url(&self) -> Option<&str> {
		self.inner.notify_url.as_deref()
	}

	pub fn signature_scheme(&self) -> SignatureScheme {
		self.inner.signature_scheme
	}

	pub fn endpoints(&self) -> &EndpointTable {
		&self.inner.endpoints
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("partner_id", &self.inner.partner_id)
			.field("platform", &self.inner.platform)
			.field("environment", &self.inner.environment)
			.field("gateway_public_keys", &self.inner.gateway_public_keys.len())
			.field("signature_scheme", &self.inner.signature_scheme)
			.finish_non_exhaustive()
	}
}

/// Builder for [`Credentials`]
#[derive(Default)]
pub struct CredentialsBuilder {
	partner_id: String,
	platform: Option<String>,
	private_key_pem: Option<String>,
	gateway_public_key_pems: Vec<String>,
	environment: Environment,
	notify_url: Option<String>,
	signature_scheme: SignatureScheme,
	endpoints: Option<EndpointTable>,
}

impl CredentialsBuilder {
	/// Merchant private key, PEM (PKCS#1 or PKCS#8) or bare base64 body
	pub fn private_key_pem(mut self, pem: impl Into<String>) -> Self {
		self.private_key_pem = Some(pem.into());
		self
	}

	/// Gateway public key, PEM or bare base64 body; may be called repeatedly
	pub fn gateway_public_key_pem(mut self, pem: impl Into<String>) -> Self {
		self.gateway_public_key_pems.push(pem.into());
		self
	}

	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = environment;
		self
	}

	pub fn platform(mut self, platform: impl Into<String>) -> Self {
		self.platform = Some(platform.into());
		self
	}

	pub fn notify_url(mut self, notify_url: impl Into<String>) -> Self {
		self.notify_url = Some(notify_url.into());
		self
	}

	pub fn signature_scheme(mut self, scheme: SignatureScheme) -> Self {
		self.signature_scheme = scheme;
		self
	}

	pub fn endpoints(mut self, endpoints: EndpointTable) -> Self {
		self.endpoints = Some(endpoints);
		self
	}

	/// Parse key material and freeze the credentials
	pub fn build(self) -> Result<Credentials, ClientError> {
		let partner_id = self.partner_id.trim().to_string();
		if partner_id.is_empty() {
			return Err(ClientError::Configuration(
				"oid_partner is required".to_string(),
			));
		}

		let private_key_pem = self.private_key_pem.ok_or_else(|| {
			ClientError::Configuration("Merchant private key is required".to_string())
		})?;
		let private_key = parse_private_key(&private_key_pem)?;

		if self.gateway_public_key_pems.is_empty() {
			return Err(ClientError::Configuration(
				"At least one gateway public key is required".to_string(),
			));
		}
		let gateway_public_keys = self
			.gateway_public_key_pems
			.iter()
			.map(|pem| parse_public_key(pem))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Credentials {
			inner: Arc::new(CredentialsInner {
				partner_id,
				platform: self.platform.filter(|p| !p.is_empty()),
				private_key,
				gateway_public_keys,
				environment: self.environment,
				notify_url: self.notify_url.filter(|u| !u.is_empty()),
				signature_scheme: self.signature_scheme,
				endpoints: self.endpoints.unwrap_or_default(),
			}),
		})
	}
}

/// Parse an RSA private key from PEM or a bare base64 body
pub fn parse_private_key(material: &str) -> Result<RsaPrivateKey, ClientError> {
	let material = material.trim();
	let parsed = if is_armored(material) {
		RsaPrivateKey::from_pkcs1_pem(material)
			.or_else(|_| RsaPrivateKey::from_pkcs8_pem(material))
			.map_err(|e| e.to_string())
	} else {
		RsaPrivateKey::from_pkcs1_pem(&armor(material, "RSA PRIVATE KEY"))
			.or_else(|_| RsaPrivateKey::from_pkcs8_pem(&armor(material, "PRIVATE KEY")))
			.map_err(|e| e.to_string())
	};

	parsed.map_err(|e| ClientError::Configuration(format!("Invalid private key: {}", e)))
}

/// Parse an RSA public key from PEM or a bare base64 body
pub fn parse_public_key(material: &str) -> Result<RsaPublicKey, ClientError> {
	let material = material.trim();
	let parsed = if is_armored(material) {
		RsaPublicKey::from_public_key_pem(material)
			.or_else(|_| RsaPublicKey::from_pkcs1_pem(material))
			.map_err(|e| e.to_string())
	} else {
		RsaPublicKey::from_public_key_pem(&armor(material, "PUBLIC KEY"))
			.or_else(|_| RsaPublicKey::from_pkcs1_pem(&armor(material, "RSA PUBLIC KEY")))
			.map_err(|e| e.to_string())
	};

	parsed.map_err(|e| ClientError::Configuration(format!("Invalid public key: {}", e)))
}

fn is_armored(material: &str) -> bool {
	material.starts_with("-----BEGIN ")
}

/// Wrap a bare base64 key body in PEM armour
fn armor(body: &str, label: &str) -> String {
	let body: String = body.chars().filter(|c| !c.is_whitespace()).collect();
	let mut pem = format!("-----BEGIN {}-----\n", label);
	for line in body.as_bytes().chunks(PEM_LINE_WIDTH) {
		// body is ASCII after filtering; non-ASCII input fails in the decoder
		pem.push_str(&String::from_utf8_lossy(line));
		pem.push('\n');
	}
	pem.push_str(&format!("-----END {}-----\n", label));
	pem
}
