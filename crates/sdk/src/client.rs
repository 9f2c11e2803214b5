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

use std::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::{AccountApi, CommonApi, PaymentApi};
use crate::config::DEFAULT_TIMEOUT_MS;
use crate::credentials::Credentials;
use crate::endpoint::Endpoint;
use crate::envelope::{Params, RequestBuilder};
use crate::error::ClientError;
use crate::notify::NotificationVerifier;
use crate::response::GatewayResponse;
use crate::signer::{SignedRequest, attach};
use crate::transport::Transport;

/// Client for the gateway API
///
/// Composes the request builder, signer and transport over one set of
/// credentials. Cloning is cheap; clones share credentials and the
/// connection pool.
#[derive(Debug, Clone)]
pub struct Client {
	credentials: Credentials,
	transport: Transport,
}

impl Client {
	/// Create a new client with the default timeout
	pub fn new(credentials: Credentials) -> Result<Self, ClientError> {
		Self::with_timeout(credentials, Duration::from_millis(DEFAULT_TIMEOUT_MS))
	}

	/// Create a new client with a custom request timeout
	pub fn with_timeout(credentials: Credentials, timeout: Duration) -> Result<Self, ClientError> {
		Ok(Self {
			credentials,
			transport: Transport::new(timeout)?,
		})
	}

	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Absolute URL of `endpoint` in the configured environment
	pub fn url(&self, endpoint: &Endpoint<'_>) -> String {
		self.credentials.endpoints().resolve(
			endpoint.area,
			self.credentials.environment(),
			endpoint.path,
		)
	}

	/// Build and sign a request without sending it
	pub fn prepare(
		&self,
		endpoint: &Endpoint<'_>,
		params: Params,
	) -> Result<SignedRequest, ClientError> {
		let envelope = RequestBuilder::new(&self.credentials).build(endpoint, params)?;
		let signed = attach(
			envelope,
			endpoint,
			self.credentials.private_key(),
			self.credentials.signature_scheme(),
		)?;
		Ok(signed)
	}

	/// Build, sign and send a request, then parse the response
	pub async fn sign_and_send(
		&self,
		endpoint: &Endpoint<'_>,
		params: Params,
	) -> Result<GatewayResponse, ClientError> {
		let signed = self.prepare(endpoint, params)?;
		let url = self.url(endpoint);
		debug!(target: "client", path = endpoint.path, "Sending signed request");

		let body = self.transport.send(&url, &signed).await?;
		GatewayResponse::parse(&body)
	}

	/// [`sign_and_send`](Self::sign_and_send) that yields `Cancelled` when
	/// `token` fires before the response arrives
	pub async fn sign_and_send_cancellable(
		&self,
		endpoint: &Endpoint<'_>,
		params: Params,
		token: &CancellationToken,
	) -> Result<GatewayResponse, ClientError> {
		let signed = self.prepare(endpoint, params)?;
		let url = self.url(endpoint);

		let body = self.transport.send_cancellable(&url, &signed, token).await?;
		GatewayResponse::parse(&body)
	}

	/// Account management endpoints
	pub fn account(&self) -> AccountApi<'_> {
		AccountApi::new(self)
	}

	/// Random-factor and other shared endpoints
	pub fn common(&self) -> CommonApi<'_> {
		CommonApi::new(self)
	}

	/// Instant-pay endpoints
	pub fn payment(&self) -> PaymentApi<'_> {
		PaymentApi::new(self)
	}

	/// Verifier for inbound notifications
	pub fn notifications(&self) -> NotificationVerifier {
		NotificationVerifier::new(self.credentials.clone())
	}
}

/// Synchronous client wrapper
///
/// Runs the async client on a private current-thread runtime. Must not be
/// used from inside another tokio runtime.
pub struct SyncClient {
	client: Client,
	runtime: tokio::runtime::Runtime,
}

impl SyncClient {
	/// Create a new synchronous client
	pub fn new(client: Client) -> Result<Self, ClientError> {
		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|e| ClientError::Configuration(format!("Failed to create tokio runtime: {}", e)))?;
		Ok(Self { client, runtime })
	}

	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Build, sign and send a request (synchronous)
	pub fn sign_and_send(
		&self,
		endpoint: &Endpoint<'_>,
		params: Params,
	) -> Result<GatewayResponse, ClientError> {
		self.runtime
			.block_on(self.client.sign_and_send(endpoint, params))
	}

	/// Drive any client future to completion, e.g.
	/// `sync.block_on(sync.client().payment().query_payment(Some(id), None))`
	pub fn block_on<F: Future>(&self, future: F) -> F::Output {
		self.runtime.block_on(future)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::credentials::{EndpointTable, Environment, ServiceArea};
	use crate::endpoint::SignaturePlacement;
	use crate::signer::canonical_string;

	const MERCHANT_KEY: &str = include_str!("../tests/fixtures/merchant_private.pem");
	const GATEWAY_PUB: &str = include_str!("../tests/fixtures/gateway_public.pem");

	fn test_client(environment: Environment) -> Client {
		let credentials = Credentials::builder("P1")
			.private_key_pem(MERCHANT_KEY)
			.gateway_public_key_pem(GATEWAY_PUB)
			.environment(environment)
			.build()
			.unwrap();
		Client::new(credentials).unwrap()
	}

	#[test]
	fn test_client_creation() {
		let client = test_client(Environment::Sandbox);
		assert_eq!(client.credentials().partner_id(), "P1");
	}

	#[test]
	fn test_sync_client_creation() {
		let client = SyncClient::new(test_client(Environment::Sandbox));
		assert!(client.is_ok());
	}

	#[test]
	fn test_url_follows_environment() {
		let endpoint = Endpoint::new(ServiceArea::AccountManagement, "acctmgr/get-random");
		assert_eq!(
			test_client(Environment::Sandbox).url(&endpoint),
			"https://accptest.lianlianpay-inc.com/v1/acctmgr/get-random"
		);
		assert_eq!(
			test_client(Environment::Production).url(&endpoint),
			"https://accpapi.lianlianpay.com/v1/acctmgr/get-random"
		);
	}

	#[test]
	fn test_url_uses_overridden_table() {
		let credentials = Credentials::builder("P1")
			.private_key_pem(MERCHANT_KEY)
			.gateway_public_key_pem(GATEWAY_PUB)
			.endpoints(EndpointTable::uniform("http://127.0.0.1:9000"))
			.build()
			.unwrap();
		let client = Client::new(credentials).unwrap();
		let endpoint = Endpoint::new(ServiceArea::InstantPay, "paymentapi/payment.htm");
		assert_eq!(client.url(&endpoint), "http://127.0.0.1:9000/paymentapi/payment.htm");
	}

	#[test]
	fn test_prepare_signs_header_endpoint() {
		let client = test_client(Environment::Sandbox);
		let endpoint = Endpoint::new(ServiceArea::AccountManagement, "acctmgr/get-random");
		let signed = client
			.prepare(&endpoint, Params::new().set("user_id", "U1"))
			.unwrap();

		assert_eq!(signed.placement, SignaturePlacement::Header);
		assert!(signed.envelope.contains_key("timestamp"));
		assert_eq!(signed.envelope.get("oid_partner").unwrap().to_string(), "P1");
		assert!(!signed.envelope.contains_key("sign"));
		assert!(!signed.signature.is_empty());
	}

	#[test]
	fn test_prepare_is_deterministic_for_fixed_fields() {
		let client = test_client(Environment::Sandbox);
		let endpoint = Endpoint::new(ServiceArea::AccountManagement, "acctmgr/get-random");
		let params = Params::new()
			.set("timestamp", "20240101120000")
			.set("user_id", "U1");

		let a = client.prepare(&endpoint, params.clone()).unwrap();
		let b = client.prepare(&endpoint, params).unwrap();
		assert_eq!(canonical_string(&a.envelope), canonical_string(&b.envelope));
		assert_eq!(a.signature, b.signature);
	}
}
