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

//! HTTP transport
//!
//! One POST per call, no retries.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::endpoint::BodyEncoding;
use crate::error::{ClientError, NetworkError};
use crate::signer::SignedRequest;

/// Sends signed requests and returns raw response bodies
#[derive(Debug, Clone)]
pub struct Transport {
	http: reqwest::Client,
	timeout: Duration,
}

impl Transport {
	/// Create a transport whose every request is bounded by `timeout`
	pub fn new(timeout: Duration) -> Result<Self, ClientError> {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self { http, timeout })
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// POST a signed request to `url`
	///
	/// Non-2xx statuses fail with `HttpTransport` carrying the status and body.
	pub async fn send(&self, url: &str, request: &SignedRequest) -> Result<Vec<u8>, ClientError> {
		let mut builder = self.http.post(url);
		for (name, value) in request.signature_headers() {
			builder = builder.header(name, value);
		}

		builder = match request.encoding {
			BodyEncoding::Json => {
				let body = serde_json::to_vec(&request.envelope).map_err(|e| {
					ClientError::InvalidArgument(format!("Failed to encode request: {}", e))
				})?;
				builder
					.header(CONTENT_TYPE, BodyEncoding::Json.content_type())
					.body(body)
			}
			BodyEncoding::Form => builder.form(&request.envelope.to_form_pairs()),
		};

		debug!(target: "transport", url, fields = request.envelope.len(), "POST");

		let response = builder.send().await.map_err(|e| self.network_error(e))?;
		let status = response.status();

		if !status.is_success() {
			let body = response
				.text()
				.await
				.unwrap_or_else(|_| format!("HTTP {}", status));
			warn!(target: "transport", url, status = status.as_u16(), "Gateway returned non-success status");
			return Err(ClientError::HttpTransport {
				status: status.as_u16(),
				body,
			});
		}

		let body = response.bytes().await.map_err(|e| self.network_error(e))?;
		debug!(target: "transport", url, status = status.as_u16(), bytes = body.len(), "Response received");
		Ok(body.to_vec())
	}

	/// Like [`send`](Self::send), but aborts the in-flight request when
	/// `token` is cancelled
	pub async fn send_cancellable(
		&self,
		url: &str,
		request: &SignedRequest,
		token: &CancellationToken,
	) -> Result<Vec<u8>, ClientError> {
		tokio::select! {
			biased;
			_ = token.cancelled() => {
				debug!(target: "transport", url, "Request cancelled");
				Err(ClientError::Cancelled)
			}
			result = self.send(url, request) => result,
		}
	}

	fn network_error(&self, err: reqwest::Error) -> ClientError {
		let err = if err.is_timeout() {
			NetworkError::Timeout(self.timeout.as_millis() as u64)
		} else if err.is_connect() {
			NetworkError::Connect(err.to_string())
		} else {
			NetworkError::Other(err.to_string())
		};
		ClientError::Network(err)
	}
}
