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

use thiserror::Error;

use crate::signer::SigningError;

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Configuration error: {0}")]
	Configuration(String),
	#[error("Signing error: {0}")]
	Signing(#[from] SigningError),
	#[error("Network error: {0}")]
	Network(#[from] NetworkError),
	#[error("HTTP {status}: {body}")]
	HttpTransport { status: u16, body: String },
	#[error("Invalid response: {0}")]
	ResponseParse(String),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Request cancelled")]
	Cancelled,
}

/// Connection-level failures (no HTTP status was received)
#[derive(Debug, Error)]
pub enum NetworkError {
	#[error("request timed out after {0} ms")]
	Timeout(u64),
	#[error("connection failed: {0}")]
	Connect(String),
	#[error("{0}")]
	Other(String),
}

impl ClientError {
	/// HTTP status code, when the gateway answered with a non-success status
	pub fn status(&self) -> Option<u16> {
		match self {
			ClientError::HttpTransport { status, .. } => Some(*status),
			_ => None,
		}
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, ClientError::Network(NetworkError::Timeout(_)))
	}
}
