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

//! LianLian Pay SDK - Client library for the LianLian Pay gateway
//!
//! This crate builds, signs and sends gateway requests and verifies the
//! signature of asynchronous notifications.
//!
//! - [`Credentials`] holds the partner id and key material, shared read-only
//! - [`RequestBuilder`] merges caller fields with partner metadata in order
//! - [`signer`] produces RSA signatures over the canonical string
//! - [`Transport`] posts signed requests and maps failures to [`ClientError`]
//! - [`NotificationVerifier`] checks inbound notifications
//!
//! The SDK starts no background threads. [`SyncClient`] owns a private
//! runtime for callers without one.

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod notify;
pub mod order_id;
pub mod response;
pub mod signer;
pub mod transport;

pub use api::{AccountApi, CommonApi, FlagCard, PaymentApi, PaymentOrder};
pub use client::{Client, SyncClient};
pub use config::ClientConfig;
pub use credentials::{Credentials, CredentialsBuilder, EndpointTable, Environment, ServiceArea};
pub use endpoint::{BodyEncoding, Endpoint, SignaturePlacement};
pub use envelope::{ParamValue, Params, RequestBuilder, RequestEnvelope};
pub use error::{ClientError, NetworkError};
pub use notify::NotificationVerifier;
pub use order_id::new_order_id;
pub use response::GatewayResponse;
pub use signer::{HashAlgorithm, SignAlgorithm, SignatureScheme, SignedRequest, SigningError};
pub use transport::Transport;

pub use tokio_util::sync::CancellationToken;
