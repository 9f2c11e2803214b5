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

//! Command implementations

use std::path::Path;

use anyhow::{Context, Result, bail};
use llpay_sdk::{Client, ClientConfig, Endpoint, Params, SignedRequest, new_order_id};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::cli::Family;

/// Load the client from `--config`, or from `LLPAY_*` variables alone
pub fn load_client(config: Option<&Path>) -> Result<Client> {
	let config = match config {
		Some(path) => {
			let path = path
				.to_str()
				.with_context(|| format!("Config path is not UTF-8: {}", path.display()))?;
			ClientConfig::from_file(path)
				.with_context(|| format!("Failed to load configuration from {}", path))?
		}
		None => ClientConfig::from_env().context("Failed to load configuration from environment")?,
	};

	config.into_client().context("Failed to create client")
}

pub fn order_ids(count: usize) -> Vec<String> {
	(0..count).map(|_| new_order_id()).collect()
}

/// JSON view of a signed request as it would go on the wire
pub fn describe(url: &str, signed: &SignedRequest) -> Value {
	let headers: Map<String, Value> = signed
		.signature_headers()
		.into_iter()
		.map(|(name, value)| (name.to_string(), Value::String(value)))
		.collect();

	json!({
		"url": url,
		"content_type": signed.encoding.content_type(),
		"headers": headers,
		"body": signed.envelope,
	})
}

pub fn sign(
	client: &Client,
	path: &str,
	family: Family,
	params: &str,
	versioned: bool,
	form: bool,
) -> Result<Value> {
	let object: Map<String, Value> =
		serde_json::from_str(params).context("--params must be a JSON object")?;
	let params = Params::from_json(&object).context("Unsupported parameter value")?;

	let mut endpoint = Endpoint::new(family.into(), path);
	if versioned {
		endpoint = endpoint.versioned();
	}
	if form {
		endpoint = endpoint.form_encoded();
	}

	let signed = client
		.prepare(&endpoint, params)
		.context("Failed to sign request")?;
	info!(target: "llpay", path, fields = signed.envelope.len(), "Signed request");

	Ok(describe(&client.url(&endpoint), &signed))
}

/// True when the notification in `payload` is trusted
pub fn verify(client: &Client, payload: &Path, signature: &str) -> Result<bool> {
	let body = std::fs::read(payload)
		.with_context(|| format!("Failed to read payload {}", payload.display()))?;

	let trusted = client.notifications().verify(&body, signature.trim());
	if !trusted {
		warn!(target: "llpay", payload = %payload.display(), "Untrusted notification");
	}
	Ok(trusted)
}

pub async fn query_payment(
	client: &Client,
	no_order: Option<&str>,
	oid_paybill: Option<&str>,
) -> Result<Value> {
	if no_order.is_none() && oid_paybill.is_none() {
		bail!("either --no-order or --oid-paybill is required");
	}

	let response = client
		.payment()
		.query_payment(no_order, oid_paybill)
		.await
		.context("Payment query failed")?;

	if !response.is_success() {
		warn!(
			target: "llpay",
			ret_code = response.ret_code().unwrap_or_default(),
			ret_msg = response.ret_msg().unwrap_or_default(),
			"Gateway rejected query"
		);
	}
	Ok(Value::Object(response.into_map()))
}
