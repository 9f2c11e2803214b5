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

//! Asynchronous notification verification
//!
//! The gateway posts notifications to the merchant's `notify_url` with the
//! signature detached in the `Signature-Data` header. The raw body bytes are
//! verified exactly as received; nothing in the body may be trusted before
//! [`NotificationVerifier::verify`] returns `true`.

use rsa::RsaPublicKey;
use tracing::{debug, warn};

use crate::credentials::Credentials;
use crate::error::ClientError;
use crate::response::GatewayResponse;
use crate::signer::{HashAlgorithm, SIGNATURE_DATA_HEADER, verify_message};

/// Header carrying the detached notification signature
pub const NOTIFY_SIGNATURE_HEADER: &str = SIGNATURE_DATA_HEADER;

/// Verify a detached signature over raw notification bytes
///
/// Returns `false` on any mismatch; this never fails with an error.
pub fn verify(
	payload: &[u8],
	signature: &str,
	gateway_public_key: &RsaPublicKey,
	hash: HashAlgorithm,
) -> bool {
	verify_message(payload, signature, gateway_public_key, hash)
}

/// Verifies notifications against the configured gateway key(s)
#[derive(Debug, Clone)]
pub struct NotificationVerifier {
	credentials: Credentials,
}

impl NotificationVerifier {
	pub fn new(credentials: Credentials) -> Self {
		Self { credentials }
	}

	/// True when any configured gateway key verifies the payload
	pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
		let hash = self.credentials.signature_scheme().hash;
		let trusted = self
			.credentials
			.gateway_public_keys()
			.iter()
			.any(|key| verify(payload, signature, key, hash));

		if trusted {
			debug!(target: "notify", bytes = payload.len(), "Notification signature verified");
		} else {
			warn!(target: "notify", bytes = payload.len(), "Notification signature rejected");
		}
		trusted
	}

	/// Verify, then parse the body
	///
	/// Returns `Ok(None)` for an unverified notification. Only a verified body
	/// is parsed; a verified but malformed body is a `ResponseParse` error.
	pub fn open(
		&self,
		payload: &[u8],
		signature: &str,
	) -> Result<Option<GatewayResponse>, ClientError> {
		if !self.verify(payload, signature) {
			return Ok(None);
		}
		GatewayResponse::parse_object(payload).map(Some)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::credentials::parse_private_key;
	use crate::signer::{SignatureScheme, sign_message};

	const MERCHANT_KEY: &str = include_str!("../tests/fixtures/merchant_private.pem");
	const MERCHANT_PUB: &str = include_str!("../tests/fixtures/merchant_public.pem");
	const GATEWAY_KEY: &str = include_str!("../tests/fixtures/gateway_private.pem");
	const GATEWAY_PUB: &str = include_str!("../tests/fixtures/gateway_public.pem");
	const NOTIFY_BODY: &[u8] = include_bytes!("../tests/fixtures/notify.json");
	const NOTIFY_SIGNATURE: &str = include_str!("../tests/fixtures/notify.sig");

	fn verifier_with(keys: &[&str]) -> NotificationVerifier {
		let mut builder = Credentials::builder("P1").private_key_pem(MERCHANT_KEY);
		for key in keys {
			builder = builder.gateway_public_key_pem(*key);
		}
		NotificationVerifier::new(builder.build().unwrap())
	}

	#[test]
	fn test_verifies_gateway_signed_fixture() {
		let verifier = verifier_with(&[GATEWAY_PUB]);
		assert!(verifier.verify(NOTIFY_BODY, NOTIFY_SIGNATURE));
	}

	#[test]
	fn test_tampered_payload_is_false() {
		let verifier = verifier_with(&[GATEWAY_PUB]);
		let mut tampered = NOTIFY_BODY.to_vec();
		tampered.push(b' ');
		assert!(!verifier.verify(&tampered, NOTIFY_SIGNATURE));
	}

	#[test]
	fn test_wrong_key_is_false() {
		let verifier = verifier_with(&[MERCHANT_PUB]);
		assert!(!verifier.verify(NOTIFY_BODY, NOTIFY_SIGNATURE));
	}

	#[test]
	fn test_garbage_signature_is_false() {
		let verifier = verifier_with(&[GATEWAY_PUB]);
		assert!(!verifier.verify(NOTIFY_BODY, ""));
		assert!(!verifier.verify(NOTIFY_BODY, "not base64 at all!"));
		assert!(!verifier.verify(NOTIFY_BODY, "AAAA"));
	}

	#[test]
	fn test_any_rotated_key_is_accepted() {
		let verifier = verifier_with(&[MERCHANT_PUB, GATEWAY_PUB]);
		assert!(verifier.verify(NOTIFY_BODY, NOTIFY_SIGNATURE));
	}

	#[test]
	fn test_round_trip_with_generated_signature() {
		let gateway_key = parse_private_key(GATEWAY_KEY).unwrap();
		let payload = br#"{"oid_partner":"P1","result_pay":"SUCCESS"}"#;
		let signature = sign_message(payload, &gateway_key, SignatureScheme::default()).unwrap();

		let verifier = verifier_with(&[GATEWAY_PUB]);
		assert!(verifier.verify(payload, &signature));
		assert!(!verifier.verify(br#"{"oid_partner":"P2","result_pay":"SUCCESS"}"#, &signature));
	}

	#[test]
	fn test_open_parses_only_trusted_bodies() {
		let verifier = verifier_with(&[GATEWAY_PUB]);

		let notification = verifier.open(NOTIFY_BODY, NOTIFY_SIGNATURE).unwrap().unwrap();
		assert_eq!(notification.get_str("result_pay"), Some("SUCCESS"));
		assert_eq!(notification.get_str("no_order"), Some("2024010112000012345678"));

		assert!(verifier.open(b"{}", NOTIFY_SIGNATURE).unwrap().is_none());
	}

	#[test]
	fn test_open_rejects_trusted_but_malformed_body() {
		let gateway_key = parse_private_key(GATEWAY_KEY).unwrap();
		let payload = b"result_pay=SUCCESS";
		let signature = sign_message(payload, &gateway_key, SignatureScheme::default()).unwrap();

		let verifier = verifier_with(&[GATEWAY_PUB]);
		assert!(matches!(
			verifier.open(payload, &signature),
			Err(ClientError::ResponseParse(_))
		));
	}
}
