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

//! Request signing
//!
//! The canonical string is `key=value` pairs joined with `&`, in envelope
//! order. It is digested (MD5 unless configured otherwise) and signed with the
//! merchant key using RSA PKCS#1 v1.5; the signature travels base64 encoded.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use md5::Md5;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::endpoint::{BodyEncoding, Endpoint, SignaturePlacement};
use crate::envelope::{RequestEnvelope, SIGN};

pub const SIGNATURE_TYPE_HEADER: &str = "Signature-Type";
pub const SIGNATURE_DATA_HEADER: &str = "Signature-Data";

/// Error types for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
	#[error("Signing error: {0}")]
	Signing(#[from] rsa::Error),
}

/// Digest applied before the RSA operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
	#[default]
	Md5,
	Sha256,
}

impl HashAlgorithm {
	pub fn digest(self, message: &[u8]) -> Vec<u8> {
		match self {
			HashAlgorithm::Md5 => Md5::digest(message).to_vec(),
			HashAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
		}
	}

	fn padding(self) -> Pkcs1v15Sign {
		match self {
			HashAlgorithm::Md5 => Pkcs1v15Sign::new::<Md5>(),
			HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
		}
	}
}

/// Algorithm tag sent alongside the signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignAlgorithm {
	Rsa,
}

impl SignAlgorithm {
	pub fn as_str(self) -> &'static str {
		match self {
			SignAlgorithm::Rsa => "RSA",
		}
	}
}

/// Signature scheme agreed with the gateway
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureScheme {
	pub hash: HashAlgorithm,
}

impl SignatureScheme {
	pub const fn new(hash: HashAlgorithm) -> Self {
		Self { hash }
	}

	pub fn algorithm(self) -> SignAlgorithm {
		SignAlgorithm::Rsa
	}
}

/// Envelope plus its signature, ready for dispatch
#[derive(Debug, Clone)]
pub struct SignedRequest {
	/// Fields sent in the body (includes `sign` for body placement)
	pub envelope: RequestEnvelope,
	pub signature: String,
	pub sign_algorithm: SignAlgorithm,
	pub placement: SignaturePlacement,
	pub encoding: BodyEncoding,
}

impl SignedRequest {
	/// Headers that carry the signature, empty for body placement
	pub fn signature_headers(&self) -> Vec<(&'static str, String)> {
		match self.placement {
			SignaturePlacement::Header => vec![
				(SIGNATURE_TYPE_HEADER, self.sign_algorithm.as_str().to_string()),
				(SIGNATURE_DATA_HEADER, self.signature.clone()),
			],
			SignaturePlacement::Body => Vec::new(),
		}
	}
}

/// Canonical signing string; the `sign` field is never part of it
pub fn canonical_string(envelope: &RequestEnvelope) -> String {
	envelope
		.iter()
		.filter(|(key, _)| *key != SIGN)
		.map(|(key, value)| format!("{}={}", key, value))
		.collect::<Vec<_>>()
		.join("&")
}

/// Sign an arbitrary message, returning the base64 signature
pub fn sign_message(
	message: &[u8],
	private_key: &RsaPrivateKey,
	scheme: SignatureScheme,
) -> Result<String, SigningError> {
	let digest = scheme.hash.digest(message);
	let signature = private_key.sign(scheme.hash.padding(), &digest)?;
	Ok(BASE64.encode(signature))
}

/// Sign the canonical form of an envelope
pub fn sign(
	envelope: &RequestEnvelope,
	private_key: &RsaPrivateKey,
	scheme: SignatureScheme,
) -> Result<String, SigningError> {
	sign_message(canonical_string(envelope).as_bytes(), private_key, scheme)
}

/// Sign an envelope and attach the signature the way `endpoint` expects it
pub fn attach(
	mut envelope: RequestEnvelope,
	endpoint: &Endpoint<'_>,
	private_key: &RsaPrivateKey,
	scheme: SignatureScheme,
) -> Result<SignedRequest, SigningError> {
	let signature = sign(&envelope, private_key, scheme)?;
	let placement = endpoint.signature_placement();
	if placement == SignaturePlacement::Body {
		envelope.push(SIGN, signature.clone());
	}

	Ok(SignedRequest {
		envelope,
		signature,
		sign_algorithm: scheme.algorithm(),
		placement,
		encoding: endpoint.encoding,
	})
}

/// Verify a base64 signature over `message`
///
/// Any failure (bad base64, wrong key, tampered message) is reported as
/// `false`.
pub fn verify_message(
	message: &[u8],
	signature: &str,
	public_key: &RsaPublicKey,
	hash: HashAlgorithm,
) -> bool {
	let Ok(signature) = BASE64.decode(signature.trim()) else {
		return false;
	};
	let digest = hash.digest(message);
	public_key.verify(hash.padding(), &digest, &signature).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::credentials::{ServiceArea, parse_private_key, parse_public_key};
	use crate::envelope::ParamValue;

	const MERCHANT_KEY: &str = include_str!("../tests/fixtures/merchant_private.pem");
	const MERCHANT_PUB: &str = include_str!("../tests/fixtures/merchant_public.pem");

	// openssl dgst -md5 -sign merchant_private.pem over the canonical string below
	const EXPECTED_MD5_SIGNATURE: &str = "NzijrLG7fLlnP7pF3lMKyIWzyBPAzAvVKOOygmCY9kn4tnt3CvoznhOjfV+lS7P+Utn50Oh5Q86W6BhogNDOuM7I5jJ7NTOJkg1HLAeknrDLBciqnbBXyE9/hF+yHkOZ2VBxWJRJwJHMTr9ZQcsYRqSqfDVrFNNb+s2dmB6Etiw=";

	// openssl dgst -sha256 -sign merchant_private.pem over "oid_partner=P1&sign_type=RSA"
	const EXPECTED_SHA256_SIGNATURE: &str = "Wjo3tLmuYWOzdhHJmrH4+Jxb82mOVqIRM+bV6eBYk8OmnFh1EABsEjneWEAqT19xzOPxqRUweQHMj1CIPdly/EW1sT1RRkHHsM580uIuCfym9NQ6NqNOh+lOWmUT8LBEG/GUtu5SRKxjAeo0L0FyxFmyAZU4tBpMEd0EkgH8TDA=";

	fn sample_envelope() -> RequestEnvelope {
		vec![
			("timestamp", "20240101120000"),
			("oid_partner", "P1"),
			("user_id", "U1"),
			("reg_phone", "13800000000"),
		]
		.into_iter()
		.collect()
	}

	#[test]
	fn test_canonical_string_keeps_insertion_order() {
		assert_eq!(
			canonical_string(&sample_envelope()),
			"timestamp=20240101120000&oid_partner=P1&user_id=U1&reg_phone=13800000000"
		);
	}

	#[test]
	fn test_canonical_string_skips_sign_field() {
		let envelope: RequestEnvelope = vec![
			("b", ParamValue::from("2")),
			("sign", ParamValue::from("abc")),
			("a", ParamValue::from(1)),
		]
		.into_iter()
		.collect();
		assert_eq!(canonical_string(&envelope), "b=2&a=1");
	}

	#[test]
	fn test_md5_signature_matches_openssl() {
		let key = parse_private_key(MERCHANT_KEY).unwrap();
		let signature = sign(&sample_envelope(), &key, SignatureScheme::default()).unwrap();
		assert_eq!(signature, EXPECTED_MD5_SIGNATURE);
	}

	#[test]
	fn test_sha256_signature_matches_openssl() {
		let key = parse_private_key(MERCHANT_KEY).unwrap();
		let envelope: RequestEnvelope = vec![("oid_partner", "P1"), ("sign_type", "RSA")]
			.into_iter()
			.collect();
		let signature = sign(&envelope, &key, SignatureScheme::new(HashAlgorithm::Sha256)).unwrap();
		assert_eq!(signature, EXPECTED_SHA256_SIGNATURE);
	}

	#[test]
	fn test_signing_is_deterministic() {
		let key = parse_private_key(MERCHANT_KEY).unwrap();
		let first = sign(&sample_envelope(), &key, SignatureScheme::default()).unwrap();
		let second = sign(&sample_envelope(), &key, SignatureScheme::default()).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn test_field_order_changes_signature() {
		let key = parse_private_key(MERCHANT_KEY).unwrap();
		let reordered: RequestEnvelope = vec![
			("oid_partner", "P1"),
			("timestamp", "20240101120000"),
			("user_id", "U1"),
			("reg_phone", "13800000000"),
		]
		.into_iter()
		.collect();
		let a = sign(&sample_envelope(), &key, SignatureScheme::default()).unwrap();
		let b = sign(&reordered, &key, SignatureScheme::default()).unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn test_verify_message_round_trip() {
		let key = parse_private_key(MERCHANT_KEY).unwrap();
		let public = parse_public_key(MERCHANT_PUB).unwrap();
		let signature = sign_message(b"payload", &key, SignatureScheme::default()).unwrap();

		assert!(verify_message(b"payload", &signature, &public, HashAlgorithm::Md5));
		assert!(!verify_message(b"payload!", &signature, &public, HashAlgorithm::Md5));
		assert!(!verify_message(b"payload", &signature, &public, HashAlgorithm::Sha256));
		assert!(!verify_message(b"payload", "%%%not-base64", &public, HashAlgorithm::Md5));
	}

	#[test]
	fn test_attach_body_placement() {
		let key = parse_private_key(MERCHANT_KEY).unwrap();
		let endpoint = Endpoint::new(ServiceArea::InstantPay, "paymentapi/queryPayment.htm");
		let signed = attach(sample_envelope(), &endpoint, &key, SignatureScheme::default()).unwrap();

		assert_eq!(signed.placement, SignaturePlacement::Body);
		assert_eq!(
			signed.envelope.get("sign"),
			Some(&ParamValue::Text(signed.signature.clone()))
		);
		assert!(signed.signature_headers().is_empty());
		// appending `sign` leaves the canonical form untouched
		assert_eq!(
			canonical_string(&signed.envelope),
			canonical_string(&sample_envelope())
		);
	}

	#[test]
	fn test_attach_header_placement() {
		let key = parse_private_key(MERCHANT_KEY).unwrap();
		let endpoint = Endpoint::new(ServiceArea::AccountManagement, "acctmgr/get-random");
		let signed = attach(sample_envelope(), &endpoint, &key, SignatureScheme::default()).unwrap();

		assert!(!signed.envelope.contains_key("sign"));
		let headers = signed.signature_headers();
		assert_eq!(headers[0], ("Signature-Type", "RSA".to_string()));
		assert_eq!(headers[1], ("Signature-Data", EXPECTED_MD5_SIGNATURE.to_string()));
	}
}
