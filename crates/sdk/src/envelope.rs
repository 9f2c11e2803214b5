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

//! Canonical request builder
//!
//! Requests are ordered key-value lists, never hash maps: the gateway signs
//! fields in the order each endpoint documents them, so the order callers
//! insert fields in is the order they are signed and sent in.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Number, Value};

use crate::credentials::Credentials;
use crate::endpoint::{Endpoint, SignaturePlacement};
use crate::error::ClientError;
use crate::signer::SignAlgorithm;

pub const TIMESTAMP: &str = "timestamp";
pub const OID_PARTNER: &str = "oid_partner";
pub const API_VERSION: &str = "api_version";
pub const SIGN_TYPE: &str = "sign_type";
pub const SIGN: &str = "sign";

/// `YYYYMMDDHHmmss`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub const SANDBOX_API_VERSION: &str = "1.0";
pub const PRODUCTION_API_VERSION: &str = "1.1";

/// Scalar request value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
	Text(String),
	Int(i64),
	/// Non-integer or out-of-range number, sent as a JSON number
	Number(Number),
}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParamValue::Text(s) => f.write_str(s),
			ParamValue::Int(n) => write!(f, "{}", n),
			ParamValue::Number(n) => write!(f, "{}", n),
		}
	}
}

impl Serialize for ParamValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			ParamValue::Text(s) => serializer.serialize_str(s),
			ParamValue::Int(n) => serializer.serialize_i64(*n),
			ParamValue::Number(n) => n.serialize(serializer),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		ParamValue::Text(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		ParamValue::Text(value)
	}
}

impl From<&String> for ParamValue {
	fn from(value: &String) -> Self {
		ParamValue::Text(value.clone())
	}
}

impl From<Number> for ParamValue {
	fn from(value: Number) -> Self {
		match value.as_i64() {
			Some(n) => ParamValue::Int(n),
			None => ParamValue::Number(value),
		}
	}
}

impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		ParamValue::Int(value)
	}
}

impl From<i32> for ParamValue {
	fn from(value: i32) -> Self {
		ParamValue::Int(value.into())
	}
}

impl From<u32> for ParamValue {
	fn from(value: u32) -> Self {
		ParamValue::Int(value.into())
	}
}

/// Caller-supplied fields; `None` marks a null field that is dropped on build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
	fields: Vec<(String, Option<ParamValue>)>,
}

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a field; an existing key keeps its position
	pub fn set(self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.set_opt(key, Some(value))
	}

	pub fn set_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
		self.insert(key, value.map(Into::into));
		self
	}

	pub fn insert(&mut self, key: impl Into<String>, value: Option<ParamValue>) {
		let key = key.into();
		match self.fields.iter_mut().find(|(k, _)| *k == key) {
			Some(slot) => slot.1 = value,
			None => self.fields.push((key, value)),
		}
	}

	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.fields
			.iter()
			.find(|(k, _)| k == key)
			.and_then(|(_, v)| v.as_ref())
	}

	/// True when the key is present with a non-null value
	pub fn has_value(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ParamValue>)> {
		self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
	}

	/// Convert a JSON object, keeping its key order
	///
	/// Strings and numbers keep their JSON type, `null` becomes an absent
	/// field. Booleans, arrays and objects are rejected.
	pub fn from_json(object: &Map<String, Value>) -> Result<Self, ClientError> {
		let mut params = Params::new();
		for (key, value) in object {
			let value = match value {
				Value::Null => None,
				Value::String(s) => Some(ParamValue::Text(s.clone())),
				Value::Number(n) => Some(ParamValue::from(n.clone())),
				other => {
					return Err(ClientError::InvalidArgument(format!(
						"Field {} must be a scalar, got {}",
						key, other
					)));
				}
			};
			params.insert(key.clone(), value);
		}
		Ok(params)
	}
}

impl<K: Into<String>> FromIterator<(K, Option<ParamValue>)> for Params {
	fn from_iter<I: IntoIterator<Item = (K, Option<ParamValue>)>>(iter: I) -> Self {
		let mut params = Params::new();
		for (key, value) in iter {
			params.insert(key, value);
		}
		params
	}
}

/// Ordered, null-free field list that gets signed and sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEnvelope {
	fields: Vec<(String, ParamValue)>,
}

impl RequestEnvelope {
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|(k, _)| k.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.fields.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	pub(crate) fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
		self.fields.push((key.into(), value.into()));
	}

	/// `(key, value)` string pairs for form encoding
	pub fn to_form_pairs(&self) -> Vec<(String, String)> {
		self.fields
			.iter()
			.map(|(k, v)| (k.clone(), v.to_string()))
			.collect()
	}
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for RequestEnvelope {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			fields: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl Serialize for RequestEnvelope {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.fields.len()))?;
		for (key, value) in &self.fields {
			map.serialize_entry(key, value)?;
		}
		map.end()
	}
}

pub fn format_timestamp(now: DateTime<Local>) -> String {
	now.format(TIMESTAMP_FORMAT).to_string()
}

/// Merges caller fields with partner and protocol metadata
pub struct RequestBuilder<'a> {
	credentials: &'a Credentials,
}

impl<'a> RequestBuilder<'a> {
	pub fn new(credentials: &'a Credentials) -> Self {
		Self { credentials }
	}

	/// Build an envelope stamped with the current local time
	pub fn build(
		&self,
		endpoint: &Endpoint<'_>,
		params: Params,
	) -> Result<RequestEnvelope, ClientError> {
		self.build_at(endpoint, params, Local::now())
	}

	/// Build an envelope stamped with `now`
	///
	/// Caller values always win and keep their position. Missing metadata is
	/// prepended in the order `timestamp`, `oid_partner`, `api_version`,
	/// `sign_type`. Null fields are dropped, empty strings are kept.
	pub fn build_at(
		&self,
		endpoint: &Endpoint<'_>,
		params: Params,
		now: DateTime<Local>,
	) -> Result<RequestEnvelope, ClientError> {
		let partner_id = self.credentials.partner_id();
		if partner_id.is_empty() && !params.has_value(OID_PARTNER) {
			return Err(ClientError::Configuration(
				"oid_partner is not configured".to_string(),
			));
		}

		let mut envelope = RequestEnvelope::default();

		if !params.has_value(TIMESTAMP) {
			envelope.push(TIMESTAMP, format_timestamp(now));
		}
		if !params.has_value(OID_PARTNER) {
			envelope.push(OID_PARTNER, partner_id);
		}
		if endpoint.versioned && !params.has_value(API_VERSION) {
			let version = if self.credentials.environment().is_production() {
				PRODUCTION_API_VERSION
			} else {
				SANDBOX_API_VERSION
			};
			envelope.push(API_VERSION, version);
		}
		if endpoint.signature_placement() == SignaturePlacement::Body
			&& !params.has_value(SIGN_TYPE)
		{
			envelope.push(SIGN_TYPE, SignAlgorithm::Rsa.as_str());
		}

		for (key, value) in params.fields {
			if let Some(value) = value {
				envelope.fields.push((key, value));
			}
		}

		Ok(envelope)
	}
}
