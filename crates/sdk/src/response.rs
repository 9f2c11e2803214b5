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

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ClientError;

pub const RET_CODE: &str = "ret_code";
pub const RET_MSG: &str = "ret_msg";

/// `ret_code` value the gateway uses for success
pub const SUCCESS_CODE: &str = "0000";

/// Parsed gateway response with typed accessors
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
	fields: Map<String, Value>,
}

impl GatewayResponse {
	/// Parse a synchronous API response; `ret_code` must be present
	pub fn parse(body: &[u8]) -> Result<Self, ClientError> {
		let response = Self::parse_object(body)?;
		match response.get(RET_CODE) {
			Some(Value::String(_)) => Ok(response),
			Some(other) => Err(ClientError::ResponseParse(format!(
				"{} is not a string, got {}",
				RET_CODE,
				json_kind(other)
			))),
			None => Err(ClientError::ResponseParse(format!(
				"Missing {} in response",
				RET_CODE
			))),
		}
	}

	/// Parse any JSON object body (notifications carry no `ret_code`)
	pub fn parse_object(body: &[u8]) -> Result<Self, ClientError> {
		let value: Value = serde_json::from_slice(body)
			.map_err(|e| ClientError::ResponseParse(format!("Failed to parse response: {}", e)))?;
		match value {
			Value::Object(fields) => Ok(Self { fields }),
			other => Err(ClientError::ResponseParse(format!(
				"Expected a JSON object, got {}",
				json_kind(&other)
			))),
		}
	}

	pub fn ret_code(&self) -> Option<&str> {
		self.get_str(RET_CODE)
	}

	pub fn ret_msg(&self) -> Option<&str> {
		self.get_str(RET_MSG)
	}

	pub fn is_success(&self) -> bool {
		self.ret_code() == Some(SUCCESS_CODE)
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.fields.contains_key(key)
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.fields.get(key).and_then(Value::as_str)
	}

	/// Integer field; numeric strings are accepted since the gateway mixes both
	pub fn get_i64(&self, key: &str) -> Option<i64> {
		match self.fields.get(key)? {
			Value::Number(n) => n.as_i64(),
			Value::String(s) => s.parse().ok(),
			_ => None,
		}
	}

	pub fn get_bool(&self, key: &str) -> Option<bool> {
		self.fields.get(key).and_then(Value::as_bool)
	}

	/// Deserialize the whole response into a caller-defined type
	pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
		serde_json::from_value(Value::Object(self.fields.clone()))
			.map_err(|e| ClientError::ResponseParse(e.to_string()))
	}

	pub fn as_map(&self) -> &Map<String, Value> {
		&self.fields
	}

	pub fn into_map(self) -> Map<String, Value> {
		self.fields
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
