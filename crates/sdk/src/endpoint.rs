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

use crate::credentials::ServiceArea;

/// How the request body is encoded on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyEncoding {
	#[default]
	Json,
	Form,
}

impl BodyEncoding {
	pub fn content_type(self) -> &'static str {
		match self {
			BodyEncoding::Json => "application/json;charset=UTF-8",
			BodyEncoding::Form => "application/x-www-form-urlencoded",
		}
	}
}

/// Where the signature travels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignaturePlacement {
	/// `Signature-Type` / `Signature-Data` request headers
	Header,
	/// `sign_type` / `sign` body fields
	Body,
}

/// A documented gateway endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
	pub area: ServiceArea,
	pub path: &'a str,
	pub encoding: BodyEncoding,
	/// Whether `api_version` is injected from the environment
	pub versioned: bool,
}

impl<'a> Endpoint<'a> {
	pub const fn new(area: ServiceArea, path: &'a str) -> Self {
		Self {
			area,
			path,
			encoding: BodyEncoding::Json,
			versioned: false,
		}
	}

	pub const fn versioned(mut self) -> Self {
		self.versioned = true;
		self
	}

	pub const fn form_encoded(mut self) -> Self {
		self.encoding = BodyEncoding::Form;
		self
	}

	pub fn signature_placement(&self) -> SignaturePlacement {
		match self.area {
			ServiceArea::InstantPay => SignaturePlacement::Body,
			ServiceArea::AccountManagement | ServiceArea::FileUpload => SignaturePlacement::Header,
		}
	}
}
