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

use crate::client::Client;
use crate::envelope::Params;
use crate::error::ClientError;
use crate::response::GatewayResponse;

pub mod endpoints {
	use crate::credentials::ServiceArea;
	use crate::endpoint::Endpoint;

	pub const PHONE_VERIFY_CODE_APPLY: Endpoint<'static> = Endpoint::new(
		ServiceArea::AccountManagement,
		"acctmgr/regphone-verifycode-apply",
	);
	pub const PHONE_VERIFY_CODE_VERIFY: Endpoint<'static> = Endpoint::new(
		ServiceArea::AccountManagement,
		"acctmgr/regphone-verifycode-verify",
	);
	pub const PERSON_OPEN_ACCT_APPLY: Endpoint<'static> = Endpoint::new(
		ServiceArea::AccountManagement,
		"acctmgr/openacct-apply-individual",
	);
	pub const PERSON_OPEN_ACCT_VERIFY: Endpoint<'static> = Endpoint::new(
		ServiceArea::AccountManagement,
		"acctmgr/openacct-verify-individual",
	);
	pub const ENTERPRISE_OPEN_ACCT_APPLY: Endpoint<'static> = Endpoint::new(
		ServiceArea::AccountManagement,
		"acctmgr/openacct-apply-enterprise",
	);
	pub const ENTERPRISE_OPEN_ACCT_VERIFY: Endpoint<'static> = Endpoint::new(
		ServiceArea::AccountManagement,
		"acctmgr/openacct-verify-enterprise",
	);
}

/// Account onboarding: phone binding and account opening
pub struct AccountApi<'a> {
	client: &'a Client,
}

impl<'a> AccountApi<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// Request an SMS code for binding `reg_phone` to `user_id`
	pub async fn phone_verify_code_apply(
		&self,
		user_id: &str,
		reg_phone: &str,
		timestamp: Option<&str>,
	) -> Result<GatewayResponse, ClientError> {
		let params = Params::new()
			.set_opt("timestamp", timestamp)
			.set("oid_partner", self.client.credentials().partner_id())
			.set("user_id", user_id)
			.set("reg_phone", reg_phone);

		self.client
			.sign_and_send(&endpoints::PHONE_VERIFY_CODE_APPLY, params)
			.await
	}

	/// Check the SMS code sent by [`phone_verify_code_apply`](Self::phone_verify_code_apply)
	pub async fn phone_verify_code_verify(
		&self,
		user_id: &str,
		reg_phone: &str,
		verify_code: &str,
		timestamp: Option<&str>,
	) -> Result<GatewayResponse, ClientError> {
		let params = Params::new()
			.set_opt("timestamp", timestamp)
			.set("oid_partner", self.client.credentials().partner_id())
			.set("user_id", user_id)
			.set("verify_code", verify_code)
			.set("reg_phone", reg_phone);

		self.client
			.sign_and_send(&endpoints::PHONE_VERIFY_CODE_VERIFY, params)
			.await
	}

	/// Individual account opening; `oid_partner` defaults to the configured one
	pub async fn person_open_acct_apply(
		&self,
		params: Params,
	) -> Result<GatewayResponse, ClientError> {
		self.client
			.sign_and_send(&endpoints::PERSON_OPEN_ACCT_APPLY, params)
			.await
	}

	pub async fn person_open_acct_verify(
		&self,
		params: Params,
	) -> Result<GatewayResponse, ClientError> {
		self.client
			.sign_and_send(&endpoints::PERSON_OPEN_ACCT_VERIFY, params)
			.await
	}

	pub async fn enterprise_open_acct_apply(
		&self,
		params: Params,
	) -> Result<GatewayResponse, ClientError> {
		self.client
			.sign_and_send(&endpoints::ENTERPRISE_OPEN_ACCT_APPLY, params)
			.await
	}

	pub async fn enterprise_open_acct_verify(
		&self,
		params: Params,
	) -> Result<GatewayResponse, ClientError> {
		self.client
			.sign_and_send(&endpoints::ENTERPRISE_OPEN_ACCT_VERIFY, params)
			.await
	}
}
