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

	pub const GET_RANDOM: Endpoint<'static> =
		Endpoint::new(ServiceArea::AccountManagement, "acctmgr/get-random");
}

/// Endpoints shared by several flows
pub struct CommonApi<'a> {
	client: &'a Client,
}

impl<'a> CommonApi<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// Fetch the random factor used to encrypt passwords on the client side
	pub async fn get_random(
		&self,
		user_id: &str,
		flag_chnl: &str,
		pkg_name: Option<&str>,
		app_name: Option<&str>,
		encrypt_algorithm: Option<&str>,
	) -> Result<GatewayResponse, ClientError> {
		let params = Params::new()
			.set("oid_partner", self.client.credentials().partner_id())
			.set("user_id", user_id)
			.set("flag_chnl", flag_chnl)
			.set_opt("pkg_name", pkg_name)
			.set_opt("app_name", app_name)
			.set_opt("encrypt_algorithm", encrypt_algorithm);

		self.client.sign_and_send(&endpoints::GET_RANDOM, params).await
	}
}
