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

use chrono::{DateTime, Local};

use crate::client::Client;
use crate::envelope::{
	API_VERSION, OID_PARTNER, PRODUCTION_API_VERSION, Params, SANDBOX_API_VERSION, SIGN_TYPE,
	format_timestamp,
};
use crate::error::ClientError;
use crate::order_id::new_order_id;
use crate::response::GatewayResponse;
use crate::signer::SignAlgorithm;

pub mod endpoints {
	use crate::credentials::ServiceArea;
	use crate::endpoint::Endpoint;

	pub const PAYMENT: Endpoint<'static> =
		Endpoint::new(ServiceArea::InstantPay, "paymentapi/payment.htm").versioned();
	pub const CONFIRM_PAYMENT: Endpoint<'static> =
		Endpoint::new(ServiceArea::InstantPay, "paymentapi/confirmPayment.htm");
	pub const QUERY_PAYMENT: Endpoint<'static> =
		Endpoint::new(ServiceArea::InstantPay, "paymentapi/queryPayment.htm");
}

/// Confirmation and query always speak the 1.0 protocol
const FIXED_API_VERSION: &str = "1.0";

/// Payee account type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagCard {
	#[default]
	Person,
	Organization,
}

impl FlagCard {
	pub fn as_str(self) -> &'static str {
		match self {
			FlagCard::Person => "0",
			FlagCard::Organization => "1",
		}
	}
}

/// A single instant-pay transfer
///
/// The bank fields (`bank_name` through `brabank_name`) are only relevant
/// for [`FlagCard::Organization`] payees.
#[derive(Debug, Clone, Default)]
pub struct PaymentOrder {
	/// Amount in yuan with two decimals, e.g. `"10.00"`
	pub money_order: String,
	pub card_no: String,
	pub acct_name: String,
	pub info_order: String,
	pub memo: String,
	pub no_order: String,
	pub flag_card: FlagCard,
	/// Risk-control payload; only sent in production
	pub risk_item: Option<String>,
	/// Falls back to the configured notify URL
	pub notify_url: Option<String>,
	pub bank_name: Option<String>,
	pub prcptcd: Option<String>,
	pub bank_code: Option<String>,
	pub city_code: Option<String>,
	pub brabank_name: Option<String>,
}

impl PaymentOrder {
	/// New order with a freshly generated `no_order`
	pub fn new(
		money_order: impl Into<String>,
		card_no: impl Into<String>,
		acct_name: impl Into<String>,
		info_order: impl Into<String>,
		memo: impl Into<String>,
	) -> Self {
		Self {
			money_order: money_order.into(),
			card_no: card_no.into(),
			acct_name: acct_name.into(),
			info_order: info_order.into(),
			memo: memo.into(),
			no_order: new_order_id(),
			..Default::default()
		}
	}

	pub fn with_no_order(mut self, no_order: impl Into<String>) -> Self {
		self.no_order = no_order.into();
		self
	}

	pub fn with_flag_card(mut self, flag_card: FlagCard) -> Self {
		self.flag_card = flag_card;
		self
	}
}

/// Instant-pay transfers
pub struct PaymentApi<'a> {
	client: &'a Client,
}

impl<'a> PaymentApi<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// Submit a transfer
	pub async fn payment(&self, order: PaymentOrder) -> Result<GatewayResponse, ClientError> {
		let params = self.payment_params(order, Local::now());
		self.client.sign_and_send(&endpoints::PAYMENT, params).await
	}

	/// Confirm a transfer the gateway held as a suspected duplicate
	pub async fn confirm_payment(
		&self,
		no_order: &str,
		confirm_code: &str,
		notify_url: Option<&str>,
	) -> Result<GatewayResponse, ClientError> {
		let params = self.confirm_params(no_order, confirm_code, notify_url);
		self.client
			.sign_and_send(&endpoints::CONFIRM_PAYMENT, params)
			.await
	}

	/// Look a transfer up by merchant order number or gateway bill number
	pub async fn query_payment(
		&self,
		no_order: Option<&str>,
		oid_paybill: Option<&str>,
	) -> Result<GatewayResponse, ClientError> {
		let params = self.query_params(no_order, oid_paybill)?;
		self.client
			.sign_and_send(&endpoints::QUERY_PAYMENT, params)
			.await
	}

	fn header(&self) -> Params {
		let credentials = self.client.credentials();
		Params::new()
			.set(OID_PARTNER, credentials.partner_id())
			.set_opt("platform", credentials.platform())
	}

	fn payment_params(&self, order: PaymentOrder, now: DateTime<Local>) -> Params {
		let credentials = self.client.credentials();
		let production = credentials.environment().is_production();
		let api_version = if production {
			PRODUCTION_API_VERSION
		} else {
			SANDBOX_API_VERSION
		};
		let notify_url = order
			.notify_url
			.or_else(|| credentials.notify_url().map(str::to_string));

		self.header()
			.set(API_VERSION, api_version)
			.set(SIGN_TYPE, SignAlgorithm::Rsa.as_str())
			.set("no_order", order.no_order)
			.set("dt_order", format_timestamp(now))
			.set("money_order", order.money_order)
			.set("card_no", order.card_no)
			.set("acct_name", order.acct_name)
			.set("info_order", order.info_order)
			.set("flag_card", order.flag_card.as_str())
			.set("memo", order.memo)
			.set_opt("notify_url", notify_url)
			.set_opt("risk_item", order.risk_item.filter(|_| production))
			.set_opt("bank_name", order.bank_name)
			.set_opt("prcptcd", order.prcptcd)
			.set_opt("bank_code", order.bank_code)
			.set_opt("city_code", order.city_code)
			.set_opt("brabank_name", order.brabank_name)
	}

	fn confirm_params(&self, no_order: &str, confirm_code: &str, notify_url: Option<&str>) -> Params {
		let notify_url = notify_url.or_else(|| self.client.credentials().notify_url());

		self.header()
			.set(API_VERSION, FIXED_API_VERSION)
			.set(SIGN_TYPE, SignAlgorithm::Rsa.as_str())
			.set("no_order", no_order)
			.set("confirm_code", confirm_code)
			.set_opt("notify_url", notify_url)
	}

	fn query_params(
		&self,
		no_order: Option<&str>,
		oid_paybill: Option<&str>,
	) -> Result<Params, ClientError> {
		let no_order = no_order.filter(|s| !s.is_empty());
		let oid_paybill = oid_paybill.filter(|s| !s.is_empty());
		if no_order.is_none() && oid_paybill.is_none() {
			return Err(ClientError::InvalidArgument(
				"no_order and oid_paybill cannot both be empty".to_string(),
			));
		}

		let credentials = self.client.credentials();
		Ok(Params::new()
			.set(OID_PARTNER, credentials.partner_id())
			.set(SIGN_TYPE, SignAlgorithm::Rsa.as_str())
			.set_opt("no_order", no_order)
			.set_opt("platform", credentials.platform())
			.set_opt("oid_paybill", oid_paybill)
			.set(API_VERSION, FIXED_API_VERSION))
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;

	use super::*;
	use crate::credentials::{Credentials, Environment};
	use crate::envelope::{RequestBuilder, SIGN};

	const MERCHANT_KEY: &str = include_str!("../../tests/fixtures/merchant_private.pem");
	const GATEWAY_PUB: &str = include_str!("../../tests/fixtures/gateway_public.pem");

	fn client(environment: Environment) -> Client {
		let credentials = Credentials::builder("P1")
			.private_key_pem(MERCHANT_KEY)
			.gateway_public_key_pem(GATEWAY_PUB)
			.environment(environment)
			.platform("shop.example.com")
			.notify_url("https://shop.example.com/notify")
			.build()
			.unwrap();
		Client::new(credentials).unwrap()
	}

	fn order() -> PaymentOrder {
		let mut order = PaymentOrder::new("10.00", "6222000000000000", "Zhang San", "refund", "memo")
			.with_no_order("2024010112000012345678");
		order.risk_item = Some("{\"frms_ware_category\":\"2009\"}".to_string());
		order
	}

	fn keys(params: &Params) -> Vec<&str> {
		params.iter().map(|(k, _)| k).collect()
	}

	#[test]
	fn test_flag_card_codes() {
		assert_eq!(FlagCard::default().as_str(), "0");
		assert_eq!(FlagCard::Organization.as_str(), "1");
	}

	#[test]
	fn test_new_order_generates_no_order() {
		let order = PaymentOrder::new("1.00", "card", "name", "info", "memo");
		assert_eq!(order.no_order.len(), 24);
		assert_eq!(order.flag_card, FlagCard::Person);
	}

	#[test]
	fn test_payment_field_order() {
		let client = client(Environment::Sandbox);
		let now = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
		let params = client.payment().payment_params(order(), now);

		assert_eq!(
			keys(&params),
			vec![
				"oid_partner",
				"platform",
				"api_version",
				"sign_type",
				"no_order",
				"dt_order",
				"money_order",
				"card_no",
				"acct_name",
				"info_order",
				"flag_card",
				"memo",
				"notify_url",
				"risk_item",
				"bank_name",
				"prcptcd",
				"bank_code",
				"city_code",
				"brabank_name",
			]
		);
		assert_eq!(params.get("api_version").unwrap().to_string(), "1.0");
		assert_eq!(params.get("dt_order").unwrap().to_string(), "20240101120000");
		assert_eq!(
			params.get("notify_url").unwrap().to_string(),
			"https://shop.example.com/notify"
		);
		// sandbox never sends risk_item
		assert!(!params.has_value("risk_item"));
	}

	#[test]
	fn test_payment_production_sends_risk_item() {
		let client = client(Environment::Production);
		let params = client.payment().payment_params(order(), Local::now());

		assert_eq!(params.get("api_version").unwrap().to_string(), "1.1");
		assert!(params.has_value("risk_item"));
	}

	#[test]
	fn test_payment_envelope_is_body_signed() {
		let client = client(Environment::Sandbox);
		let now = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
		let params = client.payment().payment_params(order(), now);
		let envelope = RequestBuilder::new(client.credentials())
			.build_at(&endpoints::PAYMENT, params, now)
			.unwrap();

		let keys: Vec<&str> = envelope.keys().collect();
		assert_eq!(&keys[..5], &["timestamp", "oid_partner", "platform", "api_version", "sign_type"]);
		// unset bank fields are dropped
		assert!(!envelope.contains_key("bank_name"));

		let signed = client
			.prepare(&endpoints::PAYMENT, client.payment().payment_params(order(), now))
			.unwrap();
		assert!(signed.envelope.contains_key(SIGN));
	}

	#[test]
	fn test_confirm_payment_fields() {
		let client = client(Environment::Production);
		let params = client
			.payment()
			.confirm_params("2024010112000012345678", "123456", Some("https://other/notify"));

		assert_eq!(
			keys(&params),
			vec![
				"oid_partner",
				"platform",
				"api_version",
				"sign_type",
				"no_order",
				"confirm_code",
				"notify_url",
			]
		);
		assert_eq!(params.get("api_version").unwrap().to_string(), "1.0");
		assert_eq!(params.get("notify_url").unwrap().to_string(), "https://other/notify");
	}

	#[test]
	fn test_query_payment_requires_an_identifier() {
		let client = client(Environment::Sandbox);
		let api = client.payment();

		assert!(matches!(
			api.query_params(None, None),
			Err(ClientError::InvalidArgument(_))
		));
		assert!(matches!(
			api.query_params(Some(""), Some("")),
			Err(ClientError::InvalidArgument(_))
		));

		let params = api.query_params(None, Some("2024123456")).unwrap();
		assert!(!params.has_value("no_order"));
		assert_eq!(params.get("oid_paybill").unwrap().to_string(), "2024123456");
		assert_eq!(params.get("api_version").unwrap().to_string(), "1.0");
	}
}
