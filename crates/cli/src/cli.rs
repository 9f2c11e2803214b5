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

//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use llpay_sdk::ServiceArea;

use crate::config::DEFAULT_ORDER_ID_COUNT;

/// Operator tool for the LianLian Pay gateway
#[derive(Parser, Debug)]
#[command(name = "llpay")]
#[command(version)]
#[command(about = "Sign, send and verify LianLian Pay gateway messages")]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,

	/// Path to a configuration file; `LLPAY_*` environment variables apply on top
	#[arg(short, long, global = true, env = "LLPAY_CONFIG")]
	pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Generate merchant order numbers
	OrderId {
		/// How many ids to print
		#[arg(short = 'n', long, default_value_t = DEFAULT_ORDER_ID_COUNT)]
		count: usize,
	},

	/// Build and sign a request offline and print it
	Sign {
		/// Endpoint path relative to the service base URL, e.g. `acctmgr/get-random`
		#[arg(long)]
		path: String,

		/// Service area the endpoint belongs to
		#[arg(long, value_enum, default_value = "account")]
		family: Family,

		/// Request fields as a JSON object, in signing order
		#[arg(long, default_value = "{}")]
		params: String,

		/// Inject `api_version` when absent
		#[arg(long)]
		versioned: bool,

		/// Send as application/x-www-form-urlencoded
		#[arg(long)]
		form: bool,
	},

	/// Verify a saved notification against the gateway key(s)
	///
	/// Exits with status 0 when the signature is trusted.
	Verify {
		/// File holding the raw notification body
		#[arg(long)]
		payload: PathBuf,

		/// Base64 value of the `Signature-Data` header
		#[arg(long)]
		signature: String,
	},

	/// Query an instant-pay transfer
	QueryPayment {
		/// Merchant order number
		#[arg(long)]
		no_order: Option<String>,

		/// Gateway bill number
		#[arg(long)]
		oid_paybill: Option<String>,
	},
}

/// Service area argument for clap
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Family {
	Account,
	InstantPay,
	Upload,
}

impl From<Family> for ServiceArea {
	fn from(family: Family) -> Self {
		match family {
			Family::Account => ServiceArea::AccountManagement,
			Family::InstantPay => ServiceArea::InstantPay,
			Family::Upload => ServiceArea::FileUpload,
		}
	}
}
