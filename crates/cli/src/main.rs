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

//! `llpay` - operator tool for the LianLian Pay gateway
//!
//! Generates order numbers, signs requests offline, verifies saved
//! notifications and queries transfers. Merchant settings come from
//! `--config` and/or `LLPAY_*` environment variables (a `.env` file is read
//! first).

mod cli;
mod commands;
mod config;
mod logging;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::logging::init_logging;

#[tokio::main]
async fn main() -> Result<ExitCode> {
	dotenv::dotenv().ok();
	let cli = Cli::parse();

	init_logging()?;
	info!(target: "llpay", command = ?cli.command, "Starting");

	match cli.command {
		Commands::OrderId { count } => {
			for id in commands::order_ids(count) {
				println!("{}", id);
			}
		}
		Commands::Sign {
			path,
			family,
			params,
			versioned,
			form,
		} => {
			let client = commands::load_client(cli.config.as_deref())?;
			let signed = commands::sign(&client, &path, family, &params, versioned, form)?;
			print_json(&signed)?;
		}
		Commands::Verify { payload, signature } => {
			let client = commands::load_client(cli.config.as_deref())?;
			if commands::verify(&client, &payload, &signature)? {
				println!("trusted");
			} else {
				println!("untrusted");
				return Ok(ExitCode::FAILURE);
			}
		}
		Commands::QueryPayment {
			no_order,
			oid_paybill,
		} => {
			let client = commands::load_client(cli.config.as_deref())?;
			let response =
				commands::query_payment(&client, no_order.as_deref(), oid_paybill.as_deref())
					.await?;
			print_json(&response)?;
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
	let text = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
	println!("{}", text);
	Ok(())
}
