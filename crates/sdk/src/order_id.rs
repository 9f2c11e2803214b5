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

//! Merchant order number generation
//!
//! `YYYYMMDDHHmmss` + 6-digit microseconds + 4-digit random suffix. This is a
//! convenience default, not a uniqueness guarantee: high-volume issuers must
//! still dedupe against their own store.

use chrono::{DateTime, Local, Timelike};
use rand::Rng;

use crate::envelope::TIMESTAMP_FORMAT;

/// Length of every generated order number
pub const ORDER_ID_LEN: usize = 24;

/// Generate a new merchant order number (`no_order`)
pub fn new_order_id() -> String {
	order_id_at(Local::now(), &mut rand::thread_rng())
}

pub fn order_id_at<R: Rng + ?Sized>(now: DateTime<Local>, rng: &mut R) -> String {
	let micros = now.nanosecond() / 1_000 % 1_000_000;
	let suffix: u16 = rng.gen_range(1000..=9999);
	format!("{}{:06}{}", now.format(TIMESTAMP_FORMAT), micros, suffix)
}
