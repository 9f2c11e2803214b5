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

//! Per-domain endpoint catalogs
//!
//! Each group is a borrowed view over [`Client`](crate::Client) that fixes the
//! documented field order of its endpoints and forwards to
//! `sign_and_send`.

mod account;
mod common;
mod payment;

pub use account::{AccountApi, endpoints as account_endpoints};
pub use common::{CommonApi, endpoints as common_endpoints};
pub use payment::{FlagCard, PaymentApi, PaymentOrder, endpoints as payment_endpoints};
