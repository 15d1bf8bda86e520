// Copyright (c) 2024 xmpp-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// XEP-0004: Data Forms
pub mod data_form;

pub mod validate;

pub use data_form::*;
pub use validate::*;
