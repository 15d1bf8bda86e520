// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The seam between a session and the XMPP connection carrying it.
//!
//! A real embedding would implement this over `tokio_xmpp::Client`, handing
//! `send` straight to `Client::send_stanza`; this crate never touches a
//! socket itself, matching the out-of-scope boundary around the stream
//! transport.

use jid::Jid;
use minidom::Element;

use crate::error::SendError;

/// What a session needs from its underlying XMPP connection.
pub trait SessionStream: std::fmt::Debug {
    /// Sends a stanza addressed by its own `to`/`id` attributes.
    fn send(&self, stanza: Element) -> Result<(), SendError>;

    /// Tells the stream that any stanza whose id starts with `local_sid` no
    /// longer has an interested listener, called on session destruction.
    fn forget(&self, local_sid: &str);

    /// The JID this side of the session is reachable as.
    fn local_jid(&self) -> Jid;
}
