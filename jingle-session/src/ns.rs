// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! XML namespaces used by the Jingle session engine.

pub const JINGLE: &str = "urn:xmpp:jingle:1";
pub const JINGLE_RTP: &str = "urn:xmpp:jingle:apps:rtp:1";
pub const JINGLE_RTP_INFO: &str = "urn:xmpp:jingle:apps:rtp:info:1";
pub const JINGLE_ICE_UDP: &str = "urn:xmpp:jingle:transports:ice-udp:1";
pub const JINGLE_RAW_UDP: &str = "urn:xmpp:jingle:transports:raw-udp:1";
pub const JINGLE_RAW_UDP_INFO: &str = "urn:xmpp:jingle:transports:raw-udp:info:1";
pub const JINGLE_DTMF: &str = "urn:xmpp:jingle:dtmf:0";
pub const JINGLE_TRANSFER: &str = "urn:xmpp:jingle:transfer:0";
pub const XMPP_STANZAS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";
