// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A Jingle ([XEP-0166](https://xmpp.org/extensions/xep-0166.html)) session
//! engine: the state machine, XML codec, and stanza bookkeeping a client
//! needs to run one `<iq/>`-driven call negotiation.
//!
//! This crate does not touch a socket. It sits between whatever carries
//! `<iq/>` stanzas on the wire (see [`SessionStream`]) and the application
//! logic that decides what media to offer and how to react to a ringing
//! phone. A single call is a [`Session`]; a process juggling several calls at
//! once owns an [`Engine`], which allocates session ids and routes inbound
//! stanzas to the right one.
//!
//! # Getting started
//!
//! Implement [`SessionStream`] over your XMPP connection, construct an
//! [`Engine`], and call [`Engine::start_outgoing`] or feed inbound stanzas to
//! [`Engine::dispatch`]. Then poll each [`Session`] with
//! [`Session::get_event`] the way you'd drain any other event queue.
//!
//! # Features
//!
//! - [x] Session lifecycle (`Idle` → `Pending` → `Active` → `Ending` → `Destroy`)
//! - [x] RTP ([XEP-0167](https://xmpp.org/extensions/xep-0167.html)) content negotiation
//! - [x] ICE-UDP ([XEP-0176](https://xmpp.org/extensions/xep-0176.html)) and raw-UDP ([XEP-0177](https://xmpp.org/extensions/xep-0177.html)) transports
//! - [x] DTMF ([XEP-0181](https://xmpp.org/extensions/xep-0181.html)) and call transfer ([XEP-0251](https://xmpp.org/extensions/xep-0251.html))
//! - [ ] The RTP media plane itself, ICE connectivity checks, file transfer, legacy Google Jingle

#![warn(missing_docs)]

pub mod action;
pub mod candidate;
pub mod content;
pub mod engine;
pub mod error;
pub mod events;
pub mod ns;
pub mod pending;
pub mod rtp;
pub mod session;
pub mod stream;

pub use action::{ActionKind, Creator, Disposition, Reason, Senders, WireAction};
pub use candidate::{RtpCandidate, RtpCandidates, TransportKind};
pub use content::SessionContent;
pub use engine::Engine;
pub use error::{DefinedCondition, ErrorType, ProtocolError, SendError, SessionError};
pub use events::{JingleEvent, RawEvent, ResultPayload};
pub use rtp::{Crypto, Media, Parameter, RtpMedia, RtpMediaList};
pub use session::{Direction, Session, State};
pub use stream::SessionStream;
