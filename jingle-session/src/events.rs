// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Translation of raw XMPP stream activity into higher-level Jingle events,
//! and the FIFO that buffers it between `accept_event` (producer) and
//! `get_event` (consumer).

use std::collections::VecDeque;

use jid::Jid;
use minidom::Element;

use crate::action::ActionKind;
use crate::content::SessionContent;

/// A raw inbound occurrence, as handed to `Session::accept_event` by the
/// engine. This is deliberately narrow: addressing and id-correlation live
/// in the session, not here.
#[derive(Debug, Clone)]
pub enum RawEvent {
    /// A Jingle-set `<iq type="set">` from the peer.
    JingleSet {
        stanza_id: Option<String>,
        from: Jid,
        to: Jid,
        jingle: Element,
    },
    /// An `<iq type="result">` or `<iq type="error">` answering one of our
    /// stanzas.
    Result {
        stanza_id: String,
        from: Jid,
        to: Jid,
        payload: ResultPayload,
    },
    /// The stream reported a transient send failure for a stanza we sent.
    WriteFail { stanza_id: String },
    /// The underlying stream was disconnected but may reconnect.
    Terminated,
    /// The underlying stream is gone for good.
    Destroyed,
}

#[derive(Debug, Clone)]
pub enum ResultPayload {
    Ok,
    Error {
        condition: String,
        text: Option<String>,
    },
}

/// What `accept_event` appended to a session's queue; same shape as
/// [`RawEvent`] but already known to address this session (so `from`/`to` and
/// the `sid`/`local_sid` filter no longer need to be carried alongside it).
pub(crate) type QueuedEvent = RawEvent;

/// FIFO of inbound events awaiting processing by `get_event`, with the rule
/// that events carrying session-ending information (`Terminated`,
/// `Destroyed`) jump to the front so a session's death can't be starved by
/// events queued ahead of it.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    queue: VecDeque<QueuedEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue::default()
    }

    pub fn push(&mut self, event: QueuedEvent) {
        match event {
            RawEvent::Terminated | RawEvent::Destroyed => self.queue.push_front(event),
            other => self.queue.push_back(other),
        }
    }

    pub fn pop(&mut self) -> Option<QueuedEvent> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// The application-visible outcome of a `get_event` tick.
#[derive(Debug, Clone)]
pub enum JingleEvent {
    /// A Jingle action was received and accepted; `contents` is populated
    /// for actions that carry `<content/>` children.
    Action {
        kind: ActionKind,
        contents: Vec<SessionContent>,
        /// Present only for `SessionInfo`-derived sub-actions (DTMF digits,
        /// transfer target, ...).
        info_text: Option<String>,
        /// Set when the application must call `Session::confirm` itself
        /// (content/transport verbs, `session-initiate`, transfer, RTP info);
        /// `None` means this was already auto-confirmed.
        pending_reply_to: Option<String>,
    },
    /// A previously sent stanza got an `iq/result` and notify was requested.
    ResultOk { stanza_id: String },
    /// A previously sent stanza got an `iq/error` and notify was requested.
    ResultError {
        stanza_id: String,
        condition: String,
        text: Option<String>,
    },
    /// A previously sent stanza failed at the transport layer and notify was
    /// requested.
    ResultWriteFail { stanza_id: String },
    /// A previously sent stanza's deadline passed with no response and
    /// notify was requested.
    ResultTimeout { stanza_id: String },
    /// The session ended; `reason` names why (`"noconn"`, `"timeout"`, a
    /// peer-supplied `<reason/>` keyword, ...).
    Terminated { reason: String },
    /// The session has reached its terminal state and must not be used
    /// again.
    Destroy,
}

impl JingleEvent {
    /// True for events the application must acknowledge with
    /// `Session::event_terminated` before `get_event` will produce another.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JingleEvent::Terminated { .. } | JingleEvent::Destroy)
    }
}
