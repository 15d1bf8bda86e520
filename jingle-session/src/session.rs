// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The per-call state machine: identity, lifecycle, stanza emission, and the
//! `get_event`/`accept_event` pair that ties it to the engine.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use jid::Jid;
use log::{debug, trace, warn};
use minidom::Element;

use crate::action::{ActionKind, Reason, WireAction};
use crate::content::SessionContent;
use crate::error::{DefinedCondition, ErrorType, ProtocolError, SendError, SessionError};
use crate::events::{EventQueue, JingleEvent, RawEvent, ResultPayload};
use crate::ns;
use crate::pending::PendingTable;
use crate::stream::SessionStream;

/// Which side of the negotiation this process is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// The session lifecycle. Monotonic: once in `Destroy`, a session never
/// leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Pending,
    Active,
    Ending,
    Destroy,
}

struct Inner {
    state: State,
    direction: Direction,
    local_jid: Jid,
    remote_jid: Jid,
    sid: String,
    local_sid: String,
    stanza_seq: u64,
    pending: PendingTable,
    events: EventQueue,
    last_event_pending_ack: bool,
    stanza_timeout: Duration,
}

/// A single Jingle call.
pub struct Session {
    stream: Arc<dyn SessionStream>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a session for an inbound `session-initiate`, in `Idle`. The
    /// engine calls this once it has decided no existing session owns this
    /// `sid`; the session only reaches `Pending` once `get_event` actually
    /// decodes that first stanza successfully (a malformed one destroys the
    /// session instead, per the Idle acceptance rule).
    pub(crate) fn new_incoming(
        stream: Arc<dyn SessionStream>,
        local_sid: String,
        sid: String,
        local_jid: Jid,
        remote_jid: Jid,
        stanza_timeout: Duration,
    ) -> Session {
        Session {
            stream,
            inner: Mutex::new(Inner {
                state: State::Idle,
                direction: Direction::Incoming,
                local_jid,
                remote_jid,
                sid,
                local_sid,
                stanza_seq: 0,
                pending: PendingTable::new(),
                events: EventQueue::new(),
                last_event_pending_ack: false,
                stanza_timeout,
            }),
        }
    }

    /// Creates an outgoing session and immediately sends `session-initiate`.
    /// On success the session is `Pending`; on a transport failure it starts
    /// already in `Destroy`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_outgoing(
        stream: Arc<dyn SessionStream>,
        local_sid: String,
        sid: String,
        local_jid: Jid,
        remote_jid: Jid,
        contents: &[SessionContent],
        stanza_timeout: Duration,
    ) -> Arc<Session> {
        let session = Arc::new(Session {
            stream,
            inner: Mutex::new(Inner {
                state: State::Idle,
                direction: Direction::Outgoing,
                local_jid: local_jid.clone(),
                remote_jid: remote_jid.clone(),
                sid: sid.clone(),
                local_sid,
                stanza_seq: 0,
                pending: PendingTable::new(),
                events: EventQueue::new(),
                last_event_pending_ack: false,
                stanza_timeout,
            }),
        });

        let jingle = build_jingle(
            WireAction::SessionInitiate,
            &sid,
            Some(&local_jid),
            None,
            contents,
            |c| c.to_xml(false, true, true, true, true),
        );
        let iq = wrap_iq_set(&local_jid, &remote_jid, &session.next_stanza_id(), jingle);
        match session.stream.send(iq) {
            Ok(()) => {
                let mut inner = session.inner.lock().unwrap();
                inner.state = State::Pending;
                debug!(target: "jingle", "session {} -> Pending (outgoing initiate sent)", sid);
            }
            Err(e) => {
                warn!(target: "jingle", "session {} failed to send initiate: {}", sid, e);
                let mut inner = session.inner.lock().unwrap();
                inner.state = State::Destroy;
            }
        }
        session
    }

    pub fn sid(&self) -> String {
        self.inner.lock().unwrap().sid.clone()
    }

    pub fn local_sid(&self) -> String {
        self.inner.lock().unwrap().local_sid.clone()
    }

    pub fn state(&self) -> State {
        self.inner.lock().unwrap().state
    }

    pub fn direction(&self) -> Direction {
        self.inner.lock().unwrap().direction
    }

    fn next_stanza_id(&self) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.stanza_seq += 1;
        format!("{}_{}", inner.local_sid, inner.stanza_seq)
    }

    fn send_tracked(&self, stanza: Element, id: &str, notify: bool) -> Result<(), SendError> {
        let result = self.stream.send(stanza);
        if result.is_ok() {
            let mut inner = self.inner.lock().unwrap();
            let deadline = Instant::now() + inner.stanza_timeout;
            inner.pending.append(id, deadline, notify);
        }
        result
    }

    /// Accepts a pending incoming session, emitting `session-accept`.
    pub fn accept(&self, contents: &[SessionContent]) -> Result<(), SessionError> {
        let (local_jid, remote_jid, sid, id) = {
            let inner = self.inner.lock().unwrap();
            if inner.direction != Direction::Incoming {
                return Err(SessionError::WrongDirection);
            }
            if inner.state != State::Pending {
                return Err(SessionError::WrongState);
            }
            (
                inner.local_jid.clone(),
                inner.remote_jid.clone(),
                inner.sid.clone(),
                String::new(),
            )
        };
        let id = if id.is_empty() {
            self.next_stanza_id()
        } else {
            id
        };
        let jingle = build_jingle(
            WireAction::SessionAccept,
            &sid,
            None,
            Some(&local_jid),
            contents,
            |c| c.to_xml(false, true, true, true, true),
        );
        let iq = wrap_iq_set(&local_jid, &remote_jid, &id, jingle);
        let _ = self.send_tracked(iq, &id, false);
        let mut inner = self.inner.lock().unwrap();
        inner.state = State::Active;
        debug!(target: "jingle", "session {} -> Active (accepted)", sid);
        Ok(())
    }

    /// Ends the session, emitting `session-terminate` with `reason`.
    pub fn hangup(&self, reason: Reason, text: Option<&str>) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().unwrap();
        self.hangup_locked(&mut inner, reason, text)
    }

    /// Inner form used while the session lock is already held, e.g. from
    /// inside `get_event`'s timeout handling. Splitting this out avoids
    /// needing a reentrant mutex for a lock `get_event` already holds.
    fn hangup_locked(
        &self,
        inner: &mut Inner,
        reason: Reason,
        text: Option<&str>,
    ) -> Result<(), SessionError> {
        if !matches!(inner.state, State::Pending | State::Active) {
            return Err(SessionError::WrongState);
        }
        inner.pending.clear();
        let jingle = Element::builder("jingle", ns::JINGLE)
            .attr("action", WireAction::SessionTerminate.as_str())
            .attr("sid", inner.sid.clone())
            .append(reason_element(reason, text))
            .build();
        inner.stanza_seq += 1;
        let id = format!("{}_{}", inner.local_sid, inner.stanza_seq);
        let iq = wrap_iq_set(&inner.local_jid, &inner.remote_jid, &id, jingle);
        let deadline = Instant::now() + inner.stanza_timeout;
        if self.stream.send(iq).is_ok() {
            inner.pending.append(id, deadline, false);
        }
        inner.state = State::Ending;
        debug!(target: "jingle", "session {} -> Ending (hangup: {})", inner.sid, reason);
        Ok(())
    }

    /// Sends a content/transport verb, per the per-action encoding table.
    pub fn send_content(
        &self,
        action: WireAction,
        contents: &[SessionContent],
        request_notify: bool,
    ) -> Result<String, SessionError> {
        let (add_desc, add_trans, add_candidates, add_auth, minimum) = encoding_flags(action);
        let (local_jid, remote_jid, sid) = {
            let inner = self.inner.lock().unwrap();
            if !matches!(inner.state, State::Pending | State::Active) {
                return Err(SessionError::WrongState);
            }
            (
                inner.local_jid.clone(),
                inner.remote_jid.clone(),
                inner.sid.clone(),
            )
        };
        let jingle = build_jingle(
            action,
            &sid,
            None,
            None,
            contents,
            |c| c.to_xml(minimum, add_desc, add_trans, add_candidates, add_auth),
        );
        let id = self.next_stanza_id();
        let iq = wrap_iq_set(&local_jid, &remote_jid, &id, jingle);
        let _ = self.send_tracked(iq, &id, request_notify);
        Ok(id)
    }

    /// Sends a `session-info` carrying an arbitrary payload (ringing, hold,
    /// active, mute, raw-udp trying/received, ...).
    pub fn send_info(
        &self,
        payload: Element,
        request_notify: bool,
    ) -> Result<String, SessionError> {
        let (local_jid, remote_jid, sid) = {
            let inner = self.inner.lock().unwrap();
            if !matches!(inner.state, State::Pending | State::Active) {
                return Err(SessionError::WrongState);
            }
            (
                inner.local_jid.clone(),
                inner.remote_jid.clone(),
                inner.sid.clone(),
            )
        };
        let jingle = Element::builder("jingle", ns::JINGLE)
            .attr("action", WireAction::SessionInfo.as_str())
            .attr("sid", sid)
            .append(payload)
            .build();
        let id = self.next_stanza_id();
        let iq = wrap_iq_set(&local_jid, &remote_jid, &id, jingle);
        let _ = self.send_tracked(iq, &id, request_notify);
        Ok(id)
    }

    /// Sends one `session-info` with one `<dtmf/>` child per digit.
    ///
    /// Goes around `send_info` rather than through it: a `session-info` can
    /// carry several `<dtmf/>` siblings for one call, while `send_info`
    /// only ever appends a single payload element.
    pub fn send_dtmf(&self, digits: &str, ms_duration: Option<u32>) -> Result<String, SessionError> {
        let children: Vec<Element> = digits
            .chars()
            .map(|d| {
                let mut b = Element::builder("dtmf", ns::JINGLE_DTMF).attr("code", d.to_string());
                if let Some(ms) = ms_duration {
                    b = b.attr("duration", ms.to_string());
                }
                b.build()
            })
            .collect();
        let (local_jid, remote_jid, sid) = {
            let inner = self.inner.lock().unwrap();
            if !matches!(inner.state, State::Pending | State::Active) {
                return Err(SessionError::WrongState);
            }
            (
                inner.local_jid.clone(),
                inner.remote_jid.clone(),
                inner.sid.clone(),
            )
        };
        let jingle = Element::builder("jingle", ns::JINGLE)
            .attr("action", WireAction::SessionInfo.as_str())
            .attr("sid", sid)
            .append_all(children)
            .build();
        let id = self.next_stanza_id();
        let iq = wrap_iq_set(&local_jid, &remote_jid, &id, jingle);
        let _ = self.send_tracked(iq, &id, false);
        Ok(id)
    }

    /// Sends `<transfer/>` (XEP-0251) via `session-info`.
    pub fn send_transfer(&self, to: &Jid, sid: Option<&str>) -> Result<String, SessionError> {
        let mut builder =
            Element::builder("transfer", ns::JINGLE_TRANSFER).attr("to", to.to_string());
        if let Some(sid) = sid {
            builder = builder.attr("sid", sid.to_owned());
        }
        self.send_info(builder.build(), false)
    }

    /// Answers a previously received `<iq/>`: `iq/result` when `error` is
    /// `None`, otherwise `iq/error`. Always fire-and-forget.
    pub fn confirm(
        &self,
        received_id: Option<&str>,
        received: Option<&Element>,
        error: Option<(ErrorType, DefinedCondition, Option<&str>)>,
    ) {
        let (local_jid, remote_jid) = {
            let inner = self.inner.lock().unwrap();
            (inner.local_jid.clone(), inner.remote_jid.clone())
        };
        let response = match error {
            None => {
                let mut builder = Element::builder("iq", "jabber:client").attr("type", "result");
                if let Some(id) = received_id {
                    builder = builder.attr("id", id);
                } else if let Some(orig) = received {
                    builder = builder.append(orig.clone());
                }
                builder
                    .attr("from", local_jid.to_string())
                    .attr("to", remote_jid.to_string())
                    .build()
            }
            Some((type_, condition, text)) => {
                let mut error_builder =
                    Element::builder("error", "jabber:client").attr("type", type_.as_str());
                error_builder = error_builder
                    .append(Element::builder(condition.as_str(), ns::XMPP_STANZAS).build());
                if let Some(text) = text {
                    error_builder = error_builder.append(
                        Element::builder("text", ns::XMPP_STANZAS)
                            .append(text)
                            .build(),
                    );
                }
                let mut builder = Element::builder("iq", "jabber:client")
                    .attr("type", "error")
                    .append(error_builder.build());
                if let Some(id) = received_id {
                    builder = builder.attr("id", id);
                } else if let Some(orig) = received {
                    builder = builder.append(orig.clone());
                }
                builder
                    .attr("from", local_jid.to_string())
                    .attr("to", remote_jid.to_string())
                    .build()
            }
        };
        let _ = self.stream.send(response);
    }

    /// Addressing filter run on every inbound event before it is queued.
    /// Returns whether the event was accepted.
    pub fn accept_event(&self, event: RawEvent, sid_hint: Option<&str>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let accepted = match &event {
            RawEvent::Terminated | RawEvent::Destroyed => match sid_hint {
                Some(sid) => sid == inner.sid,
                None => true,
            },
            RawEvent::JingleSet {
                stanza_id, from, to, ..
            } => {
                addressed_to_us(&inner, from, to)
                    && match sid_hint {
                        Some(sid) => sid == inner.sid,
                        None => stanza_id
                            .as_deref()
                            .map(|id| id.starts_with(&inner.local_sid))
                            .unwrap_or(false),
                    }
            }
            RawEvent::Result {
                stanza_id, from, to, ..
            } => addressed_to_us(&inner, from, to) && stanza_id.starts_with(&inner.local_sid),
            RawEvent::WriteFail { stanza_id } => stanza_id.starts_with(&inner.local_sid),
        };
        if accepted {
            trace!(target: "jingle", "session {} accepted event {:?}", inner.sid, event);
            inner.events.push(event);
        }
        accepted
    }

    /// Must be called by the application once it has finished reacting to a
    /// terminal event (`Terminated`/`Destroy`), so `get_event` may continue.
    pub fn event_terminated(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_event_pending_ack = false;
    }

    /// The cooperative tick: decodes the next queued event, if any, applies
    /// state-machine rules, and returns the resulting application-visible
    /// event, if any.
    pub fn get_event(&self, now: Instant) -> Option<JingleEvent> {
        let mut inner = self.inner.lock().unwrap();
        if inner.last_event_pending_ack {
            return None;
        }
        if inner.state == State::Destroy {
            return None;
        }

        while let Some(raw) = inner.events.pop() {
            match raw {
                RawEvent::Terminated => {
                    return self.finish(&mut inner, JingleEvent::Terminated {
                        reason: "noconn".into(),
                    });
                }
                RawEvent::Destroyed => {
                    return self.finish(&mut inner, JingleEvent::Destroy);
                }
                RawEvent::WriteFail { stanza_id } => {
                    if let Some(entry) = inner.pending.match_and_remove(&stanza_id) {
                        if let Some(event) = self.handle_response_outcome(
                            &mut inner,
                            entry.notify,
                            ResultOutcome::WriteFail,
                            &stanza_id,
                        ) {
                            return Some(event);
                        }
                    }
                }
                RawEvent::Result {
                    stanza_id, payload, ..
                } => {
                    if let Some(entry) = inner.pending.match_and_remove(&stanza_id) {
                        let outcome = match payload {
                            ResultPayload::Ok => ResultOutcome::Ok,
                            ResultPayload::Error { condition, text } => {
                                ResultOutcome::Error { condition, text }
                            }
                        };
                        if let Some(event) =
                            self.handle_response_outcome(&mut inner, entry.notify, outcome, &stanza_id)
                        {
                            return Some(event);
                        }
                    }
                }
                RawEvent::JingleSet {
                    stanza_id, jingle, ..
                } => {
                    if let Some(event) = self.handle_jingle_set(&mut inner, stanza_id, jingle) {
                        return Some(event);
                    }
                }
            }
        }

        if let Some(entry) = inner.pending.head_if_expired(now) {
            let outcome = if entry.notify {
                JingleEvent::ResultTimeout {
                    stanza_id: entry.id,
                }
            } else {
                let _ = self.hangup_locked(&mut inner, Reason::ConnectivityError, Some("Timeout"));
                return self.finish(&mut inner, JingleEvent::Terminated {
                    reason: "timeout".into(),
                });
            };
            return Some(outcome);
        }

        None
    }

    fn finish(&self, inner: &mut Inner, event: JingleEvent) -> Option<JingleEvent> {
        inner.state = State::Destroy;
        inner.pending.clear();
        inner.last_event_pending_ack = true;
        self.stream.forget(&inner.local_sid);
        debug!(target: "jingle", "session {} -> Destroy", inner.sid);
        Some(event)
    }

    fn handle_response_outcome(
        &self,
        inner: &mut Inner,
        notify: bool,
        outcome: ResultOutcome,
        stanza_id: &str,
    ) -> Option<JingleEvent> {
        if inner.state == State::Ending {
            return self.finish(inner, JingleEvent::Destroy);
        }
        if inner.state == State::Pending
            && inner.direction == Direction::Outgoing
            && matches!(outcome, ResultOutcome::Error { .. } | ResultOutcome::WriteFail)
            && !notify
        {
            return self.finish(inner, JingleEvent::Terminated {
                reason: "declined".into(),
            });
        }
        if !notify {
            return None;
        }
        Some(match outcome {
            ResultOutcome::Ok => JingleEvent::ResultOk {
                stanza_id: stanza_id.to_owned(),
            },
            ResultOutcome::Error { condition, text } => JingleEvent::ResultError {
                stanza_id: stanza_id.to_owned(),
                condition,
                text,
            },
            ResultOutcome::WriteFail => JingleEvent::ResultWriteFail {
                stanza_id: stanza_id.to_owned(),
            },
        })
    }

    fn handle_jingle_set(
        &self,
        inner: &mut Inner,
        stanza_id: Option<String>,
        jingle: Element,
    ) -> Option<JingleEvent> {
        match decode_jingle(&jingle, inner.state, inner.direction) {
            Ok(Decoded::Ping) => {
                self.confirm(stanza_id.as_deref(), None, None);
                None
            }
            Ok(Decoded::Terminate { reason, text }) => {
                self.confirm(stanza_id.as_deref(), None, None);
                Some(
                    self.finish(inner, JingleEvent::Terminated {
                        reason: format!("{}{}", reason, text.map(|t| format!(": {t}")).unwrap_or_default()),
                    })
                    .unwrap(),
                )
            }
            Ok(Decoded::Action {
                kind,
                contents,
                info_text,
                needs_confirm,
                responder,
            }) => {
                // XEP-0166 §7.2.6: the responder named in `session-accept`
                // may be a different resource than the one that sent the
                // stanza; route subsequent stanzas there.
                if kind == ActionKind::Wire(WireAction::SessionAccept)
                    && inner.direction == Direction::Outgoing
                {
                    if let Some(responder) = responder {
                        if responder != inner.remote_jid {
                            debug!(
                                target: "jingle",
                                "session {} responder substitution {} -> {}",
                                inner.sid, inner.remote_jid, responder
                            );
                            inner.remote_jid = responder;
                        }
                    }
                }
                apply_state_transition(inner, kind);
                if needs_confirm {
                    let id = stanza_id.clone();
                    Some(JingleEvent::Action {
                        kind,
                        contents,
                        info_text,
                        pending_reply_to: id,
                    })
                } else {
                    self.confirm(stanza_id.as_deref(), None, None);
                    Some(JingleEvent::Action {
                        kind,
                        contents,
                        info_text,
                        pending_reply_to: None,
                    })
                }
            }
            Err(err) => {
                warn!(target: "jingle", "session {} rejecting stanza: {}", inner.sid, err);
                self.confirm(
                    stanza_id.as_deref(),
                    None,
                    Some((err.condition.default_type(), err.condition, err.text.as_deref())),
                );
                if err.fatal && inner.state == State::Idle {
                    Some(self.finish(inner, JingleEvent::Destroy).unwrap())
                } else {
                    None
                }
            }
        }
    }
}

enum ResultOutcome {
    Ok,
    Error {
        condition: String,
        text: Option<String>,
    },
    WriteFail,
}

fn addressed_to_us(inner: &Inner, from: &Jid, to: &Jid) -> bool {
    *from == inner.remote_jid && *to == inner.local_jid
}

/// Per-action table controlling what `SessionContent::to_xml` emits; see the
/// encoding table in the design notes.
fn encoding_flags(action: WireAction) -> (bool, bool, bool, bool, bool) {
    // (add_desc, add_trans, add_candidates, add_auth, minimum)
    match action {
        WireAction::ContentAdd => (true, true, true, true, false),
        WireAction::TransportInfo => (false, true, true, true, false),
        WireAction::TransportReplace => (true, true, false, true, false),
        WireAction::TransportAccept | WireAction::TransportReject => (true, true, false, false, false),
        WireAction::ContentAccept | WireAction::ContentModify => (true, true, false, false, false),
        WireAction::ContentReject | WireAction::ContentRemove => (false, false, false, false, true),
        WireAction::SessionAccept | WireAction::SessionInitiate => (true, true, true, true, false),
        WireAction::SessionInfo | WireAction::SessionTerminate => (false, false, false, false, true),
    }
}

fn build_jingle(
    action: WireAction,
    sid: &str,
    initiator: Option<&Jid>,
    responder: Option<&Jid>,
    contents: &[SessionContent],
    to_xml: impl Fn(&SessionContent) -> Element,
) -> Element {
    let mut builder = Element::builder("jingle", ns::JINGLE)
        .attr("action", action.as_str())
        .attr("sid", sid.to_owned());
    if let Some(initiator) = initiator {
        builder = builder.attr("initiator", initiator.to_string());
    }
    if let Some(responder) = responder {
        builder = builder.attr("responder", responder.to_string());
    }
    builder = builder.append_all(contents.iter().map(to_xml));
    builder.build()
}

fn reason_element(reason: Reason, text: Option<&str>) -> Element {
    let mut builder = Element::builder("reason", ns::JINGLE)
        .append(Element::builder(reason.as_str(), ns::JINGLE).build());
    if let Some(text) = text {
        builder = builder.append(Element::builder("text", ns::JINGLE).append(text).build());
    }
    builder.build()
}

fn wrap_iq_set(from: &Jid, to: &Jid, id: &str, jingle: Element) -> Element {
    Element::builder("iq", "jabber:client")
        .attr("from", from.to_string())
        .attr("to", to.to_string())
        .attr("id", id.to_owned())
        .attr("type", "set")
        .append(jingle)
        .build()
}

enum Decoded {
    Ping,
    Terminate {
        reason: String,
        text: Option<String>,
    },
    Action {
        kind: ActionKind,
        contents: Vec<SessionContent>,
        info_text: Option<String>,
        needs_confirm: bool,
        /// The stanza's `responder` attribute, if present. Only meaningful
        /// on `session-accept`, where XEP-0166 §7.2.6 allows the responder
        /// to name a resource other than the one that will actually carry
        /// the call.
        responder: Option<Jid>,
    },
}

/// Parses a `<jingle/>` element and validates the action against the current
/// state, per the action-acceptance table.
fn decode_jingle(
    jingle: &Element,
    state: State,
    direction: Direction,
) -> Result<Decoded, ProtocolError> {
    let action_str = jingle.attr("action").ok_or_else(|| {
        ProtocolError::new(DefinedCondition::BadRequest, "jingle missing action")
    })?;
    let action: WireAction = action_str.parse()?;

    check_state_allows(state, direction, action)?;

    match action {
        WireAction::SessionTerminate => {
            let reason_elem = jingle.children().find(|c| c.name() == "reason");
            let (reason, text) = match reason_elem {
                Some(r) => {
                    let keyword = r
                        .children()
                        .find(|c| c.name() != "text")
                        .map(|c| c.name().to_owned())
                        .unwrap_or_else(|| "success".to_owned());
                    let text = r
                        .children()
                        .find(|c| c.name() == "text")
                        .map(|c| c.text());
                    (keyword, text)
                }
                None => ("success".to_owned(), None),
            };
            Ok(Decoded::Terminate { reason, text })
        }
        WireAction::SessionInfo => decode_session_info(jingle, state),
        _ => {
            let mut contents = Vec::new();
            for child in jingle.children().filter(|c| c.name() == "content") {
                match SessionContent::from_xml(child) {
                    Ok(content) => contents.push(content),
                    Err(e) if e.fatal => return Err(e),
                    Err(_) => continue,
                }
            }
            let needs_confirm = matches!(
                action,
                WireAction::SessionInitiate
                    | WireAction::ContentAdd
                    | WireAction::ContentAccept
                    | WireAction::ContentModify
                    | WireAction::ContentReject
                    | WireAction::ContentRemove
                    | WireAction::TransportInfo
                    | WireAction::TransportAccept
                    | WireAction::TransportReject
                    | WireAction::TransportReplace
            );
            let responder = jingle.attr("responder").and_then(|v| v.parse().ok());
            Ok(Decoded::Action {
                kind: ActionKind::Wire(action),
                contents,
                info_text: None,
                needs_confirm,
                responder,
            })
        }
    }
}

fn decode_session_info(jingle: &Element, state: State) -> Result<Decoded, ProtocolError> {
    let children: Vec<&Element> = jingle.children().collect();
    if children.is_empty() {
        return Ok(Decoded::Ping);
    }
    if children.iter().all(|c| c.name() == "dtmf") {
        if !children[0].has_ns(ns::JINGLE_DTMF) {
            return Err(ProtocolError::new(
                DefinedCondition::FeatureNotImplemented,
                "unknown dtmf namespace",
            ));
        }
        let digits: String = children.iter().filter_map(|c| c.attr("code")).collect();
        if digits.is_empty() {
            return Err(ProtocolError::new(DefinedCondition::BadRequest, "empty dtmf"));
        }
        return Ok(Decoded::Action {
            kind: ActionKind::Dtmf,
            contents: Vec::new(),
            info_text: Some(digits),
            needs_confirm: false,
            responder: None,
        });
    }
    let child = children[0];
    let kind = if child.is("transfer", ns::JINGLE_TRANSFER) {
        ActionKind::Transfer
    } else if child.is("hold", ns::JINGLE_RTP_INFO) {
        ActionKind::Hold
    } else if child.is("active", ns::JINGLE_RTP_INFO) {
        ActionKind::Active
    } else if child.is("mute", ns::JINGLE_RTP_INFO) {
        ActionKind::Mute
    } else if child.is("ringing", ns::JINGLE_RTP_INFO) {
        ActionKind::Ringing
    } else if child.is("trying", ns::JINGLE_RAW_UDP_INFO) {
        ActionKind::Trying
    } else if child.is("received", ns::JINGLE_RAW_UDP_INFO) {
        ActionKind::Received
    } else {
        return Err(ProtocolError::new(
            DefinedCondition::FeatureNotImplemented,
            "unrecognized session-info payload",
        ));
    };
    if kind == ActionKind::Ringing && state == State::Active {
        return Err(ProtocolError::new(
            DefinedCondition::BadRequest,
            "ringing is not valid once the session is active",
        ));
    }
    // Transfer/hold/active/mute/ringing/trying/received all need the
    // application to confirm them itself; only a bare DTMF report (handled
    // above) is auto-acked.
    let needs_confirm = true;
    Ok(Decoded::Action {
        kind,
        contents: Vec::new(),
        info_text: None,
        needs_confirm,
        responder: None,
    })
}

fn check_state_allows(
    state: State,
    direction: Direction,
    action: WireAction,
) -> Result<(), ProtocolError> {
    let allowed = match state {
        State::Idle => {
            matches!(action, WireAction::SessionInitiate) && direction == Direction::Incoming
        }
        State::Pending => match action {
            WireAction::SessionInitiate => false,
            // We only ever receive a `session-accept` on a session we started.
            WireAction::SessionAccept => direction == Direction::Outgoing,
            _ => true,
        },
        State::Active => !matches!(
            action,
            WireAction::SessionAccept | WireAction::SessionInitiate
        ),
        State::Ending | State::Destroy => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(ProtocolError::new(
            DefinedCondition::BadRequest,
            "action not valid in current state",
        ))
    }
}

fn apply_state_transition(inner: &mut Inner, kind: ActionKind) {
    if inner.state == State::Idle && matches!(kind, ActionKind::Wire(WireAction::SessionInitiate)) {
        inner.state = State::Pending;
    } else if inner.state == State::Pending
        && inner.direction == Direction::Outgoing
        && matches!(kind, ActionKind::Wire(WireAction::SessionAccept))
    {
        inner.state = State::Active;
    }
}
