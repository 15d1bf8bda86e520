// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The session registry: id allocation, the stanza-timeout policy, and
//! routing of inbound stream events to the session that owns them.
//!
//! Deliberately thin. It does not touch a socket and does not run a thread;
//! it is a table plus the addressing heuristic described in the session
//! engine's design, with [`Session::accept_event`] doing the final check.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jid::Jid;
use log::debug;
use minidom::Element;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::content::SessionContent;
use crate::events::RawEvent;
use crate::session::Session;
use crate::stream::SessionStream;

/// The default deadline a sent stanza is given before it times out, absent a
/// caller-supplied override.
pub const DEFAULT_STANZA_TIMEOUT: Duration = Duration::from_secs(60);

/// Owns the live sessions for one process and dispatches inbound stream
/// events to them.
///
/// Creation and destruction of a session acquire the session's own lock
/// only after releasing the registry lock (see the crate's concurrency
/// notes): `dispatch` never holds the registry mutex while calling into a
/// session.
pub struct Engine {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
    stanza_timeout: Duration,
    local_sid_counter: AtomicU64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("Engine")
            .field("sessions", &self.sessions.lock().unwrap().len())
            .field("stanza_timeout", &self.stanza_timeout)
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(DEFAULT_STANZA_TIMEOUT)
    }
}

impl Engine {
    /// Creates an engine with no sessions and the given stanza timeout.
    pub fn new(stanza_timeout: Duration) -> Engine {
        Engine {
            sessions: Mutex::new(HashMap::new()),
            stanza_timeout,
            local_sid_counter: AtomicU64::new(0),
        }
    }

    /// The deadline added to `now` when a stanza requesting correlation is
    /// sent.
    pub fn stanza_timeout(&self) -> Duration {
        self.stanza_timeout
    }

    /// Allocates a process-unique id: a random alphanumeric token followed
    /// by a monotonically increasing counter, so two ids minted in the same
    /// instant still differ.
    pub fn create_session_id(&self) -> String {
        let counter = self.local_sid_counter.fetch_add(1, Ordering::Relaxed);
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        format!("{token}{counter}")
    }

    /// Registers a session under its peer-visible `sid`. Exposed so an
    /// embedder constructing sessions directly (rather than through
    /// [`Engine::start_outgoing`]) can still make them reachable by
    /// `dispatch`.
    pub fn sessions_add(&self, sid: String, session: Arc<Session>) {
        self.sessions.lock().unwrap().insert(sid, session);
    }

    /// Removes a session from the registry, returning it if present. The
    /// application calls this once it has observed a session's
    /// `JingleEvent::Destroy` and acknowledged it.
    pub fn sessions_remove(&self, sid: &str) -> Option<Arc<Session>> {
        self.sessions.lock().unwrap().remove(sid)
    }

    /// Looks up a live session by its peer-visible `sid`.
    pub fn session(&self, sid: &str) -> Option<Arc<Session>> {
        self.sessions.lock().unwrap().get(sid).cloned()
    }

    /// The number of sessions currently registered.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Starts an outgoing call: allocates a session id, optionally sends a
    /// plain chat `<message/>` first, then emits `session-initiate`.
    /// Registers the resulting session before returning it.
    pub fn start_outgoing(
        &self,
        stream: Arc<dyn SessionStream>,
        caller: Jid,
        callee: Jid,
        contents: &[SessionContent],
        chat_message: Option<&str>,
    ) -> Arc<Session> {
        let sid = self.create_session_id();
        if let Some(body) = chat_message {
            let message = Element::builder("message", "jabber:client")
                .attr("from", caller.to_string())
                .attr("to", callee.to_string())
                .attr("type", "chat")
                .append(Element::builder("body", "jabber:client").append(body).build())
                .build();
            let _ = stream.send(message);
        }
        let session = Session::new_outgoing(
            stream,
            sid.clone(),
            sid.clone(),
            caller,
            callee,
            contents,
            self.stanza_timeout,
        );
        debug!(target: "jingle", "engine registered outgoing session {}", sid);
        self.sessions.lock().unwrap().insert(sid, session.clone());
        session
    }

    /// Routes one inbound stream event to the session that owns it,
    /// creating a new incoming session first if this is a `session-initiate`
    /// for a `sid` nobody has yet. Returns whether some session accepted the
    /// event.
    ///
    /// Preference order: a session whose `sid` matches the `<jingle sid=.../>`
    /// attribute, then (for responses and stanzas with no recognized `sid`) a
    /// session whose `local_sid` prefixes the stanza id. Connection-wide
    /// `Terminated`/`Destroyed` events are broadcast to every registered
    /// session. In every case [`Session::accept_event`] makes the final
    /// addressing decision.
    pub fn dispatch(&self, event: RawEvent, stream: &Arc<dyn SessionStream>) -> bool {
        enum Target {
            Existing(String),
            NewIncoming { sid: String, to: Jid, from: Jid },
            Prefix(String),
            Broadcast,
            None,
        }

        let target = match &event {
            RawEvent::JingleSet {
                jingle,
                from,
                to,
                stanza_id,
            } => match jingle.attr("sid") {
                Some(sid) if self.sessions.lock().unwrap().contains_key(sid) => {
                    Target::Existing(sid.to_owned())
                }
                Some(sid) if jingle.attr("action") == Some("session-initiate") => {
                    Target::NewIncoming {
                        sid: sid.to_owned(),
                        to: to.clone(),
                        from: from.clone(),
                    }
                }
                _ => match stanza_id {
                    Some(id) => Target::Prefix(id.clone()),
                    None => Target::None,
                },
            },
            RawEvent::Result { stanza_id, .. } => Target::Prefix(stanza_id.clone()),
            RawEvent::WriteFail { stanza_id } => Target::Prefix(stanza_id.clone()),
            RawEvent::Terminated | RawEvent::Destroyed => Target::Broadcast,
        };

        match target {
            Target::Existing(sid) => match self.session(&sid) {
                Some(session) => session.accept_event(event, Some(&sid)),
                None => false,
            },
            Target::NewIncoming { sid, to, from } => {
                let local_sid = self.create_session_id();
                debug!(
                    target: "jingle",
                    "engine creating incoming session sid={} local_sid={}", sid, local_sid
                );
                let session = Arc::new(Session::new_incoming(
                    stream.clone(),
                    local_sid,
                    sid.clone(),
                    to,
                    from,
                    self.stanza_timeout,
                ));
                self.sessions.lock().unwrap().insert(sid.clone(), session.clone());
                session.accept_event(event, Some(&sid))
            }
            Target::Prefix(id) => match self.find_by_local_sid_prefix(&id) {
                Some(session) => session.accept_event(event, None),
                None => false,
            },
            Target::Broadcast => {
                let sessions: Vec<Arc<Session>> =
                    self.sessions.lock().unwrap().values().cloned().collect();
                let mut any = false;
                for session in sessions {
                    any |= session.accept_event(event.clone(), None);
                }
                any
            }
            Target::None => false,
        }
    }

    fn find_by_local_sid_prefix(&self, stanza_id: &str) -> Option<Arc<Session>> {
        self.sessions
            .lock()
            .unwrap()
            .values()
            .find(|session| stanza_id.starts_with(&session.local_sid()))
            .cloned()
    }
}
