// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bookkeeping for outgoing stanzas awaiting a response.
//!
//! Mirrors the correlation map `tokio_xmpp::client::iq` keeps for `<iq/>`
//! round trips, specialized to the single-session, insertion-ordered table
//! this engine needs (no cross-session sharing, head-of-line timeout scan).

use std::time::Instant;

/// A stanza this session is waiting on a response for.
#[derive(Debug, Clone)]
pub struct SentStanza {
    pub id: String,
    pub deadline: Instant,
    /// Whether the application asked to be told the outcome via a
    /// `ResultOk`/`ResultError`/`ResultWriteFail`/`ResultTimeout` event, as
    /// opposed to a fire-and-forget send.
    pub notify: bool,
}

/// FIFO table of stanzas sent but not yet answered.
#[derive(Debug, Default)]
pub struct PendingTable {
    entries: Vec<SentStanza>,
}

impl PendingTable {
    pub fn new() -> Self {
        PendingTable::default()
    }

    pub fn append(&mut self, id: impl Into<String>, deadline: Instant, notify: bool) {
        self.entries.push(SentStanza {
            id: id.into(),
            deadline,
            notify,
        });
    }

    /// Removes and returns the entry with this id, if any.
    pub fn match_and_remove(&mut self, id: &str) -> Option<SentStanza> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Removes and returns the oldest entry if its deadline has passed.
    pub fn head_if_expired(&mut self, now: Instant) -> Option<SentStanza> {
        match self.entries.first() {
            Some(head) if head.deadline <= now => Some(self.entries.remove(0)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn match_and_remove_finds_by_id() {
        let mut table = PendingTable::new();
        let now = Instant::now();
        table.append("a_1", now + Duration::from_secs(5), true);
        table.append("a_2", now + Duration::from_secs(5), false);
        let found = table.match_and_remove("a_1").unwrap();
        assert_eq!(found.id, "a_1");
        assert_eq!(table.len(), 1);
        assert!(table.match_and_remove("a_1").is_none());
    }

    #[test]
    fn head_if_expired_only_pops_when_due() {
        let mut table = PendingTable::new();
        let now = Instant::now();
        table.append("a_1", now + Duration::from_secs(10), true);
        assert!(table.head_if_expired(now).is_none());
        assert!(table
            .head_if_expired(now + Duration::from_secs(11))
            .is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn clear_empties_the_table() {
        let mut table = PendingTable::new();
        let now = Instant::now();
        table.append("a_1", now, true);
        table.clear();
        assert!(table.is_empty());
    }
}
