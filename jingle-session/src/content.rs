// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `<content/>`, the per-stream negotiation unit inside a `<jingle/>`
//! element.
//!
//! `SessionContent::to_xml` takes the same flag set the original action
//! encoding table (see `crate::codec`) needs to honour per action: whether to
//! emit a minimal content (no description/transport at all, used by
//! `content-reject`/`content-remove`), and independently whether to include
//! the description, the transport, its candidates, and its ICE
//! password/ufrag. `xso`'s derive macros have no notion of a caller-supplied
//! flag changing which children are serialized, so this, like
//! `xmpp_parsers::jingle_message::JingleMI`, is a hand-written
//! `Element::builder` encoder paired with a manual decoder.

use minidom::Element;

use crate::action::{Creator, Disposition, Senders};
use crate::error::{DefinedCondition, ProtocolError};
use crate::ns;
use crate::rtp::RtpMediaList;
use crate::candidate::RtpCandidates;

/// One negotiated media stream of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContent {
    pub name: String,
    pub creator: Creator,
    pub senders: Senders,
    pub disposition: Disposition,
    pub rtp_media: RtpMediaList,
    /// What we offer; consulted by `to_xml`.
    pub local_candidates: RtpCandidates,
    /// What the peer sent; populated by `from_xml`.
    pub remote_candidates: RtpCandidates,
}

impl SessionContent {
    pub fn new(name: impl Into<String>, creator: Creator, rtp_media: RtpMediaList) -> Self {
        SessionContent {
            name: name.into(),
            creator,
            senders: Senders::Both,
            disposition: Disposition::Session,
            rtp_media,
            local_candidates: RtpCandidates::unknown(),
            remote_candidates: RtpCandidates::unknown(),
        }
    }

    pub fn from_xml(elem: &Element) -> Result<SessionContent, ProtocolError> {
        // A missing `name` kills the whole stanza (see the Idle + malformed
        // session-initiate scenario), unlike the other per-content checks
        // below which only drop this one content.
        let name = elem
            .attr("name")
            .ok_or_else(|| {
                ProtocolError::new(DefinedCondition::NotAcceptable, "content missing name")
            })?
            .to_owned();
        let creator = match elem.attr("creator") {
            None => Creator::Initiator,
            Some(v) => v.parse().map_err(|_| {
                ProtocolError::soft(DefinedCondition::NotAcceptable, "content has invalid creator")
            })?,
        };
        let senders = match elem.attr("senders") {
            None => Senders::default(),
            Some(v) => v.parse().map_err(|_| {
                ProtocolError::soft(DefinedCondition::NotAcceptable, "content has invalid senders")
            })?,
        };
        let disposition = elem
            .attr("disposition")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let description = elem.children().find(|c| c.name() == "description");
        let transport = elem.children().find(|c| c.name() == "transport");
        let rtp_media = RtpMediaList::from_xml(description)?;
        let remote_candidates = RtpCandidates::from_xml(transport)?;
        Ok(SessionContent {
            name,
            creator,
            senders,
            disposition,
            rtp_media,
            local_candidates: RtpCandidates::unknown(),
            remote_candidates,
        })
    }

    /// Builds the `<content/>` element for this content.
    ///
    /// `minimum` forces an empty content (name/creator only, used by
    /// `content-reject`/`content-remove`). Otherwise `add_desc`/`add_trans`
    /// gate the respective children, and `add_candidates`/`add_auth` refine
    /// the transport: candidates are included only on `content-add` and
    /// `transport-info`, the ICE `pwd`/`ufrag` only on those plus
    /// `transport-replace`.
    pub fn to_xml(
        &self,
        minimum: bool,
        add_desc: bool,
        add_trans: bool,
        add_candidates: bool,
        add_auth: bool,
    ) -> Element {
        let mut builder = Element::builder("content", ns::JINGLE)
            .attr("name", self.name.clone())
            .attr("creator", self.creator.as_str());
        if !minimum {
            builder = builder.attr("senders", self.senders.as_str());
            if self.disposition != Disposition::Session {
                builder = builder.attr("disposition", self.disposition.as_str());
            }
            if add_desc {
                if let Some(desc) = self.rtp_media.to_xml() {
                    builder = builder.append(desc);
                }
            }
            if add_trans {
                if let Some(trans) = self.local_candidates.to_xml(add_candidates, add_auth) {
                    builder = builder.append(trans);
                }
            }
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtp::Media;

    #[test]
    fn round_trips_a_full_content() {
        let mut content = SessionContent::new(
            "audio-1",
            Creator::Initiator,
            RtpMediaList::new(Media::Audio),
        );
        content
            .rtp_media
            .payload_types
            .push(crate::rtp::RtpMedia::new(0, "PCMU", 8000, 1));

        let elem = content.to_xml(false, true, true, true, true);
        let parsed = SessionContent::from_xml(&elem).unwrap();
        assert_eq!(parsed.name, "audio-1");
        assert_eq!(parsed.rtp_media.media, Media::Audio);
        assert_eq!(parsed.rtp_media.payload_types.len(), 1);
    }

    #[test]
    fn minimum_content_has_no_description_or_transport() {
        let content = SessionContent::new("audio-1", Creator::Initiator, RtpMediaList::missing());
        let elem = content.to_xml(true, true, true, true, true);
        assert!(elem.children().next().is_none());
    }
}
