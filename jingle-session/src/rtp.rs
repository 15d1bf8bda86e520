// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `<description xmlns="urn:xmpp:jingle:apps:rtp:1"/>` and its children
//! (XEP-0167), plus SRTP `<crypto/>` (XEP-0167 §6 / RFC 4568 style).
//!
//! Parsed by hand rather than via `xso` derive: unlike
//! `xmpp_parsers::jingle_rtp::Description`, [`RtpMediaList`] keeps two
//! separate candidate crypto lists (local, offered by us; remote, offered by
//! the peer) that are populated asymmetrically — `to_xml` only ever emits
//! `crypto_local`, `from_xml` only ever fills `crypto_remote` — a shape the
//! derive macro has no attribute for.

use minidom::Element;

use crate::error::{DefinedCondition, ProtocolError};
use crate::ns;

/// What kind of media a content's description names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Media {
    Audio,
    Video,
    /// The content had no `<description/>` at all.
    Missing,
    /// The content had a `<description/>` in an unrecognized namespace.
    Unknown,
}

impl Media {
    fn parse(s: &str) -> Media {
        match s {
            "audio" => Media::Audio,
            "video" => Media::Video,
            _ => Media::Unknown,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Media::Audio => "audio",
            Media::Video => "video",
            Media::Missing | Media::Unknown => "",
        }
    }
}

/// One `<parameter name=.. value=../>` of a payload-type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// One `<payload-type/>` of an RTP description.
#[derive(Debug, Clone, PartialEq)]
pub struct RtpMedia {
    pub id: u8,
    pub name: Option<String>,
    pub clockrate: Option<u32>,
    pub channels: u8,
    /// The application's own name for this payload type, if it maps the
    /// wire id onto a locally-known codec. Never read from or written to
    /// the wire; purely a convenience the caller may set after `from_xml`.
    pub synonym: Option<String>,
    pub parameters: Vec<Parameter>,
}

impl RtpMedia {
    pub fn new(id: u8, name: impl Into<String>, clockrate: u32, channels: u8) -> Self {
        RtpMedia {
            id,
            name: Some(name.into()),
            clockrate: Some(clockrate),
            channels,
            synonym: None,
            parameters: Vec::new(),
        }
    }

    fn from_xml(elem: &Element) -> Result<RtpMedia, ProtocolError> {
        let id = elem
            .attr("id")
            .ok_or_else(|| {
                ProtocolError::soft(DefinedCondition::NotAcceptable, "payload-type missing id")
            })?
            .parse::<u8>()
            .map_err(|_| {
                ProtocolError::soft(DefinedCondition::NotAcceptable, "payload-type id not a u8")
            })?;
        let channels = match elem.attr("channels") {
            Some(v) => v.parse::<u8>().unwrap_or(1),
            None => 1,
        };
        let clockrate = elem.attr("clockrate").and_then(|v| v.parse::<u32>().ok());
        let name = elem.attr("name").map(str::to_owned);
        let mut parameters = Vec::new();
        for child in elem.children() {
            if child.is("parameter", ns::JINGLE_RTP) {
                if let (Some(name), Some(value)) = (child.attr("name"), child.attr("value")) {
                    parameters.push(Parameter {
                        name: name.to_owned(),
                        value: value.to_owned(),
                    });
                }
            }
        }
        Ok(RtpMedia {
            id,
            name,
            clockrate,
            channels,
            synonym: None,
            parameters,
        })
    }

    fn to_xml(&self) -> Element {
        let mut builder = Element::builder("payload-type", ns::JINGLE_RTP)
            .attr("id", self.id.to_string())
            .attr("channels", self.channels.to_string());
        if let Some(clockrate) = self.clockrate {
            builder = builder.attr("clockrate", clockrate.to_string());
        }
        if let Some(name) = &self.name {
            builder = builder.attr("name", name.clone());
        }
        builder = builder.append_all(self.parameters.iter().map(|p| {
            Element::builder("parameter", ns::JINGLE_RTP)
                .attr("name", p.name.clone())
                .attr("value", p.value.clone())
                .build()
        }));
        builder.build()
    }
}

/// One `<crypto/>` element (SRTP key material for a content).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crypto {
    pub tag: String,
    pub crypto_suite: String,
    pub key_params: String,
    pub session_params: Option<String>,
}

impl Crypto {
    fn from_xml(elem: &Element) -> Result<Crypto, ProtocolError> {
        let bad = || ProtocolError::soft(DefinedCondition::NotAcceptable, "invalid crypto element");
        Ok(Crypto {
            tag: elem.attr("tag").ok_or_else(bad)?.to_owned(),
            crypto_suite: elem.attr("crypto-suite").ok_or_else(bad)?.to_owned(),
            key_params: elem.attr("key-params").ok_or_else(bad)?.to_owned(),
            session_params: elem.attr("session-params").map(str::to_owned),
        })
    }

    fn to_xml(&self) -> Element {
        let mut builder = Element::builder("crypto", ns::JINGLE_RTP)
            .attr("tag", self.tag.clone())
            .attr("crypto-suite", self.crypto_suite.clone())
            .attr("key-params", self.key_params.clone());
        if let Some(sp) = &self.session_params {
            builder = builder.attr("session-params", sp.clone());
        }
        builder.build()
    }
}

/// The parsed contents of a content's `<description/>`.
#[derive(Debug, Clone, PartialEq)]
pub struct RtpMediaList {
    pub media: Media,
    pub ssrc: Option<String>,
    pub payload_types: Vec<RtpMedia>,
    pub crypto_mandatory: bool,
    /// Offered by us; only ever populated by the application, emitted by
    /// `to_xml`.
    pub crypto_local: Vec<Crypto>,
    /// Offered by the peer; only ever populated by `from_xml`.
    pub crypto_remote: Vec<Crypto>,
}

impl RtpMediaList {
    pub fn new(media: Media) -> Self {
        RtpMediaList {
            media,
            ssrc: None,
            payload_types: Vec::new(),
            crypto_mandatory: false,
            crypto_local: Vec::new(),
            crypto_remote: Vec::new(),
        }
    }

    pub fn missing() -> Self {
        RtpMediaList::new(Media::Missing)
    }

    /// Parses a `<description/>` child, if the content had one.
    ///
    /// `None` means there was no `<description/>` at all (`Media::Missing`).
    pub fn from_xml(elem: Option<&Element>) -> Result<RtpMediaList, ProtocolError> {
        let elem = match elem {
            None => return Ok(RtpMediaList::missing()),
            Some(elem) => elem,
        };
        if !elem.has_ns(ns::JINGLE_RTP) {
            return Ok(RtpMediaList::new(Media::Unknown));
        }
        let media = Media::parse(elem.attr("media").unwrap_or(""));
        let ssrc = elem.attr("ssrc").map(str::to_owned);
        let mut payload_types = Vec::new();
        let mut crypto_mandatory = false;
        let mut crypto_remote = Vec::new();
        for child in elem.children() {
            if child.is("payload-type", ns::JINGLE_RTP) {
                payload_types.push(RtpMedia::from_xml(child)?);
            } else if child.is("crypto", ns::JINGLE_RTP) {
                crypto_remote.push(Crypto::from_xml(child)?);
            } else if child.is("crypto-required", ns::JINGLE_RTP) {
                crypto_mandatory = true;
            }
        }
        Ok(RtpMediaList {
            media,
            ssrc,
            payload_types,
            crypto_mandatory,
            crypto_local: Vec::new(),
            crypto_remote,
        })
    }

    /// Builds the `<description/>` element to emit, or `None` when this
    /// content carries no description (`content-reject`/`content-remove`
    /// or a content whose media is `Missing`/`Unknown`).
    pub fn to_xml(&self) -> Option<Element> {
        match self.media {
            Media::Missing | Media::Unknown => return None,
            _ => {}
        }
        let mut builder =
            Element::builder("description", ns::JINGLE_RTP).attr("media", self.media.as_str());
        if let Some(ssrc) = &self.ssrc {
            builder = builder.attr("ssrc", ssrc.clone());
        }
        builder = builder.append_all(self.payload_types.iter().map(RtpMedia::to_xml));
        if self.crypto_mandatory {
            builder = builder.append(Element::builder("crypto-required", ns::JINGLE_RTP).build());
        }
        builder = builder.append_all(self.crypto_local.iter().map(Crypto::to_xml));
        Some(builder.build())
    }
}
