// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Transport candidates: `<transport xmlns="urn:xmpp:jingle:transports:ice-udp:1"/>`
//! (XEP-0176) and `<transport xmlns="urn:xmpp:jingle:transports:raw-udp:1"/>`
//! (XEP-0177).
//!
//! Grounded on `xmpp_parsers::jingle_raw_udp`'s `Transport`/`Candidate`
//! shape; the ICE-UDP sibling module is written the same way since this
//! workspace's copy of `jingle_ice_udp.rs` carries no usable source.

use std::net::IpAddr;

use minidom::Element;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::{DefinedCondition, ProtocolError};
use crate::ns;

/// Which transport method a content's candidates belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    IceUdp,
    RawUdp,
    /// The content had no `<transport/>`, or one in an unrecognized namespace.
    Unknown,
}

/// One ICE-UDP or raw-UDP candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct RtpCandidate {
    /// `id` for raw-udp, `foundation` for ice-udp.
    pub id: String,
    pub component: u32,
    pub generation: u32,
    pub address: IpAddr,
    pub port: u16,
    /// ICE-only fields, `None` on a raw-udp candidate.
    pub network: Option<u32>,
    pub priority: Option<u32>,
    pub protocol: Option<String>,
    pub type_: Option<String>,
}

impl RtpCandidate {
    fn from_xml(elem: &Element, kind: &TransportKind) -> Result<RtpCandidate, ProtocolError> {
        let bad = |msg: &'static str| ProtocolError::soft(DefinedCondition::NotAcceptable, msg);
        let id_attr = if *kind == TransportKind::IceUdp {
            "foundation"
        } else {
            "id"
        };
        let id = elem.attr(id_attr).ok_or_else(|| bad("candidate missing id"))?.to_owned();
        let component = elem
            .attr("component")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| bad("candidate missing component"))?;
        let generation = elem.attr("generation").and_then(|v| v.parse().ok()).unwrap_or(0);
        let address = elem
            .attr("ip")
            .ok_or_else(|| bad("candidate missing ip"))?
            .parse()
            .map_err(|_| bad("candidate ip not parseable"))?;
        let port = elem
            .attr("port")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| bad("candidate missing port"))?;
        let (network, priority, protocol, type_) = if *kind == TransportKind::IceUdp {
            (
                elem.attr("network").and_then(|v| v.parse().ok()),
                elem.attr("priority").and_then(|v| v.parse().ok()),
                elem.attr("protocol").map(str::to_owned),
                elem.attr("type").map(str::to_owned),
            )
        } else {
            (None, None, None, None)
        };
        Ok(RtpCandidate {
            id,
            component,
            generation,
            address,
            port,
            network,
            priority,
            protocol,
            type_,
        })
    }

    fn to_xml(&self, kind: &TransportKind) -> Element {
        let id_attr = if *kind == TransportKind::IceUdp {
            "foundation"
        } else {
            "id"
        };
        let mut builder = Element::builder("candidate", transport_ns(kind))
            .attr(id_attr, self.id.clone())
            .attr("component", self.component.to_string())
            .attr("generation", self.generation.to_string())
            .attr("ip", self.address.to_string())
            .attr("port", self.port.to_string());
        if *kind == TransportKind::IceUdp {
            if let Some(network) = self.network {
                builder = builder.attr("network", network.to_string());
            }
            if let Some(priority) = self.priority {
                builder = builder.attr("priority", priority.to_string());
            }
            if let Some(protocol) = &self.protocol {
                builder = builder.attr("protocol", protocol.clone());
            }
            if let Some(type_) = &self.type_ {
                builder = builder.attr("type", type_.clone());
            }
        }
        builder.build()
    }
}

fn transport_ns(kind: &TransportKind) -> &'static str {
    match kind {
        TransportKind::IceUdp => ns::JINGLE_ICE_UDP,
        TransportKind::RawUdp => ns::JINGLE_RAW_UDP,
        TransportKind::Unknown => ns::JINGLE_RAW_UDP,
    }
}

/// The parsed contents of a content's `<transport/>`.
#[derive(Debug, Clone, PartialEq)]
pub struct RtpCandidates {
    pub kind: TransportKind,
    /// ICE-UDP only.
    pub password: Option<String>,
    pub ufrag: Option<String>,
    pub candidates: Vec<RtpCandidate>,
}

impl RtpCandidates {
    pub fn new(kind: TransportKind) -> Self {
        RtpCandidates {
            kind,
            password: None,
            ufrag: None,
            candidates: Vec::new(),
        }
    }

    pub fn unknown() -> Self {
        RtpCandidates::new(TransportKind::Unknown)
    }

    pub fn from_xml(elem: Option<&Element>) -> Result<RtpCandidates, ProtocolError> {
        let elem = match elem {
            None => return Ok(RtpCandidates::unknown()),
            Some(elem) => elem,
        };
        let kind = if elem.has_ns(ns::JINGLE_ICE_UDP) {
            TransportKind::IceUdp
        } else if elem.has_ns(ns::JINGLE_RAW_UDP) {
            TransportKind::RawUdp
        } else {
            return Ok(RtpCandidates::unknown());
        };
        let password = elem.attr("pwd").map(str::to_owned);
        let ufrag = elem.attr("ufrag").map(str::to_owned);
        let mut candidates = Vec::new();
        for child in elem.children() {
            if child.name() == "candidate" {
                candidates.push(RtpCandidate::from_xml(child, &kind)?);
            }
        }
        Ok(RtpCandidates {
            kind,
            password,
            ufrag,
            candidates,
        })
    }

    /// `include_candidates` is false for `transport-replace`/`transport-accept`/
    /// `transport-reject`, which only restate the transport method.
    /// `include_auth` controls whether `pwd`/`ufrag` are emitted (only on
    /// `content-add` and `transport-info`, per the per-action table).
    pub fn to_xml(&self, include_candidates: bool, include_auth: bool) -> Option<Element> {
        if self.kind == TransportKind::Unknown {
            return None;
        }
        let mut builder = Element::builder("transport", transport_ns(&self.kind));
        if include_auth && self.kind == TransportKind::IceUdp {
            if let Some(pwd) = &self.password {
                builder = builder.attr("pwd", pwd.clone());
            }
            if let Some(ufrag) = &self.ufrag {
                builder = builder.attr("ufrag", ufrag.clone());
            }
        }
        if include_candidates {
            builder = builder.append_all(self.candidates.iter().map(|c| c.to_xml(&self.kind)));
        }
        Some(builder.build())
    }
}

/// Generates an ICE-UDP `pwd` or `ufrag` token: an alphanumeric string whose
/// length is `max_len` clamped to `[22, 256]` for a password, `[4, 256]`
/// otherwise (RFC 5245 §15.4).
pub fn generate_ice_token(want_password: bool, max_len: usize) -> String {
    let min_len = if want_password { 22 } else { 4 };
    let len = max_len.clamp(min_len, 256);
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ice_token_respects_password_clamp() {
        assert_eq!(generate_ice_token(true, 1).len(), 22);
        assert_eq!(generate_ice_token(true, 1000).len(), 256);
        assert_eq!(generate_ice_token(true, 40).len(), 40);
    }

    #[test]
    fn ice_token_respects_non_password_clamp() {
        assert_eq!(generate_ice_token(false, 0).len(), 4);
        assert_eq!(generate_ice_token(false, 1000).len(), 256);
        assert_eq!(generate_ice_token(false, 16).len(), 16);
    }

    #[test]
    fn round_trips_ice_udp_transport() {
        let mut candidates = RtpCandidates::new(TransportKind::IceUdp);
        candidates.password = Some("somepassword1234567890".into());
        candidates.ufrag = Some("ufrag1".into());
        candidates.candidates.push(RtpCandidate {
            id: "f1".into(),
            component: 1,
            generation: 0,
            address: "192.0.2.1".parse().unwrap(),
            port: 9000,
            network: Some(0),
            priority: Some(2130706431),
            protocol: Some("udp".into()),
            type_: Some("host".into()),
        });
        let elem = candidates.to_xml(true, true).unwrap();
        let parsed = RtpCandidates::from_xml(Some(&elem)).unwrap();
        assert_eq!(parsed, candidates);
    }

    #[test]
    fn unknown_transport_round_trips_to_none() {
        let elem: Element = "<transport xmlns='urn:example:other'/>".parse().unwrap();
        let parsed = RtpCandidates::from_xml(Some(&elem)).unwrap();
        assert_eq!(parsed.kind, TransportKind::Unknown);
        assert!(parsed.to_xml(true, true).is_none());
    }
}
