// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Attribute-like value types shared by the Jingle XML codec: the `action`
//! of a `<jingle/>` element, `creator`/`senders`/`disposition` of a
//! `<content/>`, and the `<reason/>` keyword.
//!
//! These mirror the `generate_attribute!`-produced types elsewhere in the
//! workspace (simple `FromStr`/`Display` wrappers around a fixed token set),
//! hand-written here because that macro is private to its crate.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

macro_rules! token_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:expr),+ $(,)? } $(, default = $default:ident)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();
            fn from_str(s: &str) -> Result<Self, ()> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
                fmt.write_str(self.as_str())
            }
        }

        $(
            impl Default for $name {
                fn default() -> Self { $name::$default }
            }
        )?
    };
}

token_enum! {
    /// Who created the content in question.
    Creator {
        Initiator => "initiator",
        Responder => "responder",
    }, default = Initiator
}

token_enum! {
    /// Who is allowed to send media for this content.
    Senders {
        Both => "both",
        Initiator => "initiator",
        Responder => "responder",
        None => "none",
    }, default = Both
}

token_enum! {
    /// RFC 2183 content disposition, as applied to Jingle content by XEP-0166.
    Disposition {
        Session => "session",
        EarlySession => "early-session",
    }, default = Session
}

token_enum! {
    /// The keyword child of a `<reason/>` element.
    Reason {
        AlternativeSession => "alternative-session",
        Busy => "busy",
        Cancel => "cancel",
        ConnectivityError => "connectivity-error",
        Decline => "decline",
        Expired => "expired",
        FailedApplication => "failed-application",
        FailedTransport => "failed-transport",
        GeneralError => "general-error",
        Gone => "gone",
        IncompatibleParameters => "incompatible-parameters",
        MediaError => "media-error",
        SecurityError => "security-error",
        Success => "success",
        Timeout => "timeout",
        UnsupportedApplications => "unsupported-applications",
        UnsupportedTransports => "unsupported-transports",
    }, default = Success
}

/// The wire-level `type` attribute of `<jingle/>`: the real XEP-0166 action
/// tokens, i.e. the Jingle-set verbs carried as the `<iq>`'s `type="set"`
/// payload's `action` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireAction {
    ContentAccept,
    ContentAdd,
    ContentModify,
    ContentReject,
    ContentRemove,
    SessionAccept,
    SessionInfo,
    SessionInitiate,
    SessionTerminate,
    TransportAccept,
    TransportInfo,
    TransportReject,
    TransportReplace,
}

impl WireAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireAction::ContentAccept => "content-accept",
            WireAction::ContentAdd => "content-add",
            WireAction::ContentModify => "content-modify",
            WireAction::ContentReject => "content-reject",
            WireAction::ContentRemove => "content-remove",
            WireAction::SessionAccept => "session-accept",
            WireAction::SessionInfo => "session-info",
            WireAction::SessionInitiate => "session-initiate",
            WireAction::SessionTerminate => "session-terminate",
            WireAction::TransportAccept => "transport-accept",
            WireAction::TransportInfo => "transport-info",
            WireAction::TransportReject => "transport-reject",
            WireAction::TransportReplace => "transport-replace",
        }
    }

    /// True for actions that carry `<content/>` children.
    pub fn carries_contents(&self) -> bool {
        !matches!(self, WireAction::SessionInfo)
    }
}

impl FromStr for WireAction {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "content-accept" => WireAction::ContentAccept,
            "content-add" => WireAction::ContentAdd,
            "content-modify" => WireAction::ContentModify,
            "content-reject" => WireAction::ContentReject,
            "content-remove" => WireAction::ContentRemove,
            "session-accept" => WireAction::SessionAccept,
            "session-info" => WireAction::SessionInfo,
            "session-initiate" => WireAction::SessionInitiate,
            "session-terminate" => WireAction::SessionTerminate,
            "transport-accept" => WireAction::TransportAccept,
            "transport-info" => WireAction::TransportInfo,
            "transport-reject" => WireAction::TransportReject,
            "transport-replace" => WireAction::TransportReplace,
            _ => {
                return Err(ProtocolError::new(
                    crate::error::DefinedCondition::ServiceUnavailable,
                    "Unknown Jingle action.",
                ))
            }
        })
    }
}

impl fmt::Display for WireAction {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// The application-facing event kind, a superset of [`WireAction`] that also
/// names the `<session-info/>` sub-payloads (DTMF, ringing, hold, ...) as if
/// they were actions in their own right, the way [`crate::events::JingleEvent`]
/// reports them to the caller.
///
/// The `Dtmf` variant's wire-facing [`ActionKind::label`] is the literal
/// uppercase string `"DTMF"`, unlike every other lowercase-hyphenated token.
/// This mirrors a quirk of the engine this crate's design is descended from
/// and is preserved rather than "fixed", since no spec text defines what the
/// label is actually used for on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Wire(WireAction),
    Dtmf,
    Ringing,
    Trying,
    Received,
    Hold,
    Active,
    Mute,
    Transfer,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Wire(w) => w.as_str(),
            ActionKind::Dtmf => "DTMF",
            ActionKind::Ringing => "ringing",
            ActionKind::Trying => "trying",
            ActionKind::Received => "received",
            ActionKind::Hold => "hold",
            ActionKind::Active => "active",
            ActionKind::Mute => "mute",
            ActionKind::Transfer => "session-transfer",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.label())
    }
}

impl From<WireAction> for ActionKind {
    fn from(w: WireAction) -> Self {
        ActionKind::Wire(w)
    }
}
