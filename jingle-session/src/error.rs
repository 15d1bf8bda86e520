// Copyright (c) 2026 xmpp-rs contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types returned by the session engine.

use std::fmt;

/// The `type` attribute of an XMPP `<error/>` element (RFC 6120 §8.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Retry after providing credentials.
    Auth,
    /// Do not retry, the error cannot be remedied.
    Cancel,
    /// Proceed, the condition was only a warning.
    Continue,
    /// Retry after changing the data sent.
    Modify,
    /// Retry after waiting, the error is temporary.
    Wait,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Auth => "auth",
            ErrorType::Cancel => "cancel",
            ErrorType::Continue => "continue",
            ErrorType::Modify => "modify",
            ErrorType::Wait => "wait",
        }
    }
}

/// The defined conditions this crate can produce (XEP-0166 and RFC 6120
/// subset actually reachable by Jingle stanza processing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinedCondition {
    BadRequest,
    NotAcceptable,
    ServiceUnavailable,
    FeatureNotImplemented,
    InternalServerError,
    ItemNotFound,
}

impl DefinedCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinedCondition::BadRequest => "bad-request",
            DefinedCondition::NotAcceptable => "not-acceptable",
            DefinedCondition::ServiceUnavailable => "service-unavailable",
            DefinedCondition::FeatureNotImplemented => "feature-not-implemented",
            DefinedCondition::InternalServerError => "internal-server-error",
            DefinedCondition::ItemNotFound => "item-not-found",
        }
    }

    /// The `type` value the condition SHOULD be paired with, per RFC 6120.
    pub fn default_type(&self) -> ErrorType {
        match self {
            DefinedCondition::BadRequest => ErrorType::Modify,
            DefinedCondition::NotAcceptable => ErrorType::Modify,
            DefinedCondition::ServiceUnavailable => ErrorType::Cancel,
            DefinedCondition::FeatureNotImplemented => ErrorType::Cancel,
            DefinedCondition::InternalServerError => ErrorType::Cancel,
            DefinedCondition::ItemNotFound => ErrorType::Cancel,
        }
    }
}

/// A protocol error to be reported back to the peer as an `iq/error`.
///
/// Distinct from [`SessionError`]: this one always has a wire representation,
/// the other never reaches the network.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    pub condition: DefinedCondition,
    pub text: Option<String>,
    /// Whether this error terminates the whole stanza (hard) or only the
    /// content currently being parsed (soft, the rest of the stanza is kept).
    pub fatal: bool,
}

impl ProtocolError {
    pub fn new(condition: DefinedCondition, text: impl Into<Option<&'static str>>) -> Self {
        ProtocolError {
            condition,
            text: text.into().map(str::to_owned),
            fatal: true,
        }
    }

    pub fn soft(condition: DefinedCondition, text: impl Into<Option<&'static str>>) -> Self {
        ProtocolError {
            condition,
            text: text.into().map(str::to_owned),
            fatal: false,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.condition.as_str())?;
        if let Some(text) = &self.text {
            write!(fmt, ": {}", text)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

/// A caller misuse of the [`crate::session::Session`] API: the call is
/// rejected before anything is sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The operation is not legal in the session's current state.
    WrongState,
    /// The operation requires the opposite call direction.
    WrongDirection,
    /// The session has already reached its terminal state.
    Destroyed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            SessionError::WrongState => "operation not valid in the current session state",
            SessionError::WrongDirection => "operation not valid for this session's direction",
            SessionError::Destroyed => "session is already destroyed",
        };
        fmt.write_str(msg)
    }
}

impl std::error::Error for SessionError {}

/// Failure to hand a stanza to the underlying stream.
#[derive(Debug)]
pub struct SendError(pub String);

impl fmt::Display for SendError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "failed to send stanza: {}", self.0)
    }
}

impl std::error::Error for SendError {}
