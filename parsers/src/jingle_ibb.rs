// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use xso::{AsXml, FromXml};

use crate::ibb::{Stanza, StreamId};
use crate::ns;

/// Describes an [In-Band Bytestream](https://xmpp.org/extensions/xep-0047.html)
/// Jingle transport, see also the [IBB module](../ibb.rs).
#[derive(FromXml, AsXml, PartialEq, Debug, Clone)]
#[xml(namespace = ns::JINGLE_IBB, name = "transport")]
pub struct Transport {
    /// Maximum size in bytes for each chunk.
    #[xml(attribute(name = "block-size"))]
    pub block_size: u16,

    /// The identifier to be used to create a stream.
    #[xml(attribute)]
    pub sid: StreamId,

    /// Which stanza type to use to exchange data.
    #[xml(attribute(default))]
    pub stanza: Stanza,
}
