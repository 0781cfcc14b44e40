/***************************************************************************************************
 * Copyright (c) 2022-2023, Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * rs_streamcbor Error API
 *
 * A streaming (SAX-style) push parser for CBOR (RFC8949). This implementation is designed for use
 * in constrained systems and requires neither the Rust standard library nor an allocator.
 **************************************************************************************************/
use std::result;

#[cfg(any(feature = "full", test))]
use thiserror::Error;

/// An alias for Result<T, StreamError> used throughout this crate.
pub type Result<T> = result::Result<T, StreamError>;

/// `StreamError` enumerates the ways a parse can be rejected. The parser
/// delivers a single `Failed` event to the callback before any of these is
/// returned from `feed`, and the context must be reconstructed before it is
/// fed again.
#[cfg_attr(any(feature = "full", test), derive(Copy, Clone, Error, Debug, PartialEq, Eq))]
#[cfg_attr(all(not(feature = "full"), not(test)), derive(Copy, Clone, Debug, PartialEq, Eq))]
pub enum StreamError {
    /// The input is not well-formed CBOR: a reserved minor value, an illegal
    /// two-byte simple value, a type-mixed or nested indefinite string chunk,
    /// or a BREAK with no indefinite-length container to terminate.
    #[cfg_attr(any(feature = "full", test), error("Bad CBOR coding"))]
    BadCoding,
    /// A fixed context capacity was exceeded: the frame stack, the path
    /// buffer, the array index stack or the parsing-layer stack.
    #[cfg_attr(any(feature = "full", test), error("Overflow"))]
    Overflow,
    /// The application callback returned [`Control::Reject`] for an event.
    ///
    /// [`Control::Reject`]: crate::types::Control::Reject
    #[cfg_attr(
        any(feature = "full", test),
        error("Parser callback errored (see earlier error)")
    )]
    RejectedByCallback,
    /// A number conversion has overflowed or underflowed. Only reported by
    /// the `TryFrom<Item>` conversions, never by `feed`.
    #[cfg_attr(
        any(feature = "full", test),
        error("Overflow or underflow in number conversion")
    )]
    OutOfRange,
    /// Attempt to convert an item to an incompatible type. Only reported by
    /// the `TryFrom<Item>` conversions, never by `feed`.
    #[cfg_attr(
        any(feature = "full", test),
        error("Attempt to convert an item of incompatible type")
    )]
    IncompatibleType,
}

impl StreamError {
    /// Static error text, available without an allocator. Mirrors the
    /// `Display` implementation available with the `full` feature.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamError::BadCoding => "Bad CBOR coding",
            StreamError::Overflow => "Overflow",
            StreamError::RejectedByCallback => "Parser callback errored (see earlier error)",
            StreamError::OutOfRange => "Overflow or underflow in number conversion",
            StreamError::IncompatibleType => "Attempt to convert an item of incompatible type",
        }
    }
}
