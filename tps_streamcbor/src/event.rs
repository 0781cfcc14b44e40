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
 * rs_streamcbor event taxonomy and current-item representation
 *
 * A streaming (SAX-style) push parser for CBOR (RFC8949). This implementation is designed for use
 * in constrained systems and requires neither the Rust standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::major;
use crate::error::{Result, StreamError};

use std::convert::TryFrom;

#[cfg(any(feature = "float", test))]
use half::f16;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
use std::println;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Events delivered to the parser callback, in document order.
///
/// The discriminants are stable: the distance between the byte string events
/// and their text string counterparts is the same for START, CHUNK and END,
/// so integer-based dispatch can fold the two string families together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// The context has been initialized. Delivered exactly once per callback
    /// installation, before any parse event.
    Constructed = 0,
    /// The context is being torn down or the callback replaced.
    Destructed = 1,
    /// A top-level item has been fully parsed.
    Complete = 2,
    /// The parse is being abandoned; `feed` is about to return an error.
    Failed = 3,
    /// An array head has been seen.
    ArrayStart = 4,
    /// The matching end of an open array.
    ArrayEnd = 5,
    /// A map head has been seen.
    ObjectStart = 6,
    /// The matching end of an open map.
    ObjectEnd = 7,
    /// A tag number has been decoded; the single tagged item follows.
    TagStart = 8,
    /// The tagged item has been fully parsed.
    TagEnd = 9,
    /// An unsigned integer is in [`Item::UInt`].
    NumUInt = 10,
    /// A negative integer is in [`Item::Int`].
    NumInt = 11,
    /// A half-precision float payload is in [`Item::Float16`].
    Float16 = 12,
    /// A single-precision float is in [`Item::Float32`].
    Float32 = 13,
    /// A double-precision float is in [`Item::Float64`].
    Float64 = 14,
    /// The simple value `true`.
    True = 15,
    /// The simple value `false`.
    False = 16,
    /// The simple value `null`.
    Null = 17,
    /// The simple value `undefined`.
    Undefined = 18,
    /// Another simple value is in [`Item::Simple`].
    Simple = 19,
    /// A text string begins.
    StrStart = 20,
    /// A non-final piece of text string content is in the chunk buffer.
    StrChunk = 21,
    /// The final piece of text string content is in the chunk buffer.
    StrEnd = 22,
    /// A byte string begins.
    BlobStart = 23,
    /// A non-final piece of byte string content is in the chunk buffer.
    BlobChunk = 24,
    /// The final piece of byte string content is in the chunk buffer.
    BlobEnd = 25,
}

/// The two string families, selected by the major type of the string head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrKind {
    Text,
    Bytes,
}

impl StrKind {
    pub(crate) fn from_major(opcode: u8) -> StrKind {
        if opcode == major::BSTR {
            StrKind::Bytes
        } else {
            StrKind::Text
        }
    }

    pub(crate) fn start(self) -> Event {
        match self {
            StrKind::Text => Event::StrStart,
            StrKind::Bytes => Event::BlobStart,
        }
    }

    pub(crate) fn chunk(self) -> Event {
        match self {
            StrKind::Text => Event::StrChunk,
            StrKind::Bytes => Event::BlobChunk,
        }
    }

    pub(crate) fn end(self) -> Event {
        match self {
            StrKind::Text => Event::StrEnd,
            StrKind::Bytes => Event::BlobEnd,
        }
    }
}

/// The most recently decoded scalar, readable from the callback while the
/// event that announced it is being delivered.
///
/// Scalar representations are as follows:
///
/// - Unsigned integers are held as a `u64`.
/// - Negative integers are held as an `i64` with value `-1 - argument`. An
///   argument of 2^63 or more wraps in two's complement, as in the C
///   heritage of this parser.
/// - `Float16` holds the raw IEEE754 binary16 payload; decode it with
///   [`Item::as_f16`] or your own bit fiddling.
/// - Tag numbers are held as a `u64`; the tagged item follows between
///   `TagStart` and `TagEnd`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item {
    /// Unsigned integer (major type 0).
    UInt(u64),
    /// Negative integer (major type 1), already sign-adjusted.
    Int(i64),
    /// Raw IEEE754 binary16 payload (major type 7, minor 25).
    Float16(u16),
    /// IEEE754 binary32 value (major type 7, minor 26).
    Float32(f32),
    /// IEEE754 binary64 value (major type 7, minor 27).
    Float64(f64),
    /// Tag number (major type 6).
    Tag(u64),
    /// Simple value other than the four named ones (major type 7).
    Simple(u8),
}

impl Item {
    /// Decode the raw binary16 payload of a `Float16` item.
    #[cfg(any(feature = "float", test))]
    #[cfg_attr(feature = "trace", trace)]
    pub fn as_f16(&self) -> Option<f16> {
        match self {
            Item::Float16(bits) => Some(f16::from_bits(*bits)),
            _ => None,
        }
    }
}

/***************************************************************************************************
 * Standard Trait Implementations: From Item to value. May fail
 **************************************************************************************************/

/// Convert an Item into a u64. Negative integers report `OutOfRange`.
impl TryFrom<Item> for u64 {
    type Error = StreamError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(item: Item) -> Result<u64> {
        match item {
            Item::UInt(v) => Ok(v),
            Item::Int(_) => Err(StreamError::OutOfRange),
            _ => Err(StreamError::IncompatibleType),
        }
    }
}

/// Convert an Item into an i64. Unsigned values that do not fit report
/// `OutOfRange`.
impl TryFrom<Item> for i64 {
    type Error = StreamError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(item: Item) -> Result<i64> {
        match item {
            Item::Int(v) => Ok(v),
            Item::UInt(v) => {
                if v <= i64::max_value() as u64 {
                    Ok(v as i64)
                } else {
                    Err(StreamError::OutOfRange)
                }
            }
            _ => Err(StreamError::IncompatibleType),
        }
    }
}

/// Convert an Item into an f64. Half-precision payloads are raw bits and
/// are not covered here; use [`Item::as_f16`].
impl TryFrom<Item> for f64 {
    type Error = StreamError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(item: Item) -> Result<f64> {
        match item {
            Item::Float64(v) => Ok(v),
            Item::Float32(v) => Ok(v as f64),
            _ => Err(StreamError::IncompatibleType),
        }
    }
}

/// Returned by the application callback to continue or abort the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep parsing.
    Proceed,
    /// Abandon the parse; `feed` returns
    /// [`StreamError::RejectedByCallback`](crate::error::StreamError).
    Reject,
}
