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
 * rs_streamcbor wire constants and context capacities
 *
 * A streaming (SAX-style) push parser for CBOR (RFC8949). This implementation is designed for use
 * in constrained systems and requires neither the Rust standard library nor an allocator.
 **************************************************************************************************/

/// Mask selecting the major type bits (top three) of a CBOR head byte.
pub const MAJOR_MASK: u8 = 0xe0;

/// Mask selecting the additional information bits (low five) of a CBOR head byte.
pub const MINOR_MASK: u8 = 0x1f;

/// The eight CBOR major types, pre-shifted into head byte position.
pub mod major {
    /// Major type 0: unsigned integer.
    pub const UINT: u8 = 0x00;
    /// Major type 1: negative integer.
    pub const NINT: u8 = 0x20;
    /// Major type 2: byte string.
    pub const BSTR: u8 = 0x40;
    /// Major type 3: text string.
    pub const TSTR: u8 = 0x60;
    /// Major type 4: array.
    pub const ARRAY: u8 = 0x80;
    /// Major type 5: map.
    pub const MAP: u8 = 0xa0;
    /// Major type 6: tag.
    pub const TAG: u8 = 0xc0;
    /// Major type 7: floats, simple values and BREAK.
    pub const FLOAT: u8 = 0xe0;
}

/// Minor values up to this bound carry the argument in the head byte itself.
pub const MINOR_IMMEDIATE_MAX: u8 = 23;

/// Minor value 24: a one-byte argument follows. 25, 26 and 27 select two,
/// four and eight byte big-endian arguments respectively.
pub const MINOR_ARG1: u8 = 24;

/// Minor values 28..=30 are reserved by RFC8949 and always malformed.
pub const MINOR_RESERVED_LO: u8 = 28;

/// Minor value 31: indefinite-length marker, or BREAK when the major type is 7.
pub const MINOR_INDEFINITE: u8 = 31;

/// Minor values of major type 7 that are not float widths.
pub mod simple {
    /// Simple value 20: `false`.
    pub const FALSE: u8 = 20;
    /// Simple value 21: `true`.
    pub const TRUE: u8 = 21;
    /// Simple value 22: `null`.
    pub const NULL: u8 = 22;
    /// Simple value 23: `undefined`.
    pub const UNDEFINED: u8 = 23;
    /// Minor 24: the simple value is carried in one extension byte.
    pub const EXTENSION: u8 = 24;
    /// Minor 25: IEEE754 binary16 payload follows.
    pub const FLOAT16: u8 = 25;
    /// Minor 26: IEEE754 binary32 payload follows.
    pub const FLOAT32: u8 = 26;
    /// Minor 27: IEEE754 binary64 payload follows.
    pub const FLOAT64: u8 = 27;
}

/// Head byte terminating an indefinite-length container.
pub const BREAK: u8 = 0xff;

/// Maximum container nesting, including one sentinel frame at depth zero.
/// Exceeding it fails the parse with `Overflow`.
pub const MAX_DEPTH: usize = 12;

/// Maximum depth of the auxiliary parsing-layer stack (sub-parses with their
/// own pattern sets), including the layer installed at construction.
pub const MAX_PARSE_LAYERS: usize = 5;

/// Capacity in bytes of the live document path.
pub const MAX_PATH: usize = 128;

/// Capacity in bytes of the string chunk buffer. String content longer than
/// this is delivered in multiple chunk events.
pub const CHUNK_BUF: usize = 254;

/// Maximum number of simultaneously open arrays with live index counters.
pub const MAX_INDEX_DEPTH: usize = 8;

/// Maximum number of wildcard capture positions recorded per pattern match.
pub const MAX_WILDCARDS: usize = 8;
