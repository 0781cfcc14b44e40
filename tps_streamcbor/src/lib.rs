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
 * rs_streamcbor module definition
 *
 * A streaming (SAX-style) push parser for CBOR (RFC8949). This implementation is designed for use
 * in constrained systems and requires neither the Rust standard library nor an allocator.
 **************************************************************************************************/

// Default configuration
#![no_std]
#![warn(missing_docs)]

//! # TPS_STREAMCBOR
//!
//! The `tps_streamcbor` crate provides an incremental, event-driven CBOR
//! ([RFC 8949](https://datatracker.ietf.org/doc/rfc8949/)) parser for hosts that cannot, or do not
//! want to, hold a whole document in memory. Bytes are pushed in chunks of any size; the parser
//! keeps no input buffer and allocates nothing, delivering container boundaries, scalars and
//! string chunks to an application callback as they decode.
//!
//! Alongside the events the parser maintains a textual path describing the current position in
//! the document (`.sensors[].id` style) and matches it against an application-supplied set of
//! glob-like patterns, so a callback can dispatch on document location without reconstructing
//! structure on its own.
//!
//! All working storage is a handful of fixed-size arrays inside the parser context (see
//! [`limits`]), which makes the crate usable on `no_std` targets without an allocator. The
//! trade-offs are the ones expected of a SAX-style design: no random access, strings delivered in
//! chunks bounded by the content buffer, and document structure available only as events.
//!
//! ## Features
//!
//! - Definite and indefinite length forms of arrays, maps, byte strings and text strings.
//! - Tags surfaced by number, bracketing their content with start/end events.
//! - All scalar types: 64-bit unsigned and negative integers, the three float widths (half
//!   precision surfaced as its raw payload), booleans, `null`, `undefined` and simple values.
//! - Well-formedness enforcement per RFC 8949 section 3.3: reserved minor values, two-byte
//!   encodings of implicit simples, type-mixed or nested indefinite string chunks and stray
//!   BREAK bytes all reject the parse.
//! - Byte-exact resumption: feeding a document in any partition of its bytes produces an
//!   identical event stream.
//!
//! ## Example
//!
//! ```
//! use tps_streamcbor::parser::{CBORStreamParser, EventHandler, StreamContext};
//! use tps_streamcbor::types::{Control, Event, Item};
//!
//! struct Sum {
//!     total: u64,
//! }
//!
//! impl EventHandler for Sum {
//!     fn on_event(&mut self, ctx: &StreamContext<'_>, event: Event) -> Control {
//!         if event == Event::NumUInt {
//!             if let Item::UInt(v) = ctx.item() {
//!                 self.total += v;
//!             }
//!         }
//!         Control::Proceed
//!     }
//! }
//!
//! // [1, 2, 3]
//! let mut parser = CBORStreamParser::new(Sum { total: 0 }, &[]);
//! parser.feed(&[0x83, 0x01, 0x02, 0x03]).unwrap();
//! assert_eq!(parser.handler().total, 6);
//! ```
//!
//! Closures work as handlers too, which is often more convenient than a named type when the
//! callback only captures a little state.

// Pull in std if we are testing or if it is defined as feature (because we run tests on a
// platform supporting I/O and full feature set.
#[cfg(any(feature = "std", test))]
extern crate std;

// If we are really building no_std, pull in core as well. It is aliased as std so that "use"
// statements are always the same
#[cfg(all(not(feature = "std"), not(test)))]
extern crate core as std;

#[cfg(any(feature = "float", test))]
extern crate half;

pub(crate) mod constants;
pub(crate) mod event;
pub(crate) mod parse;
pub(crate) mod path;

#[cfg(any(feature = "full", test))]
mod diag;

/// The `error` module contains error definitions used throughout `tps_streamcbor`.
pub mod error;

/// The `types` module exports the [`types::Event`] taxonomy delivered to callbacks, the
/// [`types::Item`] scalar representation and the [`types::Control`] callback verdict.
pub mod types {
    pub use super::event::{Control, Event, Item};
}

/// The `parser` module exports the push parser itself: [`parser::CBORStreamParser`], the
/// [`parser::EventHandler`] callback trait, the read-only [`parser::StreamContext`] handed to
/// callbacks, and the [`parser::Status`] of a feed.
pub mod parser {
    pub use super::parse::{CBORStreamParser, EventHandler, Status, StreamContext};
}

/// The `limits` module exports the compile-time capacities of the parser context.
pub mod limits {
    pub use super::constants::{
        CHUNK_BUF, MAX_DEPTH, MAX_INDEX_DEPTH, MAX_PARSE_LAYERS, MAX_PATH, MAX_WILDCARDS,
    };
}

/// The `debug` module exports [`debug::DiagSink`], an event handler that renders the parse as
/// CBOR diagnostic notation. Requires the standard library.
#[cfg(any(feature = "full", test))]
pub mod debug {
    pub use super::diag::DiagSink;
}
