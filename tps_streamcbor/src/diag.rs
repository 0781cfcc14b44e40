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
 * rs_streamcbor diagnostic notation output
 *
 * Renders the event stream as CBOR diagnostic notation (RFC8949 section 8) while it is parsed,
 * without building a tree. Requires the standard library.
 **************************************************************************************************/
use std::io::{self, Write};
use std::string::String;
use std::vec::Vec;

use half::f16;

use crate::event::{Control, Event, Item};
use crate::parse::{EventHandler, StreamContext};

/// Container the renderer is currently inside, with the number of items
/// written so far at that level (separator and key/value placement).
#[derive(Debug)]
enum Nest {
    Array { n: usize },
    Map { n: usize },
    Tag,
}

/// An [`EventHandler`] that renders the parse as diagnostic notation onto
/// any writer. Indefinite-length items are rendered in their definite form,
/// since the event stream does not distinguish them.
///
/// Install it as the parser callback and read the output back through
/// [`DiagSink::output`] (or [`DiagSink::finish`] if the sink was driven by
/// hand). A write failure rejects the parse; the deferred error is reported
/// by `finish`.
pub struct DiagSink<W: Write> {
    out: W,
    nest: Vec<Nest>,
    error: Option<io::Error>,
}

impl<W: Write> DiagSink<W> {
    /// Construct a sink rendering onto `out`.
    pub fn new(out: W) -> DiagSink<W> {
        DiagSink {
            out,
            nest: Vec::new(),
            error: None,
        }
    }

    /// Borrow the underlying writer, e.g. to read back an in-memory buffer.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consume the sink, returning the writer or the deferred write error.
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }

    /// Write whatever punctuation the current nesting level requires before
    /// a new item, and count the item at that level.
    fn separator(&mut self) -> io::Result<()> {
        match self.nest.last_mut() {
            Some(Nest::Array { n }) => {
                if *n > 0 {
                    write!(self.out, ", ")?;
                }
                *n += 1;
            }
            Some(Nest::Map { n }) => {
                if *n % 2 == 1 {
                    write!(self.out, ": ")?;
                } else if *n > 0 {
                    write!(self.out, ", ")?;
                }
                *n += 1;
            }
            Some(Nest::Tag) | None => {}
        }
        Ok(())
    }

    fn scalar(&mut self, item: Item) -> io::Result<()> {
        match item {
            Item::UInt(v) => write!(self.out, "{}", v),
            Item::Int(v) => write!(self.out, "{}", v),
            Item::Float16(bits) => write!(self.out, "{}", f16::from_bits(bits)),
            Item::Float32(v) => write!(self.out, "{}", v),
            Item::Float64(v) => write!(self.out, "{}", v),
            Item::Tag(v) => write!(self.out, "{}", v),
            Item::Simple(v) => write!(self.out, "simple({})", v),
        }
    }

    fn render(&mut self, ctx: &StreamContext<'_>, event: Event) -> io::Result<()> {
        match event {
            Event::NumUInt
            | Event::NumInt
            | Event::Float16
            | Event::Float32
            | Event::Float64
            | Event::Simple => {
                self.separator()?;
                self.scalar(ctx.item())
            }
            Event::True => {
                self.separator()?;
                write!(self.out, "true")
            }
            Event::False => {
                self.separator()?;
                write!(self.out, "false")
            }
            Event::Null => {
                self.separator()?;
                write!(self.out, "null")
            }
            Event::Undefined => {
                self.separator()?;
                write!(self.out, "undefined")
            }
            Event::StrStart => {
                self.separator()?;
                write!(self.out, "\"")
            }
            Event::StrChunk | Event::StrEnd => {
                write!(self.out, "{}", String::from_utf8_lossy(ctx.chunk()))?;
                if event == Event::StrEnd {
                    write!(self.out, "\"")?;
                }
                Ok(())
            }
            Event::BlobStart => {
                self.separator()?;
                write!(self.out, "h'")
            }
            Event::BlobChunk | Event::BlobEnd => {
                for b in ctx.chunk() {
                    write!(self.out, "{:02x}", b)?;
                }
                if event == Event::BlobEnd {
                    write!(self.out, "'")?;
                }
                Ok(())
            }
            Event::ArrayStart => {
                self.separator()?;
                self.nest.push(Nest::Array { n: 0 });
                write!(self.out, "[")
            }
            Event::ArrayEnd => {
                self.nest.pop();
                write!(self.out, "]")
            }
            Event::ObjectStart => {
                self.separator()?;
                self.nest.push(Nest::Map { n: 0 });
                write!(self.out, "{{")
            }
            Event::ObjectEnd => {
                self.nest.pop();
                write!(self.out, "}}")
            }
            Event::TagStart => {
                self.separator()?;
                let n = match ctx.item() {
                    Item::Tag(n) => n,
                    _ => 0,
                };
                self.nest.push(Nest::Tag);
                write!(self.out, "{}(", n)
            }
            Event::TagEnd => {
                self.nest.pop();
                write!(self.out, ")")
            }
            Event::Complete => writeln!(self.out),
            Event::Constructed | Event::Destructed | Event::Failed => Ok(()),
        }
    }
}

impl<W: Write> EventHandler for DiagSink<W> {
    fn on_event(&mut self, ctx: &StreamContext<'_>, event: Event) -> Control {
        match self.render(ctx, event) {
            Ok(()) => Control::Proceed,
            Err(e) => {
                self.error = Some(e);
                Control::Reject
            }
        }
    }
}
