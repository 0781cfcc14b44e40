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
 * rs_streamcbor push parser state machine
 *
 * A streaming (SAX-style) push parser for CBOR (RFC8949). This implementation is designed for use
 * in constrained systems and requires neither the Rust standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::*;
use crate::error::{Result, StreamError};
use crate::event::{Control, Event, Item, StrKind};
use crate::path::match_pattern;

/// Per-byte dispatch states of the push parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a head byte.
    Opc,
    /// Accumulating a big-endian integer or float argument.
    Collect,
    /// Expecting the extension byte of a two-byte simple value.
    SimpleX8,
    /// Accumulating string content into the chunk buffer.
    Collate,
    /// Inside an indefinite-length string: expecting a chunk head or BREAK.
    OnlySame,
}

/// One open container level, plus a sentinel at depth zero.
///
/// Frames are deliberately `Copy`: `push` duplicates the parent frame and
/// re-initializes the child fields, which preserves the parent's opcode and
/// deferred pop event without a back pointer.
#[derive(Debug, Clone, Copy)]
struct Frame {
    state: State,
    /// Major type of this nesting level (of the current item at depth zero).
    opcode: u8,
    /// Children still expected (map entries count twice), or during COLLATE
    /// the content bytes still expected in the current chunk.
    remaining: u64,
    indefinite: bool,
    /// Children seen so far. Even before a map key, odd before a map value.
    ordinal: u64,
    /// A string below this frame has emitted a non-final chunk.
    intermediate: bool,
    /// Path length to restore when this frame pops.
    path_cursor: u16,
    /// Event to deliver when this frame pops.
    pop_event: Option<Event>,
}

impl Frame {
    const INIT: Frame = Frame {
        state: State::Opc,
        opcode: 0,
        remaining: 0,
        indefinite: false,
        ordinal: 0,
        intermediate: false,
        path_cursor: 0,
        pop_event: None,
    };
}

/// One entry of the auxiliary parsing-layer stack: a pattern set and the
/// region of the path buffer it owns. Layers below keep their path prefix
/// intact while a sub-parse is active.
#[derive(Debug, Clone, Copy)]
struct ParseLayer<'p> {
    paths: &'p [&'p str],
    /// Start of this layer's region within the path buffer.
    base: u16,
    /// Path write cursor (absolute).
    ppos: u16,
    saved_match: u8,
    saved_match_len: u16,
    saved_wild: [u16; MAX_WILDCARDS],
    saved_wildcount: u8,
}

impl<'p> ParseLayer<'p> {
    fn empty() -> ParseLayer<'p> {
        ParseLayer {
            paths: &[],
            base: 0,
            ppos: 0,
            saved_match: 0,
            saved_match_len: 0,
            saved_wild: [0u16; MAX_WILDCARDS],
            saved_wildcount: 0,
        }
    }
}

/// Result of a successful `feed`: the byte chunk either ended exactly on a
/// top-level item boundary or mid-document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The frame stack is empty and the next byte starts a fresh item.
    Complete,
    /// More bytes are required.
    Continue,
}

/// Receives parse events. Implemented for free by any
/// `FnMut(&StreamContext, Event) -> Control` closure.
pub trait EventHandler {
    /// Called once per event, in document order. Returning
    /// [`Control::Reject`] aborts the parse.
    fn on_event(&mut self, ctx: &StreamContext<'_>, event: Event) -> Control;
}

impl<F> EventHandler for F
where
    F: FnMut(&StreamContext<'_>, Event) -> Control,
{
    fn on_event(&mut self, ctx: &StreamContext<'_>, event: Event) -> Control {
        self(ctx, event)
    }
}

/// All parser state the application callback may read. Owned by
/// [`CBORStreamParser`] and handed to the callback by shared reference, so
/// the stack, path and buffers cannot be mutated mid-event.
///
/// Everything here is a fixed-size array sized at compile time (see
/// [`crate::limits`]); nothing is allocated on the parse path.
#[derive(Debug)]
pub struct StreamContext<'p> {
    st: [Frame; MAX_DEPTH],
    sp: usize,
    layers: [ParseLayer<'p>; MAX_PARSE_LAYERS],
    lsp: usize,
    path: [u8; MAX_PATH],
    buf: [u8; CHUNK_BUF],
    npos: usize,
    item: Item,
    /// Scalar event to emit once the collector finishes.
    present: Event,
    /// Big-endian argument accumulator and its outstanding byte count.
    acc: u64,
    acc_rem: u8,
    path_match: u8,
    path_match_len: u16,
    wild: [u16; MAX_WILDCARDS],
    wildcount: u8,
    index: [u64; MAX_INDEX_DEPTH],
    ipos: usize,
}

impl<'p> StreamContext<'p> {
    fn new(paths: &'p [&'p str]) -> StreamContext<'p> {
        let mut layers = [ParseLayer::empty(); MAX_PARSE_LAYERS];
        layers[0].paths = paths;
        StreamContext {
            st: [Frame::INIT; MAX_DEPTH],
            sp: 0,
            layers,
            lsp: 0,
            path: [0u8; MAX_PATH],
            buf: [0u8; CHUNK_BUF],
            npos: 0,
            item: Item::UInt(0),
            present: Event::NumUInt,
            acc: 0,
            acc_rem: 0,
            path_match: 0,
            path_match_len: 0,
            wild: [0u16; MAX_WILDCARDS],
            wildcount: 0,
            index: [0u64; MAX_INDEX_DEPTH],
            ipos: 0,
        }
    }

    /***********************************************************************************************
     * Callback read surface
     **********************************************************************************************/

    /// The most recently decoded scalar.
    pub fn item(&self) -> Item {
        self.item
    }

    /// The bytes of the string chunk being delivered. Empty outside of
    /// CHUNK and END events.
    pub fn chunk(&self) -> &[u8] {
        &self.buf[..self.npos]
    }

    /// The live document path, e.g. `.key1.key2[].key3`. The bytes are the
    /// map keys as they appeared on the wire; for well-formed text keys this
    /// is valid UTF-8.
    pub fn path(&self) -> &[u8] {
        &self.path[..self.layers[self.lsp].ppos as usize]
    }

    /// 1-based index of the first registered pattern the path matches, or
    /// zero while no pattern matches.
    pub fn path_match(&self) -> u8 {
        self.path_match
    }

    /// Path length at which the active pattern matched.
    pub fn path_match_len(&self) -> usize {
        self.path_match_len as usize
    }

    /// Path offsets where each `*` of the active pattern began consuming.
    pub fn wildcards(&self) -> &[u16] {
        &self.wild[..self.wildcount as usize]
    }

    /// One counter per open array, innermost last: the index of the child
    /// currently being parsed within each enclosing array.
    pub fn array_indices(&self) -> &[u64] {
        &self.index[..self.ipos]
    }

    /// Number of open containers.
    pub fn depth(&self) -> usize {
        self.sp
    }

    /***********************************************************************************************
     * Path maintenance and matching
     **********************************************************************************************/

    /// Truncate the live path to `to`, dropping a match the truncation
    /// invalidates, and re-run matching.
    fn truncate_path(&mut self, to: u16) {
        self.layers[self.lsp].ppos = to;
        if self.path_match != 0 && to <= self.path_match_len {
            self.path_match = 0;
            self.wildcount = 0;
        }
        self.check_path_match();
    }

    fn append_path(&mut self, bytes: &[u8]) -> Result<()> {
        let ppos = self.layers[self.lsp].ppos as usize;
        if ppos + bytes.len() > MAX_PATH {
            return Err(StreamError::Overflow);
        }
        self.path[ppos..ppos + bytes.len()].copy_from_slice(bytes);
        self.layers[self.lsp].ppos = (ppos + bytes.len()) as u16;
        self.check_path_match();
        Ok(())
    }

    /// Match the current layer's patterns against its region of the path.
    /// Only runs while no match is active; an active match persists until
    /// the path shrinks back past the length it was recorded at.
    fn check_path_match(&mut self) {
        if self.path_match != 0 {
            return;
        }
        let layer = self.layers[self.lsp];
        let live = &self.path[layer.base as usize..layer.ppos as usize];
        for (n, pattern) in layer.paths.iter().enumerate() {
            let mut wild = [0u16; MAX_WILDCARDS];
            if let Some(count) = match_pattern(live, pattern.as_bytes(), &mut wild) {
                for w in wild[..count].iter_mut() {
                    *w += layer.base;
                }
                self.wild = wild;
                self.wildcount = count as u8;
                self.path_match = (n + 1) as u8;
                self.path_match_len = layer.ppos;
                return;
            }
        }
        self.wildcount = 0;
    }

    /***********************************************************************************************
     * Container stack
     **********************************************************************************************/

    fn emit<H: EventHandler>(&mut self, cb: &mut H, event: Event) -> Result<()> {
        match cb.on_event(self, event) {
            Control::Proceed => Ok(()),
            Control::Reject => Err(StreamError::RejectedByCallback),
        }
    }

    fn push<H: EventHandler>(
        &mut self,
        cb: &mut H,
        start: Option<Event>,
        end: Option<Event>,
        state: State,
    ) -> Result<()> {
        if self.sp + 1 == MAX_DEPTH {
            return Err(StreamError::Overflow);
        }
        if let Some(ev) = start {
            self.emit(cb, ev)?;
        }
        self.st[self.sp].pop_event = end;
        self.st[self.sp + 1] = self.st[self.sp];
        self.sp += 1;
        let child = &mut self.st[self.sp];
        child.state = state;
        child.remaining = 0;
        child.indefinite = false;
        child.ordinal = 0;
        child.intermediate = false;
        Ok(())
    }

    fn pop<H: EventHandler>(&mut self, cb: &mut H) -> Result<()> {
        debug_assert!(self.sp > 0);
        self.sp -= 1;
        let frame = self.st[self.sp];
        if frame.pop_event == Some(Event::ArrayEnd) {
            debug_assert!(self.ipos > 0);
            self.ipos -= 1;
        }
        self.truncate_path(frame.path_cursor);
        if let Some(ev) = frame.pop_event {
            self.emit(cb, ev)?;
        }
        Ok(())
    }

    /// Walk up the stack after an item has been fully produced, crediting
    /// each ancestor and popping the ones that thereby finished. `indet` is
    /// set when the walk was triggered by a BREAK, which is allowed to close
    /// the nearest indefinite ancestor.
    fn completed<H: EventHandler>(&mut self, cb: &mut H, mut indet: bool) -> Result<()> {
        let mut il = self.ipos;

        self.st[self.sp].state = State::Opc;
        while self.sp > 0 {
            let parent = self.sp - 1;
            self.st[parent].ordinal += 1;
            if self.st[parent].opcode == major::ARRAY {
                debug_assert!(il > 0);
                il -= 1;
                self.index[il] += 1;
            }

            if !indet && self.st[parent].indefinite {
                break;
            }

            if !self.st[parent].indefinite && self.st[parent].remaining > 0 {
                self.st[parent].remaining -= 1;
                if self.st[parent].remaining > 0 {
                    break;
                }
            }

            self.st[parent].state = State::Opc;
            self.pop(cb)?;
            indet = false;
        }

        if self.sp == 0 && self.st[0].state == State::Opc {
            self.emit(cb, Event::Complete)?;
        }
        Ok(())
    }

    /// True while collating a definite chunk that belongs to an
    /// indefinite-length string.
    fn in_indefinite_string(&self) -> bool {
        if self.st[self.sp].indefinite {
            return true;
        }
        if self.sp == 0 {
            return false;
        }
        let parent = self.st[self.sp - 1];
        (parent.opcode == major::BSTR || parent.opcode == major::TSTR) && parent.indefinite
    }

    /***********************************************************************************************
     * Per-state byte handlers
     **********************************************************************************************/

    fn run<H: EventHandler>(&mut self, cbor: &[u8], cb: &mut H) -> Result<Status> {
        for &c in cbor {
            match self.st[self.sp].state {
                State::Opc => self.opc(cb, c)?,
                State::Collect => self.collect(cb, c)?,
                State::SimpleX8 => self.simple_x8(cb, c)?,
                State::Collate => self.collate(cb, c)?,
                State::OnlySame => self.only_same(cb, c)?,
            }
        }

        if self.sp == 0 && self.st[0].state == State::Opc {
            Ok(Status::Complete)
        } else {
            Ok(Status::Continue)
        }
    }

    /// Configure the collector for a 1, 2, 4 or 8 byte big-endian argument.
    /// Minors 28..=30 are reserved, and 31 is never a collectable width.
    fn begin_collect(&mut self, minor: u8) -> Result<()> {
        if minor >= MINOR_RESERVED_LO {
            return Err(StreamError::BadCoding);
        }
        debug_assert!(minor >= MINOR_ARG1);
        self.acc = 0;
        self.acc_rem = 1 << (minor - MINOR_ARG1);
        self.st[self.sp].state = State::Collect;
        Ok(())
    }

    /// Emit the pending scalar event, then credit the ancestors.
    fn issue<H: EventHandler>(&mut self, cb: &mut H) -> Result<()> {
        let ev = self.present;
        self.emit(cb, ev)?;
        self.completed(cb, false)
    }

    fn opc<H: EventHandler>(&mut self, cb: &mut H, c: u8) -> Result<()> {
        let opcode = c & MAJOR_MASK;
        let minor = c & MINOR_MASK;

        {
            let st = &mut self.st[self.sp];
            st.opcode = opcode;
            // a reused frame may still carry these from an indefinite sibling
            st.indefinite = false;
            st.intermediate = false;
        }

        match opcode {
            major::UINT => {
                self.present = Event::NumUInt;
                if minor <= MINOR_IMMEDIATE_MAX {
                    self.item = Item::UInt(minor as u64);
                    self.issue(cb)
                } else {
                    self.begin_collect(minor)
                }
            }
            major::NINT => {
                self.present = Event::NumInt;
                if minor <= MINOR_IMMEDIATE_MAX {
                    self.item = Item::Int(-1 - minor as i64);
                    self.issue(cb)
                } else {
                    self.begin_collect(minor)
                }
            }
            major::BSTR | major::TSTR => self.open_string(cb, opcode, minor),
            major::ARRAY => self.open_array(cb, minor),
            major::MAP => self.open_map(cb, minor),
            major::TAG => {
                if minor <= MINOR_IMMEDIATE_MAX {
                    self.open_tag(cb, minor as u64)
                } else {
                    self.begin_collect(minor)
                }
            }
            _ => self.opc_major7(cb, minor),
        }
    }

    fn open_string<H: EventHandler>(&mut self, cb: &mut H, opcode: u8, minor: u8) -> Result<()> {
        let kind = StrKind::from_major(opcode);
        self.npos = 0;

        // later chunks of an indefinite string must not re-announce it
        let suppress = self.sp > 0 && self.st[self.sp - 1].intermediate;
        if !suppress {
            self.emit(cb, kind.start())?;
        }

        if minor == 0 {
            self.emit(cb, kind.end())?;
            return self.completed(cb, false);
        }
        if minor <= MINOR_IMMEDIATE_MAX {
            let st = &mut self.st[self.sp];
            st.remaining = minor as u64;
            st.state = State::Collate;
            return Ok(());
        }
        if minor < MINOR_RESERVED_LO {
            return self.begin_collect(minor);
        }
        if minor != MINOR_INDEFINITE {
            return Err(StreamError::BadCoding);
        }

        let ppos = self.layers[self.lsp].ppos;
        let st = &mut self.st[self.sp];
        st.indefinite = true;
        st.path_cursor = ppos;
        self.push(cb, None, Some(kind.end()), State::OnlySame)
    }

    fn open_array<H: EventHandler>(&mut self, cb: &mut H, minor: u8) -> Result<()> {
        self.npos = 0;
        self.st[self.sp].path_cursor = self.layers[self.lsp].ppos;
        self.append_path(b"[]")?;

        if self.ipos == MAX_INDEX_DEPTH {
            return Err(StreamError::Overflow);
        }
        self.index[self.ipos] = 0;
        self.ipos += 1;

        self.emit(cb, Event::ArrayStart)?;

        if minor == 0 {
            return self.close_empty_array(cb);
        }
        if minor <= MINOR_IMMEDIATE_MAX {
            self.st[self.sp].remaining = minor as u64;
            return self.push(cb, None, Some(Event::ArrayEnd), State::Opc);
        }
        if minor < MINOR_RESERVED_LO {
            return self.begin_collect(minor);
        }
        if minor != MINOR_INDEFINITE {
            return Err(StreamError::BadCoding);
        }
        self.st[self.sp].indefinite = true;
        self.push(cb, None, Some(Event::ArrayEnd), State::Opc)
    }

    /// Empty arrays never push a frame, so the bookkeeping `pop` would do
    /// happens inline: restore the path, drop the index counter, emit END.
    fn close_empty_array<H: EventHandler>(&mut self, cb: &mut H) -> Result<()> {
        self.ipos -= 1;
        let saved = self.st[self.sp].path_cursor;
        self.truncate_path(saved);
        self.emit(cb, Event::ArrayEnd)?;
        self.completed(cb, false)
    }

    fn open_map<H: EventHandler>(&mut self, cb: &mut H, minor: u8) -> Result<()> {
        self.npos = 0;
        self.st[self.sp].path_cursor = self.layers[self.lsp].ppos;
        self.append_path(b".")?;

        self.emit(cb, Event::ObjectStart)?;

        if minor == 0 {
            return self.close_empty_map(cb);
        }
        if minor <= MINOR_IMMEDIATE_MAX {
            // one credit per key and one per value
            self.st[self.sp].remaining = minor as u64 * 2;
            return self.push(cb, None, Some(Event::ObjectEnd), State::Opc);
        }
        if minor < MINOR_RESERVED_LO {
            return self.begin_collect(minor);
        }
        if minor != MINOR_INDEFINITE {
            return Err(StreamError::BadCoding);
        }
        self.st[self.sp].indefinite = true;
        self.push(cb, None, Some(Event::ObjectEnd), State::Opc)
    }

    fn close_empty_map<H: EventHandler>(&mut self, cb: &mut H) -> Result<()> {
        let saved = self.st[self.sp].path_cursor;
        self.truncate_path(saved);
        self.emit(cb, Event::ObjectEnd)?;
        self.completed(cb, false)
    }

    /// A tag brackets exactly one item: announce it and push the enclosure.
    fn open_tag<H: EventHandler>(&mut self, cb: &mut H, tag: u64) -> Result<()> {
        self.item = Item::Tag(tag);
        self.st[self.sp].path_cursor = self.layers[self.lsp].ppos;
        self.push(cb, Some(Event::TagStart), Some(Event::TagEnd), State::Opc)
    }

    fn opc_major7<H: EventHandler>(&mut self, cb: &mut H, minor: u8) -> Result<()> {
        match minor {
            simple::FALSE => {
                self.present = Event::False;
                self.issue(cb)
            }
            simple::TRUE => {
                self.present = Event::True;
                self.issue(cb)
            }
            simple::NULL => {
                self.present = Event::Null;
                self.issue(cb)
            }
            simple::UNDEFINED => {
                self.present = Event::Undefined;
                self.issue(cb)
            }
            simple::EXTENSION => {
                self.st[self.sp].state = State::SimpleX8;
                Ok(())
            }
            simple::FLOAT16 => {
                self.present = Event::Float16;
                self.begin_collect(minor)
            }
            simple::FLOAT32 => {
                self.present = Event::Float32;
                self.begin_collect(minor)
            }
            simple::FLOAT64 => {
                self.present = Event::Float64;
                self.begin_collect(minor)
            }
            MINOR_INDEFINITE => self.break_byte(cb),
            0..=19 => {
                self.item = Item::Simple(minor);
                self.emit(cb, Event::Simple)?;
                self.completed(cb, false)
            }
            // 28..=30 reserved
            _ => Err(StreamError::BadCoding),
        }
    }

    /// BREAK terminates the nearest enclosing indefinite-length container.
    fn break_byte<H: EventHandler>(&mut self, cb: &mut H) -> Result<()> {
        if self.sp == 0 || !self.st[self.sp - 1].indefinite {
            return Err(StreamError::BadCoding);
        }
        let parent = self.st[self.sp - 1];
        if parent.opcode == major::MAP && parent.ordinal % 2 == 1 {
            // a key is still waiting for its value (RFC8949 3.3)
            return Err(StreamError::BadCoding);
        }
        self.completed(cb, true)
    }

    fn collect<H: EventHandler>(&mut self, cb: &mut H, c: u8) -> Result<()> {
        self.acc = (self.acc << 8) | c as u64;
        self.acc_rem -= 1;
        if self.acc_rem > 0 {
            return Ok(());
        }

        let v = self.acc;
        self.npos = 0;

        match self.st[self.sp].opcode {
            major::BSTR | major::TSTR => self.collected_string(cb, v),
            major::ARRAY => {
                if v == 0 {
                    return self.close_empty_array(cb);
                }
                self.st[self.sp].remaining = v;
                self.push(cb, None, Some(Event::ArrayEnd), State::Opc)
            }
            major::MAP => {
                if v == 0 {
                    return self.close_empty_map(cb);
                }
                self.st[self.sp].remaining = v.checked_mul(2).ok_or(StreamError::BadCoding)?;
                self.push(cb, None, Some(Event::ObjectEnd), State::Opc)
            }
            major::TAG => self.open_tag(cb, v),
            _ => {
                self.item = match self.present {
                    Event::NumUInt => Item::UInt(v),
                    Event::NumInt => Item::Int((-1i64).wrapping_sub(v as i64)),
                    Event::Float16 => Item::Float16(v as u16),
                    Event::Float32 => Item::Float32(f32::from_bits(v as u32)),
                    _ => Item::Float64(f64::from_bits(v)),
                };
                self.issue(cb)
            }
        }
    }

    /// A string length has been collected: enter COLLATE, or close out the
    /// zero-length cases that never get a content byte.
    fn collected_string<H: EventHandler>(&mut self, cb: &mut H, len: u64) -> Result<()> {
        if len > 0 {
            let st = &mut self.st[self.sp];
            st.remaining = len;
            st.state = State::Collate;
            return Ok(());
        }
        if self.in_indefinite_string() {
            // an empty chunk contributes nothing
            self.st[self.sp].state = State::OnlySame;
            return Ok(());
        }
        let kind = StrKind::from_major(self.st[self.sp].opcode);
        self.emit(cb, kind.end())?;
        self.completed(cb, false)
    }

    fn simple_x8<H: EventHandler>(&mut self, cb: &mut H, c: u8) -> Result<()> {
        if c <= MINOR_INDEFINITE {
            // RFC8949 3.3 denies two-byte encodings of the implicit simples
            return Err(StreamError::BadCoding);
        }
        self.item = Item::Simple(c);
        self.emit(cb, Event::Simple)?;
        self.completed(cb, false)
    }

    fn collate<H: EventHandler>(&mut self, cb: &mut H, c: u8) -> Result<()> {
        self.buf[self.npos] = c;
        self.npos += 1;
        self.st[self.sp].remaining -= 1;

        // spill at chunk boundaries, or when the buffer fills
        if self.npos < self.buf.len() && self.st[self.sp].remaining > 0 {
            return Ok(());
        }

        // a map key replaces its predecessor in the path as it spills
        if self.sp > 0
            && self.st[self.sp - 1].opcode == major::MAP
            && self.st[self.sp - 1].ordinal % 2 == 0
        {
            let first_spill = !self.st[self.sp - 1].intermediate;
            if first_spill {
                // keys begin right after the dot owned by the map frame
                let key_start = self.st[self.sp - 1].path_cursor + 1;
                self.truncate_path(key_start);
            }
            let ppos = self.layers[self.lsp].ppos as usize;
            if ppos + self.npos > MAX_PATH {
                return Err(StreamError::Overflow);
            }
            self.path[ppos..ppos + self.npos].copy_from_slice(&self.buf[..self.npos]);
            self.layers[self.lsp].ppos = (ppos + self.npos) as u16;
            self.check_path_match();
        }

        let kind = StrKind::from_major(self.st[self.sp].opcode);
        let more = self.st[self.sp].remaining > 0 || self.in_indefinite_string();
        if self.sp > 0 {
            self.st[self.sp - 1].intermediate = more;
        }

        let ev = if more { kind.chunk() } else { kind.end() };
        self.emit(cb, ev)?;
        self.npos = 0;

        if self.st[self.sp].remaining > 0 {
            // buffer-full spill mid-chunk: keep collating
            return Ok(());
        }
        if more {
            // chunk of an indefinite string finished: back to head bytes
            self.st[self.sp].state = State::OnlySame;
            Ok(())
        } else {
            self.st[self.sp].state = State::Opc;
            self.completed(cb, false)
        }
    }

    /// Inside an indefinite-length string only definite chunks of the same
    /// major type, or the terminating BREAK, are acceptable.
    fn only_same<H: EventHandler>(&mut self, cb: &mut H, c: u8) -> Result<()> {
        debug_assert!(self.sp > 0);

        if c == BREAK {
            return self.break_byte(cb);
        }

        let opcode = c & MAJOR_MASK;
        let minor = c & MINOR_MASK;

        if opcode != self.st[self.sp - 1].opcode {
            return Err(StreamError::BadCoding);
        }
        if minor == MINOR_INDEFINITE {
            // indefinite chunks do not nest
            return Err(StreamError::BadCoding);
        }

        self.st[self.sp].opcode = opcode;

        if minor == 0 {
            // an empty chunk contributes nothing
            return Ok(());
        }
        if minor <= MINOR_IMMEDIATE_MAX {
            let st = &mut self.st[self.sp];
            st.indefinite = false;
            st.remaining = minor as u64;
            st.state = State::Collate;
            return Ok(());
        }
        self.begin_collect(minor)
    }

    /***********************************************************************************************
     * Parsing layers
     **********************************************************************************************/

    fn enter_subparse(&mut self, paths: &'p [&'p str]) -> Result<()> {
        if self.lsp + 1 == MAX_PARSE_LAYERS {
            return Err(StreamError::Overflow);
        }
        let ppos = self.layers[self.lsp].ppos;
        self.layers[self.lsp].saved_match = self.path_match;
        self.layers[self.lsp].saved_match_len = self.path_match_len;
        self.layers[self.lsp].saved_wild = self.wild;
        self.layers[self.lsp].saved_wildcount = self.wildcount;
        self.lsp += 1;
        self.layers[self.lsp] = ParseLayer {
            paths,
            base: ppos,
            ppos,
            saved_match: 0,
            saved_match_len: 0,
            saved_wild: [0u16; MAX_WILDCARDS],
            saved_wildcount: 0,
        };
        self.path_match = 0;
        self.path_match_len = 0;
        self.wildcount = 0;
        self.check_path_match();
        Ok(())
    }

    fn leave_subparse(&mut self) -> Result<()> {
        if self.lsp == 0 {
            return Err(StreamError::Overflow);
        }
        self.lsp -= 1;
        self.path_match = self.layers[self.lsp].saved_match;
        self.path_match_len = self.layers[self.lsp].saved_match_len;
        self.wild = self.layers[self.lsp].saved_wild;
        self.wildcount = self.layers[self.lsp].saved_wildcount;
        Ok(())
    }
}

/// The push parser: a [`StreamContext`] plus the installed event handler.
///
/// Construction delivers `Constructed` to the handler and dropping the
/// parser delivers `Destructed`; in between, any number of byte chunks can
/// be pushed through [`feed`](CBORStreamParser::feed).
pub struct CBORStreamParser<'p, H: EventHandler> {
    ctx: StreamContext<'p>,
    handler: H,
}

impl<'p, H: EventHandler> CBORStreamParser<'p, H> {
    /// Construct a parser with an installed handler and pattern set. The
    /// handler receives `Constructed` immediately; its verdict on lifecycle
    /// events is not consulted.
    pub fn new(mut handler: H, paths: &'p [&'p str]) -> CBORStreamParser<'p, H> {
        let ctx = StreamContext::new(paths);
        let _ = handler.on_event(&ctx, Event::Constructed);
        CBORStreamParser { ctx, handler }
    }

    /// Drive a chunk of document bytes through the parser, invoking the
    /// handler inline for every event. Returns [`Status::Complete`] when the
    /// chunk ended exactly at a top-level item boundary. On error a single
    /// `Failed` event is delivered first, and the parser must be
    /// reconstructed before further use.
    pub fn feed(&mut self, cbor: &[u8]) -> Result<Status> {
        match self.ctx.run(cbor, &mut self.handler) {
            Ok(status) => Ok(status),
            Err(e) => {
                let _ = self.handler.on_event(&self.ctx, Event::Failed);
                Err(e)
            }
        }
    }

    /// Replace the installed handler: the outgoing one receives
    /// `Destructed`, the incoming one `Constructed`.
    pub fn change_callback(&mut self, handler: H) {
        let _ = self.handler.on_event(&self.ctx, Event::Destructed);
        self.handler = handler;
        let _ = self.handler.on_event(&self.ctx, Event::Constructed);
    }

    /// Switch to a different pattern set for an embedded sub-document. The
    /// new patterns match against the path relative to the current position;
    /// the outer match state is saved and restored by
    /// [`leave_subparse`](CBORStreamParser::leave_subparse). Layers can only
    /// be switched between `feed` calls.
    pub fn enter_subparse(&mut self, paths: &'p [&'p str]) -> Result<()> {
        self.ctx.enter_subparse(paths)
    }

    /// Return to the pattern set that was active before the matching
    /// [`enter_subparse`](CBORStreamParser::enter_subparse).
    pub fn leave_subparse(&mut self) -> Result<()> {
        self.ctx.leave_subparse()
    }

    /// The callback-visible parser state, for inspection between feeds.
    pub fn context(&self) -> &StreamContext<'p> {
        &self.ctx
    }

    /// The installed handler, for retrieving accumulated application state.
    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<'p, H: EventHandler> Drop for CBORStreamParser<'p, H> {
    fn drop(&mut self) {
        let _ = self.handler.on_event(&self.ctx, Event::Destructed);
    }
}
