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
 * Adversarial and lifecycle test cases: malformed encodings, capacity limits, callback
 * cancellation and construct/destruct notifications.
 **************************************************************************************************/
extern crate tps_streamcbor;

use std::cell::RefCell;
use std::rc::Rc;

use tps_streamcbor::error::StreamError;
use tps_streamcbor::parser::{CBORStreamParser, EventHandler, Status, StreamContext};
use tps_streamcbor::types::{Control, Event};

type SharedLog = Rc<RefCell<Vec<(&'static str, Event)>>>;

/// Records into a log owned outside the parser, so lifecycle events are
/// still observable after the parser is dropped.
struct Tap {
    name: &'static str,
    log: SharedLog,
    reject_on: Option<Event>,
}

impl Tap {
    fn new(name: &'static str, log: &SharedLog) -> Tap {
        Tap {
            name,
            log: Rc::clone(log),
            reject_on: None,
        }
    }
}

impl EventHandler for Tap {
    fn on_event(&mut self, _ctx: &StreamContext<'_>, event: Event) -> Control {
        self.log.borrow_mut().push((self.name, event));
        if Some(event) == self.reject_on {
            Control::Reject
        } else {
            Control::Proceed
        }
    }
}

fn expect_error(bytes: &[u8], err: StreamError) {
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut parser = CBORStreamParser::new(Tap::new("t", &log), &[]);
    assert_eq!(parser.feed(bytes), Err(err), "input {:02x?}", bytes);
    // every reject path notifies the callback before returning
    assert_eq!(
        log.borrow().last().map(|&(_, e)| e),
        Some(Event::Failed),
        "input {:02x?}",
        bytes
    );
}

#[test]
fn reserved_minors_rejected_for_every_major() {
    for head in [
        0x1cu8, 0x1d, 0x1e, 0x3c, 0x5c, 0x7c, 0x9c, 0xbc, 0xdc, 0xfc, 0xfd, 0xfe,
    ]
    .iter()
    {
        expect_error(&[*head], StreamError::BadCoding);
    }
}

#[test]
fn indefinite_marker_rejected_for_integers_and_tags() {
    expect_error(&[0x3f], StreamError::BadCoding);
    expect_error(&[0xdf], StreamError::BadCoding);
}

#[test]
fn simple_extension_byte_must_exceed_31() {
    // boundary scenario: f8 0a duplicates an implicit simple encoding
    expect_error(&[0xf8, 0x0a], StreamError::BadCoding);
    expect_error(&[0xf8, 0x00], StreamError::BadCoding);
    expect_error(&[0xf8, 0x1f], StreamError::BadCoding);
}

#[test]
fn break_requires_indefinite_parent() {
    expect_error(&[0xff], StreamError::BadCoding);
    expect_error(&[0x81, 0xff], StreamError::BadCoding);
    expect_error(&[0x82, 0x01, 0xff], StreamError::BadCoding);
    expect_error(&[0xa1, 0x01, 0xff], StreamError::BadCoding);
}

#[test]
fn break_in_map_needs_even_entries() {
    // {_ "a": <missing value>}
    expect_error(&[0xbf, 0x61, 0x61, 0xff], StreamError::BadCoding);
    // while a complete entry terminates fine
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut parser = CBORStreamParser::new(Tap::new("t", &log), &[]);
    assert_eq!(
        parser.feed(&[0xbf, 0x61, 0x61, 0x01, 0xff]),
        Ok(Status::Complete)
    );
}

#[test]
fn indefinite_string_chunks_must_match_type() {
    // tstr chunk inside indefinite bstr and vice versa
    expect_error(&[0x5f, 0x61, 0x61], StreamError::BadCoding);
    expect_error(&[0x7f, 0x41, 0x01], StreamError::BadCoding);
    // arbitrary items are not chunks either
    expect_error(&[0x5f, 0x00], StreamError::BadCoding);
    // indefinite chunks do not nest
    expect_error(&[0x5f, 0x5f], StreamError::BadCoding);
    expect_error(&[0x7f, 0x7f], StreamError::BadCoding);
}

#[test]
fn frame_stack_overflow() {
    // tags consume a frame each without touching path or index storage
    let deep = [0xc0u8; 12];
    expect_error(&deep, StreamError::Overflow);

    // one frame fewer parses
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut parser = CBORStreamParser::new(Tap::new("t", &log), &[]);
    let mut ok = [0xc0u8; 12].to_vec();
    ok.truncate(11);
    ok.push(0x01);
    assert_eq!(parser.feed(&ok), Ok(Status::Complete));
    let tag_ends = log
        .borrow()
        .iter()
        .filter(|&&(_, e)| e == Event::TagEnd)
        .count();
    assert_eq!(tag_ends, 11);
}

#[test]
fn array_index_stack_overflow() {
    expect_error(&[0x81u8; 9], StreamError::Overflow);

    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut parser = CBORStreamParser::new(Tap::new("t", &log), &[]);
    let mut ok = [0x81u8; 8].to_vec();
    ok.push(0x05);
    assert_eq!(parser.feed(&ok), Ok(Status::Complete));
}

#[test]
fn path_buffer_overflow() {
    // a single 128-byte key cannot fit behind the map's dot
    let mut bytes = vec![0xa1, 0x78, 0x80];
    bytes.extend_from_slice(&[b'k'; 128]);
    bytes.push(0x01);
    expect_error(&bytes, StreamError::Overflow);

    // 126 bytes of key still fit
    let mut bytes = vec![0xa1, 0x78, 0x7e];
    bytes.extend_from_slice(&[b'k'; 126]);
    bytes.push(0x01);
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut parser = CBORStreamParser::new(Tap::new("t", &log), &[]);
    assert_eq!(parser.feed(&bytes), Ok(Status::Complete));
}

#[test]
fn callback_rejection_aborts_with_failure() {
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut tap = Tap::new("t", &log);
    tap.reject_on = Some(Event::NumUInt);
    let mut parser = CBORStreamParser::new(tap, &[]);
    assert_eq!(
        parser.feed(&[0x83, 0x01, 0x02, 0x03]),
        Err(StreamError::RejectedByCallback)
    );
    assert_eq!(
        log.borrow()
            .iter()
            .map(|&(_, e)| e)
            .collect::<Vec<_>>(),
        vec![
            Event::Constructed,
            Event::ArrayStart,
            Event::NumUInt,
            Event::Failed
        ]
    );
}

#[test]
fn rejection_at_container_end() {
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut tap = Tap::new("t", &log);
    tap.reject_on = Some(Event::ArrayEnd);
    let mut parser = CBORStreamParser::new(tap, &[]);
    assert_eq!(
        parser.feed(&[0x81, 0x01]),
        Err(StreamError::RejectedByCallback)
    );
    assert_eq!(
        log.borrow().last().map(|&(_, e)| e),
        Some(Event::Failed)
    );
}

#[test]
fn lifecycle_notifications() {
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    {
        let mut parser = CBORStreamParser::new(Tap::new("first", &log), &[]);
        parser.feed(&[0x00]).unwrap();
        parser.change_callback(Tap::new("second", &log));
        parser.feed(&[0x01]).unwrap();
    }
    assert_eq!(
        *log.borrow(),
        vec![
            ("first", Event::Constructed),
            ("first", Event::NumUInt),
            ("first", Event::Complete),
            ("first", Event::Destructed),
            ("second", Event::Constructed),
            ("second", Event::NumUInt),
            ("second", Event::Complete),
            ("second", Event::Destructed),
        ]
    );
}

#[test]
fn feed_reports_continue_mid_document() {
    let log: SharedLog = Rc::new(RefCell::new(Vec::new()));
    let mut parser = CBORStreamParser::new(Tap::new("t", &log), &[]);
    assert_eq!(parser.feed(&[0x82, 0x01]), Ok(Status::Continue));
    assert_eq!(parser.feed(&[0x02]), Ok(Status::Complete));
}

#[test]
fn error_strings() {
    assert_eq!(StreamError::BadCoding.as_str(), "Bad CBOR coding");
    assert_eq!(StreamError::Overflow.as_str(), "Overflow");
    assert_eq!(
        StreamError::RejectedByCallback.as_str(),
        "Parser callback errored (see earlier error)"
    );
    assert_eq!(
        StreamError::OutOfRange.as_str(),
        "Overflow or underflow in number conversion"
    );
    assert_eq!(
        StreamError::IncompatibleType.as_str(),
        "Attempt to convert an item of incompatible type"
    );
}

#[cfg(feature = "full")]
#[test]
fn error_display_matches_static_text() {
    for e in [
        StreamError::BadCoding,
        StreamError::Overflow,
        StreamError::RejectedByCallback,
        StreamError::OutOfRange,
        StreamError::IncompatibleType,
    ]
    .iter()
    {
        assert_eq!(format!("{}", e), e.as_str());
    }
}
