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
 * Scalar decode test cases, largely from RFC8949 Table 6, checked against the event stream.
 **************************************************************************************************/
extern crate tps_streamcbor;

use tps_streamcbor::parser::{CBORStreamParser, EventHandler, Status, StreamContext};
use tps_streamcbor::types::{Control, Event, Item};

#[cfg(feature = "float")]
use half::f16;

#[derive(Debug, Clone, PartialEq)]
struct Ev(Event, Option<Item>);

#[derive(Default)]
struct Recorder {
    log: Vec<Ev>,
}

impl EventHandler for Recorder {
    fn on_event(&mut self, ctx: &StreamContext<'_>, event: Event) -> Control {
        let item = match event {
            Event::NumUInt
            | Event::NumInt
            | Event::Float16
            | Event::Float32
            | Event::Float64
            | Event::Simple
            | Event::TagStart => Some(ctx.item()),
            _ => None,
        };
        self.log.push(Ev(event, item));
        Control::Proceed
    }
}

fn decode(bytes: &[u8]) -> Vec<Ev> {
    let mut parser = CBORStreamParser::new(Recorder::default(), &[]);
    assert_eq!(parser.feed(bytes), Ok(Status::Complete));
    parser.handler().log.clone()
}

fn expect_scalar(bytes: &[u8], event: Event, item: Item) {
    assert_eq!(
        decode(bytes),
        vec![Ev(event, Some(item)), Ev(Event::Complete, None)],
        "input {:02x?}",
        bytes
    );
}

fn expect_events(bytes: &[u8], events: &[Event]) {
    let log: Vec<Event> = decode(bytes).into_iter().map(|Ev(e, _)| e).collect();
    assert_eq!(log, events, "input {:02x?}", bytes);
}

#[test]
fn rfc8949_decode_uint() {
    expect_scalar(&[0x00], Event::NumUInt, Item::UInt(0));
    expect_scalar(&[0x01], Event::NumUInt, Item::UInt(1));
    expect_scalar(&[0x0a], Event::NumUInt, Item::UInt(10));
    expect_scalar(&[0x17], Event::NumUInt, Item::UInt(23));
    expect_scalar(&[0x18, 0x18], Event::NumUInt, Item::UInt(24));
    expect_scalar(&[0x18, 0x19], Event::NumUInt, Item::UInt(25));
    expect_scalar(&[0x18, 0x64], Event::NumUInt, Item::UInt(100));
    expect_scalar(&[0x19, 0x03, 0xe8], Event::NumUInt, Item::UInt(1000));
    expect_scalar(
        &[0x1a, 0x00, 0x0f, 0x42, 0x40],
        Event::NumUInt,
        Item::UInt(1000000),
    );
    expect_scalar(
        &[0x1b, 0x00, 0x00, 0x00, 0xe8, 0xd4, 0xa5, 0x10, 0x00],
        Event::NumUInt,
        Item::UInt(1000000000000),
    );
    expect_scalar(
        &[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        Event::NumUInt,
        Item::UInt(18446744073709551615),
    );
}

#[test]
fn rfc8949_decode_nint() {
    expect_scalar(&[0x20], Event::NumInt, Item::Int(-1));
    expect_scalar(&[0x29], Event::NumInt, Item::Int(-10));
    expect_scalar(&[0x38, 0x63], Event::NumInt, Item::Int(-100));
    expect_scalar(&[0x39, 0x03, 0xe7], Event::NumInt, Item::Int(-1000));
    expect_scalar(
        &[0x3a, 0x00, 0x0f, 0x42, 0x3f],
        Event::NumInt,
        Item::Int(-1000000),
    );
    expect_scalar(
        &[0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        Event::NumInt,
        Item::Int(i64::min_value()),
    );
}

#[test]
fn rfc8949_decode_float16_payloads() {
    // Raw binary16 payloads: 0.0, 1.0, 65504.0, +Infinity
    expect_scalar(&[0xf9, 0x00, 0x00], Event::Float16, Item::Float16(0x0000));
    expect_scalar(&[0xf9, 0x3c, 0x00], Event::Float16, Item::Float16(0x3c00));
    expect_scalar(&[0xf9, 0x7b, 0xff], Event::Float16, Item::Float16(0x7bff));
    expect_scalar(&[0xf9, 0x7c, 0x00], Event::Float16, Item::Float16(0x7c00));
}

#[cfg(feature = "float")]
#[test]
fn rfc8949_decode_float16_values() {
    let log = decode(&[0xf9, 0x3c, 0x00]);
    if let Ev(Event::Float16, Some(item)) = log[0] {
        assert_eq!(item.as_f16(), Some(f16::from_f32(1.0)));
    } else {
        panic!("expected a Float16 event, got {:?}", log);
    }
}

#[test]
fn rfc8949_decode_float32() {
    expect_scalar(
        &[0xfa, 0x47, 0xc3, 0x50, 0x00],
        Event::Float32,
        Item::Float32(100000.0),
    );
    expect_scalar(
        &[0xfa, 0x7f, 0x7f, 0xff, 0xff],
        Event::Float32,
        Item::Float32(3.4028234663852886e38),
    );
}

#[test]
fn rfc8949_decode_float64() {
    expect_scalar(
        &[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a],
        Event::Float64,
        Item::Float64(1.1),
    );
    // boundary scenario: pi
    expect_scalar(
        &[0xfb, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18],
        Event::Float64,
        Item::Float64(3.141592653589793),
    );
}

#[test]
fn rfc8949_decode_named_simples() {
    expect_events(&[0xf4], &[Event::False, Event::Complete]);
    expect_events(&[0xf5], &[Event::True, Event::Complete]);
    expect_events(&[0xf6], &[Event::Null, Event::Complete]);
    expect_events(&[0xf7], &[Event::Undefined, Event::Complete]);
}

#[test]
fn rfc8949_decode_unassigned_simples() {
    expect_scalar(&[0xf0], Event::Simple, Item::Simple(16));
    expect_scalar(&[0xe0], Event::Simple, Item::Simple(0));
    expect_scalar(&[0xf8, 0x20], Event::Simple, Item::Simple(32));
    expect_scalar(&[0xf8, 0xff], Event::Simple, Item::Simple(255));
}

#[test]
fn rfc8949_decode_empty_strings() {
    // boundary scenario: empty bstr is START immediately followed by END
    expect_events(
        &[0x40],
        &[Event::BlobStart, Event::BlobEnd, Event::Complete],
    );
    expect_events(&[0x60], &[Event::StrStart, Event::StrEnd, Event::Complete]);
}

#[test]
fn rfc8949_decode_tags() {
    assert_eq!(
        decode(&[0xc0, 0x61, 0x61]),
        vec![
            Ev(Event::TagStart, Some(Item::Tag(0))),
            Ev(Event::StrStart, None),
            Ev(Event::StrEnd, None),
            Ev(Event::TagEnd, None),
            Ev(Event::Complete, None),
        ]
    );
    // two-byte tag number over a one-byte bstr
    assert_eq!(
        decode(&[0xd8, 0x20, 0x41, 0x01]),
        vec![
            Ev(Event::TagStart, Some(Item::Tag(32))),
            Ev(Event::BlobStart, None),
            Ev(Event::BlobEnd, None),
            Ev(Event::TagEnd, None),
            Ev(Event::Complete, None),
        ]
    );
    // nested tags bracket in order
    assert_eq!(
        decode(&[0xc1, 0xc2, 0x00]),
        vec![
            Ev(Event::TagStart, Some(Item::Tag(1))),
            Ev(Event::TagStart, Some(Item::Tag(2))),
            Ev(Event::NumUInt, Some(Item::UInt(0))),
            Ev(Event::TagEnd, None),
            Ev(Event::TagEnd, None),
            Ev(Event::Complete, None),
        ]
    );
}

#[test]
fn item_conversions() {
    use std::convert::TryFrom;
    use tps_streamcbor::error::StreamError;

    assert_eq!(u64::try_from(Item::UInt(7)), Ok(7));
    assert_eq!(u64::try_from(Item::Int(-7)), Err(StreamError::OutOfRange));
    assert_eq!(
        u64::try_from(Item::Tag(9)),
        Err(StreamError::IncompatibleType)
    );
    assert_eq!(i64::try_from(Item::UInt(7)), Ok(7));
    assert_eq!(i64::try_from(Item::Int(-7)), Ok(-7));
    assert_eq!(
        i64::try_from(Item::UInt(u64::max_value())),
        Err(StreamError::OutOfRange)
    );
    assert_eq!(f64::try_from(Item::Float64(1.5)), Ok(1.5));
    assert_eq!(f64::try_from(Item::Float32(0.5)), Ok(0.5));
    assert_eq!(
        f64::try_from(Item::UInt(1)),
        Err(StreamError::IncompatibleType)
    );
    // raw binary16 payloads are decoded via Item::as_f16, not TryFrom
    assert_eq!(
        f64::try_from(Item::Float16(0x3c00)),
        Err(StreamError::IncompatibleType)
    );
}

#[test]
fn string_event_offsets_are_uniform() {
    // integer dispatch may fold the blob and str families together
    let d = Event::BlobStart as i32 - Event::StrStart as i32;
    assert_eq!(Event::BlobChunk as i32 - Event::StrChunk as i32, d);
    assert_eq!(Event::BlobEnd as i32 - Event::StrEnd as i32, d);
}
