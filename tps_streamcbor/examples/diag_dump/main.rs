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
 * Example: dump a CBOR document as an event/path trace and as diagnostic notation.
 *
 * Run with: cargo run --example diag_dump --features full
 **************************************************************************************************/
use tps_streamcbor::debug::DiagSink;
use tps_streamcbor::error::StreamError;
use tps_streamcbor::parser::{CBORStreamParser, StreamContext};
use tps_streamcbor::types::{Control, Event};

// {"device": "thermostat-4", "readings": [21.5, 21.25], "ok": true}, as a
// definite map with a float32 and a float16 inside the array, tagged 1234.
const DOCUMENT: &[u8] = &[
    0xd9, 0x04, 0xd2, // tag(1234)
    0xa3, // map(3)
    0x66, 0x64, 0x65, 0x76, 0x69, 0x63, 0x65, // "device"
    0x6c, 0x74, 0x68, 0x65, 0x72, 0x6d, 0x6f, 0x73, 0x74, 0x61, 0x74, 0x2d, 0x34,
    0x68, 0x72, 0x65, 0x61, 0x64, 0x69, 0x6e, 0x67, 0x73, // "readings"
    0x82, // array(2)
    0xfa, 0x41, 0xac, 0x00, 0x00, // 21.5f32
    0xf9, 0x4d, 0x50, // 21.25f16
    0x62, 0x6f, 0x6b, // "ok"
    0xf5, // true
];

fn trace_events(ctx: &StreamContext<'_>, event: Event) -> Control {
    println!(
        "{:>12}  path={:<24} match={} item={:?}",
        format!("{:?}", event),
        String::from_utf8_lossy(ctx.path()),
        ctx.path_match(),
        ctx.item(),
    );
    Control::Proceed
}

fn main() -> Result<(), StreamError> {
    println!("== event trace ==");
    let paths = [".readings[]"];
    let mut parser = CBORStreamParser::new(trace_events, &paths);
    parser.feed(DOCUMENT)?;
    drop(parser);

    println!("== diagnostic notation ==");
    let mut parser = CBORStreamParser::new(DiagSink::new(std::io::stdout()), &[]);
    parser.feed(DOCUMENT)?;
    Ok(())
}
