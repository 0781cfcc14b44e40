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
 * rs_streamcbor document path pattern matching
 *
 * A streaming (SAX-style) push parser for CBOR (RFC8949). This implementation is designed for use
 * in constrained systems and requires neither the Rust standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::MAX_WILDCARDS;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
use std::println;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Match `pattern` against the live document `path`.
///
/// Literal bytes match themselves. A `*` consumes a run of path bytes up to
/// but not including the next `.`; a pattern-final `*` consumes everything
/// that remains. A match requires both cursors to be exhausted together.
///
/// On success, returns the number of wildcard captures and records in
/// `wild[..count]` the path offset where each `*` began consuming. Patterns
/// with more than [`MAX_WILDCARDS`] stars still match; the surplus capture
/// positions are not recorded.
///
/// Because `*` with a continuation stops at the first `.`, overlapping
/// patterns must be registered most-specific first, e.g. `x.*.*` before
/// `x.*`.
#[cfg_attr(feature = "trace", trace)]
pub(crate) fn match_pattern(
    path: &[u8],
    pattern: &[u8],
    wild: &mut [u16; MAX_WILDCARDS],
) -> Option<usize> {
    let mut p = 0usize;
    let mut q = 0usize;
    let mut count = 0usize;

    while p < path.len() && q < pattern.len() {
        if pattern[q] != b'*' {
            if path[p] != pattern[q] {
                return None;
            }
            p += 1;
            q += 1;
            continue;
        }
        if count < MAX_WILDCARDS {
            wild[count] = p as u16;
            count += 1;
        }
        q += 1;
        while p < path.len() && (path[p] != b'.' || q == pattern.len()) {
            p += 1;
        }
    }

    if p == path.len() && q == pattern.len() {
        Some(count)
    } else {
        None
    }
}
