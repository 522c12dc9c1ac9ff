// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Translation layer between a parsed H.265 stream and a Vulkan Video style decode client.
//!
//! The bitstream parser is expected to hand over parsed parameter sets, slices and its decoded
//! picture buffer. This crate turns those into the fixed-layout standard records a hardware
//! decoder consumes, tracks which parameter sets the client already knows about, and drives the
//! client through the per-picture lifecycle (see [`decoder::h265::H265Decoder`]).

pub mod codec;
pub mod decoder;
pub mod utils;
pub mod video_std;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Resolution {
    fn from(value: (u32, u32)) -> Self {
        Self {
            width: value.0,
            height: value.1,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

/// A rectangle, `max` being the size of the rectangle rather than its bottom-right corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect<T> {
    pub min: Point<T>,
    pub max: Point<T>,
}
