// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! H.265 data as produced by the bitstream parser: parameter sets, slices, pictures and the
//! decoded picture buffer.

pub mod dpb;
pub mod parser;
pub mod picture;
