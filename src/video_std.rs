// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Codec standard parameter records consumed by Vulkan Video style decoders.
//!
//! These mirror the `StdVideo*` structures of the Vulkan video codec headers: every flag word is
//! bit-packed in the order in which the flags are declared there, and optional sub-records that
//! the headers reference through pointers are `Option`s, present only when the matching presence
//! flag is set.

pub mod h265;
