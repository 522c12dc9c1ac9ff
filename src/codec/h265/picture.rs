// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use bitflags::bitflags;

use crate::codec::h265::parser::NaluType;
use crate::codec::h265::parser::Slice;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Reference {
    #[default]
    None,
    ShortTerm,
    LongTerm,
}

bitflags! {
    /// Field layout of the buffer a picture was decoded from, as announced by
    /// the upstream element.
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
    #[repr(transparent)]
    pub struct BufferFlags: u32 {
        /// The buffer holds interlaced content.
        const INTERLACED = 1 << 0;
        /// The top field is displayed first.
        const TFF = 1 << 1;
        /// The first field is repeated.
        const RFF = 1 << 2;
        /// Only one field is present.
        const ONEFIELD = 1 << 3;
        /// The single field present is the bottom one.
        const BOTTOM_FIELD = 1 << 4;
    }
}

/// Data associated with an h.265 picture, as tracked by the parser.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct PictureData {
    pub nalu_type: NaluType,
    /// PicOrderCntVal.
    pub pic_order_cnt_val: i32,
    /// IntraPicFlag, i.e. all slices of the picture are I slices.
    pub intra_pic_flag: bool,
    pub buffer_flags: BufferFlags,
    /// Sequence number of the frame this picture is decoded into.
    pub system_frame_number: u32,

    // Internal state.
    reference: Reference,
}

impl PictureData {
    /// Instantiates a new `PictureData` from the first slice of a picture and
    /// the POC the parser computed for it.
    pub fn new_from_slice<T>(slice: &Slice<T>, pic_order_cnt_val: i32) -> Self {
        Self {
            nalu_type: slice.nalu.header.type_,
            pic_order_cnt_val,
            ..Default::default()
        }
    }

    /// Whether the current picture is a reference, either ShortTerm or LongTerm.
    pub fn is_ref(&self) -> bool {
        !matches!(self.reference, Reference::None)
    }

    /// Whether the current picture is a long term reference.
    pub fn is_long_term(&self) -> bool {
        matches!(self.reference, Reference::LongTerm)
    }

    pub fn set_reference(&mut self, reference: Reference) {
        log::debug!(
            "Set reference of POC {} to {:?}",
            self.pic_order_cnt_val,
            reference
        );

        self.reference = reference;
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_marking() {
        let mut pic = PictureData::default();
        pic.pic_order_cnt_val = 8;
        assert!(!pic.is_ref());

        pic.set_reference(Reference::ShortTerm);
        assert!(pic.is_ref());
        assert!(!pic.is_long_term());

        pic.set_reference(Reference::LongTerm);
        assert!(pic.is_ref());
        assert!(pic.is_long_term());
        assert_eq!(*pic.reference(), Reference::LongTerm);
    }
}
