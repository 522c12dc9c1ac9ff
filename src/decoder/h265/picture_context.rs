// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::rc::Rc;

use bytes::Bytes;

use crate::codec::h265::dpb::Dpb;
use crate::codec::h265::dpb::DpbEntry;
use crate::codec::h265::dpb::RefPicSet;
use crate::codec::h265::parser::Pps;
use crate::codec::h265::parser::Slice;
use crate::codec::h265::parser::SliceHeader;
use crate::codec::h265::parser::Sps;
use crate::codec::h265::parser::Vps;
use crate::codec::h265::picture::BufferFlags;
use crate::codec::h265::picture::PictureData;
use crate::decoder::client::HevcPictureData;
use crate::decoder::client::PictureDataRecord;
use crate::decoder::client::MAX_REF_PICS;
use crate::decoder::client::REF_INDEX_UNSET;
use crate::decoder::client::REF_PIC_SET_LIST_SIZE;
use crate::decoder::h265::bitstream::SliceAggregator;
use crate::decoder::DecodeError;
use crate::decoder::PictureHandle;
use crate::video_std::h265::StdH265Pps;
use crate::video_std::h265::StdH265Sps;
use crate::video_std::h265::StdH265Vps;

/// State of the picture between `new_picture` and `end_picture`.
pub(crate) struct PictureContext<P, O> {
    /// The buffer the picture is decoded into.
    pub(crate) picture: PictureHandle<P>,
    pub(crate) bitstream: SliceAggregator,
    /// Set by `start_picture`.
    pub(crate) data: Option<PictureDataRecord<P, O>>,
}

impl<P, O> PictureContext<P, O> {
    pub(crate) fn new(picture: PictureHandle<P>) -> Self {
        Self {
            picture,
            bitstream: Default::default(),
            data: None,
        }
    }
}

/// The standard records a picture refers to, and the client objects of their pushed versions.
pub(crate) struct ActiveParameterSets<O> {
    pub(crate) vps: Rc<StdH265Vps>,
    pub(crate) vps_object: Option<O>,
    pub(crate) sps: Rc<StdH265Sps>,
    pub(crate) sps_object: Option<O>,
    pub(crate) pps: Rc<StdH265Pps>,
    pub(crate) pps_object: Option<O>,
}

/// Flat table of the reference pictures of the DPB, in DPB order.
pub(crate) struct ReferenceTable<P> {
    pub(crate) pictures: [Option<PictureHandle<P>>; MAX_REF_PICS],
    pub(crate) pic_order_cnt_val: [i32; MAX_REF_PICS],
    pub(crate) is_long_term: [bool; MAX_REF_PICS],
    pub(crate) len: usize,
}

impl<P> ReferenceTable<P> {
    /// Gathers the pictures of `dpb` marked as used for reference.
    pub(crate) fn from_dpb(dpb: &Dpb<PictureHandle<P>>) -> Result<Self, DecodeError> {
        let references = dpb.get_all_references();
        if references.len() > MAX_REF_PICS {
            log::error!(
                "{} reference pictures in the DPB, only {} fit the reference table",
                references.len(),
                MAX_REF_PICS
            );
            return Err(DecodeError::TooManyReferences {
                count: references.len(),
                capacity: MAX_REF_PICS,
            });
        }

        let mut table = Self {
            pictures: Default::default(),
            pic_order_cnt_val: [0; MAX_REF_PICS],
            is_long_term: [false; MAX_REF_PICS],
            len: references.len(),
        };

        for (i, DpbEntry(pic, handle)) in references.into_iter().enumerate() {
            let pic = pic.borrow();
            table.pictures[i] = Some(handle);
            table.pic_order_cnt_val[i] = pic.pic_order_cnt_val;
            table.is_long_term[i] = pic.is_long_term();
        }

        Ok(table)
    }

    /// Maps the entries of `list` to their position in the table.
    ///
    /// Slot i describes the i-th available picture of `list` and holds the index of the first
    /// table entry with the same POC, or [`REF_INDEX_UNSET`]. Missing pictures of `list` are
    /// skipped.
    pub(crate) fn classify(
        &self,
        list: &[Option<DpbEntry<PictureHandle<P>>>],
    ) -> [i8; REF_PIC_SET_LIST_SIZE] {
        let pocs = &self.pic_order_cnt_val[..self.len];
        let mut indices = [REF_INDEX_UNSET; REF_PIC_SET_LIST_SIZE];
        let mut entries = list.iter().flatten();

        for slot in indices.iter_mut().take(pocs.len()) {
            let Some(entry) = entries.next() else {
                break;
            };

            let poc = entry.0.borrow().pic_order_cnt_val;
            if let Some(index) = pocs.iter().position(|p| *p == poc) {
                *slot = index as i8;
            }
        }

        indices
    }
}

/// NumDeltaPocs[ RefRpsIdx ] when the slice's RPS is predicted from one of the SPS, 0 otherwise.
fn num_delta_pocs_of_ref_rps_idx(hdr: &SliceHeader, sps: &Sps) -> u32 {
    let rps = &hdr.short_term_ref_pic_set;
    if hdr.short_term_ref_pic_set_sps_flag || !rps.inter_ref_pic_set_prediction_flag {
        return 0;
    }

    // stRpsIdx is num_short_term_ref_pic_sets for an RPS coded in the slice header (7-59).
    usize::from(sps.num_short_term_ref_pic_sets)
        .checked_sub(usize::from(rps.delta_idx_minus1) + 1)
        .and_then(|ref_rps_idx| sps.short_term_ref_pic_set.get(ref_rps_idx))
        .map_or(0, |ref_rps| ref_rps.num_delta_pocs)
}

/// Fills the record submitted for `picture`. The bitstream fields are left empty until the
/// picture ends.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_picture_data<P, O>(
    curr_pic: PictureHandle<P>,
    picture: &PictureData,
    slice: &Slice<&[u8]>,
    vps: &Vps,
    sps: &Sps,
    pps: &Pps,
    params: ActiveParameterSets<O>,
    dpb: &Dpb<PictureHandle<P>>,
    rps: &RefPicSet<PictureHandle<P>>,
) -> Result<PictureDataRecord<P, O>, DecodeError> {
    let references = ReferenceTable::from_dpb(dpb)?;
    let hdr = slice.header();
    let nalu_type = slice.nalu().header().type_;

    let ref_pic_set_st_curr_before = references.classify(rps.st_curr_before());
    let ref_pic_set_st_curr_after = references.classify(rps.st_curr_after());
    let ref_pic_set_lt_curr = references.classify(rps.lt_curr());

    let vui = &sps.vui_parameters;
    let color_primaries = if sps.vui_parameters_present_flag {
        vui.colour_primaries as u8
    } else {
        0
    };

    let (bit_depth_luma_minus8, bit_depth_chroma_minus8) = if pps.scc_extension_flag {
        (
            pps.scc_extension.luma_bit_depth_entry_minus8,
            pps.scc_extension.chroma_bit_depth_entry_minus8,
        )
    } else {
        (0, 0)
    };

    log::debug!(
        "Picture POC {}: {} references, StCurrBefore {:?} StCurrAfter {:?} LtCurr {:?}",
        picture.pic_order_cnt_val,
        references.len,
        ref_pic_set_st_curr_before,
        ref_pic_set_st_curr_after,
        ref_pic_set_lt_curr
    );

    let hevc = HevcPictureData {
        std_vps: params.vps,
        vps_client_object: params.vps_object,
        std_sps: params.sps,
        sps_client_object: params.sps_object,
        std_pps: params.pps,
        pps_client_object: params.pps_object,
        pic_parameter_set_id: pps.pic_parameter_set_id,
        seq_parameter_set_id: sps.seq_parameter_set_id,
        vps_video_parameter_set_id: sps.video_parameter_set_id,
        irap_pic_flag: nalu_type.is_irap(),
        idr_pic_flag: nalu_type.is_idr(),
        num_bits_for_short_term_rps_in_slice: hdr.st_rps_bits,
        num_delta_pocs_of_ref_rps_idx: num_delta_pocs_of_ref_rps_idx(hdr, sps),
        num_poc_total_curr: hdr.num_pic_total_curr,
        num_poc_st_curr_before: rps.num_poc_st_curr_before as u32,
        num_poc_st_curr_after: rps.num_poc_st_curr_after as u32,
        num_poc_lt_curr: rps.num_poc_lt_curr as u32,
        curr_pic_order_cnt_val: picture.pic_order_cnt_val,
        ref_pics: references.pictures,
        pic_order_cnt_val: references.pic_order_cnt_val,
        is_long_term: references.is_long_term,
        num_ref_pics: references.len,
        ref_pic_set_st_curr_before,
        ref_pic_set_st_curr_after,
        ref_pic_set_lt_curr,
        profile_level: vps.profile_tier_level.general_profile_idc,
        color_primaries,
        bit_depth_luma_minus8,
        bit_depth_chroma_minus8,
    };

    Ok(PictureDataRecord {
        pic_width_in_mbs: u32::from(sps.width()) / 16,
        frame_height_in_mbs: u32::from(sps.height()) / 16,
        curr_pic,
        field_pic_flag: sps.vui_parameters_present_flag && vui.field_seq_flag,
        bottom_field_flag: picture.buffer_flags.contains(BufferFlags::BOTTOM_FIELD),
        progressive_frame: !picture.buffer_flags.contains(BufferFlags::INTERLACED),
        top_field_first: picture.buffer_flags.contains(BufferFlags::TFF),
        ref_pic_flag: picture.is_ref(),
        intra_pic_flag: picture.intra_pic_flag,
        chroma_format: sps.chroma_format_idc,
        picture_order_count: picture.pic_order_cnt_val,
        bitstream: Bytes::new(),
        slice_offsets: Vec::new(),
        num_slices: 0,
        hevc,
    })
}
