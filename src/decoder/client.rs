// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Interface to the hardware decode client and the records exchanged with it.

use std::fmt;
use std::rc::Rc;

use bytes::Bytes;

use crate::decoder::ClientResult;
use crate::decoder::PictureHandle;
use crate::utils::gcd;
use crate::video_std::h265::StdH265Pps;
use crate::video_std::h265::StdH265Sps;
use crate::video_std::h265::StdH265Vps;
use crate::Resolution;

/// Number of entries of the reference picture table of a picture.
pub const MAX_REF_PICS: usize = 16;
/// Number of entries of each of the `RefPicSet*` index arrays.
pub const REF_PIC_SET_LIST_SIZE: usize = 8;
/// Value of the `RefPicSet*` index entries that do not designate a reference.
pub const REF_INDEX_UNSET: i8 = -1;

/// The hardware decode backend, as seen from the decoder.
///
/// All methods are called from the decoder's thread, one at a time. Failures are reported to the
/// caller of the decoder and never retried.
pub trait VideoDecodeClient {
    /// A picture buffer. It is given back to the client when dropped.
    type Picture;
    /// Client-side object created for a pushed parameter set.
    type ParameterObject: Clone;

    /// Called when a new sequence starts. Returns the number of decode surfaces the client
    /// allocated, which becomes the decoder's maximum DPB size.
    fn begin_sequence(&mut self, info: &SequenceInfo) -> ClientResult<u32>;

    /// Allocates the buffer a new picture will be decoded into.
    fn alloc_picture_buffer(&mut self) -> ClientResult<Self::Picture>;

    /// Pushes a new version of a parameter set.
    ///
    /// `client_object` holds the object created for the previous version of this parameter set,
    /// if any. The client may replace it, and the decoder hands it back in the pictures that use
    /// this version.
    fn update_picture_parameters(
        &mut self,
        params: &PictureParameters,
        client_object: &mut Option<Self::ParameterObject>,
        update_sequence_count: u32,
    ) -> ClientResult<()>;

    /// Submits a fully assembled picture for decoding.
    fn decode_picture(
        &mut self,
        picture: &PictureDataRecord<Self::Picture, Self::ParameterObject>,
    ) -> ClientResult<()>;

    /// Signals that `picture` is next in display order. `timestamp` is in 100 ns units.
    fn display_picture(
        &mut self,
        picture: &PictureHandle<Self::Picture>,
        timestamp: i64,
    ) -> ClientResult<()>;

    /// Forwards a NAL unit the decoder does not process itself.
    fn unhandled_nalu(&mut self, data: &[u8]) -> ClientResult<()>;
}

/// Codec operation announced at the start of a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VideoCodecOperation {
    #[default]
    DecodeH265,
}

/// Description of a new sequence, handed to [`VideoDecodeClient::begin_sequence`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceInfo {
    pub codec: VideoCodecOperation,
    /// Whether the stream uses a scalable profile.
    pub is_svc: bool,
    /// Frame rate, packed with [`pack_frame_rate`].
    pub frame_rate: u32,
    pub progressive_sequence: bool,
    pub coded_resolution: Resolution,
    /// Upper bound of the coded resolution over the stream, 0 if unknown.
    pub max_resolution: Resolution,
    /// Size of the conformance window.
    pub display_resolution: Resolution,
    /// 0 for 4:0:0, 1 for 4:2:0, 2 for 4:2:2 and 3 for 4:4:4.
    pub chroma_format_idc: u8,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
    pub video_full_range: bool,
    pub video_format: u8,
    pub colour_primaries: u8,
    pub transfer_characteristics: u8,
    pub matrix_coefficients: u8,
    /// bit_rate_scale of the HRD parameters.
    pub bitrate: u32,
    /// Display aspect ratio, when it can be computed.
    pub display_aspect_ratio: Option<(u32, u32)>,
    pub min_num_decode_surfaces: u32,
}

/// Kind of an H.265 parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParameterSetKind {
    Vps,
    Sps,
    Pps,
}

impl fmt::Display for ParameterSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterSetKind::Vps => write!(f, "VPS"),
            ParameterSetKind::Sps => write!(f, "SPS"),
            ParameterSetKind::Pps => write!(f, "PPS"),
        }
    }
}

/// A parameter set update pushed through [`VideoDecodeClient::update_picture_parameters`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PictureParameters {
    Vps(Rc<StdH265Vps>),
    Sps(Rc<StdH265Sps>),
    Pps(Rc<StdH265Pps>),
}

impl PictureParameters {
    pub fn kind(&self) -> ParameterSetKind {
        match self {
            PictureParameters::Vps(_) => ParameterSetKind::Vps,
            PictureParameters::Sps(_) => ParameterSetKind::Sps,
            PictureParameters::Pps(_) => ParameterSetKind::Pps,
        }
    }
}

/// H.265 specific part of a [`PictureDataRecord`].
pub struct HevcPictureData<P, O> {
    pub std_vps: Rc<StdH265Vps>,
    pub vps_client_object: Option<O>,
    pub std_sps: Rc<StdH265Sps>,
    pub sps_client_object: Option<O>,
    pub std_pps: Rc<StdH265Pps>,
    pub pps_client_object: Option<O>,
    pub pic_parameter_set_id: u8,
    pub seq_parameter_set_id: u8,
    pub vps_video_parameter_set_id: u8,

    pub irap_pic_flag: bool,
    pub idr_pic_flag: bool,

    /// Size in bits of the st_ref_pic_set() coded in the slice header.
    pub num_bits_for_short_term_rps_in_slice: u32,
    /// NumDeltaPocs of the RPS the slice's RPS is predicted from, 0 if not predicted.
    pub num_delta_pocs_of_ref_rps_idx: u32,
    pub num_poc_total_curr: u32,
    pub num_poc_st_curr_before: u32,
    pub num_poc_st_curr_after: u32,
    pub num_poc_lt_curr: u32,
    pub curr_pic_order_cnt_val: i32,

    /// Reference picture table. Only the first `num_ref_pics` entries are set.
    pub ref_pics: [Option<PictureHandle<P>>; MAX_REF_PICS],
    pub pic_order_cnt_val: [i32; MAX_REF_PICS],
    pub is_long_term: [bool; MAX_REF_PICS],
    pub num_ref_pics: usize,

    /// Indices into the reference picture table, [`REF_INDEX_UNSET`] when unused.
    pub ref_pic_set_st_curr_before: [i8; REF_PIC_SET_LIST_SIZE],
    pub ref_pic_set_st_curr_after: [i8; REF_PIC_SET_LIST_SIZE],
    pub ref_pic_set_lt_curr: [i8; REF_PIC_SET_LIST_SIZE],

    /// general_profile_idc of the VPS.
    pub profile_level: u8,
    pub color_primaries: u8,
    /// Palette entry bit depths, 0 unless the PPS carries an SCC extension.
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
}

/// Everything the client needs to decode one picture.
pub struct PictureDataRecord<P, O> {
    /// Coded width, in 16 pixel units.
    pub pic_width_in_mbs: u32,
    /// Coded height, in 16 pixel units.
    pub frame_height_in_mbs: u32,
    pub curr_pic: PictureHandle<P>,
    pub field_pic_flag: bool,
    pub bottom_field_flag: bool,
    pub progressive_frame: bool,
    pub top_field_first: bool,
    pub ref_pic_flag: bool,
    pub intra_pic_flag: bool,
    pub chroma_format: u8,
    pub picture_order_count: i32,

    /// Slice NAL units of the picture, each preceded by a start code.
    pub bitstream: Bytes,
    /// Offset of each slice in `bitstream`, followed by the length of `bitstream`.
    pub slice_offsets: Vec<u32>,
    pub num_slices: u32,

    pub hevc: HevcPictureData<P, O>,
}

/// Packs a frame rate the way [`SequenceInfo::frame_rate`] expects it: the numerator in the
/// upper 18 bits, the denominator in the lower 14 bits. Both are halved until they fit.
pub fn pack_frame_rate(mut numerator: u32, mut denominator: u32) -> u32 {
    while numerator >= (1 << 18) || denominator >= (1 << 14) {
        numerator >>= 1;
        denominator >>= 1;
    }

    (numerator << 14) | denominator
}

/// Display aspect ratio of a `width`x`height` picture made of `par_n`:`par_d` pixels.
pub fn display_aspect_ratio(width: u32, height: u32, par_n: u32, par_d: u32) -> Option<(u32, u32)> {
    let num = u64::from(width) * u64::from(par_n);
    let den = u64::from(height) * u64::from(par_d);
    if num == 0 || den == 0 {
        return None;
    }

    let gcd = gcd(num, den);
    Some((
        u32::try_from(num / gcd).ok()?,
        u32::try_from(den / gcd).ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_packing() {
        assert_eq!(pack_frame_rate(30, 1), 30 << 14 | 1);
        assert_eq!(pack_frame_rate(30000, 1001), 30000 << 14 | 1001);
        // The denominator does not fit in 14 bits: both halves are shifted twice.
        assert_eq!(pack_frame_rate(60000, 60000), 15000 << 14 | 15000);
        assert_eq!(pack_frame_rate(0, 1), 1);
    }

    #[test]
    fn aspect_ratio() {
        assert_eq!(display_aspect_ratio(1920, 1080, 1, 1), Some((16, 9)));
        assert_eq!(display_aspect_ratio(720, 576, 16, 15), Some((4, 3)));
        assert_eq!(display_aspect_ratio(1920, 1080, 0, 1), None);
        assert_eq!(display_aspect_ratio(0, 0, 1, 1), None);
    }

    #[test]
    fn parameter_kinds() {
        let params = PictureParameters::Pps(Rc::new(StdH265Pps::default()));
        assert_eq!(params.kind(), ParameterSetKind::Pps);
        assert_eq!(ParameterSetKind::Vps.to_string(), "VPS");
    }
}
