// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! This file contains a dummy client whose only purpose is to let the decoder
//! run so we can test it in isolation. It records every call it receives.

use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;

use anyhow::anyhow;

use crate::codec::h265::parser::Nalu;
use crate::codec::h265::parser::Pps;
use crate::codec::h265::parser::ProfileTierLevel;
use crate::codec::h265::parser::Slice;
use crate::codec::h265::parser::SliceHeader;
use crate::codec::h265::parser::Sps;
use crate::codec::h265::parser::Vps;
use crate::decoder::client::ParameterSetKind;
use crate::decoder::client::PictureDataRecord;
use crate::decoder::client::PictureParameters;
use crate::decoder::client::SequenceInfo;
use crate::decoder::client::VideoDecodeClient;
use crate::decoder::client::REF_PIC_SET_LIST_SIZE;
use crate::decoder::ClientError;
use crate::decoder::ClientResult;
use crate::decoder::PictureHandle;

/// A picture buffer. Counts its release in the client it was allocated from.
#[derive(Debug)]
pub(crate) struct DummyPicture {
    pub(crate) id: u32,
    releases: Rc<Cell<u32>>,
}

impl Drop for DummyPicture {
    fn drop(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

/// Object created by the client for each parameter set push.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DummyObject(pub(crate) u32);

/// The parts of a submitted picture the tests look at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SubmittedPicture {
    pub(crate) picture: u32,
    pub(crate) picture_order_count: i32,
    pub(crate) ref_pic_flag: bool,
    pub(crate) bitstream: Vec<u8>,
    pub(crate) slice_offsets: Vec<u32>,
    pub(crate) num_slices: u32,
    pub(crate) ref_pics: Vec<u32>,
    pub(crate) ref_pic_set_st_curr_before: [i8; REF_PIC_SET_LIST_SIZE],
    pub(crate) ref_pic_set_st_curr_after: [i8; REF_PIC_SET_LIST_SIZE],
    pub(crate) ref_pic_set_lt_curr: [i8; REF_PIC_SET_LIST_SIZE],
    pub(crate) sps_client_object: Option<DummyObject>,
    pub(crate) pps_client_object: Option<DummyObject>,
    pub(crate) sps_width: u32,
    pub(crate) init_qp_minus26: i8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ClientCall {
    BeginSequence(SequenceInfo),
    AllocPictureBuffer(u32),
    UpdatePictureParameters {
        kind: ParameterSetKind,
        previous_object: Option<DummyObject>,
        update_sequence_count: u32,
    },
    DecodePicture(SubmittedPicture),
    DisplayPicture {
        picture: u32,
        timestamp: i64,
    },
    UnhandledNalu(Vec<u8>),
}

/// Recording client. Each operation can be told to fail.
#[derive(Debug, Default)]
pub(crate) struct DummyClient {
    calls: Vec<ClientCall>,
    next_picture: u32,
    next_object: u32,
    releases: Rc<Cell<u32>>,
    /// Number of surfaces returned by `begin_sequence`, the hint if unset.
    pub(crate) num_surfaces: Option<u32>,
    pub(crate) fail_begin_sequence: bool,
    pub(crate) fail_alloc: bool,
    pub(crate) fail_parameter_updates: bool,
    pub(crate) fail_decode: bool,
    pub(crate) fail_display: bool,
    pub(crate) fail_unhandled: bool,
}

impl DummyClient {
    pub(crate) fn calls(&self) -> &[ClientCall] {
        &self.calls
    }

    /// Kind and update sequence number of every parameter set push.
    pub(crate) fn parameter_updates(&self) -> Vec<(ParameterSetKind, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ClientCall::UpdatePictureParameters {
                    kind,
                    update_sequence_count,
                    ..
                } => Some((*kind, *update_sequence_count)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn submitted(&self) -> Vec<&SubmittedPicture> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ClientCall::DecodePicture(picture) => Some(picture),
                _ => None,
            })
            .collect()
    }

    /// Number of picture buffers given back so far.
    pub(crate) fn released_pictures(&self) -> u32 {
        self.releases.get()
    }

    /// Counter of released picture buffers, usable after the client is gone.
    pub(crate) fn release_counter(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.releases)
    }

    /// Creates a picture buffer without recording an allocation.
    pub(crate) fn make_picture(&mut self) -> DummyPicture {
        let id = self.next_picture;
        self.next_picture += 1;

        DummyPicture {
            id,
            releases: Rc::clone(&self.releases),
        }
    }
}

impl VideoDecodeClient for DummyClient {
    type Picture = DummyPicture;
    type ParameterObject = DummyObject;

    fn begin_sequence(&mut self, info: &SequenceInfo) -> ClientResult<u32> {
        self.calls.push(ClientCall::BeginSequence(info.clone()));

        if self.fail_begin_sequence {
            return Err(ClientError::Rejected("unsupported sequence"));
        }

        Ok(self.num_surfaces.unwrap_or(info.min_num_decode_surfaces))
    }

    fn alloc_picture_buffer(&mut self) -> ClientResult<Self::Picture> {
        if self.fail_alloc {
            return Err(ClientError::Other(anyhow!("out of picture buffers")));
        }

        let picture = self.make_picture();
        self.calls.push(ClientCall::AllocPictureBuffer(picture.id));

        Ok(picture)
    }

    fn update_picture_parameters(
        &mut self,
        params: &PictureParameters,
        client_object: &mut Option<Self::ParameterObject>,
        update_sequence_count: u32,
    ) -> ClientResult<()> {
        self.calls.push(ClientCall::UpdatePictureParameters {
            kind: params.kind(),
            previous_object: client_object.clone(),
            update_sequence_count,
        });

        if self.fail_parameter_updates {
            return Err(ClientError::Rejected("cannot create parameter object"));
        }

        self.next_object += 1;
        *client_object = Some(DummyObject(self.next_object));

        Ok(())
    }

    fn decode_picture(
        &mut self,
        picture: &PictureDataRecord<Self::Picture, Self::ParameterObject>,
    ) -> ClientResult<()> {
        let hevc = &picture.hevc;
        self.calls.push(ClientCall::DecodePicture(SubmittedPicture {
            picture: picture.curr_pic.id,
            picture_order_count: picture.picture_order_count,
            ref_pic_flag: picture.ref_pic_flag,
            bitstream: picture.bitstream.to_vec(),
            slice_offsets: picture.slice_offsets.clone(),
            num_slices: picture.num_slices,
            ref_pics: hevc.ref_pics[..hevc.num_ref_pics]
                .iter()
                .flatten()
                .map(|pic| pic.id)
                .collect(),
            ref_pic_set_st_curr_before: hevc.ref_pic_set_st_curr_before,
            ref_pic_set_st_curr_after: hevc.ref_pic_set_st_curr_after,
            ref_pic_set_lt_curr: hevc.ref_pic_set_lt_curr,
            sps_client_object: hevc.sps_client_object.clone(),
            pps_client_object: hevc.pps_client_object.clone(),
            sps_width: hevc.std_sps.pic_width_in_luma_samples,
            init_qp_minus26: hevc.std_pps.init_qp_minus26,
        }));

        if self.fail_decode {
            return Err(ClientError::Other(anyhow!("decode queue lost")));
        }

        Ok(())
    }

    fn display_picture(
        &mut self,
        picture: &PictureHandle<Self::Picture>,
        timestamp: i64,
    ) -> ClientResult<()> {
        self.calls.push(ClientCall::DisplayPicture {
            picture: picture.id,
            timestamp,
        });

        if self.fail_display {
            return Err(ClientError::Rejected("display queue full"));
        }

        Ok(())
    }

    fn unhandled_nalu(&mut self, data: &[u8]) -> ClientResult<()> {
        self.calls.push(ClientCall::UnhandledNalu(data.to_vec()));

        if self.fail_unhandled {
            return Err(ClientError::Rejected("unknown NAL unit"));
        }

        Ok(())
    }
}

fn profile_tier_level() -> ProfileTierLevel {
    let mut ptl = ProfileTierLevel {
        general_profile_idc: 1,
        general_level_idc: 60,
        general_progressive_source_flag: true,
        general_frame_only_constraint_flag: true,
        ..Default::default()
    };
    ptl.general_profile_compatibility_flag[1] = true;
    ptl.general_profile_compatibility_flag[2] = true;
    ptl
}

/// VPS of a 64x64 main profile stream.
pub(crate) fn vps_fixture() -> Vps {
    let mut vps = Vps {
        video_parameter_set_id: 0,
        base_layer_internal_flag: true,
        base_layer_available_flag: true,
        temporal_id_nesting_flag: true,
        profile_tier_level: profile_tier_level(),
        sub_layer_ordering_info_present_flag: true,
        ..Default::default()
    };
    vps.max_dec_pic_buffering_minus1[0] = 4;
    vps.max_num_reorder_pics[0] = 2;
    vps
}

/// SPS of a 64x64 main profile stream.
pub(crate) fn sps_fixture() -> Sps {
    let mut sps = Sps {
        video_parameter_set_id: 0,
        temporal_id_nesting_flag: true,
        profile_tier_level: profile_tier_level(),
        seq_parameter_set_id: 0,
        chroma_format_idc: 1,
        pic_width_in_luma_samples: 64,
        pic_height_in_luma_samples: 64,
        log2_max_pic_order_cnt_lsb_minus4: 4,
        sub_layer_ordering_info_present_flag: true,
        log2_diff_max_min_luma_coding_block_size: 3,
        log2_diff_max_min_luma_transform_block_size: 3,
        amp_enabled_flag: true,
        sample_adaptive_offset_enabled_flag: true,
        temporal_mvp_enabled_flag: true,
        strong_intra_smoothing_enabled_flag: true,
        ..Default::default()
    };
    sps.max_dec_pic_buffering_minus1[0] = 4;
    sps.max_num_reorder_pics[0] = 2;
    sps
}

/// PPS of a 64x64 main profile stream.
pub(crate) fn pps_fixture() -> Pps {
    Pps {
        pic_parameter_set_id: 0,
        seq_parameter_set_id: 0,
        cabac_init_present_flag: true,
        cu_qp_delta_enabled_flag: true,
        diff_cu_qp_delta_depth: 1,
        loop_filter_across_slices_enabled_flag: true,
        deblocking_filter_control_present_flag: true,
        pic_width_in_ctbs_y: 1,
        pic_height_in_ctbs_y: 1,
        ..Default::default()
    }
}

/// Annex B stream holding a single NAL unit with header `header` and a `payload_size` bytes
/// payload.
pub(crate) fn nalu_stream(header: [u8; 2], payload_size: usize) -> Vec<u8> {
    let mut stream = vec![0x00, 0x00, 0x01, header[0], header[1]];
    stream.extend(std::iter::repeat(0xab).take(payload_size));
    stream
}

/// Slice backed by the first NAL unit of `stream`.
pub(crate) fn slice_fixture(stream: &[u8], first_slice: bool) -> Slice<&[u8]> {
    let nalu = Nalu::next(&mut Cursor::new(stream))
        .unwrap()
        .unwrap();

    Slice {
        header: SliceHeader {
            first_slice_segment_in_pic_flag: first_slice,
            ..Default::default()
        },
        nalu,
    }
}
