// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! H.265 front end of a Vulkan Video style decode client.
//!
//! The bitstream parser calls the methods of [`H265Decoder`] in the order of a picture's life:
//!
//! 1. [`H265Decoder::new_sequence`] when the active SPS changes,
//! 2. [`H265Decoder::update_picture_parameters`] for every parameter set NAL unit,
//! 3. [`H265Decoder::new_picture`] when the first slice of a picture is found,
//! 4. [`H265Decoder::start_picture`] once the picture's reference picture set is known,
//! 5. [`H265Decoder::decode_slice`] for each slice of the picture,
//! 6. [`H265Decoder::end_picture`] to submit the picture,
//! 7. [`H265Decoder::output_picture`] when the picture is next in display order.
//!
//! Only one picture can be in flight between `new_picture` and `end_picture`.

mod bitstream;
#[cfg(test)]
mod dummy;
pub mod parameter_sets;
mod picture_context;
pub mod translate;

use std::rc::Rc;

use anyhow::anyhow;
use anyhow::Context;

use crate::codec::h265::dpb::Dpb;
use crate::codec::h265::dpb::RefPicSet;
use crate::codec::h265::parser::Pps;
use crate::codec::h265::parser::Slice;
use crate::codec::h265::parser::Sps;
use crate::codec::h265::parser::Vps;
use crate::codec::h265::picture::PictureData;
use crate::decoder::client::display_aspect_ratio;
use crate::decoder::client::pack_frame_rate;
use crate::decoder::client::SequenceInfo;
use crate::decoder::client::VideoCodecOperation;
use crate::decoder::client::VideoDecodeClient;
use crate::decoder::h265::parameter_sets::ParameterSet;
use crate::decoder::h265::parameter_sets::ParameterSetCache;
use crate::decoder::h265::parameter_sets::UpdateOutcome;
use crate::decoder::h265::picture_context::build_picture_data;
use crate::decoder::h265::picture_context::ActiveParameterSets;
use crate::decoder::h265::picture_context::PictureContext;
use crate::decoder::h265::translate::translate_pps;
use crate::decoder::h265::translate::translate_sps;
use crate::decoder::h265::translate::translate_vps;
use crate::decoder::DecodeError;
use crate::decoder::DecoderConfig;
use crate::decoder::InputFormat;
use crate::decoder::PictureHandle;
use crate::Resolution;

/// Upper bound of the decode surface count hinted at the start of a sequence.
const MAX_MIN_NUM_DECODE_SURFACES: u32 = 8;

/// Drives a [`VideoDecodeClient`] from the output of an H.265 bitstream parser.
pub struct H265Decoder<C: VideoDecodeClient> {
    client: C,
    config: DecoderConfig,
    parameter_sets: ParameterSetCache<C::ParameterObject>,
    /// Number of decode surfaces granted by the client for the current sequence.
    max_dpb_size: u32,
    /// The picture between `new_picture` and `end_picture`, if any.
    current: Option<PictureContext<C::Picture, C::ParameterObject>>,
}

impl<C: VideoDecodeClient> H265Decoder<C> {
    pub fn new(client: C, config: DecoderConfig) -> Self {
        Self {
            client,
            config,
            parameter_sets: Default::default(),
            max_dpb_size: 0,
            current: None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn parameter_sets(&self) -> &ParameterSetCache<C::ParameterObject> {
        &self.parameter_sets
    }

    /// Number of decode surfaces the client allocated for the current sequence, 0 before the
    /// first sequence.
    pub fn max_dpb_size(&self) -> u32 {
        self.max_dpb_size
    }

    /// Announces a new sequence using `sps` to the client.
    pub fn new_sequence(&mut self, sps: &Sps, input: &InputFormat) -> Result<(), DecodeError> {
        let vui = &sps.vui_parameters;
        let coded_resolution = Resolution::from((u32::from(sps.width()), u32::from(sps.height())));
        let visible_rect = sps.visible_rectangle();
        let display_resolution = Resolution::from((visible_rect.max.x, visible_rect.max.y));

        let bitrate = if sps.vui_parameters_present_flag && vui.hrd_parameters_present_flag {
            vui.hrd.bit_rate_scale
        } else {
            self.parameter_sets
                .vps(sps.video_parameter_set_id)
                .and_then(|vps| vps.parsed().hrd_parameters.first())
                .map_or(0, |hrd| hrd.bit_rate_scale)
        };

        let max_dpb_size = u32::try_from(sps.max_dpb_size()).context("invalid DPB size")?;

        // Without VUI the colour description is left unspecified rather than inferred.
        let (
            video_full_range,
            video_format,
            colour_primaries,
            transfer_characteristics,
            matrix_coefficients,
        ) = if sps.vui_parameters_present_flag {
            (
                vui.video_full_range_flag,
                vui.video_format,
                vui.colour_primaries as u8,
                vui.transfer_characteristics as u8,
                vui.matrix_coeffs as u8,
            )
        } else {
            (false, 0, 0, 0, 0)
        };

        let info = SequenceInfo {
            codec: VideoCodecOperation::DecodeH265,
            is_svc: input.is_svc(),
            frame_rate: pack_frame_rate(input.fps_n, input.fps_d),
            progressive_sequence: !(sps.vui_parameters_present_flag && vui.field_seq_flag),
            coded_resolution,
            max_resolution: Default::default(),
            display_resolution,
            chroma_format_idc: sps.chroma_format_idc,
            bit_depth_luma_minus8: sps.bit_depth_luma_minus8,
            bit_depth_chroma_minus8: sps.bit_depth_chroma_minus8,
            video_full_range,
            video_format,
            colour_primaries,
            transfer_characteristics,
            matrix_coefficients,
            bitrate: bitrate.into(),
            display_aspect_ratio: display_aspect_ratio(
                display_resolution.width,
                display_resolution.height,
                input.par_n,
                input.par_d,
            ),
            min_num_decode_surfaces: (max_dpb_size + 1).min(MAX_MIN_NUM_DECODE_SURFACES),
        };

        log::debug!("Beginning new sequence: {:?}", info);

        let num_surfaces = self.client.begin_sequence(&info).map_err(|e| {
            log::error!("The client rejected the new sequence: {:#}", e);
            DecodeError::SequenceRejected(e)
        })?;

        self.max_dpb_size = num_surfaces;
        log::debug!("DPB size for the new sequence: {}", num_surfaces);

        Ok(())
    }

    /// Processes a newly parsed VPS, SPS or PPS.
    ///
    /// In out of band mode, real changes are pushed to the client.
    pub fn update_picture_parameters(
        &mut self,
        set: ParameterSet<'_>,
    ) -> Result<UpdateOutcome, DecodeError> {
        let client = self.config.oob_pic_params.then_some(&mut self.client);

        self.parameter_sets.update(set, client)
    }

    /// Allocates the buffer of a new picture. The returned handle is what the parser keeps in
    /// its DPB.
    pub fn new_picture(
        &mut self,
        picture: &PictureData,
    ) -> Result<PictureHandle<C::Picture>, DecodeError> {
        if self.current.is_some() {
            return Err(DecodeError::PictureInProgress);
        }

        let buffer = self.client.alloc_picture_buffer().map_err(|e| {
            log::error!(
                "Failed to allocate a buffer for POC {}: {:#}",
                picture.pic_order_cnt_val,
                e
            );
            DecodeError::AllocationFailed(e)
        })?;

        log::debug!("New picture POC {}", picture.pic_order_cnt_val);

        let handle = Rc::new(buffer);
        self.current = Some(PictureContext::new(Rc::clone(&handle)));

        Ok(handle)
    }

    /// Standard records of the parameter sets active for the current picture.
    fn active_parameter_sets(
        &self,
        vps: &Vps,
        sps: &Sps,
        pps: &Pps,
    ) -> ActiveParameterSets<C::ParameterObject> {
        if !self.config.oob_pic_params {
            return ActiveParameterSets {
                vps: Rc::new(translate_vps(vps)),
                vps_object: None,
                sps: Rc::new(translate_sps(sps)),
                sps_object: None,
                pps: Rc::new(translate_pps(pps, Some(sps))),
                pps_object: None,
            };
        }

        let cache = &self.parameter_sets;
        let (vps, vps_object) = match cache.vps(vps.video_parameter_set_id) {
            Some(cached) => (Rc::clone(cached.record()), cached.client_object().cloned()),
            None => (Rc::new(translate_vps(vps)), None),
        };
        let (sps_record, sps_object) = match cache.sps(sps.seq_parameter_set_id) {
            Some(cached) => (Rc::clone(cached.record()), cached.client_object().cloned()),
            None => (Rc::new(translate_sps(sps)), None),
        };
        let (mut pps, pps_object) = match cache.pps(pps.pic_parameter_set_id) {
            Some(cached) => (Rc::clone(cached.record()), cached.client_object().cloned()),
            None => (Rc::new(translate_pps(pps, Some(sps))), None),
        };
        // The cached record took the VPS id of the SPS known when the PPS arrived.
        if pps.sps_video_parameter_set_id != sps.video_parameter_set_id {
            Rc::make_mut(&mut pps).sps_video_parameter_set_id = sps.video_parameter_set_id;
        }

        ActiveParameterSets {
            vps,
            vps_object,
            sps: sps_record,
            sps_object,
            pps,
            pps_object,
        }
    }

    /// Fills the record of the current picture.
    ///
    /// `dpb` holds the pictures decoded so far and `rps` the reference picture set of the current
    /// picture. If the DPB holds more references than the client supports, the picture is
    /// dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn start_picture(
        &mut self,
        picture: &PictureData,
        slice: &Slice<&[u8]>,
        vps: &Vps,
        sps: &Sps,
        pps: &Pps,
        dpb: &Dpb<PictureHandle<C::Picture>>,
        rps: &RefPicSet<PictureHandle<C::Picture>>,
    ) -> Result<(), DecodeError> {
        let mut current = self.current.take().ok_or(DecodeError::NoCurrentPicture)?;
        if current.data.is_some() {
            self.current = Some(current);
            return Err(DecodeError::Other(anyhow!(
                "POC {} has already been started",
                picture.pic_order_cnt_val
            )));
        }

        let params = self.active_parameter_sets(vps, sps, pps);
        // The context is dropped on error, which aborts the picture.
        let data = build_picture_data(
            Rc::clone(&current.picture),
            picture,
            slice,
            vps,
            sps,
            pps,
            params,
            dpb,
            rps,
        )?;

        log::debug!("Start picture POC {}", picture.pic_order_cnt_val);

        current.data = Some(data);
        self.current = Some(current);

        Ok(())
    }

    /// Appends a slice of the current picture to its bitstream.
    pub fn decode_slice(&mut self, slice: &Slice<&[u8]>) -> Result<(), DecodeError> {
        let current = self.current.as_mut().ok_or(DecodeError::NoCurrentPicture)?;

        current.bitstream.push_slice(slice.nalu().as_ref())?;
        log::trace!(
            "Slice of {} bytes, {} slices in the picture",
            slice.nalu().size(),
            current.bitstream.num_slices()
        );

        Ok(())
    }

    /// Submits the current picture to the client. The picture is closed whether this succeeds
    /// or not.
    pub fn end_picture(&mut self) -> Result<(), DecodeError> {
        let PictureContext {
            picture: _,
            bitstream,
            data,
        } = self.current.take().ok_or(DecodeError::NoCurrentPicture)?;
        let mut data = data.ok_or(DecodeError::PictureNotStarted)?;

        let num_slices = u32::try_from(bitstream.num_slices()).context("too many slices")?;
        let (bitstream, slice_offsets) = bitstream.finish();

        data.bitstream = bitstream;
        data.slice_offsets = slice_offsets;
        data.num_slices = num_slices;
        // The picture enters the DPB once decoded and may be referenced from then on.
        data.ref_pic_flag = true;

        log::debug!(
            "End picture POC {}: {} slices, {} bytes",
            data.picture_order_count,
            data.num_slices,
            data.bitstream.len()
        );

        self.client.decode_picture(&data).map_err(|e| {
            log::error!(
                "Failed to submit POC {}: {:#}",
                data.picture_order_count,
                e
            );
            DecodeError::SubmissionFailed(e)
        })
    }

    /// Signals that `handle`, the buffer of `picture`, is next in display order. The handle is
    /// released afterwards.
    ///
    /// `frame_duration` is in nanoseconds.
    pub fn output_picture(
        &mut self,
        picture: &PictureData,
        handle: PictureHandle<C::Picture>,
        frame_duration: u64,
    ) -> Result<(), DecodeError> {
        let timestamp = u64::from(picture.system_frame_number).saturating_mul(frame_duration) / 100;
        let timestamp = i64::try_from(timestamp).unwrap_or(i64::MAX);

        log::debug!(
            "Output picture POC {} at {}",
            picture.pic_order_cnt_val,
            timestamp
        );

        self.client
            .display_picture(&handle, timestamp)
            .map_err(|e| {
                log::error!(
                    "Failed to display POC {}: {:#}",
                    picture.pic_order_cnt_val,
                    e
                );
                DecodeError::DisplayFailed(e)
            })
    }

    /// Forwards a NAL unit the parser does not process. Failures of the client are not fatal.
    pub fn unhandled_nalu(&mut self, nalu: &[u8]) {
        log::debug!("Forwarding unhandled NAL unit of {} bytes", nalu.len());

        if let Err(e) = self.client.unhandled_nalu(nalu) {
            log::warn!("The client failed to handle a NAL unit: {:#}", e);
        }
    }
}
