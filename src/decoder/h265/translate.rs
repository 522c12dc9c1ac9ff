// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Translation of parsed parameter sets into H.265 standard parameter records.
//!
//! Translation is a pure function of its input. Sub-records are only built when their presence
//! flag is set in the parsed parameter set.

use crate::codec::h265::parser::HrdParams;
use crate::codec::h265::parser::Pps;
use crate::codec::h265::parser::ProfileTierLevel;
use crate::codec::h265::parser::ScalingLists;
use crate::codec::h265::parser::ShortTermRefPicSet;
use crate::codec::h265::parser::Sps;
use crate::codec::h265::parser::SublayerHrdParameters;
use crate::codec::h265::parser::VuiParams;
use crate::codec::h265::parser::Vps;
use crate::codec::h265::parser::MAX_SUB_LAYERS;
use crate::video_std::h265::HrdFlags;
use crate::video_std::h265::HrdPresenceFlags;
use crate::video_std::h265::PpsFlags;
use crate::video_std::h265::ProfileTierLevelFlags;
use crate::video_std::h265::ShortTermRefPicSetFlags;
use crate::video_std::h265::SpsFlags;
use crate::video_std::h265::SpsVuiFlags;
use crate::video_std::h265::StdH265DecPicBufMgr;
use crate::video_std::h265::StdH265HrdParameters;
use crate::video_std::h265::StdH265LevelIdc;
use crate::video_std::h265::StdH265LongTermRefPicsSps;
use crate::video_std::h265::StdH265PredictorPaletteEntries;
use crate::video_std::h265::StdH265ProfileIdc;
use crate::video_std::h265::StdH265ProfileTierLevel;
use crate::video_std::h265::StdH265Pps;
use crate::video_std::h265::StdH265ScalingLists;
use crate::video_std::h265::StdH265ShortTermRefPicSet;
use crate::video_std::h265::StdH265Sps;
use crate::video_std::h265::StdH265SpsVui;
use crate::video_std::h265::StdH265SubLayerHrdParameters;
use crate::video_std::h265::StdH265Vps;
use crate::video_std::h265::VpsFlags;
use crate::video_std::h265::STD_VIDEO_H265_MAX_DPB_SIZE;

/// Packs `flags[..]` into a bit mask, bit i standing for `flags[i]`.
fn bit_mask(flags: &[bool]) -> u32 {
    flags
        .iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .fold(0, |mask, (i, _)| mask | (1 << i))
}

fn translate_profile_tier_level(ptl: &ProfileTierLevel) -> StdH265ProfileTierLevel {
    let mut flags = ProfileTierLevelFlags::empty();
    flags.set(ProfileTierLevelFlags::GENERAL_TIER, ptl.general_tier_flag);
    flags.set(
        ProfileTierLevelFlags::GENERAL_PROGRESSIVE_SOURCE,
        ptl.general_progressive_source_flag,
    );
    flags.set(
        ProfileTierLevelFlags::GENERAL_INTERLACED_SOURCE,
        ptl.general_interlaced_source_flag,
    );
    flags.set(
        ProfileTierLevelFlags::GENERAL_NON_PACKED_CONSTRAINT,
        ptl.general_non_packed_constraint_flag,
    );
    flags.set(
        ProfileTierLevelFlags::GENERAL_FRAME_ONLY_CONSTRAINT,
        ptl.general_frame_only_constraint_flag,
    );

    StdH265ProfileTierLevel {
        flags,
        general_profile_idc: StdH265ProfileIdc::from(ptl.general_profile_idc),
        general_level_idc: StdH265LevelIdc::from_level_idc(ptl.general_level_idc),
    }
}

fn dc_coef(dc_coef_minus8: i16) -> u8 {
    (dc_coef_minus8 + 8).clamp(0, u8::MAX.into()) as u8
}

fn translate_scaling_lists(lists: &ScalingLists) -> StdH265ScalingLists {
    // Only the luma and first chroma matrices exist for 32x32, i.e. matrixId 0 and 3.
    StdH265ScalingLists {
        scaling_list_4x4: lists.scaling_list_4x4,
        scaling_list_8x8: lists.scaling_list_8x8,
        scaling_list_16x16: lists.scaling_list_16x16,
        scaling_list_32x32: [lists.scaling_list_32x32[0], lists.scaling_list_32x32[3]],
        scaling_list_dc_coef_16x16: lists.scaling_list_dc_coef_minus8_16x16.map(dc_coef),
        scaling_list_dc_coef_32x32: [
            dc_coef(lists.scaling_list_dc_coef_minus8_32x32[0]),
            dc_coef(lists.scaling_list_dc_coef_minus8_32x32[3]),
        ],
    }
}

fn translate_sub_layer_hrd(hrd: &SublayerHrdParameters) -> StdH265SubLayerHrdParameters {
    StdH265SubLayerHrdParameters {
        bit_rate_value_minus1: hrd.bit_rate_value_minus1,
        cpb_size_value_minus1: hrd.cpb_size_value_minus1,
        cpb_size_du_value_minus1: hrd.cpb_size_du_value_minus1,
        bit_rate_du_value_minus1: hrd.bit_rate_du_value_minus1,
        cbr_flag: bit_mask(&hrd.cbr_flag),
    }
}

/// Translates hrd_parameters() for sub-layers `0..=max_sub_layers_minus1`.
fn translate_hrd(hrd: &HrdParams, max_sub_layers_minus1: u8) -> StdH265HrdParameters {
    let num_sub_layers = (usize::from(max_sub_layers_minus1) + 1).min(MAX_SUB_LAYERS);

    let mut presence = HrdPresenceFlags::empty();
    presence.set(
        HrdPresenceFlags::NAL_HRD_PARAMETERS_PRESENT,
        hrd.nal_hrd_parameters_present_flag,
    );
    presence.set(
        HrdPresenceFlags::VCL_HRD_PARAMETERS_PRESENT,
        hrd.vcl_hrd_parameters_present_flag,
    );
    presence.set(
        HrdPresenceFlags::SUB_PIC_HRD_PARAMS_PRESENT,
        hrd.sub_pic_hrd_params_present_flag,
    );
    presence.set(
        HrdPresenceFlags::SUB_PIC_CPB_PARAMS_IN_PIC_TIMING_SEI,
        hrd.sub_pic_cpb_params_in_pic_timing_sei_flag,
    );

    let sub_layers = |tables: &[SublayerHrdParameters; MAX_SUB_LAYERS], present: bool| {
        if present {
            tables[..num_sub_layers]
                .iter()
                .map(translate_sub_layer_hrd)
                .collect()
        } else {
            Vec::new()
        }
    };

    StdH265HrdParameters {
        flags: HrdFlags {
            presence,
            fixed_pic_rate_general_flag: bit_mask(&hrd.fixed_pic_rate_general_flag) as u8,
            fixed_pic_rate_within_cvs_flag: bit_mask(&hrd.fixed_pic_rate_within_cvs_flag) as u8,
            low_delay_hrd_flag: bit_mask(&hrd.low_delay_hrd_flag) as u8,
        },
        tick_divisor_minus2: hrd.tick_divisor_minus2,
        du_cpb_removal_delay_increment_length_minus1: hrd
            .du_cpb_removal_delay_increment_length_minus1,
        dpb_output_delay_du_length_minus1: hrd.dpb_output_delay_du_length_minus1,
        bit_rate_scale: hrd.bit_rate_scale,
        cpb_size_scale: hrd.cpb_size_scale,
        cpb_size_du_scale: hrd.cpb_size_du_scale,
        initial_cpb_removal_delay_length_minus1: hrd.initial_cpb_removal_delay_length_minus1,
        au_cpb_removal_delay_length_minus1: hrd.au_cpb_removal_delay_length_minus1,
        dpb_output_delay_length_minus1: hrd.dpb_output_delay_length_minus1,
        cpb_cnt_minus1: hrd.cpb_cnt_minus1.map(|cnt| cnt as u8),
        elemental_duration_in_tc_minus1: hrd
            .elemental_duration_in_tc_minus1
            .map(|duration| duration as u16),
        sub_layer_hrd_parameters_nal: sub_layers(&hrd.nal_hrd, hrd.nal_hrd_parameters_present_flag),
        sub_layer_hrd_parameters_vcl: sub_layers(&hrd.vcl_hrd, hrd.vcl_hrd_parameters_present_flag),
    }
}

fn translate_vui(vui: &VuiParams, max_sub_layers_minus1: u8) -> StdH265SpsVui {
    let mut flags = SpsVuiFlags::empty();
    flags.set(
        SpsVuiFlags::ASPECT_RATIO_INFO_PRESENT,
        vui.aspect_ratio_info_present_flag,
    );
    flags.set(
        SpsVuiFlags::OVERSCAN_INFO_PRESENT,
        vui.overscan_info_present_flag,
    );
    flags.set(
        SpsVuiFlags::OVERSCAN_APPROPRIATE,
        vui.overscan_appropriate_flag,
    );
    flags.set(
        SpsVuiFlags::VIDEO_SIGNAL_TYPE_PRESENT,
        vui.video_signal_type_present_flag,
    );
    flags.set(SpsVuiFlags::VIDEO_FULL_RANGE, vui.video_full_range_flag);
    flags.set(
        SpsVuiFlags::COLOUR_DESCRIPTION_PRESENT,
        vui.colour_description_present_flag,
    );
    flags.set(
        SpsVuiFlags::CHROMA_LOC_INFO_PRESENT,
        vui.chroma_loc_info_present_flag,
    );
    flags.set(
        SpsVuiFlags::NEUTRAL_CHROMA_INDICATION,
        vui.neutral_chroma_indication_flag,
    );
    flags.set(SpsVuiFlags::FIELD_SEQ, vui.field_seq_flag);
    flags.set(
        SpsVuiFlags::FRAME_FIELD_INFO_PRESENT,
        vui.frame_field_info_present_flag,
    );
    flags.set(
        SpsVuiFlags::DEFAULT_DISPLAY_WINDOW,
        vui.default_display_window_flag,
    );
    flags.set(
        SpsVuiFlags::VUI_TIMING_INFO_PRESENT,
        vui.timing_info_present_flag,
    );
    flags.set(
        SpsVuiFlags::VUI_POC_PROPORTIONAL_TO_TIMING,
        vui.poc_proportional_to_timing_flag,
    );
    flags.set(
        SpsVuiFlags::VUI_HRD_PARAMETERS_PRESENT,
        vui.hrd_parameters_present_flag,
    );
    flags.set(
        SpsVuiFlags::BITSTREAM_RESTRICTION,
        vui.bitstream_restriction_flag,
    );
    flags.set(
        SpsVuiFlags::TILES_FIXED_STRUCTURE,
        vui.tiles_fixed_structure_flag,
    );
    flags.set(
        SpsVuiFlags::MOTION_VECTORS_OVER_PIC_BOUNDARIES,
        vui.motion_vectors_over_pic_boundaries_flag,
    );
    flags.set(
        SpsVuiFlags::RESTRICTED_REF_PIC_LISTS,
        vui.restricted_ref_pic_lists_flag,
    );

    StdH265SpsVui {
        flags,
        aspect_ratio_idc: vui.aspect_ratio_idc as u8,
        sar_width: vui.sar_width as u16,
        sar_height: vui.sar_height as u16,
        video_format: vui.video_format,
        colour_primaries: vui.colour_primaries as u8,
        transfer_characteristics: vui.transfer_characteristics as u8,
        matrix_coeffs: vui.matrix_coeffs as u8,
        chroma_sample_loc_type_top_field: vui.chroma_sample_loc_type_top_field as u8,
        chroma_sample_loc_type_bottom_field: vui.chroma_sample_loc_type_bottom_field as u8,
        def_disp_win_left_offset: vui.def_disp_win_left_offset as u16,
        def_disp_win_right_offset: vui.def_disp_win_right_offset as u16,
        def_disp_win_top_offset: vui.def_disp_win_top_offset as u16,
        def_disp_win_bottom_offset: vui.def_disp_win_bottom_offset as u16,
        vui_num_units_in_tick: vui.num_units_in_tick,
        vui_time_scale: vui.time_scale,
        vui_num_ticks_poc_diff_one_minus1: vui.num_ticks_poc_diff_one_minus1,
        min_spatial_segmentation_idc: vui.min_spatial_segmentation_idc as u16,
        max_bytes_per_pic_denom: vui.max_bytes_per_pic_denom as u8,
        max_bits_per_min_cu_denom: vui.max_bits_per_min_cu_denom as u8,
        log2_max_mv_length_horizontal: vui.log2_max_mv_length_horizontal as u8,
        log2_max_mv_length_vertical: vui.log2_max_mv_length_vertical as u8,
        hrd_parameters: vui
            .hrd_parameters_present_flag
            .then(|| translate_hrd(&vui.hrd, max_sub_layers_minus1)),
    }
}

fn translate_short_term_ref_pic_set(rps: &ShortTermRefPicSet) -> StdH265ShortTermRefPicSet {
    let mut flags = ShortTermRefPicSetFlags::empty();
    flags.set(
        ShortTermRefPicSetFlags::INTER_REF_PIC_SET_PREDICTION,
        rps.inter_ref_pic_set_prediction_flag,
    );
    flags.set(ShortTermRefPicSetFlags::DELTA_RPS_SIGN, rps.delta_rps_sign);

    let num_negative = usize::from(rps.num_negative_pics).min(STD_VIDEO_H265_MAX_DPB_SIZE);
    let num_positive = usize::from(rps.num_positive_pics).min(STD_VIDEO_H265_MAX_DPB_SIZE);

    // Undo (7-61) and (7-62): DeltaPocS0 decreases from -1, DeltaPocS1 increases from 1.
    let mut delta_poc_s0_minus1 = [0u16; STD_VIDEO_H265_MAX_DPB_SIZE];
    let mut prev = 0;
    for (i, delta) in rps.delta_poc_s0[..num_negative].iter().enumerate() {
        delta_poc_s0_minus1[i] = (prev - delta - 1) as u16;
        prev = *delta;
    }

    let mut delta_poc_s1_minus1 = [0u16; STD_VIDEO_H265_MAX_DPB_SIZE];
    let mut prev = 0;
    for (i, delta) in rps.delta_poc_s1[..num_positive].iter().enumerate() {
        delta_poc_s1_minus1[i] = (delta - prev - 1) as u16;
        prev = *delta;
    }

    StdH265ShortTermRefPicSet {
        flags,
        delta_idx_minus1: rps.delta_idx_minus1.into(),
        use_delta_flag: bit_mask(&rps.use_delta_flag) as u16,
        abs_delta_rps_minus1: rps.abs_delta_rps_minus1,
        used_by_curr_pic_flag: bit_mask(&rps.used_by_curr_pic_flag) as u16,
        used_by_curr_pic_s0_flag: bit_mask(&rps.used_by_curr_pic_s0[..num_negative]) as u16,
        used_by_curr_pic_s1_flag: bit_mask(&rps.used_by_curr_pic_s1[..num_positive]) as u16,
        num_negative_pics: rps.num_negative_pics,
        num_positive_pics: rps.num_positive_pics,
        delta_poc_s0_minus1,
        delta_poc_s1_minus1,
    }
}

fn translate_long_term_ref_pics(sps: &Sps) -> StdH265LongTermRefPicsSps {
    let mut lt = StdH265LongTermRefPicsSps {
        used_by_curr_pic_lt_sps_flag: bit_mask(&sps.used_by_curr_pic_lt_sps_flag),
        ..Default::default()
    };

    for (dst, src) in lt
        .lt_ref_pic_poc_lsb_sps
        .iter_mut()
        .zip(&sps.lt_ref_pic_poc_lsb_sps)
    {
        *dst = *src;
    }

    lt
}

/// Builds the DPB manager record out of per-sub-layer arrays.
fn dec_pic_buf_mgr<T: Copy + Into<u32>>(
    max_dec_pic_buffering_minus1: &[T; MAX_SUB_LAYERS],
    max_num_reorder_pics: &[T; MAX_SUB_LAYERS],
    max_latency_increase_plus1: &[T; MAX_SUB_LAYERS],
) -> StdH265DecPicBufMgr {
    StdH265DecPicBufMgr {
        max_latency_increase_plus1: max_latency_increase_plus1.map(|v| v.into()),
        max_dec_pic_buffering_minus1: max_dec_pic_buffering_minus1
            .map(|v| Into::<u32>::into(v) as u8),
        max_num_reorder_pics: max_num_reorder_pics.map(|v| Into::<u32>::into(v) as u8),
    }
}

/// Translates an SPS into its standard parameter record.
pub fn translate_sps(sps: &Sps) -> StdH265Sps {
    let range = &sps.range_extension;
    let scc = &sps.scc_extension;

    let mut flags = SpsFlags::empty();
    flags.set(
        SpsFlags::SPS_TEMPORAL_ID_NESTING,
        sps.temporal_id_nesting_flag,
    );
    flags.set(
        SpsFlags::SEPARATE_COLOUR_PLANE,
        sps.separate_colour_plane_flag,
    );
    flags.set(SpsFlags::CONFORMANCE_WINDOW, sps.conformance_window_flag);
    flags.set(
        SpsFlags::SPS_SUB_LAYER_ORDERING_INFO_PRESENT,
        sps.sub_layer_ordering_info_present_flag,
    );
    flags.set(
        SpsFlags::SCALING_LIST_ENABLED,
        sps.scaling_list_enabled_flag,
    );
    flags.set(
        SpsFlags::SPS_SCALING_LIST_DATA_PRESENT,
        sps.scaling_list_data_present_flag,
    );
    flags.set(SpsFlags::AMP_ENABLED, sps.amp_enabled_flag);
    flags.set(
        SpsFlags::SAMPLE_ADAPTIVE_OFFSET_ENABLED,
        sps.sample_adaptive_offset_enabled_flag,
    );
    flags.set(SpsFlags::PCM_ENABLED, sps.pcm_enabled_flag);
    flags.set(
        SpsFlags::PCM_LOOP_FILTER_DISABLED,
        sps.pcm_loop_filter_disabled_flag,
    );
    flags.set(
        SpsFlags::LONG_TERM_REF_PICS_PRESENT,
        sps.long_term_ref_pics_present_flag,
    );
    flags.set(
        SpsFlags::SPS_TEMPORAL_MVP_ENABLED,
        sps.temporal_mvp_enabled_flag,
    );
    flags.set(
        SpsFlags::STRONG_INTRA_SMOOTHING_ENABLED,
        sps.strong_intra_smoothing_enabled_flag,
    );
    flags.set(
        SpsFlags::VUI_PARAMETERS_PRESENT,
        sps.vui_parameters_present_flag,
    );
    flags.set(
        SpsFlags::SPS_EXTENSION_PRESENT,
        sps.extension_present_flag,
    );
    flags.set(SpsFlags::SPS_RANGE_EXTENSION, sps.range_extension_flag);
    flags.set(SpsFlags::SPS_SCC_EXTENSION, sps.scc_extension_flag);

    if sps.range_extension_flag {
        flags.set(
            SpsFlags::TRANSFORM_SKIP_ROTATION_ENABLED,
            range.transform_skip_rotation_enabled_flag,
        );
        flags.set(
            SpsFlags::TRANSFORM_SKIP_CONTEXT_ENABLED,
            range.transform_skip_context_enabled_flag,
        );
        flags.set(
            SpsFlags::IMPLICIT_RDPCM_ENABLED,
            range.implicit_rdpcm_enabled_flag,
        );
        flags.set(
            SpsFlags::EXPLICIT_RDPCM_ENABLED,
            range.explicit_rdpcm_enabled_flag,
        );
        flags.set(
            SpsFlags::EXTENDED_PRECISION_PROCESSING,
            range.extended_precision_processing_flag,
        );
        flags.set(
            SpsFlags::INTRA_SMOOTHING_DISABLED,
            range.intra_smoothing_disabled_flag,
        );
        flags.set(
            SpsFlags::HIGH_PRECISION_OFFSETS_ENABLED,
            range.high_precision_offsets_enabled_flag,
        );
        flags.set(
            SpsFlags::PERSISTENT_RICE_ADAPTATION_ENABLED,
            range.persistent_rice_adaptation_enabled_flag,
        );
        flags.set(
            SpsFlags::CABAC_BYPASS_ALIGNMENT_ENABLED,
            range.cabac_bypass_alignment_enabled_flag,
        );
    }

    if sps.scc_extension_flag {
        flags.set(
            SpsFlags::SPS_CURR_PIC_REF_ENABLED,
            scc.curr_pic_ref_enabled_flag,
        );
        flags.set(
            SpsFlags::PALETTE_MODE_ENABLED,
            scc.palette_mode_enabled_flag,
        );
        flags.set(
            SpsFlags::SPS_PALETTE_PREDICTOR_INITIALIZERS_PRESENT,
            scc.palette_predictor_initializers_present_flag,
        );
        flags.set(
            SpsFlags::INTRA_BOUNDARY_FILTERING_DISABLED,
            scc.intra_boundary_filtering_disabled_flag,
        );
    }

    let mut std_sps = StdH265Sps {
        flags,
        chroma_format_idc: sps.chroma_format_idc,
        pic_width_in_luma_samples: sps.pic_width_in_luma_samples.into(),
        pic_height_in_luma_samples: sps.pic_height_in_luma_samples.into(),
        sps_video_parameter_set_id: sps.video_parameter_set_id,
        sps_max_sub_layers_minus1: sps.max_sub_layers_minus1,
        sps_seq_parameter_set_id: sps.seq_parameter_set_id,
        bit_depth_luma_minus8: sps.bit_depth_luma_minus8,
        bit_depth_chroma_minus8: sps.bit_depth_chroma_minus8,
        log2_max_pic_order_cnt_lsb_minus4: sps.log2_max_pic_order_cnt_lsb_minus4,
        log2_min_luma_coding_block_size_minus3: sps.log2_min_luma_coding_block_size_minus3,
        log2_diff_max_min_luma_coding_block_size: sps.log2_diff_max_min_luma_coding_block_size,
        log2_min_luma_transform_block_size_minus2: sps.log2_min_luma_transform_block_size_minus2,
        log2_diff_max_min_luma_transform_block_size: sps
            .log2_diff_max_min_luma_transform_block_size,
        max_transform_hierarchy_depth_inter: sps.max_transform_hierarchy_depth_inter,
        max_transform_hierarchy_depth_intra: sps.max_transform_hierarchy_depth_intra,
        num_short_term_ref_pic_sets: sps.num_short_term_ref_pic_sets,
        num_long_term_ref_pics_sps: sps.num_long_term_ref_pics_sps,
        pcm_sample_bit_depth_luma_minus1: sps.pcm_sample_bit_depth_luma_minus1,
        pcm_sample_bit_depth_chroma_minus1: sps.pcm_sample_bit_depth_chroma_minus1,
        log2_min_pcm_luma_coding_block_size_minus3: sps.log2_min_pcm_luma_coding_block_size_minus3,
        log2_diff_max_min_pcm_luma_coding_block_size: sps
            .log2_diff_max_min_pcm_luma_coding_block_size,
        conf_win_left_offset: sps.conf_win_left_offset,
        conf_win_right_offset: sps.conf_win_right_offset,
        conf_win_top_offset: sps.conf_win_top_offset,
        conf_win_bottom_offset: sps.conf_win_bottom_offset,
        profile_tier_level: translate_profile_tier_level(&sps.profile_tier_level),
        dec_pic_buf_mgr: dec_pic_buf_mgr(
            &sps.max_dec_pic_buffering_minus1,
            &sps.max_num_reorder_pics,
            &sps.max_latency_increase_plus1,
        ),
        short_term_ref_pic_sets: sps
            .short_term_ref_pic_set
            .iter()
            .take(sps.num_short_term_ref_pic_sets.into())
            .map(translate_short_term_ref_pic_set)
            .collect(),
        ..Default::default()
    };

    if sps.scc_extension_flag {
        std_sps.palette_max_size = scc.palette_max_size;
        std_sps.delta_palette_max_predictor_size = scc.delta_palette_max_predictor_size;
        std_sps.motion_vector_resolution_control_idc = scc.motion_vector_resolution_control_idc;
        std_sps.sps_num_palette_predictor_initializers_minus1 =
            scc.num_palette_predictor_initializer_minus1;

        if scc.palette_predictor_initializers_present_flag {
            std_sps.predictor_palette_entries = Some(StdH265PredictorPaletteEntries {
                predictor_palette_entries: scc.palette_predictor_initializer,
            });
        }
    }

    if sps.scaling_list_enabled_flag && sps.scaling_list_data_present_flag {
        std_sps.scaling_lists = Some(translate_scaling_lists(&sps.scaling_list));
    }

    if sps.long_term_ref_pics_present_flag {
        std_sps.long_term_ref_pics_sps = Some(translate_long_term_ref_pics(sps));
    }

    if sps.vui_parameters_present_flag {
        std_sps.vui = Some(translate_vui(
            &sps.vui_parameters,
            sps.max_sub_layers_minus1,
        ));
    }

    std_sps
}

/// Translates a PPS into its standard parameter record.
///
/// `sps` is the SPS the PPS refers to, if known. It provides the VPS id of the record.
pub fn translate_pps(pps: &Pps, sps: Option<&Sps>) -> StdH265Pps {
    let range = &pps.range_extension;
    let scc = &pps.scc_extension;

    let mut flags = PpsFlags::empty();
    flags.set(
        PpsFlags::DEPENDENT_SLICE_SEGMENTS_ENABLED,
        pps.dependent_slice_segments_enabled_flag,
    );
    flags.set(
        PpsFlags::OUTPUT_FLAG_PRESENT,
        pps.output_flag_present_flag,
    );
    flags.set(
        PpsFlags::SIGN_DATA_HIDING_ENABLED,
        pps.sign_data_hiding_enabled_flag,
    );
    flags.set(
        PpsFlags::CABAC_INIT_PRESENT,
        pps.cabac_init_present_flag,
    );
    flags.set(
        PpsFlags::CONSTRAINED_INTRA_PRED,
        pps.constrained_intra_pred_flag,
    );
    flags.set(
        PpsFlags::TRANSFORM_SKIP_ENABLED,
        pps.transform_skip_enabled_flag,
    );
    flags.set(
        PpsFlags::CU_QP_DELTA_ENABLED,
        pps.cu_qp_delta_enabled_flag,
    );
    flags.set(
        PpsFlags::PPS_SLICE_CHROMA_QP_OFFSETS_PRESENT,
        pps.slice_chroma_qp_offsets_present_flag,
    );
    flags.set(PpsFlags::WEIGHTED_PRED, pps.weighted_pred_flag);
    flags.set(PpsFlags::WEIGHTED_BIPRED, pps.weighted_bipred_flag);
    flags.set(
        PpsFlags::TRANSQUANT_BYPASS_ENABLED,
        pps.transquant_bypass_enabled_flag,
    );
    flags.set(PpsFlags::TILES_ENABLED, pps.tiles_enabled_flag);
    flags.set(
        PpsFlags::ENTROPY_CODING_SYNC_ENABLED,
        pps.entropy_coding_sync_enabled_flag,
    );
    flags.set(PpsFlags::UNIFORM_SPACING, pps.uniform_spacing_flag);
    flags.set(
        PpsFlags::LOOP_FILTER_ACROSS_TILES_ENABLED,
        pps.loop_filter_across_tiles_enabled_flag,
    );
    flags.set(
        PpsFlags::PPS_LOOP_FILTER_ACROSS_SLICES_ENABLED,
        pps.loop_filter_across_slices_enabled_flag,
    );
    flags.set(
        PpsFlags::DEBLOCKING_FILTER_CONTROL_PRESENT,
        pps.deblocking_filter_control_present_flag,
    );
    flags.set(
        PpsFlags::DEBLOCKING_FILTER_OVERRIDE_ENABLED,
        pps.deblocking_filter_override_enabled_flag,
    );
    flags.set(
        PpsFlags::PPS_DEBLOCKING_FILTER_DISABLED,
        pps.deblocking_filter_disabled_flag,
    );
    flags.set(
        PpsFlags::PPS_SCALING_LIST_DATA_PRESENT,
        pps.scaling_list_data_present_flag,
    );
    flags.set(
        PpsFlags::LISTS_MODIFICATION_PRESENT,
        pps.lists_modification_present_flag,
    );
    flags.set(
        PpsFlags::SLICE_SEGMENT_HEADER_EXTENSION_PRESENT,
        pps.slice_segment_header_extension_present_flag,
    );
    flags.set(
        PpsFlags::PPS_EXTENSION_PRESENT,
        pps.extension_present_flag,
    );
    flags.set(PpsFlags::PPS_RANGE_EXTENSION, pps.range_extension_flag);

    if pps.range_extension_flag {
        flags.set(
            PpsFlags::CROSS_COMPONENT_PREDICTION_ENABLED,
            range.cross_component_prediction_enabled_flag,
        );
        flags.set(
            PpsFlags::CHROMA_QP_OFFSET_LIST_ENABLED,
            range.chroma_qp_offset_list_enabled_flag,
        );
    }

    if pps.scc_extension_flag {
        flags.set(
            PpsFlags::PPS_CURR_PIC_REF_ENABLED,
            scc.curr_pic_ref_enabled_flag,
        );
        flags.set(
            PpsFlags::RESIDUAL_ADAPTIVE_COLOUR_TRANSFORM_ENABLED,
            scc.residual_adaptive_colour_transform_enabled_flag,
        );
        flags.set(
            PpsFlags::PPS_SLICE_ACT_QP_OFFSETS_PRESENT,
            scc.slice_act_qp_offsets_present_flag,
        );
        flags.set(
            PpsFlags::PPS_PALETTE_PREDICTOR_INITIALIZERS_PRESENT,
            scc.palette_predictor_initializers_present_flag,
        );
        flags.set(PpsFlags::MONOCHROME_PALETTE, scc.monochrome_palette_flag);
    }

    let mut std_pps = StdH265Pps {
        flags,
        pps_pic_parameter_set_id: pps.pic_parameter_set_id,
        pps_seq_parameter_set_id: pps.seq_parameter_set_id,
        sps_video_parameter_set_id: sps.map_or(0, |sps| sps.video_parameter_set_id),
        num_extra_slice_header_bits: pps.num_extra_slice_header_bits,
        num_ref_idx_l0_default_active_minus1: pps.num_ref_idx_l0_default_active_minus1,
        num_ref_idx_l1_default_active_minus1: pps.num_ref_idx_l1_default_active_minus1,
        init_qp_minus26: pps.init_qp_minus26,
        diff_cu_qp_delta_depth: pps.diff_cu_qp_delta_depth,
        pps_cb_qp_offset: pps.cb_qp_offset,
        pps_cr_qp_offset: pps.cr_qp_offset,
        pps_beta_offset_div2: pps.beta_offset_div2,
        pps_tc_offset_div2: pps.tc_offset_div2,
        log2_parallel_merge_level_minus2: pps.log2_parallel_merge_level_minus2,
        num_tile_columns_minus1: pps.num_tile_columns_minus1,
        num_tile_rows_minus1: pps.num_tile_rows_minus1,
        column_width_minus1: pps.column_width_minus1.map(|width| width as u16),
        row_height_minus1: pps.row_height_minus1.map(|height| height as u16),
        ..Default::default()
    };

    if pps.range_extension_flag {
        std_pps.log2_max_transform_skip_block_size_minus2 =
            range.log2_max_transform_skip_block_size_minus2 as u8;
        std_pps.diff_cu_chroma_qp_offset_depth = range.diff_cu_chroma_qp_offset_depth as u8;
        std_pps.chroma_qp_offset_list_len_minus1 = range.chroma_qp_offset_list_len_minus1 as u8;
        std_pps.cb_qp_offset_list = range.cb_qp_offset_list.map(|offset| offset as i8);
        std_pps.cr_qp_offset_list = range.cr_qp_offset_list.map(|offset| offset as i8);
        std_pps.log2_sao_offset_scale_luma = range.log2_sao_offset_scale_luma as u8;
        std_pps.log2_sao_offset_scale_chroma = range.log2_sao_offset_scale_chroma as u8;
    }

    if pps.scc_extension_flag {
        std_pps.pps_act_y_qp_offset_plus5 = scc.act_y_qp_offset_plus5;
        std_pps.pps_act_cb_qp_offset_plus5 = scc.act_cb_qp_offset_plus5;
        std_pps.pps_act_cr_qp_offset_plus3 = scc.act_cr_qp_offset_plus3;
        std_pps.pps_num_palette_predictor_initializers = scc.num_palette_predictor_initializers;
        std_pps.luma_bit_depth_entry_minus8 = scc.luma_bit_depth_entry_minus8;
        std_pps.chroma_bit_depth_entry_minus8 = scc.chroma_bit_depth_entry_minus8;

        if scc.palette_predictor_initializers_present_flag {
            std_pps.predictor_palette_entries = Some(StdH265PredictorPaletteEntries {
                predictor_palette_entries: scc.palette_predictor_initializer,
            });
        }
    }

    if pps.scaling_list_data_present_flag {
        std_pps.scaling_lists = Some(translate_scaling_lists(&pps.scaling_list));
    }

    std_pps
}

/// Translates a VPS into its standard parameter record.
pub fn translate_vps(vps: &Vps) -> StdH265Vps {
    let mut flags = VpsFlags::empty();
    flags.set(
        VpsFlags::VPS_TEMPORAL_ID_NESTING,
        vps.temporal_id_nesting_flag,
    );
    flags.set(
        VpsFlags::VPS_SUB_LAYER_ORDERING_INFO_PRESENT,
        vps.sub_layer_ordering_info_present_flag,
    );
    flags.set(
        VpsFlags::VPS_TIMING_INFO_PRESENT,
        vps.timing_info_present_flag,
    );
    flags.set(
        VpsFlags::VPS_POC_PROPORTIONAL_TO_TIMING,
        vps.poc_proportional_to_timing_flag,
    );

    let mut std_vps = StdH265Vps {
        flags,
        vps_video_parameter_set_id: vps.video_parameter_set_id,
        vps_max_sub_layers_minus1: vps.max_sub_layers_minus1,
        dec_pic_buf_mgr: dec_pic_buf_mgr(
            &vps.max_dec_pic_buffering_minus1,
            &vps.max_num_reorder_pics,
            &vps.max_latency_increase_plus1,
        ),
        profile_tier_level: translate_profile_tier_level(&vps.profile_tier_level),
        ..Default::default()
    };

    if vps.timing_info_present_flag {
        std_vps.vps_num_units_in_tick = vps.num_units_in_tick;
        std_vps.vps_time_scale = vps.time_scale;
        std_vps.vps_num_ticks_poc_diff_one_minus1 = vps.num_ticks_poc_diff_one_minus1;
        std_vps.hrd_parameters = vps
            .hrd_parameters
            .iter()
            .take(vps.num_hrd_parameters as usize)
            .map(|hrd| translate_hrd(hrd, vps.max_sub_layers_minus1))
            .collect();
    }

    std_vps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sps_1080p() -> Sps {
        let mut sps = Sps {
            seq_parameter_set_id: 1,
            video_parameter_set_id: 2,
            chroma_format_idc: 1,
            pic_width_in_luma_samples: 1920,
            pic_height_in_luma_samples: 1088,
            conformance_window_flag: true,
            conf_win_bottom_offset: 4,
            sub_layer_ordering_info_present_flag: true,
            max_sub_layers_minus1: 1,
            amp_enabled_flag: true,
            temporal_mvp_enabled_flag: true,
            profile_tier_level: ProfileTierLevel {
                general_profile_idc: 1,
                general_level_idc: 123,
                general_progressive_source_flag: true,
                ..Default::default()
            },
            ..Default::default()
        };
        sps.max_dec_pic_buffering_minus1[..2].copy_from_slice(&[3, 4]);
        sps.max_num_reorder_pics[..2].copy_from_slice(&[1, 2]);
        sps.max_latency_increase_plus1[..2].copy_from_slice(&[0, 5]);
        sps
    }

    #[test]
    fn sps_core_fields_and_flags() {
        let std_sps = translate_sps(&sps_1080p());

        assert_eq!(
            std_sps.flags,
            SpsFlags::CONFORMANCE_WINDOW
                | SpsFlags::SPS_SUB_LAYER_ORDERING_INFO_PRESENT
                | SpsFlags::AMP_ENABLED
                | SpsFlags::SPS_TEMPORAL_MVP_ENABLED
        );
        assert_eq!(std_sps.pic_width_in_luma_samples, 1920);
        assert_eq!(std_sps.pic_height_in_luma_samples, 1088);
        assert_eq!(std_sps.sps_seq_parameter_set_id, 1);
        assert_eq!(std_sps.sps_video_parameter_set_id, 2);
        assert_eq!(std_sps.conf_win_bottom_offset, 4);
        assert_eq!(
            std_sps.profile_tier_level.general_profile_idc,
            StdH265ProfileIdc::Main
        );
        assert_eq!(
            std_sps.profile_tier_level.general_level_idc,
            StdH265LevelIdc::L4_1
        );
        assert_eq!(
            std_sps.profile_tier_level.flags,
            ProfileTierLevelFlags::GENERAL_PROGRESSIVE_SOURCE
        );
        assert_eq!(
            std_sps.dec_pic_buf_mgr.max_dec_pic_buffering_minus1[..2],
            [3, 4]
        );
        assert_eq!(std_sps.dec_pic_buf_mgr.max_num_reorder_pics[..2], [1, 2]);
        assert_eq!(
            std_sps.dec_pic_buf_mgr.max_latency_increase_plus1[..2],
            [0, 5]
        );

        assert!(std_sps.vui.is_none());
        assert!(std_sps.scaling_lists.is_none());
        assert!(std_sps.long_term_ref_pics_sps.is_none());
        assert!(std_sps.predictor_palette_entries.is_none());
    }

    #[test]
    fn sps_vui_only_when_present() {
        let mut sps = sps_1080p();
        sps.vui_parameters.video_full_range_flag = true;
        sps.vui_parameters.colour_primaries = 9;
        assert!(translate_sps(&sps).vui.is_none());

        sps.vui_parameters_present_flag = true;
        sps.vui_parameters.field_seq_flag = true;
        sps.vui_parameters.hrd_parameters_present_flag = true;
        sps.vui_parameters.hrd.nal_hrd_parameters_present_flag = true;
        sps.vui_parameters.hrd.bit_rate_scale = 4;
        sps.vui_parameters.hrd.nal_hrd[1].bit_rate_value_minus1[0] = 1000;
        sps.vui_parameters.hrd.nal_hrd[1].cbr_flag[2] = true;

        let std_sps = translate_sps(&sps);
        assert!(std_sps.flags.contains(SpsFlags::VUI_PARAMETERS_PRESENT));

        let vui = std_sps.vui.unwrap();
        assert!(vui.flags.contains(SpsVuiFlags::VIDEO_FULL_RANGE));
        assert!(vui.flags.contains(SpsVuiFlags::FIELD_SEQ));
        // Inferred when bitstream_restriction_flag is not set.
        assert!(vui
            .flags
            .contains(SpsVuiFlags::MOTION_VECTORS_OVER_PIC_BOUNDARIES));
        assert_eq!(vui.colour_primaries, 9);
        assert_eq!(vui.log2_max_mv_length_horizontal, 15);

        let hrd = vui.hrd_parameters.unwrap();
        assert_eq!(hrd.bit_rate_scale, 4);
        assert_eq!(hrd.initial_cpb_removal_delay_length_minus1, 23);
        // One table per sub-layer.
        assert_eq!(hrd.sub_layer_hrd_parameters_nal.len(), 2);
        assert!(hrd.sub_layer_hrd_parameters_vcl.is_empty());
        assert_eq!(
            hrd.sub_layer_hrd_parameters_nal[1].bit_rate_value_minus1[0],
            1000
        );
        assert_eq!(hrd.sub_layer_hrd_parameters_nal[1].cbr_flag, 0b100);
    }

    #[test]
    fn sps_extensions() {
        let mut sps = sps_1080p();
        sps.range_extension.implicit_rdpcm_enabled_flag = true;
        sps.scc_extension.palette_mode_enabled_flag = true;
        sps.scc_extension.palette_max_size = 64;

        // The extension payloads are ignored unless flagged.
        let std_sps = translate_sps(&sps);
        assert!(!std_sps.flags.contains(SpsFlags::IMPLICIT_RDPCM_ENABLED));
        assert!(!std_sps.flags.contains(SpsFlags::PALETTE_MODE_ENABLED));
        assert_eq!(std_sps.palette_max_size, 0);

        sps.extension_present_flag = true;
        sps.range_extension_flag = true;
        sps.scc_extension_flag = true;
        sps.scc_extension.palette_predictor_initializers_present_flag = true;
        sps.scc_extension.palette_predictor_initializer[1][0] = 512;

        let std_sps = translate_sps(&sps);
        assert!(std_sps.flags.contains(
            SpsFlags::SPS_EXTENSION_PRESENT
                | SpsFlags::SPS_RANGE_EXTENSION
                | SpsFlags::SPS_SCC_EXTENSION
                | SpsFlags::IMPLICIT_RDPCM_ENABLED
                | SpsFlags::PALETTE_MODE_ENABLED
                | SpsFlags::SPS_PALETTE_PREDICTOR_INITIALIZERS_PRESENT
        ));
        assert_eq!(std_sps.palette_max_size, 64);
        assert_eq!(
            std_sps
                .predictor_palette_entries
                .unwrap()
                .predictor_palette_entries[1][0],
            512
        );
    }

    #[test]
    fn sps_scaling_lists() {
        let mut sps = sps_1080p();
        sps.scaling_list_enabled_flag = true;
        assert!(translate_sps(&sps).scaling_lists.is_none());

        sps.scaling_list_data_present_flag = true;
        sps.scaling_list.scaling_list_4x4[2][5] = 20;
        sps.scaling_list.scaling_list_32x32[3][63] = 30;
        sps.scaling_list.scaling_list_dc_coef_minus8_16x16[1] = 8;
        sps.scaling_list.scaling_list_dc_coef_minus8_32x32[3] = -7;

        let lists = translate_sps(&sps).scaling_lists.unwrap();
        assert_eq!(lists.scaling_list_4x4[2][5], 20);
        assert_eq!(lists.scaling_list_32x32[1][63], 30);
        assert_eq!(lists.scaling_list_dc_coef_16x16[1], 16);
        assert_eq!(lists.scaling_list_dc_coef_16x16[0], 8);
        assert_eq!(lists.scaling_list_dc_coef_32x32, [8, 1]);
    }

    #[test]
    fn sps_reference_picture_sets() {
        let mut sps = sps_1080p();
        let mut rps = ShortTermRefPicSet {
            num_negative_pics: 2,
            num_positive_pics: 1,
            ..Default::default()
        };
        rps.delta_poc_s0[..2].copy_from_slice(&[-1, -4]);
        rps.used_by_curr_pic_s0[..2].copy_from_slice(&[true, false]);
        rps.delta_poc_s1[0] = 2;
        rps.used_by_curr_pic_s1[0] = true;

        sps.num_short_term_ref_pic_sets = 1;
        sps.short_term_ref_pic_set = vec![rps];
        sps.long_term_ref_pics_present_flag = true;
        sps.num_long_term_ref_pics_sps = 2;
        sps.lt_ref_pic_poc_lsb_sps = vec![16, 32];
        sps.used_by_curr_pic_lt_sps_flag = vec![false, true];

        let std_sps = translate_sps(&sps);
        assert_eq!(std_sps.short_term_ref_pic_sets.len(), 1);

        let st = &std_sps.short_term_ref_pic_sets[0];
        assert_eq!(st.num_negative_pics, 2);
        assert_eq!(st.delta_poc_s0_minus1[..2], [0, 2]);
        assert_eq!(st.delta_poc_s1_minus1[0], 1);
        assert_eq!(st.used_by_curr_pic_s0_flag, 0b01);
        assert_eq!(st.used_by_curr_pic_s1_flag, 0b1);

        let lt = std_sps.long_term_ref_pics_sps.unwrap();
        assert_eq!(lt.lt_ref_pic_poc_lsb_sps[..2], [16, 32]);
        assert_eq!(lt.used_by_curr_pic_lt_sps_flag, 0b10);
    }

    #[test]
    fn pps_tiles_and_extensions() {
        let mut pps = Pps {
            pic_parameter_set_id: 3,
            seq_parameter_set_id: 1,
            init_qp_minus26: -4,
            tiles_enabled_flag: true,
            num_tile_columns_minus1: 2,
            num_tile_rows_minus1: 1,
            cb_qp_offset: -2,
            ..Default::default()
        };
        pps.column_width_minus1[..2].copy_from_slice(&[9, 4]);
        pps.row_height_minus1[0] = 7;
        pps.range_extension.cb_qp_offset_list[0] = -3;

        let sps = sps_1080p();
        let std_pps = translate_pps(&pps, Some(&sps));
        assert_eq!(std_pps.flags, PpsFlags::TILES_ENABLED);
        assert_eq!(std_pps.pps_pic_parameter_set_id, 3);
        assert_eq!(std_pps.pps_seq_parameter_set_id, 1);
        assert_eq!(std_pps.sps_video_parameter_set_id, 2);
        assert_eq!(std_pps.init_qp_minus26, -4);
        assert_eq!(std_pps.pps_cb_qp_offset, -2);
        assert_eq!(std_pps.num_tile_columns_minus1, 2);
        assert_eq!(std_pps.column_width_minus1[..3], [9, 4, 0]);
        assert_eq!(std_pps.row_height_minus1[0], 7);
        assert_eq!(std_pps.cb_qp_offset_list[0], 0);
        assert!(std_pps.scaling_lists.is_none());

        pps.extension_present_flag = true;
        pps.range_extension_flag = true;
        pps.range_extension.chroma_qp_offset_list_enabled_flag = true;
        pps.scaling_list_data_present_flag = true;

        let std_pps = translate_pps(&pps, None);
        assert!(std_pps
            .flags
            .contains(PpsFlags::CHROMA_QP_OFFSET_LIST_ENABLED | PpsFlags::PPS_RANGE_EXTENSION));
        assert_eq!(std_pps.cb_qp_offset_list[0], -3);
        assert_eq!(std_pps.sps_video_parameter_set_id, 0);
        assert!(std_pps.scaling_lists.is_some());
    }

    #[test]
    fn vps_timing_and_hrd() {
        let mut vps = Vps {
            video_parameter_set_id: 2,
            max_sub_layers_minus1: 0,
            temporal_id_nesting_flag: true,
            num_units_in_tick: 1001,
            time_scale: 60000,
            num_hrd_parameters: 1,
            hrd_parameters: vec![HrdParams {
                bit_rate_scale: 3,
                ..Default::default()
            }],
            ..Default::default()
        };
        vps.max_dec_pic_buffering_minus1[0] = 5;

        let std_vps = translate_vps(&vps);
        assert_eq!(std_vps.flags, VpsFlags::VPS_TEMPORAL_ID_NESTING);
        assert_eq!(std_vps.vps_time_scale, 0);
        assert!(std_vps.hrd_parameters.is_empty());
        assert_eq!(std_vps.dec_pic_buf_mgr.max_dec_pic_buffering_minus1[0], 5);

        vps.timing_info_present_flag = true;
        let std_vps = translate_vps(&vps);
        assert_eq!(std_vps.vps_num_units_in_tick, 1001);
        assert_eq!(std_vps.vps_time_scale, 60000);
        assert_eq!(std_vps.hrd_parameters.len(), 1);
        assert_eq!(std_vps.hrd_parameters[0].bit_rate_scale, 3);
    }

    #[test]
    fn translation_is_deterministic() {
        let mut sps = sps_1080p();
        sps.vui_parameters_present_flag = true;
        sps.scaling_list_enabled_flag = true;
        sps.scaling_list_data_present_flag = true;

        assert_eq!(translate_sps(&sps), translate_sps(&sps.clone()));
    }
}
