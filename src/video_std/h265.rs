// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! H.265 standard parameter records.

use bitflags::bitflags;

use crate::codec::h265::parser::Level;

pub const STD_VIDEO_H265_CPB_CNT_LIST_SIZE: usize = 32;
pub const STD_VIDEO_H265_SUBLAYERS_LIST_SIZE: usize = 7;
pub const STD_VIDEO_H265_SCALING_LIST_4X4_NUM_LISTS: usize = 6;
pub const STD_VIDEO_H265_SCALING_LIST_4X4_NUM_ELEMENTS: usize = 16;
pub const STD_VIDEO_H265_SCALING_LIST_8X8_NUM_LISTS: usize = 6;
pub const STD_VIDEO_H265_SCALING_LIST_8X8_NUM_ELEMENTS: usize = 64;
pub const STD_VIDEO_H265_SCALING_LIST_16X16_NUM_LISTS: usize = 6;
pub const STD_VIDEO_H265_SCALING_LIST_16X16_NUM_ELEMENTS: usize = 64;
pub const STD_VIDEO_H265_SCALING_LIST_32X32_NUM_LISTS: usize = 2;
pub const STD_VIDEO_H265_SCALING_LIST_32X32_NUM_ELEMENTS: usize = 64;
pub const STD_VIDEO_H265_CHROMA_QP_OFFSET_LIST_SIZE: usize = 6;
pub const STD_VIDEO_H265_CHROMA_QP_OFFSET_TILE_COLS_LIST_SIZE: usize = 19;
pub const STD_VIDEO_H265_CHROMA_QP_OFFSET_TILE_ROWS_LIST_SIZE: usize = 21;
pub const STD_VIDEO_H265_PREDICTOR_PALETTE_COMPONENTS_LIST_SIZE: usize = 3;
pub const STD_VIDEO_H265_PREDICTOR_PALETTE_COMP_ENTRIES_LIST_SIZE: usize = 128;
pub const STD_VIDEO_H265_MAX_NUM_LIST_REF: usize = 15;
pub const STD_VIDEO_H265_MAX_CHROMA_PLANES: usize = 2;
pub const STD_VIDEO_H265_MAX_SHORT_TERM_REF_PIC_SETS: usize = 64;
pub const STD_VIDEO_H265_MAX_DPB_SIZE: usize = 16;
pub const STD_VIDEO_H265_MAX_LONG_TERM_REF_PICS_SPS: usize = 32;
pub const STD_VIDEO_H265_MAX_LONG_TERM_PICS: usize = 16;
pub const STD_VIDEO_H265_MAX_DELTA_POC: usize = 48;

/// `StdVideoH265ProfileIdc`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum StdH265ProfileIdc {
    Main = 1,
    Main10 = 2,
    MainStillPicture = 3,
    FormatRangeExtensions = 4,
    SccExtensions = 9,
    #[default]
    Invalid = 0x7fff_ffff,
}

impl From<u8> for StdH265ProfileIdc {
    fn from(general_profile_idc: u8) -> Self {
        match general_profile_idc {
            1 => Self::Main,
            2 => Self::Main10,
            3 => Self::MainStillPicture,
            4 => Self::FormatRangeExtensions,
            9 => Self::SccExtensions,
            _ => Self::Invalid,
        }
    }
}

/// `StdVideoH265LevelIdc`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum StdH265LevelIdc {
    L1_0 = 0,
    L2_0 = 1,
    L2_1 = 2,
    L3_0 = 3,
    L3_1 = 4,
    L4_0 = 5,
    L4_1 = 6,
    L5_0 = 7,
    L5_1 = 8,
    L5_2 = 9,
    L6_0 = 10,
    L6_1 = 11,
    L6_2 = 12,
    #[default]
    Invalid = 0x7fff_ffff,
}

impl From<Level> for StdH265LevelIdc {
    fn from(level: Level) -> Self {
        match level {
            Level::L1 => Self::L1_0,
            Level::L2 => Self::L2_0,
            Level::L2_1 => Self::L2_1,
            Level::L3 => Self::L3_0,
            Level::L3_1 => Self::L3_1,
            Level::L4 => Self::L4_0,
            Level::L4_1 => Self::L4_1,
            Level::L5 => Self::L5_0,
            Level::L5_1 => Self::L5_1,
            Level::L5_2 => Self::L5_2,
            Level::L6 => Self::L6_0,
            Level::L6_1 => Self::L6_1,
            Level::L6_2 => Self::L6_2,
        }
    }
}

impl StdH265LevelIdc {
    /// Maps `general_level_idc`, i.e. 30 times the level number.
    pub fn from_level_idc(general_level_idc: u8) -> Self {
        Level::n(general_level_idc).map_or(Self::Invalid, Self::from)
    }
}

bitflags! {
    /// `StdVideoH265ProfileTierLevelFlags`.
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct ProfileTierLevelFlags: u32 {
        const GENERAL_TIER = 1 << 0;
        const GENERAL_PROGRESSIVE_SOURCE = 1 << 1;
        const GENERAL_INTERLACED_SOURCE = 1 << 2;
        const GENERAL_NON_PACKED_CONSTRAINT = 1 << 3;
        const GENERAL_FRAME_ONLY_CONSTRAINT = 1 << 4;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265ProfileTierLevel {
    pub flags: ProfileTierLevelFlags,
    pub general_profile_idc: StdH265ProfileIdc,
    pub general_level_idc: StdH265LevelIdc,
}

/// `StdVideoH265DecPicBufMgr`, indexed by HighestTid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265DecPicBufMgr {
    pub max_latency_increase_plus1: [u32; STD_VIDEO_H265_SUBLAYERS_LIST_SIZE],
    pub max_dec_pic_buffering_minus1: [u8; STD_VIDEO_H265_SUBLAYERS_LIST_SIZE],
    pub max_num_reorder_pics: [u8; STD_VIDEO_H265_SUBLAYERS_LIST_SIZE],
}

/// `StdVideoH265SubLayerHrdParameters`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265SubLayerHrdParameters {
    pub bit_rate_value_minus1: [u32; STD_VIDEO_H265_CPB_CNT_LIST_SIZE],
    pub cpb_size_value_minus1: [u32; STD_VIDEO_H265_CPB_CNT_LIST_SIZE],
    pub cpb_size_du_value_minus1: [u32; STD_VIDEO_H265_CPB_CNT_LIST_SIZE],
    pub bit_rate_du_value_minus1: [u32; STD_VIDEO_H265_CPB_CNT_LIST_SIZE],
    /// Bit i is cbr_flag[ i ].
    pub cbr_flag: u32,
}

bitflags! {
    /// The single-bit part of `StdVideoH265HrdFlags`.
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct HrdPresenceFlags: u32 {
        const NAL_HRD_PARAMETERS_PRESENT = 1 << 0;
        const VCL_HRD_PARAMETERS_PRESENT = 1 << 1;
        const SUB_PIC_HRD_PARAMS_PRESENT = 1 << 2;
        const SUB_PIC_CPB_PARAMS_IN_PIC_TIMING_SEI = 1 << 3;
    }
}

/// `StdVideoH265HrdFlags`. The per-sub-layer flags are bit masks, bit i
/// standing for sub-layer i.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HrdFlags {
    pub presence: HrdPresenceFlags,
    pub fixed_pic_rate_general_flag: u8,
    pub fixed_pic_rate_within_cvs_flag: u8,
    pub low_delay_hrd_flag: u8,
}

impl HrdFlags {
    /// The packed 32-bit flag word.
    pub fn bits(&self) -> u32 {
        self.presence.bits()
            | u32::from(self.fixed_pic_rate_general_flag) << 4
            | u32::from(self.fixed_pic_rate_within_cvs_flag) << 12
            | u32::from(self.low_delay_hrd_flag) << 20
    }
}

/// `StdVideoH265HrdParameters`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265HrdParameters {
    pub flags: HrdFlags,
    pub tick_divisor_minus2: u8,
    pub du_cpb_removal_delay_increment_length_minus1: u8,
    pub dpb_output_delay_du_length_minus1: u8,
    pub bit_rate_scale: u8,
    pub cpb_size_scale: u8,
    pub cpb_size_du_scale: u8,
    pub initial_cpb_removal_delay_length_minus1: u8,
    pub au_cpb_removal_delay_length_minus1: u8,
    pub dpb_output_delay_length_minus1: u8,
    pub cpb_cnt_minus1: [u8; STD_VIDEO_H265_SUBLAYERS_LIST_SIZE],
    pub elemental_duration_in_tc_minus1: [u16; STD_VIDEO_H265_SUBLAYERS_LIST_SIZE],
    /// One entry per sub-layer, empty unless NAL HRD parameters are present.
    pub sub_layer_hrd_parameters_nal: Vec<StdH265SubLayerHrdParameters>,
    /// One entry per sub-layer, empty unless VCL HRD parameters are present.
    pub sub_layer_hrd_parameters_vcl: Vec<StdH265SubLayerHrdParameters>,
}

/// `StdVideoH265ScalingLists`, in up-right diagonal order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StdH265ScalingLists {
    pub scaling_list_4x4: [[u8; STD_VIDEO_H265_SCALING_LIST_4X4_NUM_ELEMENTS];
        STD_VIDEO_H265_SCALING_LIST_4X4_NUM_LISTS],
    pub scaling_list_8x8: [[u8; STD_VIDEO_H265_SCALING_LIST_8X8_NUM_ELEMENTS];
        STD_VIDEO_H265_SCALING_LIST_8X8_NUM_LISTS],
    pub scaling_list_16x16: [[u8; STD_VIDEO_H265_SCALING_LIST_16X16_NUM_ELEMENTS];
        STD_VIDEO_H265_SCALING_LIST_16X16_NUM_LISTS],
    pub scaling_list_32x32: [[u8; STD_VIDEO_H265_SCALING_LIST_32X32_NUM_ELEMENTS];
        STD_VIDEO_H265_SCALING_LIST_32X32_NUM_LISTS],
    pub scaling_list_dc_coef_16x16: [u8; STD_VIDEO_H265_SCALING_LIST_16X16_NUM_LISTS],
    pub scaling_list_dc_coef_32x32: [u8; STD_VIDEO_H265_SCALING_LIST_32X32_NUM_LISTS],
}

impl Default for StdH265ScalingLists {
    fn default() -> Self {
        Self {
            scaling_list_4x4: Default::default(),
            scaling_list_8x8: [[0; STD_VIDEO_H265_SCALING_LIST_8X8_NUM_ELEMENTS];
                STD_VIDEO_H265_SCALING_LIST_8X8_NUM_LISTS],
            scaling_list_16x16: [[0; STD_VIDEO_H265_SCALING_LIST_16X16_NUM_ELEMENTS];
                STD_VIDEO_H265_SCALING_LIST_16X16_NUM_LISTS],
            scaling_list_32x32: [[0; STD_VIDEO_H265_SCALING_LIST_32X32_NUM_ELEMENTS];
                STD_VIDEO_H265_SCALING_LIST_32X32_NUM_LISTS],
            scaling_list_dc_coef_16x16: Default::default(),
            scaling_list_dc_coef_32x32: Default::default(),
        }
    }
}

bitflags! {
    /// `StdVideoH265SpsVuiFlags`.
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct SpsVuiFlags: u32 {
        const ASPECT_RATIO_INFO_PRESENT = 1 << 0;
        const OVERSCAN_INFO_PRESENT = 1 << 1;
        const OVERSCAN_APPROPRIATE = 1 << 2;
        const VIDEO_SIGNAL_TYPE_PRESENT = 1 << 3;
        const VIDEO_FULL_RANGE = 1 << 4;
        const COLOUR_DESCRIPTION_PRESENT = 1 << 5;
        const CHROMA_LOC_INFO_PRESENT = 1 << 6;
        const NEUTRAL_CHROMA_INDICATION = 1 << 7;
        const FIELD_SEQ = 1 << 8;
        const FRAME_FIELD_INFO_PRESENT = 1 << 9;
        const DEFAULT_DISPLAY_WINDOW = 1 << 10;
        const VUI_TIMING_INFO_PRESENT = 1 << 11;
        const VUI_POC_PROPORTIONAL_TO_TIMING = 1 << 12;
        const VUI_HRD_PARAMETERS_PRESENT = 1 << 13;
        const BITSTREAM_RESTRICTION = 1 << 14;
        const TILES_FIXED_STRUCTURE = 1 << 15;
        const MOTION_VECTORS_OVER_PIC_BOUNDARIES = 1 << 16;
        const RESTRICTED_REF_PIC_LISTS = 1 << 17;
    }
}

/// `StdVideoH265SequenceParameterSetVui`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265SpsVui {
    pub flags: SpsVuiFlags,
    pub aspect_ratio_idc: u8,
    pub sar_width: u16,
    pub sar_height: u16,
    pub video_format: u8,
    pub colour_primaries: u8,
    pub transfer_characteristics: u8,
    pub matrix_coeffs: u8,
    pub chroma_sample_loc_type_top_field: u8,
    pub chroma_sample_loc_type_bottom_field: u8,
    pub def_disp_win_left_offset: u16,
    pub def_disp_win_right_offset: u16,
    pub def_disp_win_top_offset: u16,
    pub def_disp_win_bottom_offset: u16,
    pub vui_num_units_in_tick: u32,
    pub vui_time_scale: u32,
    pub vui_num_ticks_poc_diff_one_minus1: u32,
    pub min_spatial_segmentation_idc: u16,
    pub max_bytes_per_pic_denom: u8,
    pub max_bits_per_min_cu_denom: u8,
    pub log2_max_mv_length_horizontal: u8,
    pub log2_max_mv_length_vertical: u8,
    /// Present when `VUI_HRD_PARAMETERS_PRESENT` is set.
    pub hrd_parameters: Option<StdH265HrdParameters>,
}

/// `StdVideoH265PredictorPaletteEntries`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StdH265PredictorPaletteEntries {
    pub predictor_palette_entries: [[u16; STD_VIDEO_H265_PREDICTOR_PALETTE_COMP_ENTRIES_LIST_SIZE];
        STD_VIDEO_H265_PREDICTOR_PALETTE_COMPONENTS_LIST_SIZE],
}

impl Default for StdH265PredictorPaletteEntries {
    fn default() -> Self {
        Self {
            predictor_palette_entries: [[0; STD_VIDEO_H265_PREDICTOR_PALETTE_COMP_ENTRIES_LIST_SIZE];
                STD_VIDEO_H265_PREDICTOR_PALETTE_COMPONENTS_LIST_SIZE],
        }
    }
}

bitflags! {
    /// `StdVideoH265ShortTermRefPicSetFlags`.
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct ShortTermRefPicSetFlags: u32 {
        const INTER_REF_PIC_SET_PREDICTION = 1 << 0;
        const DELTA_RPS_SIGN = 1 << 1;
    }
}

/// `StdVideoH265ShortTermRefPicSet`. The `u16` flag arrays are bit masks, bit
/// i standing for entry i.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265ShortTermRefPicSet {
    pub flags: ShortTermRefPicSetFlags,
    pub delta_idx_minus1: u32,
    pub use_delta_flag: u16,
    pub abs_delta_rps_minus1: u16,
    pub used_by_curr_pic_flag: u16,
    pub used_by_curr_pic_s0_flag: u16,
    pub used_by_curr_pic_s1_flag: u16,
    pub num_negative_pics: u8,
    pub num_positive_pics: u8,
    pub delta_poc_s0_minus1: [u16; STD_VIDEO_H265_MAX_DPB_SIZE],
    pub delta_poc_s1_minus1: [u16; STD_VIDEO_H265_MAX_DPB_SIZE],
}

/// `StdVideoH265LongTermRefPicsSps`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265LongTermRefPicsSps {
    /// Bit i is used_by_curr_pic_lt_sps_flag[ i ].
    pub used_by_curr_pic_lt_sps_flag: u32,
    pub lt_ref_pic_poc_lsb_sps: [u32; STD_VIDEO_H265_MAX_LONG_TERM_REF_PICS_SPS],
}

bitflags! {
    /// `StdVideoH265VpsFlags`.
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct VpsFlags: u32 {
        const VPS_TEMPORAL_ID_NESTING = 1 << 0;
        const VPS_SUB_LAYER_ORDERING_INFO_PRESENT = 1 << 1;
        const VPS_TIMING_INFO_PRESENT = 1 << 2;
        const VPS_POC_PROPORTIONAL_TO_TIMING = 1 << 3;
    }
}

/// `StdVideoH265VideoParameterSet`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265Vps {
    pub flags: VpsFlags,
    pub vps_video_parameter_set_id: u8,
    pub vps_max_sub_layers_minus1: u8,
    pub vps_num_units_in_tick: u32,
    pub vps_time_scale: u32,
    pub vps_num_ticks_poc_diff_one_minus1: u32,
    pub dec_pic_buf_mgr: StdH265DecPicBufMgr,
    /// vps_num_hrd_parameters entries.
    pub hrd_parameters: Vec<StdH265HrdParameters>,
    pub profile_tier_level: StdH265ProfileTierLevel,
}

bitflags! {
    /// `StdVideoH265SpsFlags`.
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct SpsFlags: u32 {
        const SPS_TEMPORAL_ID_NESTING = 1 << 0;
        const SEPARATE_COLOUR_PLANE = 1 << 1;
        const CONFORMANCE_WINDOW = 1 << 2;
        const SPS_SUB_LAYER_ORDERING_INFO_PRESENT = 1 << 3;
        const SCALING_LIST_ENABLED = 1 << 4;
        const SPS_SCALING_LIST_DATA_PRESENT = 1 << 5;
        const AMP_ENABLED = 1 << 6;
        const SAMPLE_ADAPTIVE_OFFSET_ENABLED = 1 << 7;
        const PCM_ENABLED = 1 << 8;
        const PCM_LOOP_FILTER_DISABLED = 1 << 9;
        const LONG_TERM_REF_PICS_PRESENT = 1 << 10;
        const SPS_TEMPORAL_MVP_ENABLED = 1 << 11;
        const STRONG_INTRA_SMOOTHING_ENABLED = 1 << 12;
        const VUI_PARAMETERS_PRESENT = 1 << 13;
        const SPS_EXTENSION_PRESENT = 1 << 14;
        const SPS_RANGE_EXTENSION = 1 << 15;
        const TRANSFORM_SKIP_ROTATION_ENABLED = 1 << 16;
        const TRANSFORM_SKIP_CONTEXT_ENABLED = 1 << 17;
        const IMPLICIT_RDPCM_ENABLED = 1 << 18;
        const EXPLICIT_RDPCM_ENABLED = 1 << 19;
        const EXTENDED_PRECISION_PROCESSING = 1 << 20;
        const INTRA_SMOOTHING_DISABLED = 1 << 21;
        const HIGH_PRECISION_OFFSETS_ENABLED = 1 << 22;
        const PERSISTENT_RICE_ADAPTATION_ENABLED = 1 << 23;
        const CABAC_BYPASS_ALIGNMENT_ENABLED = 1 << 24;
        const SPS_SCC_EXTENSION = 1 << 25;
        const SPS_CURR_PIC_REF_ENABLED = 1 << 26;
        const PALETTE_MODE_ENABLED = 1 << 27;
        const SPS_PALETTE_PREDICTOR_INITIALIZERS_PRESENT = 1 << 28;
        const INTRA_BOUNDARY_FILTERING_DISABLED = 1 << 29;
    }
}

/// `StdVideoH265SequenceParameterSet`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265Sps {
    pub flags: SpsFlags,
    pub chroma_format_idc: u8,
    pub pic_width_in_luma_samples: u32,
    pub pic_height_in_luma_samples: u32,
    pub sps_video_parameter_set_id: u8,
    pub sps_max_sub_layers_minus1: u8,
    pub sps_seq_parameter_set_id: u8,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
    pub log2_max_pic_order_cnt_lsb_minus4: u8,
    pub log2_min_luma_coding_block_size_minus3: u8,
    pub log2_diff_max_min_luma_coding_block_size: u8,
    pub log2_min_luma_transform_block_size_minus2: u8,
    pub log2_diff_max_min_luma_transform_block_size: u8,
    pub max_transform_hierarchy_depth_inter: u8,
    pub max_transform_hierarchy_depth_intra: u8,
    pub num_short_term_ref_pic_sets: u8,
    pub num_long_term_ref_pics_sps: u8,
    pub pcm_sample_bit_depth_luma_minus1: u8,
    pub pcm_sample_bit_depth_chroma_minus1: u8,
    pub log2_min_pcm_luma_coding_block_size_minus3: u8,
    pub log2_diff_max_min_pcm_luma_coding_block_size: u8,
    pub palette_max_size: u8,
    pub delta_palette_max_predictor_size: u8,
    pub motion_vector_resolution_control_idc: u8,
    pub sps_num_palette_predictor_initializers_minus1: u8,
    pub conf_win_left_offset: u32,
    pub conf_win_right_offset: u32,
    pub conf_win_top_offset: u32,
    pub conf_win_bottom_offset: u32,
    pub profile_tier_level: StdH265ProfileTierLevel,
    pub dec_pic_buf_mgr: StdH265DecPicBufMgr,
    /// Present when `SPS_SCALING_LIST_DATA_PRESENT` is set.
    pub scaling_lists: Option<StdH265ScalingLists>,
    /// num_short_term_ref_pic_sets entries.
    pub short_term_ref_pic_sets: Vec<StdH265ShortTermRefPicSet>,
    /// Present when `LONG_TERM_REF_PICS_PRESENT` is set.
    pub long_term_ref_pics_sps: Option<StdH265LongTermRefPicsSps>,
    /// Present when `VUI_PARAMETERS_PRESENT` is set.
    pub vui: Option<StdH265SpsVui>,
    /// Present when `SPS_PALETTE_PREDICTOR_INITIALIZERS_PRESENT` is set.
    pub predictor_palette_entries: Option<StdH265PredictorPaletteEntries>,
}

bitflags! {
    /// `StdVideoH265PpsFlags`.
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    #[repr(transparent)]
    pub struct PpsFlags: u32 {
        const DEPENDENT_SLICE_SEGMENTS_ENABLED = 1 << 0;
        const OUTPUT_FLAG_PRESENT = 1 << 1;
        const SIGN_DATA_HIDING_ENABLED = 1 << 2;
        const CABAC_INIT_PRESENT = 1 << 3;
        const CONSTRAINED_INTRA_PRED = 1 << 4;
        const TRANSFORM_SKIP_ENABLED = 1 << 5;
        const CU_QP_DELTA_ENABLED = 1 << 6;
        const PPS_SLICE_CHROMA_QP_OFFSETS_PRESENT = 1 << 7;
        const WEIGHTED_PRED = 1 << 8;
        const WEIGHTED_BIPRED = 1 << 9;
        const TRANSQUANT_BYPASS_ENABLED = 1 << 10;
        const TILES_ENABLED = 1 << 11;
        const ENTROPY_CODING_SYNC_ENABLED = 1 << 12;
        const UNIFORM_SPACING = 1 << 13;
        const LOOP_FILTER_ACROSS_TILES_ENABLED = 1 << 14;
        const PPS_LOOP_FILTER_ACROSS_SLICES_ENABLED = 1 << 15;
        const DEBLOCKING_FILTER_CONTROL_PRESENT = 1 << 16;
        const DEBLOCKING_FILTER_OVERRIDE_ENABLED = 1 << 17;
        const PPS_DEBLOCKING_FILTER_DISABLED = 1 << 18;
        const PPS_SCALING_LIST_DATA_PRESENT = 1 << 19;
        const LISTS_MODIFICATION_PRESENT = 1 << 20;
        const SLICE_SEGMENT_HEADER_EXTENSION_PRESENT = 1 << 21;
        const PPS_EXTENSION_PRESENT = 1 << 22;
        const CROSS_COMPONENT_PREDICTION_ENABLED = 1 << 23;
        const CHROMA_QP_OFFSET_LIST_ENABLED = 1 << 24;
        const PPS_CURR_PIC_REF_ENABLED = 1 << 25;
        const RESIDUAL_ADAPTIVE_COLOUR_TRANSFORM_ENABLED = 1 << 26;
        const PPS_SLICE_ACT_QP_OFFSETS_PRESENT = 1 << 27;
        const PPS_PALETTE_PREDICTOR_INITIALIZERS_PRESENT = 1 << 28;
        const MONOCHROME_PALETTE = 1 << 29;
        const PPS_RANGE_EXTENSION = 1 << 30;
    }
}

/// `StdVideoH265PictureParameterSet`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StdH265Pps {
    pub flags: PpsFlags,
    pub pps_pic_parameter_set_id: u8,
    pub pps_seq_parameter_set_id: u8,
    pub sps_video_parameter_set_id: u8,
    pub num_extra_slice_header_bits: u8,
    pub num_ref_idx_l0_default_active_minus1: u8,
    pub num_ref_idx_l1_default_active_minus1: u8,
    pub init_qp_minus26: i8,
    pub diff_cu_qp_delta_depth: u8,
    pub pps_cb_qp_offset: i8,
    pub pps_cr_qp_offset: i8,
    pub pps_beta_offset_div2: i8,
    pub pps_tc_offset_div2: i8,
    pub log2_parallel_merge_level_minus2: u8,
    pub log2_max_transform_skip_block_size_minus2: u8,
    pub diff_cu_chroma_qp_offset_depth: u8,
    pub chroma_qp_offset_list_len_minus1: u8,
    pub cb_qp_offset_list: [i8; STD_VIDEO_H265_CHROMA_QP_OFFSET_LIST_SIZE],
    pub cr_qp_offset_list: [i8; STD_VIDEO_H265_CHROMA_QP_OFFSET_LIST_SIZE],
    pub log2_sao_offset_scale_luma: u8,
    pub log2_sao_offset_scale_chroma: u8,
    pub pps_act_y_qp_offset_plus5: i8,
    pub pps_act_cb_qp_offset_plus5: i8,
    pub pps_act_cr_qp_offset_plus3: i8,
    pub pps_num_palette_predictor_initializers: u8,
    pub luma_bit_depth_entry_minus8: u8,
    pub chroma_bit_depth_entry_minus8: u8,
    pub num_tile_columns_minus1: u8,
    pub num_tile_rows_minus1: u8,
    pub column_width_minus1: [u16; STD_VIDEO_H265_CHROMA_QP_OFFSET_TILE_COLS_LIST_SIZE],
    pub row_height_minus1: [u16; STD_VIDEO_H265_CHROMA_QP_OFFSET_TILE_ROWS_LIST_SIZE],
    /// Present when `PPS_SCALING_LIST_DATA_PRESENT` is set.
    pub scaling_lists: Option<StdH265ScalingLists>,
    /// Present when `PPS_PALETTE_PREDICTOR_INITIALIZERS_PRESENT` is set.
    pub predictor_palette_entries: Option<StdH265PredictorPaletteEntries>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_declaration_order() {
        assert_eq!(SpsFlags::SPS_TEMPORAL_ID_NESTING.bits(), 1);
        assert_eq!(SpsFlags::VUI_PARAMETERS_PRESENT.bits(), 1 << 13);
        assert_eq!(SpsFlags::INTRA_BOUNDARY_FILTERING_DISABLED.bits(), 1 << 29);
        assert_eq!(SpsFlags::all().bits().count_ones(), 30);

        assert_eq!(PpsFlags::PPS_SCALING_LIST_DATA_PRESENT.bits(), 1 << 19);
        assert_eq!(PpsFlags::PPS_RANGE_EXTENSION.bits(), 1 << 30);
        assert_eq!(PpsFlags::all().bits().count_ones(), 31);

        assert_eq!(SpsVuiFlags::RESTRICTED_REF_PIC_LISTS.bits(), 1 << 17);
        assert_eq!(VpsFlags::all().bits(), 0xf);
    }

    #[test]
    fn hrd_flags_packing() {
        let flags = HrdFlags {
            presence: HrdPresenceFlags::NAL_HRD_PARAMETERS_PRESENT
                | HrdPresenceFlags::SUB_PIC_CPB_PARAMS_IN_PIC_TIMING_SEI,
            fixed_pic_rate_general_flag: 0b1,
            fixed_pic_rate_within_cvs_flag: 0b11,
            low_delay_hrd_flag: 0b100,
        };

        assert_eq!(flags.bits(), 0b1001 | 0b1 << 4 | 0b11 << 12 | 0b100 << 20);
    }

    #[test]
    fn level_and_profile_mapping() {
        assert_eq!(StdH265LevelIdc::from_level_idc(30), StdH265LevelIdc::L1_0);
        assert_eq!(StdH265LevelIdc::from_level_idc(123), StdH265LevelIdc::L4_1);
        assert_eq!(StdH265LevelIdc::from_level_idc(186), StdH265LevelIdc::L6_2);
        assert_eq!(StdH265LevelIdc::from_level_idc(31), StdH265LevelIdc::Invalid);

        assert_eq!(StdH265ProfileIdc::from(2), StdH265ProfileIdc::Main10);
        assert_eq!(StdH265ProfileIdc::from(9), StdH265ProfileIdc::SccExtensions);
        assert_eq!(StdH265ProfileIdc::from(5), StdH265ProfileIdc::Invalid);
    }
}
