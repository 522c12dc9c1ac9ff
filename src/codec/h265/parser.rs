// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Parsed H.265 syntax structures.
//!
//! These are the records the bitstream parser hands over for VPSs, SPSs, PPSs and slices. Field
//! names follow the syntax element names of the H.265 specification, minus the `sps_`/`pps_`/
//! `vps_` prefixes. Arrays use the up-right diagonal scan order in which the syntax is coded.

use anyhow::anyhow;
use bitreader::BitReader;
use enumn::N;

use crate::utils::nalu;
use crate::utils::nalu::Header;
use crate::Point;
use crate::Rect;

/// Maximum number of temporal sub-layers.
pub const MAX_SUB_LAYERS: usize = 7;
/// Maximum number of pictures in a short-term reference picture set.
pub const MAX_DELTA_POCS: usize = 16;
/// Maximum number of long-term reference pictures signalled in the SPS.
pub const MAX_LONG_TERM_REF_PICS_SPS: usize = 32;
/// Maximum number of entries in a palette predictor initializer.
pub const MAX_PALETTE_PREDICTOR_SIZE: usize = 128;

/// Table 7-1 – NAL unit type codes and NAL unit type classes
#[derive(N, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum NaluType {
    #[default]
    TrailN = 0,
    TrailR = 1,
    TsaN = 2,
    TsaR = 3,
    StsaN = 4,
    StsaR = 5,
    RadlN = 6,
    RadlR = 7,
    RaslN = 8,
    RaslR = 9,
    RsvVclN10 = 10,
    RsvVclR11 = 11,
    RsvVclN12 = 12,
    RsvVclR13 = 13,
    RsvVclN14 = 14,
    RsvVclR15 = 15,
    BlaWLp = 16,
    BlaWRadl = 17,
    BlaNLp = 18,
    IdrWRadl = 19,
    IdrNLp = 20,
    CraNut = 21,
    RsvIrapVcl22 = 22,
    RsvIrapVcl23 = 23,
    RsvVcl24 = 24,
    RsvVcl25 = 25,
    RsvVcl26 = 26,
    RsvVcl27 = 27,
    RsvVcl28 = 28,
    RsvVcl29 = 29,
    RsvVcl30 = 30,
    RsvVcl31 = 31,
    VpsNut = 32,
    SpsNut = 33,
    PpsNut = 34,
    AudNut = 35,
    EosNut = 36,
    EobNut = 37,
    FdNut = 38,
    PrefixSeiNut = 39,
    SuffixSeiNut = 40,
    RsvNvcl41 = 41,
    RsvNvcl42 = 42,
    RsvNvcl43 = 43,
    RsvNvcl44 = 44,
    RsvNvcl45 = 45,
    RsvNvcl46 = 46,
    RsvNvcl47 = 47,
    Unspec48 = 48,
    Unspec49 = 49,
    Unspec50 = 50,
    Unspec51 = 51,
    Unspec52 = 52,
    Unspec53 = 53,
    Unspec54 = 54,
    Unspec55 = 55,
    Unspec56 = 56,
    Unspec57 = 57,
    Unspec58 = 58,
    Unspec59 = 59,
    Unspec60 = 60,
    Unspec61 = 61,
    Unspec62 = 62,
    Unspec63 = 63,
}

impl NaluType {
    /// Whether this is an IDR NALU.
    pub fn is_idr(&self) -> bool {
        matches!(self, Self::IdrWRadl | Self::IdrNLp)
    }

    /// Whether this is an IRAP NALU.
    pub fn is_irap(&self) -> bool {
        let type_ = *self as u32;
        type_ >= Self::BlaWLp as u32 && type_ <= Self::RsvIrapVcl23 as u32
    }

    /// Whether this is a BLA NALU.
    pub fn is_bla(&self) -> bool {
        let type_ = *self as u32;
        type_ >= Self::BlaWLp as u32 && type_ <= Self::BlaNLp as u32
    }

    /// Whether this is a CRA NALU.
    pub fn is_cra(&self) -> bool {
        matches!(self, Self::CraNut)
    }

    /// Whether this NALU carries slice data of a coded picture.
    pub fn is_vcl(&self) -> bool {
        (*self as u32) <= Self::RsvVcl31 as u32
    }

    /// Whether this is one of the parameter set NALUs.
    pub fn is_parameter_set(&self) -> bool {
        matches!(self, Self::VpsNut | Self::SpsNut | Self::PpsNut)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NaluHeader {
    /// The NALU type.
    pub type_: NaluType,
    /// Specifies the identifier of the layer to which a VCL NAL unit belongs or
    /// the identifier of a layer to which a non-VCL NAL unit applies.
    pub nuh_layer_id: u8,
    /// Minus 1 specifies a temporal identifier for the NAL unit. The value of
    /// nuh_temporal_id_plus1 shall not be equal to 0.
    pub nuh_temporal_id_plus1: u8,
}

impl NaluHeader {
    pub fn nuh_temporal_id(&self) -> u8 {
        self.nuh_temporal_id_plus1.saturating_sub(1)
    }
}

impl Header for NaluHeader {
    fn parse(data: &[u8]) -> anyhow::Result<Self> {
        let data = data
            .get(0..2)
            .ok_or(anyhow!("Not enough data for a NALU header"))?;
        let mut r = BitReader::new(data);

        // Skip forbidden_zero_bit
        r.skip(1)?;

        Ok(Self {
            type_: NaluType::n(r.read_u32(6)?).ok_or(anyhow!("Invalid NALU type"))?,
            nuh_layer_id: r.read_u8(6)?,
            nuh_temporal_id_plus1: r.read_u8(3)?,
        })
    }

    fn is_end(&self) -> bool {
        matches!(self.type_, NaluType::EosNut | NaluType::EobNut)
    }

    fn len(&self) -> usize {
        // 7.3.1.2
        2
    }
}

pub type Nalu<T> = nalu::Nalu<T, NaluHeader>;

/// H265 profiles. See A.3.
#[derive(N, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Main = 1,
    Main10 = 2,
    MainStill = 3,
    RangeExtensions = 4,
    HighThroughput = 5,
    MultiviewMain = 6,
    ScalableMain = 7,
    ThreeDMain = 8,
    ScreenContentCoding = 9,
    ScalableRangeExtensions = 10,
    HighThroughputScreenContentCoding = 11,
}

/// H265 levels as defined by table A.8.
/// general_level_idc and sub_layer_level_idc[ OpTid ] shall be set equal to a
/// value of 30 times the level number specified in Table A.8
#[derive(N, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    #[default]
    L1 = 30,
    L2 = 60,
    L2_1 = 63,
    L3 = 90,
    L3_1 = 93,
    L4 = 120,
    L4_1 = 123,
    L5 = 150,
    L5_1 = 153,
    L5_2 = 156,
    L6 = 180,
    L6_1 = 183,
    L6_2 = 186,
}

/// The general part of profile_tier_level().
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileTierLevel {
    pub general_profile_space: u8,
    pub general_tier_flag: bool,
    pub general_profile_idc: u8,
    pub general_profile_compatibility_flag: [bool; 32],
    pub general_progressive_source_flag: bool,
    pub general_interlaced_source_flag: bool,
    pub general_non_packed_constraint_flag: bool,
    pub general_frame_only_constraint_flag: bool,
    /// 30 times the level number.
    pub general_level_idc: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SublayerHrdParameters {
    // NOTE: The value of CpbCnt is cpb_cnt_minus1[i] + 1, and cpb_cnt_minus1
    // ranges from 0..=31
    /// bit_rate_value_minus1[ i ] (together with bit_rate_scale) specifies the
    /// maximum input bit rate for the i-th CPB when the CPB operates at the
    /// access unit level
    pub bit_rate_value_minus1: [u32; 32],
    /// cpb_size_value_minus1[ i ] is used together with cpb_size_scale to
    /// specify the i-th CPB size when the CPB operates at the access unit
    /// level.
    pub cpb_size_value_minus1: [u32; 32],
    pub cpb_size_du_value_minus1: [u32; 32],
    pub bit_rate_du_value_minus1: [u32; 32],
    pub cbr_flag: [bool; 32],
}

/// hrd_parameters(), see E.2.2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HrdParams {
    pub nal_hrd_parameters_present_flag: bool,
    pub vcl_hrd_parameters_present_flag: bool,
    pub sub_pic_hrd_params_present_flag: bool,
    pub tick_divisor_minus2: u8,
    pub du_cpb_removal_delay_increment_length_minus1: u8,
    pub sub_pic_cpb_params_in_pic_timing_sei_flag: bool,
    pub dpb_output_delay_du_length_minus1: u8,
    pub bit_rate_scale: u8,
    pub cpb_size_scale: u8,
    pub cpb_size_du_scale: u8,
    pub initial_cpb_removal_delay_length_minus1: u8,
    pub au_cpb_removal_delay_length_minus1: u8,
    pub dpb_output_delay_length_minus1: u8,
    pub fixed_pic_rate_general_flag: [bool; MAX_SUB_LAYERS],
    pub fixed_pic_rate_within_cvs_flag: [bool; MAX_SUB_LAYERS],
    pub elemental_duration_in_tc_minus1: [u32; MAX_SUB_LAYERS],
    pub low_delay_hrd_flag: [bool; MAX_SUB_LAYERS],
    pub cpb_cnt_minus1: [u32; MAX_SUB_LAYERS],
    pub nal_hrd: [SublayerHrdParameters; MAX_SUB_LAYERS],
    pub vcl_hrd: [SublayerHrdParameters; MAX_SUB_LAYERS],
}

impl Default for HrdParams {
    fn default() -> Self {
        Self {
            initial_cpb_removal_delay_length_minus1: 23,
            au_cpb_removal_delay_length_minus1: 23,
            dpb_output_delay_du_length_minus1: 23,
            nal_hrd_parameters_present_flag: Default::default(),
            vcl_hrd_parameters_present_flag: Default::default(),
            sub_pic_hrd_params_present_flag: Default::default(),
            tick_divisor_minus2: Default::default(),
            du_cpb_removal_delay_increment_length_minus1: Default::default(),
            sub_pic_cpb_params_in_pic_timing_sei_flag: Default::default(),
            bit_rate_scale: Default::default(),
            cpb_size_scale: Default::default(),
            cpb_size_du_scale: Default::default(),
            dpb_output_delay_length_minus1: Default::default(),
            fixed_pic_rate_general_flag: Default::default(),
            fixed_pic_rate_within_cvs_flag: Default::default(),
            elemental_duration_in_tc_minus1: Default::default(),
            low_delay_hrd_flag: Default::default(),
            cpb_cnt_minus1: Default::default(),
            nal_hrd: Default::default(),
            vcl_hrd: Default::default(),
        }
    }
}

/// vui_parameters(), see E.2.1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VuiParams {
    pub aspect_ratio_info_present_flag: bool,
    pub aspect_ratio_idc: u32,
    pub sar_width: u32,
    pub sar_height: u32,
    pub overscan_info_present_flag: bool,
    pub overscan_appropriate_flag: bool,
    pub video_signal_type_present_flag: bool,
    pub video_format: u8,
    pub video_full_range_flag: bool,
    pub colour_description_present_flag: bool,
    pub colour_primaries: u32,
    pub transfer_characteristics: u32,
    pub matrix_coeffs: u32,
    pub chroma_loc_info_present_flag: bool,
    pub chroma_sample_loc_type_top_field: u32,
    pub chroma_sample_loc_type_bottom_field: u32,
    pub neutral_chroma_indication_flag: bool,
    /// When set, the CVS conveys pictures that represent fields.
    pub field_seq_flag: bool,
    pub frame_field_info_present_flag: bool,
    pub default_display_window_flag: bool,
    pub def_disp_win_left_offset: u32,
    pub def_disp_win_right_offset: u32,
    pub def_disp_win_top_offset: u32,
    pub def_disp_win_bottom_offset: u32,
    pub timing_info_present_flag: bool,
    pub num_units_in_tick: u32,
    pub time_scale: u32,
    pub poc_proportional_to_timing_flag: bool,
    pub num_ticks_poc_diff_one_minus1: u32,
    pub hrd_parameters_present_flag: bool,
    pub hrd: HrdParams,
    pub bitstream_restriction_flag: bool,
    pub tiles_fixed_structure_flag: bool,
    pub motion_vectors_over_pic_boundaries_flag: bool,
    pub restricted_ref_pic_lists_flag: bool,
    pub min_spatial_segmentation_idc: u32,
    pub max_bytes_per_pic_denom: u32,
    pub max_bits_per_min_cu_denom: u32,
    pub log2_max_mv_length_horizontal: u32,
    pub log2_max_mv_length_vertical: u32,
}

impl Default for VuiParams {
    fn default() -> Self {
        Self {
            aspect_ratio_info_present_flag: Default::default(),
            aspect_ratio_idc: Default::default(),
            sar_width: Default::default(),
            sar_height: Default::default(),
            overscan_info_present_flag: Default::default(),
            overscan_appropriate_flag: Default::default(),
            video_signal_type_present_flag: Default::default(),
            video_format: 5,
            video_full_range_flag: Default::default(),
            colour_description_present_flag: Default::default(),
            colour_primaries: 2,
            transfer_characteristics: 2,
            matrix_coeffs: 2,
            chroma_loc_info_present_flag: Default::default(),
            chroma_sample_loc_type_top_field: Default::default(),
            chroma_sample_loc_type_bottom_field: Default::default(),
            neutral_chroma_indication_flag: Default::default(),
            field_seq_flag: Default::default(),
            frame_field_info_present_flag: Default::default(),
            default_display_window_flag: Default::default(),
            def_disp_win_left_offset: Default::default(),
            def_disp_win_right_offset: Default::default(),
            def_disp_win_top_offset: Default::default(),
            def_disp_win_bottom_offset: Default::default(),
            timing_info_present_flag: Default::default(),
            num_units_in_tick: Default::default(),
            time_scale: Default::default(),
            poc_proportional_to_timing_flag: Default::default(),
            num_ticks_poc_diff_one_minus1: Default::default(),
            hrd_parameters_present_flag: Default::default(),
            hrd: Default::default(),
            bitstream_restriction_flag: Default::default(),
            tiles_fixed_structure_flag: Default::default(),
            motion_vectors_over_pic_boundaries_flag: true,
            restricted_ref_pic_lists_flag: Default::default(),
            min_spatial_segmentation_idc: Default::default(),
            max_bytes_per_pic_denom: 2,
            max_bits_per_min_cu_denom: 1,
            log2_max_mv_length_horizontal: 15,
            log2_max_mv_length_vertical: 15,
        }
    }
}

/// A H.265 Video Parameter Set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vps {
    /// Identifies the VPS for reference by other syntax elements.
    pub video_parameter_set_id: u8,
    pub base_layer_internal_flag: bool,
    pub base_layer_available_flag: bool,
    pub max_layers_minus1: u8,
    /// Plus 1 specifies the maximum number of temporal sub-layers that may be
    /// present in each CVS referring to the VPS.
    pub max_sub_layers_minus1: u8,
    pub temporal_id_nesting_flag: bool,
    pub profile_tier_level: ProfileTierLevel,
    pub sub_layer_ordering_info_present_flag: bool,
    pub max_dec_pic_buffering_minus1: [u32; MAX_SUB_LAYERS],
    pub max_num_reorder_pics: [u32; MAX_SUB_LAYERS],
    pub max_latency_increase_plus1: [u32; MAX_SUB_LAYERS],
    pub max_layer_id: u8,
    pub num_layer_sets_minus1: u32,
    pub timing_info_present_flag: bool,
    pub num_units_in_tick: u32,
    pub time_scale: u32,
    pub poc_proportional_to_timing_flag: bool,
    pub num_ticks_poc_diff_one_minus1: u32,
    pub num_hrd_parameters: u32,
    pub hrd_layer_set_idx: Vec<u16>,
    /// cprms_present_flag[ 0 ] is inferred to be equal to true.
    pub cprms_present_flag: Vec<bool>,
    pub hrd_parameters: Vec<HrdParams>,
    pub extension_flag: bool,
}

impl Default for Vps {
    fn default() -> Self {
        Self {
            video_parameter_set_id: Default::default(),
            base_layer_internal_flag: Default::default(),
            base_layer_available_flag: Default::default(),
            max_layers_minus1: Default::default(),
            max_sub_layers_minus1: Default::default(),
            temporal_id_nesting_flag: Default::default(),
            profile_tier_level: Default::default(),
            sub_layer_ordering_info_present_flag: Default::default(),
            max_dec_pic_buffering_minus1: Default::default(),
            max_num_reorder_pics: Default::default(),
            max_latency_increase_plus1: Default::default(),
            max_layer_id: Default::default(),
            num_layer_sets_minus1: Default::default(),
            timing_info_present_flag: Default::default(),
            num_units_in_tick: Default::default(),
            time_scale: Default::default(),
            poc_proportional_to_timing_flag: Default::default(),
            num_ticks_poc_diff_one_minus1: Default::default(),
            num_hrd_parameters: Default::default(),
            hrd_layer_set_idx: Default::default(),
            cprms_present_flag: vec![true],
            hrd_parameters: Default::default(),
            extension_flag: Default::default(),
        }
    }
}

/// scaling_list_data(), in coded (up-right diagonal) order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalingLists {
    /// plus 8 specifies the value of the variable ScalingFactor[ 2 ][ matrixId
    /// ] [ 0 ][ 0 ] for the scaling list for the 16x16 size.
    pub scaling_list_dc_coef_minus8_16x16: [i16; 6],
    /// plus 8 specifies the value of the variable ScalingFactor[ 3 ][ matrixId
    /// ][ 0 ][ 0 ] for the scaling list for the 32x32 size. Only matrixId 0
    /// and 3 are used unless chroma_format_idc is 3.
    pub scaling_list_dc_coef_minus8_32x32: [i16; 6],
    pub scaling_list_4x4: [[u8; 16]; 6],
    pub scaling_list_8x8: [[u8; 64]; 6],
    pub scaling_list_16x16: [[u8; 64]; 6],
    /// Indexed by matrixId like the other sizes.
    pub scaling_list_32x32: [[u8; 64]; 6],
}

impl Default for ScalingLists {
    fn default() -> Self {
        Self {
            scaling_list_dc_coef_minus8_16x16: Default::default(),
            scaling_list_dc_coef_minus8_32x32: Default::default(),
            scaling_list_4x4: Default::default(),
            scaling_list_8x8: [[0; 64]; 6],
            scaling_list_16x16: [[0; 64]; 6],
            scaling_list_32x32: [[0; 64]; 6],
        }
    }
}

/// st_ref_pic_set(), with the delta POCs already derived as per 7.4.8.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShortTermRefPicSet {
    pub inter_ref_pic_set_prediction_flag: bool,
    pub delta_idx_minus1: u8,
    pub delta_rps_sign: bool,
    pub abs_delta_rps_minus1: u16,
    /// Only meaningful when `inter_ref_pic_set_prediction_flag` is set.
    pub used_by_curr_pic_flag: [bool; MAX_DELTA_POCS],
    /// Only meaningful when `inter_ref_pic_set_prediction_flag` is set.
    pub use_delta_flag: [bool; MAX_DELTA_POCS],
    pub num_negative_pics: u8,
    pub num_positive_pics: u8,
    pub used_by_curr_pic_s0: [bool; MAX_DELTA_POCS],
    pub used_by_curr_pic_s1: [bool; MAX_DELTA_POCS],
    /// DeltaPocS0, negative and decreasing.
    pub delta_poc_s0: [i32; MAX_DELTA_POCS],
    /// DeltaPocS1, positive and increasing.
    pub delta_poc_s1: [i32; MAX_DELTA_POCS],
    pub num_delta_pocs: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpsRangeExtension {
    pub transform_skip_rotation_enabled_flag: bool,
    pub transform_skip_context_enabled_flag: bool,
    pub implicit_rdpcm_enabled_flag: bool,
    pub explicit_rdpcm_enabled_flag: bool,
    pub extended_precision_processing_flag: bool,
    pub intra_smoothing_disabled_flag: bool,
    pub high_precision_offsets_enabled_flag: bool,
    pub persistent_rice_adaptation_enabled_flag: bool,
    pub cabac_bypass_alignment_enabled_flag: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpsSccExtension {
    /// When set, specifies that a picture in the CVS may be included in a
    /// reference picture list of a slice of the picture itself.
    pub curr_pic_ref_enabled_flag: bool,
    pub palette_mode_enabled_flag: bool,
    pub palette_max_size: u8,
    pub delta_palette_max_predictor_size: u8,
    pub palette_predictor_initializers_present_flag: bool,
    pub num_palette_predictor_initializer_minus1: u8,
    /// palette_predictor_initializer[ comp ][ i ].
    pub palette_predictor_initializer: [[u16; MAX_PALETTE_PREDICTOR_SIZE]; 3],
    pub motion_vector_resolution_control_idc: u8,
    pub intra_boundary_filtering_disabled_flag: bool,
}

impl Default for SpsSccExtension {
    fn default() -> Self {
        Self {
            curr_pic_ref_enabled_flag: Default::default(),
            palette_mode_enabled_flag: Default::default(),
            palette_max_size: Default::default(),
            delta_palette_max_predictor_size: Default::default(),
            palette_predictor_initializers_present_flag: Default::default(),
            num_palette_predictor_initializer_minus1: Default::default(),
            palette_predictor_initializer: [[0; MAX_PALETTE_PREDICTOR_SIZE]; 3],
            motion_vector_resolution_control_idc: Default::default(),
            intra_boundary_filtering_disabled_flag: Default::default(),
        }
    }
}

/// A H.265 Sequence Parameter Set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sps {
    /// Specifies the value of the vps_video_parameter_set_id of the active VPS.
    pub video_parameter_set_id: u8,
    pub max_sub_layers_minus1: u8,
    pub temporal_id_nesting_flag: bool,
    pub profile_tier_level: ProfileTierLevel,
    /// Provides an identifier for the SPS for reference by other syntax
    /// elements.
    pub seq_parameter_set_id: u8,
    pub chroma_format_idc: u8,
    pub separate_colour_plane_flag: bool,
    pub pic_width_in_luma_samples: u16,
    pub pic_height_in_luma_samples: u16,
    /// When true, indicates that the conformance cropping window offset
    /// parameters follow next in the SPS.
    pub conformance_window_flag: bool,
    pub conf_win_left_offset: u32,
    pub conf_win_right_offset: u32,
    pub conf_win_top_offset: u32,
    pub conf_win_bottom_offset: u32,
    pub bit_depth_luma_minus8: u8,
    pub bit_depth_chroma_minus8: u8,
    pub log2_max_pic_order_cnt_lsb_minus4: u8,
    pub sub_layer_ordering_info_present_flag: bool,
    pub max_dec_pic_buffering_minus1: [u8; MAX_SUB_LAYERS],
    pub max_num_reorder_pics: [u8; MAX_SUB_LAYERS],
    pub max_latency_increase_plus1: [u8; MAX_SUB_LAYERS],
    pub log2_min_luma_coding_block_size_minus3: u8,
    pub log2_diff_max_min_luma_coding_block_size: u8,
    pub log2_min_luma_transform_block_size_minus2: u8,
    pub log2_diff_max_min_luma_transform_block_size: u8,
    pub max_transform_hierarchy_depth_inter: u8,
    pub max_transform_hierarchy_depth_intra: u8,
    pub scaling_list_enabled_flag: bool,
    /// When set, `scaling_list` holds the SPS scaling_list_data(). When
    /// `scaling_list_enabled_flag` is set but this one is not, the default
    /// lists apply.
    pub scaling_list_data_present_flag: bool,
    pub scaling_list: ScalingLists,
    pub amp_enabled_flag: bool,
    pub sample_adaptive_offset_enabled_flag: bool,
    pub pcm_enabled_flag: bool,
    pub pcm_sample_bit_depth_luma_minus1: u8,
    pub pcm_sample_bit_depth_chroma_minus1: u8,
    pub log2_min_pcm_luma_coding_block_size_minus3: u8,
    pub log2_diff_max_min_pcm_luma_coding_block_size: u8,
    pub pcm_loop_filter_disabled_flag: bool,
    pub num_short_term_ref_pic_sets: u8,
    pub short_term_ref_pic_set: Vec<ShortTermRefPicSet>,
    pub long_term_ref_pics_present_flag: bool,
    pub num_long_term_ref_pics_sps: u8,
    pub lt_ref_pic_poc_lsb_sps: Vec<u32>,
    pub used_by_curr_pic_lt_sps_flag: Vec<bool>,
    pub temporal_mvp_enabled_flag: bool,
    pub strong_intra_smoothing_enabled_flag: bool,
    pub vui_parameters_present_flag: bool,
    pub vui_parameters: VuiParams,
    pub extension_present_flag: bool,
    pub range_extension_flag: bool,
    pub range_extension: SpsRangeExtension,
    pub multilayer_extension_flag: bool,
    pub three_d_extension_flag: bool,
    pub scc_extension_flag: bool,
    pub scc_extension: SpsSccExtension,
    pub extension_4bits: u8,
}

impl Sps {
    /// Returns the coded width of the stream.
    pub const fn width(&self) -> u16 {
        self.pic_width_in_luma_samples
    }

    /// Returns the coded height of the stream.
    pub const fn height(&self) -> u16 {
        self.pic_height_in_luma_samples
    }

    /// Returns `ChromaArrayType`, as computed in the specification.
    pub const fn chroma_array_type(&self) -> u8 {
        match self.separate_colour_plane_flag {
            false => self.chroma_format_idc,
            true => 0,
        }
    }

    /// Returns `SubWidthC` and `SubHeightC`.
    ///
    /// See table 6-1 in the specification.
    fn sub_width_height_c(&self) -> (u32, u32) {
        match (self.chroma_format_idc, self.separate_colour_plane_flag) {
            (1, false) => (2, 2),
            (2, false) => (2, 1),
            // 4:0:0, 4:4:4 and separate colour planes.
            _ => (1, 1),
        }
    }

    /// Returns the conformance cropping window, or the full coded frame when there is none.
    pub fn visible_rectangle(&self) -> Rect<u32> {
        let width = u32::from(self.width());
        let height = u32::from(self.height());

        if !self.conformance_window_flag {
            return Rect {
                min: Point { x: 0, y: 0 },
                max: Point {
                    x: width,
                    y: height,
                },
            };
        }

        let (sub_width_c, sub_height_c) = self.sub_width_height_c();

        let crop_left = sub_width_c * self.conf_win_left_offset;
        let crop_right = sub_width_c * self.conf_win_right_offset;
        let crop_top = sub_height_c * self.conf_win_top_offset;
        let crop_bottom = sub_height_c * self.conf_win_bottom_offset;

        Rect {
            min: Point {
                x: crop_left,
                y: crop_top,
            },
            max: Point {
                x: width.saturating_sub(crop_left + crop_right),
                y: height.saturating_sub(crop_top + crop_bottom),
            },
        }
    }

    /// The DPB size the stream asks for at its highest temporal sub-layer.
    pub fn max_dpb_size(&self) -> usize {
        let highest_tid = usize::from(self.max_sub_layers_minus1).min(MAX_SUB_LAYERS - 1);
        usize::from(self.max_dec_pic_buffering_minus1[highest_tid]) + 1
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PpsRangeExtension {
    pub log2_max_transform_skip_block_size_minus2: u32,
    pub cross_component_prediction_enabled_flag: bool,
    pub chroma_qp_offset_list_enabled_flag: bool,
    pub diff_cu_chroma_qp_offset_depth: u32,
    /// chroma_qp_offset_list_len_minus1 plus 1 specifies the number of
    /// cb_qp_offset_list[ i ] and cr_qp_offset_list[ i ] syntax elements that
    /// are present in the PPS.
    pub chroma_qp_offset_list_len_minus1: u32,
    pub cb_qp_offset_list: [i32; 6],
    pub cr_qp_offset_list: [i32; 6],
    pub log2_sao_offset_scale_luma: u32,
    pub log2_sao_offset_scale_chroma: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PpsSccExtension {
    pub curr_pic_ref_enabled_flag: bool,
    pub residual_adaptive_colour_transform_enabled_flag: bool,
    pub slice_act_qp_offsets_present_flag: bool,
    pub act_y_qp_offset_plus5: i8,
    pub act_cb_qp_offset_plus5: i8,
    pub act_cr_qp_offset_plus3: i8,
    pub palette_predictor_initializers_present_flag: bool,
    pub num_palette_predictor_initializers: u8,
    pub monochrome_palette_flag: bool,
    pub luma_bit_depth_entry_minus8: u8,
    pub chroma_bit_depth_entry_minus8: u8,
    /// pps_palette_predictor_initializer[ comp ][ i ].
    pub palette_predictor_initializer: [[u16; MAX_PALETTE_PREDICTOR_SIZE]; 3],
}

impl Default for PpsSccExtension {
    fn default() -> Self {
        Self {
            curr_pic_ref_enabled_flag: Default::default(),
            residual_adaptive_colour_transform_enabled_flag: Default::default(),
            slice_act_qp_offsets_present_flag: Default::default(),
            act_y_qp_offset_plus5: Default::default(),
            act_cb_qp_offset_plus5: Default::default(),
            act_cr_qp_offset_plus3: Default::default(),
            palette_predictor_initializers_present_flag: Default::default(),
            num_palette_predictor_initializers: Default::default(),
            monochrome_palette_flag: Default::default(),
            luma_bit_depth_entry_minus8: Default::default(),
            chroma_bit_depth_entry_minus8: Default::default(),
            palette_predictor_initializer: [[0; MAX_PALETTE_PREDICTOR_SIZE]; 3],
        }
    }
}

/// A H.265 Picture Parameter Set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pps {
    /// Identifies the PPS for reference by other syntax elements.
    pub pic_parameter_set_id: u8,
    /// Specifies the value of sps_seq_parameter_set_id for the active SPS.
    pub seq_parameter_set_id: u8,
    pub dependent_slice_segments_enabled_flag: bool,
    pub output_flag_present_flag: bool,
    pub num_extra_slice_header_bits: u8,
    pub sign_data_hiding_enabled_flag: bool,
    pub cabac_init_present_flag: bool,
    pub num_ref_idx_l0_default_active_minus1: u8,
    pub num_ref_idx_l1_default_active_minus1: u8,
    pub init_qp_minus26: i8,
    pub constrained_intra_pred_flag: bool,
    pub transform_skip_enabled_flag: bool,
    pub cu_qp_delta_enabled_flag: bool,
    pub diff_cu_qp_delta_depth: u8,
    pub cb_qp_offset: i8,
    pub cr_qp_offset: i8,
    pub slice_chroma_qp_offsets_present_flag: bool,
    pub weighted_pred_flag: bool,
    pub weighted_bipred_flag: bool,
    pub transquant_bypass_enabled_flag: bool,
    pub tiles_enabled_flag: bool,
    pub entropy_coding_sync_enabled_flag: bool,
    pub num_tile_columns_minus1: u8,
    pub num_tile_rows_minus1: u8,
    pub uniform_spacing_flag: bool,
    pub column_width_minus1: [u32; 19],
    pub row_height_minus1: [u32; 21],
    pub loop_filter_across_tiles_enabled_flag: bool,
    pub loop_filter_across_slices_enabled_flag: bool,
    pub deblocking_filter_control_present_flag: bool,
    pub deblocking_filter_override_enabled_flag: bool,
    pub deblocking_filter_disabled_flag: bool,
    pub beta_offset_div2: i8,
    pub tc_offset_div2: i8,
    pub scaling_list_data_present_flag: bool,
    pub scaling_list: ScalingLists,
    pub lists_modification_present_flag: bool,
    pub log2_parallel_merge_level_minus2: u8,
    pub slice_segment_header_extension_present_flag: bool,
    pub extension_present_flag: bool,
    pub range_extension_flag: bool,
    pub range_extension: PpsRangeExtension,
    pub multilayer_extension_flag: bool,
    pub three_d_extension_flag: bool,
    pub scc_extension_flag: bool,
    pub scc_extension: PpsSccExtension,
    pub extension_4bits: u8,

    // Derived by the parser from the active SPS.
    /// Equivalent to PicWidthInCtbsY in the specification.
    pub pic_width_in_ctbs_y: u32,
    /// Equivalent to PicHeightInCtbsY in the specification.
    pub pic_height_in_ctbs_y: u32,
}

/// The parts of slice_segment_header() needed to describe a picture to the
/// accelerator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SliceHeader {
    pub first_slice_segment_in_pic_flag: bool,
    pub pic_parameter_set_id: u8,
    pub dependent_slice_segment_flag: bool,
    pub pic_order_cnt_lsb: u16,
    /// When set, the short-term RPS of the current picture is one of the SPS
    /// candidates, selected by `short_term_ref_pic_set_idx`.
    pub short_term_ref_pic_set_sps_flag: bool,
    /// The st_ref_pic_set() coded in the slice header, if any.
    pub short_term_ref_pic_set: ShortTermRefPicSet,
    pub short_term_ref_pic_set_idx: u8,
    /// Size in bits of the st_ref_pic_set() coded in the slice header.
    pub st_rps_bits: u32,
    /// NumPicTotalCurr, see 7-55.
    pub num_pic_total_curr: u32,
}

/// A H.265 slice segment: an integer number of CTUs ordered consecutively in
/// the tile scan and contained in a single NAL unit.
pub struct Slice<T> {
    /// The slice header.
    pub header: SliceHeader,
    /// The NAL unit backing this slice.
    pub nalu: Nalu<T>,
}

impl<T> Slice<T> {
    /// Get a reference to the slice's header.
    pub fn header(&self) -> &SliceHeader {
        &self.header
    }

    /// Get a reference to the slice's nalu.
    pub fn nalu(&self) -> &Nalu<T> {
        &self.nalu
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::utils::nalu::NaluIterator;

    const STREAM: [u8; 22] = [
        // VPS, four byte start code.
        0x00, 0x00, 0x00, 0x01, 0x40, 0x01, 0x0c, 0x01, //
        // IDR_W_RADL, trailing zero byte.
        0x00, 0x00, 0x01, 0x26, 0x01, 0xaf, 0x00, //
        // EOS.
        0x00, 0x00, 0x01, 0x48, 0x01, 0xff, 0xff,
    ];

    #[test]
    fn parse_nalu_header() {
        let hdr = NaluHeader::parse(&[0x42, 0x01]).unwrap();
        assert_eq!(hdr.type_, NaluType::SpsNut);
        assert_eq!(hdr.nuh_layer_id, 0);
        assert_eq!(hdr.nuh_temporal_id_plus1, 1);
        assert_eq!(hdr.nuh_temporal_id(), 0);

        assert!(NaluHeader::parse(&[0x42]).is_err());
    }

    #[test]
    fn split_annex_b_stream() {
        let nalus: Vec<Nalu<&[u8]>> = NaluIterator::new(&STREAM[..]).collect();
        assert_eq!(nalus.len(), 3);

        assert_eq!(nalus[0].header.type_, NaluType::VpsNut);
        assert_eq!(nalus[0].sc_offset(), 0);
        assert_eq!(nalus[0].offset(), 4);
        assert_eq!(nalus[0].as_ref(), &[0x40, 0x01, 0x0c, 0x01]);

        assert_eq!(nalus[1].header.type_, NaluType::IdrWRadl);
        assert_eq!(nalus[1].offset(), 11);
        assert_eq!(nalus[1].as_ref(), &[0x26, 0x01, 0xaf]);

        // The end of sequence NALU is just its header.
        assert_eq!(nalus[2].header.type_, NaluType::EosNut);
        assert_eq!(nalus[2].size(), 2);
    }

    #[test]
    fn no_start_code_left() {
        let mut cursor = Cursor::new(&[0xffu8, 0xff, 0x00, 0x01][..]);
        assert!(Nalu::<&[u8]>::next(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn nalu_type_classes() {
        assert!(NaluType::IdrNLp.is_idr());
        assert!(NaluType::IdrNLp.is_irap());
        assert!(NaluType::CraNut.is_irap());
        assert!(!NaluType::CraNut.is_idr());
        assert!(NaluType::BlaWRadl.is_bla());
        assert!(!NaluType::TrailR.is_irap());
        assert!(NaluType::RsvVcl31.is_vcl());
        assert!(!NaluType::VpsNut.is_vcl());
        assert!(NaluType::PpsNut.is_parameter_set());
    }

    #[test]
    fn visible_rectangle_uses_crop_units() {
        let sps = Sps {
            chroma_format_idc: 1,
            pic_width_in_luma_samples: 1920,
            pic_height_in_luma_samples: 1088,
            conformance_window_flag: true,
            conf_win_bottom_offset: 4,
            ..Default::default()
        };

        let rect = sps.visible_rectangle();
        assert_eq!(rect.min, Point { x: 0, y: 0 });
        assert_eq!(rect.max, Point { x: 1920, y: 1080 });

        let sps = Sps {
            conformance_window_flag: false,
            ..sps
        };
        assert_eq!(sps.visible_rectangle().max, Point { x: 1920, y: 1088 });
    }

    #[test]
    fn max_dpb_size_uses_highest_sub_layer() {
        let mut sps = Sps {
            max_sub_layers_minus1: 1,
            ..Default::default()
        };
        sps.max_dec_pic_buffering_minus1[0] = 2;
        sps.max_dec_pic_buffering_minus1[1] = 5;

        assert_eq!(sps.max_dpb_size(), 6);
    }

    #[test]
    fn level_and_profile_from_idc() {
        assert_eq!(Level::n(153), Some(Level::L5_1));
        assert_eq!(Level::n(151), None);
        assert_eq!(Profile::n(2), Some(Profile::Main10));
        assert_eq!(Profile::n(0), None);
    }
}
