// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Last-seen parameter sets and their update sequence counters.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::codec::h265::parser::HrdParams;
use crate::codec::h265::parser::Pps;
use crate::codec::h265::parser::Sps;
use crate::codec::h265::parser::SpsSccExtension;
use crate::codec::h265::parser::VuiParams;
use crate::codec::h265::parser::Vps;
use crate::decoder::client::ParameterSetKind;
use crate::decoder::client::PictureParameters;
use crate::decoder::client::VideoDecodeClient;
use crate::decoder::h265::translate::translate_pps;
use crate::decoder::h265::translate::translate_sps;
use crate::decoder::h265::translate::translate_vps;
use crate::decoder::DecodeError;
use crate::video_std::h265::StdH265Pps;
use crate::video_std::h265::StdH265Sps;
use crate::video_std::h265::StdH265Vps;

/// Whether all the listed fields of `$a` and `$b` are equal.
macro_rules! fields_eq {
    ($a:expr, $b:expr, $($field:ident),+ $(,)?) => {
        true $(&& $a.$field == $b.$field)+
    };
}

/// A parameter set freshly parsed from the bitstream.
#[derive(Clone, Copy, Debug)]
pub enum ParameterSet<'a> {
    Vps(&'a Vps),
    Sps(&'a Sps),
    Pps(&'a Pps),
}

impl ParameterSet<'_> {
    pub fn kind(&self) -> ParameterSetKind {
        match self {
            ParameterSet::Vps(_) => ParameterSetKind::Vps,
            ParameterSet::Sps(_) => ParameterSetKind::Sps,
            ParameterSet::Pps(_) => ParameterSetKind::Pps,
        }
    }

    /// The id other syntax structures refer to this parameter set with.
    pub fn id(&self) -> u8 {
        match self {
            ParameterSet::Vps(vps) => vps.video_parameter_set_id,
            ParameterSet::Sps(sps) => sps.seq_parameter_set_id,
            ParameterSet::Pps(pps) => pps.pic_parameter_set_id,
        }
    }
}

/// What [`ParameterSetCache::update`] did with a parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The parameter set is equivalent to the cached one and was discarded.
    Unchanged,
    /// The parameter set replaced the cached one under a new update sequence number.
    Changed { update_sequence_count: u32 },
    /// A new VPS was cached but not announced to the client. The client expects an SPS before
    /// the VPS it refers to, while streams usually carry the VPS first.
    Suppressed,
}

/// A cached parameter set together with its translation.
#[derive(Debug)]
pub struct CachedSet<S, R, O> {
    parsed: S,
    record: Rc<R>,
    client_object: Option<O>,
}

impl<S, R, O> CachedSet<S, R, O> {
    pub fn parsed(&self) -> &S {
        &self.parsed
    }

    pub fn record(&self) -> &Rc<R> {
        &self.record
    }

    /// The object the client created when this version was pushed, if any.
    pub fn client_object(&self) -> Option<&O> {
        self.client_object.as_ref()
    }
}

/// Counter and last-seen parameter sets of one kind.
#[derive(Debug)]
struct ParameterSetTable<S, R, O> {
    sets: BTreeMap<u8, CachedSet<S, R, O>>,
    update_sequence_count: u32,
}

impl<S, R, O> Default for ParameterSetTable<S, R, O> {
    fn default() -> Self {
        Self {
            sets: Default::default(),
            update_sequence_count: 0,
        }
    }
}

impl<S: Clone, R, O: Clone> ParameterSetTable<S, R, O> {
    /// Whether `parsed` would not change anything for the decode of the pictures using `id`.
    fn is_unchanged(&self, id: u8, parsed: &S, equivalent: fn(&S, &S) -> bool) -> bool {
        self.sets
            .get(&id)
            .is_some_and(|cached| equivalent(&cached.parsed, parsed))
    }

    /// Replaces the set cached for `id`, pushing it to `client` first if there is one. Nothing is
    /// committed if the push fails.
    fn replace<C>(
        &mut self,
        id: u8,
        parsed: &S,
        record: R,
        to_params: fn(Rc<R>) -> PictureParameters,
        client: Option<&mut C>,
    ) -> Result<u32, DecodeError>
    where
        C: VideoDecodeClient<ParameterObject = O>,
    {
        let record = Rc::new(record);
        let update_sequence_count = self.update_sequence_count + 1;
        let mut client_object = self
            .sets
            .get(&id)
            .and_then(|cached| cached.client_object.clone());

        if let Some(client) = client {
            let params = to_params(Rc::clone(&record));
            let kind = params.kind();

            client
                .update_picture_parameters(&params, &mut client_object, update_sequence_count)
                .map_err(|source| {
                    log::error!("Failed to push {} {}: {:#}", kind, id, source);
                    DecodeError::ParameterUpdateRejected { kind, source }
                })?;
        }

        self.sets.insert(
            id,
            CachedSet {
                parsed: parsed.clone(),
                record,
                client_object,
            },
        );
        self.update_sequence_count = update_sequence_count;

        Ok(update_sequence_count)
    }
}

/// Last-seen VPSs, SPSs and PPSs of a decoder instance, with their standard records.
///
/// `O` is the type of the objects the client creates for pushed parameter sets.
#[derive(Debug)]
pub struct ParameterSetCache<O> {
    vps: ParameterSetTable<Vps, StdH265Vps, O>,
    sps: ParameterSetTable<Sps, StdH265Sps, O>,
    pps: ParameterSetTable<Pps, StdH265Pps, O>,
}

impl<O> Default for ParameterSetCache<O> {
    fn default() -> Self {
        Self {
            vps: Default::default(),
            sps: Default::default(),
            pps: Default::default(),
        }
    }
}

impl<O: Clone> ParameterSetCache<O> {
    /// Processes a newly parsed parameter set.
    ///
    /// Equivalent re-signalling is discarded. Otherwise the set is translated, gets the next
    /// update sequence number of its kind and replaces the cached one. It is pushed to `client`
    /// when one is given, i.e. when parameter sets are passed out of band.
    pub fn update<C>(
        &mut self,
        set: ParameterSet<'_>,
        client: Option<&mut C>,
    ) -> Result<UpdateOutcome, DecodeError>
    where
        C: VideoDecodeClient<ParameterObject = O>,
    {
        let id = set.id();

        match set {
            ParameterSet::Vps(vps) => {
                if self.vps.is_unchanged(id, vps, vps_equivalent) {
                    return Ok(UpdateOutcome::Unchanged);
                }

                log::warn!("Drop VPS {} update, the client needs the SPS first", id);
                // Cached for the pictures, but neither counted nor pushed.
                self.vps.sets.insert(
                    id,
                    CachedSet {
                        parsed: vps.clone(),
                        record: Rc::new(translate_vps(vps)),
                        client_object: None,
                    },
                );

                Ok(UpdateOutcome::Suppressed)
            }
            ParameterSet::Sps(sps) => {
                if self.sps.is_unchanged(id, sps, sps_equivalent) {
                    return Ok(UpdateOutcome::Unchanged);
                }

                let update_sequence_count = self.sps.replace(
                    id,
                    sps,
                    translate_sps(sps),
                    PictureParameters::Sps,
                    client,
                )?;
                log::debug!("SPS {} updated, update sequence {}", id, update_sequence_count);

                Ok(UpdateOutcome::Changed {
                    update_sequence_count,
                })
            }
            ParameterSet::Pps(pps) => {
                if self.pps.is_unchanged(id, pps, pps_equivalent) {
                    return Ok(UpdateOutcome::Unchanged);
                }

                let sps = self
                    .sps
                    .sets
                    .get(&pps.seq_parameter_set_id)
                    .map(|cached| &cached.parsed);
                let record = translate_pps(pps, sps);

                let update_sequence_count =
                    self.pps
                        .replace(id, pps, record, PictureParameters::Pps, client)?;
                log::debug!("PPS {} updated, update sequence {}", id, update_sequence_count);

                Ok(UpdateOutcome::Changed {
                    update_sequence_count,
                })
            }
        }
    }
}

impl<O> ParameterSetCache<O> {
    pub fn vps(&self, id: u8) -> Option<&CachedSet<Vps, StdH265Vps, O>> {
        self.vps.sets.get(&id)
    }

    pub fn sps(&self, id: u8) -> Option<&CachedSet<Sps, StdH265Sps, O>> {
        self.sps.sets.get(&id)
    }

    pub fn pps(&self, id: u8) -> Option<&CachedSet<Pps, StdH265Pps, O>> {
        self.pps.sets.get(&id)
    }

    /// Number of real changes seen so far for parameter sets of kind `kind`.
    pub fn update_sequence_count(&self, kind: ParameterSetKind) -> u32 {
        match kind {
            ParameterSetKind::Vps => self.vps.update_sequence_count,
            ParameterSetKind::Sps => self.sps.update_sequence_count,
            ParameterSetKind::Pps => self.pps.update_sequence_count,
        }
    }
}

fn hrd_equivalent(a: &HrdParams, b: &HrdParams) -> bool {
    fields_eq!(
        a,
        b,
        nal_hrd_parameters_present_flag,
        vcl_hrd_parameters_present_flag,
        sub_pic_hrd_params_present_flag,
        bit_rate_scale,
        cpb_size_scale,
        initial_cpb_removal_delay_length_minus1,
        au_cpb_removal_delay_length_minus1,
        dpb_output_delay_length_minus1,
        fixed_pic_rate_general_flag,
        fixed_pic_rate_within_cvs_flag,
        elemental_duration_in_tc_minus1,
        low_delay_hrd_flag,
        cpb_cnt_minus1,
    ) && (!a.sub_pic_hrd_params_present_flag
        || fields_eq!(
            a,
            b,
            tick_divisor_minus2,
            du_cpb_removal_delay_increment_length_minus1,
            sub_pic_cpb_params_in_pic_timing_sei_flag,
            dpb_output_delay_du_length_minus1,
            cpb_size_du_scale,
        ))
        && (!a.nal_hrd_parameters_present_flag || a.nal_hrd == b.nal_hrd)
        && (!a.vcl_hrd_parameters_present_flag || a.vcl_hrd == b.vcl_hrd)
}

fn vui_equivalent(a: &VuiParams, b: &VuiParams) -> bool {
    fields_eq!(
        a,
        b,
        aspect_ratio_info_present_flag,
        overscan_info_present_flag,
        video_signal_type_present_flag,
        chroma_loc_info_present_flag,
        neutral_chroma_indication_flag,
        field_seq_flag,
        frame_field_info_present_flag,
        default_display_window_flag,
        timing_info_present_flag,
        bitstream_restriction_flag,
    ) && (!a.aspect_ratio_info_present_flag
        || fields_eq!(a, b, aspect_ratio_idc, sar_width, sar_height))
        && (!a.overscan_info_present_flag || a.overscan_appropriate_flag == b.overscan_appropriate_flag)
        && (!a.video_signal_type_present_flag
            || fields_eq!(
                a,
                b,
                video_format,
                video_full_range_flag,
                colour_description_present_flag,
                colour_primaries,
                transfer_characteristics,
                matrix_coeffs,
            ))
        && (!a.chroma_loc_info_present_flag
            || fields_eq!(
                a,
                b,
                chroma_sample_loc_type_top_field,
                chroma_sample_loc_type_bottom_field,
            ))
        && (!a.default_display_window_flag
            || fields_eq!(
                a,
                b,
                def_disp_win_left_offset,
                def_disp_win_right_offset,
                def_disp_win_top_offset,
                def_disp_win_bottom_offset,
            ))
        && (!a.timing_info_present_flag
            || (fields_eq!(
                a,
                b,
                num_units_in_tick,
                time_scale,
                poc_proportional_to_timing_flag,
                num_ticks_poc_diff_one_minus1,
                hrd_parameters_present_flag,
            ) && (!a.hrd_parameters_present_flag || hrd_equivalent(&a.hrd, &b.hrd))))
        && (!a.bitstream_restriction_flag
            || fields_eq!(
                a,
                b,
                tiles_fixed_structure_flag,
                motion_vectors_over_pic_boundaries_flag,
                restricted_ref_pic_lists_flag,
                min_spatial_segmentation_idc,
                max_bytes_per_pic_denom,
                max_bits_per_min_cu_denom,
                log2_max_mv_length_horizontal,
                log2_max_mv_length_vertical,
            ))
}

fn sps_scc_equivalent(a: &SpsSccExtension, b: &SpsSccExtension) -> bool {
    fields_eq!(
        a,
        b,
        curr_pic_ref_enabled_flag,
        palette_mode_enabled_flag,
        motion_vector_resolution_control_idc,
        intra_boundary_filtering_disabled_flag,
    ) && (!a.palette_mode_enabled_flag
        || fields_eq!(
            a,
            b,
            palette_max_size,
            delta_palette_max_predictor_size,
            palette_predictor_initializers_present_flag,
        ))
        && (!a.palette_predictor_initializers_present_flag
            || fields_eq!(
                a,
                b,
                num_palette_predictor_initializer_minus1,
                palette_predictor_initializer,
            ))
}

/// Whether `a` and `b` describe the same decoding process.
pub(crate) fn sps_equivalent(a: &Sps, b: &Sps) -> bool {
    let num_short_term_ref_pic_sets = usize::from(a.num_short_term_ref_pic_sets);

    fields_eq!(
        a,
        b,
        video_parameter_set_id,
        max_sub_layers_minus1,
        temporal_id_nesting_flag,
        profile_tier_level,
        seq_parameter_set_id,
        chroma_format_idc,
        separate_colour_plane_flag,
        pic_width_in_luma_samples,
        pic_height_in_luma_samples,
        conformance_window_flag,
        bit_depth_luma_minus8,
        bit_depth_chroma_minus8,
        log2_max_pic_order_cnt_lsb_minus4,
        sub_layer_ordering_info_present_flag,
        max_dec_pic_buffering_minus1,
        max_num_reorder_pics,
        max_latency_increase_plus1,
        log2_min_luma_coding_block_size_minus3,
        log2_diff_max_min_luma_coding_block_size,
        log2_min_luma_transform_block_size_minus2,
        log2_diff_max_min_luma_transform_block_size,
        max_transform_hierarchy_depth_inter,
        max_transform_hierarchy_depth_intra,
        scaling_list_enabled_flag,
        scaling_list_data_present_flag,
        amp_enabled_flag,
        sample_adaptive_offset_enabled_flag,
        pcm_enabled_flag,
        num_short_term_ref_pic_sets,
        long_term_ref_pics_present_flag,
        temporal_mvp_enabled_flag,
        strong_intra_smoothing_enabled_flag,
        vui_parameters_present_flag,
        extension_present_flag,
        range_extension_flag,
        multilayer_extension_flag,
        three_d_extension_flag,
        scc_extension_flag,
        extension_4bits,
    ) && (!a.conformance_window_flag
        || fields_eq!(
            a,
            b,
            conf_win_left_offset,
            conf_win_right_offset,
            conf_win_top_offset,
            conf_win_bottom_offset,
        ))
        && (!(a.scaling_list_enabled_flag && a.scaling_list_data_present_flag)
            || a.scaling_list == b.scaling_list)
        && (!a.pcm_enabled_flag
            || fields_eq!(
                a,
                b,
                pcm_sample_bit_depth_luma_minus1,
                pcm_sample_bit_depth_chroma_minus1,
                log2_min_pcm_luma_coding_block_size_minus3,
                log2_diff_max_min_pcm_luma_coding_block_size,
                pcm_loop_filter_disabled_flag,
            ))
        && a.short_term_ref_pic_set
            .iter()
            .take(num_short_term_ref_pic_sets)
            .eq(b.short_term_ref_pic_set.iter().take(num_short_term_ref_pic_sets))
        && (!a.long_term_ref_pics_present_flag
            || fields_eq!(
                a,
                b,
                num_long_term_ref_pics_sps,
                lt_ref_pic_poc_lsb_sps,
                used_by_curr_pic_lt_sps_flag,
            ))
        && (!a.vui_parameters_present_flag || vui_equivalent(&a.vui_parameters, &b.vui_parameters))
        && (!a.range_extension_flag || a.range_extension == b.range_extension)
        && (!a.scc_extension_flag || sps_scc_equivalent(&a.scc_extension, &b.scc_extension))
}

/// Whether `a` and `b` describe the same decoding process.
pub(crate) fn pps_equivalent(a: &Pps, b: &Pps) -> bool {
    fields_eq!(
        a,
        b,
        pic_parameter_set_id,
        seq_parameter_set_id,
        dependent_slice_segments_enabled_flag,
        output_flag_present_flag,
        num_extra_slice_header_bits,
        sign_data_hiding_enabled_flag,
        cabac_init_present_flag,
        num_ref_idx_l0_default_active_minus1,
        num_ref_idx_l1_default_active_minus1,
        init_qp_minus26,
        constrained_intra_pred_flag,
        transform_skip_enabled_flag,
        cu_qp_delta_enabled_flag,
        cb_qp_offset,
        cr_qp_offset,
        slice_chroma_qp_offsets_present_flag,
        weighted_pred_flag,
        weighted_bipred_flag,
        transquant_bypass_enabled_flag,
        tiles_enabled_flag,
        entropy_coding_sync_enabled_flag,
        loop_filter_across_slices_enabled_flag,
        deblocking_filter_control_present_flag,
        scaling_list_data_present_flag,
        lists_modification_present_flag,
        log2_parallel_merge_level_minus2,
        slice_segment_header_extension_present_flag,
        extension_present_flag,
        range_extension_flag,
        multilayer_extension_flag,
        three_d_extension_flag,
        scc_extension_flag,
        extension_4bits,
        pic_width_in_ctbs_y,
        pic_height_in_ctbs_y,
    ) && (!a.cu_qp_delta_enabled_flag || a.diff_cu_qp_delta_depth == b.diff_cu_qp_delta_depth)
        && (!a.tiles_enabled_flag
            || (fields_eq!(
                a,
                b,
                num_tile_columns_minus1,
                num_tile_rows_minus1,
                uniform_spacing_flag,
                loop_filter_across_tiles_enabled_flag,
            ) && (a.uniform_spacing_flag
                || fields_eq!(a, b, column_width_minus1, row_height_minus1))))
        && (!a.deblocking_filter_control_present_flag
            || (fields_eq!(
                a,
                b,
                deblocking_filter_override_enabled_flag,
                deblocking_filter_disabled_flag,
            ) && (a.deblocking_filter_disabled_flag
                || fields_eq!(a, b, beta_offset_div2, tc_offset_div2))))
        && (!a.scaling_list_data_present_flag || a.scaling_list == b.scaling_list)
        && (!a.range_extension_flag || a.range_extension == b.range_extension)
        && (!a.scc_extension_flag || a.scc_extension == b.scc_extension)
}

/// Whether `a` and `b` describe the same decoding process.
pub(crate) fn vps_equivalent(a: &Vps, b: &Vps) -> bool {
    fields_eq!(
        a,
        b,
        video_parameter_set_id,
        base_layer_internal_flag,
        base_layer_available_flag,
        max_layers_minus1,
        max_sub_layers_minus1,
        temporal_id_nesting_flag,
        profile_tier_level,
        sub_layer_ordering_info_present_flag,
        max_dec_pic_buffering_minus1,
        max_num_reorder_pics,
        max_latency_increase_plus1,
        max_layer_id,
        num_layer_sets_minus1,
        timing_info_present_flag,
        extension_flag,
    ) && (!a.timing_info_present_flag
        || (fields_eq!(
            a,
            b,
            num_units_in_tick,
            time_scale,
            poc_proportional_to_timing_flag,
            num_hrd_parameters,
            hrd_layer_set_idx,
            cprms_present_flag,
        ) && (!a.poc_proportional_to_timing_flag
            || a.num_ticks_poc_diff_one_minus1 == b.num_ticks_poc_diff_one_minus1)
            && a.hrd_parameters.len() == b.hrd_parameters.len()
            && a
                .hrd_parameters
                .iter()
                .zip(&b.hrd_parameters)
                .all(|(a, b)| hrd_equivalent(a, b))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::h265::dummy::pps_fixture;
    use crate::decoder::h265::dummy::sps_fixture;
    use crate::decoder::h265::dummy::vps_fixture;
    use crate::decoder::h265::dummy::ClientCall;
    use crate::decoder::h265::dummy::DummyClient;
    use crate::decoder::h265::dummy::DummyObject;

    #[test]
    fn identical_sps_is_discarded() {
        let mut cache = ParameterSetCache::default();
        let mut client = DummyClient::default();
        let sps = sps_fixture();

        assert_eq!(
            cache.update(ParameterSet::Sps(&sps), Some(&mut client)).unwrap(),
            UpdateOutcome::Changed {
                update_sequence_count: 1
            }
        );
        assert_eq!(
            cache
                .update(ParameterSet::Sps(&sps.clone()), Some(&mut client))
                .unwrap(),
            UpdateOutcome::Unchanged
        );

        assert_eq!(cache.update_sequence_count(ParameterSetKind::Sps), 1);
        assert_eq!(client.parameter_updates(), vec![(ParameterSetKind::Sps, 1)]);
    }

    #[test]
    fn counters_increase_by_one_per_change() {
        let mut cache = ParameterSetCache::default();
        let mut client = DummyClient::default();
        let mut sps = sps_fixture();

        for expected in 1..=4 {
            sps.log2_max_pic_order_cnt_lsb_minus4 = expected as u8;
            assert_eq!(
                cache.update(ParameterSet::Sps(&sps), Some(&mut client)).unwrap(),
                UpdateOutcome::Changed {
                    update_sequence_count: expected
                }
            );
        }

        // Counters are kept per kind.
        let pps = pps_fixture();
        assert_eq!(
            cache.update(ParameterSet::Pps(&pps), Some(&mut client)).unwrap(),
            UpdateOutcome::Changed {
                update_sequence_count: 1
            }
        );
        assert_eq!(
            client.parameter_updates(),
            vec![
                (ParameterSetKind::Sps, 1),
                (ParameterSetKind::Sps, 2),
                (ParameterSetKind::Sps, 3),
                (ParameterSetKind::Sps, 4),
                (ParameterSetKind::Pps, 1),
            ]
        );
    }

    #[test]
    fn vps_updates_are_never_pushed() {
        let mut cache = ParameterSetCache::default();
        let mut client = DummyClient::default();
        let mut vps = vps_fixture();

        assert_eq!(
            cache.update(ParameterSet::Vps(&vps), Some(&mut client)).unwrap(),
            UpdateOutcome::Suppressed
        );
        assert_eq!(
            cache.update(ParameterSet::Vps(&vps), Some(&mut client)).unwrap(),
            UpdateOutcome::Unchanged
        );

        vps.max_sub_layers_minus1 = 3;
        vps.timing_info_present_flag = true;
        vps.time_scale = 90000;
        assert_eq!(
            cache.update(ParameterSet::Vps(&vps), Some(&mut client)).unwrap(),
            UpdateOutcome::Suppressed
        );

        assert!(client.calls().is_empty());
        assert_eq!(cache.update_sequence_count(ParameterSetKind::Vps), 0);

        // The latest version is still available to the pictures.
        let cached = cache.vps(vps.video_parameter_set_id).unwrap();
        assert_eq!(cached.record().vps_time_scale, 90000);
        assert!(cached.client_object().is_none());
    }

    #[test]
    fn inline_mode_counts_without_pushing() {
        let mut cache = ParameterSetCache::<DummyObject>::default();
        let sps = sps_fixture();

        assert_eq!(
            cache.update::<DummyClient>(ParameterSet::Sps(&sps), None).unwrap(),
            UpdateOutcome::Changed {
                update_sequence_count: 1
            }
        );
        let cached = cache.sps(sps.seq_parameter_set_id).unwrap();
        assert_eq!(cached.record().pic_width_in_luma_samples, 64);
        assert!(cached.client_object().is_none());
    }

    #[test]
    fn rejected_push_is_not_committed() {
        let mut cache = ParameterSetCache::default();
        let mut client = DummyClient::default();
        let sps = sps_fixture();

        client.fail_parameter_updates = true;
        let err = cache
            .update(ParameterSet::Sps(&sps), Some(&mut client))
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ParameterUpdateRejected {
                kind: ParameterSetKind::Sps,
                ..
            }
        ));
        assert!(cache.sps(sps.seq_parameter_set_id).is_none());
        assert_eq!(cache.update_sequence_count(ParameterSetKind::Sps), 0);

        // The same set is a change on the next attempt.
        client.fail_parameter_updates = false;
        assert_eq!(
            cache.update(ParameterSet::Sps(&sps), Some(&mut client)).unwrap(),
            UpdateOutcome::Changed {
                update_sequence_count: 1
            }
        );
    }

    #[test]
    fn client_object_is_handed_back() {
        let mut cache = ParameterSetCache::default();
        let mut client = DummyClient::default();
        let mut pps = pps_fixture();

        cache
            .update(ParameterSet::Pps(&pps), Some(&mut client))
            .unwrap();
        let first = cache.pps(pps.pic_parameter_set_id).unwrap().client_object().cloned();
        assert_eq!(first, Some(DummyObject(1)));

        pps.init_qp_minus26 = 3;
        cache
            .update(ParameterSet::Pps(&pps), Some(&mut client))
            .unwrap();
        // The client saw the previous object and replaced it.
        assert_eq!(
            client.calls().last(),
            Some(&ClientCall::UpdatePictureParameters {
                kind: ParameterSetKind::Pps,
                previous_object: Some(DummyObject(1)),
                update_sequence_count: 2,
            })
        );
        assert_eq!(
            cache.pps(pps.pic_parameter_set_id).unwrap().client_object(),
            Some(&DummyObject(2))
        );
    }

    #[test]
    fn pps_record_takes_vps_id_from_cached_sps() {
        let mut cache = ParameterSetCache::<DummyObject>::default();
        let sps = sps_fixture();
        let pps = pps_fixture();

        cache.update::<DummyClient>(ParameterSet::Sps(&sps), None).unwrap();
        cache.update::<DummyClient>(ParameterSet::Pps(&pps), None).unwrap();

        let record = cache.pps(pps.pic_parameter_set_id).unwrap().record();
        assert_eq!(
            record.sps_video_parameter_set_id,
            sps.video_parameter_set_id
        );
    }

    #[test]
    fn fields_outside_their_presence_flag_are_ignored() {
        let sps = sps_fixture();

        let mut other = sps.clone();
        other.conformance_window_flag = false;
        let mut cropped = other.clone();
        cropped.conf_win_left_offset = 8;
        assert!(sps_equivalent(&other, &cropped));

        cropped.conformance_window_flag = true;
        assert!(!sps_equivalent(&other, &cropped));

        let mut other = sps.clone();
        other.vui_parameters.colour_primaries = 9;
        assert_eq!(
            sps_equivalent(&sps, &other),
            !sps.vui_parameters_present_flag
        );

        let mut other = sps.clone();
        other.range_extension.implicit_rdpcm_enabled_flag = true;
        assert!(sps_equivalent(&sps, &other));

        let pps = pps_fixture();
        let mut other = pps.clone();
        other.column_width_minus1[0] = 5;
        assert!(pps_equivalent(&pps, &other));

        other.tiles_enabled_flag = true;
        assert!(!pps_equivalent(&pps, &other));

        // The CTB dimensions follow the SPS.
        let mut other = pps.clone();
        other.pic_width_in_ctbs_y += 1;
        assert!(!pps_equivalent(&pps, &other));
    }

    #[test]
    fn parameter_set_ids() {
        let sps = sps_fixture();
        let set = ParameterSet::Sps(&sps);
        assert_eq!(set.kind(), ParameterSetKind::Sps);
        assert_eq!(set.id(), sps.seq_parameter_set_id);

        let vps = vps_fixture();
        assert_eq!(ParameterSet::Vps(&vps).id(), vps.video_parameter_set_id);
    }
}
