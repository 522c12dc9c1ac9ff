#![no_main]

use cros_vkparser::codec::h265::dpb::Dpb;
use cros_vkparser::codec::h265::dpb::RefPicSet;
use cros_vkparser::codec::h265::parser::NaluHeader;
use cros_vkparser::codec::h265::parser::Pps;
use cros_vkparser::codec::h265::parser::Slice;
use cros_vkparser::codec::h265::parser::Sps;
use cros_vkparser::codec::h265::parser::Vps;
use cros_vkparser::codec::h265::picture::PictureData;
use cros_vkparser::decoder::client::PictureDataRecord;
use cros_vkparser::decoder::client::PictureParameters;
use cros_vkparser::decoder::client::SequenceInfo;
use cros_vkparser::decoder::client::VideoDecodeClient;
use cros_vkparser::decoder::h265::H265Decoder;
use cros_vkparser::decoder::ClientResult;
use cros_vkparser::decoder::PictureHandle;
use cros_vkparser::utils::nalu::NaluIterator;
use libfuzzer_sys::fuzz_target;

/// Client accepting everything.
struct NullClient;

impl VideoDecodeClient for NullClient {
    type Picture = ();
    type ParameterObject = ();

    fn begin_sequence(&mut self, info: &SequenceInfo) -> ClientResult<u32> {
        Ok(info.min_num_decode_surfaces)
    }

    fn alloc_picture_buffer(&mut self) -> ClientResult<()> {
        Ok(())
    }

    fn update_picture_parameters(
        &mut self,
        _: &PictureParameters,
        _: &mut Option<()>,
        _: u32,
    ) -> ClientResult<()> {
        Ok(())
    }

    fn decode_picture(&mut self, picture: &PictureDataRecord<(), ()>) -> ClientResult<()> {
        assert_eq!(picture.slice_offsets.len(), picture.num_slices as usize + 1);
        assert_eq!(
            picture.slice_offsets.last().copied(),
            Some(picture.bitstream.len() as u32)
        );
        Ok(())
    }

    fn display_picture(&mut self, _: &PictureHandle<()>, _: i64) -> ClientResult<()> {
        Ok(())
    }

    fn unhandled_nalu(&mut self, _: &[u8]) -> ClientResult<()> {
        Ok(())
    }
}

// Every IRAP NAL unit starts a picture, the other VCL NAL units are its slices.
fuzz_target!(|data: &[u8]| {
    let mut decoder = H265Decoder::new(NullClient, Default::default());
    let (vps, sps, pps) = (Vps::default(), Sps::default(), Pps::default());
    let dpb = Dpb::default();
    let rps = RefPicSet::default();
    let mut in_picture = false;

    for nalu in NaluIterator::<_, NaluHeader>::new(data) {
        let nalu_type = nalu.header().type_;
        if !nalu_type.is_vcl() {
            decoder.unhandled_nalu(nalu.as_ref());
            continue;
        }

        let slice = Slice {
            header: Default::default(),
            nalu,
        };

        if nalu_type.is_irap() {
            if in_picture {
                let _ = decoder.end_picture();
            }

            let picture = PictureData::new_from_slice(&slice, 0);
            in_picture = decoder.new_picture(&picture).is_ok()
                && decoder
                    .start_picture(&picture, &slice, &vps, &sps, &pps, &dpb, &rps)
                    .is_ok();
        }

        if in_picture {
            let _ = decoder.decode_slice(&slice);
        }
    }

    if in_picture {
        let _ = decoder.end_picture();
    }
});
