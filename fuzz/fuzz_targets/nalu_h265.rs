#![no_main]

use cros_vkparser::codec::h265::parser::NaluHeader;
use cros_vkparser::utils::nalu::NaluIterator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for nalu in NaluIterator::<_, NaluHeader>::new(data) {
        let _ = nalu.header().type_.is_irap();
        let _ = nalu.as_ref().len();
    }
});
