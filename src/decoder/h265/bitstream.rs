// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use anyhow::anyhow;
use anyhow::Context;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::utils::nalu::START_CODE_PREFIX;

/// Accumulates the slice NAL units of a picture into one contiguous buffer.
///
/// Every slice is preceded by a three byte start code. `offsets` always holds one more entry than
/// there are slices: the offset of each slice followed by the total length of the buffer.
#[derive(Debug)]
pub(crate) struct SliceAggregator {
    data: BytesMut,
    offsets: Vec<u32>,
}

impl Default for SliceAggregator {
    fn default() -> Self {
        Self {
            data: BytesMut::new(),
            offsets: vec![0],
        }
    }
}

impl SliceAggregator {
    /// Appends the NAL unit `nalu` to the picture's bitstream.
    pub(crate) fn push_slice(&mut self, nalu: &[u8]) -> anyhow::Result<()> {
        let end = self
            .data
            .len()
            .checked_add(START_CODE_PREFIX.len() + nalu.len())
            .ok_or(anyhow!("picture bitstream size overflow"))?;
        let end = u32::try_from(end).context("picture bitstream larger than 4GiB")?;

        self.data.reserve(START_CODE_PREFIX.len() + nalu.len());
        self.data.put_slice(&START_CODE_PREFIX);
        self.data.put_slice(nalu);
        self.offsets.push(end);

        Ok(())
    }

    pub(crate) fn num_slices(&self) -> usize {
        self.offsets.len() - 1
    }

    pub(crate) fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Hands over the assembled buffer and its offset table.
    pub(crate) fn finish(self) -> (Bytes, Vec<u32>) {
        (self.data.freeze(), self.offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_picture() {
        let aggregator = SliceAggregator::default();
        assert_eq!(aggregator.num_slices(), 0);
        assert_eq!(aggregator.offsets(), &[0]);

        let (data, offsets) = aggregator.finish();
        assert!(data.is_empty());
        assert_eq!(offsets, vec![0]);
    }

    #[test]
    fn two_slices() {
        let mut aggregator = SliceAggregator::default();
        aggregator.push_slice(&[0xaa; 100]).unwrap();
        aggregator.push_slice(&[0xbb; 50]).unwrap();

        assert_eq!(aggregator.num_slices(), 2);
        assert_eq!(aggregator.len(), 156);

        let (data, offsets) = aggregator.finish();
        assert_eq!(data.len(), 156);
        assert_eq!(offsets, vec![0, 103, 156]);

        assert_eq!(&data[0..3], &START_CODE_PREFIX);
        assert_eq!(data[3], 0xaa);
        assert_eq!(&data[103..106], &START_CODE_PREFIX);
        assert_eq!(data[106], 0xbb);
    }

    #[test]
    fn offsets_strictly_increase() {
        let mut aggregator = SliceAggregator::default();
        for size in [1, 7, 0, 300] {
            aggregator.push_slice(&vec![0x01; size]).unwrap();
        }

        let offsets = aggregator.offsets();
        assert_eq!(offsets.len(), aggregator.num_slices() + 1);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }
}
