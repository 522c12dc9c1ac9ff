// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Annex B byte stream splitting.

use std::fmt::Debug;
use std::io::Cursor;
use std::marker::PhantomData;

use anyhow::Context;
use bytes::Buf;

/// The three-byte start code prefix that precedes every NAL unit in an Annex B stream.
pub const START_CODE_PREFIX: [u8; 3] = [0x00, 0x00, 0x01];

pub trait Header: Sized {
    /// Parse the NALU header from the first bytes of `data`.
    fn parse(data: &[u8]) -> anyhow::Result<Self>;
    /// Whether this header type indicates EOS.
    fn is_end(&self) -> bool;
    /// The length of the header.
    fn len(&self) -> usize;
}

/// A NAL unit located inside a larger bitstream buffer.
#[derive(Clone, Debug)]
pub struct Nalu<T, U> {
    pub header: U,
    /// The mapping that backs this NALU. Possibly shared with the other NALUs
    /// in the Access Unit.
    data: T,

    /// Size of the NALU, header included, start code excluded.
    size: usize,
    /// Offset of the NALU header within `data`.
    offset: usize,
    /// Offset of the start code within `data`, including the optional zero_byte.
    sc_offset: usize,
}

fn find_start_code(data: &[u8]) -> Option<usize> {
    data.windows(START_CODE_PREFIX.len())
        .position(|window| window == START_CODE_PREFIX)
}

impl<T, U> Nalu<T, U>
where
    T: AsRef<[u8]> + Clone,
    U: Debug + Header,
{
    /// Find the next Annex B encoded NAL unit after the position of `cursor`.
    ///
    /// Returns `Ok(None)` once no start code is left in the stream. On success the cursor is
    /// moved to the end of the returned NALU.
    pub fn next(cursor: &mut Cursor<T>) -> anyhow::Result<Option<Self>> {
        let pos = usize::try_from(cursor.position())?;

        let Some(rel) = find_start_code(cursor.chunk()) else {
            cursor.advance(cursor.remaining());
            return Ok(None);
        };

        let data = cursor.get_ref().clone();
        let bytes = data.as_ref();

        let mut sc_offset = pos + rel;
        // A preceding zero means a four byte start code, i.e. zero_byte() followed by the
        // three byte prefix.
        if sc_offset > pos && bytes[sc_offset - 1] == 0x00 {
            sc_offset -= 1;
        }

        let offset = pos + rel + START_CODE_PREFIX.len();
        let header = U::parse(&bytes[offset..]).context("while parsing NALU header")?;

        let mut size = match find_start_code(&bytes[offset..]) {
            Some(next) => next,
            None => bytes.len() - offset,
        };

        // Discard trailing_zero_8bits.
        while size > header.len() && bytes[offset + size - 1] == 0x00 {
            size -= 1;
        }

        if header.is_end() {
            size = header.len();
        }

        cursor.set_position(u64::try_from(offset + size)?);

        Ok(Some(Nalu {
            header,
            data,
            size,
            offset,
            sc_offset,
        }))
    }
}

impl<T, U> Nalu<T, U> {
    /// Get a reference to the nalu's header.
    pub fn header(&self) -> &U {
        &self.header
    }

    /// Get a reference to the nalu's data.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Get a reference to the nalu's size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get a reference to the nalu's offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get a reference to the nalu's sc offset.
    pub fn sc_offset(&self) -> usize {
        self.sc_offset
    }
}

impl<T: AsRef<[u8]>, U> AsRef<[u8]> for Nalu<T, U> {
    fn as_ref(&self) -> &[u8] {
        let data = self.data.as_ref();
        &data[self.offset..self.offset + self.size]
    }
}

/// Iterator over the NAL units of an Annex B byte stream.
///
/// Iteration stops at the first NALU whose header cannot be parsed.
pub struct NaluIterator<T, U> {
    cursor: Cursor<T>,
    _header: PhantomData<U>,
}

impl<T, U> NaluIterator<T, U> {
    pub fn new(stream: T) -> Self {
        Self {
            cursor: Cursor::new(stream),
            _header: PhantomData,
        }
    }
}

impl<T, U> Iterator for NaluIterator<T, U>
where
    T: AsRef<[u8]> + Clone,
    U: Debug + Header,
{
    type Item = Nalu<T, U>;

    fn next(&mut self) -> Option<Self::Item> {
        match Nalu::next(&mut self.cursor) {
            Ok(nalu) => nalu,
            Err(e) => {
                log::debug!("stopping NALU iteration: {:#}", e);
                None
            }
        }
    }
}
