// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::anyhow;

use crate::codec::h265::parser::MAX_DELTA_POCS;
use crate::codec::h265::picture::PictureData;
use crate::codec::h265::picture::Reference;

// Shortcut to refer to a DPB entry.
//
// The first member of the tuple is the `PictureData` for the frame.
//
// The second member is the decoder handle of the frame.
#[derive(Clone, Debug)]
pub struct DpbEntry<T>(pub Rc<RefCell<PictureData>>, pub T);

/// Snapshot of the decoded picture buffer maintained by the parser.
pub struct Dpb<T> {
    /// List of `PictureData` and decoder handles to decoded pictures, in
    /// storage order.
    entries: Vec<DpbEntry<T>>,
    /// The maximum number of pictures that can be stored.
    max_num_pics: usize,
}

impl<T: Clone> Dpb<T> {
    /// Returns the length of the DPB.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a reference to the whole DPB entries.
    pub fn entries(&self) -> &Vec<DpbEntry<T>> {
        &self.entries
    }

    /// Set the dpb's max num pics.
    pub fn set_max_num_pics(&mut self, max_num_pics: usize) {
        self.max_num_pics = max_num_pics;
    }

    /// Get a reference to the dpb's max num pics.
    pub fn max_num_pics(&self) -> usize {
        self.max_num_pics
    }

    /// Mark all pictures in the DPB as unused for reference.
    pub fn mark_all_as_unused_for_ref(&mut self) {
        for entry in &self.entries {
            entry.0.borrow_mut().set_reference(Reference::None);
        }
    }

    /// Store a picture and its decoder handle in the DPB.
    pub fn store_picture(
        &mut self,
        picture: Rc<RefCell<PictureData>>,
        handle: T,
    ) -> anyhow::Result<()> {
        if self.entries.len() >= self.max_num_pics {
            return Err(anyhow!("Can't add a picture to the DPB: DPB is full."));
        }

        log::debug!(
            "Stored picture POC {:?}, the DPB length is {:?}",
            picture.borrow().pic_order_cnt_val,
            self.entries.len()
        );

        self.entries.push(DpbEntry(picture, handle));

        Ok(())
    }

    /// Removes all pictures which are marked as "unused for reference".
    pub fn remove_unused(&mut self) {
        log::debug!("Removing unused pictures from DPB.");
        self.entries.retain(|e| e.0.borrow().is_ref())
    }

    /// Clears the DPB, dropping all the pictures.
    pub fn clear(&mut self) {
        log::debug!("Clearing the DPB");
        self.entries.clear();
    }

    /// Returns all the references in the DPB, in storage order.
    pub fn get_all_references(&self) -> Vec<DpbEntry<T>> {
        self.entries
            .iter()
            .filter(|e| e.0.borrow().is_ref())
            .cloned()
            .collect()
    }
}

impl<T: Clone> Default for Dpb<T> {
    fn default() -> Self {
        // See https://github.com/rust-lang/rust/issues/26925 on why this can't
        // be derived.
        Self {
            entries: Default::default(),
            max_num_pics: Default::default(),
        }
    }
}

impl<T: Clone> std::fmt::Debug for Dpb<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pics = self
            .entries
            .iter()
            .map(|h| &h.0)
            .enumerate()
            .collect::<Vec<_>>();
        f.debug_struct("Dpb")
            .field("pictures", &pics)
            .field("max_num_pics", &self.max_num_pics)
            .finish()
    }
}

/// The reference picture set of the current picture, as derived by the parser
/// in 8.3.2.
///
/// Each list holds `num_poc_*` entries. An entry is `None` when the picture
/// it designates is missing from the DPB ("no reference picture").
pub struct RefPicSet<T> {
    pub st_curr_before: [Option<DpbEntry<T>>; MAX_DELTA_POCS],
    pub st_curr_after: [Option<DpbEntry<T>>; MAX_DELTA_POCS],
    pub lt_curr: [Option<DpbEntry<T>>; MAX_DELTA_POCS],
    /// NumPocStCurrBefore.
    pub num_poc_st_curr_before: usize,
    /// NumPocStCurrAfter.
    pub num_poc_st_curr_after: usize,
    /// NumPocLtCurr.
    pub num_poc_lt_curr: usize,
}

impl<T> RefPicSet<T> {
    /// The `StCurrBefore` list, truncated to its count.
    pub fn st_curr_before(&self) -> &[Option<DpbEntry<T>>] {
        &self.st_curr_before[..self.num_poc_st_curr_before.min(MAX_DELTA_POCS)]
    }

    /// The `StCurrAfter` list, truncated to its count.
    pub fn st_curr_after(&self) -> &[Option<DpbEntry<T>>] {
        &self.st_curr_after[..self.num_poc_st_curr_after.min(MAX_DELTA_POCS)]
    }

    /// The `LtCurr` list, truncated to its count.
    pub fn lt_curr(&self) -> &[Option<DpbEntry<T>>] {
        &self.lt_curr[..self.num_poc_lt_curr.min(MAX_DELTA_POCS)]
    }
}

impl<T> Default for RefPicSet<T> {
    fn default() -> Self {
        Self {
            st_curr_before: Default::default(),
            st_curr_after: Default::default(),
            lt_curr: Default::default(),
            num_poc_st_curr_before: 0,
            num_poc_st_curr_after: 0,
            num_poc_lt_curr: 0,
        }
    }
}
