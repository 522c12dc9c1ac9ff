// Copyright 2022 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Driving a Vulkan Video style decode client from a parsed stream.
//!
//! The [`client::VideoDecodeClient`] trait is the narrow interface to the hardware decode
//! backend. [`h265::H265Decoder`] is called back by the bitstream parser for every stage of a
//! picture's life and forwards the resulting records to the client.

pub mod client;
pub mod h265;

use std::rc::Rc;

use thiserror::Error;

use crate::decoder::client::ParameterSetKind;

/// Handle to a picture buffer allocated by the client.
///
/// The buffer is given back to the client when its last handle is dropped, i.e. once neither the
/// in-flight picture context nor the parser's DPB refer to it anymore.
pub type PictureHandle<P> = Rc<P>;

/// Error returned by the decode client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("the client rejected the request: {0}")]
    Rejected(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type returned by decode client methods.
pub type ClientResult<T> = Result<T, ClientError>;

/// Error returned by the lifecycle methods of the decoder.
///
/// Every error only affects the picture or parameter set it was returned for. Whether the stream
/// goes on is up to the caller.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to allocate a picture buffer")]
    AllocationFailed(#[source] ClientError),
    #[error("{count} reference pictures in the DPB, at most {capacity} are supported")]
    TooManyReferences { count: usize, capacity: usize },
    #[error("failed to submit the picture for decoding")]
    SubmissionFailed(#[source] ClientError),
    #[error("failed to display the picture")]
    DisplayFailed(#[source] ClientError),
    #[error("the client rejected the {kind} update")]
    ParameterUpdateRejected {
        kind: ParameterSetKind,
        #[source]
        source: ClientError,
    },
    #[error("the client rejected the new sequence")]
    SequenceRejected(#[source] ClientError),
    #[error("no picture is being decoded")]
    NoCurrentPicture,
    #[error("the previous picture has not been ended yet")]
    PictureInProgress,
    #[error("the current picture has not been started yet")]
    PictureNotStarted,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Construction-time settings of a decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Push parameter sets to the client once, through `update_picture_parameters`, and refer to
    /// them from the pictures. When unset, every picture embeds its own parameter set records.
    pub oob_pic_params: bool,
}

/// Format of the stream as negotiated with the upstream element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputFormat {
    pub fps_n: u32,
    pub fps_d: u32,
    /// Pixel aspect ratio numerator.
    pub par_n: u32,
    /// Pixel aspect ratio denominator.
    pub par_d: u32,
    /// Profile name, e.g. "main" or "scalable-main".
    pub profile: Option<String>,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            fps_n: 0,
            fps_d: 1,
            par_n: 1,
            par_d: 1,
            profile: None,
        }
    }
}

impl InputFormat {
    /// Whether the stream uses one of the scalable profiles.
    pub fn is_svc(&self) -> bool {
        self.profile
            .as_deref()
            .is_some_and(|profile| profile.starts_with("scalable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svc_from_profile() {
        let mut format = InputFormat::default();
        assert!(!format.is_svc());

        format.profile = Some("main-10".into());
        assert!(!format.is_svc());

        format.profile = Some("scalable-main".into());
        assert!(format.is_svc());
    }

    #[test]
    fn error_messages() {
        let err = DecodeError::TooManyReferences {
            count: 17,
            capacity: 16,
        };
        assert_eq!(
            err.to_string(),
            "17 reference pictures in the DPB, at most 16 are supported"
        );

        let err = DecodeError::ParameterUpdateRejected {
            kind: ParameterSetKind::Sps,
            source: ClientError::Rejected("no memory"),
        };
        assert_eq!(err.to_string(), "the client rejected the SPS update");
    }
}
