// ============================================================
// Layer 3: Image Domain Types
// ============================================================
// ImageSource: where the bytes of one prediction request came from.
// ImageTensor: the normalised pixel block handed to the model.
//
// A request carries its image in exactly one of two shapes:
//   - a multipart form field named "image" (raw encoded bytes)
//   - a JSON body {"image": "<base64>"} (optionally a data URI)
//
// The HTTP layer resolves which one it got once, at the boundary,
// and everything downstream works with this enum.

/// The raw input of a prediction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Bytes uploaded as a multipart file. `filename` is whatever the
    /// client put in the Content-Disposition header, if anything.
    Multipart {
        filename: Option<String>,
        bytes:    Vec<u8>,
    },

    /// A base64 string, possibly prefixed with `data:image/...;base64,`.
    Base64(String),
}

impl ImageSource {
    /// Short name for logs, never the payload itself.
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Multipart { .. } => "multipart",
            ImageSource::Base64(_)        => "base64",
        }
    }
}

/// A single preprocessed image, shape [1, 3, height, width].
///
/// Values are channel-first (all red, then all green, then all blue)
/// and scaled into [0, 1]. The leading 1 is the batch dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub data:   Vec<f32>,
    pub height: usize,
    pub width:  usize,
}

impl ImageTensor {
    pub const CHANNELS: usize = 3;

    pub fn shape(&self) -> [usize; 4] {
        [1, Self::CHANNELS, self.height, self.width]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}
