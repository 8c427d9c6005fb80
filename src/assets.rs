//! File-backed collaborators: frame acquisition, overlay fetch and the output sink.

pub mod decode;
pub mod overlay;

pub use decode::{decode_image, encode_image, load_frame, save_frame};
pub use overlay::{FileOverlayFetcher, InMemoryOverlays, OverlayFetcher};
