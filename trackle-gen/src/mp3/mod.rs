//! MP3 container handling without a decoder
//!
//! The snippet pipeline never decodes audio. It only needs to know where
//! frames start and how long each one lasts, which the fixed 4-byte MPEG
//! frame header provides. Submodules:
//! - [`header`]: bit-level frame header parsing and the version/layer tables
//! - [`scanner`]: ID3v2 detection, three-tier first-frame location, frame walking
//! - [`slicer`]: frame-accurate byte slicing and snippet reassembly

pub mod header;
pub mod scanner;
pub mod slicer;

pub use header::{Bitrate, ChannelMode, FrameHeader, Layer, MpegVersion, SampleRate};
pub use scanner::{locate_first_frame, Frame, Frames, Id3v2Tag, Section, SCAN_WINDOW};
pub use slicer::{slice_snippet, SnippetSlice};

#[cfg(test)]
pub(crate) mod testutil {
    //! Synthetic MPEG1 Layer III streams for unit tests
    //!
    //! Header `FF FB 90 00`: MPEG1, Layer III, no CRC, 128 kbps, 44100 Hz,
    //! no padding, stereo. Frame length 417 bytes, 1152 samples per frame.

    pub const FRAME_LEN: usize = 417;
    pub const FRAME_SECS: f64 = 1152.0 / 44100.0;

    /// One complete frame, payload filled with `fill`
    pub fn build_frame(fill: u8) -> Vec<u8> {
        let mut frame = vec![fill; FRAME_LEN];
        frame[0] = 0xFF;
        frame[1] = 0xFB;
        frame[2] = 0x90;
        frame[3] = 0x00;
        frame
    }

    /// `count` back-to-back frames
    pub fn build_stream(count: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(count * FRAME_LEN);
        for i in 0..count {
            buf.extend_from_slice(&build_frame((i % 251) as u8));
        }
        buf
    }

    /// ID3v2.3 tag with a zero-filled body of `body_len` bytes
    pub fn build_id3(body_len: usize) -> Vec<u8> {
        let mut tag = vec![0u8; 10 + body_len];
        tag[0..3].copy_from_slice(b"ID3");
        tag[3] = 3; // v2.3
        tag[4] = 0;
        tag[5] = 0; // no footer
        // Syncsafe size: 7 bits per byte
        tag[6] = ((body_len >> 21) & 0x7F) as u8;
        tag[7] = ((body_len >> 14) & 0x7F) as u8;
        tag[8] = ((body_len >> 7) & 0x7F) as u8;
        tag[9] = (body_len & 0x7F) as u8;
        tag
    }
}
