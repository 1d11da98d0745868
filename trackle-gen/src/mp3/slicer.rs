//! Frame-accurate snippet slicing
//!
//! Frames are the atomic unit of the compressed stream; a frame cannot be
//! split without a decoder. The slicer therefore snaps the requested time
//! range outward to frame boundaries: the slice starts at the frame
//! straddling the target start time and ends at the end of the frame that
//! crosses the accumulated duration threshold.

use super::scanner::{locate_first_frame, stream_origin, Frames, Id3v2Tag};
use crate::error::{Error, Result};

/// A computed snippet slice with its reassembled bytes
#[derive(Debug, Clone)]
pub struct SnippetSlice {
    /// Absolute offset of the first sliced frame in the source buffer
    pub start_byte: usize,
    /// Absolute end offset (exclusive) of the slice in the source buffer
    pub end_byte: usize,
    /// Stream time at which the slice actually starts
    pub actual_start_secs: f64,
    /// Summed duration of the sliced frames
    pub actual_duration_secs: f64,
    /// Leading tag bytes (if any) followed by the sliced frame range
    pub bytes: Vec<u8>,
}

/// Cut a snippet of `duration_secs` starting at `start_secs`
///
/// Best-effort once frames are located: if the walk ends early (corrupt or
/// truncated stream) the end degrades to the buffer end instead of failing.
/// Degenerate bounds (`start >= end`, start past the buffer) are rejected
/// with `SliceBounds`.
pub fn slice_snippet(buf: &[u8], start_secs: f64, duration_secs: f64) -> Result<SnippetSlice> {
    let tag = Id3v2Tag::parse(buf);
    let origin = stream_origin(buf);
    let first = locate_first_frame(buf, origin)?;

    let mut frames = Frames::from(buf, first);

    // Walk to the frame straddling the target start time
    let mut elapsed = 0.0;
    let mut start_frame = None;
    for frame in frames.by_ref() {
        let duration = frame.duration_secs();
        if elapsed + duration > start_secs {
            start_frame = Some(frame);
            break;
        }
        elapsed += duration;
    }

    // No straddling frame means the target start lies past the walkable
    // stream; bounds validation below turns that into SliceBounds.
    let (start_byte, actual_start_secs) = match start_frame {
        Some(frame) => (frame.section.offset, elapsed),
        None => (buf.len(), elapsed),
    };

    // Accumulate frames until the requested duration is covered; degrade to
    // the buffer end when the walk terminates first.
    let mut accumulated = 0.0;
    let mut end_byte = buf.len();
    if let Some(frame) = start_frame {
        accumulated = frame.duration_secs();
        end_byte = frame.section.end();
        if accumulated < duration_secs {
            let mut reached = false;
            for frame in frames {
                accumulated += frame.duration_secs();
                end_byte = frame.section.end();
                if accumulated >= duration_secs {
                    reached = true;
                    break;
                }
            }
            if !reached {
                end_byte = buf.len();
            }
        }
    }

    if start_byte >= end_byte || start_byte >= buf.len() {
        return Err(Error::SliceBounds {
            start_byte,
            end_byte,
        });
    }

    // Reassemble: tag bytes verbatim, then the selected frame range
    let tag_len = tag.map(|t| t.section.end()).unwrap_or(0);
    let mut bytes = Vec::with_capacity(tag_len + (end_byte - start_byte));
    bytes.extend_from_slice(&buf[..tag_len]);
    bytes.extend_from_slice(&buf[start_byte..end_byte]);

    Ok(SnippetSlice {
        start_byte,
        end_byte,
        actual_start_secs,
        actual_duration_secs: accumulated,
        bytes,
    })
}
