//! MP3 container scanning
//!
//! Locates the optional leading ID3v2 tag and the first trustworthy audio
//! frame, then walks frame boundaries. Three location tiers, tried in
//! order:
//!
//! 1. **Strict**: a frame parses at the origin and a second frame parses
//!    immediately after it (guards against false sync matches in tag
//!    payloads or junk bytes).
//! 2. **Permissive**: a frame parses at the origin.
//! 3. **Scan**: search forward through a bounded window for the two-byte
//!    sync pattern, permissive-parsing each candidate.
//!
//! When all tiers fail the scanned range is reported; the caller treats
//! that as terminal for the invocation.

use super::header::{self, FrameHeader, SampleRate, HEADER_LEN};
use crate::error::{Error, Result};

/// Forward scan window for tier 3, in bytes
pub const SCAN_WINDOW: usize = 8 * 1024;

/// ID3v2 tag header length
const ID3V2_HEADER_LEN: usize = 10;

/// Positional metadata for a parsed structure, absolute into the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub offset: usize,
    pub len: usize,
}

impl Section {
    /// First byte past this structure
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Leading ID3v2 metadata tag
///
/// Only ever parsed at offset 0; when present its end is the mandatory
/// origin for frame location, and its bytes are re-prepended verbatim to
/// snippet output so trimmed files keep their embedded metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id3v2Tag {
    pub section: Section,
    /// Major/revision version bytes (e.g. (3, 0) for ID3v2.3)
    pub version: (u8, u8),
    pub flags: u8,
}

impl Id3v2Tag {
    /// Parse a leading ID3v2 tag at the start of the buffer
    pub fn parse(buf: &[u8]) -> Option<Id3v2Tag> {
        if buf.len() < ID3V2_HEADER_LEN || &buf[0..3] != b"ID3" {
            return None;
        }

        // Size is syncsafe: 7 significant bits per byte, high bit must be 0
        let size_bytes = &buf[6..10];
        if size_bytes.iter().any(|b| b & 0x80 != 0) {
            return None;
        }
        let body_len = ((size_bytes[0] as usize) << 21)
            | ((size_bytes[1] as usize) << 14)
            | ((size_bytes[2] as usize) << 7)
            | (size_bytes[3] as usize);

        let flags = buf[5];
        // Footer flag adds a trailing 10-byte copy of the header
        let footer_len = if flags & 0x10 != 0 { ID3V2_HEADER_LEN } else { 0 };

        Some(Id3v2Tag {
            section: Section {
                offset: 0,
                len: ID3V2_HEADER_LEN + body_len + footer_len,
            },
            version: (buf[3], buf[4]),
            flags,
        })
    }
}

/// One located audio frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub header: FrameHeader,
    pub section: Section,
    pub sample_count: u32,
}

impl Frame {
    /// Permissive single-frame parse at an absolute offset
    ///
    /// Requires a derivable frame length: headers with free/bad bitrate or
    /// a reserved sample rate do not bound a frame and are rejected. The
    /// frame must fit entirely inside the buffer.
    pub fn read(buf: &[u8], offset: usize) -> Option<Frame> {
        if offset + HEADER_LEN > buf.len() {
            return None;
        }
        let header = FrameHeader::parse(&buf[offset..offset + HEADER_LEN])?;
        let len = header.frame_len()?;
        if offset + len > buf.len() {
            return None;
        }
        Some(Frame {
            header,
            section: Section { offset, len },
            sample_count: header.samples_per_frame(),
        })
    }

    /// Offset of the byte immediately following this frame
    pub fn next_offset(&self) -> usize {
        self.section.end()
    }

    /// Frame duration in seconds
    ///
    /// `sample_count / sample_rate` when the rate is known; otherwise the
    /// version-keyed samples-per-frame count over the 44100 Hz default.
    pub fn duration_secs(&self) -> f64 {
        match self.header.sample_rate {
            SampleRate::Hz(rate) => self.sample_count as f64 / rate as f64,
            SampleRate::Reserved => {
                header::default_samples(self.header.version) as f64
                    / header::DEFAULT_SAMPLE_RATE_HZ as f64
            }
        }
    }
}

/// Locate the first trustworthy frame at or after `origin`
///
/// `origin` must already account for a leading ID3v2 tag (see
/// [`stream_origin`]). Returns `FrameLocation` with the scanned byte range
/// when every tier fails.
pub fn locate_first_frame(buf: &[u8], origin: usize) -> Result<Frame> {
    // Tier 1: strict - a valid frame immediately followed by another
    if let Some(frame) = Frame::read(buf, origin) {
        if Frame::read(buf, frame.next_offset()).is_some() {
            return Ok(frame);
        }
    }

    // Tier 2: permissive - a valid frame at the origin is good enough
    if let Some(frame) = Frame::read(buf, origin) {
        return Ok(frame);
    }

    // Tier 3: bounded forward scan for the sync pattern
    let scan_end = buf.len().min(origin + SCAN_WINDOW);
    if scan_end > origin + 1 {
        for pos in origin..scan_end - 1 {
            if header::has_sync(buf[pos], buf[pos + 1]) {
                if let Some(frame) = Frame::read(buf, pos) {
                    return Ok(frame);
                }
            }
        }
    }

    Err(Error::FrameLocation {
        scan_start: origin,
        scan_end,
    })
}

/// Frame search origin for a buffer: the end of the leading ID3v2 tag if
/// one is present, else 0
pub fn stream_origin(buf: &[u8]) -> usize {
    Id3v2Tag::parse(buf).map(|tag| tag.section.end()).unwrap_or(0)
}

/// Iterator walking consecutive frames from a starting frame
///
/// Stops at the first offset where no frame parses; there is no mid-stream
/// resync. Callers that need resilience degrade to the buffer end instead.
pub struct Frames<'a> {
    buf: &'a [u8],
    next: Option<Frame>,
}

impl<'a> Frames<'a> {
    pub fn from(buf: &'a [u8], first: Frame) -> Self {
        Frames {
            buf,
            next: Some(first),
        }
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let current = self.next.take()?;
        self.next = Frame::read(self.buf, current.next_offset());
        Some(current)
    }
}
