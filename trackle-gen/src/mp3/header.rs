//! MPEG audio frame header parsing
//!
//! A frame header is 4 bytes. Layout (MSB first):
//!
//! ```text
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//! A: sync (11 bits, all set)   B: version   C: layer   D: CRC flag
//! E: bitrate index             F: sample rate index
//! G: padding                   H: private bit
//! I: channel mode              (remaining bits unused here)
//! ```
//!
//! Bitrate and sample rate indexes map through version/layer tables;
//! index values that the tables mark free/bad/reserved are kept as
//! sentinels rather than rejected, so callers decide what is usable.

/// Frame header byte length
pub const HEADER_LEN: usize = 4;

/// MPEG audio version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg1,
    Mpeg2,
    Mpeg25,
}

/// MPEG audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    I,
    II,
    III,
}

/// Bitrate field: a concrete rate or a sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitrate {
    Kbps(u32),
    /// Index 0: "free format", rate not derivable from the header
    Free,
    /// Index 15: forbidden value
    Bad,
}

/// Sample rate field: a concrete rate or the reserved sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Hz(u32),
    Reserved,
}

/// Channel mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

/// Parsed 4-byte MPEG audio frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    pub layer: Layer,
    /// True when the header is followed by a 16-bit CRC
    pub crc_protected: bool,
    pub bitrate: Bitrate,
    pub sample_rate: SampleRate,
    /// True when the frame carries one padding slot
    pub padded: bool,
    pub private_bit: bool,
    pub channel_mode: ChannelMode,
}

/// Two-byte sync check: first byte all set, top three bits of the second set
///
/// Combined with the version bits this covers the 11-bit sync pattern; the
/// scanner uses this cheap test to pick candidate offsets.
pub fn has_sync(b0: u8, b1: u8) -> bool {
    b0 == 0xFF && (b1 & 0xE0) == 0xE0
}

impl FrameHeader {
    /// Parse a frame header from 4 bytes
    ///
    /// Returns `None` when the sync bits are absent or the version/layer
    /// fields hold their reserved encodings; such bytes are not a frame at
    /// all. Bitrate/sample-rate sentinels are preserved, not rejected.
    pub fn parse(bytes: &[u8]) -> Option<FrameHeader> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        if !has_sync(bytes[0], bytes[1]) {
            return None;
        }

        let version = match (bytes[1] >> 3) & 0x03 {
            0b00 => MpegVersion::Mpeg25,
            0b01 => return None, // reserved
            0b10 => MpegVersion::Mpeg2,
            _ => MpegVersion::Mpeg1,
        };

        let layer = match (bytes[1] >> 1) & 0x03 {
            0b00 => return None, // reserved
            0b01 => Layer::III,
            0b10 => Layer::II,
            _ => Layer::I,
        };

        // Protection bit is inverted: 0 means a CRC follows the header
        let crc_protected = bytes[1] & 0x01 == 0;

        let bitrate = bitrate_from_index(version, layer, bytes[2] >> 4);
        let sample_rate = sample_rate_from_index(version, (bytes[2] >> 2) & 0x03);
        let padded = (bytes[2] >> 1) & 0x01 == 1;
        let private_bit = bytes[2] & 0x01 == 1;

        let channel_mode = match bytes[3] >> 6 {
            0b00 => ChannelMode::Stereo,
            0b01 => ChannelMode::JointStereo,
            0b10 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        };

        Some(FrameHeader {
            version,
            layer,
            crc_protected,
            bitrate,
            sample_rate,
            padded,
            private_bit,
            channel_mode,
        })
    }

    /// Samples per frame for this version/layer
    pub fn samples_per_frame(&self) -> u32 {
        samples_per_frame(self.version, self.layer)
    }

    /// Frame byte length per the MPEG frame-size formula
    ///
    /// `None` when the bitrate or sample rate field is a sentinel; the
    /// frame boundary cannot be derived from such a header.
    pub fn frame_len(&self) -> Option<usize> {
        let bitrate_bps = match self.bitrate {
            Bitrate::Kbps(k) => k * 1000,
            Bitrate::Free | Bitrate::Bad => return None,
        };
        let rate = match self.sample_rate {
            SampleRate::Hz(hz) => hz,
            SampleRate::Reserved => return None,
        };
        let padding = if self.padded { 1u32 } else { 0 };

        let len = match self.layer {
            // Layer I padding slot is 4 bytes
            Layer::I => (12 * bitrate_bps / rate + padding) * 4,
            Layer::II | Layer::III => {
                self.samples_per_frame() / 8 * bitrate_bps / rate + padding
            }
        };
        Some(len as usize)
    }
}

/// Samples per frame by version and layer
pub fn samples_per_frame(version: MpegVersion, layer: Layer) -> u32 {
    match layer {
        Layer::I => 384,
        Layer::II => 1152,
        Layer::III => match version {
            MpegVersion::Mpeg1 => 1152,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 576,
        },
    }
}

/// Version-keyed samples-per-frame fallback for headers with a reserved
/// sample rate: 576 for MPEG2/2.5, 1152 otherwise
pub fn default_samples(version: MpegVersion) -> u32 {
    match version {
        MpegVersion::Mpeg1 => 1152,
        MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 576,
    }
}

/// Sample rate used with [`default_samples`] when the header's rate field
/// is reserved
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;

const BITRATES_V1_L1: [u32; 14] = [
    32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448,
];
const BITRATES_V1_L2: [u32; 14] = [
    32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384,
];
const BITRATES_V1_L3: [u32; 14] = [
    32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];
const BITRATES_V2_L1: [u32; 14] = [
    32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256,
];
const BITRATES_V2_L23: [u32; 14] = [
    8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160,
];

fn bitrate_from_index(version: MpegVersion, layer: Layer, index: u8) -> Bitrate {
    match index {
        0 => Bitrate::Free,
        15 => Bitrate::Bad,
        i => {
            let table = match (version, layer) {
                (MpegVersion::Mpeg1, Layer::I) => &BITRATES_V1_L1,
                (MpegVersion::Mpeg1, Layer::II) => &BITRATES_V1_L2,
                (MpegVersion::Mpeg1, Layer::III) => &BITRATES_V1_L3,
                (_, Layer::I) => &BITRATES_V2_L1,
                (_, _) => &BITRATES_V2_L23,
            };
            Bitrate::Kbps(table[(i - 1) as usize])
        }
    }
}

fn sample_rate_from_index(version: MpegVersion, index: u8) -> SampleRate {
    let table: [u32; 3] = match version {
        MpegVersion::Mpeg1 => [44_100, 48_000, 32_000],
        MpegVersion::Mpeg2 => [22_050, 24_000, 16_000],
        MpegVersion::Mpeg25 => [11_025, 12_000, 8_000],
    };
    match index {
        0..=2 => SampleRate::Hz(table[index as usize]),
        _ => SampleRate::Reserved,
    }
}
