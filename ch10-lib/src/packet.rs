use std::borrow::Cow;
use std::fmt::Display;

use crate::DataType;

pub type ChannelId = u16;

/// Packet payload as delivered by a packet source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Body bytes following the channel specific data word.
    Raw(Vec<u8>),
    /// Video payloads are carried as a sequence of sub-frames, e.g., MPEG-2
    /// transport stream packets.
    Video(Vec<Vec<u8>>),
}

impl Body {
    /// Total number of payload bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Body::Raw(data) => data.len(),
            Body::Video(frames) => frames.iter().map(Vec::len).sum(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded Chapter 10 packet descriptor.
///
/// # Example
/// ```
/// use ch10::{Body, DataType, Packet};
///
/// let packet = Packet::new(3, DataType(0x40), Body::Video(vec![vec![1, 2], vec![3]]));
/// assert_eq!(&packet.payload()[..], &[1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub channel_id: ChannelId,
    pub data_type: DataType,
    pub sequence: u8,
    pub flags: u8,
    /// 48-bit relative time counter.
    pub rtc: u64,
    /// Total packet length in bytes, including headers, filler and checksum.
    pub length: u32,
    /// Channel specific data word.
    pub csdw: u32,
    pub body: Body,
}

impl Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Packet{{channel: {}, type: {}, rtc: {}, len: {}, body:[len={}]}}",
            self.channel_id,
            self.data_type,
            self.rtc,
            self.length,
            self.body.len()
        )
    }
}

impl Packet {
    /// TMATS CSDW format bit; 0 is ASCII, 1 is XML.
    const CSDW_TMATS_FORMAT: u32 = 1 << 9;

    /// Create a packet with a zero CSDW and RTC. `length` is computed from the body
    /// as if the packet only had a primary header and CSDW.
    #[must_use]
    pub fn new(channel_id: ChannelId, data_type: DataType, body: Body) -> Self {
        let length = crate::decode::HEADER_LEN + crate::decode::CSDW_LEN + body.len();
        Packet {
            channel_id,
            data_type,
            sequence: 0,
            flags: 0,
            rtc: 0,
            length: u32::try_from(length).unwrap_or(u32::MAX),
            csdw: 0,
            body,
        }
    }

    #[must_use]
    pub fn with_csdw(mut self, csdw: u32) -> Self {
        self.csdw = csdw;
        self
    }

    #[must_use]
    pub fn with_rtc(mut self, rtc: u64) -> Self {
        self.rtc = rtc;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// TMATS format flag from the CSDW. Only meaningful for TMATS packets.
    #[must_use]
    pub fn tmats_format(&self) -> u8 {
        u8::from(self.csdw & Self::CSDW_TMATS_FORMAT != 0)
    }

    /// The bytes written out when this packet is demultiplexed. Video sub-frames are
    /// concatenated in order, all other bodies are returned as-is.
    #[must_use]
    pub fn payload(&self) -> Cow<'_, [u8]> {
        match &self.body {
            Body::Raw(data) => Cow::Borrowed(data.as_slice()),
            Body::Video(frames) => Cow::Owned(frames.concat()),
        }
    }
}
