use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chapter 10 packet data type code.
///
/// The upper 5 bits select the data type family (computer generated, PCM, time,
/// 1553, video, ...) and the lower 3 bits the format within that family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct DataType(pub u8);

impl DataType {
    /// Computer generated format 1, i.e., TMATS setup record.
    pub const TMATS: DataType = DataType(0x01);
    pub const VIDEO_FAMILY: u8 = 8;

    #[must_use]
    pub fn family(self) -> u8 {
        self.0 >> 3
    }

    #[must_use]
    pub fn format(self) -> u8 {
        self.0 & 0x7
    }

    #[must_use]
    pub fn is_tmats(self) -> bool {
        self == Self::TMATS
    }

    #[must_use]
    pub fn is_video(self) -> bool {
        self.family() == Self::VIDEO_FAMILY
    }

    /// Human readable name for this data type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self.0 {
            0x00 => "Computer Generated Format 0 (User Defined)",
            0x01 => "TMATS",
            0x02 => "Computer Generated Format 2 (Recording Event)",
            0x03 => "Computer Generated Format 3 (Recording Index)",
            0x04 => "Computer Generated Format 4 (Streaming Configuration)",
            0x09 => "PCM Format 1",
            0x11 => "Time Format 1 (IRIG/GPS/RTC)",
            0x12 => "Time Format 2 (Network Time)",
            0x19 => "1553 Format 1",
            0x1a => "1553 Format 2 (16PP194)",
            0x21 => "Analog Format 1",
            0x29 => "Discrete Format 1",
            0x30 => "Message Format 0",
            0x38 => "ARINC-429 Format 0",
            0x40 => "Video Format 0 (MPEG-2/H.264)",
            0x41 => "Video Format 1 (ISO 13818-1 MPEG-2)",
            0x42 => "Video Format 2 (ISO 14496 MPEG-4 Part 10 AVC/H.264)",
            0x43 => "Video Format 3 (MJPEG)",
            0x44 => "Video Format 4 (MJPEG-2000)",
            0x48 => "Image Format 0",
            0x49 => "Image Format 1",
            0x4a => "Image Format 2",
            0x50 => "UART Format 0",
            0x58 => "IEEE 1394 Format 0",
            0x59 => "IEEE 1394 Format 1",
            0x60 => "Parallel Format 0",
            0x68 => "Ethernet Format 0",
            0x69 => "Ethernet Format 1 (ARINC-664)",
            0x70 => "TSPI/CTS Format 0 (GPS NMEA-RTCM)",
            0x71 => "TSPI/CTS Format 1 (EAG ACMI)",
            0x72 => "TSPI/CTS Format 2 (ACTTS)",
            0x78 => "Controller Area Network Bus",
            0x79 => "Fibre Channel Format 0",
            0x7a => "Fibre Channel Format 1",
            _ => "Unknown",
        }
    }
}

impl From<u8> for DataType {
    fn from(value: u8) -> Self {
        DataType(value)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
