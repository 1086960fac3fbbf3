use std::io::{ErrorKind, Read};

use tracing::{debug, trace};

use crate::{Body, DataType, Error, Packet, Result};

/// Size of the primary packet header.
pub const HEADER_LEN: usize = 24;
/// Size of the optional secondary header.
pub const SECONDARY_HEADER_LEN: usize = 12;
/// Size of the channel specific data word at the start of the packet data.
pub const CSDW_LEN: usize = 4;
pub const SYNC: u16 = 0xeb25;

/// Upper bound used to reject corrupt packet lengths before allocating.
const MAX_PACKET_LEN: u32 = 0x0100_0000;

const FLAG_SECONDARY_HEADER: u8 = 0x80;
/// Video format 0 CSDW intra-packet header bit.
const CSDW_VIDEO_IPH: u32 = 1 << 30;
const TS_PACKET_LEN: usize = 188;
const IPTS_LEN: usize = 8;

/// Chapter 10 packet primary header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrimaryHeader {
    pub sync: u16,
    pub channel_id: u16,
    pub packet_length: u32,
    pub data_length: u32,
    pub version: u8,
    pub sequence: u8,
    pub flags: u8,
    pub data_type: u8,
    pub rtc: u64,
    pub checksum: u16,
}

impl PrimaryHeader {
    #[must_use]
    pub fn decode(buf: &[u8; HEADER_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([buf[i], buf[i + 1]]);
        let u32_at = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        let mut rtc = [0u8; 8];
        rtc[..6].copy_from_slice(&buf[16..22]);

        PrimaryHeader {
            sync: u16_at(0),
            channel_id: u16_at(2),
            packet_length: u32_at(4),
            data_length: u32_at(8),
            version: buf[12],
            sequence: buf[13],
            flags: buf[14],
            data_type: buf[15],
            rtc: u64::from_le_bytes(rtc),
            checksum: u16_at(22),
        }
    }

    /// Compute the header checksum, the 16-bit sum of all header words before the
    /// checksum itself.
    #[must_use]
    pub fn checksum(buf: &[u8; HEADER_LEN]) -> u16 {
        buf[..HEADER_LEN - 2]
            .chunks_exact(2)
            .map(|w| u16::from_le_bytes([w[0], w[1]]))
            .fold(0u16, u16::wrapping_add)
    }

    #[must_use]
    pub fn has_secondary_header(&self) -> bool {
        self.flags & FLAG_SECONDARY_HEADER != 0
    }
}

/// Read until `buf` is full or EOF, returning the number of bytes read.
fn read_fully<R: Read>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match r.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(total)
}

/// Split a video body into its sub-frames.
///
/// Format 0 bodies are a sequence of MPEG-2 transport stream packets, each optionally
/// preceded by an intra-packet time stamp that is not part of the stream. Other video
/// formats are treated as a single sub-frame.
fn video_frames(data_type: DataType, csdw: u32, body: &[u8]) -> Vec<Vec<u8>> {
    if data_type.format() != 0 {
        return vec![body.to_vec()];
    }
    let ipts = if csdw & CSDW_VIDEO_IPH != 0 {
        IPTS_LEN
    } else {
        0
    };
    let chunks = body.chunks_exact(TS_PACKET_LEN + ipts);
    if !chunks.remainder().is_empty() {
        debug!(
            remainder = chunks.remainder().len(),
            "dropping partial transport stream packet"
        );
    }
    chunks.map(|c| c[ipts..].to_vec()).collect()
}

/// Iterator over the [Packet]s in a Chapter 10 byte stream.
///
/// Iteration stops at the first error, which is provided as the final item.
pub struct PacketReader<R> {
    reader: R,
    offset: u64,
    done: bool,
    progress: Option<Box<dyn FnMut(u64) + Send>>,
}

impl<R> PacketReader<R>
where
    R: Read,
{
    pub fn new(reader: R) -> Self {
        PacketReader {
            reader,
            offset: 0,
            done: false,
            progress: None,
        }
    }

    /// Register an observer called with the number of bytes consumed by each packet.
    #[must_use]
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Byte offset of the next packet.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        let offset = self.offset;
        let mut buf = [0u8; HEADER_LEN];
        match read_fully(&mut self.reader, &mut buf)? {
            0 => return Ok(None),
            HEADER_LEN => {}
            _ => return Err(Error::Truncated { offset }),
        }

        let header = PrimaryHeader::decode(&buf);
        if header.sync != SYNC {
            return Err(Error::Sync {
                offset,
                found: header.sync,
            });
        }
        let actual = PrimaryHeader::checksum(&buf);
        if actual != header.checksum {
            return Err(Error::HeaderChecksum {
                offset,
                expected: header.checksum,
                actual,
            });
        }

        let secondary_len = if header.has_secondary_header() {
            SECONDARY_HEADER_LEN
        } else {
            0
        };
        let packet_length = header.packet_length as usize;
        let data_length = header.data_length as usize;
        if header.packet_length > MAX_PACKET_LEN
            || data_length < CSDW_LEN
            || HEADER_LEN + secondary_len + data_length > packet_length
        {
            return Err(Error::Length {
                offset,
                packet_length: header.packet_length,
                data_length: header.data_length,
            });
        }

        let mut rest = vec![0u8; packet_length - HEADER_LEN];
        if read_fully(&mut self.reader, &mut rest)? != rest.len() {
            return Err(Error::Truncated { offset });
        }
        self.offset += u64::from(header.packet_length);
        if let Some(progress) = self.progress.as_mut() {
            progress(u64::from(header.packet_length));
        }

        let data = &rest[secondary_len..secondary_len + data_length];
        let csdw = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let data_type = DataType(header.data_type);
        let body = if data_type.is_video() {
            Body::Video(video_frames(data_type, csdw, &data[CSDW_LEN..]))
        } else {
            Body::Raw(data[CSDW_LEN..].to_vec())
        };
        trace!(
            offset,
            channel = header.channel_id,
            data_type = header.data_type,
            len = header.packet_length,
            "read packet"
        );

        Ok(Some(Packet {
            channel_id: header.channel_id,
            data_type,
            sequence: header.sequence,
            flags: header.flags,
            rtc: header.rtc,
            length: header.packet_length,
            csdw,
            body,
        }))
    }
}

impl<R> Iterator for PacketReader<R>
where
    R: Read,
{
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Return an iterator providing [Packet]s read from a Chapter 10 byte stream.
///
/// # Examples
/// ```
/// use ch10::read_packets;
///
/// let dat: &[u8] = &[];
/// assert_eq!(read_packets(dat).count(), 0);
/// ```
pub fn read_packets<R>(reader: R) -> PacketReader<R>
where
    R: Read,
{
    PacketReader::new(reader)
}
