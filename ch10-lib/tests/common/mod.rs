use std::path::{Path, PathBuf};

use ch10::{PrimaryHeader, CSDW_LEN, HEADER_LEN, SYNC};

/// Build Chapter 10 packet bytes with no secondary header.
pub fn encode_packet(channel: u16, data_type: u8, csdw: u32, body: &[u8]) -> Vec<u8> {
    let data_length = CSDW_LEN + body.len();
    let filler = (4 - data_length % 4) % 4;
    let packet_length = HEADER_LEN + data_length + filler;

    let mut buf = Vec::with_capacity(packet_length);
    buf.extend_from_slice(&SYNC.to_le_bytes());
    buf.extend_from_slice(&channel.to_le_bytes());
    buf.extend_from_slice(&u32::try_from(packet_length).unwrap().to_le_bytes());
    buf.extend_from_slice(&u32::try_from(data_length).unwrap().to_le_bytes());
    buf.extend_from_slice(&[0x06, 0, 0, data_type]);
    buf.extend_from_slice(&[0; 6]);
    let mut hdr = [0u8; HEADER_LEN];
    hdr[..HEADER_LEN - 2].copy_from_slice(&buf);
    buf.extend_from_slice(&PrimaryHeader::checksum(&hdr).to_le_bytes());
    buf.extend_from_slice(&csdw.to_le_bytes());
    buf.extend_from_slice(body);
    buf.resize(packet_length, 0);
    buf
}

/// Write a recording made of `packets` to `dir/name`.
pub fn write_recording(dir: &Path, name: &str, packets: &[Vec<u8>]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, packets.concat()).unwrap();
    path
}
