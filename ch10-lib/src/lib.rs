#![doc = include_str!("../README.md")]

mod datatype;
mod decode;
mod error;
mod files;
mod filter;
mod packet;
mod route;
mod summary;
mod units;

pub use datatype::DataType;
pub use decode::{
    read_packets, PacketReader, PrimaryHeader, CSDW_LEN, HEADER_LEN, SECONDARY_HEADER_LEN, SYNC,
};
pub use error::{Error, Result};
pub use files::{find_recordings, RECORDING_EXTENSIONS};
pub use filter::{parse_data_type, walk_packets, Criteria, WalkPackets};
pub use packet::{Body, ChannelId, Packet};
pub use route::{Destination, OutputKind, RouteStats, Routed, Router};
pub use summary::{ChannelSummary, Summary};
pub use units::{format_count, format_size};
