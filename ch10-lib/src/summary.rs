use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{ChannelId, DataType, Packet};

/// Packet count for a single channel id and data type pair.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ChannelSummary {
    pub channel_id: ChannelId,
    pub data_type: DataType,
    pub packets: usize,
}

/// Tracks stats on packet iteration.
///
/// Channels are keyed by channel id and data type, so the same channel id carrying two
/// data types is summarized as two channels. Channels are kept in the order they are
/// first seen.
///
/// # Example
/// ```
/// use ch10::{Body, DataType, Packet, Summary};
///
/// let mut summary = Summary::default();
/// summary.add(&Packet::new(5, DataType(0x19), Body::Raw(vec![0; 4])));
/// assert_eq!(summary.packets, 1);
/// assert_eq!(summary.channels[0].channel_id, 5);
/// ```
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Summary {
    pub packets: usize,
    pub bytes: u64,
    pub channels: Vec<ChannelSummary>,

    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<(ChannelId, DataType), usize>,
}

impl Summary {
    pub fn add(&mut self, packet: &Packet) {
        self.packets += 1;
        self.bytes += u64::from(packet.length);

        let key = (packet.channel_id, packet.data_type);
        let idx = *self.index.entry(key).or_insert_with(|| {
            self.channels.push(ChannelSummary {
                channel_id: packet.channel_id,
                data_type: packet.data_type,
                packets: 0,
            });
            self.channels.len() - 1
        });
        self.channels[idx].packets += 1;
    }

    #[must_use]
    pub fn channel(&self, channel_id: ChannelId, data_type: DataType) -> Option<&ChannelSummary> {
        self.index
            .get(&(channel_id, data_type))
            .map(|idx| &self.channels[*idx])
    }

    #[must_use]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Body;

    fn packet(channel: u16, data_type: u8, length: u32) -> Packet {
        Packet::new(channel, DataType(data_type), Body::Raw(vec![])).with_length(length)
    }

    #[test]
    fn summary() {
        let mut summary = Summary::default();
        for p in [packet(5, 0, 100), packet(5, 0, 200), packet(7, 2, 50)] {
            summary.add(&p);
        }

        assert_eq!(summary.packets, 3);
        assert_eq!(summary.bytes, 350);
        assert_eq!(summary.num_channels(), 2);
        let keys: Vec<(u16, u8)> = summary
            .channels
            .iter()
            .map(|c| (c.channel_id, c.data_type.0))
            .collect();
        assert_eq!(keys, vec![(5, 0), (7, 2)]);
        assert_eq!(summary.channels[0].packets, 2);
        assert_eq!(summary.channels[1].packets, 1);
    }

    #[test]
    fn same_channel_different_types_are_distinct() {
        let mut summary = Summary::default();
        for p in [packet(3, 0x19, 1), packet(3, 0x40, 1), packet(3, 0x19, 1)] {
            summary.add(&p);
        }

        assert_eq!(summary.num_channels(), 2);
        assert_eq!(summary.channel(3, DataType(0x19)).unwrap().packets, 2);
        assert_eq!(summary.channel(3, DataType(0x40)).unwrap().packets, 1);
        assert!(summary.channel(4, DataType(0x19)).is_none());
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut summary = Summary::default();
        for p in [packet(9, 0, 1), packet(1, 0, 1), packet(5, 0, 1), packet(1, 0, 1)] {
            summary.add(&p);
        }
        let ids: Vec<u16> = summary.channels.iter().map(|c| c.channel_id).collect();
        assert_eq!(ids, vec![9, 1, 5]);
    }
}
