use std::collections::HashSet;

use tracing::trace;

use crate::{Error, Packet, Result};

/// Packet selection criteria applied by [walk_packets].
///
/// Channels are matched textually against the decimal rendering of a packet's channel
/// id, so a literal such as `"05"` will never match channel 5. Data types are parsed
/// to integers and may be given in decimal or hex (`0x40`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    types: HashSet<u32>,
    channels: HashSet<String>,
    exclude: HashSet<String>,
}

fn literals<I, S>(values: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a data type literal, either decimal or hex with a `0x` prefix.
///
/// # Errors
/// [Error::InvalidDataType] if `s` is not a valid number.
pub fn parse_data_type(s: &str) -> Result<u32> {
    let s = s.trim();
    let zult = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    zult.map_err(|_| Error::InvalidDataType(s.to_string()))
}

impl Criteria {
    /// Create criteria from lists of literals. Literals are trimmed and empty literals
    /// are ignored. Empty lists do not filter.
    ///
    /// # Errors
    /// [Error::InvalidDataType] if any of `types` cannot be parsed.
    pub fn new<T, C, E, S>(types: T, channels: C, exclude: E) -> Result<Self>
    where
        T: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Criteria {
            types: literals(types)
                .map(|s| parse_data_type(&s))
                .collect::<Result<_>>()?,
            channels: literals(channels).collect(),
            exclude: literals(exclude).collect(),
        })
    }

    /// True if these criteria will not filter anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.channels.is_empty() && self.exclude.is_empty()
    }

    /// Check `packet` against the criteria. Checks are in order channel include, channel
    /// exclude, then data type include, stopping at the first that rejects the packet.
    #[must_use]
    pub fn matches(&self, packet: &Packet) -> bool {
        let channel = packet.channel_id.to_string();
        if !self.channels.is_empty() && !self.channels.contains(&channel) {
            trace!(channel = packet.channel_id, "skip not included");
            return false;
        }
        if self.exclude.contains(&channel) {
            trace!(channel = packet.channel_id, "skip excluded");
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&u32::from(packet.data_type.0)) {
            trace!(channel = packet.channel_id, data_type = packet.data_type.0, "skip data type");
            return false;
        }
        true
    }
}

/// Iterator adapter returned by [walk_packets].
pub struct WalkPackets<I> {
    packets: I,
    criteria: Criteria,
    index: usize,
}

impl<I> Iterator for WalkPackets<I>
where
    I: Iterator<Item = Result<Packet>>,
{
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let zult = self.packets.next()?;
            let index = self.index;
            self.index += 1;

            match zult {
                // The first packet carries the setup record, so it is always provided
                Ok(packet) if index == 0 => return Some(Ok(packet)),
                Ok(packet) => {
                    if self.criteria.matches(&packet) {
                        return Some(Ok(packet));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Filter `packets` according to `criteria`.
///
/// The first packet of the source is always provided regardless of `criteria`. Errors
/// from the source are passed through as-is.
///
/// # Example
/// ```
/// use ch10::{walk_packets, Body, Criteria, DataType, Packet};
///
/// let packets = vec![
///     Packet::new(0, DataType::TMATS, Body::Raw(vec![])),
///     Packet::new(1, DataType(0x19), Body::Raw(vec![])),
///     Packet::new(2, DataType(0x19), Body::Raw(vec![])),
/// ];
/// let criteria = Criteria::new(Vec::<&str>::new(), vec!["2"], vec![]).unwrap();
/// let ids: Vec<u16> = walk_packets(packets.into_iter().map(Ok), criteria)
///     .map(|p| p.unwrap().channel_id)
///     .collect();
/// assert_eq!(ids, vec![0, 2]);
/// ```
pub fn walk_packets<I>(packets: I, criteria: Criteria) -> WalkPackets<I::IntoIter>
where
    I: IntoIterator<Item = Result<Packet>>,
{
    WalkPackets {
        packets: packets.into_iter(),
        criteria,
        index: 0,
    }
}
