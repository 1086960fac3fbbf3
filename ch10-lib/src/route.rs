use std::collections::{hash_map::Entry, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use crate::{Error, Packet, Result};

/// Classification of a packet's destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// Raw packet bodies, no file extension.
    Raw,
    /// ASCII TMATS setup record.
    Tmats,
    /// XML TMATS setup record.
    Xml,
    /// Re-assembled video elementary stream.
    Video,
}

impl OutputKind {
    #[must_use]
    pub fn for_packet(packet: &Packet) -> Self {
        if packet.data_type.is_tmats() {
            if packet.tmats_format() == 0 {
                OutputKind::Tmats
            } else {
                OutputKind::Xml
            }
        } else if packet.data_type.is_video() {
            OutputKind::Video
        } else {
            OutputKind::Raw
        }
    }

    #[must_use]
    pub fn extension(self) -> Option<&'static str> {
        match self {
            OutputKind::Raw => None,
            OutputKind::Tmats => Some("tmats"),
            OutputKind::Xml => Some("xml"),
            OutputKind::Video => Some("mpg"),
        }
    }

    /// Setup records are only written once per destination.
    #[must_use]
    pub fn write_once(self) -> bool {
        matches!(self, OutputKind::Tmats | OutputKind::Xml)
    }
}

/// Output file a packet is routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub path: PathBuf,
    pub kind: OutputKind,
}

/// Result of routing a single packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Payload was appended to the destination.
    Written(usize),
    /// Destination is write-once and has already been written.
    Dropped,
}

/// Per-destination totals provided by [Router::close].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStats {
    pub path: PathBuf,
    pub kind: OutputKind,
    pub packets: usize,
    pub bytes: u64,
}

struct Route {
    writer: BufWriter<File>,
    stats: RouteStats,
}

/// Demultiplexes packets into per-channel output files in `dir`.
///
/// Files are named by channel id with an extension determined by [OutputKind]. Each
/// destination is opened once, on the first packet routed to it, and remains open until
/// [Router::close] is called or the router is dropped. Buffered output is flushed in
/// either case.
///
/// # Example
/// ```no_run
/// use ch10::{Body, DataType, Packet, Router};
///
/// let mut router = Router::builder().dir("out").force(true).build();
/// router.route(&Packet::new(3, DataType(0x19), Body::Raw(vec![1, 2, 3]))).unwrap();
/// router.close().unwrap();
/// ```
#[derive(TypedBuilder)]
pub struct Router {
    /// Directory output files are written to.
    #[builder(setter(into))]
    dir: PathBuf,
    /// Overwrite existing output files.
    #[builder(default)]
    force: bool,
    #[builder(default, setter(skip))]
    routes: HashMap<PathBuf, Route>,
    /// Destination paths in the order they were opened.
    #[builder(default, setter(skip))]
    order: Vec<PathBuf>,
}

impl Router {
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn destination(&self, packet: &Packet) -> Destination {
        let kind = OutputKind::for_packet(packet);
        let mut name = packet.channel_id.to_string();
        if let Some(ext) = kind.extension() {
            name.push('.');
            name.push_str(ext);
        }
        Destination {
            path: self.dir.join(name),
            kind,
        }
    }

    fn open(dest: &Destination, force: bool) -> Result<Route> {
        if !force && dest.path.exists() {
            return Err(Error::DestinationExists(dest.path.clone()));
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&dest.path)
            .map_err(|source| Error::Output {
                path: dest.path.clone(),
                source,
            })?;
        debug!(path = %dest.path.display(), kind = ?dest.kind, "opened output");
        Ok(Route {
            writer: BufWriter::new(file),
            stats: RouteStats {
                path: dest.path.clone(),
                kind: dest.kind,
                packets: 0,
                bytes: 0,
            },
        })
    }

    /// Write the payload of `packet` to its destination, opening the destination if
    /// this is the first packet for it.
    ///
    /// # Errors
    /// [Error::DestinationExists] if the destination exists and `force` was not set, or
    /// [Error::Output] if the destination cannot be opened or written.
    pub fn route(&mut self, packet: &Packet) -> Result<Routed> {
        let dest = self.destination(packet);

        let route = match self.routes.entry(dest.path.clone()) {
            Entry::Occupied(entry) => {
                let route = entry.into_mut();
                if dest.kind.write_once() && route.stats.packets > 0 {
                    trace!(path = %dest.path.display(), "dropping repeated setup record");
                    return Ok(Routed::Dropped);
                }
                route
            }
            Entry::Vacant(entry) => {
                let route = Self::open(&dest, self.force)?;
                self.order.push(dest.path.clone());
                entry.insert(route)
            }
        };

        let payload = packet.payload();
        route
            .writer
            .write_all(&payload)
            .map_err(|source| Error::Output {
                path: dest.path.clone(),
                source,
            })?;
        route.stats.packets += 1;
        route.stats.bytes += payload.len() as u64;

        Ok(Routed::Written(payload.len()))
    }

    /// Number of destinations opened so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Flush and close all destinations, returning their stats in the order they were
    /// opened.
    ///
    /// All destinations are flushed even if flushing one of them fails; the first
    /// error is returned.
    ///
    /// # Errors
    /// [Error::Output] if any destination could not be flushed.
    pub fn close(mut self) -> Result<Vec<RouteStats>> {
        let mut stats = Vec::with_capacity(self.order.len());
        let mut first_err: Option<Error> = None;
        for path in self.order.drain(..) {
            let Some(mut route) = self.routes.remove(&path) else {
                continue;
            };
            if let Err(source) = route.writer.flush() {
                first_err.get_or_insert(Error::Output {
                    path: path.clone(),
                    source,
                });
            }
            stats.push(route.stats);
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Body, DataType};

    fn router(dir: &Path, force: bool) -> Router {
        Router::builder().dir(dir).force(force).build()
    }

    fn raw(channel: u16, data_type: u8, data: &[u8]) -> Packet {
        Packet::new(channel, DataType(data_type), Body::Raw(data.to_vec()))
    }

    #[test]
    fn destination_names() {
        let router = router(Path::new("/out"), false);

        let tmats = raw(0, 0x01, b"");
        let xml = tmats.clone().with_csdw(1 << 9);
        let video = Packet::new(12, DataType(0x40), Body::Video(vec![]));
        let bus = raw(3, 0x19, b"");

        assert_eq!(
            router.destination(&tmats),
            Destination {
                path: PathBuf::from("/out/0.tmats"),
                kind: OutputKind::Tmats
            }
        );
        assert_eq!(router.destination(&xml).path, PathBuf::from("/out/0.xml"));
        assert_eq!(router.destination(&video).path, PathBuf::from("/out/12.mpg"));
        assert_eq!(router.destination(&bus).path, PathBuf::from("/out/3"));
        assert_eq!(router.destination(&bus).kind, OutputKind::Raw);
    }

    #[test]
    fn tmats_written_once() {
        let tmpdir = tempfile::tempdir().unwrap();
        let mut router = router(tmpdir.path(), false);

        assert_eq!(router.route(&raw(0, 0x01, b"first")).unwrap(), Routed::Written(5));
        assert_eq!(router.route(&raw(4, 0x19, b"bus")).unwrap(), Routed::Written(3));
        assert_eq!(router.route(&raw(0, 0x01, b"second")).unwrap(), Routed::Dropped);
        let stats = router.close().unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].packets, 1);
        assert_eq!(
            std::fs::read(tmpdir.path().join("0.tmats")).unwrap(),
            b"first"
        );
        assert_eq!(std::fs::read(tmpdir.path().join("4")).unwrap(), b"bus");
    }

    #[test]
    fn raw_payloads_appended_without_delimiters() {
        let tmpdir = tempfile::tempdir().unwrap();
        let mut router = router(tmpdir.path(), false);

        router.route(&raw(4, 0x19, b"ab")).unwrap();
        router.route(&raw(4, 0x19, b"cd")).unwrap();
        let stats = router.close().unwrap();

        assert_eq!(stats[0].packets, 2);
        assert_eq!(stats[0].bytes, 4);
        assert_eq!(std::fs::read(tmpdir.path().join("4")).unwrap(), b"abcd");
    }

    #[test]
    fn video_subframes_concatenated() {
        let tmpdir = tempfile::tempdir().unwrap();
        let mut router = router(tmpdir.path(), false);
        let packet = Packet::new(
            9,
            DataType(0x40),
            Body::Video(vec![b"b1".to_vec(), b"b2".to_vec(), b"b3".to_vec()]),
        );

        assert_eq!(router.route(&packet).unwrap(), Routed::Written(6));
        router.close().unwrap();

        assert_eq!(
            std::fs::read(tmpdir.path().join("9.mpg")).unwrap(),
            b"b1b2b3"
        );
    }

    #[test]
    fn existing_destination_without_force() {
        let tmpdir = tempfile::tempdir().unwrap();
        std::fs::write(tmpdir.path().join("5"), b"keep").unwrap();
        let mut router = router(tmpdir.path(), false);

        router.route(&raw(4, 0x19, b"written")).unwrap();
        let zult = router.route(&raw(5, 0x19, b"clobber"));
        assert!(
            matches!(&zult, Err(Error::DestinationExists(p)) if p == &tmpdir.path().join("5")),
            "{zult:?}"
        );
        router.close().unwrap();

        assert_eq!(std::fs::read(tmpdir.path().join("5")).unwrap(), b"keep");
        assert_eq!(std::fs::read(tmpdir.path().join("4")).unwrap(), b"written");
    }

    #[test]
    fn existing_destination_with_force() {
        let tmpdir = tempfile::tempdir().unwrap();
        std::fs::write(tmpdir.path().join("5"), b"old contents").unwrap();
        let mut router = router(tmpdir.path(), true);

        router.route(&raw(5, 0x19, b"new")).unwrap();
        router.close().unwrap();

        assert_eq!(std::fs::read(tmpdir.path().join("5")).unwrap(), b"new");
    }

    #[test]
    fn drop_flushes_outputs() {
        let tmpdir = tempfile::tempdir().unwrap();
        {
            let mut router = router(tmpdir.path(), false);
            router.route(&raw(1, 0x19, b"buffered")).unwrap();
        }
        assert_eq!(std::fs::read(tmpdir.path().join("1")).unwrap(), b"buffered");
    }
}
