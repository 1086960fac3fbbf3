use std::{fs::File, io::BufReader, path::Path};

use anyhow::{bail, Context, Result};
use ch10::{format_size, read_packets, walk_packets, Criteria, Error, Routed, Router};
use tracing::{debug, info};

use crate::progress::log_progress;

/// Demultiplex `input` into per-channel files in `output`.
///
/// Every output opened before a failure is still flushed and closed.
pub fn dump(input: &Path, output: &Path, criteria: Criteria, force: bool) -> Result<()> {
    if !output.exists() {
        std::fs::create_dir_all(output)
            .with_context(|| format!("failed to create output directory {output:?}"))?;
    }
    let file =
        File::open(input).with_context(|| format!("Error opening data file {input:?}"))?;
    let packets = read_packets(BufReader::new(file)).with_progress(log_progress(input));

    info!("dumping {input:?} to {output:?}");
    let mut router = Router::builder().dir(output).force(force).build();
    let mut dropped = 0usize;
    let zult = walk_packets(packets, criteria).try_for_each(|zult| {
        let packet = zult.with_context(|| format!("reading {input:?}"))?;
        match router.route(&packet) {
            Ok(Routed::Written(_)) => Ok(()),
            Ok(Routed::Dropped) => {
                dropped += 1;
                Ok(())
            }
            Err(Error::DestinationExists(path)) => {
                bail!("{} already exists. Use -f to overwrite.", path.display())
            }
            Err(err) => Err(err).context("writing output"),
        }
    });

    let closed = router.close();
    if let Ok(stats) = &closed {
        for route in stats {
            info!(
                "wrote {} packets ({}) to {}",
                route.packets,
                format_size(route.bytes),
                route.path.display()
            );
        }
        debug!(outputs = stats.len(), dropped, "dump finished");
    }

    zult?;
    closed.context("closing outputs")?;
    Ok(())
}
