use std::path::Path;

use tracing::debug;

/// Progress observer for a packet reader that logs every 10% of the input consumed.
pub fn log_progress(path: &Path) -> impl FnMut(u64) + Send + 'static {
    let total = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let name = path.display().to_string();
    let mut read = 0u64;
    let mut last_decile = 0u64;

    move |delta| {
        read += delta;
        if total == 0 {
            return;
        }
        let decile = read.saturating_mul(10) / total;
        if decile > last_decile {
            last_decile = decile;
            debug!(file = %name, read, total, "{}% read", decile * 10);
        }
    }
}
