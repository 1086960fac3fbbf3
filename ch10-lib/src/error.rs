use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Packet did not start with the Chapter 10 sync pattern.
    #[error("invalid sync pattern {found:#06x} at offset {offset}")]
    Sync { offset: u64, found: u16 },

    #[error("header checksum mismatch at offset {offset}: expected {expected:#06x}, got {actual:#06x}")]
    HeaderChecksum {
        offset: u64,
        expected: u16,
        actual: u16,
    },

    /// Header lengths are not consistent with each other.
    #[error("invalid packet lengths at offset {offset}: packet={packet_length} data={data_length}")]
    Length {
        offset: u64,
        packet_length: u32,
        data_length: u32,
    },

    #[error("truncated packet at offset {offset}")]
    Truncated { offset: u64 },

    #[error("invalid data type value {0:?}")]
    InvalidDataType(String),

    #[error("{} already exists. Use -f to overwrite.", .0.display())]
    DestinationExists(PathBuf),

    #[error("writing {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
