use anyhow::{Context, Result};
use ch10::{
    find_recordings, format_count, format_size, read_packets, walk_packets, Criteria, Summary,
};
use handlebars::handlebars_helper;
use serde::Serialize;
use std::{
    fs::File,
    io::{stdout, BufReader, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::progress::log_progress;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    summary: Summary,
}

#[derive(Debug, Serialize)]
struct ChannelRow {
    channel: String,
    data_type: String,
    packets: String,
}

#[derive(Debug, Serialize)]
struct TextReport {
    filename: String,
    channels: Vec<ChannelRow>,
    size: String,
    packets: String,
    num_channels: usize,
}

impl From<&Info> for TextReport {
    fn from(info: &Info) -> Self {
        let channels = info
            .summary
            .channels
            .iter()
            .map(|c| ChannelRow {
                channel: format!("Channel {}", c.channel_id),
                data_type: format!("{} - {}", c.data_type, c.data_type.name()),
                packets: format!("{} packets", format_count(c.packets as u64)),
            })
            .collect();
        TextReport {
            filename: info.filename.clone(),
            channels,
            size: format_size(info.summary.bytes),
            packets: format_count(info.summary.packets as u64),
            num_channels: info.summary.num_channels(),
        }
    }
}

fn summarize(fpath: &Path, criteria: &Criteria) -> Result<Info> {
    let file =
        File::open(fpath).with_context(|| format!("Error opening data file {fpath:?}"))?;
    let packets = read_packets(BufReader::new(file)).with_progress(log_progress(fpath));

    let mut summary = Summary::default();
    for zult in walk_packets(packets, criteria.clone()) {
        let packet = zult.with_context(|| format!("reading {fpath:?}"))?;
        summary.add(&packet);
    }
    debug!(
        file = %fpath.display(),
        packets = summary.packets,
        channels = summary.num_channels(),
        "summarized"
    );

    Ok(Info {
        filename: fpath.to_string_lossy().to_string(),
        summary,
    })
}

pub fn stat(inputs: &[PathBuf], criteria: &Criteria, format: &Format) -> Result<()> {
    let paths = find_recordings(inputs).context("searching for recordings")?;
    if paths.is_empty() {
        warn!("no recordings found in {inputs:?}");
    }

    let mut infos = Vec::with_capacity(paths.len());
    for path in &paths {
        infos.push(summarize(path, criteria)?);
    }

    match format {
        Format::Json => {
            let mut out = stdout();
            serde_json::to_writer_pretty(&mut out, &infos).context("serializing to json")?;
            writeln!(out).context("writing to stdout")
        }
        Format::Text => {
            let mut out = stdout();
            for info in &infos {
                let data = render_text(info).context("serializing info")?;
                out.write_all(data.as_bytes()).context("writing to stdout")?;
            }
            Ok(())
        }
    }
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: str| {
        format!("{v:>width$}", width = usize::try_from(num).unwrap_or(0))
    });
    handlebars_helper!(right_pad: |num: u64, v: str| {
        format!("{v:<width$}", width = usize::try_from(num).unwrap_or(0))
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_helper("rpad", Box::new(right_pad));
    hb.register_template_string("stat", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("stat", &TextReport::from(info))
        .context("rendering text")
}

const TEXT_TEMPLATE: &str = r"Channel ID     Data Type                                       Packets
--------------------------------------------------------------------------------
{{ #each channels }}{{ rpad 15 channel }}{{ rpad 35 data_type }}{{ lpad 20 packets }}
{{ /each }}--------------------------------------------------------------------------------
Summary for {{ filename }}:
    Size: {{ size }}
    Packets: {{ packets }}
    Channels: {{ num_channels }}
";

#[cfg(test)]
mod tests {
    use super::*;
    use ch10::{Body, DataType, Packet};

    fn info() -> Info {
        let mut summary = Summary::default();
        for (channel, data_type) in [(1, 0x01), (3, 0x19), (3, 0x19), (12, 0x40)] {
            summary.add(
                &Packet::new(channel, DataType(data_type), Body::Raw(vec![])).with_length(1024),
            );
        }
        Info {
            filename: "test.ch10".to_string(),
            summary,
        }
    }

    #[test]
    fn text_report() {
        let text = render_text(&info()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[2],
            format!("{:<15}{:<35}{:>20}", "Channel 1", "0x1 - TMATS", "1 packets")
        );
        assert_eq!(
            lines[3],
            format!("{:<15}{:<35}{:>20}", "Channel 3", "0x19 - 1553 Format 1", "2 packets")
        );
        assert!(lines[4].starts_with("Channel 12     0x40 - Video Format 0"));
        assert_eq!(lines[6], "Summary for test.ch10:");
        assert_eq!(lines[7], "    Size: 4.0 kb");
        assert_eq!(lines[8], "    Packets: 4");
        assert_eq!(lines[9], "    Channels: 3");
    }

    #[test]
    fn json_report() {
        let value = serde_json::to_value(&info()).unwrap();

        assert_eq!(value["summary"]["packets"], 4);
        assert_eq!(value["summary"]["bytes"], 4096);
        assert_eq!(value["summary"]["channels"][1]["channel_id"], 3);
        assert_eq!(value["summary"]["channels"][1]["data_type"], 0x19);
        assert_eq!(value["summary"]["channels"][1]["packets"], 2);
        assert!(value["summary"].get("index").is_none());
    }
}
