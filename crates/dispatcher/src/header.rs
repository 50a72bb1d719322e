//! Header encoders, one per [`LogFormat`]

use std::io::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use contracts::{Facility, Level, LogFormat, Metadata};

/// Append the header for `format` to `out`.
///
/// `Raw` writes nothing. Timestamps come from the metadata, or the current
/// time when it carries none.
pub fn encode_header(
    format: LogFormat,
    level: Level,
    facility: Facility,
    metadata: Option<&Metadata>,
    out: &mut Vec<u8>,
) {
    let pri = facility.priority(level);
    match format {
        LogFormat::Raw => {}
        LogFormat::Short => push(out, format_args!("<{}>", level.code())),
        LogFormat::Priority => push(out, format_args!("<{}>", pri)),
        LogFormat::Iso => push(out, format_args!("{} ", iso_timestamp(&timestamp(metadata)))),
        LogFormat::Timed => push(
            out,
            format_args!("<{}>{} ", pri, iso_timestamp(&timestamp(metadata))),
        ),
        LogFormat::Rfc3164 => encode_rfc3164(pri, metadata, out),
        LogFormat::Rfc5424 => encode_rfc5424(pri, metadata, out),
    }
}

fn encode_rfc3164(pri: u8, metadata: Option<&Metadata>, out: &mut Vec<u8>) {
    let ts = timestamp(metadata);
    push(out, format_args!("<{}>{} ", pri, ts.format("%b %e %H:%M:%S")));

    let Some(meta) = metadata else {
        return;
    };
    if let Some(host) = non_empty(&meta.hostname) {
        push(out, format_args!("{} ", host));
    }
    if let Some(tag) = non_empty(&meta.tag) {
        out.extend_from_slice(tag.as_bytes());
        if let Some(pid) = meta.pid {
            push(out, format_args!("[{}]", pid));
        }
        out.extend_from_slice(b": ");
    }
}

fn encode_rfc5424(pri: u8, metadata: Option<&Metadata>, out: &mut Vec<u8>) {
    let ts = timestamp(metadata);
    let field = |value: Option<&String>| -> String {
        value
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| "-".to_string())
    };

    let host = field(metadata.and_then(|m| m.hostname.as_ref()));
    let tag = field(metadata.and_then(|m| m.tag.as_ref()));
    let pid = metadata
        .and_then(|m| m.pid)
        .map_or_else(|| "-".to_string(), |p| p.to_string());
    let msgid = field(metadata.and_then(|m| m.msgid.as_ref()));
    let sd = field(metadata.and_then(|m| m.structured_data.as_ref()));

    push(
        out,
        format_args!(
            "<{}>1 {} {} {} {} {} {} ",
            pri,
            iso_timestamp(&ts),
            host,
            tag,
            pid,
            msgid,
            sd
        ),
    );
}

fn timestamp(metadata: Option<&Metadata>) -> DateTime<Utc> {
    metadata.and_then(|m| m.timestamp).unwrap_or_else(Utc::now)
}

fn iso_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn push(out: &mut Vec<u8>, args: std::fmt::Arguments<'_>) {
    // Writing into a Vec never fails.
    let _ = out.write_fmt(args);
}
