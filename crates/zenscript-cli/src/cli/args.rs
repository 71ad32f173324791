//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that commands compose as needed.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Query file (positional).
pub fn query_path_arg() -> Arg {
    Arg::new("query_path")
        .value_name("QUERY")
        .value_parser(value_parser!(PathBuf))
        .help("Query file, or - for stdin")
}

/// Inline query text (-q/--query).
pub fn query_text_arg() -> Arg {
    Arg::new("query_text")
        .short('q')
        .long("query")
        .value_name("TEXT")
        .help("Inline query text")
}

/// ZenScript file (positional).
pub fn source_path_arg() -> Arg {
    Arg::new("source_path")
        .value_name("SOURCE")
        .value_parser(value_parser!(PathBuf))
        .help("ZenScript file, or - for stdin")
}

/// Inline source text (-s/--source).
pub fn source_text_arg() -> Arg {
    Arg::new("source_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .help("Inline source text")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Include anonymous nodes (--raw).
pub fn raw_arg() -> Arg {
    Arg::new("raw")
        .long("raw")
        .action(ArgAction::SetTrue)
        .help("Include anonymous nodes (keywords, punctuation)")
}

/// Show source positions (--spans).
pub fn spans_arg() -> Arg {
    Arg::new("spans")
        .long("spans")
        .action(ArgAction::SetTrue)
        .help("Show source positions")
}

/// Parse deadline (--timeout).
pub fn timeout_arg() -> Arg {
    Arg::new("timeout")
        .long("timeout")
        .value_name("MICROS")
        .default_value("0")
        .value_parser(value_parser!(u64))
        .help("Abort parsing after this many microseconds (0 = no limit)")
}

/// Output compact JSON (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON (default: pretty)")
}

/// Solutions kept per pattern attempt (--match-limit).
pub fn match_limit_arg() -> Arg {
    Arg::new("match_limit")
        .long("match-limit")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Solutions kept per pattern attempt")
}

/// Restrict matches to a byte range (--range).
pub fn byte_range_arg() -> Arg {
    Arg::new("range")
        .long("range")
        .value_name("START..END")
        .value_parser(parse_byte_range)
        .help("Only report matches intersecting this byte range")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .global(true)
        .help("Log parser activity to stderr (-v for debug, -vv for trace)")
}

pub(crate) fn parse_byte_range(value: &str) -> Result<std::ops::Range<u32>, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{value}'"))?;
    let start: u32 = start
        .parse()
        .map_err(|_| format!("invalid range start '{start}'"))?;
    let end: u32 = if end.is_empty() {
        u32::MAX
    } else {
        end.parse().map_err(|_| format!("invalid range end '{end}'"))?
    };
    if end < start {
        return Err(format!("range end {end} is before start {start}"));
    }
    Ok(start..end)
}
