//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` mirror the command `*Args` but are populated from clap. The query command
//! shifts its first positional to the source when `-q` is given.

use std::ops::Range;
use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::query::QueryArgs;
use crate::commands::tree::TreeArgs;
use crate::commands::Input;

pub struct TreeParams {
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub raw: bool,
    pub spans: bool,
    pub timeout_micros: u64,
}

impl TreeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),
            raw: m.get_flag("raw"),
            spans: m.get_flag("spans"),
            timeout_micros: parse_timeout(m),
        }
    }
}

impl From<TreeParams> for TreeArgs {
    fn from(p: TreeParams) -> Self {
        Self {
            source: Input::new(p.source_path, p.source_text),
            raw: p.raw,
            spans: p.spans,
            timeout_micros: p.timeout_micros,
        }
    }
}

pub struct CheckParams {
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub timeout_micros: u64,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),
            timeout_micros: parse_timeout(m),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            source: Input::new(p.source_path, p.source_text),
            timeout_micros: p.timeout_micros,
            color: p.color.should_colorize(),
        }
    }
}

pub struct QueryParams {
    pub query_path: Option<PathBuf>,
    pub query_text: Option<String>,
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
    pub compact: bool,
    pub match_limit: Option<u32>,
    pub byte_range: Option<Range<u32>>,
    pub timeout_micros: u64,
}

impl QueryParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let query_path = m.get_one::<PathBuf>("query_path").cloned();
        let query_text = m.get_one::<String>("query_text").cloned();
        let source_path = m.get_one::<PathBuf>("source_path").cloned();

        let (query_path, source_path) =
            shift_positional_to_source(query_text.is_some(), query_path, source_path);

        Self {
            query_path,
            query_text,
            source_path,
            source_text: m.get_one::<String>("source_text").cloned(),
            compact: m.get_flag("compact"),
            match_limit: m.get_one::<u32>("match_limit").copied(),
            byte_range: m.get_one::<Range<u32>>("range").cloned(),
            timeout_micros: parse_timeout(m),
        }
    }
}

impl From<QueryParams> for QueryArgs {
    fn from(p: QueryParams) -> Self {
        Self {
            query: Input::new(p.query_path, p.query_text),
            source: Input::new(p.source_path, p.source_text),
            compact: p.compact,
            match_limit: p.match_limit,
            byte_range: p.byte_range,
            timeout_micros: p.timeout_micros,
        }
    }
}

/// Count of `-v` flags on the top-level command.
pub fn verbosity(m: &ArgMatches) -> u8 {
    m.get_count("verbose")
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn parse_timeout(m: &ArgMatches) -> u64 {
    m.get_one::<u64>("timeout").copied().unwrap_or(0)
}

/// When -q is used with a single positional arg, it names the source.
/// This enables: `zenscript query -q '(simple_name) @n' recipes.zs`
fn shift_positional_to_source(
    has_query_text: bool,
    query_path: Option<PathBuf>,
    source_path: Option<PathBuf>,
) -> (Option<PathBuf>, Option<PathBuf>) {
    if has_query_text && query_path.is_some() && source_path.is_none() {
        (None, query_path)
    } else {
        (query_path, source_path)
    }
}
