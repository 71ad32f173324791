use std::ops::Range;

use zenscript_syntax::query::{CaptureRecord, Query, QueryCursor};
use zenscript_syntax::{Language, Tree};

use super::{CliError, Input, parse_source};

pub struct QueryArgs {
    pub query: Input,
    pub source: Input,
    pub compact: bool,
    pub match_limit: Option<u32>,
    pub byte_range: Option<Range<u32>>,
    pub timeout_micros: u64,
}

pub fn run(args: QueryArgs) -> Result<(), CliError> {
    let query_text = args.query.read("query")?;
    let query = Query::new(Language::zenscript(), &query_text)?;

    let text = args.source.read("source")?;
    let tree = parse_source(&text, args.timeout_micros)?;

    let mut cursor = QueryCursor::new();
    if let Some(limit) = args.match_limit {
        cursor.set_match_limit(limit);
    }
    if let Some(range) = args.byte_range {
        cursor.set_byte_range(range);
    }

    let records = collect_captures(&query, &tree, &mut cursor);
    if cursor.did_exceed_match_limit() {
        tracing::warn!(
            limit = cursor.match_limit(),
            "some matches were dropped; raise --match-limit to see them"
        );
    }

    let output = if args.compact {
        serde_json::to_string(&records)?
    } else {
        serde_json::to_string_pretty(&records)?
    };
    println!("{output}");
    Ok(())
}

/// Every capture of every match, matches in document order.
pub fn collect_captures(query: &Query, tree: &Tree, cursor: &mut QueryCursor) -> Vec<CaptureRecord> {
    let mut records = Vec::new();
    for found in cursor.matches(query, tree.root_node()) {
        records.extend(
            found
                .captures
                .iter()
                .map(|capture| CaptureRecord::new(query, found.pattern_index, capture)),
        );
    }
    records
}
