use zenscript_syntax::{Node, Tree};

use super::{CliError, Input, parse_source};

pub struct TreeArgs {
    pub source: Input,
    pub raw: bool,
    pub spans: bool,
    pub timeout_micros: u64,
}

pub fn run(args: TreeArgs) -> Result<(), CliError> {
    let text = args.source.read("source")?;
    let tree = parse_source(&text, args.timeout_micros)?;
    print!("{}", dump_tree(&tree, args.raw, args.spans));
    Ok(())
}

pub fn dump_tree(tree: &Tree, raw: bool, spans: bool) -> String {
    format_node(tree.root_node(), None, 0, raw, spans) + "\n"
}

fn format_node(
    node: Node<'_>,
    field_name: Option<&str>,
    depth: usize,
    include_anonymous: bool,
    show_spans: bool,
) -> String {
    let indent = "  ".repeat(depth);
    let kind = node.kind();
    let field_prefix = field_name.map(|f| format!("{}: ", f)).unwrap_or_default();
    let span_suffix = if show_spans {
        let start = node.start_position();
        let end = node.end_position();
        format!(" [{}:{}-{}:{}]", start.row, start.column, end.row, end.column)
    } else {
        String::new()
    };

    let children: Vec<_> = {
        let mut cursor = node.walk();
        let mut result = Vec::new();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if include_anonymous || child.is_named() {
                    result.push((child, cursor.field_name()));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        result
    };

    if children.is_empty() {
        if node.is_missing() {
            let shown = if node.is_named() {
                kind.to_string()
            } else {
                format!("\"{}\"", escape_string(kind))
            };
            return format!("{indent}{field_prefix}(MISSING {shown}){span_suffix}");
        }
        let text = node.text();
        return if text == kind {
            format!("{indent}{field_prefix}(\"{}\"){span_suffix}", escape_string(kind))
        } else {
            format!(
                "{indent}{field_prefix}({kind} \"{}\"){span_suffix}",
                escape_string(text)
            )
        };
    }

    let mut out = format!("{indent}{field_prefix}({kind}{span_suffix}");
    for (child, child_field) in children {
        out.push('\n');
        out.push_str(&format_node(
            child,
            child_field,
            depth + 1,
            include_anonymous,
            show_spans,
        ));
    }
    out.push(')');
    out
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c if c.is_control() => result.push_str(&format!("\\u{{{:04x}}}", c as u32)),
            c => result.push(c),
        }
    }
    result
}
