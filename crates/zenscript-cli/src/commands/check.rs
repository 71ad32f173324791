use zenscript_syntax::Tree;

use super::{CliError, Input, parse_source};

pub struct CheckArgs {
    pub source: Input,
    pub timeout_micros: u64,
    pub color: bool,
}

/// Returns whether the source is free of syntax errors.
pub fn run(args: CheckArgs) -> Result<bool, CliError> {
    let text = args.source.read("source")?;
    let tree = parse_source(&text, args.timeout_micros)?;

    match render_diagnostics(&tree, &args.source.name(), args.color) {
        Some(report) => {
            eprint!("{report}");
            Ok(false)
        }
        // Silent on success (like cargo check)
        None => Ok(true),
    }
}

pub fn render_diagnostics(tree: &Tree, path: &str, color: bool) -> Option<String> {
    if tree.diagnostics().is_empty() {
        return None;
    }
    Some(tree.diagnostics().render(tree.text(), path, color))
}
