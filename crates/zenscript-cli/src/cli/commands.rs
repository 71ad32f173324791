//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("zenscript")
        .about("Inspect, check and query ZenScript sources")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(tree_command())
        .subcommand(check_command())
        .subcommand(query_command())
}

/// Print the syntax tree of a source file.
pub fn tree_command() -> Command {
    Command::new("tree")
        .about("Show the syntax tree of a ZenScript source")
        .override_usage(
            "\
  zenscript tree <SOURCE>
  zenscript tree -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  zenscript tree recipes.zs            # named nodes
  zenscript tree recipes.zs --raw      # include keywords and punctuation
  zenscript tree -s 'val a = 1;' --spans"#,
        )
        .arg(source_path_arg())
        .arg(source_text_arg())
        .arg(raw_arg())
        .arg(spans_arg())
        .arg(timeout_arg())
}

/// Report syntax errors.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Report syntax errors in a ZenScript source")
        .override_usage(
            "\
  zenscript check <SOURCE>
  zenscript check -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  zenscript check recipes.zs           # silent when valid
  zenscript check - < recipes.zs       # read stdin"#,
        )
        .arg(source_path_arg())
        .arg(source_text_arg())
        .arg(timeout_arg())
        .arg(color_arg())
}

/// Run a query and print its captures as JSON.
pub fn query_command() -> Command {
    Command::new("query")
        .about("Run a tree query over a ZenScript source")
        .override_usage(
            "\
  zenscript query <QUERY> <SOURCE>
  zenscript query -q <TEXT> <SOURCE>
  zenscript query -q <TEXT> -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  zenscript query functions.scm recipes.zs
  zenscript query -q '(function_declaraton name: (_) @name)' recipes.zs
  zenscript query -q '(int_literal) @n' -s 'val a = 1;' --compact"#,
        )
        .arg(query_path_arg())
        .arg(source_path_arg())
        .arg(query_text_arg())
        .arg(source_text_arg())
        .arg(compact_arg())
        .arg(match_limit_arg())
        .arg(byte_range_arg())
        .arg(timeout_arg())
}
