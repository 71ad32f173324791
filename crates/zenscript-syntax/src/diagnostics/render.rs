//! Source snippets for diagnostics, as printed by `zenscript check`.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;

impl Diagnostics {
    /// Renders the filtered diagnostics against `source`, one report each.
    pub fn render(&self, source: &str, path: &str, colored: bool) -> String {
        let renderer = if colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        let reports: Vec<String> = self
            .filtered()
            .iter()
            .map(|diag| {
                let primary = AnnotationKind::Primary
                    .span(visible(diag.range(), source.len()))
                    .label(diag.message());
                let mut snippet = Snippet::source(source).line_start(1).path(path).annotation(primary);
                for related in diag.related() {
                    snippet = snippet.annotation(
                        AnnotationKind::Context
                            .span(visible(related.range(), source.len()))
                            .label(related.message()),
                    );
                }
                let title = Level::ERROR.primary_title(diag.message()).element(snippet);
                renderer.render(&[title]).to_string()
            })
            .collect();
        reports.join("\n")
    }
}

/// Widens a missing token's empty range to one character.
fn visible(range: TextRange, len: usize) -> std::ops::Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();
    if start == end {
        return start..(start + 1).min(len);
    }
    start..end
}
