//! Predicates attached to patterns.
//!
//! The engine never evaluates predicates; it hands them to the caller in two shapes: the
//! raw step list and a decoded operator with arguments.

use indexmap::IndexSet;
use serde::Serialize;

use super::ast;
use super::{QueryError, QueryErrorKind};

/// One element of a pattern's flattened predicate list. Each predicate ends with `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PredicateStep {
    Done,
    /// Index into the query's capture names.
    Capture(u32),
    /// Index into the query's string values.
    String(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QueryPredicateArg {
    Capture(u32),
    String(Box<str>),
}

/// A decoded predicate, such as `#eq? @name "main"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPredicate {
    /// Predicate name without the leading `#`, as in `eq?`.
    pub operator: Box<str>,
    pub args: Vec<QueryPredicateArg>,
}

/// Predicates of one pattern, in both shapes.
#[derive(Debug, Clone, Default)]
pub(crate) struct PatternPredicates {
    pub steps: Vec<PredicateStep>,
    pub decoded: Vec<QueryPredicate>,
}

pub(crate) fn compile_predicates(
    predicates: &[ast::Predicate],
    capture_names: &IndexSet<String>,
    pattern_captures: &IndexSet<u32>,
    strings: &mut IndexSet<String>,
) -> Result<PatternPredicates, QueryError> {
    let mut out = PatternPredicates::default();

    for predicate in predicates {
        let (operator, _) = strings.insert_full(predicate.name.clone());
        out.steps.push(PredicateStep::String(operator as u32));

        let mut args = Vec::with_capacity(predicate.args.len());
        for arg in &predicate.args {
            match arg {
                ast::PredicateArg::Capture(name) => {
                    let id = capture_names
                        .get_index_of(&name.text)
                        .map(|i| i as u32)
                        .filter(|id| pattern_captures.contains(id))
                        .ok_or_else(|| {
                            QueryError::new(
                                QueryErrorKind::Capture,
                                name.span.start().into(),
                                format!("undefined capture `@{}`", name.text),
                            )
                        })?;
                    out.steps.push(PredicateStep::Capture(id));
                    args.push(QueryPredicateArg::Capture(id));
                }
                ast::PredicateArg::String(value) => {
                    let (id, _) = strings.insert_full(value.clone());
                    out.steps.push(PredicateStep::String(id as u32));
                    args.push(QueryPredicateArg::String(value.as_str().into()));
                }
            }
        }
        out.steps.push(PredicateStep::Done);

        out.decoded.push(QueryPredicate {
            operator: predicate.name.as_str().into(),
            args,
        });
    }

    Ok(out)
}
