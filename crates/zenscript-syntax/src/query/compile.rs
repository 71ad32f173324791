//! Lowers parsed patterns into the form the matcher runs.
//!
//! Names are resolved against the [`Language`], captures and strings are interned, and
//! structural rules the parser cannot see locally are checked here. The first problem
//! aborts compilation.

use indexmap::{IndexMap, IndexSet};
use rowan::TextRange;

use super::ast::{self, Item, ItemKind, NodeKind};
use super::predicate::{PatternPredicates, compile_predicates};
use super::quantifier::{CaptureQuantifier, Repeat};
use super::{QueryError, QueryErrorKind};
use crate::language::{Field, Language};
use crate::syntax::SyntaxKind;

/// What a single node must look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeTest {
    Kind(SyntaxKind),
    /// `(_)`
    AnyNamed,
    /// `_`
    Any,
    Error,
    Missing(Option<SyntaxKind>),
}

/// Items that must match consecutive (not necessarily adjacent) siblings.
#[derive(Debug, Clone, Default)]
pub(crate) struct Sequence {
    pub items: Vec<Step>,
    /// A trailing `.`: no named sibling may follow the last item.
    pub anchored_end: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum StepKind {
    Node {
        test: NodeTest,
        children: Sequence,
        negated: Vec<Field>,
    },
    Group(Sequence),
    Alternation(Vec<Step>),
}

#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub kind: StepKind,
    pub field: Option<Field>,
    pub repeat: Repeat,
    pub captures: Vec<u32>,
    /// Preceded by `.`: no named sibling between this item and the previous one.
    pub immediate: bool,
    /// Byte offset of the item in the query source.
    pub offset: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    pub root: Step,
    pub start_byte: u32,
    pub end_byte: u32,
    pub rooted: bool,
    pub quantifiers: IndexMap<u32, CaptureQuantifier>,
    pub predicates: PatternPredicates,
    /// `(offset, guaranteed)` for every step, in source order.
    pub steps: Vec<(u32, bool)>,
}

pub(crate) struct CompiledQuery {
    pub patterns: Vec<CompiledPattern>,
    pub capture_names: IndexSet<String>,
    pub strings: IndexSet<String>,
}

type Quantifiers = IndexMap<u32, CaptureQuantifier>;

/// Where a sequence of items lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    TopLevel,
    Node,
    Group { top_level: bool },
}

pub(crate) struct Compiler<'a> {
    language: &'a Language,
    capture_names: IndexSet<String>,
    strings: IndexSet<String>,
    /// Captures used by the pattern being compiled.
    pattern_captures: IndexSet<u32>,
}

impl<'a> Compiler<'a> {
    pub fn new(language: &'a Language) -> Self {
        Self {
            language,
            capture_names: IndexSet::new(),
            strings: IndexSet::new(),
            pattern_captures: IndexSet::new(),
        }
    }

    pub fn compile(mut self, patterns: &[ast::Pattern]) -> Result<CompiledQuery, QueryError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            compiled.push(self.compile_pattern(pattern)?);
        }
        Ok(CompiledQuery {
            patterns: compiled,
            capture_names: self.capture_names,
            strings: self.strings,
        })
    }

    fn compile_pattern(&mut self, pattern: &ast::Pattern) -> Result<CompiledPattern, QueryError> {
        self.pattern_captures.clear();
        let (root, quantifiers) = self.lower(&pattern.item, Parent::TopLevel)?;
        let predicates = compile_predicates(
            &pattern.predicates,
            &self.capture_names,
            &self.pattern_captures,
            &mut self.strings,
        )?;

        let end_byte = pattern
            .predicates
            .iter()
            .map(|p| p.span.end())
            .fold(pattern.item.span.end(), Ord::max);

        let mut steps = Vec::new();
        collect_steps(&root, false, false, &mut steps);
        let steps = guaranteed_steps(&steps);

        Ok(CompiledPattern {
            rooted: is_rooted(&root),
            start_byte: pattern.item.span.start().into(),
            end_byte: end_byte.into(),
            root,
            quantifiers,
            predicates,
            steps,
        })
    }

    fn lower(&mut self, item: &Item, parent: Parent) -> Result<(Step, Quantifiers), QueryError> {
        let field = match &item.field {
            Some(name) => {
                if matches!(item.kind, ItemKind::Group(_)) || parent == (Parent::Group { top_level: true }) {
                    return Err(structure(name.span, "a field needs a parent node"));
                }
                let field = Field::from_name(&name.text).ok_or_else(|| {
                    error(
                        QueryErrorKind::Field,
                        name.span,
                        format!("unknown field `{}`", name.text),
                    )
                })?;
                Some(field)
            }
            None => None,
        };

        let mut captures = Vec::with_capacity(item.captures.len());
        for name in &item.captures {
            if matches!(item.kind, ItemKind::Group(_)) {
                return Err(structure(name.span, "a group cannot be captured; capture its items"));
            }
            let (id, _) = self.capture_names.insert_full(name.text.clone());
            self.pattern_captures.insert(id as u32);
            captures.push(id as u32);
        }

        let (kind, mut quantifiers) = match &item.kind {
            ItemKind::Node { kind, children } => {
                let test = self.resolve_node(kind)?;
                let (children, negated, quantifiers) = self.lower_sequence(children, Parent::Node)?;
                (
                    StepKind::Node {
                        test,
                        children,
                        negated,
                    },
                    quantifiers,
                )
            }
            ItemKind::Anonymous(name) => {
                let kind = self.resolve_symbol(name, false)?;
                (node_step(NodeTest::Kind(kind)), Quantifiers::new())
            }
            ItemKind::Wildcard => (node_step(NodeTest::Any), Quantifiers::new()),
            ItemKind::Group(items) => {
                let top_level = matches!(parent, Parent::TopLevel | Parent::Group { top_level: true });
                let (sequence, _, quantifiers) =
                    self.lower_sequence(items, Parent::Group { top_level })?;
                let single = sequence.items.len() == 1 && !sequence.anchored_end;
                if single && item.repeat == Repeat::One {
                    let mut inner = sequence.items.into_iter().next().ok_or_else(|| {
                        structure(item.span, "empty group")
                    })?;
                    inner.offset = item.span.start().into();
                    return Ok((inner, quantifiers));
                }
                (StepKind::Group(sequence), quantifiers)
            }
            ItemKind::Alternation(branches) => {
                let mut steps = Vec::with_capacity(branches.len());
                let mut joined: Option<Quantifiers> = None;
                for branch in branches {
                    let (step, quantifiers) = self.lower(branch, Parent::Node)?;
                    steps.push(step);
                    joined = Some(match joined {
                        None => quantifiers,
                        Some(acc) => join(acc, quantifiers),
                    });
                }
                (StepKind::Alternation(steps), joined.unwrap_or_default())
            }
            ItemKind::Anchor | ItemKind::NegatedField(_) => {
                return Err(structure(item.span, "expected a node pattern"));
            }
        };

        for &id in &captures {
            add_one(&mut quantifiers, id, CaptureQuantifier::One);
        }
        let outer = item.repeat.quantifier();
        for q in quantifiers.values_mut() {
            *q = q.repeat(outer);
        }

        let step = Step {
            kind,
            field,
            repeat: item.repeat,
            captures,
            immediate: false,
            offset: item.span.start().into(),
        };
        Ok((step, quantifiers))
    }

    fn lower_sequence(
        &mut self,
        items: &[Item],
        parent: Parent,
    ) -> Result<(Sequence, Vec<Field>, Quantifiers), QueryError> {
        let mut sequence = Sequence::default();
        let mut negated = Vec::new();
        let mut quantifiers = Quantifiers::new();
        let mut pending_anchor = false;

        for item in items {
            match &item.kind {
                ItemKind::Anchor => {
                    pending_anchor = true;
                    continue;
                }
                ItemKind::NegatedField(name) => {
                    if parent != Parent::Node {
                        return Err(structure(item.span, "a negated field needs a parent node"));
                    }
                    let field = Field::from_name(&name.text).ok_or_else(|| {
                        error(
                            QueryErrorKind::Field,
                            name.span,
                            format!("unknown field `{}`", name.text),
                        )
                    })?;
                    negated.push(field);
                    continue;
                }
                _ => {}
            }

            let (mut step, step_quantifiers) = self.lower(item, parent)?;
            step.immediate = std::mem::take(&mut pending_anchor);
            for (id, q) in step_quantifiers {
                add_one(&mut quantifiers, id, q);
            }
            sequence.items.push(step);
        }

        if pending_anchor {
            if parent != Parent::Node {
                let span = items.last().map_or(TextRange::default(), |i| i.span);
                return Err(structure(span, "an anchor at the end of a group has nothing to bind to"));
            }
            sequence.anchored_end = true;
        }
        Ok((sequence, negated, quantifiers))
    }

    fn resolve_node(&self, kind: &NodeKind) -> Result<NodeTest, QueryError> {
        Ok(match kind {
            NodeKind::Named(name) => NodeTest::Kind(self.resolve_symbol(name, true)?),
            NodeKind::AnyNamed => NodeTest::AnyNamed,
            NodeKind::Error => NodeTest::Error,
            NodeKind::Missing(None) => NodeTest::Missing(None),
            NodeKind::Missing(Some((name, named))) => {
                NodeTest::Missing(Some(self.resolve_symbol(name, *named)?))
            }
        })
    }

    fn resolve_symbol(&self, name: &ast::Name, named: bool) -> Result<SyntaxKind, QueryError> {
        self.language
            .symbol_for_name(&name.text, named)
            .and_then(SyntaxKind::from_raw)
            .ok_or_else(|| {
                let shown = if named {
                    name.text.clone()
                } else {
                    format!("\"{}\"", name.text)
                };
                error(
                    QueryErrorKind::NodeType,
                    name.span,
                    format!("unknown node type `{shown}`"),
                )
            })
    }
}

fn node_step(test: NodeTest) -> StepKind {
    StepKind::Node {
        test,
        children: Sequence::default(),
        negated: Vec::new(),
    }
}

fn error(kind: QueryErrorKind, span: TextRange, message: String) -> QueryError {
    QueryError::new(kind, span.start().into(), message)
}

fn structure(span: TextRange, message: &str) -> QueryError {
    error(QueryErrorKind::Structure, span, message.to_string())
}

fn add_one(map: &mut Quantifiers, id: u32, q: CaptureQuantifier) {
    let entry = map.entry(id).or_insert(CaptureQuantifier::Zero);
    *entry = entry.add(q);
}

/// Alternatives: a capture absent from one branch may be absent from the match.
fn join(mut left: Quantifiers, right: Quantifiers) -> Quantifiers {
    for (id, q) in left.iter_mut() {
        if !right.contains_key(id) {
            *q = q.join(CaptureQuantifier::Zero);
        }
    }
    for (id, q) in right {
        match left.get_mut(&id) {
            Some(entry) => *entry = entry.join(q),
            None => {
                left.insert(id, q.join(CaptureQuantifier::Zero));
            }
        }
    }
    left
}

fn is_rooted(step: &Step) -> bool {
    if step.repeat.max() != Some(1) {
        return false;
    }
    match &step.kind {
        StepKind::Node { .. } => true,
        StepKind::Group(_) => false,
        StepKind::Alternation(branches) => branches.iter().all(is_rooted),
    }
}

/// Pre-order `(offset, optional, inside_alternation)` of every step.
fn collect_steps(step: &Step, optional: bool, in_alternation: bool, out: &mut Vec<(u32, bool, bool)>) {
    let optional = optional || step.repeat.min() == 0;
    out.push((step.offset, optional, in_alternation));
    match &step.kind {
        StepKind::Node { children, .. } | StepKind::Group(children) => {
            for child in &children.items {
                collect_steps(child, optional, in_alternation, out);
            }
        }
        StepKind::Alternation(branches) => {
            for branch in branches {
                collect_steps(branch, optional, true, out);
            }
        }
    }
}

/// A step is guaranteed when reaching it means the pattern will match: nothing after it
/// is required.
fn guaranteed_steps(steps: &[(u32, bool, bool)]) -> Vec<(u32, bool)> {
    let mut out = vec![(0, false); steps.len()];
    let mut rest_optional = true;
    for (i, &(offset, optional, in_alternation)) in steps.iter().enumerate().rev() {
        out[i] = (offset, rest_optional && !in_alternation);
        rest_optional &= optional;
    }
    out
}
