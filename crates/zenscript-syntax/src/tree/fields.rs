//! Field labels for the children of each node kind.
//!
//! Fields are derived from a child's position among its non-extra siblings or from the
//! anonymous token right before it.

use crate::language::Field;
use crate::syntax::SyntaxKind;

use super::{NodeData, flags};

pub(super) fn assign_fields(parent: SyntaxKind, children: &[u32], nodes: &mut [NodeData]) {
    use SyntaxKind::*;

    let slots: Vec<usize> = children
        .iter()
        .map(|&id| id as usize)
        .filter(|&id| !nodes[id].has(flags::EXTRA))
        .collect();
    if slots.is_empty() {
        return;
    }

    match parent {
        BinaryExpression | CompareExpression | LogicalExpression | IntRangeExpression
        | AssignmentExpression => {
            positional(nodes, &slots, &[Field::Left, Field::Operator, Field::Right]);
        }
        UnaryExpression => positional(nodes, &slots, &[Field::Operator, Field::Operand]),
        ConditionalExpression => {
            at(nodes, &slots, 0, Field::Condition);
            at(nodes, &slots, 2, Field::Consequence);
            at(nodes, &slots, 4, Field::Alternative);
        }
        TypeCastExpression | InstanceofExpression => {
            at(nodes, &slots, 0, Field::Value);
            at(nodes, &slots, 2, Field::Type);
        }
        CallExpression => at(nodes, &slots, 0, Field::Function),
        MemberAccessExpression => {
            at(nodes, &slots, 0, Field::Object);
            at(nodes, &slots, 2, Field::Member);
        }
        MemberIndexExpression => {
            at(nodes, &slots, 0, Field::Object);
            at(nodes, &slots, 2, Field::Index);
        }
        MapEntry => {
            at(nodes, &slots, 0, Field::Key);
            at(nodes, &slots, 2, Field::Value);
        }
        ListType => at(nodes, &slots, 1, Field::Element),
        ArrayType => at(nodes, &slots, 0, Field::Element),
        MapType => {
            at(nodes, &slots, 0, Field::Value);
            at(nodes, &slots, 2, Field::Key);
        }
        IfStatement => {
            at(nodes, &slots, 1, Field::Condition);
            at(nodes, &slots, 2, Field::Consequence);
            after_marker(nodes, &slots, |marker, _| {
                (marker == Some(KwElse)).then_some(Field::Alternative)
            });
        }
        WhileStatement => {
            at(nodes, &slots, 1, Field::Condition);
            at(nodes, &slots, 2, Field::Body);
        }
        ReturnStatement => {
            if slots.get(1).is_some_and(|&id| nodes[id].kind != Semicolon) {
                at(nodes, &slots, 1, Field::Value);
            }
        }
        ForeachStatement => {
            let split = slots.iter().position(|&id| nodes[id].kind == KwIn);
            let names = split.unwrap_or(slots.len());
            for &id in &slots[..names] {
                if nodes[id].kind == SimpleName {
                    nodes[id].field = Some(Field::Variable);
                }
            }
            if let Some(split) = split {
                at(nodes, &slots, split + 1, Field::Iterable);
                at(nodes, &slots, split + 2, Field::Body);
            }
        }
        ImportDeclaration => after_marker(nodes, &slots, |marker, kind| match (marker, kind) {
            (Some(KwImport), QualifiedName) => Some(Field::Name),
            (Some(KwAs), _) => Some(Field::Alias),
            _ => None,
        }),
        FunctionDeclaration
        | ExpandFunctionDeclaration
        | FunctionExpression
        | ConstructorDeclaration
        | OperatorFunctionDeclaration => {
            after_marker(nodes, &slots, |marker, kind| match (marker, kind) {
                (_, ParameterList) => Some(Field::Parameters),
                (_, FunctionBody) => Some(Field::Body),
                (Some(KwFunction | Dollar), SimpleName) => Some(Field::Name),
                (Some(KwAs), _) => Some(Field::ReturnType),
                (Some(KwExpand), _) => Some(Field::Target),
                _ => None,
            });
        }
        ClassDeclaration => after_marker(nodes, &slots, |_, kind| match kind {
            ClassName => Some(Field::Name),
            QualifiedName => Some(Field::Superclass),
            ClassBody => Some(Field::Body),
            _ => None,
        }),
        FieldDeclaration | VariableDeclaration => {
            after_marker(nodes, &slots, |marker, kind| match (marker, kind) {
                (Some(KwVar | KwVal | KwStatic | KwGlobal), SimpleName) => Some(Field::Name),
                (Some(KwAs), _) => Some(Field::Type),
                (Some(Eq), _) => Some(Field::Value),
                _ => None,
            });
        }
        ParameterList => after_marker(nodes, &slots, |marker, kind| match (marker, kind) {
            (None | Some(Comma | Ellipsis), SimpleName) => Some(Field::Name),
            (Some(KwAs), _) => Some(Field::Type),
            (Some(Eq), _) => Some(Field::Value),
            _ => None,
        }),
        FunctionType => after_marker(nodes, &slots, |marker, _| {
            (marker == Some(ParenClose)).then_some(Field::ReturnType)
        }),
        _ => {}
    }
}

fn at(nodes: &mut [NodeData], slots: &[usize], index: usize, field: Field) {
    if let Some(&id) = slots.get(index) {
        nodes[id].field = Some(field);
    }
}

fn positional(nodes: &mut [NodeData], slots: &[usize], fields: &[Field]) {
    for (&id, &field) in slots.iter().zip(fields) {
        nodes[id].field = Some(field);
    }
}

/// Labels each child by the anonymous token right before it, if any.
fn after_marker(
    nodes: &mut [NodeData],
    slots: &[usize],
    rule: impl Fn(Option<SyntaxKind>, SyntaxKind) -> Option<Field>,
) {
    let mut marker = None;
    for &id in slots {
        let kind = nodes[id].kind;
        if let Some(field) = rule(marker, kind) {
            nodes[id].field = Some(field);
        }
        marker = (!nodes[id].has(flags::NAMED)).then_some(kind);
    }
}
