//! The ABAC condition language: dotted attribute lookup plus a small
//! operator grammar over untyped values.
//!
//! Conditions are plain strings like `resource.owner_id == subject.id` or
//! `subject.age >= 18`. Anything that cannot be parsed, resolved, or
//! type-checked evaluates to `false` — a broken condition can only ever
//! narrow access, never widen it.

use std::cmp::Ordering;
use warden_core::{AttrValue, Clock, Resource, Subject};

/// The entity an attribute lookup targets.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    /// The requesting subject.
    Subject(&'a Subject),
    /// The requested resource.
    Resource(&'a Resource),
}

/// Host-supplied attribute source.
///
/// When installed, attribute lookups delegate here instead of reading the
/// entity's fields and attribute bag directly — hosts use this to surface
/// attributes computed elsewhere (group membership services, derived flags).
pub trait AttributeProvider: Send + Sync {
    /// The value of `name` on `entity`, or `None` when absent.
    fn attribute(&self, entity: EntityRef<'_>, name: &str) -> Option<AttrValue>;
}

/// Everything a condition evaluation may consult.
pub struct ConditionContext<'a> {
    /// The requesting subject.
    pub subject: &'a Subject,
    /// The requested resource.
    pub resource: &'a Resource,
    /// Clock behind `request.time`.
    pub clock: &'a dyn Clock,
    /// Optional custom attribute source.
    pub provider: Option<&'a dyn AttributeProvider>,
}

/// Direct lookup: a known field name first, then the attribute bag.
fn entity_attribute(entity: EntityRef<'_>, name: &str) -> Option<AttrValue> {
    match entity {
        EntityRef::Subject(s) => match name {
            "id" => Some(AttrValue::from(s.id.as_str())),
            _ => s.attribute(name).cloned(),
        },
        EntityRef::Resource(r) => match name {
            "id" => Some(AttrValue::from(r.id.as_str())),
            "type" | "kind" => Some(AttrValue::from(r.kind.as_str())),
            _ => r.attribute(name).cloned(),
        },
    }
}

fn lookup(ctx: &ConditionContext<'_>, entity: EntityRef<'_>, name: &str) -> Option<AttrValue> {
    match ctx.provider {
        Some(provider) => provider.attribute(entity, name),
        None => entity_attribute(entity, name),
    }
}

/// Resolve one operand token to a value.
///
/// `subject.<attr>` and `resource.<attr>` read attributes; `request.time`
/// reads the clock (whole seconds); `true`/`false` are booleans; an
/// all-numeric token is an integer or float; anything else is a literal
/// string. Quoted literals are not part of the language.
fn resolve_operand(token: &str, ctx: &ConditionContext<'_>) -> Option<AttrValue> {
    if token.is_empty() {
        return None;
    }
    if let Some(attr) = token.strip_prefix("subject.") {
        return lookup(ctx, EntityRef::Subject(ctx.subject), attr);
    }
    if let Some(attr) = token.strip_prefix("resource.") {
        return lookup(ctx, EntityRef::Resource(ctx.resource), attr);
    }
    if token == "request.time" {
        return Some(AttrValue::Int(ctx.clock.now_secs() as i64));
    }
    match token {
        "true" => return Some(AttrValue::Bool(true)),
        "false" => return Some(AttrValue::Bool(false)),
        _ => {}
    }
    if let Ok(n) = token.parse::<i64>() {
        return Some(AttrValue::Int(n));
    }
    if let Ok(f) = token.parse::<f64>() {
        return Some(AttrValue::Float(f));
    }
    Some(AttrValue::from(token))
}

/// One operator the detector recognizes, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Ge,
    Le,
    Gt,
    Lt,
    Between,
    StartsWith,
    EndsWith,
    NotContains,
    Contains,
    NotIn,
    In,
    Eq,
    Ne,
}

/// Detection order matters: two-character comparisons precede their
/// one-character prefixes, and `not`-prefixed forms precede the bare forms
/// they contain.
const OPERATORS: &[(&str, Op)] = &[
    (">=", Op::Ge),
    ("<=", Op::Le),
    (">", Op::Gt),
    ("<", Op::Lt),
    (" between ", Op::Between),
    (" startsWith ", Op::StartsWith),
    (" endsWith ", Op::EndsWith),
    (" not contains ", Op::NotContains),
    (" contains ", Op::Contains),
    (" not in ", Op::NotIn),
    (" in ", Op::In),
    ("==", Op::Eq),
    ("!=", Op::Ne),
];

/// Evaluate a condition against the request.
///
/// Returns `false` for anything malformed: no recognized operator, an empty
/// operand, an unresolvable attribute, or type-incompatible operands.
pub fn evaluate_condition(condition: &str, ctx: &ConditionContext<'_>) -> bool {
    let condition = condition.trim();
    let Some(&(token, op)) = OPERATORS.iter().find(|(t, _)| condition.contains(t)) else {
        return false;
    };
    let Some((lhs, rhs)) = condition.split_once(token) else {
        return false;
    };
    let (lhs, rhs) = (lhs.trim(), rhs.trim());

    if op == Op::Between {
        return eval_between(lhs, rhs, ctx);
    }

    let Some(left) = resolve_operand(lhs, ctx) else {
        return false;
    };
    let Some(right) = resolve_operand(rhs, ctx) else {
        return false;
    };

    match op {
        Op::Ge => matches!(left.compare(&right), Some(Ordering::Greater | Ordering::Equal)),
        Op::Le => matches!(left.compare(&right), Some(Ordering::Less | Ordering::Equal)),
        Op::Gt => left.compare(&right) == Some(Ordering::Greater),
        Op::Lt => left.compare(&right) == Some(Ordering::Less),
        Op::StartsWith => match (left.as_str(), right.as_str()) {
            (Some(s), Some(prefix)) => s.starts_with(prefix),
            _ => false,
        },
        Op::EndsWith => match (left.as_str(), right.as_str()) {
            (Some(s), Some(suffix)) => s.ends_with(suffix),
            _ => false,
        },
        Op::Contains => left.contains(&right).unwrap_or(false),
        Op::NotContains => left.contains(&right).map(|found| !found).unwrap_or(false),
        Op::In => right.contains(&left).unwrap_or(false),
        Op::NotIn => right.contains(&left).map(|found| !found).unwrap_or(false),
        Op::Eq => left == right,
        Op::Ne => left != right,
        Op::Between => unreachable!("handled above"),
    }
}

fn eval_between(value_token: &str, bounds: &str, ctx: &ConditionContext<'_>) -> bool {
    let Some((min_token, max_token)) = bounds.split_once(" and ") else {
        return false;
    };
    let (min_token, max_token) = (min_token.trim(), max_token.trim());
    let (Some(value), Some(min), Some(max)) = (
        resolve_operand(value_token, ctx),
        resolve_operand(min_token, ctx),
        resolve_operand(max_token, ctx),
    ) else {
        return false;
    };
    matches!(min.compare(&value), Some(Ordering::Less | Ordering::Equal))
        && matches!(value.compare(&max), Some(Ordering::Less | Ordering::Equal))
}
