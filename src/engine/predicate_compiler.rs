use crate::engine::field_resolver::{self, FieldValue};
use crate::engine::scalar::Scalar;
use crate::utils::types::Record;

/// Comparison operators accepted after the `:` of a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

/// Operator prefixes, longest first so `>=` wins over `>`
const OPERATOR_PREFIXES: &[(&str, CompareOp)] = &[
    (">=", CompareOp::GreaterOrEqual),
    ("<=", CompareOp::LessOrEqual),
    ("!=", CompareOp::NotEquals),
    (">", CompareOp::GreaterThan),
    ("<", CompareOp::LessThan),
    ("==", CompareOp::Equals),
    ("=", CompareOp::Equals),
];

/// What a constraint tests
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// Inclusive `low..high`
    Range { low: Scalar, high: Scalar },
    /// Explicit operator
    Compare { op: CompareOp, operand: Scalar },
    /// No operator: substring for text operands, equality otherwise
    Match(Scalar),
}

/// One parsed `key:value` clause
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub target: String,
    pub kind: ConstraintKind,
}

/// Trait for compiling filter expressions into constraints
pub trait PredicateCompiler: Send + Sync {
    /// Parse a comma-separated `key:value` expression. Malformed clauses are dropped.
    fn compile(&self, expression: &str) -> Vec<Constraint>;
}

/// Default filter-expression compiler
#[derive(Debug, Default, Clone)]
pub struct DefaultPredicateCompiler;

impl DefaultPredicateCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Parse a single clause
    pub fn compile_clause(&self, clause: &str) -> Option<Constraint> {
        let (key, raw) = clause.split_once(':')?;
        let target = key.trim().to_string();
        let raw = raw.trim();

        if let Some((low, high)) = raw.split_once("..") {
            return Some(Constraint {
                target,
                kind: ConstraintKind::Range {
                    low: Scalar::coerce(low.trim()),
                    high: Scalar::coerce(high.trim()),
                },
            });
        }

        for (prefix, op) in OPERATOR_PREFIXES {
            if let Some(operand) = raw.strip_prefix(prefix) {
                return Some(Constraint {
                    target,
                    kind: ConstraintKind::Compare {
                        op: *op,
                        operand: Scalar::coerce(operand.trim()),
                    },
                });
            }
        }

        Some(Constraint {
            target,
            kind: ConstraintKind::Match(Scalar::coerce(raw)),
        })
    }
}

impl PredicateCompiler for DefaultPredicateCompiler {
    fn compile(&self, expression: &str) -> Vec<Constraint> {
        expression
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .filter_map(|clause| {
                let constraint = self.compile_clause(clause);
                if constraint.is_none() {
                    tracing::warn!(clause, "filter clause has no ':', dropping");
                }
                constraint
            })
            .collect()
    }
}

impl CompareOp {
    fn holds(self, target: &Scalar, operand: &Scalar) -> bool {
        use std::cmp::Ordering::*;

        match self {
            CompareOp::Equals => target.equals(operand),
            CompareOp::NotEquals => !target.equals(operand),
            ordering => match (ordering, target.compare(operand)) {
                (CompareOp::GreaterThan, Some(o)) => o == Greater,
                (CompareOp::GreaterOrEqual, Some(o)) => o != Less,
                (CompareOp::LessThan, Some(o)) => o == Less,
                (CompareOp::LessOrEqual, Some(o)) => o != Greater,
                _ => false,
            },
        }
    }

    /// Case-insensitive text comparison; ordering operators never hold on text
    fn holds_on_text(self, target: &str, operand: &str) -> bool {
        match self {
            CompareOp::Equals => target.to_lowercase() == operand.to_lowercase(),
            CompareOp::NotEquals => target.to_lowercase() != operand.to_lowercase(),
            _ => false,
        }
    }
}

impl Constraint {
    /// Evaluate against a record. Unresolvable or mismatched targets fail.
    pub fn matches(&self, record: &Record) -> bool {
        let target = field_resolver::resolve(record, &self.target);
        self.matches_value(target)
    }

    /// Evaluate against an already-resolved target value
    pub fn matches_value(&self, target: Option<FieldValue<'_>>) -> bool {
        let coerced = target.map(Scalar::from_field);

        match &self.kind {
            ConstraintKind::Range { low, high } => match coerced {
                Some(t) if t.is_ordered() && low.same_kind(&t) && high.same_kind(&t) => {
                    CompareOp::GreaterOrEqual.holds(&t, low) && CompareOp::LessOrEqual.holds(&t, high)
                }
                _ => false,
            },
            ConstraintKind::Compare { op, operand } => match coerced {
                Some(t) if t.is_ordered() && operand.is_ordered() => op.holds(&t, operand),
                _ => {
                    let text = target.map(|v| v.to_text()).unwrap_or_default();
                    op.holds_on_text(&text, &operand.to_string())
                }
            },
            ConstraintKind::Match(operand) if operand.is_ordered() => {
                coerced.map(|t| t.equals(operand)).unwrap_or(false)
            }
            ConstraintKind::Match(operand) => match target {
                Some(value) => value
                    .to_text()
                    .to_lowercase()
                    .contains(&operand.to_string().to_lowercase()),
                None => false,
            },
        }
    }
}
