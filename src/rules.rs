//! Declarative transaction rules.
//!
//! A rule pairs an ordered list of conditions with an ordered list of
//! actions. Conditions are predicates over transaction fields, combined
//! with "all" (AND) or "any" (OR); on a match every action writes its
//! value into the named field. Conditions and actions round-trip
//! losslessly through a JSON representation
//! (`{"field": ..., "op": ..., "type": ..., "value": ...}`) which is what
//! the `rules` table persists.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use model::entities::{rule, transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Window, in days and inclusive, that `isapprox` treats as equal around
/// a date condition: a condition on 2024-01-02 matches 2024-01-04.
pub const APPROX_DATE_TOLERANCE_DAYS: i64 = 2;

/// Relative tolerance that `isapprox` allows around an amount
/// condition: ±7.5%.
pub const APPROX_AMOUNT_TOLERANCE_RATIO: Decimal = Decimal::from_parts(75, 0, 0, false, 3);

/// Transaction field a condition can inspect or an action can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleField {
    Date,
    Account,
    Payee,
    Category,
    Notes,
    Amount,
    Cleared,
}

impl RuleField {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleField::Date => "date",
            RuleField::Account => "account",
            RuleField::Payee => "payee",
            RuleField::Category => "category",
            RuleField::Notes => "notes",
            RuleField::Amount => "amount",
            RuleField::Cleared => "cleared",
        }
    }

    /// The value kind this field carries. Reference fields (account,
    /// payee, category) carry numeric row ids.
    pub fn kind(self) -> ValueKind {
        match self {
            RuleField::Date => ValueKind::Date,
            RuleField::Notes => ValueKind::String,
            RuleField::Cleared => ValueKind::Boolean,
            RuleField::Amount | RuleField::Account | RuleField::Payee | RuleField::Category => {
                ValueKind::Number
            }
        }
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of value kinds in the declarative representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Boolean,
    Date,
    String,
    Number,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::String => "string",
            ValueKind::Number => "number",
        }
    }
}

/// A typed condition/action value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Date(NaiveDate),
    String(String),
    Number(Decimal),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Date(_) => ValueKind::Date,
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
        }
    }

    /// Encodes the value into its kind-appropriate JSON literal: dates
    /// become ISO-8601 strings, the rest map to the matching JSON type.
    pub fn encode(&self) -> serde_json::Value {
        match self {
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => n
                .to_string()
                .parse::<serde_json::Value>()
                .unwrap_or_else(|_| serde_json::Value::String(n.to_string())),
        }
    }

    /// Decodes a JSON literal back into a typed value. Booleans also
    /// accept the 0/1 integer encoding used by older rule payloads.
    pub fn decode(kind: ValueKind, raw: &serde_json::Value) -> Result<Value> {
        let invalid = || LedgerError::InvalidRuleValue(format!("{} is not a {}", raw, kind.as_str()));
        match kind {
            ValueKind::Boolean => match raw {
                serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(0) => Ok(Value::Boolean(false)),
                    Some(1) => Ok(Value::Boolean(true)),
                    _ => Err(invalid()),
                },
                _ => Err(invalid()),
            },
            ValueKind::Date => raw
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .map(Value::Date)
                .ok_or_else(invalid),
            ValueKind::String => raw
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(invalid),
            ValueKind::Number => match raw {
                serde_json::Value::Number(n) => {
                    n.to_string().parse::<Decimal>().map(Value::Number).map_err(|_| invalid())
                }
                serde_json::Value::String(s) => {
                    s.parse::<Decimal>().map(Value::Number).map_err(|_| invalid())
                }
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Booleans render capitalized in rule descriptions
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOp {
    Is,
    IsApprox,
    Contains,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ConditionOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionOp::Is => "is",
            ConditionOp::IsApprox => "isapprox",
            ConditionOp::Contains => "contains",
            ConditionOp::Gt => "gt",
            ConditionOp::Gte => "gte",
            ConditionOp::Lt => "lt",
            ConditionOp::Lte => "lte",
        }
    }
}

impl fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single predicate over a transaction field.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: RuleField,
    pub op: ConditionOp,
    pub value: Value,
}

/// Wire shape shared by conditions and actions.
#[derive(Serialize, Deserialize)]
struct FieldOpRepr<Op> {
    field: RuleField,
    op: Op,
    #[serde(rename = "type")]
    kind: ValueKind,
    value: serde_json::Value,
}

impl Condition {
    pub fn new(field: RuleField, op: ConditionOp, value: Value) -> Self {
        Self { field, op, value }
    }

    /// Whether the transaction satisfies this condition. A transaction
    /// without a value for the field (e.g. no payee) never matches.
    pub fn matches(&self, tx: &transaction::Model) -> bool {
        let Some(actual) = field_value(self.field, tx) else {
            return false;
        };
        match self.op {
            ConditionOp::Is => actual == self.value,
            ConditionOp::IsApprox => approx_eq(&actual, &self.value),
            ConditionOp::Contains => match (&actual, &self.value) {
                (Value::String(haystack), Value::String(needle)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
            ConditionOp::Gt => compare(&actual, &self.value) == Some(Ordering::Greater),
            ConditionOp::Gte => matches!(
                compare(&actual, &self.value),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            ConditionOp::Lt => compare(&actual, &self.value) == Some(Ordering::Less),
            ConditionOp::Lte => matches!(
                compare(&actual, &self.value),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FieldOpRepr {
            field: self.field,
            op: self.op,
            kind: self.value.kind(),
            value: self.value.encode(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = FieldOpRepr::<ConditionOp>::deserialize(deserializer)?;
        let value = Value::decode(repr.kind, &repr.value).map_err(serde::de::Error::custom)?;
        Ok(Condition {
            field: repr.field,
            op: repr.op,
            value,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' {} '{}'", self.field, self.op, self.value)
    }
}

/// Operation of an action. Only field assignment is modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionOp {
    Set,
}

/// A field assignment applied to matching transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub field: RuleField,
    pub op: ActionOp,
    pub value: Value,
}

impl Action {
    /// Action assigning `value` to `field`.
    pub fn set(field: RuleField, value: Value) -> Self {
        Self {
            field,
            op: ActionOp::Set,
            value,
        }
    }

    /// Writes the action's value into the active model. The value kind
    /// must match the field.
    pub fn apply_to(&self, tx: &mut transaction::ActiveModel) -> Result<()> {
        match (self.field, &self.value) {
            (RuleField::Date, Value::Date(d)) => tx.date = Set(*d),
            (RuleField::Account, Value::Number(n)) => tx.account_id = Set(decode_id(n)?),
            (RuleField::Payee, Value::Number(n)) => tx.payee_id = Set(Some(decode_id(n)?)),
            (RuleField::Category, Value::Number(n)) => tx.category_id = Set(Some(decode_id(n)?)),
            (RuleField::Notes, Value::String(s)) => tx.notes = Set(Some(s.clone())),
            (RuleField::Amount, Value::Number(n)) => tx.amount = Set(*n),
            (RuleField::Cleared, Value::Boolean(b)) => tx.cleared = Set(*b),
            (field, value) => {
                return Err(LedgerError::RuleValueMismatch {
                    field: field.as_str(),
                    kind: value.kind().as_str(),
                })
            }
        }
        Ok(())
    }
}

impl Serialize for Action {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FieldOpRepr {
            field: self.field,
            op: self.op,
            kind: self.value.kind(),
            value: self.value.encode(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = FieldOpRepr::<ActionOp>::deserialize(deserializer)?;
        let value = Value::decode(repr.kind, &repr.value).map_err(serde::de::Error::custom)?;
        Ok(Action {
            field: repr.field,
            op: repr.op,
            value,
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set '{}' to '{}'", self.field, self.value)
    }
}

/// How a rule combines its condition verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionsOp {
    #[default]
    All,
    Any,
}

impl ConditionsOp {
    /// Rendered form used in rule descriptions.
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionsOp::All => "all",
            ConditionsOp::Any => "any",
        }
    }

    /// Database encoding.
    pub fn as_db_str(self) -> &'static str {
        match self {
            ConditionsOp::All => "and",
            ConditionsOp::Any => "or",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "and" => Some(ConditionsOp::All),
            "or" => Some(ConditionsOp::Any),
            _ => None,
        }
    }
}

impl fmt::Display for ConditionsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run stage of a rule. Unstaged rules run between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStage {
    Pre,
    Post,
}

impl RuleStage {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleStage::Pre => "pre",
            RuleStage::Post => "post",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre" => Some(RuleStage::Pre),
            "post" => Some(RuleStage::Post),
            _ => None,
        }
    }
}

fn stage_order(stage: Option<RuleStage>) -> u8 {
    match stage {
        Some(RuleStage::Pre) => 0,
        None => 1,
        Some(RuleStage::Post) => 2,
    }
}

/// A declarative categorization rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub conditions: Vec<Condition>,
    pub operation: ConditionsOp,
    pub actions: Vec<Action>,
    pub stage: Option<RuleStage>,
}

impl Rule {
    pub fn new(
        conditions: Vec<Condition>,
        operation: ConditionsOp,
        actions: Vec<Action>,
        stage: Option<RuleStage>,
    ) -> Self {
        Self {
            conditions,
            operation,
            actions,
            stage,
        }
    }

    /// Rebuilds the typed rule from a persisted row.
    pub fn from_model(model: &rule::Model) -> Result<Self> {
        let conditions: Vec<Condition> = serde_json::from_str(&model.conditions)?;
        let actions: Vec<Action> = serde_json::from_str(&model.actions)?;
        let operation = ConditionsOp::from_db_str(&model.conditions_op).ok_or_else(|| {
            LedgerError::InvalidRuleValue(format!(
                "unknown conditions_op '{}'",
                model.conditions_op
            ))
        })?;
        let stage = match model.stage.as_deref() {
            None => None,
            Some(s) => Some(RuleStage::parse(s).ok_or_else(|| {
                LedgerError::InvalidRuleValue(format!("unknown stage '{}'", s))
            })?),
        };
        Ok(Rule {
            conditions,
            operation,
            actions,
            stage,
        })
    }

    /// Whether the transaction satisfies the rule's conditions.
    pub fn matches(&self, tx: &transaction::Model) -> bool {
        match self.operation {
            ConditionsOp::All => self.conditions.iter().all(|c| c.matches(tx)),
            ConditionsOp::Any => self.conditions.iter().any(|c| c.matches(tx)),
        }
    }

    /// Applies every action to the transaction and returns the mutated
    /// active model, ready to be saved by the caller.
    pub fn apply(&self, tx: &transaction::Model) -> Result<transaction::ActiveModel> {
        let mut active: transaction::ActiveModel = tx.clone().into();
        for action in &self.actions {
            action.apply_to(&mut active)?;
        }
        Ok(active)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conditions = self
            .conditions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let actions = self
            .actions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "If {} of these conditions match {} then {}",
            self.operation, conditions, actions
        )
    }
}

/// The rules of a ledger, ordered by stage (pre, unstaged, post).
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Builds a rule set, stably sorting the rules into stage order.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by_key(|r| stage_order(r.stage));
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        f.write_str(&lines)
    }
}

/// Reads a transaction field as a typed value. Unset optional fields
/// yield `None`.
fn field_value(field: RuleField, tx: &transaction::Model) -> Option<Value> {
    match field {
        RuleField::Date => Some(Value::Date(tx.date)),
        RuleField::Account => Some(Value::Number(Decimal::from(tx.account_id))),
        RuleField::Payee => tx.payee_id.map(|id| Value::Number(Decimal::from(id))),
        RuleField::Category => tx.category_id.map(|id| Value::Number(Decimal::from(id))),
        RuleField::Notes => tx.notes.clone().map(Value::String),
        RuleField::Amount => Some(Value::Number(tx.amount)),
        RuleField::Cleared => Some(Value::Boolean(tx.cleared)),
    }
}

fn approx_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Date(a), Value::Date(b)) => {
            a.signed_duration_since(*b).num_days().abs() <= APPROX_DATE_TOLERANCE_DAYS
        }
        (Value::Number(a), Value::Number(b)) => {
            let tolerance = (*b * APPROX_AMOUNT_TOLERANCE_RATIO).abs();
            (*a - *b).abs() <= tolerance
        }
        _ => actual == expected,
    }
}

fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn decode_id(n: &Decimal) -> Result<i32> {
    n.to_i32()
        .ok_or_else(|| LedgerError::InvalidRuleValue(format!("{} is not a row id", n)))
}
