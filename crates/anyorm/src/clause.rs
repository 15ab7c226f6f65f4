//! Clause containers: sub-expressions, AND/OR groups, and the open/close
//! grouping stack.
//!
//! These types only *store* structure. Leaf rendering (identifier and value
//! quoting) is injected by the compiler as a closure, so the same group
//! machinery serves WHERE, HAVING, and JOIN-ON clauses with different
//! quoting rules.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// Boolean joiner between two items of a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// Sort direction for ORDER BY entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDir::Asc => "ASC",
            OrderDir::Desc => "DESC",
        }
    }
}

/// A single (column, operator, value) predicate.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SubExpr {
    pub column: String,
    pub op: String,
    pub value: Value,
}

/// An ORDER BY entry: column plus optional direction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OrderExpr {
    pub column: String,
    pub dir: Option<OrderDir>,
}

/// One item of a [`ClauseGroup`], tagged with the connector joining it to
/// the previous item. The first rendered item's connector is not emitted.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ClauseItem {
    Expr {
        connector: Connector,
        expr: SubExpr,
    },
    Group {
        connector: Connector,
        group: ClauseGroup,
    },
}

/// An ordered sequence of predicates and nested groups. A nested group
/// renders as a parenthesized unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ClauseGroup {
    pub items: Vec<ClauseItem>,
}

impl ClauseGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the group contains no leaf predicate at any depth.
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|item| match item {
            ClauseItem::Expr { .. } => false,
            ClauseItem::Group { group, .. } => group.is_empty(),
        })
    }

    pub fn push_expr(&mut self, expr: SubExpr, connector: Connector) {
        self.items.push(ClauseItem::Expr { connector, expr });
    }

    pub fn push_group(&mut self, group: ClauseGroup, connector: Connector) {
        self.items.push(ClauseItem::Group { connector, group });
    }

    /// Render the group with `leaf` producing the text of each predicate.
    /// Empty nested groups are skipped; connector placement mirrors item
    /// order.
    pub fn render(
        &self,
        leaf: &mut dyn FnMut(&SubExpr) -> OrmResult<String>,
    ) -> OrmResult<String> {
        let mut out = String::new();
        for item in &self.items {
            let (connector, rendered) = match item {
                ClauseItem::Expr { connector, expr } => (*connector, leaf(expr)?),
                ClauseItem::Group { connector, group } => {
                    if group.is_empty() {
                        continue;
                    }
                    (*connector, format!("({})", group.render(leaf)?))
                }
            };
            if !out.is_empty() {
                out.push(' ');
                out.push_str(connector.as_sql());
                out.push(' ');
            }
            out.push_str(&rendered);
        }
        Ok(out)
    }
}

/// A condition clause (WHERE or HAVING): a root group plus the stack of
/// currently open nested groups.
///
/// `close()` on an empty stack is recorded rather than raised, because the
/// fluent mutators are infallible; `validate()` surfaces it (and any
/// leftover opens) when the builder compiles.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ConditionClause {
    root: ClauseGroup,
    open: Vec<(Connector, ClauseGroup)>,
    underflow: bool,
}

impl ConditionClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.open.iter().all(|(_, g)| g.is_empty())
    }

    /// Append a predicate to the innermost open group, or to the root when
    /// no group is open.
    pub fn add(&mut self, expr: SubExpr, connector: Connector) {
        match self.open.last_mut() {
            Some((_, group)) => group.push_expr(expr, connector),
            None => self.root.push_expr(expr, connector),
        }
    }

    /// Open a nested group joined to its surroundings by `connector`.
    pub fn open(&mut self, connector: Connector) {
        self.open.push((connector, ClauseGroup::new()));
    }

    /// Close the innermost open group, appending it to its parent as a
    /// single parenthesized item.
    pub fn close(&mut self) {
        match self.open.pop() {
            Some((connector, group)) => match self.open.last_mut() {
                Some((_, parent)) => parent.push_group(group, connector),
                None => self.root.push_group(group, connector),
            },
            None => self.underflow = true,
        }
    }

    /// Check open/close balance. Called by the compiler before rendering.
    pub fn validate(&self, clause: &str) -> OrmResult<()> {
        if self.underflow {
            return Err(OrmError::unbalanced_group(format!(
                "{clause} close() without a matching open()"
            )));
        }
        if !self.open.is_empty() {
            return Err(OrmError::unbalanced_group(format!(
                "{clause} has {} unclosed group(s)",
                self.open.len()
            )));
        }
        Ok(())
    }

    /// Render the root group. Only valid after [`ConditionClause::validate`].
    pub fn render(
        &self,
        leaf: &mut dyn FnMut(&SubExpr) -> OrmResult<String>,
    ) -> OrmResult<String> {
        self.root.render(leaf)
    }

    pub fn clear(&mut self) {
        self.root = ClauseGroup::new();
        self.open.clear();
        self.underflow = false;
    }
}

/// Canonical operator list accepted by predicate mutators.
const OPERATORS: &[&str] = &[
    "=",
    "!=",
    "<>",
    "<",
    "<=",
    ">",
    ">=",
    "LIKE",
    "NOT LIKE",
    "ILIKE",
    "NOT ILIKE",
    "IN",
    "NOT IN",
    "IS",
    "IS NOT",
    "BETWEEN",
    "NOT BETWEEN",
];

/// Validate and canonicalize an operator against its value.
///
/// Rewrites `=` / `!=` on a NULL value into `IS` / `IS NOT`, and rejects
/// empty `IN` collections right here, at the fluent call site.
pub(crate) fn prepare_operator(column: &str, op: &str, value: &Value) -> OrmResult<String> {
    let canonical: String = op
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    if !OPERATORS.contains(&canonical.as_str()) {
        return Err(OrmError::invalid_predicate(format!(
            "unsupported operator {op:?} in predicate on {column:?}"
        )));
    }

    if value.is_null() {
        if canonical == "=" {
            return Ok("IS".to_string());
        }
        if canonical == "!=" || canonical == "<>" {
            return Ok("IS NOT".to_string());
        }
    }

    if canonical == "BETWEEN" || canonical == "NOT BETWEEN" {
        let ok = matches!(value, Value::Array(items) if items.len() == 2);
        if !ok {
            return Err(OrmError::invalid_predicate(format!(
                "{canonical} predicate on {column:?} requires exactly two values"
            )));
        }
    }

    if canonical == "IN" || canonical == "NOT IN" {
        let empty = match value {
            Value::Array(items) => items.is_empty(),
            Value::Null => true,
            // Sub-queries and raw expressions are legitimate IN operands.
            _ => false,
        };
        if empty {
            return Err(OrmError::invalid_predicate(format!(
                "empty collection for {canonical} predicate on {column:?}"
            )));
        }
    }

    Ok(canonical)
}
