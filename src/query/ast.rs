//! Abstract syntax tree for the catalog statement dialect.
//!
//! Statements are built either fluently (engine paths, see
//! [`builder`](super::builder)) or by parsing caller text (raw gateway, see
//! [`parser`](super::parser)); both feed the same executor.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::Value;

/// A complete statement: clauses in source order, `RETURN` last when
/// present.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statement {
    /// Clauses in the order they execute.
    pub clauses: Vec<Clause>,
}

impl Statement {
    /// True when any clause mutates the graph. Drives lock acquisition and
    /// snapshot persistence in the driver.
    pub fn is_write(&self) -> bool {
        self.clauses.iter().any(|c| {
            matches!(
                c,
                Clause::Merge(_)
                    | Clause::SetMerge { .. }
                    | Clause::SetProperty { .. }
                    | Clause::Delete { .. }
            )
        })
    }

    /// True when the statement ends in a `RETURN` clause, i.e. executing it
    /// yields rows rather than a write summary.
    pub fn returns_rows(&self) -> bool {
        matches!(self.clauses.last(), Some(Clause::Return(_)))
    }

    /// Names of every `$parameter` the statement references, in any clause.
    /// The executor checks these against the supplied parameters before
    /// running anything, so a missing parameter fails the statement even
    /// when its patterns would match nothing.
    pub fn referenced_params(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for clause in &self.clauses {
            match clause {
                Clause::Match {
                    pattern, filter, ..
                } => {
                    pattern_params(pattern, &mut names);
                    if let Some(filter) = filter {
                        filter.collect_params(&mut names);
                    }
                }
                Clause::With { filter, .. } => {
                    if let Some(filter) = filter {
                        filter.collect_params(&mut names);
                    }
                }
                Clause::Merge(pattern) => pattern_params(pattern, &mut names),
                Clause::SetMerge { value, .. } | Clause::SetProperty { value, .. } => {
                    value.collect_params(&mut names);
                }
                Clause::Delete { .. } => {}
                Clause::Return(ret) => {
                    for item in &ret.items {
                        item.expr.collect_params(&mut names);
                    }
                    for key in &ret.order_by {
                        key.expr.collect_params(&mut names);
                    }
                }
            }
        }
        names
    }
}

fn pattern_params(pattern: &PathPattern, out: &mut BTreeSet<String>) {
    for (_, expr) in &pattern.start.props {
        expr.collect_params(out);
    }
    for (_, node) in &pattern.hops {
        for (_, expr) in &node.props {
            expr.collect_params(out);
        }
    }
}

/// One clause of a statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// `MATCH` / `OPTIONAL MATCH` with an optional attached `WHERE`.
    Match {
        /// `OPTIONAL MATCH` keeps unmatched rows with null bindings.
        optional: bool,
        /// The path pattern to match.
        pattern: PathPattern,
        /// Predicate applied to each candidate binding of this match.
        filter: Option<Expr>,
    },
    /// `WITH var, ...` narrows the bindings carried forward.
    With {
        /// Variables to keep.
        vars: Vec<String>,
        /// Optional attached `WHERE`.
        filter: Option<Expr>,
    },
    /// `MERGE` a node pattern, or a single-hop relationship pattern whose
    /// endpoints are already bound.
    Merge(PathPattern),
    /// `SET var += expr` where the expression evaluates to a map.
    SetMerge {
        /// Node variable to update.
        var: String,
        /// Map-valued expression (usually a parameter).
        value: Expr,
    },
    /// `SET var.key = expr`.
    SetProperty {
        /// Node variable to update.
        var: String,
        /// Property key.
        key: String,
        /// New value; null removes the key.
        value: Expr,
    },
    /// `DELETE` / `DETACH DELETE` of bound variables.
    Delete {
        /// Whether incident relationships are removed too.
        detach: bool,
        /// Variables naming the nodes or relationships to delete.
        vars: Vec<String>,
    },
    /// Final projection.
    Return(ReturnClause),
}

/// The projection part of a statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReturnClause {
    /// `RETURN DISTINCT` deduplicates output rows.
    pub distinct: bool,
    /// Projection items in output-column order.
    pub items: Vec<Projection>,
    /// Sort keys applied to the projected rows.
    pub order_by: Vec<OrderKey>,
    /// Row cap applied after sorting.
    pub limit: Option<u64>,
}

/// A single projected expression with an optional alias.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    /// Expression to evaluate per row (or per group when aggregating).
    pub expr: Expr,
    /// `AS alias`; when absent the column is named after the expression.
    pub alias: Option<String>,
}

impl Projection {
    /// Output column name for this item.
    pub fn name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.expr.to_string(),
        }
    }
}

/// One `ORDER BY` key. Keys are resolved against the projected row, so they
/// reference output column names.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderKey {
    /// Expression over the projected columns (typically a bare column name).
    pub expr: Expr,
    /// `DESC` when true.
    pub descending: bool,
}

/// A linear path: a start node and zero or more relationship hops.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPattern {
    /// Pattern for the first node.
    pub start: NodePattern,
    /// Relationship hops, each landing on another node pattern.
    pub hops: Vec<(RelPattern, NodePattern)>,
}

impl PathPattern {
    /// A single-node path.
    pub fn node(start: NodePattern) -> Self {
        Self {
            start,
            hops: Vec::new(),
        }
    }

    /// Appends an outgoing hop `-[:TYPE]->(node)`.
    pub fn out(mut self, type_name: impl Into<String>, node: NodePattern) -> Self {
        self.hops.push((RelPattern::out(type_name), node));
        self
    }

    /// Appends an incoming hop `<-[:TYPE]-(node)`.
    pub fn incoming(mut self, type_name: impl Into<String>, node: NodePattern) -> Self {
        self.hops.push((RelPattern::incoming(type_name), node));
        self
    }
}

/// A node pattern `(var:Label {key: expr, ...})`; every part is optional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePattern {
    /// Binding variable.
    pub var: Option<String>,
    /// Label filter; `None` matches any label.
    pub label: Option<String>,
    /// Property equality constraints, evaluated before matching.
    pub props: Vec<(String, Expr)>,
}

impl NodePattern {
    /// An anonymous, unlabeled pattern.
    pub fn any() -> Self {
        Self::default()
    }

    /// A named pattern without a label.
    pub fn var(var: impl Into<String>) -> Self {
        Self {
            var: Some(var.into()),
            ..Self::default()
        }
    }

    /// A named, labeled pattern.
    pub fn labeled(var: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            var: Some(var.into()),
            label: Some(label.into()),
            props: Vec::new(),
        }
    }

    /// Adds a property equality constraint.
    pub fn prop(mut self, key: impl Into<String>, value: Expr) -> Self {
        self.props.push((key.into(), value));
        self
    }
}

/// A relationship pattern with direction relative to the preceding node.
#[derive(Clone, Debug, PartialEq)]
pub struct RelPattern {
    /// Binding variable, rarely used by the catalog.
    pub var: Option<String>,
    /// Relationship type filter; `None` matches any type.
    pub type_name: Option<String>,
    /// Traversal direction.
    pub direction: Direction,
}

impl RelPattern {
    /// `-[:TYPE]->`
    pub fn out(type_name: impl Into<String>) -> Self {
        Self {
            var: None,
            type_name: Some(type_name.into()),
            direction: Direction::Out,
        }
    }

    /// `<-[:TYPE]-`
    pub fn incoming(type_name: impl Into<String>) -> Self {
        Self {
            var: None,
            type_name: Some(type_name.into()),
            direction: Direction::In,
        }
    }
}

/// Direction of a relationship hop, read left to right.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// The edge leaves the preceding node.
    Out,
    /// The edge arrives at the preceding node.
    In,
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CmpOp {
    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Expressions over bindings, parameters, and literals.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Literal value.
    Literal(Value),
    /// Named parameter `$name`.
    Param(String),
    /// Bare variable reference.
    Var(String),
    /// Property access `var.key`.
    Property(String, String),
    /// `toLower(expr)`.
    Lower(Box<Expr>),
    /// `toUpper(expr)`.
    Upper(Box<Expr>),
    /// Binary comparison.
    Cmp {
        /// Operator.
        op: CmpOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// `lhs CONTAINS rhs` (string containment).
    Contains(Box<Expr>, Box<Expr>),
    /// `expr IS NULL` / `expr IS NOT NULL`.
    IsNull {
        /// Tested expression.
        expr: Box<Expr>,
        /// True for `IS NOT NULL`.
        negated: bool,
    },
    /// Logical conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Logical disjunction.
    Or(Box<Expr>, Box<Expr>),
    /// Logical negation.
    Not(Box<Expr>),
    /// `count(*)`.
    CountStar,
    /// `count([DISTINCT] expr)`; counts non-null values.
    Count {
        /// Count only distinct values.
        distinct: bool,
        /// Counted expression.
        expr: Box<Expr>,
    },
    /// `collect([DISTINCT] expr)`; gathers non-null values into a list.
    Collect {
        /// Deduplicate while preserving first-seen order.
        distinct: bool,
        /// Collected expression.
        expr: Box<Expr>,
    },
}

impl Expr {
    /// True when this expression is (or contains) an aggregate. A `RETURN`
    /// with any aggregate item groups by its non-aggregate items.
    pub fn has_aggregate(&self) -> bool {
        match self {
            Expr::CountStar | Expr::Count { .. } | Expr::Collect { .. } => true,
            Expr::Lower(e) | Expr::Upper(e) | Expr::Not(e) => e.has_aggregate(),
            Expr::Cmp { lhs, rhs, .. }
            | Expr::Contains(lhs, rhs)
            | Expr::And(lhs, rhs)
            | Expr::Or(lhs, rhs) => lhs.has_aggregate() || rhs.has_aggregate(),
            Expr::IsNull { expr, .. } => expr.has_aggregate(),
            Expr::Literal(_) | Expr::Param(_) | Expr::Var(_) | Expr::Property(_, _) => false,
        }
    }

    /// Boolean AND helper for builder call sites.
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    /// `CONTAINS` helper.
    pub fn contains(self, other: Expr) -> Expr {
        Expr::Contains(Box::new(self), Box::new(other))
    }

    /// `toLower(..)` helper.
    pub fn lower(self) -> Expr {
        Expr::Lower(Box::new(self))
    }

    /// Equality helper.
    pub fn eq(self, other: Expr) -> Expr {
        Expr::Cmp {
            op: CmpOp::Eq,
            lhs: Box::new(self),
            rhs: Box::new(other),
        }
    }

    fn collect_params(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Param(name) => {
                out.insert(name.clone());
            }
            Expr::Lower(e) | Expr::Upper(e) | Expr::Not(e) => e.collect_params(out),
            Expr::Cmp { lhs, rhs, .. }
            | Expr::Contains(lhs, rhs)
            | Expr::And(lhs, rhs)
            | Expr::Or(lhs, rhs) => {
                lhs.collect_params(out);
                rhs.collect_params(out);
            }
            Expr::IsNull { expr, .. }
            | Expr::Count { expr, .. }
            | Expr::Collect { expr, .. } => expr.collect_params(out),
            Expr::Literal(_) | Expr::Var(_) | Expr::Property(_, _) | Expr::CountStar => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Param(name) => write!(f, "${name}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Property(var, key) => write!(f, "{var}.{key}"),
            Expr::Lower(e) => write!(f, "toLower({e})"),
            Expr::Upper(e) => write!(f, "toUpper({e})"),
            Expr::Cmp { op, lhs, rhs } => write!(f, "{lhs} {} {rhs}", op.symbol()),
            Expr::Contains(lhs, rhs) => write!(f, "{lhs} CONTAINS {rhs}"),
            Expr::IsNull { expr, negated } => {
                write!(f, "{expr} IS {}NULL", if *negated { "NOT " } else { "" })
            }
            Expr::And(lhs, rhs) => write!(f, "{lhs} AND {rhs}"),
            Expr::Or(lhs, rhs) => write!(f, "{lhs} OR {rhs}"),
            Expr::Not(e) => write!(f, "NOT {e}"),
            Expr::CountStar => write!(f, "count(*)"),
            Expr::Count { distinct, expr } => {
                write!(f, "count({}{expr})", if *distinct { "DISTINCT " } else { "" })
            }
            Expr::Collect { distinct, expr } => {
                write!(f, "collect({}{expr})", if *distinct { "DISTINCT " } else { "" })
            }
        }
    }
}

/// Shorthand for [`Expr::Param`].
pub fn param(name: impl Into<String>) -> Expr {
    Expr::Param(name.into())
}

/// Shorthand for [`Expr::Property`].
pub fn prop(var: impl Into<String>, key: impl Into<String>) -> Expr {
    Expr::Property(var.into(), key.into())
}

/// Shorthand for [`Expr::Var`].
pub fn var(name: impl Into<String>) -> Expr {
    Expr::Var(name.into())
}

/// Shorthand for [`Expr::Literal`].
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}
