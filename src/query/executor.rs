//! Statement executor: interprets an AST against a [`GraphStore`].
//!
//! Execution is a clause pipeline over binding environments. Each clause
//! transforms a set of environments (variable to node/edge/value bindings);
//! `RETURN` projects the surviving environments into rows, applying
//! Cypher-style implicit grouping when any projection item aggregates.

use std::collections::BTreeMap;

use crate::error::{CatalogError, Result};
use crate::model::{EdgeId, Node, NodeId, Params, Value};
use crate::query::ast::{
    Clause, CmpOp, Direction, Expr, NodePattern, PathPattern, Projection, ReturnClause, Statement,
};
use crate::query::{QueryOutcome, Row, WriteSummary};
use crate::store::GraphStore;

/// Store access handed to the executor. Read statements run against a shared
/// borrow; a write clause reached through [`StoreAccess::Read`] is an
/// execution error (the driver routes write statements through
/// [`StoreAccess::Write`] before calling in).
pub enum StoreAccess<'a> {
    /// Shared access for read-only statements.
    Read(&'a GraphStore),
    /// Exclusive access for statements containing write clauses.
    Write(&'a mut GraphStore),
}

impl<'a> StoreAccess<'a> {
    fn graph(&self) -> &GraphStore {
        match self {
            StoreAccess::Read(g) => g,
            StoreAccess::Write(g) => g,
        }
    }

    fn graph_mut(&mut self) -> Result<&mut GraphStore> {
        match self {
            StoreAccess::Write(g) => Ok(g),
            StoreAccess::Read(_) => Err(CatalogError::execution(
                "write clause executed in a read-only context",
            )),
        }
    }
}

/// Executes one statement. Returns rows when the statement ends in
/// `RETURN`, otherwise the accumulated write summary.
pub fn execute(store: StoreAccess<'_>, stmt: &Statement, params: &Params) -> Result<QueryOutcome> {
    // Parameters are checked before anything runs; lazy resolution would
    // let a statement over an empty label set succeed with a dangling
    // `$name`.
    for name in stmt.referenced_params() {
        if !params.contains_key(&name) {
            return Err(CatalogError::execution(format!(
                "missing parameter ${name}"
            )));
        }
    }
    let mut exec = Executor {
        store,
        params,
        summary: WriteSummary::default(),
    };
    exec.run(stmt)
}

#[derive(Clone, Debug, PartialEq)]
enum Binding {
    Node(NodeId),
    Edge(EdgeId),
    Value(Value),
}

type Env = BTreeMap<String, Binding>;

struct Executor<'a> {
    store: StoreAccess<'a>,
    params: &'a Params,
    summary: WriteSummary,
}

impl<'a> Executor<'a> {
    fn run(&mut self, stmt: &Statement) -> Result<QueryOutcome> {
        let mut envs: Vec<Env> = vec![Env::new()];
        let mut projected: Option<Vec<Row>> = None;
        for clause in &stmt.clauses {
            match clause {
                Clause::Match {
                    optional,
                    pattern,
                    filter,
                } => {
                    envs = self.apply_match(envs, pattern, filter.as_ref(), *optional)?;
                }
                Clause::With { vars, filter } => {
                    envs = self.apply_with(envs, vars, filter.as_ref())?;
                }
                Clause::Merge(pattern) => {
                    envs = self.apply_merge(envs, pattern)?;
                }
                Clause::SetMerge { var, value } => {
                    self.apply_set_merge(&envs, var, value)?;
                }
                Clause::SetProperty { var, key, value } => {
                    self.apply_set_property(&envs, var, key, value)?;
                }
                Clause::Delete { detach, vars } => {
                    self.apply_delete(&mut envs, *detach, vars)?;
                }
                Clause::Return(ret) => {
                    projected = Some(self.project(&envs, ret)?);
                }
            }
        }
        match projected {
            Some(rows) => Ok(QueryOutcome::Rows(rows)),
            None => Ok(QueryOutcome::Summary(self.summary)),
        }
    }

    // ---- MATCH ----

    fn apply_match(
        &mut self,
        envs: Vec<Env>,
        pattern: &PathPattern,
        filter: Option<&Expr>,
        optional: bool,
    ) -> Result<Vec<Env>> {
        let mut out = Vec::new();
        for env in envs {
            let mut matched = Vec::new();
            for candidate in self.expand_pattern(&env, pattern)? {
                let keep = match filter {
                    Some(expr) => self.eval(&candidate, expr)? == Value::Bool(true),
                    None => true,
                };
                if keep {
                    matched.push(candidate);
                }
            }
            if matched.is_empty() && optional {
                let mut padded = env.clone();
                for var in pattern_vars(pattern) {
                    padded
                        .entry(var)
                        .or_insert(Binding::Value(Value::Null));
                }
                out.push(padded);
            } else {
                out.extend(matched);
            }
        }
        Ok(out)
    }

    /// All bindings of `pattern` consistent with `env`.
    fn expand_pattern(&self, env: &Env, pattern: &PathPattern) -> Result<Vec<Env>> {
        let mut current = self.bind_node(env, &pattern.start)?;
        for (rel, node) in &pattern.hops {
            let mut next = Vec::new();
            for (env, from) in current {
                let hops: Vec<(EdgeId, NodeId)> = match rel.direction {
                    Direction::Out => self
                        .store
                        .graph()
                        .edges_from(from)
                        .filter(|e| rel.type_name.as_deref().map_or(true, |t| e.type_name == t))
                        .map(|e| (e.id, e.target))
                        .collect(),
                    Direction::In => self
                        .store
                        .graph()
                        .edges_to(from)
                        .filter(|e| rel.type_name.as_deref().map_or(true, |t| e.type_name == t))
                        .map(|e| (e.id, e.source))
                        .collect(),
                };
                for (edge_id, neighbor) in hops {
                    if let Some(mut bound) = self.try_bind_node_id(&env, node, neighbor)? {
                        if let Some(var) = &rel.var {
                            bound.insert(var.clone(), Binding::Edge(edge_id));
                        }
                        next.push((bound, neighbor));
                    }
                }
            }
            current = next;
        }
        Ok(current.into_iter().map(|(env, _)| env).collect())
    }

    /// Candidate environments for a start node pattern.
    fn bind_node(&self, env: &Env, pattern: &NodePattern) -> Result<Vec<(Env, NodeId)>> {
        if let Some(var) = &pattern.var {
            if let Some(binding) = env.get(var) {
                return match binding {
                    Binding::Node(id) => {
                        if self.node_satisfies(env, *id, pattern)? {
                            Ok(vec![(env.clone(), *id)])
                        } else {
                            Ok(Vec::new())
                        }
                    }
                    // A null binding from an earlier OPTIONAL MATCH matches
                    // nothing.
                    Binding::Value(Value::Null) => Ok(Vec::new()),
                    _ => Err(CatalogError::execution(format!(
                        "variable `{var}` is not bound to a node"
                    ))),
                };
            }
        }
        let ids: Vec<NodeId> = self
            .store
            .graph()
            .nodes_with_label(pattern.label.as_deref())
            .map(|n| n.id)
            .collect();
        let mut out = Vec::new();
        for id in ids {
            if let Some(bound) = self.try_bind_node_id(env, pattern, id)? {
                out.push((bound, id));
            }
        }
        Ok(out)
    }

    /// Binds `pattern` to a specific node if label, properties, and any
    /// existing binding agree.
    fn try_bind_node_id(&self, env: &Env, pattern: &NodePattern, id: NodeId) -> Result<Option<Env>> {
        if !self.node_satisfies(env, id, pattern)? {
            return Ok(None);
        }
        if let Some(var) = &pattern.var {
            if let Some(existing) = env.get(var) {
                return match existing {
                    Binding::Node(bound) if *bound == id => Ok(Some(env.clone())),
                    _ => Ok(None),
                };
            }
        }
        let mut bound = env.clone();
        if let Some(var) = &pattern.var {
            bound.insert(var.clone(), Binding::Node(id));
        }
        Ok(Some(bound))
    }

    fn node_satisfies(&self, env: &Env, id: NodeId, pattern: &NodePattern) -> Result<bool> {
        let node = match self.store.graph().node(id) {
            Some(node) => node,
            None => return Ok(false),
        };
        if let Some(label) = &pattern.label {
            if &node.label != label {
                return Ok(false);
            }
        }
        for (key, expr) in &pattern.props {
            let expected = self.eval(env, expr)?;
            if node.property(key) != expected {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ---- WITH ----

    fn apply_with(&self, envs: Vec<Env>, vars: &[String], filter: Option<&Expr>) -> Result<Vec<Env>> {
        let mut out = Vec::new();
        for env in envs {
            let mut narrowed = Env::new();
            for var in vars {
                let binding = env
                    .get(var)
                    .cloned()
                    .ok_or_else(|| CatalogError::execution(format!("unknown variable `{var}`")))?;
                narrowed.insert(var.clone(), binding);
            }
            let keep = match filter {
                Some(expr) => self.eval(&narrowed, expr)? == Value::Bool(true),
                None => true,
            };
            if keep {
                out.push(narrowed);
            }
        }
        Ok(out)
    }

    // ---- MERGE ----

    fn apply_merge(&mut self, envs: Vec<Env>, pattern: &PathPattern) -> Result<Vec<Env>> {
        let mut out = Vec::new();
        for env in envs {
            out.push(match pattern.hops.as_slice() {
                [] => self.merge_node(env, &pattern.start)?,
                [(rel, end)] => self.merge_relationship(env, &pattern.start, rel, end)?,
                _ => {
                    return Err(CatalogError::execution(
                        "MERGE supports a node or a single relationship pattern",
                    ))
                }
            });
        }
        Ok(out)
    }

    fn merge_node(&mut self, env: Env, pattern: &NodePattern) -> Result<Env> {
        if let Some(var) = &pattern.var {
            if let Some(Binding::Node(_)) = env.get(var) {
                return Ok(env);
            }
        }
        let label = pattern.label.as_deref().ok_or_else(|| {
            CatalogError::execution("MERGE requires a labeled node pattern")
        })?;
        let mut props = BTreeMap::new();
        for (key, expr) in &pattern.props {
            props.insert(key.clone(), self.eval(&env, expr)?);
        }
        let id = match self.store.graph().find_node(label, &props) {
            Some(id) => id,
            None => {
                let id = self.store.graph_mut()?.create_node(label, props)?;
                self.summary.nodes_created += 1;
                id
            }
        };
        let mut env = env;
        if let Some(var) = &pattern.var {
            env.insert(var.clone(), Binding::Node(id));
        }
        Ok(env)
    }

    fn merge_relationship(
        &mut self,
        env: Env,
        start: &NodePattern,
        rel: &crate::query::ast::RelPattern,
        end: &NodePattern,
    ) -> Result<Env> {
        let left = self.bound_node(&env, start)?;
        let right = self.bound_node(&env, end)?;
        let type_name = rel.type_name.as_deref().ok_or_else(|| {
            CatalogError::execution("MERGE requires a typed relationship pattern")
        })?;
        let (source, target) = match rel.direction {
            Direction::Out => (left, right),
            Direction::In => (right, left),
        };
        let edge_id = match self.store.graph().find_edge(source, type_name, target) {
            Some(id) => id,
            None => {
                let id = self.store.graph_mut()?.create_edge(source, target, type_name)?;
                self.summary.relationships_created += 1;
                id
            }
        };
        let mut env = env;
        if let Some(var) = &rel.var {
            env.insert(var.clone(), Binding::Edge(edge_id));
        }
        Ok(env)
    }

    fn bound_node(&self, env: &Env, pattern: &NodePattern) -> Result<NodeId> {
        let var = pattern.var.as_deref().ok_or_else(|| {
            CatalogError::execution("MERGE relationship endpoints must be named")
        })?;
        match env.get(var) {
            Some(Binding::Node(id)) => Ok(*id),
            _ => Err(CatalogError::execution(format!(
                "MERGE relationship endpoint `{var}` is not a bound node"
            ))),
        }
    }

    // ---- SET ----

    fn apply_set_merge(&mut self, envs: &[Env], var: &str, value: &Expr) -> Result<()> {
        for env in envs {
            let id = self.node_binding(env, var)?;
            let props = match self.eval(env, value)? {
                Value::Map(entries) => entries,
                other => {
                    return Err(CatalogError::execution(format!(
                        "SET {var} += expects a map, got {other}"
                    )))
                }
            };
            let touched = self.store.graph_mut()?.merge_properties(id, &props)?;
            self.summary.properties_set += touched;
        }
        Ok(())
    }

    fn apply_set_property(&mut self, envs: &[Env], var: &str, key: &str, value: &Expr) -> Result<()> {
        for env in envs {
            let id = self.node_binding(env, var)?;
            let evaluated = self.eval(env, value)?;
            let touched = self.store.graph_mut()?.set_property(id, key, evaluated)?;
            self.summary.properties_set += touched;
        }
        Ok(())
    }

    fn node_binding(&self, env: &Env, var: &str) -> Result<NodeId> {
        match env.get(var) {
            Some(Binding::Node(id)) => Ok(*id),
            _ => Err(CatalogError::execution(format!(
                "`{var}` is not a bound node"
            ))),
        }
    }

    // ---- DELETE ----

    fn apply_delete(&mut self, envs: &mut [Env], detach: bool, vars: &[String]) -> Result<()> {
        let mut nodes: Vec<NodeId> = Vec::new();
        let mut edges: Vec<EdgeId> = Vec::new();
        for env in envs.iter() {
            for var in vars {
                match env.get(var) {
                    Some(Binding::Node(id)) if !nodes.contains(id) => nodes.push(*id),
                    Some(Binding::Edge(id)) if !edges.contains(id) => edges.push(*id),
                    Some(Binding::Node(_)) | Some(Binding::Edge(_)) => {}
                    Some(Binding::Value(Value::Null)) => {}
                    _ => {
                        return Err(CatalogError::execution(format!(
                            "DELETE target `{var}` is not a bound node or relationship"
                        )))
                    }
                }
            }
        }
        for id in edges {
            if self.store.graph_mut()?.delete_edge(id) {
                self.summary.relationships_deleted += 1;
            }
        }
        for id in nodes {
            if self.store.graph().node(id).is_some() {
                let detached = self.store.graph_mut()?.delete_node(id, detach)?;
                self.summary.nodes_deleted += 1;
                self.summary.relationships_deleted += detached;
            }
        }
        Ok(())
    }

    // ---- RETURN ----

    fn project(&self, envs: &[Env], ret: &ReturnClause) -> Result<Vec<Row>> {
        if ret.items.is_empty() {
            return Err(CatalogError::execution("RETURN requires projection items"));
        }
        let aggregating = ret.items.iter().any(|item| item.expr.has_aggregate());
        let mut rows = if aggregating {
            self.project_grouped(envs, &ret.items)?
        } else {
            let mut rows = Vec::new();
            for env in envs {
                let mut row = Row::new();
                for item in &ret.items {
                    row.push((item.name(), self.eval(env, &item.expr)?));
                }
                rows.push(row);
            }
            rows
        };
        if ret.distinct {
            let mut seen: Vec<Vec<Value>> = Vec::new();
            rows.retain(|row| {
                let key: Vec<Value> = row.iter().map(|(_, v)| v.clone()).collect();
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            });
        }
        if !ret.order_by.is_empty() {
            let mut keyed: Vec<(Vec<Value>, Row)> = Vec::with_capacity(rows.len());
            for row in rows {
                let row_env: Env = row
                    .iter()
                    .map(|(name, value)| (name.clone(), Binding::Value(value.clone())))
                    .collect();
                let mut keys = Vec::with_capacity(ret.order_by.len());
                for key in &ret.order_by {
                    keys.push(self.eval(&row_env, &key.expr)?);
                }
                keyed.push((keys, row));
            }
            // Stable sort keeps store iteration order for ties.
            keyed.sort_by(|(a, _), (b, _)| {
                for (key, (x, y)) in ret.order_by.iter().zip(a.iter().zip(b.iter())) {
                    let ord = x.sort_cmp(y);
                    if ord != std::cmp::Ordering::Equal {
                        return if key.descending { ord.reverse() } else { ord };
                    }
                }
                std::cmp::Ordering::Equal
            });
            rows = keyed.into_iter().map(|(_, row)| row).collect();
        }
        if let Some(limit) = ret.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    /// Implicit grouping: non-aggregate items form the group key, aggregate
    /// items fold over each group's environments.
    fn project_grouped(&self, envs: &[Env], items: &[Projection]) -> Result<Vec<Row>> {
        let key_items: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.expr.has_aggregate())
            .map(|(i, _)| i)
            .collect();

        let mut groups: Vec<(Vec<Value>, Vec<&Env>)> = Vec::new();
        for env in envs {
            let mut key = Vec::with_capacity(key_items.len());
            for &i in &key_items {
                key.push(self.eval(env, &items[i].expr)?);
            }
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(env),
                None => groups.push((key, vec![env])),
            }
        }
        // `count(..)` over an empty input with no group key yields one row
        // of aggregate defaults.
        if groups.is_empty() && key_items.is_empty() {
            groups.push((Vec::new(), Vec::new()));
        }

        let mut rows = Vec::with_capacity(groups.len());
        for (key, members) in groups {
            let mut key_iter = key.into_iter();
            let mut row = Row::new();
            for item in items {
                let value = if item.expr.has_aggregate() {
                    self.fold_aggregate(&item.expr, &members)?
                } else {
                    key_iter
                        .next()
                        .ok_or_else(|| CatalogError::execution("group key arity mismatch"))?
                };
                row.push((item.name(), value));
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn fold_aggregate(&self, expr: &Expr, members: &[&Env]) -> Result<Value> {
        match expr {
            Expr::CountStar => Ok(Value::Int(members.len() as i64)),
            Expr::Count { distinct, expr } => {
                let values = self.aggregate_inputs(expr, members, *distinct)?;
                Ok(Value::Int(values.len() as i64))
            }
            Expr::Collect { distinct, expr } => {
                let values = self.aggregate_inputs(expr, members, *distinct)?;
                Ok(Value::List(values))
            }
            other => Err(CatalogError::execution(format!(
                "unsupported aggregate expression: {other}"
            ))),
        }
    }

    /// Evaluates the aggregated expression per member, skipping nulls,
    /// optionally deduplicating in first-seen order.
    fn aggregate_inputs(&self, expr: &Expr, members: &[&Env], distinct: bool) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        for env in members {
            let value = self.eval(env, expr)?;
            if value.is_null() {
                continue;
            }
            if distinct && values.contains(&value) {
                continue;
            }
            values.push(value);
        }
        Ok(values)
    }

    // ---- expressions ----

    fn eval(&self, env: &Env, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Param(name) => self
                .params
                .get(name)
                .cloned()
                .ok_or_else(|| CatalogError::execution(format!("missing parameter ${name}"))),
            Expr::Var(name) => match env.get(name) {
                Some(Binding::Node(id)) => Ok(self.node_value(*id)),
                Some(Binding::Edge(id)) => Ok(self.edge_value(*id)),
                Some(Binding::Value(value)) => Ok(value.clone()),
                None => Err(CatalogError::execution(format!(
                    "unknown variable `{name}`"
                ))),
            },
            Expr::Property(var, key) => match env.get(var) {
                Some(Binding::Node(id)) => Ok(self
                    .store
                    .graph()
                    .node(*id)
                    .map(|n| n.property(key))
                    .unwrap_or(Value::Null)),
                Some(Binding::Edge(_)) => Ok(Value::Null),
                Some(Binding::Value(Value::Map(entries))) => {
                    Ok(entries.get(key).cloned().unwrap_or(Value::Null))
                }
                Some(Binding::Value(_)) => Ok(Value::Null),
                None => Err(CatalogError::execution(format!(
                    "unknown variable `{var}`"
                ))),
            },
            Expr::Lower(inner) => self.string_fn(env, inner, "toLower", |s| s.to_lowercase()),
            Expr::Upper(inner) => self.string_fn(env, inner, "toUpper", |s| s.to_uppercase()),
            Expr::Cmp { op, lhs, rhs } => {
                let a = self.eval(env, lhs)?;
                let b = self.eval(env, rhs)?;
                if a.is_null() || b.is_null() {
                    return Ok(Value::Null);
                }
                let result = match op {
                    CmpOp::Eq => Some(a == b),
                    CmpOp::Ne => Some(a != b),
                    _ => a.partial_cmp_value(&b).map(|ord| match op {
                        CmpOp::Lt => ord.is_lt(),
                        CmpOp::Le => ord.is_le(),
                        CmpOp::Gt => ord.is_gt(),
                        CmpOp::Ge => ord.is_ge(),
                        CmpOp::Eq | CmpOp::Ne => unreachable!(),
                    }),
                };
                Ok(result.map(Value::Bool).unwrap_or(Value::Null))
            }
            Expr::Contains(lhs, rhs) => {
                let a = self.eval(env, lhs)?;
                let b = self.eval(env, rhs)?;
                match (a.as_str(), b.as_str()) {
                    (Some(haystack), Some(needle)) => Ok(Value::Bool(haystack.contains(needle))),
                    _ => Ok(Value::Null),
                }
            }
            Expr::IsNull { expr, negated } => {
                let value = self.eval(env, expr)?;
                Ok(Value::Bool(value.is_null() != *negated))
            }
            Expr::And(lhs, rhs) => {
                let a = self.eval(env, lhs)?;
                let b = self.eval(env, rhs)?;
                Ok(match (truth(&a), truth(&b)) {
                    (Some(false), _) | (_, Some(false)) => Value::Bool(false),
                    (Some(true), Some(true)) => Value::Bool(true),
                    _ => Value::Null,
                })
            }
            Expr::Or(lhs, rhs) => {
                let a = self.eval(env, lhs)?;
                let b = self.eval(env, rhs)?;
                Ok(match (truth(&a), truth(&b)) {
                    (Some(true), _) | (_, Some(true)) => Value::Bool(true),
                    (Some(false), Some(false)) => Value::Bool(false),
                    _ => Value::Null,
                })
            }
            Expr::Not(inner) => {
                let value = self.eval(env, inner)?;
                Ok(truth(&value)
                    .map(|b| Value::Bool(!b))
                    .unwrap_or(Value::Null))
            }
            Expr::CountStar | Expr::Count { .. } | Expr::Collect { .. } => Err(
                CatalogError::execution("aggregates are only valid in RETURN items"),
            ),
        }
    }

    fn string_fn(
        &self,
        env: &Env,
        inner: &Expr,
        name: &str,
        apply: impl Fn(&str) -> String,
    ) -> Result<Value> {
        match self.eval(env, inner)? {
            Value::Null => Ok(Value::Null),
            Value::String(s) => Ok(Value::String(apply(&s))),
            other => Err(CatalogError::execution(format!(
                "{name} expects a string, got {other}"
            ))),
        }
    }

    fn node_value(&self, id: NodeId) -> Value {
        match self.store.graph().node(id) {
            Some(node) => node_to_value(node),
            None => Value::Null,
        }
    }

    fn edge_value(&self, id: EdgeId) -> Value {
        match self.store.graph().edge(id) {
            Some(edge) => {
                let mut map = BTreeMap::new();
                map.insert("id".to_owned(), Value::Int(edge.id as i64));
                map.insert("type".to_owned(), Value::String(edge.type_name.clone()));
                map.insert("source".to_owned(), Value::Int(edge.source as i64));
                map.insert("target".to_owned(), Value::Int(edge.target as i64));
                Value::Map(map)
            }
            None => Value::Null,
        }
    }
}

fn node_to_value(node: &Node) -> Value {
    let mut map = BTreeMap::new();
    map.insert("id".to_owned(), Value::Int(node.id as i64));
    map.insert("label".to_owned(), Value::String(node.label.clone()));
    map.insert(
        "properties".to_owned(),
        Value::Map(node.properties.clone()),
    );
    Value::Map(map)
}

/// Three-valued truth: `None` for null or non-boolean values.
fn truth(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

/// Variables a pattern would introduce, used to pad unmatched `OPTIONAL
/// MATCH` rows with nulls.
fn pattern_vars(pattern: &PathPattern) -> Vec<String> {
    let mut vars = Vec::new();
    if let Some(var) = &pattern.start.var {
        vars.push(var.clone());
    }
    for (rel, node) in &pattern.hops {
        if let Some(var) = &rel.var {
            vars.push(var.clone());
        }
        if let Some(var) = &node.var {
            vars.push(var.clone());
        }
    }
    vars
}
