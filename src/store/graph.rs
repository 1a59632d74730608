use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::model::{Edge, EdgeId, Node, NodeId, Value};

/// In-memory labeled-property graph.
///
/// Nodes and edges live in `BTreeMap`s keyed by ascending id, which makes id
/// order the store's default iteration order. Identity uniqueness (one
/// `Book` per title and so on) is not enforced here; the executor's
/// match-or-create semantics provide it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStore {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    next_node_id: NodeId,
    next_edge_id: EdgeId,
}

impl GraphStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Looks up an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// All nodes in ascending id order, optionally restricted to one label.
    pub fn nodes_with_label<'a>(
        &'a self,
        label: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .values()
            .filter(move |n| label.map_or(true, |l| n.label == l))
    }

    /// First node carrying `label` whose properties equal every entry of
    /// `props`. Ascending id order makes the choice deterministic when the
    /// identity invariant has been violated by a raw write.
    pub fn find_node(&self, label: &str, props: &BTreeMap<String, Value>) -> Option<NodeId> {
        self.nodes_with_label(Some(label))
            .find(|n| props.iter().all(|(k, v)| n.properties.get(k) == Some(v)))
            .map(|n| n.id)
    }

    /// Allocates a node with the supplied label and properties.
    pub fn create_node(&mut self, label: &str, props: BTreeMap<String, Value>) -> Result<NodeId> {
        for value in props.values() {
            Self::check_scalar(value)?;
        }
        self.next_node_id += 1;
        let id = self.next_node_id;
        let properties = props.into_iter().filter(|(_, v)| !v.is_null()).collect();
        self.nodes.insert(
            id,
            Node {
                id,
                label: label.to_owned(),
                properties,
            },
        );
        Ok(id)
    }

    /// Applies a property map to a node with `+=` semantics: supplied keys
    /// overwrite, a null value removes the key, absent keys are untouched.
    /// Returns the number of properties written or removed.
    pub fn merge_properties(&mut self, id: NodeId, props: &BTreeMap<String, Value>) -> Result<u64> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| CatalogError::execution(format!("node {id} does not exist")))?;
        let mut touched = 0;
        for (key, value) in props {
            if value.is_null() {
                if node.properties.remove(key).is_some() {
                    touched += 1;
                }
            } else {
                Self::check_scalar(value)?;
                node.properties.insert(key.clone(), value.clone());
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Sets a single property; a null value removes it.
    pub fn set_property(&mut self, id: NodeId, key: &str, value: Value) -> Result<u64> {
        let mut props = BTreeMap::new();
        props.insert(key.to_owned(), value);
        self.merge_properties(id, &props)
    }

    /// Outgoing edges of `source`, ascending edge id.
    pub fn edges_from<'a>(&'a self, source: NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.values().filter(move |e| e.source == source)
    }

    /// Incoming edges of `target`, ascending edge id.
    pub fn edges_to<'a>(&'a self, target: NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.values().filter(move |e| e.target == target)
    }

    /// Finds the edge of `type_name` between two specific nodes, if present.
    pub fn find_edge(&self, source: NodeId, type_name: &str, target: NodeId) -> Option<EdgeId> {
        self.edges
            .values()
            .find(|e| e.source == source && e.target == target && e.type_name == type_name)
            .map(|e| e.id)
    }

    /// Allocates a directed edge. Both endpoints must exist.
    pub fn create_edge(&mut self, source: NodeId, target: NodeId, type_name: &str) -> Result<EdgeId> {
        if !self.nodes.contains_key(&source) || !self.nodes.contains_key(&target) {
            return Err(CatalogError::execution(format!(
                "cannot create {type_name} edge: endpoint missing"
            )));
        }
        self.next_edge_id += 1;
        let id = self.next_edge_id;
        self.edges.insert(
            id,
            Edge {
                id,
                source,
                target,
                type_name: type_name.to_owned(),
            },
        );
        Ok(id)
    }

    /// Deletes a node. With `detach` the incident edges go with it;
    /// without, a node that still has edges is an error (Cypher `DELETE`
    /// semantics). Returns the number of edges removed.
    pub fn delete_node(&mut self, id: NodeId, detach: bool) -> Result<u64> {
        if !self.nodes.contains_key(&id) {
            return Ok(0);
        }
        let incident: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.source == id || e.target == id)
            .map(|e| e.id)
            .collect();
        if !incident.is_empty() && !detach {
            return Err(CatalogError::execution(format!(
                "cannot delete node {id}: it still has relationships (use DETACH DELETE)"
            )));
        }
        for edge_id in &incident {
            self.edges.remove(edge_id);
        }
        self.nodes.remove(&id);
        Ok(incident.len() as u64)
    }

    /// Deletes an edge if it exists; true when something was removed.
    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        self.edges.remove(&id).is_some()
    }

    /// Number of nodes, optionally restricted to one label.
    pub fn node_count(&self, label: Option<&str>) -> u64 {
        self.nodes_with_label(label).count() as u64
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> u64 {
        self.edges.len() as u64
    }

    fn check_scalar(value: &Value) -> Result<()> {
        match value {
            Value::List(_) | Value::Map(_) => Err(CatalogError::execution(
                "property values must be scalars",
            )),
            _ => Ok(()),
        }
    }
}
