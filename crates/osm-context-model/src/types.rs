// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for raw map records
//!
//! Nodes, way fragments and relations as delivered by the map-data
//! collaborator, plus the assembled [`Ring`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Type-safe node identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId(id)
    }
}

/// Type-safe way identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct WayId(pub i64);

impl fmt::Display for WayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

impl From<i64> for WayId {
    fn from(id: i64) -> Self {
        WayId(id)
    }
}

/// Type-safe relation identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RelationId(pub i64);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Geographic position in degrees (WGS84)
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Map node: an id and a geographic position
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: GeoPoint,
}

impl Node {
    pub fn new(id: i64, lat: f64, lon: f64) -> Self {
        Self {
            id: NodeId(id),
            position: GeoPoint::new(lat, lon),
        }
    }
}

/// Tag -> value mapping attached to ways, relations and rings
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// `area=yes` marks a road feature as a surface rather than a centerline
    pub fn is_area(&self) -> bool {
        self.get("area") == Some("yes")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Open or closed polyline of node references
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Default)]
pub struct WayFragment {
    pub id: WayId,
    pub node_ids: Vec<NodeId>,
    #[serde(default)]
    pub tags: Tags,
}

impl WayFragment {
    pub fn new(id: i64, node_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            id: WayId(id),
            node_ids: node_ids.into_iter().map(NodeId).collect(),
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn first(&self) -> Option<NodeId> {
        self.node_ids.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.node_ids.last().copied()
    }
}

/// Role of a way inside a relation
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Outer,
    Inner,
    #[serde(untagged)]
    Other(String),
}

impl From<&str> for MemberRole {
    fn from(role: &str) -> Self {
        match role {
            "outer" => MemberRole::Outer,
            "inner" => MemberRole::Inner,
            other => MemberRole::Other(other.to_string()),
        }
    }
}

/// Way reference inside a relation
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RelationMember {
    pub way: WayId,
    #[serde(default)]
    pub role: MemberRole,
}

impl RelationMember {
    pub fn outer(way: i64) -> Self {
        Self {
            way: WayId(way),
            role: MemberRole::Outer,
        }
    }

    pub fn with_role(way: i64, role: &str) -> Self {
        Self {
            way: WayId(way),
            role: MemberRole::from(role),
        }
    }
}

/// Relation grouping way fragments into one logical feature
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Default)]
pub struct Relation {
    pub id: RelationId,
    pub members: Vec<RelationMember>,
    #[serde(default)]
    pub tags: Tags,
}

impl Relation {
    pub fn new(id: i64, members: Vec<RelationMember>) -> Self {
        Self {
            id: RelationId(id),
            members,
            tags: Tags::new(),
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

/// Everything the map-data collaborator returns for one query
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Default)]
pub struct FeatureSet {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub ways: Vec<WayFragment>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.ways.is_empty() && self.relations.is_empty()
    }
}

/// Assembled sequence of node references plus the tags of its feature
///
/// A ring is closed when its first and last ids match.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize, Default)]
pub struct Ring {
    pub node_ids: Vec<NodeId>,
    #[serde(default)]
    pub tags: Tags,
}

impl Ring {
    pub fn new(node_ids: Vec<NodeId>, tags: Tags) -> Self {
        Self { node_ids, tags }
    }

    pub fn from_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            node_ids: ids.into_iter().map(NodeId).collect(),
            tags: Tags::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.node_ids.len() > 1 && self.node_ids.first() == self.node_ids.last()
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Node ids without the duplicated closing id
    pub fn open_ids(&self) -> &[NodeId] {
        if self.is_closed() {
            &self.node_ids[..self.node_ids.len() - 1]
        } else {
            &self.node_ids
        }
    }

    /// Raw id values, handy for assertions and logging
    pub fn ids(&self) -> Vec<i64> {
        self.node_ids.iter().map(|id| id.0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_closure() {
        let closed = Ring::from_ids([1, 2, 3, 1]);
        assert!(closed.is_closed());
        assert_eq!(closed.open_ids().len(), 3);

        let open = Ring::from_ids([1, 2, 3]);
        assert!(!open.is_closed());
        assert_eq!(open.open_ids().len(), 3);

        assert!(!Ring::from_ids([7]).is_closed());
    }

    #[test]
    fn test_tags_area_flag() {
        let tags = Tags::new().with("highway", "pedestrian").with("area", "yes");
        assert!(tags.is_area());
        assert!(!Tags::new().with("area", "no").is_area());
    }

    #[test]
    fn test_feature_set_from_json() {
        let json = r#"{
            "nodes": [{"id": 1, "position": {"lat": 1.0, "lon": 2.0}}],
            "ways": [{"id": 10, "node_ids": [1, 2], "tags": {"building": "yes"}}],
            "relations": [{"id": 5, "members": [{"way": 10, "role": "outer"}, {"way": 11, "role": "part"}]}]
        }"#;
        let set: FeatureSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.nodes[0].id, NodeId(1));
        assert_eq!(set.ways[0].tags.get("building"), Some("yes"));
        assert_eq!(set.relations[0].members[0].role, MemberRole::Outer);
        assert_eq!(
            set.relations[0].members[1].role,
            MemberRole::Other("part".to_string())
        );
    }
}
