// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relation assembly
//!
//! Relations claim their member fragments from a pool keyed by way id.
//! Claiming is a single `remove`, so a fragment can only ever end up in one
//! ring. Fragments left in the pool pass through as rings of their own.

use osm_context_model::{FeatureSet, MemberRole, NodeId, Relation, Ring, WayFragment, WayId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Which relation members take part in assembly
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleFilter {
    /// Only `outer` members
    #[default]
    OuterOnly,
    /// Every way member, whatever its role
    Any,
}

impl RoleFilter {
    fn accepts(&self, role: &MemberRole) -> bool {
        match self {
            RoleFilter::OuterOnly => *role == MemberRole::Outer,
            RoleFilter::Any => true,
        }
    }
}

/// Assembly settings
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerOptions {
    /// Members considered when assembling a relation
    pub member_roles: RoleFilter,
    /// Chain all members of a relation into one ring (otherwise one ring per member)
    pub merge_members: bool,
    /// Unclaimed fragments only pass through when they carry this tag
    pub require_tag: Option<String>,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            member_roles: RoleFilter::OuterOnly,
            merge_members: true,
            require_tag: None,
        }
    }
}

impl AssemblerOptions {
    /// Building footprints: outer members merged into one ring
    pub fn buildings() -> Self {
        Self {
            member_roles: RoleFilter::OuterOnly,
            merge_members: true,
            require_tag: Some("building".to_string()),
        }
    }

    /// Road centerlines: every member becomes its own ring
    pub fn roads() -> Self {
        Self {
            member_roles: RoleFilter::Any,
            merge_members: false,
            require_tag: Some("highway".to_string()),
        }
    }

    /// Set the member role filter
    pub fn with_member_roles(mut self, roles: RoleFilter) -> Self {
        self.member_roles = roles;
        self
    }

    /// Set whether relation members are merged
    pub fn with_merge_members(mut self, merge: bool) -> Self {
        self.merge_members = merge;
        self
    }

    /// Set the tag required for pass-through fragments
    pub fn with_require_tag(mut self, tag: Option<String>) -> Self {
        self.require_tag = tag;
        self
    }
}

/// Counters describing what assembly did and skipped
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct AssemblyReport {
    /// Relations processed
    pub relations: usize,
    /// Fragments claimed by a relation
    pub claimed_fragments: usize,
    /// Member references to fragments that were absent or already claimed
    pub missing_fragments: usize,
    /// Relations that produced no ring at all
    pub empty_relations: usize,
    /// Unclaimed fragments emitted as rings
    pub passed_through: usize,
    /// Unclaimed fragments dropped for lacking the required tag
    pub dropped_untagged: usize,
}

/// Assembled rings plus the report
#[derive(Clone, Debug, Default)]
pub struct Assembly {
    pub rings: Vec<Ring>,
    pub report: AssemblyReport,
}

/// Merges way fragments and relations into rings
#[derive(Clone, Debug, Default)]
pub struct TopologyAssembler {
    options: AssemblerOptions,
}

impl TopologyAssembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Assemble rings from a feature set
    ///
    /// Pass-through fragments come first in encounter order, followed by the
    /// rings of each relation in relation order.
    pub fn assemble(&self, features: &FeatureSet) -> Assembly {
        let mut report = AssemblyReport::default();

        let mut pool: FxHashMap<WayId, &WayFragment> = FxHashMap::default();
        for way in &features.ways {
            pool.entry(way.id).or_insert(way);
        }

        let mut relation_rings = Vec::new();
        for relation in &features.relations {
            report.relations += 1;
            let before = relation_rings.len();
            self.assemble_relation(relation, &mut pool, &mut relation_rings, &mut report);
            if relation_rings.len() == before {
                report.empty_relations += 1;
                log::debug!("Relation {} produced no ring", relation.id);
            }
        }

        let mut rings = Vec::with_capacity(pool.len() + relation_rings.len());
        for way in &features.ways {
            // Removing marks the fragment as emitted, so duplicated ids pass once.
            if pool.remove(&way.id).is_none() {
                continue;
            }
            if let Some(tag) = &self.options.require_tag {
                if !way.tags.contains(tag) {
                    report.dropped_untagged += 1;
                    continue;
                }
            }
            report.passed_through += 1;
            rings.push(Ring::new(way.node_ids.clone(), way.tags.clone()));
        }
        rings.extend(relation_rings);

        log::info!(
            "Assembled {} rings ({} relations, {} claimed, {} missing, {} passed through)",
            rings.len(),
            report.relations,
            report.claimed_fragments,
            report.missing_fragments,
            report.passed_through
        );

        Assembly { rings, report }
    }

    fn assemble_relation(
        &self,
        relation: &Relation,
        pool: &mut FxHashMap<WayId, &WayFragment>,
        out: &mut Vec<Ring>,
        report: &mut AssemblyReport,
    ) {
        let mut claimed: Vec<&[NodeId]> = Vec::new();
        for member in relation
            .members
            .iter()
            .filter(|m| self.options.member_roles.accepts(&m.role))
        {
            match pool.remove(&member.way) {
                Some(fragment) => {
                    report.claimed_fragments += 1;
                    claimed.push(&fragment.node_ids);
                }
                None => {
                    report.missing_fragments += 1;
                    log::debug!(
                        "Relation {} references missing or claimed way {}",
                        relation.id,
                        member.way
                    );
                }
            }
        }

        if self.options.merge_members {
            let ids = chain_fragments(&claimed);
            if !ids.is_empty() {
                out.push(Ring::new(ids, relation.tags.clone()));
            }
        } else {
            out.extend(
                claimed
                    .into_iter()
                    .filter(|ids| !ids.is_empty())
                    .map(|ids| Ring::new(ids.to_vec(), relation.tags.clone())),
            );
        }
    }
}

/// Join fragments end to end
///
/// A fragment touching the chain's tail is appended (reversed if needed),
/// otherwise one touching its head is prepended. The shared junction node is
/// kept once. Fragments touching neither are appended in encounter order.
/// A closed result starts at its smallest node id.
fn chain_fragments(fragments: &[&[NodeId]]) -> Vec<NodeId> {
    let mut pending: Vec<&[NodeId]> = fragments.iter().copied().filter(|f| !f.is_empty()).collect();
    if pending.is_empty() {
        return Vec::new();
    }

    let mut chain: Vec<NodeId> = pending.remove(0).to_vec();
    while !pending.is_empty() {
        let head = chain[0];
        let tail = chain[chain.len() - 1];

        if let Some(pos) = pending
            .iter()
            .position(|f| f[0] == tail || f[f.len() - 1] == tail)
        {
            let fragment = pending.remove(pos);
            if fragment[0] == tail {
                chain.extend_from_slice(&fragment[1..]);
            } else {
                chain.extend(fragment.iter().rev().skip(1));
            }
        } else if let Some(pos) = pending
            .iter()
            .position(|f| f[0] == head || f[f.len() - 1] == head)
        {
            let fragment = pending.remove(pos);
            let prefix: Vec<NodeId> = if fragment[fragment.len() - 1] == head {
                fragment[..fragment.len() - 1].to_vec()
            } else {
                fragment[1..].iter().rev().copied().collect()
            };
            chain.splice(0..0, prefix);
        } else {
            chain.extend_from_slice(pending.remove(0));
        }
    }

    if chain.len() > 2 && chain[0] == chain[chain.len() - 1] {
        chain.pop();
        if let Some((start, _)) = chain.iter().enumerate().min_by_key(|(_, id)| **id) {
            chain.rotate_left(start);
        }
        chain.push(chain[0]);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use osm_context_model::{RelationMember, Tags};

    fn building_relation(id: i64, ways: &[i64]) -> Relation {
        Relation::new(id, ways.iter().map(|&w| RelationMember::outer(w)).collect())
            .with_tags(Tags::new().with("building", "yes").with("height", "12"))
    }

    #[test]
    fn test_relation_chains_fragments() {
        let features = FeatureSet {
            nodes: Vec::new(),
            ways: vec![WayFragment::new(1, [1, 2, 3]), WayFragment::new(2, [3, 4, 1])],
            relations: vec![building_relation(100, &[1, 2])],
        };
        let assembly = TopologyAssembler::default().assemble(&features);

        assert_eq!(assembly.rings.len(), 1);
        let ring = &assembly.rings[0];
        assert_eq!(ring.ids(), vec![1, 2, 3, 4, 1]);
        assert!(ring.is_closed());
        assert_eq!(ring.tags.get("height"), Some("12"));
        assert_eq!(assembly.report.claimed_fragments, 2);
    }

    #[test]
    fn test_relation_member_order_does_not_matter() {
        let features = FeatureSet {
            nodes: Vec::new(),
            ways: vec![WayFragment::new(1, [1, 2, 3]), WayFragment::new(2, [3, 4, 1])],
            relations: vec![building_relation(100, &[2, 1])],
        };
        let assembly = TopologyAssembler::default().assemble(&features);
        assert_eq!(assembly.rings[0].ids(), vec![1, 2, 3, 4, 1]);
    }

    #[test]
    fn test_reversed_fragment_is_joined() {
        let ids = |v: &[i64]| v.iter().map(|&i| NodeId(i)).collect::<Vec<_>>();
        let a = ids(&[1, 2, 3]);
        let b = ids(&[1, 4, 3]);
        let chained = chain_fragments(&[a.as_slice(), b.as_slice()]);
        assert_eq!(chained, ids(&[1, 2, 3, 4, 1]));
    }

    #[test]
    fn test_fragment_claimed_once() {
        let features = FeatureSet {
            nodes: Vec::new(),
            ways: vec![WayFragment::new(1, [1, 2, 3, 1])],
            relations: vec![building_relation(100, &[1]), building_relation(101, &[1])],
        };
        let assembly = TopologyAssembler::default().assemble(&features);

        assert_eq!(assembly.rings.len(), 1);
        assert_eq!(assembly.report.missing_fragments, 1);
        assert_eq!(assembly.report.empty_relations, 1);
        assert_eq!(assembly.report.passed_through, 0);
    }

    #[test]
    fn test_unreferenced_fragments_pass_through_first() {
        let features = FeatureSet {
            nodes: Vec::new(),
            ways: vec![
                WayFragment::new(1, [1, 2, 3]),
                WayFragment::new(2, [3, 4, 1]),
                WayFragment::new(3, [7, 8, 9, 7]),
            ],
            relations: vec![building_relation(100, &[1, 2])],
        };
        let assembly = TopologyAssembler::default().assemble(&features);

        assert_eq!(assembly.rings.len(), 2);
        assert_eq!(assembly.rings[0].ids(), vec![7, 8, 9, 7]);
        assert_eq!(assembly.report.passed_through, 1);
    }

    #[test]
    fn test_required_tag_drops_untagged_fragments() {
        let features = FeatureSet {
            nodes: Vec::new(),
            ways: vec![
                WayFragment::new(1, [1, 2, 3, 1]).with_tags(Tags::new().with("building", "yes")),
                WayFragment::new(2, [4, 5, 6, 4]),
            ],
            relations: Vec::new(),
        };
        let assembly = TopologyAssembler::new(AssemblerOptions::buildings()).assemble(&features);

        assert_eq!(assembly.rings.len(), 1);
        assert_eq!(assembly.report.dropped_untagged, 1);
    }

    #[test]
    fn test_road_relation_keeps_members_apart() {
        let relation = Relation::new(
            9,
            vec![
                RelationMember::with_role(1, "forward"),
                RelationMember::with_role(2, ""),
            ],
        )
        .with_tags(Tags::new().with("highway", "primary"));
        let features = FeatureSet {
            nodes: Vec::new(),
            ways: vec![WayFragment::new(1, [1, 2]), WayFragment::new(2, [2, 3])],
            relations: vec![relation],
        };
        let assembly = TopologyAssembler::new(AssemblerOptions::roads()).assemble(&features);

        assert_eq!(assembly.rings.len(), 2);
        assert_eq!(assembly.rings[1].ids(), vec![2, 3]);
        assert_eq!(assembly.rings[1].tags.get("highway"), Some("primary"));
    }

    #[test]
    fn test_options_from_json() {
        let options: AssemblerOptions =
            serde_json::from_str(r#"{"member_roles": "any", "merge_members": false}"#).unwrap();
        assert_eq!(options.member_roles, RoleFilter::Any);
        assert!(!options.merge_members);
        assert_eq!(options.require_tag, None);
    }
}
