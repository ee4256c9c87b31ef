//! Per-node timing tags.
//!
//! A tag carries the arrival and required time of one launch clock domain at
//! one node. Each node holds two small collections: *data* tags (signals
//! launched by a domain, keyed by launch domain) and *clock* tags (capture
//! points seeded at endpoints, keyed by capture domain). At most one tag of
//! each kind exists per [`TagKey`]; contributions from several fan-in or
//! fan-out edges are merged into it immediately.
//!
//! A data tag launched by a startpoint that a path exception names carries
//! that startpoint as its *scope* and never merges with the domain's shared
//! tag, so the exception sees exactly the paths the startpoint launches.
//!
//! Both merges are commutative and associative, including the launch-node
//! tie-break on equal arrivals, so the order in which edges are visited never
//! changes the result.

use crate::ids::{DomainId, NodeId};
use crate::time::Time;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Category of a timing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagType {
    /// A signal launched by a clock domain.
    Data,
    /// A capture point of a clock domain.
    Clock,
}

/// Direction of a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// Keep the larger value.
    Max,
    /// Keep the smaller value.
    Min,
}

impl Merge {
    /// Combines two times in this direction. Invalid operands are ignored.
    pub fn apply(self, a: Time, b: Time) -> Time {
        match self {
            Merge::Max => a.max(b),
            Merge::Min => a.min(b),
        }
    }

    /// `true` if `incoming` strictly improves on `current`.
    fn improves(self, incoming: Time, current: Time) -> bool {
        match self {
            Merge::Max => incoming.value() > current.value(),
            Merge::Min => incoming.value() < current.value(),
        }
    }
}

/// What a tag is merged by within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagKey {
    /// Launch domain for data tags, capture domain for clock tags.
    pub domain: DomainId,
    /// The startpoint of a scoped data tag; `None` for the domain's shared tag.
    pub scope: Option<NodeId>,
}

impl TagKey {
    /// The key of tags launched only by `node`.
    pub fn scoped(domain: DomainId, node: NodeId) -> Self {
        Self {
            domain,
            scope: Some(node),
        }
    }
}

impl From<DomainId> for TagKey {
    fn from(domain: DomainId) -> Self {
        Self {
            domain,
            scope: None,
        }
    }
}

/// Arrival and required time of one domain at one node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingTag {
    /// Launch domain for data tags, capture domain for clock tags.
    pub domain: DomainId,
    /// Startpoint this tag is kept apart for, if any.
    pub scope: Option<NodeId>,
    /// The startpoint the stored arrival came from.
    pub launch_node: NodeId,
    /// Arrival time, or invalid.
    pub arrival: Time,
    /// Required time, or invalid if no capture point constrains this tag.
    pub required: Time,
}

impl TimingTag {
    /// A tag with an arrival and no requirement yet.
    pub fn new(domain: DomainId, launch_node: NodeId, arrival: Time) -> Self {
        Self {
            domain,
            scope: None,
            launch_node,
            arrival,
            required: Time::INVALID,
        }
    }

    /// The same tag under another scope.
    pub fn with_scope(mut self, scope: Option<NodeId>) -> Self {
        self.scope = scope;
        self
    }

    /// Domain and scope.
    pub fn key(&self) -> TagKey {
        TagKey {
            domain: self.domain,
            scope: self.scope,
        }
    }

    /// `required - arrival`, invalid unless both are known.
    pub fn slack(&self) -> Time {
        if self.arrival.is_valid() && self.required.is_valid() {
            self.required - self.arrival
        } else {
            Time::INVALID
        }
    }

    /// Bitwise equality on every field.
    pub fn identical(&self, other: &TimingTag) -> bool {
        self.domain == other.domain
            && self.scope == other.scope
            && self.launch_node == other.launch_node
            && self.arrival.identical(other.arrival)
            && self.required.identical(other.required)
    }
}

type TagVec = SmallVec<[TimingTag; 2]>;

/// The tags held by one node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingTags {
    data: TagVec,
    clock: TagVec,
}

impl TimingTags {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// All tags, data first. The iterator can be cloned to restart it.
    pub fn tags(&self) -> impl Iterator<Item = &TimingTag> + Clone {
        self.data.iter().chain(self.clock.iter())
    }

    /// The tags of one category, in insertion order.
    pub fn tags_of(&self, ty: TagType) -> &[TimingTag] {
        match ty {
            TagType::Data => &self.data,
            TagType::Clock => &self.clock,
        }
    }

    fn slot(&mut self, ty: TagType) -> &mut TagVec {
        match ty {
            TagType::Data => &mut self.data,
            TagType::Clock => &mut self.clock,
        }
    }

    /// The tag of `ty` under `key`, if any. A bare [`DomainId`] names the
    /// domain's shared tag.
    pub fn find(&self, ty: TagType, key: impl Into<TagKey>) -> Option<&TimingTag> {
        let key = key.into();
        self.tags_of(ty).iter().find(|t| t.key() == key)
    }

    fn find_mut(&mut self, ty: TagType, key: TagKey) -> Option<&mut TimingTag> {
        self.slot(ty).iter_mut().find(|t| t.key() == key)
    }

    /// Number of tags of one category.
    pub fn num_tags(&self, ty: TagType) -> usize {
        self.tags_of(ty).len()
    }

    /// Total number of tags.
    pub fn len(&self) -> usize {
        self.data.len() + self.clock.len()
    }

    /// Returns `true` if the node holds no tags.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.clock.is_empty()
    }

    /// Inserts a tag for a key not yet present.
    ///
    /// # Panics
    ///
    /// Panics if a tag of the same category already exists for `tag.key()`.
    pub fn add_tag(&mut self, ty: TagType, tag: TimingTag) {
        assert!(
            self.find(ty, tag.key()).is_none(),
            "duplicate {ty:?} tag for domain {}",
            tag.domain
        );
        self.slot(ty).push(tag);
    }

    /// Merges an arrival into the tag of `tag.key()`, inserting it if absent.
    ///
    /// The stored arrival and launch node are replaced when the incoming
    /// arrival is better in the `merge` direction, or equal with a smaller
    /// launch node. The stored required time is kept.
    pub fn merge_arrival(&mut self, ty: TagType, tag: TimingTag, merge: Merge) {
        match self.find_mut(ty, tag.key()) {
            None => self.slot(ty).push(tag),
            Some(cur) => {
                let replace = !cur.arrival.is_valid()
                    || merge.improves(tag.arrival, cur.arrival)
                    || (tag.arrival.value() == cur.arrival.value()
                        && tag.launch_node < cur.launch_node);
                if tag.arrival.is_valid() && replace {
                    cur.arrival = tag.arrival;
                    cur.launch_node = tag.launch_node;
                }
            }
        }
    }

    /// Merges a required time into an existing tag under `key`.
    ///
    /// Returns `false` (and stores nothing) if the node has no such tag: a
    /// requirement only applies where the domain actually arrives.
    pub fn merge_required(
        &mut self,
        ty: TagType,
        key: impl Into<TagKey>,
        required: Time,
        merge: Merge,
    ) -> bool {
        match self.find_mut(ty, key.into()) {
            Some(cur) => {
                cur.required = merge.apply(cur.required, required);
                true
            }
            None => false,
        }
    }

    /// Keeps the latest arrival (setup propagation).
    pub fn max_tag(&mut self, ty: TagType, tag: TimingTag) {
        self.merge_arrival(ty, tag, Merge::Max);
    }

    /// Keeps the earliest required time (requirement propagation).
    pub fn min_tag(&mut self, ty: TagType, key: impl Into<TagKey>, required: Time) -> bool {
        self.merge_required(ty, key, required, Merge::Min)
    }

    /// Removes every tag.
    pub fn clear(&mut self) {
        self.data.clear();
        self.clock.clear();
    }

    /// Bitwise equality of both collections, in order.
    pub fn identical(&self, other: &TimingTags) -> bool {
        fn same(a: &[TimingTag], b: &[TimingTag]) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.identical(y))
        }
        same(&self.data, &other.data) && same(&self.clock, &other.clock)
    }
}

impl<'a> IntoIterator for &'a TimingTags {
    type Item = &'a TimingTag;
    type IntoIter = std::iter::Chain<std::slice::Iter<'a, TimingTag>, std::slice::Iter<'a, TimingTag>>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter().chain(self.clock.iter())
    }
}
