use index_vec::IndexVec;

use crate::geometry::{Aabb, FloatType, Surface as _, WorldPoint};
use crate::scene::{GeometryId, Primitive};

use super::{Bvh, Node, NodeId, NodeKind};

/// Recursion stops once a node holds this many geometries or fewer.
const LEAF_SIZE: usize = 2;

/// Per-geometry data the builder sorts and partitions. The primitives
/// themselves never move; only these records do.
struct BuildRecord {
    id: GeometryId,
    bounds: Aabb,
    center: WorldPoint,
}

impl Bvh {
    pub fn build(primitives: &IndexVec<GeometryId, Primitive>) -> Bvh {
        let (mut finite, unbounded): (Vec<_>, Vec<_>) = primitives
            .iter_enumerated()
            .map(|(id, primitive)| {
                let bounds = primitive.shape.bounding_box();
                BuildRecord {
                    id,
                    center: bounds.center(),
                    bounds,
                }
            })
            .partition(|record| !record.bounds.is_infinite());

        let mut bvh = Bvh {
            nodes: IndexVec::new(),
            order: Vec::with_capacity(finite.len()),
            unbounded: unbounded.iter().map(|record| record.id).collect(),
            root: NodeId::from_raw(0),
        };
        bvh.root = bvh.build_recursive(&mut finite);

        // Unbounded geometries have no usable center, so they hang off the
        // root and get tested by every query. The root's bounds widen to
        // infinity so the slab test never prunes them away.
        let root = &mut bvh.nodes[bvh.root];
        root.unbounded = 0..bvh.unbounded.len() as u32;
        if !bvh.unbounded.is_empty() {
            root.bounds = Aabb::infinite();
        }

        log::debug!(
            "built bvh: {} nodes over {} finite and {} unbounded geometries",
            bvh.nodes.len(),
            bvh.order.len(),
            bvh.unbounded.len(),
        );

        bvh
    }

    fn build_recursive(&mut self, records: &mut [BuildRecord]) -> NodeId {
        let bounds = enclosing_box(records);

        let split = if records.len() <= LEAF_SIZE {
            None
        } else {
            best_split(records)
        };
        let Some((axis, position)) = split else {
            // Either small enough for a leaf, or every candidate split left
            // one side empty (coincident centers). An oversized leaf is
            // slower but still correct.
            return self.push_leaf(records, bounds);
        };

        let mid = itertools::partition(records.iter_mut(), |record| {
            record.center[axis] < position
        });
        let (left_records, right_records) = records.split_at_mut(mid);

        // Children are built after the parent is in the arena, so the parent
        // reserves its slot with a placeholder and fills the links in later.
        let node = self.nodes.push(Node {
            bounds,
            unbounded: 0..0,
            kind: NodeKind::Leaf { geometries: 0..0 },
        });
        let left = self.build_recursive(left_records);
        let right = self.build_recursive(right_records);
        self.nodes[node].kind = NodeKind::Inner { left, right };
        node
    }

    fn push_leaf(&mut self, records: &[BuildRecord], bounds: Aabb) -> NodeId {
        let start = self.order.len() as u32;
        self.order.extend(records.iter().map(|record| record.id));
        self.nodes.push(Node {
            bounds,
            unbounded: 0..0,
            kind: NodeKind::Leaf {
                geometries: start..self.order.len() as u32,
            },
        })
    }
}

fn enclosing_box(records: &[BuildRecord]) -> Aabb {
    records
        .iter()
        .map(|record| record.bounds)
        .reduce(|a, b| a.union(&b))
        // An empty scene still needs a root; a degenerate box at the origin
        // rejects every ray just as well.
        .unwrap_or_else(|| Aabb::finite(WorldPoint::origin(), WorldPoint::origin()))
}

/// Surface area heuristic sweep: every geometry center on every axis is a
/// candidate split position, and the winner minimizes
/// `n_left * area(left) + n_right * area(right)`. Splits that leave a side
/// empty separate nothing and are skipped.
fn best_split(records: &[BuildRecord]) -> Option<(usize, FloatType)> {
    let mut best: Option<(usize, FloatType)> = None;
    let mut best_cost = FloatType::INFINITY;

    for axis in 0..3 {
        for candidate in records {
            let position = candidate.center[axis];
            let cost = split_cost(records, axis, position);
            if cost < best_cost {
                best_cost = cost;
                best = Some((axis, position));
            }
        }
    }

    best
}

fn split_cost(records: &[BuildRecord], axis: usize, position: FloatType) -> FloatType {
    let mut left: Option<Aabb> = None;
    let mut right: Option<Aabb> = None;
    let mut left_count = 0usize;

    for record in records {
        let side = if record.center[axis] < position {
            left_count += 1;
            &mut left
        } else {
            &mut right
        };
        *side = Some(match side {
            Some(bounds) => bounds.union(&record.bounds),
            None => record.bounds,
        });
    }

    match (left, right) {
        (Some(left), Some(right)) => {
            left_count as FloatType * left.surface_area()
                + (records.len() - left_count) as FloatType * right.surface_area()
        }
        _ => FloatType::INFINITY,
    }
}
