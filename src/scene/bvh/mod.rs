mod building;

use std::ops::Range;

use index_vec::IndexVec;

use crate::geometry::{Aabb, FloatType, Ray, Surface as _};
use crate::scene::{GeoPoint, GeometryId, Primitive};

index_vec::define_index_type! {
    struct NodeId = u32;
}

/// Bounding volume hierarchy over the scene's primitives.
///
/// Nodes live in an arena and leaves reference ranges of `order`, a
/// reordered copy of the finite-extent geometry ids. Geometries with an
/// infinite bounding box cannot be placed by any split position; they sit in
/// a per-node overflow range (`unbounded`) at the node where the split
/// happened and are tested against every ray that reaches that node. A node
/// carrying unbounded geometries has infinite bounds, so it is never pruned.
#[derive(Clone, Debug)]
pub struct Bvh {
    nodes: IndexVec<NodeId, Node>,
    order: Vec<GeometryId>,
    unbounded: Vec<GeometryId>,
    root: NodeId,
}

#[derive(Clone, Debug)]
struct Node {
    bounds: Aabb,
    unbounded: Range<u32>,
    kind: NodeKind,
}

#[derive(Clone, Debug)]
enum NodeKind {
    Leaf { geometries: Range<u32> },
    Inner { left: NodeId, right: NodeId },
}

impl Bvh {
    /// All intersections within `max_distance`, pruned by the tree.
    /// The result is the union over both children of every inner node;
    /// returning just one side would silently drop hits whenever geometry
    /// spans both subtrees.
    pub fn find_intersections(
        &self,
        primitives: &IndexVec<GeometryId, Primitive>,
        ray: &Ray,
        max_distance: FloatType,
    ) -> Vec<GeoPoint> {
        let mut hits = Vec::new();
        self.visit(self.root, primitives, ray, max_distance, &mut hits);
        hits
    }

    fn visit(
        &self,
        node: NodeId,
        primitives: &IndexVec<GeometryId, Primitive>,
        ray: &Ray,
        max_distance: FloatType,
        hits: &mut Vec<GeoPoint>,
    ) {
        let node = &self.nodes[node];
        if !node.bounds.intersects(ray, max_distance) {
            return;
        }

        for &id in &self.unbounded[range_to_usize(&node.unbounded)] {
            test_geometry(id, primitives, ray, max_distance, hits);
        }

        match &node.kind {
            NodeKind::Leaf { geometries } => {
                for &id in &self.order[range_to_usize(geometries)] {
                    test_geometry(id, primitives, ray, max_distance, hits);
                }
            }
            NodeKind::Inner { left, right } => {
                self.visit(*left, primitives, ray, max_distance, hits);
                self.visit(*right, primitives, ray, max_distance, hits);
            }
        }
    }

    /// Tests every primitive with no pruning. Reference implementation for
    /// differential tests and the baseline the tree is measured against.
    pub fn brute_force(
        primitives: &IndexVec<GeometryId, Primitive>,
        ray: &Ray,
        max_distance: FloatType,
    ) -> Vec<GeoPoint> {
        let mut hits = Vec::new();
        for id in primitives.indices() {
            test_geometry(id, primitives, ray, max_distance, &mut hits);
        }
        hits
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn test_geometry(
    id: GeometryId,
    primitives: &IndexVec<GeometryId, Primitive>,
    ray: &Ray,
    max_distance: FloatType,
    hits: &mut Vec<GeoPoint>,
) {
    for point in primitives[id].shape.intersect(ray, max_distance) {
        hits.push(GeoPoint {
            geometry: id,
            point,
        });
    }
}

fn range_to_usize(range: &Range<u32>) -> Range<usize> {
    range.start as usize..range.end as usize
}
