use crate::KD_TREE_BUCKET_SIZE;

use kiddo::{immutable::float::kdtree::ImmutableKdTree, SquaredEuclidean};
use std::num::NonZero;

/// A neighbor found by a query, `distance` is euclidean
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// Immutable kd-tree over K-dimensional points.
///
/// Queries on an index built from no points return no neighbors.
/// Results are ordered by distance, equal distances by input index.
pub struct SpatialIndex<const K: usize> {
    tree: Option<ImmutableKdTree<f64, usize, K, KD_TREE_BUCKET_SIZE>>,
    len: usize,
}

impl<const K: usize> SpatialIndex<K> {
    pub fn new(points: &[[f64; K]]) -> SpatialIndex<K> {
        let tree = (!points.is_empty()).then(|| ImmutableKdTree::new_from_slice(points));

        SpatialIndex {
            tree,
            len: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn nearest_n(&self, query: &[f64; K], n: usize) -> Vec<Neighbor> {
        let (Some(tree), Some(n)) = (&self.tree, NonZero::new(n.min(self.len))) else {
            return vec![];
        };

        let Some(cutoff) = tree
            .nearest_n::<SquaredEuclidean>(query, n)
            .into_iter()
            .map(|nn| nn.distance)
            .max_by(f64::total_cmp)
        else {
            return vec![];
        };

        // kiddo picks arbitrarily among points tied at the cutoff, so take all of them
        let padded = cutoff + cutoff.abs() * 1e-12 + f64::MIN_POSITIVE;
        let mut neighbors = to_neighbors(
            tree.within_unsorted::<SquaredEuclidean>(query, padded)
                .into_iter()
                .map(|nn| (nn.item, nn.distance)),
        );
        neighbors.truncate(n.get());
        neighbors
    }

    pub fn within(&self, query: &[f64; K], radius: f64) -> Vec<Neighbor> {
        let Some(tree) = &self.tree else {
            return vec![];
        };

        to_neighbors(
            tree.within_unsorted::<SquaredEuclidean>(query, radius * radius)
                .into_iter()
                .map(|nn| (nn.item, nn.distance)),
        )
    }

    pub fn nearest_n_within(&self, query: &[f64; K], n: usize, radius: f64) -> Vec<Neighbor> {
        let mut neighbors = self.within(query, radius);
        neighbors.truncate(n);
        neighbors
    }
}

fn to_neighbors(squared: impl Iterator<Item = (usize, f64)>) -> Vec<Neighbor> {
    let mut neighbors: Vec<Neighbor> = squared
        .map(|(index, sq_dist)| Neighbor {
            index,
            distance: sq_dist.sqrt(),
        })
        .collect();

    neighbors.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.index.cmp(&b.index))
    });
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_points() -> Vec<[f64; 2]> {
        let mut points = vec![];
        for y in 0..10 {
            for x in 0..10 {
                points.push([x as f64, y as f64]);
            }
        }
        points
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = SpatialIndex::<3>::new(&[]);

        assert!(index.is_empty());
        assert!(index.nearest_n(&[0., 0., 0.], 4).is_empty());
        assert!(index.within(&[0., 0., 0.], 10.).is_empty());
    }

    #[test]
    fn nearest_is_sorted_with_stable_ties() {
        let index = SpatialIndex::new(&grid_points());

        let nn = index.nearest_n(&[5., 5.], 5);
        assert_eq!(nn.len(), 5);
        assert_eq!(nn[0].index, 55);
        assert_eq!(nn[0].distance, 0.);
        // the four face neighbors are all at distance 1, ordered by index
        assert_eq!(
            nn[1..].iter().map(|n| n.index).collect::<Vec<_>>(),
            vec![45, 54, 56, 65]
        );
        assert!(nn[1..].iter().all(|n| n.distance == 1.));
    }

    #[test]
    fn ties_at_the_cutoff_take_the_lowest_indices() {
        let index = SpatialIndex::new(&grid_points());
        let ids = |nn: Vec<Neighbor>| nn.iter().map(|n| n.index).collect::<Vec<_>>();

        assert_eq!(ids(index.nearest_n(&[5.5, 5.5], 2)), vec![55, 56]);
        assert_eq!(
            ids(index.nearest_n(&[5.5, 5.5], 6)),
            vec![55, 56, 65, 66, 45, 46]
        );
        assert_eq!(
            ids(index.nearest_n(&[5.5, 5.5], 10)),
            vec![55, 56, 65, 66, 45, 46, 54, 57, 64, 67]
        );
        assert_eq!(ids(index.nearest_n_within(&[5.5, 5.5], 2, 1.)), vec![55, 56]);
    }

    #[test]
    fn nearest_n_is_a_prefix_of_a_larger_query() {
        let index = SpatialIndex::new(&grid_points());
        let all = index.nearest_n(&[5.5, 5.5], 100);

        for n in 1..=20 {
            assert_eq!(index.nearest_n(&[5.5, 5.5], n), all[..n]);
        }
    }

    #[test]
    fn nearest_n_is_capped_by_len() {
        let index = SpatialIndex::new(&[[0., 0.], [1., 1.]]);

        let nn = index.nearest_n(&[0., 0.], 10);
        assert_eq!(nn.len(), 2);
        assert_relative_eq!(nn[1].distance, 2f64.sqrt());
    }

    #[test]
    fn radius_query() {
        let index = SpatialIndex::new(&grid_points());

        let within = index.within(&[0., 0.], 1.5);
        assert_eq!(
            within.iter().map(|n| n.index).collect::<Vec<_>>(),
            vec![0, 1, 10, 11]
        );

        let capped = index.nearest_n_within(&[0., 0.], 2, 1.5);
        assert_eq!(capped.len(), 2);
        assert!(index.within(&[-5., -5.], 1.).is_empty());
    }
}
