//! 1-dimensional persistent homology over a dense distance matrix.
//!
//! Implements the Vietoris–Rips filtration restricted to dimension 1:
//!
//! 1. Sort finite edges by distance. A union-find pass marks the edges that
//!    close a loop when inserted ("positive" edges); each births an H1 class.
//! 2. Enumerate triangles whose three edges are all finite; a triangle
//!    appears at the maximum of its edge distances. Standard GF(2)
//!    boundary-matrix reduction over the triangle columns pairs each class
//!    with the triangle that fills it, yielding its death.
//! 3. Classes never filled die at infinity (essential classes).
//!
//! A representative cycle is attached to every reported class: the birth
//! edge plus a path between its endpoints through strictly earlier edges.
//! Such a path always exists, because the birth edge closed a loop among
//! components already connected by earlier edges.

use ringfence_core::prelude::{EngineError, Result};
use std::collections::HashMap;

/// One H1 class of the filtration.
#[derive(Debug, Clone)]
pub struct PersistenceFeature {
    /// Filtration value at which the loop appears.
    pub birth: f64,
    /// Filtration value at which it is filled, `f64::INFINITY` when never.
    pub death: f64,
    /// Representative cycle, as vertex-index pairs.
    pub cycle: Vec<(usize, usize)>,
}

impl PersistenceFeature {
    /// Lifetime of the class.
    #[must_use]
    pub fn persistence(&self) -> f64 {
        self.death - self.birth
    }

    /// Vertices on the representative cycle, sorted and deduplicated.
    #[must_use]
    pub fn vertices(&self) -> Vec<usize> {
        let mut out: Vec<usize> = self.cycle.iter().flat_map(|&(u, v)| [u, v]).collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    u: usize,
    v: usize,
    dist: f64,
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Returns false when both are already in the same component.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}

/// Compute the H1 persistence diagram of the Rips filtration of `dist`,
/// a row-major `n * n` symmetric matrix.
///
/// Classes with zero persistence are dropped; essential classes are
/// reported with an infinite death. Output is ordered by birth.
pub fn persistent_cycles(n: usize, dist: &[f64]) -> Result<Vec<PersistenceFeature>> {
    if dist.len() != n * n {
        return Err(EngineError::analysis(format!(
            "distance matrix has {} entries, expected {}",
            dist.len(),
            n * n
        )));
    }
    if n < 3 {
        return Ok(Vec::new());
    }

    // Finite edges in filtration order. Ties broken by vertex pair so equal
    // inputs reduce identically.
    let mut edges: Vec<Edge> = Vec::new();
    for u in 0..n {
        for v in (u + 1)..n {
            let d = dist[u * n + v];
            if d.is_finite() {
                edges.push(Edge { u, v, dist: d });
            }
        }
    }
    edges.sort_by(|a, b| {
        a.dist
            .total_cmp(&b.dist)
            .then(a.u.cmp(&b.u))
            .then(a.v.cmp(&b.v))
    });

    let mut edge_index: HashMap<(usize, usize), usize> = HashMap::with_capacity(edges.len());
    for (i, e) in edges.iter().enumerate() {
        edge_index.insert((e.u, e.v), i);
    }

    let mut uf = UnionFind::new(n);
    let mut positive = vec![false; edges.len()];
    for (i, e) in edges.iter().enumerate() {
        if !uf.union(e.u, e.v) {
            positive[i] = true;
        }
    }

    // Triangle columns in filtration order.
    struct Triangle {
        value: f64,
        column: [usize; 3],
    }
    let mut triangles: Vec<Triangle> = Vec::new();
    for a in 0..n {
        for b in (a + 1)..n {
            let Some(&eab) = edge_index.get(&(a, b)) else {
                continue;
            };
            for c in (b + 1)..n {
                let (Some(&eac), Some(&ebc)) =
                    (edge_index.get(&(a, c)), edge_index.get(&(b, c)))
                else {
                    continue;
                };
                let mut column = [eab, eac, ebc];
                column.sort_unstable();
                let value = edges[eab].dist.max(edges[eac].dist).max(edges[ebc].dist);
                triangles.push(Triangle { value, column });
            }
        }
    }
    triangles.sort_by(|a, b| a.value.total_cmp(&b.value).then(a.column.cmp(&b.column)));

    // GF(2) reduction: columns are sorted edge-index sets, the pivot is the
    // largest index. A pivot collision XORs the stored column in.
    let mut pivot_to_column: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut death_of_edge: HashMap<usize, f64> = HashMap::new();
    for tri in &triangles {
        let mut column: Vec<usize> = tri.column.to_vec();
        while let Some(&pivot) = column.last() {
            match pivot_to_column.get(&pivot) {
                Some(other) => column = symmetric_difference(&column, other),
                None => break,
            }
        }
        if let Some(&pivot) = column.last() {
            death_of_edge.insert(pivot, tri.value);
            pivot_to_column.insert(pivot, column);
        }
    }

    let mut features: Vec<PersistenceFeature> = Vec::new();
    for (i, e) in edges.iter().enumerate() {
        if !positive[i] {
            continue;
        }
        let death = death_of_edge.get(&i).copied().unwrap_or(f64::INFINITY);
        if death <= e.dist {
            // Filled at the instant it appeared; not a feature.
            continue;
        }
        features.push(PersistenceFeature {
            birth: e.dist,
            death,
            cycle: representative_cycle(&edges, i),
        });
    }
    features.sort_by(|a, b| a.birth.total_cmp(&b.birth));
    Ok(features)
}

/// Sorted symmetric difference of two sorted index sets.
fn symmetric_difference(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Birth edge plus a BFS path between its endpoints through strictly
/// earlier edges.
fn representative_cycle(edges: &[Edge], birth: usize) -> Vec<(usize, usize)> {
    use std::collections::VecDeque;

    let Edge { u, v, .. } = edges[birth];
    let mut neighbors: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
    for (i, e) in edges.iter().take(birth).enumerate() {
        neighbors.entry(e.u).or_default().push((e.v, i));
        neighbors.entry(e.v).or_default().push((e.u, i));
    }

    let mut came_from: HashMap<usize, (usize, usize)> = HashMap::new();
    let mut queue = VecDeque::from([u]);
    came_from.insert(u, (u, usize::MAX));
    while let Some(cur) = queue.pop_front() {
        if cur == v {
            break;
        }
        for &(next, edge) in neighbors.get(&cur).into_iter().flatten() {
            if !came_from.contains_key(&next) {
                came_from.insert(next, (cur, edge));
                queue.push_back(next);
            }
        }
    }

    let mut cycle = vec![(u, v)];
    let mut cur = v;
    while let Some(&(prev, _)) = came_from.get(&cur) {
        if prev == cur {
            break;
        }
        cycle.push((prev, cur));
        cur = prev;
    }
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dense matrix from a finite edge list; absent pairs are infinite.
    fn create_matrix(n: usize, edges: &[(usize, usize, f64)]) -> Vec<f64> {
        let mut dist = vec![f64::INFINITY; n * n];
        for i in 0..n {
            dist[i * n + i] = 0.0;
        }
        for &(u, v, d) in edges {
            dist[u * n + v] = d;
            dist[v * n + u] = d;
        }
        dist
    }

    #[test]
    fn test_rejects_mismatched_matrix() {
        assert!(persistent_cycles(3, &[0.0; 4]).is_err());
    }

    #[test]
    fn test_too_few_points_has_no_loops() {
        let dist = create_matrix(2, &[(0, 1, 1.0)]);
        assert!(persistent_cycles(2, &dist).unwrap().is_empty());
    }

    #[test]
    fn test_chordless_square_is_essential() {
        let dist = create_matrix(
            4,
            &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.2)],
        );
        let features = persistent_cycles(4, &dist).unwrap();
        assert_eq!(features.len(), 1);
        assert!((features[0].birth - 1.2).abs() < 1e-12);
        assert!(features[0].death.is_infinite());
        assert_eq!(features[0].vertices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_triangle_loop_has_zero_persistence() {
        // The loop closes and is filled at the same filtration value.
        let dist = create_matrix(3, &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.5)]);
        let features = persistent_cycles(3, &dist).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_chorded_square_dies_at_chord_value() {
        // Ring edges near 1.0, both chords at 1.2: the square loop is born
        // when the ring closes and filled once a chord triangle appears.
        let dist = create_matrix(
            4,
            &[
                (0, 1, 1.00),
                (1, 2, 1.01),
                (2, 3, 1.02),
                (3, 0, 1.03),
                (0, 2, 1.20),
                (1, 3, 1.25),
            ],
        );
        let features = persistent_cycles(4, &dist).unwrap();
        assert_eq!(features.len(), 1);
        let f = &features[0];
        assert!((f.birth - 1.03).abs() < 1e-12);
        assert!((f.death - 1.20).abs() < 1e-12);
        assert!((f.persistence() - 0.17).abs() < 1e-12);
        assert_eq!(f.vertices(), vec![0, 1, 2, 3]);
        // Representative cycle walks the full ring.
        assert_eq!(f.cycle.len(), 4);
    }

    #[test]
    fn test_two_disjoint_squares_give_two_features() {
        let dist = create_matrix(
            8,
            &[
                (0, 1, 1.0),
                (1, 2, 1.0),
                (2, 3, 1.0),
                (3, 0, 1.1),
                (4, 5, 2.0),
                (5, 6, 2.0),
                (6, 7, 2.0),
                (7, 4, 2.1),
            ],
        );
        let features = persistent_cycles(8, &dist).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].vertices(), vec![0, 1, 2, 3]);
        assert_eq!(features[1].vertices(), vec![4, 5, 6, 7]);
    }
}
