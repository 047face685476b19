//! Canonical undirected edge keys.

/// An undirected edge between two vertex indices.
///
/// The endpoints are stored smallest first, so the same geometric edge maps
/// to a single key regardless of the winding of the triangle it came from.
///
/// ```
/// use atrophy::mesh::Edge;
///
/// assert_eq!(Edge::new(7, 3), Edge::new(3, 7));
/// assert_eq!(Edge::new(7, 3).lo(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    lo: usize,
    hi: usize,
}

impl Edge {
    /// Create the canonical edge joining `a` and `b`.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// The smaller endpoint.
    #[inline]
    pub fn lo(self) -> usize {
        self.lo
    }

    /// The larger endpoint.
    #[inline]
    pub fn hi(self) -> usize {
        self.hi
    }

    /// True when both endpoints are the same vertex.
    #[inline]
    pub fn is_degenerate(self) -> bool {
        self.lo == self.hi
    }
}

/// The three edges `(t0,t1)`, `(t1,t2)`, `(t2,t0)` of a triangle.
#[inline]
pub fn triangle_edges(tri: &[usize; 3]) -> [Edge; 3] {
    [
        Edge::new(tri[0], tri[1]),
        Edge::new(tri[1], tri[2]),
        Edge::new(tri[2], tri[0]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_canonical_order() {
        let e = Edge::new(9, 2);
        assert_eq!((e.lo(), e.hi()), (2, 9));
        assert_eq!(e, Edge::new(2, 9));
    }

    #[test]
    fn test_hash_ignores_direction() {
        let set: HashSet<Edge> = [Edge::new(1, 2), Edge::new(2, 1)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_triangle_edges() {
        let edges = triangle_edges(&[4, 1, 6]);
        assert_eq!(edges, [Edge::new(1, 4), Edge::new(1, 6), Edge::new(4, 6)]);
    }

    #[test]
    fn test_degenerate() {
        assert!(Edge::new(3, 3).is_degenerate());
        assert!(!Edge::new(3, 4).is_degenerate());
    }
}
