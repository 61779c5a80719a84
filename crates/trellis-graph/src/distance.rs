use crate::Coord;

/// Manhattan (L1) distance between two coordinates, saturating at
/// `i32::MAX` so it can always be used as an edge weight.
#[inline]
pub fn manhattan(a: Coord, b: Coord) -> i32 {
    let d = u64::from(a.x.abs_diff(b.x)) + u64::from(a.y.abs_diff(b.y));
    i32::try_from(d).unwrap_or(i32::MAX)
}
