//! Ring winding and shell/hole assembly for polygon shapes.
//!
//! The format stores no shell/hole flag; winding is the only signal.
//! Clockwise rings (negative shoelace area) are shells, counter-clockwise
//! rings are holes. A file containing only counter-clockwise rings is
//! treated as having its shells mis-wound and every ring is reclassified
//! as a shell.

use crate::geometry::PolygonGeometry;
use crate::types::{Extent, Vertex};

/// Shoelace signed area. Positive for counter-clockwise rings.
pub fn signed_area(ring: &[Vertex]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.cross(&b);
    }
    sum / 2.0
}

/// Counter-clockwise test (hole winding in the file convention).
pub fn is_ccw(ring: &[Vertex]) -> bool {
    signed_area(ring) > 0.0
}

/// Bounding box of a ring.
pub fn ring_extent(ring: &[Vertex]) -> Extent {
    let mut extent = Extent::default();
    for v in ring {
        extent.expand_to_include(v.x, v.y);
    }
    extent
}

/// Ray-cast point-in-ring test.
///
/// Points exactly on an edge may fall on either side; ring assembly only
/// probes with interior vertices of well-separated rings, where the
/// boundary case does not arise.
pub fn point_in_ring(point: &Vertex, ring: &[Vertex]) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Assemble decoded rings into polygons.
///
/// Shells are clockwise rings, holes counter-clockwise. Each hole is
/// assigned to the smallest shell that contains its first vertex (extent
/// containment first as a cheap filter, then the ray cast); a hole no
/// shell contains is promoted to a shell of its own rather than dropped.
pub fn assemble_polygons(rings: Vec<Vec<Vertex>>) -> Vec<PolygonGeometry> {
    let mut shells: Vec<Vec<Vertex>> = Vec::new();
    let mut holes: Vec<Vec<Vertex>> = Vec::new();
    for ring in rings {
        if ring.is_empty() {
            continue;
        }
        if is_ccw(&ring) {
            holes.push(ring);
        } else {
            shells.push(ring);
        }
    }

    // Shell-less files: treat every ring as a shell.
    if shells.is_empty() && !holes.is_empty() {
        shells = std::mem::take(&mut holes);
    }

    let shell_extents: Vec<Extent> = shells.iter().map(|s| ring_extent(s)).collect();
    let shell_areas: Vec<f64> = shells.iter().map(|s| signed_area(s).abs()).collect();

    let mut polygons: Vec<PolygonGeometry> = shells
        .into_iter()
        .map(|shell| PolygonGeometry {
            shell,
            holes: Vec::new(),
        })
        .collect();

    for hole in holes {
        let probe = hole[0];
        let mut best: Option<usize> = None;
        for (i, poly) in polygons.iter().enumerate() {
            if !shell_extents[i].contains(&probe) {
                continue;
            }
            if !point_in_ring(&probe, &poly.shell) {
                continue;
            }
            match best {
                Some(b) if shell_areas[b] <= shell_areas[i] => {}
                _ => best = Some(i),
            }
        }
        match best {
            Some(i) => polygons[i].holes.push(hole),
            // Orphan hole: no shell encloses it, keep it as a shell.
            None => polygons.push(PolygonGeometry {
                shell: hole,
                holes: Vec::new(),
            }),
        }
    }

    polygons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_cw(x: f64, y: f64, size: f64) -> Vec<Vertex> {
        vec![
            Vertex::new(x, y),
            Vertex::new(x, y + size),
            Vertex::new(x + size, y + size),
            Vertex::new(x + size, y),
            Vertex::new(x, y),
        ]
    }

    fn square_ccw(x: f64, y: f64, size: f64) -> Vec<Vertex> {
        let mut r = square_cw(x, y, size);
        r.reverse();
        r
    }

    #[test]
    fn test_signed_area_and_winding() {
        assert_eq!(signed_area(&square_cw(0.0, 0.0, 10.0)), -100.0);
        assert_eq!(signed_area(&square_ccw(0.0, 0.0, 10.0)), 100.0);
        assert!(!is_ccw(&square_cw(0.0, 0.0, 10.0)));
        assert!(is_ccw(&square_ccw(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_point_in_ring() {
        let ring = square_cw(0.0, 0.0, 10.0);
        assert!(point_in_ring(&Vertex::new(5.0, 5.0), &ring));
        assert!(!point_in_ring(&Vertex::new(15.0, 5.0), &ring));
        assert!(!point_in_ring(&Vertex::new(-1.0, 5.0), &ring));
    }

    #[test]
    fn test_shell_with_hole() {
        let polys = assemble_polygons(vec![square_cw(0.0, 0.0, 10.0), square_ccw(2.0, 2.0, 3.0)]);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].holes.len(), 1);
    }

    #[test]
    fn test_two_disjoint_shells() {
        let polys = assemble_polygons(vec![square_cw(0.0, 0.0, 10.0), square_cw(20.0, 0.0, 10.0)]);
        assert_eq!(polys.len(), 2);
        assert!(polys.iter().all(|p| p.holes.is_empty()));
    }

    #[test]
    fn test_all_holes_reclassified_as_shells() {
        let polys = assemble_polygons(vec![square_ccw(0.0, 0.0, 10.0), square_ccw(20.0, 0.0, 5.0)]);
        assert_eq!(polys.len(), 2);
        assert!(polys.iter().all(|p| p.holes.is_empty()));
    }

    #[test]
    fn test_hole_assigned_to_tightest_shell() {
        // Big shell contains a smaller shell which contains the hole.
        let polys = assemble_polygons(vec![
            square_cw(0.0, 0.0, 100.0),
            square_cw(10.0, 10.0, 20.0),
            square_ccw(15.0, 15.0, 5.0),
        ]);
        assert_eq!(polys.len(), 2);
        let small = polys
            .iter()
            .find(|p| signed_area(&p.shell).abs() == 400.0)
            .unwrap();
        assert_eq!(small.holes.len(), 1);
        let big = polys
            .iter()
            .find(|p| signed_area(&p.shell).abs() == 10000.0)
            .unwrap();
        assert!(big.holes.is_empty());
    }

    #[test]
    fn test_orphan_hole_promoted() {
        let polys = assemble_polygons(vec![square_cw(0.0, 0.0, 10.0), square_ccw(50.0, 50.0, 5.0)]);
        assert_eq!(polys.len(), 2);
    }
}
