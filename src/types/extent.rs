//! Axis-aligned bounding box with optional M and Z ranges.
//!
//! A single struct carries all four dimension pairs; whether the M or Z
//! range is meaningful is computed from the bounds themselves (both finite
//! and ordered), never stored as a flag.  The sentinel for "absent" is the
//! inverted range `(f64::MAX, f64::MIN)`, which also falls naturally out of
//! expand-from-empty accumulation.
//!
//! "Empty" in X/Y means a NaN bound OR min > max — both checks are
//! required, since a half-initialized extent must not be treated as
//! partially valid.

use crate::error::{Result, ShpError};
use crate::types::Vertex;
use nom::bytes::complete::is_not;
use nom::character::complete::{char as nom_char, multispace0};
use nom::combinator::{map_res, opt};
use nom::IResult;
use std::fmt;
use std::str::FromStr;

/// Bounding box over X/Y with optional M (measure) and Z (elevation) ranges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub min_m: f64,
    pub max_m: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Default for Extent {
    /// A freshly constructed extent is empty: NaN X/Y bounds, inverted M/Z
    /// sentinels.
    fn default() -> Self {
        Extent {
            min_x: f64::NAN,
            min_y: f64::NAN,
            max_x: f64::NAN,
            max_y: f64::NAN,
            min_m: f64::MAX,
            max_m: f64::MIN,
            min_z: f64::MAX,
            max_z: f64::MIN,
        }
    }
}

impl Extent {
    /// Create a 2D extent; M and Z are absent.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Extent {
            min_x,
            min_y,
            max_x,
            max_y,
            ..Default::default()
        }
    }

    /// Create an extent carrying an M range.
    pub fn with_m(min_x: f64, min_y: f64, max_x: f64, max_y: f64, min_m: f64, max_m: f64) -> Self {
        Extent {
            min_m,
            max_m,
            ..Extent::new(min_x, min_y, max_x, max_y)
        }
    }

    /// Create an extent carrying both M and Z ranges.
    #[allow(clippy::too_many_arguments)]
    pub fn with_mz(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        min_m: f64,
        max_m: f64,
        min_z: f64,
        max_z: f64,
    ) -> Self {
        Extent {
            min_m,
            max_m,
            min_z,
            max_z,
            ..Extent::new(min_x, min_y, max_x, max_y)
        }
    }

    /// Build from a flat `[min_x, min_y, max_x, max_y]` slice.
    ///
    /// Rejects slices shorter than 4 values at the API boundary.
    pub fn from_array(values: &[f64]) -> Result<Self> {
        if values.len() < 4 {
            return Err(ShpError::InvalidArgument(format!(
                "extent requires at least 4 values, got {}",
                values.len()
            )));
        }
        Ok(Extent::new(values[0], values[1], values[2], values[3]))
    }

    /// Width of the X range (negative when empty/inverted).
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the Y range (negative when empty/inverted).
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether the M range is meaningful: both bounds finite and ordered.
    pub fn has_m(&self) -> bool {
        self.min_m.is_finite() && self.max_m.is_finite() && self.min_m <= self.max_m
    }

    /// Whether the Z range is meaningful: both bounds finite and ordered.
    pub fn has_z(&self) -> bool {
        self.min_z.is_finite() && self.max_z.is_finite() && self.min_z <= self.max_z
    }

    /// An extent is empty if any X/Y bound is NaN or a min exceeds its max.
    pub fn is_empty(&self) -> bool {
        self.min_x.is_nan()
            || self.min_y.is_nan()
            || self.max_x.is_nan()
            || self.max_y.is_nan()
            || self.min_x > self.max_x
            || self.min_y > self.max_y
    }

    /// Check if this extent contains a point (boundary inclusive).
    pub fn contains(&self, point: &Vertex) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Check if this extent fully contains another.
    pub fn contains_extent(&self, other: &Extent) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Check if this extent overlaps another (boundary touch counts).
    pub fn intersects(&self, other: &Extent) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Symmetric counterpart of [`Extent::contains_extent`].
    pub fn within(&self, other: &Extent) -> bool {
        other.contains_extent(self)
    }

    /// Grow the bounds in place to include a point.  Growing from the empty
    /// extent adopts the point as both corners.
    pub fn expand_to_include(&mut self, x: f64, y: f64) {
        if self.min_x.is_nan() || x < self.min_x {
            self.min_x = x;
        }
        if self.min_y.is_nan() || y < self.min_y {
            self.min_y = y;
        }
        if self.max_x.is_nan() || x > self.max_x {
            self.max_x = x;
        }
        if self.max_y.is_nan() || y > self.max_y {
            self.max_y = y;
        }
    }

    /// Grow the bounds in place to include another extent, M/Z included.
    pub fn expand_to_include_extent(&mut self, other: &Extent) {
        if other.is_empty() {
            return;
        }
        self.expand_to_include(other.min_x, other.min_y);
        self.expand_to_include(other.max_x, other.max_y);
        if other.has_m() {
            self.min_m = self.min_m.min(other.min_m);
            self.max_m = self.max_m.max(other.max_m);
        }
        if other.has_z() {
            self.min_z = self.min_z.min(other.min_z);
            self.max_z = self.max_z.max(other.max_z);
        }
    }

    /// Grow the M range in place to include a measure value.
    pub fn expand_to_include_m(&mut self, m: f64) {
        if m < self.min_m {
            self.min_m = m;
        }
        if m > self.max_m {
            self.max_m = m;
        }
    }

    /// Grow the Z range in place to include an elevation value.
    pub fn expand_to_include_z(&mut self, z: f64) {
        if z < self.min_z {
            self.min_z = z;
        }
        if z > self.max_z {
            self.max_z = z;
        }
    }

    /// Intersection of two extents.
    ///
    /// A disjoint pair yields an extent with min > max; callers must check
    /// [`Extent::is_empty`] on the result — "no intersection" is not an
    /// error.
    pub fn intersection(&self, other: &Extent) -> Extent {
        Extent::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        )
    }

    /// Pad all four sides uniformly (negative pad shrinks).
    pub fn expand_by(&mut self, pad: f64) {
        self.min_x -= pad;
        self.min_y -= pad;
        self.max_x += pad;
        self.max_y += pad;
    }

    /// Reposition the extent keeping its width and height fixed.
    pub fn set_center(&mut self, cx: f64, cy: f64) {
        let half_w = self.width() / 2.0;
        let half_h = self.height() / 2.0;
        self.min_x = cx - half_w;
        self.max_x = cx + half_w;
        self.min_y = cy - half_h;
        self.max_y = cy + half_h;
    }

    /// Center of the X/Y box.
    pub fn center(&self) -> Vertex {
        Vertex::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Parse the `X[min|max], Y[min|max]` text form, with optional trailing
    /// `M[...]` / `Z[...]` segments in either order.
    pub fn parse(input: &str) -> Result<Extent> {
        match parse_extent(input) {
            Ok((rest, extent)) if rest.trim().is_empty() => Ok(extent),
            Ok((rest, _)) => Err(ShpError::Parse(format!(
                "trailing input in extent string: {rest:?}"
            ))),
            Err(e) => Err(ShpError::Parse(format!("invalid extent string: {e}"))),
        }
    }
}

impl FromStr for Extent {
    type Err = ShpError;

    fn from_str(s: &str) -> Result<Self> {
        Extent::parse(s)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X[{}|{}], Y[{}|{}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )?;
        if self.has_m() {
            write!(f, ", M[{}|{}]", self.min_m, self.max_m)?;
        }
        if self.has_z() {
            write!(f, ", Z[{}|{}]", self.min_z, self.max_z)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// nom grammar: LABEL '[' number '|' number ']' (',' ...)*
// Labels are matched as whole tokens, so `M` can never be mistaken for a
// substring of another label the way an ordered substring search could.
// ---------------------------------------------------------------------------

fn number(input: &str) -> IResult<&str, f64> {
    // `str::parse` handles NaN and infinities, which empty extents print.
    map_res(is_not("|]"), |s: &str| s.trim().parse::<f64>())(input)
}

fn labeled_range(label: char) -> impl FnMut(&str) -> IResult<&str, (f64, f64)> {
    move |input: &str| {
        let (input, _) = multispace0(input)?;
        let (input, _) = nom_char(label)(input)?;
        let (input, _) = nom_char('[')(input)?;
        let (input, lo) = number(input)?;
        let (input, _) = nom_char('|')(input)?;
        let (input, hi) = number(input)?;
        let (input, _) = nom_char(']')(input)?;
        Ok((input, (lo, hi)))
    }
}

fn comma(input: &str) -> IResult<&str, ()> {
    let (input, _) = multispace0(input)?;
    let (input, _) = nom_char(',')(input)?;
    Ok((input, ()))
}

fn parse_extent(input: &str) -> IResult<&str, Extent> {
    let (input, (min_x, max_x)) = labeled_range('X')(input)?;
    let (input, _) = comma(input)?;
    let (input, (min_y, max_y)) = labeled_range('Y')(input)?;
    let mut extent = Extent::new(min_x, min_y, max_x, max_y);

    // M and Z segments are optional and order-independent.
    let mut rest = input;
    loop {
        let (after_comma, had_comma) = match opt(comma)(rest)? {
            (r, Some(())) => (r, true),
            (r, None) => (r, false),
        };
        if !had_comma {
            break;
        }
        if let Ok((r, (lo, hi))) = labeled_range('M')(after_comma) {
            extent.min_m = lo;
            extent.max_m = hi;
            rest = r;
        } else if let Ok((r, (lo, hi))) = labeled_range('Z')(after_comma) {
            extent.min_z = lo;
            extent.max_z = hi;
            rest = r;
        } else {
            break;
        }
    }
    Ok((rest, extent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_empty() {
        let e = Extent::default();
        assert!(e.is_empty());
        assert!(!e.has_m());
        assert!(!e.has_z());
    }

    #[test]
    fn test_inverted_is_empty() {
        let e = Extent::new(1.0, 1.0, -1.0, -1.0);
        assert!(e.is_empty());
    }

    #[test]
    fn test_half_initialized_is_empty() {
        let mut e = Extent::default();
        e.max_x = 10.0;
        e.max_y = 10.0;
        assert!(e.is_empty());
    }

    #[test]
    fn test_intersection_overlap() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0);
        let b = Extent::new(5.0, 5.0, 15.0, 15.0);
        let i = a.intersection(&b);
        assert_eq!(i, Extent::new(5.0, 5.0, 10.0, 10.0));
        assert!(!i.is_empty());
    }

    #[test]
    fn test_intersection_disjoint_is_empty() {
        let a = Extent::new(0.0, 0.0, 1.0, 1.0);
        let b = Extent::new(5.0, 5.0, 6.0, 6.0);
        assert!(a.intersection(&b).is_empty());
    }

    #[test]
    fn test_contains_and_within() {
        let outer = Extent::new(0.0, 0.0, 10.0, 10.0);
        let inner = Extent::new(2.0, 2.0, 8.0, 8.0);
        assert!(outer.contains_extent(&inner));
        assert!(inner.within(&outer));
        assert!(!inner.contains_extent(&outer));
    }

    #[test]
    fn test_mutual_containment_implies_equality() {
        let a = Extent::new(0.0, 0.0, 10.0, 10.0);
        let b = Extent::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.contains_extent(&b) && b.contains_extent(&a));
        assert_eq!(a, b);
    }

    #[test]
    fn test_expand_from_empty() {
        let mut e = Extent::default();
        e.expand_to_include(3.0, 4.0);
        assert!(!e.is_empty());
        assert_eq!((e.min_x, e.min_y, e.max_x, e.max_y), (3.0, 4.0, 3.0, 4.0));
        e.expand_to_include(-1.0, 10.0);
        assert_eq!((e.min_x, e.min_y, e.max_x, e.max_y), (-1.0, 4.0, 3.0, 10.0));
    }

    #[test]
    fn test_expand_by_and_set_center() {
        let mut e = Extent::new(0.0, 0.0, 10.0, 10.0);
        e.expand_by(1.0);
        assert_eq!(e, Extent::new(-1.0, -1.0, 11.0, 11.0));

        let mut e = Extent::new(0.0, 0.0, 10.0, 4.0);
        e.set_center(0.0, 0.0);
        assert_eq!(e, Extent::new(-5.0, -2.0, 5.0, 2.0));
    }

    #[test]
    fn test_has_m_requires_finite_ordered() {
        let e = Extent::with_m(0.0, 0.0, 1.0, 1.0, 2.0, 5.0);
        assert!(e.has_m());
        let e = Extent::with_m(0.0, 0.0, 1.0, 1.0, 5.0, 2.0);
        assert!(!e.has_m());
        let e = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert!(!e.has_m());
    }

    #[test]
    fn test_from_array_too_short() {
        assert!(Extent::from_array(&[1.0, 2.0]).is_err());
        assert!(Extent::from_array(&[0.0, 0.0, 1.0, 1.0]).is_ok());
    }

    #[test]
    fn test_parse_xy() {
        let e = Extent::parse("X[0|10], Y[2|8]").unwrap();
        assert_eq!(e, Extent::new(0.0, 2.0, 10.0, 8.0));
    }

    #[test]
    fn test_parse_with_m_and_z_any_order() {
        let a = Extent::parse("X[0|1], Y[0|1], M[2|3], Z[4|5]").unwrap();
        let b = Extent::parse("X[0|1], Y[0|1], Z[4|5], M[2|3]").unwrap();
        assert_eq!(a, b);
        assert!(a.has_m() && a.has_z());
        assert_eq!((a.min_m, a.max_m, a.min_z, a.max_z), (2.0, 3.0, 4.0, 5.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Extent::parse("X[0|10]").is_err());
        assert!(Extent::parse("nonsense").is_err());
        assert!(Extent::parse("X[0|10], Y[2|8] extra").is_err());
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let e = Extent::with_mz(-1.5, 2.25, 3.75, 8.0, 0.0, 9.0, -4.0, 4.0);
        let parsed = Extent::parse(&e.to_string()).unwrap();
        assert_eq!(e, parsed);
    }

    #[test]
    fn test_display_roundtrip_empty() {
        let e = Extent::default();
        let parsed = Extent::parse(&e.to_string()).unwrap();
        assert!(parsed.is_empty());
    }

    proptest! {
        #[test]
        fn prop_intersects_symmetric(
            ax in -100.0..100.0f64, ay in -100.0..100.0f64,
            aw in 0.0..50.0f64, ah in 0.0..50.0f64,
            bx in -100.0..100.0f64, by in -100.0..100.0f64,
            bw in 0.0..50.0f64, bh in 0.0..50.0f64,
        ) {
            let a = Extent::new(ax, ay, ax + aw, ay + ah);
            let b = Extent::new(bx, by, bx + bw, by + bh);
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_intersection_within_both(
            ax in -100.0..100.0f64, ay in -100.0..100.0f64,
            aw in 1.0..50.0f64, ah in 1.0..50.0f64,
            bx in -100.0..100.0f64, by in -100.0..100.0f64,
            bw in 1.0..50.0f64, bh in 1.0..50.0f64,
        ) {
            let a = Extent::new(ax, ay, ax + aw, ay + ah);
            let b = Extent::new(bx, by, bx + bw, by + bh);
            let i = a.intersection(&b);
            if !i.is_empty() {
                prop_assert!(a.contains_extent(&i));
                prop_assert!(b.contains_extent(&i));
            } else {
                prop_assert!(!a.intersects(&b) || i.width() == 0.0 || i.height() == 0.0);
            }
        }
    }
}
