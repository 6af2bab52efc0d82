//! Geometry primitives and the viewport clip engine
//!
//! A container's viewport is the sub-rectangle of its bounds actually
//! available for drawing, clipped against every ancestor down from the
//! screen. All widget positions are relative to the parent's viewport
//! origin; absolute buffer coordinates exist only in the cached result of
//! [`clip_viewport`].

/// A position in pixels, relative to some viewport origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const ZERO: Self = Self { w: 0, h: 0 };

    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Axis-aligned rectangle: position relative to the parent viewport,
/// plus size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    /// Returns true if the point is inside this rectangle
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Shrink by `n` pixels on every side
    pub const fn inset(&self, n: u32) -> Self {
        Self {
            x: self.x + n as i32,
            y: self.y + n as i32,
            w: self.w.saturating_sub(2 * n),
            h: self.h.saturating_sub(2 * n),
        }
    }

    /// Overlap of two rectangles, `None` when disjoint
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Rect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

/// A container's cached draw area
///
/// `offset` is relative to the container's own bounds; `size` is already
/// clamped against the container and every ancestor. A zero size marks
/// the viewport invalid: nothing inside the container is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Viewport {
    pub offset: Point,
    pub size: Size,
}

impl Viewport {
    pub const INVALID: Self = Self {
        offset: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(offset: Point, size: Size) -> Self {
        Self { offset, size }
    }

    pub const fn is_valid(&self) -> bool {
        !self.size.is_empty()
    }
}

/// Clip a candidate draw area against the container's own bounds and its
/// parent's current viewport
///
/// - `candidate`: draw area proposed by the container (offset relative
///   to its own bounds, e.g. a border inset), unclamped
/// - `own`: the container's declared size
/// - `pos`: the container's position relative to the parent viewport
/// - `parent_size`: the parent's current (possibly already shrunk)
///   viewport size
/// - `parent_abs`: absolute buffer coordinates of the parent viewport
///
/// Returns the clipped viewport plus the absolute buffer origin of its
/// top-left corner. Geometry that lands outside the parent is not an
/// error: the result is simply [`Viewport::INVALID`] and nothing gets
/// drawn.
pub fn clip_viewport(
    candidate: Viewport,
    own: Size,
    pos: Point,
    parent_size: Size,
    parent_abs: Point,
) -> (Viewport, Point) {
    // A zero-size parent makes every descendant invalid outright
    if parent_size.is_empty() {
        return (Viewport::INVALID, parent_abs);
    }

    // The candidate offset must fall inside the container's own bounds
    let off = candidate.offset;
    if off.x < 0 || off.y < 0 || off.x >= own.w as i32 || off.y >= own.h as i32 {
        return (Viewport::INVALID, parent_abs);
    }

    // Clamp the candidate size to the container's own bounds
    let w = candidate.size.w.min(own.w - off.x as u32);
    let h = candidate.size.h.min(own.h - off.y as u32);

    // Translate into the parent's viewport space and keep the overlap
    let px = pos.x + off.x;
    let py = pos.y + off.y;
    let x0 = px.max(0);
    let y0 = py.max(0);
    let x1 = (px + w as i32).min(parent_size.w as i32);
    let y1 = (py + h as i32).min(parent_size.h as i32);
    if x0 >= x1 || y0 >= y1 {
        return (Viewport::INVALID, parent_abs);
    }

    let viewport = Viewport::new(
        Point::new(x0 - pos.x, y0 - pos.y),
        Size::new((x1 - x0) as u32, (y1 - y0) as u32),
    );
    let abs = Point::new(parent_abs.x + x0, parent_abs.y + y0);
    (viewport, abs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn full(size: Size) -> Viewport {
        Viewport::new(Point::ZERO, size)
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersect(&Rect::new(10, 0, 5, 5)), None);
    }

    #[test]
    fn test_rect_inset() {
        let r = Rect::new(0, 0, 100, 100).inset(2);
        assert_eq!(r, Rect::new(2, 2, 96, 96));
        // Inset larger than the rect collapses to zero size
        let r = Rect::new(0, 0, 3, 3).inset(2);
        assert_eq!(r.size(), Size::ZERO);
    }

    #[test]
    fn test_clip_inside_parent() {
        let (vp, abs) = clip_viewport(
            full(Size::new(50, 40)),
            Size::new(50, 40),
            Point::new(10, 5),
            Size::new(100, 100),
            Point::new(3, 3),
        );
        assert_eq!(vp, full(Size::new(50, 40)));
        assert_eq!(abs, Point::new(13, 8));
    }

    #[test]
    fn test_clip_negative_offset_is_invalid() {
        let candidate = Viewport::new(Point::new(-1, 0), Size::new(10, 10));
        let (vp, _) = clip_viewport(
            candidate,
            Size::new(10, 10),
            Point::ZERO,
            Size::new(100, 100),
            Point::ZERO,
        );
        assert!(!vp.is_valid());
    }

    #[test]
    fn test_clip_offset_past_own_bounds_is_invalid() {
        let candidate = Viewport::new(Point::new(10, 0), Size::new(10, 10));
        let (vp, _) = clip_viewport(
            candidate,
            Size::new(10, 10),
            Point::ZERO,
            Size::new(100, 100),
            Point::ZERO,
        );
        assert!(!vp.is_valid());
    }

    #[test]
    fn test_clip_fully_outside_parent_is_invalid() {
        // Past the parent's far edge
        let (vp, _) = clip_viewport(
            full(Size::new(10, 10)),
            Size::new(10, 10),
            Point::new(100, 0),
            Size::new(100, 100),
            Point::ZERO,
        );
        assert!(!vp.is_valid());
        // Entirely before the parent's origin
        let (vp, _) = clip_viewport(
            full(Size::new(10, 10)),
            Size::new(10, 10),
            Point::new(-10, 0),
            Size::new(100, 100),
            Point::ZERO,
        );
        assert!(!vp.is_valid());
    }

    #[test]
    fn test_clip_partial_overlap() {
        // Sticks out 5px past the parent's right edge
        let (vp, abs) = clip_viewport(
            full(Size::new(20, 10)),
            Size::new(20, 10),
            Point::new(85, 0),
            Size::new(100, 100),
            Point::ZERO,
        );
        assert_eq!(vp, Viewport::new(Point::ZERO, Size::new(15, 10)));
        assert_eq!(abs, Point::new(85, 0));
        // Sticks out past the parent's origin: the offset shifts inward
        let (vp, abs) = clip_viewport(
            full(Size::new(20, 10)),
            Size::new(20, 10),
            Point::new(-5, 0),
            Size::new(100, 100),
            Point::new(7, 7),
        );
        assert_eq!(vp, Viewport::new(Point::new(5, 0), Size::new(15, 10)));
        assert_eq!(abs, Point::new(7, 7));
    }

    #[test]
    fn test_clip_zero_size_parent_short_circuits() {
        let (vp, _) = clip_viewport(
            full(Size::new(10, 10)),
            Size::new(10, 10),
            Point::ZERO,
            Size::ZERO,
            Point::ZERO,
        );
        assert!(!vp.is_valid());
    }

    proptest! {
        /// A valid clipped viewport is always fully contained within the
        /// parent viewport
        #[test]
        fn test_containment_invariant(
            off_x in -20i32..40,
            off_y in -20i32..40,
            cw in 0u32..60,
            ch in 0u32..60,
            own_w in 1u32..40,
            own_h in 1u32..40,
            px in -60i32..80,
            py in -60i32..80,
            pw in 0u32..60,
            ph in 0u32..60,
        ) {
            let (vp, _) = clip_viewport(
                Viewport::new(Point::new(off_x, off_y), Size::new(cw, ch)),
                Size::new(own_w, own_h),
                Point::new(px, py),
                Size::new(pw, ph),
                Point::ZERO,
            );
            if vp.is_valid() {
                // Back into parent-viewport coordinates
                let x0 = px + vp.offset.x;
                let y0 = py + vp.offset.y;
                prop_assert!(x0 >= 0 && y0 >= 0);
                prop_assert!(x0 + vp.size.w as i32 <= pw as i32);
                prop_assert!(y0 + vp.size.h as i32 <= ph as i32);
                // And within the container's own bounds
                prop_assert!(vp.offset.x >= 0 && vp.offset.y >= 0);
                prop_assert!(vp.offset.x + vp.size.w as i32 <= own_w as i32);
                prop_assert!(vp.offset.y + vp.size.h as i32 <= own_h as i32);
            }
        }
    }
}
