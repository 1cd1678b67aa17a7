use crate::geometry::{Axis, Rect};
use crate::motion::Remainder;

/// Per-pixel collision footprint. The mask is as large as the rectangle it is
/// attached to; set bits mark the solid pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width as usize * height as usize],
        }
    }

    pub fn with_solid_rect(width: u32, height: u32, inset: Rect) -> Self {
        let mut bits = vec![false; width as usize * height as usize];
        let bounds = Rect::new(0, 0, width as i32, height as i32);
        if let Some(solid) = bounds.intersection(&inset) {
            for y in solid.top()..solid.bottom() {
                for x in solid.left()..solid.right() {
                    bits[y as usize * width as usize + x as usize] = true;
                }
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn from_rgba_alpha(width: u32, height: u32, rgba: &[u8]) -> Self {
        let pixel_count = width as usize * height as usize;
        let bits = (0..pixel_count)
            .map(|index| rgba.get(index * 4 + 3).is_some_and(|alpha| *alpha != 0))
            .collect();
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// True when any solid pixel of `self` placed at `origin` lands on a solid
    /// pixel of `other` placed at `other_origin`.
    pub fn overlaps(&self, origin: (i32, i32), other: &Mask, other_origin: (i32, i32)) -> bool {
        let own = Rect::new(origin.0, origin.1, self.width as i32, self.height as i32);
        let theirs = Rect::new(
            other_origin.0,
            other_origin.1,
            other.width as i32,
            other.height as i32,
        );
        let Some(shared) = own.intersection(&theirs) else {
            return false;
        };
        for world_y in shared.top()..shared.bottom() {
            for world_x in shared.left()..shared.right() {
                if self.get(world_x - origin.0, world_y - origin.1)
                    && other.get(world_x - other_origin.0, world_y - other_origin.1)
                {
                    return true;
                }
            }
        }
        false
    }
}

pub trait Solid {
    fn bounds(&self) -> Rect;
    fn mask(&self) -> &Mask;
}

/// Moving body view handed to the resolver. The mask origin is the rect's
/// top-left corner.
pub struct Body<'a> {
    pub rect: &'a mut Rect,
    pub mask: &'a Mask,
    pub remainder: &'a mut Remainder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisResolution {
    pub moved: i32,
    pub stepbacks: u32,
}

impl AxisResolution {
    pub fn blocked(&self) -> bool {
        self.stepbacks > 0
    }
}

/// Applies `offset` on one axis, then backs the body out of any solid one
/// pixel at a time. Each stepback zeroes that axis's sub-pixel remainder and
/// the body never backs up further than it moved this call.
pub fn resolve_axis<S: Solid>(
    body: Body<'_>,
    axis: Axis,
    offset: i32,
    solids: &[S],
) -> AxisResolution {
    body.rect.shift(axis, offset);
    if offset == 0 || solids.is_empty() {
        return AxisResolution {
            moved: offset,
            stepbacks: 0,
        };
    }

    let moved_rect = *body.rect;
    let candidates: Vec<&S> = solids
        .iter()
        .filter(|solid| solid.bounds().overlaps(&moved_rect))
        .collect();
    let step = -offset.signum();
    let max_stepbacks = offset.unsigned_abs();
    let mut stepbacks = 0u32;

    while stepbacks < max_stepbacks && touches_any(body.rect, body.mask, &candidates) {
        body.rect.shift(axis, step);
        body.remainder.set(axis, 0.0);
        stepbacks += 1;
    }

    AxisResolution {
        moved: offset + step * stepbacks as i32,
        stepbacks,
    }
}

fn touches_any<S: Solid>(rect: &Rect, mask: &Mask, candidates: &[&S]) -> bool {
    candidates.iter().any(|solid| {
        let bounds = solid.bounds();
        mask.overlaps((rect.x, rect.y), solid.mask(), (bounds.x, bounds.y))
    })
}

pub fn first_rect_hit<'s, S: Solid>(rect: &Rect, solids: &'s [S]) -> Option<&'s S> {
    solids.iter().find(|solid| solid.bounds().overlaps(rect))
}
