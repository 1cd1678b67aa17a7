use std::rc::Rc;

use engine::{Mask, Rect, Solid};

#[derive(Debug, Clone)]
pub(crate) struct Obstacle {
    pub(crate) rect: Rect,
    mask: Rc<Mask>,
}

impl Obstacle {
    pub(crate) fn new(rect: Rect, mask: Rc<Mask>) -> Self {
        Self { rect, mask }
    }
}

impl Solid for Obstacle {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn mask(&self) -> &Mask {
        &self.mask
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pickup {
    pub(crate) rect: Rect,
}

pub(crate) fn build_obstacles(rects: &[Rect], mask: Mask) -> Vec<Obstacle> {
    let mask = Rc::new(mask);
    rects
        .iter()
        .map(|rect| Obstacle::new(*rect, Rc::clone(&mask)))
        .collect()
}

pub(crate) fn build_pickups(spawns: &[(i32, i32)], size: (i32, i32)) -> Vec<Pickup> {
    spawns
        .iter()
        .map(|(x, y)| Pickup {
            rect: Rect::new(*x, *y, size.0, size.1),
        })
        .collect()
}
