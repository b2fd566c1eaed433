//! Pixel geometry primitives
//!
//! Rectangles here are always in raw page-image pixel coordinates; scaling
//! to display size is the renderer's job.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rectangle {
    pub const ZERO: Rectangle = Rectangle {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Smallest rectangle enclosing a set of points.
///
/// OCR engines report polygons with occasionally missing vertices; callers
/// substitute zero for absent coordinates before reaching this function.
/// An empty point set yields `Rectangle::ZERO`.
pub fn bounding_rectangle<I>(points: I) -> Rectangle
where
    I: IntoIterator<Item = (f32, f32)>,
{
    let mut iter = points.into_iter();
    let Some((first_x, first_y)) = iter.next() else {
        return Rectangle::ZERO;
    };

    let (mut min_x, mut max_x) = (first_x, first_x);
    let (mut min_y, mut max_y) = (first_y, first_y);
    for (x, y) in iter {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    Rectangle {
        x: min_x,
        y: min_y,
        w: max_x - min_x,
        h: max_y - min_y,
    }
}

/// Smallest rectangle enclosing every input rectangle.
///
/// An empty input yields `Rectangle::ZERO`.
pub fn union_rectangles<'a, I>(rects: I) -> Rectangle
where
    I: IntoIterator<Item = &'a Rectangle>,
{
    let mut iter = rects.into_iter();
    let Some(first) = iter.next() else {
        return Rectangle::ZERO;
    };

    let (mut left, mut top) = (first.x, first.y);
    let (mut right, mut bottom) = (first.right(), first.bottom());
    for rect in iter {
        left = left.min(rect.x);
        top = top.min(rect.y);
        right = right.max(rect.right());
        bottom = bottom.max(rect.bottom());
    }

    Rectangle {
        x: left,
        y: top,
        w: right - left,
        h: bottom - top,
    }
}
