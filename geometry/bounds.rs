use geo::{coord, Rect};

use crate::pb::{Point, Rectangle};

/// 矩形查询的实际边界
///
/// 矩形的两个角不一定是左下/右上，`geo::Rect` 会按坐标轴取 min/max 归一化。
/// x 为经度，y 为纬度，所有边界均为闭区间。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    rect: Rect<i32>,
}

impl Bounds {
    pub fn from_corners(lo: &Point, hi: &Point) -> Self {
        Self {
            rect: Rect::new(
                coord! { x: lo.longitude, y: lo.latitude },
                coord! { x: hi.longitude, y: hi.latitude },
            ),
        }
    }

    /// 缺少任一角时返回 None
    pub fn from_rectangle(rect: &Rectangle) -> Option<Self> {
        match (rect.lo.as_ref(), rect.hi.as_ref()) {
            (Some(lo), Some(hi)) => Some(Self::from_corners(lo, hi)),
            _ => None,
        }
    }

    pub fn contains(&self, point: &Point) -> bool {
        let min = self.rect.min();
        let max = self.rect.max();

        point.longitude >= min.x
            && point.longitude <= max.x
            && point.latitude >= min.y
            && point.latitude <= max.y
    }

    pub fn min(&self) -> Point {
        Point::new(self.rect.min().y, self.rect.min().x)
    }

    pub fn max(&self) -> Point {
        Point::new(self.rect.max().y, self.rect.max().x)
    }
}

/// 点是否落在矩形内（含边界）
///
/// 缺角的矩形不包含任何点。
pub fn contains(point: &Point, rect: &Rectangle) -> bool {
    Bounds::from_rectangle(rect).is_some_and(|bounds| bounds.contains(point))
}
