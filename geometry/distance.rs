//! 大圆距离计算
//!
//! 坐标以 度 × 1e7 的 i32 存储，计算前先换算成弧度。

use crate::pb::Point;

/// 坐标缩放系数
pub const COORD_FACTOR: f64 = 1e7;

/// 地球平均半径（米）
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// 1e7 缩放的整数坐标转为度
pub fn from_e7(scaled: i32) -> f64 {
    scaled as f64 / COORD_FACTOR
}

/// 度转为 1e7 缩放的整数坐标（四舍五入）
pub fn to_e7(degrees: f64) -> i32 {
    (degrees * COORD_FACTOR).round() as i32
}

/// 两点间的 Haversine 距离，单位米，截断取整
///
/// 满足 `distance(a, b) == distance(b, a)` 且 `distance(a, a) == 0`。
pub fn distance(p1: &Point, p2: &Point) -> i32 {
    let lat1 = from_e7(p1.latitude).to_radians();
    let lat2 = from_e7(p2.latitude).to_radians();
    let lon1 = from_e7(p1.longitude).to_radians();
    let lon2 = from_e7(p2.longitude).to_radians();

    let delta_lat = lat2 - lat1;
    let delta_lon = lon2 - lon1;

    // 对跖点附近舍入误差会让 a 略大于 1，(1 - a).sqrt() 变成 NaN
    let a = ((delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    // `as` 向零截断
    (EARTH_RADIUS_METERS * c) as i32
}
