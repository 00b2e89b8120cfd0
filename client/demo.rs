//! 客户端演示数据：随机路线、RouteChat 脚本、Echo 问题

use rand::Rng;

use crate::geometry::COORD_FACTOR;
use crate::pb::{Point, RouteNode};

/// 演示路线最后追加的已知要素点
pub const KNOWN_FEATURE: Point = Point {
    latitude: 408122808,
    longitude: -743999179,
};

/// 整数度的随机点
pub fn random_point<R: Rng>(rng: &mut R) -> Point {
    let latitude = (rng.gen_range(0..180) - 90) * COORD_FACTOR as i32;
    let longitude = (rng.gen_range(0..360) - 180) * COORD_FACTOR as i32;
    Point::new(latitude, longitude)
}

/// `count` 个随机点加上一个已知要素点；未指定数量时随机取 2..=101
pub fn random_route<R: Rng>(rng: &mut R, count: Option<usize>) -> Vec<Point> {
    let count = count.unwrap_or_else(|| rng.gen_range(2..=101));

    let mut points: Vec<Point> = (0..count).map(|_| random_point(rng)).collect();
    points.push(KNOWN_FEATURE);
    points
}

pub fn chat_script() -> Vec<RouteNode> {
    vec![
        RouteNode::new(Point::new(0, 1), "1st message"),
        RouteNode::new(Point::new(0, 2), "2nd message"),
        RouteNode::new(Point::new(0, 3), "3rd message"),
        RouteNode::new(Point::new(0, 1), "4th message"),
        RouteNode::new(Point::new(0, 2), "5th message"),
        RouteNode::new(Point::new(0, 3), "6th message"),
    ]
}

pub fn questions(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Stream client rpc {}", i)).collect()
}
