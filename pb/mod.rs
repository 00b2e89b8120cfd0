//! RouteGuide 线协议消息
//!
//! 对应的 proto 定义（package `routeguide`）：
//!
//! ```text
//! service RouteGuide {
//!   rpc GetFeature(Point) returns (Feature) {}
//!   rpc ListFeatures(Rectangle) returns (stream Feature) {}
//!   rpc RecordRoute(stream Point) returns (RouteSummary) {}
//!   rpc RouteChat(stream RouteNode) returns (stream RouteNode) {}
//! }
//!
//! service Echo {
//!   rpc Conversations(stream StreamRequest) returns (stream StreamResponse) {}
//! }
//! ```
//!
//! 服务端/客户端桩代码由 `build.rs` 生成后 include 进来。

/// 坐标点，经纬度均为 度 × 1e7 的整数
#[derive(Clone, Copy, PartialEq, Eq, Hash, prost::Message)]
pub struct Point {
    #[prost(int32, tag = "1")]
    pub latitude: i32,
    #[prost(int32, tag = "2")]
    pub longitude: i32,
}

/// 两个对角点围成的矩形，`lo`/`hi` 不保证是左下/右上
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Rectangle {
    #[prost(message, optional, tag = "1")]
    pub lo: Option<Point>,
    #[prost(message, optional, tag = "2")]
    pub hi: Option<Point>,
}

/// 某个位置上的要素，`name` 为空表示该位置没有要素
#[derive(Clone, PartialEq, prost::Message)]
pub struct Feature {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub location: Option<Point>,
}

/// RouteChat 中的一条留言
#[derive(Clone, PartialEq, prost::Message)]
pub struct RouteNode {
    #[prost(message, optional, tag = "1")]
    pub location: Option<Point>,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct RouteSummary {
    #[prost(int32, tag = "1")]
    pub point_count: i32,
    #[prost(int32, tag = "2")]
    pub feature_count: i32,
    /// 米
    #[prost(int32, tag = "3")]
    pub distance: i32,
    /// 毫秒
    #[prost(int32, tag = "4")]
    pub elapsed_time: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StreamRequest {
    #[prost(string, tag = "1")]
    pub question: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StreamResponse {
    #[prost(string, tag = "1")]
    pub answer: String,
}

impl Point {
    pub fn new(latitude: i32, longitude: i32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Rectangle {
    pub fn new(lo: Point, hi: Point) -> Self {
        Self {
            lo: Some(lo),
            hi: Some(hi),
        }
    }
}

impl Feature {
    pub fn new(name: impl Into<String>, location: Point) -> Self {
        Self {
            name: name.into(),
            location: Some(location),
        }
    }

    /// 查询未命中时返回的空要素
    pub fn unnamed(location: Point) -> Self {
        Self::new(String::new(), location)
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

impl RouteNode {
    pub fn new(location: Point, message: impl Into<String>) -> Self {
        Self {
            location: Some(location),
            message: message.into(),
        }
    }
}

include!(concat!(env!("OUT_DIR"), "/routeguide.RouteGuide.rs"));
include!(concat!(env!("OUT_DIR"), "/routeguide.Echo.rs"));
