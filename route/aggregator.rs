//! RecordRoute 的单次调用状态
//!
//! 每个调用新建一个 `RouteAggregator`（Open），逐点调用 `record`，输入结束后调用
//! `finish` 消费自身（Closed）产出唯一一份 `RouteSummary`。所有权保证了 Closed 之后
//! 不能再记录点，也不能重复产出摘要。

use std::time::{Duration, Instant};

use crate::geometry::distance;
use crate::pb::{Point, RouteSummary};
use crate::store::FeatureStore;

pub struct RouteAggregator<'a> {
    store: &'a FeatureStore,
    started_at: Instant,
    point_count: i32,
    feature_count: i32,
    distance: i32,
    last_point: Option<Point>,
}

impl<'a> RouteAggregator<'a> {
    pub fn new(store: &'a FeatureStore) -> Self {
        Self {
            store,
            started_at: Instant::now(),
            point_count: 0,
            feature_count: 0,
            distance: 0,
            last_point: None,
        }
    }

    /// 记录路线上的下一个点
    ///
    /// 计数使用饱和加法，保证在 i32 线协议字段内单调不减。
    pub fn record(&mut self, point: Point) {
        self.point_count = self.point_count.saturating_add(1);

        if self.store.find(&point).is_some() {
            self.feature_count = self.feature_count.saturating_add(1);
        }

        if let Some(last) = &self.last_point {
            self.distance = self.distance.saturating_add(distance(last, &point));
        }

        self.last_point = Some(point);
    }

    pub fn point_count(&self) -> i32 {
        self.point_count
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// 结束输入并产出摘要
    pub fn finish(self) -> RouteSummary {
        let elapsed_ms = self.elapsed().as_millis();

        RouteSummary {
            point_count: self.point_count,
            feature_count: self.feature_count,
            distance: self.distance,
            elapsed_time: i32::try_from(elapsed_ms).unwrap_or(i32::MAX),
        }
    }
}
