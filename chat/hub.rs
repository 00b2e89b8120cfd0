//! RouteChat 留言板
//!
//! 按位置分组的只追加留言序列。`post` 在同一个临界区内完成追加和快照复制，
//! 调用方拿到快照后在锁外逐条发送，慢速的对端不会阻塞其他调用的追加。

use std::collections::HashMap;
use std::sync::Arc;

use derive_more::Display;
use tokio::sync::Mutex;

use crate::error::GuideError;
use crate::pb::{Point, RouteNode};

/// 留言板的 map key，经纬度完全相同的点映射到同一个 key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display(fmt = "{} {}", latitude, longitude)]
pub struct LocationKey {
    latitude: i32,
    longitude: i32,
}

impl From<&Point> for LocationKey {
    fn from(point: &Point) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}

/// 某一时刻某个位置上全部留言的副本，按追加顺序排列
///
/// 留言一经写入不再修改，因此共享 `Arc` 即可，无需深拷贝。
pub type Snapshot = Vec<Arc<RouteNode>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HubStats {
    pub locations: usize,
    pub notes: usize,
}

#[derive(Debug, Default)]
pub struct RouteChatHub {
    notes: Mutex<HashMap<LocationKey, Vec<Arc<RouteNode>>>>,
}

impl RouteChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条留言并返回该位置当前的完整快照（包含刚追加的这条）
    ///
    /// 缺少位置的留言会被拒绝，不会写入。
    pub async fn post(&self, note: RouteNode) -> Result<Snapshot, GuideError> {
        let key = note
            .location
            .as_ref()
            .map(LocationKey::from)
            .ok_or(GuideError::MissingField("location"))?;

        let mut notes = self.notes.lock().await;
        let sequence = notes.entry(key).or_default();
        sequence.push(Arc::new(note));

        Ok(sequence.clone())
    }

    /// 某个位置当前的快照，不追加
    pub async fn notes_at(&self, point: &Point) -> Snapshot {
        let notes = self.notes.lock().await;
        notes
            .get(&LocationKey::from(point))
            .cloned()
            .unwrap_or_default()
    }

    pub async fn stats(&self) -> HubStats {
        let notes = self.notes.lock().await;
        HubStats {
            locations: notes.len(),
            notes: notes.values().map(Vec::len).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_location_key() {
        let a = LocationKey::from(&Point::new(408122808, -743999179));
        let b = LocationKey::from(&Point {
            longitude: -743999179,
            latitude: 408122808,
        });

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "408122808 -743999179");
        assert_ne!(a, LocationKey::from(&Point::new(-743999179, 408122808)));
    }

    #[tokio::test]
    async fn test_post_returns_snapshot_in_append_order() {
        let hub = RouteChatHub::new();
        let here = Point::new(0, 1);

        let first = hub.post(RouteNode::new(here, "1st message")).await.unwrap();
        assert_eq!(first.len(), 1);

        hub.post(RouteNode::new(Point::new(0, 2), "2nd message")).await.unwrap();

        let second = hub.post(RouteNode::new(here, "4th message")).await.unwrap();
        let messages: Vec<&str> = second.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["1st message", "4th message"]);

        // 旧快照不受后续追加影响
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_locations_are_independent() {
        let hub = RouteChatHub::new();

        hub.post(RouteNode::new(Point::new(0, 1), "a")).await.unwrap();
        hub.post(RouteNode::new(Point::new(0, 2), "b")).await.unwrap();
        hub.post(RouteNode::new(Point::new(0, 3), "c")).await.unwrap();

        assert_eq!(hub.notes_at(&Point::new(0, 2)).await.len(), 1);
        assert!(hub.notes_at(&Point::new(9, 9)).await.is_empty());
        assert_eq!(
            hub.stats().await,
            HubStats {
                locations: 3,
                notes: 3
            }
        );
    }

    #[tokio::test]
    async fn test_post_without_location_is_rejected() {
        let hub = RouteChatHub::new();
        let note = RouteNode {
            location: None,
            message: "lost".to_string(),
        };

        assert!(matches!(hub.post(note).await, Err(GuideError::MissingField("location"))));
        assert_eq!(hub.stats().await, HubStats::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_posts_same_location() {
        let hub = Arc::new(RouteChatHub::new());
        let here = Point::new(413628156, -749015468);
        let writers = 32;

        let mut handles = Vec::new();
        for i in 0..writers {
            let hub = Arc::clone(&hub);
            handles.push(tokio::spawn(async move {
                let message = format!("note {}", i);
                let snapshot = hub.post(RouteNode::new(here, message.clone())).await.unwrap();
                (message, snapshot)
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        let final_notes: Vec<String> = hub
            .notes_at(&here)
            .await
            .iter()
            .map(|n| n.message.clone())
            .collect();
        assert_eq!(final_notes.len(), writers);

        let mut lengths = HashSet::new();
        for (message, snapshot) in &results {
            let seen: Vec<String> = snapshot.iter().map(|n| n.message.clone()).collect();

            // 每个快照都是最终序列的前缀，且以自己的留言结尾
            assert_eq!(seen.as_slice(), &final_notes[..seen.len()]);
            assert_eq!(seen.last(), Some(message));

            let unique: HashSet<&String> = seen.iter().collect();
            assert_eq!(unique.len(), seen.len());

            lengths.insert(seen.len());
        }

        // 每次追加恰好对应一个快照长度 1..=writers
        assert_eq!(lengths, (1..=writers).collect::<HashSet<_>>());
    }
}
