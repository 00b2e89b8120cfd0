use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::GuideError;
use crate::geometry::Bounds;
use crate::pb::{Feature, Point};

use super::loader::parse_features;

/// 只读要素目录
///
/// 启动时加载一次，之后所有调用共享同一个实例，查询无需加锁。
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,
}

impl FeatureStore {
    pub fn from_features(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// 从启动数据文件加载
    ///
    /// 文件不可读或内容无效都返回错误，调用方应当终止启动。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuideError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_features(parse_features(&content)?);

        info!(
            "Loaded {} features ({} named) from {}",
            store.len(),
            store.iter().filter(|feature| feature.is_named()).count(),
            path.display()
        );

        Ok(store)
    }

    /// 精确匹配位置的已存要素
    pub fn find(&self, point: &Point) -> Option<&Feature> {
        self.features
            .iter()
            .find(|feature| feature.location.as_ref() == Some(point))
    }

    /// 按位置查询要素，未命中时返回空名要素而不是错误
    pub fn lookup(&self, point: &Point) -> Feature {
        self.find(point)
            .cloned()
            .unwrap_or_else(|| Feature::unnamed(*point))
    }

    /// 按存储顺序惰性地返回落在边界内的要素
    pub fn range_scan(&self, bounds: Bounds) -> impl Iterator<Item = &Feature> + '_ {
        self.features
            .iter()
            .filter(move |feature| in_bounds(feature, &bounds))
    }

    /// 与 `range_scan` 相同，但迭代器持有目录的引用计数，可以移入 `'static` 的响应流
    pub fn scan(self: &Arc<Self>, bounds: Bounds) -> FeatureScan {
        FeatureScan {
            store: Arc::clone(self),
            bounds,
            cursor: 0,
        }
    }

    /// 按存储顺序遍历全部要素
    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn in_bounds(feature: &Feature, bounds: &Bounds) -> bool {
    feature
        .location
        .as_ref()
        .is_some_and(|location| bounds.contains(location))
}

/// 区域扫描迭代器，每次 `next` 只向前推进到下一个命中项
pub struct FeatureScan {
    store: Arc<FeatureStore>,
    bounds: Bounds,
    cursor: usize,
}

impl Iterator for FeatureScan {
    type Item = Feature;

    fn next(&mut self) -> Option<Feature> {
        while let Some(feature) = self.store.features.get(self.cursor) {
            self.cursor += 1;
            if in_bounds(feature, &self.bounds) {
                return Some(feature.clone());
            }
        }
        None
    }
}
