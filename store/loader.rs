//! 启动数据加载
//!
//! 支持两种格式：
//! - route guide JSON 库：`[{"name": "...", "location": {"latitude": i32, "longitude": i32}}]`
//! - GeoJSON `FeatureCollection`（或单个 `Feature`），几何必须是 Point，坐标单位为度，
//!   名称取自 `properties.name`
//!
//! 任何一条记录无效都会使整个加载失败，服务不应带着半份目录启动。

use geojson::{GeoJson, Value};
use serde::Deserialize;

use crate::error::GuideError;
use crate::geometry::to_e7;
use crate::pb::{Feature, Point};

#[derive(Debug, Deserialize)]
struct FeatureRecord {
    #[serde(default)]
    name: String,
    location: Option<LocationRecord>,
}

#[derive(Debug, Deserialize)]
struct LocationRecord {
    #[serde(default)]
    latitude: i32,
    #[serde(default)]
    longitude: i32,
}

/// 解析启动数据，按内容自动识别格式
pub fn parse_features(content: &str) -> Result<Vec<Feature>, GuideError> {
    if content.trim_start().starts_with('[') {
        parse_json_db(content)
    } else {
        parse_geojson(content)
    }
}

fn parse_json_db(content: &str) -> Result<Vec<Feature>, GuideError> {
    let records: Vec<FeatureRecord> = serde_json::from_str(content)?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let location = record.location.ok_or_else(|| GuideError::InvalidFeature {
                index,
                reason: "missing location".to_string(),
            })?;
            Ok(Feature::new(
                record.name,
                Point::new(location.latitude, location.longitude),
            ))
        })
        .collect()
}

fn parse_geojson(content: &str) -> Result<Vec<Feature>, GuideError> {
    let features = match content.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(GuideError::InvalidFeature {
                index: 0,
                reason: "bare geometry has no feature records".to_string(),
            })
        }
    };

    features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let invalid = |reason: &str| GuideError::InvalidFeature {
                index,
                reason: reason.to_string(),
            };

            let geometry = feature.geometry.as_ref().ok_or_else(|| invalid("missing geometry"))?;
            let position = match &geometry.value {
                Value::Point(position) if position.len() >= 2 => position,
                Value::Point(_) => return Err(invalid("point needs longitude and latitude")),
                _ => return Err(invalid("only Point geometries are supported")),
            };

            let (lon, lat) = (position[0], position[1]);
            if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
                return Err(invalid("coordinate out of range"));
            }

            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get("name"))
                .and_then(|name| name.as_str())
                .unwrap_or_default();

            Ok(Feature::new(name, Point::new(to_e7(lat), to_e7(lon))))
        })
        .collect()
}
