use colored::*;

use crate::geometry::from_e7;
use crate::pb::{Feature, Point, Rectangle, RouteNode, RouteSummary};

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format_point(point: &Point) -> String {
        format!("({}, {})", point.latitude, point.longitude)
    }

    fn format_location(location: Option<&Point>) -> String {
        match location {
            Some(point) => format!(
                "{} [{:.7}°, {:.7}°]",
                Self::format_point(point),
                from_e7(point.latitude),
                from_e7(point.longitude)
            ),
            None => "(no location)".red().to_string(),
        }
    }

    pub fn format_feature(feature: &Feature) -> String {
        let name = if feature.is_named() {
            feature.name.green().to_string()
        } else {
            "(no feature)".yellow().to_string()
        };
        format!("{} at {}", name, Self::format_location(feature.location.as_ref()))
    }

    pub fn format_rectangle(rect: &Rectangle) -> String {
        format!(
            "{} - {}",
            Self::format_location(rect.lo.as_ref()),
            Self::format_location(rect.hi.as_ref())
        )
    }

    pub fn format_summary(summary: &RouteSummary) -> String {
        format!(
            "{}\n  points:   {}\n  features: {}\n  distance: {} m\n  elapsed:  {} ms",
            "Route summary".bold(),
            summary.point_count.to_string().cyan(),
            summary.feature_count.to_string().cyan(),
            summary.distance.to_string().cyan(),
            summary.elapsed_time.to_string().cyan()
        )
    }

    pub fn format_note(note: &RouteNode) -> String {
        format!(
            "Got message {} at point{}",
            note.message.green(),
            note.location
                .as_ref()
                .map(Self::format_point)
                .unwrap_or_else(|| "(?)".to_string())
        )
    }

    pub fn format_answer(answer: &str) -> String {
        answer.cyan().to_string()
    }

    pub fn format_error(err: &dyn std::fmt::Display) -> String {
        format!("(error) {}", err.to_string().red())
    }

    pub fn format_connecting_message(server_addr: &str) -> String {
        format!("Connecting to {}...", server_addr.cyan())
    }
}
