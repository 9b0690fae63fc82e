//! Usage: Dashboard summary built from the athlete, activities and stats responses.
//!
//! Every input is optional: a failed upstream fetch renders as an empty/zero section instead of
//! failing the whole page.

pub(crate) mod export;
pub(crate) mod render;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Athlete {
    pub id: Option<i64>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub profile: Option<String>,
}

impl Athlete {
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Activity {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub distance: Option<f64>,
    pub moving_time: Option<f64>,
    pub elapsed_time: Option<f64>,
    pub total_elevation_gain: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub distance: Option<f64>,
    pub moving_time: Option<f64>,
    pub elevation_gain: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub all_ride_totals: Option<Totals>,
    pub all_run_totals: Option<Totals>,
    pub biggest_ride_distance: Option<f64>,
    pub biggest_climb_elevation_gain: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub name: String,
    pub distance: String,
    pub moving_time: String,
    pub elevation: String,
    pub average_speed: String,
    pub date: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub athlete: Option<Athlete>,
    pub stats: Option<Stats>,
    pub activities: Vec<Activity>,
    // Shown above the summary, e.g. a stale session or a section that failed to load.
    pub notices: Vec<String>,
}

impl DashboardSummary {
    pub fn athlete_name(&self) -> Option<String> {
        self.athlete
            .as_ref()
            .map(Athlete::display_name)
            .filter(|name| !name.is_empty())
    }

    pub fn stat_cards(&self) -> Option<Vec<StatCard>> {
        let stats = self.stats.as_ref()?;
        let ride = stats
            .all_ride_totals
            .as_ref()
            .and_then(|t| t.distance)
            .unwrap_or(0.0);
        let run = stats
            .all_run_totals
            .as_ref()
            .and_then(|t| t.distance)
            .unwrap_or(0.0);
        Some(vec![
            StatCard {
                label: "Total ride distance",
                value: format_distance(ride),
            },
            StatCard {
                label: "Total run distance",
                value: format_distance(run),
            },
            StatCard {
                label: "Longest ride",
                value: format_distance(stats.biggest_ride_distance.unwrap_or(0.0)),
            },
            StatCard {
                label: "Biggest climb",
                value: format_elevation(stats.biggest_climb_elevation_gain.unwrap_or(0.0)),
            },
        ])
    }

    pub fn activity_rows(&self) -> Vec<ActivityRow> {
        self.activities
            .iter()
            .map(|activity| ActivityRow {
                name: activity
                    .name
                    .clone()
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| "Untitled activity".to_string()),
                distance: format_distance(activity.distance.unwrap_or(0.0)),
                moving_time: format_time(activity.moving_time.unwrap_or(0.0)),
                elevation: format_elevation(activity.total_elevation_gain.unwrap_or(0.0)),
                average_speed: format_speed(activity.average_speed.unwrap_or(0.0)),
                date: activity
                    .start_date
                    .as_deref()
                    .map(format_date)
                    .unwrap_or_default(),
                kind: activity.kind.clone().unwrap_or_default(),
            })
            .collect()
    }
}

/// Meters to kilometers with two decimals.
pub fn format_distance(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

/// `Hh Mm` when at least an hour, otherwise `Mm`.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

pub fn format_elevation(meters: f64) -> String {
    format!("{} m", meters.round() as i64)
}

/// Meters per second to km/h with one decimal.
pub fn format_speed(meters_per_second: f64) -> String {
    format!("{:.1} km/h", meters_per_second * 3.6)
}

/// RFC 3339 timestamp to a long date (`5 March 2024`); unparseable input is shown as-is.
pub fn format_date(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => dt.format("%-d %B %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formatting_matches_dashboard_conventions() {
        assert_eq!(format_distance(12346.0), "12.35 km");
        assert_eq!(format_distance(0.0), "0.00 km");
        assert_eq!(format_time(3725.0), "1h 2m");
        assert_eq!(format_time(59.0), "0m");
        assert_eq!(format_time(600.0), "10m");
        assert_eq!(format_elevation(123.5), "124 m");
        assert_eq!(format_speed(5.0), "18.0 km/h");
        assert_eq!(format_date("2024-03-05T06:30:00Z"), "5 March 2024");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn activity_rows_tolerate_missing_fields() {
        let activities: Vec<Activity> = serde_json::from_value(json!([
            {
                "id": 1,
                "name": "Morning Ride",
                "distance": 25000.0,
                "moving_time": 3600,
                "total_elevation_gain": 250.4,
                "type": "Ride",
                "start_date": "2024-01-15T07:00:00Z",
                "average_speed": 6.944
            },
            { "id": 2, "name": null }
        ]))
        .expect("activities");

        let summary = DashboardSummary {
            activities,
            ..Default::default()
        };
        let rows = summary.activity_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Morning Ride");
        assert_eq!(rows[0].distance, "25.00 km");
        assert_eq!(rows[0].moving_time, "1h 0m");
        assert_eq!(rows[0].elevation, "250 m");
        assert_eq!(rows[0].average_speed, "25.0 km/h");
        assert_eq!(rows[0].date, "15 January 2024");
        assert_eq!(rows[0].kind, "Ride");
        assert_eq!(rows[1].name, "Untitled activity");
        assert_eq!(rows[1].distance, "0.00 km");
    }

    #[test]
    fn stat_cards_default_missing_totals_to_zero() {
        let stats: Stats = serde_json::from_value(json!({
            "all_ride_totals": { "distance": 1500000.0 },
            "biggest_ride_distance": null,
            "biggest_climb_elevation_gain": 812.6
        }))
        .expect("stats");
        let summary = DashboardSummary {
            stats: Some(stats),
            ..Default::default()
        };
        let cards = summary.stat_cards().expect("cards");
        let values: Vec<&str> = cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["1500.00 km", "0.00 km", "0.00 km", "813 m"]);
    }

    #[test]
    fn missing_stats_yield_no_cards() {
        assert!(DashboardSummary::default().stat_cards().is_none());
    }

    #[test]
    fn athlete_name_skips_blank_parts() {
        let athlete = Athlete {
            id: Some(7),
            firstname: Some("Rini".to_string()),
            lastname: Some("  ".to_string()),
            profile: None,
        };
        assert_eq!(athlete.display_name(), "Rini");
        let summary = DashboardSummary {
            athlete: Some(Athlete::default()),
            ..Default::default()
        };
        assert_eq!(summary.athlete_name(), None);
    }
}
