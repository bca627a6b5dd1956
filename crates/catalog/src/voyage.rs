//! Voyage progress simulation.
//!
//! Turns the distinct expected-arrival dates found in the catalog into a
//! deterministic position/progress model along the fixed Incheon → Bangkok
//! route. Purely a function of `(arrival dates, now)`: no clocks are read
//! here, so every output is replayable.
//!
//! Waypoints are visual landmarks on the rendered route, not progress
//! checkpoints: their route percentages place them on a 1-D axis (origin at
//! the high end, destination at the low end) and their day offsets are
//! informational only. Progress itself is linear in time between departure
//! and arrival.

use chrono::{DateTime, Duration, Utc};

use crate::dates;

/// Route-wide transit duration in days. The domain has historically used
/// both 21 and 28; 21 matches the published route table below and is the
/// documented default. Overridable via `CATALOG_TRANSIT_DAYS`.
pub const DEFAULT_TRANSIT_DAYS: i64 = 21;

/// A named, fixed-position landmark along the rendered route.
#[derive(Debug, Clone, Copy)]
pub struct Waypoint {
    pub name: &'static str,
    /// Position on the rendered axis, percent.
    pub route_pct: f64,
    /// Nominal elapsed days from departure; informational only.
    pub day_offset: i64,
}

/// The fixed route, origin first.
pub const ROUTE: [Waypoint; 6] = [
    Waypoint { name: "INCHEON", route_pct: 93.0, day_offset: 0 },
    Waypoint { name: "BUSAN", route_pct: 80.0, day_offset: 2 },
    Waypoint { name: "SHANGHAI", route_pct: 65.0, day_offset: 5 },
    Waypoint { name: "HONG KONG", route_pct: 48.0, day_offset: 9 },
    Waypoint { name: "HO CHI MINH", route_pct: 28.0, day_offset: 15 },
    Waypoint { name: "BANGKOK", route_pct: 7.0, day_offset: 21 },
];

/// Display colors cycled across voyages, in schedule order.
pub const VOYAGE_COLORS: [&str; 4] = ["#e84040", "#3a7bd5", "#f5a623", "#27ae60"];

/// Where a voyage stands relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoyageStatus {
    /// Departure is still in the future.
    Pending,
    /// Somewhere between departure and arrival.
    InTransit,
    /// At or past the arrival date.
    Arrived,
}

impl VoyageStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InTransit => "in transit",
            Self::Arrived => "arrived",
        }
    }
}

/// One simulated shipment's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct VoyageSchedule {
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    /// "M/D arrival" display label.
    pub label: String,
    pub color: &'static str,
}

/// A voyage's rendered state at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct VoyagePosition {
    pub label: String,
    pub color: &'static str,
    /// Position on the rendered axis, percent.
    pub rendered_position: f64,
    /// Progress in percent, clamped to [0, 100].
    pub progress_percent: f64,
    pub status: VoyageStatus,
}

/// Computes voyage schedules and positions from raw arrival-date text.
#[derive(Debug, Clone, Copy)]
pub struct VoyageSimulator {
    transit_days: i64,
}

impl Default for VoyageSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSIT_DAYS)
    }
}

impl VoyageSimulator {
    /// Create a simulator with the given route-wide transit duration.
    #[must_use]
    pub const fn new(transit_days: i64) -> Self {
        Self { transit_days }
    }

    /// Build schedules from raw arrival-date strings.
    ///
    /// Unparseable entries are discarded; entries landing on the same
    /// calendar date collapse into one voyage (first occurrence wins).
    /// Colors follow input order, output is sorted by arrival ascending.
    #[must_use]
    pub fn schedules<'a>(
        &self,
        arrival_dates: impl IntoIterator<Item = &'a str>,
    ) -> Vec<VoyageSchedule> {
        let mut seen = std::collections::HashSet::new();
        let mut schedules = Vec::new();

        for raw in arrival_dates {
            let Some(arrival) = dates::parse_loose(raw) else {
                continue;
            };
            if !seen.insert(arrival.date_naive()) {
                continue;
            }

            let departure = arrival - Duration::days(self.transit_days);
            let color = VOYAGE_COLORS[schedules.len() % VOYAGE_COLORS.len()];
            schedules.push(VoyageSchedule {
                departure,
                arrival,
                label: format!("{}/{} arrival", arrival.format("%-m"), arrival.format("%-d")),
                color,
            });
        }

        schedules.sort_by_key(|s| s.arrival);
        schedules
    }

    /// Full simulation: schedules plus rendered positions at `now`.
    #[must_use]
    pub fn simulate<'a>(
        &self,
        arrival_dates: impl IntoIterator<Item = &'a str>,
        now: DateTime<Utc>,
    ) -> Vec<VoyagePosition> {
        self.schedules(arrival_dates)
            .iter()
            .map(|schedule| position(schedule, now))
            .collect()
    }
}

/// Fraction of the voyage completed at `now`, clamped to [0, 1].
///
/// The degenerate zero-length voyage counts as already arrived.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress(schedule: &VoyageSchedule, now: DateTime<Utc>) -> f64 {
    let total = (schedule.arrival - schedule.departure).num_seconds();
    if total <= 0 {
        return 1.0;
    }
    let elapsed = (now - schedule.departure).num_seconds();
    (elapsed as f64 / total as f64).clamp(0.0, 1.0)
}

/// A voyage's rendered state at `now`.
#[must_use]
pub fn position(schedule: &VoyageSchedule, now: DateTime<Utc>) -> VoyagePosition {
    let progress = progress(schedule, now);

    let origin = ROUTE[0].route_pct;
    let destination = ROUTE[ROUTE.len() - 1].route_pct;
    let rendered_position = origin + (destination - origin) * progress;

    let status = if progress <= 0.0 {
        VoyageStatus::Pending
    } else if progress >= 1.0 {
        VoyageStatus::Arrived
    } else {
        VoyageStatus::InTransit
    };

    VoyagePosition {
        label: schedule.label.clone(),
        color: schedule.color,
        rendered_position,
        progress_percent: progress * 100.0,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
    }

    fn date(days_from_now: i64) -> String {
        (now() + Duration::days(days_from_now))
            .format("%Y-%m-%d")
            .to_string()
    }

    #[test]
    fn in_transit_progress_matches_elapsed_fraction() {
        let sim = VoyageSimulator::new(21);
        let arrivals = [date(10)];
        let positions = sim.simulate(arrivals.iter().map(String::as_str), now());

        assert_eq!(positions.len(), 1);
        let voyage = &positions[0];
        assert_eq!(voyage.status, VoyageStatus::InTransit);
        // Departed 11 days ago on a 21-day route.
        let expected = 11.0 / 21.0;
        assert!((voyage.progress_percent / 100.0 - expected).abs() < 1e-9);
    }

    #[test]
    fn past_arrivals_are_arrived_and_future_departures_pending() {
        let sim = VoyageSimulator::new(21);

        let arrived = sim.simulate([date(-1).as_str()], now());
        assert_eq!(arrived[0].status, VoyageStatus::Arrived);
        assert!((arrived[0].progress_percent - 100.0).abs() < f64::EPSILON);

        // Arrival 25 days out means departure is still 4 days away.
        let pending = sim.simulate([date(25).as_str()], now());
        assert_eq!(pending[0].status, VoyageStatus::Pending);
        assert!(pending[0].progress_percent.abs() < f64::EPSILON);
    }

    #[test]
    fn duplicate_arrival_dates_collapse_to_one_schedule() {
        let sim = VoyageSimulator::default();
        let schedules = sim.schedules(["2024-04-05", "2024-04-05", "2024.4.5"]);
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].label, "4/5 arrival");
    }

    #[test]
    fn unparseable_entries_are_discarded() {
        let sim = VoyageSimulator::default();
        let schedules = sim.schedules(["soon", "", "2024-04-05"]);
        assert_eq!(schedules.len(), 1);
    }

    #[test]
    fn output_is_sorted_by_arrival_with_stable_colors() {
        let sim = VoyageSimulator::default();
        let schedules = sim.schedules(["2024-05-01", "2024-04-05"]);
        assert_eq!(schedules[0].label, "4/5 arrival");
        assert_eq!(schedules[1].label, "5/1 arrival");
        // Colors were assigned in input order, before sorting.
        assert_eq!(schedules[0].color, VOYAGE_COLORS[1]);
        assert_eq!(schedules[1].color, VOYAGE_COLORS[0]);
    }

    #[test]
    fn rendered_position_interpolates_the_visual_axis() {
        let schedule = VoyageSchedule {
            departure: now() - Duration::days(7),
            arrival: now() + Duration::days(7),
            label: "test".to_owned(),
            color: VOYAGE_COLORS[0],
        };
        let voyage = position(&schedule, now());
        // Halfway: midpoint between 93% and 7%.
        assert!((voyage.rendered_position - 50.0).abs() < 1e-9);
        assert_eq!(voyage.status, VoyageStatus::InTransit);
    }

    #[test]
    fn degenerate_zero_length_voyage_is_arrived() {
        let instant = now();
        let schedule = VoyageSchedule {
            departure: instant,
            arrival: instant,
            label: "test".to_owned(),
            color: VOYAGE_COLORS[0],
        };
        assert!((progress(&schedule, instant) - 1.0).abs() < f64::EPSILON);
        assert_eq!(position(&schedule, instant).status, VoyageStatus::Arrived);
    }
}
