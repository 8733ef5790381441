//! Mood and journal analytics: time-weighted mood statistics, taxonomy
//! distribution, and week-over-week positive-mood trends.
//!
//! Everything here is a pure function over already-fetched rows; the handlers
//! own the queries and the windowing.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::journal::Journal;
use crate::models::mood::{MoodSession, MoodStatEntry};

/// The fixed mood taxonomy, best to worst.
pub const MOOD_LABELS: [&str; 5] = ["Hebat", "Baik", "Oke", "Buruk", "SangatBuruk"];

/// Moods counted as positive for trend purposes. Exact, case-sensitive match.
pub const POSITIVE_MOODS: [&str; 2] = ["Hebat", "Baik"];

pub fn is_positive(mood: &str) -> bool {
    POSITIVE_MOODS.contains(&mood)
}

/// Whole minutes between two instants, rounded half away from zero.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    ((end - start).num_milliseconds() as f64 / 60_000.0).round() as i32
}

/// Per-mood total minutes, occurrence count, and percentage share over a set
/// of closed sessions. Sessions without a recorded duration are skipped.
/// Percentages are left as raw floats here; `distribution` rounds instead.
pub fn aggregate_stats(sessions: &[MoodSession]) -> (i64, HashMap<String, MoodStatEntry>) {
    let mut stats: HashMap<String, MoodStatEntry> = HashMap::new();
    let mut total_minutes: i64 = 0;

    for session in sessions {
        if let Some(minutes) = session.duration_minutes {
            let entry = stats.entry(session.mood.clone()).or_default();
            entry.total_minutes += minutes as i64;
            entry.count += 1;
            total_minutes += minutes as i64;
        }
    }

    if total_minutes > 0 {
        for entry in stats.values_mut() {
            entry.percentage = entry.total_minutes as f64 / total_minutes as f64 * 100.0;
        }
    }

    (total_minutes, stats)
}

/// Occurrence share of each taxonomy mood over the given sessions, rounded to
/// two decimals. Every taxonomy label is present in the output even at zero.
///
/// `total_entries` counts every matched row, moods outside the taxonomy
/// included, while only taxonomy moods contribute to the numerators — so the
/// percentages sum below 100 whenever stray labels exist. That mirrors the
/// shipped behavior; see DESIGN.md.
pub fn mood_distribution(sessions: &[MoodSession]) -> (i64, BTreeMap<String, f64>) {
    let mut counts: BTreeMap<&str, i64> = MOOD_LABELS.iter().map(|label| (*label, 0)).collect();

    for session in sessions {
        if let Some(count) = counts.get_mut(session.mood.as_str()) {
            *count += 1;
        }
    }

    let total_entries = sessions.len() as i64;
    let distribution = counts
        .into_iter()
        .map(|(mood, count)| {
            let pct = if total_entries > 0 {
                round2(count as f64 / total_entries as f64 * 100.0)
            } else {
                0.0
            };
            (mood.to_string(), pct)
        })
        .collect();

    (total_entries, distribution)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Journal tallies for one calendar week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekBucket {
    pub total: u32,
    pub positive: u32,
}

/// The Sunday on or before the given date.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Group journals into calendar weeks keyed by their starting Sunday. The
/// BTreeMap keeps the weeks in chronological order.
pub fn bucket_journals_by_week(journals: &[Journal]) -> BTreeMap<NaiveDate, WeekBucket> {
    let mut weeks: BTreeMap<NaiveDate, WeekBucket> = BTreeMap::new();

    for journal in journals {
        let bucket = weeks
            .entry(week_start(journal.created_at.date_naive()))
            .or_default();
        bucket.total += 1;
        if is_positive(&journal.mood) {
            bucket.positive += 1;
        }
    }

    weeks
}

/// Share of recorded session minutes spent in a positive mood, 0 when no
/// minutes were recorded.
pub fn positive_mood_percentage(sessions: &[MoodSession]) -> f64 {
    let mut total: i64 = 0;
    let mut positive: i64 = 0;

    for session in sessions {
        if let Some(minutes) = session.duration_minutes {
            total += minutes as i64;
            if is_positive(&session.mood) {
                positive += minutes as i64;
            }
        }
    }

    if total > 0 {
        positive as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Week-over-week change in the positive-journal ratio, as a whole percentage.
///
/// With at least two weeks of journal data the delta is taken between the
/// first and last observed week. With less, a session-derived baseline kicks
/// in: any time-weighted positive share above 50% counts as that much growth.
pub fn growth_percentage(weeks: &BTreeMap<NaiveDate, WeekBucket>, positive_pct: f64) -> i64 {
    let growth = match (weeks.values().next(), weeks.values().last()) {
        (Some(first), Some(last)) if weeks.len() >= 2 => {
            let first_ratio = first.positive as f64 / first.total as f64;
            let last_ratio = last.positive as f64 / last.total as f64;
            last_ratio * 100.0 - first_ratio * 100.0
        }
        _ if positive_pct > 50.0 => positive_pct - 50.0,
        _ => 0.0,
    };

    growth.round() as i64
}

/// Trend summary shown to the user, keyed on the sign of the growth figure.
pub fn progress_message(period_days: i64, growth: i64) -> String {
    if growth > 0 {
        format!(
            "Dalam {} hari terakhir, mood positif Anda meningkat sekitar {}%. Pertahankan kebiasaan baik Anda!",
            period_days, growth
        )
    } else if growth < 0 {
        format!(
            "Dalam {} hari terakhir, mood positif Anda menurun sekitar {}%. Jangan berkecil hati, luangkan waktu untuk hal-hal yang Anda nikmati.",
            period_days,
            growth.abs()
        )
    } else {
        format!(
            "Mood Anda cenderung stabil dalam {} hari terakhir. Terus jaga kesehatan mental Anda!",
            period_days
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use uuid::Uuid;

    fn ts(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn session(mood: &str, start: &str, duration: Option<i32>) -> MoodSession {
        let start_time = ts(start);
        MoodSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            mood: mood.to_string(),
            start_time,
            end_time: duration.map(|m| start_time + Duration::minutes(m as i64)),
            duration_minutes: duration,
            created_at: start_time,
        }
    }

    fn journal(mood: &str, created: &str) -> Journal {
        let created_at = ts(created);
        Journal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            mood: mood.to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_duration_minutes_rounds_half_up() {
        let start = ts("2024-01-01 10:00:00");
        assert_eq!(duration_minutes(start, start), 0);
        assert_eq!(duration_minutes(start, ts("2024-01-01 10:01:29")), 1);
        assert_eq!(duration_minutes(start, ts("2024-01-01 10:01:30")), 2);
        assert_eq!(duration_minutes(start, ts("2024-01-01 11:00:00")), 60);
    }

    #[test]
    fn test_aggregate_stats_empty() {
        let (total, stats) = aggregate_stats(&[]);
        assert_eq!(total, 0);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_aggregate_stats_per_mood_totals_and_percentages() {
        let sessions = vec![
            session("Hebat", "2024-01-01 08:00:00", Some(30)),
            session("Hebat", "2024-01-01 09:00:00", Some(60)),
            session("Buruk", "2024-01-01 10:00:00", Some(30)),
        ];
        let (total, stats) = aggregate_stats(&sessions);

        assert_eq!(total, 120);
        assert_eq!(stats["Hebat"].total_minutes, 90);
        assert_eq!(stats["Hebat"].count, 2);
        assert!((stats["Hebat"].percentage - 75.0).abs() < f64::EPSILON);
        assert_eq!(stats["Buruk"].total_minutes, 30);
        assert!((stats["Buruk"].percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_aggregate_stats_skips_sessions_without_duration() {
        let sessions = vec![
            session("Oke", "2024-01-01 08:00:00", Some(10)),
            session("Oke", "2024-01-01 09:00:00", None),
        ];
        let (total, stats) = aggregate_stats(&sessions);

        assert_eq!(total, 10);
        assert_eq!(stats["Oke"].count, 1);
    }

    #[test]
    fn test_distribution_empty_returns_all_labels_at_zero() {
        let (total, dist) = mood_distribution(&[]);

        assert_eq!(total, 0);
        assert_eq!(dist.len(), MOOD_LABELS.len());
        for label in MOOD_LABELS {
            assert_eq!(dist[label], 0.0);
        }
    }

    #[test]
    fn test_distribution_in_taxonomy_sums_to_hundred() {
        let sessions = vec![
            session("Hebat", "2024-01-01 08:00:00", Some(5)),
            session("Baik", "2024-01-01 09:00:00", Some(5)),
            session("Baik", "2024-01-01 10:00:00", Some(5)),
            session("SangatBuruk", "2024-01-01 11:00:00", Some(5)),
        ];
        let (total, dist) = mood_distribution(&sessions);

        assert_eq!(total, 4);
        assert_eq!(dist["Hebat"], 25.0);
        assert_eq!(dist["Baik"], 50.0);
        assert_eq!(dist["SangatBuruk"], 25.0);
        assert_eq!(dist["Oke"], 0.0);
        let sum: f64 = dist.values().sum();
        assert!((sum - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_distribution_counts_stray_moods_in_total() {
        // A label outside the taxonomy inflates total_entries but earns no
        // percentage slot, so the shares no longer sum to 100.
        let sessions = vec![
            session("Hebat", "2024-01-01 08:00:00", Some(5)),
            session("senang sekali", "2024-01-01 09:00:00", Some(5)),
        ];
        let (total, dist) = mood_distribution(&sessions);

        assert_eq!(total, 2);
        assert_eq!(dist["Hebat"], 50.0);
        let sum: f64 = dist.values().sum();
        assert!(sum < 100.0);
    }

    #[test]
    fn test_week_start_is_preceding_sunday() {
        // 2024-01-10 was a Wednesday
        let wednesday = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(week_start(wednesday), NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());

        // A Sunday maps to itself
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(week_start(sunday), sunday);
    }

    #[test]
    fn test_positive_mood_percentage_no_minutes() {
        assert_eq!(positive_mood_percentage(&[]), 0.0);
        let open_only = vec![session("Hebat", "2024-01-01 08:00:00", None)];
        assert_eq!(positive_mood_percentage(&open_only), 0.0);
    }

    #[test]
    fn test_positive_mood_percentage_time_weighted() {
        let sessions = vec![
            session("Hebat", "2024-01-01 08:00:00", Some(60)),
            session("Baik", "2024-01-01 09:00:00", Some(10)),
            session("Buruk", "2024-01-01 10:00:00", Some(30)),
        ];
        assert!((positive_mood_percentage(&sessions) - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_growth_single_week_uses_session_baseline() {
        let journals = vec![journal("Baik", "2024-01-08 09:00:00")];
        let weeks = bucket_journals_by_week(&journals);
        assert_eq!(weeks.len(), 1);

        assert_eq!(growth_percentage(&weeks, 70.0), 20);
        assert_eq!(growth_percentage(&weeks, 40.0), 0);
        assert_eq!(growth_percentage(&weeks, 50.0), 0);
    }

    #[test]
    fn test_growth_two_weeks_delta() {
        // Week of 2024-01-07: 1 positive out of 2. Week of 2024-01-21: 3 of 3.
        let journals = vec![
            journal("Hebat", "2024-01-08 09:00:00"),
            journal("Buruk", "2024-01-10 09:00:00"),
            journal("Hebat", "2024-01-22 09:00:00"),
            journal("Baik", "2024-01-23 09:00:00"),
            journal("Hebat", "2024-01-25 09:00:00"),
        ];
        let weeks = bucket_journals_by_week(&journals);
        assert_eq!(weeks.len(), 2);
        assert_eq!(
            weeks[&NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()],
            WeekBucket { total: 2, positive: 1 }
        );
        assert_eq!(
            weeks[&NaiveDate::from_ymd_opt(2024, 1, 21).unwrap()],
            WeekBucket { total: 3, positive: 3 }
        );

        assert_eq!(growth_percentage(&weeks, 0.0), 50);
    }

    #[test]
    fn test_growth_declining_weeks_is_negative() {
        let journals = vec![
            journal("Hebat", "2024-01-08 09:00:00"),
            journal("Buruk", "2024-01-22 09:00:00"),
        ];
        let weeks = bucket_journals_by_week(&journals);

        assert_eq!(growth_percentage(&weeks, 90.0), -100);
    }

    #[test]
    fn test_progress_message_templates() {
        assert!(progress_message(30, 20).contains("meningkat"));
        assert!(progress_message(30, -15).contains("menurun"));
        assert!(progress_message(30, -15).contains("15%"));
        assert!(progress_message(30, 0).contains("stabil"));
    }
}
