use chrono::{DateTime, Datelike, NaiveTime};
use chrono_tz::Tz;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::models::{DailyTimings, NextPrayerCandidate, Occasion, OccasionWindow, Visibility};
use crate::occasion::calculator;

/// A running countdown towards one candidate. Replacing it with a new one
/// bumps `generation`; readers holding an old generation get nothing back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub generation: u64,
    pub target: DateTime<Tz>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub occasion: Occasion,
    pub from: Visibility,
    pub to: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// No timings yet; the UI shows a loading or error state.
    Waiting,
    Remaining(i64),
    /// The countdown reached zero. The board has already moved to the next
    /// candidate; the caller should request fresh timings.
    Expired,
}

/// The board's whole mutable state. Timings are shared as an `Arc` and
/// swapped wholesale; everything else is re-derived from them.
#[derive(Debug, Clone)]
pub struct Board {
    tz: Tz,
    jummah_time: NaiveTime,
    timings: Option<Arc<DailyTimings>>,
    active: Option<NextPrayerCandidate>,
    countdown: Option<Countdown>,
    jummah: Visibility,
    shabe_miraj: Visibility,
    generation: u64,
    last_error: Option<String>,
}

impl Board {
    pub fn new(tz: Tz, jummah_time: NaiveTime) -> Self {
        Self {
            tz,
            jummah_time,
            timings: None,
            active: None,
            countdown: None,
            jummah: Visibility::Hidden,
            shabe_miraj: Visibility::Hidden,
            generation: 0,
            last_error: None,
        }
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    pub fn timings(&self) -> Option<&Arc<DailyTimings>> {
        self.timings.as_ref()
    }

    pub fn next_prayer(&self) -> Option<&NextPrayerCandidate> {
        self.active.as_ref()
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn visibility(&self, occasion: Occasion) -> Visibility {
        match occasion {
            Occasion::Jummah => self.jummah,
            Occasion::ShabeMiraj => self.shabe_miraj,
        }
    }

    pub fn window(&self, occasion: Occasion) -> Option<OccasionWindow> {
        let timings = self.timings.as_ref()?;
        calculator::window_for(occasion, timings, &self.tz)
    }

    /// Replace the snapshot, pick the next prayer, restart the countdown and
    /// re-evaluate both windows.
    pub fn install(&mut self, timings: Arc<DailyTimings>, now: &DateTime<Tz>) -> Vec<Transition> {
        info!(
            "Installed timings for {} ({} AH)",
            timings.date,
            timings.hijri.numeric()
        );
        self.timings = Some(timings);
        self.last_error = None;
        self.select_next(now);
        self.reevaluate(now)
    }

    /// Keep the current snapshot and record why the refresh failed.
    pub fn fetch_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.timings.is_some() {
            warn!("Timings refresh failed, keeping last snapshot: {}", reason);
        } else {
            warn!("Timings fetch failed and no snapshot is available: {}", reason);
        }
        self.last_error = Some(reason);
    }

    /// Recompute window visibility against the retained snapshot. Calling it
    /// twice at the same instant yields no transitions the second time.
    pub fn reevaluate(&mut self, now: &DateTime<Tz>) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for occasion in Occasion::all() {
            let to = match &self.timings {
                Some(timings) => {
                    Visibility::from_bool(calculator::is_visible(occasion, timings, now))
                }
                None => Visibility::Hidden,
            };
            let slot = match occasion {
                Occasion::Jummah => &mut self.jummah,
                Occasion::ShabeMiraj => &mut self.shabe_miraj,
            };
            if *slot != to {
                info!("{} banner {:?} -> {:?}", occasion.display_name(), slot, to);
                transitions.push(Transition {
                    occasion,
                    from: *slot,
                    to,
                });
                *slot = to;
            }
        }
        transitions
    }

    /// Per-second countdown step.
    pub fn tick(&mut self, now: &DateTime<Tz>) -> Tick {
        let Some(countdown) = &self.countdown else {
            return Tick::Waiting;
        };
        let remaining = (countdown.target - *now).num_seconds();
        if remaining > 0 {
            return Tick::Remaining(remaining);
        }
        debug!("Countdown {} expired", countdown.generation);
        self.select_next(now);
        Tick::Expired
    }

    /// Seconds left on countdown `generation`, or `None` if it has since
    /// been replaced.
    pub fn remaining(&self, generation: u64, now: &DateTime<Tz>) -> Option<i64> {
        let countdown = self.countdown.as_ref()?;
        if countdown.generation != generation {
            return None;
        }
        Some((countdown.target - *now).num_seconds().max(0))
    }

    fn select_next(&mut self, now: &DateTime<Tz>) {
        let Some(timings) = &self.timings else {
            return;
        };
        let weekday = calculator::anchor_date(timings, now).weekday();
        let candidate = calculator::compute_next_prayer(timings, now, weekday, self.jummah_time);
        debug!(
            "Next prayer: {} at {}",
            candidate.prayer,
            candidate.instant.format("%Y-%m-%d %H:%M")
        );
        self.start_countdown(candidate.instant);
        self.active = Some(candidate);
    }

    fn start_countdown(&mut self, target: DateTime<Tz>) {
        self.generation += 1;
        self.countdown = Some(Countdown {
            generation: self.generation,
            target,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timings::fixtures::{friday, thursday, timings_on, wednesday};
    use crate::models::PrayerName;
    use crate::occasion::calculator::default_jummah_time;
    use crate::utils::time::local_instant;
    use chrono::NaiveDate;

    fn at(date: NaiveDate, hh: u32, mm: u32) -> DateTime<Tz> {
        local_instant(
            &chrono_tz::Asia::Karachi,
            date,
            NaiveTime::from_hms_opt(hh, mm, 0).unwrap(),
        )
    }

    fn board() -> Board {
        Board::new(chrono_tz::Asia::Karachi, default_jummah_time())
    }

    #[test]
    fn empty_board_is_hidden_and_waiting() {
        let mut b = board();
        let now = at(thursday(), 20, 0);
        assert!(b.reevaluate(&now).is_empty());
        assert_eq!(b.visibility(Occasion::Jummah), Visibility::Hidden);
        assert!(b.next_prayer().is_none());
        assert_eq!(b.tick(&now), Tick::Waiting);
    }

    #[test]
    fn install_sets_initial_state() {
        let mut b = board();
        let now = at(thursday(), 18, 10);
        let transitions = b.install(Arc::new(timings_on(thursday(), 7, 2)), &now);
        assert_eq!(
            transitions,
            vec![Transition {
                occasion: Occasion::Jummah,
                from: Visibility::Hidden,
                to: Visibility::Visible,
            }]
        );
        assert_eq!(b.next_prayer().unwrap().prayer, PrayerName::Isha);
    }

    #[test]
    fn reevaluate_is_idempotent() {
        let mut b = board();
        b.install(Arc::new(timings_on(thursday(), 7, 27)), &at(thursday(), 12, 0));
        let now = at(thursday(), 18, 30);
        let first = b.reevaluate(&now);
        let state = (b.visibility(Occasion::Jummah), b.visibility(Occasion::ShabeMiraj));
        let second = b.reevaluate(&now);
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(
            state,
            (b.visibility(Occasion::Jummah), b.visibility(Occasion::ShabeMiraj))
        );
        assert_eq!(state, (Visibility::Visible, Visibility::Visible));
    }

    #[test]
    fn stale_snapshot_still_flips_at_maghrib() {
        let mut b = board();
        b.install(Arc::new(timings_on(friday(), 7, 3)), &at(friday(), 9, 0));
        assert!(b.visibility(Occasion::Jummah).is_visible());
        b.fetch_failed("connection refused");
        let t = b.reevaluate(&at(friday(), 18, 3));
        assert_eq!(t.len(), 1);
        assert_eq!(b.visibility(Occasion::Jummah), Visibility::Hidden);
        assert_eq!(b.last_error(), Some("connection refused"));
        assert!(b.timings().is_some());
    }

    #[test]
    fn new_countdown_cancels_the_old_one() {
        let mut b = board();
        let now = at(wednesday(), 12, 30);
        b.install(Arc::new(timings_on(wednesday(), 7, 1)), &now);
        let old = b.countdown().unwrap().generation;
        assert!(b.remaining(old, &now).is_some());

        b.install(Arc::new(timings_on(wednesday(), 7, 1)), &now);
        let new = b.countdown().unwrap().generation;
        assert_ne!(old, new);
        assert!(b.remaining(old, &now).is_none());
        assert_eq!(b.remaining(new, &now), Some(3 * 3600 + 10 * 60));
    }

    #[test]
    fn expiry_moves_to_next_candidate() {
        let mut b = board();
        b.install(Arc::new(timings_on(wednesday(), 7, 1)), &at(wednesday(), 12, 30));
        assert_eq!(b.tick(&at(wednesday(), 15, 39)), Tick::Remaining(60));
        assert_eq!(b.tick(&at(wednesday(), 15, 40)), Tick::Expired);
        assert_eq!(b.next_prayer().unwrap().prayer, PrayerName::Maghrib);
    }

    #[test]
    fn thursday_snapshot_hides_jummah_on_later_days() {
        let mut b = board();
        b.install(Arc::new(timings_on(thursday(), 7, 2)), &at(thursday(), 19, 0));
        assert!(b.visibility(Occasion::Jummah).is_visible());
        b.fetch_failed("timeout");

        b.reevaluate(&at(friday(), 12, 0));
        assert!(b.visibility(Occasion::Jummah).is_visible());
        b.reevaluate(&at(friday(), 19, 0));
        assert_eq!(b.visibility(Occasion::Jummah), Visibility::Hidden);
        let sunday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert!(b.reevaluate(&at(sunday, 10, 0)).is_empty());
        assert_eq!(b.visibility(Occasion::Jummah), Visibility::Hidden);
    }

    #[test]
    fn miraj_snapshot_hides_after_the_28th() {
        let mut b = board();
        b.install(Arc::new(timings_on(wednesday(), 7, 27)), &at(wednesday(), 20, 0));
        assert!(b.visibility(Occasion::ShabeMiraj).is_visible());
        b.fetch_failed("timeout");
        b.reevaluate(&at(thursday(), 18, 2));
        assert_eq!(b.visibility(Occasion::ShabeMiraj), Visibility::Hidden);
        b.reevaluate(&at(friday(), 20, 0));
        assert_eq!(b.visibility(Occasion::ShabeMiraj), Visibility::Hidden);
    }

    #[test]
    fn yesterdays_snapshot_counts_down_to_todays_fajr() {
        let mut b = board();
        let now = at(thursday(), 0, 30);
        b.install(Arc::new(timings_on(wednesday(), 7, 1)), &now);
        let next = b.next_prayer().unwrap();
        assert_eq!(next.prayer, PrayerName::Fajr);
        assert_eq!(next.instant, at(thursday(), 5, 10));
        let generation = b.countdown().unwrap().generation;
        assert_eq!(b.remaining(generation, &now), Some(4 * 3600 + 40 * 60));
    }

    #[test]
    fn thursday_snapshot_on_friday_targets_jummah() {
        let mut b = board();
        b.install(Arc::new(timings_on(thursday(), 7, 2)), &at(friday(), 9, 0));
        let next = b.next_prayer().unwrap();
        assert_eq!(next.prayer, PrayerName::Jummah);
        assert_eq!(next.instant, at(friday(), 14, 0));
    }

    #[test]
    fn window_is_exposed_for_display() {
        let mut b = board();
        b.install(Arc::new(timings_on(thursday(), 7, 1)), &at(thursday(), 10, 0));
        let w = b.window(Occasion::Jummah).unwrap();
        assert_eq!(w.start, at(thursday(), 18, 2));
        assert!(b.window(Occasion::ShabeMiraj).is_none());
    }
}
