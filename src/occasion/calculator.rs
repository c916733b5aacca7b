//! Next-prayer and occasion-window rules.
//!
//! Everything here is a pure function of a [`DailyTimings`] snapshot and the
//! current instant in the board's timezone. The Islamic day begins at
//! Maghrib, so both occasion windows open and close at sunset rather than at
//! midnight.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;

use crate::models::{DailyTimings, NextPrayerCandidate, Occasion, OccasionWindow, PrayerName};
use crate::utils::time::local_instant;

/// Rajab, the 7th Hijri month.
pub const MIRAJ_MONTH: u32 = 7;
/// The night of the 27th begins at Maghrib on the Hijri 27th as reported
/// upstream, and lasts until Maghrib on the 28th.
pub const MIRAJ_NIGHT_DAY: u32 = 27;

pub fn default_jummah_time() -> NaiveTime {
    NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// The next prayer strictly after `now`.
///
/// Candidates are Fajr, the midday prayer, Asr, Maghrib and Isha on the
/// [`anchor_date`]. On Fridays the midday prayer is Jummah at the fixed
/// `jummah_time` instead of the provider's Dhuhr.
///
/// When every candidate has passed, the result is Fajr on the day after the
/// anchor at the snapshot's Fajr clock time. Tomorrow's real Fajr drifts by a
/// minute or so; the snapshot is refreshed after midnight anyway.
pub fn compute_next_prayer(
    timings: &DailyTimings,
    now: &DateTime<Tz>,
    weekday: Weekday,
    jummah_time: NaiveTime,
) -> NextPrayerCandidate {
    let tz = now.timezone();
    let date = anchor_date(timings, now);
    let (midday, midday_time) = if weekday == Weekday::Fri {
        (PrayerName::Jummah, jummah_time)
    } else {
        (PrayerName::Dhuhr, timings.dhuhr)
    };

    let candidates = [
        (PrayerName::Fajr, timings.fajr),
        (midday, midday_time),
        (PrayerName::Asr, timings.asr),
        (PrayerName::Maghrib, timings.maghrib),
        (PrayerName::Isha, timings.isha),
    ];

    let upcoming = candidates
        .iter()
        .map(|(prayer, time)| (*prayer, *time, local_instant(&tz, date, *time)))
        .find(|(_, _, instant)| instant > now);

    match upcoming {
        Some((prayer, time, instant)) => NextPrayerCandidate {
            prayer,
            instant,
            time,
            tomorrow: false,
        },
        None => {
            let tomorrow = next_day(date);
            NextPrayerCandidate {
                prayer: PrayerName::Fajr,
                instant: local_instant(&tz, tomorrow, timings.fajr),
                time: timings.fajr,
                tomorrow: true,
            }
        }
    }
}

/// The day the snapshot's clock times are applied to: its own date, or
/// today when the snapshot is older than `now` (a refresh has failed).
pub fn anchor_date(timings: &DailyTimings, now: &DateTime<Tz>) -> NaiveDate {
    timings.date.max(now.date_naive())
}

/// Jummah banner: from Thursday's Maghrib until Friday's Maghrib.
pub fn should_show_weekly_window(
    now: &DateTime<Tz>,
    maghrib_today: &DateTime<Tz>,
    is_thursday: bool,
    is_friday: bool,
) -> bool {
    if is_thursday {
        return now >= maghrib_today;
    }
    if is_friday {
        return now < maghrib_today;
    }
    false
}

/// Shabe Miraj banner: from Maghrib on the Hijri 27th until Maghrib on the
/// 28th. Only the supplied day flags are consulted; `_maghrib_tomorrow` is
/// the close of the window as seen from the 27th and does not change the
/// answer.
pub fn should_show_lunar_night_window(
    now: &DateTime<Tz>,
    maghrib_today: &DateTime<Tz>,
    _maghrib_tomorrow: Option<&DateTime<Tz>>,
    is_day_27: bool,
    is_day_28: bool,
) -> bool {
    if is_day_27 {
        return now >= maghrib_today;
    }
    if is_day_28 {
        return now < maghrib_today;
    }
    false
}

/// Maghrib on the snapshot's own date.
pub fn maghrib_today(timings: &DailyTimings, tz: &Tz) -> DateTime<Tz> {
    local_instant(tz, timings.date, timings.maghrib)
}

/// Maghrib on the following date, using today's clock time.
pub fn maghrib_tomorrow(timings: &DailyTimings, tz: &Tz) -> DateTime<Tz> {
    local_instant(tz, next_day(timings.date), timings.maghrib)
}

/// Whether `occasion` should be on screen at `now`. The day rules decide on
/// the snapshot's own date; the window bounds them, so an old snapshot never
/// keeps a banner up past its closing Maghrib.
pub fn is_visible(occasion: Occasion, timings: &DailyTimings, now: &DateTime<Tz>) -> bool {
    let tz = now.timezone();
    let maghrib = maghrib_today(timings, &tz);
    let by_rule = match occasion {
        Occasion::Jummah => should_show_weekly_window(
            now,
            &maghrib,
            timings.is_thursday(),
            timings.is_friday(),
        ),
        Occasion::ShabeMiraj => {
            let (day_27, day_28) = miraj_flags(timings);
            let tomorrow = (day_27 || day_28).then(|| maghrib_tomorrow(timings, &tz));
            should_show_lunar_night_window(now, &maghrib, tomorrow.as_ref(), day_27, day_28)
        }
    };
    by_rule && window_for(occasion, timings, &tz).is_some_and(|w| w.contains(now))
}

/// `(is 27 Rajab, is 28 Rajab)` for the snapshot's Hijri date.
pub fn miraj_flags(timings: &DailyTimings) -> (bool, bool) {
    (
        timings.hijri.is(MIRAJ_MONTH, MIRAJ_NIGHT_DAY),
        timings.hijri.is(MIRAJ_MONTH, MIRAJ_NIGHT_DAY + 1),
    )
}

/// The Jummah window touching the snapshot's date, if any.
pub fn weekly_window(timings: &DailyTimings, tz: &Tz) -> Option<OccasionWindow> {
    let start_date = match timings.weekday {
        Weekday::Thu => timings.date,
        Weekday::Fri => prev_day(timings.date),
        _ => return None,
    };
    Some(sunset_window(Occasion::Jummah, start_date, timings.maghrib, tz))
}

/// The Shabe Miraj window touching the snapshot's date, if any.
pub fn lunar_night_window(timings: &DailyTimings, tz: &Tz) -> Option<OccasionWindow> {
    let start_date = match miraj_flags(timings) {
        (true, _) => timings.date,
        (_, true) => prev_day(timings.date),
        _ => return None,
    };
    Some(sunset_window(Occasion::ShabeMiraj, start_date, timings.maghrib, tz))
}

pub fn window_for(occasion: Occasion, timings: &DailyTimings, tz: &Tz) -> Option<OccasionWindow> {
    match occasion {
        Occasion::Jummah => weekly_window(timings, tz),
        Occasion::ShabeMiraj => lunar_night_window(timings, tz),
    }
}

/// Maghrib-to-Maghrib interval starting on `start_date`. Both ends use the
/// same clock time.
fn sunset_window(
    occasion: Occasion,
    start_date: NaiveDate,
    maghrib: NaiveTime,
    tz: &Tz,
) -> OccasionWindow {
    OccasionWindow {
        occasion,
        start: local_instant(tz, start_date, maghrib),
        end: local_instant(tz, next_day(start_date), maghrib),
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date + Duration::days(1))
}

fn prev_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date - Duration::days(1))
}
