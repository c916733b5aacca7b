use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use rusqlite::Connection;
use std::io::{self, Read};
use std::sync::Arc;

use crate::cli::args::RemindCommands;
use crate::config::AppConfig;
use crate::db::repository::ReminderRepo;
use crate::models::{
    DailyTimings, NextPrayerCandidate, Occasion, PrayerName, Reminder, ScheduleMessage,
};
use crate::notify::{build_schedule, NotificationScheduler};
use crate::occasion::Board;
use crate::prayer_times::{self, calendar, load_day, load_month};
use crate::quran::{self, QuranClient};
use crate::utils::format::{format_countdown, format_duration_secs, format_time, pad_display};
use crate::utils::time::sanitize_time;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn now_in(config: &AppConfig) -> Result<DateTime<Tz>> {
    Ok(Utc::now().with_timezone(&config.masjid.tz()?))
}

fn board_for(config: &AppConfig, timings: DailyTimings, now: &DateTime<Tz>) -> Result<Board> {
    let mut board = Board::new(config.masjid.tz()?, config.masjid.jummah()?);
    board.install(Arc::new(timings), now);
    Ok(board)
}

fn warn_stale(stale: &Option<String>) {
    if let Some(reason) = stale {
        println_colored!(AMBER, "  ⚠ Showing cached timings ({})", reason);
        println!();
    }
}

fn next_line(next: &NextPrayerCandidate, now: &DateTime<Tz>) -> String {
    let when = if next.tomorrow { " tomorrow" } else { "" };
    format!(
        "Next: {} at {}{} (in {})",
        next.prayer.display_name(),
        next.display_time(),
        when,
        format_duration_secs(next.seconds_until(now))
    )
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(conn: &Connection, config: &AppConfig, date: Option<&str>) -> Result<()> {
    let now = now_in(config)?;
    let today = now.date_naive();
    let date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| anyhow!("Bad date '{}', expected YYYY-MM-DD", s))?,
        None => today,
    };

    let provider = prayer_times::from_config(&config.masjid)?;
    let loaded = load_day(conn, provider.as_ref(), date)?;
    let timings = loaded.value;

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {} ({}, {})",
        config.masjid.name,
        timings.date.format("%a %d %b %Y"),
        timings.hijri.formatted()
    );
    println!();
    warn_stale(&loaded.stale);

    let board = (date == today)
        .then(|| board_for(config, timings.clone(), &now))
        .transpose()?;
    let active = board.as_ref().and_then(|b| b.next_prayer()).map(|n| n.prayer);

    // Jummah takes Dhuhr's row on Fridays.
    let jummah = config.masjid.jummah()?;
    let mut rows: Vec<(PrayerName, String)> = timings
        .schedule()
        .iter()
        .map(|(p, t)| match p {
            PrayerName::Dhuhr if timings.is_friday() => (PrayerName::Jummah, format_time(jummah)),
            _ => (*p, format_time(*t)),
        })
        .collect();
    rows.sort_by(|a, b| a.1.cmp(&b.1));

    let now_hm = now.format("%H:%M").to_string();
    for (prayer, time) in &rows {
        let past = date < today || (date == today && *time < now_hm);
        let line = format!(
            "  {:<10}{}  {}",
            prayer.display_name(),
            pad_display(prayer.urdu_name(), 12),
            time
        );
        if Some(*prayer) == active {
            println_colored!(AMBER, "▸{}", &line[1..]);
        } else if past {
            println_colored!(DIM, "{}", line);
        } else {
            println_colored!(BOLD, "{}", line);
        }
    }

    if let Some(board) = &board {
        if let Some(next) = board.next_prayer() {
            println!();
            println_colored!(AMBER, "  {}", next_line(next, &now));
        }
        print_banners(board);
    }
    println!();
    Ok(())
}

fn print_banners(board: &Board) {
    for occasion in Occasion::all() {
        if board.visibility(occasion).is_visible() {
            println!();
            println_colored!(
                GREEN,
                "  ✦ {} ({})",
                occasion.display_name(),
                occasion.urdu_name()
            );
            println_colored!(DIM, "    {}", occasion.reminder());
        }
    }
}

// ─── Next ────────────────────────────────────────────────────────────────────

pub fn handle_next(conn: &Connection, config: &AppConfig) -> Result<()> {
    let now = now_in(config)?;
    let provider = prayer_times::from_config(&config.masjid)?;
    let loaded = load_day(conn, provider.as_ref(), now.date_naive())?;
    let board = board_for(config, loaded.value, &now)?;

    let next = board
        .next_prayer()
        .ok_or_else(|| anyhow!("No upcoming prayer could be determined"))?;
    let remaining = board
        .countdown()
        .and_then(|c| board.remaining(c.generation, &now))
        .unwrap_or_else(|| next.seconds_until(&now));

    println_colored!(
        BOLD,
        "{} {}  {}",
        next.prayer.display_name(),
        next.display_time(),
        format_countdown(remaining)
    );
    if loaded.stale.is_some() {
        println_colored!(DIM, "(cached timings)");
    }
    Ok(())
}

// ─── Occasions ───────────────────────────────────────────────────────────────

pub fn handle_occasions(conn: &Connection, config: &AppConfig) -> Result<()> {
    let now = now_in(config)?;
    let provider = prayer_times::from_config(&config.masjid)?;
    let loaded = load_day(conn, provider.as_ref(), now.date_naive())?;
    let hijri = loaded.value.hijri.formatted();
    let board = board_for(config, loaded.value, &now)?;

    println!();
    println_colored!(GOLD, "  Occasions — {} ({})", now.format("%a %d %b %Y %H:%M"), hijri);
    println!();
    warn_stale(&loaded.stale);

    for occasion in Occasion::all() {
        let shown = board.visibility(occasion).is_visible();
        let (color, mark, state) = if shown {
            (GREEN, "●", "showing")
        } else {
            (DIM, "○", "hidden")
        };
        println_colored!(color, "  {} {:<14} {}", mark, occasion.display_name(), state);
        if let Some(w) = board.window(occasion) {
            println_colored!(
                DIM,
                "      {} → {}",
                w.start.format("%a %d %b %H:%M"),
                w.end.format("%a %d %b %H:%M")
            );
        }
    }
    println!();
    Ok(())
}

// ─── Calendar ────────────────────────────────────────────────────────────────

pub fn handle_calendar(
    conn: &mut Connection,
    config: &AppConfig,
    month: Option<u32>,
    year: Option<i32>,
    csv: bool,
) -> Result<()> {
    let now = now_in(config)?;
    let month = month.unwrap_or(now.month());
    let year = year.unwrap_or(now.year());

    let provider = prayer_times::from_config(&config.masjid)?;
    let loaded = load_month(conn, provider.as_ref(), year, month)?;
    let rows = calendar::rows(&loaded.value);

    if csv {
        let stdout = io::stdout();
        calendar::write_csv(&rows, stdout.lock())?;
        return Ok(());
    }

    println!();
    println_colored!(GOLD, "  {} — {}-{:02}", config.masjid.name, year, month);
    println!();
    warn_stale(&loaded.stale);

    let today = now.format("%d-%m-%Y").to_string();
    for (i, line) in calendar::render_table(&rows).iter().enumerate() {
        if i == 0 {
            println_colored!(BOLD, "  {}", line);
        } else if line.starts_with(&today) {
            println_colored!(AMBER, "  {}", line);
        } else {
            println!("  {}", line);
        }
    }

    let windows = calendar::occasions_in(&loaded.value, &config.masjid.tz()?);
    if !windows.is_empty() {
        println!();
        println_colored!(GOLD, "  Occasions");
        for w in &windows {
            println!(
                "  {:<14} {} → {}",
                w.occasion.display_name(),
                w.start.format("%a %d %b %H:%M"),
                w.end.format("%a %d %b %H:%M")
            );
        }
    }
    println!();
    Ok(())
}

// ─── Quran ───────────────────────────────────────────────────────────────────

pub fn handle_quran(config: &AppConfig, number: Option<u32>, search: Option<&str>) -> Result<()> {
    let Some(number) = number else {
        let hits = quran::search(search.unwrap_or(""));
        println!();
        if hits.is_empty() {
            println_colored!(DIM, "  No surah matches '{}'", search.unwrap_or(""));
        }
        for (n, name) in hits {
            println!("  {:>3}. {}", n, name);
        }
        println!();
        return Ok(());
    };

    quran::check_number(number)?;
    let client = QuranClient::new(&config.quran.edition)?.with_base_url(&config.quran.api_url);
    let surah = match client.surah(number) {
        Ok(s) => s,
        Err(e) => {
            println_colored!(RED, "  ✗ Error loading surah {}: {}", number, e);
            return Ok(());
        }
    };

    println!();
    println_colored!(
        GOLD,
        "  {}. {} — {} ({} ayahs)",
        surah.number,
        quran::name_of(surah.number)
            .map(str::to_string)
            .unwrap_or_else(|| surah.english_name.clone()),
        surah.name,
        surah.number_of_ayahs
    );
    println!();
    for ayah in &surah.ayahs {
        println_colored!(DIM, "  ({})", ayah.number_in_surah);
        println!("  {}", ayah.text);
    }
    println!();
    Ok(())
}

// ─── Reminders ───────────────────────────────────────────────────────────────

fn current_schedule(conn: &Connection, config: &AppConfig) -> Result<ScheduleMessage> {
    let now = now_in(config)?;
    let timings = if config.reminders.prayer_times {
        let provider = prayer_times::from_config(&config.masjid)?;
        load_day(conn, provider.as_ref(), now.date_naive())
            .map(|l| l.value)
            .ok()
    } else {
        None
    };
    let custom: Vec<Reminder> = ReminderRepo::list(conn)?
        .into_iter()
        .map(|s| s.reminder)
        .collect();
    build_schedule(&config.reminders, timings.as_ref(), &custom)
}

pub fn handle_remind(conn: &mut Connection, config: &AppConfig, action: &RemindCommands) -> Result<()> {
    match action {
        RemindCommands::List => {
            let ScheduleMessage::ScheduleNotification { mut notifications } =
                current_schedule(conn, config)?;
            notifications.sort_by_key(|r| r.time);
            let stored = ReminderRepo::list(conn)?;

            println!();
            if !config.reminders.enabled {
                println_colored!(DIM, "  Reminders are disabled in config");
            }
            println_colored!(GOLD, "  Reminders ({})", notifications.len());
            println!();
            for r in &notifications {
                let id = stored
                    .iter()
                    .find(|s| &s.reminder == r)
                    .map(|s| format!("#{}", s.id))
                    .unwrap_or_default();
                println!("  {}  {:<5} {}", format_time(r.time), id, r.title);
                if !r.body.is_empty() {
                    println_colored!(DIM, "               {}", r.body);
                }
            }
            println!();
        }
        RemindCommands::Add { time, title, body } => {
            let reminder = Reminder {
                title: title.clone(),
                body: body.clone(),
                time: sanitize_time(time)?,
            };
            let id = ReminderRepo::add(conn, &reminder)?;
            println_colored!(GREEN, "  ✓ Added reminder #{} at {}", id, format_time(reminder.time));
        }
        RemindCommands::Remove { id } => {
            ReminderRepo::remove(conn, *id)?;
            println_colored!(GREEN, "  ✓ Removed reminder #{}", id);
        }
        RemindCommands::Schedule { source } => {
            let raw = if source == "-" {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(source).with_context(|| format!("Reading {}", source))?
            };
            let message: ScheduleMessage =
                serde_json::from_str(&raw).context("Parsing schedule message")?;
            let ScheduleMessage::ScheduleNotification { notifications } = &message;
            ReminderRepo::replace_all(conn, notifications)?;
            println_colored!(GREEN, "  ✓ Scheduled {} reminder(s)", notifications.len());
        }
        RemindCommands::Due => {
            let now = now_in(config)?;
            let mut scheduler = NotificationScheduler::new();
            scheduler.apply(current_schedule(conn, config)?);
            let due = scheduler.due(now.naive_local());
            if due.is_empty() {
                println_colored!(
                    DIM,
                    "  Nothing due at {} ({} scheduled)",
                    now.format("%H:%M"),
                    scheduler.scheduled().len()
                );
            }
            for r in due {
                println_colored!(BOLD, "{}", r.title);
                if !r.body.is_empty() {
                    println!("{}", r.body);
                }
            }
        }
    }
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(conn: &Connection, config: &AppConfig, write: bool) -> Result<()> {
    let path = if write {
        let path = config.save()?;
        println_colored!(GREEN, "  ✓ Wrote {}", path.display());
        path
    } else {
        AppConfig::config_path()?
    };
    println!();
    println_colored!(GOLD, "  {}", path.display());
    match prayer_times::last_fetched(conn)? {
        Some(at) => println_colored!(DIM, "  Last fetched: {}", at),
        None => println_colored!(DIM, "  Timings not fetched yet"),
    }
    println!();
    let content = toml::to_string_pretty(config).context("Serializing config")?;
    for line in content.lines() {
        println!("  {}", line);
    }
    println!();
    Ok(())
}
