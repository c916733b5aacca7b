use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use crossterm::event::{KeyCode, KeyEventKind};
use log::{info, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::db::repository::{ReminderRepo, TimingsRepo};
use crate::models::{DailyTimings, Occasion, Reminder};
use crate::notify::{build_schedule, NotificationScheduler};
use crate::occasion::{Board, Tick};
use crate::prayer_times;
use crate::tui::events::{Event, EventHandler, FetchWorker};
use crate::tui::theme;
use crate::tui::widgets::{banners, header, next_prayer, prayers, reminders, statusbar};
use crate::utils::time::until_next_midnight;

/// How long a fired reminder stays on screen.
const TOAST_SECS: u64 = 60;
/// Cached days older than this are pruned after each successful fetch.
const CACHE_KEEP_DAYS: i64 = 60;

/// Delay until the next scheduled refetch: just after local midnight, or
/// within the hour when hourly refresh is on.
pub fn next_refresh_delay(now: &DateTime<Tz>, hourly: bool) -> ChronoDuration {
    let midnight = until_next_midnight(now, 5);
    if hourly {
        midnight.min(ChronoDuration::hours(1))
    } else {
        midnight
    }
}

pub struct App {
    pub config: AppConfig,
    pub should_quit: bool,
    board: Board,
    scheduler: NotificationScheduler,
    jummah: NaiveTime,
    source: &'static str,
    show_help: bool,
    show_occasions: bool,
    fetch_pending: bool,
    /// The snapshot came from the cache, not from a fetch this session.
    stale: bool,
    last_reevaluate: Instant,
    next_refresh: DateTime<Tz>,
    custom: Vec<Reminder>,
    toast: Vec<Reminder>,
    toast_until: Option<Instant>,
}

impl App {
    pub fn new(config: AppConfig, source: &'static str, now: &DateTime<Tz>) -> Result<Self> {
        let tz = config.masjid.tz()?;
        let jummah = config.masjid.jummah()?;
        let next_refresh = *now + next_refresh_delay(now, config.refresh.hourly);

        Ok(App {
            board: Board::new(tz, jummah),
            scheduler: NotificationScheduler::new(),
            jummah,
            source,
            should_quit: false,
            show_help: false,
            show_occasions: false,
            fetch_pending: false,
            stale: false,
            last_reevaluate: Instant::now(),
            next_refresh,
            custom: Vec::new(),
            toast: Vec::new(),
            toast_until: None,
            config,
        })
    }

    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(self.board.tz())
    }

    /// Seed the board from the most recent cached day, if any, so the
    /// screen is usable before the first fetch returns.
    pub fn load(&mut self, conn: &Connection, now: &DateTime<Tz>) -> Result<()> {
        self.custom = ReminderRepo::list(conn)?
            .into_iter()
            .map(|s| s.reminder)
            .collect();

        if let Some(cached) = TimingsRepo::latest_on_or_before(conn, now.date_naive())? {
            info!("Starting from cached timings for {}", cached.date);
            self.stale = true;
            self.board.install(Arc::new(cached), now);
        }
        self.reschedule();
        Ok(())
    }

    /// Date to fetch, unless a fetch is already in flight.
    pub fn request_refresh(&mut self, now: &DateTime<Tz>) -> Option<NaiveDate> {
        if self.fetch_pending {
            return None;
        }
        self.fetch_pending = true;
        Some(now.date_naive())
    }

    pub fn on_timings(
        &mut self,
        conn: &Connection,
        date: NaiveDate,
        result: Result<DailyTimings, String>,
        now: &DateTime<Tz>,
    ) {
        self.fetch_pending = false;
        match result {
            Ok(timings) => {
                if let Err(e) = TimingsRepo::store(conn, &timings, self.source) {
                    warn!("Caching timings for {} failed: {}", date, e);
                }
                if let Err(e) = prayer_times::mark_fetched(conn) {
                    warn!("Recording fetch time failed: {}", e);
                }
                if let Err(e) =
                    TimingsRepo::prune_before(conn, date - ChronoDuration::days(CACHE_KEEP_DAYS))
                {
                    warn!("Pruning timings cache failed: {}", e);
                }
                self.stale = false;
                self.board.install(Arc::new(timings), now);
                self.last_reevaluate = Instant::now();
                self.reschedule();
            }
            Err(e) => self.board.fetch_failed(e),
        }
    }

    /// Per-second step. Returns a date to fetch when a refresh is due.
    pub fn tick(&mut self, now: &DateTime<Tz>) -> Option<NaiveDate> {
        let mut refresh = false;

        if self.board.tick(now) == Tick::Expired {
            refresh = true;
        }

        let every = Duration::from_secs(self.config.refresh.reevaluate_secs);
        if self.last_reevaluate.elapsed() >= every {
            self.board.reevaluate(now);
            self.last_reevaluate = Instant::now();
        }

        if *now >= self.next_refresh {
            self.next_refresh = *now + next_refresh_delay(now, self.config.refresh.hourly);
            refresh = true;
        }

        self.check_reminders(now);

        if refresh {
            self.request_refresh(now)
        } else {
            None
        }
    }

    fn reschedule(&mut self) {
        let timings = self.board.timings().map(|t| t.as_ref());
        match build_schedule(&self.config.reminders, timings, &self.custom) {
            Ok(message) => self.scheduler.apply(message),
            Err(e) => warn!("Reminder schedule not updated: {}", e),
        }
    }

    fn check_reminders(&mut self, now: &DateTime<Tz>) {
        if self.toast_until.is_some_and(|t| Instant::now() >= t) {
            self.toast.clear();
            self.toast_until = None;
        }

        let fired = self.scheduler.due(now.naive_local());
        if fired.is_empty() {
            return;
        }
        for r in &fired {
            info!("Reminder: {}", r.title);
        }
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07").and_then(|_| out.flush());
        self.toast = fired;
        self.toast_until = Some(Instant::now() + Duration::from_secs(TOAST_SECS));
    }

    /// Returns true when the key asks for a refresh.
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> bool {
        // Only handle actual key presses; some terminals also send release/repeat
        if key.kind != KeyEventKind::Press {
            return false;
        }

        if self.show_help || self.show_occasions {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('c') if self.show_occasions => self.show_occasions = false,
                _ => {
                    self.show_help = false;
                    self.show_occasions = false;
                }
            }
            return false;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char('c') => {
                self.show_occasions = true;
            }
            KeyCode::Char('r') => {
                return true;
            }
            _ => {}
        }
        false
    }

    pub fn draw(&self, frame: &mut Frame, now: &DateTime<Tz>) {
        self.draw_board(frame, now);

        if self.show_help {
            self.draw_help_overlay(frame);
        }
        if self.show_occasions {
            self.draw_occasions_overlay(frame);
        }

        reminders::render(frame, frame.area(), &self.toast);
    }

    fn status_note(&self) -> Option<String> {
        let snapshot = self.board.timings()?;
        if self.fetch_pending {
            return Some("refreshing…".to_string());
        }
        match self.board.last_error() {
            Some(_) => Some(format!("offline · showing {}", snapshot.date.format("%d %b"))),
            None if self.stale => Some("cached timings".to_string()),
            None => None,
        }
    }

    fn draw_board(&self, frame: &mut Frame, now: &DateTime<Tz>) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let timings = self.board.timings().map(|t| t.as_ref());
        let hijri = timings.map(|t| t.hijri.formatted());
        header::render(
            frame,
            outer_chunks[0],
            &self.config.masjid.name,
            hijri.as_deref(),
            now,
        );

        let note = self.status_note();
        statusbar::render(frame, outer_chunks[2], note.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(outer_chunks[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8), // prayers
                Constraint::Min(0),    // occasions
            ])
            .split(columns[0]);

        let active = self.board.next_prayer();
        prayers::render(
            frame,
            left_chunks[0],
            timings,
            self.jummah,
            active.filter(|n| !n.tomorrow).map(|n| n.prayer),
            now.time(),
        );

        let visible: Vec<Occasion> = Occasion::all()
            .into_iter()
            .filter(|o| self.board.visibility(*o).is_visible())
            .collect();
        banners::render(frame, left_chunks[1], &visible);

        let countdown = match (active, self.board.countdown()) {
            (Some(next), Some(c)) => next_prayer::Countdown::Running {
                next,
                remaining: self
                    .board
                    .remaining(c.generation, now)
                    .unwrap_or_else(|| next.seconds_until(now)),
            },
            _ => match self.board.last_error() {
                Some(reason) => next_prayer::Countdown::Failed(reason),
                None => next_prayer::Countdown::Loading,
            },
        };
        next_prayer::render(frame, columns[1], countdown);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        // Center a help box
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(10).min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::lamp().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [r]          ", theme::lamp()),
                Span::styled("Refresh prayer times now", theme::muted()),
            ]),
            Line::from(vec![
                Span::styled("  [c]          ", theme::lamp()),
                Span::styled("Occasion windows", theme::muted()),
            ]),
            Line::from(vec![
                Span::styled("  [?]          ", theme::lamp()),
                Span::styled("Toggle help", theme::muted()),
            ]),
            Line::from(vec![
                Span::styled("  [q] / [Esc]  ", theme::lamp()),
                Span::styled("Quit", theme::muted()),
            ]),
        ];

        let block = Block::default()
            .title(Span::styled(" Help ", theme::lamp()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::lamp())
            .style(theme::panel());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_occasions_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 6,
            y: area.height / 4,
            width: area.width * 2 / 3,
            height: 10.min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let mut lines = vec![Line::from("")];
        for occasion in Occasion::all() {
            let (mark, style) = if self.board.visibility(occasion).is_visible() {
                ("●", theme::occasion())
            } else {
                ("○", theme::muted())
            };
            let span = match self.board.window(occasion) {
                Some(w) => format!(
                    "{} → {}",
                    w.start.format("%a %d %b %H:%M"),
                    w.end.format("%a %d %b %H:%M")
                ),
                None => "not today".to_string(),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", mark), style),
                Span::styled(format!("{:<13}", occasion.display_name()), theme::strong()),
                Span::styled(span, theme::muted()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Windows open and close at Maghrib",
            theme::muted(),
        )));
        lines.push(Line::from(Span::styled("  [any key] close", theme::muted())));

        let block = Block::default()
            .title(Span::styled(" Occasions ", theme::lamp()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::dusk())
            .style(theme::panel());

        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let provider = prayer_times::from_config(&config.masjid)?;
    let source = provider.name();
    let now = Utc::now().with_timezone(&config.masjid.tz()?);

    let mut app = App::new(config, source, &now)?;
    app.load(&conn, &now)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(1000);
    let worker = FetchWorker::spawn(provider, events.sender());
    if let Some(date) = app.request_refresh(&now) {
        worker.request(date);
    }

    loop {
        let now = app.now();
        terminal.draw(|frame| app.draw(frame, &now))?;

        match events.next()? {
            Event::Key(key) => {
                if app.handle_key(key) {
                    if let Some(date) = app.request_refresh(&now) {
                        worker.request(date);
                    }
                }
                if app.should_quit {
                    break;
                }
            }
            Event::Tick => {
                let now = app.now();
                if let Some(date) = app.tick(&now) {
                    worker.request(date);
                }
            }
            Event::Timings { date, result } => {
                let now = app.now();
                app.on_timings(&conn, date, result, &now);
            }
        }
    }

    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timings::fixtures::{thursday, timings_on, wednesday};
    use crate::utils::time::local_instant;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<Tz> {
        local_instant(
            &chrono_tz::Asia::Karachi,
            date,
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
        )
    }

    fn setup(now: &DateTime<Tz>) -> (tempfile::TempDir, Connection, App) {
        let dir = tempfile::tempdir().unwrap();
        let conn = crate::db::open(&dir.path().join("app.db")).unwrap();
        let app = App::new(AppConfig::default(), "aladhan", now).unwrap();
        (dir, conn, app)
    }

    #[test]
    fn refresh_delay_caps_at_an_hour() {
        let now = at(wednesday(), 10, 0);
        assert_eq!(next_refresh_delay(&now, true), ChronoDuration::hours(1));
        assert_eq!(
            next_refresh_delay(&now, false),
            ChronoDuration::hours(14) + ChronoDuration::seconds(5)
        );
        let late = at(wednesday(), 23, 30);
        assert_eq!(
            next_refresh_delay(&late, true),
            ChronoDuration::minutes(30) + ChronoDuration::seconds(5)
        );
    }

    #[test]
    fn starts_from_cache() {
        let now = at(thursday(), 9, 0);
        let (_dir, conn, mut app) = setup(&now);
        TimingsRepo::store(&conn, &timings_on(wednesday(), 7, 1), "aladhan").unwrap();
        app.load(&conn, &now).unwrap();
        assert!(app.stale);
        assert_eq!(app.board.timings().unwrap().date, wednesday());
        assert_eq!(app.status_note().as_deref(), Some("cached timings"));
    }

    #[test]
    fn old_cached_thursday_does_not_show_jummah_on_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let now = at(sunday, 10, 0);
        let (_dir, conn, mut app) = setup(&now);
        TimingsRepo::store(&conn, &timings_on(thursday(), 7, 2), "aladhan").unwrap();
        app.load(&conn, &now).unwrap();

        assert!(app.stale);
        assert!(!app.board.visibility(Occasion::Jummah).is_visible());
        let next = app.board.next_prayer().unwrap();
        assert_eq!(next.prayer, crate::models::PrayerName::Dhuhr);
        assert_eq!(next.instant, at(sunday, 12, 5));
    }

    #[test]
    fn refresh_requests_collapse_while_pending() {
        let now = at(wednesday(), 9, 0);
        let (_dir, _conn, mut app) = setup(&now);
        assert_eq!(app.request_refresh(&now), Some(wednesday()));
        assert_eq!(app.request_refresh(&now), None);
    }

    #[test]
    fn fetched_timings_are_installed_and_cached() {
        let now = at(thursday(), 19, 0);
        let (_dir, conn, mut app) = setup(&now);
        app.request_refresh(&now);
        app.on_timings(&conn, thursday(), Ok(timings_on(thursday(), 7, 2)), &now);

        assert!(!app.fetch_pending);
        assert!(TimingsRepo::get(&conn, thursday()).unwrap().is_some());
        assert!(app.board.visibility(Occasion::Jummah).is_visible());
        // Five prayer reminders plus Quran and Durood.
        assert_eq!(app.scheduler.scheduled().len(), 7);
    }

    #[test]
    fn failed_fetch_keeps_snapshot() {
        let now = at(thursday(), 19, 0);
        let (_dir, conn, mut app) = setup(&now);
        app.on_timings(&conn, thursday(), Ok(timings_on(thursday(), 7, 2)), &now);
        app.request_refresh(&now);
        app.on_timings(&conn, thursday(), Err("timed out".into()), &now);

        assert!(!app.fetch_pending);
        assert_eq!(app.board.timings().unwrap().date, thursday());
        assert!(app.status_note().unwrap().starts_with("offline"));
    }

    #[test]
    fn failed_first_fetch_leaves_board_empty() {
        let now = at(thursday(), 19, 0);
        let (_dir, conn, mut app) = setup(&now);
        app.on_timings(&conn, thursday(), Err("dns".into()), &now);
        assert!(app.board.timings().is_none());
        assert!(!app.board.visibility(Occasion::Jummah).is_visible());
        assert_eq!(app.board.last_error(), Some("dns"));
    }

    #[test]
    fn expiry_asks_for_refresh() {
        let before = at(wednesday(), 12, 0);
        let (_dir, conn, mut app) = setup(&before);
        app.on_timings(&conn, wednesday(), Ok(timings_on(wednesday(), 7, 1)), &before);
        assert_eq!(app.tick(&before), None);
        // Dhuhr is 12:05 in the fixture.
        assert_eq!(app.tick(&at(wednesday(), 12, 5)), Some(wednesday()));
    }

    #[test]
    fn keys() {
        let now = at(wednesday(), 9, 0);
        let (_dir, _conn, mut app) = setup(&now);
        let press = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);

        assert!(app.handle_key(press('r')));
        assert!(!app.handle_key(press('?')));
        assert!(app.show_help);
        app.handle_key(press('x'));
        assert!(!app.show_help);
        app.handle_key(press('q'));
        assert!(app.should_quit);
    }
}
