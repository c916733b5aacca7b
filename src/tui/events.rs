use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{self, Event as CEvent, KeyEvent};
use log::{debug, warn};

use crate::models::DailyTimings;
use crate::prayer_times::TimingsProvider;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    /// Result of a background timings fetch for `date`.
    Timings {
        date: NaiveDate,
        result: Result<DailyTimings, String>,
    },
}

pub struct EventHandler {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let input_tx = tx.clone();

        thread::spawn(move || {
            let mut last_tick = std::time::Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                if event::poll(timeout).unwrap_or(false) {
                    match event::read() {
                        Ok(CEvent::Key(key)) => {
                            if input_tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if input_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = std::time::Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

/// Owns the timings provider on its own thread so network calls never
/// stall the draw loop. Results come back as [`Event::Timings`].
pub struct FetchWorker {
    requests: mpsc::Sender<NaiveDate>,
}

impl FetchWorker {
    pub fn spawn(provider: Box<dyn TimingsProvider>, events: mpsc::Sender<Event>) -> Self {
        let (requests, rx) = mpsc::channel::<NaiveDate>();

        thread::spawn(move || {
            while let Ok(mut date) = rx.recv() {
                // Collapse a burst of requests into the latest one.
                while let Ok(newer) = rx.try_recv() {
                    date = newer;
                }
                debug!("Fetching {} timings for {}", provider.name(), date);
                let result = provider.day(date).map_err(|e| e.to_string());
                if events.send(Event::Timings { date, result }).is_err() {
                    break;
                }
            }
        });

        Self { requests }
    }

    pub fn request(&self, date: NaiveDate) {
        if self.requests.send(date).is_err() {
            warn!("Fetch worker has stopped; refresh for {} dropped", date);
        }
    }
}
