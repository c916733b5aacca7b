use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{DailyTimings, Reminder};
use crate::utils::time::sanitize_time;

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn decode(payload: &str) -> Result<DailyTimings> {
    serde_json::from_str(payload).context("Decoding cached timings")
}

// ─── Timings cache ──────────────────────────────────────────────────────────

pub struct TimingsRepo;

impl TimingsRepo {
    pub fn store(conn: &Connection, timings: &DailyTimings, source: &str) -> Result<()> {
        let payload = serde_json::to_string(timings).context("Encoding timings")?;
        conn.execute(
            "INSERT INTO timings_cache (date, source, payload, fetched_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(date) DO UPDATE
                SET source = ?2, payload = ?3, fetched_at = datetime('now')",
            params![date_key(timings.date), source, payload],
        )?;
        Ok(())
    }

    pub fn store_all(conn: &mut Connection, days: &[DailyTimings], source: &str) -> Result<()> {
        let tx = conn.transaction()?;
        for day in days {
            Self::store(&tx, day, source)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get(conn: &Connection, date: NaiveDate) -> Result<Option<DailyTimings>> {
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM timings_cache WHERE date = ?1",
                params![date_key(date)],
                |row| row.get(0),
            )
            .optional()?;
        payload.as_deref().map(decode).transpose()
    }

    /// Most recent cached day on or before `date`.
    pub fn latest_on_or_before(conn: &Connection, date: NaiveDate) -> Result<Option<DailyTimings>> {
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM timings_cache WHERE date <= ?1
                 ORDER BY date DESC LIMIT 1",
                params![date_key(date)],
                |row| row.get(0),
            )
            .optional()?;
        payload.as_deref().map(decode).transpose()
    }

    pub fn range(conn: &Connection, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyTimings>> {
        let mut stmt = conn.prepare(
            "SELECT payload FROM timings_cache WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![date_key(start), date_key(end)], |row| {
            row.get::<_, String>(0)
        })?;

        let mut result = Vec::new();
        for r in rows {
            result.push(decode(&r?)?);
        }
        Ok(result)
    }

    /// Drop cached days older than `keep_from`. Returns the number removed.
    pub fn prune_before(conn: &Connection, keep_from: NaiveDate) -> Result<usize> {
        let n = conn.execute(
            "DELETE FROM timings_cache WHERE date < ?1",
            params![date_key(keep_from)],
        )?;
        Ok(n)
    }
}

// ─── Reminders ───────────────────────────────────────────────────────────────

pub struct ReminderRepo;

#[derive(Debug, Clone)]
pub struct StoredReminder {
    pub id: i64,
    pub reminder: Reminder,
}

impl ReminderRepo {
    pub fn list(conn: &Connection) -> Result<Vec<StoredReminder>> {
        let mut stmt = conn.prepare("SELECT id, title, body, time FROM reminders ORDER BY time, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, title, body, time) = r?;
            result.push(StoredReminder {
                id,
                reminder: Reminder {
                    title,
                    body,
                    time: sanitize_time(&time)?,
                },
            });
        }
        Ok(result)
    }

    pub fn add(conn: &Connection, reminder: &Reminder) -> Result<i64> {
        conn.execute(
            "INSERT INTO reminders (title, body, time) VALUES (?1, ?2, ?3)
             ON CONFLICT(title, time) DO UPDATE SET body = ?2",
            params![
                reminder.title,
                reminder.body,
                reminder.time.format("%H:%M").to_string()
            ],
        )?;
        let id = conn.query_row(
            "SELECT id FROM reminders WHERE title = ?1 AND time = ?2",
            params![reminder.title, reminder.time.format("%H:%M").to_string()],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn remove(conn: &Connection, id: i64) -> Result<()> {
        let n = conn.execute("DELETE FROM reminders WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(anyhow!("No reminder with id {}", id));
        }
        Ok(())
    }

    /// Replace every stored reminder with `reminders`.
    pub fn replace_all(conn: &mut Connection, reminders: &[Reminder]) -> Result<()> {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM reminders", [])?;
        for r in reminders {
            Self::add(&tx, r)?;
        }
        tx.commit()?;
        Ok(())
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}
