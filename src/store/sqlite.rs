// src/store/sqlite.rs
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{PriceStore, RecordStore, SummaryStore};
use crate::model::{
    format_ts, parse_ts, DailyReturn, DailySummary, EnrichedRecord, InsertOutcome,
    SentimentLabel, SentimentScore,
};

const DATE_FMT: &str = "%Y-%m-%d";

/// SQLite-backed store: `news_sentiment` and `asset_analysis` are the document
/// collections, `analysed_news_sentiment` is the key-value summary table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and runs migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating database dir {}", dir.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening sqlite database {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory sqlite")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS news_sentiment (
                asset TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL,
                sentiment TEXT NOT NULL,
                score_positive REAL NOT NULL,
                score_negative REAL NOT NULL,
                score_neutral REAL NOT NULL,
                score_mixed REAL NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                PRIMARY KEY (asset, timestamp)
            );

            CREATE TABLE IF NOT EXISTS asset_analysis (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close_price REAL NOT NULL,
                daily_return REAL NOT NULL,
                PRIMARY KEY (symbol, date)
            );

            CREATE TABLE IF NOT EXISTS analysed_news_sentiment (
                date TEXT NOT NULL,
                asset TEXT NOT NULL,
                item TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (date, asset)
            );
            ",
        )
        .context("running sqlite migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("sqlite mutex poisoned")
    }
}

type RecordRow = (
    String,
    String,
    String,
    String,
    String,
    f64,
    f64,
    f64,
    f64,
    String,
);

fn record_from_row(row: RecordRow) -> Result<EnrichedRecord> {
    let (asset, ts, title, description, label, pos, neg, neu, mixed, source) = row;
    let timestamp = parse_ts(&ts).ok_or_else(|| anyhow!("bad timestamp in news_sentiment: {ts}"))?;
    let sentiment =
        SentimentLabel::parse(&label).ok_or_else(|| anyhow!("bad sentiment label: {label}"))?;
    Ok(EnrichedRecord {
        asset,
        timestamp,
        title,
        description,
        sentiment,
        sentiment_score: SentimentScore {
            positive: pos,
            negative: neg,
            neutral: neu,
            mixed,
        },
        source,
    })
}

impl RecordStore for SqliteStore {
    fn latest_timestamp(&self, asset: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn();
        let latest: Option<String> = conn
            .query_row(
                "SELECT MAX(timestamp) FROM news_sentiment WHERE asset = ?1",
                params![asset],
                |row| row.get::<_, Option<String>>(0),
            )
            .context("reading latest news timestamp")?;
        match latest {
            Some(s) => parse_ts(&s)
                .map(Some)
                .ok_or_else(|| anyhow!("bad timestamp in news_sentiment: {s}")),
            None => Ok(None),
        }
    }

    fn insert_record(&self, r: &EnrichedRecord) -> Result<InsertOutcome> {
        let changed = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO news_sentiment (
                    asset, timestamp, title, description, sentiment,
                    score_positive, score_negative, score_neutral, score_mixed, source
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    &r.asset,
                    format_ts(&r.timestamp),
                    &r.title,
                    &r.description,
                    r.sentiment.as_str(),
                    r.sentiment_score.positive,
                    r.sentiment_score.negative,
                    r.sentiment_score.neutral,
                    r.sentiment_score.mixed,
                    &r.source,
                ],
            )
            .context("inserting news_sentiment row")?;
        Ok(if changed == 0 {
            InsertOutcome::Duplicate
        } else {
            InsertOutcome::Inserted
        })
    }

    fn records_between(
        &self,
        asset: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EnrichedRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT asset, timestamp, title, description, sentiment,
                    score_positive, score_negative, score_neutral, score_mixed, source
             FROM news_sentiment
             WHERE asset = ?1 AND timestamp >= ?2 AND timestamp < ?3
             ORDER BY timestamp",
        )?;
        let rows = stmt.query_map(params![asset, format_ts(&from), format_ts(&to)], |row| {
            let r: RecordRow = (
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
                row.get(9)?,
            );
            Ok(r)
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(record_from_row(row?)?);
        }
        Ok(out)
    }
}

impl PriceStore for SqliteStore {
    fn latest_date(&self, symbol: &str) -> Result<Option<NaiveDate>> {
        let conn = self.conn();
        let latest: Option<String> = conn
            .query_row(
                "SELECT MAX(date) FROM asset_analysis WHERE symbol = ?1",
                params![symbol],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .context("reading latest price date")?
            .flatten();
        latest
            .map(|s| {
                NaiveDate::parse_from_str(&s, DATE_FMT)
                    .with_context(|| format!("bad date in asset_analysis: {s}"))
            })
            .transpose()
    }

    fn insert_returns(&self, rows: &[DailyReturn]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO asset_analysis (symbol, date, close_price, daily_return)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for r in rows {
                written += stmt.execute(params![
                    &r.symbol,
                    r.date.format(DATE_FMT).to_string(),
                    r.close_price,
                    r.daily_return,
                ])?;
            }
        }
        tx.commit().context("committing asset_analysis rows")?;
        Ok(written)
    }

    fn returns_for(&self, symbol: &str) -> Result<Vec<DailyReturn>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT symbol, date, close_price, daily_return
             FROM asset_analysis WHERE symbol = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![symbol], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (symbol, date, close_price, daily_return) = row?;
            let date = NaiveDate::parse_from_str(&date, DATE_FMT)
                .with_context(|| format!("bad date in asset_analysis: {date}"))?;
            out.push(DailyReturn {
                symbol,
                date,
                close_price,
                daily_return,
            });
        }
        Ok(out)
    }
}

impl SummaryStore for SqliteStore {
    fn put_summary(&self, summary: &DailySummary) -> Result<()> {
        let item = serde_json::to_string(summary).context("serializing daily summary")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO analysed_news_sentiment (date, asset, item, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    summary.date.format(DATE_FMT).to_string(),
                    &summary.asset,
                    item,
                    format_ts(&summary.updated_at),
                ],
            )
            .context("writing analysed_news_sentiment item")?;
        Ok(())
    }

    fn scan(&self) -> Result<Vec<DailySummary>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT item FROM analysed_news_sentiment ORDER BY date, asset")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for row in rows {
            let item = row?;
            out.push(serde_json::from_str(&item).context("decoding summary item")?);
        }
        Ok(out)
    }
}
