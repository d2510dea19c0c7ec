use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::params;
use serde_json::{from_str, to_string};

use crate::db::{
    helpers::{format_local_date, parse_local_date, to_i64},
    models::{EntityClass, EntityIntervalSet, IntervalSeq, PersistedDay},
    Database,
};

impl Database {
    /// Persist one reconstructed day, unconditionally replacing any existing
    /// artifact for the same (class, date). All rows land in one transaction,
    /// so a failed run never leaves a partial day behind.
    pub async fn replace_day(&self, day: &PersistedDay) -> Result<()> {
        let day = day.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let class = day.entity_class.as_str();
            let date = format_local_date(day.local_date);

            tx.execute(
                "DELETE FROM days WHERE entity_class = ?1 AND local_date = ?2",
                params![class, date],
            )?;

            let entity_ids_json =
                to_string(&day.entity_ids).context("failed to serialize entity id list")?;
            tx.execute(
                "INSERT INTO days (entity_class, local_date, entity_ids_json)
                 VALUES (?1, ?2, ?3)",
                params![class, date, entity_ids_json],
            )?;

            for (entity_id, seq) in &day.intervals {
                for (index, interval) in seq.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO intervals (
                            entity_class,
                            local_date,
                            entity_id,
                            seq,
                            detect,
                            undetect
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            class,
                            date,
                            entity_id,
                            to_i64(index)?,
                            interval.start,
                            interval.end,
                        ],
                    )?;
                }
            }

            tx.commit().context("failed to commit day")?;
            Ok(())
        })
        .await
    }

    /// Load one persisted day, or `None` if that (class, date) has never been
    /// reconstructed.
    pub async fn load_day(
        &self,
        entity_class: EntityClass,
        local_date: NaiveDate,
    ) -> Result<Option<PersistedDay>> {
        self.execute(move |conn| {
            let class = entity_class.as_str();
            let date = format_local_date(local_date);

            let mut stmt = conn.prepare(
                "SELECT entity_ids_json FROM days
                 WHERE entity_class = ?1 AND local_date = ?2",
            )?;
            let mut rows = stmt.query(params![class, date])?;
            let Some(row) = rows.next()? else {
                return Ok(None);
            };
            let entity_ids_json: String = row.get(0)?;
            let entity_ids: Vec<String> =
                from_str(&entity_ids_json).context("failed to parse entity id list")?;

            // Every allow-listed entity gets a sequence, empty or not.
            let mut intervals: EntityIntervalSet = entity_ids
                .iter()
                .map(|id| (id.clone(), IntervalSeq::default()))
                .collect();

            let mut stmt = conn.prepare(
                "SELECT entity_id, detect, undetect FROM intervals
                 WHERE entity_class = ?1 AND local_date = ?2
                 ORDER BY entity_id ASC, seq ASC",
            )?;
            let mut rows = stmt.query(params![class, date])?;
            while let Some(row) = rows.next()? {
                let entity_id: String = row.get(0)?;
                let detect: f64 = row.get(1)?;
                let undetect: f64 = row.get(2)?;
                intervals.entry(entity_id).or_default().push(detect, undetect);
            }

            Ok(Some(PersistedDay {
                entity_class,
                local_date,
                entity_ids,
                intervals,
            }))
        })
        .await
    }

    /// Dates with a persisted day for the given class, ascending.
    pub async fn list_days(&self, entity_class: EntityClass) -> Result<Vec<NaiveDate>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT local_date FROM days
                 WHERE entity_class = ?1
                 ORDER BY local_date ASC",
            )?;
            let mut rows = stmt.query(params![entity_class.as_str()])?;
            let mut dates = Vec::new();
            while let Some(row) = rows.next()? {
                let raw: String = row.get(0)?;
                dates.push(parse_local_date(&raw)?);
            }
            Ok(dates)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_db(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "detlog-test-{}-{name}.sqlite3",
            std::process::id()
        ));
        // Leftovers from an earlier run of the same test.
        let _ = std::fs::remove_file(&path);
        path
    }

    fn sample_day() -> PersistedDay {
        let mut intervals = EntityIntervalSet::new();
        let mut seq = IntervalSeq::default();
        seq.push(100.0, 110.0);
        seq.push(200.0, 260.0);
        intervals.insert("A".to_string(), seq);
        intervals.insert("B".to_string(), IntervalSeq::default());

        PersistedDay {
            entity_class: EntityClass::Presence,
            local_date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
            entity_ids: vec!["A".to_string(), "B".to_string()],
            intervals,
        }
    }

    #[tokio::test]
    async fn replace_and_load_round_trip() {
        let db = Database::new(temp_db("round-trip")).unwrap();
        let day = sample_day();

        db.replace_day(&day).await.unwrap();
        let loaded = db
            .load_day(day.entity_class, day.local_date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, day);

        // An entity with no intervals still appears with an empty sequence.
        assert!(loaded.intervals["B"].is_empty());
    }

    #[tokio::test]
    async fn replacing_a_day_overwrites_it() {
        let db = Database::new(temp_db("overwrite")).unwrap();
        let day = sample_day();
        db.replace_day(&day).await.unwrap();

        let mut shorter = day.clone();
        shorter.intervals.insert("A".to_string(), {
            let mut seq = IntervalSeq::default();
            seq.push(300.0, 310.0);
            seq
        });
        db.replace_day(&shorter).await.unwrap();

        let loaded = db
            .load_day(day.entity_class, day.local_date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.intervals["A"].detect, vec![300.0]);
        assert_eq!(loaded.intervals["A"].len(), 1);
    }

    #[tokio::test]
    async fn classes_are_addressed_independently() {
        let db = Database::new(temp_db("classes")).unwrap();
        let day = sample_day();
        db.replace_day(&day).await.unwrap();

        let missing = db
            .load_day(EntityClass::Phase, day.local_date)
            .await
            .unwrap();
        assert!(missing.is_none());

        let dates = db.list_days(EntityClass::Presence).await.unwrap();
        assert_eq!(dates, vec![day.local_date]);
        assert!(db.list_days(EntityClass::Phase).await.unwrap().is_empty());
    }
}
