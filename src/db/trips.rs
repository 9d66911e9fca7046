//! Trip repository.
//!
//! At most one trip carries `current = true`. Every write that turns the flag
//! on clears it on all trips first, inside the same transaction.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{format_date, format_timestamp, new_id, parse_date, parse_timestamp, Database, Result};

const TRIP_COLUMNS: &str =
    "id, title, description, title_en, description_en, startDate, endDate, createdAt, current";

/// A named journey with an ordered route of places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub description: String,
    pub title_en: String,
    pub description_en: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTrip {
    pub title: String,
    pub description: String,
    pub title_en: String,
    pub description_en: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
}

/// Partial update; `Some(None)` on a date clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub title_en: Option<String>,
    pub description_en: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub current: Option<bool>,
}

impl TripPatch {
    fn apply(self, trip: &mut Trip) {
        if let Some(title) = self.title {
            trip.title = title;
        }
        if let Some(description) = self.description {
            trip.description = description;
        }
        if let Some(title_en) = self.title_en {
            trip.title_en = title_en;
        }
        if let Some(description_en) = self.description_en {
            trip.description_en = description_en;
        }
        if let Some(start_date) = self.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            trip.end_date = end_date;
        }
        if let Some(current) = self.current {
            trip.current = current;
        }
    }
}

fn row_to_trip(row: &Row<'_>) -> rusqlite::Result<Trip> {
    let created_at: String = row.get(7)?;
    Ok(Trip {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        title_en: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        description_en: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        start_date: parse_date(5, row.get(5)?)?,
        end_date: parse_date(6, row.get(6)?)?,
        created_at: parse_timestamp(7, &created_at)?,
        current: row.get(8)?,
    })
}

fn clear_current(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute("UPDATE trips SET current = 0 WHERE current <> 0", [])
}

impl Database {
    /// All trips, newest first.
    pub fn list_trips(&self) -> Result<Vec<Trip>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM trips ORDER BY createdAt DESC, rowid DESC",
            TRIP_COLUMNS
        ))?;
        let trips = stmt
            .query_map([], row_to_trip)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(trips)
    }

    pub fn get_trip(&self, id: &str) -> Result<Option<Trip>> {
        let trip = self
            .conn
            .query_row(
                &format!("SELECT {} FROM trips WHERE id = ?", TRIP_COLUMNS),
                [id],
                row_to_trip,
            )
            .optional()?;
        Ok(trip)
    }

    /// The trip flagged as current, if any.
    pub fn get_current_trip(&self) -> Result<Option<Trip>> {
        let trip = self
            .conn
            .query_row(
                &format!("SELECT {} FROM trips WHERE current = 1 LIMIT 1", TRIP_COLUMNS),
                [],
                row_to_trip,
            )
            .optional()?;
        Ok(trip)
    }

    pub fn create_trip(&self, new: NewTrip) -> Result<Trip> {
        let trip = Trip {
            id: new_id("trip"),
            title: new.title,
            description: new.description,
            title_en: new.title_en,
            description_en: new.description_en,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: Utc::now().trunc_subsecs(3),
            current: new.current,
        };

        let tx = self.conn.unchecked_transaction()?;
        if trip.current {
            clear_current(&tx)?;
        }
        tx.execute(
            r#"
            INSERT INTO trips (id, title, description, title_en, description_en,
                               startDate, endDate, createdAt, current)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                trip.id,
                trip.title,
                trip.description,
                trip.title_en,
                trip.description_en,
                trip.start_date.as_ref().map(format_date),
                trip.end_date.as_ref().map(format_date),
                format_timestamp(&trip.created_at),
                trip.current,
            ],
        )?;
        tx.commit()?;

        debug!(id = %trip.id, current = trip.current, "Created trip");
        Ok(trip)
    }

    /// Merge `patch` onto the stored row. Missing ids are ignored.
    pub fn update_trip(&self, id: &str, patch: TripPatch) -> Result<()> {
        let Some(mut trip) = self.get_trip(id)? else {
            debug!(id, "update_trip: no such trip");
            return Ok(());
        };
        let activating = patch.current == Some(true);
        patch.apply(&mut trip);

        let tx = self.conn.unchecked_transaction()?;
        if activating {
            clear_current(&tx)?;
        }
        tx.execute(
            r#"
            UPDATE trips
            SET title = ?, description = ?, title_en = ?, description_en = ?,
                startDate = ?, endDate = ?, current = ?
            WHERE id = ?
            "#,
            params![
                trip.title,
                trip.description,
                trip.title_en,
                trip.description_en,
                trip.start_date.as_ref().map(format_date),
                trip.end_date.as_ref().map(format_date),
                trip.current,
                id,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Make `id` the only current trip. An unknown id leaves no trip current.
    pub fn set_current_trip(&self, id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        clear_current(&tx)?;
        let updated = tx.execute("UPDATE trips SET current = 1 WHERE id = ?", [id])?;
        tx.commit()?;

        if updated == 0 {
            debug!(id, "set_current_trip: no such trip, all trips cleared");
        } else {
            info!(id, "Current trip changed");
        }
        Ok(())
    }

    pub fn clear_current_trip(&self) -> Result<()> {
        clear_current(&self.conn)?;
        Ok(())
    }

    /// Removes the trip and, through the foreign key, all of its route stops.
    pub fn delete_trip(&self, id: &str) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM trips WHERE id = ?", [id])?;
        debug!(id, removed, "Deleted trip");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.ensure_schema().unwrap();
        db
    }

    fn new_trip(title: &str, current: bool) -> NewTrip {
        NewTrip {
            title: title.to_string(),
            current,
            ..Default::default()
        }
    }

    fn current_count(db: &Database) -> usize {
        db.list_trips().unwrap().iter().filter(|t| t.current).count()
    }

    #[test]
    fn test_create_and_get_trip() {
        let db = test_db();
        let trip = db
            .create_trip(NewTrip {
                description: "Summer".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 7, 1),
                end_date: NaiveDate::from_ymd_opt(2025, 7, 14),
                ..new_trip("Baikal", false)
            })
            .unwrap();

        assert!(trip.id.starts_with("trip_"));
        assert_eq!(db.get_trip(&trip.id).unwrap(), Some(trip));
        assert_eq!(db.get_current_trip().unwrap(), None);
    }

    #[test]
    fn test_current_trip_switch() {
        let db = test_db();
        let a = db.create_trip(new_trip("A", true)).unwrap();
        let b = db.create_trip(new_trip("B", true)).unwrap();

        assert_eq!(db.get_current_trip().unwrap().unwrap().id, b.id);
        assert!(!db.get_trip(&a.id).unwrap().unwrap().current);
        assert_eq!(current_count(&db), 1);
    }

    #[test]
    fn test_at_most_one_current_after_any_write() {
        let db = test_db();
        let a = db.create_trip(new_trip("A", true)).unwrap();
        let b = db.create_trip(new_trip("B", false)).unwrap();
        let c = db.create_trip(new_trip("C", false)).unwrap();
        assert_eq!(current_count(&db), 1);

        db.update_trip(
            &b.id,
            TripPatch {
                current: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(current_count(&db), 1);
        assert_eq!(db.get_current_trip().unwrap().unwrap().id, b.id);

        db.set_current_trip(&c.id).unwrap();
        assert_eq!(current_count(&db), 1);
        assert_eq!(db.get_current_trip().unwrap().unwrap().id, c.id);

        // A stale patch on A that does not touch `current` must not revive it.
        db.update_trip(
            &a.id,
            TripPatch {
                title: Some("A2".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(current_count(&db), 1);

        db.create_trip(new_trip("D", true)).unwrap();
        assert_eq!(current_count(&db), 1);
    }

    #[test]
    fn test_update_current_false_deactivates() {
        let db = test_db();
        let a = db.create_trip(new_trip("A", true)).unwrap();
        db.update_trip(
            &a.id,
            TripPatch {
                current: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(db.get_current_trip().unwrap(), None);
    }

    #[test]
    fn test_set_current_unknown_clears_all() {
        let db = test_db();
        db.create_trip(new_trip("A", true)).unwrap();
        db.set_current_trip("trip_0_missing").unwrap();
        assert_eq!(current_count(&db), 0);
    }

    #[test]
    fn test_clear_current_trip() {
        let db = test_db();
        db.create_trip(new_trip("A", true)).unwrap();
        db.clear_current_trip().unwrap();
        assert_eq!(db.get_current_trip().unwrap(), None);
    }

    #[test]
    fn test_empty_patch_leaves_row_unchanged() {
        let db = test_db();
        let trip = db
            .create_trip(NewTrip {
                title_en: "Ride EN".to_string(),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 2),
                ..new_trip("Ride", true)
            })
            .unwrap();
        db.update_trip(&trip.id, TripPatch::default()).unwrap();
        assert_eq!(db.get_trip(&trip.id).unwrap(), Some(trip));
    }

    #[test]
    fn test_patch_clears_dates() {
        let db = test_db();
        let trip = db
            .create_trip(NewTrip {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 2),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 9),
                ..new_trip("Ride", false)
            })
            .unwrap();
        db.update_trip(
            &trip.id,
            TripPatch {
                end_date: Some(None),
                ..Default::default()
            },
        )
        .unwrap();

        let stored = db.get_trip(&trip.id).unwrap().unwrap();
        assert_eq!(stored.start_date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(stored.end_date, None);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let db = test_db();
        db.update_trip(
            "trip_0_missing",
            TripPatch {
                current: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(db.list_trips().unwrap().is_empty());
    }

    #[test]
    fn test_list_trips_newest_first() {
        let db = test_db();
        let a = db.create_trip(new_trip("A", false)).unwrap();
        let b = db.create_trip(new_trip("B", false)).unwrap();
        let ids: Vec<String> = db.list_trips().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[test]
    fn test_delete_trip() {
        let db = test_db();
        let trip = db.create_trip(new_trip("Gone", true)).unwrap();
        db.delete_trip(&trip.id).unwrap();
        assert_eq!(db.get_trip(&trip.id).unwrap(), None);
        assert_eq!(db.get_current_trip().unwrap(), None);
    }
}
