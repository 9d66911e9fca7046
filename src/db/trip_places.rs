//! Trip-place repository: the places of a trip, in route order.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::places::Place;
use super::{
    decode_photos, encode_photos, format_date, format_timestamp, new_id, parse_date,
    parse_timestamp, Database, Result,
};

const TRIP_PLACE_COLUMNS: &str =
    r#"id, tripId, placeId, "order", visited, visitDate, notes, photos, createdAt"#;

/// Today's date for visit marks. Visit dates are UTC calendar days.
pub fn visit_date_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// One stop on a trip's route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPlace {
    pub id: String,
    pub trip_id: String,
    pub place_id: String,
    /// 1-based route position.
    pub order: i64,
    pub visited: bool,
    pub visit_date: Option<NaiveDate>,
    pub notes: String,
    /// Photos taken at this stop, independent of the place's own photos.
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// A stop together with the place it points at. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlaceWithPlace {
    #[serde(flatten)]
    pub trip_place: TripPlace,
    pub place: Place,
}

/// Partial update. `visited` and `visit_date` are independent fields; see
/// [`Database::set_visited`] for the usual pairing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripPlacePatch {
    pub order: Option<i64>,
    pub visited: Option<bool>,
    pub visit_date: Option<Option<NaiveDate>>,
    pub notes: Option<String>,
    pub photos: Option<Vec<String>>,
}

impl TripPlacePatch {
    fn apply(self, tp: &mut TripPlace) {
        if let Some(order) = self.order {
            tp.order = order;
        }
        if let Some(visited) = self.visited {
            tp.visited = visited;
        }
        if let Some(visit_date) = self.visit_date {
            tp.visit_date = visit_date;
        }
        if let Some(notes) = self.notes {
            tp.notes = notes;
        }
        if let Some(photos) = self.photos {
            tp.photos = photos;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

fn row_to_trip_place(row: &Row<'_>) -> rusqlite::Result<TripPlace> {
    let created_at: String = row.get(8)?;
    Ok(TripPlace {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        place_id: row.get(2)?,
        order: row.get(3)?,
        visited: row.get(4)?,
        visit_date: parse_date(5, row.get(5)?)?,
        notes: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        photos: decode_photos(7, row.get(7)?)?,
        created_at: parse_timestamp(8, &created_at)?,
    })
}

impl Database {
    /// Stops of a trip, by route order.
    pub fn list_trip_places(&self, trip_id: &str) -> Result<Vec<TripPlace>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"SELECT {} FROM trip_places WHERE tripId = ? ORDER BY "order" ASC, rowid ASC"#,
            TRIP_PLACE_COLUMNS
        ))?;
        let stops = stmt
            .query_map([trip_id], row_to_trip_place)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stops)
    }

    /// Stops of a trip joined with their places. Stops whose place was
    /// deleted are skipped.
    pub fn list_trip_places_with_place(&self, trip_id: &str) -> Result<Vec<TripPlaceWithPlace>> {
        let mut joined = Vec::new();
        for trip_place in self.list_trip_places(trip_id)? {
            match self.get_place(&trip_place.place_id)? {
                Some(place) => joined.push(TripPlaceWithPlace { trip_place, place }),
                None => debug!(
                    id = %trip_place.id,
                    place_id = %trip_place.place_id,
                    "Skipping stop with dangling place"
                ),
            }
        }
        Ok(joined)
    }

    pub fn get_trip_place(&self, id: &str) -> Result<Option<TripPlace>> {
        let stop = self
            .conn
            .query_row(
                &format!("SELECT {} FROM trip_places WHERE id = ?", TRIP_PLACE_COLUMNS),
                [id],
                row_to_trip_place,
            )
            .optional()?;
        Ok(stop)
    }

    /// Attach a place to a trip at the given route position.
    pub fn add_trip_place(&self, trip_id: &str, place_id: &str, order: i64) -> Result<TripPlace> {
        let stop = TripPlace {
            id: new_id("tp"),
            trip_id: trip_id.to_string(),
            place_id: place_id.to_string(),
            order,
            visited: false,
            visit_date: None,
            notes: String::new(),
            photos: Vec::new(),
            created_at: Utc::now().trunc_subsecs(3),
        };

        self.conn.execute(
            r#"
            INSERT INTO trip_places (id, tripId, placeId, "order", visited, visitDate, notes, photos, createdAt)
            VALUES (?, ?, ?, ?, 0, NULL, '', '[]', ?)
            "#,
            params![
                stop.id,
                stop.trip_id,
                stop.place_id,
                stop.order,
                format_timestamp(&stop.created_at),
            ],
        )?;
        debug!(id = %stop.id, trip_id, place_id, order, "Added stop");
        Ok(stop)
    }

    /// Attach a place at the end of the route (`count + 1`).
    pub fn append_trip_place(&self, trip_id: &str, place_id: &str) -> Result<TripPlace> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM trip_places WHERE tripId = ?",
            [trip_id],
            |row| row.get(0),
        )?;
        self.add_trip_place(trip_id, place_id, count + 1)
    }

    /// Merge `patch` onto the stored row. Missing ids are ignored.
    pub fn update_trip_place(&self, id: &str, patch: TripPlacePatch) -> Result<()> {
        let Some(mut stop) = self.get_trip_place(id)? else {
            debug!(id, "update_trip_place: no such stop");
            return Ok(());
        };
        patch.apply(&mut stop);

        self.conn.execute(
            r#"
            UPDATE trip_places
            SET "order" = ?, visited = ?, visitDate = ?, notes = ?, photos = ?
            WHERE id = ?
            "#,
            params![
                stop.order,
                stop.visited,
                stop.visit_date.as_ref().map(format_date),
                stop.notes,
                encode_photos(&stop.photos)?,
                id,
            ],
        )?;
        Ok(())
    }

    /// Mark a stop visited on `today`, or unvisited with no date.
    pub fn set_visited(&self, id: &str, visited: bool, today: NaiveDate) -> Result<()> {
        self.update_trip_place(
            id,
            TripPlacePatch {
                visited: Some(visited),
                visit_date: Some(visited.then_some(today)),
                ..Default::default()
            },
        )
    }

    /// Renumber a trip's stops so each id gets its 1-based position in `ids`.
    ///
    /// `ids` must list every stop of the trip exactly once for the result to
    /// be dense. Ids belonging to other trips are left alone.
    pub fn reorder_trip_places(&self, trip_id: &str, ids: &[String]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare(r#"UPDATE trip_places SET "order" = ? WHERE id = ? AND tripId = ?"#)?;
            for (position, id) in ids.iter().enumerate() {
                stmt.execute(params![position as i64 + 1, id, trip_id])?;
            }
        }
        tx.commit()?;
        debug!(trip_id, count = ids.len(), "Reordered stops");
        Ok(())
    }

    /// Swap a stop with its neighbour and renumber the route densely.
    /// Moving past either end, or an id not on the trip, does nothing.
    pub fn move_trip_place(&self, trip_id: &str, id: &str, direction: Direction) -> Result<()> {
        let mut ids: Vec<String> = self
            .list_trip_places(trip_id)?
            .into_iter()
            .map(|tp| tp.id)
            .collect();
        let Some(index) = ids.iter().position(|candidate| candidate == id) else {
            return Ok(());
        };
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < ids.len() => index + 1,
            _ => return Ok(()),
        };
        ids.swap(index, target);
        self.reorder_trip_places(trip_id, &ids)
    }

    /// Removes one stop. Remaining orders are not renumbered.
    pub fn delete_trip_place(&self, id: &str) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM trip_places WHERE id = ?", [id])?;
        debug!(id, removed, "Deleted stop");
        Ok(())
    }

    /// First unvisited stop of the current trip.
    pub fn next_place(&self) -> Result<Option<TripPlaceWithPlace>> {
        let Some(trip) = self.get_current_trip()? else {
            return Ok(None);
        };
        Ok(self
            .list_trip_places_with_place(&trip.id)?
            .into_iter()
            .find(|stop| !stop.trip_place.visited))
    }
}
