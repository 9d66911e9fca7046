//! Place repository.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{decode_photos, encode_photos, format_timestamp, new_id, parse_timestamp, Database, Result};

const PLACE_COLUMNS: &str = "id, name, description, name_en, description_en, visitlater, liked, \
                             latitude, longitude, photos, createdAt";

/// A point of interest the user wants to visit or has visited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub description: String,
    pub name_en: String,
    pub description_en: String,
    pub visitlater: bool,
    pub liked: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Stored photo paths, in display order.
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new place. Id and creation time are assigned on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlace {
    pub name: String,
    pub description: String,
    pub name_en: String,
    pub description_en: String,
    pub visitlater: bool,
    pub liked: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photos: Vec<String>,
}

/// Partial update. `None` leaves a field as stored; for the coordinates
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub name_en: Option<String>,
    pub description_en: Option<String>,
    pub visitlater: Option<bool>,
    pub liked: Option<bool>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub photos: Option<Vec<String>>,
}

impl PlacePatch {
    fn apply(self, place: &mut Place) {
        if let Some(name) = self.name {
            place.name = name;
        }
        if let Some(description) = self.description {
            place.description = description;
        }
        if let Some(name_en) = self.name_en {
            place.name_en = name_en;
        }
        if let Some(description_en) = self.description_en {
            place.description_en = description_en;
        }
        if let Some(visitlater) = self.visitlater {
            place.visitlater = visitlater;
        }
        if let Some(liked) = self.liked {
            place.liked = liked;
        }
        if let Some(latitude) = self.latitude {
            place.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            place.longitude = longitude;
        }
        if let Some(photos) = self.photos {
            place.photos = photos;
        }
    }
}

fn row_to_place(row: &Row<'_>) -> rusqlite::Result<Place> {
    let created_at: String = row.get(10)?;
    Ok(Place {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        name_en: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        description_en: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        visitlater: row.get(5)?,
        liked: row.get(6)?,
        latitude: row.get(7)?,
        longitude: row.get(8)?,
        photos: decode_photos(9, row.get(9)?)?,
        created_at: parse_timestamp(10, &created_at)?,
    })
}

/// Case-insensitive match of `query` against name and description.
/// A blank query keeps every place.
pub fn filter_places<'a>(places: &'a [Place], query: &str) -> Vec<&'a Place> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return places.iter().collect();
    }
    places
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
                || p.name_en.to_lowercase().contains(&needle)
                || p.description_en.to_lowercase().contains(&needle)
        })
        .collect()
}

impl Database {
    /// All places, newest first.
    pub fn list_places(&self) -> Result<Vec<Place>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM places ORDER BY createdAt DESC, rowid DESC",
            PLACE_COLUMNS
        ))?;
        let places = stmt
            .query_map([], row_to_place)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(places)
    }

    pub fn get_place(&self, id: &str) -> Result<Option<Place>> {
        let place = self
            .conn
            .query_row(
                &format!("SELECT {} FROM places WHERE id = ?", PLACE_COLUMNS),
                [id],
                row_to_place,
            )
            .optional()?;
        Ok(place)
    }

    pub fn create_place(&self, new: NewPlace) -> Result<Place> {
        let place = Place {
            id: new_id("place"),
            name: new.name,
            description: new.description,
            name_en: new.name_en,
            description_en: new.description_en,
            visitlater: new.visitlater,
            liked: new.liked,
            latitude: new.latitude,
            longitude: new.longitude,
            photos: new.photos,
            created_at: Utc::now().trunc_subsecs(3),
        };

        self.conn.execute(
            r#"
            INSERT INTO places (id, name, description, name_en, description_en, visitlater, liked,
                                latitude, longitude, photos, createdAt)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                place.id,
                place.name,
                place.description,
                place.name_en,
                place.description_en,
                place.visitlater,
                place.liked,
                place.latitude,
                place.longitude,
                encode_photos(&place.photos)?,
                format_timestamp(&place.created_at),
            ],
        )?;
        debug!(id = %place.id, "Created place");
        Ok(place)
    }

    /// Merge `patch` onto the stored row. Missing ids are ignored.
    pub fn update_place(&self, id: &str, patch: PlacePatch) -> Result<()> {
        let Some(mut place) = self.get_place(id)? else {
            debug!(id, "update_place: no such place");
            return Ok(());
        };
        patch.apply(&mut place);

        self.conn.execute(
            r#"
            UPDATE places
            SET name = ?, description = ?, name_en = ?, description_en = ?, visitlater = ?,
                liked = ?, latitude = ?, longitude = ?, photos = ?
            WHERE id = ?
            "#,
            params![
                place.name,
                place.description,
                place.name_en,
                place.description_en,
                place.visitlater,
                place.liked,
                place.latitude,
                place.longitude,
                encode_photos(&place.photos)?,
                id,
            ],
        )?;
        Ok(())
    }

    /// Removes the place only; route stops pointing at it are left in place.
    pub fn delete_place(&self, id: &str) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM places WHERE id = ?", [id])?;
        debug!(id, removed, "Deleted place");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.ensure_schema().unwrap();
        db
    }

    fn new_place(name: &str) -> NewPlace {
        NewPlace {
            name: name.to_string(),
            description: format!("{} description", name),
            visitlater: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_get_place() {
        let db = test_db();
        let created = db
            .create_place(NewPlace {
                latitude: Some(55.7539),
                longitude: Some(37.6208),
                ..new_place("Red Square")
            })
            .unwrap();

        assert!(created.id.starts_with("place_"));
        assert!(created.photos.is_empty());
        assert_eq!(db.get_place(&created.id).unwrap(), Some(created));
    }

    #[test]
    fn test_get_missing_place_is_none() {
        let db = test_db();
        assert_eq!(db.get_place("place_0_missing").unwrap(), None);
    }

    #[test]
    fn test_ids_are_unique() {
        let db = test_db();
        let ids: HashSet<String> = (0..50)
            .map(|i| db.create_place(new_place(&format!("P{}", i))).unwrap().id)
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_list_places_newest_first() {
        let db = test_db();
        let first = db.create_place(new_place("First")).unwrap();
        let second = db.create_place(new_place("Second")).unwrap();
        let third = db.create_place(new_place("Third")).unwrap();

        let ids: Vec<String> = db.list_places().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_photos_round_trip_in_order() {
        let db = test_db();
        let photos = vec![
            "/photos/places/x/photo_3.jpg".to_string(),
            "/photos/places/x/photo_1.jpg".to_string(),
            "/photos/places/x/photo \"quoted\" 2.jpg".to_string(),
        ];
        let place = db
            .create_place(NewPlace {
                photos: photos.clone(),
                ..new_place("Gallery")
            })
            .unwrap();
        assert_eq!(db.get_place(&place.id).unwrap().unwrap().photos, photos);

        let mut updated = photos.clone();
        updated.push("/photos/places/x/photo_4.jpg".to_string());
        db.update_place(
            &place.id,
            PlacePatch {
                photos: Some(updated.clone()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(db.list_places().unwrap()[0].photos, updated);
    }

    #[test]
    fn test_empty_patch_leaves_row_unchanged() {
        let db = test_db();
        let place = db
            .create_place(NewPlace {
                latitude: Some(-33.8568),
                longitude: Some(151.2153),
                photos: vec!["a.jpg".to_string()],
                ..new_place("Opera House")
            })
            .unwrap();

        db.update_place(&place.id, PlacePatch::default()).unwrap();

        assert_eq!(db.get_place(&place.id).unwrap(), Some(place));
    }

    #[test]
    fn test_partial_update_merges_fields() {
        let db = test_db();
        let place = db
            .create_place(NewPlace {
                latitude: Some(10.0),
                longitude: Some(20.0),
                ..new_place("Harbor")
            })
            .unwrap();

        db.update_place(
            &place.id,
            PlacePatch {
                liked: Some(true),
                name_en: Some("Harbour".to_string()),
                latitude: Some(None),
                ..Default::default()
            },
        )
        .unwrap();

        let stored = db.get_place(&place.id).unwrap().unwrap();
        assert!(stored.liked);
        assert_eq!(stored.name, "Harbor");
        assert_eq!(stored.name_en, "Harbour");
        assert_eq!(stored.latitude, None);
        assert_eq!(stored.longitude, Some(20.0));
        assert_eq!(stored.created_at, place.created_at);
    }

    #[test]
    fn test_update_and_delete_missing_are_noops() {
        let db = test_db();
        let place = db.create_place(new_place("Only")).unwrap();

        db.update_place(
            "place_0_missing",
            PlacePatch {
                name: Some("Ghost".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        db.delete_place("place_0_missing").unwrap();

        assert_eq!(db.list_places().unwrap(), vec![place]);
    }

    #[test]
    fn test_delete_place() {
        let db = test_db();
        let place = db.create_place(new_place("Gone")).unwrap();
        db.delete_place(&place.id).unwrap();
        assert_eq!(db.get_place(&place.id).unwrap(), None);
    }

    #[test]
    fn test_filter_places() {
        let db = test_db();
        db.create_place(new_place("Hermitage")).unwrap();
        db.create_place(NewPlace {
            description: "Big museum of art".to_string(),
            ..new_place("Louvre")
        })
        .unwrap();
        db.create_place(new_place("Colosseum")).unwrap();
        let places = db.list_places().unwrap();

        let names = |query: &str| -> Vec<String> {
            filter_places(&places, query).iter().map(|p| p.name.clone()).collect()
        };
        assert_eq!(names("  herm "), vec!["Hermitage".to_string()]);
        assert_eq!(names("MUSEUM"), vec!["Louvre".to_string()]);
        assert_eq!(names("   ").len(), 3);
        assert!(names("pyramid").is_empty());
    }
}
