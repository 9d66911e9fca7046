//! Checks applied to user input before it reaches the repositories.
//!
//! The database layer stores whatever it is given; these are the only
//! range and required-field checks.

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

use crate::db::{PlacePatch, Trip, TripPatch};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Title must not be empty")]
    EmptyTitle,
    #[error("Latitude must be a number between -90 and 90, got {0:?}")]
    InvalidLatitude(String),
    #[error("Longitude must be a number between -180 and 180, got {0:?}")]
    InvalidLongitude(String),
    #[error("Not a valid date (expected YYYY-MM-DD): {0:?}")]
    InvalidDate(String),
    #[error("Start date cannot be after end date")]
    StartAfterEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn limit(&self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    fn error(&self, input: &str) -> ValidationError {
        match self {
            Axis::Latitude => ValidationError::InvalidLatitude(input.to_string()),
            Axis::Longitude => ValidationError::InvalidLongitude(input.to_string()),
        }
    }
}

/// Blank input means "no coordinate".
pub fn parse_coordinate(input: &str, axis: Axis) -> Result<Option<f64>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed.parse().map_err(|_| axis.error(trimmed))?;
    if !value.is_finite() || value.abs() > axis.limit() {
        return Err(axis.error(trimmed));
    }
    Ok(Some(value))
}

/// Blank input means "no date". Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|ts| Some(ts.date_naive()))
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Checked place fields, name trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceInput {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Trimmed, non-empty place name.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

pub fn validate_place(name: &str, latitude: &str, longitude: &str) -> Result<PlaceInput, ValidationError> {
    Ok(PlaceInput {
        name: validate_name(name)?,
        latitude: parse_coordinate(latitude, Axis::Latitude)?,
        longitude: parse_coordinate(longitude, Axis::Longitude)?,
    })
}

/// Checked trip fields, title trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripInput {
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}

/// Either bound may be open; two set bounds must be in order.
pub fn check_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(ValidationError::StartAfterEnd),
        _ => Ok(()),
    }
}

pub fn validate_trip(title: &str, start: &str, end: &str) -> Result<TripInput, ValidationError> {
    let title = validate_title(title)?;
    let start_date = parse_date(start)?;
    let end_date = parse_date(end)?;
    check_date_range(start_date, end_date)?;
    Ok(TripInput {
        title,
        start_date,
        end_date,
    })
}

/// Raw edit-form values for a place. `None` keeps the stored value; a blank
/// coordinate clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub name_en: Option<String>,
    pub description_en: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub visitlater: Option<bool>,
    pub liked: Option<bool>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

pub fn validate_place_edit(edit: PlaceEdit) -> Result<PlacePatch, ValidationError> {
    Ok(PlacePatch {
        name: edit.name.as_deref().map(validate_name).transpose()?,
        description: trimmed(edit.description),
        name_en: trimmed(edit.name_en),
        description_en: trimmed(edit.description_en),
        visitlater: edit.visitlater,
        liked: edit.liked,
        latitude: edit
            .latitude
            .as_deref()
            .map(|lat| parse_coordinate(lat, Axis::Latitude))
            .transpose()?,
        longitude: edit
            .longitude
            .as_deref()
            .map(|lon| parse_coordinate(lon, Axis::Longitude))
            .transpose()?,
        photos: None,
    })
}

/// Raw edit-form values for a trip. `None` keeps the stored value; a blank
/// date clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub title_en: Option<String>,
    pub description_en: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: Option<bool>,
}

/// The date range is checked against `trip` with the edit applied.
pub fn validate_trip_edit(trip: &Trip, edit: TripEdit) -> Result<TripPatch, ValidationError> {
    let start_date = edit.start_date.as_deref().map(parse_date).transpose()?;
    let end_date = edit.end_date.as_deref().map(parse_date).transpose()?;
    check_date_range(
        start_date.unwrap_or(trip.start_date),
        end_date.unwrap_or(trip.end_date),
    )?;

    Ok(TripPatch {
        title: edit.title.as_deref().map(validate_title).transpose()?,
        description: trimmed(edit.description),
        title_en: trimmed(edit.title_en),
        description_en: trimmed(edit.description_en),
        start_date,
        end_date,
        current: edit.current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_coordinate_bounds() {
        assert_eq!(parse_coordinate("", Axis::Latitude), Ok(None));
        assert_eq!(parse_coordinate(" 90 ", Axis::Latitude), Ok(Some(90.0)));
        assert_eq!(parse_coordinate("-180", Axis::Longitude), Ok(Some(-180.0)));
        assert_eq!(
            parse_coordinate("90.0001", Axis::Latitude),
            Err(ValidationError::InvalidLatitude("90.0001".to_string()))
        );
        assert_eq!(
            parse_coordinate("181", Axis::Longitude),
            Err(ValidationError::InvalidLongitude("181".to_string()))
        );
        assert!(parse_coordinate("north", Axis::Latitude).is_err());
        assert!(parse_coordinate("NaN", Axis::Latitude).is_err());
    }

    #[test]
    fn test_validate_place() {
        let input = validate_place("  Kazan Kremlin ", "55.7987", "49.1064").unwrap();
        assert_eq!(input.name, "Kazan Kremlin");
        assert_eq!(input.latitude, Some(55.7987));
        assert_eq!(validate_place("   ", "", ""), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_validate_trip_dates() {
        let input = validate_trip("Volga", "2025-06-01", "2025-06-10T12:00:00Z").unwrap();
        assert_eq!(input.start_date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(input.end_date, NaiveDate::from_ymd_opt(2025, 6, 10));

        assert_eq!(
            validate_trip("Volga", "2025-06-10", "2025-06-01"),
            Err(ValidationError::StartAfterEnd)
        );
        assert_eq!(
            validate_trip("Volga", "tomorrow", ""),
            Err(ValidationError::InvalidDate("tomorrow".to_string()))
        );
        assert_eq!(validate_trip("", "", ""), Err(ValidationError::EmptyTitle));
        assert_eq!(validate_trip("Volga", "", "2025-06-01").unwrap().start_date, None);
    }

    #[test]
    fn test_date_range_with_open_bounds() {
        let june_1 = NaiveDate::from_ymd_opt(2025, 6, 1);
        let june_10 = NaiveDate::from_ymd_opt(2025, 6, 10);
        assert_eq!(check_date_range(june_1, june_10), Ok(()));
        assert_eq!(check_date_range(june_1, june_1), Ok(()));
        assert_eq!(check_date_range(june_10, None), Ok(()));
        assert_eq!(check_date_range(None, june_1), Ok(()));
        assert_eq!(check_date_range(june_10, june_1), Err(ValidationError::StartAfterEnd));
    }

    #[test]
    fn test_name_and_title_are_trimmed() {
        assert_eq!(validate_name(" Sviyazhsk "), Ok("Sviyazhsk".to_string()));
        assert_eq!(validate_title("\tVolga\n"), Ok("Volga".to_string()));
        assert_eq!(validate_title(" "), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_place_edit_builds_patch() {
        let patch = validate_place_edit(PlaceEdit {
            name: Some(" Kazan Kremlin ".to_string()),
            name_en: Some(" Kremlin ".to_string()),
            latitude: Some(String::new()),
            longitude: Some("49.1064".to_string()),
            liked: Some(true),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("Kazan Kremlin"));
        assert_eq!(patch.name_en.as_deref(), Some("Kremlin"));
        assert_eq!(patch.description, None);
        assert_eq!(patch.latitude, Some(None));
        assert_eq!(patch.longitude, Some(Some(49.1064)));
        assert_eq!(patch.liked, Some(true));
        assert_eq!(patch.visitlater, None);
        assert_eq!(patch.photos, None);

        assert_eq!(validate_place_edit(PlaceEdit::default()).unwrap(), PlacePatch::default());
        assert_eq!(
            validate_place_edit(PlaceEdit {
                name: Some("  ".to_string()),
                ..Default::default()
            }),
            Err(ValidationError::EmptyName)
        );
        assert!(validate_place_edit(PlaceEdit {
            latitude: Some("91".to_string()),
            ..Default::default()
        })
        .is_err());
    }

    fn trip(start: &str, end: &str) -> Trip {
        Trip {
            id: "trip_1_x".to_string(),
            title: "Volga".to_string(),
            description: String::new(),
            title_en: String::new(),
            description_en: String::new(),
            start_date: parse_date(start).unwrap(),
            end_date: parse_date(end).unwrap(),
            created_at: Utc::now(),
            current: false,
        }
    }

    #[test]
    fn test_trip_edit_checks_merged_dates() {
        let stored = trip("2025-06-01", "2025-06-10");

        assert_eq!(
            validate_trip_edit(
                &stored,
                TripEdit {
                    start_date: Some("2025-06-15".to_string()),
                    ..Default::default()
                }
            ),
            Err(ValidationError::StartAfterEnd)
        );

        let patch = validate_trip_edit(
            &stored,
            TripEdit {
                start_date: Some("2025-06-15".to_string()),
                end_date: Some(String::new()),
                title_en: Some("Volga cruise".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(patch.start_date, Some(NaiveDate::from_ymd_opt(2025, 6, 15)));
        assert_eq!(patch.end_date, Some(None));
        assert_eq!(patch.title_en.as_deref(), Some("Volga cruise"));
        assert_eq!(patch.title, None);

        assert_eq!(
            validate_trip_edit(
                &stored,
                TripEdit {
                    title: Some(String::new()),
                    ..Default::default()
                }
            ),
            Err(ValidationError::EmptyTitle)
        );
    }
}
