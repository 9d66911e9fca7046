//! Language-aware display strings for places and trips.
//!
//! Russian is the primary language stored in `name`/`title`/`description`;
//! English overrides live in the `_en` fields and win only when non-blank.

use serde::{Deserialize, Serialize};

use crate::db::{Place, Trip};

/// Code of the secondary language carried in the `_en` fields.
pub const SECONDARY_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ru" => Some(Language::Ru),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Ru => "Русский",
            Language::En => "English",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    /// Case-insensitive language code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(&s.trim().to_lowercase())
            .ok_or_else(|| format!("unsupported language {:?} (expected ru or en)", s))
    }
}

fn pick(primary: &str, secondary: &str, lang: &str) -> String {
    let secondary = secondary.trim();
    if lang == SECONDARY_LANGUAGE && !secondary.is_empty() {
        secondary.to_string()
    } else {
        primary.to_string()
    }
}

pub fn place_name(place: &Place, lang: &str) -> String {
    pick(&place.name, &place.name_en, lang)
}

pub fn place_description(place: &Place, lang: &str) -> String {
    pick(&place.description, &place.description_en, lang)
}

pub fn trip_title(trip: &Trip, lang: &str) -> String {
    pick(&trip.title, &trip.title_en, lang)
}

pub fn trip_description(trip: &Trip, lang: &str) -> String {
    pick(&trip.description, &trip.description_en, lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn trip(title: &str, title_en: &str) -> Trip {
        Trip {
            id: "trip_1_test".to_string(),
            title: title.to_string(),
            description: "Поездка".to_string(),
            title_en: title_en.to_string(),
            description_en: String::new(),
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
            current: false,
        }
    }

    fn place(name: &str, name_en: &str) -> Place {
        Place {
            id: "place_1_test".to_string(),
            name: name.to_string(),
            description: "Описание".to_string(),
            name_en: name_en.to_string(),
            description_en: "  Description  ".to_string(),
            visitlater: true,
            liked: false,
            latitude: None,
            longitude: None,
            photos: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_trip_title_fallback() {
        let mut t = trip("Ride", "");
        assert_eq!(trip_title(&t, "en"), "Ride");

        t.title_en = "Ride EN".to_string();
        assert_eq!(trip_title(&t, "en"), "Ride EN");
        assert_eq!(trip_title(&t, "ru"), "Ride");
    }

    #[test]
    fn test_blank_override_falls_back() {
        let t = trip("Поход", "   ");
        assert_eq!(trip_title(&t, "en"), "Поход");
        assert_eq!(trip_description(&t, "en"), "Поездка");
    }

    #[test]
    fn test_place_fields_trimmed_when_used() {
        let p = place("Эрмитаж", " Hermitage ");
        assert_eq!(place_name(&p, "en"), "Hermitage");
        assert_eq!(place_name(&p, "ru"), "Эрмитаж");
        assert_eq!(place_description(&p, "en"), "Description");
        assert_eq!(place_description(&p, "de"), "Описание");
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("en"), Some(Language::En));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::default().code(), "ru");
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert_eq!("ru".parse::<Language>(), Ok(Language::Ru));
        assert!("de".parse::<Language>().is_err());
    }
}
