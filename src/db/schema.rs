/// Schema version written to `PRAGMA user_version` once all migrations ran.
pub const SCHEMA_VERSION: i32 = 2;

/// Version 1: all five tables plus indexes on the foreign-key columns.
pub const SCHEMA_V1: &str = r#"
-- Places: points of interest, photos inlined as a JSON array
CREATE TABLE IF NOT EXISTS places (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    visitlater INTEGER NOT NULL DEFAULT 1,
    liked INTEGER NOT NULL DEFAULT 0,
    latitude REAL,
    longitude REAL,
    photos TEXT NOT NULL DEFAULT '[]',
    createdAt TEXT NOT NULL
);

-- Place photos (unused, photos live in places.photos)
CREATE TABLE IF NOT EXISTS place_photos (
    id TEXT PRIMARY KEY NOT NULL,
    placeId TEXT NOT NULL,
    path TEXT NOT NULL,
    createdAt TEXT NOT NULL,
    FOREIGN KEY (placeId) REFERENCES places(id) ON DELETE CASCADE
);

-- Trips: at most one row has current = 1
CREATE TABLE IF NOT EXISTS trips (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    startDate TEXT,            -- YYYY-MM-DD
    endDate TEXT,              -- YYYY-MM-DD
    createdAt TEXT NOT NULL,
    current INTEGER NOT NULL DEFAULT 0
);

-- Route stops: a place attached to a trip.
-- placeId is a plain reference so deleting a place leaves its stops behind.
CREATE TABLE IF NOT EXISTS trip_places (
    id TEXT PRIMARY KEY NOT NULL,
    tripId TEXT NOT NULL,
    placeId TEXT NOT NULL,
    "order" INTEGER NOT NULL,  -- 1-based route position
    visited INTEGER NOT NULL DEFAULT 0,
    visitDate TEXT,
    notes TEXT NOT NULL DEFAULT '',
    photos TEXT NOT NULL DEFAULT '[]',
    createdAt TEXT NOT NULL,
    FOREIGN KEY (tripId) REFERENCES trips(id) ON DELETE CASCADE
);

-- Stop photos (unused, photos live in trip_places.photos)
CREATE TABLE IF NOT EXISTS trip_place_photos (
    id TEXT PRIMARY KEY NOT NULL,
    tripPlaceId TEXT NOT NULL,
    path TEXT NOT NULL,
    createdAt TEXT NOT NULL,
    FOREIGN KEY (tripPlaceId) REFERENCES trip_places(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_place_photos_placeId ON place_photos(placeId);
CREATE INDEX IF NOT EXISTS idx_trip_places_tripId ON trip_places(tripId);
CREATE INDEX IF NOT EXISTS idx_trip_places_placeId ON trip_places(placeId);
CREATE INDEX IF NOT EXISTS idx_trip_place_photos_tripPlaceId ON trip_place_photos(tripPlaceId);
"#;

/// Version 2: secondary-language (English) text columns.
pub const SCHEMA_V2: &str = r#"
ALTER TABLE places ADD COLUMN name_en TEXT DEFAULT '';
ALTER TABLE places ADD COLUMN description_en TEXT DEFAULT '';
ALTER TABLE trips ADD COLUMN title_en TEXT DEFAULT '';
ALTER TABLE trips ADD COLUMN description_en TEXT DEFAULT '';
"#;

/// Migrations keyed by the version they produce, in application order.
pub const MIGRATIONS: &[(i32, &str)] = &[(1, SCHEMA_V1), (2, SCHEMA_V2)];

/// Tables in foreign-key-safe deletion order (children first).
pub const TABLES_CHILDREN_FIRST: &[&str] = &[
    "trip_place_photos",
    "trip_places",
    "place_photos",
    "places",
    "trips",
];
