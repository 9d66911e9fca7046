//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use gonext::config::ThemeMode;
use gonext::localize::Language;

#[derive(Parser)]
#[command(name = "gonext", version)]
#[command(about = "Travel diary: places, trips and routes", long_about = None)]
#[command(after_help = "Environment:\n  GONEXT_CONFIG  Config file (overridden by --config)\n  GONEXT_LOG     Log filter, e.g. debug or gonext=trace")]
pub(crate) struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print entities as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log at debug level regardless of GONEXT_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List places, optionally filtered by text
    Places {
        query: Vec<String>,
    },

    /// Add, edit, show or remove a place
    Place {
        #[command(subcommand)]
        action: PlaceAction,
    },

    /// List trips; the current one is marked with *
    Trips,

    /// Add, edit, show, activate or remove a trip
    Trip {
        #[command(subcommand)]
        action: TripAction,
    },

    /// Manage the stops of a trip's route
    Stop {
        #[command(subcommand)]
        action: StopAction,
    },

    /// Next unvisited place of the current trip
    Next,

    /// Attach or detach photos
    Photo {
        #[command(subcommand)]
        action: PhotoAction,
    },

    /// Set the display language
    Lang {
        language: Language,
    },

    /// Set the colour theme
    Theme {
        mode: ThemeMode,
    },

    /// Show preferences and storage locations
    Settings,

    /// Delete every place, trip and photo
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum PlaceAction {
    /// Create a place and print its id
    Add(PlaceAddArgs),
    /// Change fields of an existing place
    Edit(PlaceEditArgs),
    Show { id: String },
    /// Toggle the liked mark
    Like { id: String },
    Rm { id: String },
}

#[derive(Args)]
pub(crate) struct PlaceAddArgs {
    #[arg(required = true)]
    pub name: Vec<String>,

    #[arg(long)]
    pub desc: Option<String>,

    #[arg(long)]
    pub name_en: Option<String>,

    #[arg(long)]
    pub desc_en: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<String>,

    /// Already visited (not on the visit-later list)
    #[arg(long)]
    pub visited: bool,

    #[arg(long)]
    pub liked: bool,
}

/// Unset options keep the stored value; an empty `--lat`/`--lon` clears it.
#[derive(Args)]
pub(crate) struct PlaceEditArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub desc: Option<String>,

    #[arg(long)]
    pub name_en: Option<String>,

    #[arg(long)]
    pub desc_en: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<String>,

    #[arg(long)]
    pub liked: Option<bool>,

    #[arg(long)]
    pub visit_later: Option<bool>,
}

#[derive(Subcommand)]
pub(crate) enum TripAction {
    /// Create a trip and print its id
    Add(TripAddArgs),
    /// Change fields of an existing trip
    Edit(TripEditArgs),
    Show { id: String },
    /// Make a trip current; without an id no trip stays current
    Current { id: Option<String> },
    Rm { id: String },
}

#[derive(Args)]
pub(crate) struct TripAddArgs {
    #[arg(required = true)]
    pub title: Vec<String>,

    #[arg(long)]
    pub desc: Option<String>,

    #[arg(long)]
    pub title_en: Option<String>,

    #[arg(long)]
    pub desc_en: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub end: Option<String>,

    #[arg(long)]
    pub current: bool,
}

/// Unset options keep the stored value; an empty `--start`/`--end` clears it.
#[derive(Args)]
pub(crate) struct TripEditArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub desc: Option<String>,

    #[arg(long)]
    pub title_en: Option<String>,

    #[arg(long)]
    pub desc_en: Option<String>,

    #[arg(long)]
    pub start: Option<String>,

    #[arg(long)]
    pub end: Option<String>,

    #[arg(long)]
    pub current: Option<bool>,
}

#[derive(Subcommand)]
pub(crate) enum StopAction {
    /// Append a place to the end of a trip's route
    Add { trip_id: String, place_id: String },
    /// Mark visited today
    Visit { id: String },
    Unvisit { id: String },
    /// Move one position earlier in the route
    Up { id: String },
    /// Move one position later in the route
    Down { id: String },
    /// Replace the stop's notes; no text clears them
    Note { id: String, text: Vec<String> },
    Rm { id: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum OwnerKind {
    Place,
    Stop,
}

#[derive(Subcommand)]
pub(crate) enum PhotoAction {
    /// Copy an image file into the photo store and attach it
    Add {
        owner: OwnerKind,
        id: String,
        file: PathBuf,
    },
    /// Detach a photo by its 1-based position and delete its file
    Rm {
        owner: OwnerKind,
        id: String,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        number: u32,
    },
}
