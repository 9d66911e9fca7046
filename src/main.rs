mod cli;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use cli::{
    Cli, Commands, OwnerKind, PhotoAction, PlaceAction, PlaceAddArgs, PlaceEditArgs, StopAction,
    TripAction, TripAddArgs, TripEditArgs,
};
use gonext::config::{Config, ThemeMode};
use gonext::db::{Direction, NewPlace, NewTrip, PlacePatch, TripPlacePatch};
use gonext::localize::{self, Language};
use gonext::photos::{ImageSource, PhotoOwner};
use gonext::validate::{self, PlaceEdit, TripEdit};
use gonext::{logging, Database, PhotoStore};

struct App {
    config: Config,
    config_path: PathBuf,
    db: Database,
    photos: PhotoStore,
    json: bool,
}

fn words(parts: &[String]) -> String {
    parts.join(" ")
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl App {
    fn lang(&self) -> &'static str {
        self.config.settings.language.code()
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Places { query } => self.list_places(&words(&query)),
            Commands::Place { action } => self.place_command(action),
            Commands::Trips => self.list_trips(),
            Commands::Trip { action } => self.trip_command(action),
            Commands::Stop { action } => self.stop_command(action),
            Commands::Next => self.next_place(),
            Commands::Photo { action } => self.photo_command(action),
            Commands::Lang { language } => self.set_language(language),
            Commands::Theme { mode } => self.set_theme(mode),
            Commands::Settings => self.show_settings(),
            Commands::Reset { yes } => self.reset(yes),
        }
    }

    fn list_places(&self, query: &str) -> Result<()> {
        let places = self.db.list_places()?;
        let matching = gonext::db::filter_places(&places, query);
        if self.json {
            return self.print_json(&matching);
        }
        if matching.is_empty() {
            println!("No places");
        }
        for place in matching {
            let marks = format!(
                "{}{}",
                if place.liked { "♥" } else { " " },
                if place.visitlater { "☆" } else { " " }
            );
            println!("{} {}  {}", marks, place.id, localize::place_name(place, self.lang()));
        }
        Ok(())
    }

    fn place_command(&self, action: PlaceAction) -> Result<()> {
        match action {
            PlaceAction::Add(args) => self.add_place(args),
            PlaceAction::Edit(args) => self.edit_place(args),
            PlaceAction::Show { id } => self.show_place(&id),
            PlaceAction::Like { id } => {
                let place = self
                    .db
                    .get_place(&id)?
                    .ok_or_else(|| anyhow!("No place with id {}", id))?;
                self.db.update_place(
                    &id,
                    PlacePatch {
                        liked: Some(!place.liked),
                        ..Default::default()
                    },
                )?;
                Ok(())
            }
            PlaceAction::Rm { id } => Ok(self.db.delete_place(&id)?),
        }
    }

    fn add_place(&self, args: PlaceAddArgs) -> Result<()> {
        let input = validate::validate_place(
            &words(&args.name),
            args.lat.as_deref().unwrap_or_default(),
            args.lon.as_deref().unwrap_or_default(),
        )?;
        let place = self.db.create_place(NewPlace {
            name: input.name,
            description: trimmed(args.desc).unwrap_or_default(),
            name_en: trimmed(args.name_en).unwrap_or_default(),
            description_en: trimmed(args.desc_en).unwrap_or_default(),
            visitlater: !args.visited,
            liked: args.liked,
            latitude: input.latitude,
            longitude: input.longitude,
            photos: Vec::new(),
        })?;
        println!("{}", place.id);
        Ok(())
    }

    fn edit_place(&self, args: PlaceEditArgs) -> Result<()> {
        if self.db.get_place(&args.id)?.is_none() {
            bail!("No place with id {}", args.id);
        }
        let patch = validate::validate_place_edit(PlaceEdit {
            name: args.name,
            description: args.desc,
            name_en: args.name_en,
            description_en: args.desc_en,
            latitude: args.lat,
            longitude: args.lon,
            visitlater: args.visit_later,
            liked: args.liked,
        })?;
        Ok(self.db.update_place(&args.id, patch)?)
    }

    fn show_place(&self, id: &str) -> Result<()> {
        let place = self
            .db
            .get_place(id)?
            .ok_or_else(|| anyhow!("No place with id {}", id))?;
        if self.json {
            return self.print_json(&place);
        }
        println!("{}", localize::place_name(&place, self.lang()));
        let description = localize::place_description(&place, self.lang());
        if !description.is_empty() {
            println!("{}", description);
        }
        if let (Some(lat), Some(lon)) = (place.latitude, place.longitude) {
            println!("Location: {:.6}, {:.6}", lat, lon);
        }
        println!("Liked: {}  Visit later: {}", place.liked, place.visitlater);
        for (n, photo) in place.photos.iter().enumerate() {
            println!("Photo {}: {}", n + 1, photo);
        }
        Ok(())
    }

    fn list_trips(&self) -> Result<()> {
        let trips = self.db.list_trips()?;
        if self.json {
            return self.print_json(&trips);
        }
        if trips.is_empty() {
            println!("No trips");
        }
        for trip in &trips {
            let dates = match (trip.start_date, trip.end_date) {
                (Some(s), Some(e)) => format!("{} – {}", s, e),
                (Some(s), None) => format!("from {}", s),
                (None, Some(e)) => format!("until {}", e),
                (None, None) => String::new(),
            };
            println!(
                "{} {}  {}  {}",
                if trip.current { "*" } else { " " },
                trip.id,
                localize::trip_title(trip, self.lang()),
                dates
            );
        }
        Ok(())
    }

    fn trip_command(&self, action: TripAction) -> Result<()> {
        match action {
            TripAction::Add(args) => self.add_trip(args),
            TripAction::Edit(args) => self.edit_trip(args),
            TripAction::Show { id } => self.show_trip(&id),
            TripAction::Current { id: Some(id) } => Ok(self.db.set_current_trip(&id)?),
            TripAction::Current { id: None } => Ok(self.db.clear_current_trip()?),
            TripAction::Rm { id } => Ok(self.db.delete_trip(&id)?),
        }
    }

    fn add_trip(&self, args: TripAddArgs) -> Result<()> {
        let input = validate::validate_trip(
            &words(&args.title),
            args.start.as_deref().unwrap_or_default(),
            args.end.as_deref().unwrap_or_default(),
        )?;
        let trip = self.db.create_trip(NewTrip {
            title: input.title,
            description: trimmed(args.desc).unwrap_or_default(),
            title_en: trimmed(args.title_en).unwrap_or_default(),
            description_en: trimmed(args.desc_en).unwrap_or_default(),
            start_date: input.start_date,
            end_date: input.end_date,
            current: args.current,
        })?;
        println!("{}", trip.id);
        Ok(())
    }

    fn edit_trip(&self, args: TripEditArgs) -> Result<()> {
        let trip = self
            .db
            .get_trip(&args.id)?
            .ok_or_else(|| anyhow!("No trip with id {}", args.id))?;
        let patch = validate::validate_trip_edit(
            &trip,
            TripEdit {
                title: args.title,
                description: args.desc,
                title_en: args.title_en,
                description_en: args.desc_en,
                start_date: args.start,
                end_date: args.end,
                current: args.current,
            },
        )?;
        Ok(self.db.update_trip(&trip.id, patch)?)
    }

    fn show_trip(&self, id: &str) -> Result<()> {
        let trip = self
            .db
            .get_trip(id)?
            .ok_or_else(|| anyhow!("No trip with id {}", id))?;
        let stops = self.db.list_trip_places_with_place(id)?;
        if self.json {
            return self.print_json(&serde_json::json!({ "trip": trip, "stops": stops }));
        }
        println!("{}", localize::trip_title(&trip, self.lang()));
        let description = localize::trip_description(&trip, self.lang());
        if !description.is_empty() {
            println!("{}", description);
        }
        for stop in &stops {
            let visited = match (stop.trip_place.visited, stop.trip_place.visit_date) {
                (true, Some(date)) => format!("visited {}", date),
                (true, None) => "visited".to_string(),
                (false, _) => String::new(),
            };
            println!(
                "{:>3}. {}  {}  {}",
                stop.trip_place.order,
                stop.trip_place.id,
                localize::place_name(&stop.place, self.lang()),
                visited
            );
        }
        Ok(())
    }

    fn stop_command(&self, action: StopAction) -> Result<()> {
        let id = match &action {
            StopAction::Add { trip_id, place_id } => {
                if self.db.get_trip(trip_id)?.is_none() {
                    bail!("No trip with id {}", trip_id);
                }
                if self.db.get_place(place_id)?.is_none() {
                    bail!("No place with id {}", place_id);
                }
                let stop = self.db.append_trip_place(trip_id, place_id)?;
                println!("{}", stop.id);
                return Ok(());
            }
            StopAction::Visit { id }
            | StopAction::Unvisit { id }
            | StopAction::Up { id }
            | StopAction::Down { id }
            | StopAction::Note { id, .. }
            | StopAction::Rm { id } => id.as_str(),
        };
        let stop = self
            .db
            .get_trip_place(id)?
            .ok_or_else(|| anyhow!("No stop with id {}", id))?;
        let today = gonext::db::visit_date_today();

        match &action {
            StopAction::Add { .. } => {}
            StopAction::Visit { .. } => self.db.set_visited(id, true, today)?,
            StopAction::Unvisit { .. } => self.db.set_visited(id, false, today)?,
            StopAction::Up { .. } => self.db.move_trip_place(&stop.trip_id, id, Direction::Up)?,
            StopAction::Down { .. } => {
                self.db.move_trip_place(&stop.trip_id, id, Direction::Down)?
            }
            StopAction::Note { text, .. } => self.db.update_trip_place(
                id,
                TripPlacePatch {
                    notes: Some(words(text)),
                    ..Default::default()
                },
            )?,
            StopAction::Rm { .. } => self.db.delete_trip_place(id)?,
        }
        Ok(())
    }

    fn next_place(&self) -> Result<()> {
        let next = self.db.next_place()?;
        if self.json {
            return self.print_json(&next);
        }
        match next {
            Some(stop) => {
                println!(
                    "{}. {}",
                    stop.trip_place.order,
                    localize::place_name(&stop.place, self.lang())
                );
                if let (Some(lat), Some(lon)) = (stop.place.latitude, stop.place.longitude) {
                    println!("Location: {:.6}, {:.6}", lat, lon);
                }
            }
            None => match self.db.get_current_trip()? {
                Some(_) => println!("All places of the current trip are visited"),
                None => println!("No current trip"),
            },
        }
        Ok(())
    }

    fn photo_command(&self, action: PhotoAction) -> Result<()> {
        match action {
            PhotoAction::Add { owner, id, file } => {
                let owner = photo_owner(owner, &id);
                let path = self
                    .db
                    .attach_photo(&self.photos, owner, &ImageSource::File(file))?
                    .ok_or_else(|| anyhow!("No {} with id {}", owner_label(owner), id))?;
                println!("{}", path);
            }
            PhotoAction::Rm { owner, id, number } => {
                let owner = photo_owner(owner, &id);
                let index = usize::try_from(number - 1)?;
                let path = self
                    .db
                    .detach_photo(&self.photos, owner, index)?
                    .ok_or_else(|| {
                        anyhow!("{} {} has no photo {}", owner_label(owner), id, number)
                    })?;
                println!("Removed {}", path);
            }
        }
        Ok(())
    }

    fn set_language(&mut self, language: Language) -> Result<()> {
        self.config.settings.language = language;
        self.config.save_to(&self.config_path)?;
        println!("Language: {}", language.label());
        Ok(())
    }

    fn set_theme(&mut self, mode: ThemeMode) -> Result<()> {
        self.config.settings.theme = mode;
        self.config.save_to(&self.config_path)
    }

    fn show_settings(&self) -> Result<()> {
        let settings = &self.config.settings;
        if self.json {
            return self.print_json(settings);
        }
        println!("Language: {}", settings.language.label());
        println!("Theme: {:?}", settings.theme);
        println!("Primary color: {}", settings.primary_color());
        println!("Database: {}", self.config.db_path.display());
        println!(
            "Photos: {} ({} files)",
            self.photos.root().display(),
            self.photos.count_files()
        );
        Ok(())
    }

    fn reset(&self, confirmed: bool) -> Result<()> {
        if !confirmed {
            bail!("reset deletes every place, trip and photo; pass --yes to confirm");
        }
        let summary = self.db.reset_all_data(&self.photos)?;
        println!(
            "Deleted {} rows and {} photo files",
            summary.rows_deleted, summary.photos_removed
        );
        Ok(())
    }
}

fn photo_owner(kind: OwnerKind, id: &str) -> PhotoOwner<'_> {
    match kind {
        OwnerKind::Place => PhotoOwner::Place(id),
        OwnerKind::Stop => PhotoOwner::TripPlace(id),
    }
}

fn owner_label(owner: PhotoOwner<'_>) -> &'static str {
    match owner {
        PhotoOwner::Place(_) => "place",
        PhotoOwner::TripPlace(_) => "stop",
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = logging::init(None, cli.verbose);

    let config_path = cli.config.unwrap_or_else(Config::resolve_path);
    let config = Config::load_from(&config_path)?;

    let db = Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database: {}", config.db_path.display()))?;
    db.ensure_schema().context("Database migration failed")?;
    let photos = PhotoStore::new(&config.photos_dir);

    let mut app = App {
        config,
        config_path,
        db,
        photos,
        json: cli.json,
    };
    let result = app.run(cli.command);
    if let Err(e) = &result {
        tracing::error!("Command failed: {:#}", e);
    }
    result
}
