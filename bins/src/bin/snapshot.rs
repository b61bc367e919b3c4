// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the Chronolane project*
//!
//! Render a timeline data directory to an SVG file, headlessly
//!

use chronolane_core::{Dataset, RawItem, SettingsResource, TrackId, ViewState};
use chronolane_renderer::{
    Engine, MemoryScene, PinStorage, PinStore, StorageError, TimelineElement, Transform,
    ViewConfig, Viewport,
};
use clap::Parser;
use directories_next::ProjectDirs;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode,
};
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

#[macro_use]
extern crate log;
extern crate simplelog;

const PROJECT_QUALIFIER: &str = "org";
const ORG_NAME: &str = "Chronolane";
const APPLICATION_NAME: &str = "Chronolane";
const SETTINGS_FILE_NAME: &str = "settings.json";
const VIEW_FILE_NAME: &str = "view.json";

/// Entry point for the snapshot tool
fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // Setup logging
    let config_log = ConfigBuilder::new()
        .add_filter_allow_str("chronolane")
        .add_filter_allow_str("snapshot")
        .build();
    let level = if args.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };
    CombinedLogger::init(vec![TermLogger::new(
        level,
        config_log,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])?;

    let svg = render(&args)?;
    fs::write(&args.out, svg)?;
    info!("Wrote {}", args.out.display());
    Ok(())
}

/// Chronolane snapshot CLI args using [clap]
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Render a Chronolane timeline to SVG",
    after_help = "The data directory holds settings.json, one <track>.json per track, and optionally view.json"
)]
pub struct Cli {
    /// Path to the data directory
    pub data: PathBuf,

    /// Path to a view config JSON file (defaults apply when absent)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the view state JSON file (defaults to view.json in the data
    /// directory, if present)
    #[arg(long)]
    pub view: Option<PathBuf>,

    /// Directory pins are persisted in (defaults to the user's data directory)
    #[arg(long)]
    pub pins: Option<PathBuf>,

    /// Toggle the pin of a label (`<track>::<label>`) before rendering
    #[arg(long)]
    pub toggle: Vec<String>,

    #[arg(long, default_value_t = 1200.0)]
    pub width: f64,

    #[arg(long, default_value_t = 800.0)]
    pub height: f64,

    /// Zoom scale
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub translate_x: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub translate_y: f64,

    /// Where to write the SVG
    #[arg(long, short, default_value = "timeline.svg")]
    pub out: PathBuf,

    /// Log everything
    #[arg(long, short)]
    pub verbose: bool,
}

/// Pins persisted as one JSON file per storage key
#[derive(Debug, Clone)]
pub struct FilePinStorage {
    dir: PathBuf,
}

impl FilePinStorage {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PinStorage for FilePinStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}

/// Get the directory pins are stored in when none is given
fn default_pins_dir() -> PathBuf {
    match ProjectDirs::from(PROJECT_QUALIFIER, ORG_NAME, APPLICATION_NAME) {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => {
            warn!("No home directory found, storing pins in the working directory");
            PathBuf::from(".")
        }
    }
}

/// Read a file, naming it in any error
fn read(path: &Path) -> Result<String, Box<dyn Error>> {
    fs::read_to_string(path).map_err(|error| format!("{}: {error}", path.display()).into())
}

/// Load and assemble the data directory
pub fn load_dataset(data_dir: &Path, view: Option<&Path>) -> Result<Dataset, Box<dyn Error>> {
    info!("Loading {}", data_dir.display());
    let settings = SettingsResource::from_json_str(&read(&data_dir.join(SETTINGS_FILE_NAME))?)?;

    let mut tracks: HashMap<TrackId, Vec<RawItem>> = HashMap::new();
    for id in settings.ids() {
        let path = data_dir.join(format!("{id}.json"));
        let items: Vec<RawItem> = serde_json::from_str(&read(&path)?)
            .map_err(|error| format!("{}: {error}", path.display()))?;
        debug!("Read {} items for `{id}`", items.len());
        tracks.insert(id.clone(), items);
    }

    let view_path = match view {
        Some(path) => Some(path.to_path_buf()),
        None => Some(data_dir.join(VIEW_FILE_NAME)).filter(|path| path.exists()),
    };
    let view: Option<ViewState> = match view_path {
        Some(path) => Some(serde_json::from_str(&read(&path)?)?),
        None => None,
    };

    Ok(Dataset::assemble(settings, tracks, view)?)
}

/// Build the timeline, apply the requested pins and transform, and return the
/// SVG text
pub fn render(args: &Cli) -> Result<String, Box<dyn Error>> {
    let dataset = load_dataset(&args.data, args.view.as_deref())?;
    let config = match &args.config {
        Some(path) => ViewConfig::from_json_str(&read(path)?)?,
        None => ViewConfig::default(),
    };
    let pins_dir = args.pins.clone().unwrap_or_else(default_pins_dir);
    debug!("Pins are stored in {}", pins_dir.display());

    let mut engine = Engine::build(
        &dataset,
        Viewport::new(args.width, args.height),
        config,
        MemoryScene::new(),
        PinStore::load(FilePinStorage::new(pins_dir)),
    )?;

    for key in &args.toggle {
        let element = engine
            .elements()
            .iter()
            .find(|element| element.key().as_str() == key.as_str())
            .map(TimelineElement::id);
        match element {
            Some(id) => {
                let pinned = engine.try_click(id)?;
                info!("{key} pinned: {pinned}");
            }
            None => warn!("No label {key} to toggle"),
        }
    }

    engine.try_set_transform(Transform {
        translate_x: args.translate_x,
        translate_y: args.translate_y,
        scale: args.scale,
    })?;
    let (min, max) = engine.visible_window();
    info!("Visible window is {min} to {max}");

    Ok(engine.scene().to_svg(args.width, args.height))
}
