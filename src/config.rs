use log::warn;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex};

const CONFIG_PATH: &str = "hanpatch.ini";

const DEFAULT_RESOURCES_DIR: &str = "resources";
/// Resource set in which character and place names are themselves
/// translated; selected by `translate_all_names`.
const ALL_NAMES_RESOURCES_DIR: &str = "resources_allch";

// --- Minimal INI reader ---
#[derive(Debug, Default)]
pub struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        self.sections.clear();

        let mut current_section: Option<String> = None;

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            // Section header: [SectionName]
            if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
                let name = &line[1..line.len() - 1];
                let section = name.trim().to_string();
                current_section = Some(section.clone());
                self.sections.entry(section).or_default();
                continue;
            }

            // Key/value pair: key=value
            if let Some(eq_idx) = line.find('=') {
                let (key_raw, value_raw) = line.split_at(eq_idx);
                let key = key_raw.trim();
                if key.is_empty() {
                    continue;
                }
                let value = value_raw[1..].trim().to_string();
                let section = current_section.clone().unwrap_or_default();
                self.sections
                    .entry(section)
                    .or_default()
                    .insert(key.to_string(), value);
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section).and_then(|s| s.get(key)).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    #[must_use]
    pub const fn as_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Use the resource set in which proper names are translated too.
    pub translate_all_names: bool,
    /// Root of the translation resource pack, relative to the patch.
    pub resources_dir: String,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate_all_names: false,
            resources_dir: DEFAULT_RESOURCES_DIR.to_string(),
            log_level: LogLevel::Warn,
        }
    }
}

impl Config {
    /// Effective resource directory after the name-translation switch.
    #[must_use]
    pub fn resource_dir(&self) -> &str {
        if self.translate_all_names {
            ALL_NAMES_RESOURCES_DIR
        } else {
            &self.resources_dir
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

static CONFIG: LazyLock<Mutex<Config>> = LazyLock::new(|| Mutex::new(Config::default()));

pub fn load() {
    load_from(Path::new(CONFIG_PATH));
}

pub fn load_from(path: &Path) {
    let mut ini = SimpleIni::new();
    if let Err(e) = ini.load(path) {
        warn!("config {} not loaded ({e}); using defaults", path.display());
        return;
    }

    let mut config = Config::default();
    if let Some(v) = ini.get("General", "TranslateAllNames") {
        match parse_bool(&v) {
            Some(b) => config.translate_all_names = b,
            None => warn!("TranslateAllNames = {v:?} is not a boolean; keeping default"),
        }
    }
    if let Some(v) = ini.get("General", "ResourcesDir") {
        if v.is_empty() {
            warn!("ResourcesDir is empty; keeping {:?}", config.resources_dir);
        } else {
            config.resources_dir = v;
        }
    }
    if let Some(v) = ini.get("General", "LogLevel") {
        match v.parse::<LogLevel>() {
            Ok(level) => config.log_level = level,
            Err(()) => warn!(
                "LogLevel = {v:?} is not a level; keeping {}",
                config.log_level.as_str()
            ),
        }
    }

    *CONFIG.lock().unwrap() = config;
}

#[must_use]
pub fn get() -> Config {
    CONFIG.lock().unwrap().clone()
}
