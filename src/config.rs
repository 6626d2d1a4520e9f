use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use ratatui::style::Color;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::animation::timeline::ShuffleTiming;
use crate::error::{OracleError, OracleResult};
use crate::machine::{DrawMode, FlipMode, RevealTiming};
use crate::session::SessionConfig;

// ─── Embedded Default ────────────────────────────────────────────────────
/// Baked into the binary at compile time, so a missing or deleted config
/// file never stops the app from starting.
const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

/// Upper bound for any single `[timing]` duration
const MAX_TIMING_MS: u64 = 60_000;
const MAX_SHAKE_STEPS: u32 = 64;

// ─── CLI Arguments (override layer) ─────────────────────────────────────
/// Oracle: shuffle, draw and journal with a deck of oracle cards
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "oracle", version, about, long_about = None)]
pub struct CliArgs {
    /// Log level filter (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Path to a custom config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the default config to stdout and exit
    #[arg(long)]
    pub print_default_config: bool,

    /// Target FPS for the render loop (overrides config file)
    #[arg(long)]
    pub fps: Option<u16>,

    /// Card catalog TOML to deal from (overrides config file)
    #[arg(long)]
    pub deck: Option<PathBuf>,

    /// Directory for history, journal and favorites (overrides config file)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Start in three-card mode
    #[arg(long)]
    pub three: bool,

    /// Skip the shuffle played when the app opens
    #[arg(long)]
    pub no_shuffle: bool,

    /// Disable the log file entirely
    #[arg(long)]
    pub no_log: bool,
}

// ─── TOML Structs ───────────────────────────────────────────────────────

/// Root configuration, parsed from TOML, then overridden by CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub appearance: AppearanceConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub deck: DeckConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Where records and the log live (empty = platform data dir)
    pub data_dir: String,

    pub draw_mode: DrawMode,

    /// Play a shuffle as soon as the table opens
    pub auto_shuffle_on_open: bool,

    /// How far into the shuffle the opening animation starts (0.0 – 1.0)
    pub open_shuffle_progress: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Enable dialog animations
    pub animations: bool,

    /// Target FPS
    pub fps: u16,

    /// Number of face-down cards in the fan
    pub fan_size: usize,

    /// "transform" or "content_swap"
    pub flip_mode: FlipMode,

    pub show_help_bar: bool,
}

/// Durations in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub collapse: u64,
    pub hold: u64,
    pub shake_step: u64,
    pub shake_steps: u32,
    pub swirl: u64,
    pub swirl_reset: u64,
    pub expand: u64,
    pub confirm: u64,
    pub flip: u64,
    pub flip_lock_margin: u64,
    pub auto_flip_delay: u64,
    pub auto_flip_stagger: u64,
    pub detail_settle: u64,
    pub content_swap_delay: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Catalog TOML path (empty = built-in deck)
    pub catalog: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub bg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub fg_dim: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub accent: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub accent_secondary: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub border_focused: Color,
    /// Pattern on face-down cards
    #[serde(deserialize_with = "deserialize_color")]
    pub card_back: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub favorite: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub warning: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub error: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selected_bg: Color,
}

// ─── Defaults ───────────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML)
            .expect("BUG: embedded default_config.toml is invalid TOML")
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            data_dir: String::new(),
            draw_mode: DrawMode::Single,
            auto_shuffle_on_open: true,
            open_shuffle_progress: 0.35,
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            animations: true,
            fps: 30,
            fan_size: 9,
            flip_mode: FlipMode::Transform,
            show_help_bar: true,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            collapse: 400,
            hold: 150,
            shake_step: 90,
            shake_steps: 4,
            swirl: 700,
            swirl_reset: 120,
            expand: 450,
            confirm: 220,
            flip: 450,
            flip_lock_margin: 100,
            auto_flip_delay: 350,
            auto_flip_stagger: 250,
            detail_settle: 50,
            content_swap_delay: 120,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            fg_dim: Color::DarkGray,
            accent: Color::Rgb(0xd4, 0xaf, 0x37),
            accent_secondary: Color::Magenta,
            border: Color::DarkGray,
            border_focused: Color::Rgb(0xd4, 0xaf, 0x37),
            card_back: Color::Blue,
            favorite: Color::LightRed,
            warning: Color::Yellow,
            error: Color::Red,
            selected_bg: Color::DarkGray,
        }
    }
}

impl TimingConfig {
    /// Reject durations no animation could sensibly use.
    fn validate(&self) -> OracleResult<()> {
        let durations = [
            ("collapse", self.collapse),
            ("hold", self.hold),
            ("shake_step", self.shake_step),
            ("swirl", self.swirl),
            ("swirl_reset", self.swirl_reset),
            ("expand", self.expand),
            ("confirm", self.confirm),
            ("flip", self.flip),
            ("flip_lock_margin", self.flip_lock_margin),
            ("auto_flip_delay", self.auto_flip_delay),
            ("auto_flip_stagger", self.auto_flip_stagger),
            ("detail_settle", self.detail_settle),
            ("content_swap_delay", self.content_swap_delay),
        ];
        if let Some((name, ms)) = durations.iter().find(|(_, ms)| *ms > MAX_TIMING_MS) {
            return Err(OracleError::Config(format!(
                "timing.{name} = {ms} is above the {MAX_TIMING_MS} ms limit"
            )));
        }
        if self.shake_steps > MAX_SHAKE_STEPS {
            return Err(OracleError::Config(format!(
                "timing.shake_steps = {} is above the limit of {MAX_SHAKE_STEPS}",
                self.shake_steps
            )));
        }
        Ok(())
    }
}

// ─── Color Deserializer ─────────────────────────────────────────────────

fn deserialize_color<'de, D>(deserializer: D) -> std::result::Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: \"{s}\"")))
}

/// Parse a color string into a ratatui Color.
/// Supports: named colors, "reset", "#RRGGBB" hex.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "reset" | "default" | "transparent" => Some(Color::Reset),
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" | "dark_gray" | "dark_grey" => Some(Color::DarkGray),
        "lightred" | "light_red" => Some(Color::LightRed),
        "lightgreen" | "light_green" => Some(Color::LightGreen),
        "lightyellow" | "light_yellow" => Some(Color::LightYellow),
        "lightblue" | "light_blue" => Some(Color::LightBlue),
        "lightmagenta" | "light_magenta" => Some(Color::LightMagenta),
        "lightcyan" | "light_cyan" => Some(Color::LightCyan),
        hex if hex.starts_with('#') && hex.len() == 7 => {
            let r = u8::from_str_radix(&hex[1..3], 16).ok()?;
            let g = u8::from_str_radix(&hex[3..5], 16).ok()?;
            let b = u8::from_str_radix(&hex[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

// ─── Path Resolution ────────────────────────────────────────────────────

impl Config {
    /// Standard config file path: ~/.config/oracle-deck/config.toml
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oracle-deck")
            .join("config.toml")
    }

    /// Records and log directory: `general.data_dir`, else ~/.local/share/oracle-deck/
    pub fn data_dir(&self) -> PathBuf {
        let configured = self.general.data_dir.trim();
        if !configured.is_empty() {
            return PathBuf::from(configured);
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oracle-deck")
    }

    /// Custom catalog path, if one is configured
    pub fn catalog_path(&self) -> Option<PathBuf> {
        let path = self.deck.catalog.trim();
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    /// Convenience: tick interval from FPS
    pub fn tick_rate_ms(&self) -> u64 {
        let fps = self.appearance.fps.max(1);
        1000 / fps as u64
    }

    pub fn animations(&self) -> bool {
        self.appearance.animations
    }

    pub fn session(&self) -> SessionConfig {
        let t = &self.timing;
        SessionConfig {
            fan_size: self.appearance.fan_size.max(1),
            mode: self.general.draw_mode,
            shuffle: ShuffleTiming {
                collapse: ms(t.collapse),
                hold: ms(t.hold),
                shake_step: ms(t.shake_step),
                shake_steps: t.shake_steps,
                swirl: ms(t.swirl),
                swirl_reset: ms(t.swirl_reset),
                expand: ms(t.expand),
            },
            reveal: RevealTiming {
                flip: ms(t.flip),
                lock_margin: ms(t.flip_lock_margin),
                detail_settle: ms(t.detail_settle),
                content_swap_delay: ms(t.content_swap_delay),
            },
            flip_mode: self.appearance.flip_mode,
            confirm: ms(t.confirm),
            auto_flip_delay: ms(t.auto_flip_delay),
            auto_flip_stagger: ms(t.auto_flip_stagger),
        }
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

// ─── Bootloader ─────────────────────────────────────────────────────────

/// The single entry point for configuration. Called exactly once at startup.
///
/// 1. Resolve config file path (CLI override or default)
/// 2. If the file doesn't exist, create the directory tree and write defaults
/// 3. Parse TOML from disk into Config
/// 4. Apply CLI overrides on top
pub fn load(cli: &CliArgs) -> Result<Config> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).wrap_err_with(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&config_path, DEFAULT_CONFIG_TOML).wrap_err_with(|| {
            format!(
                "Failed to write default config to {}",
                config_path.display()
            )
        })?;
        info!("Created default config at {}", config_path.display());
    }

    let toml_str = std::fs::read_to_string(&config_path)
        .wrap_err_with(|| format!("Failed to read config from {}", config_path.display()))?;

    let mut config: Config = toml::from_str(&toml_str).wrap_err_with(|| {
        format!(
            "Failed to parse config at {}.\n\
             Delete the file to regenerate defaults, or run:\n  \
             oracle --print-default-config > {:?}",
            config_path.display(),
            config_path
        )
    })?;

    // ── CLI overrides ───────────────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(fps) = cli.fps {
        config.appearance.fps = fps;
    }
    if let Some(ref deck) = cli.deck {
        config.deck.catalog = deck.display().to_string();
    }
    if let Some(ref dir) = cli.data_dir {
        config.general.data_dir = dir.display().to_string();
    }
    if cli.three {
        config.general.draw_mode = DrawMode::Three;
    }
    if cli.no_shuffle {
        config.general.auto_shuffle_on_open = false;
    }
    config.general.open_shuffle_progress = config.general.open_shuffle_progress.clamp(0.0, 1.0);

    config
        .timing
        .validate()
        .wrap_err_with(|| format!("Invalid [timing] in {}", config_path.display()))?;

    Ok(config)
}

/// Returns the embedded default config TOML string.
pub fn default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}
