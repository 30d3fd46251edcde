/*
 *  config.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration layered under command line overrides
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::display::blit::ScanLayout;
use crate::display::color::GrayLevel;
use crate::display::font::FontName;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// e.g. "info" | "debug"
    pub log_level: Option<String>,
    pub display: Option<DisplayConfig>,
    pub movie: Option<MovieConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bits_per_pixel: Option<u8>,
    /// 0 none, 1 mirror x, 2 mirror y, 3 both
    pub mirror: Option<u8>,
    pub font: Option<FontName>,
    pub gpio: Option<GpioConfig>,
}

/// Serial link wiring, sysfs (BCM) numbering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GpioConfig {
    pub cs: u64,
    pub rst: u64,
    pub dc: u64,
    pub sda: u64,
    pub scl: u64,
}

impl Default for GpioConfig {
    // wiringPi 21..25 on a Raspberry Pi header
    fn default() -> Self {
        Self { cs: 5, rst: 6, dc: 13, sda: 19, scl: 26 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MovieConfig {
    pub scan: Option<ScanLayout>,
    /// Ink colour; white plays the movie inverted
    pub colour: Option<GrayLevel>,
    /// Added to every pacing sleep
    pub frame_margin_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    St75256,
    Mock,
}

pub const DEFAULT_FRAME_MARGIN_MS: u64 = 10;

/// CLI overrides. Options layer over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "lvif-player", version, about = "Play LVIF movies on a 4-gray dot-matrix LCD")]
pub struct Cli {
    /// Movie file to play
    #[arg(short = 'f', long, value_hint = ValueHint::FilePath, required_unless_present = "dump_config")]
    pub file: Option<PathBuf>,
    /// Number of times to play the movie
    #[arg(short = 'l', long = "loop", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub loop_count: u32,
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Enable debug log level
    #[arg(short = 'v', long, alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    /// Use the mock driver instead of GPIO
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
    /// 0 none, 1 mirror x, 2 mirror y, 3 both
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3))]
    pub mirror: Option<u8>,
    /// Frame byte order: page | row
    #[arg(long, value_parser = parse_scan)]
    pub scan: Option<ScanLayout>,
    /// Ink colour: black | dark_gray | light_gray | white
    #[arg(long, value_parser = parse_colour)]
    pub colour: Option<GrayLevel>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_scan(s: &str) -> Result<ScanLayout, String> {
    match s.to_ascii_lowercase().as_str() {
        "page" => Ok(ScanLayout::Page),
        "row" => Ok(ScanLayout::Row),
        other => Err(format!("unknown scan layout '{}', expected page or row", other)),
    }
}

fn parse_colour(s: &str) -> Result<GrayLevel, String> {
    match s.to_ascii_lowercase().replace('-', "_").as_str() {
        "white" => Ok(GrayLevel::White),
        "light_gray" | "light_grey" => Ok(GrayLevel::LightGray),
        "dark_gray" | "dark_grey" => Ok(GrayLevel::DarkGray),
        "black" => Ok(GrayLevel::Black),
        other => Err(format!("unknown colour '{}'", other)),
    }
}

/// Read YAML, merge CLI overrides, fill defaults, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Whatever is still unset
    fill_defaults(&mut cfg);

    // 5) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of effective config
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/lvif-player/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/lvif-player/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/lvif-player.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["lvif-player.yaml", "config/lvif-player.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.movie, src.movie) {
        (None, Some(c)) => dst.movie = Some(c),
        (Some(d), Some(s)) => merge_movie(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()         { dst.driver = src.driver; }
    if src.width.is_some()          { dst.width = src.width; }
    if src.height.is_some()         { dst.height = src.height; }
    if src.bits_per_pixel.is_some() { dst.bits_per_pixel = src.bits_per_pixel; }
    if src.mirror.is_some()         { dst.mirror = src.mirror; }
    if src.font.is_some()           { dst.font = src.font; }
    if src.gpio.is_some()           { dst.gpio = src.gpio; }
}

fn merge_movie(dst: &mut MovieConfig, src: MovieConfig) {
    if src.scan.is_some()            { dst.scan = src.scan; }
    if src.colour.is_some()          { dst.colour = src.colour; }
    if src.frame_margin_ms.is_some() { dst.frame_margin_ms = src.frame_margin_ms; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".to_string()); }

    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    if cli.dry_run           { display.driver = Some(DriverKind::Mock); }
    if cli.mirror.is_some()  { display.mirror = cli.mirror; }

    let movie = cfg.movie.get_or_insert_with(MovieConfig::default);
    if cli.scan.is_some()    { movie.scan = cli.scan; }
    if cli.colour.is_some()  { movie.colour = cli.colour; }
}

fn fill_defaults(cfg: &mut Config) {
    cfg.log_level.get_or_insert_with(|| "info".to_string());

    let display = cfg.display.get_or_insert_with(DisplayConfig::default);
    let driver = *display.driver.get_or_insert(DriverKind::St75256);
    display.width.get_or_insert(192);
    display.height.get_or_insert(96);
    display.bits_per_pixel.get_or_insert(2);
    display.mirror.get_or_insert(0);
    display.font.get_or_insert(FontName::default());
    if driver == DriverKind::St75256 {
        display.gpio.get_or_insert_with(GpioConfig::default);
    }

    let movie = cfg.movie.get_or_insert_with(MovieConfig::default);
    movie.scan.get_or_insert(ScanLayout::default());
    movie.colour.get_or_insert(GrayLevel::Black);
    movie.frame_margin_ms.get_or_insert(DEFAULT_FRAME_MARGIN_MS);
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if let (Some(w), Some(h)) = (display.width, display.height) {
            if w == 0 || h == 0 {
                return Err(ConfigError::Validation("display width/height must be > 0".into()));
            }
            if w > 256 || h > 256 {
                return Err(ConfigError::Validation("display width/height must be <= 256".into()));
            }
        }
        if let Some(bits) = display.bits_per_pixel {
            match bits {
                1 | 2 => {
                    let per_byte = 8 / bits as u32;
                    if display.height.is_some_and(|h| h % per_byte != 0) {
                        return Err(ConfigError::Validation(format!(
                            "display height must be a multiple of {} at {} bits per pixel",
                            per_byte, bits
                        )));
                    }
                }
                _ => return Err(ConfigError::Validation("display bits_per_pixel must be 1|2".into())),
            }
        }
        if let Some(m) = display.mirror {
            if m > 3 {
                return Err(ConfigError::Validation("display mirror must be 0..=3".into()));
            }
        }
    }
    if let Some(movie) = cfg.movie.as_ref() {
        if let Some(margin) = movie.frame_margin_ms {
            if margin > 1000 {
                return Err(ConfigError::Validation("movie frame_margin_ms must be <= 1000".into()));
            }
        }
    }
    Ok(())
}
