/*
 *  main.rs
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 *
 *  Command line player
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

use std::path::Path;
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info};

use lvif_player::config::{self, Cli, Config, DisplayConfig, MovieConfig, DEFAULT_FRAME_MARGIN_MS};
use lvif_player::display::{DisplayManager, GrayLevel};
use lvif_player::movie::{MovieError, MoviePlayer, PlayState};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

const EXIT_USAGE: i32 = 1;
const EXIT_PLAYBACK: i32 = 2;

fn init_logger(level: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Open the panel, play `loops` times, always tear down
fn play(config: &Config, path: &Path, loops: u32) -> anyhow::Result<()> {
    let display_config = config.display.clone().unwrap_or_else(DisplayConfig::default);
    let movie_config = config.movie.clone().unwrap_or_else(MovieConfig::default);

    let mut display = DisplayManager::new(&display_config)
        .context("Display initialization failed")?;

    let margin = movie_config.frame_margin_ms.unwrap_or(DEFAULT_FRAME_MARGIN_MS);
    let mut player = MoviePlayer::new(Duration::from_millis(margin));
    player
        .load(path, movie_config.scan.unwrap_or_default())
        .with_context(|| format!("Cannot load movie [{}]", path.display()))?;

    let colour = movie_config.colour.unwrap_or(GrayLevel::Black);
    let mut run = || -> Result<(), MovieError> {
        for pass in 1..=loops {
            while player.step(&mut display, colour)? != PlayState::Stopped {}
            debug!("Pass {} of {} done", pass, loops);
            player.rewind();
        }
        Ok(())
    };
    let played = run();

    player.teardown(&mut display).context("Teardown failed")?;
    played?;

    let metrics = display.performance_metrics();
    info!("{} frames flushed, avg transfer {}μs (link ceiling {:.1} FPS)",
          metrics.frame_count, metrics.avg_transfer_time_us, metrics.fps());
    Ok(())
}

fn main() {
    // --help and --version land here as "errors" that print to stdout
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let config = match config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_logger(if cli.debug { "debug" } else { "info" });
            error!("Configuration error: {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    init_logger(config.log_level.as_deref().unwrap_or("info"));

    info!("This is {}", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    if cli.dump_config {
        match config::dump(&config) {
            Ok(yaml) => {
                print!("{}", yaml);
                process::exit(0);
            }
            Err(e) => {
                error!("Cannot render config: {}", e);
                process::exit(EXIT_USAGE);
            }
        }
    }

    let Some(path) = cli.file.as_deref() else {
        error!("Invalid file path!");
        process::exit(EXIT_USAGE);
    };

    info!("Play Movie [{}] Loop Times [{}].", path.display(), cli.loop_count);

    if let Err(e) = play(&config, path, cli.loop_count) {
        error!("Playback failed: {:#}", e);
        process::exit(EXIT_PLAYBACK);
    }

    info!("Play Movie [{}] End.", path.display());
}
