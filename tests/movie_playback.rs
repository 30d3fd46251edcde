/*
 *  tests/movie_playback.rs
 *
 *  End-to-end playback of LVIF files through the mock panel
 *
 *  lvif-player - movies on 4-gray dot-matrix LCDs
 *  (c) 2020-26 Stuart Hunter
 */

use std::io::Write;
use std::time::{Duration, Instant};

use lvif_player::display::drivers::mock::MockDriver;
use lvif_player::display::{DisplayManager, GrayLevel};
use lvif_player::movie::{
    Clock, MovieError, MovieHeader, MoviePlayer, PlayState, ScanLayout, MAGIC,
};
use tempfile::NamedTempFile;

/// Clock that never moves unless something sleeps on it
struct StillClock {
    now: Instant,
    slept: Duration,
}

impl Clock for StillClock {
    fn now(&self) -> Instant {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.slept += duration;
        self.now += duration;
    }
}

fn still_player() -> MoviePlayer<StillClock> {
    let clock = StillClock { now: Instant::now(), slept: Duration::ZERO };
    MoviePlayer::with_clock(clock, Duration::from_millis(10))
}

fn example_header() -> MovieHeader {
    MovieHeader {
        magic: MAGIC,
        video_width: 176,
        video_height: 144,
        lcd_width: 96,
        lcd_height: 64,
        fps: 25,
        frame_count: 3,
        bits_per_pixel: 2,
    }
}

fn write_movie(header: &MovieHeader, body: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&header.to_bytes()).unwrap();
    file.write_all(body).unwrap();
    file.flush().unwrap();
    file
}

fn mock_display() -> (DisplayManager, MockDriver) {
    let driver = MockDriver::new_with_size(192, 96).unwrap();
    let probe = driver.clone();
    let mut display = DisplayManager::new_with_driver(Box::new(driver));
    display.init().unwrap();
    (display, probe)
}

#[test]
fn test_example_movie_loads_and_plays() {
    let header = example_header();
    let body = vec![0xFFu8; 4608];
    let file = write_movie(&header, &body);

    let (mut display, probe) = mock_display();
    let mut player = still_player();
    player.load(file.path(), ScanLayout::Page).unwrap();
    assert_eq!(player.header(), Some(&header));

    let mut steps = Vec::new();
    loop {
        let state = player.step(&mut display, GrayLevel::Black).unwrap();
        steps.push(state);
        if state == PlayState::Stopped {
            break;
        }
    }

    assert_eq!(steps.len(), 5);
    assert_eq!(steps.iter().filter(|s| **s == PlayState::Running).count(), 4);
    assert_eq!(probe.state().lock().unwrap().flush_count, 3);
    assert_eq!(probe.count_inked_pixels(), 96 * 64);
}

#[test]
fn test_truncated_body_fails_to_load() {
    let body = vec![0u8; 4607];
    let file = write_movie(&example_header(), &body);

    let mut player = still_player();
    let err = player.load(file.path(), ScanLayout::Page).unwrap_err();

    assert!(matches!(err, MovieError::SizeMismatch { expected: 4640, actual: 4639 }));
    assert_eq!(player.state(), PlayState::Stopped);
}

#[test]
fn test_missing_and_foreign_files_fail_to_load() {
    let mut player = still_player();
    assert!(matches!(
        player.load("/nonexistent/clip.lvif", ScanLayout::Page),
        Err(MovieError::Io(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"GIF89a, not a movie at all.....").unwrap();
    file.write_all(&[0u8; 64]).unwrap();
    file.flush().unwrap();
    assert!(matches!(
        player.load(file.path(), ScanLayout::Page),
        Err(MovieError::BadMagic(_))
    ));

    let short = write_movie(&example_header(), &[]);
    let bytes = std::fs::read(short.path()).unwrap();
    let mut stub = NamedTempFile::new().unwrap();
    stub.write_all(&bytes[..20]).unwrap();
    stub.flush().unwrap();
    assert!(matches!(
        player.load(stub.path(), ScanLayout::Page),
        Err(MovieError::ShortHeader(20))
    ));
}

#[test]
fn test_looping_reuses_the_buffer() {
    let file = write_movie(&example_header(), &vec![0x55u8; 4608]);

    let (mut display, probe) = mock_display();
    let mut player = still_player();
    player.load(file.path(), ScanLayout::Page).unwrap();

    // the file is gone; frames come from memory from here on
    drop(file);

    for _ in 0..3 {
        while player.step(&mut display, GrayLevel::Black).unwrap() != PlayState::Stopped {}
        player.rewind();
    }
    player.teardown(&mut display).unwrap();

    let state = probe.state();
    let state = state.lock().unwrap();
    assert_eq!(state.flush_count, 9);
    assert!(state.last_frame.iter().all(|&b| b == 0));
}

#[test]
fn test_row_scan_layout() {
    // 16x8 one-bit frame, left half set in every row
    let header = MovieHeader {
        lcd_width: 16,
        lcd_height: 8,
        frame_count: 1,
        bits_per_pixel: 1,
        ..example_header()
    };
    let body: Vec<u8> = (0..8).flat_map(|_| [0xFF, 0x00]).collect();
    let file = write_movie(&header, &body);

    let (mut display, probe) = mock_display();
    let mut player = still_player();
    player.load(file.path(), ScanLayout::Row).unwrap();
    player.step(&mut display, GrayLevel::Black).unwrap();
    player.step(&mut display, GrayLevel::Black).unwrap();

    // origin (192 - 16) / 2 - 1 = 87, (96 - 8) / 2 - 1 = 43
    assert_eq!(probe.frame_level(87, 43), Some(3));
    assert_eq!(probe.frame_level(94, 50), Some(3));
    assert_eq!(probe.frame_level(95, 43), Some(0));
    assert_eq!(probe.count_inked_pixels(), 64);
}

#[test]
fn test_pacing_sleeps_are_bounded() {
    let file = write_movie(&example_header(), &vec![0u8; 4608]);

    let (mut display, _) = mock_display();
    let mut player = still_player();
    player.load(file.path(), ScanLayout::Page).unwrap();

    while player.step(&mut display, GrayLevel::Black).unwrap() != PlayState::Stopped {}

    // never more than one interval plus margin per frame
    assert!(player.clock().slept <= Duration::from_millis(3 * 50));
    assert!(player.clock().slept > Duration::ZERO);
}
