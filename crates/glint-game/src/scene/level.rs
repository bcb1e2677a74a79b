use anyhow::{Result, ensure};

use glint_engine::coords::Rect;
use glint_engine::render::QuadSink;
use glint_engine::time::FrameTimer;

use crate::assets::Assets;
use crate::controls::Controls;
use crate::settings::LevelSettings;
use crate::widgets::Tilter;

use super::{Element, Sprite};

/// Largest tile grid a level may declare.
pub const MAX_TILES: usize = 1 << 20;

/// The playable map: a grid of (optionally animated) tiles plus the tilters.
#[derive(Debug)]
pub struct Level {
    map_rect: Rect,
    tiles: Vec<Sprite>,
    tile_frames: u32,
    frame_seconds: f32,
    frame: u32,
    frame_clock: f32,
    tilters: Vec<Tilter>,
}

impl Level {
    pub fn new(settings: &LevelSettings, assets: &Assets, show_mirror_points: bool) -> Result<Self> {
        ensure!(settings.tile_size > 0.0, "level tile_size must be positive");
        let tile_frames = settings.tile_frames.max(1);

        let tile_texture = assets.texture(&settings.tile_texture)?;
        let first_frame = frame_uv(0, tile_frames);
        let size = settings.tile_size;

        let tile_count = (settings.columns as usize).saturating_mul(settings.rows as usize);
        ensure!(
            tile_count <= MAX_TILES,
            "level grid {}x{} exceeds {MAX_TILES} tiles",
            settings.columns,
            settings.rows
        );

        let mut tiles = Vec::with_capacity(tile_count);
        for row in 0..settings.rows {
            for col in 0..settings.columns {
                let rect = Rect::new(col as f32 * size, row as f32 * size, size, size);
                tiles.push(Sprite::new(tile_texture, rect).with_uv(first_frame));
            }
        }

        let tilters = settings
            .tilters
            .iter()
            .map(|t| {
                Ok(Tilter::new(
                    assets.texture(&t.base_texture)?,
                    t.base_rect(),
                    t.base_uv(),
                    assets.texture(&t.mirror_texture)?,
                    t.pivot(),
                    t.angle,
                )
                .with_mirror_point_markers(show_mirror_points))
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "level: {}x{} tiles, {} tilter(s)",
            settings.columns,
            settings.rows,
            tilters.len()
        );

        Ok(Self {
            map_rect: settings.map_rect(),
            tiles,
            tile_frames,
            frame_seconds: settings.frame_seconds,
            frame: 0,
            frame_clock: 0.0,
            tilters,
        })
    }

    pub fn map_rect(&self) -> Rect {
        self.map_rect
    }

    pub fn tilters(&self) -> &[Tilter] {
        &self.tilters
    }

    pub fn tiles(&self) -> &[Sprite] {
        &self.tiles
    }

    /// Current animation frame of the tiles.
    pub fn tile_frame(&self) -> u32 {
        self.frame
    }

    fn advance_animation(&mut self, dt: f32) {
        if self.tile_frames <= 1 || self.frame_seconds <= 0.0 {
            return;
        }
        self.frame_clock += dt;
        let steps = (self.frame_clock / self.frame_seconds).floor();
        if steps < 1.0 {
            return;
        }
        self.frame_clock -= steps * self.frame_seconds;
        self.frame = ((self.frame as u64 + steps as u64) % self.tile_frames as u64) as u32;

        let uv = frame_uv(self.frame, self.tile_frames);
        for tile in &mut self.tiles {
            tile.set_uv(uv);
        }
    }
}

/// UV rect of frame `index` in a horizontal strip of `frames`.
fn frame_uv(index: u32, frames: u32) -> Rect {
    let w = 1.0 / frames as f32;
    Rect::new(index as f32 * w, 0.0, w, 1.0)
}

impl Element for Level {
    fn update(&mut self, view: Rect, controls: &Controls, timer: &FrameTimer) {
        self.advance_animation(timer.frame_elapsed_secs());

        for tile in &mut self.tiles {
            tile.update(view);
        }
        for tilter in &mut self.tilters {
            tilter.update(view, controls, timer);
            if tilter.take_changed() {
                log::debug!("tilter at {:?} now at {:.2} degrees", tilter.pivot(), tilter.angle());
            }
        }
    }

    fn draw(&self, sink: &mut dyn QuadSink) {
        for tile in &self.tiles {
            tile.draw(sink);
        }
        for tilter in &self.tilters {
            tilter.draw(sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::testing::RecordingBackend;
    use glint_engine::time::ManualClock;
    use std::time::Duration;

    fn level(settings: &LevelSettings) -> Level {
        let mut s = Settings::default();
        s.level = settings.clone();
        let mut backend = RecordingBackend::new();
        let assets = Assets::load(&mut backend, &s).unwrap();
        Level::new(settings, &assets, false).unwrap()
    }

    fn small() -> LevelSettings {
        LevelSettings {
            columns: 4,
            rows: 3,
            tile_size: 10.0,
            tile_frames: 4,
            frame_seconds: 0.5,
            ..LevelSettings::default()
        }
    }

    #[test]
    fn builds_grid_and_tilters() {
        let l = level(&small());
        assert_eq!(l.tiles().len(), 12);
        assert_eq!(l.map_rect(), Rect::new(0.0, 0.0, 40.0, 30.0));
        assert_eq!(l.tiles()[5].rect(), Rect::new(10.0, 10.0, 10.0, 10.0));
        assert_eq!(l.tilters().len(), 1);
        assert_eq!(l.tiles()[0].uv(), Rect::new(0.0, 0.0, 0.25, 1.0));
    }

    #[test]
    fn tiles_outside_the_view_are_culled() {
        let mut l = level(&small());
        let timer = FrameTimer::new();
        l.update(Rect::new(0.0, 0.0, 15.0, 15.0), &Controls::default(), &timer);
        let visible = l.tiles().iter().filter(|t| t.is_visible()).count();
        assert_eq!(visible, 4);
    }

    #[test]
    fn animation_follows_elapsed_time() {
        let clock = ManualClock::new();
        let mut timer = FrameTimer::with_clock(Box::new(clock.clone()));
        let mut l = level(&small());
        let view = l.map_rect();

        clock.advance(Duration::from_millis(300));
        timer.update();
        l.update(view, &Controls::default(), &timer);
        assert_eq!(l.tile_frame(), 0);

        clock.advance(Duration::from_millis(300));
        timer.update();
        l.update(view, &Controls::default(), &timer);
        assert_eq!(l.tile_frame(), 1);
        assert_eq!(l.tiles()[0].uv(), Rect::new(0.25, 0.0, 0.25, 1.0));

        clock.advance(Duration::from_millis(1500));
        timer.update();
        l.update(view, &Controls::default(), &timer);
        assert_eq!(l.tile_frame(), 0);
    }

    #[test]
    fn zero_elapsed_time_does_not_animate() {
        let mut l = level(&small());
        let timer = FrameTimer::with_clock(Box::new(ManualClock::new()));
        for _ in 0..10 {
            l.update(l.map_rect(), &Controls::default(), &timer);
        }
        assert_eq!(l.tile_frame(), 0);
    }

    #[test]
    fn non_positive_tile_size_is_rejected() {
        let mut settings = small();
        settings.tile_size = 0.0;
        let mut s = Settings::default();
        s.level = settings.clone();
        let mut backend = RecordingBackend::new();
        let assets = Assets::load(&mut backend, &s).unwrap();
        assert!(Level::new(&settings, &assets, false).is_err());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let s = Settings::default();
        let mut backend = RecordingBackend::new();
        let assets = Assets::load(&mut backend, &s).unwrap();

        // 70000 * 70000 does not fit in a u32.
        let mut settings = small();
        settings.columns = 70_000;
        settings.rows = 70_000;
        let err = Level::new(&settings, &assets, false).unwrap_err();
        assert!(err.to_string().contains("exceeds"));

        settings.columns = u32::MAX;
        settings.rows = u32::MAX;
        assert!(Level::new(&settings, &assets, false).is_err());

        settings.columns = 1025;
        settings.rows = 1024;
        assert!(Level::new(&settings, &assets, false).is_err());
    }
}
