//! Test doubles for the loop: a scripted platform and a recording backend.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use anyhow::{Result, bail};
use glam::Mat4;

use glint_engine::coords::Vec2;
use glint_engine::input::{InputEvent, InputState, Key, KeyState, MouseButton, MouseButtonState};
use glint_engine::render::{Font, FontId, FrameStatus, Quad, QuadSink, RenderBackend, Texture, TextureId};
use glint_engine::submit::SubmitJob;
use glint_engine::window::{Platform, Polled};

use crate::controls::Controls;
use crate::settings::{Settings, TilterSettings};

pub(crate) fn key_down(key: Key) -> InputEvent {
    InputEvent::Key {
        key,
        state: KeyState::Pressed,
        repeat: false,
    }
}

pub(crate) fn key_up(key: Key) -> InputEvent {
    InputEvent::Key {
        key,
        state: KeyState::Released,
        repeat: false,
    }
}

pub(crate) fn mouse(state: MouseButtonState) -> InputEvent {
    InputEvent::MouseButton {
        button: MouseButton::Left,
        state,
    }
}

/// Controls with the pointer at `world` and the left button in the given state.
pub(crate) fn pointer_controls(world: Vec2, down: bool, was_down: bool) -> Controls {
    let mut input = InputState::new();
    if was_down {
        input.apply_event(mouse(MouseButtonState::Pressed));
    }
    input.end_frame();
    let state = if down {
        MouseButtonState::Pressed
    } else {
        MouseButtonState::Released
    };
    input.apply_event(mouse(state));

    let mut controls = Controls::default();
    controls.update(&input, world, Vec2::zero());
    controls
}

pub(crate) fn test_texture(id: u32, width: u32, height: u32) -> Texture {
    Texture {
        id: TextureId(id),
        width,
        height,
    }
}

/// A 3200x3200 map without a target resolution and one tilter at the map centre.
pub(crate) fn test_settings() -> Settings {
    let mut s = Settings::default();
    s.target.enabled = false;
    s.level.columns = 50;
    s.level.rows = 50;
    s.level.tile_size = 64.0;
    s.level.tilters = vec![TilterSettings {
        base_rect: [1584.0, 1640.0, 32.0, 32.0],
        pivot: [1600.0, 1600.0],
        angle: 0.0,
        ..TilterSettings::default()
    }];
    s
}

/// Platform driven entirely by the test.
#[derive(Debug)]
pub(crate) struct MockPlatform {
    size: (u32, u32),
    queued: VecDeque<InputEvent>,
    pending_resize: Option<(u32, u32)>,
    fullscreen: bool,
    toggles: usize,
    polls: usize,
    fail_poll: bool,
    close: bool,
}

impl MockPlatform {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            queued: VecDeque::new(),
            pending_resize: None,
            fullscreen: false,
            toggles: 0,
            polls: 0,
            fail_poll: false,
            close: false,
        }
    }

    /// Queues an event for the next poll.
    pub(crate) fn push(&mut self, event: InputEvent) {
        self.queued.push_back(event);
    }

    pub(crate) fn press(&mut self, key: Key) {
        self.push(key_down(key));
    }

    pub(crate) fn release(&mut self, key: Key) {
        self.push(key_up(key));
    }

    pub(crate) fn move_cursor(&mut self, x: f32, y: f32) {
        self.push(InputEvent::CursorMoved { x, y });
    }

    /// Reports a framebuffer resize on the next poll.
    pub(crate) fn resize_to(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    /// Makes the next poll fail as if the window system's event channel broke.
    pub(crate) fn fail_next_poll(&mut self) {
        self.fail_poll = true;
    }

    pub(crate) fn toggles(&self) -> usize {
        self.toggles
    }

    pub(crate) fn polls(&self) -> usize {
        self.polls
    }
}

impl Platform for MockPlatform {
    fn poll_events(&mut self, input: &mut InputState) -> Result<Polled> {
        self.polls += 1;
        if std::mem::take(&mut self.fail_poll) {
            bail!("event channel disconnected");
        }
        for event in self.queued.drain(..) {
            input.apply_event(event);
        }
        let resized = self.pending_resize.take();
        if let Some(size) = resized {
            self.size = size;
        }
        Ok(Polled { resized })
    }

    fn window_size(&self) -> (u32, u32) {
        self.size
    }

    fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        self.toggles += 1;
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn request_close(&mut self) {
        self.close = true;
    }

    fn should_close(&self) -> bool {
        self.close
    }
}

#[derive(Debug, Default)]
struct Shared {
    in_flight: AtomicBool,
    overlaps: AtomicUsize,
    submitted: AtomicUsize,
    held: Mutex<bool>,
    released: Condvar,
}

/// Blocks submission jobs of a [`RecordingBackend`] until released.
#[derive(Debug, Clone)]
pub(crate) struct Latch {
    shared: Arc<Shared>,
}

impl Latch {
    pub(crate) fn hold(&self) {
        *self.shared.held.lock().unwrap() = true;
    }

    pub(crate) fn release(&self) {
        *self.shared.held.lock().unwrap() = false;
        self.shared.released.notify_all();
    }

    /// Submissions completed so far; readable after the backend is gone.
    pub(crate) fn submitted(&self) -> usize {
        self.shared.submitted.load(Ordering::SeqCst)
    }

    pub(crate) fn overlaps(&self) -> usize {
        self.shared.overlaps.load(Ordering::SeqCst)
    }
}

/// Backend that records everything the loop asks of it.
///
/// Submission jobs only flip shared counters, so they can run on the deferred
/// worker. Any `begin_frame` or `framebuffer_resized` observed while a job is
/// still running counts as an overlap.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    deferred: bool,
    texture_size: (u32, u32),
    next_id: u32,
    loaded: Vec<PathBuf>,
    fonts: Vec<PathBuf>,
    failing: Vec<PathBuf>,
    finish_calls: usize,
    begin_calls: usize,
    skip_frames: usize,
    recording: Option<Vec<Quad>>,
    stray_quads: usize,
    frames: Vec<Vec<Quad>>,
    commits: Vec<(Mat4, f32)>,
    resizes: Vec<(u32, u32)>,
    shared: Arc<Shared>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self {
            deferred: false,
            texture_size: (64, 64),
            next_id: TextureId::BLANK.0,
            loaded: Vec::new(),
            fonts: Vec::new(),
            failing: Vec::new(),
            finish_calls: 0,
            begin_calls: 0,
            skip_frames: 0,
            recording: None,
            stray_quads: 0,
            frames: Vec::new(),
            commits: Vec::new(),
            resizes: Vec::new(),
            shared: Arc::default(),
        }
    }

    pub(crate) fn with_deferred(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    /// Makes loading any texture or font path ending in `name` fail.
    pub(crate) fn fail_load(&mut self, name: &str) {
        self.failing.push(PathBuf::from(name));
    }

    /// Makes the next `count` calls to `begin_frame` report a skipped frame.
    pub(crate) fn skip_next_frames(&mut self, count: usize) {
        self.skip_frames = count;
    }

    pub(crate) fn latch(&self) -> Latch {
        Latch {
            shared: Arc::clone(&self.shared),
        }
    }

    pub(crate) fn loaded(&self) -> &[PathBuf] {
        &self.loaded
    }

    pub(crate) fn fonts(&self) -> &[PathBuf] {
        &self.fonts
    }

    pub(crate) fn finish_calls(&self) -> usize {
        self.finish_calls
    }

    pub(crate) fn begin_calls(&self) -> usize {
        self.begin_calls
    }

    pub(crate) fn frames(&self) -> &[Vec<Quad>] {
        &self.frames
    }

    pub(crate) fn stray_quads(&self) -> usize {
        self.stray_quads
    }

    pub(crate) fn commits(&self) -> &[(Mat4, f32)] {
        &self.commits
    }

    pub(crate) fn resizes(&self) -> &[(u32, u32)] {
        &self.resizes
    }

    pub(crate) fn overlaps(&self) -> usize {
        self.shared.overlaps.load(Ordering::SeqCst)
    }

    pub(crate) fn submitted(&self) -> usize {
        self.shared.submitted.load(Ordering::SeqCst)
    }

    fn fails(&self, path: &Path) -> bool {
        self.failing.iter().any(|name| path.ends_with(name))
    }

    fn check_overlap(&self) {
        if self.shared.in_flight.load(Ordering::SeqCst) {
            self.shared.overlaps.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl QuadSink for RecordingBackend {
    fn record_quad(&mut self, quad: Quad) {
        match &mut self.recording {
            Some(frame) => frame.push(quad),
            None => self.stray_quads += 1,
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn supports_deferred_submission(&self) -> bool {
        self.deferred
    }

    fn load_font(&mut self, path: &Path) -> Result<Font> {
        if self.fails(path) {
            bail!("no such font: {}", path.display());
        }
        self.fonts.push(path.to_path_buf());
        Ok(Font {
            id: FontId(self.fonts.len() as u32 - 1),
            units_per_em: 2048.0,
        })
    }

    fn load_texture(&mut self, path: &Path) -> Result<Texture> {
        if self.fails(path) {
            bail!("no such texture: {}", path.display());
        }
        self.next_id += 1;
        self.loaded.push(path.to_path_buf());
        let (w, h) = self.texture_size;
        Ok(test_texture(self.next_id, w, h))
    }

    fn finish_resource_load(&mut self) -> Result<()> {
        self.finish_calls += 1;
        Ok(())
    }

    fn commit_view(&mut self, view: Mat4, scale: f32) {
        self.commits.push((view, scale));
    }

    fn framebuffer_resized(&mut self, width: u32, height: u32) -> Result<()> {
        self.check_overlap();
        self.resizes.push((width, height));
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<FrameStatus> {
        self.begin_calls += 1;
        self.check_overlap();
        if self.skip_frames > 0 {
            self.skip_frames -= 1;
            return Ok(FrameStatus::Skipped);
        }
        self.recording = Some(Vec::new());
        Ok(FrameStatus::Ready)
    }

    fn end_frame(&mut self) -> Result<SubmitJob> {
        let Some(frame) = self.recording.take() else {
            bail!("end_frame without begin_frame");
        };
        self.frames.push(frame);

        self.shared.in_flight.store(true, Ordering::SeqCst);
        let shared = Arc::clone(&self.shared);
        Ok(Box::new(move || {
            let mut held = shared.held.lock().unwrap();
            while *held {
                held = shared.released.wait(held).unwrap();
            }
            drop(held);
            shared.submitted.fetch_add(1, Ordering::SeqCst);
            shared.in_flight.store(false, Ordering::SeqCst);
            Ok(())
        }))
    }
}
