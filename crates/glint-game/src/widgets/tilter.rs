//! Draggable mirror rotation control.
//!
//! A tilter is a base sprite (the handle the player grabs) plus a mirror
//! sprite centred on a fixed pivot. Dragging the handle rotates the mirror.
//! The drag is relative: each frame's pointer motion is projected onto the
//! tilter's initial direction and scaled down, so sensitivity does not depend
//! on where the pointer is relative to the pivot.

use std::cell::Cell;

use glint_engine::coords::{Rect, Vec2};
use glint_engine::paint::Color;
use glint_engine::render::{Quad, QuadSink, Texture, model_matrix};
use glint_engine::time::FrameTimer;

use crate::controls::Controls;
use crate::scene::{Element, Sprite};

/// Degrees of rotation per world unit of projected pointer motion.
pub const DRAG_DAMPING: f32 = 0.2;

const BASE_DEPTH: f32 = 2.0;
const MIRROR_DEPTH: f32 = 1.0;
const MARKER_DEPTH: f32 = 5.0;
const MARKER_SIZE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilterState {
    Idle,
    Hovered,
    Dragging,
}

#[derive(Debug, Clone)]
pub struct Tilter {
    base: Sprite,
    mirror: Sprite,
    pivot: Vec2,
    /// Degrees.
    angle: f32,
    initial_dir: Vec2,
    state: TilterState,
    last_pointer: Vec2,
    changed: bool,
    mirror_points: Cell<Option<(Vec2, Vec2)>>,
    show_mirror_points: bool,
}

impl Tilter {
    /// `base_uv` selects the handle's frame inside `base`. The mirror keeps its
    /// texture's size and is centred on `pivot`.
    pub fn new(
        base: Texture,
        base_rect: Rect,
        base_uv: Rect,
        mirror: Texture,
        pivot: Vec2,
        angle: f32,
    ) -> Self {
        Self {
            base: Sprite::new(base, base_rect)
                .with_uv(base_uv)
                .with_depth(BASE_DEPTH),
            mirror: Sprite::new(mirror, Rect::from_center(pivot, mirror.size()))
                .with_rotation(angle)
                .with_depth(MIRROR_DEPTH),
            pivot,
            angle,
            initial_dir: Vec2::from_angle_degrees(angle),
            state: TilterState::Idle,
            last_pointer: Vec2::zero(),
            changed: false,
            mirror_points: Cell::new(None),
            show_mirror_points: false,
        }
    }

    /// Also draws small markers at both mirror end points.
    pub fn with_mirror_point_markers(mut self, show: bool) -> Self {
        self.show_mirror_points = show;
        self
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn state(&self) -> TilterState {
        self.state
    }

    pub fn base(&self) -> &Sprite {
        &self.base
    }

    pub fn mirror(&self) -> &Sprite {
        &self.mirror
    }

    /// Reports whether the angle changed since the last call, and clears the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Both ends of the mirror segment.
    ///
    /// Computed lazily and cached until the angle changes.
    pub fn mirror_points(&self) -> (Vec2, Vec2) {
        if let Some(points) = self.mirror_points.get() {
            return points;
        }
        let half = Vec2::from_angle_degrees(self.angle) * (self.mirror.texture().width as f32 * 0.5);
        let points = (self.pivot + half, self.pivot - half);
        self.mirror_points.set(Some(points));
        points
    }

    pub(crate) fn has_cached_mirror_points(&self) -> bool {
        self.mirror_points.get().is_some()
    }

    fn rotate_by(&mut self, degrees: f32) {
        self.angle += degrees;
        self.changed = true;
        self.mirror_points.set(None);
        self.mirror.set_rotation(self.angle);
    }

    fn marker(center: Vec2) -> Quad {
        Quad {
            texture: Texture::BLANK.id,
            model: model_matrix(
                Rect::from_center(center, Vec2::new(MARKER_SIZE, MARKER_SIZE)),
                0.0,
                MARKER_DEPTH,
            ),
            uv: Rect::unit(),
            tint: Color::WHITE,
        }
    }
}

impl Element for Tilter {
    fn update(&mut self, view: Rect, controls: &Controls, _timer: &FrameTimer) {
        let pointer = controls.pointer();
        let down = controls.pointer_down();
        let over = self.base.rect().contains(pointer);

        let mut tint = Color::WHITE;

        if self.state != TilterState::Dragging {
            self.state = if over && !down {
                tint = Color::HOVER_GRAY;
                TilterState::Hovered
            } else if over && controls.pointer_pressed() {
                self.last_pointer = pointer;
                TilterState::Dragging
            } else {
                TilterState::Idle
            };
        }

        if self.state == TilterState::Dragging {
            if !down {
                self.state = TilterState::Idle;
            } else {
                tint = Color::DRAG_YELLOW;
                let movement = (self.last_pointer - pointer).dot(self.initial_dir);
                if movement != 0.0 {
                    self.rotate_by(movement * DRAG_DAMPING);
                }
                self.last_pointer = pointer;
            }
        }

        self.base.set_tint(tint);
        self.mirror.update(view);
        self.base.update(view);
    }

    fn draw(&self, sink: &mut dyn QuadSink) {
        if self.show_mirror_points {
            let (a, b) = self.mirror_points();
            sink.record_quad(Self::marker(a));
            sink.record_quad(Self::marker(b));
        }
        self.mirror.draw(sink);
        self.base.draw(sink);
    }
}
