use glint_engine::coords::Rect;
use glint_engine::render::QuadSink;
use glint_engine::time::FrameTimer;

use crate::controls::Controls;

/// Something the loop updates once per frame and may draw.
pub trait Element {
    /// `view` is the world-space rect currently visible.
    fn update(&mut self, view: Rect, controls: &Controls, timer: &FrameTimer);

    fn draw(&self, sink: &mut dyn QuadSink);
}
