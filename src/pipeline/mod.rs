pub mod compositor;
pub mod frame_buffer;
pub mod gesture;
pub mod joints;
pub mod strokes;

use std::{
    sync::{Arc, Mutex},
    thread,
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    sensor::MapToImage,
    speech::glyph::GlyphState,
    types::{BodyFrame, ColorFrame, CompositedFrame, HandSide, JointKind},
};

pub use self::{joints::JointTracker, strokes::StrokeAccumulator};

/// Joint and stroke state shared between the body and color channels. Guarded
/// by one mutex, taken briefly per frame and never held across a frame wait.
pub struct DrawState {
    pub joints: JointTracker,
    pub strokes: StrokeAccumulator,
}

impl Default for DrawState {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawState {
    pub fn new() -> Self {
        Self {
            joints: JointTracker::new(),
            strokes: StrokeAccumulator::new(),
        }
    }

    /// One body tick: refresh the joint table, purge state for vanished
    /// persons, then advance every tracked hand's stroke machine.
    pub fn apply_body_frame(
        &mut self,
        frame: &BodyFrame,
        mapper: &dyn MapToImage,
        extend_threshold: f32,
    ) {
        let vanished = self.joints.update(frame, mapper);
        for person in vanished {
            log::debug!("person {person} lost, purging stroke state");
            self.strokes.purge(person);
        }

        for person in self.joints.persons() {
            for side in HandSide::BOTH {
                let tip = self.joints.joint(person, JointKind::hand_tip(side));
                let shoulder = self.joints.joint(person, JointKind::shoulder(side));
                let (Some(tip), Some(shoulder)) = (tip, shoulder) else {
                    continue;
                };

                let extended = gesture::hand_extended(tip, shoulder, extend_threshold);
                self.strokes.tick(person, side, extended, tip.image);
            }
        }
    }
}

/// Consume body frames and fold them into the shared draw state.
pub fn start_body_worker(
    body_rx: Receiver<BodyFrame>,
    state: Arc<Mutex<DrawState>>,
    mapper: Arc<dyn MapToImage>,
    extend_threshold: f32,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(frame) = body_rx.recv() {
            let mut state = state.lock().unwrap();
            state.apply_body_frame(&frame, mapper.as_ref(), extend_threshold);
        }
        log::info!("body channel closed, body worker exiting");
    })
}

/// Consume color frames, overlay the current stroke and glyph state, and
/// hand the result to the presentation channel. Frames are dropped when the
/// presenter is behind.
pub fn start_compositor_worker(
    color_rx: Receiver<ColorFrame>,
    state: Arc<Mutex<DrawState>>,
    glyphs: Arc<Mutex<GlyphState>>,
    presented_tx: Sender<CompositedFrame>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Some(frame) = recv_latest_frame(&color_rx) {
            let mut canvas = match frame_buffer::to_canvas(&frame) {
                Ok(canvas) => canvas,
                Err(err) => {
                    log::warn!("failed to convert color frame: {err:?}");
                    continue;
                }
            };

            {
                let state = state.lock().unwrap();
                let mut glyphs = glyphs.lock().unwrap();
                let image = glyphs.current().and_then(|g| g.image.as_ref());
                compositor::composite(&mut canvas, &state.strokes, &state.joints, image);
            }

            let _ = presented_tx.try_send(CompositedFrame {
                canvas,
                timestamp: frame.timestamp,
            });
        }
        log::info!("color channel closed, compositor worker exiting");
    })
}

fn recv_latest_frame(color_rx: &Receiver<ColorFrame>) -> Option<ColorFrame> {
    let mut frame = color_rx.recv().ok()?;
    while let Ok(newer) = color_rx.try_recv() {
        frame = newer;
    }
    Some(frame)
}
