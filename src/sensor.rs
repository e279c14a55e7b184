use std::{
    f32::consts::TAU,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use crossbeam_channel::Sender;

use crate::types::{
    BodyFrame, CameraPoint, ColorFormat, ColorFrame, ImagePoint, JointKind, PersonId, Skeleton,
    SkeletonJoint,
};

/// Camera-space to color-image coordinate mapping, normally provided by the
/// sensor SDK.
pub trait MapToImage: Send + Sync {
    fn map_to_image(&self, point: CameraPoint) -> ImagePoint;
}

/// Pinhole projection standing in for a hardware mapper.
pub struct PinholeMapper {
    pub focal: f32,
    pub center_x: f32,
    pub center_y: f32,
}

impl PinholeMapper {
    pub fn for_image(width: u32, height: u32) -> Self {
        Self {
            focal: width as f32 * 0.9,
            center_x: width as f32 / 2.0,
            center_y: height as f32 / 2.0,
        }
    }
}

impl MapToImage for PinholeMapper {
    fn map_to_image(&self, point: CameraPoint) -> ImagePoint {
        // Clamp depth so points at or behind the sensor plane stay finite.
        let z = point.z.max(0.1);
        ImagePoint::new(
            self.center_x + point.x * self.focal / z,
            self.center_y - point.y * self.focal / z,
        )
    }
}

#[derive(Debug)]
pub struct SensorStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SensorStream {
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SensorStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SyntheticSensorOptions {
    pub width: u32,
    pub height: u32,
    pub fps: u64,
    pub person: PersonId,
}

impl Default for SyntheticSensorOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            person: 1,
        }
    }
}

// One scripted revolution of the drawing arm, in ticks. The hand stays
// extended for the first two thirds and retracts for the rest, so strokes
// both cap-seal and retract-seal during a run.
const REVOLUTION_TICKS: u64 = 90;
const EXTENDED_TICKS: u64 = 60;

const SHOULDER_DEPTH: f32 = 2.0;
const EXTENDED_DEPTH: f32 = 1.5;
const RETRACTED_DEPTH: f32 = 1.9;

/// Push scripted body and color frames the way a sensor SDK pushes real
/// ones: one capture thread, both channels, frames dropped when a consumer
/// is behind.
pub fn start_synthetic_sensor(
    opts: SyntheticSensorOptions,
    body_tx: Sender<BodyFrame>,
    color_tx: Sender<ColorFrame>,
) -> Result<SensorStream> {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        let interval = Duration::from_millis(1_000 / opts.fps.max(1));
        let mut tick = 0u64;

        log::info!(
            "synthetic sensor running: {}x{} at {} fps",
            opts.width,
            opts.height,
            opts.fps
        );

        while !stop_flag.load(Ordering::Relaxed) {
            let timestamp = Instant::now();
            let _ = body_tx.try_send(scripted_body_frame(opts.person, tick, timestamp));
            let _ = color_tx.try_send(scripted_color_frame(opts.width, opts.height, timestamp));
            tick += 1;
            thread::sleep(interval);
        }

        log::info!("synthetic sensor stopped after {tick} ticks");
    });

    Ok(SensorStream {
        stop,
        handle: Some(handle),
    })
}

/// One scripted skeleton: the right arm sweeps a circle in front of the
/// torso, extending toward the sensor on the drawing part of the arc.
pub fn scripted_body_frame(person: PersonId, tick: u64, timestamp: Instant) -> BodyFrame {
    let phase = (tick % REVOLUTION_TICKS) as f32 / REVOLUTION_TICKS as f32;
    let extended = tick % REVOLUTION_TICKS < EXTENDED_TICKS;

    let angle = phase * TAU;
    let hand_x = 0.2 + 0.25 * angle.cos();
    let hand_y = 0.3 + 0.25 * angle.sin();
    let hand_z = if extended {
        EXTENDED_DEPTH
    } else {
        RETRACTED_DEPTH
    };

    let joints = vec![
        SkeletonJoint {
            kind: JointKind::ShoulderRight,
            position: CameraPoint::new(0.2, 0.3, SHOULDER_DEPTH),
            tracked: true,
        },
        SkeletonJoint {
            kind: JointKind::HandRight,
            position: CameraPoint::new(hand_x, hand_y, hand_z + 0.05),
            tracked: true,
        },
        SkeletonJoint {
            kind: JointKind::HandTipRight,
            position: CameraPoint::new(hand_x, hand_y, hand_z),
            tracked: true,
        },
        SkeletonJoint {
            kind: JointKind::ShoulderLeft,
            position: CameraPoint::new(-0.2, 0.3, SHOULDER_DEPTH),
            tracked: true,
        },
        SkeletonJoint {
            kind: JointKind::HandLeft,
            position: CameraPoint::new(-0.3, -0.1, SHOULDER_DEPTH),
            tracked: true,
        },
        SkeletonJoint {
            kind: JointKind::HandTipLeft,
            position: CameraPoint::new(-0.3, -0.1, SHOULDER_DEPTH),
            tracked: true,
        },
    ];

    BodyFrame {
        skeletons: vec![Skeleton {
            person,
            tracked: true,
            joints,
        }],
        timestamp,
    }
}

fn scripted_color_frame(width: u32, height: u32, timestamp: Instant) -> ColorFrame {
    // Vertical gradient in BGRA, exercising the swizzle in the adapter.
    let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for y in 0..height {
        let shade = (y * 160 / height.max(1)) as u8 + 16;
        for _ in 0..width {
            data.extend_from_slice(&[shade, shade / 2, 24, 255]);
        }
    }

    ColorFrame {
        data,
        format: ColorFormat::Bgra,
        width,
        height,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinhole_maps_center_of_view_to_image_center() {
        let mapper = PinholeMapper::for_image(640, 480);
        let mapped = mapper.map_to_image(CameraPoint::new(0.0, 0.0, 2.0));
        assert_eq!(mapped.x, 320.0);
        assert_eq!(mapped.y, 240.0);
    }

    #[test]
    fn pinhole_inverts_y_and_scales_with_depth() {
        let mapper = PinholeMapper::for_image(640, 480);
        let near = mapper.map_to_image(CameraPoint::new(0.1, 0.1, 1.0));
        let far = mapper.map_to_image(CameraPoint::new(0.1, 0.1, 2.0));
        assert!(near.y < 240.0);
        assert!((near.x - 320.0) > (far.x - 320.0));
    }

    #[test]
    fn scripted_frames_alternate_extension() {
        let now = Instant::now();
        let early = scripted_body_frame(1, 0, now);
        let late = scripted_body_frame(1, EXTENDED_TICKS, now);

        let tip_z = |frame: &BodyFrame| {
            frame.skeletons[0]
                .joint(JointKind::HandTipRight)
                .unwrap()
                .position
                .z
        };
        assert_eq!(tip_z(&early), EXTENDED_DEPTH);
        assert_eq!(tip_z(&late), RETRACTED_DEPTH);
    }
}
