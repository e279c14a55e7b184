use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use skywrite::{
    pipeline::{DrawState, compositor},
    sensor::{PinholeMapper, scripted_body_frame},
    speech::{
        glyph::GlyphState,
        handle_utterance,
        translate::{Translate, TranslateError},
    },
    types::{
        BodyFrame, CameraPoint, Canvas, HandSide, JointKind, Skeleton, SkeletonJoint, Utterance,
    },
};

struct HelloTranslator;

impl Translate for HelloTranslator {
    fn translate(&self, text: &str) -> Result<Option<String>, TranslateError> {
        assert_eq!(text, "hello");
        Ok(Some("你好。".to_string()))
    }
}

fn hand_frame(person: u64, tip_depth: f32, x: f32) -> BodyFrame {
    let joints = vec![
        SkeletonJoint {
            kind: JointKind::ShoulderRight,
            position: CameraPoint::new(0.2, 0.3, 2.0),
            tracked: true,
        },
        SkeletonJoint {
            kind: JointKind::HandRight,
            position: CameraPoint::new(x, 0.0, tip_depth + 0.05),
            tracked: true,
        },
        SkeletonJoint {
            kind: JointKind::HandTipRight,
            position: CameraPoint::new(x, 0.0, tip_depth),
            tracked: true,
        },
    ];
    BodyFrame {
        skeletons: vec![Skeleton {
            person,
            tracked: true,
            joints,
        }],
        timestamp: Instant::now(),
    }
}

fn empty_frame() -> BodyFrame {
    BodyFrame {
        skeletons: Vec::new(),
        timestamp: Instant::now(),
    }
}

#[test]
fn extended_ticks_become_sealed_strokes_on_the_canvas() {
    let mapper = PinholeMapper::for_image(64, 64);
    let mut state = DrawState::new();

    // Five extended ticks: exactly one sealed stroke of five points, and an
    // empty follow-up stroke still accumulating.
    for i in 0..5 {
        let frame = hand_frame(1, 1.5, 0.02 * i as f32);
        state.apply_body_frame(&frame, &mapper, 0.4);
    }
    assert_eq!(state.strokes.sealed().len(), 1);
    assert_eq!(state.strokes.sealed()[0].points.len(), 5);
    assert_eq!(
        state
            .strokes
            .in_progress_for(1, HandSide::Right)
            .unwrap()
            .points
            .len(),
        0
    );

    let mut canvas = Canvas {
        rgba: vec![0u8; 64 * 64 * 4],
        width: 64,
        height: 64,
    };
    compositor::composite(&mut canvas, &state.strokes, &state.joints, None);
    assert!(canvas.rgba.iter().any(|&b| b != 0));
}

#[test]
fn retraction_seals_short_strokes() {
    let mapper = PinholeMapper::for_image(64, 64);
    let mut state = DrawState::new();

    for i in 0..3 {
        state.apply_body_frame(&hand_frame(1, 1.5, 0.02 * i as f32), &mapper, 0.4);
    }
    // Hand pulls back under the threshold.
    state.apply_body_frame(&hand_frame(1, 1.9, 0.1), &mapper, 0.4);

    assert_eq!(state.strokes.sealed().len(), 1);
    assert_eq!(state.strokes.sealed()[0].points.len(), 3);
    assert!(state.strokes.in_progress_for(1, HandSide::Right).is_none());
}

#[test]
fn tracking_loss_discards_the_partial_stroke() {
    let mapper = PinholeMapper::for_image(64, 64);
    let mut state = DrawState::new();

    for i in 0..4 {
        state.apply_body_frame(&hand_frame(1, 1.5, 0.02 * i as f32), &mapper, 0.4);
    }
    state.apply_body_frame(&empty_frame(), &mapper, 0.4);

    assert!(state.strokes.sealed().is_empty());
    assert!(state.strokes.in_progress_for(1, HandSide::Right).is_none());
    assert!(state.joints.joint(1, JointKind::HandTipRight).is_none());
}

#[test]
fn scripted_sensor_frames_drive_the_same_machine() {
    let mapper = PinholeMapper::for_image(640, 480);
    let mut state = DrawState::new();

    let now = Instant::now();
    for tick in 0..90 {
        state.apply_body_frame(&scripted_body_frame(1, tick, now), &mapper, 0.4);
    }

    // 60 extended ticks seal 12 full strokes at the 5-point cap; the
    // retracted tail leaves nothing in progress.
    assert_eq!(state.strokes.sealed().len(), 12);
    assert!(
        state
            .strokes
            .sealed()
            .iter()
            .all(|s| s.points.len() == 5)
    );
    assert!(state.strokes.in_progress_for(1, HandSide::Right).is_none());
}

#[test]
fn spoken_phrase_ends_as_a_two_char_glyph() {
    let glyphs = Mutex::new(GlyphState::new(Duration::from_secs(5)));
    let utterance = Utterance {
        text: "translate hello".to_string(),
        confidence: 0.8,
    };

    handle_utterance(
        &utterance,
        &skywrite::config::SpeechConfig::default(),
        &HelloTranslator,
        &glyphs,
        None,
        64.0,
    );

    let mut state = glyphs.lock().unwrap();
    let glyph = state.current().expect("glyph should be pending");
    assert_eq!(glyph.text, "好");
    assert!(glyph.shown_at.elapsed() < Duration::from_secs(1));
}
