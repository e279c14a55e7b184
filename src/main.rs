use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use anyhow::Result;
use crossbeam_channel::{RecvTimeoutError, bounded};

use skywrite::{
    config::AppConfig,
    pipeline::{DrawState, start_body_worker, start_compositor_worker},
    sensor::{MapToImage, PinholeMapper, SyntheticSensorOptions, start_synthetic_sensor},
    snapshot,
    speech::{glyph, glyph::GlyphState, start_speech_worker, translate::HttpTranslator},
    types::Utterance,
};

const DEMO_DURATION: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    env_logger::init();

    let config_path =
        std::env::var("SKYWRITE_CONFIG").unwrap_or_else(|_| "skywrite.toml".to_string());
    let config = AppConfig::load_or_default(Path::new(&config_path))?;

    let (body_tx, body_rx) = bounded(4);
    let (color_tx, color_rx) = bounded(1);
    let (presented_tx, presented_rx) = bounded(1);
    let (utterance_tx, utterance_rx) = bounded(8);

    let opts = SyntheticSensorOptions::default();
    let mapper: Arc<dyn MapToImage> = Arc::new(PinholeMapper::for_image(opts.width, opts.height));
    let state = Arc::new(Mutex::new(DrawState::new()));
    let glyphs = Arc::new(Mutex::new(GlyphState::new(Duration::from_secs(
        config.glyph.display_secs,
    ))));

    let font = if config.glyph.font_path.is_empty() {
        None
    } else {
        match glyph::load_font(Path::new(&config.glyph.font_path)) {
            Ok(font) => Some(Arc::new(font)),
            Err(err) => {
                log::warn!("glyphs will be text-only: {err:#}");
                None
            }
        }
    };

    let translator = Arc::new(HttpTranslator::new(config.translator.clone())?);

    let sensor = start_synthetic_sensor(opts, body_tx, color_tx)?;
    let body_worker = start_body_worker(
        body_rx,
        state.clone(),
        mapper,
        config.gesture.extend_threshold,
    );
    let compositor_worker =
        start_compositor_worker(color_rx, state.clone(), glyphs.clone(), presented_tx);
    let speech_worker = start_speech_worker(
        utterance_rx,
        translator,
        glyphs,
        config.speech.clone(),
        font,
        config.glyph.size_px,
    );

    if config.translator.subscription_key.is_empty() {
        log::info!("no translator subscription key configured, skipping the speech demo");
    } else {
        let _ = utterance_tx.send(Utterance {
            text: format!("{} hello", config.speech.trigger_word),
            confidence: 0.8,
        });
    }

    let deadline = Instant::now() + DEMO_DURATION;
    let mut latest = None;
    while Instant::now() < deadline {
        match presented_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(frame) => latest = Some(frame),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let Some(frame) = latest {
        let path = snapshot::save_canvas(&frame.canvas, Path::new(&config.snapshot.dir))?;
        log::info!("snapshot written to {}", path.display());
        let state = state.lock().unwrap();
        log::info!(
            "run finished with {} sealed strokes",
            state.strokes.sealed().len()
        );
    } else {
        log::warn!("no composited frame arrived before shutdown");
    }

    // Best-effort shutdown: stop the sensor, let the workers drain, stop the
    // speech thread. In-flight translation work finishes on its own.
    sensor.stop();
    drop(utterance_tx);
    speech_worker.stop();
    let _ = body_worker.join();
    let _ = compositor_worker.join();

    Ok(())
}
