pub mod glyph;
pub mod translate;

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use ab_glyph::FontVec;
use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::{config::SpeechConfig, types::Utterance};

use self::{
    glyph::{GLYPH_COLOR, GlyphState, rasterize_text},
    translate::Translate,
};

/// Trailing punctuation stripped from a translation before display.
const SENTENCE_PUNCTUATION: &[char] = &['。', '．', '.', '！', '!', '？', '?', '，', ','];

/// Characters of the translation kept for the glyph area.
const GLYPH_MAX_CHARS: usize = 2;

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Pull the text to translate out of a recognized utterance: everything after
/// the trigger word, if the utterance contains it (ASCII case-insensitive).
pub fn extract_phrase(text: &str, trigger: &str) -> Option<String> {
    if trigger.is_empty() {
        return None;
    }
    let haystack = text.to_ascii_lowercase();
    let needle = trigger.to_ascii_lowercase();
    let at = haystack.find(&needle)?;
    let rest = text[at + needle.len()..].trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// Keep the last [`GLYPH_MAX_CHARS`] characters of the translation, then
/// strip trailing sentence punctuation, so "你好。" displays as "好". The
/// truncation is the only size safeguard on service output.
pub fn trim_for_glyph(translated: &str) -> String {
    let chars: Vec<char> = translated.trim_end().chars().collect();
    let start = chars.len().saturating_sub(GLYPH_MAX_CHARS);
    let tail: String = chars[start..].iter().collect();
    tail.trim_end_matches(SENTENCE_PUNCTUATION).to_string()
}

/// Run one recognized utterance through the gate → translate → glyph chain.
/// Every failure leaves the previous glyph untouched.
pub fn handle_utterance(
    utterance: &Utterance,
    config: &SpeechConfig,
    translator: &dyn Translate,
    glyphs: &Mutex<GlyphState>,
    font: Option<&FontVec>,
    glyph_px: f32,
) {
    if utterance.confidence < config.min_confidence {
        log::debug!(
            "ignoring low-confidence utterance ({:.2}): {:?}",
            utterance.confidence,
            utterance.text
        );
        return;
    }

    let Some(phrase) = extract_phrase(&utterance.text, &config.trigger_word) else {
        return;
    };

    match translator.translate(&phrase) {
        Ok(Some(translated)) => {
            let text = trim_for_glyph(&translated);
            if text.is_empty() {
                return;
            }
            let image = font.and_then(|f| rasterize_text(f, &text, glyph_px, GLYPH_COLOR));
            log::info!("utterance {:?} -> glyph {:?}", utterance.text, text);
            glyphs.lock().unwrap().set(text, image);
        }
        Ok(None) => {
            log::warn!("translation returned no result for {:?}", phrase);
        }
        Err(err) => {
            log::warn!("translation failed for {:?}: {err}", phrase);
        }
    }
}

pub struct SpeechWorker {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SpeechWorker {
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SpeechWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Blocking translation and rasterization run here, off the frame threads.
/// The stop flag is checked between utterances; in-flight work finishes on
/// its own.
pub fn start_speech_worker(
    utterance_rx: Receiver<Utterance>,
    translator: Arc<dyn Translate>,
    glyphs: Arc<Mutex<GlyphState>>,
    config: SpeechConfig,
    font: Option<Arc<FontVec>>,
    glyph_px: f32,
) -> SpeechWorker {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        while !stop_flag.load(Ordering::Relaxed) {
            let utterance = match utterance_rx.recv_timeout(STOP_POLL_INTERVAL) {
                Ok(utterance) => utterance,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            handle_utterance(
                &utterance,
                &config,
                translator.as_ref(),
                &glyphs,
                font.as_deref(),
                glyph_px,
            );
        }
    });

    SpeechWorker {
        stop,
        handle: Some(handle),
    }
}
