use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::heuristics::{assess_voice_urgency, VoiceUrgencyConfig};
use crate::io::read_recognition_file;
use crate::models::{AudioRef, VoiceIntakeResult};

use super::BlockingStage;

/// Analyze one recording: read its recognition output and score urgency
/// from the acoustic features.
pub fn analyze_recording(audio: &AudioRef, config: &VoiceUrgencyConfig) -> Result<VoiceIntakeResult> {
    let recognition = read_recognition_file(audio.path())
        .with_context(|| format!("Voice intake failed for {}", audio))?;

    let assessment = assess_voice_urgency(&recognition.features, config);
    debug!(
        "Voice features for {}: pitch_std {:.1} Hz, rate {:.3}, energy_std {:.3}",
        audio,
        recognition.features.pitch_std_hz,
        recognition.features.speech_rate,
        recognition.features.energy_std
    );

    let result = VoiceIntakeResult::new(
        recognition.transcript,
        recognition.confidence,
        assessment.level,
        assessment.score,
        assessment.emotions,
        recognition.features.duration_seconds,
    );

    info!(
        "Voice intake: {} urgency (score {:.2}), {:.1}s",
        result.urgency_level, result.urgency_score, result.duration_seconds
    );

    Ok(result)
}

/// Voice Intake stage backed by recognition files
pub fn voice_intake_stage(config: VoiceUrgencyConfig) -> BlockingStage<AudioRef, VoiceIntakeResult> {
    BlockingStage::new(move |audio: AudioRef| analyze_recording(&audio, &config))
}
