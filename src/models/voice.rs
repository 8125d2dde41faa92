use std::fmt;

use serde::{Deserialize, Serialize};

/// Urgency inferred from how the patient sounds, not what they said
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceUrgency {
    Low,
    Medium,
    High,
}

impl VoiceUrgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceUrgency::Low => "low",
            VoiceUrgency::Medium => "medium",
            VoiceUrgency::High => "high",
        }
    }
}

impl fmt::Display for VoiceUrgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotion scores derived from acoustic features, each in 0-1
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionScores {
    pub stress: f64,
    pub pain: f64,
    pub anxiety: f64,
    pub calm: f64,
}

impl EmotionScores {
    /// Clamp every score into 0-1
    pub fn clamped(self) -> Self {
        Self {
            stress: clamp_unit(self.stress),
            pain: clamp_unit(self.pain),
            anxiety: clamp_unit(self.anxiety),
            calm: clamp_unit(self.calm),
        }
    }
}

/// Acoustic features produced by the external audio front end
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AcousticFeatures {
    /// Standard deviation of the pitch track in Hz
    pub pitch_std_hz: f64,
    /// Mean zero-crossing rate, a proxy for speech rate
    pub speech_rate: f64,
    /// Standard deviation of RMS energy
    pub energy_std: f64,
    /// Length of the recording in seconds
    pub duration_seconds: f64,
}

/// Output of the Voice Intake stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceIntakeResult {
    pub transcript: String,
    /// Transcription confidence (0-1)
    pub confidence: f64,
    pub urgency_level: VoiceUrgency,
    /// Urgency score (0-1)
    pub urgency_score: f64,
    pub emotions: EmotionScores,
    pub duration_seconds: f64,
}

impl VoiceIntakeResult {
    pub fn new(
        transcript: impl Into<String>,
        confidence: f64,
        urgency_level: VoiceUrgency,
        urgency_score: f64,
        emotions: EmotionScores,
        duration_seconds: f64,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            confidence: clamp_unit(confidence),
            urgency_level,
            urgency_score: clamp_unit(urgency_score),
            emotions: emotions.clamped(),
            duration_seconds: duration_seconds.max(0.0),
        }
    }
}

/// Voice context handed to symptom reasoning and triage.
///
/// Only constructible from a voice result; a case without audio uses
/// [`UrgencyContext::empty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrgencyContext {
    pub urgency_level: Option<VoiceUrgency>,
    pub emotions: Option<EmotionScores>,
    pub duration_seconds: Option<f64>,
}

impl UrgencyContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_voice(voice: &VoiceIntakeResult) -> Self {
        Self {
            urgency_level: Some(voice.urgency_level),
            emotions: Some(voice.emotions),
            duration_seconds: Some(voice.duration_seconds),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.urgency_level.is_none() && self.emotions.is_none() && self.duration_seconds.is_none()
    }
}

/// Clamp a score into the unit interval, mapping NaN to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
