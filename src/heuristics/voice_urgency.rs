use crate::models::{AcousticFeatures, EmotionScores, VoiceUrgency};

/// Thresholds for acoustic urgency scoring
#[derive(Debug, Clone)]
pub struct VoiceUrgencyConfig {
    /// Pitch variation (Hz) above which the speaker sounds stressed
    pub stressed_pitch_std_hz: f64,
    /// Speech rate above which the speaker sounds anxious
    pub fast_speech_rate: f64,
    /// Energy variation above which the speaker sounds in pain
    pub distressed_energy_std: f64,
    /// Below both of these the speaker sounds calm
    pub calm_pitch_std_hz: f64,
    pub calm_speech_rate: f64,
    /// Score above which urgency is high
    pub high_threshold: f64,
    /// Score above which urgency is medium
    pub medium_threshold: f64,
}

impl Default for VoiceUrgencyConfig {
    fn default() -> Self {
        Self {
            stressed_pitch_std_hz: 30.0,
            fast_speech_rate: 0.15,
            distressed_energy_std: 0.05,
            calm_pitch_std_hz: 15.0,
            calm_speech_rate: 0.1,
            high_threshold: 0.7,
            medium_threshold: 0.4,
        }
    }
}

/// Urgency derived from acoustic features
#[derive(Debug, Clone, PartialEq)]
pub struct UrgencyAssessment {
    pub level: VoiceUrgency,
    pub score: f64,
    pub emotions: EmotionScores,
}

/// Score urgency from pitch variation, speech rate and energy variation.
///
/// Each cue contributes a fixed amount: stressed pitch 0.3, fast speech 0.3,
/// energy variation 0.2, so the score tops out at 0.8 and "high" needs all three.
pub fn assess_voice_urgency(
    features: &AcousticFeatures,
    config: &VoiceUrgencyConfig,
) -> UrgencyAssessment {
    let mut score: f64 = 0.0;
    let mut emotions = EmotionScores::default();

    if features.pitch_std_hz > config.stressed_pitch_std_hz {
        score += 0.3;
        emotions.stress = (features.pitch_std_hz / 50.0).min(1.0);
    }

    if features.speech_rate > config.fast_speech_rate {
        score += 0.3;
        emotions.anxiety = (features.speech_rate / 0.2).min(1.0);
    }

    if features.energy_std > config.distressed_energy_std {
        score += 0.2;
        emotions.pain = (features.energy_std / 0.1).min(1.0);
    }

    if features.pitch_std_hz < config.calm_pitch_std_hz
        && features.speech_rate < config.calm_speech_rate
    {
        emotions.calm = 0.8;
    }

    let score = score.min(1.0);
    let level = if score > config.high_threshold {
        VoiceUrgency::High
    } else if score > config.medium_threshold {
        VoiceUrgency::Medium
    } else {
        VoiceUrgency::Low
    };

    UrgencyAssessment {
        level,
        score,
        emotions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(pitch: f64, rate: f64, energy: f64) -> AcousticFeatures {
        AcousticFeatures {
            pitch_std_hz: pitch,
            speech_rate: rate,
            energy_std: energy,
            duration_seconds: 30.0,
        }
    }

    #[test]
    fn test_calm_speaker() {
        let result = assess_voice_urgency(&features(10.0, 0.05, 0.01), &VoiceUrgencyConfig::default());
        assert_eq!(result.level, VoiceUrgency::Low);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.emotions.calm, 0.8);
    }

    #[test]
    fn test_distressed_speaker() {
        let result = assess_voice_urgency(&features(60.0, 0.25, 0.2), &VoiceUrgencyConfig::default());
        assert_eq!(result.level, VoiceUrgency::High);
        assert!((result.score - 0.8).abs() < 1e-9);
        assert_eq!(result.emotions.stress, 1.0);
        assert_eq!(result.emotions.anxiety, 1.0);
        assert_eq!(result.emotions.pain, 1.0);
        assert_eq!(result.emotions.calm, 0.0);
    }

    #[test]
    fn test_medium_urgency() {
        let result = assess_voice_urgency(&features(40.0, 0.2, 0.0), &VoiceUrgencyConfig::default());
        assert_eq!(result.level, VoiceUrgency::Medium);
    }
}
