//! Tone sequences for acknowledging user actions, e.g. a profile change with one beep per
//! profile number.

use Semitone::*;

/// Duration of a single confirmation beep (ms).
pub const CONFIRMATION_BEEP_DURATION: u32 = 20;
/// Silence between two confirmation beeps (ms).
pub const CONFIRMATION_BEEP_GAP: u32 = 200;
pub const MAX_CONFIRMATION_BEEPS: usize = 32;

const CONFIRMATION_PITCH: Pitch = Pitch { semitone: C, octave: 6 };

pub type Melody = heapless::Vec<Note, { 2 * MAX_CONFIRMATION_BEEPS }>;

/// Beep sequence for `count` acknowledgment pulses, limited to [`MAX_CONFIRMATION_BEEPS`].
pub fn confirmation_beeps(count: u16) -> Melody {
    let count = (count as usize).min(MAX_CONFIRMATION_BEEPS);
    let mut melody = Melody::new();
    for _ in 0..count {
        // capacity fits two notes per beep
        let _ = melody.push(Note::note(CONFIRMATION_PITCH.semitone, CONFIRMATION_PITCH.octave, CONFIRMATION_BEEP_DURATION));
        let _ = melody.push(Note::pause(CONFIRMATION_BEEP_GAP));
    }
    melody
}

/// Total duration of a melody (ms).
pub fn duration(melody: &[Note]) -> u32 {
    melody.iter().map(|n| n.duration).sum()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub pitch: Option<Pitch>,
    /// ms
    pub duration: u32,
}

impl Note {
    pub const fn note(semitone: Semitone, octave: u8, duration: u32) -> Self {
        Self { pitch: Some(Pitch { semitone, octave }), duration }
    }

    pub const fn pause(duration: u32) -> Self {
        Self { pitch: None, duration }
    }

    pub fn freq(&self) -> Option<f32> {
        self.pitch.as_ref().map(|p| p.freq())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pitch {
    pub semitone: Semitone,
    pub octave: u8,
}

/// 2^(n/12) for n in 0..12
const SEMITONE_RATIOS: [f32; 12] = [
    1.0, 1.059_463_1, 1.122_462, 1.189_207_1, 1.259_921, 1.334_839_9, 1.414_213_6, 1.498_307_1, 1.587_401,
    1.681_792_9, 1.781_797_4, 1.887_748_6,
];

impl Pitch {
    /// Equal temperament frequency, A4 = 440Hz.
    pub fn freq(&self) -> f32 {
        let a_i = 4 * 12 + (Semitone::A as i32);
        let note_i = (self.octave as i32) * 12 + (self.semitone as i32);
        let offset = note_i - a_i;

        let octaves = offset.div_euclid(12);
        let ratio = SEMITONE_RATIOS[offset.rem_euclid(12) as usize];
        let scale = if octaves >= 0 { (1u32 << octaves) as f32 } else { 1.0 / (1u32 << -octaves) as f32 };
        440.0 * ratio * scale
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Semitone {
    C = 0,
    Cs = 1,
    D = 2,
    Ds = 3,
    E = 4,
    F = 5,
    Fs = 6,
    G = 7,
    Gs = 8,
    A = 9,
    As = 10,
    B = 11,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_frequencies() {
        assert_eq!(Pitch { semitone: A, octave: 4 }.freq(), 440.0);
        assert_eq!(Pitch { semitone: A, octave: 5 }.freq(), 880.0);
        assert_eq!(Pitch { semitone: A, octave: 3 }.freq(), 220.0);
        assert!((Pitch { semitone: C, octave: 6 }.freq() - 1046.5).abs() < 0.1);
    }

    #[test]
    fn one_beep_per_pulse() {
        let melody = confirmation_beeps(3);
        assert_eq!(melody.len(), 6);
        assert_eq!(melody.iter().filter(|n| n.pitch.is_some()).count(), 3);
        assert_eq!(duration(&melody), 3 * (CONFIRMATION_BEEP_DURATION + CONFIRMATION_BEEP_GAP));
    }

    #[test]
    fn pulse_count_is_limited() {
        assert_eq!(confirmation_beeps(0).len(), 0);
        assert_eq!(confirmation_beeps(u16::MAX).len(), 2 * MAX_CONFIRMATION_BEEPS);
    }
}
