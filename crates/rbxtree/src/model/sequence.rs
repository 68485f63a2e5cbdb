//! Keypoint sequences.
//!
//! A sequence has at least two keypoints ordered by non-decreasing time,
//! starting at time 0 and ending at time 1 (within [`EPSILON`]). Sequences
//! that break these rules are rejected when constructed; they are never
//! clamped or reordered.

use std::fmt;

use crate::error::ValueError;
use crate::limits::MAX_KEYPOINTS;
use crate::model::Color3;

/// Tolerance for the endpoint times of a sequence.
pub const EPSILON: f32 = 1e-4;

/// One keypoint of a [`NumberSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumberSequenceKeypoint {
    pub time: f32,
    pub value: f32,
    pub envelope: f32,
}

impl NumberSequenceKeypoint {
    pub const fn new(time: f32, value: f32, envelope: f32) -> Self {
        Self { time, value, envelope }
    }
}

impl fmt::Display for NumberSequenceKeypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.time, self.value, self.envelope)
    }
}

/// One keypoint of a [`ColorSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorSequenceKeypoint {
    pub time: f32,
    pub value: Color3,
    pub envelope: f32,
}

impl ColorSequenceKeypoint {
    pub const fn new(time: f32, value: Color3, envelope: f32) -> Self {
        Self { time, value, envelope }
    }
}

impl fmt::Display for ColorSequenceKeypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.time, self.value, self.envelope)
    }
}

trait Timed {
    fn time(&self) -> f32;
}

impl Timed for NumberSequenceKeypoint {
    fn time(&self) -> f32 {
        self.time
    }
}

impl Timed for ColorSequenceKeypoint {
    fn time(&self) -> f32 {
        self.time
    }
}

fn validate<K: Timed>(kind: &'static str, keypoints: &[K]) -> Result<(), ValueError> {
    let invalid = |reason| Err(ValueError::Validation { kind, reason });

    let (first, last) = match keypoints {
        [first, .., last] => (first.time(), last.time()),
        _ => return invalid("requires at least 2 keypoints"),
    };
    if keypoints.len() > MAX_KEYPOINTS {
        return invalid("too many keypoints");
    }
    // Negated comparisons so that NaN times are rejected too.
    if !(first.abs() <= EPSILON) {
        return invalid("time must start at 0.0");
    }
    if !((last - 1.0).abs() <= EPSILON) {
        return invalid("time must end at 1.0");
    }
    for pair in keypoints.windows(2) {
        if !(pair[1].time() >= pair[0].time()) {
            return invalid("keypoints must be ordered by ascending time");
        }
    }
    Ok(())
}

fn write_keypoints<K: fmt::Display>(f: &mut fmt::Formatter<'_>, keypoints: &[K]) -> fmt::Result {
    for (i, k) in keypoints.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{k}")?;
    }
    Ok(())
}

/// Piecewise-linear curve of numbers over time `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberSequence {
    keypoints: Vec<NumberSequenceKeypoint>,
}

impl NumberSequence {
    /// Creates a sequence, validating the keypoint invariants.
    pub fn new(keypoints: Vec<NumberSequenceKeypoint>) -> Result<Self, ValueError> {
        validate("NumberSequence", &keypoints)?;
        Ok(Self { keypoints })
    }

    /// Constant sequence holding `value` over the whole range.
    pub fn constant(value: f32) -> Self {
        Self::between(value, value)
    }

    /// Linear sequence from `start` at time 0 to `end` at time 1.
    pub fn between(start: f32, end: f32) -> Self {
        Self {
            keypoints: vec![
                NumberSequenceKeypoint::new(0.0, start, 0.0),
                NumberSequenceKeypoint::new(1.0, end, 0.0),
            ],
        }
    }

    pub fn keypoints(&self) -> &[NumberSequenceKeypoint] {
        &self.keypoints
    }

    pub fn into_keypoints(self) -> Vec<NumberSequenceKeypoint> {
        self.keypoints
    }
}

impl fmt::Display for NumberSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_keypoints(f, &self.keypoints)
    }
}

/// Piecewise-linear curve of colors over time `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSequence {
    keypoints: Vec<ColorSequenceKeypoint>,
}

impl ColorSequence {
    /// Creates a sequence, validating the keypoint invariants.
    pub fn new(keypoints: Vec<ColorSequenceKeypoint>) -> Result<Self, ValueError> {
        validate("ColorSequence", &keypoints)?;
        Ok(Self { keypoints })
    }

    pub fn constant(value: Color3) -> Self {
        Self::between(value, value)
    }

    pub fn between(start: Color3, end: Color3) -> Self {
        Self {
            keypoints: vec![
                ColorSequenceKeypoint::new(0.0, start, 0.0),
                ColorSequenceKeypoint::new(1.0, end, 0.0),
            ],
        }
    }

    pub fn keypoints(&self) -> &[ColorSequenceKeypoint] {
        &self.keypoints
    }

    pub fn into_keypoints(self) -> Vec<ColorSequenceKeypoint> {
        self.keypoints
    }
}

impl fmt::Display for ColorSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_keypoints(f, &self.keypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(time: f32, value: f32) -> NumberSequenceKeypoint {
        NumberSequenceKeypoint::new(time, value, 0.0)
    }

    #[test]
    fn test_valid_sequence() {
        let seq = NumberSequence::new(vec![kp(0.0, 5.0), kp(0.5, 2.0), kp(1.0, 5.0)]).unwrap();
        assert_eq!(seq.keypoints().len(), 3);
        assert_eq!(seq.to_string(), "0, 5, 0; 0.5, 2, 0; 1, 5, 0");
    }

    #[test]
    fn test_sequence_must_start_at_zero() {
        let result = NumberSequence::new(vec![kp(0.1, 5.0), kp(1.0, 2.0)]);
        assert!(matches!(
            result,
            Err(ValueError::Validation { reason: "time must start at 0.0", .. })
        ));
    }

    #[test]
    fn test_sequence_must_end_at_one() {
        let result = NumberSequence::new(vec![kp(0.0, 5.0), kp(0.9, 2.0)]);
        assert!(matches!(
            result,
            Err(ValueError::Validation { reason: "time must end at 1.0", .. })
        ));
    }

    #[test]
    fn test_sequence_endpoint_epsilon() {
        assert!(NumberSequence::new(vec![kp(0.00005, 1.0), kp(0.99995, 2.0)]).is_ok());
        assert!(NumberSequence::new(vec![kp(0.0005, 1.0), kp(1.0, 2.0)]).is_err());
    }

    #[test]
    fn test_sequence_rejects_unordered() {
        let result = NumberSequence::new(vec![kp(0.0, 1.0), kp(0.7, 1.0), kp(0.3, 1.0), kp(1.0, 1.0)]);
        assert!(matches!(result, Err(ValueError::Validation { .. })));
    }

    #[test]
    fn test_sequence_rejects_single_keypoint() {
        assert!(NumberSequence::new(vec![kp(0.0, 1.0)]).is_err());
        assert!(ColorSequence::new(vec![]).is_err());
    }

    #[test]
    fn test_sequence_rejects_nan_time() {
        assert!(NumberSequence::new(vec![kp(f32::NAN, 1.0), kp(1.0, 1.0)]).is_err());
    }

    #[test]
    fn test_color_sequence_between() {
        let red = Color3::new(1.0, 0.0, 0.0);
        let seq = ColorSequence::between(red, Color3::default());
        assert_eq!(seq.keypoints()[0].value, red);
        assert!(ColorSequence::new(seq.clone().into_keypoints()).is_ok());
    }
}
