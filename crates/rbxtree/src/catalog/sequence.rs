//! Keypoint sequences, number ranges and physical properties.

use crate::catalog::{Args, Arity, Dynamic, Reflector};
use crate::error::ValueError;
use crate::model::{
    ColorSequence, ColorSequenceKeypoint, NumberRange, NumberSequence, NumberSequenceKeypoint,
    PhysicalProperties, Value, ValueType,
};

pub(super) fn register(out: &mut Vec<Reflector>) {
    out.push(
        Reflector::new(ValueType::NumberSequenceKeypoint)
            .constructor("new", Arity::Counts(&[2, 3]), number_keypoint_new)
            .with_member(number_keypoint_member),
    );
    out.push(
        Reflector::new(ValueType::NumberSequence)
            .constructor("new", Arity::Counts(&[1, 2]), number_sequence_new)
            .with_member(number_sequence_member),
    );
    out.push(
        Reflector::new(ValueType::ColorSequenceKeypoint)
            .constructor("new", Arity::Counts(&[2, 3]), color_keypoint_new)
            .with_member(color_keypoint_member),
    );
    out.push(
        Reflector::new(ValueType::ColorSequence)
            .constructor("new", Arity::Counts(&[1, 2]), color_sequence_new)
            .with_member(color_sequence_member),
    );
    out.push(
        Reflector::new(ValueType::NumberRange)
            .constructor("new", Arity::Counts(&[1, 2]), number_range_new)
            .with_member(number_range_member),
    );
    out.push(
        Reflector::new(ValueType::PhysicalProperties)
            .constructor("new", Arity::Counts(&[3, 5]), physical_properties_new)
            .with_member(physical_properties_member),
    );
}

/// Collects the typed entries of a keypoint table at argument `i`.
fn keypoint_table<T>(
    args: &Args,
    i: usize,
    expected: ValueType,
    extract: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>, ValueError> {
    args.table(i)?
        .iter()
        .map(|entry| entry.as_value().and_then(&extract).ok_or_else(|| args.bad(i, expected.name())))
        .collect()
}

// =============================================================================
// NUMBER SEQUENCE
// =============================================================================

fn number_keypoint_new(args: &Args) -> Result<Value, ValueError> {
    let time = args.float(0)?;
    let value = args.float(1)?;
    let envelope = args.opt_number(2, 0.0)? as f32;
    Ok(Value::NumberSequenceKeypoint(NumberSequenceKeypoint::new(time, value, envelope)))
}

fn number_keypoint_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::NumberSequenceKeypoint(k) = v else { return None };
    match name {
        "Time" => Some(k.time.into()),
        "Value" => Some(k.value.into()),
        "Envelope" => Some(k.envelope.into()),
        _ => None,
    }
}

fn number_sequence_new(args: &Args) -> Result<Value, ValueError> {
    let seq = match (args.len(), args.get(0)) {
        (1, Dynamic::Number(n)) => NumberSequence::constant(*n as f32),
        (1, Dynamic::Table(_)) => {
            let keypoints = keypoint_table(args, 0, ValueType::NumberSequenceKeypoint, |v| match v {
                Value::NumberSequenceKeypoint(k) => Some(*k),
                _ => None,
            })?;
            NumberSequence::new(keypoints)?
        }
        (1, _) => return Err(args.bad(0, "number or table")),
        (2, _) => NumberSequence::between(args.float(0)?, args.float(1)?),
        _ => return Err(args.unsupported()),
    };
    Ok(Value::NumberSequence(seq))
}

fn number_sequence_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::NumberSequence(seq) = v else { return None };
    match name {
        "Keypoints" => Some(Dynamic::Table(
            seq.keypoints()
                .iter()
                .map(|k| Value::NumberSequenceKeypoint(*k).into())
                .collect(),
        )),
        _ => None,
    }
}

// =============================================================================
// COLOR SEQUENCE
// =============================================================================

fn color_keypoint_new(args: &Args) -> Result<Value, ValueError> {
    let time = args.float(0)?;
    let color = args.color3(1)?;
    let envelope = args.opt_number(2, 0.0)? as f32;
    Ok(Value::ColorSequenceKeypoint(ColorSequenceKeypoint::new(time, color, envelope)))
}

fn color_keypoint_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::ColorSequenceKeypoint(k) = v else { return None };
    match name {
        "Time" => Some(k.time.into()),
        "Value" => Some(Value::Color3(k.value).into()),
        "Envelope" => Some(k.envelope.into()),
        _ => None,
    }
}

fn color_sequence_new(args: &Args) -> Result<Value, ValueError> {
    let seq = match (args.len(), args.get(0)) {
        (1, Dynamic::Value(Value::Color3(c))) => ColorSequence::constant(*c),
        (1, Dynamic::Table(_)) => {
            let keypoints = keypoint_table(args, 0, ValueType::ColorSequenceKeypoint, |v| match v {
                Value::ColorSequenceKeypoint(k) => Some(*k),
                _ => None,
            })?;
            ColorSequence::new(keypoints)?
        }
        (1, _) => return Err(args.bad(0, "Color3 or table")),
        (2, _) => ColorSequence::between(args.color3(0)?, args.color3(1)?),
        _ => return Err(args.unsupported()),
    };
    Ok(Value::ColorSequence(seq))
}

fn color_sequence_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::ColorSequence(seq) = v else { return None };
    match name {
        "Keypoints" => Some(Dynamic::Table(
            seq.keypoints()
                .iter()
                .map(|k| Value::ColorSequenceKeypoint(*k).into())
                .collect(),
        )),
        _ => None,
    }
}

// =============================================================================
// NUMBER RANGE, PHYSICAL PROPERTIES
// =============================================================================

fn number_range_new(args: &Args) -> Result<Value, ValueError> {
    let min = args.float(0)?;
    let max = match args.len() {
        1 => min,
        _ => args.float(1)?,
    };
    Ok(Value::NumberRange(NumberRange::new(min, max)?))
}

fn number_range_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::NumberRange(range) = v else { return None };
    match name {
        "Min" => Some(range.min.into()),
        "Max" => Some(range.max.into()),
        _ => None,
    }
}

fn physical_properties_new(args: &Args) -> Result<Value, ValueError> {
    let props = match args.len() {
        3 => {
            let [density, friction, elasticity] = args.floats(0)?;
            PhysicalProperties::new(density, friction, elasticity)
        }
        5 => {
            let [density, friction, elasticity, friction_weight, elasticity_weight] =
                args.floats(0)?;
            PhysicalProperties::with_weights(
                density,
                friction,
                elasticity,
                friction_weight,
                elasticity_weight,
            )
        }
        _ => return Err(args.unsupported()),
    };
    Ok(Value::PhysicalProperties(props))
}

fn physical_properties_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::PhysicalProperties(p) = v else { return None };
    match name {
        "Density" => Some(p.density.into()),
        "Friction" => Some(p.friction.into()),
        "Elasticity" => Some(p.elasticity.into()),
        "FrictionWeight" => Some(p.friction_weight.into()),
        "ElasticityWeight" => Some(p.elasticity_weight.into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Dynamic, ReflectorRegistry};
    use crate::error::ValueError;
    use crate::model::{Color3, ColorSequence, NumberRange, PhysicalProperties, Value};

    fn n(v: f64) -> Dynamic {
        Dynamic::Number(v)
    }

    #[test]
    fn test_number_sequence_rejects_wrong_entries() {
        let registry = ReflectorRegistry::new();
        let err = registry
            .construct("NumberSequence", "new", &[Dynamic::Table(vec![n(0.0), n(1.0)])])
            .unwrap_err();
        assert!(matches!(
            err,
            ValueError::BadArgument { index: 1, expected: "NumberSequenceKeypoint", .. }
        ));

        let err = registry
            .construct("NumberSequence", "new", &[Dynamic::Table(vec![])])
            .unwrap_err();
        assert_eq!(
            err,
            ValueError::Validation {
                kind: "NumberSequence",
                reason: "requires at least 2 keypoints",
            }
        );
    }

    #[test]
    fn test_number_sequence_keypoints_member() {
        let registry = ReflectorRegistry::new();
        let seq = registry.construct("NumberSequence", "new", &[n(1.0), n(2.0)]).unwrap();
        let Dynamic::Table(keypoints) = registry.member(&seq, "Keypoints").unwrap() else {
            panic!("expected table");
        };
        assert_eq!(keypoints.len(), 2);
        let last = keypoints[1].as_value().unwrap();
        assert_eq!(registry.member(last, "Value").unwrap(), n(2.0));
    }

    #[test]
    fn test_color_sequence_between() {
        let registry = ReflectorRegistry::new();
        let red = Color3::new(1.0, 0.0, 0.0);
        let blue = Color3::new(0.0, 0.0, 1.0);
        let seq = registry
            .construct(
                "ColorSequence",
                "new",
                &[Value::Color3(red).into(), Value::Color3(blue).into()],
            )
            .unwrap();
        assert_eq!(seq, Value::ColorSequence(ColorSequence::between(red, blue)));
    }

    #[test]
    fn test_number_range() {
        let registry = ReflectorRegistry::new();
        assert_eq!(
            registry.construct("NumberRange", "new", &[n(3.0)]).unwrap(),
            Value::NumberRange(NumberRange { min: 3.0, max: 3.0 })
        );
        let err = registry.construct("NumberRange", "new", &[n(5.0), n(1.0)]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_physical_properties_default_weights() {
        let registry = ReflectorRegistry::new();
        let props = registry
            .construct("PhysicalProperties", "new", &[n(0.7), n(0.3), n(0.5)])
            .unwrap();
        assert_eq!(props, Value::PhysicalProperties(PhysicalProperties::new(0.7, 0.3, 0.5)));
        assert_eq!(registry.member(&props, "FrictionWeight").unwrap(), n(1.0));
    }
}
