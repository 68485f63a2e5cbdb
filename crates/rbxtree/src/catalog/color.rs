//! Color kinds.

use crate::catalog::{mismatch, Args, Arity, Dynamic, Reflector};
use crate::error::ValueError;
use crate::model::{BrickColor, Color3, Color3uint8, Value, ValueType};

pub(super) fn register(out: &mut Vec<Reflector>) {
    out.push(
        Reflector::new(ValueType::Color3)
            .constructor("new", Arity::Counts(&[0, 3]), color3_new)
            .constructor("fromRGB", Arity::Counts(&[3]), color3_from_rgb)
            .constructor("fromHSV", Arity::Counts(&[3]), color3_from_hsv)
            .with_member(color3_member)
            .method("Lerp", Arity::Counts(&[2]), color3_lerp)
            .method("ToHSV", Arity::Counts(&[0]), color3_to_hsv),
    );
    out.push(
        Reflector::new(ValueType::Color3uint8)
            .with_pull(pull_color3uint8)
            .constructor("new", Arity::Counts(&[0, 3]), color3uint8_new)
            .constructor("fromRGB", Arity::Counts(&[3]), color3uint8_from_rgb)
            .with_member(color3uint8_member)
            .method("Lerp", Arity::Counts(&[2]), color3uint8_lerp)
            .method("ToHSV", Arity::Counts(&[0]), color3uint8_to_hsv),
    );
    out.push(
        Reflector::new(ValueType::BrickColor)
            .constructor("new", Arity::Counts(&[0, 1, 3]), brick_color_new)
            .with_member(brick_color_member),
    );
}

value_accessor!(as_color3, Color3, Color3);
value_accessor!(as_color3uint8, Color3uint8, Color3uint8);

fn hsv_table(color: Color3) -> Dynamic {
    let (h, s, v) = color.to_hsv();
    Dynamic::Table(vec![h.into(), s.into(), v.into()])
}

fn rgb_member(color: Color3, name: &str) -> Option<Dynamic> {
    match name {
        "R" => Some(color.r.into()),
        "G" => Some(color.g.into()),
        "B" => Some(color.b.into()),
        _ => None,
    }
}

// =============================================================================
// COLOR3
// =============================================================================

fn color3_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::Color3(Color3::default())),
        3 => {
            let [r, g, b] = args.floats(0)?;
            Ok(Value::Color3(Color3::new(r, g, b)))
        }
        _ => Err(args.unsupported()),
    }
}

fn color3_from_rgb(args: &Args) -> Result<Value, ValueError> {
    Ok(Value::Color3(Color3::from_rgb(args.int(0)?, args.int(1)?, args.int(2)?)))
}

fn color3_from_hsv(args: &Args) -> Result<Value, ValueError> {
    Ok(Value::Color3(Color3::from_hsv(
        args.number(0)?,
        args.number(1)?,
        args.number(2)?,
    )))
}

fn color3_member(v: &Value, name: &str) -> Option<Dynamic> {
    rgb_member(as_color3(v).ok()?, name)
}

fn color3_lerp(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    let goal = args.color3(0)?;
    let alpha = args.number(1)?;
    Ok(Value::Color3(as_color3(v)?.lerp(goal, alpha)).into())
}

fn color3_to_hsv(v: &Value, _: &Args) -> Result<Dynamic, ValueError> {
    Ok(hsv_table(as_color3(v)?))
}

// =============================================================================
// COLOR3UINT8
// =============================================================================

// Accepts plain Color3 values too; they share the same normalized range.
fn pull_color3uint8(d: &Dynamic) -> Result<Value, ValueError> {
    match d {
        Dynamic::Value(v @ Value::Color3uint8(_)) => Ok(v.clone()),
        Dynamic::Value(Value::Color3(c)) => Ok(Value::Color3uint8(Color3uint8::from(*c))),
        other => Err(mismatch(ValueType::Color3uint8, other)),
    }
}

fn color3uint8_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::Color3uint8(Color3uint8::default())),
        3 => {
            let [r, g, b] = args.floats(0)?;
            Ok(Value::Color3uint8(Color3uint8::new(r, g, b)))
        }
        _ => Err(args.unsupported()),
    }
}

// Components outside 0..=255 clamp to the nearest byte, like `to_bytes`.
fn color3uint8_from_rgb(args: &Args) -> Result<Value, ValueError> {
    let byte = |i: usize| args.number(i).map(|n| n.clamp(0.0, 255.0) as u8);
    Ok(Value::Color3uint8(Color3uint8::from_bytes([
        byte(0)?,
        byte(1)?,
        byte(2)?,
    ])))
}

fn color3uint8_member(v: &Value, name: &str) -> Option<Dynamic> {
    rgb_member(as_color3uint8(v).ok()?.to_color3(), name)
}

fn color3uint8_lerp(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    let goal = args.value(0, ValueType::Color3uint8, |v| match v {
        Value::Color3uint8(c) => Some(c.to_color3()),
        Value::Color3(c) => Some(*c),
        _ => None,
    })?;
    let alpha = args.number(1)?;
    let color = as_color3uint8(v)?.to_color3().lerp(goal, alpha);
    Ok(Value::Color3uint8(color.into()).into())
}

fn color3uint8_to_hsv(v: &Value, _: &Args) -> Result<Dynamic, ValueError> {
    Ok(hsv_table(as_color3uint8(v)?.to_color3()))
}

// =============================================================================
// BRICK COLOR
// =============================================================================

fn brick_color_new(args: &Args) -> Result<Value, ValueError> {
    let brick = match args.len() {
        0 => BrickColor::DEFAULT,
        1 => match args.get(0) {
            Dynamic::Number(n) => BrickColor::from_number(*n as u32),
            Dynamic::String(name) => BrickColor::from_name(name).unwrap_or(BrickColor::DEFAULT),
            Dynamic::Value(Value::Color3(c)) => BrickColor::nearest(*c),
            _ => return Err(args.bad(0, "number, string or Color3")),
        },
        3 => {
            let [r, g, b] = args.floats(0)?;
            BrickColor::nearest(Color3::new(r, g, b))
        }
        _ => return Err(args.unsupported()),
    };
    Ok(Value::BrickColor(brick))
}

fn brick_color_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::BrickColor(brick) = v else { return None };
    match name {
        "Number" => Some(Dynamic::Number(brick.number() as f64)),
        "Name" => Some(brick.name().into()),
        "Color" => Some(Value::Color3(brick.color()).into()),
        "r" => Some(brick.color().r.into()),
        "g" => Some(brick.color().g.into()),
        "b" => Some(brick.color().b.into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{Dynamic, ReflectorRegistry};
    use crate::model::{BrickColor, Color3, Color3uint8, Value, ValueType};

    fn n(v: f64) -> Dynamic {
        Dynamic::Number(v)
    }

    #[test]
    fn test_color3_from_rgb() {
        let registry = ReflectorRegistry::new();
        let c = registry
            .construct("Color3", "fromRGB", &[n(255.0), n(0.0), n(51.0)])
            .unwrap();
        assert_eq!(c, Value::Color3(Color3::new(1.0, 0.0, 0.2)));
    }

    #[test]
    fn test_color3uint8_accepts_color3() {
        let registry = ReflectorRegistry::new();
        let pulled = registry
            .pull(
                ValueType::Color3uint8,
                &Dynamic::Value(Value::Color3(Color3::new(1.0, 0.5, 0.0))),
            )
            .unwrap();
        let Value::Color3uint8(c) = pulled else {
            panic!("expected Color3uint8, got {pulled:?}");
        };
        assert_eq!(c.to_bytes(), [255, 128, 0]);
    }

    #[test]
    fn test_color3uint8_from_rgb_clamps() {
        let registry = ReflectorRegistry::new();
        let Value::Color3uint8(c) = registry
            .construct("Color3uint8", "fromRGB", &[n(300.0), n(-5.0), n(127.9)])
            .unwrap()
        else {
            panic!("expected Color3uint8");
        };
        assert_eq!(c.to_bytes(), [255, 0, 127]);
    }

    #[test]
    fn test_color3uint8_lerp() {
        let registry = ReflectorRegistry::new();
        let black = Value::Color3uint8(Color3uint8::from_bytes([0, 0, 0]));
        let white = Dynamic::Value(Value::Color3uint8(Color3uint8::from_bytes([255, 255, 255])));
        let Dynamic::Value(Value::Color3uint8(mid)) =
            registry.call_method(&black, "Lerp", &[white, n(0.5)]).unwrap()
        else {
            panic!("expected Color3uint8");
        };
        assert_eq!(mid.to_bytes(), [128, 128, 128]);
    }

    #[test]
    fn test_brick_color_constructor() {
        let registry = ReflectorRegistry::new();
        assert_eq!(
            registry.construct("BrickColor", "new", &["Bright red".into()]).unwrap(),
            Value::BrickColor(BrickColor(21))
        );
        assert_eq!(
            registry.construct("BrickColor", "new", &[n(1004.0)]).unwrap(),
            Value::BrickColor(BrickColor(1004))
        );
        assert_eq!(
            registry.construct("BrickColor", "new", &[n(0.0), n(0.0), n(1.0)]).unwrap(),
            Value::BrickColor(BrickColor(1010))
        );
        let brick = Value::BrickColor(BrickColor::DEFAULT);
        assert_eq!(
            registry.member(&brick, "Name").unwrap(),
            Dynamic::String("Medium stone grey".into())
        );
    }
}
