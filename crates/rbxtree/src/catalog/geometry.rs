//! Vectors, GUI coordinates, rays, frames, rectangles, regions and face sets.

use crate::catalog::{arith_error, ArithOp, Args, Arity, Dynamic, Reflector};
use crate::error::ValueError;
use crate::model::{
    Axes, CFrame, Faces, Ray, Rect, Region3, UDim, UDim2, Value, ValueType, Vector2,
    Vector2int16, Vector3, Vector3int16,
};

pub(super) fn register(out: &mut Vec<Reflector>) {
    out.push(
        Reflector::new(ValueType::Vector2)
            .constructor("new", Arity::Counts(&[0, 2]), vector2_new)
            .with_member(vector2_member)
            .method("Lerp", Arity::Counts(&[2]), vector2_lerp)
            .method("Dot", Arity::Counts(&[1]), vector2_dot)
            .with_arith(vector2_arith),
    );
    out.push(
        Reflector::new(ValueType::Vector3)
            .constructor("new", Arity::Counts(&[0, 3]), vector3_new)
            .with_member(vector3_member)
            .method("Lerp", Arity::Counts(&[2]), vector3_lerp)
            .method("Dot", Arity::Counts(&[1]), vector3_dot)
            .method("Cross", Arity::Counts(&[1]), vector3_cross)
            .method("Min", Arity::Counts(&[1]), vector3_min)
            .method("Max", Arity::Counts(&[1]), vector3_max)
            .with_arith(vector3_arith),
    );
    out.push(
        Reflector::new(ValueType::Vector2int16)
            .constructor("new", Arity::Counts(&[0, 2]), vector2int16_new)
            .with_member(vector2int16_member)
            .with_arith(vector2int16_arith),
    );
    out.push(
        Reflector::new(ValueType::Vector3int16)
            .constructor("new", Arity::Counts(&[0, 3]), vector3int16_new)
            .with_member(vector3int16_member)
            .with_arith(vector3int16_arith),
    );
    out.push(
        Reflector::new(ValueType::UDim)
            .constructor("new", Arity::Counts(&[0, 2]), udim_new)
            .with_member(udim_member)
            .with_arith(udim_arith),
    );
    out.push(
        Reflector::new(ValueType::UDim2)
            .constructor("new", Arity::Counts(&[0, 2, 4]), udim2_new)
            .constructor("fromScale", Arity::Counts(&[2]), udim2_from_scale)
            .constructor("fromOffset", Arity::Counts(&[2]), udim2_from_offset)
            .with_member(udim2_member)
            .method("Lerp", Arity::Counts(&[2]), udim2_lerp)
            .with_arith(udim2_arith),
    );
    out.push(
        Reflector::new(ValueType::Ray)
            .constructor("new", Arity::Counts(&[0, 2]), ray_new)
            .with_member(ray_member)
            .method("ClosestPoint", Arity::Counts(&[1]), ray_closest_point)
            .method("Distance", Arity::Counts(&[1]), ray_distance),
    );
    out.push(
        Reflector::new(ValueType::CFrame)
            .constructor("new", Arity::Counts(&[0, 1, 3, 7, 12]), cframe_new)
            .constructor("Angles", Arity::Counts(&[3]), cframe_angles)
            .constructor("fromEulerAnglesXYZ", Arity::Counts(&[3]), cframe_angles)
            .with_member(cframe_member)
            .method("Inverse", Arity::Counts(&[0]), cframe_inverse)
            .method("Lerp", Arity::Counts(&[2]), cframe_lerp)
            .method("ToWorldSpace", Arity::Counts(&[1]), cframe_to_world_space)
            .method("ToObjectSpace", Arity::Counts(&[1]), cframe_to_object_space)
            .method("PointToWorldSpace", Arity::Counts(&[1]), cframe_point_to_world_space)
            .method("PointToObjectSpace", Arity::Counts(&[1]), cframe_point_to_object_space)
            .method("GetComponents", Arity::Counts(&[0]), cframe_get_components)
            .with_arith(cframe_arith),
    );
    out.push(
        Reflector::new(ValueType::Rect)
            .constructor("new", Arity::Counts(&[0, 2, 4]), rect_new)
            .with_member(rect_member),
    );
    out.push(
        Reflector::new(ValueType::Region3)
            .constructor("new", Arity::Counts(&[0, 2]), region3_new)
            .with_member(region3_member)
            .method("ExpandToGrid", Arity::Counts(&[1]), region3_expand_to_grid),
    );
    out.push(
        Reflector::new(ValueType::Faces)
            .constructor("new", Arity::AtMost(6), faces_new)
            .with_member(faces_member),
    );
    out.push(
        Reflector::new(ValueType::Axes)
            .constructor("new", Arity::AtMost(6), axes_new)
            .with_member(axes_member),
    );
}

value_accessor!(as_vector2, Vector2, Vector2);
value_accessor!(as_vector3, Vector3, Vector3);
value_accessor!(as_udim2, UDim2, UDim2);
value_accessor!(as_ray, Ray, Ray);
value_accessor!(as_cframe, CFrame, CFrame);
value_accessor!(as_region3, Region3, Region3);

fn udim_arg(args: &Args, i: usize) -> Result<UDim, ValueError> {
    args.value(i, ValueType::UDim, |v| match v {
        Value::UDim(u) => Some(*u),
        _ => None,
    })
}

fn udim2_arg(args: &Args, i: usize) -> Result<UDim2, ValueError> {
    args.value(i, ValueType::UDim2, |v| match v {
        Value::UDim2(u) => Some(*u),
        _ => None,
    })
}

fn cframe_arg(args: &Args, i: usize) -> Result<CFrame, ValueError> {
    args.value(i, ValueType::CFrame, |v| match v {
        Value::CFrame(c) => Some(*c),
        _ => None,
    })
}

// Component-wise operators shared by the vector kinds. `$mul` and `$div`
// scale a vector `$a` by a host number `$n`.
macro_rules! vector_arith {
    ($name:ident, $variant:ident, |$a:ident, $n:ident| $mul:expr, $div:expr) => {
        fn $name(op: ArithOp, lhs: &Value, rhs: &Dynamic) -> Result<Value, ValueError> {
            let Value::$variant($a) = lhs else {
                return Err(arith_error(op, lhs, rhs));
            };
            let $a = *$a;
            let out = match (op, rhs) {
                (ArithOp::Neg, _) => -$a,
                (ArithOp::Add, Dynamic::Value(Value::$variant(b))) => $a + *b,
                (ArithOp::Sub, Dynamic::Value(Value::$variant(b))) => $a - *b,
                (ArithOp::Mul, Dynamic::Value(Value::$variant(b))) => $a * *b,
                (ArithOp::Div, Dynamic::Value(Value::$variant(b))) => $a / *b,
                (ArithOp::Mul, Dynamic::Number($n)) => {
                    let $n = *$n;
                    $mul
                }
                (ArithOp::Div, Dynamic::Number($n)) => {
                    let $n = *$n;
                    $div
                }
                _ => return Err(arith_error(op, lhs, rhs)),
            };
            Ok(Value::$variant(out))
        }
    };
}

// =============================================================================
// VECTORS
// =============================================================================

fn vector2_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::Vector2(Vector2::default())),
        2 => {
            let [x, y] = args.floats(0)?;
            Ok(Value::Vector2(Vector2::new(x, y)))
        }
        _ => Err(args.unsupported()),
    }
}

fn vector2_member(v: &Value, name: &str) -> Option<Dynamic> {
    let v = as_vector2(v).ok()?;
    Some(match name {
        "X" => v.x.into(),
        "Y" => v.y.into(),
        "Magnitude" => v.magnitude().into(),
        "Unit" => Value::Vector2(v.unit()).into(),
        _ => return None,
    })
}

fn vector2_lerp(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    let goal = args.vector2(0)?;
    let alpha = args.float(1)?;
    Ok(Value::Vector2(as_vector2(v)?.lerp(goal, alpha)).into())
}

fn vector2_dot(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(as_vector2(v)?.dot(args.vector2(0)?).into())
}

vector_arith!(vector2_arith, Vector2, |a, n| a * n as f32, a / n as f32);

fn vector3_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::Vector3(Vector3::default())),
        3 => {
            let [x, y, z] = args.floats(0)?;
            Ok(Value::Vector3(Vector3::new(x, y, z)))
        }
        _ => Err(args.unsupported()),
    }
}

fn vector3_member(v: &Value, name: &str) -> Option<Dynamic> {
    let v = as_vector3(v).ok()?;
    Some(match name {
        "X" => v.x.into(),
        "Y" => v.y.into(),
        "Z" => v.z.into(),
        "Magnitude" => v.magnitude().into(),
        "Unit" => Value::Vector3(v.unit()).into(),
        _ => return None,
    })
}

fn vector3_lerp(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    let goal = args.vector3(0)?;
    let alpha = args.float(1)?;
    Ok(Value::Vector3(as_vector3(v)?.lerp(goal, alpha)).into())
}

fn vector3_dot(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(as_vector3(v)?.dot(args.vector3(0)?).into())
}

fn vector3_cross(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::Vector3(as_vector3(v)?.cross(args.vector3(0)?)).into())
}

fn vector3_min(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::Vector3(as_vector3(v)?.min(args.vector3(0)?)).into())
}

fn vector3_max(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::Vector3(as_vector3(v)?.max(args.vector3(0)?)).into())
}

vector_arith!(vector3_arith, Vector3, |a, n| a * n as f32, a / n as f32);

fn vector2int16_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::Vector2int16(Vector2int16::default())),
        2 => Ok(Value::Vector2int16(Vector2int16::new(args.int16(0)?, args.int16(1)?))),
        _ => Err(args.unsupported()),
    }
}

fn vector2int16_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::Vector2int16(v) = v else { return None };
    match name {
        "X" => Some(Dynamic::Number(v.x as f64)),
        "Y" => Some(Dynamic::Number(v.y as f64)),
        _ => None,
    }
}

vector_arith!(vector2int16_arith, Vector2int16, |a, n| a.mul_n(n), a.div_n(n));

fn vector3int16_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::Vector3int16(Vector3int16::default())),
        3 => Ok(Value::Vector3int16(Vector3int16::new(
            args.int16(0)?,
            args.int16(1)?,
            args.int16(2)?,
        ))),
        _ => Err(args.unsupported()),
    }
}

fn vector3int16_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::Vector3int16(v) = v else { return None };
    match name {
        "X" => Some(Dynamic::Number(v.x as f64)),
        "Y" => Some(Dynamic::Number(v.y as f64)),
        "Z" => Some(Dynamic::Number(v.z as f64)),
        _ => None,
    }
}

vector_arith!(vector3int16_arith, Vector3int16, |a, n| a.mul_n(n), a.div_n(n));

// =============================================================================
// UDIM, UDIM2
// =============================================================================

fn udim_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::UDim(UDim::default())),
        2 => Ok(Value::UDim(UDim::new(args.float(0)?, args.int(1)?))),
        _ => Err(args.unsupported()),
    }
}

fn udim_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::UDim(u) = v else { return None };
    match name {
        "Scale" => Some(u.scale.into()),
        "Offset" => Some(u.offset.into()),
        _ => None,
    }
}

fn udim_arith(op: ArithOp, lhs: &Value, rhs: &Dynamic) -> Result<Value, ValueError> {
    let out = match (op, lhs, rhs) {
        (ArithOp::Neg, Value::UDim(a), _) => -*a,
        (ArithOp::Add, Value::UDim(a), Dynamic::Value(Value::UDim(b))) => *a + *b,
        (ArithOp::Sub, Value::UDim(a), Dynamic::Value(Value::UDim(b))) => *a - *b,
        _ => return Err(arith_error(op, lhs, rhs)),
    };
    Ok(Value::UDim(out))
}

fn udim2_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::UDim2(UDim2::default())),
        2 => Ok(Value::UDim2(UDim2::new(udim_arg(args, 0)?, udim_arg(args, 1)?))),
        4 => Ok(Value::UDim2(UDim2::new(
            UDim::new(args.float(0)?, args.int(1)?),
            UDim::new(args.float(2)?, args.int(3)?),
        ))),
        _ => Err(args.unsupported()),
    }
}

fn udim2_from_scale(args: &Args) -> Result<Value, ValueError> {
    Ok(Value::UDim2(UDim2::new(
        UDim::new(args.float(0)?, 0),
        UDim::new(args.float(1)?, 0),
    )))
}

fn udim2_from_offset(args: &Args) -> Result<Value, ValueError> {
    Ok(Value::UDim2(UDim2::new(
        UDim::new(0.0, args.int(0)?),
        UDim::new(0.0, args.int(1)?),
    )))
}

fn udim2_member(v: &Value, name: &str) -> Option<Dynamic> {
    let u = as_udim2(v).ok()?;
    match name {
        "X" | "Width" => Some(Value::UDim(u.x).into()),
        "Y" | "Height" => Some(Value::UDim(u.y).into()),
        _ => None,
    }
}

fn udim2_lerp(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    let goal = udim2_arg(args, 0)?;
    let alpha = args.float(1)?;
    Ok(Value::UDim2(as_udim2(v)?.lerp(goal, alpha)).into())
}

fn udim2_arith(op: ArithOp, lhs: &Value, rhs: &Dynamic) -> Result<Value, ValueError> {
    let out = match (op, lhs, rhs) {
        (ArithOp::Neg, Value::UDim2(a), _) => -*a,
        (ArithOp::Add, Value::UDim2(a), Dynamic::Value(Value::UDim2(b))) => *a + *b,
        (ArithOp::Sub, Value::UDim2(a), Dynamic::Value(Value::UDim2(b))) => *a - *b,
        _ => return Err(arith_error(op, lhs, rhs)),
    };
    Ok(Value::UDim2(out))
}

// =============================================================================
// RAY, CFRAME
// =============================================================================

fn ray_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::Ray(Ray::default())),
        2 => Ok(Value::Ray(Ray::new(args.vector3(0)?, args.vector3(1)?))),
        _ => Err(args.unsupported()),
    }
}

fn ray_member(v: &Value, name: &str) -> Option<Dynamic> {
    let ray = as_ray(v).ok()?;
    Some(match name {
        "Origin" => Value::Vector3(ray.origin).into(),
        "Direction" => Value::Vector3(ray.direction).into(),
        "Unit" => Value::Ray(Ray::new(ray.origin, ray.direction.unit())).into(),
        _ => return None,
    })
}

fn ray_closest_point(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::Vector3(as_ray(v)?.closest_point(args.vector3(0)?)).into())
}

fn ray_distance(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(as_ray(v)?.distance(args.vector3(0)?).into())
}

fn cframe_new(args: &Args) -> Result<Value, ValueError> {
    let cf = match args.len() {
        0 => CFrame::IDENTITY,
        1 => CFrame::from_position(args.vector3(0)?),
        3 => {
            let [x, y, z] = args.floats(0)?;
            CFrame::from_position(Vector3::new(x, y, z))
        }
        7 => {
            let [x, y, z, qx, qy, qz, qw] = args.floats(0)?;
            CFrame::from_quaternion(Vector3::new(x, y, z), qx, qy, qz, qw)
        }
        12 => CFrame::from_components(args.floats(0)?),
        _ => return Err(args.unsupported()),
    };
    Ok(Value::CFrame(cf))
}

fn cframe_angles(args: &Args) -> Result<Value, ValueError> {
    let [rx, ry, rz] = args.floats(0)?;
    Ok(Value::CFrame(CFrame::from_euler_angles_xyz(rx, ry, rz)))
}

fn cframe_member(v: &Value, name: &str) -> Option<Dynamic> {
    let cf = as_cframe(v).ok()?;
    Some(match name {
        "Position" | "p" => Value::Vector3(cf.position).into(),
        "X" => cf.position.x.into(),
        "Y" => cf.position.y.into(),
        "Z" => cf.position.z.into(),
        "LookVector" => Value::Vector3(cf.look_vector()).into(),
        "RightVector" => Value::Vector3(cf.right_vector()).into(),
        "UpVector" => Value::Vector3(cf.up_vector()).into(),
        _ => return None,
    })
}

fn cframe_inverse(v: &Value, _: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::CFrame(as_cframe(v)?.inverse()).into())
}

fn cframe_lerp(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    let goal = cframe_arg(args, 0)?;
    let alpha = args.float(1)?;
    Ok(Value::CFrame(as_cframe(v)?.lerp(goal, alpha)).into())
}

fn cframe_to_world_space(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::CFrame(as_cframe(v)?.to_world_space(cframe_arg(args, 0)?)).into())
}

fn cframe_to_object_space(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::CFrame(as_cframe(v)?.to_object_space(cframe_arg(args, 0)?)).into())
}

fn cframe_point_to_world_space(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::Vector3(as_cframe(v)?.point_to_world_space(args.vector3(0)?)).into())
}

fn cframe_point_to_object_space(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    Ok(Value::Vector3(as_cframe(v)?.point_to_object_space(args.vector3(0)?)).into())
}

fn cframe_get_components(v: &Value, _: &Args) -> Result<Dynamic, ValueError> {
    let components = as_cframe(v)?.components();
    Ok(Dynamic::Table(components.iter().map(|c| Dynamic::from(*c)).collect()))
}

fn cframe_arith(op: ArithOp, lhs: &Value, rhs: &Dynamic) -> Result<Value, ValueError> {
    let Value::CFrame(cf) = lhs else {
        return Err(arith_error(op, lhs, rhs));
    };
    match (op, rhs) {
        (ArithOp::Mul, Dynamic::Value(Value::CFrame(other))) => Ok(Value::CFrame(*cf * *other)),
        (ArithOp::Mul, Dynamic::Value(Value::Vector3(v))) => Ok(Value::Vector3(*cf * *v)),
        (ArithOp::Add, Dynamic::Value(Value::Vector3(v))) => Ok(Value::CFrame(*cf + *v)),
        (ArithOp::Sub, Dynamic::Value(Value::Vector3(v))) => Ok(Value::CFrame(*cf - *v)),
        _ => Err(arith_error(op, lhs, rhs)),
    }
}

// =============================================================================
// RECT, REGION3
// =============================================================================

fn rect_new(args: &Args) -> Result<Value, ValueError> {
    let rect = match args.len() {
        0 => Rect::default(),
        2 => Rect::new(args.vector2(0)?, args.vector2(1)?),
        4 => {
            let [x0, y0, x1, y1] = args.floats(0)?;
            Rect::new(Vector2::new(x0, y0), Vector2::new(x1, y1))
        }
        _ => return Err(args.unsupported()),
    };
    Ok(Value::Rect(rect))
}

fn rect_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::Rect(rect) = v else { return None };
    Some(match name {
        "Min" => Value::Vector2(rect.min).into(),
        "Max" => Value::Vector2(rect.max).into(),
        "Width" => rect.width().into(),
        "Height" => rect.height().into(),
        _ => return None,
    })
}

fn region3_new(args: &Args) -> Result<Value, ValueError> {
    match args.len() {
        0 => Ok(Value::Region3(Region3::default())),
        2 => Ok(Value::Region3(Region3::new(args.vector3(0)?, args.vector3(1)?))),
        _ => Err(args.unsupported()),
    }
}

fn region3_member(v: &Value, name: &str) -> Option<Dynamic> {
    let region = as_region3(v).ok()?;
    Some(match name {
        "CFrame" => Value::CFrame(region.cframe()).into(),
        "Size" => Value::Vector3(region.size()).into(),
        _ => return None,
    })
}

fn region3_expand_to_grid(v: &Value, args: &Args) -> Result<Dynamic, ValueError> {
    let resolution = args.int(0)?;
    Ok(Value::Region3(as_region3(v)?.expand_to_grid(resolution)).into())
}

// =============================================================================
// FACES, AXES
// =============================================================================

fn faces_new(args: &Args) -> Result<Value, ValueError> {
    let mut faces = Faces::default();
    for i in 0..args.len() {
        let name = args.string(i).map_err(|_| args.bad(i, "face name"))?;
        if !faces.set_by_name(name) {
            return Err(args.bad(i, "face name"));
        }
    }
    Ok(Value::Faces(faces))
}

fn faces_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::Faces(faces) = v else { return None };
    faces.get_by_name(name).map(Dynamic::Bool)
}

fn axes_new(args: &Args) -> Result<Value, ValueError> {
    let mut axes = Axes::default();
    for i in 0..args.len() {
        let name = args.string(i).map_err(|_| args.bad(i, "axis name"))?;
        if !axes.set_by_name(name) {
            return Err(args.bad(i, "axis name"));
        }
    }
    Ok(Value::Axes(axes))
}

fn axes_member(v: &Value, name: &str) -> Option<Dynamic> {
    let Value::Axes(axes) = v else { return None };
    axes.get_by_name(name).map(Dynamic::Bool)
}

#[cfg(test)]
mod tests {
    use crate::catalog::{ArithOp, Dynamic, ReflectorRegistry};
    use crate::error::ValueError;
    use crate::model::{CFrame, Faces, UDim, UDim2, Value, Vector3, Vector3int16};

    fn n(v: f64) -> Dynamic {
        Dynamic::Number(v)
    }

    fn v3(x: f32, y: f32, z: f32) -> Dynamic {
        Dynamic::Value(Value::Vector3(Vector3::new(x, y, z)))
    }

    #[test]
    fn test_vector3_methods() {
        let registry = ReflectorRegistry::new();
        let a = Value::Vector3(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(
            registry.call_method(&a, "Cross", &[v3(0.0, 1.0, 0.0)]).unwrap(),
            v3(0.0, 0.0, 1.0)
        );
        assert_eq!(registry.call_method(&a, "Dot", &[v3(2.0, 5.0, 0.0)]).unwrap(), n(2.0));
        assert_eq!(
            registry.call_method(&a, "Lerp", &[v3(3.0, 0.0, 0.0), n(0.5)]).unwrap(),
            v3(2.0, 0.0, 0.0)
        );
        assert!(matches!(
            registry.call_method(&a, "Lerp", &[v3(3.0, 0.0, 0.0)]),
            Err(ValueError::Arity { got: 1, .. })
        ));
        assert!(matches!(
            registry.member(&a, "W"),
            Err(ValueError::UnknownMember { kind: "Vector3", .. })
        ));
    }

    #[test]
    fn test_vector3int16_truncates_arguments() {
        let registry = ReflectorRegistry::new();
        let v = registry
            .construct("Vector3int16", "new", &[n(1.9), n(-2.9), n(40000.0)])
            .unwrap();
        assert_eq!(v, Value::Vector3int16(Vector3int16::new(1, -2, i16::MAX)));
    }

    #[test]
    fn test_udim2_constructors() {
        let registry = ReflectorRegistry::new();
        let full = registry
            .construct("UDim2", "new", &[n(0.5), n(10.0), n(1.0), n(-4.0)])
            .unwrap();
        let expected = UDim2::new(UDim::new(0.5, 10), UDim::new(1.0, -4));
        assert_eq!(full, Value::UDim2(expected));

        let pair = registry
            .construct(
                "UDim2",
                "new",
                &[
                    Dynamic::Value(Value::UDim(expected.x)),
                    Dynamic::Value(Value::UDim(expected.y)),
                ],
            )
            .unwrap();
        assert_eq!(pair, full);

        let err = registry.construct("UDim2", "new", &[n(1.0)]).unwrap_err();
        assert_eq!(err.to_string(), "UDim2.new: expected 0, 2 or 4 arguments, got 1");
    }

    #[test]
    fn test_cframe_constructor_overloads() {
        let registry = ReflectorRegistry::new();
        let at = registry.construct("CFrame", "new", &[n(1.0), n(2.0), n(3.0)]).unwrap();
        assert_eq!(at, Value::CFrame(CFrame::from_position(Vector3::new(1.0, 2.0, 3.0))));

        let identity = registry
            .construct("CFrame", "new", &[n(0.0), n(0.0), n(0.0), n(0.0), n(0.0), n(0.0), n(1.0)])
            .unwrap();
        assert_eq!(identity, Value::CFrame(CFrame::IDENTITY));

        assert!(matches!(
            registry.construct("CFrame", "new", &[n(0.0), n(0.0)]),
            Err(ValueError::Arity { got: 2, .. })
        ));
    }

    #[test]
    fn test_cframe_times_vector() {
        let registry = ReflectorRegistry::new();
        let cf = Dynamic::Value(Value::CFrame(CFrame::from_position(Vector3::new(1.0, 0.0, 0.0))));
        assert_eq!(
            registry.arith(ArithOp::Mul, &cf, &v3(1.0, 2.0, 3.0)).unwrap(),
            v3(2.0, 2.0, 3.0)
        );
        assert_eq!(
            registry.member(&Value::CFrame(CFrame::IDENTITY), "LookVector").unwrap(),
            v3(0.0, 0.0, -1.0)
        );
    }

    #[test]
    fn test_faces_constructor() {
        let registry = ReflectorRegistry::new();
        let faces = registry
            .construct("Faces", "new", &["Top".into(), "Front".into()])
            .unwrap();
        assert_eq!(faces, Value::Faces(Faces::from_bits(0x22)));
        assert_eq!(registry.member(&faces, "Top").unwrap(), Dynamic::Bool(true));
        assert_eq!(registry.member(&faces, "Left").unwrap(), Dynamic::Bool(false));

        assert!(matches!(
            registry.construct("Faces", "new", &["Middle".into()]),
            Err(ValueError::BadArgument { index: 1, expected: "face name", .. })
        ));
        let seven: Vec<Dynamic> = (0..7).map(|_| "Top".into()).collect();
        assert!(matches!(
            registry.construct("Faces", "new", &seven),
            Err(ValueError::Arity { got: 7, .. })
        ));
    }
}
