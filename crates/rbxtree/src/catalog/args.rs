//! Argument access for constructors and methods.

use crate::catalog::{Arity, Dynamic};
use crate::error::ValueError;
use crate::model::{Color3, Value, ValueType, Vector2, Vector3};

/// Positional arguments of one constructor or method call.
///
/// Accessors take 0-based positions; errors report 1-based positions.
pub struct Args<'a> {
    kind: &'static str,
    name: &'static str,
    arity: Arity,
    values: &'a [Dynamic],
}

impl<'a> Args<'a> {
    pub fn new(kind: &'static str, name: &'static str, arity: Arity, values: &'a [Dynamic]) -> Self {
        Self {
            kind,
            name,
            arity,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &'a [Dynamic] {
        self.values
    }

    /// Argument at `i`; missing arguments read as nil.
    pub fn get(&self, i: usize) -> &'a Dynamic {
        const NIL: &Dynamic = &Dynamic::Nil;
        self.values.get(i).unwrap_or(NIL)
    }

    /// Error for an argument of the wrong type.
    pub fn bad(&self, i: usize, expected: &'static str) -> ValueError {
        ValueError::BadArgument {
            kind: self.kind,
            constructor: self.name,
            index: i + 1,
            expected,
            found: self.get(i).type_name(),
        }
    }

    /// Error for an argument count the call does not support.
    pub fn unsupported(&self) -> ValueError {
        ValueError::Arity {
            kind: self.kind,
            constructor: self.name,
            accepted: self.arity,
            got: self.values.len(),
        }
    }

    pub fn number(&self, i: usize) -> Result<f64, ValueError> {
        match self.get(i) {
            Dynamic::Number(n) => Ok(*n),
            _ => Err(self.bad(i, "number")),
        }
    }

    pub fn float(&self, i: usize) -> Result<f32, ValueError> {
        self.number(i).map(|n| n as f32)
    }

    pub fn int(&self, i: usize) -> Result<i32, ValueError> {
        self.number(i).map(|n| n as i32)
    }

    pub fn int16(&self, i: usize) -> Result<i16, ValueError> {
        self.number(i).map(|n| n as i16)
    }

    /// Number at `i`, or `default` when the argument is nil or absent.
    pub fn opt_number(&self, i: usize, default: f64) -> Result<f64, ValueError> {
        match self.get(i) {
            Dynamic::Nil => Ok(default),
            _ => self.number(i),
        }
    }

    pub fn string(&self, i: usize) -> Result<&'a str, ValueError> {
        match self.get(i) {
            Dynamic::String(s) => Ok(s),
            _ => Err(self.bad(i, "string")),
        }
    }

    pub fn table(&self, i: usize) -> Result<&'a [Dynamic], ValueError> {
        match self.get(i) {
            Dynamic::Table(t) => Ok(t),
            _ => Err(self.bad(i, "table")),
        }
    }

    /// Typed value at `i`, extracted with `extract`.
    pub fn value<T>(
        &self,
        i: usize,
        expected: ValueType,
        extract: impl Fn(&Value) -> Option<T>,
    ) -> Result<T, ValueError> {
        self.get(i)
            .as_value()
            .and_then(extract)
            .ok_or_else(|| self.bad(i, expected.name()))
    }

    pub fn vector2(&self, i: usize) -> Result<Vector2, ValueError> {
        self.value(i, ValueType::Vector2, |v| match v {
            Value::Vector2(v) => Some(*v),
            _ => None,
        })
    }

    pub fn vector3(&self, i: usize) -> Result<Vector3, ValueError> {
        self.value(i, ValueType::Vector3, |v| match v {
            Value::Vector3(v) => Some(*v),
            _ => None,
        })
    }

    pub fn color3(&self, i: usize) -> Result<Color3, ValueError> {
        self.value(i, ValueType::Color3, |v| match v {
            Value::Color3(c) => Some(*c),
            _ => None,
        })
    }

    /// Reads `N` consecutive numbers starting at `start`, narrowed to f32.
    pub fn floats<const N: usize>(&self, start: usize) -> Result<[f32; N], ValueError> {
        let mut out = [0.0; N];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.float(start + k)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_argument_is_one_based() {
        let values = [Dynamic::Number(1.0), Dynamic::String("x".into())];
        let args = Args::new("Vector2", "new", Arity::Counts(&[0, 2]), &values);
        assert_eq!(args.number(0), Ok(1.0));
        assert_eq!(
            args.number(1),
            Err(ValueError::BadArgument {
                kind: "Vector2",
                constructor: "new",
                index: 2,
                expected: "number",
                found: "string",
            })
        );
        assert!(args.get(5).is_nil());
    }

    #[test]
    fn test_narrowing_truncates() {
        let values = [Dynamic::Number(3.9), Dynamic::Number(-70000.0)];
        let args = Args::new("Vector2int16", "new", Arity::Counts(&[2]), &values);
        assert_eq!(args.int(0), Ok(3));
        assert_eq!(args.int16(1), Ok(i16::MIN));
    }
}
