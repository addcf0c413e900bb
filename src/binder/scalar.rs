// Copyright (c) 2024 The rrmq authors. All rights reserved.
// Use of this source is governed by a license that can be found
// in the LICENSE file.

//! Scalar coercion rules, grounded
//! on `binder/binding.go`'s `setWithProperType`: a `reflect.Kind` switch
//! there becomes a small trait implemented once per primitive type here,
//! since Rust has no runtime type switch over arbitrary field kinds.

use crate::error::Result;

/// A leaf value a text/topic binder tag can target. `coerce` mirrors one
/// one coercion rule, including its empty-string default.
pub trait Scalar: Sized {
    fn coerce(raw: &str) -> Result<Self>;

    /// Coerces `raw` and writes it into `target`. Most kinds always
    /// overwrite; `bool` overrides this to skip the write on a falsy
    /// value, since a plain `coerce` that just returns `Self` can't
    /// express "leave the field untouched" to its caller.
    fn assign(raw: &str, target: &mut Self) -> Result<()> {
        *target = Self::coerce(raw)?;
        Ok(())
    }
}

macro_rules! impl_signed {
    ($($t:ty),+) => {
        $(impl Scalar for $t {
            fn coerce(raw: &str) -> Result<Self> {
                let raw = if raw.is_empty() { "0" } else { raw };
                Ok(raw.parse::<$t>()?)
            }
        })+
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),+) => {
        $(impl Scalar for $t {
            fn coerce(raw: &str) -> Result<Self> {
                let raw = if raw.is_empty() { "0" } else { raw };
                Ok(raw.parse::<$t>()?)
            }
        })+
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Scalar for f32 {
    fn coerce(raw: &str) -> Result<Self> {
        let raw = if raw.is_empty() { "0.0" } else { raw };
        Ok(raw.parse::<f32>()?)
    }
}

impl Scalar for f64 {
    fn coerce(raw: &str) -> Result<Self> {
        let raw = if raw.is_empty() { "0.0" } else { raw };
        Ok(raw.parse::<f64>()?)
    }
}

impl Scalar for bool {
    /// Accepts the same truthy/falsy spellings as Go's
    /// `strconv.ParseBool`.
    fn coerce(raw: &str) -> Result<Self> {
        let raw = if raw.is_empty() { "false" } else { raw };
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(crate::error::Error::new(
                crate::error::ErrorKind::CoercionError,
                format!("invalid boolean value: {raw:?}"),
            )),
        }
    }

    /// Only a truthy value writes `target`; a falsy value leaves it at
    /// whatever it already held, matching `setWithProperType`'s
    /// `else if boolVal { SetBool(true) }`, which never calls `SetBool`
    /// on a falsy parse.
    fn assign(raw: &str, target: &mut Self) -> Result<()> {
        if Self::coerce(raw)? {
            *target = true;
        }
        Ok(())
    }
}

impl Scalar for String {
    fn coerce(raw: &str) -> Result<Self> {
        Ok(raw.to_string())
    }
}

impl<T: Scalar> Scalar for Option<T> {
    /// "nullable-scalar pointer" row: materializes the inner kind, then
    /// assigns, mirroring the original's `*int`/`*string` struct fields.
    fn coerce(raw: &str) -> Result<Self> {
        Ok(Some(T::coerce(raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_uses_kind_default() {
        assert_eq!(i64::coerce("").unwrap(), 0);
        assert_eq!(u32::coerce("").unwrap(), 0);
        assert!((f64::coerce("").unwrap() - 0.0).abs() < f64::EPSILON);
        assert!(!bool::coerce("").unwrap());
    }

    #[test]
    fn bool_spellings() {
        for truthy in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(bool::coerce(truthy).unwrap());
        }
        for falsy in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!bool::coerce(falsy).unwrap());
        }
        assert!(bool::coerce("nope").is_err());
    }

    #[test]
    fn falsy_assign_does_not_overwrite_an_already_true_field() {
        let mut flag = true;
        bool::assign("false", &mut flag).unwrap();
        assert!(flag);

        bool::assign("true", &mut flag).unwrap();
        assert!(flag);

        let mut flag = false;
        bool::assign("false", &mut flag).unwrap();
        assert!(!flag);
    }

    #[test]
    fn option_materializes_inner() {
        assert_eq!(Option::<i32>::coerce("50").unwrap(), Some(50));
    }
}
