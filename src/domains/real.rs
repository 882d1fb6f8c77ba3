//! Arbitrary-precision decimal numbers and the field they form.
//!
//! A [Real] is an unscaled [Integer] together with a decimal scale, so that
//! `Real::new(12345, 2)` represents `123.45`. The scale is limited to
//! [Real::MAX_SCALE] in absolute value; operations whose result would leave that range
//! fail with [FieldError::InvalidArgument]. Addition, subtraction and multiplication
//! are exact. Division generally is not, and is rounded according to a [DivisionPolicy].
//! The field uses [DivisionPolicy::default], which keeps
//! [DivisionPolicy::DEFAULT_SCALE] fractional digits and rounds half to even.
//!
//! ```
//! use fieldkit::domains::{real::{Real, RealField}, Field, FieldElement};
//!
//! let a: Real = "1.1".parse().unwrap();
//! let b: Real = "2.2".parse().unwrap();
//! assert_eq!(a.add(&b).unwrap(), "3.3".parse().unwrap());
//! assert!(std::ptr::eq(RealField::get().zero(), RealField::get().zero()));
//! ```

use std::{
    cmp::Ordering,
    f64::consts::LOG10_2,
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use once_cell::sync::Lazy;
use rug::{ops::Pow, Integer, Rational};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

use super::{check_same_field, Field, FieldElement, FieldError};

static REAL_FIELD: Lazy<RealField> = Lazy::new(RealField::new);

/// Compute `10^e`. Callers only pass sums and differences of bounded scales.
fn pow10(e: u64) -> Integer {
    Integer::from(10).pow(e as u32)
}

/// Check that `scale` lies within `[-Real::MAX_SCALE, Real::MAX_SCALE]`.
fn bounded_scale(scale: i128) -> Result<i64, FieldError> {
    if scale.unsigned_abs() > Real::MAX_SCALE as u128 {
        Err(FieldError::InvalidArgument(format!(
            "scale {} is outside of [-{max}, {max}]",
            scale,
            max = Real::MAX_SCALE
        )))
    } else {
        Ok(scale as i64)
    }
}

/// The rounding mode used when a result has to be truncated to a given scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rounding {
    /// Round towards zero.
    Down,
    /// Round away from zero.
    Up,
    /// Round towards negative infinity.
    Floor,
    /// Round towards positive infinity.
    Ceiling,
    /// Round to the nearest neighbour, ties away from zero.
    HalfUp,
    /// Round to the nearest neighbour, ties towards zero.
    HalfDown,
    /// Round to the nearest neighbour, ties to the even neighbour.
    HalfEven,
}

impl Rounding {
    /// Compute `num / den` rounded to an integer.
    fn quotient(self, num: Integer, den: Integer) -> Integer {
        let negative = (num.cmp0() == Ordering::Less) != (den.cmp0() == Ordering::Less);
        let (q, r) = num.div_rem(den.clone());

        if r.cmp0() == Ordering::Equal {
            return q;
        }

        let away_from_zero = match self {
            Rounding::Down => false,
            Rounding::Up => true,
            Rounding::Floor => negative,
            Rounding::Ceiling => !negative,
            Rounding::HalfUp | Rounding::HalfDown | Rounding::HalfEven => {
                match (r * 2u32).cmp_abs(&den) {
                    Ordering::Less => false,
                    Ordering::Greater => true,
                    Ordering::Equal => match self {
                        Rounding::HalfUp => true,
                        Rounding::HalfDown => false,
                        _ => q.is_odd(),
                    },
                }
            }
        };

        trace!("Inexact quotient, rounding {:?}", self);

        match (away_from_zero, negative) {
            (false, _) => q,
            (true, false) => q + 1u32,
            (true, true) => q - 1u32,
        }
    }
}

/// The number of fractional digits and the rounding mode of a division.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DivisionPolicy {
    pub scale: i64,
    pub rounding: Rounding,
}

impl DivisionPolicy {
    pub const DEFAULT_SCALE: i64 = 64;

    pub const fn new(scale: i64, rounding: Rounding) -> DivisionPolicy {
        DivisionPolicy { scale, rounding }
    }
}

impl Default for DivisionPolicy {
    fn default() -> Self {
        DivisionPolicy::new(DivisionPolicy::DEFAULT_SCALE, Rounding::HalfEven)
    }
}

/// The field of arbitrary-precision decimal numbers.
///
/// There is exactly one instance, obtained through [RealField::get]. It is created on first
/// access and lives for the remainder of the process. Its identities are stored inside it,
/// so that the references returned by [Field::zero] and [Field::one] are always the same.
pub struct RealField {
    zero: Real,
    one: Real,
}

impl RealField {
    fn new() -> RealField {
        debug!("Initializing the real field");
        RealField {
            zero: Real::from(0),
            one: Real::from(1),
        }
    }

    /// Get the unique instance of the field.
    #[inline]
    pub fn get() -> &'static RealField {
        &REAL_FIELD
    }
}

impl Debug for RealField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("RealField")
    }
}

impl Display for RealField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ℝ")
    }
}

impl Field for RealField {
    type Element = Real;

    #[inline]
    fn zero(&self) -> &Real {
        &self.zero
    }

    #[inline]
    fn one(&self) -> &Real {
        &self.one
    }
}

impl Serialize for RealField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit_struct("RealField")
    }
}

struct RealFieldVisitor;

impl<'de> de::Visitor<'de> for RealFieldVisitor {
    type Value = &'static RealField;

    fn expecting(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("unit struct RealField")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RealField::get())
    }
}

/// A persisted field resolves to the unique instance.
impl<'de> Deserialize<'de> for &'static RealField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_unit_struct("RealField", RealFieldVisitor)
    }
}

/// An arbitrary-precision decimal number `unscaled * 10^-scale`.
///
/// Equality, ordering and hashing compare numeric values, so `1.10 == 1.1`.
#[derive(Clone)]
pub struct Real {
    unscaled: Integer,
    scale: i64,
}

impl Real {
    /// The largest absolute value of the scale.
    pub const MAX_SCALE: i64 = 1_000_000;

    /// Create the number `unscaled * 10^-scale`.
    pub fn new<I: Into<Integer>>(unscaled: I, scale: i64) -> Result<Real, FieldError> {
        Ok(Real {
            unscaled: unscaled.into(),
            scale: bounded_scale(scale as i128)?,
        })
    }

    pub fn unscaled(&self) -> &Integer {
        &self.unscaled
    }

    pub fn scale(&self) -> i64 {
        self.scale
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.unscaled.cmp0() == Ordering::Equal
    }

    pub fn is_one(&self) -> bool {
        self == RealField::get().one()
    }

    /// Return -1, 0 or 1 depending on the sign.
    pub fn signum(&self) -> i32 {
        match self.unscaled.cmp0() {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    pub fn abs(&self) -> Real {
        Real {
            unscaled: self.unscaled.clone().abs(),
            scale: self.scale,
        }
    }

    pub fn pow(&self, e: u32) -> Result<Real, FieldError> {
        let scale = bounded_scale(self.scale as i128 * e as i128)?;
        Ok(Real {
            unscaled: self.unscaled.clone().pow(e),
            scale,
        })
    }

    /// Bounds on `log10 |self|` for a nonzero number.
    fn log10_bounds(&self) -> (f64, f64) {
        let bits = self.unscaled.significant_bits() as f64;
        let scale = self.scale as f64;
        ((bits - 1.) * LOG10_2 - scale, bits * LOG10_2 - scale)
    }

    /// Bring both numbers to the larger of the two scales.
    fn aligned(&self, other: &Real) -> (Integer, Integer, i64) {
        let shift = self.scale.abs_diff(other.scale);
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => (self.unscaled.clone(), other.unscaled.clone(), self.scale),
            Ordering::Less => (
                self.unscaled.clone() * pow10(shift),
                other.unscaled.clone(),
                other.scale,
            ),
            Ordering::Greater => (
                self.unscaled.clone(),
                other.unscaled.clone() * pow10(shift),
                self.scale,
            ),
        }
    }

    fn plus(&self, other: &Real) -> Real {
        let (a, b, scale) = self.aligned(other);
        Real {
            unscaled: a + b,
            scale,
        }
    }

    fn minus(&self, other: &Real) -> Real {
        let (a, b, scale) = self.aligned(other);
        Real {
            unscaled: a - b,
            scale,
        }
    }

    fn times(&self, other: &Real) -> Result<Real, FieldError> {
        let scale = bounded_scale(self.scale as i128 + other.scale as i128)?;
        Ok(Real {
            unscaled: Integer::from(&self.unscaled * &other.unscaled),
            scale,
        })
    }

    fn negated(&self) -> Real {
        Real {
            unscaled: -self.unscaled.clone(),
            scale: self.scale,
        }
    }

    /// Compute `self / a` with `policy.scale` fractional digits, rounded with `policy.rounding`.
    pub fn divide_with(&self, a: &Real, policy: DivisionPolicy) -> Result<Real, FieldError> {
        if a.is_zero() {
            return Err(FieldError::DivisionByZero);
        }
        let scale = bounded_scale(policy.scale as i128)?;

        // self / a * 10^s = self.u * 10^(a.scale + s - self.scale) / a.u
        let shift = a.scale as i128 + scale as i128 - self.scale as i128;
        let (num, den) = if shift >= 0 {
            (self.unscaled.clone() * pow10(shift as u64), a.unscaled.clone())
        } else {
            (
                self.unscaled.clone(),
                a.unscaled.clone() * pow10(shift.unsigned_abs() as u64),
            )
        };

        Ok(Real {
            unscaled: policy.rounding.quotient(num, den),
            scale,
        })
    }

    /// Rescale to `scale` fractional digits. Increasing the scale is exact,
    /// decreasing it rounds with `rounding`.
    pub fn with_scale(&self, scale: i64, rounding: Rounding) -> Result<Real, FieldError> {
        let scale = bounded_scale(scale as i128)?;
        let shift = self.scale.abs_diff(scale);
        let unscaled = if scale >= self.scale {
            self.unscaled.clone() * pow10(shift)
        } else {
            rounding.quotient(self.unscaled.clone(), pow10(shift))
        };

        Ok(Real { unscaled, scale })
    }

    /// Remove trailing zeros from the unscaled value, as long as the scale
    /// stays within bounds. Zero gets scale 0.
    pub fn normalize(&self) -> Real {
        if self.is_zero() {
            return Real::from(0);
        }

        let mut unscaled = self.unscaled.clone();
        let zeros = unscaled.remove_factor_mut(&Integer::from(10)) as i64;
        let scale = self.scale - zeros;
        if scale < -Real::MAX_SCALE {
            unscaled *= pow10((-Real::MAX_SCALE - scale) as u64);
            return Real {
                unscaled,
                scale: -Real::MAX_SCALE,
            };
        }

        Real { unscaled, scale }
    }

    /// Convert to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        if self.scale <= 0 {
            Integer::from(&self.unscaled * &pow10(self.scale.unsigned_abs())).to_f64()
        } else {
            Rational::from((self.unscaled.clone(), pow10(self.scale as u64))).to_f64()
        }
    }
}

impl From<i64> for Real {
    fn from(value: i64) -> Self {
        Real::from(Integer::from(value))
    }
}

impl From<i32> for Real {
    fn from(value: i32) -> Self {
        Real::from(Integer::from(value))
    }
}

impl From<Integer> for Real {
    fn from(value: Integer) -> Self {
        Real {
            unscaled: value,
            scale: 0,
        }
    }
}

/// Convert the exact binary value of a finite `f64`.
impl TryFrom<f64> for Real {
    type Error = FieldError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let r = Rational::from_f64(value).ok_or_else(|| {
            FieldError::InvalidArgument(format!("{} is not a finite number", value))
        })?;

        // the denominator is a power of two: n / 2^k = n * 5^k / 10^k
        let (numer, denom) = r.into_numer_denom();
        let k = denom.significant_bits() - 1;
        Ok(Real {
            unscaled: numer * Integer::from(5).pow(k),
            scale: k as i64,
        })
    }
}

impl FromStr for Real {
    type Err = FieldError;

    /// Parse a decimal number such as `-12.5e-3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FieldError::InvalidArgument(format!("cannot parse '{}' as a decimal", s));

        let s_trimmed = s.trim();
        let (mantissa, exponent) = match s_trimmed.find(['e', 'E']) {
            Some(p) => {
                let e = s_trimmed[p + 1..].parse::<i64>().map_err(|_| invalid())?;
                (&s_trimmed[..p], e)
            }
            None => (s_trimmed, 0),
        };

        let (sign, digits) = match mantissa.as_bytes().first() {
            Some(&b'-') => ("-", &mantissa[1..]),
            Some(&b'+') => ("", &mantissa[1..]),
            _ => ("", mantissa),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };

        if (int_part.is_empty() && frac_part.is_empty())
            || !int_part
                .bytes()
                .chain(frac_part.bytes())
                .all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let unscaled = Integer::from_str_radix(&format!("{}{}{}", sign, int_part, frac_part), 10)
            .map_err(|_| invalid())?;

        Ok(Real {
            unscaled,
            scale: bounded_scale(frac_part.len() as i128 - exponent as i128)?,
        })
    }
}

impl Display for Real {
    /// Print as a plain decimal, keeping the scale.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.scale <= 0 {
            return write!(
                f,
                "{}",
                Integer::from(&self.unscaled * &pow10(self.scale.unsigned_abs()))
            );
        }

        let scale = self.scale as usize;
        let mut digits = self.unscaled.to_string_radix(10);
        if self.unscaled.cmp0() == Ordering::Less {
            digits.remove(0);
            f.write_str("-")?;
        }

        if digits.len() <= scale {
            digits.insert_str(0, &"0".repeat(scale + 1 - digits.len()));
        }

        let (i, d) = digits.split_at(digits.len() - scale);
        write!(f, "{}.{}", i, d)
    }
}

impl Debug for Real {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Real {}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Real {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.signum().cmp(&other.signum()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        if self.scale == other.scale {
            return self.unscaled.cmp(&other.unscaled);
        }

        if self.is_zero() {
            return Ordering::Equal;
        }

        // only align when the magnitudes are close
        let (lo_a, hi_a) = self.log10_bounds();
        let (lo_b, hi_b) = other.log10_bounds();
        let magnitude = if hi_a + 1. < lo_b {
            Ordering::Less
        } else if hi_b + 1. < lo_a {
            Ordering::Greater
        } else {
            let (a, b, _) = self.aligned(other);
            return a.cmp(&b);
        };

        if self.signum() < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl Hash for Real {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalize();
        n.unscaled.hash(state);
        n.scale.hash(state);
    }
}

impl Serialize for Real {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Real {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl FieldElement for Real {
    type Field = RealField;

    #[inline]
    fn field(&self) -> &RealField {
        RealField::get()
    }

    fn add(&self, a: &Self) -> Result<Self, FieldError> {
        check_same_field(self, a)?;
        Ok(self.plus(a))
    }

    fn subtract(&self, a: &Self) -> Result<Self, FieldError> {
        check_same_field(self, a)?;
        Ok(self.minus(a))
    }

    fn negate(&self) -> Self {
        self.negated()
    }

    fn multiply_int(&self, n: i64) -> Self {
        if n == 0 {
            return self.field().zero().clone();
        }

        Real {
            unscaled: self.unscaled.clone() * n,
            scale: self.scale,
        }
    }

    fn multiply(&self, a: &Self) -> Result<Self, FieldError> {
        check_same_field(self, a)?;
        self.times(a)
    }

    fn divide(&self, a: &Self) -> Result<Self, FieldError> {
        check_same_field(self, a)?;
        self.divide_with(a, DivisionPolicy::default())
    }

    fn reciprocal(&self) -> Result<Self, FieldError> {
        self.field().one().divide(self)
    }

    fn is_zero(&self) -> bool {
        Real::is_zero(self)
    }
}

impl Neg for Real {
    type Output = Real;

    fn neg(self) -> Real {
        self.negated()
    }
}

impl Add<&Real> for Real {
    type Output = Real;

    fn add(self, rhs: &Real) -> Real {
        self.plus(rhs)
    }
}

impl Add<Real> for Real {
    type Output = Real;

    fn add(self, rhs: Real) -> Real {
        self.plus(&rhs)
    }
}

impl Sub<&Real> for Real {
    type Output = Real;

    fn sub(self, rhs: &Real) -> Real {
        self.minus(rhs)
    }
}

impl Sub<Real> for Real {
    type Output = Real;

    fn sub(self, rhs: Real) -> Real {
        self.minus(&rhs)
    }
}
