//! Defines the core algebraic traits.
//!
//! The core trait is [Field], which describes a set with addition, subtraction,
//! multiplication and division (except by zero). Each field has an associated element type,
//! that should not be confused with the field type itself. For example:
//! - The field of arbitrary-precision decimals [RealField](real::RealField) has elements of type [Real](real::Real).
//!
//! Contrary to a field descriptor, the elements implement the arithmetic themselves through
//! [FieldElement], so that an algorithm that holds a value never needs to know the concrete
//! type behind it. The field is only consulted for its identities and to allocate storage, see
//! [build](crate::build).
pub mod real;

use std::any::{type_name, TypeId};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Errors that can occur when operating on field elements or
/// when allocating storage for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// An operand could not be used, for example because it belongs to another field
    /// or because it could not be parsed.
    InvalidArgument(String),
    /// Division by, or inversion of, the additive identity.
    DivisionByZero,
    /// A negative or otherwise unusable array dimension.
    InvalidDimension(String),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            FieldError::DivisionByZero => write!(f, "Division by zero"),
            FieldError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
        }
    }
}

impl std::error::Error for FieldError {}

/// A runtime descriptor of the element type of a field.
///
/// Two descriptors compare equal iff they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct ElementType {
    id: TypeId,
    name: &'static str,
}

impl ElementType {
    pub fn of<T: 'static>() -> ElementType {
        ElementType {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check if this descriptor describes the type `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ElementType {}

impl Hash for ElementType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// A field is a set that supports addition, subtraction, multiplication and division
/// by every element except zero.
///
/// The field itself carries no mutable state: it is a descriptor of the element type
/// and a cache of the two identities. The identities are borrowed from the field, so
/// that repeated calls to [Field::zero] and [Field::one] return the same object.
pub trait Field: Debug + Send + Sync + 'static {
    /// The element of a field. For example, the elements of [RealField](real::RealField) are [Real](real::Real).
    type Element: FieldElement<Field = Self>;

    /// The additive identity.
    fn zero(&self) -> &Self::Element;
    /// The multiplicative identity.
    fn one(&self) -> &Self::Element;

    /// The runtime descriptor of [Field::Element].
    fn element_type(&self) -> ElementType {
        ElementType::of::<Self::Element>()
    }

    /// Create `length` copies of the additive identity.
    fn make_array(&self, length: usize) -> Vec<Self::Element> {
        vec![self.zero().clone(); length]
    }
}

/// An element of a [Field].
///
/// Operations never mutate the receiver. Binary operations fail with
/// [FieldError::InvalidArgument] if the operand belongs to a different field instance,
/// and division fails with [FieldError::DivisionByZero] if the divisor is zero.
///
/// Every implementation must satisfy, for all `x` and `a`:
/// - `x + 0 = x` and `x * 1 = x`
/// - `x - a = x + (-a)`
/// - `x / a = x * a^-1` for `a != 0`
pub trait FieldElement: Clone + PartialEq + Debug + Send + Sync + 'static {
    type Field: Field<Element = Self>;

    /// Get the field to which the element belongs.
    fn field(&self) -> &Self::Field;

    /// Check if `other` belongs to the same field instance as `self`.
    fn same_field(&self, other: &Self) -> bool {
        std::ptr::eq(self.field(), other.field())
    }

    /// Compute `self + a`.
    fn add(&self, a: &Self) -> Result<Self, FieldError>;
    /// Compute `self - a`.
    fn subtract(&self, a: &Self) -> Result<Self, FieldError>;
    /// Compute `-self`.
    fn negate(&self) -> Self;

    /// Compute `n * self`, i.e., `self` added to itself `n` times.
    /// For `n = 0` the result is zero and for negative `n` it is
    /// the negation of `|n| * self`.
    fn multiply_int(&self, n: i64) -> Self;

    /// Compute `self * a`.
    fn multiply(&self, a: &Self) -> Result<Self, FieldError>;
    /// Compute `self / a`.
    fn divide(&self, a: &Self) -> Result<Self, FieldError>;
    /// Compute `1 / self`.
    fn reciprocal(&self) -> Result<Self, FieldError>;

    fn is_zero(&self) -> bool {
        self == self.field().zero()
    }

    fn is_one(&self) -> bool {
        self == self.field().one()
    }
}

/// Return an error if `a` and `b` do not belong to the same field instance.
pub fn check_same_field<E: FieldElement>(a: &E, b: &E) -> Result<(), FieldError> {
    if a.same_field(b) {
        Ok(())
    } else {
        Err(FieldError::InvalidArgument(format!(
            "operand of type {} belongs to a different field",
            type_name::<E>()
        )))
    }
}
