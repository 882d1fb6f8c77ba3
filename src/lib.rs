//! Generic field arithmetic.
//!
//! Numerical algorithms such as linear solvers or polynomial evaluation can be written once
//! against the [Field](domains::Field) and [FieldElement](domains::FieldElement) traits and
//! reused for any number type. The crate provides the arbitrary-precision decimal field
//! [RealField](domains::real::RealField) and the [build] module to allocate zero-filled
//! storage for the elements of any field.
//!
//! For example:
//!
//! ```
//! use fieldkit::{build, domains::{real::RealField, Field, FieldElement}};
//!
//! fn sum<F: Field>(field: &F, values: &[F::Element]) -> F::Element {
//!     let mut acc = field.zero().clone();
//!     for v in values {
//!         acc = acc.add(v).unwrap();
//!     }
//!     acc
//! }
//!
//! let field = RealField::get();
//! let mut v = build::array(field, 3);
//! v[0] = "1.5".parse().unwrap();
//! v[2] = "0.25".parse().unwrap();
//! assert_eq!(sum(field, &v), "1.75".parse().unwrap());
//! ```

pub mod build;
pub mod domains;
