//! Allocation of zero-filled storage for the elements of a [Field].
//!
//! A generic algorithm only holds a field and does not know the concrete element type.
//! The functions in this module use the field to create vectors and matrices of the right
//! element type, filled with [Field::zero]:
//!
//! ```
//! use fieldkit::build::{self, Shape};
//! use fieldkit::domains::{real::RealField, Field};
//!
//! let field = RealField::get();
//! let v = build::array(field, 5);
//! assert!(v.iter().all(|x| x == field.zero()));
//!
//! // a lower-triangular matrix
//! let mut t = build::build(field, Shape::from_dimensions(3, -1).unwrap())
//!     .into_ragged()
//!     .unwrap();
//! for i in 0..3 {
//!     t.commit_row(i, i + 1).unwrap();
//! }
//! let rows = t.into_rows().unwrap();
//! assert_eq!(rows[2].len(), 3);
//! ```

use tracing::trace;

use crate::domains::{ElementType, Field, FieldElement, FieldError};

/// Create a vector of `length` zeros of `field`.
pub fn array<F: Field>(field: &F, length: usize) -> Vec<F::Element> {
    field.make_array(length)
}

/// Create a `rows x columns` matrix of zeros of `field`.
pub fn array_2d<F: Field>(field: &F, rows: usize, columns: usize) -> Vec<Vec<F::Element>> {
    (0..rows).map(|_| field.make_array(columns)).collect()
}

/// Create `rows` rows whose lengths are not yet fixed.
pub fn ragged<F: Field>(field: &F, rows: usize) -> RaggedArray<F::Element> {
    RaggedArray {
        zero: field.zero().clone(),
        rows: (0..rows).map(|_| None).collect(),
    }
}

/// The shape of an array to [build].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Vector(usize),
    Fixed { rows: usize, columns: usize },
    /// Rows whose lengths are chosen later, one by one.
    Ragged { rows: usize },
}

impl Shape {
    /// A vector shape. Fails for a negative `length`.
    pub fn vector(length: i64) -> Result<Shape, FieldError> {
        usize::try_from(length)
            .map(Shape::Vector)
            .map_err(|_| FieldError::InvalidDimension(format!("length = {}", length)))
    }

    /// A two-dimensional shape. A negative number of `columns` leaves the
    /// rows uncommitted, a negative number of `rows` is an error.
    pub fn from_dimensions(rows: i64, columns: i64) -> Result<Shape, FieldError> {
        let rows = usize::try_from(rows)
            .map_err(|_| FieldError::InvalidDimension(format!("rows = {}", rows)))?;

        if columns < 0 {
            return Ok(Shape::Ragged { rows });
        }

        let columns = usize::try_from(columns)
            .map_err(|_| FieldError::InvalidDimension(format!("columns = {}", columns)))?;
        Ok(Shape::Fixed { rows, columns })
    }
}

/// Build a zero-filled array of the given shape.
pub fn build<F: Field>(field: &F, shape: Shape) -> FieldArray<F::Element> {
    match shape {
        Shape::Vector(length) => FieldArray::Vector(array(field, length)),
        Shape::Fixed { rows, columns } => FieldArray::Fixed {
            columns,
            rows: array_2d(field, rows, columns),
        },
        Shape::Ragged { rows } => FieldArray::Ragged(ragged(field, rows)),
    }
}

/// An array created by [build].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldArray<E: FieldElement> {
    Vector(Vec<E>),
    /// Rows of equal length. The column count is kept for arrays without rows.
    Fixed { columns: usize, rows: Vec<Vec<E>> },
    Ragged(RaggedArray<E>),
}

impl<E: FieldElement> FieldArray<E> {
    pub fn element_type(&self) -> ElementType {
        ElementType::of::<E>()
    }

    pub fn shape(&self) -> Shape {
        match self {
            FieldArray::Vector(v) => Shape::Vector(v.len()),
            FieldArray::Fixed { columns, rows } => Shape::Fixed {
                rows: rows.len(),
                columns: *columns,
            },
            FieldArray::Ragged(r) => Shape::Ragged { rows: r.rows() },
        }
    }

    pub fn into_vector(self) -> Option<Vec<E>> {
        match self {
            FieldArray::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_matrix(self) -> Option<Vec<Vec<E>>> {
        match self {
            FieldArray::Fixed { rows, .. } => Some(rows),
            _ => None,
        }
    }

    pub fn into_ragged(self) -> Option<RaggedArray<E>> {
        match self {
            FieldArray::Ragged(r) => Some(r),
            _ => None,
        }
    }
}

/// A two-dimensional array whose row lengths are fixed one row at a time,
/// for example to build triangular matrices.
#[derive(Clone, Debug, PartialEq)]
pub struct RaggedArray<E: FieldElement> {
    zero: E,
    rows: Vec<Option<Vec<E>>>,
}

impl<E: FieldElement> RaggedArray<E> {
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn element_type(&self) -> ElementType {
        ElementType::of::<E>()
    }

    /// Get row `i`, if it has been committed.
    pub fn row(&self, i: usize) -> Option<&[E]> {
        self.rows.get(i)?.as_deref()
    }

    pub fn row_mut(&mut self, i: usize) -> Option<&mut [E]> {
        self.rows.get_mut(i)?.as_deref_mut()
    }

    pub fn is_committed(&self, i: usize) -> bool {
        matches!(self.rows.get(i), Some(Some(_)))
    }

    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(|r| r.is_some())
    }

    /// Allocate row `i` with `length` zeros. A row can only be committed once.
    pub fn commit_row(&mut self, i: usize, length: usize) -> Result<&mut [E], FieldError> {
        let n_rows = self.rows.len();
        let slot = self.rows.get_mut(i).ok_or_else(|| {
            FieldError::InvalidDimension(format!("row {} out of range for {} rows", i, n_rows))
        })?;

        if slot.is_some() {
            return Err(FieldError::InvalidDimension(format!(
                "row {} is already committed",
                i
            )));
        }

        trace!("Committing row {} with {} columns", i, length);
        Ok(slot.insert(vec![self.zero.clone(); length]))
    }

    /// Convert into a vector of rows. Fails if a row has not been committed.
    pub fn into_rows(self) -> Result<Vec<Vec<E>>, FieldError> {
        self.rows
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.ok_or_else(|| FieldError::InvalidDimension(format!("row {} is not committed", i)))
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::any::Any;

    use crate::domains::{
        real::{Real, RealField},
        Field, FieldError,
    };

    use super::{array, array_2d, build, ragged, FieldArray, Shape};

    #[test]
    fn vector() {
        let field = RealField::get();
        let v = array(field, 5);
        assert_eq!(v.len(), 5);
        assert!(v.iter().all(|x| x == field.zero()));

        let a = build(field, Shape::Vector(5));
        assert_eq!(a.element_type(), field.element_type());
        assert_eq!(a.shape(), Shape::Vector(5));

        let empty = array(field, 0);
        assert!(empty.is_empty());
        let boxed: Box<dyn Any> = Box::new(empty);
        assert!(boxed.downcast_ref::<Vec<Real>>().is_some());
    }

    #[test]
    fn matrix() {
        let field = RealField::get();
        let m = array_2d(field, 3, 4);
        assert_eq!(m.len(), 3);
        assert!(m.iter().all(|r| r.len() == 4));
        assert!(m.iter().flatten().all(|x| x == field.zero()));

        assert_eq!(array_2d(field, 2, 0), vec![Vec::<Real>::new(), vec![]]);
        assert!(array_2d(field, 0, 7).is_empty());
    }

    #[test]
    fn shapes() {
        assert_eq!(Shape::vector(3), Ok(Shape::Vector(3)));
        assert!(matches!(
            Shape::vector(-1),
            Err(FieldError::InvalidDimension(_))
        ));
        assert_eq!(
            Shape::from_dimensions(3, 4),
            Ok(Shape::Fixed {
                rows: 3,
                columns: 4
            })
        );
        assert_eq!(
            Shape::from_dimensions(3, -1),
            Ok(Shape::Ragged { rows: 3 })
        );
        assert!(matches!(
            Shape::from_dimensions(-2, 4),
            Err(FieldError::InvalidDimension(_))
        ));
        assert!(matches!(
            Shape::from_dimensions(-2, -1),
            Err(FieldError::InvalidDimension(_))
        ));
    }

    #[test]
    fn ragged_rows() {
        let field = RealField::get();
        let mut t = ragged(field, 3);
        assert_eq!(t.rows(), 3);
        assert!(!t.is_complete());
        assert_eq!(t.row(0), None);

        t.commit_row(0, 1).unwrap();
        t.commit_row(2, 3).unwrap()[1] = Real::from(7);
        assert!(t.is_committed(2));
        assert!(matches!(
            t.commit_row(0, 2),
            Err(FieldError::InvalidDimension(_))
        ));
        assert!(matches!(
            t.commit_row(3, 2),
            Err(FieldError::InvalidDimension(_))
        ));
        assert!(t.clone().into_rows().is_err());

        t.commit_row(1, 5).unwrap();
        assert!(t.is_complete());
        if let Some(r) = t.row_mut(1) {
            r[4] = Real::from(2);
        }

        let rows = t.into_rows().unwrap();
        assert_eq!(
            rows.iter().map(|r| r.len()).collect::<Vec<_>>(),
            vec![1, 5, 3]
        );
        assert_eq!(rows[2][1], Real::from(7));
        assert_eq!(rows[1][4], Real::from(2));
        assert!(rows[1][..4].iter().all(|x| x == field.zero()));
    }

    #[test]
    fn build_shapes() {
        let field = RealField::get();
        match build(field, Shape::from_dimensions(2, 3).unwrap()) {
            FieldArray::Fixed { columns, rows } => {
                assert_eq!(columns, 3);
                assert_eq!(rows, array_2d(field, 2, 3));
            }
            a => panic!("Unexpected array {:?}", a),
        }

        let empty = build(field, Shape::from_dimensions(0, 5).unwrap());
        assert_eq!(
            empty.shape(),
            Shape::Fixed {
                rows: 0,
                columns: 5
            }
        );
        assert_eq!(empty.into_matrix(), Some(vec![]));

        let r = build(field, Shape::Ragged { rows: 4 });
        assert_eq!(r.element_type(), field.element_type());
        assert_eq!(r.shape(), Shape::Ragged { rows: 4 });
        assert!(r.clone().into_matrix().is_none());
        assert_eq!(r.into_ragged().unwrap().rows(), 4);
    }
}
