use std::fmt::{Debug, Formatter};

use fieldkit::build;
use fieldkit::domains::{check_same_field, real::RealField, Field, FieldElement, FieldError};
use once_cell::sync::OnceCell;

/// The integers modulo a prime, with one instance per call to [ModField::new].
struct ModField {
    p: u64,
    zero: OnceCell<Mod>,
    one: OnceCell<Mod>,
}

impl ModField {
    fn new(p: u64) -> &'static ModField {
        let field: &'static ModField = Box::leak(Box::new(ModField {
            p,
            zero: OnceCell::new(),
            one: OnceCell::new(),
        }));
        let _ = field.zero.set(field.element(0));
        let _ = field.one.set(field.element(1));
        field
    }

    fn element(&'static self, value: u64) -> Mod {
        Mod {
            value: value % self.p,
            field: self,
        }
    }
}

impl Debug for ModField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z_{}", self.p)
    }
}

impl Field for ModField {
    type Element = Mod;

    fn zero(&self) -> &Mod {
        self.zero.get().unwrap()
    }

    fn one(&self) -> &Mod {
        self.one.get().unwrap()
    }
}

#[derive(Clone)]
struct Mod {
    value: u64,
    field: &'static ModField,
}

impl Mod {
    fn with_value(&self, value: u64) -> Mod {
        self.field.element(value)
    }

    fn pow(&self, mut e: u64) -> Mod {
        let p = self.field.p;
        let (mut base, mut acc) = (self.value, 1);
        while e > 0 {
            if e & 1 == 1 {
                acc = acc * base % p;
            }
            base = base * base % p;
            e >>= 1;
        }
        self.with_value(acc)
    }
}

impl PartialEq for Mod {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && std::ptr::eq(self.field, other.field)
    }
}

impl Debug for Mod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} mod {}", self.value, self.field.p)
    }
}

impl FieldElement for Mod {
    type Field = ModField;

    fn field(&self) -> &ModField {
        self.field
    }

    fn add(&self, a: &Self) -> Result<Self, FieldError> {
        check_same_field(self, a)?;
        Ok(self.with_value(self.value + a.value))
    }

    fn subtract(&self, a: &Self) -> Result<Self, FieldError> {
        check_same_field(self, a)?;
        Ok(self.with_value(self.value + self.field.p - a.value))
    }

    fn negate(&self) -> Self {
        self.with_value(self.field.p - self.value)
    }

    fn multiply_int(&self, n: i64) -> Self {
        let p = self.field.p as i64;
        self.with_value((self.value as i64 * n.rem_euclid(p)) as u64)
    }

    fn multiply(&self, a: &Self) -> Result<Self, FieldError> {
        check_same_field(self, a)?;
        Ok(self.with_value(self.value * a.value))
    }

    fn divide(&self, a: &Self) -> Result<Self, FieldError> {
        check_same_field(self, a)?;
        self.multiply(&a.reciprocal()?)
    }

    fn reciprocal(&self) -> Result<Self, FieldError> {
        if self.value == 0 {
            return Err(FieldError::DivisionByZero);
        }
        Ok(self.pow(self.field.p - 2))
    }
}

#[test]
fn operands_from_another_instance() {
    let f = ModField::new(7);
    let g = ModField::new(7);
    let a = f.element(3);
    let b = g.element(3);

    assert!(!a.same_field(&b));
    assert_ne!(a, b);
    assert!(matches!(a.add(&b), Err(FieldError::InvalidArgument(_))));
    assert!(matches!(a.subtract(&b), Err(FieldError::InvalidArgument(_))));
    assert!(matches!(a.multiply(&b), Err(FieldError::InvalidArgument(_))));
    assert!(matches!(a.divide(&b), Err(FieldError::InvalidArgument(_))));
    assert!(matches!(
        b.divide(g.zero()),
        Err(FieldError::DivisionByZero)
    ));
    assert!(matches!(
        b.divide(f.zero()),
        Err(FieldError::InvalidArgument(_))
    ));

    // unary operations stay in their own instance
    assert!(std::ptr::eq(a.negate().field(), f));
    assert!(std::ptr::eq(b.multiply_int(-2).field(), g));
}

#[test]
fn arithmetic_within_an_instance() {
    let f = ModField::new(7);
    let a = f.element(3);
    let b = f.element(5);

    assert_eq!(a.add(&b).unwrap(), f.element(1));
    assert_eq!(a.subtract(&b).unwrap(), f.element(5));
    assert_eq!(a.multiply(&b).unwrap(), f.element(1));
    assert_eq!(a.divide(&b).unwrap().multiply(&b).unwrap(), a);
    assert_eq!(a.negate(), f.element(4));
    assert_eq!(a.multiply_int(-1), a.negate());
    assert_eq!(a.multiply_int(0), *f.zero());
    assert!(a.multiply(&a.reciprocal().unwrap()).unwrap().is_one());
    assert!(matches!(
        f.zero().reciprocal(),
        Err(FieldError::DivisionByZero)
    ));
    assert!(std::ptr::eq(f.zero(), f.zero()));
}

#[test]
fn arrays_of_another_field() {
    let f = ModField::new(11);
    let v = build::array(f, 4);
    assert!(v.iter().all(|x| x.is_zero() && std::ptr::eq(x.field(), f)));
    assert!(f.element_type().is::<Mod>());
    assert_ne!(f.element_type(), RealField::get().element_type());

    let m = build::array_2d(f, 2, 3);
    assert!(m.iter().flatten().all(|x| x == f.zero()));
}
