use num_traits::Float;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

/// A point in an N-dimensional real vector space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RealVectorState<F: Float, const N: usize> {
    values: [F; N],
}

impl<F: Float, const N: usize> RealVectorState<F, N> {
    pub fn new(values: [F; N]) -> Self {
        Self { values }
    }

    pub fn zeros() -> Self {
        Self {
            values: [F::zero(); N],
        }
    }

    pub fn values(&self) -> &[F; N] {
        &self.values
    }

    pub fn dot(&self, other: &Self) -> F {
        self.values
            .iter()
            .zip(other.values.iter())
            .fold(F::zero(), |acc, (&a, &b)| acc + a * b)
    }

    pub fn norm(&self) -> F {
        self.dot(self).sqrt()
    }

    pub fn euclidean_distance_squared(&self, other: &Self) -> F {
        let diff = *self - *other;
        diff.dot(&diff)
    }

    pub fn euclidean_distance(&self, other: &Self) -> F {
        self.euclidean_distance_squared(other).sqrt()
    }

    /// Linear interpolation, `t = 0` is `self` and `t = 1` is `other`.
    pub fn lerp(&self, other: &Self, t: F) -> Self {
        *self + (*other - *self) * t
    }
}

impl<F: Float, const N: usize> Index<usize> for RealVectorState<F, N> {
    type Output = F;

    fn index(&self, index: usize) -> &F {
        &self.values[index]
    }
}

impl<F: Float, const N: usize> IndexMut<usize> for RealVectorState<F, N> {
    fn index_mut(&mut self, index: usize) -> &mut F {
        &mut self.values[index]
    }
}

impl<F: Float, const N: usize> Add for RealVectorState<F, N> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (a, b) in self.values.iter_mut().zip(rhs.values.iter()) {
            *a = *a + *b;
        }
        self
    }
}

impl<F: Float, const N: usize> Add<&RealVectorState<F, N>> for &RealVectorState<F, N> {
    type Output = RealVectorState<F, N>;

    fn add(self, rhs: &RealVectorState<F, N>) -> RealVectorState<F, N> {
        *self + *rhs
    }
}

impl<F: Float, const N: usize> Sub for RealVectorState<F, N> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for (a, b) in self.values.iter_mut().zip(rhs.values.iter()) {
            *a = *a - *b;
        }
        self
    }
}

impl<F: Float, const N: usize> Sub<&RealVectorState<F, N>> for &RealVectorState<F, N> {
    type Output = RealVectorState<F, N>;

    fn sub(self, rhs: &RealVectorState<F, N>) -> RealVectorState<F, N> {
        *self - *rhs
    }
}

impl<F: Float, const N: usize> Mul<F> for RealVectorState<F, N> {
    type Output = Self;

    fn mul(mut self, rhs: F) -> Self {
        for a in self.values.iter_mut() {
            *a = *a * rhs;
        }
        self
    }
}

impl<F: Float, const N: usize> Div<F> for RealVectorState<F, N> {
    type Output = Self;

    fn div(mut self, rhs: F) -> Self {
        for a in self.values.iter_mut() {
            *a = *a / rhs;
        }
        self
    }
}

// serde only derives arrays up to a fixed length, so states are written as tuples by hand.
impl<F: Float + Serialize, const N: usize> Serialize for RealVectorState<F, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(N)?;
        for value in &self.values {
            tuple.serialize_element(value)?;
        }
        tuple.end()
    }
}

struct StateVisitor<F, const N: usize>(PhantomData<F>);

impl<'de, F: Float + Deserialize<'de>, const N: usize> Visitor<'de> for StateVisitor<F, N> {
    type Value = RealVectorState<F, N>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an array of {} numbers", N)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = [F::zero(); N];
        for (i, value) in values.iter_mut().enumerate() {
            *value = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        Ok(RealVectorState::new(values))
    }
}

impl<'de, F: Float + Deserialize<'de>, const N: usize> Deserialize<'de> for RealVectorState<F, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_tuple(N, StateVisitor(PhantomData))
    }
}
