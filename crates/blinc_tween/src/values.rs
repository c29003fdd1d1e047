//! Tweenable value types
//!
//! A property driver treats its value type opaquely. Everything it needs to
//! know about `T` comes from a [`ValueOps`] table: an unclamped `lerp` for
//! absolute interpolation, and optional `add`/`sub`/`scale` operators that
//! only the relative and incremental modes use.

use std::ops::{Add, Mul, Sub};

/// Unclamped linear interpolation
pub type LerpFn<T> = fn(&T, &T, f32) -> T;
/// Component-wise binary operator
pub type BinaryFn<T> = fn(&T, &T) -> T;
/// Multiply a value by a scalar
pub type ScaleFn<T> = fn(&T, f32) -> T;

/// Operator table used by a property driver to interpolate `T`
///
/// Plain function pointers, never closures, so a pooled driver cannot carry
/// captured state from one rental into the next.
pub struct ValueOps<T> {
    pub lerp: LerpFn<T>,
    pub add: Option<BinaryFn<T>>,
    pub sub: Option<BinaryFn<T>>,
    pub scale: Option<ScaleFn<T>>,
}

impl<T> ValueOps<T> {
    /// Absolute interpolation only; relative and incremental modes degrade
    /// to tweening towards the base end value
    pub fn lerp_only(lerp: LerpFn<T>) -> Self {
        Self {
            lerp,
            add: None,
            sub: None,
            scale: None,
        }
    }

    /// Full operator table
    pub fn new(lerp: LerpFn<T>, add: BinaryFn<T>, sub: BinaryFn<T>, scale: ScaleFn<T>) -> Self {
        Self {
            lerp,
            add: Some(add),
            sub: Some(sub),
            scale: Some(scale),
        }
    }

    /// Whether relative end values can be computed (`add` and `scale`)
    pub fn supports_offsets(&self) -> bool {
        self.add.is_some() && self.scale.is_some()
    }
}

impl<T> Clone for ValueOps<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ValueOps<T> {}

impl<T> std::fmt::Debug for ValueOps<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueOps")
            .field("add", &self.add.is_some())
            .field("sub", &self.sub.is_some())
            .field("scale", &self.scale.is_some())
            .finish()
    }
}

/// Values with a complete operator table
pub trait Tweenable: Clone + 'static {
    fn value_ops() -> ValueOps<Self>;
}

fn lerp_arith<T>(a: &T, b: &T, t: f32) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    *a + (*b - *a) * t
}

fn add_arith<T: Copy + Add<Output = T>>(a: &T, b: &T) -> T {
    *a + *b
}

fn sub_arith<T: Copy + Sub<Output = T>>(a: &T, b: &T) -> T {
    *a - *b
}

fn scale_arith<T: Copy + Mul<f32, Output = T>>(a: &T, f: f32) -> T {
    *a * f
}

macro_rules! arithmetic_tweenable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Tweenable for $ty {
                fn value_ops() -> ValueOps<Self> {
                    ValueOps::new(
                        lerp_arith::<$ty>,
                        add_arith::<$ty>,
                        sub_arith::<$ty>,
                        scale_arith::<$ty>,
                    )
                }
            }
        )*
    };
}

// ============================================================================
// Vector and color types
// ============================================================================

/// 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 3D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Check if two vectors are approximately equal
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

/// Linear RGBA color, components nominally in 0.0..=1.0
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

macro_rules! componentwise {
    ($ty:ident { $($field:ident),+ }) => {
        impl Add for $ty {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Sub for $ty {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Mul<f32> for $ty {
            type Output = Self;
            fn mul(self, rhs: f32) -> Self {
                Self { $($field: self.$field * rhs),+ }
            }
        }
    };
}

componentwise!(Vec2 { x, y });
componentwise!(Vec3 { x, y, z });
componentwise!(Color { r, g, b, a });

arithmetic_tweenable!(f32, Vec2, Vec3, Color);

impl Tweenable for f64 {
    fn value_ops() -> ValueOps<Self> {
        ValueOps::new(
            |a, b, t| a + (b - a) * t as f64,
            |a, b| a + b,
            |a, b| a - b,
            |a, f| a * f as f64,
        )
    }
}
