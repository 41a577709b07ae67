//! Forward-mode derivatives with respect to a single parameter cell.
//!
//! Every quantity carries its value and its derivative with respect to the one
//! cell the caller is differentiating by. Constraints with involved formulas
//! build their residual from these types and get the partial derivative for free.

use nalgebra::Vector2;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dual {
    pub v: f64,
    pub d: f64,
}

impl Dual {
    pub const fn new(v: f64, d: f64) -> Self {
        Self { v, d }
    }

    pub const fn constant(v: f64) -> Self {
        Self { v, d: 0.0 }
    }

    pub fn sqrt(self) -> Self {
        let s = self.v.sqrt();
        let d = if s > 0.0 { self.d / (2.0 * s) } else { 0.0 };
        Self::new(s, d)
    }

    pub fn sin(self) -> Self {
        Self::new(self.v.sin(), self.v.cos() * self.d)
    }

    pub fn cos(self) -> Self {
        Self::new(self.v.cos(), -self.v.sin() * self.d)
    }

    pub fn sinh(self) -> Self {
        Self::new(self.v.sinh(), self.v.cosh() * self.d)
    }

    pub fn cosh(self) -> Self {
        Self::new(self.v.cosh(), self.v.sinh() * self.d)
    }

    pub fn abs(self) -> Self {
        if self.v < 0.0 {
            -self
        } else {
            self
        }
    }

    /// `atan2(y, x)`; the derivative is zero at the origin.
    pub fn atan2(y: Dual, x: Dual) -> Self {
        let r2 = x.v * x.v + y.v * y.v;
        let d = if r2 > 0.0 { (x.v * y.d - y.v * x.d) / r2 } else { 0.0 };
        Self::new(y.v.atan2(x.v), d)
    }
}

impl Add for Dual {
    type Output = Dual;
    fn add(self, o: Dual) -> Dual {
        Dual::new(self.v + o.v, self.d + o.d)
    }
}

impl Sub for Dual {
    type Output = Dual;
    fn sub(self, o: Dual) -> Dual {
        Dual::new(self.v - o.v, self.d - o.d)
    }
}

impl Mul for Dual {
    type Output = Dual;
    fn mul(self, o: Dual) -> Dual {
        Dual::new(self.v * o.v, self.d * o.v + self.v * o.d)
    }
}

impl Div for Dual {
    type Output = Dual;
    fn div(self, o: Dual) -> Dual {
        Dual::new(self.v / o.v, (self.d * o.v - self.v * o.d) / (o.v * o.v))
    }
}

impl Mul<f64> for Dual {
    type Output = Dual;
    fn mul(self, k: f64) -> Dual {
        Dual::new(self.v * k, self.d * k)
    }
}

impl Neg for Dual {
    type Output = Dual;
    fn neg(self) -> Dual {
        Dual::new(-self.v, -self.d)
    }
}

/// 2-D vector with the derivative of each component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualVec2 {
    pub v: Vector2<f64>,
    pub d: Vector2<f64>,
}

impl Default for DualVec2 {
    fn default() -> Self {
        Self::zero()
    }
}

impl DualVec2 {
    pub fn new(x: f64, dx: f64, y: f64, dy: f64) -> Self {
        Self { v: Vector2::new(x, y), d: Vector2::new(dx, dy) }
    }

    pub fn zero() -> Self {
        Self { v: Vector2::zeros(), d: Vector2::zeros() }
    }

    pub fn from_duals(x: Dual, y: Dual) -> Self {
        Self::new(x.v, x.d, y.v, y.d)
    }

    pub fn x(&self) -> Dual {
        Dual::new(self.v.x, self.d.x)
    }

    pub fn y(&self) -> Dual {
        Dual::new(self.v.y, self.d.y)
    }

    pub fn dot(&self, o: &DualVec2) -> Dual {
        Dual::new(self.v.dot(&o.v), self.d.dot(&o.v) + self.v.dot(&o.d))
    }

    /// z-component of the 3-D cross product.
    pub fn cross(&self, o: &DualVec2) -> Dual {
        Dual::new(
            self.v.x * o.v.y - self.v.y * o.v.x,
            self.d.x * o.v.y + self.v.x * o.d.y - self.d.y * o.v.x - self.v.y * o.d.x,
        )
    }

    pub fn length(&self) -> Dual {
        let l = self.v.norm();
        let d = if l > 0.0 { self.v.dot(&self.d) / l } else { 0.0 };
        Dual::new(l, d)
    }

    /// Unit vector; a zero vector stays zero.
    pub fn normalized(&self) -> DualVec2 {
        let l = self.v.norm();
        if l == 0.0 {
            return DualVec2::zero();
        }
        let v = self.v / l;
        let d = self.d / l - v * (v.dot(&self.d) / l);
        DualVec2 { v, d }
    }

    pub fn scale(&self, k: Dual) -> DualVec2 {
        DualVec2 { v: self.v * k.v, d: self.d * k.v + self.v * k.d }
    }

    pub fn rot90ccw(&self) -> DualVec2 {
        DualVec2 {
            v: Vector2::new(-self.v.y, self.v.x),
            d: Vector2::new(-self.d.y, self.d.x),
        }
    }

    pub fn rot90cw(&self) -> DualVec2 {
        DualVec2 {
            v: Vector2::new(self.v.y, -self.v.x),
            d: Vector2::new(self.d.y, -self.d.x),
        }
    }

    /// Polar angle of the vector.
    pub fn angle(&self) -> Dual {
        Dual::atan2(self.y(), self.x())
    }
}

impl Add for DualVec2 {
    type Output = DualVec2;
    fn add(self, o: DualVec2) -> DualVec2 {
        DualVec2 { v: self.v + o.v, d: self.d + o.d }
    }
}

impl Sub for DualVec2 {
    type Output = DualVec2;
    fn sub(self, o: DualVec2) -> DualVec2 {
        DualVec2 { v: self.v - o.v, d: self.d - o.d }
    }
}

impl Mul<f64> for DualVec2 {
    type Output = DualVec2;
    fn mul(self, k: f64) -> DualVec2 {
        DualVec2 { v: self.v * k, d: self.d * k }
    }
}

/// Signed angle that rotates `from` onto `to`, in (-pi, pi].
pub fn angle_between(from: &DualVec2, to: &DualVec2) -> Dual {
    // atan2(from x to, from . to) = angle(to) - angle(from), wrapped
    let y = from.cross(to);
    let x = from.dot(to);
    let mut a = Dual::atan2(y, x);
    // atan2's derivative formula is undefined for degenerate vectors
    if from.v.norm() == 0.0 || to.v.norm() == 0.0 {
        a.d = 0.0;
    }
    a
}

/// Rotates a plain angle difference into (-pi, pi] keeping its derivative.
pub fn wrap_angle(a: Dual) -> Dual {
    Dual::new(a.v.sin().atan2(a.v.cos()), a.d)
}
