// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The small set of complex-number primitives every iteration rule is
//! built from: a generalized power, and a handful of "folds" that
//! reflect a number into one quadrant or half-plane before (or after)
//! it is raised to that power.  Burning ship, celtic, heart and
//! buffalo fractals are all just the Mandelbrot formula with one of
//! these folds slipped in somewhere.

use num::Complex;

/// Raise `val` to a complex `exponent`.
///
/// Almost every fractal anybody renders uses a small integer power,
/// and the rule is evaluated once per cell per iteration, so integral
/// exponents take a repeated-squaring path that never touches a
/// logarithm.  That path also keeps `power(z, 2)` bit-for-bit equal to
/// `z * z`.  Anything else falls back to `exp(exponent * ln(val))`.
pub fn power(val: Complex<f64>, exponent: Complex<f64>) -> Complex<f64> {
    if exponent.re == 0.0 && exponent.im == 0.0 {
        return Complex::new(1.0, 0.0);
    }

    match integral_exponent(exponent) {
        Some(n) => {
            let result = power_by_squaring(val, n.abs());
            if n < 0 {
                reciprocal(result)
            } else {
                result
            }
        }
        None => {
            if val.re == 0.0 && val.im == 0.0 {
                return Complex::new(0.0, 0.0);
            }
            (exponent * val.ln()).exp()
        }
    }
}

/// `Some(n)` when the exponent is a real integer small enough for the
/// squaring loop.
fn integral_exponent(exponent: Complex<f64>) -> Option<i64> {
    if exponent.im != 0.0 || exponent.re.fract() != 0.0 {
        return None;
    }
    if exponent.re.abs() > f64::from(i32::MAX) {
        return None;
    }
    Some(exponent.re as i64)
}

// Starts from `val` itself, so only n - 1 multiplications remain to be
// consumed.  An even remainder squares the base, an odd one folds the
// base into the result.
fn power_by_squaring(val: Complex<f64>, n: i64) -> Complex<f64> {
    let mut base = val;
    let mut result = val;
    let mut remaining = n - 1;
    while remaining > 0 {
        if remaining & 1 == 0 {
            base = base * base;
            remaining >>= 1;
        } else {
            result = result * base;
            remaining -= 1;
        }
    }
    result
}

/// `1 / z`, with the reciprocal of zero defined as zero rather than NaN.
pub fn reciprocal(z: Complex<f64>) -> Complex<f64> {
    if z.re == 0.0 && z.im == 0.0 {
        return z;
    }
    z.inv()
}

/// Both axes folded: `(|re|, |im|)`.
#[inline]
pub fn fold_abs(z: Complex<f64>) -> Complex<f64> {
    Complex::new(z.re.abs(), z.im.abs())
}

/// Only the real axis folded: `(|re|, im)`.
#[inline]
pub fn fold_abs_real(z: Complex<f64>) -> Complex<f64> {
    Complex::new(z.re.abs(), z.im)
}

/// Only the imaginary axis folded: `(re, |im|)`.
#[inline]
pub fn fold_abs_imag(z: Complex<f64>) -> Complex<f64> {
    Complex::new(z.re, z.im.abs())
}

/// Exchange the two components: `(im, re)`.
#[inline]
pub fn swap(z: Complex<f64>) -> Complex<f64> {
    Complex::new(z.im, z.re)
}

/// Mirror across the real axis.
#[inline]
pub fn conjugate(z: Complex<f64>) -> Complex<f64> {
    z.conj()
}
