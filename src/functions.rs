// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The registry of iteration rules.
//!
//! Every rule has the shape `z' = f(z, c, p)`, where `p` is the
//! (possibly complex) power.  Alongside the rule we keep its "power
//! growth": how fast `|z|` grows per step once a point is well on its
//! way to infinity, as a function of the real part of the power.  The
//! smooth-coloring pass divides by the log of that number, so the
//! Simonbrot family, which multiplies by an extra squared modulus,
//! reports `p + 2` instead of `p`.

use crate::complex::{conjugate, fold_abs, fold_abs_imag, fold_abs_real, power};
use log::warn;
use num::Complex;
use std::fmt;

/// A single application of an iteration rule.
pub type IterationRule = fn(Complex<f64>, Complex<f64>, Complex<f64>) -> Complex<f64>;

/// Effective growth of `|z|` per step, given the real part of the power.
pub type PowerGrowth = fn(f64) -> f64;

/// Identifies one of the supported iteration rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FunctionId {
    /// `z^p + c`
    Mandelbrot,
    /// `conj(|re| + i im)^p + c`
    PerpendicularMandelbrot,
    /// `(|re| + i|im|)^p + c`
    BurningShip,
    /// `(re + i|im|)^p + c`
    PerpendicularBurningShip,
    /// `conj(z^p) + c`, also known as the Tricorn.
    Mandelbar,
    /// `(|re| + i im)^p + c`
    Heart,
    /// Heart with the real part of the power folded again.
    CelticHeart,
    /// `|re(z^p)| + i im(z^p) + c`
    CelticMandelbrot,
    /// Conjugated Celtic Mandelbrot.
    CelticMandelbar,
    /// Conjugated Celtic Heart.
    PerpendicularCelticMandelbrot,
    /// `|re(z^p)| + i|im(z^p)| + c`
    Buffalo,
    /// Buffalo with the imaginary axis folded on the way in.
    PerpendicularBuffalo,
    /// `z^p * (|re| + i|im|)^2 + c`
    Simonbrot,
    /// `z^p * fold(z^2) + c`
    InvertedSimonbrot,
    /// `z^p * (|re| + i im)^2 + c`
    HeartSimonbrot,
    /// `z^p * celtic(z^2) + c`
    CelticSimonbrot,
}

impl Default for FunctionId {
    fn default() -> Self {
        FunctionId::Mandelbrot
    }
}

impl FunctionId {
    /// Every supported rule, in index order.
    pub const ALL: [FunctionId; 16] = [
        FunctionId::Mandelbrot,
        FunctionId::PerpendicularMandelbrot,
        FunctionId::BurningShip,
        FunctionId::PerpendicularBurningShip,
        FunctionId::Mandelbar,
        FunctionId::Heart,
        FunctionId::CelticHeart,
        FunctionId::CelticMandelbrot,
        FunctionId::CelticMandelbar,
        FunctionId::PerpendicularCelticMandelbrot,
        FunctionId::Buffalo,
        FunctionId::PerpendicularBuffalo,
        FunctionId::Simonbrot,
        FunctionId::InvertedSimonbrot,
        FunctionId::CelticSimonbrot,
        FunctionId::HeartSimonbrot,
    ];

    /// Looks a rule up by its position in `ALL`.  An index nobody
    /// knows about gets the Mandelbrot rule.
    pub fn from_index(index: usize) -> FunctionId {
        match FunctionId::ALL.get(index) {
            Some(id) => *id,
            None => {
                warn!("Unknown function index {}, using Mandelbrot", index);
                FunctionId::Mandelbrot
            }
        }
    }

    /// Looks a rule up by name.  Case, spaces, dashes and underscores
    /// are ignored, so "burning-ship", "BurningShip" and "burning ship"
    /// all work.  Unknown names get the Mandelbrot rule.
    pub fn from_name(name: &str) -> FunctionId {
        let wanted: String = name
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .flat_map(|ch| ch.to_lowercase())
            .collect();
        if wanted == "tricorn" {
            return FunctionId::Mandelbar;
        }
        for id in FunctionId::ALL.iter() {
            let candidate: String = id
                .name()
                .chars()
                .filter(|ch| *ch != ' ')
                .flat_map(|ch| ch.to_lowercase())
                .collect();
            if candidate == wanted {
                return *id;
            }
        }
        warn!("Unknown function name {:?}, using Mandelbrot", name);
        FunctionId::Mandelbrot
    }

    /// Human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            FunctionId::Mandelbrot => "Mandelbrot",
            FunctionId::PerpendicularMandelbrot => "Perpendicular Mandelbrot",
            FunctionId::BurningShip => "Burning Ship",
            FunctionId::PerpendicularBurningShip => "Perpendicular Burning Ship",
            FunctionId::Mandelbar => "Mandelbar",
            FunctionId::Heart => "Heart",
            FunctionId::CelticHeart => "Celtic Heart",
            FunctionId::CelticMandelbrot => "Celtic Mandelbrot",
            FunctionId::CelticMandelbar => "Celtic Mandelbar",
            FunctionId::PerpendicularCelticMandelbrot => "Perpendicular Celtic Mandelbrot",
            FunctionId::Buffalo => "Buffalo",
            FunctionId::PerpendicularBuffalo => "Perpendicular Buffalo",
            FunctionId::Simonbrot => "Simonbrot",
            FunctionId::InvertedSimonbrot => "Inverted Simonbrot",
            FunctionId::HeartSimonbrot => "Heart Simonbrot",
            FunctionId::CelticSimonbrot => "Celtic Simonbrot",
        }
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn two() -> Complex<f64> {
    Complex::new(2.0, 0.0)
}

fn mandelbrot(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(z, p) + c
}

fn perpendicular_mandelbrot(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(conjugate(fold_abs_real(z)), p) + c
}

fn burning_ship(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(fold_abs(z), p) + c
}

fn perpendicular_burning_ship(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(fold_abs_imag(z), p) + c
}

fn mandelbar(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    conjugate(power(z, p)) + c
}

fn heart(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(fold_abs_real(z), p) + c
}

fn celtic_heart(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    fold_abs_real(power(fold_abs_real(z), p)) + c
}

fn celtic_mandelbrot(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    fold_abs_real(power(z, p)) + c
}

fn celtic_mandelbar(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    conjugate(fold_abs_real(power(z, p))) + c
}

fn perpendicular_celtic_mandelbrot(
    z: Complex<f64>,
    c: Complex<f64>,
    p: Complex<f64>,
) -> Complex<f64> {
    conjugate(fold_abs_real(power(fold_abs_real(z), p))) + c
}

fn buffalo(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    fold_abs(power(z, p)) + c
}

fn perpendicular_buffalo(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    fold_abs_real(power(fold_abs_imag(z), p)) + c
}

fn simonbrot(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(z, p) * power(fold_abs(z), two()) + c
}

fn inverted_simonbrot(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(z, p) * fold_abs(power(z, two())) + c
}

fn heart_simonbrot(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(z, p) * power(fold_abs_real(z), two()) + c
}

fn celtic_simonbrot(z: Complex<f64>, c: Complex<f64>, p: Complex<f64>) -> Complex<f64> {
    power(z, p) * fold_abs_real(power(z, two())) + c
}

fn plain_growth(p: f64) -> f64 {
    p
}

fn squared_modulus_growth(p: f64) -> f64 {
    p + 2.0
}

/// The rule and power growth for `id`.
pub fn resolve(id: FunctionId) -> (IterationRule, PowerGrowth) {
    match id {
        FunctionId::Mandelbrot => (mandelbrot, plain_growth),
        FunctionId::PerpendicularMandelbrot => (perpendicular_mandelbrot, plain_growth),
        FunctionId::BurningShip => (burning_ship, plain_growth),
        FunctionId::PerpendicularBurningShip => (perpendicular_burning_ship, plain_growth),
        FunctionId::Mandelbar => (mandelbar, plain_growth),
        FunctionId::Heart => (heart, plain_growth),
        FunctionId::CelticHeart => (celtic_heart, plain_growth),
        FunctionId::CelticMandelbrot => (celtic_mandelbrot, plain_growth),
        FunctionId::CelticMandelbar => (celtic_mandelbar, plain_growth),
        FunctionId::PerpendicularCelticMandelbrot => {
            (perpendicular_celtic_mandelbrot, plain_growth)
        }
        FunctionId::Buffalo => (buffalo, plain_growth),
        FunctionId::PerpendicularBuffalo => (perpendicular_buffalo, plain_growth),
        FunctionId::Simonbrot => (simonbrot, squared_modulus_growth),
        FunctionId::InvertedSimonbrot => (inverted_simonbrot, squared_modulus_growth),
        FunctionId::HeartSimonbrot => (heart_simonbrot, squared_modulus_growth),
        FunctionId::CelticSimonbrot => (celtic_simonbrot, squared_modulus_growth),
    }
}
