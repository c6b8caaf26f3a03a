// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns a finished grid into palette indices.
//!
//! Index 0 is reserved for cells that have not escaped.  Everything
//! else lands in `1..palette_size`, by way of a color function that
//! squeezes the iteration count into `[0, 1]`.  With smooth coloring
//! on, each escaped orbit is pushed a few steps further and the
//! overshoot past the escape radius is turned into a fractional
//! iteration count, which removes the banding between integral counts.

use crate::grid::{for_each_row, Cell, FractalGrid};
use crate::palette::Palette;
use log::{debug, warn};
use std::f64::consts::PI;
use std::fmt;

/// Shapes the normalized iteration count before it picks a color.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorFunction {
    /// `x`
    Linear,
    /// `sqrt(x)`
    SquareRoot,
    /// `sin(x * pi / 2)`
    Sine,
    /// Logarithmic in the raw count, scaled between the logs of the
    /// grid's smallest and largest counts.
    AutoLogarithmic,
    /// `ln(x * 4^n + 1) / ln(4^n + 1)`
    Logarithmic,
    /// `x^(1/n)`
    Gamma,
    /// `tanh(n * x) / tanh(n)`
    HyperbolicTangent,
}

impl ColorFunction {
    /// Every color function.
    pub const ALL: [ColorFunction; 7] = [
        ColorFunction::Linear,
        ColorFunction::SquareRoot,
        ColorFunction::Sine,
        ColorFunction::AutoLogarithmic,
        ColorFunction::Logarithmic,
        ColorFunction::Gamma,
        ColorFunction::HyperbolicTangent,
    ];

    /// Parses a name like "square-root" or "AutoLogarithmic".  Unknown
    /// names are treated as Linear.
    pub fn from_name(name: &str) -> ColorFunction {
        let wanted: String = name
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .flat_map(|ch| ch.to_lowercase())
            .collect();
        match wanted.as_str() {
            "linear" => ColorFunction::Linear,
            "squareroot" | "sqrt" => ColorFunction::SquareRoot,
            "sine" | "sin" => ColorFunction::Sine,
            "autologarithmic" | "autolog" => ColorFunction::AutoLogarithmic,
            "logarithmic" | "log" => ColorFunction::Logarithmic,
            "gamma" => ColorFunction::Gamma,
            "hyperbolictangent" | "tanh" => ColorFunction::HyperbolicTangent,
            _ => {
                warn!("Unknown color function {:?}, using linear", name);
                ColorFunction::Linear
            }
        }
    }

    /// Human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            ColorFunction::Linear => "Linear",
            ColorFunction::SquareRoot => "Square Root",
            ColorFunction::Sine => "Sine",
            ColorFunction::AutoLogarithmic => "Auto Logarithmic",
            ColorFunction::Logarithmic => "Logarithmic",
            ColorFunction::Gamma => "Gamma",
            ColorFunction::HyperbolicTangent => "Hyperbolic Tangent",
        }
    }
}

impl fmt::Display for ColorFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a grid should be colored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DisplaySettings {
    /// Shape of the count-to-color curve.
    pub color_function: ColorFunction,
    /// The `n` parameter of the Logarithmic, Gamma and
    /// HyperbolicTangent curves.
    pub n_value: f64,
    /// Turn fractional (smooth) iteration counts on.
    pub use_smoothing: bool,
    /// Extra steps taken past escape when smoothing.
    pub smoothing_iterations: u32,
    /// How many times the palette is swept back and forth.
    pub interpolation_period: f64,
    /// Shifts where in the palette the sweep starts.
    pub palette_offset: f64,
    /// Number of palette entries, including the in-set entry.  Capped
    /// at 256.
    pub palette_size: usize,
    /// Which palette the indices are meant for.
    pub palette: Palette,
    /// Ease between palette stops with a sine curve instead of linearly.
    pub use_sine_interpolation: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            color_function: ColorFunction::AutoLogarithmic,
            n_value: 1.0,
            use_smoothing: true,
            smoothing_iterations: 2,
            interpolation_period: 1.0,
            palette_offset: 0.0,
            palette_size: 256,
            palette: Palette::BlueWhiteOrange,
            use_sine_interpolation: true,
        }
    }
}

/// Maps the cells of one grid to palette indices.
pub struct ColorMapper<'a> {
    grid: &'a FractalGrid,
    settings: DisplaySettings,
    min: f64,
    max: f64,
    // No cell has been iterated at all; everything is in-set.
    blank: bool,
    smooth: bool,
    min_log: f64,
    total_log: f64,
    growth_log: f64,
    radius2_log: f64,
    palette_size: usize,
}

impl<'a> ColorMapper<'a> {
    /// A mapper normalized to the grid's own smallest and largest
    /// iteration counts.
    pub fn new(grid: &'a FractalGrid, settings: DisplaySettings) -> ColorMapper<'a> {
        ColorMapper::with_bounds(grid, settings, grid.min_max_iterations())
    }

    /// A mapper normalized to caller-chosen bounds, so that several
    /// frames can share one scale.
    pub fn with_bounds(
        grid: &'a FractalGrid,
        settings: DisplaySettings,
        (min_iterations, max_iterations): (u32, u32),
    ) -> ColorMapper<'a> {
        let smooth = settings.use_smoothing
            && grid.power().im == 0.0
            && grid.real_power_growth() > 1.0;
        let min = f64::from(min_iterations);
        let mut max = f64::from(max_iterations);
        if smooth {
            max += f64::from(settings.smoothing_iterations) + 1.0;
        }
        let min_log = min.max(1.0).ln();

        ColorMapper {
            grid,
            settings,
            min,
            max,
            blank: max_iterations == 0,
            smooth,
            min_log,
            total_log: max.ln() - min_log,
            growth_log: grid.real_power_growth().ln(),
            radius2_log: grid.escape_radius2().ln(),
            palette_size: settings.palette_size.max(2).min(256),
        }
    }

    fn linearize(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    /// The color function at `value`, clamped to `[0, 1]`.
    pub fn curve(&self, value: f64) -> f64 {
        let n = self.settings.n_value;
        let d = match self.settings.color_function {
            ColorFunction::Linear => self.linearize(value),
            ColorFunction::SquareRoot => {
                let x = self.linearize(value);
                if x > 0.0 {
                    x.sqrt()
                } else {
                    0.0
                }
            }
            ColorFunction::Sine => (self.linearize(value) * PI / 2.0).sin(),
            ColorFunction::AutoLogarithmic => {
                if value <= 0.0 || self.total_log <= 0.0 {
                    0.0
                } else {
                    (value.ln() - self.min_log) / self.total_log
                }
            }
            ColorFunction::Logarithmic => {
                let n4 = 4f64.powf(n);
                let spread = self.linearize(value) * n4 + 1.0;
                if spread <= 0.0 {
                    0.0
                } else {
                    spread.ln() / (n4 + 1.0).ln()
                }
            }
            ColorFunction::Gamma => {
                let x = self.linearize(value);
                if x <= 0.0 || n <= 0.0 {
                    0.0
                } else {
                    x.powf(1.0 / n)
                }
            }
            ColorFunction::HyperbolicTangent => {
                if n <= 0.0 {
                    0.0
                } else {
                    (self.linearize(value) * n).tanh() / n.tanh()
                }
            }
        };
        unit(d)
    }

    // Fractional iteration count of an escaped cell.
    fn smoothed(&self, cell: &Cell) -> f64 {
        let extra = self.settings.smoothing_iterations;
        let z = self.grid.iterate_value(cell.z, cell.c, extra);
        let correction = f64::from(extra) + 1.0
            - (z.norm_sqr().ln() / self.radius2_log).ln() / self.growth_log;
        f64::from(cell.iterations) + correction
    }

    /// The palette index for one cell.
    pub fn index_for(&self, cell: &Cell) -> u8 {
        if !cell.escaped || self.blank {
            return 0;
        }
        if self.min == self.max {
            return (self.palette_size - 1) as u8;
        }

        let value = if self.smooth {
            self.smoothed(cell)
        } else {
            f64::from(cell.iterations)
        };
        let mut d = self.curve(value);

        let period = self.settings.interpolation_period;
        let offset = self.settings.palette_offset;
        if period != 1.0 || offset != 0.0 {
            d = unit(((d * period + 1.0 - offset) % 2.0 - 1.0).abs());
        }

        (d * (self.palette_size - 2) as f64).round() as u8 + 1
    }

    /// Palette indices for the whole grid, row by row.  Rows are
    /// mapped in parallel.
    pub fn map(&self) -> Vec<u8> {
        let width = self.grid.size_x();
        let cells = self.grid.cells();
        let mut indices = vec![0u8; cells.len()];
        if self.blank {
            return indices;
        }

        for_each_row(&mut indices, width, |y, row| {
            let source = &cells[y * width..y * width + row.len()];
            for (index, cell) in row.iter_mut().zip(source) {
                *index = self.index_for(cell);
            }
        });
        debug!(
            "Colored {} cells with {} ({}smoothed) over {}..{}",
            indices.len(),
            self.settings.color_function,
            if self.smooth { "" } else { "not " },
            self.min,
            self.max
        );
        indices
    }
}

fn unit(d: f64) -> f64 {
    if d.is_nan() {
        0.0
    } else {
        num::clamp(d, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionId;
    use crate::grid::GridParams;
    use num::Complex;

    fn grid(size: usize) -> FractalGrid {
        FractalGrid::new(GridParams {
            size_x: size,
            size_y: size,
            center: Complex::new(-0.5, 0.0),
            range: 1.5,
            ..GridParams::default()
        })
        .unwrap()
    }

    fn linear() -> DisplaySettings {
        DisplaySettings {
            color_function: ColorFunction::Linear,
            use_smoothing: false,
            ..DisplaySettings::default()
        }
    }

    fn escaped_at(iterations: u32) -> Cell {
        Cell {
            z: Complex::new(3.0, 0.0),
            c: Complex::new(1.0, 0.0),
            iterations,
            escaped: true,
        }
    }

    #[test]
    fn linear_top_count_is_the_last_index() {
        let g = grid(4);
        let mapper = ColorMapper::with_bounds(&g, linear(), (0, 10));
        assert_eq!(mapper.index_for(&escaped_at(10)), 255);
        assert_eq!(mapper.index_for(&escaped_at(0)), 1);
        assert_eq!(mapper.index_for(&escaped_at(5)), 128);
    }

    #[test]
    fn cells_in_the_set_are_always_index_zero() {
        let g = grid(4);
        let active = Cell {
            escaped: false,
            ..escaped_at(10)
        };
        for function in ColorFunction::ALL.iter() {
            for &smooth in &[false, true] {
                let settings = DisplaySettings {
                    color_function: *function,
                    use_smoothing: smooth,
                    interpolation_period: 3.0,
                    palette_offset: 0.5,
                    ..DisplaySettings::default()
                };
                let mapper = ColorMapper::with_bounds(&g, settings, (0, 10));
                assert_eq!(mapper.index_for(&active), 0);
            }
        }
    }

    #[test]
    fn equal_bounds_paint_every_escapee_the_same() {
        let g = grid(4);
        let mapper = ColorMapper::with_bounds(&g, linear(), (7, 7));
        assert_eq!(mapper.index_for(&escaped_at(7)), 255);
    }

    #[test]
    fn untouched_grids_are_all_in_set() {
        let g = grid(8);
        let indices = ColorMapper::new(&g, DisplaySettings::default()).map();
        assert_eq!(indices.len(), 64);
        assert!(indices.iter().all(|&index| index == 0));
    }

    #[test]
    fn color_functions_stay_in_the_unit_interval() {
        let g = grid(4);
        for function in ColorFunction::ALL.iter() {
            for &n in &[-1.0, 0.0, 0.5, 1.0, 3.0] {
                let settings = DisplaySettings {
                    color_function: *function,
                    n_value: n,
                    ..linear()
                };
                let mapper = ColorMapper::with_bounds(&g, settings, (0, 100));
                for &value in &[-5.0, 0.0, 1.0, 50.0, 100.0, 250.0] {
                    let d = mapper.curve(value);
                    assert!(d >= 0.0 && d <= 1.0, "{} n={} at {}: {}", function, n, value, d);
                }
            }
        }
    }

    #[test]
    fn curves_hit_their_reference_points() {
        let g = grid(4);
        let at = |function, n_value| {
            let settings = DisplaySettings {
                color_function: function,
                n_value,
                ..linear()
            };
            ColorMapper::with_bounds(&g, settings, (0, 100)).curve(25.0)
        };
        let close = |a: f64, b: f64| (a - b).abs() < 1e-12;
        assert!(close(at(ColorFunction::Linear, 1.0), 0.25));
        assert!(close(at(ColorFunction::SquareRoot, 1.0), 0.5));
        assert!(close(at(ColorFunction::Sine, 1.0), (PI / 8.0).sin()));
        assert!(close(at(ColorFunction::AutoLogarithmic, 1.0), 25f64.ln() / 100f64.ln()));
        assert!(close(at(ColorFunction::Logarithmic, 1.0), 2f64.ln() / 5f64.ln()));
        assert!(close(at(ColorFunction::Gamma, 2.0), 0.5));
        assert!(close(at(ColorFunction::HyperbolicTangent, 2.0), 0.5f64.tanh() / 2f64.tanh()));
        assert_eq!(at(ColorFunction::Gamma, 0.0), 0.0);
        assert_eq!(at(ColorFunction::HyperbolicTangent, -1.0), 0.0);
    }

    #[test]
    fn period_and_offset_fold_the_palette_back() {
        let g = grid(4);
        let settings = DisplaySettings {
            interpolation_period: 2.0,
            ..linear()
        };
        let mapper = ColorMapper::with_bounds(&g, settings, (0, 10));
        // d = 0.5 sweeps to the far end, d = 1 comes back to the start.
        assert_eq!(mapper.index_for(&escaped_at(5)), 255);
        assert_eq!(mapper.index_for(&escaped_at(10)), 1);

        let shifted = DisplaySettings {
            palette_offset: 0.5,
            ..linear()
        };
        let mapper = ColorMapper::with_bounds(&g, shifted, (0, 10));
        assert_eq!(mapper.index_for(&escaped_at(0)), 128);
    }

    #[test]
    fn smoothing_only_applies_to_real_powers_above_one() {
        let complex_power = FractalGrid::new(GridParams {
            size_x: 2,
            size_y: 2,
            power: Complex::new(2.0, 0.5),
            ..GridParams::default()
        })
        .unwrap();
        let settings = DisplaySettings {
            use_smoothing: true,
            ..linear()
        };
        let mapper = ColorMapper::with_bounds(&complex_power, settings, (0, 10));
        assert_eq!(mapper.index_for(&escaped_at(10)), 255);

        let g = grid(4);
        let mapper = ColorMapper::with_bounds(&g, settings, (0, 10));
        // The upper bound grows by smoothing_iterations + 1.
        assert_eq!(mapper.max, 13.0);
    }

    #[test]
    fn smoothing_breaks_up_the_bands() {
        let mut g = grid(64);
        g.iterate(60, None);
        let plain = ColorMapper::new(&g, linear());
        let smooth = ColorMapper::new(
            &g,
            DisplaySettings {
                use_smoothing: true,
                ..linear()
            },
        );
        let distinct = |mapper: &ColorMapper| {
            let mut seen: Vec<f64> = g
                .cells()
                .iter()
                .filter(|cell| cell.escaped && cell.iterations == 3)
                .map(|cell| {
                    let value = if mapper.smooth {
                        mapper.smoothed(cell)
                    } else {
                        f64::from(cell.iterations)
                    };
                    mapper.curve(value)
                })
                .collect();
            seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
            seen.dedup();
            seen.len()
        };
        assert_eq!(distinct(&plain), 1);
        assert!(distinct(&smooth) > 1);
    }

    #[test]
    fn smoothed_count_of_a_known_orbit() {
        // z = 3 escaped after 5 steps with c = 0; one more step gives 9.
        // 5 + 2 - log2(ln 81 / ln 4) = 5 + 2 - log2(2 log2 3)
        let g = grid(4);
        let settings = DisplaySettings {
            use_smoothing: true,
            smoothing_iterations: 1,
            ..linear()
        };
        let mapper = ColorMapper::with_bounds(&g, settings, (0, 10));
        let cell = Cell {
            z: Complex::new(3.0, 0.0),
            c: Complex::new(0.0, 0.0),
            iterations: 5,
            escaped: true,
        };
        let expected = 7.0 - (2.0 * 3f64.log2()).log2();
        assert!((mapper.smoothed(&cell) - expected).abs() < 1e-12);
        assert!((mapper.smoothed(&cell) - 5.335_551_292_546).abs() < 1e-9);
    }

    #[test]
    fn map_matches_index_for_cell_by_cell() {
        let mut g = FractalGrid::new(GridParams {
            size_x: 37,
            size_y: 23,
            function: FunctionId::BurningShip,
            center: Complex::new(-0.4, -0.5),
            range: 1.8,
            ..GridParams::default()
        })
        .unwrap();
        g.iterate(40, None);
        let mapper = ColorMapper::new(&g, DisplaySettings::default());
        let indices = mapper.map();
        assert_eq!(indices.len(), 37 * 23);
        for (index, cell) in indices.iter().zip(g.cells()) {
            assert_eq!(*index, mapper.index_for(cell));
            assert_eq!(*index == 0, !cell.escaped);
        }
    }

    #[test]
    fn small_palettes_still_leave_room_for_the_set() {
        let g = grid(4);
        let settings = DisplaySettings {
            palette_size: 1,
            ..linear()
        };
        let mapper = ColorMapper::with_bounds(&g, settings, (0, 10));
        assert_eq!(mapper.index_for(&escaped_at(10)), 1);
        assert_eq!(mapper.index_for(&escaped_at(0)), 1);
    }

    #[test]
    fn names_parse_with_a_linear_fallback() {
        assert_eq!(ColorFunction::from_name("square-root"), ColorFunction::SquareRoot);
        assert_eq!(ColorFunction::from_name("AutoLogarithmic"), ColorFunction::AutoLogarithmic);
        assert_eq!(ColorFunction::from_name("tanh"), ColorFunction::HyperbolicTangent);
        assert_eq!(ColorFunction::from_name("plaid"), ColorFunction::Linear);
    }
}
