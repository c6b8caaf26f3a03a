// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fractal grid: one cell per pixel, each remembering where its
//! orbit has got to, so that asking for more iterations only does the
//! new work.
//!
//! A cell is either still active, or it has escaped.  Escape is
//! permanent: the cell keeps the orbit value and the exact iteration
//! count at which `|z|` first crossed the escape radius, and every
//! later pass skips it.  Because the rule applied to a cell never
//! looks at any other cell, running 5 iterations and then 3 leaves
//! every cell exactly where running 8 would have.

use crate::error::EngineError;
use crate::functions::{resolve, FunctionId, IterationRule};
use crate::planes::{Pixel, PlaneMapper};
use crossbeam::channel::Sender;
use itertools::{iproduct, Itertools, MinMaxResult};
use log::{debug, log_enabled, trace, warn, Level};
use num::Complex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The state of one pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cell {
    /// Current orbit value.
    pub z: Complex<f64>,
    /// The additive constant: this cell's point on the plane.
    pub c: Complex<f64>,
    /// Iterations applied to this cell so far.
    pub iterations: u32,
    /// Set once `|z|` passes the escape radius; the cell is frozen
    /// from then on.
    pub escaped: bool,
}

impl Cell {
    fn fresh(c: Complex<f64>) -> Cell {
        Cell {
            z: Complex::new(0.0, 0.0),
            c,
            iterations: 0,
            escaped: false,
        }
    }
}

/// Everything needed to (re)build a grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridParams {
    /// Width in cells, at least 1.
    pub size_x: usize,
    /// Height in cells, at least 1.
    pub size_y: usize,
    /// Which iteration rule to run.
    pub function: FunctionId,
    /// The power handed to the rule.
    pub power: Complex<f64>,
    /// A cell escapes once `|z|` exceeds this.
    pub escape_radius: f64,
    /// Center of the view.
    pub center: Complex<f64>,
    /// Half-width of the longer axis of the view.
    pub range: f64,
    /// Added to `z` before every application of the rule.
    pub z_offset: Complex<f64>,
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            size_x: 1000,
            size_y: 1000,
            function: FunctionId::Mandelbrot,
            power: Complex::new(2.0, 0.0),
            escape_radius: 2.0,
            center: Complex::new(0.0, 0.0),
            range: 2.0,
            z_offset: Complex::new(0.0, 0.0),
        }
    }
}

/// Owns the cells of one view and advances them.
pub struct FractalGrid {
    params: GridParams,
    plane: PlaneMapper,
    cells: Vec<Cell>,
    rule: IterationRule,
    real_power_growth: f64,
    escape_radius2: f64,
    total_iterations: u32,
}

// What a worker needs to advance a cell; small and Copy so every
// thread gets its own.
#[derive(Copy, Clone)]
struct Stepper {
    rule: IterationRule,
    power: Complex<f64>,
    z_offset: Complex<f64>,
    escape_radius2: f64,
}

impl Stepper {
    #[inline]
    fn step(&self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        (self.rule)(z + self.z_offset, c, self.power)
    }

    fn advance(&self, cell: &mut Cell, budget: u32) {
        let mut z = cell.z;
        let mut taken = 0;
        let mut escaped = false;
        while taken < budget {
            z = self.step(z, cell.c);
            taken += 1;
            if z.norm_sqr() > self.escape_radius2 {
                escaped = true;
                break;
            }
        }
        cell.z = z;
        cell.iterations = cell.iterations.saturating_add(taken);
        cell.escaped = escaped;
    }
}

fn allocate(size_x: usize, size_y: usize) -> Result<Vec<Cell>, EngineError> {
    let too_large = || {
        warn!("Cannot allocate a {}x{} grid", size_x, size_y);
        EngineError::Allocation { size_x, size_y }
    };
    let len = size_x.checked_mul(size_y).ok_or_else(too_large)?;
    let mut cells = Vec::new();
    cells.try_reserve_exact(len).map_err(|_| too_large())?;
    Ok(cells)
}

/// Hands the rows of `buffer` round-robin to one scoped thread per
/// core and runs `work(row_index, row)` on each.  Every row belongs to
/// exactly one thread, so the rows need no locking.  A panic in any
/// worker resurfaces on the calling thread.
pub(crate) fn for_each_row<T, F>(buffer: &mut [T], width: usize, work: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    if width == 0 || buffer.is_empty() {
        return;
    }
    let height = (buffer.len() + width - 1) / width;
    let threads = num_cpus::get().max(1).min(height);

    let mut lanes: Vec<Vec<(usize, &mut [T])>> = (0..threads).map(|_| Vec::new()).collect();
    for (y, row) in buffer.chunks_mut(width).enumerate() {
        lanes[y % threads].push((y, row));
    }

    let work = &work;
    let outcome = crossbeam::scope(|spawner| {
        for (lane_number, lane) in lanes.into_iter().enumerate() {
            spawner.spawn(move |_| {
                trace!("Worker {} takes {} rows", lane_number, lane.len());
                for (y, row) in lane {
                    work(y, row);
                }
            });
        }
    });
    if let Err(panic) = outcome {
        std::panic::resume_unwind(panic);
    }
}

impl FractalGrid {
    /// Allocates and seeds a grid: every cell starts at `z = 0` with
    /// `c` set to its point on the plane.
    pub fn new(params: GridParams) -> Result<FractalGrid, EngineError> {
        let (rule, growth) = resolve(params.function);
        let mut grid = FractalGrid {
            params,
            plane: PlaneMapper::new(params.size_x, params.size_y, params.center, params.range),
            cells: allocate(params.size_x, params.size_y)?,
            rule,
            real_power_growth: growth(params.power.re),
            escape_radius2: params.escape_radius * params.escape_radius,
            total_iterations: 0,
        };
        grid.seed();
        debug!(
            "New {}x{} {} grid around {} (range {})",
            params.size_x, params.size_y, params.function, params.center, params.range
        );
        Ok(grid)
    }

    /// Rebuilds the grid in place for a new set of parameters.  The
    /// cell storage is kept when the dimensions have not changed.  If
    /// new storage cannot be allocated the grid is left as it was.
    pub fn reinitialize(&mut self, params: GridParams) -> Result<(), EngineError> {
        let reuse = self.params.size_x == params.size_x && self.params.size_y == params.size_y;
        if !reuse {
            self.cells = allocate(params.size_x, params.size_y)?;
        }

        let (rule, growth) = resolve(params.function);
        self.params = params;
        self.plane = PlaneMapper::new(params.size_x, params.size_y, params.center, params.range);
        self.rule = rule;
        self.real_power_growth = growth(params.power.re);
        self.escape_radius2 = params.escape_radius * params.escape_radius;
        self.total_iterations = 0;
        self.seed();
        debug!(
            "Reinitialized {}x{} {} grid around {} (range {}), storage {}",
            params.size_x,
            params.size_y,
            params.function,
            params.center,
            params.range,
            if reuse { "reused" } else { "reallocated" }
        );
        Ok(())
    }

    // Storage always has capacity for exactly the full grid, so this
    // never reallocates.
    fn seed(&mut self) {
        let plane = self.plane;
        self.cells.clear();
        self.cells.extend(
            iproduct!(0..plane.integral_plane.1, 0..plane.integral_plane.0)
                .map(|(y, x)| Cell::fresh(plane.pixel_to_point(&Pixel(x, y)))),
        );
    }

    /// Applies up to `extra_iterations` more steps of the rule to every
    /// active cell, in parallel by rows.  A cell stops early the
    /// moment it escapes, and its count only grows by the steps it
    /// actually took.  Roughly every 1% of finished rows, the fraction
    /// of the grid those rows represent is sent on `progress`; sends
    /// are best-effort and a hung-up receiver is ignored.
    pub fn iterate(&mut self, extra_iterations: u32, progress: Option<&Sender<f64>>) {
        if extra_iterations < 1 {
            return;
        }

        let stepper = Stepper {
            rule: self.rule,
            power: self.params.power,
            z_offset: self.params.z_offset,
            escape_radius2: self.escape_radius2,
        };
        let rows = self.params.size_y;
        let interval = (rows / 100).max(1);
        let increment = interval as f64 / rows as f64;
        let finished = AtomicUsize::new(0);

        for_each_row(&mut self.cells, self.params.size_x, |_, row| {
            for cell in row.iter_mut().filter(|cell| !cell.escaped) {
                stepper.advance(cell, extra_iterations);
            }
            if let Some(progress) = progress {
                let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                if done % interval == 0 {
                    let _ = progress.send(increment);
                }
            }
        });

        self.total_iterations = self.total_iterations.saturating_add(extra_iterations);
        if log_enabled!(Level::Debug) {
            let escaped = self.cells.iter().filter(|cell| cell.escaped).count();
            debug!(
                "Iterated {} more, {} total; {} of {} cells escaped",
                extra_iterations,
                self.total_iterations,
                escaped,
                self.cells.len()
            );
        }
    }

    /// Runs the current rule `iterations` times from `z`, without
    /// touching the grid.  Used to push an escaped orbit a little
    /// further for smooth coloring.
    pub fn iterate_value(&self, z: Complex<f64>, c: Complex<f64>, iterations: u32) -> Complex<f64> {
        let stepper = Stepper {
            rule: self.rule,
            power: self.params.power,
            z_offset: self.params.z_offset,
            escape_radius2: self.escape_radius2,
        };
        (0..iterations).fold(z, |z, _| stepper.step(z, c))
    }

    /// Smallest and largest iteration count over every cell, escaped
    /// or not.
    pub fn min_max_iterations(&self) -> (u32, u32) {
        match self.cells.iter().map(|cell| cell.iterations).minmax() {
            MinMaxResult::NoElements => (0, 0),
            MinMaxResult::OneElement(only) => (only, only),
            MinMaxResult::MinMax(min, max) => (min, max),
        }
    }

    /// The parameters this generation was built from.
    pub fn params(&self) -> GridParams {
        self.params
    }

    /// Width in cells.
    pub fn size_x(&self) -> usize {
        self.params.size_x
    }

    /// Height in cells.
    pub fn size_y(&self) -> usize {
        self.params.size_y
    }

    /// The iteration rule in use.
    pub fn function(&self) -> FunctionId {
        self.params.function
    }

    /// The power handed to the rule.
    pub fn power(&self) -> Complex<f64> {
        self.params.power
    }

    /// Offset added to `z` before each step.
    pub fn z_offset(&self) -> Complex<f64> {
        self.params.z_offset
    }

    /// The escape radius.
    pub fn escape_radius(&self) -> f64 {
        self.params.escape_radius
    }

    /// The escape radius, squared.
    pub fn escape_radius2(&self) -> f64 {
        self.escape_radius2
    }

    /// Center of the view.
    pub fn center(&self) -> Complex<f64> {
        self.params.center
    }

    /// Half-width of the longer axis of the view.
    pub fn range(&self) -> f64 {
        self.params.range
    }

    /// Plane coordinate of the first cell.
    pub fn min_value(&self) -> Complex<f64> {
        self.plane.min_value()
    }

    /// Plane coordinate of the last cell.
    pub fn max_value(&self) -> Complex<f64> {
        self.plane.max_value()
    }

    /// Iterations every still-active cell has received.
    pub fn total_iterations(&self) -> u32 {
        self.total_iterations
    }

    /// Growth of `|z|` per step for the current rule and power.
    pub fn real_power_growth(&self) -> f64 {
        self.real_power_growth
    }

    /// The mapping between cells and plane coordinates.
    pub fn plane(&self) -> &PlaneMapper {
        &self.plane
    }

    /// Snapshot of the cell at column `x`, row `y`.
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.params.size_x || y >= self.params.size_y {
            return None;
        }
        self.cells.get(y * self.params.size_x + x).copied()
    }

    /// Snapshot of the cell nearest to `point` on the plane.
    pub fn cell_at_point(&self, point: Complex<f64>) -> Option<Cell> {
        let Pixel(x, y) = self.plane.point_to_pixel(&point)?;
        self.cell(x, y)
    }

    /// All cells, row by row.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Address of the cell storage; unchanged for as long as the
    /// storage is reused.
    pub fn storage_ptr(&self) -> *const Cell {
        self.cells.as_ptr()
    }
}
