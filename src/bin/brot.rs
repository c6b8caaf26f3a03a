// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use brotengine::{
    colorize, ColorFunction, ColorMapper, Complex64, DisplaySettings, EngineError, FractalGrid,
    FunctionId, GridParams, Palette,
};
use clap::{App, Arg, ArgMatches};
use crossbeam::channel::unbounded;
use failure::{format_err, Error};
use image::ColorType;
use log::{info, warn};
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex64> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex64 { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_size(s: &str) -> Result<(), String> {
    match parse_pair::<usize>(s, 'x') {
        Some((w, h)) if w > 0 && h > 0 => Ok(()),
        Some(_) => Err("Image dimensions must both be at least 1".to_string()),
        None => Err("Could not parse output image size".to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const FUNCTION: &str = "function";
const POWER: &str = "power";
const ESCAPE_RADIUS: &str = "escape-radius";
const CENTER: &str = "center";
const RANGE: &str = "range";
const Z_OFFSET: &str = "z-offset";
const ITERATIONS: &str = "iterations";
const STEP: &str = "step";
const COLOR_FUNCTION: &str = "color-function";
const N_VALUE: &str = "n-value";
const NO_SMOOTHING: &str = "no-smoothing";
const SMOOTHING_ITERATIONS: &str = "smoothing-iterations";
const PERIOD: &str = "period";
const OFFSET: &str = "offset";
const PALETTE: &str = "palette";
const NO_SINE: &str = "no-sine";
const PROBE: &str = "probe";

// Where the grid goes when the requested size cannot be allocated.
const FALLBACK_SIZE: usize = 500;

fn complex_arg<'a, 'b>(name: &'a str, default: &'a str, help: &'a str) -> Arg<'a, 'b> {
    Arg::with_name(name)
        .long(name)
        .takes_value(true)
        .allow_hyphen_values(true)
        .default_value(default)
        .validator(|s| {
            validate_pair::<f64>(
                &s,
                ',',
                "Could not parse complex number (expected re,im)",
            )
        })
        .help(help)
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("brot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_size(&s))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(FUNCTION)
                .long(FUNCTION)
                .short("f")
                .takes_value(true)
                .default_value("mandelbrot")
                .help("Iteration rule, e.g. mandelbrot, burning-ship, celtic-heart, simonbrot"),
        )
        .arg(complex_arg(POWER, "2,0", "Power the rule raises z to"))
        .arg(
            Arg::with_name(ESCAPE_RADIUS)
                .long(ESCAPE_RADIUS)
                .short("e")
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse escape radius",
                        "Escape radius must be positive",
                    )
                })
                .help("Radius past which an orbit counts as escaped"),
        )
        .arg(complex_arg(
            CENTER,
            "0,0",
            "Center of the view on the complex plane",
        ))
        .arg(
            Arg::with_name(RANGE)
                .long(RANGE)
                .short("r")
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse range",
                        "Range must be positive",
                    )
                })
                .help("Half-width of the longer side of the view"),
        )
        .arg(complex_arg(
            Z_OFFSET,
            "0,0",
            "Offset added to z before every step",
        ))
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("200")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Total number of iterations"),
        )
        .arg(
            Arg::with_name(STEP)
                .long(STEP)
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse step",
                        "Step must be between 1 and 10000000",
                    )
                })
                .help("Iterations per pass; the grid resumes where each pass stopped"),
        )
        .arg(
            Arg::with_name(COLOR_FUNCTION)
                .long(COLOR_FUNCTION)
                .takes_value(true)
                .default_value("auto-logarithmic")
                .help("linear, square-root, sine, auto-logarithmic, logarithmic, gamma or tanh"),
        )
        .arg(
            Arg::with_name(N_VALUE)
                .long(N_VALUE)
                .short("n")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1")
                .validator(|s| validate_number::<f64>(&s, "Could not parse n"))
                .help("Parameter of the logarithmic, gamma and tanh color functions"),
        )
        .arg(
            Arg::with_name(NO_SMOOTHING)
                .long(NO_SMOOTHING)
                .help("Color by whole iteration counts"),
        )
        .arg(
            Arg::with_name(SMOOTHING_ITERATIONS)
                .long(SMOOTHING_ITERATIONS)
                .takes_value(true)
                .default_value("2")
                .validator(|s| validate_number::<u32>(&s, "Could not parse smoothing iterations"))
                .help("Extra steps taken past escape when smoothing"),
        )
        .arg(
            Arg::with_name(PERIOD)
                .long(PERIOD)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1")
                .validator(|s| validate_number::<f64>(&s, "Could not parse period"))
                .help("How many times the palette is swept"),
        )
        .arg(
            Arg::with_name(OFFSET)
                .long(OFFSET)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse palette offset"))
                .help("Where in the palette the sweep starts"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .takes_value(true)
                .default_value("blue-white-orange")
                .help("Palette name, e.g. blue-white-orange, gray-scale, jojo-scale"),
        )
        .arg(
            Arg::with_name(NO_SINE)
                .long(NO_SINE)
                .help("Interpolate the palette linearly"),
        )
        .arg(
            Arg::with_name(PROBE)
                .long(PROBE)
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse probe point"))
                .help("Report the cell nearest to this point (re,im) once iteration is done"),
        )
        .get_matches()
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("Missing value for --{}", name))
}

fn number<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = value(matches, name)?;
    T::from_str(raw)
        .map_err(|_| format_err!("Could not parse --{} {:?}", name, raw))
}

fn complex(matches: &ArgMatches, name: &str) -> Result<Complex64, Error> {
    let raw = value(matches, name)?;
    parse_complex(raw)
        .ok_or_else(|| format_err!("Could not parse --{} {:?}", name, raw))
}

fn grid_params(matches: &ArgMatches) -> Result<GridParams, Error> {
    let raw_size = value(matches, SIZE)?;
    let (size_x, size_y) = parse_pair(raw_size, 'x')
        .ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    Ok(GridParams {
        size_x,
        size_y,
        function: FunctionId::from_name(value(matches, FUNCTION)?),
        power: complex(matches, POWER)?,
        escape_radius: number(matches, ESCAPE_RADIUS)?,
        center: complex(matches, CENTER)?,
        range: number(matches, RANGE)?,
        z_offset: complex(matches, Z_OFFSET)?,
    })
}

fn display_settings(matches: &ArgMatches) -> Result<DisplaySettings, Error> {
    Ok(DisplaySettings {
        color_function: ColorFunction::from_name(value(matches, COLOR_FUNCTION)?),
        n_value: number(matches, N_VALUE)?,
        use_smoothing: !matches.is_present(NO_SMOOTHING),
        smoothing_iterations: number(matches, SMOOTHING_ITERATIONS)?,
        interpolation_period: number(matches, PERIOD)?,
        palette_offset: number(matches, OFFSET)?,
        palette: Palette::from_name(value(matches, PALETTE)?),
        use_sine_interpolation: !matches.is_present(NO_SINE),
        ..DisplaySettings::default()
    })
}

fn build_grid(params: GridParams) -> Result<FractalGrid, EngineError> {
    match FractalGrid::new(params) {
        Ok(grid) => Ok(grid),
        Err(e) => {
            warn!(
                "{}; reducing image size to {}x{}",
                e, FALLBACK_SIZE, FALLBACK_SIZE
            );
            FractalGrid::new(GridParams {
                size_x: FALLBACK_SIZE,
                size_y: FALLBACK_SIZE,
                ..params
            })
        }
    }
}

// Runs one pass, logging progress at every tenth of the grid from a
// second thread while the workers run.
fn iterate_with_progress(grid: &mut FractalGrid, iterations: u32) -> Result<(), Error> {
    let (sender, receiver) = unbounded::<f64>();
    crossbeam::scope(|spawner| {
        spawner.spawn(move |_| {
            let mut done = 0.0;
            let mut reported = 0;
            for fraction in receiver.iter() {
                done += fraction;
                let tenths = (done * 10.0).floor() as u32;
                if tenths > reported {
                    reported = tenths;
                    info!("  {:>3}%", tenths * 10);
                }
            }
        });
        grid.iterate(iterations, Some(&sender));
        drop(sender);
    })
    .map_err(|_| format_err!("Progress reporter failed"))
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let params = grid_params(matches)?;
    let display = display_settings(matches)?;
    let iterations: u32 = number(matches, ITERATIONS)?;
    let step: u32 = number(matches, STEP)?;
    let output = value(matches, OUTPUT)?;

    let mut grid = build_grid(params)?;
    info!(
        "Rendering {} at {} (range {}) on a {}x{} grid",
        grid.function(),
        grid.center(),
        grid.range(),
        grid.size_x(),
        grid.size_y()
    );

    while grid.total_iterations() < iterations {
        let pass = step.min(iterations - grid.total_iterations());
        iterate_with_progress(&mut grid, pass)?;
        let (min, max) = grid.min_max_iterations();
        info!(
            "{} iterations done; counts range over {}..{}",
            grid.total_iterations(),
            min,
            max
        );
    }

    if let Some(raw) = matches.value_of(PROBE) {
        let point = parse_complex(raw)
            .ok_or_else(|| format_err!("Could not parse probe {:?}", raw))?;
        match grid.cell_at_point(point) {
            Some(cell) if cell.escaped => info!(
                "{} escaped after {} iterations at {}",
                cell.c, cell.iterations, cell.z
            ),
            Some(cell) => info!(
                "{} still bounded after {} iterations",
                cell.c, cell.iterations
            ),
            None => warn!("{} is outside the view", point),
        }
    }

    let indices = ColorMapper::new(&grid, display).map();
    let colors = display
        .palette
        .build(display.palette_size, display.use_sine_interpolation);
    let rgb = colorize(&indices, &colors);
    image::save_buffer(
        output,
        &rgb,
        grid.size_x() as u32,
        grid.size_y() as u32,
        ColorType::RGB(8),
    )?;
    info!("Wrote {}", output);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        for cause in e.iter_chain() {
            eprintln!("Render failure: {}", cause);
        }
        std::process::exit(1);
    }
}
