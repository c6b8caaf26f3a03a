// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Named color tables for the indices the color mapper produces.
//! Entry 0 is the in-set color; the rest is a gradient across two or
//! three color stops.

use log::warn;
use std::fmt;

/// An RGB triple.
pub type Rgb = [u8; 3];

const BLACK: Rgb = [0, 0, 0];
const WHITE: Rgb = [255, 255, 255];
const BLUE: Rgb = [0, 0, 255];
const GREEN: Rgb = [0, 128, 0];
const RED: Rgb = [255, 0, 0];
const ORANGE: Rgb = [255, 165, 0];
const MAGENTA: Rgb = [255, 0, 255];
const YELLOW: Rgb = [255, 255, 0];
const INDIGO: Rgb = [75, 0, 130];
const HOT_PINK: Rgb = [255, 105, 180];
const DEEP_PINK: Rgb = [255, 20, 147];

/// The built-in palettes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Palette {
    /// Blue through white to orange.
    BlueWhiteOrange,
    /// Blue through green to red.
    BlueGreenRed,
    /// Green through white to magenta.
    GreenWhiteMagenta,
    /// Red through yellow to green.
    RedYellowGreen,
    /// Indigo through orange to white.
    IndigoOrangeWhite,
    /// Near-black to white.
    GrayScale,
    /// Shades of red.
    RedScale,
    /// Shades of blue.
    BlueScale,
    /// Shades of green.
    GreenScale,
    /// Shades of yellow.
    YellowScale,
    /// Shades of cyan.
    CyanScale,
    /// Shades of magenta.
    MagentaScale,
    /// Dark magenta to hot pink.
    PinkScale,
    /// Near-white to deep pink, on a white set.
    WhitePinkScale,
    /// Deep pink to pale pink, on a white set.
    JojoScale,
}

enum Stops {
    Two(Rgb, Rgb),
    Three(Rgb, Rgb, Rgb),
}

impl Palette {
    /// Every palette.
    pub const ALL: [Palette; 15] = [
        Palette::BlueWhiteOrange,
        Palette::BlueGreenRed,
        Palette::GreenWhiteMagenta,
        Palette::RedYellowGreen,
        Palette::IndigoOrangeWhite,
        Palette::GrayScale,
        Palette::RedScale,
        Palette::BlueScale,
        Palette::GreenScale,
        Palette::YellowScale,
        Palette::CyanScale,
        Palette::MagentaScale,
        Palette::PinkScale,
        Palette::WhitePinkScale,
        Palette::JojoScale,
    ];

    /// Parses a name like "gray-scale" or "BlueWhiteOrange".  Unknown
    /// names get BlueWhiteOrange.
    pub fn from_name(name: &str) -> Palette {
        let wanted: String = name
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .flat_map(|ch| ch.to_lowercase())
            .collect();
        for palette in Palette::ALL.iter() {
            if format!("{:?}", palette).to_lowercase() == wanted {
                return *palette;
            }
        }
        warn!("Unknown palette {:?}, using BlueWhiteOrange", name);
        Palette::BlueWhiteOrange
    }

    fn in_set(self) -> Rgb {
        match self {
            Palette::WhitePinkScale | Palette::JojoScale => WHITE,
            _ => BLACK,
        }
    }

    fn stops(self) -> Stops {
        match self {
            Palette::BlueWhiteOrange => Stops::Three(BLUE, WHITE, ORANGE),
            Palette::BlueGreenRed => Stops::Three(BLUE, GREEN, RED),
            Palette::GreenWhiteMagenta => Stops::Three(GREEN, WHITE, MAGENTA),
            Palette::RedYellowGreen => Stops::Three(RED, YELLOW, GREEN),
            Palette::IndigoOrangeWhite => Stops::Three(INDIGO, ORANGE, WHITE),
            Palette::GrayScale => Stops::Two([1, 1, 1], WHITE),
            Palette::RedScale => Stops::Two([1, 0, 0], RED),
            Palette::BlueScale => Stops::Two([0, 0, 1], BLUE),
            Palette::GreenScale => Stops::Two([0, 1, 0], [0, 255, 0]),
            Palette::YellowScale => Stops::Two([1, 1, 0], YELLOW),
            Palette::CyanScale => Stops::Two([0, 1, 1], [0, 255, 255]),
            Palette::MagentaScale => Stops::Two([1, 0, 1], MAGENTA),
            Palette::PinkScale => Stops::Two([1, 0, 1], HOT_PINK),
            Palette::WhitePinkScale => Stops::Two([254, 254, 254], DEEP_PINK),
            Palette::JojoScale => Stops::Two(DEEP_PINK, [255, 219, 230]),
        }
    }

    /// Exactly `size` colors: the in-set color, then the gradient.
    /// With `sine` the gradient eases in and out of each stop.
    pub fn build(self, size: usize, sine: bool) -> Vec<Rgb> {
        let mut colors = Vec::with_capacity(size);
        if size == 0 {
            return colors;
        }
        colors.push(self.in_set());
        let count = size - 1;
        match self.stops() {
            Stops::Two(start, end) => colors.extend(interpolate(start, end, count, sine)),
            Stops::Three(start, middle, end) => {
                // The middle stop is shared, so the gradient needs an
                // odd length; build one more and drop it.
                let odd = if count % 2 == 1 { count } else { count + 1 };
                let half = (odd + 1) / 2;
                let mut first = interpolate(start, middle, half, sine);
                first.pop();
                colors.extend(first);
                colors.extend(interpolate(middle, end, half, sine));
                colors.truncate(size);
            }
        }
        colors
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn interpolate(start: Rgb, end: Rgb, count: usize, sine: bool) -> Vec<Rgb> {
    (0..count)
        .map(|n| {
            let mut r = if count > 1 {
                n as f64 / (count - 1) as f64
            } else {
                0.0
            };
            if sine {
                r = ((r * std::f64::consts::PI - std::f64::consts::FRAC_PI_2).sin() + 1.0) / 2.0;
            }
            let mut rgb = [0u8; 3];
            for channel in 0..3 {
                let mixed = (1.0 - r) * f64::from(start[channel]) + r * f64::from(end[channel]);
                rgb[channel] = mixed as u8;
            }
            rgb
        })
        .collect()
}

/// Expands palette indices into packed RGB bytes.  Indices past the
/// end of the palette take its last color.
pub fn colorize(indices: &[u8], colors: &[Rgb]) -> Vec<u8> {
    let last = colors.last().cloned().unwrap_or(BLACK);
    let mut rgb = Vec::with_capacity(indices.len() * 3);
    for &index in indices {
        rgb.extend_from_slice(&colors.get(usize::from(index)).cloned().unwrap_or(last));
    }
    rgb
}
