// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors the engine can hand back to its caller.

use failure::Fail;

/// Everything that can go wrong building or rebuilding a grid.
#[derive(Debug, Fail, PartialEq)]
pub enum EngineError {
    /// The cell storage for a grid of this size could not be
    /// allocated.  Retrying with smaller dimensions is expected to
    /// work.
    #[fail(display = "cannot allocate a {}x{} grid", size_x, size_y)]
    Allocation {
        /// Requested width in cells.
        size_x: usize,
        /// Requested height in cells.
        size_y: usize,
    },
}
