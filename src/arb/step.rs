//! Plateau boundaries of integer quote functions.
//!
//! Pool quotes truncate, so `amount_out` is a non-decreasing step function of the input.
//! These searches find the first and last input of the plateau a point sits on, probing
//! in powers of ten: widen the probe until the output changes, then walk towards the
//! boundary one decimal digit at a time.

use alloy::primitives::U256;

/// Probe growth factor
const TEN: U256 = U256::from_limbs([10, 0, 0, 0]);

/// Smallest input `y <= x` with `f(y) == f(x)`.
///
/// `f` must be non-decreasing.
pub fn step_start(f: impl Fn(U256) -> U256, mut x: U256) -> U256 {
    let target = f(x);
    let mut dx = U256::from(1);

    while let Some(wide) = dx.checked_mul(TEN) {
        if wide > x || f(x - wide) != target {
            break;
        }
        dx = wide;
    }

    while !dx.is_zero() {
        if dx <= x && f(x - dx) == target {
            x -= dx;
        } else {
            dx /= TEN;
        }
    }
    x
}

/// Largest input `y` in `[x, upper]` with `f(y) == f(x)`.
///
/// `f` must be non-decreasing. The bound keeps the search finite on a function that
/// never changes again (a dry path quotes zero forever).
pub fn step_end(f: impl Fn(U256) -> U256, mut x: U256, upper: U256) -> U256 {
    if x >= upper {
        return x;
    }
    let target = f(x);
    let mut dx = U256::from(1);

    while let Some(wide) = dx.checked_mul(TEN) {
        match x.checked_add(wide) {
            Some(probe) if probe <= upper && f(probe) == target => dx = wide,
            _ => break,
        }
    }

    while !dx.is_zero() {
        match x.checked_add(dx) {
            Some(probe) if probe <= upper && f(probe) == target => x = probe,
            _ => dx /= TEN,
        }
    }
    x
}
