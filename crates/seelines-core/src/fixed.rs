use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits. Used for the
/// credit ledger.
pub type Fixed64 = I32F32;

/// Simulation ticks since the engine was created.
pub type Ticks = u64;

/// Convert an f64 to Fixed64, saturating at the representable range.
/// NaN converts to zero.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        return Fixed64::ZERO;
    }
    Fixed64::saturating_from_num(v)
}

/// Convert Fixed64 to f64 for display and float-side arithmetic.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}
