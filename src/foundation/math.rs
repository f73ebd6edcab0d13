/// Round and saturate a float channel value into `0..=255`.
pub(crate) fn to_u8_sat(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Clamp a signed coordinate into `[0, len - 1]`. `len` must be non-zero.
pub(crate) fn clamp_coord(v: i64, len: u32) -> usize {
    v.clamp(0, i64::from(len) - 1) as usize
}

/// `ceil(a / b)` for block grids. `b` must be non-zero.
pub(crate) fn div_ceil_u32(a: u32, b: u32) -> u32 {
    a.div_ceil(b)
}
