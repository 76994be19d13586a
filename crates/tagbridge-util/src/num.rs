/// Narrow a length or index to `u32` for the FFI, clamping instead of wrapping
pub fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
