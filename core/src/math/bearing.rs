/// Derives a stable pseudo-bearing in `[0, 360)` from a device identifier.
///
/// Runs the classic `hash * 31 + unit` string hash over UTF-16 code units
/// with signed 32-bit wraparound. The angle carries no directional meaning;
/// it only spreads devices around the origin consistently across requests.
pub fn bearing_from_identity(identifier: Option<&str>) -> u32 {
    let mut hash: i32 = 0;
    for unit in identifier.unwrap_or_default().encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash.unsigned_abs() % 360
}
