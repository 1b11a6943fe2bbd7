//! Millisecond to GIF time-unit conversion.
//!
//! GIF frame delays are stored in hundredths of a second. Descriptor delays are rounded to the
//! nearest centisecond, halves rounding up (`5 ms -> 1 cs`, `14 ms -> 1 cs`, `15 ms -> 2 cs`),
//! and saturate at the format maximum. Multiples of 10 ms convert exactly.

/// Milliseconds per GIF delay tick.
pub const GIF_TICK_MS: u32 = 10;

/// Convert a descriptor delay to GIF centiseconds.
pub fn delay_ms_to_centis(delay_ms: u32) -> u16 {
    let centis = (u64::from(delay_ms) + u64::from(GIF_TICK_MS / 2)) / u64::from(GIF_TICK_MS);
    u16::try_from(centis).unwrap_or(u16::MAX)
}

/// Convert GIF centiseconds back to milliseconds.
pub fn centis_to_ms(centis: u16) -> u32 {
    u32::from(centis) * GIF_TICK_MS
}

#[cfg(test)]
#[path = "../../tests/unit/ugoira/timing.rs"]
mod tests;
