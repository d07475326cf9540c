use crate::config::{
    ADC_FULL_SCALE_MV, ADC_MAX_COUNTS, BATTERY_DIVIDER, BATTERY_EMPTY_MV, BATTERY_FULL_MV,
};

/// Convert a raw single-ended SAADC sample to cell millivolts.
///
/// Negative samples (noise around 0 V) read as 0.
pub fn adc_to_millivolts(raw: i16) -> u32 {
    let counts = u32::from(raw.max(0).unsigned_abs());
    counts * ADC_FULL_SCALE_MV * BATTERY_DIVIDER / ADC_MAX_COUNTS
}

/// Map a cell voltage to a 0..=100 charge estimate (linear).
pub fn battery_percent(millivolts: u32) -> u8 {
    if millivolts <= BATTERY_EMPTY_MV {
        return 0;
    }
    if millivolts >= BATTERY_FULL_MV {
        return 100;
    }

    let span = BATTERY_FULL_MV - BATTERY_EMPTY_MV;
    ((millivolts - BATTERY_EMPTY_MV) * 100 / span) as u8
}
