//! Battery and die-temperature telemetry.
//!
//! The cell voltage is sampled once through the SAADC (gain 1/6,
//! internal reference, 12 bit) behind a 1:2 divider.  Die temperature
//! comes from the SoftDevice, which owns the TEMP peripheral.

use embassy_nrf::saadc::Saadc;
use nrf_softdevice::Softdevice;

use crate::power_logic;

/// One telemetry reading, shown on the battery screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct Telemetry {
    pub battery_mv: u32,
    pub battery_percent: u8,
    /// `None` if the SoftDevice could not read the sensor.
    pub temperature_c: Option<i32>,
}

/// Take a single battery sample.
pub async fn read_battery_mv(saadc: &mut Saadc<'_, 1>) -> u32 {
    let mut buf = [0i16; 1];
    saadc.sample(&mut buf).await;
    power_logic::adc_to_millivolts(buf[0])
}

/// Die temperature in whole degrees Celsius.
pub fn read_temperature_c(sd: &Softdevice) -> Option<i32> {
    match nrf_softdevice::temperature_celsius(sd) {
        // Fixed point with two fractional bits.
        Ok(t) => Some(t.to_bits() / 4),
        Err(_) => {
            warn!("Die temperature unavailable");
            None
        }
    }
}

pub async fn sample(sd: &Softdevice, saadc: &mut Saadc<'_, 1>) -> Telemetry {
    saadc.calibrate().await;
    let battery_mv = read_battery_mv(saadc).await;
    let telemetry = Telemetry {
        battery_mv,
        battery_percent: power_logic::battery_percent(battery_mv),
        temperature_c: read_temperature_c(sd),
    };
    info!(
        "Battery: {} mV ({}%), temperature: {} C",
        telemetry.battery_mv, telemetry.battery_percent, telemetry.temperature_c
    );
    telemetry
}
