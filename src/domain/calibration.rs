//! BME280 calibration domain service
//!
//! Every BME280 is trimmed at the factory; the trimming parameters live in
//! the device's non-volatile memory and are needed to turn raw ADC counts
//! into physical units. This module decodes those parameters and applies the
//! datasheet's double-precision compensation formulas.

/// Length of the `0x88..=0x9F` temperature/pressure trimming block
pub const TP_BLOCK_LEN: usize = 24;

/// Length of the `0xE1..=0xE7` humidity trimming block
pub const H_BLOCK_LEN: usize = 7;

/// Factory trimming parameters of one BME280
///
/// Loaded once at startup and treated as read-only for the lifetime of the
/// process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bme280Calibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

/// Raw ADC counts from one burst read of `0xF7..=0xFE`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSample {
    pub adc_t: i32,
    pub adc_p: i32,
    pub adc_h: i32,
}

impl RawSample {
    /// Decode the 8 data registers (press msb/lsb/xlsb, temp msb/lsb/xlsb, hum msb/lsb)
    pub fn from_registers(raw: &[u8; 8]) -> Self {
        let adc_p = ((raw[0] as i32) << 12) | ((raw[1] as i32) << 4) | ((raw[2] as i32) >> 4);
        let adc_t = ((raw[3] as i32) << 12) | ((raw[4] as i32) << 4) | ((raw[5] as i32) >> 4);
        let adc_h = ((raw[6] as i32) << 8) | (raw[7] as i32);
        Self { adc_t, adc_p, adc_h }
    }
}

/// Compensated values in physical units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compensated {
    /// Celsius
    pub temperature: f64,
    /// Relative humidity, clamped to 0..=100
    pub humidity: f64,
    /// Hectopascal
    pub pressure: f64,
}

impl Bme280Calibration {
    /// Decode the trimming registers
    ///
    /// # Arguments
    ///
    /// * `tp` - registers `0x88..=0x9F`
    /// * `h1` - register `0xA1`
    /// * `h` - registers `0xE1..=0xE7`
    pub fn from_registers(tp: &[u8; TP_BLOCK_LEN], h1: u8, h: &[u8; H_BLOCK_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([tp[i], tp[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([tp[i], tp[i + 1]]);

        Self {
            dig_t1: u16_at(0),
            dig_t2: i16_at(2),
            dig_t3: i16_at(4),
            dig_p1: u16_at(6),
            dig_p2: i16_at(8),
            dig_p3: i16_at(10),
            dig_p4: i16_at(12),
            dig_p5: i16_at(14),
            dig_p6: i16_at(16),
            dig_p7: i16_at(18),
            dig_p8: i16_at(20),
            dig_p9: i16_at(22),
            dig_h1: h1,
            dig_h2: i16::from_le_bytes([h[0], h[1]]),
            dig_h3: h[2],
            // 0xE4[7:0] / 0xE5[3:0] and 0xE6[7:0] / 0xE5[7:4], both signed 12-bit
            dig_h4: ((h[3] as i8 as i16) << 4) | (h[4] & 0x0F) as i16,
            dig_h5: ((h[5] as i8 as i16) << 4) | (h[4] >> 4) as i16,
            dig_h6: h[6] as i8,
        }
    }

    /// Convert one raw sample into physical units
    pub fn compensate(&self, raw: RawSample) -> Compensated {
        let t_fine = self.t_fine(raw.adc_t);
        Compensated {
            temperature: t_fine / 5120.0,
            humidity: self.humidity(raw.adc_h, t_fine),
            pressure: self.pressure_pa(raw.adc_p, t_fine) / 100.0,
        }
    }

    /// Fine temperature shared by the pressure and humidity formulas
    fn t_fine(&self, adc_t: i32) -> f64 {
        let adc_t = adc_t as f64;
        let t1 = self.dig_t1 as f64;
        let var1 = (adc_t / 16384.0 - t1 / 1024.0) * self.dig_t2 as f64;
        let delta = adc_t / 131072.0 - t1 / 8192.0;
        let var2 = delta * delta * self.dig_t3 as f64;
        var1 + var2
    }

    fn pressure_pa(&self, adc_p: i32, t_fine: f64) -> f64 {
        let mut var1 = t_fine / 2.0 - 64000.0;
        let mut var2 = var1 * var1 * self.dig_p6 as f64 / 32768.0;
        var2 += var1 * self.dig_p5 as f64 * 2.0;
        var2 = var2 / 4.0 + self.dig_p4 as f64 * 65536.0;
        var1 = (self.dig_p3 as f64 * var1 * var1 / 524288.0 + self.dig_p2 as f64 * var1) / 524288.0;
        var1 = (1.0 + var1 / 32768.0) * self.dig_p1 as f64;
        if var1 == 0.0 {
            // avoid division by zero on blank calibration
            return 0.0;
        }
        let mut p = 1048576.0 - adc_p as f64;
        p = (p - var2 / 4096.0) * 6250.0 / var1;
        var1 = self.dig_p9 as f64 * p * p / 2147483648.0;
        var2 = p * self.dig_p8 as f64 / 32768.0;
        p + (var1 + var2 + self.dig_p7 as f64) / 16.0
    }

    fn humidity(&self, adc_h: i32, t_fine: f64) -> f64 {
        let var = t_fine - 76800.0;
        let offset = self.dig_h4 as f64 * 64.0 + self.dig_h5 as f64 / 16384.0 * var;
        let curvature = 1.0 + self.dig_h3 as f64 / 67108864.0 * var;
        let gain =
            self.dig_h2 as f64 / 65536.0 * (1.0 + self.dig_h6 as f64 / 67108864.0 * var * curvature);
        let h = (adc_h as f64 - offset) * gain;
        let h = h * (1.0 - self.dig_h1 as f64 * h / 524288.0);
        h.clamp(0.0, 100.0)
    }
}
