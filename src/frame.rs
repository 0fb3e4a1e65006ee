//! Binary telemetry frame decoding
//!
//! The rover pushes one WebSocket binary message per IMU reading. Each message
//! is exactly [`FRAME_LEN`] bytes: 13 little-endian IEEE-754 `f32` values in
//! this order:
//!
//! | index | value          |
//! |-------|----------------|
//! | 0     | temperature    |
//! | 1-3   | accel x, y, z  |
//! | 4-6   | gyro x, y, z   |
//! | 7-9   | gyro angle xyz |
//! | 10-12 | angle x, y, z  |
//!
//! The frame carries no timestamp; samples are stamped with the wall clock at
//! decode time.

use crate::error::{Result, TelemetryError};
use chrono::{DateTime, Local};

/// Number of `f32` values in a frame
pub const FRAME_VALUES: usize = 13;

/// Frame size in bytes
pub const FRAME_LEN: usize = FRAME_VALUES * 4;

/// Three-axis reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axes {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Axes {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One decoded telemetry reading
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Sensor temperature (°C)
    pub temperature: f32,
    /// Accelerometer (g)
    pub accelerometer: Axes,
    /// Gyroscope rate (°/s)
    pub gyroscope: Axes,
    /// Integrated gyroscope angle (°)
    pub gyro_angle: Axes,
    /// Fused angle (°)
    pub angle: Axes,
    /// Wall clock at decode time
    pub captured_at: DateTime<Local>,
}

impl Sample {
    /// Build a sample from values in wire order
    pub fn from_values(v: [f32; FRAME_VALUES], captured_at: DateTime<Local>) -> Self {
        Self {
            temperature: v[0],
            accelerometer: Axes::new(v[1], v[2], v[3]),
            gyroscope: Axes::new(v[4], v[5], v[6]),
            gyro_angle: Axes::new(v[7], v[8], v[9]),
            angle: Axes::new(v[10], v[11], v[12]),
            captured_at,
        }
    }

    /// Values in wire order
    pub fn values(&self) -> [f32; FRAME_VALUES] {
        SampleField::ALL.map(|field| field.value(self))
    }
}

/// Named scalar field of a [`Sample`], in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleField {
    Temperature,
    AccelX,
    AccelY,
    AccelZ,
    GyroX,
    GyroY,
    GyroZ,
    GyroAngleX,
    GyroAngleY,
    GyroAngleZ,
    AngleX,
    AngleY,
    AngleZ,
}

impl SampleField {
    pub const ALL: [SampleField; FRAME_VALUES] = [
        SampleField::Temperature,
        SampleField::AccelX,
        SampleField::AccelY,
        SampleField::AccelZ,
        SampleField::GyroX,
        SampleField::GyroY,
        SampleField::GyroZ,
        SampleField::GyroAngleX,
        SampleField::GyroAngleY,
        SampleField::GyroAngleZ,
        SampleField::AngleX,
        SampleField::AngleY,
        SampleField::AngleZ,
    ];

    /// Short name used for chart legends
    pub fn name(self) -> &'static str {
        match self {
            SampleField::Temperature => "temp",
            SampleField::AccelX => "accX",
            SampleField::AccelY => "accY",
            SampleField::AccelZ => "accZ",
            SampleField::GyroX => "gyroX",
            SampleField::GyroY => "gyroY",
            SampleField::GyroZ => "gyroZ",
            SampleField::GyroAngleX => "gyroAngleX",
            SampleField::GyroAngleY => "gyroAngleY",
            SampleField::GyroAngleZ => "gyroAngleZ",
            SampleField::AngleX => "angleX",
            SampleField::AngleY => "angleY",
            SampleField::AngleZ => "angleZ",
        }
    }

    /// Read this field from a sample
    pub fn value(self, sample: &Sample) -> f32 {
        match self {
            SampleField::Temperature => sample.temperature,
            SampleField::AccelX => sample.accelerometer.x,
            SampleField::AccelY => sample.accelerometer.y,
            SampleField::AccelZ => sample.accelerometer.z,
            SampleField::GyroX => sample.gyroscope.x,
            SampleField::GyroY => sample.gyroscope.y,
            SampleField::GyroZ => sample.gyroscope.z,
            SampleField::GyroAngleX => sample.gyro_angle.x,
            SampleField::GyroAngleY => sample.gyro_angle.y,
            SampleField::GyroAngleZ => sample.gyro_angle.z,
            SampleField::AngleX => sample.angle.x,
            SampleField::AngleY => sample.angle.y,
            SampleField::AngleZ => sample.angle.z,
        }
    }
}

/// Decode a frame, stamping it with the current wall clock
pub fn decode_frame(bytes: &[u8]) -> Result<Sample> {
    decode_frame_at(bytes, Local::now())
}

/// Decode a frame with an explicit capture time
///
/// All-or-nothing: any length other than [`FRAME_LEN`] is rejected without
/// looking at the contents.
pub fn decode_frame_at(bytes: &[u8], captured_at: DateTime<Local>) -> Result<Sample> {
    if bytes.len() != FRAME_LEN {
        return Err(TelemetryError::MalformedFrame {
            expected: FRAME_LEN,
            actual: bytes.len(),
        });
    }

    let mut values = [0.0f32; FRAME_VALUES];
    for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    Ok(Sample::from_values(values, captured_at))
}

/// Encode a sample into its wire representation
pub fn encode_frame(sample: &Sample) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    for (chunk, value) in frame.chunks_exact_mut(4).zip(sample.values()) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_field_order() {
        let bytes = frame_from(&[
            20.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
        ]);
        let sample = decode_frame(&bytes).unwrap();

        assert_eq!(sample.temperature, 20.0);
        assert_eq!(sample.accelerometer, Axes::new(1.0, 2.0, 3.0));
        assert_eq!(sample.gyroscope, Axes::new(4.0, 5.0, 6.0));
        assert_eq!(sample.gyro_angle, Axes::new(7.0, 8.0, 9.0));
        assert_eq!(sample.angle, Axes::new(10.0, 11.0, 12.0));
    }

    #[test]
    fn test_decode_rejects_wrong_lengths() {
        for len in [0, 4, 48, 51, 53, 56, 104] {
            let bytes = vec![0u8; len];
            assert_eq!(
                decode_frame(&bytes),
                Err(TelemetryError::MalformedFrame {
                    expected: FRAME_LEN,
                    actual: len
                })
            );
        }
    }

    #[test]
    fn test_decode_is_little_endian() {
        let mut bytes = vec![0u8; FRAME_LEN];
        // 1.0f32 = 0x3F800000
        bytes[0..4].copy_from_slice(&[0x00, 0x00, 0x80, 0x3F]);
        let sample = decode_frame(&bytes).unwrap();
        assert_eq!(sample.temperature, 1.0);
    }

    #[test]
    fn test_decode_uses_given_timestamp() {
        let at = Local::now() - chrono::TimeDelta::seconds(30);
        let sample = decode_frame_at(&[0u8; FRAME_LEN], at).unwrap();
        assert_eq!(sample.captured_at, at);
    }

    #[test]
    fn test_encode_matches_wire_layout() {
        let values = [
            -3.5, 0.25, -0.5, 1.0, 120.0, -90.0, 0.0, 15.0, 30.0, 45.0, 1.5, 2.5, 3.5,
        ];
        let sample = Sample::from_values(values, Local::now());
        assert_eq!(encode_frame(&sample).to_vec(), frame_from(&values));
    }

    #[test]
    fn test_field_names_follow_wire_order() {
        let names: Vec<_> = SampleField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names[0], "temp");
        assert_eq!(&names[1..4], &["accX", "accY", "accZ"]);
        assert_eq!(&names[10..], &["angleX", "angleY", "angleZ"]);
    }
}
