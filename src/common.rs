//! Console display helpers shared by the binaries

use std::time::Instant;

/// Counts events and reports their average rate since creation
pub struct RateMeter {
    start: Instant,
    count: u64,
}

impl RateMeter {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            count: 0,
        }
    }

    /// Record `n` more events
    pub fn add(&mut self, n: u64) {
        self.count += n;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Elapsed time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Average events per second
    pub fn rate_hz(&self) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed > 0.0 {
            self.count as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Default for RateMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Centered horizontal bar for signed values in `[-full_scale, full_scale]`
///
/// # Example
/// ```
/// use rover_sensor_dashboard::BarGauge;
///
/// // +1.5g on a ±2g scale, 40 cells wide
/// let gauge = BarGauge::new(2.0, 40);
/// println!("[{}]", gauge.render(1.5));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BarGauge {
    full_scale: f32,
    half_width: usize,
}

impl BarGauge {
    pub fn new(full_scale: f32, width: usize) -> Self {
        Self {
            full_scale: full_scale.abs().max(f32::EPSILON),
            half_width: width / 2,
        }
    }

    /// Render `value`; always `2 * half_width + 1` characters
    pub fn render(&self, value: f32) -> String {
        let normalized = if value.is_finite() {
            (value / self.full_scale).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let filled = ((normalized.abs() * self.half_width as f32) as usize).min(self.half_width);
        let blank = self.half_width - filled;

        let (left, right) = if normalized < 0.0 {
            (" ".repeat(blank) + &"█".repeat(filled), " ".repeat(self.half_width))
        } else {
            (" ".repeat(self.half_width), "█".repeat(filled) + &" ".repeat(blank))
        };
        format!("{}|{}", left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_zero() {
        let bar = BarGauge::new(2.0, 40).render(0.0);
        assert_eq!(bar.chars().count(), 41);
        assert!(!bar.contains('█'));
        assert_eq!(bar.chars().nth(20), Some('|'));
    }

    #[test]
    fn test_gauge_positive_fills_right() {
        let bar = BarGauge::new(2.0, 40).render(1.0);
        assert_eq!(bar.chars().count(), 41);
        let (left, right) = bar.split_once('|').unwrap();
        assert!(!left.contains('█'));
        assert_eq!(right.chars().filter(|&c| c == '█').count(), 10);
    }

    #[test]
    fn test_gauge_negative_fills_left() {
        let bar = BarGauge::new(2.0, 40).render(-4.0);
        let (left, right) = bar.split_once('|').unwrap();
        assert_eq!(left.chars().filter(|&c| c == '█').count(), 20);
        assert!(!right.contains('█'));
    }

    #[test]
    fn test_gauge_nan_renders_empty() {
        let bar = BarGauge::new(1.0, 10).render(f32::NAN);
        assert_eq!(bar, "     |     ");
    }

    #[test]
    fn test_rate_meter() {
        let mut meter = RateMeter::new();
        meter.add(5);
        meter.add(5);
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert_eq!(meter.count(), 10);
        assert!(meter.elapsed_secs() >= 0.01);
        assert!(meter.rate_hz() > 0.0);
    }
}
