//! stats::scaler
//!
//! Human-readable rendering of benchmark values.
//!
//! A scaler is chosen once per row from the row's first mean so that the
//! old and new columns share a prefix and compare at a glance.

/// Unit family of a benchmark measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    /// `ns/op`: rendered as ns, µs, ms, s
    Time,
    /// `B/op`: rendered as B, kB, MB, GB
    Bytes,
    /// `MB/s`: rendered as MB/s, GB/s
    Throughput,
    /// Anything else: bare count with k, M, G prefixes
    Count,
}

impl Family {
    fn of(unit: &str) -> Self {
        match unit {
            "ns/op" => Family::Time,
            "B/op" => Family::Bytes,
            "MB/s" => Family::Throughput,
            _ => Family::Count,
        }
    }
}

/// Formats values of one unit with a fixed prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    divisor: f64,
    suffix: &'static str,
}

impl Scaler {
    /// Choose a prefix suited to `value` measured in `unit`.
    pub fn new(value: f64, unit: &str) -> Self {
        let magnitude = value.abs();
        let (divisor, suffix) = match Family::of(unit) {
            Family::Time => pick(magnitude, &[(1e9, "s"), (1e6, "ms"), (1e3, "µs")], "ns"),
            Family::Bytes => pick(magnitude, &[(1e9, "GB"), (1e6, "MB"), (1e3, "kB")], "B"),
            Family::Throughput => pick(magnitude, &[(1e3, "GB/s")], "MB/s"),
            Family::Count => pick(magnitude, &[(1e9, "G"), (1e6, "M"), (1e3, "k")], ""),
        };
        Self { divisor, suffix }
    }

    /// Render `value` with three significant figures and the chosen prefix.
    pub fn format(&self, value: f64) -> String {
        let scaled = value / self.divisor;
        let magnitude = scaled.abs();
        let number = if magnitude >= 99.95 {
            format!("{:.0}", scaled)
        } else if magnitude >= 9.995 {
            format!("{:.1}", scaled)
        } else {
            format!("{:.2}", scaled)
        };
        format!("{}{}", number, self.suffix)
    }
}

fn pick(magnitude: f64, steps: &[(f64, &'static str)], base: &'static str) -> (f64, &'static str) {
    steps
        .iter()
        .find(|(threshold, _)| magnitude >= *threshold)
        .copied()
        .unwrap_or((1.0, base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_prefixes() {
        assert_eq!(Scaler::new(12.0, "ns/op").format(12.0), "12.0ns");
        assert_eq!(Scaler::new(1234.0, "ns/op").format(1234.0), "1.23µs");
        assert_eq!(Scaler::new(2.5e6, "ns/op").format(2.5e6), "2.50ms");
        assert_eq!(Scaler::new(3e9, "ns/op").format(3e9), "3.00s");
    }

    #[test]
    fn shared_prefix_across_values() {
        let scaler = Scaler::new(1234.0, "ns/op");
        assert_eq!(scaler.format(987.0), "0.99µs");
        assert_eq!(scaler.format(123_456.0), "123µs");
    }

    #[test]
    fn byte_and_count_prefixes() {
        assert_eq!(Scaler::new(256.0, "B/op").format(256.0), "256B");
        assert_eq!(Scaler::new(4096.0, "B/op").format(4096.0), "4.10kB");
        assert_eq!(Scaler::new(3.0, "allocs/op").format(3.0), "3.00");
        assert_eq!(Scaler::new(1500.0, "allocs/op").format(1500.0), "1.50k");
    }

    #[test]
    fn throughput_prefixes() {
        assert_eq!(Scaler::new(400.0, "MB/s").format(400.0), "400MB/s");
        assert_eq!(Scaler::new(2500.0, "MB/s").format(2500.0), "2.50GB/s");
    }

    #[test]
    fn rounding_boundary_keeps_three_figures() {
        assert_eq!(Scaler::new(9.999, "allocs/op").format(9.999), "10.0");
        assert_eq!(Scaler::new(99.99, "allocs/op").format(99.99), "100");
    }
}
