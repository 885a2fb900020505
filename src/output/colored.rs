//! Latency color coding for terminal output

use colored::*;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-300ms
    Poor,       // 300-1000ms
    VeryPoor,   // > 1000ms
}

impl LatencyLevel {
    /// Determine latency level from a duration in milliseconds
    pub fn from_ms(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 100.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }
}

/// Format milliseconds with two decimals, colored by level when enabled
pub fn format_ms(value: f64, enable_color: bool) -> String {
    let text = format!("{:.2}ms", value);
    if enable_color {
        text.color(LatencyLevel::from_ms(value).color()).to_string()
    } else {
        text
    }
}

/// Dimmed placeholder for a trend without samples
pub fn format_no_data(enable_color: bool) -> String {
    if enable_color {
        "no data".dimmed().to_string()
    } else {
        "no data".to_string()
    }
}

/// Bold section heading
pub fn format_heading(text: &str, enable_color: bool) -> String {
    if enable_color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_levels() {
        assert_eq!(LatencyLevel::from_ms(10.0), LatencyLevel::Excellent);
        assert_eq!(LatencyLevel::from_ms(75.0), LatencyLevel::Good);
        assert_eq!(LatencyLevel::from_ms(120.0), LatencyLevel::Fair);
        assert_eq!(LatencyLevel::from_ms(410.25), LatencyLevel::Poor);
        assert_eq!(LatencyLevel::from_ms(2500.0), LatencyLevel::VeryPoor);
    }

    #[test]
    fn test_plain_formatting() {
        assert_eq!(format_ms(340.5, false), "340.50ms");
        assert_eq!(format_ms(0.004, false), "0.00ms");
        assert_eq!(format_no_data(false), "no data");
        assert_eq!(format_heading("P(95) Metrics:", false), "P(95) Metrics:");
    }

    #[test]
    fn test_colored_formatting_keeps_value() {
        colored::control::set_override(true);
        let text = format_ms(120.0, true);
        colored::control::unset_override();
        assert!(text.contains("120.00ms"));
    }
}
