use crate::Millis;

/// Time unit for configured durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl std::str::FromStr for TimeUnit {
    type Err = String;

    /// Parse TimeUnit from its full lowercase name: "milliseconds", "seconds", "minutes", "hours", "days".
    /// For shorthand notations like "17ms" or "1s", use `parse_duration` instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "milliseconds" => Ok(TimeUnit::Milliseconds),
            "seconds" => Ok(TimeUnit::Seconds),
            "minutes" => Ok(TimeUnit::Minutes),
            "hours" => Ok(TimeUnit::Hours),
            "days" => Ok(TimeUnit::Days),
            _ => Err(format!("Invalid time unit: {}", s)),
        }
    }
}

impl TimeUnit {
    pub fn to_millis(&self, value: f64) -> Millis {
        match self {
            TimeUnit::Milliseconds => value,
            TimeUnit::Seconds => value * 1000.0,
            TimeUnit::Minutes => value * 60_000.0,
            TimeUnit::Hours => value * 3_600_000.0,
            TimeUnit::Days => value * 86_400_000.0,
        }
    }

    /// Parse a duration string like "17ms", "1.5s", "2m"
    /// Returns (value, TimeUnit) if successful
    ///
    /// Only lowercase suffixes are accepted and no space is allowed between
    /// the number and its suffix.
    pub fn parse_duration(s: &str) -> Option<(f64, TimeUnit)> {
        let s = s.trim();

        let split_pos = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());

        if split_pos == 0 || split_pos == s.len() {
            return None;
        }

        let (num_str, unit_str) = s.split_at(split_pos);
        let value = num_str.parse::<f64>().ok()?;

        let time_unit = match unit_str {
            "ms" => TimeUnit::Milliseconds,
            "s" => TimeUnit::Seconds,
            "m" => TimeUnit::Minutes,
            "h" => TimeUnit::Hours,
            "d" => TimeUnit::Days,
            _ => return None,
        };

        Some((value, time_unit))
    }

    /// Resolve a configured duration to milliseconds.
    ///
    /// Accepts either a shorthand like "1s" or a bare number, which is read
    /// in `default_unit`.
    pub fn resolve_millis(s: &str, default_unit: TimeUnit) -> Option<Millis> {
        let millis = match Self::parse_duration(s) {
            Some((value, unit)) => unit.to_millis(value),
            None => default_unit.to_millis(s.trim().parse::<f64>().ok()?),
        };
        (millis.is_finite() && millis >= 0.0).then_some(millis)
    }
}
