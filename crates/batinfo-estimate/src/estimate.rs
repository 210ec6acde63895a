//! Capacity and remaining-time estimates
//!
//! All functions are pure: the same inputs always give the same output.

use batinfo_config::UserOverrides;
use serde::Serialize;

/// Unit suffix used in catalog capacities
pub const CAPACITY_UNIT: &str = "mAh";

/// Assumed linear discharge: 1/60 of a full charge per hour, whatever the device or load
pub const DISCHARGE_RATE_PER_HOUR: f64 = 1.0 / 60.0;

/// Numeric part of a capacity such as `3227mAh`; 0 when absent or unparseable
pub fn parse_capacity(raw: &str) -> f64 {
    let value = raw.trim();
    let value = match value.len().checked_sub(CAPACITY_UNIT.len()) {
        Some(split) => match value.get(split..) {
            Some(suffix) if suffix.eq_ignore_ascii_case(CAPACITY_UNIT) => &value[..split],
            _ => value,
        },
        None => value,
    };

    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse an override; unparseable values count as unset
fn parse_override(raw: Option<&str>, name: &str) -> Option<f64> {
    let raw = raw?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            tracing::debug!("Ignoring unparseable {} override: {:?}", name, raw);
            None
        }
    }
}

/// Current charge in mAh
///
/// `round((measured ?? nominal) * fraction * (health ?? 100) / 100)`
pub fn current_capacity(nominal: Option<&str>, fraction: f32, overrides: &UserOverrides) -> i64 {
    let mut capacity = nominal.map(parse_capacity).unwrap_or(0.0);

    if let Some(measured) = parse_override(overrides.measured_capacity(), "capacity") {
        capacity = measured;
    }

    capacity *= f64::from(fraction);

    if let Some(health) = parse_override(overrides.health_percent(), "health") {
        capacity = capacity * health / 100.0;
    }

    capacity.round() as i64
}

/// Live fraction as a whole percentage
pub fn level_percent(fraction: f32) -> i64 {
    (f64::from(fraction) * 100.0).round() as i64
}

/// `(<mAh>mAh) <percent>%`
pub fn format_current_charge(
    nominal: Option<&str>,
    fraction: f32,
    overrides: &UserOverrides,
) -> String {
    format!(
        "({}{}) {}%",
        current_capacity(nominal, fraction, overrides),
        CAPACITY_UNIT,
        level_percent(fraction)
    )
}

/// Measured capacity scaled by health, or `None` when no capacity was entered
pub fn actual_capacity(overrides: &UserOverrides) -> Option<i64> {
    let measured = parse_override(overrides.measured_capacity(), "capacity")?;
    let health = parse_override(overrides.health_percent(), "health").unwrap_or(100.0);
    Some((measured * health / 100.0).round() as i64)
}

/// Entered health percentage
pub fn health_percent(overrides: &UserOverrides) -> Option<i64> {
    parse_override(overrides.health_percent(), "health").map(|h| h.round() as i64)
}

/// Remaining usage time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemainingTime {
    pub hours: u32,
    pub minutes: u32,
}

impl RemainingTime {
    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

/// Remaining time at the fixed discharge rate, to the nearest minute
pub fn estimate_remaining(fraction: f32) -> RemainingTime {
    let fraction = f64::from(fraction).clamp(0.0, 1.0);
    let hours = fraction / DISCHARGE_RATE_PER_HOUR;
    let total_minutes = (hours * 60.0).round() as u32;

    RemainingTime {
        hours: total_minutes / 60,
        minutes: total_minutes % 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(measured: &str, health: &str) -> UserOverrides {
        UserOverrides {
            measured_capacity: measured.into(),
            health_percent: health.into(),
        }
    }

    #[test]
    fn test_parse_capacity() {
        assert_eq!(parse_capacity("3000mAh"), 3000.0);
        assert_eq!(parse_capacity(" 3227 mAh "), 3227.0);
        assert_eq!(parse_capacity("4100MAH"), 4100.0);
        assert_eq!(parse_capacity("2815"), 2815.0);
        assert_eq!(parse_capacity(""), 0.0);
        assert_eq!(parse_capacity("mAh"), 0.0);
        assert_eq!(parse_capacity("unknown"), 0.0);
        assert_eq!(parse_capacity("NaNmAh"), 0.0);
    }

    #[test]
    fn test_parse_capacity_multibyte() {
        assert_eq!(parse_capacity("电池"), 0.0);
        assert_eq!(parse_capacity("3000毫安"), 0.0);
    }

    #[test]
    fn test_current_charge_no_overrides() {
        let none = UserOverrides::default();
        assert_eq!(current_capacity(Some("3000mAh"), 0.5, &none), 1500);
        assert_eq!(
            format_current_charge(Some("3000mAh"), 0.5, &none),
            "(1500mAh) 50%"
        );
    }

    #[test]
    fn test_current_charge_with_overrides() {
        let o = overrides("2800", "90");
        assert_eq!(current_capacity(Some("3000mAh"), 0.8, &o), 2016);
        assert_eq!(
            format_current_charge(Some("3000mAh"), 0.8, &o),
            "(2016mAh) 80%"
        );
    }

    #[test]
    fn test_measured_replaces_nominal() {
        let o = overrides("2000", "");
        assert_eq!(current_capacity(Some("3000mAh"), 1.0, &o), 2000);
        assert_eq!(current_capacity(None, 1.0, &o), 2000);
    }

    #[test]
    fn test_health_scales_nominal() {
        let o = overrides("", "50");
        assert_eq!(current_capacity(Some("3000mAh"), 1.0, &o), 1500);
    }

    #[test]
    fn test_missing_nominal_is_zero() {
        let none = UserOverrides::default();
        assert_eq!(current_capacity(None, 0.7, &none), 0);
        assert_eq!(format_current_charge(None, 0.7, &none), "(0mAh) 70%");
    }

    #[test]
    fn test_unparseable_overrides_ignored() {
        let o = overrides("abc", "x");
        assert_eq!(current_capacity(Some("3000mAh"), 0.5, &o), 1500);
        assert_eq!(actual_capacity(&o), None);
        assert_eq!(health_percent(&o), None);
    }

    #[test]
    fn test_no_lower_bound() {
        let o = overrides("-1000", "0");
        assert_eq!(current_capacity(Some("3000mAh"), 0.5, &o), 0);
        assert_eq!(actual_capacity(&overrides("-1000", "")), Some(-1000));
    }

    #[test]
    fn test_matches_formula() {
        let cases: &[(Option<&str>, f32, &str, &str)] = &[
            (Some("3227mAh"), 0.37, "", ""),
            (Some("1821mAh"), 0.99, "", "87"),
            (Some("4352mAh"), 0.01, "4000", ""),
            (None, 0.63, "3100", "95"),
            (Some("2600mAh"), 0.0, "2500", "80"),
        ];

        for &(nominal, fraction, measured, health) in cases {
            let o = overrides(measured, health);
            let base = measured
                .parse::<f64>()
                .unwrap_or_else(|_| nominal.map(parse_capacity).unwrap_or(0.0));
            let h = health.parse::<f64>().unwrap_or(100.0);
            let expected = (base * f64::from(fraction) * (h / 100.0)).round() as i64;
            assert_eq!(current_capacity(nominal, fraction, &o), expected);
        }
    }

    #[test]
    fn test_recompute_is_identical() {
        let o = overrides("2800", "90");
        let first = format_current_charge(Some("3000mAh"), 0.42, &o);
        let second = format_current_charge(Some("3000mAh"), 0.42, &o);
        assert_eq!(first, second);
    }

    #[test]
    fn test_actual_capacity() {
        assert_eq!(actual_capacity(&overrides("3000", "95")), Some(2850));
        assert_eq!(actual_capacity(&overrides("3000", "")), Some(3000));
        assert_eq!(actual_capacity(&overrides("", "95")), None);
    }

    #[test]
    fn test_health_percent() {
        assert_eq!(health_percent(&overrides("", "88")), Some(88));
        assert_eq!(health_percent(&UserOverrides::default()), None);
    }

    #[test]
    fn test_remaining_full_charge() {
        assert_eq!(
            estimate_remaining(1.0),
            RemainingTime {
                hours: 60,
                minutes: 0
            }
        );
    }

    #[test]
    fn test_remaining_partial_charge() {
        assert_eq!(
            estimate_remaining(0.5),
            RemainingTime {
                hours: 30,
                minutes: 0
            }
        );
        // 0.37 * 60 = 22.2 hours
        assert_eq!(
            estimate_remaining(0.37),
            RemainingTime {
                hours: 22,
                minutes: 12
            }
        );
        assert_eq!(estimate_remaining(0.0).total_minutes(), 0);
    }

    #[test]
    fn test_remaining_clamps_out_of_range() {
        assert_eq!(estimate_remaining(-1.0).total_minutes(), 0);
        assert_eq!(estimate_remaining(2.0), estimate_remaining(1.0));
    }
}
