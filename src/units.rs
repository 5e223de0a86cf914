use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const KG_PER_LB: f64 = 0.453_592_37;

/// User facing weight unit. Stored weights are always kilograms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn label(self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }

    /// Kilograms to this unit. Pounds are rounded to one decimal, kilograms
    /// pass through untouched.
    pub fn to_display(self, kg: f64) -> f64 {
        let kg = finite_or_zero(kg);
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lb => round_to(kg / KG_PER_LB, 1),
        }
    }

    /// A value entered in this unit back to kilograms, without rounding so a
    /// typed `1` lb stays `1` lb on the next render.
    pub fn from_display(self, value: f64) -> f64 {
        let value = finite_or_zero(value);
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lb => value * KG_PER_LB,
        }
    }

    /// Display string with the unit suffix, e.g. `"132.3 lb"`.
    pub fn format(self, kg: f64) -> String {
        let v = self.to_display(kg);
        if v.fract() == 0.0 {
            format!("{v:.0} {}", self.label())
        } else {
            format!("{} {}", round_to(v, 2), self.label())
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" | "kgs" => Ok(WeightUnit::Kg),
            "lb" | "lbs" => Ok(WeightUnit::Lb),
            other => Err(format!("unknown weight unit '{other}', expected kg or lb")),
        }
    }
}

pub fn to_display_weight(kg: f64, unit: WeightUnit) -> f64 {
    unit.to_display(kg)
}

pub fn from_display_weight(value: f64, unit: WeightUnit) -> f64 {
    unit.from_display(value)
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kilograms_are_identity() {
        assert_eq!(to_display_weight(62.345, WeightUnit::Kg), 62.345);
        assert_eq!(from_display_weight(62.345, WeightUnit::Kg), 62.345);
    }

    #[test]
    fn pounds_round_to_one_decimal() {
        assert_eq!(to_display_weight(100.0, WeightUnit::Lb), 220.5);
        assert_eq!(to_display_weight(60.0, WeightUnit::Lb), 132.3);
        assert_eq!(to_display_weight(0.0, WeightUnit::Lb), 0.0);
    }

    #[test]
    fn one_pound_is_not_rounded_on_the_way_in() {
        let kg = from_display_weight(1.0, WeightUnit::Lb);
        assert_eq!(kg, KG_PER_LB);
        assert_eq!(to_display_weight(kg, WeightUnit::Lb), 1.0);
    }

    #[test]
    fn round_trip_within_display_precision() {
        // 0.05 lb of display rounding is at most ~0.0227 kg
        let tolerance = 0.05 * KG_PER_LB;
        for kg in [0.0, 1.0, 2.5, 20.0, 42.5, 60.0, 62.5, 100.0, 142.5, 227.3, 315.0] {
            let back = from_display_weight(to_display_weight(kg, WeightUnit::Lb), WeightUnit::Lb);
            assert!((back - kg).abs() <= tolerance + 1e-9, "{kg} -> {back}");
        }
    }

    #[test]
    fn non_finite_input_is_zero() {
        assert_eq!(to_display_weight(f64::NAN, WeightUnit::Lb), 0.0);
        assert_eq!(from_display_weight(f64::INFINITY, WeightUnit::Kg), 0.0);
    }

    #[test]
    fn format_with_suffix() {
        assert_eq!(WeightUnit::Kg.format(60.0), "60 kg");
        assert_eq!(WeightUnit::Kg.format(62.5), "62.5 kg");
        assert_eq!(WeightUnit::Lb.format(60.0), "132.3 lb");
    }

    #[test]
    fn parse_and_serde_names() {
        assert_eq!("LBS".parse::<WeightUnit>(), Ok(WeightUnit::Lb));
        assert!("stone".parse::<WeightUnit>().is_err());
        assert_eq!(serde_json::to_string(&WeightUnit::Lb).unwrap(), "\"lb\"");
    }
}
