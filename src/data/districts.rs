//! Hand-authored district-level groundwater anomalies.
//!
//! The satellite products used here are national averages; these per-district
//! values are representative estimates (cm relative to normal), not derived
//! from the gridded data.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DistrictStatus {
    Critical,
    Warning,
    Moderate,
    Improving,
}

impl DistrictStatus {
    pub fn from_anomaly(cm: f64) -> Self {
        if cm < -10.0 {
            DistrictStatus::Critical
        } else if cm < -5.0 {
            DistrictStatus::Warning
        } else if cm < 0.0 {
            DistrictStatus::Moderate
        } else {
            DistrictStatus::Improving
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistrictStatus::Critical => "Critical",
            DistrictStatus::Warning => "Warning",
            DistrictStatus::Moderate => "Moderate",
            DistrictStatus::Improving => "Improving",
        }
    }
}

impl fmt::Display for DistrictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct District {
    pub province: &'static str,
    pub name: &'static str,
    pub anomaly_cm: f64,
}

impl District {
    pub fn status(&self) -> DistrictStatus {
        DistrictStatus::from_anomaly(self.anomaly_cm)
    }
}

const fn d(province: &'static str, name: &'static str, anomaly_cm: f64) -> District {
    District {
        province,
        name,
        anomaly_cm,
    }
}

const PUNJAB: &str = "Punjab";
const SINDH: &str = "Sindh";
const KP: &str = "Khyber Pakhtunkhwa";
const BALOCHISTAN: &str = "Balochistan";

pub const DISTRICTS: [District; 32] = [
    d(PUNJAB, "Lahore", -12.5),
    d(PUNJAB, "Faisalabad", -10.8),
    d(PUNJAB, "Multan", -9.2),
    d(PUNJAB, "Rawalpindi", -6.5),
    d(PUNJAB, "Gujranwala", -11.3),
    d(PUNJAB, "Sialkot", -9.8),
    d(PUNJAB, "Sargodha", -10.9),
    d(PUNJAB, "Bahawalpur", -8.1),
    d(PUNJAB, "Sheikhupura", -10.2),
    d(PUNJAB, "Jhang", -7.4),
    d(SINDH, "Karachi", -4.3),
    d(SINDH, "Hyderabad", -6.5),
    d(SINDH, "Sukkur", -7.8),
    d(SINDH, "Larkana", -8.4),
    d(SINDH, "Mirpur Khas", -7.1),
    d(SINDH, "Nawabshah", -8.0),
    d(SINDH, "Jacobabad", -9.3),
    d(SINDH, "Shikarpur", -8.9),
    d(KP, "Peshawar", -5.3),
    d(KP, "Mardan", -4.8),
    d(KP, "Mingora", -1.2),
    d(KP, "Abbottabad", -2.1),
    d(KP, "Mansehra", -2.8),
    d(KP, "Kohat", -6.0),
    d(KP, "Dera Ismail Khan", -7.1),
    d(BALOCHISTAN, "Quetta", -15.3),
    d(BALOCHISTAN, "Gwadar", -3.5),
    d(BALOCHISTAN, "Turbat", -6.1),
    d(BALOCHISTAN, "Khuzdar", -10.0),
    d(BALOCHISTAN, "Chaman", -13.0),
    d(BALOCHISTAN, "Zhob", -8.6),
    d(BALOCHISTAN, "Sibi", -11.4),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictSummary {
    pub total: usize,
    pub mean_anomaly_cm: f64,
    pub most_depleted: District,
    pub most_improved: District,
    pub critical: usize,
    /// Districts strictly above zero.
    pub improving: usize,
}

/// Summary over `districts`; `None` when empty.
pub fn district_summary(districts: &[District]) -> Option<DistrictSummary> {
    let first = *districts.first()?;
    let mut most_depleted = first;
    let mut most_improved = first;
    let mut sum = 0.0;
    for district in districts {
        sum += district.anomaly_cm;
        if district.anomaly_cm < most_depleted.anomaly_cm {
            most_depleted = *district;
        }
        if district.anomaly_cm > most_improved.anomaly_cm {
            most_improved = *district;
        }
    }
    Some(DistrictSummary {
        total: districts.len(),
        mean_anomaly_cm: sum / districts.len() as f64,
        most_depleted,
        most_improved,
        critical: districts
            .iter()
            .filter(|d| d.status() == DistrictStatus::Critical)
            .count(),
        improving: districts.iter().filter(|d| d.anomaly_cm > 0.0).count(),
    })
}

/// Districts of one province, case-insensitive.
pub fn districts_in<'a>(districts: &'a [District], province: &'a str) -> impl Iterator<Item = &'a District> + 'a {
    districts
        .iter()
        .filter(move |d| d.province.eq_ignore_ascii_case(province))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_thresholds() {
        assert_eq!(DistrictStatus::from_anomaly(-10.1), DistrictStatus::Critical);
        assert_eq!(DistrictStatus::from_anomaly(-10.0), DistrictStatus::Warning);
        assert_eq!(DistrictStatus::from_anomaly(-5.0), DistrictStatus::Moderate);
        assert_eq!(DistrictStatus::from_anomaly(0.0), DistrictStatus::Improving);
    }

    #[test]
    fn table_summary() {
        let summary = district_summary(&DISTRICTS).unwrap();
        assert_eq!(summary.total, 32);
        assert!((summary.mean_anomaly_cm - (-254.2 / 32.0)).abs() < 1e-9);
        assert_eq!(summary.most_depleted.name, "Quetta");
        assert_eq!(summary.most_improved.name, "Mingora");
        assert_eq!(summary.critical, 8);
        assert_eq!(summary.improving, 0);
    }

    #[test]
    fn province_filter() {
        assert_eq!(districts_in(&DISTRICTS, "sindh").count(), 8);
        assert_eq!(districts_in(&DISTRICTS, "Balochistan").count(), 7);
        assert!(district_summary(&[]).is_none());
    }
}
