use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Appointment {
    pub id: String,
    pub trainer_name: String,
    pub school_name: String,
    pub date: NaiveDate,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    pub observations: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Candidate appointment as submitted by the form layer. Times stay raw so the
/// validator can tell an empty field apart from a malformed one. Absent or null
/// text fields arrive as empty strings and fail the required-field check.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentForm {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trainer_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub school_name: String,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub start_time: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub end_time: String,
    #[serde(default)]
    pub observations: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Trainer,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Wall-clock time accepted as `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime(pub NaiveTime);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid time, expected HH:MM or HH:MM:SS")]
pub struct ParseClockTimeError(pub String);

impl FromStr for ClockTime {
    type Err = ParseClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map(ClockTime)
            .map_err(|_| ParseClockTimeError(s.to_string()))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use chrono::Timelike;
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        }
    }
}

/// Serde adapter rendering `NaiveTime` fields the way the form layer sends them.
pub mod clock {
    use super::ClockTime;
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ClockTime(*time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_minutes_and_seconds_forms() {
        assert_eq!("09:00".parse::<ClockTime>().unwrap().0, hm(9, 0));
        assert_eq!("09:00:00".parse::<ClockTime>().unwrap().0, hm(9, 0));
        assert_eq!(" 14:30 ".parse::<ClockTime>().unwrap().0, hm(14, 30));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<ClockTime>().is_err());
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("nine".parse::<ClockTime>().is_err());
    }

    #[test]
    fn displays_seconds_only_when_present() {
        assert_eq!(ClockTime(hm(8, 5)).to_string(), "08:05");
        let with_seconds = NaiveTime::from_hms_opt(8, 5, 30).unwrap();
        assert_eq!(ClockTime(with_seconds).to_string(), "08:05:30");
    }

    #[test]
    fn appointment_serializes_short_times() {
        let stamp = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let apt = Appointment {
            id: "abc".into(),
            trainer_name: "Ana Popescu".into(),
            school_name: "Scoala Gimnaziala Nr. 1".into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 29).unwrap(),
            start_time: hm(9, 0),
            end_time: hm(11, 0),
            observations: None,
            created_at: stamp,
            updated_at: stamp,
        };
        let json = serde_json::to_value(&apt).unwrap();
        assert_eq!(json["date"], "2024-05-29");
        assert_eq!(json["start_time"], "09:00");
        assert_eq!(json["end_time"], "11:00");
    }

    #[test]
    fn absent_or_null_form_fields_become_empty() {
        let form: AppointmentForm = serde_json::from_value(serde_json::json!({
            "trainer_name": "Ana Popescu",
            "date": "2024-05-29",
            "start_time": null,
            "end_time": "10:00",
        }))
        .unwrap();
        assert_eq!(form.school_name, "");
        assert_eq!(form.start_time, "");
        assert_eq!(form.end_time, "10:00");
        assert_eq!(form.observations, None);
    }

    #[test]
    fn parse_error_names_both_accepted_forms() {
        let err = "9am".parse::<ClockTime>().unwrap_err();
        assert_eq!(err.to_string(), "`9am` is not a valid time, expected HH:MM or HH:MM:SS");
    }
}
