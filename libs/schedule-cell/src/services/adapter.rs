//! Boundary adapter for `work_schedule`. The API delivers it either as a
//! structured object or as a JSON-encoded string; everything past this
//! module only sees [`WeeklySchedule`].

use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{ScheduleError, WeeklySchedule};

pub fn parse_work_schedule(raw: &Value) -> Result<WeeklySchedule, ScheduleError> {
    match raw {
        Value::Null => Err(ScheduleError::MissingSchedule),
        Value::String(encoded) if encoded.trim().is_empty() || encoded.trim() == "null" => {
            Err(ScheduleError::MissingSchedule)
        }
        Value::String(encoded) => {
            let decoded: Value = serde_json::from_str(encoded.trim())?;
            match decoded {
                // Double-encoded payloads show up from the multipart apply form.
                Value::String(_) | Value::Null => parse_work_schedule(&decoded),
                Value::Object(_) => Ok(serde_json::from_value(decoded)?),
                other => Err(ScheduleError::MalformedSchedule(format!(
                    "expected an object, got {}",
                    json_kind(&other)
                ))),
            }
        }
        Value::Object(_) => Ok(serde_json::from_value(raw.clone())?),
        other => Err(ScheduleError::MalformedSchedule(format!(
            "expected an object or string, got {}",
            json_kind(other)
        ))),
    }
}

/// Lenient form of [`parse_work_schedule`]: any failure means "no schedule".
pub fn normalize_work_schedule(raw: Option<&Value>) -> Option<WeeklySchedule> {
    let raw = raw?;
    match parse_work_schedule(raw) {
        Ok(schedule) => Some(schedule),
        Err(ScheduleError::MissingSchedule) => {
            debug!("Provider record carries no work schedule");
            None
        }
        Err(e) => {
            warn!("Ignoring unusable work schedule: {}", e);
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftId;
    use assert_matches::assert_matches;
    use chrono::{NaiveTime, Weekday};
    use serde_json::json;

    fn monday_schedule() -> Value {
        json!({
            "monday": {
                "enabled": true,
                "shifts": [
                    {"id": "morning", "label": "Morning", "enabled": true, "start": "08:00", "end": "12:00"}
                ]
            }
        })
    }

    #[test]
    fn test_structured_object_is_accepted() {
        let schedule = parse_work_schedule(&monday_schedule()).unwrap();

        let monday = schedule.day(Weekday::Mon);
        assert!(monday.enabled);
        assert_eq!(monday.shifts[0].id, ShiftId::Morning);
        assert_eq!(monday.shifts[0].start_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        // Missing weekdays come back disabled.
        assert!(!schedule.day(Weekday::Tue).enabled);
    }

    #[test]
    fn test_encoded_string_is_accepted() {
        let encoded = Value::String(monday_schedule().to_string());
        let schedule = parse_work_schedule(&encoded).unwrap();
        assert!(schedule.day(Weekday::Mon).enabled);
    }

    #[test]
    fn test_double_encoded_string_is_accepted() {
        let once = monday_schedule().to_string();
        let twice = Value::String(Value::String(once).to_string());
        assert!(parse_work_schedule(&twice).unwrap().day(Weekday::Mon).enabled);
    }

    #[test]
    fn test_seconds_in_times_are_accepted() {
        let raw = json!({
            "friday": {"enabled": true, "shifts": [
                {"id": "evening", "enabled": true, "start_time": "18:00:00", "end_time": "22:00:00"}
            ]}
        });
        let schedule = parse_work_schedule(&raw).unwrap();
        assert_eq!(
            schedule.day(Weekday::Fri).shifts[0].end_time,
            NaiveTime::from_hms_opt(22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_unknown_shift_id_is_kept_as_unknown() {
        let raw = json!({
            "sunday": {"enabled": true, "shifts": [
                {"id": "siesta", "enabled": true, "start_time": "13:00", "end_time": "15:00"}
            ]}
        });
        let schedule = parse_work_schedule(&raw).unwrap();
        assert_eq!(schedule.day(Weekday::Sun).shifts[0].id, ShiftId::Unknown);
    }

    #[test]
    fn test_invalid_json_string_is_an_error() {
        let result = parse_work_schedule(&Value::String("{monday: oops".to_string()));
        assert_matches!(result, Err(ScheduleError::InvalidJson(_)));
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        assert_matches!(parse_work_schedule(&json!([1, 2, 3])), Err(ScheduleError::MalformedSchedule(_)));
        assert_matches!(
            parse_work_schedule(&Value::String("[1,2]".to_string())),
            Err(ScheduleError::MalformedSchedule(_))
        );
        assert_matches!(
            parse_work_schedule(&json!({"monday": {"enabled": "yes", "shifts": []}})),
            Err(ScheduleError::InvalidJson(_))
        );
    }

    #[test]
    fn test_unparsable_shift_is_dropped_alone() {
        let raw = json!({
            "monday": {"enabled": true, "shifts": [
                {"id": "morning", "enabled": true, "start_time": "08:00", "end_time": "08:30"},
                {"id": "afternoon", "enabled": false, "start_time": "", "end_time": ""},
                {"id": "evening", "enabled": true, "start_time": "6pm", "end_time": "22:00"}
            ]},
            "tuesday": {"enabled": true, "shifts": null}
        });

        let schedule = normalize_work_schedule(Some(&raw)).unwrap();

        let monday = schedule.day(Weekday::Mon);
        assert_eq!(monday.shifts.len(), 1);
        assert_eq!(monday.shifts[0].id, ShiftId::Morning);
        assert!(schedule.day(Weekday::Tue).shifts.is_empty());
    }

    #[test]
    fn test_normalize_swallows_failures() {
        assert!(normalize_work_schedule(None).is_none());
        assert!(normalize_work_schedule(Some(&Value::Null)).is_none());
        assert!(normalize_work_schedule(Some(&Value::String("not json".to_string()))).is_none());
        assert!(normalize_work_schedule(Some(&monday_schedule())).is_some());
    }
}
