use chrono::NaiveDate;
use hms_engine::{MessageCenter, ScheduleEngine, ScheduleError, SchedulerConfig};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn shipped_config() -> SchedulerConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/providers.toml");
    SchedulerConfig::from_file(path).unwrap()
}

#[test]
fn test_shipped_config_loads_into_engine() {
    let config = shipped_config();
    let mut engine = ScheduleEngine::from_config(&config).unwrap();
    assert_eq!(engine.directory().len(), 3);

    // Christmas Eve 2024 is a blocked Tuesday; the Monday before is open.
    let dates = engine
        .generate_schedule(
            "prov-001",
            NaiveDate::from_ymd_opt(2024, 12, 23).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(),
        )
        .unwrap();
    assert_eq!(dates.len(), 1);
    assert_eq!(dates[0].date, NaiveDate::from_ymd_opt(2024, 12, 23).unwrap());
    assert_eq!(dates[0].time_slots.len(), 14);
}

#[test]
fn test_seeded_config_gives_identical_engines() {
    let config = shipped_config();
    let mut a = ScheduleEngine::from_config(&config).unwrap();
    let mut b = ScheduleEngine::from_config(&config).unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    assert_eq!(
        a.generate_schedule("prov-002", start, end).unwrap(),
        b.generate_schedule("prov-002", start, end).unwrap()
    );
}

#[test]
fn test_config_from_temp_file() -> Result<(), ScheduleError> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
[engine]
availableRatio = 1.0

[messaging]
deliveryDelayMs = 5

[[providers]]
id = "p1"
name = "Dr. Temp"

[providers.availability]
defaultSlotDuration = 60
"#
    )?;

    let config = SchedulerConfig::from_file(file.path())?;
    assert_eq!(config.messaging.delivery_delay_ms, 5);

    let mut engine = ScheduleEngine::from_config(&config)?;
    let monday = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let dates = engine.generate_schedule("p1", monday, monday)?;
    assert_eq!(dates[0].time_slots.len(), 7);
    assert!(dates[0].time_slots.iter().all(|s| s.is_available()));

    let _center = MessageCenter::from_config(&config.messaging);
    Ok(())
}

#[test]
fn test_missing_config_file_is_reported() {
    let result = SchedulerConfig::from_file("does/not/exist.toml");
    assert!(matches!(result, Err(ScheduleError::Config { .. })));
}

#[test]
fn test_invalid_break_in_config_is_rejected() {
    let toml = r#"
[[providers]]
id = "p1"
name = "Dr. Broken"

[providers.availability.weeklySchedule.monday]
isAvailable = true
startTime = "09:00"
endTime = "12:00"
breakTimes = [{ startTime = "11:30", endTime = "12:30" }]

[providers.availability.weeklySchedule.tuesday]
isAvailable = false
startTime = "09:00"
endTime = "17:00"

[providers.availability.weeklySchedule.wednesday]
isAvailable = false
startTime = "09:00"
endTime = "17:00"

[providers.availability.weeklySchedule.thursday]
isAvailable = false
startTime = "09:00"
endTime = "17:00"

[providers.availability.weeklySchedule.friday]
isAvailable = false
startTime = "09:00"
endTime = "17:00"

[providers.availability.weeklySchedule.saturday]
isAvailable = false
startTime = "09:00"
endTime = "17:00"

[providers.availability.weeklySchedule.sunday]
isAvailable = false
startTime = "09:00"
endTime = "17:00"
"#;
    let err = SchedulerConfig::from_toml_str(toml).unwrap_err();
    assert!(err.to_string().contains("break 11:30 - 12:30"));
}
