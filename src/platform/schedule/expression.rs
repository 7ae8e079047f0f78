use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

/// Validated poll schedule.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    expression: String,
    schedule: Schedule,
}

impl PollSchedule {
    /// Accepts 5-field crontab syntax or the 6/7-field form with seconds.
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let normalized = normalize_expression(expression)?;
        let schedule = Schedule::from_str(&normalized).map_err(|e| ConfigError::Schedule {
            expression: expression.trim().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            expression: expression.trim().to_string(),
            schedule,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn next_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&from).next()
    }
}

fn normalize_expression(expression: &str) -> Result<String, ConfigError> {
    let expression = expression.trim();
    let field_count = expression.split_whitespace().count();

    match field_count {
        // standard crontab syntax: minute hour day month weekday
        5 => Ok(format!("0 {expression}")),
        // crate-native syntax includes seconds (+ optional year)
        6 | 7 => Ok(expression.to_string()),
        _ => Err(ConfigError::Schedule {
            expression: expression.to_string(),
            reason: format!("expected 5, 6, or 7 fields, got {field_count}"),
        }),
    }
}
