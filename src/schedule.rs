//! Run cadence for the external scheduler

use crate::cli::ScheduleArgs;
use crate::error::{AppError, Result};
use chrono::{NaiveTime, Timelike};
use std::fmt;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

/// How often the external scheduler should start a measurement pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Every N minutes, 1..=1440
    EveryMinutes(u32),
    /// Every N hours, 1..=24
    EveryHours(u32),
    /// Once a day at a wall-clock time
    DailyAt(NaiveTime),
}

impl Cadence {
    pub fn every_minutes(minutes: u32) -> Result<Self> {
        if !(1..=MINUTES_PER_DAY).contains(&minutes) {
            return Err(AppError::validation(format!(
                "Interval in minutes must be between 1 and {}, got {}",
                MINUTES_PER_DAY, minutes
            )));
        }
        Ok(Self::EveryMinutes(minutes))
    }

    pub fn every_hours(hours: u32) -> Result<Self> {
        if !(1..=24).contains(&hours) {
            return Err(AppError::validation(format!(
                "Interval in hours must be between 1 and 24, got {}",
                hours
            )));
        }
        Ok(Self::EveryHours(hours))
    }

    /// Parse a daily start time given as HH:MM
    pub fn daily(time: &str) -> Result<Self> {
        NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map(Self::DailyAt)
            .map_err(|_| AppError::validation(format!("Invalid time '{}'. Use HH:MM (example: 14:30)", time)))
    }

    pub fn from_args(args: &ScheduleArgs) -> Result<Self> {
        match (args.every_minutes, args.every_hours, args.daily.as_deref()) {
            (Some(minutes), None, None) => Self::every_minutes(minutes),
            (None, Some(hours), None) => Self::every_hours(hours),
            (None, None, Some(time)) => Self::daily(time),
            _ => Err(AppError::validation(
                "Choose exactly one of --every-minutes, --every-hours or --daily",
            )),
        }
    }

    /// Five-field cron expression for this cadence.
    ///
    /// Step values restart at every hour or day boundary, so minute steps
    /// must divide 60 and hour steps must divide 24 to keep the gaps even.
    /// Minute intervals above an hour must be whole hours.
    pub fn cron_expression(&self) -> Result<String> {
        match *self {
            Self::EveryMinutes(MINUTES_PER_DAY) | Self::EveryHours(24) => Ok("0 0 * * *".to_string()),
            Self::EveryMinutes(1) => Ok("* * * * *".to_string()),
            Self::EveryMinutes(minutes) if minutes < MINUTES_PER_HOUR && MINUTES_PER_HOUR % minutes == 0 => {
                Ok(format!("*/{} * * * *", minutes))
            }
            Self::EveryMinutes(minutes) if minutes % MINUTES_PER_HOUR == 0 => {
                Self::EveryHours(minutes / MINUTES_PER_HOUR).cron_expression()
            }
            Self::EveryMinutes(minutes) => Err(AppError::validation(format!(
                "Every {} minutes cannot be scheduled evenly with cron; use a divisor of 60 or whole hours",
                minutes
            ))),
            Self::EveryHours(1) => Ok("0 * * * *".to_string()),
            Self::EveryHours(hours) if 24 % hours == 0 => Ok(format!("0 */{} * * *", hours)),
            Self::EveryHours(hours) => Err(AppError::validation(format!(
                "Every {} hours cannot be scheduled evenly with cron; use a divisor of 24",
                hours
            ))),
            Self::DailyAt(time) => Ok(format!("{} {} * * *", time.minute(), time.hour())),
        }
    }

    /// Crontab entry that runs `command` on this cadence
    pub fn crontab_line(&self, command: &str) -> Result<String> {
        Ok(format!("{} {}", self.cron_expression()?, command))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::EveryMinutes(minutes) => format!("Every {} minutes", minutes),
            Self::EveryHours(hours) => format!("Every {} hours", hours),
            Self::DailyAt(time) => format!("Daily at {}", time.format("%H:%M")),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
