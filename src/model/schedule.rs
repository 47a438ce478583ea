use chrono::{Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

const MAX_CRON_SEARCH_MINUTES: i64 = 60 * 24 * 366;
const MAX_INTERVAL_SECONDS: u64 = 31_536_000;

/// When a task runs. Tasks are never executed by the console; the schedule
/// is validated and its next fire time shown on review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskSchedule {
    #[default]
    Manual,
    Interval {
        every_seconds: u64,
    },
    Cron {
        expression: String,
        timezone: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    Manual,
    Interval,
    Cron,
}

impl ScheduleKind {
    pub const ALL: [ScheduleKind; 3] = [Self::Manual, Self::Interval, Self::Cron];

    pub fn label(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::Interval => "Interval",
            Self::Cron => "Cron",
        }
    }
}

impl TaskSchedule {
    pub fn kind(&self) -> ScheduleKind {
        match self {
            Self::Manual => ScheduleKind::Manual,
            Self::Interval { .. } => ScheduleKind::Interval,
            Self::Cron { .. } => ScheduleKind::Cron,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Manual => Ok(()),
            Self::Interval { every_seconds } => {
                if *every_seconds == 0 {
                    return Err("interval must be at least 1 second".to_string());
                }
                if *every_seconds > MAX_INTERVAL_SECONDS {
                    return Err(format!(
                        "interval must be at most {MAX_INTERVAL_SECONDS} seconds"
                    ));
                }
                Ok(())
            }
            Self::Cron {
                expression,
                timezone,
            } => {
                parse_cron_expression(expression)?;
                validate_iana_timezone(timezone)
            }
        }
    }

    pub fn next_run_at(&self, now: i64) -> Result<Option<i64>, String> {
        match self {
            Self::Manual => Ok(None),
            Self::Interval { every_seconds } => {
                if *every_seconds == 0 {
                    return Err("interval must be at least 1 second".to_string());
                }
                Ok(Some(now.saturating_add(*every_seconds as i64)))
            }
            Self::Cron {
                expression,
                timezone,
            } => {
                let tz = timezone.parse::<Tz>().map_err(|_| {
                    format!("invalid timezone `{timezone}`; expected IANA timezone id")
                })?;
                let cron = parse_cron_expression(expression)?;
                let mut candidate = ((now / 60) + 1) * 60;
                for _ in 0..MAX_CRON_SEARCH_MINUTES {
                    if cron.fires_at(candidate, &tz) {
                        return Ok(Some(candidate));
                    }
                    candidate = candidate.saturating_add(60);
                }
                Err(format!(
                    "cron expression `{expression}` does not fire within a year"
                ))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Manual => "manual".to_string(),
            Self::Interval { every_seconds } => format!("every {every_seconds}s"),
            Self::Cron {
                expression,
                timezone,
            } => format!("cron `{expression}` ({timezone})"),
        }
    }
}

pub fn format_run_at(unix_ts: i64) -> String {
    Utc.timestamp_opt(unix_ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| unix_ts.to_string())
}

pub fn validate_iana_timezone(raw: &str) -> Result<(), String> {
    raw.parse::<Tz>()
        .map(|_| ())
        .map_err(|_| format!("invalid timezone `{raw}`; expected IANA timezone id"))
}

/// Allowed values of one cron field as a bitmask; `*` stays a wildcard so
/// day-of-month and day-of-week can combine the way cron does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CronField {
    mask: u64,
    wildcard: bool,
}

impl CronField {
    fn parse(raw: &str, min: u32, max: u32) -> Result<Self, String> {
        if raw == "*" {
            return Ok(Self {
                mask: 0,
                wildcard: true,
            });
        }
        let mut mask = 0_u64;
        for item in raw.split(',') {
            let (base, step) = match item.split_once('/') {
                Some((base, step)) => (base, parse_cron_number(step, 1, u32::MAX)?),
                None => (item, 1),
            };
            let (low, high) = match base.split_once('-') {
                _ if base == "*" => (min, max),
                Some((low, high)) => (
                    parse_cron_number(low, min, max)?,
                    parse_cron_number(high, min, max)?,
                ),
                None => {
                    let value = parse_cron_number(base, min, max)?;
                    (value, value)
                }
            };
            if low > high {
                return Err(format!("invalid cron range `{item}`"));
            }
            for value in (low..=high).step_by(step as usize) {
                mask |= 1 << value;
            }
        }
        Ok(Self {
            mask,
            wildcard: false,
        })
    }

    fn allows(self, value: u32) -> bool {
        self.wildcard || (self.mask & (1 << value)) != 0
    }
}

fn parse_cron_number(raw: &str, min: u32, max: u32) -> Result<u32, String> {
    let value = raw
        .parse::<u32>()
        .map_err(|_| format!("invalid cron value `{raw}`"))?;
    if value < min || value > max {
        return Err(format!("cron value `{raw}` must be within {min}..={max}"));
    }
    Ok(value)
}

/// A numeric five-field cron expression: minute hour day-of-month month
/// day-of-week, with `*`, lists, ranges and `/step`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    minute: CronField,
    hour: CronField,
    day_of_month: CronField,
    month: CronField,
    day_of_week: CronField,
}

impl CronExpression {
    fn fires_at(&self, unix_ts: i64, timezone: &Tz) -> bool {
        let Some(local) = Utc
            .timestamp_opt(unix_ts, 0)
            .single()
            .map(|utc| utc.with_timezone(timezone))
        else {
            return false;
        };
        if !(self.minute.allows(local.minute())
            && self.hour.allows(local.hour())
            && self.month.allows(local.month()))
        {
            return false;
        }
        let by_date = self.day_of_month.allows(local.day());
        let weekday = local.weekday().num_days_from_sunday();
        // 7 is an alias for Sunday.
        let by_weekday = self.day_of_week.allows(weekday)
            || (weekday == 0 && self.day_of_week.allows(7));
        if self.day_of_month.wildcard || self.day_of_week.wildcard {
            by_date && by_weekday
        } else {
            by_date || by_weekday
        }
    }
}

pub fn parse_cron_expression(raw: &str) -> Result<CronExpression, String> {
    let fields: [&str; 5] = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| {
            "cron expression must use 5 fields: minute hour day_of_month month day_of_week"
                .to_string()
        })?;
    let [minute, hour, day_of_month, month, day_of_week] = fields;
    Ok(CronExpression {
        minute: CronField::parse(minute, 0, 59)?,
        hour: CronField::parse(hour, 0, 23)?,
        day_of_month: CronField::parse(day_of_month, 1, 31)?,
        month: CronField::parse(month, 1, 12)?,
        day_of_week: CronField::parse(day_of_week, 0, 7)?,
    })
}
