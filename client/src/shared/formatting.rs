use chrono::{DateTime, Local, TimeZone};

/// 当前本地时间，格式 `HH:MM`
pub fn current_time() -> String {
    format_clock(&Local::now())
}

/// 两位数时分格式
pub fn format_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M").to_string()
}
