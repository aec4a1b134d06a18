//! 活动模型与固定的 `YYYY-MM-DDTHH:MM` 时间格式

use crate::error::AppError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `date_time` 在请求和响应中的文本格式
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// 解析 `date_time` 字段
pub fn parse_date_time(value: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).map_err(|_| {
        AppError::validation(format!(
            "Invalid date_time '{}', expected YYYY-MM-DDTHH:MM",
            value
        ))
    })
}

pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

mod date_time_format {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date_time(value))
    }
}

/// 已存储的活动
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "date_time_format::serialize")]
    pub date_time: NaiveDateTime,
    pub capacity: i32,
    pub organizer_id: i64,
    pub image_url: Option<String>,
}

/// `POST /events` 与 `PUT /events/{id}` 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date_time: String,
    pub capacity: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 解析后待写入的活动字段
#[derive(Debug, Clone, PartialEq)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub date_time: NaiveDateTime,
    pub capacity: i32,
    pub image_url: Option<String>,
}

impl TryFrom<EventRequest> for EventInput {
    type Error = AppError;

    fn try_from(value: EventRequest) -> Result<Self, Self::Error> {
        let EventRequest {
            title,
            description,
            date_time,
            capacity,
            image_url,
        } = value;
        Ok(Self {
            title,
            description,
            date_time: parse_date_time(&date_time)?,
            capacity,
            image_url,
        })
    }
}
