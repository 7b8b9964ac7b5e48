//! 목록 조회 쿼리 문자열 해석
//!
//! ```text
//! GET /api/v1/tours?difficulty=easy&price[lte]=1000&sort=-price,ratingAverage&fields=name,price&page=2&limit=10
//! ```
//!
//! | 키 | 의미 |
//! |----|------|
//! | `field=v`, `field[op]=v` | 필터 (`op`: `gt`, `gte`, `lt`, `lte`, `ne`, `in`) |
//! | `sort` | 정렬, `-` 접두어는 내림차순. 기본 `-createdAt` |
//! | `fields` | 포함(`name,price`) 또는 제외(`-summary`) 필드 |
//! | `page`, `limit` | 페이지네이션. 기본 1, 100 |
//!
//! 같은 키가 여러 번 오면 마지막 값을 사용합니다 (HTTP parameter pollution 방어).
//! 예외로 [`REPEATABLE_FIELDS`]의 필드는 반복 값을 `in` 조건으로 묶습니다.

use std::collections::HashSet;

use chrono::{NaiveDate, TimeZone, Utc};
use mongodb::bson::{Bson, DateTime, oid::ObjectId};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::core::errors::{AppError, AppResult};
use crate::db::{Condition, DocumentQuery, FilterOp, SortKey};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 100;

/// 필터가 아닌 예약 키
const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// 반복 지정이 허용되는 필드
pub static REPEATABLE_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "duration",
        "maxGroupSize",
        "ratingAverage",
        "ratingQuantity",
        "price",
        "difficulty",
    ]
    .into_iter()
    .collect()
});

/// 응답 필드 선택
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldSelection {
    #[default]
    All,
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl FieldSelection {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let fields: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            return Ok(FieldSelection::All);
        }

        let excluded = fields.iter().filter(|f| f.starts_with('-')).count();
        if excluded == fields.len() {
            Ok(FieldSelection::Exclude(
                fields.iter().map(|f| f[1..].to_string()).collect(),
            ))
        } else if excluded == 0 {
            Ok(FieldSelection::Include(fields.iter().map(|f| f.to_string()).collect()))
        } else {
            Err(AppError::ValidationError(
                "Cannot mix field inclusion and exclusion in fields".to_string(),
            ))
        }
    }

    /// JSON 객체에 선택 적용. `id`는 항상 남깁니다.
    pub fn apply(&self, value: &mut Value) {
        let Value::Object(map) = value else { return };

        match self {
            FieldSelection::All => {}
            FieldSelection::Include(fields) => {
                map.retain(|key, _| key == "id" || fields.iter().any(|f| f == key));
            }
            FieldSelection::Exclude(fields) => {
                map.retain(|key, _| !fields.iter().any(|f| f == key));
            }
        }
    }
}

/// 해석된 목록 조회 옵션
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFeatures {
    pub conditions: Vec<Condition>,
    pub sort: Vec<SortKey>,
    pub fields: FieldSelection,
    pub page: u64,
    pub limit: i64,
}

impl Default for ApiFeatures {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            sort: Vec::new(),
            fields: FieldSelection::All,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ApiFeatures {
    /// `web::Query<Vec<(String, String)>>` 쌍 목록에서 해석
    pub fn parse(pairs: &[(String, String)]) -> AppResult<Self> {
        // 키 등장 순서를 유지하며 값 모으기
        let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
        for (key, value) in pairs {
            reject_operator_injection(key)?;
            match grouped.iter_mut().find(|(k, _)| *k == key.as_str()) {
                Some((_, values)) => values.push(value.as_str()),
                None => grouped.push((key.as_str(), vec![value.as_str()])),
            }
        }

        let mut features = ApiFeatures::default();

        for (key, values) in grouped {
            let Some(last) = values.last().copied() else { continue };

            match key {
                "page" => {
                    features.page = last.trim().parse::<u64>().ok().filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
                }
                "limit" => {
                    features.limit = last
                        .trim()
                        .parse::<i64>()
                        .ok()
                        .filter(|l| *l >= 1)
                        .map(|l| l.min(MAX_LIMIT))
                        .unwrap_or(DEFAULT_LIMIT);
                }
                "sort" => {
                    features.sort = last.split(',').filter_map(SortKey::parse).collect();
                }
                "fields" => {
                    features.fields = FieldSelection::parse(last)?;
                }
                _ => features.conditions.push(parse_condition(key, &values)?),
            }
        }

        Ok(features)
    }

    pub fn skip(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.limit as u64
    }

    /// 저장소 쿼리로 변환. `scope`는 URL 경로에서 온 조건(중첩 라우트 등)
    pub fn to_query(&self, scope: Vec<Condition>, default_sort: Vec<SortKey>) -> DocumentQuery {
        let sort = if self.sort.is_empty() { default_sort } else { self.sort.clone() };

        let mut query = DocumentQuery::new()
            .filters(scope)
            .filters(self.conditions.iter().cloned())
            .skip(self.skip())
            .limit(self.limit);
        query.sort = sort;
        query
    }
}

/// `$where`, `a.b` 같은 키는 연산자 주입 시도로 보고 거부
fn reject_operator_injection(key: &str) -> AppResult<()> {
    if key.starts_with('$') || key.contains('.') || key.contains("[$") {
        return Err(AppError::ValidationError(format!("Invalid query parameter: {}", key)));
    }
    Ok(())
}

fn parse_condition(key: &str, values: &[&str]) -> AppResult<Condition> {
    let (field, op) = match key.split_once('[') {
        Some((field, rest)) => {
            let op_name = rest
                .strip_suffix(']')
                .ok_or_else(|| AppError::ValidationError(format!("Invalid query parameter: {}", key)))?;
            let op = FilterOp::from_query_key(op_name)
                .ok_or_else(|| AppError::ValidationError(format!("Unsupported filter operator: {}", op_name)))?;
            (field, op)
        }
        None => (key, FilterOp::Eq),
    };

    if field.is_empty() || RESERVED_KEYS.contains(&field) {
        return Err(AppError::ValidationError(format!("Invalid query parameter: {}", key)));
    }

    let last = values.last().copied().unwrap_or_default();

    let condition = match op {
        FilterOp::In => Condition::is_in(field, last.split(',').map(coerce_value)),
        FilterOp::Eq if values.len() > 1 && REPEATABLE_FIELDS.contains(field) => {
            Condition::is_in(field, values.iter().map(|v| coerce_value(v)))
        }
        _ => Condition::new(field, op, coerce_value(last)),
    };
    Ok(condition)
}

/// 쿼리 문자열 값을 BSON 값으로 변환
///
/// bool → 정수 → 실수 → ObjectId(24자리 hex) → 날짜(`YYYY-MM-DD`, RFC 3339) → 문자열 순으로 시도합니다.
pub fn coerce_value(raw: &str) -> Bson {
    let raw = raw.trim();

    match raw {
        "true" => return Bson::Boolean(true),
        "false" => return Bson::Boolean(false),
        _ => {}
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Bson::Int64(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        if v.is_finite() {
            return Bson::Double(v);
        }
    }
    if raw.len() == 24 {
        if let Ok(id) = ObjectId::parse_str(raw) {
            return Bson::ObjectId(id);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            let utc = Utc.from_utc_datetime(&midnight);
            return Bson::DateTime(DateTime::from_millis(utc.timestamp_millis()));
        }
    }
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Bson::DateTime(DateTime::from_millis(ts.timestamp_millis()));
    }

    Bson::String(raw.to_string())
}
