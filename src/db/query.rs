//! 저장소 중립적인 쿼리 모델
//!
//! 핸들러와 서비스는 MongoDB 필터 문서를 직접 만들지 않고 이 타입으로 조건을 표현합니다.
//! [`MongoStore`](super::MongoStore)는 이를 `doc!`으로 변환하고,
//! [`MemoryStore`](super::MemoryStore)는 직접 평가합니다.

use mongodb::bson::Bson;

/// 비교 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// 값은 `Bson::Array`
    In,
}

impl FilterOp {
    /// 쿼리 문자열 `price[gte]=500`의 연산자 부분
    pub fn from_query_key(op: &str) -> Option<Self> {
        match op {
            "eq" => Some(FilterOp::Eq),
            "ne" => Some(FilterOp::Ne),
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    pub fn mongo_operator(&self) -> &'static str {
        match self {
            FilterOp::Eq => "$eq",
            FilterOp::Ne => "$ne",
            FilterOp::Gt => "$gt",
            FilterOp::Gte => "$gte",
            FilterOp::Lt => "$lt",
            FilterOp::Lte => "$lte",
            FilterOp::In => "$in",
        }
    }
}

/// 단일 필드 조건
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: FilterOp,
    pub value: Bson,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Bson>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, FilterOp::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, FilterOp::Gt, value)
    }

    pub fn is_in<V: Into<Bson>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        Self::new(field, FilterOp::In, Bson::Array(values))
    }
}

/// 정렬 키
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// `-price` → 내림차순, `price` → 오름차순
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(Self::desc(field)),
            None if raw.is_empty() => None,
            None => Some(Self::asc(raw)),
        }
    }
}

/// 조건 + 정렬 + 페이지네이션
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub conditions: Vec<Condition>,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub limit: Option<i64>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filters(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}
