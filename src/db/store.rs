//! 문서 저장소 추상화

use async_trait::async_trait;
use mongodb::bson::{Document, oid::ObjectId};

use crate::core::errors::AppResult;
use crate::db::query::{Condition, DocumentQuery};

/// 인덱스 키 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Ascending,
    Descending,
    /// GeoJSON 구면 인덱스
    Sphere2d,
}

/// 컬렉션 인덱스 선언
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: &'static str,
    pub keys: Vec<(&'static str, IndexKind)>,
    pub unique: bool,
}

impl IndexSpec {
    pub fn unique(name: &'static str, fields: &[&'static str]) -> Self {
        Self {
            name,
            keys: fields.iter().map(|f| (*f, IndexKind::Ascending)).collect(),
            unique: true,
        }
    }

    pub fn plain(name: &'static str, keys: &[(&'static str, IndexKind)]) -> Self {
        Self {
            name,
            keys: keys.to_vec(),
            unique: false,
        }
    }
}

/// 컬렉션 단위 CRUD 포트
///
/// 모든 메서드는 단일 연산 단위로 원자적입니다. 유니크 인덱스 위반은
/// `AppError::ValidationError("Duplicate field value: ...")`로 보고됩니다.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 문서를 삽입하고 생성된 `_id`를 반환
    async fn insert_one(&self, collection: &str, document: Document) -> AppResult<ObjectId>;

    async fn find(&self, collection: &str, query: &DocumentQuery) -> AppResult<Vec<Document>>;

    async fn count(&self, collection: &str, conditions: &[Condition]) -> AppResult<u64>;

    /// `_id`가 같은 문서를 통째로 교체. 대상이 없으면 `false`
    async fn replace_one(&self, collection: &str, id: ObjectId, document: Document) -> AppResult<bool>;

    /// 지정한 최상위 필드만 덮어씀 (`$set`). 나머지 필드는 그대로. 대상이 없으면 `false`
    async fn update_fields(&self, collection: &str, id: ObjectId, fields: Document) -> AppResult<bool>;

    async fn delete_one(&self, collection: &str, id: ObjectId) -> AppResult<bool>;

    async fn ensure_indexes(&self, collection: &str, indexes: &[IndexSpec]) -> AppResult<()>;

    async fn find_one(&self, collection: &str, conditions: &[Condition]) -> AppResult<Option<Document>> {
        let query = DocumentQuery::new().filters(conditions.iter().cloned()).limit(1);
        Ok(self.find(collection, &query).await?.into_iter().next())
    }
}

/// 중복 키 에러 메시지
pub fn duplicate_field_message(value: &str) -> String {
    format!("Duplicate field value: {}. Please use another value!", value)
}
