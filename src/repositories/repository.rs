//! 엔티티 타입별 저장소 접근
//!
//! [`DocumentStore`]의 `Document` 단위 API를 엔티티 타입으로 감싸고,
//! 엔티티의 기본 조회 조건([`Entity::default_conditions`])을 모든 조회에 적용합니다.

use std::marker::PhantomData;
use std::sync::Arc;

use mongodb::bson::{self, Document, oid::ObjectId};

use crate::core::errors::{AppError, AppResult};
use crate::db::{Condition, DocumentQuery, DocumentStore};
use crate::domain::entities::Entity;

/// `Invalid _id: xyz` 검증 에러를 내며 ObjectId 파싱
pub fn parse_object_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::ValidationError(format!("Invalid _id: {}", id)))
}

pub struct Repository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn scoped(conditions: Vec<Condition>) -> Vec<Condition> {
        let mut scoped = T::default_conditions();
        scoped.extend(conditions);
        scoped
    }

    pub async fn find(&self, mut query: DocumentQuery) -> AppResult<Vec<T>> {
        query.conditions = Self::scoped(std::mem::take(&mut query.conditions));

        let documents = self.store.find(T::COLLECTION, &query).await?;
        documents
            .into_iter()
            .map(|doc| bson::from_document::<T>(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn find_one(&self, conditions: Vec<Condition>) -> AppResult<Option<T>> {
        let document = self
            .store
            .find_one(T::COLLECTION, &Self::scoped(conditions))
            .await?;

        document
            .map(|doc| bson::from_document::<T>(doc).map_err(AppError::from))
            .transpose()
    }

    /// 문자열 ID로 조회. 형식이 틀리면 400
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<T>> {
        let object_id = parse_object_id(id)?;
        self.find_by_object_id(object_id).await
    }

    pub async fn find_by_object_id(&self, id: ObjectId) -> AppResult<Option<T>> {
        self.find_one(vec![Condition::eq("_id", id)]).await
    }

    /// `_id IN (...)` 조회. 순서는 보장하지 않습니다.
    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> AppResult<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.find(DocumentQuery::new().filter(Condition::is_in("_id", ids.iter().copied())))
            .await
    }

    pub async fn count(&self, conditions: Vec<Condition>) -> AppResult<u64> {
        self.store.count(T::COLLECTION, &Self::scoped(conditions)).await
    }

    /// 새 엔티티 저장 후 `_id`가 채워진 엔티티 반환
    pub async fn insert(&self, mut entity: T) -> AppResult<T> {
        let document = bson::to_document(&entity)?;
        let id = self.store.insert_one(T::COLLECTION, document).await?;
        entity.set_id(id);
        Ok(entity)
    }

    /// 기존 엔티티 전체 교체
    pub async fn save(&self, entity: &T) -> AppResult<()> {
        let id = entity
            .id()
            .ok_or_else(|| AppError::InternalError(format!("{}: _id 없는 엔티티는 저장할 수 없습니다", T::COLLECTION)))?;

        let document = bson::to_document(entity)?;
        let replaced = self.store.replace_one(T::COLLECTION, id, document).await?;
        if !replaced {
            return Err(AppError::NotFound("No document found with that ID".to_string()));
        }
        Ok(())
    }

    /// 지정한 필드만 `$set`으로 갱신. 기본 조회 조건은 적용하지 않음
    pub async fn set_fields(&self, id: ObjectId, fields: Document) -> AppResult<bool> {
        self.store.update_fields(T::COLLECTION, id, fields).await
    }

    /// 기본 조회 조건을 통과하는 문서만 삭제. 삭제된 엔티티 반환
    pub async fn delete_by_id(&self, id: &str) -> AppResult<Option<T>> {
        let Some(entity) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let object_id = parse_object_id(id)?;
        let deleted = self.store.delete_one(T::COLLECTION, object_id).await?;
        Ok(deleted.then_some(entity))
    }

    pub async fn create_indexes(&self) -> AppResult<()> {
        self.store.ensure_indexes(T::COLLECTION, &T::indexes()).await
    }
}
