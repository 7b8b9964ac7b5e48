//! 엔티티 공통 CRUD
//!
//! 리소스마다 입력 타입, 응답 타입, 엔티티 변환, 참조 채우기만 구현하면
//! 목록/단건/생성/수정/삭제가 같은 규칙으로 동작합니다.
//!
//! - 생성: 본문 → `Input` 역직렬화 → 검증 → 엔티티 변환 → 저장
//! - 수정: 현재 엔티티에서 만든 `Input` 위에 패치를 덮어쓴 뒤 전체를 다시 검증
//! - 삭제: 기본 조회 조건을 통과하는 문서만 삭제, 없으면 404
//!
//! ```rust,ignore
//! let rows = state.tours.list(&ApiFeatures::parse(&query)?, vec![]).await?;
//! let tour = state.tours.update(&id, json!({ "price": 450 })).await?;
//! ```

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use validator::Validate;

use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::db::{Condition, SortKey};
use crate::domain::entities::Entity;
use crate::domain::models::query::ApiFeatures;
use crate::repositories::Repository;

pub const NOT_FOUND_MESSAGE: &str = "No document found with that ID";

#[async_trait]
pub trait CrudResource: Send + Sync {
    type Entity: Entity;
    type Input: Serialize + DeserializeOwned + Validate + Send + for<'a> From<&'a Self::Entity>;
    type Output: Serialize + Send;

    fn repository(&self) -> &Repository<Self::Entity>;

    fn default_sort(&self) -> Vec<SortKey> {
        vec![SortKey::desc("createdAt")]
    }

    /// 검증된 입력을 엔티티로 변환. 수정이면 `existing`이 현재 엔티티
    fn build(&self, input: Self::Input, existing: Option<&Self::Entity>) -> AppResult<Self::Entity>;

    /// 응답 변환 (참조 채우기 포함)
    async fn present_many(&self, entities: Vec<Self::Entity>) -> AppResult<Vec<Self::Output>>;

    async fn present_one(&self, entity: Self::Entity) -> AppResult<Self::Output> {
        self.present_many(vec![entity])
            .await?
            .pop()
            .ok_or_else(|| AppError::InternalError("응답 변환 결과가 비어 있습니다".to_string()))
    }

    /// 단건 조회 응답. 기본은 [`present_one`](Self::present_one)과 같음
    async fn present_detail(&self, entity: Self::Entity) -> AppResult<Self::Output> {
        self.present_one(entity).await
    }

    /// 생성/수정 직후 훅
    async fn after_write(&self, _entity: &Self::Entity) -> AppResult<()> {
        Ok(())
    }

    /// 수정 직후 훅. `previous`는 수정 전 엔티티. 기본은 [`after_write`](Self::after_write)
    async fn after_update(&self, _previous: &Self::Entity, entity: &Self::Entity) -> AppResult<()> {
        self.after_write(entity).await
    }

    /// 삭제 직후 훅
    async fn after_delete(&self, _entity: &Self::Entity) -> AppResult<()> {
        Ok(())
    }

    /// 필터/정렬/필드 선택/페이지네이션을 적용한 목록
    ///
    /// 필드 선택은 응답 JSON에 적용되므로 결과는 `Value` 목록입니다.
    async fn list(&self, features: &ApiFeatures, scope: Vec<Condition>) -> AppResult<Vec<Value>> {
        let query = features.to_query(scope, self.default_sort());
        let entities = self.repository().find(query).await?;
        let outputs = self.present_many(entities).await?;

        outputs
            .into_iter()
            .map(|output| {
                let mut value = serde_json::to_value(output).context("응답 직렬화 실패")?;
                features.fields.apply(&mut value);
                Ok(value)
            })
            .collect()
    }

    async fn get(&self, id: &str) -> AppResult<Self::Output> {
        let entity = self
            .repository()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;
        self.present_detail(entity).await
    }

    async fn create(&self, body: Value) -> AppResult<Self::Output> {
        let input = parse_input::<Self::Input>(body)?;
        let entity = self.build(input, None)?;
        let entity = self.repository().insert(entity).await?;

        log::debug!("{} 생성: {}", Self::Entity::COLLECTION, entity.id_string());
        self.after_write(&entity).await?;
        self.present_one(entity).await
    }

    async fn update(&self, id: &str, patch: Value) -> AppResult<Self::Output> {
        let existing = self
            .repository()
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

        let mut merged = serde_json::to_value(Self::Input::from(&existing)).context("입력 직렬화 실패")?;
        merge_patch(&mut merged, patch)?;

        let input = parse_input::<Self::Input>(merged)?;
        let entity = self.build(input, Some(&existing))?;
        self.repository().save(&entity).await?;

        log::debug!("{} 수정: {}", Self::Entity::COLLECTION, id);
        self.after_update(&existing, &entity).await?;
        self.present_one(entity).await
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let deleted = self
            .repository()
            .delete_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

        log::debug!("{} 삭제: {}", Self::Entity::COLLECTION, id);
        self.after_delete(&deleted).await
    }
}

/// JSON 본문을 입력 타입으로 역직렬화하고 검증
pub fn parse_input<I: DeserializeOwned + Validate>(body: Value) -> AppResult<I> {
    let input: I = serde_json::from_value(body)
        .map_err(|e| AppError::ValidationError(format!("Invalid input data. {}", e)))?;
    input.validate()?;
    Ok(input)
}

/// 최상위 키 단위로 패치를 덮어씀
pub fn merge_patch(target: &mut Value, patch: Value) -> AppResult<()> {
    let Value::Object(patch) = patch else {
        return Err(AppError::ValidationError("Request body must be a JSON object".to_string()));
    };
    if let Value::Object(target) = target {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_patch_overwrites_top_level_keys() {
        let mut target = json!({ "name": "The Forest Hiker", "price": 397, "guides": ["a"] });
        merge_patch(&mut target, json!({ "price": 450, "guides": [] })).unwrap();
        assert_eq!(target, json!({ "name": "The Forest Hiker", "price": 450, "guides": [] }));
    }

    #[test]
    fn test_merge_patch_requires_object() {
        let mut target = json!({});
        assert!(merge_patch(&mut target, json!([1, 2])).is_err());
    }
}
