//! 프로세스 메모리 구현
//!
//! MongoDB 없이 서버를 띄우거나 HTTP 테스트를 돌릴 때 사용합니다.
//! 필터/정렬/유니크 인덱스는 MongoDB와 같은 의미로 동작하도록 맞췄지만,
//! 지오 인덱스와 집계는 지원하지 않습니다.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};

use crate::core::errors::{AppError, AppResult};
use crate::db::query::{Condition, DocumentQuery, FilterOp};
use crate::db::store::{DocumentStore, IndexSpec, duplicate_field_message};

#[derive(Default)]
struct CollectionData {
    documents: Vec<Document>,
    unique_indexes: Vec<IndexSpec>,
}

/// `RwLock<HashMap>` 기반 [`DocumentStore`]
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned<T>(_: T) -> AppError {
    AppError::InternalError("메모리 저장소 잠금이 손상되었습니다".to_string())
}

/// `startLocation.coordinates` 같은 점 표기 경로 조회
fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

/// BSON 값 비교. 숫자 타입끼리는 값으로 비교합니다.
pub fn compare_bson(a: &Bson, b: &Bson) -> Option<Ordering> {
    fn as_f64(value: &Bson) -> Option<f64> {
        match value {
            Bson::Int32(v) => Some(*v as f64),
            Bson::Int64(v) => Some(*v as f64),
            Bson::Double(v) => Some(*v),
            _ => None,
        }
    }

    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.partial_cmp(&y);
    }

    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    compare_bson(a, b) == Some(Ordering::Equal) || a == b
}

/// 배열 필드는 원소 중 하나라도 일치하면 일치로 봅니다 (MongoDB 규칙).
fn candidates(value: &Bson) -> Vec<&Bson> {
    match value {
        Bson::Array(items) => {
            let mut all: Vec<&Bson> = items.iter().collect();
            all.push(value);
            all
        }
        other => vec![other],
    }
}

fn condition_matches(value: Option<&Bson>, condition: &Condition) -> bool {
    let any = |pred: &dyn Fn(&Bson) -> bool| value.is_some_and(|v| candidates(v).into_iter().any(pred));

    match condition.op {
        FilterOp::Eq => any(&|v| values_equal(v, &condition.value)),
        FilterOp::Ne => !any(&|v| values_equal(v, &condition.value)),
        FilterOp::In => match &condition.value {
            Bson::Array(options) => any(&|v| options.iter().any(|o| values_equal(v, o))),
            single => any(&|v| values_equal(v, single)),
        },
        FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => any(&|v| {
            match compare_bson(v, &condition.value) {
                Some(ordering) => match condition.op {
                    FilterOp::Gt => ordering == Ordering::Greater,
                    FilterOp::Gte => ordering != Ordering::Less,
                    FilterOp::Lt => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                },
                None => false,
            }
        }),
    }
}

/// 문서가 모든 조건을 만족하는지 평가
pub fn matches(document: &Document, conditions: &[Condition]) -> bool {
    conditions
        .iter()
        .all(|condition| condition_matches(lookup(document, &condition.field), condition))
}

fn sort_documents(documents: &mut [Document], query: &DocumentQuery) {
    if query.sort.is_empty() {
        return;
    }

    documents.sort_by(|a, b| {
        for key in &query.sort {
            // 필드가 없는 문서가 가장 앞
            let ordering = match (lookup(a, &key.field), lookup(b, &key.field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => compare_bson(x, y).unwrap_or(Ordering::Equal),
            };
            let ordering = if key.descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn check_unique(data: &CollectionData, candidate: &Document, own_id: Option<ObjectId>) -> AppResult<()> {
    for index in &data.unique_indexes {
        let key: Option<Vec<&Bson>> = index
            .keys
            .iter()
            .map(|(field, _)| lookup(candidate, field))
            .collect();
        let Some(key) = key else { continue };

        let conflict = data.documents.iter().any(|existing| {
            if own_id.is_some() && existing.get_object_id("_id").ok() == own_id {
                return false;
            }
            index
                .keys
                .iter()
                .zip(&key)
                .all(|((field, _), value)| lookup(existing, field).is_some_and(|v| values_equal(v, value)))
        });

        if conflict {
            let shown: Vec<String> = key.iter().map(|v| v.to_string()).collect();
            return Err(AppError::ValidationError(duplicate_field_message(&shown.join(", "))));
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> AppResult<ObjectId> {
        let mut collections = self.collections.write().map_err(lock_poisoned)?;
        let data = collections.entry(collection.to_string()).or_default();

        let id = match document.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        check_unique(data, &document, None)?;
        data.documents.push(document);
        Ok(id)
    }

    async fn find(&self, collection: &str, query: &DocumentQuery) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().map_err(lock_poisoned)?;
        let Some(data) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<Document> = data
            .documents
            .iter()
            .filter(|doc| matches(doc, &query.conditions))
            .cloned()
            .collect();
        sort_documents(&mut found, query);

        let skipped = found.into_iter().skip(query.skip as usize);
        Ok(match query.limit {
            Some(limit) if limit > 0 => skipped.take(limit as usize).collect(),
            _ => skipped.collect(),
        })
    }

    async fn count(&self, collection: &str, conditions: &[Condition]) -> AppResult<u64> {
        let collections = self.collections.read().map_err(lock_poisoned)?;
        Ok(collections
            .get(collection)
            .map(|data| data.documents.iter().filter(|doc| matches(doc, conditions)).count() as u64)
            .unwrap_or(0))
    }

    async fn replace_one(&self, collection: &str, id: ObjectId, mut document: Document) -> AppResult<bool> {
        let mut collections = self.collections.write().map_err(lock_poisoned)?;
        let Some(data) = collections.get_mut(collection) else {
            return Ok(false);
        };

        document.insert("_id", id);
        check_unique(data, &document, Some(id))?;

        match data
            .documents
            .iter_mut()
            .find(|existing| existing.get_object_id("_id").ok() == Some(id))
        {
            Some(slot) => {
                *slot = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_fields(&self, collection: &str, id: ObjectId, fields: Document) -> AppResult<bool> {
        let mut collections = self.collections.write().map_err(lock_poisoned)?;
        let Some(data) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let Some(position) = data
            .documents
            .iter()
            .position(|existing| existing.get_object_id("_id").ok() == Some(id))
        else {
            return Ok(false);
        };

        let mut updated = data.documents[position].clone();
        for (field, value) in fields {
            if field != "_id" {
                updated.insert(field, value);
            }
        }
        check_unique(data, &updated, Some(id))?;
        data.documents[position] = updated;
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> AppResult<bool> {
        let mut collections = self.collections.write().map_err(lock_poisoned)?;
        let Some(data) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = data.documents.len();
        data.documents
            .retain(|existing| existing.get_object_id("_id").ok() != Some(id));
        Ok(data.documents.len() < before)
    }

    async fn ensure_indexes(&self, collection: &str, indexes: &[IndexSpec]) -> AppResult<()> {
        let mut collections = self.collections.write().map_err(lock_poisoned)?;
        let data = collections.entry(collection.to_string()).or_default();

        for index in indexes.iter().filter(|index| index.unique) {
            data.unique_indexes.retain(|existing| existing.name != index.name);
            data.unique_indexes.push(index.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn tour(name: &str, price: f64, secret: bool) -> Document {
        doc! { "name": name, "price": price, "secretTour": secret, "difficulty": "easy" }
    }

    #[actix_web::test]
    async fn test_filter_sort_and_paginate() {
        let store = MemoryStore::new();
        for (name, price) in [("a", 300.0), ("b", 100.0), ("c", 200.0), ("d", 400.0)] {
            store.insert_one("tours", tour(name, price, false)).await.unwrap();
        }

        let query = DocumentQuery::new()
            .filter(Condition::new("price", FilterOp::Gte, 150))
            .sort_by(crate::db::query::SortKey::desc("price"))
            .skip(1)
            .limit(2);
        let names: Vec<String> = store
            .find("tours", &query)
            .await
            .unwrap()
            .iter()
            .map(|d| d.get_str("name").unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a", "c"]);
    }

    #[actix_web::test]
    async fn test_ne_matches_missing_field() {
        let store = MemoryStore::new();
        store.insert_one("tours", doc! { "name": "plain" }).await.unwrap();
        store.insert_one("tours", tour("secret", 1.0, true)).await.unwrap();

        let visible = store.count("tours", &[Condition::ne("secretTour", true)]).await.unwrap();
        assert_eq!(visible, 1);
    }

    #[actix_web::test]
    async fn test_eq_matches_array_elements() {
        let store = MemoryStore::new();
        let guide = ObjectId::new();
        store
            .insert_one("tours", doc! { "name": "guided", "guides": [guide] })
            .await
            .unwrap();

        let found = store.find_one("tours", &[Condition::eq("guides", guide)]).await.unwrap();
        assert!(found.is_some());
    }

    #[actix_web::test]
    async fn test_unique_index_rejects_duplicates() {
        let store = MemoryStore::new();
        store
            .ensure_indexes("users", &[IndexSpec::unique("email_unique", &["email"])])
            .await
            .unwrap();

        store.insert_one("users", doc! { "email": "a@b.io" }).await.unwrap();
        let err = store.insert_one("users", doc! { "email": "a@b.io" }).await.unwrap_err();

        assert!(matches!(err, AppError::ValidationError(ref msg) if msg.contains("Duplicate field value")));
    }

    #[actix_web::test]
    async fn test_update_fields_leaves_other_fields() {
        let store = MemoryStore::new();
        let id = store
            .insert_one("tours", doc! { "name": "The Sea Explorer", "price": 497, "ratingQuantity": 0 })
            .await
            .unwrap();

        let updated = store
            .update_fields("tours", id, doc! { "ratingQuantity": 3, "ratingAverage": 4.3 })
            .await
            .unwrap();
        assert!(updated);

        let stored = store.find_one("tours", &[Condition::eq("_id", id)]).await.unwrap().unwrap();
        assert_eq!(stored.get_str("name").unwrap(), "The Sea Explorer");
        assert_eq!(stored.get_i32("price").unwrap(), 497);
        assert_eq!(stored.get_i32("ratingQuantity").unwrap(), 3);
        assert_eq!(stored.get_f64("ratingAverage").unwrap(), 4.3);

        assert!(!store.update_fields("tours", ObjectId::new(), doc! { "price": 1 }).await.unwrap());
    }

    #[actix_web::test]
    async fn test_replace_keeps_own_unique_key() {
        let store = MemoryStore::new();
        store
            .ensure_indexes("users", &[IndexSpec::unique("email_unique", &["email"])])
            .await
            .unwrap();
        let id = store.insert_one("users", doc! { "email": "a@b.io", "name": "A" }).await.unwrap();

        let replaced = store
            .replace_one("users", id, doc! { "email": "a@b.io", "name": "B" })
            .await
            .unwrap();
        assert!(replaced);
    }

    #[actix_web::test]
    async fn test_delete_missing_returns_false() {
        let store = MemoryStore::new();
        assert!(!store.delete_one("tours", ObjectId::new()).await.unwrap());
    }
}
