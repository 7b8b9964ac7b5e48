//! MongoDB 구현

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    IndexModel,
    bson::{Bson, Document, doc, oid::ObjectId},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};

use crate::core::errors::{AppError, AppResult};
use crate::db::Database;
use crate::db::query::{Condition, DocumentQuery};
use crate::db::store::{DocumentStore, IndexKind, IndexSpec, duplicate_field_message};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB 컬렉션 위에서 동작하는 [`DocumentStore`]
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.db.get_database().collection::<Document>(name)
    }
}

/// 조건 목록을 MongoDB 필터 문서로 변환
///
/// 같은 필드의 조건은 하나의 연산자 문서로 합칩니다: `{price: {$gte: 1, $lte: 9}}`
pub fn to_filter(conditions: &[Condition]) -> Document {
    let mut filter = Document::new();

    for condition in conditions {
        let operator = condition.op.mongo_operator();
        match filter.get_mut(&condition.field) {
            Some(Bson::Document(ops)) => {
                ops.insert(operator, condition.value.clone());
            }
            _ => {
                let mut ops = Document::new();
                ops.insert(operator, condition.value.clone());
                filter.insert(condition.field.clone(), ops);
            }
        }
    }

    filter
}

fn to_sort(query: &DocumentQuery) -> Document {
    let mut sort = Document::new();
    for key in &query.sort {
        sort.insert(key.field.clone(), if key.descending { -1 } else { 1 });
    }
    sort
}

fn map_mongo_error(e: mongodb::error::Error) -> AppError {
    let duplicate = match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    };

    if duplicate {
        return AppError::ValidationError(duplicate_field_message(&duplicate_value(&e.to_string())));
    }
    AppError::DatabaseError(e.to_string())
}

/// `... dup key: { name: "The Forest Hiker" }` 에서 `"The Forest Hiker"` 추출
fn duplicate_value(message: &str) -> String {
    let Some((_, rest)) = message.split_once("dup key:") else {
        return "(unknown)".to_string();
    };

    let mut quoted = rest.split('"');
    match (quoted.next(), quoted.next()) {
        (Some(_), Some(value)) => format!("\"{}\"", value),
        _ => rest.trim().trim_matches(|c| c == '{' || c == '}').trim().to_string(),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, document: Document) -> AppResult<ObjectId> {
        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(map_mongo_error)?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::DatabaseError("삽입된 문서의 _id가 ObjectId가 아닙니다".to_string()))
    }

    async fn find(&self, collection: &str, query: &DocumentQuery) -> AppResult<Vec<Document>> {
        let coll = self.collection(collection);
        let mut action = coll.find(to_filter(&query.conditions));

        if !query.sort.is_empty() {
            action = action.sort(to_sort(query));
        }
        if query.skip > 0 {
            action = action.skip(query.skip);
        }
        if let Some(limit) = query.limit {
            action = action.limit(limit);
        }

        let cursor = action.await.map_err(map_mongo_error)?;
        cursor.try_collect().await.map_err(map_mongo_error)
    }

    async fn count(&self, collection: &str, conditions: &[Condition]) -> AppResult<u64> {
        self.collection(collection)
            .count_documents(to_filter(conditions))
            .await
            .map_err(map_mongo_error)
    }

    async fn replace_one(&self, collection: &str, id: ObjectId, document: Document) -> AppResult<bool> {
        let result = self
            .collection(collection)
            .replace_one(doc! { "_id": id }, document)
            .await
            .map_err(map_mongo_error)?;

        Ok(result.matched_count > 0)
    }

    async fn update_fields(&self, collection: &str, id: ObjectId, fields: Document) -> AppResult<bool> {
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.matched_count > 0)
    }

    async fn delete_one(&self, collection: &str, id: ObjectId) -> AppResult<bool> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(map_mongo_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn ensure_indexes(&self, collection: &str, indexes: &[IndexSpec]) -> AppResult<()> {
        if indexes.is_empty() {
            return Ok(());
        }

        let models: Vec<IndexModel> = indexes
            .iter()
            .map(|spec| {
                let mut keys = Document::new();
                for (field, kind) in &spec.keys {
                    let value = match kind {
                        IndexKind::Ascending => Bson::Int32(1),
                        IndexKind::Descending => Bson::Int32(-1),
                        IndexKind::Sphere2d => Bson::String("2dsphere".to_string()),
                    };
                    keys.insert(*field, value);
                }

                IndexModel::builder()
                    .keys(keys)
                    .options(
                        IndexOptions::builder()
                            .unique(spec.unique)
                            .name(spec.name.to_string())
                            .build(),
                    )
                    .build()
            })
            .collect();

        self.collection(collection)
            .create_indexes(models)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        log::info!("📇 인덱스 생성 완료: {} ({}개)", collection, indexes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::FilterOp;

    #[test]
    fn test_to_filter_merges_operators_per_field() {
        let filter = to_filter(&[
            Condition::new("price", FilterOp::Gte, 500),
            Condition::new("price", FilterOp::Lt, 1500),
            Condition::ne("secretTour", true),
        ]);

        assert_eq!(
            filter,
            doc! {
                "price": { "$gte": 500, "$lt": 1500 },
                "secretTour": { "$ne": true },
            }
        );
    }

    #[test]
    fn test_duplicate_value_extraction() {
        let msg = r#"E11000 duplicate key error collection: natours.tours index: name_unique dup key: { name: "The Forest Hiker" }"#;
        assert_eq!(duplicate_value(msg), "\"The Forest Hiker\"");
        assert_eq!(duplicate_value("E11000 without details"), "(unknown)");
    }
}
