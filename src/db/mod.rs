//! # Database Module
//!
//! 문서 저장소 계층입니다.
//!
//! - [`Database`]: MongoDB 클라이언트 연결 (시작 시 `ping`으로 확인)
//! - [`DocumentStore`]: 컬렉션 단위 CRUD 포트
//! - [`MongoStore`] / [`MemoryStore`]: 포트 구현
//! - [`query`]: 저장소 중립적인 필터/정렬/페이지네이션 모델
//!
//! 어떤 구현을 쓸지는 `DATABASE_BACKEND` 환경 변수로 결정합니다.

pub mod query;
pub mod store;
pub mod mongo_store;
pub mod memory_store;

use std::sync::Arc;

use log::info;
use mongodb::{Client, options::ClientOptions};

use crate::config::{StorageBackend, StorageConfig};

pub use memory_store::MemoryStore;
pub use mongo_store::MongoStore;
pub use query::{Condition, DocumentQuery, FilterOp, SortKey};
pub use store::{DocumentStore, IndexKind, IndexSpec};

/// MongoDB 연결 핸들
#[derive(Clone)]
pub struct Database {
    client: Client,
    database_name: String,
}

impl Database {
    /// `MONGODB_URI`, `DATABASE_NAME`으로 연결하고 `ping`으로 확인합니다.
    pub async fn new() -> Result<Self, mongodb::error::Error> {
        let mongodb_uri = StorageConfig::mongodb_uri();
        let database_name = StorageConfig::database_name();

        let mut client_options = ClientOptions::parse(&mongodb_uri).await?;
        client_options.app_name = Some("natours".to_string());

        let client = Client::with_options(client_options)?;

        // 연결 테스트
        client
            .database(&database_name)
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await?;

        info!("✅ MongoDB 연결 성공: {}", database_name);

        Ok(Self {
            client,
            database_name,
        })
    }

    pub fn get_database(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }
}

/// 설정된 백엔드로 저장소를 생성합니다.
pub async fn connect_store() -> Result<Arc<dyn DocumentStore>, mongodb::error::Error> {
    match StorageConfig::backend() {
        StorageBackend::MongoDb => {
            let database = Database::new().await?;
            Ok(Arc::new(MongoStore::new(database)))
        }
        StorageBackend::Memory => {
            log::warn!("⚠️ 메모리 저장소 사용 중: 재시작하면 데이터가 사라집니다");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
