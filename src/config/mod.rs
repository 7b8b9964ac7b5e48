//! 환경 변수 기반 설정 모듈

pub mod data_config;
pub mod auth_config;
pub mod service_config;

pub use data_config::*;
pub use auth_config::*;
pub use service_config::*;
