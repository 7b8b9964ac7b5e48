//! # Repository Layer
//!
//! 엔티티 단위 저장소 접근 계층입니다. 공통 CRUD는 [`Repository<T>`](repository::Repository)가,
//! 엔티티 전용 조회는 하위 모듈이 담당합니다.

pub mod repository;
pub mod users;

pub use repository::{Repository, parse_object_id};
pub use users::user_repo::UserRepository;
