//! # Domain Layer Module
//!
//! 도메인 계층: 저장되는 엔티티, API 경계의 DTO, 인증/쿼리 모델입니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── entities  - 컬렉션에 저장되는 문서 (User, Tour, Review, Booking)
//! ├── dto       - 요청/응답 본문 (검증 포함)
//! └── models    - 인증 컨텍스트, JWT 클레임, 목록 쿼리 파싱
//!      │
//!      ▼
//! Services → Repositories → DocumentStore
//! ```
//!
//! ## 규칙
//!
//! - 엔티티는 응답으로 직접 직렬화하지 않습니다. 비밀번호 해시 같은 내부 필드는
//!   응답 DTO로 변환하면서 빠집니다.
//! - 요청 DTO는 `validator::Validate`로 검증한 뒤 `into_*` 변환으로 엔티티가 됩니다.
//!   수정 요청은 현재 엔티티에서 만든 입력 위에 패치를 합쳐 다시 검증합니다.
//! - 참조(`guides`, `tour`, `user`)는 ObjectId로 저장하고 조회 시점에 채웁니다.
//!
//! ```rust,ignore
//! use crate::domain::dto::tours::{TourInput, TourResponse};
//!
//! let input: TourInput = serde_json::from_value(body)?;
//! input.validate()?;
//! let tour = repo.insert(input.into_tour(None)?).await?;
//! let response = TourResponse::new(tour, guides);
//! ```

pub mod entities;
pub mod dto;
pub mod models;
