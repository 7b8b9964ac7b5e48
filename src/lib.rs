//! Natours 백엔드
//!
//! 투어 예약 서비스의 REST API와 서버 렌더링 화면을 제공합니다.
//!
//! # Features
//!
//! - **투어**: 목록 필터/정렬/필드 선택/페이지네이션, 통계, 월별 일정, 위치 기반 조회
//! - **인증**: 가입, 로그인, JWT 세션 쿠키, 비밀번호 재설정 메일, 역할 기반 권한
//! - **리뷰**: 투어별 리뷰와 평점 자동 집계
//! - **예약**: Stripe 체크아웃 세션, 결제 후 예약 생성
//! - **화면**: askama 템플릿 (개요, 투어 상세, 로그인, 계정, 내 예약)
//! - **저장소**: MongoDB 또는 메모리 (`DATABASE_BACKEND`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Routes      │ ← /api/v1/*, 화면, 정적 파일
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 추출, 응답 봉투
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 비즈니스 로직 (AppState에 조립)
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 엔티티별 접근, 기본 조건
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  DocumentStore  │ ← MongoDB / 메모리
//! └─────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;
