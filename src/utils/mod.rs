//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`string_utils`] - slug 생성, HTML 이스케이프
//! - [`geo`] - 좌표 파싱과 거리 계산
//! - [`multipart`] - 업로드 본문 수집과 이미지 타입 검사

pub mod string_utils;
pub mod geo;
pub mod multipart;
