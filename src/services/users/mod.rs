//! 사용자 관리 서비스
//!
//! 관리자용 조회/수정/삭제와 본인 계정 수정(`update-me`), 탈퇴(`delete-me`)를 담당합니다.
//! 가입/로그인/비밀번호는 [`crate::services::auth`]에 있습니다.

pub mod user_service;

pub use user_service::{PASSWORD_ROUTE_MESSAGE, SIGNUP_ONLY_MESSAGE, UserService};
