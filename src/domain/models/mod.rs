//! 요청 처리 중에만 쓰이는 도메인 모델 (인증 컨텍스트, 토큰 클레임, 쿼리 옵션)

pub mod auth;
pub mod token;
pub mod query;
