//! 인증 서비스
//!
//! - [`TokenService`]: HS256 세션 토큰 발급/검증, 세션 쿠키
//! - [`AuthService`]: 가입, 로그인, 토큰으로 현재 사용자 확인, 비밀번호 재설정/변경
//!
//! ```rust,ignore
//! let session = state.auth.login("laura@example.com", "pass1234").await?;
//! let cookie = state.auth.tokens().session_cookie(session.token.clone());
//! ```

pub mod token_service;
pub mod auth_service;

pub use token_service::*;
pub use auth_service::*;
