//! Users Entity Module
//!
//! 계정, 역할, 비밀번호 재설정 토큰을 가진 [`User`](user::User) 엔티티를 정의합니다.
//!
//! ```rust,ignore
//! use crate::domain::entities::users::user::User;
//!
//! let mut user = User::new("Laura Wilson".into(), "laura@example.com".into(), hashed_password);
//! let reset_token = user.create_password_reset_token();
//! ```

pub mod user;
