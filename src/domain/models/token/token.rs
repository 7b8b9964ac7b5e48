use serde::{Deserialize, Serialize};

/// 세션 JWT 클레임
///
/// `id`는 사용자 ObjectId(hex), `iat`/`exp`는 유닉스 초입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}
