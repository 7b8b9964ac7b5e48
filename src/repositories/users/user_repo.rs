//! 사용자 전용 조회

use mongodb::bson::DateTime;

use crate::core::errors::AppResult;
use crate::db::{Condition, FilterOp};
use crate::domain::entities::users::user::{User, hash_reset_token};
use crate::repositories::repository::Repository;

pub type UserRepository = Repository<User>;

impl Repository<User> {
    /// 이메일은 소문자로 저장되므로 비교 전에 소문자로 맞춥니다.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_one(vec![Condition::eq("email", email.trim().to_lowercase())])
            .await
    }

    /// 평문 재설정 토큰으로, 만료되지 않은 사용자 조회
    pub async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<User>> {
        self.find_one(vec![
            Condition::eq("passwordResetToken", hash_reset_token(token)),
            Condition::new("passwordResetExpires", FilterOp::Gt, DateTime::now()),
        ])
        .await
    }
}
