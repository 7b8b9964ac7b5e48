//! 사용자 관리
//!
//! 관리자용 CRUD와 본인 계정 수정/탈퇴를 담당합니다. 비밀번호는 이 서비스로 바꿀 수 없고,
//! 가입은 인증 경로(`/signup`)에서만 가능합니다.

use async_trait::async_trait;

use crate::core::errors::{AppError, AppResult};
use crate::db::SortKey;
use crate::domain::dto::users::{UpdateMeRequest, UserAdminInput, UserResponse};
use crate::domain::entities::users::user::User;
use crate::repositories::UserRepository;
use crate::services::crud::CrudResource;

pub const PASSWORD_ROUTE_MESSAGE: &str = "This route is not for password updates. Please use /update-password.";
pub const SIGNUP_ONLY_MESSAGE: &str = "This route is not defined! Please use /signup instead";

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// 본인 이름/이메일/사진 수정
    ///
    /// 본문에 비밀번호 필드가 있으면 400입니다.
    pub async fn update_me(&self, current: &User, request: UpdateMeRequest, photo: Option<String>) -> AppResult<User> {
        if request.touches_password() {
            return Err(AppError::ValidationError(PASSWORD_ROUTE_MESSAGE.to_string()));
        }

        let mut user = self.reload(current).await?;
        if let Some(name) = request.name.map(|name| name.trim().to_string()).filter(|name| !name.is_empty()) {
            user.name = name;
        }
        if let Some(email) = request.email.map(|email| email.trim().to_lowercase()).filter(|email| !email.is_empty()) {
            user.email = email;
        }
        if let Some(photo) = photo {
            user.photo = photo;
        }

        self.users.save(&user).await?;
        log::info!("👤 계정 정보 수정: {}", user.email);
        Ok(user)
    }

    /// 탈퇴. 문서는 남기고 `active=false`로 숨깁니다.
    pub async fn delete_me(&self, current: &User) -> AppResult<()> {
        let mut user = self.reload(current).await?;
        user.active = false;
        self.users.save(&user).await?;

        log::info!("👋 계정 비활성화: {}", user.email);
        Ok(())
    }

    async fn reload(&self, current: &User) -> AppResult<User> {
        let id = current
            .id
            .ok_or_else(|| AppError::AuthenticationError("Token does not belong to the current User".to_string()))?;
        self.users
            .find_by_object_id(id)
            .await?
            .ok_or_else(|| AppError::AuthenticationError("Token does not belong to the current User".to_string()))
    }
}

#[async_trait]
impl CrudResource for UserService {
    type Entity = User;
    type Input = UserAdminInput;
    type Output = UserResponse;

    fn repository(&self) -> &UserRepository {
        &self.users
    }

    fn default_sort(&self) -> Vec<SortKey> {
        vec![SortKey::asc("name")]
    }

    /// 관리자 수정만 허용. 새 사용자는 가입 경로로만 만들어집니다.
    fn build(&self, input: UserAdminInput, existing: Option<&User>) -> AppResult<User> {
        let Some(existing) = existing else {
            return Err(AppError::InternalError(SIGNUP_ONLY_MESSAGE.to_string()));
        };

        let mut user = existing.clone();
        user.name = input.name.trim().to_string();
        user.email = input.email.trim().to_lowercase();
        user.role = input.role;
        user.photo = input.photo;
        Ok(user)
    }

    async fn present_many(&self, users: Vec<User>) -> AppResult<Vec<UserResponse>> {
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::domain::entities::Entity;
    use crate::db::MemoryStore;
    use crate::domain::entities::users::user::Role;
    use crate::domain::models::query::ApiFeatures;

    async fn service_with(names: &[&str]) -> (UserService, Vec<User>) {
        let users = UserRepository::new(Arc::new(MemoryStore::new()));
        let mut saved = Vec::new();
        for name in names {
            let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
            saved.push(users.insert(User::new(name.to_string(), email, "hash".into())).await.unwrap());
        }
        (UserService::new(users), saved)
    }

    #[actix_web::test]
    async fn test_update_me_rejects_password_fields() {
        let (service, users) = service_with(&["Ann Lee"]).await;
        let request = UpdateMeRequest {
            password: Some("newpass123".into()),
            ..Default::default()
        };

        let err = service.update_me(&users[0], request, None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref msg) if msg == PASSWORD_ROUTE_MESSAGE));
    }

    #[actix_web::test]
    async fn test_update_me_applies_name_email_and_photo() {
        let (service, users) = service_with(&["Ann Lee"]).await;
        let request = UpdateMeRequest {
            name: Some("Ann Park".into()),
            email: Some("Ann.Park@Example.com".into()),
            ..Default::default()
        };

        let updated = service
            .update_me(&users[0], request, Some("user-1-2.jpeg".into()))
            .await
            .unwrap();
        assert_eq!(updated.name, "Ann Park");
        assert_eq!(updated.email, "ann.park@example.com");
        assert_eq!(updated.photo, "user-1-2.jpeg");
        assert_eq!(updated.role, Role::User);
    }

    #[actix_web::test]
    async fn test_delete_me_hides_user() {
        let (service, users) = service_with(&["Ann Lee", "Bob Kim"]).await;
        service.delete_me(&users[0]).await.unwrap();

        let listed = service.list(&ApiFeatures::default(), vec![]).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "Bob Kim");
        assert!(matches!(service.get(&users[0].id_string()).await, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_admin_update_never_touches_password() {
        let (service, users) = service_with(&["Ann Lee"]).await;
        let updated = service
            .update(&users[0].id_string(), json!({ "role": "guide", "password": "ignored123" }))
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Guide);

        let stored = service.repository().find_by_id(&users[0].id_string()).await.unwrap().unwrap();
        assert_eq!(stored.password, "hash");
    }

    #[actix_web::test]
    async fn test_admin_update_rejects_unknown_role() {
        let (service, users) = service_with(&["Ann Lee"]).await;
        let err = service
            .update(&users[0].id_string(), json!({ "role": "owner" }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref msg) if msg.contains("Unsupported role: owner")));
    }

    #[actix_web::test]
    async fn test_create_is_not_supported() {
        let (service, _) = service_with(&[]).await;
        let err = service
            .create(json!({ "name": "Cara", "email": "cara@example.com" }))
            .await
            .unwrap_err();
        assert_eq!(err.message(), SIGNUP_ONLY_MESSAGE);
    }

    #[actix_web::test]
    async fn test_list_sorts_by_name() {
        let (service, _) = service_with(&["Cara Diaz", "Ann Lee", "Bob Kim"]).await;
        let listed = service.list(&ApiFeatures::default(), vec![]).await.unwrap();
        let names: Vec<&str> = listed.iter().filter_map(|user| user["name"].as_str()).collect();
        assert_eq!(names, vec!["Ann Lee", "Bob Kim", "Cara Diaz"]);
    }
}
