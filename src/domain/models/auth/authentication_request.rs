use crate::domain::entities::users::user::Role;

/// 인증 모드
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// 인증이 반드시 필요함 (protect)
    Required,
    /// 토큰이 유효하면 사용자 정보만 붙이고, 아니어도 통과 (isLoggedIn)
    Optional,
}

/// 요구되는 역할
#[derive(Debug, Clone)]
pub enum RequiredRole {
    Single(Role),
    /// 나열된 역할 중 하나면 허용
    Any(Vec<Role>),
}

impl RequiredRole {
    pub fn is_satisfied(&self, role: Role) -> bool {
        match self {
            RequiredRole::Single(required) => *required == role,
            RequiredRole::Any(allowed) => allowed.contains(&role),
        }
    }
}
