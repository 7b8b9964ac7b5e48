//! 인증 관련 설정
//!
//! JWT 서명/만료, 세션 쿠키, 비밀번호 해싱 비용을 다룹니다.
//! 요청마다 환경 변수를 읽지 않도록 시작 시점에 [`AuthSettings`] 스냅샷을 만들어
//! 서비스에 주입합니다.

use std::env;

use chrono::Duration;

use super::data_config::{Environment, PasswordConfig};

/// JWT 설정
pub struct JwtConfig;

impl JwtConfig {
    pub fn secret() -> String {
        env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using default (not secure for production!)");
            "your-secret-key".to_string()
        })
    }

    /// `JWT_EXPIRES_IN` (예: `90d`, `12h`, `30m`, `45s`). 기본 90일
    pub fn expires_in() -> Duration {
        env::var("JWT_EXPIRES_IN")
            .ok()
            .and_then(|raw| parse_duration(&raw))
            .unwrap_or_else(|| Duration::days(90))
    }
}

/// 세션 쿠키 설정
pub struct CookieConfig;

impl CookieConfig {
    /// `JWT_COOKIE_EXPIRES_IN` (일 단위). 기본 90일
    pub fn expires_in_days() -> i64 {
        env::var("JWT_COOKIE_EXPIRES_IN")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(90)
    }
}

/// `"90d"` 같은 기간 문자열을 파싱합니다. 단위가 없으면 초로 취급합니다.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (number, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: i64 = number.parse().ok()?;

    match unit.trim() {
        "d" | "day" | "days" => Some(Duration::days(value)),
        "h" | "hour" | "hours" => Some(Duration::hours(value)),
        "m" | "min" | "minutes" => Some(Duration::minutes(value)),
        "s" | "sec" | "seconds" => Some(Duration::seconds(value)),
        _ => None,
    }
}

/// 인증 서비스가 사용하는 설정 스냅샷
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub cookie_expires_in_days: i64,
    /// 운영 환경에서는 `Secure` 쿠키만 발급
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
}

impl AuthSettings {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: JwtConfig::secret(),
            jwt_expires_in: JwtConfig::expires_in(),
            cookie_expires_in_days: CookieConfig::expires_in_days(),
            secure_cookies: Environment::current().is_production(),
            bcrypt_cost: PasswordConfig::bcrypt_cost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("90d"), Some(Duration::days(90)));
        assert_eq!(parse_duration("12h"), Some(Duration::hours(12)));
        assert_eq!(parse_duration("30m"), Some(Duration::minutes(30)));
        assert_eq!(parse_duration("45s"), Some(Duration::seconds(45)));
        assert_eq!(parse_duration("3600"), Some(Duration::seconds(3600)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("d90"), None);
        assert_eq!(parse_duration("10 weeks"), None);
    }
}
