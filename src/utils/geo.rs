//! 지리 계산
//!
//! 좌표는 모두 도(degree) 단위이며, 거리 계산은 구면 근사(haversine)를 사용합니다.

use crate::core::errors::{AppError, AppResult};

/// 지구 반지름 (마일)
pub const EARTH_RADIUS_MILES: f64 = 3963.2;
/// 지구 반지름 (킬로미터)
pub const EARTH_RADIUS_KM: f64 = 6378.1;

const EARTH_RADIUS_METERS: f64 = 6_378_100.0;

/// 거리 단위. `mi` 외의 값은 모두 킬로미터로 취급합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

impl DistanceUnit {
    pub fn parse(unit: &str) -> Self {
        if unit == "mi" { DistanceUnit::Miles } else { DistanceUnit::Kilometers }
    }

    /// 거리를 라디안 반경으로 바꿀 때 나누는 값
    pub fn earth_radius(&self) -> f64 {
        match self {
            DistanceUnit::Miles => EARTH_RADIUS_MILES,
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
        }
    }

    /// 미터를 이 단위로 바꾸는 배수
    pub fn meter_multiplier(&self) -> f64 {
        match self {
            DistanceUnit::Miles => 0.000621371,
            DistanceUnit::Kilometers => 0.001,
        }
    }
}

/// 위도/경도 한 점
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// `"lat,lng"` 문자열 파싱
    pub fn parse(value: &str) -> AppResult<Self> {
        let invalid = || {
            AppError::ValidationError("Please provide latitude and longitude in lat,lng format!".to_string())
        };

        let (lat, lng) = value.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(invalid());
        }
        Ok(Self { lat, lng })
    }
}

/// 두 점 사이 대원 거리 (미터)
pub fn haversine_meters(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// 두 점 사이 각거리 (라디안)
pub fn angular_distance(a: LatLng, b: LatLng) -> f64 {
    haversine_meters(a, b) / EARTH_RADIUS_METERS
}
