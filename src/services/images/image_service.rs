//! 업로드 이미지 리사이즈/저장
//!
//! 모든 이미지는 지정 크기로 채워 자른 뒤(cover) JPEG 품질 90으로 `public/img/...` 아래에 저장합니다.
//! 디코딩/인코딩은 blocking 스레드 풀에서 실행합니다.

use std::path::{Path, PathBuf};

use actix_web::web;
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::core::errors::{AppError, AppResult, ErrorContext};

pub const TOUR_IMAGE_SIZE: (u32, u32) = (2000, 1333);
pub const USER_PHOTO_SIZE: (u32, u32) = (500, 500);
pub const JPEG_QUALITY: u8 = 90;

/// 투어 이미지 저장 결과 (파일 이름만)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourImages {
    pub image_cover: Option<String>,
    pub images: Vec<String>,
}

#[derive(Clone)]
pub struct ImageService {
    public_dir: PathBuf,
}

impl ImageService {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    fn tours_dir(&self) -> PathBuf {
        self.public_dir.join("img").join("tours")
    }

    fn users_dir(&self) -> PathBuf {
        self.public_dir.join("img").join("users")
    }

    /// `tour-<id>-<ms>-cover.jpeg`, `tour-<id>-<ms>-<n>.jpeg`
    pub async fn save_tour_images(
        &self,
        tour_id: &str,
        cover: Option<Vec<u8>>,
        images: Vec<Vec<u8>>,
    ) -> AppResult<TourImages> {
        let stamp = Utc::now().timestamp_millis();
        let (width, height) = TOUR_IMAGE_SIZE;
        let mut saved = TourImages::default();

        if let Some(data) = cover {
            let filename = format!("tour-{}-{}-cover.jpeg", tour_id, stamp);
            resize_and_store(data, width, height, self.tours_dir().join(&filename)).await?;
            saved.image_cover = Some(filename);
        }

        for (index, data) in images.into_iter().enumerate() {
            let filename = format!("tour-{}-{}-{}.jpeg", tour_id, stamp, index + 1);
            resize_and_store(data, width, height, self.tours_dir().join(&filename)).await?;
            saved.images.push(filename);
        }

        log::info!(
            "🖼️ 투어 이미지 저장: {} (cover: {}, images: {})",
            tour_id,
            saved.image_cover.is_some(),
            saved.images.len()
        );
        Ok(saved)
    }

    /// `user-<id>-<ms>.jpeg`
    pub async fn save_user_photo(&self, user_id: &str, data: Vec<u8>) -> AppResult<String> {
        let filename = format!("user-{}-{}.jpeg", user_id, Utc::now().timestamp_millis());
        let (width, height) = USER_PHOTO_SIZE;
        resize_and_store(data, width, height, self.users_dir().join(&filename)).await?;

        log::info!("🖼️ 사용자 사진 저장: {}", filename);
        Ok(filename)
    }
}

async fn resize_and_store(data: Vec<u8>, width: u32, height: u32, path: PathBuf) -> AppResult<()> {
    web::block(move || encode_to_file(&data, width, height, &path))
        .await
        .context("이미지 작업 실행 실패")?
}

fn encode_to_file(data: &[u8], width: u32, height: u32, path: &Path) -> AppResult<()> {
    let image = image::load_from_memory(data)
        .map_err(|_| AppError::ValidationError("Choose correct filetype to upload an Image".to_string()))?;

    let resized = image.resize_to_fill(width, height, FilterType::Lanczos3).to_rgb8();

    let mut encoded = Vec::new();
    resized
        .write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY))
        .context("JPEG 인코딩 실패")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("이미지 디렉터리 생성 실패 ({})", parent.display()))?;
    }
    std::fs::write(path, encoded).with_context(|| format!("이미지 저장 실패 ({})", path.display()))
}
