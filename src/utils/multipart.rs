//! multipart/form-data 수집
//!
//! 업로드 본문을 메모리로 모은 뒤 이미지 파일과 일반 텍스트 필드로 나눕니다.
//! 이미지가 아닌 파일이 하나라도 있으면 전체 요청을 거부합니다.
//! 파일/텍스트 필드 개수는 [`UploadLimits`]를 넘으면 나머지를 읽기 전에 거부합니다.

use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use actix_web::mime;
use futures_util::StreamExt;

use crate::core::errors::{AppError, AppResult};

/// 파일 하나의 최대 크기
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// 텍스트 필드 하나의 최대 크기
pub const MAX_TEXT_BYTES: usize = 64 * 1024;

/// 요청 하나에 허용하는 파일/텍스트 필드 수
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_fields: usize,
}

impl UploadLimits {
    /// `/update-me`: `photo` 1개와 계정 필드
    pub const USER_PHOTO: UploadLimits = UploadLimits { max_files: 1, max_fields: 4 };

    /// 투어 이미지: 표지 1개 + 사진 3개와 투어 필드
    pub const TOUR_IMAGES: UploadLimits = UploadLimits { max_files: 4, max_fields: 16 };
}

const NOT_AN_IMAGE: &str = "Choose correct filetype to upload an Image";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// 폼 필드 이름 (`photo`, `imageCover`, `images` ...)
    pub field: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    pub fn files_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadedFile> + 'a {
        self.files.iter().filter(move |file| file.field == field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// multipart 본문 전체를 읽어 [`MultipartForm`]으로 변환
pub async fn collect(mut payload: Multipart, limits: UploadLimits) -> AppResult<MultipartForm> {
    let mut form = MultipartForm::default();
    let (mut file_count, mut field_count) = (0, 0);

    while let Some(item) = payload.next().await {
        let field = item.map_err(invalid_body)?;
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();

        if is_file {
            let is_image = field
                .content_type()
                .is_some_and(|content_type| content_type.type_() == mime::IMAGE);
            if !is_image {
                return Err(AppError::ValidationError(NOT_AN_IMAGE.to_string()));
            }

            file_count += 1;
            if file_count > limits.max_files {
                return Err(AppError::ValidationError(format!(
                    "Too many files: at most {} per request",
                    limits.max_files
                )));
            }

            let data = read_field(field, MAX_FILE_BYTES).await?;
            if !data.is_empty() {
                form.files.push(UploadedFile { field: name, data });
            }
        } else {
            field_count += 1;
            if field_count > limits.max_fields {
                return Err(AppError::ValidationError(format!(
                    "Too many fields: at most {} per request",
                    limits.max_fields
                )));
            }

            let data = read_field(field, MAX_TEXT_BYTES).await?;
            let value = String::from_utf8(data)
                .map_err(|_| AppError::ValidationError(format!("Invalid text in field {}", name)))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

async fn read_field(mut field: Field, limit: usize) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(invalid_body)?;
        if data.len() + chunk.len() > limit {
            return Err(AppError::ValidationError("Uploaded file is too large".to_string()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn invalid_body(e: actix_multipart::MultipartError) -> AppError {
    AppError::ValidationError(format!("Invalid multipart body: {}", e))
}
