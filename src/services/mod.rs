//! 비즈니스 로직 계층
//!
//! 서비스는 저장소(`Repository<T>`)와 외부 어댑터(메일, 결제, 이미지)를 묶어 도메인 규칙을 구현합니다.
//! 모든 서비스는 `Clone`이고 [`AppState`](crate::core::state::AppState)에 한 번 만들어져 공유됩니다.
//!
//! | 모듈 | 역할 |
//! |------|------|
//! | `crud` | 리소스 공통 목록/단건/생성/수정/삭제 |
//! | `auth` | 가입, 로그인, 세션 토큰, 비밀번호 재설정 |
//! | `users` | 관리자 사용자 관리, 본인 계정 수정 |
//! | `tours` | 투어, 통계, 위치 기반 조회 |
//! | `reviews` | 리뷰, 투어 평점 집계 |
//! | `bookings` | 예약, 결제 세션 |
//! | `email` | 메일 템플릿과 전송 |
//! | `payments` | 결제사 체크아웃 세션 |
//! | `images` | 업로드 이미지 리사이즈/저장 |

pub mod crud;
pub mod auth;
pub mod users;
pub mod tours;
pub mod reviews;
pub mod bookings;
pub mod email;
pub mod payments;
pub mod images;
