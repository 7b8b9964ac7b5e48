//! # 문자열 유틸리티
//!
//! slug 생성, HTML 이스케이프 함수들입니다.

/// 이름에서 URL용 slug 생성
///
/// 소문자로 바꾸고, 영숫자가 아닌 문자 구간은 `-` 하나로 합치며, 앞뒤 `-`는 제거합니다.
///
/// ```rust,ignore
/// assert_eq!(slugify("The Sea Explorer"), "the-sea-explorer");
/// assert_eq!(slugify("  Snow & Ice!  "), "snow-ice");
/// ```
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// 스크립트 주입 방지를 위한 HTML 특수문자 이스케이프
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
