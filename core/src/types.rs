//! Request filters and response DTOs for both backends.
//!
//! # Design
//! Optional filters are `Option` and are skipped when `None`, both in query
//! strings and in JSON bodies, so an omitted filter never reaches the wire as
//! an empty or null value.

use serde::{Deserialize, Serialize};

/// Filters for the video hot list.
#[derive(Debug, Clone, PartialEq)]
pub struct HotListQuery {
    pub page: u32,
    pub pagesize: u32,
    pub sort: u32,
    pub year: Option<String>,
    pub category: Option<String>,
}

impl Default for HotListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            pagesize: 30,
            sort: 0,
            year: None,
            category: None,
        }
    }
}

/// Keyword search over the video catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keyword: String,
    pub page: u32,
    pub pagesize: u32,
}

impl SearchQuery {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            page: 1,
            pagesize: 20,
        }
    }
}

/// Filters for the curated movie list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhitelistQuery {
    pub year: Option<String>,
    pub movie_type: Option<String>,
}

/// JSON body of a title search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSearch {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl TitleSearch {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            actor: None,
            year: None,
        }
    }
}

/// Filters for the course list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    pub semester: Option<String>,
    pub course_type: Option<String>,
}

/// JSON body of a grade search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeQuery {
    pub student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
}

impl GradeQuery {
    pub fn new(student_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            course_id: None,
            semester: None,
        }
    }
}

/// One entry of the hot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub title: String,
    pub play_url: String,
    #[serde(default)]
    pub sub_title: Option<String>,
}

/// One keyword search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sub_title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Detail record for a single video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    pub play_url: String,
    pub poster: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_query_omits_missing_filters() {
        let body = serde_json::to_value(GradeQuery::new("112303100104")).unwrap();
        assert_eq!(body, serde_json::json!({"studentId": "112303100104"}));
    }

    #[test]
    fn grade_query_uses_camel_case() {
        let query = GradeQuery {
            course_id: Some("MATH101".to_string()),
            semester: Some("2023-2024春季".to_string()),
            ..GradeQuery::new("1")
        };
        let body = serde_json::to_value(query).unwrap();
        assert_eq!(body["courseId"], "MATH101");
        assert_eq!(body["semester"], "2023-2024春季");
    }

    #[test]
    fn title_search_omits_missing_filters() {
        let body = serde_json::to_value(TitleSearch::new("第二十一条")).unwrap();
        assert_eq!(body, serde_json::json!({"name": "第二十一条"}));
    }

    #[test]
    fn movie_reads_camel_case_fields() {
        let movie: Movie =
            serde_json::from_str(r#"{"title":"A","playUrl":"u","subTitle":"2025"}"#).unwrap();
        assert_eq!(movie.play_url, "u");
        assert_eq!(movie.sub_title.as_deref(), Some("2025"));
    }

    #[test]
    fn search_hit_maps_type_field() {
        let hit: SearchHit = serde_json::from_str(r#"{"title":"封神","type":"电影"}"#).unwrap();
        assert_eq!(hit.kind.as_deref(), Some("电影"));
        assert!(hit.sub_title.is_none());
    }
}
