use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const HOT_LIST_PATH: &str =
    "/trpc.tencentvideohotlistdata.hospitalist.DoSearchHotListHttp/getSearchHotListHttp";
pub const SEARCH_PATH: &str = "/trpc.video%20search.mobile_search.MultiTerminalSearch/MbSearch";
pub const DETAIL_PATH: &str =
    "/trpc.universal_backend_service.hot_word_info.HttpHotWordRecall/GetHotWords";
pub const WHITELIST_PATH: &str = "/collect/whitelist";
pub const COURSES_PATH: &str = "/api/courses";
pub const GRADE_SEARCH_PATH: &str = "/api/grades/search";

/// Application error code for a search without a keyword.
pub const KEYWORD_REQUIRED: i64 = 1001;
/// Application error code for an unknown video id.
pub const VIDEO_NOT_FOUND: i64 = 1404;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub vid: String,
    pub title: String,
    pub sub_title: String,
    pub play_url: String,
    pub poster: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub cast: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    pub semester: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub student_id: String,
    pub course_id: String,
    pub semester: String,
    pub score: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSearch {
    pub student_id: String,
    pub course_id: Option<String>,
    pub semester: Option<String>,
}

#[derive(Deserialize)]
pub struct TitleSearch {
    pub name: String,
    pub actor: Option<String>,
    pub year: Option<String>,
}

/// Fixture data served by every route.
#[derive(Debug, Default)]
pub struct Catalog {
    pub videos: Vec<Video>,
    pub courses: Vec<Course>,
    pub grades: Vec<Grade>,
}

pub type Db = Arc<Catalog>;

impl Catalog {
    pub fn fixture() -> Self {
        let video = |vid: &str, title: &str, sub_title: &str, kind: &str, cast: &[&str]| Video {
            vid: vid.to_string(),
            title: title.to_string(),
            sub_title: sub_title.to_string(),
            play_url: format!("https://v.qq.com/x/cover/{vid}.html"),
            poster: format!("https://puui.qpic.cn/vcover/{vid}.jpg"),
            kind: kind.to_string(),
            cast: cast.iter().map(|c| c.to_string()).collect(),
        };
        let course = |id: &str, name: &str, semester: &str, kind: &str| Course {
            id: id.to_string(),
            name: name.to_string(),
            semester: semester.to_string(),
            kind: kind.to_string(),
        };
        let grade = |course_id: &str, semester: &str, score: u32| Grade {
            student_id: "112303100104".to_string(),
            course_id: course_id.to_string(),
            semester: semester.to_string(),
            score,
        };

        Self {
            videos: vec![
                video("d004589876d", "封神第一部", "2023 · 神话", "电影", &["费翔", "李雪健"]),
                video("m0045dyk2nx", "第二十一条", "2024 · 剧情", "电影", &["雷佳音", "马丽"]),
                video("r0047ahq8n2", "热辣滚烫", "2024 · 喜剧", "电影", &["贾玲", "雷佳音"]),
                video("x0049zl2025", "乘风", "2025 · 动作", "电影", &["赵丽颖"]),
                video("y00451fx3t9", "与凤行", "2024 · 古装", "电视剧", &["赵丽颖", "林更新"]),
            ],
            courses: vec![
                course("MATH101", "高等数学", "2023-2024春季", "required"),
                course("PHYS101", "大学物理", "2023-2024春季", "required"),
                course("ART201", "艺术鉴赏", "2023-2024秋季", "elective"),
            ],
            grades: vec![
                grade("MATH101", "2023-2024春季", 92),
                grade("PHYS101", "2023-2024春季", 85),
                grade("ART201", "2023-2024秋季", 78),
            ],
        }
    }

    fn year_matches(video: &Video, year: Option<&str>) -> bool {
        year.is_none_or(|y| video.sub_title.contains(y))
    }

    fn search(&self, keyword: &str, year: Option<&str>) -> Vec<&Video> {
        self.videos
            .iter()
            .filter(|v| {
                v.title.contains(keyword)
                    || v.sub_title.contains(keyword)
                    || v.cast.iter().any(|c| c.contains(keyword))
            })
            .filter(|v| Self::year_matches(v, year))
            .collect()
    }
}

pub fn app() -> Router {
    app_with(Catalog::fixture())
}

pub fn app_with(catalog: Catalog) -> Router {
    let db: Db = Arc::new(catalog);
    Router::new()
        .route(HOT_LIST_PATH, get(hot_list))
        .route(SEARCH_PATH, get(search).post(title_search))
        .route(DETAIL_PATH, get(detail))
        .route(WHITELIST_PATH, get(whitelist))
        .route(COURSES_PATH, get(courses))
        .route(GRADE_SEARCH_PATH, post(grade_search))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type Params = Query<HashMap<String, String>>;

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "code": 0, "data": data }))
}

fn error(code: i64, message: &str) -> Json<Value> {
    Json(json!({ "code": code, "message": message }))
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

async fn hot_list(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    let year = param(&params, "year");
    let kind = param(&params, "type");
    let list: Vec<&Video> = db
        .videos
        .iter()
        .filter(|v| Catalog::year_matches(v, year))
        .filter(|v| kind.is_none_or(|k| v.kind == k))
        .collect();
    ok(json!({ "list": list }))
}

async fn search(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    match param(&params, "keyword") {
        Some(keyword) => ok(json!({ "video": db.search(keyword, None) })),
        None => error(KEYWORD_REQUIRED, "keyword required"),
    }
}

async fn title_search(State(db): State<Db>, Json(input): Json<TitleSearch>) -> Json<Value> {
    let mut hits = db.search(&input.name, input.year.as_deref());
    if let Some(actor) = input.actor.as_deref() {
        hits.retain(|v| v.cast.iter().any(|c| c == actor));
    }
    ok(json!({ "video": hits }))
}

async fn detail(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    let vid = param(&params, "vid").unwrap_or_default();
    match db.videos.iter().find(|v| v.vid == vid) {
        Some(video) => ok(json!({ "videoInfo": video })),
        None => error(VIDEO_NOT_FOUND, "video not found"),
    }
}

async fn whitelist(
    State(db): State<Db>,
    Query(params): Params,
) -> Result<Json<Value>, StatusCode> {
    let year = param(&params, "year");
    let kind = param(&params, "movie_type");
    let list: Vec<&Video> = db
        .videos
        .iter()
        .filter(|v| Catalog::year_matches(v, year))
        .filter(|v| kind.is_none_or(|k| v.kind == k))
        .collect();
    if list.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(ok(json!({ "list": list })))
}

async fn courses(State(db): State<Db>, Query(params): Params) -> Json<Value> {
    let semester = param(&params, "semester");
    let kind = param(&params, "type");
    let list: Vec<&Course> = db
        .courses
        .iter()
        .filter(|c| semester.is_none_or(|s| c.semester == s))
        .filter(|c| kind.is_none_or(|k| c.kind == k))
        .collect();
    ok(json!({ "list": list }))
}

async fn grade_search(State(db): State<Db>, Json(input): Json<GradeSearch>) -> Json<Value> {
    let list: Vec<&Grade> = db
        .grades
        .iter()
        .filter(|g| g.student_id == input.student_id)
        .filter(|g| input.course_id.as_deref().is_none_or(|c| g.course_id == c))
        .filter(|g| input.semester.as_deref().is_none_or(|s| g.semester == s))
        .collect();
    ok(json!({ "list": list }))
}
