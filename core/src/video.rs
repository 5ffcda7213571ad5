//! Client for the video-streaming backend.
//!
//! # Design
//! Two flavours of operation share one client. The raw operations
//! (`hot_list`, `search`, `detail`) return the response untouched and leave
//! checking to the `parse_*` methods. The validated operations
//! (`movie_list`, `search_title`) run the shared validator before handing
//! back the decoded JSON, dumping unparseable bodies to disk.

use std::io::Write;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::driver::{Driver, Outcome};
use crate::envelope::{
    array_field, record_count, require_fields, require_json_content, ApiEnvelope,
};
use crate::error::{ApiError, ValidationError};
use crate::http::{HttpRequest, HttpResponse};
use crate::session::{log_response, Session, Transport};
use crate::types::{
    HotListQuery, Movie, SearchHit, SearchQuery, TitleSearch, VideoInfo, WhitelistQuery,
};
use crate::validate::{validate_response, Expectation, DUMP_FILE};

pub const DEFAULT_BASE_URL: &str = "https://pbaccess.video.qq.com";

const HOT_LIST_PATH: &str =
    "/trpc.tencentvideohotlistdata.hospitalist.DoSearchHotListHttp/getSearchHotListHttp";
const SEARCH_PATH: &str = "/trpc.video%20search.mobile_search.MultiTerminalSearch/MbSearch";
const DETAIL_PATH: &str =
    "/trpc.universal_backend_service.hot_word_info.HttpHotWordRecall/GetHotWords";
const WHITELIST_PATH: &str = "/collect/whitelist";

/// Hot list table holding films.
const HOT_LIST_TABLE: u32 = 26;
/// Whitelist tab holding films.
const WHITELIST_TAB: u32 = 14;

const WHITELIST_MAX_MS: f64 = 700.0;
const TITLE_SEARCH_MAX_MS: f64 = 800.0;

/// Configuration with the headers the video backend expects.
pub fn default_config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url)
        .with_header("Content-Type", "application/json")
        .with_header("Accept", "application/json")
        .with_header("User-Agent", "MovieAPI Tester/1.0")
        .with_header("Referer", "https://v.qq.com")
}

#[derive(Debug)]
pub struct VideoClient<T = Session> {
    config: ClientConfig,
    transport: T,
    dump_path: PathBuf,
    verbose: bool,
}

impl VideoClient<Session> {
    pub fn new(base_url: &str) -> Self {
        let config = default_config(base_url);
        let transport = Session::new(&config);
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> VideoClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            dump_path: PathBuf::from(DUMP_FILE),
            verbose: false,
        }
    }

    /// Where validated operations write bodies that are not valid JSON.
    pub fn with_dump_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_path = path.into();
        self
    }

    /// Log a summary of every validated response at `info`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_hot_list(&self, query: &HotListQuery) -> HttpRequest {
        HttpRequest::get(self.config.endpoint(HOT_LIST_PATH))
            .param("page", query.page)
            .param("pagesize", query.pagesize)
            .param("sort", query.sort)
            .param("table", HOT_LIST_TABLE)
            .param_opt("year", query.year.as_deref())
            .param_opt("type", query.category.as_deref())
    }

    pub fn build_search(&self, query: &SearchQuery) -> HttpRequest {
        HttpRequest::get(self.config.endpoint(SEARCH_PATH))
            .param("keyword", &query.keyword)
            .param("page", query.page)
            .param("pagesize", query.pagesize)
    }

    pub fn build_detail(&self, vid: &str) -> HttpRequest {
        HttpRequest::get(self.config.endpoint(DETAIL_PATH))
            .param("vid", vid)
            .param("platform", 2)
            .param("defn", "hd")
    }

    pub fn build_whitelist(&self, query: &WhitelistQuery) -> HttpRequest {
        HttpRequest::get(self.config.endpoint(WHITELIST_PATH))
            .param("page", 1)
            .param("pagesize", 30)
            .param("sort", 0)
            .param("tabId", WHITELIST_TAB)
            .param_opt("year", query.year.as_deref())
            .param_opt("movie_type", query.movie_type.as_deref())
    }

    pub fn build_title_search(&self, search: &TitleSearch) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(search).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest::post_json(self.config.endpoint(SEARCH_PATH), body))
    }

    pub fn hot_list(&self, query: &HotListQuery) -> Result<HttpResponse, ApiError> {
        Ok(self.transport.send(&self.build_hot_list(query))?)
    }

    pub fn search(&self, query: &SearchQuery) -> Result<HttpResponse, ApiError> {
        Ok(self.transport.send(&self.build_search(query))?)
    }

    pub fn detail(&self, vid: &str) -> Result<HttpResponse, ApiError> {
        Ok(self.transport.send(&self.build_detail(vid))?)
    }

    /// Movies from a hot list response; every entry needs `title` and `playUrl`.
    pub fn parse_hot_list(&self, response: &HttpResponse) -> Result<Vec<Movie>, ApiError> {
        expect_status(response, 200)?;
        require_json_content(response)?;
        let data = ApiEnvelope::parse(&response.text())?.into_data()?;

        let list = array_field(&data, "list");
        if list.is_empty() {
            return Err(ValidationError::Assertion("no movies returned".to_string()).into());
        }
        list.into_iter()
            .map(|item| {
                require_fields(&item, "movie", &["title", "playUrl"])?;
                serde_json::from_value(item).map_err(|e| ApiError::Deserialization(e.to_string()))
            })
            .collect()
    }

    pub fn parse_search(&self, response: &HttpResponse) -> Result<Vec<SearchHit>, ApiError> {
        expect_status(response, 200)?;
        require_json_content(response)?;
        let data = ApiEnvelope::parse(&response.text())?.into_data()?;
        array_field(&data, "video")
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| ApiError::Deserialization(e.to_string()))
            })
            .collect()
    }

    pub fn parse_detail(&self, response: &HttpResponse) -> Result<VideoInfo, ApiError> {
        expect_status(response, 200)?;
        require_json_content(response)?;
        let data = ApiEnvelope::parse(&response.text())?.into_data()?;

        let info = data
            .get("videoInfo")
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
            .cloned()
            .ok_or_else(|| ValidationError::MissingField {
                context: "detail".to_string(),
                field: "videoInfo".to_string(),
            })?;
        require_fields(&info, "videoInfo", &["title", "playUrl", "poster"])?;
        serde_json::from_value(info).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// An empty-keyword search must either find nothing or report an error
    /// code; both are accepted.
    pub fn check_empty_keyword(&self, response: &HttpResponse) -> Result<(), ApiError> {
        expect_status(response, 200)?;
        let body: Value = serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        match body.pointer("/data/video").and_then(Value::as_array) {
            Some(videos) if !videos.is_empty() => Err(ValidationError::Assertion(
                "empty keyword search should return no results".to_string(),
            )
            .into()),
            Some(_) => Ok(()),
            None if body.get("code").and_then(Value::as_i64) != Some(0) => Ok(()),
            None => Err(ValidationError::Assertion(
                "empty keyword search should return an error".to_string(),
            )
            .into()),
        }
    }

    /// Curated movie list. A 404 means nothing matched and yields an empty
    /// list instead of a failure.
    pub fn movie_list(&self, query: &WhitelistQuery) -> Result<Value, ApiError> {
        let request = self.build_whitelist(query);
        let response = self.transport.send(&request)?;
        if self.verbose {
            log_response(&request.url, &response);
        }

        if response.status == 404 {
            tracing::warn!("no movies match the filters, returning an empty list");
            return Ok(Value::Array(Vec::new()));
        }
        self.validated_json(&response, WHITELIST_MAX_MS)
    }

    pub fn search_title(&self, search: &TitleSearch) -> Result<Value, ApiError> {
        let request = self.build_title_search(search)?;
        let response = self.transport.send(&request)?;
        if self.verbose {
            log_response(&request.url, &response);
        }
        self.validated_json(&response, TITLE_SEARCH_MAX_MS)
    }

    fn validated_json(
        &self,
        response: &HttpResponse,
        max_elapsed_ms: f64,
    ) -> Result<Value, ApiError> {
        let expectation = Expectation::ok_json(max_elapsed_ms).dump_to(&self.dump_path);
        validate_response(response, &expectation)?;
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// List movies, filter by year, then search by actor and by title.
    pub fn run_tests<W: Write>(&self, driver: &mut Driver<W>) -> Outcome {
        driver.run("video API tests", |d| {
            d.step("Fetching the full movie list...")?;
            let movies = self.movie_list(&WhitelistQuery::default())?;
            match record_count(&movies) {
                0 => d.warn("got 0 movies, the environment may have no data")?,
                n => d.report(&format!("Fetched {n} movies"))?,
            }

            d.step("Fetching movies from 2025...")?;
            let movies = self.movie_list(&WhitelistQuery {
                year: Some("2025".to_string()),
                ..WhitelistQuery::default()
            })?;
            d.report(&format!("Fetched {} movies", record_count(&movies)))?;

            d.step("Searching movies by actor...")?;
            let actor = "赵丽颖";
            let hits = self.search_title(&TitleSearch::new(actor))?;
            d.report(&format!("Fetched {} results for {actor}", record_count(&hits)))?;

            d.step("Searching a specific movie...")?;
            let title = "第二十一条";
            self.search_title(&TitleSearch::new(title))?;
            d.report(&format!("Fetched details for {title}"))
        })
    }
}

fn expect_status(response: &HttpResponse, expected: u16) -> Result<(), ValidationError> {
    if response.status == expected {
        Ok(())
    } else {
        Err(ValidationError::StatusMismatch {
            expected,
            actual: response.status,
        })
    }
}
