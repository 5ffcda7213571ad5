//! End-to-end checks against the live mock server.
//!
//! # Design
//! Starts the mock backends on a random port and drives the real `Session`
//! over HTTP, so request encoding, header handling, latency measurement and
//! response parsing are exercised together.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};

use apiprobe_core::{
    direct, validate_response, video, ApiError, ClientConfig, CourseFilter, Driver, Expectation,
    HotListQuery, HttpRequest, Outcome, SchoolClient, SearchQuery, Session, Transport,
    TransportErrorKind, ValidationError, VideoClient, WhitelistQuery,
};

/// Start the mock server on a random port and return its address.
fn spawn_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Answer exactly one connection with a fixed `200` response and hand back
/// the request as received, lower-cased.
fn serve_once(content_type: &str, body: &[u8]) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let mut reply = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\n\
         connection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    reply.extend_from_slice(body);

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        let head_end = loop {
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "connection closed before the request head ended");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&raw[..head_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map_or(0, |v| v.trim().parse::<usize>().unwrap());
        while raw.len() < head_end + content_length {
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "connection closed before the request body ended");
            raw.extend_from_slice(&buf[..n]);
        }
        stream.write_all(&reply).unwrap();
        String::from_utf8_lossy(&raw).to_lowercase()
    });

    (addr, handle)
}

fn header_lines<'a>(request: &'a str, name: &str) -> Vec<&'a str> {
    let prefix = format!("{name}:");
    request
        .lines()
        .filter(|line| line.starts_with(&prefix))
        .collect()
}

fn video_client(addr: SocketAddr) -> VideoClient {
    VideoClient::new(&format!("http://{addr}"))
}

#[test]
fn hot_list_returns_movies_with_play_urls() {
    let client = video_client(spawn_server());

    let response = client.hot_list(&HotListQuery::default()).unwrap();
    validate_response(&response, &Expectation::ok_json(2_000.0)).unwrap();
    assert!(response.elapsed_ms > 0.0);

    let movies = client.parse_hot_list(&response).unwrap();
    assert_eq!(movies.len(), 5);
    assert!(movies.iter().all(|m| !m.play_url.is_empty()));
}

#[test]
fn hot_list_by_year_only_contains_that_year() {
    let client = video_client(spawn_server());
    let year = "2025";
    let query = HotListQuery {
        year: Some(year.to_string()),
        ..HotListQuery::default()
    };

    let movies = client.parse_hot_list(&client.hot_list(&query).unwrap()).unwrap();
    assert!(!movies.is_empty());
    for movie in &movies {
        if let Some(sub_title) = &movie.sub_title {
            assert!(sub_title.contains(year), "{} is not from {year}", movie.title);
        }
    }
}

#[test]
fn keyword_search_results_contain_the_keyword() {
    let client = video_client(spawn_server());
    let keyword = "封神";

    let hits = client
        .parse_search(&client.search(&SearchQuery::new(keyword)).unwrap())
        .unwrap();
    assert!(!hits.is_empty(), "no results for {keyword}");
    for hit in &hits {
        let in_sub_title = hit.sub_title.as_deref().unwrap_or("").contains(keyword);
        assert!(hit.title.contains(keyword) || in_sub_title);
    }
}

#[test]
fn actor_search_returns_films() {
    let client = video_client(spawn_server());
    let actor = "雷佳音";

    let hits = client
        .parse_search(&client.search(&SearchQuery::new(actor)).unwrap())
        .unwrap();
    assert!(!hits.is_empty(), "no films with {actor}");
    for hit in &hits {
        assert!(hit.kind.as_deref().unwrap_or("").contains("电影"), "{} is not a film", hit.title);
    }
}

#[test]
fn detail_has_title_play_url_and_poster() {
    let client = video_client(spawn_server());
    let info = client
        .parse_detail(&client.detail("d004589876d").unwrap())
        .unwrap();
    assert_eq!(info.title, "封神第一部");
    assert!(info.poster.ends_with(".jpg"));
}

#[test]
fn unknown_detail_surfaces_the_api_message() {
    let client = video_client(spawn_server());
    let err = client.parse_detail(&client.detail("nope").unwrap()).unwrap_err();
    assert!(matches!(
        err,
        ApiError::Application { ref message, .. } if message == "video not found"
    ));
}

#[test]
fn empty_keyword_search_is_accepted() {
    let client = video_client(spawn_server());
    let response = client.search(&SearchQuery::new("")).unwrap();
    client.check_empty_keyword(&response).unwrap();
}

#[test]
fn unreachable_host_is_a_connect_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = VideoClient::new(&format!("http://{addr}"));

    let err = client.hot_list(&HotListQuery::default()).unwrap_err();
    match err {
        ApiError::Transport(t) => assert_eq!(t.kind, TransportErrorKind::Connect),
        other => panic!("expected transport error, got {other}"),
    }
}

#[test]
fn video_suite_passes_against_mock() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server();
    let config = video::default_config(&format!("http://{addr}"));
    let client = VideoClient::with_transport(config.clone(), apiprobe_core::Session::new(&config))
        .with_dump_path(dir.path().join("response_content.txt"));

    let mut driver = Driver::new(Vec::new());
    assert_eq!(client.run_tests(&mut driver), Outcome::Passed);

    let text = String::from_utf8(driver.into_inner()).unwrap();
    assert!(text.contains("Fetched 5 movies"));
    assert!(text.contains("Fetched 1 movies"));
    assert!(text.contains("Fetched 2 results for 赵丽颖"));
    assert!(!dir.path().join("response_content.txt").exists());
}

#[test]
fn school_suite_passes_against_mock() {
    let addr = spawn_server();
    let client = SchoolClient::new(&format!("http://{addr}"), Some("test-token"));

    let mut driver = Driver::new(Vec::new());
    assert_eq!(client.run_tests(&mut driver), Outcome::Passed);

    let text = String::from_utf8(driver.into_inner()).unwrap();
    assert!(text.contains("Fetched 3 courses"));
    assert!(text.contains("Fetched 2 spring courses"));
    assert!(text.contains("Fetched 3 grades for student 112303100104"));
    assert!(text.contains("Fetched 1 math grades for student 112303100104"));
    assert!(text.contains("All tests passed!"));
}

#[test]
fn school_suite_against_dead_host_reports_unexpected_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = SchoolClient::new(&format!("http://{addr}"), None);

    let mut driver = Driver::new(Vec::new());
    assert!(matches!(client.run_tests(&mut driver), Outcome::Errored(_)));

    let text = String::from_utf8(driver.into_inner()).unwrap();
    assert!(text.contains("Unexpected error: "));
    assert!(text.contains("Finished - "));
}

#[test]
fn non_utf8_body_is_dumped_as_received() {
    // "正在维护" in GBK.
    let body: &[u8] = b"<html>\xd5\xfd\xd4\xda\xce\xac\xbb\xa4</html>";
    let (addr, server) = serve_once("text/html", body);
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("response_content.txt");
    let client = video_client(addr).with_dump_path(&dump);

    let err = client.movie_list(&WhitelistQuery::default()).unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, ApiError::Validation(ValidationError::InvalidJson { .. })));
    assert_eq!(std::fs::read(&dump).unwrap(), body);
}

#[test]
fn school_client_sends_default_headers_and_bearer_token() {
    let (addr, server) = serve_once("application/json", br#"{"code":0,"data":{"list":[]}}"#);
    let client = SchoolClient::new(&format!("http://{addr}"), Some("tok"));

    client.get_course_list(&CourseFilter::default()).unwrap();
    let request = server.join().unwrap();

    assert!(request.starts_with("get /api/courses "));
    assert_eq!(header_lines(&request, "user-agent"), ["user-agent: schoolapi tester/1.0"]);
    assert_eq!(header_lines(&request, "authorization"), ["authorization: bearer tok"]);
    assert_eq!(header_lines(&request, "accept"), ["accept: application/json"]);
}

#[test]
fn request_header_replaces_default_on_the_wire() {
    let (addr, server) = serve_once("application/json", b"{}");
    let config = ClientConfig::new(&format!("http://{addr}"))
        .with_header("Content-Type", "text/plain")
        .with_header("User-Agent", "SchoolAPI Tester/1.0");
    let session = Session::new(&config);

    let request = HttpRequest::post_json(config.endpoint("/api/grades/search"), "{}".to_string());
    let response = session.send(&request).unwrap();
    let wire = server.join().unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(header_lines(&wire, "content-type"), ["content-type: application/json"]);
    assert_eq!(header_lines(&wire, "user-agent"), ["user-agent: schoolapi tester/1.0"]);
    assert!(wire.ends_with("\r\n\r\n{}"));
}

#[test]
fn fetch_keeps_the_url_verbatim() {
    let (addr, server) = serve_once("text/html", b"<html></html>");

    let response = direct::fetch(&format!("http://{addr}/dir/")).unwrap();
    let request = server.join().unwrap();

    assert_eq!(response.body, b"<html></html>");
    assert!(request.starts_with("get /dir/ http/1.1\r\n"), "{request}");
}
