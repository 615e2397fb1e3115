//! Leaderboard handle tests against the in-memory, file and REST stores.
//!
//! These are plain `#[test]`s: the handle owns its own runtime and must not be
//! dropped inside another one.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;

use classic_tetris::leaderboard::{
    FileStore, Leaderboard, LeaderboardConfig, LeaderboardEvent, LeaderboardStatus, MemoryStore,
    RestStore, ScoreEntry, ScoreStore,
};

const WAIT: Duration = Duration::from_secs(5);

fn expect_event(board: &mut Leaderboard) -> LeaderboardEvent {
    board.recv_timeout(WAIT).expect("leaderboard event")
}

fn fetched(board: &mut Leaderboard) -> Vec<ScoreEntry> {
    board.refresh().unwrap();
    match expect_event(board) {
        LeaderboardEvent::Fetched(entries) => entries,
        other => panic!("expected Fetched, got {other:?}"),
    }
}

#[test]
fn test_submit_then_refresh_returns_sorted_top_scores() {
    let store = MemoryStore::with_entries(vec![
        ScoreEntry::new("low", 10, 1, 0),
        ScoreEntry::new("mid", 500, 2, 12),
    ]);
    let mut board = Leaderboard::start(store.clone(), WAIT);
    assert!(board.is_available());
    assert!(matches!(board.status(), LeaderboardStatus::Ready(_)));

    board.submit("  ada  ", 1200, 3, 25).unwrap();
    match expect_event(&mut board) {
        LeaderboardEvent::Submitted(entry) => {
            assert_eq!(entry, ScoreEntry::new("ada", 1200, 3, 25));
        }
        other => panic!("expected Submitted, got {other:?}"),
    }

    let names: Vec<_> = fetched(&mut board).into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["ada", "mid", "low"]);
    assert_eq!(tokio_test::block_on(store.entries()).len(), 3);
}

#[test]
fn test_refresh_is_capped_at_ten() {
    let entries = (0..15).map(|i| ScoreEntry::new(format!("p{i}"), i * 10, 1, 0)).collect();
    let mut board = Leaderboard::start(MemoryStore::with_entries(entries), WAIT);

    let top = fetched(&mut board);
    assert_eq!(top.len(), 10);
    assert_eq!(top[0].score, 140);
    assert_eq!(top[9].score, 50);
}

#[test]
fn test_invalid_names_are_rejected_before_the_store() {
    let store = MemoryStore::new();
    let mut board = Leaderboard::start(store.clone(), WAIT);

    let err = board.submit("   ", 100, 1, 0).unwrap_err();
    assert!(format!("{err:#}").contains("please enter a name"));
    assert!(board.submit(&"x".repeat(21), 100, 1, 0).is_err());
    assert!(board.recv_timeout(Duration::from_millis(100)).is_none());
    assert!(tokio_test::block_on(store.entries()).is_empty());
}

#[test]
fn test_store_failures_arrive_as_events() {
    let store = MemoryStore::new();
    let mut board = Leaderboard::start(store.clone(), WAIT);
    tokio_test::block_on(store.set_failure(Some("database offline")));

    board.submit("ada", 100, 1, 0).unwrap();
    match expect_event(&mut board) {
        LeaderboardEvent::SubmitFailed(msg) => assert!(msg.contains("database offline")),
        other => panic!("expected SubmitFailed, got {other:?}"),
    }

    board.refresh().unwrap();
    assert!(matches!(expect_event(&mut board), LeaderboardEvent::FetchFailed(_)));

    tokio_test::block_on(store.set_failure(None));
    assert!(fetched(&mut board).is_empty());
}

#[test]
fn test_unavailable_leaderboard_refuses_requests() {
    let mut board = Leaderboard::unavailable("not configured");
    assert!(!board.is_available());
    assert_eq!(
        board.status().to_string(),
        "leaderboard unavailable: not configured"
    );
    assert!(board.submit("ada", 1, 1, 0).is_err());
    assert!(board.refresh().is_err());
    assert!(board.try_recv().is_none());
    assert!(board.recv_timeout(Duration::from_millis(10)).is_none());
}

#[test]
fn test_start_from_config_reports_why_it_is_unavailable() {
    let board = Leaderboard::start_from_config(&LeaderboardConfig::from_lookup(|_| None));
    match board.status() {
        LeaderboardStatus::Unavailable(reason) => assert!(reason.contains("not configured")),
        other => panic!("expected Unavailable, got {other:?}"),
    }

    let rest_config = |url: &'static str| {
        LeaderboardConfig::from_lookup(move |name| match name {
            "TETRIS_LEADERBOARD_URL" => Some(url.to_string()),
            "TETRIS_LEADERBOARD_KEY" => Some("anon".to_string()),
            _ => None,
        })
    };
    let board = Leaderboard::start_from_config(&rest_config("ftp://example.supabase.co"));
    assert!(!board.is_available());
    assert!(board.status().to_string().contains("ftp"));

    // Hosted Supabase projects are https-only.
    let board = Leaderboard::start_from_config(&rest_config("https://example.supabase.co"));
    assert!(board.is_available());
    assert_eq!(
        board.status().to_string(),
        "leaderboard: rest https://example.supabase.co/rest/v1/scores"
    );

    let config = LeaderboardConfig {
        offline: true,
        ..LeaderboardConfig::default()
    };
    assert!(Leaderboard::start_from_config(&config).is_available());
}

static SCRATCH: AtomicU32 = AtomicU32::new(0);

fn scratch_file() -> std::path::PathBuf {
    let n = SCRATCH.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir()
        .join(format!("classic-tetris-it-{}-{n}", std::process::id()))
        .join("scores.json")
}

#[test]
fn test_file_store_survives_restart() {
    let path = scratch_file();

    let mut board = Leaderboard::start(FileStore::new(&path), WAIT);
    board.submit("ada", 300, 2, 11).unwrap();
    assert!(matches!(expect_event(&mut board), LeaderboardEvent::Submitted(_)));
    drop(board);

    let mut board = Leaderboard::start(FileStore::new(&path), WAIT);
    let top = fetched(&mut board);
    assert_eq!(top, vec![ScoreEntry::new("ada", 300, 2, 11)]);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

// Mock PostgREST server

#[derive(Debug, Clone)]
struct Recorded {
    head: String,
    body: String,
}

#[derive(Debug, Clone, Copy)]
enum Reply {
    Ok,
    Fail,
    /// 400 with the given body
    Reject(&'static str),
    Silent,
}

struct MockServer {
    _rt: Runtime,
    url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    fn start(reply: Reply, rows: &'static str) -> Self {
        let rt = Runtime::new().unwrap();
        let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = requests.clone();
        rt.spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let log = log.clone();
                tokio::spawn(async move {
                    let Some(req) = read_request(&mut sock).await else {
                        return;
                    };
                    let is_get = req.head.starts_with("GET ");
                    log.lock().unwrap().push(req);

                    let response = match reply {
                        Reply::Silent => {
                            tokio::time::sleep(Duration::from_secs(30)).await;
                            return;
                        }
                        Reply::Fail => http_response("500 Internal Server Error", "boom"),
                        Reply::Reject(body) => http_response("400 Bad Request", body),
                        Reply::Ok if is_get => http_response("200 OK", rows),
                        Reply::Ok => http_response("201 Created", ""),
                    };
                    let _ = sock.write_all(response.as_bytes()).await;
                    let _ = sock.shutdown().await;
                });
            }
        });

        Self {
            _rt: rt,
            url: format!("http://{addr}"),
            requests,
        }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
}

async fn read_request(sock: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = sock.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = sock.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(Recorded {
        head,
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct PostedRow {
    player_name: String,
    score: u32,
    level: u32,
    lines: u32,
}

#[test]
fn test_rest_store_submit_sends_one_row_with_auth_headers() {
    let server = MockServer::start(Reply::Ok, "[]");
    let store = RestStore::new(&server.url, "k3y", "scores").unwrap();
    let mut board = Leaderboard::start(store, WAIT);

    board.submit("ada", 1200, 3, 25).unwrap();
    assert!(matches!(expect_event(&mut board), LeaderboardEvent::Submitted(_)));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert!(req.head.starts_with("post /rest/v1/scores http/1.1"));
    assert!(req.head.contains("apikey: k3y"));
    assert!(req.head.contains("authorization: bearer k3y"));
    assert!(req.head.contains("content-type: application/json"));
    assert!(req.head.contains("prefer: return=minimal"));

    let rows: Vec<PostedRow> = serde_json::from_str(&req.body).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].player_name, "ada");
    assert_eq!((rows[0].score, rows[0].level, rows[0].lines), (1200, 3, 25));
}

#[test]
fn test_rest_store_fetch_orders_and_ignores_extra_columns() {
    let rows = r#"[
        {"id": 7, "player_name": "low", "score": 10, "level": 1, "lines": 0},
        {"id": 9, "player_name": "high", "score": 500, "level": 2, "lines": 14, "created_at": "2024-01-01T00:00:00Z"}
    ]"#;
    let server = MockServer::start(Reply::Ok, rows);
    let store = RestStore::new(&server.url, "k3y", "scores").unwrap();
    let mut board = Leaderboard::start(store, WAIT);

    let top = fetched(&mut board);
    assert_eq!(
        top,
        vec![
            ScoreEntry::new("high", 500, 2, 14),
            ScoreEntry::new("low", 10, 1, 0)
        ]
    );

    let head = &server.requests()[0].head;
    assert!(head.starts_with(
        "get /rest/v1/scores?select=player_name,score,level,lines&order=score.desc&limit=10 "
    ));
    assert!(head.contains("apikey: k3y"));
}

#[test]
fn test_rest_store_error_status_becomes_failure_event() {
    let server = MockServer::start(Reply::Fail, "[]");
    let store = RestStore::new(&server.url, "k3y", "scores").unwrap();
    let mut board = Leaderboard::start(store, WAIT);

    board.submit("ada", 1, 1, 0).unwrap();
    match expect_event(&mut board) {
        LeaderboardEvent::SubmitFailed(msg) => {
            assert!(msg.contains("500"), "{msg}");
            assert!(msg.contains("boom"), "{msg}");
        }
        other => panic!("expected SubmitFailed, got {other:?}"),
    }
}

#[test]
fn test_rest_store_times_out() {
    let server = MockServer::start(Reply::Silent, "[]");
    let store = RestStore::new(&server.url, "k3y", "scores").unwrap();
    let mut board = Leaderboard::start(store, Duration::from_millis(200));

    board.refresh().unwrap();
    match expect_event(&mut board) {
        LeaderboardEvent::FetchFailed(msg) => assert!(msg.contains("timed out"), "{msg}"),
        other => panic!("expected FetchFailed, got {other:?}"),
    }
}

#[test]
fn test_rest_store_unreachable_server() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let store = RestStore::new(&format!("http://{addr}"), "k3y", "scores").unwrap();
    assert_eq!(store.describe(), format!("rest http://{addr}/rest/v1/scores"));
    let mut board = Leaderboard::start(store, WAIT);

    board.refresh().unwrap();
    match expect_event(&mut board) {
        LeaderboardEvent::FetchFailed(msg) => assert!(msg.contains("unreachable"), "{msg}"),
        other => panic!("expected FetchFailed, got {other:?}"),
    }
}

#[test]
fn test_rest_store_error_body_is_scrubbed_of_control_chars() {
    let body = "{\"message\":\"\u{1b}]0;pwned\u{7}\u{1b}[2J<b>Failing row contains (evil)</b>\"}";
    let server = MockServer::start(Reply::Reject(body), "[]");
    let store = RestStore::new(&server.url, "k3y", "scores").unwrap();
    let mut board = Leaderboard::start(store, WAIT);

    board.refresh().unwrap();
    match expect_event(&mut board) {
        LeaderboardEvent::FetchFailed(msg) => {
            assert!(msg.contains("400"), "{msg}");
            assert!(msg.contains("Failing row contains (evil)"), "{msg}");
            assert!(!msg.chars().any(|c| c.is_control()), "{msg:?}");
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
}
