use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct TrendPoint {
    key: String,
    label: String,
    count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CostSummary {
    total_min: f64,
    total_max: f64,
    average_cost: f64,
    has_price_data: bool,
    dish_count: usize,
    detected_currency: Option<String>,
    total_dishes: usize,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FormattedCost {
    average_cost: String,
}

#[derive(Debug, Deserialize)]
struct CostResponse {
    summary: CostSummary,
    formatted: Option<FormattedCost>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn today_key() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn write_dataset() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("meal_report_http_{}_{}.json", std::process::id(), nanos));

    let dataset = json!({
        "metrics": {
            "signups": [{ "key": today_key(), "count": 4 }]
        },
        "meal_plan": [
            { "name": "pho", "meal_types": ["breakfast", "lunch"], "price_estimate": { "min": 40000, "max": 60000 } },
            { "name": "tea" }
        ]
    });
    std::fs::write(&path, serde_json::to_vec(&dataset).unwrap()).expect("write dataset");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_meal_report"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", write_dataset())
        .env("APP_DEFAULT_CURRENCY", "VND")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

#[tokio::test]
async fn http_trend_fills_missing_days() {
    let server = shared_server().await;
    let client = Client::new();

    let points: Vec<TrendPoint> = client
        .post(format!("{}/api/trend", server.base_url))
        .json(&json!({
            "buckets": [{ "key": "2024-01-10", "count": 5 }],
            "window_size": 3,
            "unit": "day",
            "reference_date": "2024-01-10"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
    let counts: Vec<_> = points.iter().map(|p| p.count).collect();
    assert_eq!(labels, ["08/01", "09/01", "10/01"]);
    assert_eq!(counts, [0, 0, 5]);
    assert_eq!(points[2].key, "2024-01-10");
}

#[tokio::test]
async fn http_trend_rejects_non_positive_window() {
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/trend", server.base_url))
        .json(&json!({ "buckets": [], "window_size": 0, "unit": "month" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("window_size"));
}

#[tokio::test]
async fn http_malformed_bodies_get_json_errors() {
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/trend", server.base_url))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let response = client
        .post(format!("{}/api/trend", server.base_url))
        .json(&json!({ "buckets": [], "window_size": 2.5 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let response = client
        .get(format!("{}/api/stats/signups?window=abc", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn http_trend_rejects_oversized_window() {
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/trend", server.base_url))
        .json(&json!({ "buckets": [], "window_size": 200_000_000, "unit": "day" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let health = client
        .get(format!("{}/api/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(health.status().is_success());
}

#[tokio::test]
async fn http_cost_summary_skips_unpriced_items() {
    let server = shared_server().await;
    let client = Client::new();

    let response: CostResponse = client
        .post(format!("{}/api/cost-summary", server.base_url))
        .json(&json!({
            "meals": [
                { "price_estimate": { "min": 10000, "max": 20000, "currency": "VND" } },
                { "price_estimate": { "min": 0, "max": 0 } }
            ]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let summary = response.summary;
    assert_eq!(summary.dish_count, 1);
    assert_eq!(summary.total_dishes, 2);
    assert_eq!(summary.total_min, 10000.0);
    assert_eq!(summary.total_max, 20000.0);
    assert_eq!(summary.average_cost, 15000.0);
    assert!(summary.has_price_data);
    assert_eq!(summary.detected_currency.as_deref(), Some("VND"));
    assert_eq!(response.formatted.unwrap().average_cost, "15,000 VND");
}

#[tokio::test]
async fn http_cost_summary_rejects_non_array() {
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/cost-summary", server.base_url))
        .json(&json!({ "meals": { "name": "pho" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_metric_trend_ends_today() {
    let server = shared_server().await;
    let client = Client::new();

    let points: Vec<TrendPoint> = client
        .get(format!("{}/api/stats/signups", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(points.len(), 7);
    let last = points.last().unwrap();
    assert_eq!(last.key, today_key());
    assert_eq!(last.count, 4);

    let monthly: Vec<TrendPoint> = client
        .get(format!("{}/api/stats/signups?unit=month&window=3", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(monthly.len(), 3);
    assert_eq!(monthly[2].count, 4);

    let missing = client
        .get(format!("{}/api/stats/unknown", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_meal_plan_cost_uses_default_currency() {
    let server = shared_server().await;
    let client = Client::new();

    let response: CostResponse = client
        .get(format!("{}/api/meal-plan/cost", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let summary = response.summary;
    assert_eq!(summary.total_dishes, 3);
    assert_eq!(summary.dish_count, 2);
    assert_eq!(summary.total_min, 80000.0);
    assert_eq!(summary.total_max, 120000.0);
    assert_eq!(summary.detected_currency, None);
    assert_eq!(summary.currency.as_deref(), Some("VND"));
}
