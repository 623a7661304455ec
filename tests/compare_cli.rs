use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use listentotaxman::api::client::HttpTaxClient;
use listentotaxman::api::{CheckArgs, run_check, run_compare};
use listentotaxman::core::Config;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const FAILING_INCOME: i64 = 666;
const ENDPOINT: &str = "/ws/tax/index.js.php";

#[derive(Default)]
struct Recorded {
    incomes: Vec<i64>,
    content_types: Vec<String>,
    bodies: Vec<Value>,
}

type Shared = Arc<Mutex<Recorded>>;

async fn calculate(State(recorded): State<Shared>, headers: HeaderMap, body: String) -> Response {
    let Ok(payload) = serde_json::from_str::<Value>(&body) else {
        return (StatusCode::BAD_REQUEST, "bad json").into_response();
    };
    let income = payload["grosswage"].as_i64().unwrap_or_default();
    {
        let mut recorded = recorded.lock().expect("lock");
        recorded.incomes.push(income);
        recorded.content_types.push(
            headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string(),
        );
        recorded.bodies.push(payload.clone());
    }

    if income == FAILING_INCOME {
        return (StatusCode::INTERNAL_SERVER_ERROR, "calculation engine down").into_response();
    }

    let gross = income as f64;
    Json(json!({
        "tax_year": payload["year"].as_str().and_then(|y| y.parse::<i32>().ok()).unwrap_or_default(),
        "tax_region": payload["taxregion"],
        "tax_code": "1257L",
        "gross_pay": gross,
        "taxable_pay": gross - 12_570.0,
        "tax_paid": gross * 0.2,
        "tax_due": { "0": { "rate": 0.2, "amount": gross * 0.2 } },
        "national_insurance": gross * 0.08,
        "net_pay": gross * 0.72,
        "employers_ni": gross * 0.138,
    }))
    .into_response()
}

async fn spawn_mock() -> (SocketAddr, Shared) {
    let recorded = Shared::default();
    let app = Router::new()
        .route(ENDPOINT, post(calculate))
        .with_state(recorded.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    (addr, recorded)
}

fn client(addr: SocketAddr) -> HttpTaxClient {
    HttpTaxClient::with_url(format!("http://{addr}{ENDPOINT}"))
}

fn clock() -> impl Fn() -> DateTime<Utc> {
    let now = Utc
        .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid instant");
    move || now
}

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| token.to_string()).collect()
}

#[tokio::test]
async fn compare_renders_table_for_each_option() {
    let (addr, recorded) = spawn_mock().await;
    let output = run_compare(
        &argv(&[
            "listentotaxman",
            "compare",
            "--option",
            "Current Job",
            "--income",
            "100000",
            "--pension",
            "3%",
            "--option",
            "New Offer",
            "--income",
            "120000",
            "--married",
        ]),
        &Config::default(),
        &client(addr),
        &clock(),
    )
    .await
    .expect("comparison succeeds");

    assert!(output.contains("Current Job"));
    assert!(output.contains("New Offer"));
    assert!(output.contains("£100,000.00"));
    assert!(output.contains("£86,400.00"));
    assert!(output.contains("Status"));

    let recorded = recorded.lock().expect("lock");
    assert_eq!(recorded.incomes, vec![100_000, 120_000]);
    assert!(
        recorded
            .content_types
            .iter()
            .all(|ct| ct == "application/x-www-form-urlencoded")
    );
    let first = &recorded.bodies[0];
    assert_eq!(first["response"], "json");
    assert_eq!(first["time"], "1");
    assert_eq!(first["year"], "2025");
    assert_eq!(first["taxregion"], "uk");
    assert_eq!(first["pension"], "3%");
    assert!(first.get("married").is_none());
    assert_eq!(recorded.bodies[1]["married"], "y");
}

#[tokio::test]
async fn remote_failure_names_option_and_stops() {
    let (addr, recorded) = spawn_mock().await;
    let err = run_compare(
        &argv(&[
            "listentotaxman",
            "compare",
            "--option",
            "A",
            "--income",
            "50000",
            "--option",
            "Broken",
            "--income",
            "666",
            "--option",
            "C",
            "--income",
            "70000",
        ]),
        &Config::default(),
        &client(addr),
        &clock(),
    )
    .await
    .expect_err("second option fails");

    assert_eq!(
        err.to_string(),
        "failed to calculate tax for option 'Broken': API returned status 500: calculation engine down"
    );
    assert_eq!(recorded.lock().expect("lock").incomes, vec![50_000, FAILING_INCOME]);
}

#[tokio::test]
async fn json_output_is_scaled_to_period() {
    let (addr, _) = spawn_mock().await;
    let output = run_compare(
        &argv(&[
            "listentotaxman",
            "compare",
            "--json",
            "--period",
            "monthly",
            "--option",
            "Low",
            "--income",
            "60000",
            "--option",
            "High",
            "--income",
            "120000",
            "--region",
            "scotland",
        ]),
        &Config::default(),
        &client(addr),
        &clock(),
    )
    .await
    .expect("comparison succeeds");

    let value: Value = serde_json::from_str(&output).expect("valid json");
    assert_eq!(value["period"], "monthly");
    assert_eq!(value["comparison"]["gross_pay"]["Low"], 5_000.0);
    assert_eq!(value["comparison"]["gross_pay"]["High"], 10_000.0);
    assert_eq!(value["comparison"]["basic_rate_tax"]["Low"], 1_000.0);
    assert_eq!(value["metadata"]["High"]["tax_region"], "scotland");
    assert_eq!(value["metadata"]["Low"]["tax_year"], 2025);
}

#[tokio::test]
async fn check_against_mock_service() {
    let (addr, recorded) = spawn_mock().await;
    let args = CheckArgs {
        income: Some("52000".to_string()),
        region: Some("england".to_string()),
        period: Some("weekly".to_string()),
        ..CheckArgs::default()
    };

    let output = run_check(&args, &Config::default(), &client(addr), &clock())
        .await
        .expect("check succeeds");

    assert!(output.contains("Tax Calculation for 2025 (uk) - Weekly"));
    assert!(output.contains("£1,000.00"));
    assert_eq!(recorded.lock().expect("lock").bodies[0]["taxregion"], "uk");
}
