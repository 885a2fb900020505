//! End-to-end tests: the probe driven against a local health server and
//! against mock deployments

use assert_cmd::prelude::*;
use pocker_health::{
    executor::ProbeExecutor, logging::Logger, HealthServer, ProbeConfig, ServerConfig, Target,
};
use predicates::prelude::*;
use std::net::SocketAddr;
use std::process::Command;
use tempfile::TempDir;
use tokio::sync::oneshot;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Local health server running until the returned sender fires
async fn start_health_server(region: &str) -> (SocketAddr, oneshot::Sender<()>) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        region: Some(region.to_string()),
        timing_headers: true,
        ..ServerConfig::default()
    };
    let (logger, _sink) = Logger::capturing("server");
    let server = HealthServer::bind(config, logger).await.unwrap();
    let addr = server.local_addr();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server.serve_with_shutdown(async {
        rx.await.ok();
    }));

    (addr, tx)
}

fn local_probe_config(addr: SocketAddr, vus: u32, iterations: u32) -> ProbeConfig {
    let url = format!("http://{}/api/health", addr);
    ProbeConfig {
        vus,
        iterations,
        timeout_seconds: 5,
        direct_url: Some(url.clone()),
        pocker_url: Some(url.clone()),
        pocker_cf_url: Some(url),
        enable_color: false,
        ..ProbeConfig::default()
    }
}

fn probe_cmd(urls: [&str; 3], vus: u32, iterations: u32) -> (Command, TempDir) {
    let dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("latency-probe").unwrap();
    cmd.current_dir(dir.path())
        .args(["--direct-url", urls[0]])
        .args(["--pocker-url", urls[1]])
        .args(["--pocker-cf-url", urls[2]])
        .args(["--vus", &vus.to_string()])
        .args(["--iterations", &iterations.to_string()])
        .args(["--timeout", "5"])
        .arg("--no-color");
    (cmd, dir)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_probe_library_against_health_server() {
    let (addr, shutdown) = start_health_server("sjc").await;
    let (logger, sink) = Logger::capturing("probe");

    let executor = ProbeExecutor::from_config(local_probe_config(addr, 3, 4), logger).unwrap();

    assert_eq!(executor.setup().await.as_deref(), Some("sjc"));
    assert!(sink.contains("Pocker Region: sjc"));

    let results = executor.run().await.unwrap();
    assert_eq!(results.iterations, 12);
    assert_eq!(results.failed_iterations, 0);

    for target in Target::ALL {
        assert_eq!(results.summary.count(target.duration_trend()), 12);
        if let Some(internal) = target.internal_trend() {
            assert_eq!(results.summary.count(internal), 12);
        }
    }

    shutdown.send(()).unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_probe_binary_prints_only_p95_report() {
    let (addr, shutdown) = start_health_server("sjc").await;
    let url = format!("http://{}/api/health", addr);

    let output = tokio::task::spawn_blocking(move || {
        let (mut cmd, _dir) = probe_cmd([&url, &url, &url], 2, 3);
        cmd.assert().success().get_output().stdout.clone()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("Pocker Region: sjc"));
    assert!(stdout.contains("P(95) Metrics:"));

    let report: Vec<&str> = stdout.lines().skip_while(|l| *l != "P(95) Metrics:").collect();
    assert_eq!(report.len(), 4);
    assert!(report[1].starts_with("- CF->DO(sfo): "));
    assert!(report[2].starts_with("- Fly(edge)->Fly(sjc)->DO(sfo): "));
    assert!(report[3].starts_with("- CF->Fly(edge)->Fly(sjc)->DO(sfo): "));
    assert!(report[1..].iter().all(|l| l.ends_with("ms")));
    assert!(!stdout.contains("avg="));

    shutdown.send(()).unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_probe_binary_default_summary() {
    let (addr, shutdown) = start_health_server("sjc").await;
    let url = format!("http://{}/api/health", addr);

    let output = tokio::task::spawn_blocking(move || {
        let (mut cmd, _dir) = probe_cmd([&url, &url, &url], 1, 2);
        cmd.arg("--default-summary")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("http_req_duration_pocker_cf_internal"));
    assert!(stdout.contains("count=2"));
    assert!(!stdout.contains("P(95) Metrics:"));

    shutdown.send(()).unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_direct_route_aborts_iterations_but_not_run() {
    let deployment = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/direct"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&deployment)
        .await;
    Mock::given(method("GET"))
        .and(path("/pocker"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Pockethost-Region", "ams")
                .insert_header("X-Pockethost-Request-Duration", "9"),
        )
        .mount(&deployment)
        .await;

    let base = deployment.uri();
    let output = tokio::task::spawn_blocking(move || {
        let direct = format!("{}/direct", base);
        let pocker = format!("{}/pocker", base);
        let (mut cmd, _dir) = probe_cmd([&direct, &pocker, &pocker], 2, 2);
        cmd.assert()
            .success()
            .stderr(predicate::str::contains("Direct request failed with status 500"))
            .get_output()
            .stdout
            .clone()
    })
    .await
    .unwrap();

    let stdout = String::from_utf8(output).unwrap();
    assert!(stdout.contains("Pocker Region: ams"));
    assert!(stdout.contains("- CF->DO(sfo): no data"));
    assert!(stdout.contains("- Fly(edge)->Fly(sjc)->DO(sfo): no data"));
    assert!(stdout.contains("- CF->Fly(edge)->Fly(sjc)->DO(sfo): no data"));
}
