use parking_lot::Mutex;
use proxy_validator::{BackoffPolicy, Pipeline, PipelineError, ValidationError, ValidatorConfig};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn echo(origin: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(r#"{{"origin":"{}"}}"#, origin))
}

async fn server_answering(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn config(echo_server: &MockServer, output: &Path, concurrency: usize) -> ValidatorConfig {
    ValidatorConfig::builder()
        .echo_url(format!("{}/ip", echo_server.uri()))
        .request_timeout(Duration::from_secs(5))
        .concurrency(concurrency)
        .output_path(output)
        .backoff(BackoffPolicy {
            initial_interval: Duration::from_millis(10),
            multiplier: 1.5,
            randomization_factor: 0.0,
            max_interval: Duration::from_millis(50),
            max_elapsed_time: Duration::from_secs(5),
        })
        .build()
}

fn output_set(path: &Path) -> HashSet<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

struct Scenario {
    echo_server: MockServer,
    // Held so the mock proxies stay up for the duration of the test.
    _proxies: Vec<MockServer>,
    passing: Vec<String>,
    input: PathBuf,
    dir: tempfile::TempDir,
}

/// Caller IP 203.0.113.7; P1 and P3 pass, P2 leaks the caller IP, P4 reports garbage.
async fn scenario() -> Scenario {
    let echo_server = server_answering(echo("203.0.113.7")).await;

    let p1 = server_answering(echo("198.51.100.4")).await;
    let p2 = server_answering(echo("198.51.100.4, 203.0.113.7")).await;
    let p3 = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&p3)
        .await;
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(echo("198.51.100.9"))
        .mount(&p3)
        .await;
    let p4 = server_answering(echo("not-an-ip")).await;

    let [a1, a2, a3, a4] = [&p1, &p2, &p3, &p4].map(|s| s.address().to_string());
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("candidates.txt");
    std::fs::write(
        &input,
        format!("{a1}\n\n{a2}\r\n{a3}\n   \nnot a proxy\n{a4}\n{a1}\n"),
    )
    .unwrap();

    Scenario {
        echo_server,
        passing: vec![a1, a3],
        _proxies: vec![p1, p2, p3, p4],
        input,
        dir,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn writes_only_passing_proxies() {
    let scenario = scenario().await;
    let output = scenario.dir.path().join("proxies.txt");
    let pipeline = Pipeline::new(config(&scenario.echo_server, &output, 100));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let summary = pipeline
        .run(&scenario.input, move |candidate, outcome| {
            sink.lock().push((candidate.to_string(), format!("{:?}", outcome)));
        })
        .await
        .unwrap();

    assert_eq!(summary.caller_ip, "203.0.113.7");
    assert_eq!(summary.tested, 6);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.output, output);

    let expected: HashSet<String> = scenario.passing.iter().cloned().collect();
    assert_eq!(output_set(&output), expected);
    assert!(std::fs::read_to_string(&output).unwrap().ends_with('\n'));

    let seen = seen.lock();
    assert_eq!(seen.len(), 6);
    assert!(seen
        .iter()
        .any(|(c, o)| c == "not a proxy" && o.contains("InvalidAddress")));
    assert!(seen.iter().any(|(_, o)| o.contains("NotAnonymous")));
    assert!(seen.iter().any(|(_, o)| o.contains("InvalidReportedIp")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reruns_and_concurrency_levels_agree() {
    let scenario = scenario().await;
    let mut outputs = Vec::new();

    for (round, concurrency) in [100, 1, 3].into_iter().enumerate() {
        let output = scenario.dir.path().join(format!("proxies-{}.txt", round));
        let pipeline = Pipeline::new(config(&scenario.echo_server, &output, concurrency));
        pipeline.run(&scenario.input, |_, _| {}).await.unwrap();
        outputs.push(output_set(&output));
    }

    assert_eq!(outputs[0].len(), 2);
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[1], outputs[2]);
}

#[tokio::test]
async fn empty_input_writes_empty_file() {
    let echo_server = server_answering(echo("203.0.113.7")).await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.txt");
    std::fs::write(&input, "\n  \n").unwrap();
    let output = dir.path().join("proxies.txt");

    let summary = Pipeline::new(config(&echo_server, &output, 10))
        .run(&input, |_, _| {})
        .await
        .unwrap();

    assert_eq!(summary.tested, 0);
    assert_eq!(summary.written, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}

#[tokio::test]
async fn missing_input_is_fatal() {
    let echo_server = server_answering(echo("203.0.113.7")).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("proxies.txt");

    let err = Pipeline::new(config(&echo_server, &output, 10))
        .run(&dir.path().join("missing.txt"), |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Input { .. }), "{:?}", err);
    assert!(!output.exists());
}

#[tokio::test]
async fn unresolvable_caller_ip_is_fatal() {
    let echo_server = server_answering(ResponseTemplate::new(200).set_body_string("{}")).await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("candidates.txt");
    std::fs::write(&input, "198.51.100.4:8080\n").unwrap();
    let output = dir.path().join("proxies.txt");

    let err = Pipeline::new(config(&echo_server, &output, 10))
        .run(&input, |_, _| {})
        .await
        .unwrap_err();

    assert!(
        matches!(err, PipelineError::CallerIp(ValidationError::MalformedResponse(_))),
        "{:?}",
        err
    );
    assert!(!output.exists());
}

#[tokio::test]
async fn invalid_config_is_fatal() {
    let echo_server = server_answering(echo("203.0.113.7")).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("proxies.txt");

    let err = Pipeline::new(config(&echo_server, &output, 0))
        .run(&dir.path().join("candidates.txt"), |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Config(_)), "{:?}", err);
}

#[tokio::test]
async fn unwritable_output_is_fatal() {
    let echo_server = server_answering(echo("203.0.113.7")).await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("candidates.txt");
    std::fs::write(&input, "").unwrap();
    let output = dir.path().join("no-such-dir").join("proxies.txt");

    let err = Pipeline::new(config(&echo_server, &output, 10))
        .run(&input, |_, _| {})
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Output { .. }), "{:?}", err);
    assert!(!output.exists());
}

#[tokio::test]
async fn undecodable_line_is_rejected_without_aborting_run() {
    let echo_server = server_answering(echo("203.0.113.7")).await;
    let proxy = server_answering(echo("198.51.100.4")).await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("candidates.txt");
    let mut content = format!("{}\n", proxy.address()).into_bytes();
    content.extend_from_slice(b"bad\xff\xfehost:8080\n");
    std::fs::write(&input, content).unwrap();
    let output = dir.path().join("proxies.txt");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let summary = Pipeline::new(config(&echo_server, &output, 10))
        .run(&input, move |candidate, outcome| {
            sink.lock().push((candidate.to_string(), format!("{:?}", outcome)));
        })
        .await
        .unwrap();

    assert_eq!(summary.tested, 2);
    assert_eq!(summary.written, 1);
    assert_eq!(
        output_set(&output),
        HashSet::from([proxy.address().to_string()])
    );
    let seen = seen.lock();
    assert!(seen
        .iter()
        .any(|(c, o)| c.starts_with("bad") && o.contains("InvalidAddress")));
}
