use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::tempdir;

#[test]
fn extract_prints_text_file_contents() {
    let dir = tempdir().unwrap();
    let form = dir.path().join("invoice.txt");
    write(&form, "  Invoice INV-2024-55\nTotal: 120 EUR\n\n").unwrap();

    let mut cmd = Command::cargo_bin("form-agent").expect("Binary exists");
    cmd.current_dir(dir.path()).arg("extract").arg(&form);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("== invoice.txt ==\nInvoice INV-2024-55\nTotal: 120 EUR"));
}

#[test]
fn extract_reports_unsupported_type_and_fails() {
    let dir = tempdir().unwrap();
    let sheet = dir.path().join("budget.xlsx");
    write(&sheet, b"PK\x03\x04").unwrap();

    let mut cmd = Command::cargo_bin("form-agent").expect("Binary exists");
    cmd.current_dir(dir.path()).arg("extract").arg(&sheet);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type."));
}

#[test]
fn extract_writes_report() {
    let dir = tempdir().unwrap();
    let form = dir.path().join("memo.txt");
    let report = dir.path().join("report.json");
    write(&form, "Memo").unwrap();

    let mut cmd = Command::cargo_bin("form-agent").expect("Binary exists");
    cmd.current_dir(dir.path())
        .arg("--report")
        .arg(&report)
        .arg("extract")
        .arg(&form);
    cmd.assert().success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["forms_data"]["memo.txt"]["status"], "Processed");
    assert_eq!(json["forms_data"]["memo.txt"]["text_length"], 4);
    assert_eq!(json["holistic_analysis_result"], "No result generated.");
}

#[test]
fn ask_without_api_key_fails_at_initialisation() {
    let dir = tempdir().unwrap();
    let form = dir.path().join("invoice.txt");
    write(&form, "Client: John Doe").unwrap();

    let mut cmd = Command::cargo_bin("form-agent").expect("Binary exists");
    cmd.current_dir(dir.path())
        .env_remove("GEMINI_API_KEY")
        .arg("ask")
        .arg("--file")
        .arg(&form)
        .arg("--question")
        .arg("Who is the client?");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use form_agent::cli::{run, Cli, Commands};

    let cli = Cli {
        config: None,
        report: None,
        command: Commands::Extract {
            files: vec![std::path::PathBuf::from("dummy.txt")],
        },
    };

    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[test]
fn extract_continues_past_unreadable_file_and_still_writes_report() {
    let dir = tempdir().unwrap();
    let form = dir.path().join("memo.txt");
    let missing = dir.path().join("missing.txt");
    let report = dir.path().join("report.json");
    write(&form, "Memo").unwrap();

    let mut cmd = Command::cargo_bin("form-agent").expect("Binary exists");
    cmd.current_dir(dir.path())
        .arg("--report")
        .arg(&report)
        .arg("extract")
        .arg(&missing)
        .arg(&form);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("== memo.txt ==\nMemo"))
        .stderr(predicate::str::contains("== missing.txt =="));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["forms_data"]["memo.txt"]["status"], "Processed");
    assert!(json["forms_data"].get("missing.txt").is_none());
}

mod against_stub_endpoint {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use form_agent::cli::{run, Cli, Commands};
    use serial_test::serial;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    type Requests = Arc<Mutex<Vec<String>>>;

    fn reply_for(request: &str) -> &'static str {
        if request.contains("exactly five lines") {
            "Comparison 1: Form A is older"
        } else if request.contains("bullet points") {
            "Two forms from Finance."
        } else if request.contains("Extract exactly three key facts") {
            "1. fact one\n2. fact two\n3. fact three"
        } else {
            "John Doe"
        }
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&request).into_owned()
    }

    /// Answers every generateContent request until the test ends.
    async fn spawn_stub() -> (String, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/v1beta", listener.local_addr().unwrap());
        let requests: Requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                let body = serde_json::json!({
                    "candidates": [{"content": {"parts": [{"text": reply_for(&request)}]}}]
                })
                .to_string();
                seen.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (endpoint, requests)
    }

    fn write_config(dir: &Path, endpoint: &str) -> PathBuf {
        let path = dir.join("config.yaml");
        let yaml = format!(
            "llm:\n  endpoint: {endpoint}\n  model: gemini-test\n  timeout_secs: 5\n\
             analysis:\n  summary_max_length: 60\n  pacing:\n    kind: min_interval\n    interval_ms: 200\n"
        );
        std::fs::write(&path, yaml).unwrap();
        path
    }

    fn read_report(path: &Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn ask_answers_through_configured_endpoint() {
        std::env::set_var("GEMINI_API_KEY", "stub-key");
        let (endpoint, requests) = spawn_stub().await;
        let dir = tempdir().unwrap();
        let form = dir.path().join("invoice.txt");
        std::fs::write(&form, "Client: John Doe").unwrap();
        let report = dir.path().join("report.json");

        let cli = Cli {
            config: Some(write_config(dir.path(), &endpoint)),
            report: Some(report.clone()),
            command: Commands::Ask {
                file: form,
                questions: vec!["Who is the client?".to_string()],
            },
        };
        run(cli).await.expect("ask should succeed");

        let json = read_report(&report);
        assert_eq!(json["single_form_qa_result"]["answer"], "John Doe");
        assert_eq!(json["single_form_qa_result"]["form"], "invoice.txt");
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("POST /v1beta/models/gemini-test:generateContent"));
        assert!(requests[0].contains("Who is the client?"));
    }

    #[tokio::test]
    #[serial]
    async fn summarize_passes_configured_length_hint() {
        std::env::set_var("GEMINI_API_KEY", "stub-key");
        let (endpoint, requests) = spawn_stub().await;
        let dir = tempdir().unwrap();
        let form = dir.path().join("memo.txt");
        std::fs::write(&form, "Memo dated 2024-01-02 from Finance.").unwrap();
        let report = dir.path().join("report.json");

        let cli = Cli {
            config: Some(write_config(dir.path(), &endpoint)),
            report: Some(report.clone()),
            command: Commands::Summarize {
                file: form,
                max_length: None,
            },
        };
        run(cli).await.expect("summarize should succeed");

        let json = read_report(&report);
        assert_eq!(json["form_summary_result"]["summary"], "Two forms from Finance.");
        assert!(requests.lock().unwrap()[0].contains("at most 60 words"));
    }

    #[tokio::test]
    #[serial]
    async fn compare_paces_fact_calls_with_configured_min_interval() {
        std::env::set_var("GEMINI_API_KEY", "stub-key");
        let (endpoint, requests) = spawn_stub().await;
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "Form A dated 2024-01-15.").unwrap();
        std::fs::write(&b, "Form B dated 2024-03-20.").unwrap();
        let report = dir.path().join("report.json");

        let cli = Cli {
            config: Some(write_config(dir.path(), &endpoint)),
            report: Some(report.clone()),
            command: Commands::Compare {
                files: vec![a, b],
                prompt: "Which form is older?".to_string(),
            },
        };
        let start = Instant::now();
        run(cli).await.expect("compare should succeed");

        // One pause between the two fact calls.
        assert!(start.elapsed() >= Duration::from_millis(200));
        let json = read_report(&report);
        assert_eq!(
            json["holistic_analysis_result"]["final_synthesis"],
            "Comparison 1: Form A is older"
        );
        assert_eq!(requests.lock().unwrap().len(), 3);
    }
}
