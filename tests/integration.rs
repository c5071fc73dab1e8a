//! Integration tests for cx_wrapper.
//!
//! A small POSIX shell script stands in for the cx executable. It records the
//! argv it was given (one argument per line) and prints canned output. Scripts
//! may keep state between invocations under `$state`.

#![cfg(unix)]

use cx_wrapper::{
    BflNode, CxConfig, CxError, CxWrapper, ExecError, OutputError, ParamKind, ParameterSet,
    Payload, ResultKind, ResultNode, BFL_NOT_FOUND,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// A fake cx executable living in its own temp directory.
struct FakeCli {
    dir: TempDir,
    results_dir: TempDir,
}

impl FakeCli {
    /// Write a fake executable whose behaviour after recording argv is `body`.
    fn new(body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let results_dir = TempDir::new().unwrap();
        let script = format!(
            "#!/bin/sh\nstate=\"{}\"\nprintf '%s\\n' \"$@\" > \"$state/argv.txt\"\n{}\n",
            dir.path().display(),
            body
        );
        let path = dir.path().join("cx");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, results_dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.path().join("cx")
    }

    fn wrapper(&self) -> CxWrapper {
        let config = CxConfig::builder()
            .client_credentials("my-client", "my-secret")
            .base_uri("https://ast.example.com")
            .executable(self.path())
            .build()
            .expect("valid config");
        CxWrapper::new(config).with_temp_dir(self.results_dir.path())
    }

    /// Argv of the last invocation.
    fn argv(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("argv.txt"))
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn results_dir(&self) -> &Path {
        self.results_dir.path()
    }
}

const AUTH: [&str; 6] = [
    "--client-id",
    "my-client",
    "--client-secret",
    "my-secret",
    "--base-uri",
    "https://ast.example.com",
];

fn expected(head: &[&str], tail: &[&str]) -> Vec<String> {
    head.iter()
        .chain(AUTH.iter())
        .chain(tail.iter())
        .map(|s| s.to_string())
        .collect()
}

/// Script fragment that writes `content` to `<output-path>/<output-name>.<ext>`.
fn write_result_file(content: &str) -> String {
    format!(
        r#"while [ $# -gt 0 ]; do
  case "$1" in
    --output-name) name="$2"; shift ;;
    --output-path) out="$2"; shift ;;
    --report-format) fmt="$2"; shift ;;
  esac
  shift
done
if [ "$fmt" = json ]; then ext=json; else ext=html; fi
printf '%s' '{}' > "$out/$name.$ext""#,
        content
    )
}

fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

#[tokio::test]
async fn test_auth_validate_returns_text() {
    let cli = FakeCli::new("echo 'Successfully authenticated to AST server!'");
    let output = cli.wrapper().auth_validate().await.unwrap();

    assert!(output.is_success());
    assert_eq!(
        output.text(),
        Some("Successfully authenticated to AST server!\n")
    );
    assert_eq!(cli.argv(), expected(&["auth", "validate"], &[]));
}

#[tokio::test]
async fn test_scan_create_argv_and_decode() {
    let cli = FakeCli::new(r#"printf '{"ID":"s-1","Status":"Queued"}'"#);
    let params = ParameterSet::new()
        .with(ParamKind::ProjectName, "wrapper-test")
        .with(ParamKind::ScanTypes, "sast")
        .with(ParamKind::Branch, "")
        .with(ParamKind::AdditionalParameters, r#"--nowait --tags "a b""#)
        .with(ParamKind::Source, ".");

    let output = cli.wrapper().scan_create(&params).await.unwrap();

    let scans = output.scans().unwrap();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0].status, "Queued");
    assert_eq!(
        cli.argv(),
        expected(
            &["scan", "create"],
            &[
                "--scan-info-format",
                "json",
                "--project-name",
                "wrapper-test",
                "--scan-types",
                "sast",
                "--nowait",
                "--tags",
                "a b",
                "-s",
                ".",
            ]
        )
    );
}

#[tokio::test]
async fn test_scan_show_polling_reports_external_status() {
    let cli = FakeCli::new(
        r#"n=$(cat "$state/count" 2>/dev/null || echo 0)
n=$((n+1))
echo $n > "$state/count"
case $n in 1) s=Queued ;; 2) s=Running ;; *) s=Completed ;; esac
printf '[{"ID":"42","Status":"%s"}]' "$s""#,
    );
    let cx = cli.wrapper();

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let output = cx.scan_show("42").await.unwrap();
        statuses.push(output.scans().unwrap()[0].status.clone());
    }

    assert_eq!(statuses, vec!["Queued", "Running", "Completed"]);
    assert_eq!(
        cli.argv(),
        expected(&["scan", "show", "--scan-id", "42"], &["--format", "json"])
    );
}

#[tokio::test]
async fn test_process_failure_is_output_not_error() {
    let cli = FakeCli::new("echo 'Error: scan not found' 1>&2; exit 1");
    let output = cli.wrapper().scan_show("missing").await.unwrap();

    assert!(!output.is_success());
    assert_eq!(output.exit_code, 1);
    assert_eq!(output.kind, Some(ResultKind::Scan));
    assert!(output.diagnostic().unwrap().contains("scan not found"));
}

#[tokio::test]
async fn test_unparsable_output_is_decode_error() {
    let cli = FakeCli::new("echo 'not json at all'");
    let result = cli.wrapper().project_show("p-1").await;

    match result {
        Err(CxError::Output(OutputError::Decode { kind, raw, .. })) => {
            assert_eq!(kind, ResultKind::Project);
            assert!(raw.contains("not json at all"));
        }
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scan_cancel_and_project_show() {
    let cli = FakeCli::new(
        r#"case "$1" in
  scan) printf '{"ID":"s-9","Status":"Canceled"}' ;;
  project) printf '{"ID":"p-1","Name":"web","Groups":null,"Tags":{"team":"a"}}' ;;
esac"#,
    );
    let cx = cli.wrapper();

    let output = cx.scan_cancel("s-9").await.unwrap();
    assert_eq!(output.scans().unwrap()[0].status, "Canceled");
    assert_eq!(cli.argv(), expected(&["scan", "cancel", "--scan-id", "s-9"], &[]));

    let output = cx.project_show("p-1").await.unwrap();
    let project = &output.projects().unwrap()[0];
    assert_eq!(project.name, "web");
    assert!(project.groups.is_empty());
    assert_eq!(project.tags.get("team").map(String::as_str), Some("a"));
    assert_eq!(
        cli.argv(),
        expected(&["project", "show", "--project-id", "p-1"], &["--format", "json"])
    );
}

#[tokio::test]
async fn test_list_filters() {
    let cli = FakeCli::new("echo '[]'");
    let cx = cli.wrapper();

    let output = cx.scan_list("statuses=Completed").await.unwrap();
    assert_eq!(output.scans(), Some(&[][..]));
    assert_eq!(
        cli.argv(),
        expected(
            &["scan", "list", "--filter", "statuses=Completed"],
            &["--format", "json"]
        )
    );

    cx.project_list("").await.unwrap();
    assert_eq!(
        cli.argv(),
        expected(&["project", "list"], &["--format", "json"])
    );
}

#[tokio::test]
async fn test_project_branches_name_filter() {
    let cli = FakeCli::new("echo '[\"main\"]'");
    let output = cli.wrapper().project_branches("p-1", "main").await.unwrap();

    assert_eq!(output.kind, None);
    assert_eq!(output.text(), Some("[\"main\"]\n"));
    assert_eq!(
        cli.argv(),
        expected(
            &[
                "project",
                "branches",
                "--project-id",
                "p-1",
                "--filter",
                "branch-name=main"
            ],
            &[]
        )
    );
}

#[tokio::test]
async fn test_triage_show_and_update() {
    let cli = FakeCli::new(
        r#"printf '[{"ID":"t1","SimilarityID":-77,"State":"NOT_EXPLOITABLE","Severity":"LOW"}]'"#,
    );
    let cx = cli.wrapper();

    let output = cx.triage_show("p-1", "-77", "sast").await.unwrap();
    match output.payload() {
        Some(Payload::Predicates(predicates)) => {
            assert_eq!(predicates[0].similarity_id, "-77");
            assert_eq!(predicates[0].state, "NOT_EXPLOITABLE");
        }
        other => panic!("unexpected payload {:?}", other),
    }

    cx.triage_update("p-1", "-77", "sast", "CONFIRMED", "real issue", "HIGH")
        .await
        .unwrap();
    assert_eq!(
        cli.argv(),
        expected(
            &[
                "triage",
                "update",
                "--project-id",
                "p-1",
                "--similarity-id",
                "-77",
                "--scan-type",
                "sast",
                "--state",
                "CONFIRMED",
                "--comment",
                "real issue",
                "--severity",
                "HIGH",
            ],
            &[]
        )
    );
}

#[tokio::test]
async fn test_results_list_reads_and_removes_file() {
    let doc = r#"{"results":[{"type":"sast","id":"r1","severity":"HIGH","data":{"queryId":7,"nodes":[{"line":3,"name":"x"}]}}],"totalCount":1,"scanID":"s-1"}"#;
    let cli = FakeCli::new(&write_result_file(doc));

    let output = cli.wrapper().results_list("s-1").await.unwrap();

    match output.payload() {
        Some(Payload::Results(results)) => {
            assert_eq!(results.total_count, 1);
            assert_eq!(results.results[0].data.query_id, "7");
            assert_eq!(results.results[0].data.nodes[0].line, 3);
        }
        other => panic!("unexpected payload {:?}", other),
    }
    assert!(dir_is_empty(cli.results_dir()));

    let argv = cli.argv();
    assert_eq!(&argv[..6], &["result", "show", "--scan-id", "s-1", "--report-format", "json"]);
    assert_eq!(argv[6], "--output-name");
    assert_eq!(argv[8], "--output-path");
    assert_eq!(Path::new(&argv[9]), cli.results_dir());
}

#[tokio::test]
async fn test_results_summary_html() {
    let cli = FakeCli::new(&write_result_file("<html><body>summary</body></html>"));
    let output = cli.wrapper().results_summary("s-1").await.unwrap();

    assert_eq!(output.text(), Some("<html><body>summary</body></html>"));
    assert!(cli.argv().contains(&"summaryHTML".to_string()));
    assert!(dir_is_empty(cli.results_dir()));
}

#[tokio::test]
async fn test_results_list_missing_file() {
    let cli = FakeCli::new("exit 0");
    let result = cli.wrapper().results_list("s-1").await;

    assert!(matches!(
        result,
        Err(CxError::Output(OutputError::MissingResultFile { .. }))
    ));
    assert!(dir_is_empty(cli.results_dir()));
}

#[tokio::test]
async fn test_results_show_leaves_report_in_place() {
    let cli = FakeCli::new(&write_result_file("{}"));
    let out_dir = TempDir::new().unwrap();

    let output = cli
        .wrapper()
        .results_show("s-1", "json", "report", &out_dir.path().display().to_string())
        .await
        .unwrap();

    assert!(output.is_success());
    assert!(out_dir.path().join("report.json").exists());
}

#[tokio::test]
async fn test_results_bfl_index() {
    let cli = FakeCli::new(
        r#"printf '[{"line":20,"column":2,"length":5,"name":"query","method":"run","domType":"MethodInvokeExpr","fileName":"/app.js","fullName":"db.query","methodLine":18,"nodeID":5}]'"#,
    );
    let node = |line: u64, name: &str, full_name: &str| ResultNode {
        line,
        column: 2,
        length: 5,
        name: name.to_string(),
        method: "run".to_string(),
        dom_type: "MethodInvokeExpr".to_string(),
        file_name: "/app.js".to_string(),
        full_name: full_name.to_string(),
        method_line: 18,
        ..ResultNode::default()
    };
    let cx = cli.wrapper();

    let hit = vec![node(10, "req", "req"), node(20, "query", "db.query")];
    let output = cx.results_bfl("s-1", "q-9", &hit).await.unwrap();
    assert_eq!(output.bfl_index(), Some(1));
    match output.payload() {
        Some(Payload::BestFixLocation { nodes, .. }) => assert_eq!(nodes.len(), 1),
        other => panic!("unexpected payload {:?}", other),
    }
    assert_eq!(
        cli.argv(),
        expected(
            &["result", "bfl", "--scan-id", "s-1", "--query-id", "q-9"],
            &["--format", "json"]
        )
    );

    let miss = vec![node(10, "req", "req")];
    let output = cx.results_bfl("s-1", "q-9", &miss).await.unwrap();
    assert_eq!(output.bfl_index(), Some(BFL_NOT_FOUND));

    let authoritative: Vec<BflNode> = Vec::new();
    let output = cx.results_bfl("s-1", "q-9", &authoritative).await.unwrap();
    assert_eq!(output.bfl_index(), Some(BFL_NOT_FOUND));
}

#[tokio::test]
async fn test_kics_realtime_argv() {
    let cli = FakeCli::new(r#"printf '{"results":[],"count":0}'"#);
    let cx = cli.wrapper();

    let output = cx
        .kics_realtime_scan("/work/Dockerfile", "", "-v --exclude-queries x")
        .await
        .unwrap();
    assert!(matches!(output.payload(), Some(Payload::KicsRealtime(_))));
    assert_eq!(
        cli.argv(),
        expected(
            &[
                "scan",
                "kics-realtime",
                "--file-sources",
                "/work/Dockerfile",
                "--additional-params",
                "-v --exclude-queries x",
            ],
            &[]
        )
    );

    cx.kics_realtime_scan("/work/Dockerfile", "podman", "")
        .await
        .unwrap();
    assert!(cli
        .argv()
        .windows(2)
        .any(|w| w[0] == "--engine" && w[1] == "podman"));
}

#[tokio::test]
async fn test_code_bashing_and_learn_more() {
    let cli = FakeCli::new(
        r#"case "$2" in
  codebashing) printf '[{"cwe_id":"79","language":"PHP","query_name":"Reflected XSS","path":"https://example.com/lesson"}]' ;;
  learn-more) printf '[{"queryId":"11","queryName":"SQL_Injection","risk":"high","samples":[{"progLanguage":"Java","code":"x","title":"t"}]}]' ;;
esac"#,
    );
    let cx = cli.wrapper();

    let output = cx.code_bashing_list("79", "PHP", "Reflected XSS").await.unwrap();
    match output.payload() {
        Some(Payload::CodeBashing(links)) => assert_eq!(links[0].path, "https://example.com/lesson"),
        other => panic!("unexpected payload {:?}", other),
    }
    assert_eq!(
        cli.argv(),
        expected(
            &[
                "result",
                "codebashing",
                "--language",
                "PHP",
                "--vulnerability-type",
                "Reflected XSS",
                "--cwe-id",
                "79"
            ],
            &["--format", "json"]
        )
    );

    let output = cx.learn_more("11").await.unwrap();
    match output.payload() {
        Some(Payload::LearnMore(descriptions)) => {
            assert_eq!(descriptions[0].query_name, "SQL_Injection");
            assert_eq!(descriptions[0].samples[0].prog_language, "Java");
        }
        other => panic!("unexpected payload {:?}", other),
    }
    assert_eq!(
        cli.argv(),
        expected(&["utils", "learn-more", "--query-id", "11"], &["--format", "json"])
    );
}

#[tokio::test]
async fn test_configured_timeout_kills_process() {
    let cli = FakeCli::new("sleep 10");
    let config = CxConfig::builder()
        .executable(cli.path())
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let result = CxWrapper::new(config).auth_validate().await;
    assert!(matches!(result, Err(CxError::Exec(ExecError::Timeout { .. }))));
}

#[tokio::test]
async fn test_caller_cancellation_kills_process() {
    let cli = FakeCli::new(r#"sleep 0.5; touch "$state/marker""#);
    let cx = cli.wrapper();

    let result = tokio::time::timeout(Duration::from_millis(100), cx.auth_validate()).await;
    assert!(result.is_err(), "call should still be running when cancelled");

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert!(
        !cli.dir.path().join("marker").exists(),
        "cancelled process kept running"
    );
}

#[tokio::test]
async fn test_cancelled_results_call_removes_file() {
    let body = format!("{}\nsleep 10", write_result_file(r#"{"results":[]}"#));
    let cli = FakeCli::new(&body);
    let cx = cli.wrapper();

    let written = {
        let call = cx.results_list("s-1");
        tokio::pin!(call);
        let mut written = false;
        for _ in 0..100 {
            tokio::select! {
                result = &mut call => panic!("call finished before cancellation: {:?}", result),
                _ = tokio::time::sleep(Duration::from_millis(20)) => {}
            }
            if !dir_is_empty(cli.results_dir()) {
                written = true;
                break;
            }
        }
        written
    };

    assert!(written, "fake cli never wrote its result file");
    assert!(dir_is_empty(cli.results_dir()));
}

#[tokio::test]
async fn test_concurrent_calls_share_config() {
    let cli = FakeCli::new(r#"printf '[{"ID":"%s","Status":"Completed"}]' "$4""#);
    let cx = cli.wrapper();
    let other = cx.clone();

    let (a, b) = tokio::join!(cx.scan_show("a"), other.scan_show("b"));

    assert_eq!(a.unwrap().scans().unwrap()[0].id, "a");
    assert_eq!(b.unwrap().scans().unwrap()[0].id, "b");
}
