// ABOUTME: Tests the bollard client against a scripted engine on a unix socket.
// ABOUTME: Covers name lookups that resolve to other containers and exec output capture.

mod support;

use dockhand::lifecycle::{Controller, Presence, StopOutcome};
use dockhand::runtime::{BollardRuntime, RuntimeInfo, RuntimeType};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use support::name;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

const TEST_DEADLINE: Duration = Duration::from_secs(10);

/// What the engine answers for one request.
enum Reply {
    Json(u16, String),
    /// Hijack the connection and write multiplexed exec output frames.
    Attach {
        frames: Vec<(u8, &'static [u8])>,
        hold_open: bool,
    },
}

fn json(status: u16, body: &str) -> Reply {
    Reply::Json(status, body.to_string())
}

fn not_found() -> Reply {
    json(404, r#"{"message":"no such container"}"#)
}

type Routes = Arc<dyn Fn(&str, &str) -> Reply + Send + Sync>;

/// A fake engine socket that answers from a routing function and records
/// every request as `METHOD /path`.
struct StubEngine {
    socket: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
    _dir: tempfile::TempDir,
}

impl StubEngine {
    fn spawn(routes: impl Fn(&str, &str) -> Reply + Send + Sync + 'static) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("engine.sock");
        let listener = UnixListener::bind(&socket).unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes: Routes = Arc::new(routes);

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, routes, seen).await;
                });
            }
        });

        Self {
            socket,
            requests,
            _dir: dir,
        }
    }

    fn connect(&self, runtime_type: RuntimeType) -> BollardRuntime {
        BollardRuntime::connect(&RuntimeInfo {
            runtime_type,
            socket_path: self.socket.to_string_lossy().into_owned(),
        })
        .unwrap()
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

async fn serve(
    stream: UnixStream,
    routes: Routes,
    seen: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    loop {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await? == 0 {
            return Ok(());
        }
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts
            .next()
            .unwrap_or_default()
            .split('?')
            .next()
            .unwrap_or_default()
            .to_string();

        let mut content_length = 0;
        let mut chunked = false;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await?;
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_ascii_lowercase();
                let value = value.trim();
                if key == "content-length" {
                    content_length = value.parse().unwrap_or(0);
                } else if key == "transfer-encoding" && value.eq_ignore_ascii_case("chunked") {
                    chunked = true;
                }
            }
        }
        if chunked {
            skip_chunked_body(&mut reader).await?;
        } else {
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).await?;
        }

        seen.lock().push(format!("{method} {path}"));

        let stream = reader.get_mut();
        match routes(&method, &path) {
            Reply::Json(status, body) => {
                let head = format!(
                    "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
                    body.len()
                );
                stream.write_all(head.as_bytes()).await?;
                stream.write_all(body.as_bytes()).await?;
            }
            Reply::Attach { frames, hold_open } => {
                stream
                    .write_all(
                        b"HTTP/1.1 101 UPGRADED\r\nContent-Type: application/vnd.docker.raw-stream\r\nConnection: Upgrade\r\nUpgrade: tcp\r\n\r\n",
                    )
                    .await?;
                for (kind, payload) in frames {
                    let mut frame = vec![kind, 0, 0, 0];
                    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
                    frame.extend_from_slice(payload);
                    stream.write_all(&frame).await?;
                }
                stream.flush().await?;
                if hold_open {
                    std::future::pending::<()>().await;
                }
                return Ok(());
            }
        }
    }
}

async fn skip_chunked_body(reader: &mut BufReader<UnixStream>) -> std::io::Result<()> {
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).await?;
        let size = usize::from_str_radix(size_line.trim(), 16).unwrap_or(0);
        let mut chunk = vec![0; size + 2];
        reader.read_exact(&mut chunk).await?;
        if size == 0 {
            return Ok(());
        }
    }
}

mod name_lookup {
    use super::*;

    /// The engine resolves `cafe` as an id prefix of an unrelated container.
    fn prefix_resolving_engine() -> StubEngine {
        StubEngine::spawn(|method, path| match (method, path) {
            ("GET", p) if p.ends_with("/containers/cafe/json") => json(
                200,
                r#"{"Id":"cafe0123456789abcdef","Name":"/unrelated-db","Config":{"Image":"postgres:16"},"State":{"Status":"running","Running":true}}"#,
            ),
            _ => not_found(),
        })
    }

    #[tokio::test]
    async fn stop_leaves_a_container_matched_by_id_prefix_alone() {
        support::init_tracing();
        let engine = prefix_resolving_engine();
        let runtime = engine.connect(RuntimeType::Docker);
        let controller = Controller::new(&runtime);

        let outcome = tokio::time::timeout(TEST_DEADLINE, controller.stop(&name("cafe")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome, StopOutcome::Absent);
        let requests = engine.requests();
        assert!(
            requests
                .iter()
                .all(|r| r.starts_with("GET ") && !r.ends_with("/stop")),
            "unexpected engine mutations: {requests:?}"
        );
    }

    #[tokio::test]
    async fn status_reports_absent_for_a_name_nobody_holds() {
        let engine = prefix_resolving_engine();
        let runtime = engine.connect(RuntimeType::Docker);

        let status = tokio::time::timeout(
            TEST_DEADLINE,
            Controller::new(&runtime).status(&name("cafe")),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(status.state, Presence::Absent);
        assert_eq!(status.image, None);
    }
}

mod exec_capture {
    use super::*;

    fn exec_engine(hold_open: bool, exit_code: i64) -> StubEngine {
        StubEngine::spawn(move |method, path| match (method, path) {
            ("GET", p) if p.ends_with("/containers/pipelines/json") => json(
                200,
                r#"{"Id":"0123abcd","Name":"/pipelines","Config":{"Image":"example/img:main"},"State":{"Status":"running","Running":true}}"#,
            ),
            ("POST", p) if p.ends_with("/containers/pipelines/exec") => {
                json(201, r#"{"Id":"e1"}"#)
            }
            ("POST", p) if p.ends_with("/exec/e1/start") => Reply::Attach {
                frames: vec![(1, &b"hello\n"[..]), (2, &b"warning: noisy\n"[..])],
                hold_open,
            },
            ("GET", p) if p.ends_with("/exec/e1/json") => json(
                200,
                &format!(r#"{{"ID":"e1","Running":false,"ExitCode":{exit_code}}}"#),
            ),
            _ => not_found(),
        })
    }

    fn echo() -> Vec<String> {
        vec!["echo".to_string(), "hello".to_string()]
    }

    #[tokio::test]
    async fn podman_output_is_captured_when_the_stream_stays_open() {
        support::init_tracing();
        let engine = exec_engine(true, 0);
        let runtime = engine.connect(RuntimeType::Podman);
        let controller = Controller::new(&runtime);

        let container = name("pipelines");
        let command = echo();
        let exec = controller.exec(&container, &command);
        let result = tokio::time::timeout(TEST_DEADLINE, exec)
            .await
            .expect("exec should finish once the process has exited")
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(String::from_utf8_lossy(&result.stdout), "hello\n");
        assert_eq!(String::from_utf8_lossy(&result.stderr), "warning: noisy\n");
        assert!(
            engine
                .requests()
                .iter()
                .any(|r| r.ends_with("/exec/e1/start"))
        );
    }

    #[tokio::test]
    async fn docker_output_and_exit_code_are_captured() {
        let engine = exec_engine(false, 3);
        let runtime = engine.connect(RuntimeType::Docker);
        let controller = Controller::new(&runtime);

        let container = name("pipelines");
        let command = echo();
        let exec = controller.exec(&container, &command);
        let result = tokio::time::timeout(TEST_DEADLINE, exec)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.exit_code, 3);
        assert_eq!(String::from_utf8_lossy(&result.stdout), "hello\n");
    }
}
