//! Background probes - one-shot availability checks off the event thread

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use thiserror::Error;

pub type ProbeId = u32;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("probe worker panicked")]
    Panicked,
}

/// Probe status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Running,
    Available,
    Unavailable,
    Failed(String),
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Running => write!(f, "Running"),
            ProbeStatus::Available => write!(f, "Available"),
            ProbeStatus::Unavailable => write!(f, "Unavailable"),
            ProbeStatus::Failed(msg) => write!(f, "Failed: {}", msg),
        }
    }
}

/// Status plus the order in which the worker finished.
type Cell = Arc<Mutex<(ProbeStatus, u64)>>;

struct Probe {
    target: String,
    cell: Cell,
    started: Instant,
    handle: Option<JoinHandle<()>>,
}

/// Runs probes on worker threads; the owner polls [`check_completed`](Self::check_completed).
pub struct ProbeManager {
    probes: HashMap<ProbeId, Probe>,
    next_id: ProbeId,
    finished: Arc<AtomicU64>,
}

impl ProbeManager {
    pub fn new() -> Self {
        Self { probes: HashMap::new(), next_id: 1, finished: Arc::new(AtomicU64::new(0)) }
    }

    /// Spawn a probe for `target`. `f` answers whether the target is available.
    pub fn spawn<F>(&mut self, target: &str, f: F) -> ProbeId
    where
        F: FnOnce() -> Result<bool, ProbeError> + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let cell: Cell = Arc::new(Mutex::new((ProbeStatus::Running, 0)));
        let cell_clone = cell.clone();
        let finished = self.finished.clone();

        let handle = thread::spawn(move || {
            let status = match panic::catch_unwind(AssertUnwindSafe(f)) {
                Ok(Ok(true)) => ProbeStatus::Available,
                Ok(Ok(false)) => ProbeStatus::Unavailable,
                Ok(Err(e)) => ProbeStatus::Failed(e.to_string()),
                Err(_) => ProbeStatus::Failed(ProbeError::Panicked.to_string()),
            };
            let seq = finished.fetch_add(1, Ordering::SeqCst) + 1;
            *cell_clone.lock().unwrap_or_else(|p| p.into_inner()) = (status, seq);
        });

        tracing::debug!(id, link = %target, "probe started");
        self.probes.insert(id, Probe { target: target.to_string(), cell, started: Instant::now(), handle: Some(handle) });
        id
    }

    /// Get probe status
    pub fn status(&self, id: ProbeId) -> Option<ProbeStatus> {
        self.probes.get(&id).map(|p| p.cell.lock().unwrap_or_else(|e| e.into_inner()).0.clone())
    }

    /// Probes still running.
    pub fn pending(&self) -> usize {
        self.probes
            .values()
            .filter(|p| matches!(p.cell.lock().unwrap_or_else(|e| e.into_inner()).0, ProbeStatus::Running))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Block until a probe finishes.
    pub fn wait(&mut self, id: ProbeId) -> Option<ProbeStatus> {
        let probe = self.probes.get_mut(&id)?;
        if let Some(handle) = probe.handle.take() {
            handle.join().ok();
        }
        Some(probe.cell.lock().unwrap_or_else(|e| e.into_inner()).0.clone())
    }

    /// Block until every probe finishes.
    pub fn wait_all(&mut self) {
        for probe in self.probes.values_mut() {
            if let Some(handle) = probe.handle.take() {
                handle.join().ok();
            }
        }
    }

    /// Finished probes in completion order. Each is reported once.
    pub fn check_completed(&mut self) -> Vec<(ProbeId, String, ProbeStatus)> {
        let mut completed = Vec::new();

        for (&id, probe) in &self.probes {
            let (status, seq) = probe.cell.lock().unwrap_or_else(|e| e.into_inner()).clone();
            if status != ProbeStatus::Running {
                completed.push((seq, id, probe.target.clone(), status));
            }
        }
        completed.sort_by_key(|(seq, ..)| *seq);

        for (_, id, _, status) in &completed {
            if let Some(probe) = self.probes.remove(id) {
                tracing::debug!(id, %status, elapsed = ?probe.started.elapsed(), "probe finished");
            }
        }

        completed.into_iter().map(|(_, id, target, status)| (id, target, status)).collect()
    }
}

impl Default for ProbeManager {
    fn default() -> Self {
        Self::new()
    }
}

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REDIRECTS: usize = 10;

/// Whether `target` can be fetched.
///
/// `http(s)` links get a `HEAD` that follows redirects; only a 2xx answer
/// counts. Anything else is a file path (a `file://` prefix is allowed).
/// Blocks, so call it from a probe thread.
pub fn probe_link(target: &str) -> Result<bool, ProbeError> {
    if target.starts_with("http://") || target.starts_with("https://") {
        let client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        return probe_url(&client, target);
    }
    let path = target.strip_prefix("file://").unwrap_or(target);
    Ok(Path::new(path).is_file())
}

fn probe_url(client: &Client, url: &str) -> Result<bool, ProbeError> {
    let status = client.head(url).send()?.status();
    tracing::debug!(link = %url, %status, "link checked");
    Ok(status.is_success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_results_are_reported_once() {
        let mut probes = ProbeManager::new();
        let yes = probes.spawn("yes", || Ok(true));
        let no = probes.spawn("no", || Ok(false));
        probes.wait_all();
        assert_eq!(probes.pending(), 0);

        let mut done = probes.check_completed();
        done.sort_by_key(|(id, ..)| *id);
        assert_eq!(done[0], (yes, "yes".to_string(), ProbeStatus::Available));
        assert_eq!(done[1], (no, "no".to_string(), ProbeStatus::Unavailable));
        assert!(probes.check_completed().is_empty());
        assert!(probes.is_empty());
    }

    #[test]
    fn test_errors_and_panics_become_failures() {
        let mut probes = ProbeManager::new();
        let err = probes.spawn("err", || Err(ProbeError::Panicked));
        let boom = probes.spawn("boom", || panic!("probe exploded"));
        assert!(matches!(probes.wait(err), Some(ProbeStatus::Failed(_))));
        assert!(matches!(probes.wait(boom), Some(ProbeStatus::Failed(_))));
    }

    #[test]
    fn test_completion_order() {
        let mut probes = ProbeManager::new();
        let slow = probes.spawn("slow", || {
            thread::sleep(Duration::from_millis(100));
            Ok(true)
        });
        let fast = probes.spawn("fast", || Ok(true));
        probes.wait_all();
        let ids: Vec<ProbeId> = probes.check_completed().into_iter().map(|(id, ..)| id).collect();
        assert_eq!(ids, vec![fast, slow]);
    }

    /// Serve one canned HTTP response on a local port.
    fn serve_once(status_line: &'static str) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let reply = format!("HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
                let _ = stream.write_all(reply.as_bytes());
            }
        });
        format!("http://{}/resume.pdf", addr)
    }

    fn local_client() -> Client {
        Client::builder().no_proxy().timeout(PROBE_TIMEOUT).build().unwrap()
    }

    #[test]
    fn test_probe_url_http_status() {
        let client = local_client();
        assert!(probe_url(&client, &serve_once("200 OK")).unwrap());
        assert!(!probe_url(&client, &serve_once("404 Not Found")).unwrap());
    }

    #[test]
    fn test_probe_url_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let err = probe_url(&local_client(), &format!("http://127.0.0.1:{}/resume.pdf", port)).unwrap_err();
        assert!(matches!(err, ProbeError::Http(_)));
        assert!(err.to_string().starts_with("request failed"));
    }

    #[test]
    fn test_probe_link_files() {
        let path = std::env::temp_dir().join(format!("webterm-probe-{}.pdf", std::process::id()));
        std::fs::write(&path, b"%PDF").unwrap();
        let plain = path.to_string_lossy().to_string();
        assert!(probe_link(&plain).unwrap());
        assert!(probe_link(&format!("file://{}", plain)).unwrap());
        std::fs::remove_file(&path).unwrap();
        assert!(!probe_link(&plain).unwrap());
    }
}
