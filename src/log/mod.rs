use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

/// Stderr subscriber; `RUST_LOG` wins over the `--debug` default.
pub fn init_tracing(debug: bool) {
    let default = if debug { "mvp_planner=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".mvp").join("tx").join(tx.to_string())
}

/// Write through a temp file in the same directory so a crash never leaves
/// a half-written artifact behind.
fn write_atomic(path: &Path, data: &str) -> anyhow::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data.as_bytes())?;
    tmp.persist(path)?;
    Ok(())
}

pub fn save_stage<Req: Serialize, Resp: Serialize>(
    stage: &str,
    req: &Req,
    resp: Option<&Resp>,
    tx: Uuid,
    root: &Path,
    save_request: bool,
    save_response: bool,
) -> anyhow::Result<SavedPaths> {
    let dir = tx_dir(root, tx);
    fs::create_dir_all(&dir)?;

    let mut request_path = None;
    let mut response_path = None;

    if save_request {
        let p = dir.join(format!("{stage}.request.json"));
        write_atomic(&p, &to_string_pretty(req)?)?;
        request_path = Some(p);
    }

    if let (true, Some(resp)) = (save_response, resp) {
        let p = dir.join(format!("{stage}.response.json"));
        write_atomic(&p, &to_string_pretty(resp)?)?;
        response_path = Some(p);
    }

    Ok(SavedPaths { dir, request: request_path, response: response_path })
}

pub fn print_saved_paths(stage: &str, saved: &SavedPaths) {
    tracing::debug!(stage, dir = %saved.dir.display(), "artifacts directory");
    match &saved.request {
        Some(p) => tracing::debug!(stage, path = %p.display(), "request saved"),
        None => tracing::debug!(stage, "request not saved"),
    }
    match &saved.response {
        Some(p) => tracing::debug!(stage, path = %p.display(), "response saved"),
        None => tracing::debug!(stage, "response not saved"),
    }
}

pub fn print_json_debug<Req: Serialize, Resp: Serialize>(
    stage: &str,
    req: &Req,
    resp: Option<&Resp>,
) -> anyhow::Result<()> {
    eprintln!("\n===== DEBUG [{stage}]: REQUEST JSON =====\n{}\n", to_string_pretty(req)?);
    if let Some(resp) = resp {
        eprintln!("===== DEBUG [{stage}]: RESPONSE JSON =====\n{}\n", to_string_pretty(resp)?);
    }
    std::io::stderr().flush().ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn saves_request_and_response_under_tx_dir() {
        let root = tempfile::tempdir().unwrap();
        let tx = Uuid::new_v4();
        let saved = save_stage("plan", &json!({"a": 1}), Some(&json!({"b": 2})), tx, root.path(), true, true)
            .unwrap();

        assert_eq!(saved.dir, root.path().join(".mvp/tx").join(tx.to_string()));
        let req = fs::read_to_string(saved.request.unwrap()).unwrap();
        let resp = fs::read_to_string(saved.response.unwrap()).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&req).unwrap(), json!({"a": 1}));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&resp).unwrap(), json!({"b": 2}));
    }

    #[test]
    fn flags_and_missing_response_skip_files() {
        let root = tempfile::tempdir().unwrap();
        let tx = Uuid::new_v4();
        let saved = save_stage::<_, serde_json::Value>("plan", &json!({}), None, tx, root.path(), false, true)
            .unwrap();
        assert!(saved.request.is_none());
        assert!(saved.response.is_none());
        assert!(saved.dir.is_dir());
        assert_eq!(fs::read_dir(&saved.dir).unwrap().count(), 0);
    }
}
