use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers hold `env_lock()` so no other test touches the environment.
unsafe fn clear_docchat_env() {
    unsafe {
        std::env::remove_var("DOCCHAT_BASE_URL");
        std::env::remove_var("DOCCHAT_SESSION_TOKEN");
        std::env::remove_var("DOCCHAT_STORE_PATH");
        std::env::remove_var("DOCCHAT_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("DOCCHAT_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_defaults() {
    let _guard = env_lock();
    unsafe { clear_docchat_env() };

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        ClientTimeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );
}

#[test]
fn from_env_parses_overrides() {
    let _guard = env_lock();
    unsafe {
        clear_docchat_env();
        std::env::set_var("DOCCHAT_BASE_URL", "https://chat.example.test//");
        std::env::set_var("DOCCHAT_SESSION_TOKEN", "tok");
        std::env::set_var("DOCCHAT_STORE_PATH", "/tmp/docchat.json");
        std::env::set_var("DOCCHAT_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("DOCCHAT_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://chat.example.test");
    assert_eq!(cfg.session_token.as_deref(), Some("tok"));
    assert_eq!(cfg.store_path, Some(PathBuf::from("/tmp/docchat.json")));
    assert_eq!(cfg.timeouts, ClientTimeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_docchat_env() };
}

#[test]
fn from_env_blank_token_is_none() {
    let _guard = env_lock();
    unsafe {
        clear_docchat_env();
        std::env::set_var("DOCCHAT_SESSION_TOKEN", "   ");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert!(cfg.session_token.is_none());

    unsafe { clear_docchat_env() };
}

#[test]
fn from_env_bad_timeout_errors() {
    let _guard = env_lock();
    unsafe {
        clear_docchat_env();
        std::env::set_var("DOCCHAT_REQUEST_TIMEOUT_SECS", "soon");
    }

    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("DOCCHAT_REQUEST_TIMEOUT_SECS"));

    unsafe { clear_docchat_env() };
}

#[test]
fn from_env_zero_timeout_errors() {
    let _guard = env_lock();
    unsafe {
        clear_docchat_env();
        std::env::set_var("DOCCHAT_CONNECT_TIMEOUT_SECS", "0");
    }

    assert!(ClientConfig::from_env().is_err());

    unsafe { clear_docchat_env() };
}

#[test]
fn normalize_base_url_rejects_other_schemes() {
    assert!(normalize_base_url("ftp://host").is_err());
    assert!(normalize_base_url("host:3000").is_err());
    assert_eq!(normalize_base_url(" http://host:3000/ ").unwrap(), "http://host:3000");
}
