use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Default for Config {
    /// Built-in defaults only: no rc file, no environment.
    fn default() -> Self {
        Self {
            inner: default_map(),
            config_path: default_config_path(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    pub fn load_from(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let mut map = default_map();

        // Read .fastscriptrc if exists
        read_rc_file(&config_path, &mut map);

        // Overlay environment variables (take precedence); FASTSCRIPT_ names win over bare ones
        let mut prefixed = Vec::new();
        for (k, v) in env::vars() {
            match config_key(&k) {
                Some(key) if key.len() < k.len() => prefixed.push((key.to_string(), v)),
                Some(key) => {
                    map.insert(key.to_string(), v);
                }
                None => {}
            }
        }
        map.extend(prefixed);

        Self { inner: map, config_path }
    }

    /// Override a value, e.g. from a command-line flag.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn log_path(&self) -> PathBuf {
        self.get("LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| temp_dir().join("fastscript.log"))
    }

    pub fn log_level(&self) -> String {
        self.get("LOG_LEVEL").unwrap_or_else(|| "info".to_string())
    }

    /// Seconds before an evaluation is interrupted; `None` when disabled.
    pub fn eval_timeout_secs(&self) -> Option<u64> {
        self.get_u64("EVAL_TIMEOUT").filter(|secs| *secs > 0)
    }
}

fn read_rc_file(path: &Path, map: &mut HashMap<String, String>) {
    if !path.exists() {
        return;
    }
    if let Ok(file) = fs::File::open(path) {
        let reader = BufReader::new(file);
        for line in reader.lines().map_while(Result::ok) {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((k, v)) = line.split_once('=') {
                map.insert(k.trim().to_string(), v.trim().to_string());
            }
        }
    }
}

/// Map an environment variable name to the config key it sets, if any.
fn config_key(k: &str) -> Option<&str> {
    const KEYS: &[&str] = &[
        "LOG_PATH",
        "LOG_LEVEL",
        "MAX_OPERATIONS",
        "MAX_CALL_LEVELS",
        "MAX_EXPR_DEPTH",
        "EVAL_TIMEOUT",
    ];

    let key = k.strip_prefix("FASTSCRIPT_").unwrap_or(k);
    KEYS.contains(&key).then_some(key)
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("fastscript").join(".fastscriptrc")
}

fn temp_dir() -> PathBuf {
    env::temp_dir().join("fastscript")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    // Paths
    m.insert(
        "LOG_PATH".into(),
        temp_dir().join("fastscript.log").to_string_lossy().into_owned(),
    );

    // Numbers
    m.insert("MAX_OPERATIONS".into(), "1000000000".into());
    m.insert("MAX_CALL_LEVELS".into(), "64".into());
    m.insert("MAX_EXPR_DEPTH".into(), "64".into());
    m.insert("EVAL_TIMEOUT".into(), "0".into());

    // Strings
    m.insert("LOG_LEVEL".into(), "info".into());

    m
}
