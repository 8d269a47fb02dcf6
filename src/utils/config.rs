use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::fs;
use std::path::PathBuf;

pub struct Config {
    pub name: String,
    pub config_dir: PathBuf,
    pub theme: String,
    pub prompt: String,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub logger_stderr: bool,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/xsh")
        } else {
            env::temp_dir().join("xsh")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from(env!("CARGO_PKG_NAME")),
            theme: String::from("default"),
            prompt: String::from("$ "),
            history_file: config_dir.join(".xsh_history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("info"),
            logger_dir: config_dir.join("logs"),
            logger_stderr: false,
            config_dir,
        }
    }

    pub fn new() -> Self {
        // 优先加载环境变量文件
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();

        if let Ok(theme) = env::var("XSH_THEME") {
            config.theme = theme;
        }

        if let Ok(prompt) = env::var("XSH_PROMPT") {
            config.prompt = prompt;
        }

        if let Ok(editor) = env::var("XSH_EDITOR") {
            config.editor_mode = editor;
        }

        if let Ok(history) = env::var("XSH_HISTORY") {
            config.history_file = PathBuf::from(history);
        }

        if let Ok(level) = env::var("XSH_LOG_LEVEL") {
            config.logger_level = level;
        }

        if let Ok(dir) = env::var("XSH_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }

        if let Ok(flag) = env::var("XSH_LOG_STDERR") {
            config.logger_stderr =
                matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        // 目录建不出来也不致命：历史记录和日志文件会各自降级
        if let Some(parent) = config.history_file.parent() {
            fs::create_dir_all(parent).ok();
        }

        config
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}
