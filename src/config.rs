use std::path::PathBuf;

/// Runtime configuration, resolved once at startup and passed down
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_language: String,
    pub max_file_size: usize,
    /// Tesseract executable; a bare name is looked up on PATH
    pub tesseract_cmd: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9292,
            default_language: "eng".to_string(),
            max_file_size: 50 * 1024 * 1024,
            tesseract_cmd: PathBuf::from("tesseract"),
        }
    }
}
