use std::{ io, fmt };
use std::io::{ BufRead, BufReader };
use std::fs::File;
use std::path::{ Path, PathBuf };
use log::LevelFilter;

pub const CONFIG_ENV: &str = "ISH_CONFIG";
pub const LOG_ENV: &str = "ISH_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub prompt: String,
    pub startup_file: Option<PathBuf>,
    pub quit_window_secs: u32,
    pub log_level: LevelFilter,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt: "% ".to_string(),
            startup_file: std::env::var_os("HOME")
                .filter(|h| !h.is_empty())
                .map(|h| Path::new(&h).join(".ishrc")),
            quit_window_secs: 5,
            log_level: LevelFilter::Warn,
        }
    }

    /// Defaults, then the file named by `ISH_CONFIG`, then `ISH_LOG`.
    /// A broken config file is reported and the defaults are kept.
    pub fn load() -> Config {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load_from_file(&path).unwrap_or_else(|e| {
                eprintln!("ish: {}: {}", Path::new(&path).display(), e);
                Self::default_config()
            }),
            None => Self::default_config(),
        };
        if let Ok(level) = std::env::var(LOG_ENV) {
            match parse_level(&level) {
                Some(l) => config.log_level = l,
                None => eprintln!("ish: {}: unknown log level '{}'", LOG_ENV, level),
            }
        }
        config
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path).map_err(ConfigError::Io)?;
        let mut src = String::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(ConfigError::Io)?;
            src.push_str(&line);
            src.push('\n');
        }
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = ConfigLoader::default_config();

        for (lineno, line) in src.lines().enumerate() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(format!("Line {}: No '=' found: {}", lineno+1, line)));
            };

            // Values are taken verbatim so a prompt can keep trailing spaces.
            match key.trim() {
                "prompt" => config.prompt = value.to_string(),
                "startup_file" => {
                    config.startup_file = match value.trim() {
                        "" => None,
                        p => Some(PathBuf::from(p)),
                    };
                }
                "quit_window" => match value.trim().parse::<u32>() {
                    Ok(n) if n > 0 => config.quit_window_secs = n,
                    _ => return Err(ConfigError::Parse(format!("Line {}: Invalid number of seconds: {}", lineno+1, line))),
                },
                "log_level" => match parse_level(value.trim()) {
                    Some(level) => config.log_level = level,
                    None => return Err(ConfigError::Parse(format!("Line {}: Invalid log level: {}", lineno+1, line))),
                },
                k => return Err(ConfigError::Parse(format!("Line {}: Unknown key: {}", lineno+1, k))),
            }
        }

        Ok(config)
    }
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    s.parse::<LevelFilter>().ok()
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::default_config();
        assert_eq!(config.prompt, "% ");
        assert_eq!(config.quit_window_secs, 5);
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_load_from_str() {
        let src = "# comment\n\nprompt=ish> \nquit_window = 2\nlog_level=debug\nstartup_file=/tmp/rc\n";
        let config = ConfigLoader::load_from_str(src).unwrap();
        assert_eq!(config.prompt, "ish> ");
        assert_eq!(config.quit_window_secs, 2);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.startup_file, Some(PathBuf::from("/tmp/rc")));
    }

    #[test]
    fn test_empty_startup_file_disables_it() {
        let config = ConfigLoader::load_from_str("startup_file=\n").unwrap();
        assert_eq!(config.startup_file, None);
    }

    #[test]
    fn test_parse_errors() {
        for src in ["prompt", "quit_window=soon", "quit_window=0", "log_level=loud", "colour=blue"] {
            let err = ConfigLoader::load_from_str(src).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(ref m) if m.starts_with("Line 1")), "{}", src);
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quit_window=9").unwrap();
        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.quit_window_secs, 9);

        let missing = ConfigLoader::load_from_file("/nonexistent/ish.conf");
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
