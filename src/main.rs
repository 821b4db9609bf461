use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use stack_config_edit::{ConfigDocument, ConfigValue, YamlError, YamlResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Edit stack configuration files without disturbing their formatting
#[derive(Parser)]
#[command(name = "stack-config-edit")]
#[command(version)]
#[command(about = "Edit YAML stack configuration files in place", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value of a key
    Get {
        /// Configuration file
        file: PathBuf,
        /// Key to look up
        key: String,
        /// Dotted path of the mapping holding the key
        #[arg(long, default_value = "")]
        path: String,
    },
    /// Set a key, adding it if it is missing
    Set {
        /// Configuration file
        file: PathBuf,
        /// Key to set
        key: String,
        /// New value, or ciphertext with --secure
        value: String,
        /// Dotted path of the mapping holding the key
        #[arg(long, default_value = "")]
        path: String,
        /// Store the value as `secure: <value>`
        #[arg(long)]
        secure: bool,
        /// Column for a new key (default: that of its first sibling, or 1)
        #[arg(long)]
        column: Option<usize>,
    },
    /// Remove a key
    Rm {
        /// Configuration file
        file: PathBuf,
        /// Key to remove
        key: String,
        /// Dotted path of the mapping holding the key
        #[arg(long, default_value = "")]
        path: String,
    },
    /// List the keys of a mapping
    Keys {
        /// Configuration file
        file: PathBuf,
        /// Dotted path of the mapping
        #[arg(long, default_value = "")]
        path: String,
    },
    /// Check that a file is written back unchanged after parsing
    Check {
        /// Configuration file
        file: PathBuf,
    },
}

/// Read a config file. A missing file is `None`, not an error.
fn read_config(path: &Path) -> YamlResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(YamlError::Io(err)),
    }
}

fn load(path: &Path) -> Result<ConfigDocument> {
    let bytes = read_config(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if bytes.is_none() {
        debug!(path = %path.display(), "config file does not exist");
    }
    ConfigDocument::parse(bytes.as_deref())
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Writes data to a file atomically: a temp file next to it is renamed over it.
fn write_file_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, data).context("Failed to write temp file")?;
    fs::rename(&temp_path, path).context("Failed to rename temp file")?;
    Ok(())
}

fn save(path: &Path, doc: &ConfigDocument) -> Result<()> {
    if doc.is_empty() {
        warn!(path = %path.display(), "no config file, nothing written");
        return Ok(());
    }
    write_file_atomic(path, &doc.serialize())
        .with_context(|| format!("Failed to save {}", path.display()))
}

fn run(command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Get { file, key, path } => {
            let doc = load(&file)?;
            match doc.get(&path, &key)? {
                Some(value) => writeln!(out, "{}", value)?,
                None => return Err(YamlError::KeyNotFound(key).into()),
            }
        }
        Command::Set {
            file,
            key,
            value,
            path,
            secure,
            column,
        } => {
            let mut doc = load(&file)?;
            let value = if secure {
                ConfigValue::secure(value)
            } else {
                ConfigValue::plain(value)
            };
            let column = match column {
                Some(column) => column,
                None => doc.entry_column(&path)?.unwrap_or(1),
            };
            doc.set(&path, &key, &value, column)?;
            save(&file, &doc)?;
        }
        Command::Rm { file, key, path } => {
            let mut doc = load(&file)?;
            doc.delete(&path, &key)?;
            save(&file, &doc)?;
        }
        Command::Keys { file, path } => {
            let doc = load(&file)?;
            for key in doc.keys(&path)? {
                writeln!(out, "{}", key)?;
            }
        }
        Command::Check { file } => {
            let Some(bytes) =
                read_config(&file).with_context(|| format!("Failed to read {}", file.display()))?
            else {
                bail!("{} does not exist", file.display());
            };
            let doc = ConfigDocument::parse(Some(bytes.as_slice()))
                .with_context(|| format!("Failed to load {}", file.display()))?;
            if doc.serialize() != bytes {
                bail!("{} does not round-trip unchanged", file.display());
            }
            writeln!(out, "{}: ok", file.display())?;
        }
    }
    Ok(())
}

/// Log filter from `RUST_LOG` directives, `warn` when unset or invalid.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    run(cli.command, &mut stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing::level_filters::LevelFilter;

    fn config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("Pulumi.dev.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    fn run_to_string(command: Command) -> Result<String> {
        let mut out = Vec::new();
        run(command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_log_filter_follows_rust_log() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("stack_config_edit=trace")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_cli_parses_set() {
        let cli = Cli::try_parse_from([
            "stack-config-edit",
            "set",
            "Pulumi.dev.yaml",
            "token",
            "AAAB==",
            "--path",
            "config",
            "--secure",
        ])
        .unwrap();
        match cli.command {
            Command::Set {
                key,
                path,
                secure,
                column,
                ..
            } => {
                assert_eq!(key, "token");
                assert_eq!(path, "config");
                assert!(secure);
                assert_eq!(column, None);
            }
            _ => panic!("expected set"),
        }
    }

    #[test]
    fn test_set_secure_uses_sibling_column() {
        let dir = TempDir::new().unwrap();
        let file = config_file(&dir, "config:\n  region: us-east-1 # default\n");
        run_to_string(Command::Set {
            file: file.clone(),
            key: "token".to_string(),
            value: "AAAB==".to_string(),
            path: "config".to_string(),
            secure: true,
            column: None,
        })
        .unwrap();
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "config:\n  region: us-east-1 # default\n  token:\n    secure: AAAB==\n"
        );
        assert!(!file.with_extension("tmp").exists());
    }

    #[test]
    fn test_set_on_missing_file_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Pulumi.prod.yaml");
        run_to_string(Command::Set {
            file: file.clone(),
            key: "a".to_string(),
            value: "b".to_string(),
            path: String::new(),
            secure: false,
            column: Some(1),
        })
        .unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_get_prints_both_shapes() {
        let dir = TempDir::new().unwrap();
        let file = config_file(&dir, "a: 1\nb:\n  secure: XYZ\n");
        let get = |key: &str| Command::Get {
            file: file.clone(),
            key: key.to_string(),
            path: String::new(),
        };
        assert_eq!(run_to_string(get("a")).unwrap(), "1\n");
        assert_eq!(run_to_string(get("b")).unwrap(), "secure: XYZ\n");
        let err = run_to_string(get("c")).unwrap_err();
        assert_eq!(err.to_string(), "config key not found: \"c\"");
    }

    #[test]
    fn test_rm_and_keys() {
        let dir = TempDir::new().unwrap();
        let file = config_file(&dir, "# stack\na: 1\nb: 2\nc: 3\n");
        run_to_string(Command::Rm {
            file: file.clone(),
            key: "b".to_string(),
            path: String::new(),
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "# stack\na: 1\nc: 3\n");
        let keys = run_to_string(Command::Keys {
            file,
            path: String::new(),
        })
        .unwrap();
        assert_eq!(keys, "a\nc\n");
    }

    #[test]
    fn test_check() {
        let dir = TempDir::new().unwrap();
        let file = config_file(&dir, "config:\r\n  a: 'x' # c\r\n\r\n  b: {y: 1}\r\n");
        let out = run_to_string(Command::Check { file: file.clone() }).unwrap();
        assert_eq!(out, format!("{}: ok\n", file.display()));

        let broken = config_file(&dir, "a: [1, 2\n");
        let err = run_to_string(Command::Check { file: broken }).unwrap_err();
        assert!(format!("{:#}", err).contains("unclosed flow sequence"));
    }

    #[test]
    fn test_keys_on_scalar_path_fails() {
        let dir = TempDir::new().unwrap();
        let file = config_file(&dir, "db: localhost\n");
        let err = run_to_string(Command::Keys {
            file,
            path: "db".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "config key \"db\" is a scalar, not a mapping");
    }
}
