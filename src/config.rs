use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "twinslide")]
#[command(about = "Two displays, one click: a synchronized slideshow server", long_about = None)]
pub struct Config {
  /// Media directory for display A
  #[arg(long, env = "TWINSLIDE_DIR_A", default_value = "./data/a")]
  pub dir_a: PathBuf,

  /// Media directory for display B
  #[arg(long, env = "TWINSLIDE_DIR_B", default_value = "./data/b")]
  pub dir_b: PathBuf,

  /// HTTP listen address
  #[arg(long, env = "TWINSLIDE_LISTEN", default_value = "0.0.0.0:8080")]
  pub listen: SocketAddr,

  /// Pending notifications kept per stream client before new ones are dropped
  #[arg(
    long,
    env = "TWINSLIDE_QUEUE_CAPACITY",
    default_value_t = crate::events::DEFAULT_QUEUE_CAPACITY,
    value_parser = parse_capacity
  )]
  pub queue_capacity: usize,

  /// Seconds between SSE keep-alive comments
  #[arg(long, env = "TWINSLIDE_KEEP_ALIVE_SECS", default_value_t = 15)]
  pub keep_alive_secs: u64,

  /// Write JSON logs to a daily-rotated file in this directory instead of stdout
  #[arg(long, env = "TWINSLIDE_LOG_DIR")]
  pub log_dir: Option<PathBuf>,
}

fn parse_capacity(s: &str) -> Result<usize, String> {
  match s.parse::<usize>() {
    Ok(0) => Err("capacity must be at least 1".to_string()),
    Ok(n) => Ok(n),
    Err(e) => Err(e.to_string()),
  }
}

impl Config {
  pub fn keep_alive(&self) -> Duration {
    Duration::from_secs(self.keep_alive_secs.max(1))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let cfg = Config::try_parse_from(["twinslide"]).unwrap();
    assert_eq!(cfg.dir_a, PathBuf::from("./data/a"));
    assert_eq!(cfg.dir_b, PathBuf::from("./data/b"));
    assert_eq!(cfg.listen, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    assert_eq!(cfg.queue_capacity, 10);
    assert_eq!(cfg.keep_alive(), Duration::from_secs(15));
    assert!(cfg.log_dir.is_none());
  }

  #[test]
  fn flags_override_defaults() {
    let cfg = Config::try_parse_from([
      "twinslide",
      "--dir-a",
      "/media/left",
      "--listen",
      "127.0.0.1:9000",
      "--queue-capacity",
      "3",
    ])
    .unwrap();
    assert_eq!(cfg.dir_a, PathBuf::from("/media/left"));
    assert_eq!(cfg.listen.port(), 9000);
    assert_eq!(cfg.queue_capacity, 3);
  }

  #[test]
  fn zero_queue_capacity_is_rejected() {
    assert!(Config::try_parse_from(["twinslide", "--queue-capacity", "0"]).is_err());
  }
}
