use crate::error::{ApiError, StartupError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];

/// One of the two display feeds. Both share the playhead but have their own catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
  A,
  B,
}

impl Channel {
  pub const ALL: [Channel; 2] = [Channel::A, Channel::B];

  pub fn as_str(&self) -> &'static str {
    match self {
      Channel::A => "a",
      Channel::B => "b",
    }
  }

  pub fn title(&self) -> &'static str {
    match self {
      Channel::A => "Display A",
      Channel::B => "Display B",
    }
  }

  pub fn content_url(&self) -> String {
    format!("/content/{}", self.as_str())
  }

  pub fn static_prefix(&self) -> String {
    format!("/static/{}", self.as_str())
  }
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Channel {
  type Err = ApiError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "a" => Ok(Channel::A),
      "b" => Ok(Channel::B),
      _ => Err(ApiError::UnknownChannel(s.to_string())),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
  Image,
  Video,
}

impl MediaKind {
  /// Anything that is not a known video extension renders as an image.
  pub fn classify(name: &str) -> Self {
    match extension(name) {
      Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => MediaKind::Video,
      _ => MediaKind::Image,
    }
  }
}

fn extension(name: &str) -> Option<&str> {
  Path::new(name).extension().and_then(|e| e.to_str())
}

pub fn is_media(name: &str) -> bool {
  matches!(
    extension(name),
    Some(ext) if IMAGE_EXTENSIONS.contains(&ext) || VIDEO_EXTENSIONS.contains(&ext)
  )
}

/// Sorted media filenames for one channel. Never empty once built via [`Catalogs::load`].
#[derive(Debug, Clone)]
pub struct MediaCatalog {
  items: Vec<String>,
}

impl MediaCatalog {
  pub fn new(mut items: Vec<String>) -> Self {
    items.sort();
    Self { items }
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn items(&self) -> &[String] {
    &self.items
  }

  /// Item shown when the playhead is at `position`. Wraps around the catalog.
  /// Returns `None` only for an empty catalog.
  pub fn at(&self, position: u64) -> Option<&str> {
    if self.items.is_empty() {
      return None;
    }
    let idx = (position % self.items.len() as u64) as usize;
    Some(self.items[idx].as_str())
  }
}

/// Lists the media files directly inside `dir`, sorted by byte order.
pub fn load(dir: &Path) -> Result<Vec<String>, StartupError> {
  let unreadable = |source| StartupError::DirectoryUnreadable {
    path: dir.to_path_buf(),
    source,
  };

  let mut files = Vec::new();
  for entry in std::fs::read_dir(dir).map_err(unreadable)? {
    let entry = entry.map_err(unreadable)?;
    let file_type = entry.file_type().map_err(unreadable)?;
    if file_type.is_dir() {
      continue;
    }
    let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
      tracing::warn!(path = %entry.path().display(), "skipping non utf-8 filename");
      continue;
    };
    if !is_media(&name) {
      tracing::debug!(%name, "skipping non-media file");
      continue;
    }
    files.push(name);
  }
  files.sort();
  Ok(files)
}

#[derive(Debug, Clone)]
struct ChannelCatalog {
  dir: PathBuf,
  catalog: MediaCatalog,
}

/// Catalogs for both channels plus the directories they were read from.
#[derive(Debug, Clone)]
pub struct Catalogs {
  a: ChannelCatalog,
  b: ChannelCatalog,
}

impl Catalogs {
  pub fn load(dir_a: &Path, dir_b: &Path) -> Result<Self, StartupError> {
    let a = load_channel(Channel::A, dir_a)?;
    let b = load_channel(Channel::B, dir_b)?;
    Ok(Self { a, b })
  }

  pub fn get(&self, channel: Channel) -> &MediaCatalog {
    &self.entry(channel).catalog
  }

  pub fn dir(&self, channel: Channel) -> &Path {
    &self.entry(channel).dir
  }

  fn entry(&self, channel: Channel) -> &ChannelCatalog {
    match channel {
      Channel::A => &self.a,
      Channel::B => &self.b,
    }
  }
}

fn load_channel(channel: Channel, dir: &Path) -> Result<ChannelCatalog, StartupError> {
  let catalog = MediaCatalog::new(load(dir)?);
  if catalog.is_empty() {
    return Err(StartupError::EmptyCatalog {
      channel,
      path: dir.to_path_buf(),
    });
  }
  tracing::info!(%channel, dir = %dir.display(), items = catalog.len(), "loaded media catalog");
  Ok(ChannelCatalog {
    dir: dir.to_path_buf(),
    catalog,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"x").unwrap();
  }

  #[test]
  fn load_keeps_only_media_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["c.png", "a.mp4", "notes.txt", "b.JPG", "B.jpeg", "clip.ogg", "noext"] {
      touch(dir.path(), name);
    }
    fs::create_dir(dir.path().join("sub.png")).unwrap();

    let got = load(dir.path()).unwrap();
    assert_eq!(got, vec!["B.jpeg", "a.mp4", "c.png", "clip.ogg"]);
  }

  #[test]
  fn load_missing_dir_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, StartupError::DirectoryUnreadable { .. }));
  }

  #[test]
  fn catalogs_reject_empty_channel() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    touch(a.path(), "one.png");
    touch(b.path(), "readme.md");

    let err = Catalogs::load(a.path(), b.path()).unwrap_err();
    assert!(matches!(err, StartupError::EmptyCatalog { channel: Channel::B, .. }));
  }

  #[test]
  fn at_wraps_by_catalog_length() {
    let cat = MediaCatalog::new(vec!["b.mp4".into(), "a.jpg".into(), "c.png".into()]);
    assert_eq!(cat.at(0), Some("a.jpg"));
    assert_eq!(cat.at(1), Some("b.mp4"));
    assert_eq!(cat.at(2), Some("c.png"));
    assert_eq!(cat.at(3), Some("a.jpg"));
    assert_eq!(cat.at(1_000_001), Some("c.png"));

    let single = MediaCatalog::new(vec!["x.png".into()]);
    for n in [0, 1, 7, u64::MAX] {
      assert_eq!(single.at(n), Some("x.png"));
    }

    assert_eq!(MediaCatalog::new(Vec::new()).at(0), None);
  }

  #[test]
  fn classify_by_extension() {
    assert_eq!(MediaKind::classify("a.mp4"), MediaKind::Video);
    assert_eq!(MediaKind::classify("a.webm"), MediaKind::Video);
    assert_eq!(MediaKind::classify("a.ogg"), MediaKind::Video);
    assert_eq!(MediaKind::classify("a.jpeg"), MediaKind::Image);
    assert_eq!(MediaKind::classify("a.png"), MediaKind::Image);
  }

  #[test]
  fn channel_parses_case_insensitively() {
    assert_eq!("a".parse::<Channel>().unwrap(), Channel::A);
    assert_eq!("B".parse::<Channel>().unwrap(), Channel::B);
    assert!("c".parse::<Channel>().is_err());
  }
}
