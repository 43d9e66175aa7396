//! HTML for the display pages and the swappable media fragment.
//!
//! The page is driven by htmx: it opens the event stream, reloads the media
//! container on every `mediaChanged` event and posts `/advance` on click.

use crate::catalog::{Channel, MediaCatalog, MediaKind};
use crate::events::EVENT_MEDIA_CHANGED;

pub const EVENTS_STREAM_PATH: &str = "/events-stream";
pub const ADVANCE_PATH: &str = "/advance";

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";

/// What a channel should show for a given playhead position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFragment {
  pub channel: Channel,
  pub index: usize,
  pub file_name: String,
  pub media_src: String,
  pub kind: MediaKind,
}

impl ContentFragment {
  /// `None` only when the catalog is empty, which startup rules out.
  pub fn select(channel: Channel, catalog: &MediaCatalog, position: u64) -> Option<Self> {
    let file_name = catalog.at(position)?;
    Some(Self {
      channel,
      index: (position % catalog.len() as u64) as usize,
      media_src: format!("{}/{}", channel.static_prefix(), urlencoding::encode(file_name)),
      kind: MediaKind::classify(file_name),
      file_name: file_name.to_string(),
    })
  }

  pub fn is_video(&self) -> bool {
    self.kind == MediaKind::Video
  }

  pub fn to_html(&self) -> String {
    // media_src is percent-encoded, so it is safe inside a quoted attribute.
    match self.kind {
      MediaKind::Video => format!(
        r#"<video autoplay muted loop style="width:100%; height:100%; object-fit:contain;" src="{}"></video>"#,
        self.media_src
      ),
      MediaKind::Image => format!(
        r#"<img style="width:100%; height:100%; object-fit:contain;" src="{}" alt="media">"#,
        self.media_src
      ),
    }
  }
}

pub fn full_page(channel: Channel) -> String {
  format!(
    r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>{title}</title>
  <script src="{htmx}"></script>
  <style>
    html, body {{ margin: 0; padding: 0; height: 100%; background: black; }}
    #click-overlay {{
      position: fixed;
      top: 0;
      left: 0;
      width: 100%;
      height: 100%;
      z-index: 999;
      cursor: pointer;
    }}
  </style>
</head>
<body hx-sse="connect:{stream}">
  <div id="media-container" hx-get="{content}" hx-trigger="load, sse:{event}" hx-swap="innerHTML">
    Loading...
  </div>
  <div id="click-overlay" hx-post="{advance}" hx-trigger="click" hx-swap="none"></div>
  <script>
    document.addEventListener("keydown", function(e) {{
      if (e.key === "f" || e.key === "F") {{
        if (!document.fullscreenElement) {{
          document.documentElement.requestFullscreen().catch(err => {{
            console.error("Error enabling full-screen mode:", err);
          }});
        }} else {{
          document.exitFullscreen();
        }}
      }}
    }});
  </script>
</body>
</html>
"#,
    title = channel.title(),
    htmx = HTMX_SRC,
    stream = EVENTS_STREAM_PATH,
    content = channel.content_url(),
    event = EVENT_MEDIA_CHANGED,
    advance = ADVANCE_PATH,
  )
}
