use crate::error::{DiagramError, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RENDER_BASE_URL: &str = "https://mermaid.ink";
pub const DEFAULT_RENDER_FORMAT: &str = "svg";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path segment selecting the image type (`svg`, `img`, ...).
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_base_url() -> String {
    DEFAULT_RENDER_BASE_URL.to_string()
}

fn default_format() -> String {
    DEFAULT_RENDER_FORMAT.to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            format: default_format(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(DiagramError::InvalidConfig("render.base_url is empty".into()));
        }
        if self.format.trim().is_empty() || self.format.contains('/') {
            return Err(DiagramError::InvalidConfig(format!(
                "render.format must be a single path segment, got {:?}",
                self.format
            )));
        }
        Ok(())
    }
}

/// Builds hosted-render URLs for Mermaid text. Nothing is fetched or validated.
#[derive(Clone, Debug, Default)]
pub struct MermaidInkRenderer {
    config: RenderConfig,
}

impl MermaidInkRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn prefix(&self) -> String {
        format!(
            "{}/{}/",
            self.config.base_url.trim_end_matches('/'),
            self.config.format
        )
    }

    pub fn render_url(&self, diagram: &str) -> String {
        format!("{}{}", self.prefix(), URL_SAFE.encode(diagram.as_bytes()))
    }

    /// Recover the diagram text from a URL produced by [`Self::render_url`].
    pub fn decode_payload(&self, url: &str) -> Option<String> {
        let payload = url.strip_prefix(&self.prefix())?;
        let bytes = URL_SAFE.decode(payload).ok()?;
        String::from_utf8(bytes).ok()
    }
}

/// Scrollable `<img>` wrapper used by HTML clients.
pub fn html_embed(url: &str) -> String {
    format!(
        r#"<div style="overflow:auto; max-height:700px; border:1px solid #666; border-radius:8px; padding:10px; background:#fafafa;">
    <img src="{url}" alt="Flowchart" style="max-width:100%; display:block;">
</div>"#
    )
}
