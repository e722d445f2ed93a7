//! Identifier encoder: payload derivation and scan artifact rendering.
//!
//! The payload joins an item's name, the person who brought it in, and the
//! check-in instant at millisecond precision. Rendering is a pure function of
//! the payload and the [`RenderOptions`].

mod artifact;
mod code128;
mod svg;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, DomainResult};

pub use artifact::ScanArtifact;

/// Separator between the payload components.
pub const PAYLOAD_SEPARATOR: char = '-';

/// Fixed rendering parameters. Same options + same payload = same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Width of the narrowest bar, in pixels.
    pub module_width: u32,
    /// Bar height in pixels (caption excluded).
    pub bar_height: u32,
    /// Blank margin on each side, in modules.
    pub quiet_zone: u32,
    /// Caption font size in pixels.
    pub font_size: u32,
    /// Longest payload, in characters, that will be rendered.
    pub max_payload_len: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_width: 2,
            bar_height: 80,
            quiet_zone: 10,
            font_size: 14,
            max_payload_len: 128,
        }
    }
}

impl RenderOptions {
    pub const MAX_MODULE_WIDTH: u32 = 100;
    pub const MAX_BAR_HEIGHT: u32 = 10_000;
    pub const MAX_QUIET_ZONE: u32 = 1_000;
    pub const MAX_FONT_SIZE: u32 = 1_000;
    pub const MAX_PAYLOAD_LEN: usize = 4_096;

    /// Every field must lie within its bound; together the bounds keep all
    /// document coordinates well inside `u32`.
    pub fn validate(&self) -> DomainResult<()> {
        within("module_width", self.module_width, 1, Self::MAX_MODULE_WIDTH)?;
        within("bar_height", self.bar_height, 1, Self::MAX_BAR_HEIGHT)?;
        within("quiet_zone", self.quiet_zone, 0, Self::MAX_QUIET_ZONE)?;
        within("font_size", self.font_size, 1, Self::MAX_FONT_SIZE)?;
        within("max_payload_len", self.max_payload_len, 1, Self::MAX_PAYLOAD_LEN)?;
        Ok(())
    }
}

fn within<T>(field: &str, value: T, min: T, max: T) -> DomainResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(DomainError::validation(format!(
            "{field} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Derives identifier payloads and renders them as Code 128 SVG artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierEncoder {
    options: RenderOptions,
}

impl IdentifierEncoder {
    pub fn new(options: RenderOptions) -> DomainResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// `name-broughtBy-2026-10-18T09:15:02.123Z`
    ///
    /// Uniqueness rests on the millisecond timestamp; stores enforce it on top.
    pub fn derive_payload(&self, name: &str, brought_by: &str, time_in: DateTime<Utc>) -> String {
        format!(
            "{name}{sep}{brought_by}{sep}{}",
            time_in.to_rfc3339_opts(SecondsFormat::Millis, true),
            sep = PAYLOAD_SEPARATOR
        )
    }

    /// Render `payload` as a scannable SVG with a human-readable caption.
    pub fn render_artifact(&self, payload: &str) -> DomainResult<ScanArtifact> {
        let widths = code128::element_widths(payload, self.options.max_payload_len)?;
        let document = svg::render(&widths, payload, &self.options);
        Ok(ScanArtifact::from_bytes(document.into_bytes()))
    }
}

/// Decode artifact bytes back to the payload they encode.
pub fn decode_artifact(bytes: &[u8]) -> DomainResult<String> {
    let document = std::str::from_utf8(bytes)
        .map_err(|_| DomainError::encoding("artifact is not UTF-8 text"))?;
    let widths = svg::scan_widths(document)?;
    code128::decode_widths(&widths)
}
