//! Configuration types for Sopwright document generation.
//!
//! This module provides configuration structures that control how generated
//! documents are styled and which defaults fill metadata the diagram does not
//! declare. All types implement [`serde::Deserialize`] for flexible loading
//! from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`StyleConfig`] - Font family, sizes, colors and shading of synthesized text.
//! - [`DefaultsConfig`] - Fallback metadata values and the default actor.
//! - [`TemplateConfig`] - Optional path to a custom `.docx` template.
//!
//! # Example
//!
//! ```
//! # use sopwright::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.style().body_size(), 11);
//! assert_eq!(config.defaults().actor(), "Process Owner");
//! ```

use std::path::Path;

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Metadata defaults section.
    #[serde(default)]
    defaults: DefaultsConfig,

    /// Template configuration section.
    #[serde(default)]
    template: TemplateConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `style` - Styling of synthesized text.
    /// * `defaults` - Fallback metadata values.
    /// * `template` - Template selection.
    pub fn new(style: StyleConfig, defaults: DefaultsConfig, template: TemplateConfig) -> Self {
        Self {
            style,
            defaults,
            template,
        }
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the metadata defaults.
    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }

    /// Returns the template configuration.
    pub fn template(&self) -> &TemplateConfig {
        &self.template
    }
}

/// Styling applied to every run the renderer writes or substitutes.
///
/// Sizes are in points; colors and shading are `RRGGBB` hex strings;
/// the branch indent is in twentieths of a point.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    font_family: String,
    body_size: u32,
    title_size: u32,
    reference_size: u32,
    raci_size: u32,
    reference_color: String,
    gateway_shading: String,
    sla_shading: String,
    branch_indent: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "Avenir LT Std 45 Book".to_string(),
            body_size: 11,
            title_size: 12,
            reference_size: 14,
            raci_size: 9,
            reference_color: "FF0000".to_string(),
            gateway_shading: "D9D9D9".to_string(),
            sla_shading: "F2F2F2".to_string(),
            branch_indent: 360,
        }
    }
}

impl StyleConfig {
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn body_size(&self) -> u32 {
        self.body_size
    }

    /// Size of step titles.
    pub fn title_size(&self) -> u32 {
        self.title_size
    }

    /// Size of the step reference column.
    pub fn reference_size(&self) -> u32 {
        self.reference_size
    }

    pub fn raci_size(&self) -> u32 {
        self.raci_size
    }

    pub fn reference_color(&self) -> &str {
        &self.reference_color
    }

    /// Cell shading of decision and branch rows.
    pub fn gateway_shading(&self) -> &str {
        &self.gateway_shading
    }

    pub fn sla_shading(&self) -> &str {
        &self.sla_shading
    }

    /// Left indent added per branch depth level.
    pub fn branch_indent(&self) -> u32 {
        self.branch_indent
    }
}

/// Values used when neither the diagram nor the user supplies a field.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    issued_by: String,
    release_date: String,
    process_owner: String,
    actor: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            issued_by: "Business Excellence".to_string(),
            release_date: "TBD".to_string(),
            process_owner: "TBD".to_string(),
            actor: "Process Owner".to_string(),
        }
    }
}

impl DefaultsConfig {
    pub fn issued_by(&self) -> &str {
        &self.issued_by
    }

    pub fn release_date(&self) -> &str {
        &self.release_date
    }

    pub fn process_owner(&self) -> &str {
        &self.process_owner
    }

    /// Actor named in the narrative of elements outside any lane.
    pub fn actor(&self) -> &str {
        &self.actor
    }
}

/// Template selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateConfig {
    /// Path to a custom `.docx` template; the built-in template when unset.
    #[serde(default)]
    path: Option<String>,
}

impl TemplateConfig {
    /// Returns the custom template path, if one is configured.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(Path::new)
    }
}
