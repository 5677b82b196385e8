use jobfill_common::site::DEFAULT_SITE_PATTERNS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobfillConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sites: SitesConfig,
    #[serde(default)]
    pub dropdown: DropdownConfig,
    #[serde(default)]
    pub resume: ResumeConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
}

/// Where extraction and resume requests are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_process_path")]
    pub process_path: String,
    #[serde(default = "default_resume_path")]
    pub resume_path: String,
}

impl BackendConfig {
    pub fn process_url(&self) -> String {
        join_url(&self.base_url, &self.process_path)
    }

    pub fn resume_url(&self) -> String {
        join_url(&self.base_url, &self.resume_path)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            process_path: default_process_path(),
            resume_path: default_resume_path(),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_process_path() -> String {
    "/process_html".to_string()
}

fn default_resume_path() -> String {
    "/get_resume".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesConfig {
    #[serde(default = "default_site_patterns")]
    pub patterns: Vec<String>,
    /// Refuse to run on pages the classifier rejects.
    #[serde(default = "default_require_match")]
    pub require_match: bool,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            patterns: default_site_patterns(),
            require_match: default_require_match(),
        }
    }
}

fn default_site_patterns() -> Vec<String> {
    DEFAULT_SITE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_require_match() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropdownConfig {
    /// CSS class marking a custom dropdown widget.
    #[serde(default = "default_marker_class")]
    pub marker_class: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            marker_class: default_marker_class(),
            page_size: default_page_size(),
        }
    }
}

fn default_marker_class() -> String {
    "select2-offscreen".to_string()
}

fn default_page_size() -> u32 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeConfig {
    #[serde(default = "default_resume_enabled")]
    pub enabled: bool,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            enabled: default_resume_enabled(),
            file_name: default_file_name(),
            content_type: default_content_type(),
        }
    }
}

fn default_resume_enabled() -> bool {
    true
}

fn default_file_name() -> String {
    "resume.pdf".to_string()
}

fn default_content_type() -> String {
    "application/pdf".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default = "default_trigger_label")]
    pub label: String,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            label: default_trigger_label(),
        }
    }
}

fn default_trigger_label() -> String {
    "Auto-fill Resume".to_string()
}
