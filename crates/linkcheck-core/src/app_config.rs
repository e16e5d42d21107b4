use std::path::PathBuf;

/// Which completion backend, if any, backs the fallback page classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    None,
    Anthropic,
    OpenAi,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::None => write!(f, "none"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
            LlmProvider::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub sheets_access_token: String,
    pub sheets_api_base: String,
    pub linkedin_email: Option<String>,
    pub linkedin_password: Option<String>,
    pub cdp_endpoint: String,
    pub cookies_path: PathBuf,
    pub navigation_timeout_secs: u64,
    pub login_timeout_secs: u64,
    pub profile_delay_ms: u64,
    pub update_max_attempts: u32,
    pub update_backoff_step_ms: u64,
    pub llm_provider: LlmProvider,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub llm_base_url: Option<String>,
    pub export_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet_name", &self.sheet_name)
            .field("sheets_access_token", &"[redacted]")
            .field("sheets_api_base", &self.sheets_api_base)
            .field("linkedin_email", &self.linkedin_email)
            .field(
                "linkedin_password",
                &self.linkedin_password.as_ref().map(|_| "[redacted]"),
            )
            .field("cdp_endpoint", &self.cdp_endpoint)
            .field("cookies_path", &self.cookies_path)
            .field("navigation_timeout_secs", &self.navigation_timeout_secs)
            .field("login_timeout_secs", &self.login_timeout_secs)
            .field("profile_delay_ms", &self.profile_delay_ms)
            .field("update_max_attempts", &self.update_max_attempts)
            .field("update_backoff_step_ms", &self.update_backoff_step_ms)
            .field("llm_provider", &self.llm_provider)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("llm_base_url", &self.llm_base_url)
            .field("export_dir", &self.export_dir)
            .finish()
    }
}
