use crate::error::{Result, ScraperError};
use serde::{Deserialize, Serialize};
use std::env;

/// Where the registry lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the public class search ("cadastro de turmas").
    pub cagr_url: String,
    /// Base URL of the student forum.
    pub forum_url: String,
    /// Central authentication (CAS) login page.
    pub login_url: String,
    /// Student academic history page, used to look up the logged-in student's program.
    pub history_url: String,
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of subject lookups in flight at once.
    pub max_concurrent: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cagr_url: "http://cagr.sistemas.ufsc.br/modules/comunidade/cadastroTurmas/".to_string(),
            forum_url: "http://forum.cagr.ufsc.br/".to_string(),
            login_url: "https://sistemas.ufsc.br/login".to_string(),
            history_url: "https://cagr.sistemas.ufsc.br/modules/aluno/historicoEscolar/"
                .to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 30,
            max_concurrent: 8,
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from the defaults, overridden by `CAGR_*` environment
    /// variables. A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(url) = env::var("CAGR_URL") {
            config.cagr_url = url;
        }
        if let Ok(url) = env::var("CAGR_FORUM_URL") {
            config.forum_url = url;
        }
        if let Ok(url) = env::var("CAGR_LOGIN_URL") {
            config.login_url = url;
        }
        if let Ok(url) = env::var("CAGR_HISTORY_URL") {
            config.history_url = url;
        }
        if let Ok(agent) = env::var("CAGR_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = numeric_var::<u64>("CAGR_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        if let Some(n) = numeric_var::<usize>("CAGR_MAX_CONCURRENT")? {
            config.max_concurrent = n;
        }

        Ok(config)
    }

    /// Joins a page name onto the class search base URL.
    pub fn cagr_page(&self, page: &str) -> String {
        join_url(&self.cagr_url, page)
    }

    /// Joins a page name onto the forum base URL.
    pub fn forum_page(&self, page: &str) -> String {
        join_url(&self.forum_url, page)
    }
}

fn numeric_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            ScraperError::ParsingError(format!("{} must be a number, got {:?}", name, raw))
        }),
        Err(_) => Ok(None),
    }
}

fn join_url(base: &str, page: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        page.trim_start_matches('/')
    )
}
