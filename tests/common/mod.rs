// tests/common/mod.rs
//
// An in-memory `Transport` that serves canned pages, so client flows can be
// exercised without touching the network.

#![allow(dead_code)]

use async_trait::async_trait;
use cagr_core::{ClientConfig, Page, Result, ScraperError, Transport};
use reqwest::Url;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const CAGR_URL: &str = "http://cagr.test/modules/comunidade/cadastroTurmas/";
pub const FORUM_URL: &str = "http://forum.test/";
pub const LOGIN_URL: &str = "https://login.test/login";
pub const HISTORY_URL: &str = "https://cagr.test/modules/aluno/historicoEscolar/";

/// One request as seen by the fixture transport.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: &'static str,
    pub url: Url,
    pub fields: Vec<(String, String)>,
}

impl Request {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.into_owned())
    }
}

type Handler = Arc<dyn Fn(&Request) -> Page + Send + Sync>;

struct Route {
    method: &'static str,
    url: String,
    handler: Handler,
}

#[derive(Clone, Default)]
pub struct FixtureTransport {
    routes: Arc<Mutex<Vec<Route>>>,
    log: Arc<Mutex<Vec<Request>>>,
    sessions: Arc<Mutex<usize>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `handler` for requests to `url` (ignoring the query string).
    pub fn on<F>(&self, method: &'static str, url: &str, handler: F) -> &Self
    where
        F: Fn(&Request) -> Page + Send + Sync + 'static,
    {
        self.routes.lock().unwrap().push(Route {
            method,
            url: url.to_string(),
            handler: Arc::new(handler),
        });
        self
    }

    /// Serves a fixed body with status 200 for GET requests to `url`.
    pub fn page(&self, url: &str, body: &str) -> &Self {
        let body = body.to_string();
        let page_url = url.to_string();
        self.on("GET", url, move |_| ok_page(&page_url, &body))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }

    /// How many times `fresh()` has been called.
    pub fn sessions_opened(&self) -> usize {
        *self.sessions.lock().unwrap()
    }

    fn dispatch(&self, request: Request) -> Result<Page> {
        self.log.lock().unwrap().push(request.clone());

        let mut target = request.url.clone();
        target.set_query(None);

        let routes = self.routes.lock().unwrap();
        let route = routes
            .iter()
            .find(|r| r.method == request.method && r.url == target.as_str())
            .ok_or_else(|| {
                ScraperError::Network(format!("no fixture for {} {}", request.method, target))
            })?;
        Ok((route.handler)(&request))
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Page> {
        let mut url = Url::parse(url).map_err(|e| ScraperError::ParsingError(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        self.dispatch(Request {
            method: "GET",
            url,
            fields: Vec::new(),
        })
    }

    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Page> {
        let url = Url::parse(url).map_err(|e| ScraperError::ParsingError(e.to_string()))?;
        self.dispatch(Request {
            method: "POST",
            url,
            fields: fields.to_vec(),
        })
    }

    fn fresh(&self) -> Result<Box<dyn Transport>> {
        *self.sessions.lock().unwrap() += 1;
        Ok(Box::new(self.clone()))
    }
}

pub fn ok_page(url: &str, body: &str) -> Page {
    Page {
        url: Url::parse(url).unwrap(),
        status: 200,
        body: body.to_string(),
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        cagr_url: CAGR_URL.to_string(),
        forum_url: FORUM_URL.to_string(),
        login_url: LOGIN_URL.to_string(),
        history_url: HISTORY_URL.to_string(),
        max_concurrent: 4,
        ..ClientConfig::default()
    }
}

pub fn asset(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("assets")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {:?}: {}", path, e))
}

pub const LOGIN_PAGE: &str = r#"<html><body>
<form id="fm1" action="/login?service=http%3A%2F%2Fforum.test%2F" method="post">
  <input id="username" name="username" type="text" value="" />
  <input id="password" name="password" type="password" value="" />
  <input type="hidden" name="lt" value="LT-42" />
  <input type="hidden" name="execution" value="e1s1" />
  <input type="hidden" name="_eventId" value="submit" />
  <input class="btn-submit" name="submit" type="submit" value="LOGIN" />
</form>
</body></html>"#;

/// Registers a CAS login that accepts exactly `username`/`password`.
pub fn with_login(transport: &FixtureTransport, username: &str, password: &str) {
    let (username, password) = (username.to_string(), password.to_string());
    transport.page(LOGIN_URL, LOGIN_PAGE);
    transport.on("POST", LOGIN_URL, move |req| {
        let accepted = req.field("username") == Some(username.as_str())
            && req.field("password") == Some(password.as_str())
            && req.field("lt") == Some("LT-42");
        if accepted {
            ok_page(FORUM_URL, "<html><body>Bem-vindo</body></html>")
        } else {
            ok_page(LOGIN_URL, LOGIN_PAGE)
        }
    });
}
