//! 门户会话 - 基础设施层
//!
//! 持有 HTTP 客户端和 Cookie 罐，只暴露"登录 / 检查认证 / 下载压缩包"的能力

use crate::config::Config;
use crate::error::{AppError, AppResult, PortalError};
use crate::models::{DateRange, DocumentKind};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect, Client, Url};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 登录页与登录提交地址
pub const LOGIN_PATH: &str = "/Login";

/// 门户连接器：每个企业开一个全新的会话
pub trait PortalConnector {
    type Session: PortalSession;

    fn open_session(&self) -> AppResult<Self::Session>;
}

/// 单个企业的门户会话
#[allow(async_fn_in_trait)]
pub trait PortalSession {
    /// 打开登录页，返回状态码是否成功
    async fn fetch_login_page(&self) -> AppResult<bool>;

    /// 提交账号密码（不跟随重定向）
    async fn submit_credentials(&self, usuario: &str, senha: &str) -> AppResult<()>;

    /// Cookie 罐中是否已有认证 Cookie
    fn is_authenticated(&self) -> bool;

    /// 下载某类批量压缩包；非成功状态或不是 ZIP 时返回 None
    async fn download_batch(&self, kind: DocumentKind, range: &DateRange) -> AppResult<Option<Vec<u8>>>;
}

/// 基于 reqwest 的门户连接器
#[derive(Debug, Clone)]
pub struct HttpPortal {
    base_url: Url,
    auth_cookie_name: String,
    user_agent: String,
}

impl HttpPortal {
    pub fn new(config: &Config) -> AppResult<Self> {
        let trimmed = config.portal_base_url.trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|e| PortalError::InvalidUrl {
            url: config.portal_base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            base_url,
            auth_cookie_name: config.auth_cookie_name.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|e| {
            AppError::Portal(PortalError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
        })
    }

    /// 固定的浏览器请求头
    fn browser_headers(&self) -> AppResult<HeaderMap> {
        let origin = self.base_url.origin().ascii_serialization();
        let referer = self.endpoint(LOGIN_PATH)?.to_string();

        let mut headers = HeaderMap::new();
        for (name, value) in [
            (header::USER_AGENT, self.user_agent.as_str()),
            (header::REFERER, referer.as_str()),
            (header::ORIGIN, origin.as_str()),
        ] {
            let value = HeaderValue::from_str(value).map_err(|_| PortalError::InvalidHeader {
                name: name.as_str().to_string(),
                value: value.to_string(),
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

impl PortalConnector for HttpPortal {
    type Session = HttpPortalSession;

    fn open_session(&self) -> AppResult<HttpPortalSession> {
        let jar = Arc::new(Jar::default());
        let headers = self.browser_headers()?;

        let build = |policy: redirect::Policy| {
            Client::builder()
                .default_headers(headers.clone())
                .cookie_provider(jar.clone())
                .redirect(policy)
                .build()
                .map_err(|source| PortalError::ClientBuildFailed { source })
        };

        Ok(HttpPortalSession {
            client: build(redirect::Policy::default())?,
            login_client: build(redirect::Policy::none())?,
            jar,
            login_url: self.endpoint(LOGIN_PATH)?,
            cookie_url: self.base_url.clone(),
            download_urls: [
                self.endpoint(DocumentKind::Cte.download_path())?,
                self.endpoint(DocumentKind::Mdfe.download_path())?,
            ],
            auth_cookie_name: self.auth_cookie_name.clone(),
            auth_cookie_seen: AtomicBool::new(false),
        })
    }
}

/// 一个企业的 HTTP 会话
///
/// 两个客户端共享同一个 Cookie 罐：登录提交不跟随重定向，其余请求跟随。
/// 认证 Cookie 可能带有任意 Path，所以除了查询 Cookie 罐，还记录响应里见过的 Set-Cookie
pub struct HttpPortalSession {
    client: Client,
    login_client: Client,
    jar: Arc<Jar>,
    login_url: Url,
    cookie_url: Url,
    download_urls: [Url; 2],
    auth_cookie_name: String,
    auth_cookie_seen: AtomicBool,
}

impl HttpPortalSession {
    fn note_set_cookies(&self, headers: &HeaderMap) {
        if sets_cookie(headers, &self.auth_cookie_name) {
            self.auth_cookie_seen.store(true, Ordering::Relaxed);
        }
    }

    /// 已知的所有门户地址，用于按 Path 查询 Cookie 罐
    fn known_urls(&self) -> impl Iterator<Item = &Url> {
        [&self.cookie_url, &self.login_url]
            .into_iter()
            .chain(self.download_urls.iter())
    }

    fn download_url(&self, kind: DocumentKind, range: &DateRange) -> Url {
        let mut url = match kind {
            DocumentKind::Cte => self.download_urls[0].clone(),
            DocumentKind::Mdfe => self.download_urls[1].clone(),
        };
        url.query_pairs_mut()
            .append_pair("DataEmissaoInicial", &range.start_param())
            .append_pair("DataEmissaoFinal", &range.end_param());
        url
    }
}

impl PortalSession for HttpPortalSession {
    async fn fetch_login_page(&self) -> AppResult<bool> {
        let response = self
            .client
            .get(self.login_url.clone())
            .send()
            .await
            .map_err(|e| AppError::request_failed(self.login_url.as_str(), e))?;

        debug!("登录页状态: {}", response.status());
        self.note_set_cookies(response.headers());
        Ok(response.status().is_success())
    }

    async fn submit_credentials(&self, usuario: &str, senha: &str) -> AppResult<()> {
        let response = self
            .login_client
            .post(self.login_url.clone())
            .form(&[("Usuario", usuario), ("Senha", senha)])
            .send()
            .await
            .map_err(|e| AppError::request_failed(self.login_url.as_str(), e))?;

        debug!("登录提交状态: {}", response.status());
        self.note_set_cookies(response.headers());
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        if self.auth_cookie_seen.load(Ordering::Relaxed) {
            return true;
        }
        self.known_urls()
            .filter_map(|url| self.jar.cookies(url))
            .any(|cookies| has_cookie(cookies.to_str().unwrap_or_default(), &self.auth_cookie_name))
    }

    async fn download_batch(&self, kind: DocumentKind, range: &DateRange) -> AppResult<Option<Vec<u8>>> {
        let url = self.download_url(kind, range);
        debug!("下载 {}: {}", kind, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::request_failed(url.as_str(), e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !status.is_success() || !content_type.contains("application/zip") {
            debug!("{} 下载无效: 状态 {}, Content-Type '{}'", kind, status, content_type);
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::request_failed(url.as_str(), e))?;
        Ok(Some(bytes.to_vec()))
    }
}

/// 在 `a=1; b=2` 形式的 Cookie 头中查找名称
fn has_cookie(header: &str, name: &str) -> bool {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(key, _)| key == name)
}

/// 响应头里是否有设置该名称 Cookie 的 Set-Cookie（不论 Path / Domain）
fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, _)| key.trim() == name)
}
