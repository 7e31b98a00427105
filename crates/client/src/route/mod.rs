//! Request classification.
//!
//! Every intercepted request gets exactly one [`Route`]. Rules are checked in
//! a fixed order and the last one is a catch-all:
//!
//! 1. non-read method → bypass
//! 2. foreign origin that is not the allow-listed API host → bypass
//! 3. path+query matches an API pattern → `Api`
//! 4. media extension, or media under the storage prefix → `Media`
//! 5. navigate mode → `Navigation`
//! 6. anything else → `Static`

use regex::Regex;
use serde::Serialize;
use url::{Position, Url};

use rentcache_core::{AppConfig, Error, Request, RequestMode};

/// What kind of resource a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Api,
    Media,
    Navigation,
    Static,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Api => "api",
            Classification::Media => "media",
            Classification::Navigation => "navigation",
            Classification::Static => "static",
        }
    }
}

/// Why a request was left to the network untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassReason {
    NonReadMethod,
    ForeignOrigin,
    /// The worker is not active yet, so nothing is intercepted.
    Uncontrolled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "reason", rename_all = "snake_case")]
pub enum Route {
    Bypass(BypassReason),
    Intercept(Classification),
}

/// Compiled routing rules.
#[derive(Debug, Clone)]
pub struct Selector {
    origin: Url,
    api_host: Option<String>,
    api_patterns: Vec<Regex>,
    media: Regex,
}

fn compile(field: &str, pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("{field}: invalid pattern {pattern:?}: {e}")))
}

impl Selector {
    /// Build a selector.
    ///
    /// `media_extensions` are matched case-insensitively at the end of the
    /// path; `storage_prefix` marks the uploaded-media area.
    pub fn new(
        origin: Url, api_host: Option<String>, api_patterns: &[String], media_extensions: &[String],
        storage_prefix: &str,
    ) -> Result<Self, Error> {
        let api_patterns = api_patterns
            .iter()
            .map(|p| compile("api_patterns", p))
            .collect::<Result<Vec<_>, _>>()?;

        if media_extensions.is_empty() {
            return Err(Error::Config("media_extensions: at least one extension is required".into()));
        }
        let extensions = media_extensions
            .iter()
            .map(|e| regex::escape(e.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join("|");
        let media = compile(
            "media_extensions",
            &format!(r"(?i)(\.({extensions})$)|(^{}.*\.({extensions})$)", regex::escape(storage_prefix)),
        )?;

        Ok(Self { origin, api_host: api_host.map(|h| h.to_ascii_lowercase()), api_patterns, media })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::Config(e.to_string()))?;
        Self::new(
            origin,
            config.api_host.clone(),
            &config.api_patterns,
            &config.media_extensions,
            &config.media_storage_prefix,
        )
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    fn is_allowed_origin(&self, url: &Url) -> bool {
        if url.origin() == self.origin.origin() {
            return true;
        }
        match (&self.api_host, url.host_str()) {
            (Some(allowed), Some(host)) => host.eq_ignore_ascii_case(allowed),
            _ => false,
        }
    }

    fn is_api(&self, url: &Url) -> bool {
        let path_and_query = &url[Position::BeforePath..Position::AfterQuery];
        self.api_patterns.iter().any(|p| p.is_match(path_and_query))
    }

    /// Classify `request`.
    pub fn route(&self, request: &Request) -> Route {
        if !request.method.is_read() {
            return Route::Bypass(BypassReason::NonReadMethod);
        }
        if !self.is_allowed_origin(&request.url) {
            return Route::Bypass(BypassReason::ForeignOrigin);
        }

        let classification = if self.is_api(&request.url) {
            Classification::Api
        } else if self.media.is_match(request.url.path()) {
            Classification::Media
        } else if request.mode == RequestMode::Navigate {
            Classification::Navigation
        } else {
            Classification::Static
        };

        tracing::debug!("routed {} as {}", request.describe(), classification.as_str());
        Route::Intercept(classification)
    }
}
