//! Shared fragment loading.
//!
//! Pages carry empty placeholder elements for the navbar and footer; the
//! loader fetches each fragment and injects it. A failed fetch never reaches
//! the caller: it is logged and the placeholder shows an error panel with a
//! link to the dev server instead.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::dom::Dom;
use crate::error::FetchError;

/// Where the site is expected to be served during development.
pub const DEV_SERVER: &str = "http://localhost:3000";

/// Link text of the remediation link in the error panel.
pub const REMEDIATION_TEXT: &str = "OPEN WEBSITE CORRECTLY";

/// Something that can return the HTML of a fragment by relative path.
pub trait FragmentSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Fragments read from a site directory on disk.
///
/// A missing file is reported as HTTP 404, as a static file server would.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || escapes {
            return Err(FetchError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl FragmentSource for DirectorySource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|source| match source.kind() {
            ErrorKind::NotFound => FetchError::Status {
                path: path.to_string(),
                status: 404,
            },
            _ => FetchError::Io {
                path: path.to_string(),
                source,
            },
        })
    }
}

/// Fragments fetched over HTTP relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base: Url,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("constellation/", env!("CARGO_PKG_VERSION")));
        // A local dev server is never reached through a proxy.
        if is_loopback(&base) {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self { base, client })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

impl FragmentSource for HttpSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self
            .base
            .join(path)
            .map_err(|_| FetchError::InvalidPath(path.to_string()))?;

        let transport = |source| FetchError::Transport {
            path: path.to_string(),
            source,
        };
        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(transport)
    }
}

/// Fragments held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    fragments: BTreeMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, html: impl Into<String>) -> Self {
        self.fragments.insert(path.into(), html.into());
        self
    }
}

impl FragmentSource for MapSource {
    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.fragments
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                path: path.to_string(),
                status: 404,
            })
    }
}

/// The panel shown in place of a fragment that failed to load.
pub fn error_panel(path: &str, dev_server: &str) -> String {
    format!(
        r#"<div class="component-error" style="color: #ef4444; padding: 1rem; text-align: center; border: 1px solid #ef4444; margin: 1rem; background: rgba(239, 68, 68, 0.1); border-radius: 0.5rem;"><strong>Error loading component ({path})</strong><div style="font-size: 0.875rem; margin-top: 0.5rem;">Shared components are fetched over HTTP and cannot load from <code>file://</code>. Start the local server and reload.</div><div style="margin-top: 0.5rem;">Or click here: <a href="{dev_server}" style="color: #f97316; text-decoration: underline; font-weight: bold;">{REMEDIATION_TEXT}</a></div></div>"#
    )
}

/// Fetch `path` and inject it into the element with id `target_id`.
///
/// Returns `true` when the fragment was injected. On failure the error is
/// logged, the target (if present) receives the [`error_panel`], and `false`
/// is returned.
pub fn load_fragment<D, S>(dom: &mut D, source: &S, target_id: &str, path: &str) -> bool
where
    D: Dom + ?Sized,
    S: FragmentSource + ?Sized,
{
    load_fragment_with(dom, source, target_id, path, DEV_SERVER)
}

/// [`load_fragment`] with a custom dev server for the remediation link.
pub fn load_fragment_with<D, S>(dom: &mut D, source: &S, target_id: &str, path: &str, dev_server: &str) -> bool
where
    D: Dom + ?Sized,
    S: FragmentSource + ?Sized,
{
    let result = source.fetch(path);
    let target = dom.element_by_id(target_id);

    match (result, target) {
        (Ok(html), Some(node)) => {
            dom.set_inner_html(node, &html);
            log::info!("loaded {} into #{}", path, target_id);
            true
        }
        (Ok(_), None) => {
            log::error!("loaded {} but #{} is not on the page", path, target_id);
            false
        }
        (Err(e), target) => {
            log::error!("{}", e);
            if let Some(node) = target {
                dom.set_inner_html(node, &error_panel(path, dev_server));
            }
            false
        }
    }
}

/// Where a page opened from the filesystem should go instead.
///
/// A `file:` location maps to the same file name on the dev server, or
/// `index.html` when the path ends in a directory. Any other scheme needs no
/// redirect.
pub fn local_redirect(location: &Url, dev_server: &Url) -> Option<Url> {
    if location.scheme() != "file" {
        return None;
    }
    dev_server.join(&page_name(location)).ok()
}

/// Last path segment of a location, or `index.html` when empty.
pub fn page_name(location: &Url) -> String {
    location
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("index.html")
        .to_string()
}
