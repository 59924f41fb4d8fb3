//! Source locator classification and authenticated URL rewriting.

use std::collections::BTreeMap;

/// What kind of source a locator points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    /// A remote version-controlled repository, reached over the network.
    RemoteVcs,
    /// A local directory, read in place.
    LocalPath,
}

impl std::fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocatorKind::RemoteVcs => write!(f, "remote-vcs"),
            LocatorKind::LocalPath => write!(f, "local-path"),
        }
    }
}

/// Classify a locator string as remote or local.
///
/// URL schemes (`http`, `https`, `git`, `ssh`) and scp-style remotes
/// (`user@host:path`) are remote; everything else is a local path.
pub fn classify(locator: &str) -> LocatorKind {
    const SCHEMES: [&str; 4] = ["http://", "https://", "git://", "ssh://"];
    if SCHEMES.iter().any(|s| locator.starts_with(s)) || is_scp_style(locator) {
        LocatorKind::RemoteVcs
    } else {
        LocatorKind::LocalPath
    }
}

/// Match `user@host:path` remotes, e.g. `git@github.com:acme/widget.git`.
fn is_scp_style(locator: &str) -> bool {
    let Some((head, tail)) = locator.split_once(':') else {
        return false;
    };
    let Some((user, host)) = head.split_once('@') else {
        return false;
    };
    let part_ok = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    part_ok(user) && part_ok(host) && !tail.is_empty()
}

/// Per-host authentication tokens for fetching private repositories.
#[derive(Debug, Clone, Default)]
pub struct AuthTokens {
    tokens: BTreeMap<String, String>,
}

/// Host assumed when a token is registered without one.
pub const DEFAULT_AUTH_HOST: &str = "github.com";

impl AuthTokens {
    /// Create an empty token registry.
    pub fn new() -> Self {
        AuthTokens::default()
    }

    /// Register a token for a host (default `github.com`).
    pub fn add(&mut self, token: impl Into<String>, host: Option<&str>) {
        self.tokens
            .insert(host.unwrap_or(DEFAULT_AUTH_HOST).to_string(), token.into());
    }

    /// Rewrite an `https://` locator to embed the registered token for its
    /// host as URL userinfo. Locators with another scheme, an unknown host,
    /// or existing userinfo pass through unchanged.
    pub fn apply(&self, locator: &str) -> String {
        let Some(rest) = locator.strip_prefix("https://") else {
            return locator.to_string();
        };
        let (host, path) = match rest.split_once('/') {
            Some((host, path)) => (host, path),
            None => (rest, ""),
        };
        if host.contains('@') {
            return locator.to_string();
        }
        match self.tokens.get(host) {
            Some(token) => format!("https://{token}@{host}/{path}"),
            None => locator.to_string(),
        }
    }
}
