//! Match a repository URL to the git provider that hosts it.
//!
//! Hosts are compared case-insensitively with any port removed. Public
//! providers are recognised by id; self-managed instances by the host of
//! their `base_api_url`.

use url::Url;

use crate::types::GitProvider;

/// Public hosts for the well-known provider ids.
const WELL_KNOWN_HOSTS: &[(&str, &str)] = &[
    ("github", "github.com"),
    ("gitlab", "gitlab.com"),
    ("bitbucket", "bitbucket.org"),
    ("codeberg", "codeberg.org"),
];

/// Return the first provider whose host matches the host of `repo_url`.
///
/// A URL whose host cannot be determined matches nothing.
pub fn provider_for_url<'a>(repo_url: &str, providers: &'a [GitProvider]) -> Option<&'a GitProvider> {
    let host = repo_host(repo_url)?;
    providers
        .iter()
        .find(|p| provider_host(p).is_some_and(|h| h == host))
}

/// Extract the lowercase host from an http(s), ssh or scp-style git URL.
pub fn repo_host(repo_url: &str) -> Option<String> {
    let trimmed = repo_url.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains("://") {
        let parsed = Url::parse(trimmed).ok()?;
        return parsed.host_str().map(normalize_host);
    }

    // scp-like: [user@]host:org/repo
    let (authority, _path) = trimmed.split_once(':')?;
    let host = authority.rsplit('@').next()?;
    if host.is_empty() || host.contains('/') {
        return None;
    }
    Some(normalize_host(host))
}

/// Host a provider serves repositories from, if known.
pub fn provider_host(provider: &GitProvider) -> Option<String> {
    if let Some(api) = provider.base_api_url.as_deref() {
        let parsed = Url::parse(api).ok()?;
        let host = normalize_host(parsed.host_str()?);
        let host = host.strip_prefix("api.").map(str::to_owned).unwrap_or(host);
        return Some(host);
    }

    let id = provider.id.0.to_ascii_lowercase();
    WELL_KNOWN_HOSTS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, host)| (*host).to_string())
}

fn normalize_host(host: &str) -> String {
    host.trim_start_matches("www.").to_ascii_lowercase()
}
