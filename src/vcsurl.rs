use std::str::FromStr;

use serde::Serialize;

use crate::error::{JavelinError, Result};

/// Version control systems we can attribute a repository to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    Git,
    Hg,
    Svn,
    Bzr,
}

impl FromStr for VcsKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s {
            "git" => Ok(VcsKind::Git),
            "hg" => Ok(VcsKind::Hg),
            "svn" => Ok(VcsKind::Svn),
            "bzr" => Ok(VcsKind::Bzr),
            _ => Err(()),
        }
    }
}

/// A repository identity derived from a VCS URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryIdentity {
    pub clone_url: String,
    pub host: String,
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub vcs: VcsKind,
}

/// Derives a repository identity from the URL forms found in the wild:
/// `scheme://host/path`, scp-like `user@host:path` and bare `host/path`.
///
/// github.com URLs normalize to the canonical `git://` clone form;
/// everything else keeps the URL it came in with. The VCS is inferred from
/// host and scheme, defaulting to git.
pub fn parse(url: &str) -> Result<RepositoryIdentity> {
    let trimmed = url.trim();

    let (scheme, rest) = match trimmed.find("://") {
        Some(at) => (Some(&trimmed[..at]), &trimmed[at + 3..]),
        None => (None, trimmed),
    };

    let (host, path) = split_host_path(scheme, rest).ok_or_else(|| JavelinError::VcsUrl(url.to_owned()))?;

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.pop().ok_or_else(|| JavelinError::VcsUrl(url.to_owned()))?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    let owner = segments.last().copied().unwrap_or("");

    if host == "github.com" && owner.is_empty() {
        return Err(JavelinError::VcsUrl(url.to_owned()));
    }

    let full_name = if owner.is_empty() { name.to_owned() } else { format!("{owner}/{name}") };
    let clone_url = match host {
        "github.com" => format!("git://github.com/{full_name}.git"),
        _ => trimmed.to_owned(),
    };

    Ok(RepositoryIdentity {
        clone_url,
        host: host.to_owned(),
        owner: owner.to_owned(),
        name: name.to_owned(),
        full_name,
        vcs: infer_vcs(scheme, host),
    })
}

fn split_host_path<'a>(scheme: Option<&str>, rest: &'a str) -> Option<(&'a str, &'a str)> {
    let rest = match rest.split_once('@') {
        Some((_, tail)) => tail,
        None => rest,
    };

    // scp-like syntax puts a colon where URL syntax puts the first slash
    if scheme.is_none() {
        if let Some((host, path)) = rest.split_once(':') {
            if !path.is_empty() && !path.starts_with('/') {
                return Some((host, path));
            }
        }
    }

    rest.split_once('/')
}

fn infer_vcs(scheme: Option<&str>, host: &str) -> VcsKind {
    match host {
        "github.com" | "bitbucket.org" => return VcsKind::Git,
        "code.google.com" => return VcsKind::Hg,
        _ => {}
    }

    for (prefix, kind) in [
        ("git.", VcsKind::Git),
        ("hg.", VcsKind::Hg),
        ("svn.", VcsKind::Svn),
        ("bzr.", VcsKind::Bzr),
    ] {
        if host.starts_with(prefix) {
            return kind;
        }
    }

    match scheme {
        Some("git") | Some("git+ssh") => VcsKind::Git,
        Some("hg") | Some("hg+ssh") => VcsKind::Hg,
        Some("svn") | Some("svn+ssh") => VcsKind::Svn,
        Some("bzr") | Some("bzr+ssh") => VcsKind::Bzr,
        _ => VcsKind::Git,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_github_http_url() {
        let identity = parse("http://github.com/alice/myrepo").unwrap();

        assert_eq!(identity.clone_url, "git://github.com/alice/myrepo.git");
        assert_eq!(identity.host, "github.com");
        assert_eq!(identity.owner, "alice");
        assert_eq!(identity.name, "myrepo");
        assert_eq!(identity.full_name, "alice/myrepo");
        assert_eq!(identity.vcs, VcsKind::Git);
    }

    #[test]
    fn parses_scp_like_ssh_url() {
        let identity = parse("git@github.com:alice/myrepo.git").unwrap();

        assert_eq!(identity.clone_url, "git://github.com/alice/myrepo.git");
        assert_eq!(identity.full_name, "alice/myrepo");
        assert_eq!(identity.vcs, VcsKind::Git);
    }

    #[test]
    fn parses_bare_host_path() {
        let identity = parse("github.com/alice/myrepo").unwrap();

        assert_eq!(identity.clone_url, "git://github.com/alice/myrepo.git");
    }

    #[test]
    fn keeps_clone_url_for_other_hosts() {
        let identity = parse("https://svn.apache.org/repos/asf/maven").unwrap();

        assert_eq!(identity.clone_url, "https://svn.apache.org/repos/asf/maven");
        assert_eq!(identity.vcs, VcsKind::Svn);
        assert_eq!(identity.owner, "asf");
        assert_eq!(identity.name, "maven");
        assert_eq!(identity.full_name, "asf/maven");
    }

    #[test]
    fn infers_vcs_from_scheme() {
        assert_eq!(parse("git://example.com/a/b").unwrap().vcs, VcsKind::Git);
        assert_eq!(parse("svn+ssh://example.com/a/b").unwrap().vcs, VcsKind::Svn);
        assert_eq!(parse("bzr://example.com/a/b").unwrap().vcs, VcsKind::Bzr);
    }

    #[test]
    fn defaults_to_git() {
        assert_eq!(parse("https://example.com/a/b").unwrap().vcs, VcsKind::Git);
    }

    #[test]
    fn rejects_urls_without_a_repository_path() {
        assert!(parse("").is_err());
        assert!(parse("foo").is_err());
        assert!(parse("http://github.com/myrepo").is_err());
    }

    #[test]
    fn vcs_kind_from_str() {
        assert_eq!("git".parse(), Ok(VcsKind::Git));
        assert_eq!("hg".parse(), Ok(VcsKind::Hg));
        assert_eq!("svn".parse(), Ok(VcsKind::Svn));
        assert_eq!("bzr".parse(), Ok(VcsKind::Bzr));
        assert!("cvs".parse::<VcsKind>().is_err());
    }
}
