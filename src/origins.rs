use std::collections::HashMap;

use crate::config::ToolchainConfig;
use crate::error::{JavelinError, Result};
use crate::maven::DependencyRecord;
use crate::vcsurl::{RepositoryIdentity, VcsKind};

/// Repository path of the JDK 8 standard library checkout. Units under
/// this path are graphed without Maven, and references into the JDK
/// install resolve to it.
pub const JDK_STDLIB_REPO: &str = "hg.openjdk.java.net/jdk8/jdk8/jdk";

const JAR_ORIGIN_PREFIX: &str = "jar:file:";

/// The fixed identity of the JDK standard library repository.
pub fn jdk_stdlib_repo() -> RepositoryIdentity {
    RepositoryIdentity {
        clone_url: format!("https://{}", JDK_STDLIB_REPO),
        host: "hg.openjdk.java.net".to_owned(),
        owner: "jdk8".to_owned(),
        name: "jdk".to_owned(),
        full_name: "jdk8/jdk8/jdk".to_owned(),
        vcs: VcsKind::Hg,
    }
}

/// Repository identities already resolved for this unit's dependencies,
/// keyed by the full dependency tuple. Rebuilt for every unit.
pub type DepRepoCache = HashMap<DependencyRecord, RepositoryIdentity>;

/// Decides which repository defines the symbol behind a reference.
///
/// `Ok(None)` means the definition lives in the unit being analyzed: the
/// origin is empty or points at loose class files rather than a JAR.
/// Origins inside the JDK install map to the standard library repository;
/// anything else is matched against the resolved dependencies by artifact
/// filename.
pub fn repo_for_origin(
    cfg: &ToolchainConfig,
    origin: &str,
    deps: &[DependencyRecord],
    cache: &DepRepoCache,
) -> Result<Option<RepositoryIdentity>> {
    if origin.is_empty() || !origin.starts_with(JAR_ORIGIN_PREFIX) {
        return Ok(None);
    }

    if origin.starts_with(&cfg.stdlib_origin_prefix()) {
        return Ok(Some(jdk_stdlib_repo()));
    }

    let filename = jar_filename(origin);
    for dep in deps {
        if dep.filename == filename {
            // A record whose repository failed to resolve has no cache
            // entry; a later record with the same filename may still hit.
            if let Some(repo) = cache.get(dep) {
                return Ok(Some(repo.clone()));
            }
        }
    }

    Err(JavelinError::UnresolvedOrigin(origin.to_owned()))
}

/// Extracts the JAR path from an origin of the form
/// `jar:file:/path/to/file.jar!/entry/within.class`.
pub fn jar_filename(origin: &str) -> String {
    let path = clean_path(origin.strip_prefix(JAR_ORIGIN_PREFIX).unwrap_or(origin));

    match path.find('!') {
        Some(bang) => path[..bang].to_owned(),
        None => path,
    }
}

/// Lexical path normalization: collapses repeated separators and resolves
/// `.` and `..` segments without touching the filesystem. Maven reports
/// unnormalized paths like `/opt/java/jre/../lib/tools.jar`, while the
/// analyzer reports the normalized form.
fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().map_or(false, |s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_owned()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> ToolchainConfig {
        ToolchainConfig {
            java_home: PathBuf::from("/opt/java"),
            grapher_jar: PathBuf::from("/opt/javagraph.jar"),
            maven_bin: PathBuf::from("mvn"),
        }
    }

    fn dep(filename: &str) -> DependencyRecord {
        DependencyRecord {
            group_id: "com.example".to_owned(),
            artifact_id: "dep".to_owned(),
            version: "1.0".to_owned(),
            scope: "compile".to_owned(),
            filename: filename.to_owned(),
        }
    }

    fn repo(name: &str) -> RepositoryIdentity {
        RepositoryIdentity {
            clone_url: format!("git://github.com/alice/{}.git", name),
            host: "github.com".to_owned(),
            owner: "alice".to_owned(),
            name: name.to_owned(),
            full_name: format!("alice/{}", name),
            vcs: VcsKind::Git,
        }
    }

    #[test]
    fn jar_filename_strips_prefix_and_entry() {
        assert_eq!(jar_filename("jar:file:/a/b.jar!/c/d.ef"), "/a/b.jar");
    }

    #[test]
    fn jar_filename_normalizes_the_path() {
        assert_eq!(jar_filename("jar:file:/opt/java/jre/../lib/tools.jar!/com/sun/Tree.class"), "/opt/java/lib/tools.jar");
    }

    #[test]
    fn clean_path_cases() {
        assert_eq!(clean_path("/a//b/./c"), "/a/b/c");
        assert_eq!(clean_path("/a/../../b"), "/b");
        assert_eq!(clean_path("a/.."), ".");
        assert_eq!(clean_path("../a"), "../a");
        assert_eq!(clean_path("/"), "/");
    }

    #[test]
    fn empty_origin_is_local() {
        let resolved = repo_for_origin(&config(), "", &[], &DepRepoCache::new()).unwrap();

        assert_eq!(resolved, None);
    }

    #[test]
    fn non_jar_origin_is_local() {
        let resolved = repo_for_origin(&config(), "file:/src/Foo.java", &[], &DepRepoCache::new()).unwrap();

        assert_eq!(resolved, None);
    }

    #[test]
    fn jdk_origin_resolves_to_stdlib_repo() {
        let origin = "jar:file:/opt/java/jre/lib/rt.jar!/java/lang/String.class";
        let resolved = repo_for_origin(&config(), origin, &[], &DepRepoCache::new()).unwrap();

        assert_eq!(resolved, Some(jdk_stdlib_repo()));
    }

    #[test]
    fn dependency_origin_resolves_through_the_cache() {
        let deps = vec![dep("/x/a.jar")];
        let mut cache = DepRepoCache::new();
        cache.insert(deps[0].clone(), repo("a"));

        let resolved = repo_for_origin(&config(), "jar:file:/x/a.jar!/A.class", &deps, &cache).unwrap();

        assert_eq!(resolved, Some(repo("a")));
    }

    #[test]
    fn uncached_record_does_not_shadow_a_later_match() {
        let unresolved = dep("/x/a.jar");
        let resolved = DependencyRecord { scope: "test".to_owned(), ..dep("/x/a.jar") };

        let deps = vec![unresolved, resolved.clone()];
        let mut cache = DepRepoCache::new();
        cache.insert(resolved, repo("a"));

        let found = repo_for_origin(&config(), "jar:file:/x/a.jar!/A.class", &deps, &cache).unwrap();

        assert_eq!(found, Some(repo("a")));
    }

    #[test]
    fn unmatched_jar_origin_is_an_error() {
        let deps = vec![dep("/x/a.jar")];

        let result = repo_for_origin(&config(), "jar:file:/y/b.jar!/B.class", &deps, &DepRepoCache::new());

        assert!(matches!(result, Err(JavelinError::UnresolvedOrigin(_))));
    }
}
