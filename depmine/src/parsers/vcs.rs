//! Helpers for VCS references, direct URLs and local paths.

use depmine_core::{Category, Dependency, DependencyType, canonicalize_name};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const VCS_PREFIXES: [&str; 5] = ["git+", "hg+", "bzr+", "svn+", "git://"];

/// Hosts that show up right after an `@` used for authentication
const KNOWN_HOSTS: [&str; 3] = ["github.com", "gitlab.com", "bitbucket.org"];

const ARCHIVE_EXTENSIONS: [&str; 6] = [".git", ".tar.gz", ".tar.bz2", ".whl", ".zip", ".tgz"];

/// `user@host:path`, the SSH shorthand git accepts without a scheme
static SCP_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._~-]+@[A-Za-z0-9.-]+:[^/\\\s]").expect("scp pattern is valid")
});

static WINDOWS_DRIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]:[\\/]").expect("drive pattern is valid"));

pub fn is_vcs_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    VCS_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

pub fn is_scp_like(location: &str) -> bool {
    SCP_LIKE.is_match(location)
}

/// Either a scheme-prefixed VCS URL or the SCP shorthand
pub fn is_vcs_reference(location: &str) -> bool {
    is_vcs_url(location) || is_scp_like(location)
}

/// http, https or ftp URL
pub fn is_remote_url(location: &str) -> bool {
    Url::parse(location).is_ok_and(|url| matches!(url.scheme(), "http" | "https" | "ftp"))
}

pub fn strip_file_scheme(location: &str) -> Option<&str> {
    location.strip_prefix("file://")
}

pub fn looks_like_path(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    location.starts_with(['.', '/', '~', '\\'])
        || location.contains(['/', '\\'])
        || WINDOWS_DRIVE.is_match(location)
        || ARCHIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Split off the `#fragment`
pub fn split_fragment(location: &str) -> (&str, Option<&str>) {
    match location.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (location, None),
    }
}

/// Value of `key=` inside the URL fragment (`#egg=name&subdirectory=pkg`)
pub fn fragment_value<'a>(location: &'a str, key: &str) -> Option<&'a str> {
    let (_, fragment) = split_fragment(location);
    fragment?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Branch, tag or commit after the last `@` of a VCS URL.
///
/// An `@` followed by a path or a known host belongs to the credentials
/// or the host part (`git+ssh://git@github.com/...`), not to a ref.
pub fn git_ref(location: &str) -> Option<String> {
    let (base, _) = split_fragment(location);
    let (_, candidate) = base.rsplit_once('@')?;

    if candidate.is_empty()
        || candidate.contains('/')
        || KNOWN_HOSTS.iter().any(|host| candidate.contains(host))
    {
        return None;
    }

    Some(candidate.to_string())
}

/// The URL without its fragment and without the `@ref` suffix.
/// The `@` of a bare `user@host:path` location is kept.
pub fn strip_ref(location: &str) -> &str {
    let (base, _) = split_fragment(location);
    if is_scp_like(base) && base.matches('@').count() == 1 {
        return base;
    }
    match git_ref(base) {
        Some(git_ref) => &base[..base.len() - git_ref.len() - 1],
        None => base,
    }
}

/// Guess a package name from the last segment of a URL or path
pub fn name_from_location(location: &str) -> String {
    let (base, _) = split_fragment(location);
    let base = base.trim_end_matches(['/', '\\']);

    let lower = base.to_ascii_lowercase();
    let stem = ARCHIVE_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map_or(base, |ext| &base[..base.len() - ext.len()]);

    let segment = stem.rsplit(['/', '\\', ':']).next().unwrap_or(stem);
    canonicalize_name(segment)
}

/// `name[extra1,extra2]` as found in an `egg=` fragment
fn split_egg(egg: &str) -> (&str, Vec<String>) {
    match egg.split_once('[') {
        Some((name, extras)) => {
            let extras = extras
                .trim_end_matches(']')
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
            (name, extras)
        }
        None => (egg, Vec::new()),
    }
}

/// Name and extras for a VCS location: `egg=` first, then the caller's
/// name, then the repository name.
pub fn vcs_name(explicit_name: Option<&str>, location: &str) -> (String, Vec<String>) {
    if let Some(egg) = fragment_value(location, "egg") {
        let (name, extras) = split_egg(egg);
        return (name.to_string(), extras);
    }
    match explicit_name {
        Some(name) => (name.to_string(), Vec::new()),
        None => (name_from_location(strip_ref(location)), Vec::new()),
    }
}

/// Dependency for a direct reference: VCS URL, `file://` URL or any other URL
pub fn dependency_from_url(
    explicit_name: Option<&str>,
    location: &str,
    source_file: &str,
    category: Category,
) -> Dependency {
    if is_vcs_reference(location) {
        let (name, extras) = vcs_name(explicit_name, location);
        return Dependency::new(&name, source_file, DependencyType::Git, category)
            .with_source_url(strip_ref(location))
            .with_git_ref(git_ref(location))
            .with_extras(extras);
    }

    if let Some(path) = strip_file_scheme(location) {
        let name = explicit_name.map_or_else(|| name_from_location(path), str::to_string);
        return Dependency::new(&name, source_file, DependencyType::Path, category)
            .with_source_path(path);
    }

    let name = explicit_name.map_or_else(|| name_from_location(location), str::to_string);
    Dependency::new(&name, source_file, DependencyType::Url, category).with_source_url(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_vcs_reference() {
        assert!(is_vcs_reference("git+https://github.com/django/django.git"));
        assert!(is_vcs_reference("GIT+ssh://git@github.com/org/repo.git"));
        assert!(is_vcs_reference("hg+https://hg.example.com/repo"));
        assert!(is_vcs_reference("svn+svn://svn.example.com/repo"));
        assert!(is_vcs_reference("bzr+lp:project"));
        assert!(is_vcs_reference("git://github.com/legacy/legacy-lib.git"));
        assert!(is_vcs_reference("git@github.com:tiangolo/fastapi.git"));

        assert!(!is_vcs_reference("requests==2.0"));
        assert!(!is_vcs_reference("https://example.com/pkg.zip"));
        assert!(!is_vcs_reference("pkg@https://example.com/pkg.zip"));
    }

    #[test]
    fn test_git_ref_branch() {
        assert_eq!(
            git_ref("git+https://github.com/django/django.git@main#egg=django").as_deref(),
            Some("main")
        );
    }

    #[test]
    fn test_git_ref_after_ssh_user() {
        assert_eq!(
            git_ref("git+ssh://git@github.com/myorg/private-pkg.git@v1.2.3#egg=private-pkg")
                .as_deref(),
            Some("v1.2.3")
        );
    }

    #[test]
    fn test_git_ref_ignores_credentials_and_hosts() {
        assert_eq!(git_ref("git+https://mytoken@github.com/org/private-repo.git"), None);
        assert_eq!(git_ref("git@github.com:tiangolo/fastapi.git"), None);
        assert_eq!(git_ref("git+https://user@gitlab.com"), None);
        assert_eq!(git_ref("git+https://github.com/other/repo.git#egg=my-repo"), None);
    }

    #[test]
    fn test_strip_ref() {
        assert_eq!(
            strip_ref("git+https://github.com/django/django.git@main#egg=django"),
            "git+https://github.com/django/django.git"
        );
        assert_eq!(
            strip_ref("git+https://mytoken@github.com/org/private-repo.git"),
            "git+https://mytoken@github.com/org/private-repo.git"
        );
    }

    #[test]
    fn test_scp_location_without_path_keeps_repository() {
        let location = "git@myhost:repo.git";
        assert_eq!(strip_ref(location), "git@myhost:repo.git");
        assert_eq!(strip_ref("git@myhost:org/repo.git@v1.0"), "git@myhost:org/repo.git");

        let dep = dependency_from_url(None, location, "requirements.txt", Category::Main);
        assert_eq!(dep.name, "repo");
        assert_eq!(dep.dependency_type, DependencyType::Git);
        assert_eq!(dep.source_url.as_deref(), Some("git@myhost:repo.git"));
        assert_eq!(dep.git_ref.as_deref(), Some("myhost:repo.git"));
    }

    #[test]
    fn test_fragment_value() {
        let url = "git+https://github.com/org/mono.git#egg=pkg&subdirectory=libs/pkg";
        assert_eq!(fragment_value(url, "egg"), Some("pkg"));
        assert_eq!(fragment_value(url, "subdirectory"), Some("libs/pkg"));
        assert_eq!(fragment_value(url, "sha256"), None);
        assert_eq!(fragment_value("https://example.com/pkg.zip", "egg"), None);
    }

    #[test]
    fn test_name_from_location() {
        assert_eq!(name_from_location("git://github.com/legacy/legacy-lib.git"), "legacy-lib");
        assert_eq!(name_from_location("git@github.com:tiangolo/fastapi.git"), "fastapi");
        assert_eq!(name_from_location("/abs/path/to/my-lib-a/"), "my-lib-a");
        assert_eq!(name_from_location("./libs/internal-lib-b"), "internal-lib-b");
        assert_eq!(
            name_from_location("https://example.com/builds/my-lib-1.0.0.tar.gz"),
            "my-lib-1-0-0"
        );
        assert_eq!(name_from_location("https://example.com/Pkg.ZIP#sha256=abc"), "pkg");
        assert_eq!(name_from_location(r"C:\Users\Projects\lib_c"), "lib-c");
        assert_eq!(name_from_location("."), "-");
    }

    #[test]
    fn test_looks_like_path() {
        assert!(looks_like_path("."));
        assert!(looks_like_path("./libs/pkg"));
        assert!(looks_like_path("../pkg"));
        assert!(looks_like_path("/opt/pkg"));
        assert!(looks_like_path("~/src/pkg"));
        assert!(looks_like_path(r"C:\Users\pkg"));
        assert!(looks_like_path("numpy-1.24.0-cp39-win_amd64.whl"));
        assert!(!looks_like_path("INVALID NAME WITH SPACE"));
    }

    #[test]
    fn test_is_remote_url() {
        assert!(is_remote_url("https://example.com/pkg.tar.gz"));
        assert!(is_remote_url("ftp://mirror.example.com/pkg.zip"));
        assert!(!is_remote_url("file:///abs/pkg"));
        assert!(!is_remote_url("./pkg"));
    }

    #[test]
    fn test_dependency_from_url_vcs_egg_with_extras() {
        let dep = dependency_from_url(
            None,
            "git+https://github.com/org/repo.git@abc123#egg=My_Pkg[fast,cli]",
            "requirements.txt",
            Category::Main,
        );
        assert_eq!(dep.name, "my-pkg");
        assert_eq!(dep.dependency_type, DependencyType::Git);
        assert_eq!(dep.git_ref.as_deref(), Some("abc123"));
        assert_eq!(dep.extras_requested, vec!["fast", "cli"]);
        assert_eq!(dep.source_url.as_deref(), Some("git+https://github.com/org/repo.git"));
        assert!(dep.source_path.is_none());
    }

    #[test]
    fn test_dependency_from_url_http() {
        let url = "https://example.com/pkg-1.0.zip";
        let dep = dependency_from_url(None, url, "requirements.txt", Category::Main);
        assert_eq!(dep.dependency_type, DependencyType::Url);
        assert_eq!(dep.source_url.as_deref(), Some("https://example.com/pkg-1.0.zip"));
        assert_eq!(dep.name, "pkg-1-0");
    }
}
