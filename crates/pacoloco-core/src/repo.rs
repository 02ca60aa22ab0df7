//! Upstream repository definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::access::{self, AccessMode};
use crate::error::ConfigError;

/// One upstream repository
///
/// Exactly one of `url`, `urls` or `mirrorlist` must be set. Empty values
/// count as unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    /// Single mirror URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Mirror URLs tried in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    /// Path to a pacman-style mirrorlist file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirrorlist: Option<PathBuf>,
    /// When the mirrorlist was last re-read (runtime only)
    #[serde(skip)]
    pub last_mirrorlist_check: Option<DateTime<Utc>>,
    /// Modification time of the mirrorlist at last read (runtime only)
    #[serde(skip)]
    pub last_modification_time: Option<DateTime<Utc>>,
}

/// Name of a repository source parameter, as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceField {
    Url,
    Urls,
    Mirrorlist,
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceField::Url => "url",
            SourceField::Urls => "urls",
            SourceField::Mirrorlist => "mirrorlist",
        };
        f.write_str(s)
    }
}

/// The configured source of a validated repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoSource<'a> {
    Url(&'a str),
    Urls(&'a [String]),
    Mirrorlist(&'a Path),
}

impl Repo {
    fn url_value(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    fn mirrorlist_path(&self) -> Option<&Path> {
        self.mirrorlist
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// The source this repository is fetched from
    ///
    /// Returns the first source set, which is the only one once the repo
    /// has passed [`Repo::validate`].
    pub fn source(&self) -> Option<RepoSource<'_>> {
        if let Some(url) = self.url_value() {
            Some(RepoSource::Url(url))
        } else if !self.urls.is_empty() {
            Some(RepoSource::Urls(&self.urls))
        } else {
            self.mirrorlist_path().map(RepoSource::Mirrorlist)
        }
    }

    /// Check that exactly one source is configured and that a mirrorlist,
    /// if used, is readable
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let present = [
            (SourceField::Url, self.url_value().is_some()),
            (SourceField::Urls, !self.urls.is_empty()),
            (SourceField::Mirrorlist, self.mirrorlist_path().is_some()),
        ];

        // Pairs in order: url/urls, url/mirrorlist, urls/mirrorlist
        for (i, &(first, first_set)) in present.iter().enumerate() {
            for &(second, second_set) in &present[i + 1..] {
                if first_set && second_set {
                    return Err(ConfigError::ConflictingRepoSource {
                        repo: name.to_string(),
                        first,
                        second,
                    });
                }
            }
        }

        if !present.iter().any(|&(_, set)| set) {
            return Err(ConfigError::MissingRepoSource {
                repo: name.to_string(),
            });
        }

        if let Some(path) = self.mirrorlist_path()
            && !access::is_accessible(path, AccessMode::Read)
        {
            let user = access::current_user()?;
            return Err(ConfigError::UnreadableMirrorlist {
                repo: name.to_string(),
                path: path.to_path_buf(),
                user,
            });
        }

        debug!("Repo '{}' validated", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn repo(url: Option<&str>, urls: &[&str], mirrorlist: Option<&Path>) -> Repo {
        Repo {
            url: url.map(|u| u.to_string()),
            urls: urls.iter().map(|u| u.to_string()).collect(),
            mirrorlist: mirrorlist.map(|p| p.to_path_buf()),
            ..Default::default()
        }
    }

    fn assert_conflict(result: Result<(), ConfigError>, expected: (SourceField, SourceField)) {
        match result {
            Err(ConfigError::ConflictingRepoSource { repo, first, second }) => {
                assert_eq!(repo, "archlinux");
                assert_eq!((first, second), expected);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_single_url() {
        let r = repo(Some("https://a"), &[], None);
        assert!(r.validate("archlinux").is_ok());
        assert_eq!(r.source(), Some(RepoSource::Url("https://a")));
    }

    #[test]
    fn test_url_list() {
        let r = repo(None, &["https://a", "https://b"], None);
        assert!(r.validate("archlinux").is_ok());
        assert!(matches!(r.source(), Some(RepoSource::Urls(urls)) if urls.len() == 2));
    }

    #[test]
    fn test_readable_mirrorlist() {
        let file = NamedTempFile::new().unwrap();
        let r = repo(None, &[], Some(file.path()));
        assert!(r.validate("archlinux").is_ok());
        assert_eq!(r.source(), Some(RepoSource::Mirrorlist(file.path())));
    }

    #[test]
    fn test_conflicts_reported_in_order() {
        let file = NamedTempFile::new().unwrap();

        assert_conflict(
            repo(Some("https://a"), &["https://b"], None).validate("archlinux"),
            (SourceField::Url, SourceField::Urls),
        );
        assert_conflict(
            repo(Some("https://a"), &[], Some(file.path())).validate("archlinux"),
            (SourceField::Url, SourceField::Mirrorlist),
        );
        assert_conflict(
            repo(None, &["https://b"], Some(file.path())).validate("archlinux"),
            (SourceField::Urls, SourceField::Mirrorlist),
        );
        // All three set: url/urls is detected first
        assert_conflict(
            repo(Some("https://a"), &["https://b"], Some(file.path())).validate("archlinux"),
            (SourceField::Url, SourceField::Urls),
        );
    }

    #[test]
    fn test_missing_source() {
        let err = repo(None, &[], None).validate("archlinux").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRepoSource { ref repo } if repo == "archlinux"));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let r = repo(Some(""), &[], Some(Path::new("")));
        assert!(matches!(
            r.validate("archlinux"),
            Err(ConfigError::MissingRepoSource { .. })
        ));
        assert_eq!(r.source(), None);

        // An empty url next to a real list is not a conflict
        let r = repo(Some(""), &["https://b"], None);
        assert!(r.validate("archlinux").is_ok());
    }

    #[test]
    fn test_unreadable_mirrorlist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("mirrorlist");

        let err = repo(None, &[], Some(&missing))
            .validate("archlinux")
            .unwrap_err();
        match err {
            ConfigError::UnreadableMirrorlist { repo, path, user } => {
                assert_eq!(repo, "archlinux");
                assert_eq!(path, missing);
                assert_eq!(user, access::current_user().unwrap());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_runtime_fields_not_serialized() {
        let mut r = repo(Some("https://a"), &[], None);
        r.last_mirrorlist_check = Some(Utc::now());
        let yaml = serde_yaml::to_string(&r).unwrap();
        assert!(!yaml.contains("last_"));
        assert_eq!(yaml.trim(), "url: https://a");
    }
}
