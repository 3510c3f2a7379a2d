/// Site identification: which supported platform a page belongs to
use serde::{Deserialize, Serialize};
use url::Url;

/// A supported site. The serialized form doubles as the preference storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteId {
    #[serde(rename = "youtube")]
    YouTube,
    Facebook,
    Instagram,
    Twitter,
    #[serde(rename = "tiktok")]
    TikTok,
    Pinterest,
}

impl SiteId {
    pub const ALL: [SiteId; 6] = [
        SiteId::YouTube,
        SiteId::Facebook,
        SiteId::Instagram,
        SiteId::Twitter,
        SiteId::TikTok,
        SiteId::Pinterest,
    ];

    /// Storage key and message identifier
    pub fn key(self) -> &'static str {
        match self {
            SiteId::YouTube => "youtube",
            SiteId::Facebook => "facebook",
            SiteId::Instagram => "instagram",
            SiteId::Twitter => "twitter",
            SiteId::TikTok => "tiktok",
            SiteId::Pinterest => "pinterest",
        }
    }

    pub fn from_key(key: &str) -> Option<SiteId> {
        SiteId::ALL.into_iter().find(|site| site.key() == key)
    }

    /// Human readable name used by the settings popup
    pub fn label(self) -> &'static str {
        match self {
            SiteId::YouTube => "YouTube",
            SiteId::Facebook => "Facebook",
            SiteId::Instagram => "Instagram",
            SiteId::Twitter => "Twitter / X",
            SiteId::TikTok => "TikTok",
            SiteId::Pinterest => "Pinterest",
        }
    }

    /// Registrable domains owned by the site
    fn domains(self) -> &'static [&'static str] {
        match self {
            SiteId::YouTube => &["youtube.com"],
            SiteId::Facebook => &["facebook.com"],
            SiteId::Instagram => &["instagram.com"],
            SiteId::Twitter => &["twitter.com", "x.com"],
            SiteId::TikTok => &["tiktok.com"],
            SiteId::Pinterest => &["pinterest.com"],
        }
    }

    /// Subdomains accepted besides the bare domain and `www.`
    fn known_subdomains(self) -> &'static [&'static str] {
        match self {
            SiteId::YouTube => &["m"],
            SiteId::Facebook => &["m"],
            SiteId::Twitter => &["mobile"],
            SiteId::Instagram | SiteId::TikTok | SiteId::Pinterest => &[],
        }
    }

    /// Pinterest serves regional feeds from arbitrary subdomains (uk., de., ...)
    fn accepts_any_subdomain(self) -> bool {
        matches!(self, SiteId::Pinterest)
    }

    fn matches_host(self, host: &str) -> bool {
        self.domains().iter().any(|domain| {
            if host == *domain {
                return true;
            }
            let Some(prefix) = host
                .strip_suffix(domain)
                .and_then(|rest| rest.strip_suffix('.'))
            else {
                return false;
            };
            if prefix.is_empty() {
                return false;
            }
            prefix == "www"
                || self.known_subdomains().contains(&prefix)
                || (self.accepts_any_subdomain() && !prefix.contains('.'))
        })
    }
}

/// Resolve a hostname to a supported site, `None` for everything else
///
/// Examples:
/// - youtube.com, www.youtube.com, m.youtube.com → YouTube
/// - x.com, www.twitter.com → Twitter
/// - uk.pinterest.com → Pinterest
/// - notyoutube.com, youtube.com.evil.net → None
pub fn resolve_site(hostname: &str) -> Option<SiteId> {
    let host = normalize_host(hostname)?;
    SiteId::ALL.into_iter().find(|site| site.matches_host(&host))
}

/// Resolve a full URL (as reported by the tabs API) to a supported site
pub fn resolve_url(href: &str) -> Option<SiteId> {
    let url = Url::parse(href).ok()?;
    resolve_site(url.host_str()?)
}

fn normalize_host(hostname: &str) -> Option<String> {
    let host = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() { None } else { Some(host) }
}

/// The parts of a page address the registry rules look at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageLocation {
    pub host: String,
    pub path: String,
}

impl PageLocation {
    pub fn new(host: &str, path: &str) -> PageLocation {
        PageLocation {
            host: host.to_ascii_lowercase(),
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
        }
    }

    pub fn parse(href: &str) -> Option<PageLocation> {
        let url = Url::parse(href).ok()?;
        Some(PageLocation::new(url.host_str()?, url.path()))
    }

    pub fn site(&self) -> Option<SiteId> {
        resolve_site(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bare_and_www_hosts() {
        let cases = [
            ("youtube.com", SiteId::YouTube),
            ("facebook.com", SiteId::Facebook),
            ("instagram.com", SiteId::Instagram),
            ("twitter.com", SiteId::Twitter),
            ("x.com", SiteId::Twitter),
            ("tiktok.com", SiteId::TikTok),
            ("pinterest.com", SiteId::Pinterest),
        ];

        for (host, expected) in cases {
            assert_eq!(resolve_site(host), Some(expected), "{}", host);
            assert_eq!(resolve_site(&format!("www.{}", host)), Some(expected), "www.{}", host);
        }
    }

    #[test]
    fn test_resolve_known_subdomains() {
        assert_eq!(resolve_site("m.youtube.com"), Some(SiteId::YouTube));
        assert_eq!(resolve_site("m.facebook.com"), Some(SiteId::Facebook));
        assert_eq!(resolve_site("mobile.x.com"), Some(SiteId::Twitter));
        assert_eq!(resolve_site("uk.pinterest.com"), Some(SiteId::Pinterest));
        assert_eq!(resolve_site("de.pinterest.com"), Some(SiteId::Pinterest));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(resolve_site("WWW.YouTube.COM"), Some(SiteId::YouTube));
        assert_eq!(resolve_site("x.com."), Some(SiteId::Twitter));
    }

    #[test]
    fn test_resolve_unsupported_hosts() {
        for host in [
            "",
            "google.com",
            "notyoutube.com",
            "youtube.com.evil.net",
            "music.youtube.com",
            "api.twitter.com",
            "box.com",
            "a.b.pinterest.com",
            "localhost",
        ] {
            assert_eq!(resolve_site(host), None, "{}", host);
        }
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(resolve_url("https://www.youtube.com/watch?v=abc"), Some(SiteId::YouTube));
        assert_eq!(resolve_url("https://x.com/home"), Some(SiteId::Twitter));
        assert_eq!(resolve_url("https://example.com/youtube.com"), None);
        assert_eq!(resolve_url("not a url"), None);
    }

    #[test]
    fn test_site_keys_round_trip() {
        for site in SiteId::ALL {
            assert_eq!(SiteId::from_key(site.key()), Some(site));
            assert_eq!(serde_json::to_value(site).unwrap(), site.key());
        }
        assert_eq!(SiteId::from_key("strict"), None);
    }

    #[test]
    fn test_page_location_parse() {
        let location = PageLocation::parse("https://www.YouTube.com/shorts/abc?x=1").unwrap();

        assert_eq!(location.host, "www.youtube.com");
        assert_eq!(location.path, "/shorts/abc");
        assert_eq!(location.site(), Some(SiteId::YouTube));
    }

    #[test]
    fn test_page_location_empty_path() {
        assert_eq!(PageLocation::new("x.com", "").path, "/");
    }
}
