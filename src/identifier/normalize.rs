use crate::UrlError;
use url::Url;

/// Desktop hosts and the mobile host that serves the same post
///
/// The mobile variant renders a flatter document, so every identifier is
/// pinned to it.
const MOBILE_HOSTS: &[(&str, &str)] = &[("blog.naver.com", "m.blog.naver.com")];

/// Query parameters that never change which post is served
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "ref", "trackingCode", "from"];

/// Normalizes a post URL into its canonical mobile form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP(S) scheme and a host
/// 3. Lowercase the host and strip a `www.` prefix
/// 4. Rewrite desktop blog hosts to their mobile host
/// 5. Remove empty path segments and the trailing slash (except for root /)
/// 6. Remove the fragment
/// 7. Remove tracking query parameters and sort the remaining ones
///
/// Applying the normalization to its own output yields the same URL.
///
/// # Examples
///
/// ```
/// use blog_harvest::identifier::normalize_post_url;
///
/// let url = normalize_post_url("https://blog.naver.com/someone/223775190985").unwrap();
/// assert_eq!(url.as_str(), "https://m.blog.naver.com/someone/223775190985");
/// ```
pub fn normalize_post_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    let host = mobile_host(&host).unwrap_or(&host).to_string();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Returns the mobile host for a known desktop host
fn mobile_host(host: &str) -> Option<&'static str> {
    MOBILE_HOSTS
        .iter()
        .find(|(desktop, _)| *desktop == host)
        .map(|(_, mobile)| *mobile)
}

/// Collapses empty segments and drops the trailing slash
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
