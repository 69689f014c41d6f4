use crate::UrlError;
use url::Url;

/// Normalizes a URL for frontier deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Validate scheme (only HTTP and HTTPS are crawlable)
/// 3. Lowercase the host
/// 4. Strip the trailing slash from the path (except for the root `/`)
/// 5. Remove the fragment (everything after `#`)
/// 6. Sort query parameters alphabetically; drop an empty query string
///
/// The scheme is kept as-is: `http://` and `https://` versions of a page are
/// distinct targets, since a server may answer them differently.
///
/// # Examples
///
/// ```
/// use skein::url::normalize_url;
///
/// let url = normalize_url("https://Example.COM/page/?b=2&a=1#frag").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    // Url::parse already lowercases registered hosts, but set it explicitly
    // so IP-literal and punycode edge cases go through one code path.
    match url.host_str() {
        Some(host) => {
            let lowered = host.to_lowercase();
            url.set_host(Some(&lowered))
                .map_err(|e| UrlError::Parse(e.to_string()))?;
        }
        None => return Err(UrlError::MissingHost),
    }

    let path = strip_trailing_slash(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.sort();

        if params.is_empty() {
            url.set_query(None);
        } else {
            let query = params
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.clone()
                    } else {
                        format!("{}={}", k, v)
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
    }

    Ok(url)
}

/// Removes the trailing slash from a path, keeping the root `/` intact
fn strip_trailing_slash(path: &str) -> String {
    if path.len() > 1 && path.ends_with('/') {
        path[..path.len() - 1].to_string()
    } else if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
