use url::Url;

const SEGMENT_NAMESPACE: &str = "/videos/";
const SEGMENT_EXT: &str = ".m4s";

/// Whether a URL is eligible for caching.
///
/// Segments live under the media namespace and carry the segment
/// extension; manifests and anything else stay uncached.
pub fn in_scope(url: &Url) -> bool {
    let path = url.path();
    path.contains(SEGMENT_NAMESPACE) && path.ends_with(SEGMENT_EXT)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("http://cdn/videos/v1/360p/chunk_00001.m4s", true)]
    #[case("http://cdn/videos/v1/360p/init.m4s", true)]
    #[case("http://cdn/videos/v1/manifest.json", false)]
    #[case("http://cdn/assets/logo.m4s", false)]
    #[case("http://cdn/videos/v1/poster.jpg", false)]
    #[case("http://cdn/videos/v1/360p/chunk_00001.m4s?token=x", true)]
    fn scope_predicate(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(in_scope(&Url::parse(url).unwrap()), expected);
    }
}
