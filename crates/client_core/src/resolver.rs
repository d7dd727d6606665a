//! Image reference resolution against the generation service's image endpoint.

use shared::protocol::IMAGE_ROUTE;
use url::Url;

/// Parses a service address and makes sure its path ends with `/`, so that
/// relative routes are appended to it instead of replacing its last segment.
pub fn service_base(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Canonical identifier of an image reference: the last segment of a `/` or
/// `\` separated path that is neither empty nor `.`/`..`, or the reference
/// itself when it is bare. Returns `""` when no such segment exists.
pub fn image_identifier(image_ref: &str) -> &str {
    image_ref
        .trim()
        .rsplit(|c: char| c == '/' || c == '\\')
        .find(|segment| !matches!(*segment, "" | "." | ".."))
        .unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRefResolver {
    image_base: Url,
}

impl ImageRefResolver {
    pub fn new(service_base: &Url) -> Result<Self, url::ParseError> {
        let image_base = service_base.join(&format!("{IMAGE_ROUTE}/"))?;
        Ok(Self { image_base })
    }

    pub fn image_base(&self) -> &Url {
        &self.image_base
    }

    /// A reference with no usable identifier resolves to the bare
    /// `<base>/image/` route, never to a sibling of it.
    pub fn resolve(&self, image_ref: &str) -> Url {
        let mut url = self.image_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(image_identifier(image_ref));
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(raw: &str) -> ImageRefResolver {
        ImageRefResolver::new(&service_base(raw).expect("base")).expect("resolver")
    }

    #[test]
    fn bare_identifier_is_appended_to_image_route() {
        let url = resolver("http://127.0.0.1:8000").resolve("scene_1.png");
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/image/scene_1.png");
    }

    #[test]
    fn path_like_reference_keeps_only_last_segment() {
        let resolver = resolver("http://127.0.0.1:8000/");
        assert_eq!(
            resolver.resolve("static/story_scene_1.png").as_str(),
            "http://127.0.0.1:8000/image/story_scene_1.png"
        );
        assert_eq!(
            resolver.resolve("C:\\out\\scene.png").as_str(),
            "http://127.0.0.1:8000/image/scene.png"
        );
        assert_eq!(
            resolver.resolve("/abs/dir/scene.png/").as_str(),
            "http://127.0.0.1:8000/image/scene.png"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let url = resolver("https://example.test/api/v1").resolve("a.png");
        assert_eq!(url.as_str(), "https://example.test/api/v1/image/a.png");
    }

    #[test]
    fn identifier_is_percent_encoded() {
        let url = resolver("http://localhost:8000").resolve("my scene?.png");
        assert_eq!(url.as_str(), "http://localhost:8000/image/my%20scene%3F.png");
    }

    #[test]
    fn resolution_is_deterministic() {
        let resolver = resolver("http://localhost:8000");
        assert_eq!(resolver.resolve("x/y.png"), resolver.resolve("y.png"));
    }

    #[test]
    fn service_base_rejects_non_base_urls() {
        assert!(service_base("mailto:someone@example.test").is_err());
        assert!(service_base("not a url").is_err());
    }

    #[test]
    fn image_identifier_handles_blank_input() {
        assert_eq!(image_identifier("   "), "");
        assert_eq!(image_identifier("///"), "");
        assert_eq!(image_identifier(" scene.png "), "scene.png");
        assert_eq!(image_identifier(".."), "");
        assert_eq!(image_identifier("."), "");
        assert_eq!(image_identifier("static/scene.png/.."), "scene.png");
    }

    #[test]
    fn dot_references_stay_under_image_route() {
        let resolver = resolver("http://127.0.0.1:8000/api");
        for image_ref in ["..", ".", "static/..", "  "] {
            assert_eq!(
                resolver.resolve(image_ref).as_str(),
                "http://127.0.0.1:8000/api/image/",
                "{image_ref:?}"
            );
        }
    }
}
