pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const PLACEHOLDER_IMAGE: &str = "/no-image.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    Original,
}

impl ImageSize {
    pub fn bucket(&self) -> &'static str {
        match self {
            ImageSize::Small => "w185",
            ImageSize::Medium => "w342",
            ImageSize::Large => "w500",
            ImageSize::Original => "original",
        }
    }
}

/// CDN URL for a catalog-relative image path, or the local placeholder when there is none.
pub fn image_url(size: ImageSize, path: Option<&str>) -> String {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) if p.starts_with('/') => format!("{IMAGE_BASE}/{}{p}", size.bucket()),
        Some(p) => format!("{IMAGE_BASE}/{}/{p}", size.bucket()),
        None => PLACEHOLDER_IMAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_sized_cdn_urls() {
        assert_eq!(
            image_url(ImageSize::Medium, Some("/abc.jpg")),
            "https://image.tmdb.org/t/p/w342/abc.jpg"
        );
        assert_eq!(
            image_url(ImageSize::Original, Some("abc.jpg")),
            "https://image.tmdb.org/t/p/original/abc.jpg"
        );
        assert_eq!(ImageSize::Small.bucket(), "w185");
        assert_eq!(ImageSize::Large.bucket(), "w500");
    }

    #[test]
    fn falls_back_to_placeholder() {
        assert_eq!(image_url(ImageSize::Large, None), PLACEHOLDER_IMAGE);
        assert_eq!(image_url(ImageSize::Large, Some("")), PLACEHOLDER_IMAGE);
    }
}
