//! Unsplash search response types and normalization.

use pixcache_core::{Attribution, ImageUrls, Item, SearchPage};
use serde::Deserialize;

/// Raw body of `GET /search/photos`.
#[derive(Debug, Deserialize)]
pub struct SearchResponseDto {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    pub results: Vec<PhotoDto>,
}

/// A photo as returned by the API.
#[derive(Debug, Deserialize)]
pub struct PhotoDto {
    pub id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub blur_hash: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alt_description: Option<String>,
    pub urls: UrlsDto,
    pub user: UserDto,
    #[serde(default)]
    pub tags: Option<Vec<TagDto>>,
}

#[derive(Debug, Deserialize)]
pub struct UrlsDto {
    pub raw: String,
    pub full: String,
    pub regular: String,
    pub small: String,
    pub thumb: String,
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image: Option<ProfileImageDto>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileImageDto {
    pub small: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Deserialize)]
pub struct TagDto {
    pub title: String,
}

impl From<PhotoDto> for Item {
    fn from(dto: PhotoDto) -> Self {
        Item {
            id: dto.id,
            width: dto.width,
            height: dto.height,
            color: dto.color,
            blur_hash: dto.blur_hash,
            description: dto.description,
            alt_description: dto.alt_description,
            urls: ImageUrls {
                raw: dto.urls.raw,
                full: dto.urls.full,
                regular: dto.urls.regular,
                small: dto.urls.small,
                thumb: dto.urls.thumb,
            },
            user: Attribution {
                name: dto.user.name,
                username: dto.user.username,
                bio: dto.user.bio,
                profile_image: dto.user.profile_image.map(|p| p.medium),
            },
            tags: dto
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| t.title)
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

impl From<SearchResponseDto> for SearchPage {
    fn from(raw: SearchResponseDto) -> Self {
        SearchPage {
            items: raw.results.into_iter().map(Item::from).collect(),
            total: raw.total,
            total_pages: raw.total_pages,
        }
    }
}
