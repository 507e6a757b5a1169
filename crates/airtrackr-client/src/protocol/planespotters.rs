// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! planespotters.net photo lookup responses.

use serde::Deserialize;

use super::{Photo, PhotoLookup, Thumbnail};

#[derive(Debug, Deserialize)]
struct PlanespottersResponse {
    #[serde(default)]
    photos: Option<Vec<PhotoInfo>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PhotoInfo {
    #[serde(default)]
    id: String,
    thumbnail: ThumbnailInfo,
    thumbnail_large: ThumbnailInfo,
    link: String,
    photographer: String,
}

#[derive(Debug, Deserialize)]
struct ThumbnailInfo {
    src: String,
    #[serde(default)]
    size: Option<ThumbnailSize>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailSize {
    width: u32,
    height: u32,
}

impl From<ThumbnailInfo> for Thumbnail {
    fn from(info: ThumbnailInfo) -> Self {
        let (width, height) = info.size.map_or((0, 0), |s| (s.width, s.height));
        Self {
            src: info.src,
            width,
            height,
        }
    }
}

/// Decode a photo lookup body, taking the first photo if there is one.
pub fn decode_photos(body: &[u8]) -> Result<PhotoLookup, serde_json::Error> {
    let response: PlanespottersResponse = serde_json::from_slice(body)?;

    if let Some(error) = response.error {
        log::debug!("Photo lookup returned error payload: {error}");
        return Ok(PhotoLookup::Unavailable);
    }

    Ok(response
        .photos
        .unwrap_or_default()
        .into_iter()
        .next()
        .map_or(PhotoLookup::Unavailable, |photo| {
            PhotoLookup::Found(Photo {
                id: photo.id,
                thumbnail: photo.thumbnail.into(),
                thumbnail_large: photo.thumbnail_large.into(),
                link: photo.link,
                photographer: photo.photographer,
            })
        }))
}
