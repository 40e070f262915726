//! Share links
//!
//! A share link is any URL carrying the transport string in the `data` query
//! parameter, plus `compressed=true` when the payload is gzipped.

use thiserror::Error;
use url::Url;

use super::codec::{self, DecodeError, EncodeError};
use crate::domain::{Record, Snapshot};

pub const DATA_PARAM: &str = "data";
pub const COMPRESSED_PARAM: &str = "compressed";

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Link has no 'data' parameter")]
    MissingData,

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Transport string plus its compression flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub data: String,
    pub compressed: bool,
}

impl ShareLink {
    /// Encodes a snapshot into a link payload
    pub fn from_snapshot(snapshot: &[Record], compressed: bool) -> Result<Self, EncodeError> {
        Ok(Self {
            data: codec::encode(snapshot, compressed)?,
            compressed,
        })
    }

    /// Reads the share parameters from a URL, if present
    pub fn from_url(url: &Url) -> Option<Self> {
        let mut data = None;
        let mut compressed = false;
        for (key, value) in url.query_pairs() {
            match &*key {
                DATA_PARAM => data = Some(value.into_owned()),
                COMPRESSED_PARAM => compressed = value == "true",
                _ => {}
            }
        }
        data.map(|data| Self { data, compressed })
    }

    /// Accepts either a full link or a bare transport string.
    ///
    /// A bare transport string carries no flag, so `compressed` is used.
    pub fn parse(input: &str, compressed: bool) -> Result<Self, LinkError> {
        let input = input.trim();
        match Url::parse(input) {
            Ok(url) => Self::from_url(&url).ok_or(LinkError::MissingData),
            Err(_) => Ok(Self {
                data: input.to_string(),
                compressed,
            }),
        }
    }

    /// Builds the shareable URL on top of `base`
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = strip_share_params(base);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(DATA_PARAM, &self.data);
            if self.compressed {
                pairs.append_pair(COMPRESSED_PARAM, "true");
            }
        }
        url
    }

    pub fn decode(&self) -> Result<Snapshot, DecodeError> {
        codec::decode(&self.data, self.compressed)
    }
}

/// Builds a share link for `snapshot` rooted at `base_url`
pub fn build_share_link(base_url: &str, snapshot: &[Record], compressed: bool) -> Result<Url, LinkError> {
    let base = Url::parse(base_url).map_err(|source| LinkError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;
    Ok(ShareLink::from_snapshot(snapshot, compressed)?.to_url(&base))
}

/// Returns `url` without the share parameters, keeping any others
pub fn strip_share_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !matches!(&**k, DATA_PARAM | COMPRESSED_PARAM))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}
