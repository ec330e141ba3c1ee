// feed2influx - Load NWS and USGS observations into InfluxDB
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::client::ClientError;
use clap::ValueEnum;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// Minimum magnitude of earthquakes included in a summary feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedSize {
    #[value(name = "significant")]
    Significant,
    #[value(name = "4.5")]
    M4_5,
    #[value(name = "2.5")]
    M2_5,
    #[value(name = "1.0")]
    M1_0,
    #[value(name = "all")]
    All,
}

impl FeedSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Significant => "significant",
            Self::M4_5 => "4.5",
            Self::M2_5 => "2.5",
            Self::M1_0 => "1.0",
            Self::All => "all",
        }
    }
}

impl fmt::Display for FeedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Period of time covered by a summary feed, ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedWindow {
    Hour,
    Day,
    Week,
    Month,
}

impl FeedWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for FeedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for the USGS earthquake GeoJSON summary feeds.
#[derive(Debug)]
pub struct UsgsClient {
    client: Client,
    base_url: Url,
}

impl UsgsClient {
    const USER_AGENT: &'static str = "feed2influx (https://github.com/56quarters/feed2influx)";
    const JSON_RESPONSE: &'static str = "application/geo+json";

    pub fn new(client: Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_owned()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(UsgsClient { client, base_url })
    }

    pub async fn events(&self, size: FeedSize, window: FeedWindow) -> Result<Vec<EventFeature>, ClientError> {
        let request_url = self.feed_url(size, window);
        tracing::info!(message = "making earthquake feed request", url = %request_url);

        let res = self
            .client
            .get(request_url.clone())
            .header(USER_AGENT, Self::USER_AGENT)
            .header(ACCEPT, Self::JSON_RESPONSE)
            .send()
            .await
            .map_err(ClientError::Internal)?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(ClientError::Unexpected(status, request_url));
        }

        let collection = res.json::<EventCollection>().await.map_err(ClientError::Internal)?;
        Ok(collection.features)
    }

    fn feed_url(&self, size: FeedSize, window: FeedWindow) -> Url {
        let mut url = self.base_url.clone();
        {
            url.path_segments_mut()
                .map(|mut p| {
                    p.pop_if_empty().push(&format!("{}_{}.geojson", size, window));
                })
                .expect("unable to modify feed URL path segments");
        }

        url
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EventCollection {
    #[serde(alias = "features")]
    pub features: Vec<EventFeature>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EventFeature {
    #[serde(alias = "id", default)]
    pub id: String,
    #[serde(alias = "properties")]
    pub properties: EventProperties,
    #[serde(alias = "geometry")]
    pub geometry: EventGeometry,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EventProperties {
    #[serde(alias = "mag")]
    pub mag: Option<Number>,
    #[serde(alias = "place")]
    pub place: String,
    /// Origin time in milliseconds since the epoch
    #[serde(alias = "time")]
    pub time: i64,
}

/// Longitude, latitude, and depth (km) of the event.
#[derive(Serialize, Deserialize, Debug)]
pub struct EventGeometry {
    #[serde(alias = "coordinates")]
    pub coordinates: [Number; 3],
}
