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

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::error;
use std::fmt;

/// Error fetching or decoding a response from one of the upstream data APIs.
#[derive(Debug)]
pub enum ClientError {
    Internal(reqwest::Error),
    InvalidStation(String, StatusCode),
    InvalidUrl(String),
    Malformed(String),
    Unexpected(StatusCode, Url),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal(e) => write!(f, "{}", e),
            Self::InvalidStation(s, status) => write!(f, "invalid station {}: {}", s, status),
            Self::InvalidUrl(u) => write!(f, "invalid URL {}", u),
            Self::Malformed(m) => write!(f, "malformed response: {}", m),
            Self::Unexpected(status, url) => write!(f, "unexpected status {} for {}", status, url),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Internal(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct WeatherGovClient {
    client: Client,
    base_url: Url,
}

impl WeatherGovClient {
    const USER_AGENT: &'static str = "feed2influx (https://github.com/56quarters/feed2influx)";
    const JSON_RESPONSE: &'static str = "application/geo+json";

    pub fn new(client: Client, base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_owned()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(WeatherGovClient { client, base_url })
    }

    pub async fn station(&self, station: &str) -> Result<Station, ClientError> {
        let station_url = self.station_url(station);
        tracing::info!(message = "making station information request", url = %station_url);

        let res = self.make_request(station_url).await.map_err(|e| match e {
            ClientError::Unexpected(status, _) if status == StatusCode::NOT_FOUND => {
                ClientError::InvalidStation(station.to_owned(), status)
            }
            e => e,
        })?;

        res.json::<Station>().await.map_err(ClientError::Internal)
    }

    /// Fetch the county zone a station belongs to.
    ///
    /// The API hands out the county as a full URL on the station resource so it is
    /// requested as-is rather than being built from the base URL.
    pub async fn county(&self, county_url: &str) -> Result<County, ClientError> {
        let url = Url::parse(county_url).map_err(|_| ClientError::InvalidUrl(county_url.to_owned()))?;
        tracing::info!(message = "making county information request", url = %url);

        let res = self.make_request(url).await?;
        res.json::<County>().await.map_err(ClientError::Internal)
    }

    pub async fn observations(&self, station: &str) -> Result<Vec<ObservationFeature>, ClientError> {
        let request_url = self.observation_url(station);
        tracing::info!(message = "making observations request", url = %request_url);

        let res = self.make_request(request_url).await?;
        let collection = res.json::<ObservationCollection>().await.map_err(ClientError::Internal)?;
        Ok(collection.features)
    }

    async fn make_request(&self, url: Url) -> Result<Response, ClientError> {
        let res = self
            .client
            .get(url.clone())
            .header(USER_AGENT, Self::USER_AGENT)
            .header(ACCEPT, Self::JSON_RESPONSE)
            .send()
            .await
            .map_err(ClientError::Internal)?;

        let status = res.status();
        if status == StatusCode::OK {
            Ok(res)
        } else {
            Err(ClientError::Unexpected(status, url))
        }
    }

    fn station_url(&self, station: &str) -> Url {
        let encoded_station = utf8_percent_encode(station, NON_ALPHANUMERIC);
        let mut url = self.base_url.clone();
        {
            url.path_segments_mut()
                .map(|mut p| {
                    p.clear().push("stations").push(&encoded_station.to_string());
                })
                .expect("unable to modify station URL path segments");
        }

        url
    }

    fn observation_url(&self, station: &str) -> Url {
        let mut url = self.station_url(station);
        {
            url.path_segments_mut()
                .map(|mut p| {
                    p.push("observations");
                })
                .expect("unable to modify observation URL path segments");
        }

        url
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Station {
    #[serde(alias = "id")]
    pub id: String,
    #[serde(alias = "properties")]
    pub properties: StationProperties,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StationProperties {
    #[serde(alias = "stationIdentifier")]
    pub station_identifier: String,
    #[serde(alias = "name")]
    pub name: String,
    #[serde(alias = "county")]
    pub county: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct County {
    #[serde(alias = "id")]
    pub id: String,
    #[serde(alias = "properties")]
    pub properties: CountyProperties,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CountyProperties {
    #[serde(alias = "name")]
    pub name: String,
    #[serde(alias = "state")]
    pub state: String,
    #[serde(alias = "cwa")]
    pub cwa: Vec<String>,
    #[serde(alias = "timeZone")]
    pub time_zone: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ObservationCollection {
    #[serde(alias = "features")]
    pub features: Vec<ObservationFeature>,
}

/// A single time stamped observation from a station.
///
/// Properties are kept as raw JSON in document order since the set of measurements
/// varies between stations. Use [`ObservationFeature::measurements`] to pick out the
/// ones that carry a value and a unit.
#[derive(Serialize, Deserialize, Debug)]
pub struct ObservationFeature {
    #[serde(alias = "properties")]
    pub properties: Map<String, Value>,
}

impl ObservationFeature {
    pub fn timestamp(&self) -> Option<&str> {
        self.properties.get("timestamp").and_then(Value::as_str)
    }

    /// Iterate over every object property, in document order, decoded as a measurement.
    ///
    /// Properties that aren't objects (station URL, text description, cloud layers, etc.)
    /// are not included. Measurements without a value are decoded with a `value` of `None`.
    /// Objects that don't decode as a measurement, such as one with a non-numeric `value`,
    /// are included as errors so callers can account for them.
    pub fn measurements(&self) -> impl Iterator<Item = (&str, Result<Measurement, serde_json::Error>)> + '_ {
        self.properties
            .iter()
            .filter(|(_, v)| v.is_object())
            .map(|(k, v)| (k.as_str(), Measurement::deserialize(v)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Measurement {
    #[serde(alias = "unitCode")]
    pub unit_code: String,
    #[serde(alias = "value")]
    pub value: Option<Number>,
    #[serde(alias = "qualityControl")]
    pub quality_control: Option<String>,
}
