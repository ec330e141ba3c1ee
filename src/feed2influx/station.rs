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

use crate::client::{ClientError, County, Station, WeatherGovClient};

/// Flattened metadata about a weather station and the county it's in.
///
/// Built from two requests: the station itself and the county zone it links to.
/// Every observation line for the station is tagged with these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationInfo {
    pub station_id: String,
    pub station_name: Vec<String>,
    pub county: String,
    pub state: String,
    pub cwa: String,
    pub timezone: String,
}

impl StationInfo {
    /// Combine station and county responses, using the first CWA and timezone listed.
    pub fn from_responses(station: Station, county: County) -> Result<Self, ClientError> {
        let mut cwa = county.properties.cwa.into_iter();
        let mut tz = county.properties.time_zone.into_iter();

        Ok(StationInfo {
            station_id: station.properties.station_identifier,
            station_name: station.properties.name.split(',').map(String::from).collect(),
            county: county.properties.name,
            state: county.properties.state,
            cwa: cwa
                .next()
                .ok_or_else(|| ClientError::Malformed(format!("no cwa for {}", county.id)))?,
            timezone: tz
                .next()
                .ok_or_else(|| ClientError::Malformed(format!("no timeZone for {}", county.id)))?,
        })
    }

    /// Station name as a single string, the way the API returned it.
    pub fn name(&self) -> String {
        self.station_name.join(",")
    }
}

/// Look up a station and its county, failing if either request fails.
pub async fn resolve(client: &WeatherGovClient, station: &str) -> Result<StationInfo, ClientError> {
    let station = client.station(station).await?;
    let county = client.county(&station.properties.county).await?;
    let info = StationInfo::from_responses(station, county)?;

    tracing::debug!(message = "resolved station information", station = ?info);
    Ok(info)
}
