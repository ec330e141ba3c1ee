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

use crate::client::{ClientError, WeatherGovClient};
use crate::encode::{EncodeError, EncodeStats, EventEncoder, WeatherEncoder};
use crate::station;
use crate::usgs::{FeedSize, FeedWindow, UsgsClient};
use std::error;
use std::fmt;
use std::io::Write;

#[derive(Debug)]
pub enum DumpError {
    NoStations,
    Client(ClientError),
    Encode(EncodeError),
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStations => write!(f, "no stations specified"),
            Self::Client(e) => write!(f, "{}", e),
            Self::Encode(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for DumpError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Client(e) => Some(e),
            Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClientError> for DumpError {
    fn from(e: ClientError) -> Self {
        DumpError::Client(e)
    }
}

impl From<EncodeError> for DumpError {
    fn from(e: EncodeError) -> Self {
        DumpError::Encode(e)
    }
}

/// Fetch observations for each station in turn and write them to `out` as line protocol.
///
/// Stations are resolved and their observations fetched one at a time, in the order
/// given. Any failed request stops the dump. `out` is flushed and dropped once every
/// station has been written.
pub async fn dump_observations<W: Write>(
    client: &WeatherGovClient,
    stations: &[String],
    mut out: W,
) -> Result<EncodeStats, DumpError> {
    if stations.is_empty() {
        return Err(DumpError::NoStations);
    }

    let mut stats = EncodeStats::default();
    for id in stations {
        let info = station::resolve(client, id).await?;
        let features = client.observations(id).await?;
        let encoder = WeatherEncoder::new(&info);

        stats.merge(encoder.encode(&features, &mut out)?);
        tracing::info!(message = "wrote observations", station = %id, features = features.len(), lines = stats.lines);
    }

    out.flush().map_err(EncodeError::Io)?;
    Ok(stats)
}

/// Fetch a USGS summary feed and write each event to `out` as line protocol.
///
/// Events without a magnitude are skipped and the rest are still written. `out` is
/// flushed and dropped at the end either way.
pub async fn dump_events<W: Write>(
    client: &UsgsClient,
    size: FeedSize,
    window: FeedWindow,
    mut out: W,
) -> Result<EncodeStats, DumpError> {
    let features = client.events(size, window).await?;
    let stats = EventEncoder::new().encode(&features, &mut out)?;
    out.flush().map_err(EncodeError::Io)?;

    tracing::info!(message = "wrote events", size = %size, window = %window, lines = stats.lines, skipped = stats.skipped);
    Ok(stats)
}
