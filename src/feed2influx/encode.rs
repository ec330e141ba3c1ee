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

use crate::client::ObservationFeature;
use crate::line::{Point, Precision};
use crate::station::StationInfo;
use crate::usgs::EventFeature;
use chrono::{DateTime, NaiveDateTime};
use std::error;
use std::fmt;
use std::io::{self, Write};

const SKIPPED_MEASUREMENTS: &[&str] = &["elevation"];
const EVENT_MEASUREMENT: &str = "event";
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y%m%dT%H%M%S%.f"];
const BASIC_OFFSET_FORMAT: &str = "%Y%m%dT%H%M%S%.f%z";

#[derive(Debug)]
pub enum EncodeError {
    Io(io::Error),
    Timestamp(String, chrono::ParseError),
    MissingTimestamp,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "unable to write line protocol: {}", e),
            Self::Timestamp(ts, e) => write!(f, "invalid timestamp {}: {}", ts, e),
            Self::MissingTimestamp => write!(f, "observation without a timestamp"),
        }
    }
}

impl error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Timestamp(_, e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        EncodeError::Io(e)
    }
}

/// Number of lines written and records skipped by an encoder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    pub lines: usize,
    pub skipped: usize,
}

impl EncodeStats {
    pub fn merge(&mut self, other: EncodeStats) {
        self.lines += other.lines;
        self.skipped += other.skipped;
    }
}

/// Parse an ISO-8601 timestamp into whole seconds since the epoch.
///
/// RFC 3339 (what api.weather.gov sends) is tried first, then the basic format
/// (`20230101T000000+0000`). Timestamps with a `Z` suffix or without any offset
/// are taken to be UTC. The error reported is the one from RFC 3339 parsing.
pub fn iso_to_timestamp(ts: &str) -> Result<i64, EncodeError> {
    let rfc3339_err = match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => return Ok(dt.timestamp()),
        Err(e) => e,
    };

    if let Ok(dt) = DateTime::parse_from_str(ts, BASIC_OFFSET_FORMAT) {
        return Ok(dt.timestamp());
    }

    let naive = ts.strip_suffix('Z').unwrap_or(ts);
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(naive, f).ok())
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| EncodeError::Timestamp(ts.to_owned(), rfc3339_err))
}

/// Encodes station observations as one line per measurement with a value.
///
/// Each line is tagged with station metadata and the unit of the measurement and
/// has a single `value` field. Timestamps are in seconds.
#[derive(Debug)]
pub struct WeatherEncoder<'a> {
    station: &'a StationInfo,
}

impl<'a> WeatherEncoder<'a> {
    pub const PRECISION: Precision = Precision::Seconds;

    pub fn new(station: &'a StationInfo) -> Self {
        WeatherEncoder { station }
    }

    pub fn points(&self, feature: &ObservationFeature) -> Result<(Vec<Point>, usize), EncodeError> {
        let mut points = Vec::new();
        let mut skipped = 0;
        let mut timestamp = None;

        for (name, measurement) in feature.measurements() {
            if SKIPPED_MEASUREMENTS.contains(&name) {
                continue;
            }

            let measurement = match measurement {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(message = "skipping property that isn't a measurement", property = %name, error = %e);
                    skipped += 1;
                    continue;
                }
            };

            let value = match measurement.value {
                Some(v) => v,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            let ts = match timestamp {
                Some(ts) => ts,
                None => {
                    let ts = iso_to_timestamp(feature.timestamp().ok_or(EncodeError::MissingTimestamp)?)?;
                    timestamp = Some(ts);
                    ts
                }
            };

            points.push(
                self.tagged(Point::new(name, ts))
                    .tag("unit", &measurement.unit_code)
                    .field("value", value),
            );
        }

        Ok((points, skipped))
    }

    pub fn encode<W: Write>(&self, features: &[ObservationFeature], out: &mut W) -> Result<EncodeStats, EncodeError> {
        let mut stats = EncodeStats::default();

        for feature in features {
            let (points, skipped) = self.points(feature)?;
            for p in points {
                writeln!(out, "{}", p)?;
                stats.lines += 1;
            }

            stats.skipped += skipped;
        }

        tracing::debug!(
            message = "encoded observations",
            station = %self.station.station_id,
            lines = stats.lines,
            skipped = stats.skipped,
        );

        Ok(stats)
    }

    fn tagged(&self, point: Point) -> Point {
        point
            .tag_escaped("station", &self.station.station_id)
            .tag_escaped("name", &self.station.name())
            .tag_escaped("cwa", &self.station.cwa)
            .tag_escaped("county", &self.station.county)
            .tag_escaped("state", &self.station.state)
            .tag_escaped("tz", &self.station.timezone)
    }
}

/// Encodes earthquake events as one `event` line each.
///
/// Events without a magnitude are logged and skipped. Timestamps are the event
/// origin time in milliseconds, unchanged.
#[derive(Debug, Default)]
pub struct EventEncoder;

impl EventEncoder {
    pub const PRECISION: Precision = Precision::Milliseconds;

    pub fn new() -> Self {
        EventEncoder
    }

    pub fn point(&self, feature: &EventFeature) -> Option<Point> {
        let mag = feature.properties.mag.as_ref()?;
        let [lon, lat, depth] = &feature.geometry.coordinates;

        Some(
            Point::new(EVENT_MEASUREMENT, feature.properties.time)
                .tag("latitude", lat)
                .tag("longitude", lon)
                .tag_escaped("place", &feature.properties.place)
                .tag_escaped("magnitude", &mag.to_string())
                .field("magnitude", mag)
                .field("depth", depth),
        )
    }

    pub fn encode<W: Write>(&self, features: &[EventFeature], out: &mut W) -> Result<EncodeStats, EncodeError> {
        let mut stats = EncodeStats::default();

        for feature in features {
            match self.point(feature) {
                Some(p) => {
                    tracing::debug!(message = "encoded event", line = %p);
                    writeln!(out, "{}", p)?;
                    stats.lines += 1;
                }
                None => {
                    tracing::error!(message = "bad event without magnitude", event = %feature.id, place = %feature.properties.place);
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }
}
