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

//! Load weather observations and earthquake events into InfluxDB
//!
//! ## Features
//!
//! `feed2influx` fetches data from two public sources and converts it to InfluxDB [line protocol]:
//!
//! * `nws2influx` - Observations from one or more [NWS stations] via the [api.weather.gov] API.
//!   Each measurement with a value becomes a line named after the measurement (`temperature`,
//!   `dewpoint`, etc.) tagged with the station, its name, CWA, county, state, timezone, and the unit
//!   of the measurement. Timestamps are in seconds.
//! * `usgs2influx` - Earthquakes from the [USGS summary feeds]. Each event becomes an `event` line
//!   tagged with latitude, longitude, place, and magnitude with `magnitude` and `depth` fields.
//!   Timestamps are in milliseconds.
//!
//! Both tools work in two steps. Data is first dumped to a file with `--output`. The file can then be
//! loaded into InfluxDB with `--input`, which creates the database if it doesn't exist and writes the
//! file as-is.
//!
//! [line protocol]: https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/
//! [NWS stations]: https://www.weather.gov/documentation/services-web-api#/default/obs_stations
//! [api.weather.gov]: https://www.weather.gov/documentation/services-web-api
//! [USGS summary feeds]: https://earthquake.usgs.gov/earthquakes/feed/v1.0/geojson.php
//!
//! ## Build
//!
//! `feed2influx` is a Rust program and must be built from source using a [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! git clone git@github.com:56quarters/feed2influx.git && cd feed2influx
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! ### Weather
//!
//! Pick one or more stations (the `properties.stationIdentifier` field of a station returned by
//! `https://api.weather.gov/stations?state=MA`) and dump their recent observations.
//!
//! ```text
//! ./nws2influx --stations KBOS,KORH --output weather.txt
//! ```
//!
//! Then load them into a database named `weather`, dropping anything already there.
//!
//! ```text
//! ./nws2influx --db weather --drop --input weather.txt
//! ```
//!
//! ### Earthquakes
//!
//! Pick a feed by minimum size (`significant`, `4.5`, `2.5`, `1.0`, or `all`) and window (`hour`,
//! `day`, `week`, or `month`), dump it, and load it.
//!
//! ```text
//! ./usgs2influx --size 2.5 --window day --output quakes.txt
//! ./usgs2influx --db earthquakes --input quakes.txt
//! ```
//!
//! Both tools talk to InfluxDB at `localhost:8086` by default, use `--host` and `--port` to change it.
//! Passing `-` to `--output` or `--input` uses stdout or stdin.
//!

pub mod cli;
pub mod client;
pub mod dump;
pub mod encode;
pub mod influx;
pub mod line;
pub mod station;
pub mod usgs;
