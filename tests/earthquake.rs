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

mod common;

use axum::http::StatusCode as FakeStatus;
use feed2influx::cli;
use feed2influx::client::ClientError;
use feed2influx::dump::{self, DumpError};
use feed2influx::encode::{EncodeStats, EventEncoder};
use feed2influx::influx::InfluxClient;
use feed2influx::usgs::{FeedSize, FeedWindow, UsgsClient};
use reqwest::{Client, StatusCode};
use std::net::SocketAddr;

const EXPECTED_LINES: &str = "\
event,latitude=38.2,longitude=-120.1,place=10km\\ N\\ of\\ Town,magnitude=4.2 magnitude=4.2,depth=5.0 1700000000000
event,latitude=-17.9,longitude=178.2,place=Fiji\\ region,magnitude=5 magnitude=5,depth=550.25 1700000200000
";

fn usgs(addr: SocketAddr) -> UsgsClient {
    UsgsClient::new(Client::new(), &format!("http://{}/summary/", addr)).unwrap()
}

#[tokio::test]
async fn test_events() {
    let (addr, recorder) = common::fake_usgs(FakeStatus::OK);
    let events = usgs(addr).events(FeedSize::M4_5, FeedWindow::Day).await.unwrap();

    assert_eq!(3, events.len());
    assert_eq!("nc73949786", events[0].id);
    assert!(events[1].properties.mag.is_none());
    assert_eq!(1700000200000, events[2].properties.time);
    assert_eq!("/summary/4.5_day.geojson", recorder.requests()[0].path);
}

#[tokio::test]
async fn test_events_failure() {
    let (addr, _recorder) = common::fake_usgs(FakeStatus::BAD_GATEWAY);
    let err = usgs(addr)
        .events(FeedSize::Significant, FeedWindow::Hour)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unexpected(s, _) if s == StatusCode::BAD_GATEWAY));
}

#[tokio::test]
async fn test_dump_events_skips_missing_magnitude() {
    let (addr, _recorder) = common::fake_usgs(FakeStatus::OK);
    let mut out = Vec::new();
    let stats = dump::dump_events(&usgs(addr), FeedSize::All, FeedWindow::Week, &mut out)
        .await
        .unwrap();

    assert_eq!(EncodeStats { lines: 2, skipped: 1 }, stats);
    assert_eq!(EXPECTED_LINES, String::from_utf8(out).unwrap());
}

#[tokio::test]
async fn test_dump_events_failure_writes_nothing() {
    let (addr, _recorder) = common::fake_usgs(FakeStatus::NOT_FOUND);
    let mut out = Vec::new();
    let err = dump::dump_events(&usgs(addr), FeedSize::M1_0, FeedWindow::Month, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, DumpError::Client(ClientError::Unexpected(_, _))));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_dump_then_load_file() {
    let (usgs_addr, _usgs_recorder) = common::fake_usgs(FakeStatus::OK);
    let (influx_addr, influx_recorder) = common::fake_influx(FakeStatus::OK, FakeStatus::NO_CONTENT);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quakes.txt");

    let out = cli::open_output(&path).unwrap();
    dump::dump_events(&usgs(usgs_addr), FeedSize::Significant, FeedWindow::Hour, out)
        .await
        .unwrap();

    let payload = cli::read_input(&path).unwrap();
    let influx = InfluxClient::new(Client::new(), &influx_addr.ip().to_string(), influx_addr.port()).unwrap();
    influx
        .load("earthquakes", payload.clone(), EventEncoder::PRECISION)
        .await
        .unwrap();

    let requests = influx_recorder.requests();
    assert_eq!(2, requests.len());
    assert_eq!("earthquakes", requests[1].params["db"]);
    assert_eq!("ms", requests[1].params["precision"]);
    assert_eq!(EXPECTED_LINES.as_bytes(), &requests[1].body[..]);
}
