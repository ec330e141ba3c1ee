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

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

/// A request received by one of the fake servers.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub params: HashMap<String, String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Recorder {
    fn record(&self, path: &str, params: HashMap<String, String>, body: Vec<u8>) {
        self.requests.lock().unwrap().push(Recorded {
            path: path.to_owned(),
            params,
            body,
        });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Run `app` on an ephemeral local port in the background.
fn serve(listener: TcpListener, app: Router) -> SocketAddr {
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());

    tokio::spawn(async move {
        server.await.unwrap();
    });

    addr
}

fn listener() -> TcpListener {
    TcpListener::bind("127.0.0.1:0").unwrap()
}

#[derive(Debug, Clone)]
struct InfluxState {
    query_status: StatusCode,
    write_status: StatusCode,
    recorder: Recorder,
}

async fn influx_query(State(state): State<InfluxState>, Query(params): Query<HashMap<String, String>>) -> StatusCode {
    state.recorder.record("/query", params, Vec::new());
    state.query_status
}

async fn influx_write(
    State(state): State<InfluxState>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> StatusCode {
    state.recorder.record("/write", params, body.to_vec());
    state.write_status
}

/// Start a fake InfluxDB that answers queries and writes with the given statuses.
pub fn fake_influx(query_status: StatusCode, write_status: StatusCode) -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let state = InfluxState {
        query_status,
        write_status,
        recorder: recorder.clone(),
    };

    let app = Router::new()
        .route("/query", post(influx_query))
        .route("/write", post(influx_write))
        .with_state(state);

    (serve(listener(), app), recorder)
}

#[derive(Debug, Clone)]
struct WeatherState {
    base: String,
    county_status: StatusCode,
    observations_status: StatusCode,
    recorder: Recorder,
}

async fn weather_station(State(state): State<WeatherState>, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    state.recorder.record(&format!("/stations/{}", id), HashMap::new(), Vec::new());
    if id != "KBOS" {
        return (StatusCode::NOT_FOUND, Json(json!({"status": 404, "title": "Not Found"})));
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": format!("{}/stations/KBOS", state.base),
            "type": "Feature",
            "properties": {
                "@id": format!("{}/stations/KBOS", state.base),
                "stationIdentifier": "KBOS",
                "name": "Boston, Logan International Airport",
                "timeZone": "America/New_York",
                "county": format!("{}/zones/county/MAC025", state.base),
            }
        })),
    )
}

async fn weather_county(State(state): State<WeatherState>, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    state.recorder.record(&format!("/zones/county/{}", id), HashMap::new(), Vec::new());
    (
        state.county_status,
        Json(json!({
            "id": format!("{}/zones/county/{}", state.base, id),
            "properties": {
                "id": id,
                "type": "county",
                "name": "Suffolk",
                "state": "MA",
                "cwa": ["BOX"],
                "timeZone": ["America/New_York"],
            }
        })),
    )
}

async fn weather_observations(State(state): State<WeatherState>, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    state.recorder.record(&format!("/stations/{}/observations", id), HashMap::new(), Vec::new());
    (
        state.observations_status,
        Json(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "id": format!("{}/stations/KBOS/observations/2023-01-01T01:00:00+00:00", state.base),
                    "type": "Feature",
                    "properties": {
                        "station": format!("{}/stations/KBOS", state.base),
                        "timestamp": "2023-01-01T01:00:00+00:00",
                        "textDescription": "Cloudy",
                        "elevation": {"unitCode": "wmoUnit:m", "value": 9},
                        "temperature": {"unitCode": "wmoUnit:degC", "value": 8.3, "qualityControl": "V"},
                        "windSpeed": {"unitCode": "wmoUnit:km_h-1", "value": null, "qualityControl": "Z"},
                        "presentWeather": [],
                        "cloudLayers": [{"base": {"unitCode": "wmoUnit:m", "value": 610}, "amount": "OVC"}],
                    }
                },
                {
                    "id": format!("{}/stations/KBOS/observations/2023-01-01T00:00:00+00:00", state.base),
                    "type": "Feature",
                    "properties": {
                        "station": format!("{}/stations/KBOS", state.base),
                        "timestamp": "2023-01-01T00:00:00+00:00",
                        "temperature": {"unitCode": "wmoUnit:degC", "value": 8.9, "qualityControl": "V"},
                        "relativeHumidity": {"unitCode": "wmoUnit:percent", "value": 71, "qualityControl": "V"},
                    }
                }
            ]
        })),
    )
}

/// Start a fake api.weather.gov that knows about a single station, `KBOS`.
///
/// Station lookups always succeed for `KBOS` and return 404 for anything else. County
/// and observation requests use the given statuses.
pub fn fake_weather(county_status: StatusCode, observations_status: StatusCode) -> (SocketAddr, Recorder) {
    let listener = listener();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let recorder = Recorder::default();
    let state = WeatherState {
        base,
        county_status,
        observations_status,
        recorder: recorder.clone(),
    };

    let app = Router::new()
        .route("/stations/:id", get(weather_station))
        .route("/stations/:id/observations", get(weather_observations))
        .route("/zones/county/:id", get(weather_county))
        .with_state(state);

    (serve(listener, app), recorder)
}

#[derive(Debug, Clone)]
struct FeedState {
    status: StatusCode,
    recorder: Recorder,
}

async fn usgs_feed(State(state): State<FeedState>, Path(name): Path<String>) -> (StatusCode, Json<Value>) {
    state.recorder.record(&format!("/summary/{}", name), HashMap::new(), Vec::new());
    (
        state.status,
        Json(json!({
            "type": "FeatureCollection",
            "metadata": {"title": "USGS Earthquakes", "count": 3},
            "features": [
                {
                    "type": "Feature",
                    "id": "nc73949786",
                    "properties": {"mag": 4.2, "place": "10km N of Town", "time": 1700000000000i64, "type": "earthquake"},
                    "geometry": {"type": "Point", "coordinates": [-120.1, 38.2, 5.0]}
                },
                {
                    "type": "Feature",
                    "id": "ak023f2xq1nx",
                    "properties": {"mag": null, "place": "Southern Alaska", "time": 1700000100000i64, "type": "earthquake"},
                    "geometry": {"type": "Point", "coordinates": [-151.5, 60.1, 80.3]}
                },
                {
                    "type": "Feature",
                    "id": "us7000l1a2",
                    "properties": {"mag": 5, "place": "Fiji region", "time": 1700000200000i64, "type": "earthquake"},
                    "geometry": {"type": "Point", "coordinates": [178.2, -17.9, 550.25]}
                }
            ]
        })),
    )
}

/// Start a fake USGS summary feed server. Feeds are served under `/summary/`.
pub fn fake_usgs(status: StatusCode) -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let state = FeedState {
        status,
        recorder: recorder.clone(),
    };

    let app = Router::new().route("/summary/:name", get(usgs_feed)).with_state(state);
    (serve(listener(), app), recorder)
}
