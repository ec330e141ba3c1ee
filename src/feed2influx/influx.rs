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

use crate::line::Precision;
use reqwest::{Client, Response, StatusCode, Url};
use std::error;
use std::fmt;

/// Error from an administrative call or write to InfluxDB.
///
/// Each variant carries the name of the operation that failed.
#[derive(Debug)]
pub enum DatabaseError {
    NoDatabase(&'static str),
    InvalidUrl(String),
    Internal(&'static str, reqwest::Error),
    Unexpected(&'static str, StatusCode),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDatabase(op) => write!(f, "{}: no database specified", op),
            Self::InvalidUrl(u) => write!(f, "invalid database URL {}", u),
            Self::Internal(op, e) => write!(f, "{}: {}", op, e),
            Self::Unexpected(op, status) => write!(
                f,
                "{}: {}:{}",
                op,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ),
        }
    }
}

impl error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Internal(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Client for the InfluxDB 1.x HTTP API.
///
/// Only the `/query` endpoint (for creating and dropping databases) and the `/write`
/// endpoint are used. No authentication is sent.
#[derive(Debug)]
pub struct InfluxClient {
    client: Client,
    base_url: Url,
}

impl InfluxClient {
    const OP_CREATE: &'static str = "create_database";
    const OP_DROP: &'static str = "drop_database";
    const OP_LOAD: &'static str = "load";

    pub fn new(client: Client, host: &str, port: u16) -> Result<Self, DatabaseError> {
        let raw = format!("http://{}:{}/", host, port);
        let base_url = Url::parse(&raw).map_err(|_| DatabaseError::InvalidUrl(raw))?;
        Ok(InfluxClient { client, base_url })
    }

    pub async fn create_database(&self, name: &str) -> Result<(), DatabaseError> {
        self.query(Self::OP_CREATE, "CREATE DATABASE", name).await
    }

    pub async fn drop_database(&self, name: &str) -> Result<(), DatabaseError> {
        self.query(Self::OP_DROP, "DROP DATABASE", name).await
    }

    /// Create the database if needed and write a line protocol payload to it.
    ///
    /// The payload is sent unmodified. `precision` must match the unit of the
    /// timestamps in the payload, this isn't checked. Creating a database that
    /// already exists succeeds in InfluxDB so repeated loads into the same
    /// database are fine.
    pub async fn load<B: Into<Vec<u8>>>(&self, name: &str, payload: B, precision: Precision) -> Result<(), DatabaseError> {
        if name.is_empty() {
            return Err(DatabaseError::NoDatabase(Self::OP_LOAD));
        }

        self.create_database(name).await?;
        self.write(name, payload, precision).await
    }

    /// Write a line protocol payload to an existing database.
    pub async fn write<B: Into<Vec<u8>>>(&self, name: &str, payload: B, precision: Precision) -> Result<(), DatabaseError> {
        if name.is_empty() {
            return Err(DatabaseError::NoDatabase(Self::OP_LOAD));
        }

        let url = self.endpoint("write");
        let body: Vec<u8> = payload.into();
        tracing::info!(message = "writing line protocol", url = %url, db = %name, precision = %precision, bytes = body.len());

        let res = self
            .client
            .post(url)
            .query(&[("db", name), ("precision", precision.as_str())])
            .body(body)
            .send()
            .await
            .map_err(|e| DatabaseError::Internal(Self::OP_LOAD, e))?;

        Self::expect_status(Self::OP_LOAD, res, StatusCode::NO_CONTENT)
    }

    async fn query(&self, op: &'static str, statement: &str, name: &str) -> Result<(), DatabaseError> {
        if name.is_empty() {
            return Err(DatabaseError::NoDatabase(op));
        }

        let res = self
            .client
            .post(self.endpoint("query"))
            .query(&[("q", format!("{} {}", statement, name))])
            .send()
            .await
            .map_err(|e| DatabaseError::Internal(op, e))?;

        tracing::info!(message = "database query", url = %res.url(), status = %res.status());
        Self::expect_status(op, res, StatusCode::OK)
    }

    fn expect_status(op: &'static str, res: Response, expected: StatusCode) -> Result<(), DatabaseError> {
        let status = res.status();
        if status == expected {
            Ok(())
        } else {
            Err(DatabaseError::Unexpected(op, status))
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            url.path_segments_mut()
                .map(|mut p| {
                    p.clear().push(path);
                })
                .expect("unable to modify database URL path segments");
        }

        url
    }
}
