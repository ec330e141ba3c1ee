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

use std::fmt;

/// Escape a free text tag or field value for use in line protocol.
///
/// Commas, spaces, and equals signs are prefixed with a backslash. Nothing
/// else is changed so strings without those characters are returned as-is.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | ' ' | '=') {
            out.push('\\');
        }
        out.push(c);
    }

    out
}

/// Unit of the timestamps embedded in a line protocol payload.
///
/// Sent to InfluxDB as the `precision` parameter of a write. The weather pipeline
/// writes seconds and the earthquake pipeline writes milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Seconds,
    Milliseconds,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line protocol record.
///
/// Tags and fields are kept in the order they were added and rendered in that
/// order, since InfluxDB series keys are built from them. Values are stored
/// exactly as they will be written: use [`Point::tag_escaped`] for free text and
/// [`Point::tag`] or [`Point::field`] for numbers and identifiers known to be safe.
///
/// Rendering via `Display` produces `measurement,k=v,... k=v,... timestamp` with
/// no trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, String)>,
    timestamp: i64,
}

impl Point {
    pub fn new<S: Into<String>>(measurement: S, timestamp: i64) -> Self {
        Point {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp,
        }
    }

    pub fn tag<V: fmt::Display>(mut self, key: &str, value: V) -> Self {
        self.tags.push((key.to_owned(), value.to_string()));
        self
    }

    pub fn tag_escaped(mut self, key: &str, value: &str) -> Self {
        self.tags.push((key.to_owned(), escape(value)));
        self
    }

    pub fn field<V: fmt::Display>(mut self, key: &str, value: V) -> Self {
        self.fields.push((key.to_owned(), value.to_string()));
        self
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.measurement)?;
        for (k, v) in self.tags.iter() {
            write!(f, ",{}={}", k, v)?;
        }

        for (i, (k, v)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ' ' } else { ',' };
            write!(f, "{}{}={}", sep, k, v)?;
        }

        write!(f, " {}", self.timestamp)
    }
}
