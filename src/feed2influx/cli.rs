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

use crate::influx::{DatabaseError, InfluxClient};
use clap::Args;
use reqwest::Client;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8086;
const DEFAULT_TIMEOUT_MILLIS: u64 = 5000;
const STDIO_PATH: &str = "-";

/// Options shared by both the weather and earthquake loaders.
#[derive(Debug, Args)]
pub struct CommonOptions {
    /// InfluxDB host
    #[clap(long, default_value_t = DEFAULT_HOST.into())]
    pub host: String,

    /// InfluxDB port
    #[clap(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Name of the database to store data in. Required for --drop and --input
    #[clap(long)]
    pub db: Option<String>,

    /// Drop the database before doing anything else
    #[clap(long)]
    pub drop: bool,

    /// Line protocol file to load into the database ('-' for stdin)
    #[clap(long, conflicts_with = "output")]
    pub input: Option<PathBuf>,

    /// Line protocol file to write fetched data to ('-' for stdout)
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    pub log_level: Level,

    /// Timeout for each HTTP request to the data APIs and InfluxDB, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    pub timeout_millis: u64,
}

impl CommonOptions {
    /// Database name, or an empty string if none was given.
    ///
    /// Database operations reject an empty name before making any requests.
    pub fn db_name(&self) -> &str {
        self.db.as_deref().unwrap_or("")
    }

    pub fn http_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(Duration::from_millis(self.timeout_millis))
            .build()
    }

    pub fn influx_client(&self, client: Client) -> Result<InfluxClient, DatabaseError> {
        InfluxClient::new(client, &self.host, self.port)
    }
}

/// Install a global `tracing` subscriber that writes to stderr at the given level.
///
/// Stdout is left alone since line protocol may be written there.
pub fn init_tracing(level: Level) {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(io::stderr)
            .finish(),
    )
    .expect("failed to set tracing subscriber");
}

/// Open a buffered sink for line protocol, either a file (truncated) or stdout.
pub fn open_output(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new(STDIO_PATH) {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

/// Read an entire line protocol payload from a file or stdin.
pub fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    if path == Path::new(STDIO_PATH) {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path)
    }
}
