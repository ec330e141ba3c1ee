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

use clap::Parser;
use feed2influx::cli::{self, CommonOptions};
use feed2influx::client::WeatherGovClient;
use feed2influx::dump;
use feed2influx::encode::WeatherEncoder;
use std::error::Error;
use std::process;

const DEFAULT_API_URL: &str = "https://api.weather.gov/";

/// Read observation data from NWS weather stations into InfluxDB
#[derive(Debug, Parser)]
#[clap(name = "nws2influx", version = clap::crate_version!())]
struct Nws2InfluxApplication {
    #[clap(flatten)]
    common: CommonOptions,

    /// Comma separated NWS weather station IDs to fetch observations for
    #[clap(long, value_delimiter = ',')]
    stations: Vec<String>,

    /// Base URL for the Weather.gov API
    #[clap(long, default_value_t = DEFAULT_API_URL.into())]
    api_url: String,
}

#[tokio::main]
async fn main() {
    let opts = Nws2InfluxApplication::parse();
    cli::init_tracing(opts.common.log_level);

    if let Err(e) = run(opts).await {
        tracing::error!(message = "failed to load weather data", error = %e);
        process::exit(1);
    }
}

async fn run(opts: Nws2InfluxApplication) -> Result<(), Box<dyn Error + Send + Sync>> {
    let http_client = opts.common.http_client()?;
    let influx = opts.common.influx_client(http_client.clone())?;

    if opts.common.drop {
        influx.drop_database(opts.common.db_name()).await?;
        tracing::info!(message = "dropped database", db = %opts.common.db_name());
    }

    if let Some(path) = &opts.common.output {
        let client = WeatherGovClient::new(http_client, &opts.api_url)?;
        let out = cli::open_output(path)?;
        let stats = dump::dump_observations(&client, &opts.stations, out).await?;
        tracing::info!(
            message = "dumped observations",
            output = %path.display(),
            lines = stats.lines,
            skipped = stats.skipped,
        );
    }

    if let Some(path) = &opts.common.input {
        let payload = cli::read_input(path)?;
        influx
            .load(opts.common.db_name(), payload, WeatherEncoder::PRECISION)
            .await?;
        tracing::info!(message = "loaded observations", input = %path.display(), db = %opts.common.db_name());
    }

    Ok(())
}
