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
use feed2influx::dump;
use feed2influx::encode::EventEncoder;
use feed2influx::usgs::{FeedSize, FeedWindow, UsgsClient};
use std::error::Error;
use std::process;

const DEFAULT_FEED_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/";

/// Read earthquake data from USGS into InfluxDB
#[derive(Debug, Parser)]
#[clap(name = "usgs2influx", version = clap::crate_version!())]
struct Usgs2InfluxApplication {
    #[clap(flatten)]
    common: CommonOptions,

    /// Minimum earthquake size included in the feed
    #[clap(long, value_enum, default_value_t = FeedSize::Significant)]
    size: FeedSize,

    /// Time window covered by the feed
    #[clap(long, value_enum, default_value_t = FeedWindow::Hour)]
    window: FeedWindow,

    /// Base URL for the USGS summary feeds
    #[clap(long, default_value_t = DEFAULT_FEED_URL.into())]
    feed_url: String,
}

#[tokio::main]
async fn main() {
    let opts = Usgs2InfluxApplication::parse();
    cli::init_tracing(opts.common.log_level);

    if let Err(e) = run(opts).await {
        tracing::error!(message = "failed to load earthquake data", error = %e);
        process::exit(1);
    }
}

async fn run(opts: Usgs2InfluxApplication) -> Result<(), Box<dyn Error + Send + Sync>> {
    let http_client = opts.common.http_client()?;
    let influx = opts.common.influx_client(http_client.clone())?;

    if opts.common.drop {
        influx.drop_database(opts.common.db_name()).await?;
        tracing::info!(message = "dropped database", db = %opts.common.db_name());
    }

    if let Some(path) = &opts.common.output {
        let client = UsgsClient::new(http_client, &opts.feed_url)?;
        let out = cli::open_output(path)?;
        let stats = dump::dump_events(&client, opts.size, opts.window, out).await?;
        tracing::info!(
            message = "dumped events",
            output = %path.display(),
            lines = stats.lines,
            skipped = stats.skipped,
        );
    }

    if let Some(path) = &opts.common.input {
        let payload = cli::read_input(path)?;
        influx
            .load(opts.common.db_name(), payload, EventEncoder::PRECISION)
            .await?;
        tracing::info!(message = "loaded events", input = %path.display(), db = %opts.common.db_name());
    }

    Ok(())
}
