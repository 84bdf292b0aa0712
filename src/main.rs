mod graph;
mod error;
mod nyt;
mod dataset;
mod aggregate;
mod selection;
mod present;

use std::process;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser,Subcommand};
use tracing::{info,warn,error};
use tracing_subscriber::EnvFilter;

use dataset::Dataset;
use error::Result;
use present::Dashboard;
use selection::{Metric,Selection,STATE_COUNT,SUMMARY_DAYS,AVERAGE_WINDOW};


#[derive(Parser,Debug)]
#[command(name = "covid19-dashboard")]
#[command(about = "USA Covid-19 dashboard for every state and county, from the New York Times dataset")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    render: RenderArgs,

    /// Location of the us-counties.csv snapshot
    #[arg(long, global = true, default_value = nyt::URL)]
    url: String,

    /// Read the snapshot from a local CSV file instead of downloading it
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[arg(long, global = true, default_value = "cache")]
    cache: PathBuf,

    #[arg(long, global = true, default_value = "graphs")]
    graphs: PathBuf,

    /// Seconds a downloaded snapshot is reused
    #[arg(long, global = true, default_value_t = 1800)]
    max_age: u64,

    /// Download even when the cached snapshot is fresh
    #[arg(long, global = true)]
    refresh: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,
}

#[derive(Subcommand,Debug)]
enum Command {
    /// List the states in the snapshot
    States,
    /// List the counties of a state
    Counties {
	state: String,
    },
}

#[derive(clap::Args,Debug)]
struct RenderArgs {
    /// State to show county statistics for (default: first state)
    #[arg(long)]
    state: Option<String>,

    /// County within the state (default: first county)
    #[arg(long)]
    county: Option<String>,

    /// Quantity the state bar chart is ranked by
    #[arg(long, value_enum, default_value_t = Metric::Cases)]
    metric: Metric,

    /// Number of states in the scatter and bar charts (1-50)
    #[arg(long, default_value_t = STATE_COUNT.default)]
    top: usize,

    /// Number of days in the summary table (3-20)
    #[arg(long, default_value_t = SUMMARY_DAYS.default)]
    days: usize,

    /// Number of days for the moving average (5-20)
    #[arg(long, default_value_t = AVERAGE_WINDOW.default)]
    window: usize,

    /// Also write the chart tables as JSON
    #[arg(long)]
    json: bool,
}


fn main() {

    tracing_subscriber::fmt()
	.with_env_filter(EnvFilter::try_from_default_env()
			 .unwrap_or_else(|_| EnvFilter::new("info")))
	.with_writer(std::io::stderr)
	.init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
	error!(kind = ?err.kind(), "{}", err);
	process::exit(1);
    }

}


fn run(args: &Args) -> Result<()> {

    let data = load(args)?;
    if data.is_empty() {
	warn!("The snapshot has no records");
    }
    info!("Loaded {} records up to {}", data.len(),
	  data.last_date().map_or("-".to_string(), |d| d.to_string()));

    match &args.command {
	Some(Command::States) => {
	    for state in data.states() {
		println!("{}", state);
	    }
	}
	Some(Command::Counties { state }) => {
	    let counties = data.counties(state);
	    if counties.is_empty() {
		warn!("No counties for {}", state);
	    }
	    for county in counties {
		println!("{}", county);
	    }
	}
	None => {
	    for path in render(args, &data)? {
		println!("{}", path.display());
	    }
	}
    }

    Ok(())

}


fn load(args: &Args) -> Result<Dataset> {
    match &args.input {
	Some(path) => {
	    info!("Reading {}...", path.display());
	    Dataset::from_reader(File::open(path)?)
	}
	None => nyt::Loader {
	    url: args.url.clone(),
	    cache_path: args.cache.clone(),
	    max_age: Duration::from_secs(args.max_age),
	    timeout: Duration::from_secs(args.timeout),
	    refresh: args.refresh,
	}.counties(),
    }
}


fn render(args: &Args, data: &Dataset) -> Result<Vec<PathBuf>> {

    let opts = &args.render;
    let selection = Selection::with_defaults(data, opts.state.as_deref(), opts.county.as_deref(),
					     opts.metric, opts.top, opts.days, opts.window)?;
    info!("Rendering {}, {}", selection.county, selection.state);

    let dash = Dashboard::build(data, &selection);
    let mut paths = vec![graph::dashboard(&args.graphs, &dash)?];
    if opts.json {
	paths.push(graph::tables(&args.graphs, &dash)?);
    }

    Ok(paths)

}
