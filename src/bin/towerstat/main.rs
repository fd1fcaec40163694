//! towerstat
//!
//! Print the latest readings from the tall towers, gust statistics for a wind channel, or the
//! one minute trend of a variable.
mod render;

use chrono::{Duration, NaiveDateTime, Utc};
use std::{
    convert::TryFrom,
    error::Error,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use strum::IntoEnumIterator;
use towerstat::{
    build_matrix, channel_trend, gust_report, resolve, table_channels, ChannelId, Config, Height,
    LatestRecordInterface, LogicalVariable, TableCategory, Tower, TowersDb,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        println!("error: {}", e);

        let mut err = &*e;

        while let Some(cause) = err.source() {
            println!("caused by: {}", cause);
            err = cause;
        }

        ::std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.operation.as_ref() {
        "channels" => channels(&args, &mut out)?,
        "snapshot" => snapshot(&args, &mut out)?,
        "gusts" => gusts(&args, &mut out)?,
        "trend" => trend(&args, &mut out)?,
        _ => unreachable!("clap only accepts known operations"),
    }

    out.flush()?;
    Ok(())
}

#[derive(Debug)]
pub(crate) struct CmdLineArgs {
    db_path: PathBuf,
    operation: String,
    tower: Tower,
    variable: LogicalVariable,
    height: Option<Height>,
    hours: i64,
}

fn parse_args() -> Result<CmdLineArgs, Box<dyn Error>> {
    let app = clap::App::new("towerstat")
        .author("Ryan <rnleach@users.noreply.github.com>")
        .version(clap::crate_version!())
        .about("Tall tower observations.")
        .arg(
            clap::Arg::with_name("operation")
                .index(1)
                .takes_value(true)
                .required(true)
                .possible_values(&["snapshot", "gusts", "trend", "channels"])
                .help("What to report.")
                .long_help(concat!(
                    "'snapshot' shows the latest reading of every channel on both towers. 'gusts'",
                    " shows one minute wind statistics with the maximum gust. 'trend' shows one",
                    " minute averages of a variable. 'channels' lists the columns that hold a",
                    " variable."
                )),
        )
        .arg(
            clap::Arg::with_name("db")
                .short("d")
                .long("db")
                .takes_value(true)
                .help("Path to the tower database.")
                .global(true),
        )
        .arg(
            clap::Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("JSON settings file with a 'dbfile' entry.")
                .global(true),
        )
        .arg(
            clap::Arg::with_name("tower")
                .short("t")
                .long("tower")
                .takes_value(true)
                .default_value("hamilton")
                .possible_values(&Tower::iter().map(Tower::name).collect::<Vec<&str>>())
                .help("Tower to query for gusts and trends."),
        )
        .arg(
            clap::Arg::with_name("variable")
                .short("v")
                .long("variable")
                .takes_value(true)
                .default_value("ws")
                .help("Variable name (e.g. ws, winddir, airtc, rh, ux, boardtemp)."),
        )
        .arg(
            clap::Arg::with_name("height")
                .short("z")
                .long("height")
                .takes_value(true)
                .help("Height in meters (120, 80, 40, 20, 10 or 5).")
                .long_help(concat!(
                    "Height in meters (120, 80, 40, 20, 10 or 5). Required for 'gusts'. For",
                    " 'trend' and 'channels' all heights are used if it is not given."
                )),
        )
        .arg(
            clap::Arg::with_name("hours")
                .short("H")
                .long("hours")
                .takes_value(true)
                .help("How many hours back to look. Default is 4 for gusts and 36 for trends."),
        );

    let matches = app.get_matches();

    let operation: String = matches
        .value_of("operation")
        .map(str::to_owned)
        .unwrap_or_default();

    let config = match matches.value_of("config") {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };
    let db_path = config.db_path(matches.value_of("db").map(Path::new))?;

    let tower: Tower = matches.value_of("tower").unwrap_or("hamilton").parse()?;
    let variable = LogicalVariable::parse(matches.value_of("variable").unwrap_or("ws"))?;

    let height = match matches.value_of("height") {
        Some(val) => {
            let meters: u32 = val.parse()?;
            Some(Height::try_from(meters)?)
        }
        None => None,
    };

    let default_hours = if operation == "trend" { 36 } else { 4 };
    let hours: i64 = match matches.value_of("hours") {
        Some(val) => val.parse()?,
        None => default_hours,
    };

    Ok(CmdLineArgs {
        db_path,
        operation,
        tower,
        variable,
        height,
        hours,
    })
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Channels for the requested variable, at one height or all of them.
fn requested_channels(args: &CmdLineArgs) -> Vec<ChannelId> {
    match args.height {
        Some(height) => resolve(args.variable, height),
        None => Height::iter()
            .flat_map(|height| resolve(args.variable, height))
            .collect(),
    }
}

fn channels<W: Write>(args: &CmdLineArgs, out: &mut W) -> Result<(), Box<dyn Error>> {
    if args.height.is_some() {
        render::channel_list(out, &requested_channels(args))?;
    } else {
        for table in TableCategory::iter() {
            render::channel_list(out, &table_channels(table).collect::<Vec<_>>())?;
        }
    }

    Ok(())
}

fn snapshot<W: Write>(args: &CmdLineArgs, out: &mut W) -> Result<(), Box<dyn Error>> {
    let towers_db = TowersDb::open(&args.db_path)?;
    let mut query = LatestRecordInterface::initialize(&towers_db);

    let records = query.latest_records(now())?;
    let matrix = build_matrix(&records);

    render::snapshot(out, &matrix)?;

    Ok(())
}

fn gusts<W: Write>(args: &CmdLineArgs, out: &mut W) -> Result<(), Box<dyn Error>> {
    if args.height.is_none() {
        return Err(Box::new(towerstat::TowersError::Config(
            "a height is required for gust statistics".to_owned(),
        )));
    }

    let towers_db = TowersDb::open(&args.db_path)?;
    let since = now() - Duration::hours(args.hours);

    for channel in requested_channels(args) {
        let rows = gust_report(&towers_db, args.tower, &channel, since)?;
        render::gusts(out, args.tower, &channel, &rows)?;
    }

    Ok(())
}

fn trend<W: Write>(args: &CmdLineArgs, out: &mut W) -> Result<(), Box<dyn Error>> {
    let towers_db = TowersDb::open(&args.db_path)?;
    let since = now() - Duration::hours(args.hours);

    let trends = channel_trend(&towers_db, args.tower, &requested_channels(args), since)?;
    render::trend(out, args.tower, &trends)?;

    Ok(())
}
