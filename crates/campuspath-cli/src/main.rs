use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use campuspath_lib::{
    append_paths, build_graph, load_campus, load_curated_edges, plan_route, proximity_edges,
    read_edge_csv, replace_paths, BuildingRef, Error as LibError, ProximityOptions, RouteRequest,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Campus wayfinding utilities")]
struct Cli {
    /// Path to the campus SQLite database.
    #[arg(long, default_value = "campus.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the shortest walk between two buildings.
    Route {
        /// Starting building (rowid or exact name).
        #[arg(long = "from")]
        from: String,
        /// Destination building (rowid or exact name).
        #[arg(long = "to")]
        to: String,
        /// Derive edges from building coordinates instead of the paths table.
        #[arg(long)]
        proximity: bool,
    },
    /// List the buildings in the campus database.
    Buildings,
    /// Load curated path edges from a CSV file into the paths table.
    ImportPaths {
        /// CSV file with from_building_id,to_building_id,distance columns.
        csv: PathBuf,
        /// Replace existing rows instead of appending.
        #[arg(long)]
        replace: bool,
    },
    /// Regenerate the paths table from building coordinates.
    GeneratePaths {
        /// Connect each building only to its nearest neighbours.
        #[arg(long)]
        max_neighbors: Option<usize>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            from,
            to,
            proximity,
        } => handle_route(&cli.database, &from, &to, proximity),
        Command::Buildings => handle_buildings(&cli.database),
        Command::ImportPaths { csv, replace } => handle_import(&cli.database, &csv, replace),
        Command::GeneratePaths { max_neighbors } => handle_generate(&cli.database, max_neighbors),
    }
}

fn handle_route(database: &Path, from: &str, to: &str, proximity: bool) -> Result<()> {
    let campus = load_campus(database)
        .with_context(|| format!("failed to load campus database from {}", database.display()))?;

    let edges = if proximity {
        proximity_edges(&campus, &ProximityOptions::default())
    } else {
        load_curated_edges(database)
            .with_context(|| format!("failed to load path edges from {}", database.display()))?
    };

    let (graph, report) = build_graph(&campus, edges);
    if report.skipped > 0 {
        eprintln!("Warning: skipped {} invalid path rows.", report.skipped);
    }

    let request = RouteRequest::new(BuildingRef::parse(from), BuildingRef::parse(to));
    let plan = match plan_route(&campus, &graph, &request) {
        Ok(plan) => plan,
        Err(error) => return Err(route_failure(error)),
    };

    println!("Route ({:.1} m total, {} hops):", plan.total_distance, plan.hop_count());
    for stop in &plan.steps {
        match stop.leg_distance {
            Some(leg) => println!("- {} ({}) +{:.1} m", stop.name, stop.id, leg),
            None => println!("- {} ({})", stop.name, stop.id),
        }
    }

    Ok(())
}

fn handle_buildings(database: &Path) -> Result<()> {
    let campus = load_campus(database)
        .with_context(|| format!("failed to load campus database from {}", database.display()))?;

    let mut buildings: Vec<_> = campus.buildings.values().collect();
    buildings.sort_by_key(|building| building.id);

    for building in buildings {
        match building.position {
            Some(position) => println!(
                "{}\t{}\t({:.6}, {:.6})",
                building.id, building.name, position.latitude, position.longitude
            ),
            None => println!("{}\t{}\t(no coordinates)", building.id, building.name),
        }
    }

    Ok(())
}

fn handle_import(database: &Path, csv: &Path, replace: bool) -> Result<()> {
    let (edges, report) = read_edge_csv(csv)
        .with_context(|| format!("failed to read path edges from {}", csv.display()))?;

    if edges.is_empty() {
        anyhow::bail!("no valid rows found in {}", csv.display());
    }

    let written = if replace {
        replace_paths(database, &edges)
    } else {
        append_paths(database, &edges)
    }
    .with_context(|| format!("failed to write path rows into {}", database.display()))?;

    println!(
        "Imported {} path rows ({} skipped) into {}",
        written,
        report.skipped,
        database.display()
    );

    Ok(())
}

fn handle_generate(database: &Path, max_neighbors: Option<usize>) -> Result<()> {
    let campus = load_campus(database)
        .with_context(|| format!("failed to load campus database from {}", database.display()))?;

    let options = ProximityOptions { max_neighbors };
    let edges = proximity_edges(&campus, &options);
    if edges.is_empty() {
        anyhow::bail!("no buildings with coordinates; nothing to generate");
    }

    let written = replace_paths(database, &edges)
        .with_context(|| format!("failed to write path rows into {}", database.display()))?;

    println!("Inserted {} path edges into {}", written, database.display());

    Ok(())
}

fn route_failure(error: LibError) -> anyhow::Error {
    match error {
        LibError::UnknownBuilding { name, suggestions } => {
            anyhow::anyhow!(format_unknown_building_message(&name, &suggestions))
        }
        LibError::NoPath { start, goal } => {
            anyhow::anyhow!("No walkable path found between {start} and {goal}.")
        }
        other => anyhow::Error::new(other),
    }
}

fn format_unknown_building_message(name: &str, suggestions: &[String]) -> String {
    let mut message = format!("Unknown building '{}'.", name);
    if !suggestions.is_empty() {
        let formatted = if suggestions.len() == 1 {
            format!("Did you mean '{}'?", suggestions[0])
        } else {
            let joined = suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            format!("Did you mean one of: {}?", joined)
        };
        message.push(' ');
        message.push_str(&formatted);
    }
    message
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
