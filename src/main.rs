mod config;
mod engine;
mod error;
mod files;
mod grapher;
mod maven;
mod origins;
mod symbols;
mod vcsurl;

use std::path::PathBuf;

use clap::Parser;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, error};

use std::io::prelude::*;

use crate::config::ToolchainConfig;
use crate::engine::JavaAnalyzer;
use crate::grapher::{DependencyListing, UnitGraph};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CliCommand {
    /// Root directory containing the units to graph
    #[clap(short, long)]
    root_dir: PathBuf,

    /// JDK 8 install directory, defaults to $JAVA8_HOME
    #[clap(long)]
    java_home: Option<PathBuf>,

    /// Analyzer JAR, defaults to $JAVAGRAPH_JAR
    #[clap(long)]
    grapher_jar: Option<PathBuf>,

    /// Maven executable used for dependency resolution and builds
    #[clap(long, default_value = "mvn")]
    maven_bin: PathBuf,

    /// Graph the units as they are, without running `mvn compile` first
    #[clap(long)]
    skip_build: bool,

    /// Where the symbol graph is written
    #[clap(long, default_value = "graph.json")]
    graph_out: PathBuf,

    /// Where the dependency repository listing is written
    #[clap(long, default_value = "deps.json")]
    deps_out: PathBuf,
}

fn main() {
    install_logger();

    let command = CliCommand::parse();
    if let Err(err) = do_run(command) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn install_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn do_run(command: CliCommand) -> error::Result<()> {
    let cfg = ToolchainConfig::resolve(command.java_home.clone(), command.grapher_jar.clone(), command.maven_bin.clone())?;
    let engine = JavaAnalyzer::new(&cfg);

    debug!("files::discover_units()");
    let units = files::discover_units(&command.root_dir);
    debug!("found {} units", units.len());

    debug!("grapher::list_dependency_repos()");
    let listings: Vec<DependencyListing> = units
        .par_iter()
        .filter_map(|unit| match grapher::list_dependency_repos(&cfg, unit) {
            Ok(listing) => Some(listing),
            Err(err) => {
                error!("dependency listing failed for {}: {}", unit.name, err);
                None
            }
        })
        .collect();

    debug!("grapher::graph_unit()");
    let graphs: Vec<UnitGraph> = units
        .par_iter()
        .filter_map(|unit| {
            if !command.skip_build && unit.use_maven() {
                if let Err(err) = maven::compile(&cfg, unit) {
                    error!("build failed for {}: {}", unit.name, err);
                    return None;
                }
            }

            match grapher::graph_unit(&cfg, &engine, unit) {
                Ok(graph) => Some(graph),
                Err(err) => {
                    error!("analysis failed for {}: {}", unit.name, err);
                    None
                }
            }
        })
        .collect();

    std::fs::File::create(&command.graph_out)?
        .write_all(serde_json::to_string_pretty(&graphs)?.as_bytes())?;

    std::fs::File::create(&command.deps_out)?
        .write_all(serde_json::to_string_pretty(&listings)?.as_bytes())?;

    debug!("end");
    Ok(())
}
