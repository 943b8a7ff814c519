use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::ToolchainConfig;
use crate::engine::AnalysisEngine;
use crate::error::Result;
use crate::files::Unit;
use crate::maven::{self, DependencyRecord};
use crate::origins::{self, DepRepoCache};
use crate::symbols::{Doc, RawGraph, Reference, Symbol};

/// Everything emitted for one unit. Within each array the analyzer's
/// output order is preserved.
#[derive(Debug, Serialize)]
pub struct UnitGraph {
    pub unit: String,
    pub symbols: Vec<Symbol>,
    pub docs: Vec<Doc>,
    pub refs: Vec<Reference>,
}

/// The dependency listing for one unit: clone URLs of every dependency
/// whose repository resolved, in report order.
#[derive(Debug, Serialize)]
pub struct DependencyListing {
    pub unit: String,
    pub repos: Vec<String>,
}

/// The listing phase. Shares nothing with the graphing phase; dependencies
/// are resolved again there.
#[instrument(skip_all, fields(unit = %unit.name))]
pub fn list_dependency_repos(cfg: &ToolchainConfig, unit: &Unit) -> Result<DependencyListing> {
    let mut repos = Vec::new();

    if unit.use_maven() {
        for dep in &maven::resolve_dependencies(cfg, unit)? {
            match maven::repo_for_dependency(dep) {
                Ok(identity) => repos.push(identity.clone_url),
                Err(err) => warn!("failed to resolve repo for {}:{}: {}", dep.group_id, dep.artifact_id, err),
            }
        }
    }

    Ok(DependencyListing { unit: unit.name.clone(), repos })
}

/// Graphs one unit: assembles the classpath, rebuilds the repository cache
/// for this call, runs the engine and funnels its output into the
/// canonical model.
#[instrument(skip_all, fields(unit = %unit.name))]
pub fn graph_unit(cfg: &ToolchainConfig, engine: &dyn AnalysisEngine, unit: &Unit) -> Result<UnitGraph> {
    let mut deps = Vec::new();
    let mut cache = DepRepoCache::new();
    let mut dep_classpath = String::new();

    if unit.use_maven() {
        dep_classpath = maven::dependency_classpath(cfg, unit)?;

        deps = maven::resolve_dependencies(cfg, unit)?;
        for dep in &deps {
            match maven::repo_for_dependency(dep) {
                Ok(identity) => {
                    cache.insert(dep.clone(), identity);
                }
                Err(err) => warn!("failed to resolve repo for {}:{}: {}", dep.group_id, dep.artifact_id, err),
            }
        }
    }

    let classpath = [unit.project_classpath().to_string_lossy().into_owned(), dep_classpath]
        .iter()
        .filter(|part| !part.is_empty())
        .join(":");

    debug!("analyzing {} source files", unit.src_files.len());
    let raw = engine.analyze(unit, &classpath)?;

    Ok(build_graph(cfg, unit, &raw, &deps, &cache))
}

/// Funnels raw analyzer output into the canonical model. Symbols with an
/// unrecognized kind, and references whose origin cannot be attributed,
/// are dropped with a warning; everything else keeps its order.
pub fn build_graph(
    cfg: &ToolchainConfig,
    unit: &Unit,
    raw: &RawGraph,
    deps: &[DependencyRecord],
    cache: &DepRepoCache,
) -> UnitGraph {
    let mut graph =
        UnitGraph { unit: unit.name.clone(), symbols: Vec::new(), docs: Vec::new(), refs: Vec::new() };

    for raw_symbol in &raw.symbols {
        let mut symbol = match raw_symbol.normalize(&unit.name) {
            Ok(symbol) => symbol,
            Err(err) => {
                warn!("skipping symbol {:?}: {}", raw_symbol.path, err);
                continue;
            }
        };
        symbol.file = unit.dir.join(&symbol.file);

        if !raw_symbol.doc.is_empty() {
            graph.docs.push(Doc { key: symbol.key.clone(), body: raw_symbol.doc.clone() });
        }
        graph.symbols.push(symbol);
    }

    for raw_ref in &raw.refs {
        let mut reference = raw_ref.normalize();

        if !raw_ref.symbol_origin.is_empty() {
            match origins::repo_for_origin(cfg, &raw_ref.symbol_origin, deps, cache) {
                Ok(repo) => reference.defining_repo = repo,
                Err(err) => {
                    warn!("skipping ref to {:?}: {}", raw_ref.symbol_path, err);
                    continue;
                }
            }
        }
        reference.file = unit.dir.join(&reference.file);

        graph.refs.push(reference);
    }

    graph
}
