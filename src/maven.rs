use std::path::Path;
use std::process::Command;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, instrument};

use crate::config::ToolchainConfig;
use crate::error::{JavelinError, Result};
use crate::files::Unit;
use crate::vcsurl::{self, RepositoryIdentity, VcsKind};

/// One resolved dependency from the Maven report, with the local path of
/// its artifact. Origin matching compares the full tuple, so two records
/// that differ only in scope stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyRecord {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub scope: String,
    pub filename: String,
}

/// Parses the report of `mvn dependency:resolve -DoutputAbsoluteArtifactFilename=true`.
///
/// Dependency lines are the ones indented with three spaces; everything
/// else is banner noise. Lines with fewer than six `:` fields are skipped.
/// Order and duplicates are preserved.
pub fn parse_dependency_report(report: &str) -> Vec<DependencyRecord> {
    report
        .lines()
        .filter(|line| line.starts_with("   "))
        .filter_map(|line| {
            let fields: Vec<&str> = line.trim().split(':').collect();
            if fields.len() < 6 {
                return None;
            }

            // fields[2] is the packaging, which nothing downstream needs
            Some(DependencyRecord {
                group_id: fields[0].to_owned(),
                artifact_id: fields[1].to_owned(),
                version: fields[3].to_owned(),
                scope: fields[4].to_owned(),
                filename: fields[5].to_owned(),
            })
        })
        .collect()
}

/// The slice of a POM we care about: the SCM connection string.
#[derive(Debug, Default, PartialEq)]
pub struct Pom {
    pub scm_connection: String,
}

impl Pom {
    /// Derives the repository identity from the SCM connection. Connections
    /// are either `scm:<vcs>:<url>` or a plain colon-free URL; an explicit
    /// `<vcs>` tag overrides whatever the URL itself implies.
    pub fn repo_identity(&self) -> Result<RepositoryIdentity> {
        if self.scm_connection.is_empty() {
            return Err(JavelinError::NoScmUrl);
        }

        let parts: Vec<&str> = self.scm_connection.splitn(3, ':').collect();
        match parts.as_slice() {
            [_, vcs, url] => {
                let mut identity = vcsurl::parse(url)?;
                match vcs.parse::<VcsKind>() {
                    Ok(kind) => identity.vcs = kind,
                    Err(()) => debug!("unrecognized VCS tag {:?} in SCM connection", vcs),
                }
                Ok(identity)
            }
            [url] => vcsurl::parse(url),
            _ => Err(JavelinError::InvalidScmUrl(self.scm_connection.clone())),
        }
    }
}

/// Extracts `project > scm > connection` from POM XML. Descriptors without
/// an SCM section parse to an empty connection.
pub fn parse_pom(xml: &str) -> Result<Pom> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut element_path: Vec<String> = Vec::new();
    let mut scm_connection = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                element_path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::End(_)) => {
                element_path.pop();
            }
            Ok(Event::Text(text)) => {
                if element_path == ["project", "scm", "connection"] {
                    let value = text.unescape().map_err(quick_xml::Error::from)?;
                    scm_connection = value.trim().to_owned();
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(JavelinError::Xml(err)),
            _ => {}
        }
    }

    Ok(Pom { scm_connection })
}

/// Reads the POM sitting next to a resolved JAR: the same path with a
/// `.pom` extension, per the Maven repository layout.
pub fn read_pom_for_jar(jarfile: &str) -> Result<Pom> {
    let stem = jarfile.strip_suffix(".jar").ok_or_else(|| JavelinError::NoJar(jarfile.to_owned()))?;
    let pomfile = format!("{stem}.pom");

    if !Path::new(&pomfile).is_file() {
        return Err(JavelinError::NoPom(pomfile.into()));
    }

    parse_pom(&std::fs::read_to_string(&pomfile)?)
}

/// Resolves one dependency to the repository hosting its sources, going
/// through the artifact's POM.
pub fn repo_for_dependency(dep: &DependencyRecord) -> Result<RepositoryIdentity> {
    read_pom_for_jar(&dep.filename)?.repo_identity()
}

/// Asks Maven to resolve the unit's dependencies and parses the report.
/// `-DoutputFile=/dev/stderr` routes the report onto a stream we capture.
#[instrument(skip_all)]
pub fn resolve_dependencies(cfg: &ToolchainConfig, unit: &Unit) -> Result<Vec<DependencyRecord>> {
    let report = run_maven(
        cfg,
        unit,
        &["dependency:resolve", "-DoutputAbsoluteArtifactFilename=true", "-DoutputFile=/dev/stderr"],
    )?;

    Ok(parse_dependency_report(&report))
}

/// Asks Maven for the classpath covering every resolved dependency.
#[instrument(skip_all)]
pub fn dependency_classpath(cfg: &ToolchainConfig, unit: &Unit) -> Result<String> {
    let report = run_maven(cfg, unit, &["dependency:build-classpath", "-Dmdep.outputFile=/dev/stderr"])?;

    Ok(report.trim().to_owned())
}

/// Compiles the unit so `target/classes` exists before analysis runs.
#[instrument(skip_all)]
pub fn compile(cfg: &ToolchainConfig, unit: &Unit) -> Result<()> {
    run_maven(cfg, unit, &["compile"]).map(|_| ())
}

/// Runs one Maven verb in the unit directory. Both output streams are
/// mirrored to the debug log; stderr is also captured and returned, since
/// the dependency plugins write their reports there.
fn run_maven(cfg: &ToolchainConfig, unit: &Unit, args: &[&str]) -> Result<String> {
    let command = format!("{} {}", cfg.maven_bin.display(), args.join(" "));
    debug!("running `{}` in {}", command, unit.dir.display());

    let output = Command::new(&cfg.maven_bin).args(args).current_dir(&unit.dir).output()?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("mvn: {}", line);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    for line in stderr.lines() {
        debug!("mvn: {}", line);
    }

    if !output.status.success() {
        return Err(JavelinError::Subprocess { command, status: output.status });
    }

    Ok(stderr)
}
