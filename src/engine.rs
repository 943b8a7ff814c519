use std::process::Command;

use tracing::debug;

use crate::config::ToolchainConfig;
use crate::error::{JavelinError, Result};
use crate::files::Unit;
use crate::symbols::RawGraph;

/// Entry point class inside the analyzer JAR.
const ANALYZER_MAIN: &str = "com.sourcegraph.javagraph.Main";

/// Turns a unit plus classpath into a raw symbol graph. The production
/// implementation shells out to the analyzer JAR; tests hand back canned
/// graphs.
pub trait AnalysisEngine: Sync {
    fn analyze(&self, unit: &Unit, classpath: &str) -> Result<RawGraph>;
}

/// Runs the analyzer JAR under the configured JDK and decodes the JSON it
/// prints on stdout. Stderr is the analyzer's log and is mirrored to ours.
pub struct JavaAnalyzer<'a> {
    cfg: &'a ToolchainConfig,
}

impl<'a> JavaAnalyzer<'a> {
    pub fn new(cfg: &'a ToolchainConfig) -> Self {
        Self { cfg }
    }
}

impl AnalysisEngine for JavaAnalyzer<'_> {
    fn analyze(&self, unit: &Unit, classpath: &str) -> Result<RawGraph> {
        let bootpath = format!("{}:{}", self.cfg.tools_jar().display(), self.cfg.grapher_jar.display());

        let mut command = Command::new(self.cfg.java_bin());
        command
            .arg("-cp")
            .arg(&bootpath)
            .arg(ANALYZER_MAIN)
            .arg(classpath)
            .arg("")
            .args(&unit.src_files)
            .current_dir(&unit.dir)
            .env("JAVA_HOME", &self.cfg.java_home);

        debug!("running {:?}", command);
        let output = command.output()?;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!("analyzer: {}", line);
        }

        if !output.status.success() {
            return Err(JavelinError::Subprocess {
                command: format!("{} {}", self.cfg.java_bin().display(), ANALYZER_MAIN),
                status: output.status,
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
