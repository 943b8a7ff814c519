use std::env;
use std::path::PathBuf;

use crate::error::{JavelinError, Result};

/// Locations of the JDK, the analyzer JAR and the Maven executable.
///
/// Resolved once by the CLI and passed by reference from there on; nothing
/// downstream reads the environment.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub java_home: PathBuf,
    pub grapher_jar: PathBuf,
    pub maven_bin: PathBuf,
}

impl ToolchainConfig {
    pub fn resolve(java_home: Option<PathBuf>, grapher_jar: Option<PathBuf>, maven_bin: PathBuf) -> Result<Self> {
        let java_home = java_home
            .or_else(|| env::var_os("JAVA8_HOME").map(PathBuf::from))
            .ok_or_else(|| JavelinError::Config("JDK location not set, pass --java-home or set JAVA8_HOME".to_owned()))?;

        let grapher_jar = grapher_jar
            .or_else(|| env::var_os("JAVAGRAPH_JAR").map(PathBuf::from))
            .ok_or_else(|| JavelinError::Config("analyzer JAR not set, pass --grapher-jar or set JAVAGRAPH_JAR".to_owned()))?;

        Ok(Self { java_home, grapher_jar, maven_bin })
    }

    pub fn java_bin(&self) -> PathBuf {
        self.java_home.join("bin").join("java")
    }

    /// The JDK's compiler API classes, which the analyzer JAR links against.
    pub fn tools_jar(&self) -> PathBuf {
        self.java_home.join("lib").join("tools.jar")
    }

    /// Origins under this prefix point into the JDK install itself.
    pub fn stdlib_origin_prefix(&self) -> String {
        format!("jar:file:{}", self.java_home.display())
    }
}
