use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use jwalk::WalkDir;
use tracing::{debug, instrument, warn};

use crate::origins::JDK_STDLIB_REPO;

/// Descriptor file marking a Maven unit root.
const UNIT_DESCRIPTOR: &str = "pom.xml";

#[derive(Debug)]
enum FilePath {
    Java(PathBuf),
    UnitDescriptor(PathBuf),
}

/// One buildable, analyzable grouping of Java sources.
#[derive(Debug, Clone)]
pub struct Unit {
    /// Unit directory relative to the scan root, `.` for the root itself.
    pub name: String,
    pub dir: PathBuf,
    /// Source files relative to `dir`, sorted.
    pub src_files: Vec<PathBuf>,
}

impl Unit {
    /// The JDK checkout is graphed without Maven; every other unit gets
    /// dependency resolution and a build.
    pub fn use_maven(&self) -> bool {
        !self.dir.to_string_lossy().contains(JDK_STDLIB_REPO)
    }

    /// Where Maven puts compiled classes, the unit's own classpath entry.
    pub fn project_classpath(&self) -> PathBuf {
        self.dir.join("target").join("classes")
    }
}

/// Walks the tree under `root` and groups every Java source file under the
/// nearest enclosing unit descriptor. Sources outside any unit, and
/// anything under a `target` build directory, are ignored.
#[instrument(skip_all)]
pub fn discover_units(root: &Path) -> Vec<Unit> {
    let paths: Vec<FilePath> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    return None;
                }
            };

            if entry.file_type().is_dir() {
                return None;
            }

            let path = entry.path();
            if path.components().any(|c| c.as_os_str() == "target") {
                return None;
            }

            if path.extension().unwrap_or_else(|| OsStr::new("")) == "java" {
                Some(FilePath::Java(path))
            } else if path.file_name() == Some(OsStr::new(UNIT_DESCRIPTOR)) {
                Some(FilePath::UnitDescriptor(path))
            } else {
                None
            }
        })
        .collect();

    let mut unit_dirs: Vec<PathBuf> = Vec::new();
    let mut java_files: Vec<PathBuf> = Vec::new();
    for path in paths {
        match path {
            FilePath::UnitDescriptor(descriptor) => {
                unit_dirs.push(descriptor.parent().unwrap_or(root).to_owned());
            }
            FilePath::Java(source) => java_files.push(source),
        }
    }
    debug!("found {} units and {} java files", unit_dirs.len(), java_files.len());

    let mut units: Vec<Unit> = unit_dirs
        .iter()
        .sorted()
        .map(|dir| Unit { name: unit_name(root, dir), dir: dir.clone(), src_files: Vec::new() })
        .collect();

    // Nested units own their own sources, so each file goes to the deepest
    // enclosing unit directory.
    for file in java_files.iter().sorted() {
        let owner = units
            .iter_mut()
            .filter(|unit| file.starts_with(&unit.dir))
            .max_by_key(|unit| unit.dir.components().count());

        if let Some(unit) = owner {
            if let Ok(relative) = file.strip_prefix(&unit.dir) {
                unit.src_files.push(relative.to_owned());
            }
        }
    }

    units
}

fn unit_name(root: &Path, dir: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.to_string_lossy().into_owned(),
        _ => ".".to_owned(),
    }
}
