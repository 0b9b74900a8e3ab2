//! Package/mapping path reconciliation.
//!
//! A run can name its packages in several ways: one path, a list of paths, a
//! toggle choosing between the two, or one path field that is itself a
//! `|`-delimited list. [`PathInput`] captures which of these was supplied and
//! [`reconcile`] turns it into the final ordered list of [`UploadTarget`]s.
//!
//! Mapping files pair with packages strictly by position. A missing mapping
//! entry means "no mapping file for this package"; surplus mapping entries are
//! dropped with a notice.

use apkdeploy_schema::UploadTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The raw path inputs, before a strategy is chosen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPaths {
    pub single_package: String,
    pub package_list: Vec<String>,
    pub single_mapping: String,
    pub mapping_list: Vec<String>,
    /// Explicit list-mode toggle, if the caller set one.
    pub use_list: Option<bool>,
}

/// How packages were supplied for this run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PathInput {
    /// Single path merged into the list; the list wins on mapping conflicts.
    Merged {
        single_package: String,
        package_list: Vec<String>,
        single_mapping: String,
        mapping_list: Vec<String>,
    },
    /// The toggle picks the single path or the list wholesale.
    Toggle {
        use_list: bool,
        single_package: String,
        package_list: Vec<String>,
        single_mapping: String,
        mapping_list: Vec<String>,
    },
    /// One `|`-delimited field. Mapping list entries pair by position; a
    /// package with no list entry takes the one mapping path.
    Delimited {
        packages: String,
        mapping: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        mapping_list: Vec<String>,
    },
    /// Only the lists were supplied.
    List {
        package_list: Vec<String>,
        mapping_list: Vec<String>,
    },
}

impl PathInput {
    /// Choose the strategy from what was actually supplied.
    pub fn from_raw(raw: RawPaths) -> Self {
        let RawPaths {
            single_package,
            package_list,
            single_mapping,
            mapping_list,
            use_list,
        } = raw;

        if let Some(use_list) = use_list {
            return PathInput::Toggle {
                use_list,
                single_package,
                package_list,
                single_mapping,
                mapping_list,
            };
        }

        if package_list.is_empty() && single_package.contains(apkdeploy_env::LIST_SEPARATOR) {
            return PathInput::Delimited {
                packages: single_package,
                mapping: single_mapping,
                mapping_list,
            };
        }

        if single_package.is_empty() && !package_list.is_empty() {
            return PathInput::List {
                package_list,
                mapping_list,
            };
        }

        PathInput::Merged {
            single_package,
            package_list,
            single_mapping,
            mapping_list,
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            PathInput::Merged { .. } => "merged",
            PathInput::Toggle { .. } => "toggle",
            PathInput::Delimited { .. } => "delimited",
            PathInput::List { .. } => "list",
        }
    }
}

/// Something the caller should warn about. Never an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// More mapping entries than packages; the tail was discarded.
    ExcessMappings { ignored: Vec<String> },
    /// The single mapping disagreed with the list's entry for the same package.
    MappingConflict {
        package: String,
        kept: String,
        ignored: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ExcessMappings { ignored } => write!(
                f,
                "more mapping paths than package paths, ignoring: {}",
                ignored.join(", ")
            ),
            Notice::MappingConflict {
                package,
                kept,
                ignored,
            } => write!(
                f,
                "mapping for {package} is set both in the list ({kept}) and as mapping_path ({ignored}), using the list value"
            ),
        }
    }
}

/// The reconciled targets plus anything worth warning about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub targets: Vec<UploadTarget>,
    pub notices: Vec<Notice>,
}

impl Reconciliation {
    pub fn package_paths(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.package_path.as_str()).collect()
    }

    pub fn mapping_paths(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.mapping_path.as_str()).collect()
    }
}

/// Resolve the input into the final, ordered target list.
pub fn reconcile(input: &PathInput) -> Reconciliation {
    match input {
        PathInput::Merged {
            single_package,
            package_list,
            single_mapping,
            mapping_list,
        } => merge(single_package, package_list, single_mapping, mapping_list),
        PathInput::Toggle {
            use_list: true,
            package_list,
            mapping_list,
            ..
        } => pair_lists(package_list, mapping_list),
        PathInput::Toggle {
            use_list: false,
            single_package,
            single_mapping,
            ..
        } => single(single_package, single_mapping),
        PathInput::Delimited {
            packages,
            mapping,
            mapping_list,
        } => delimited(packages, mapping, mapping_list),
        PathInput::List {
            package_list,
            mapping_list,
        } => pair_lists(package_list, mapping_list),
    }
}

/// Pad `mappings` with empty entries, or truncate it, to `len`.
///
/// Returns the discarded tail when truncating.
pub fn fit_mappings(mappings: &[String], len: usize) -> (Vec<String>, Vec<String>) {
    let mut fitted: Vec<String> = mappings.iter().take(len).cloned().collect();
    let ignored: Vec<String> = mappings.iter().skip(len).cloned().collect();
    fitted.resize(len, String::new());
    (fitted, ignored)
}

fn single(package: &str, mapping: &str) -> Reconciliation {
    let targets = if package.is_empty() {
        Vec::new()
    } else {
        vec![UploadTarget::new(package, mapping)]
    };
    Reconciliation {
        targets,
        notices: Vec::new(),
    }
}

fn pair_lists(packages: &[String], mappings: &[String]) -> Reconciliation {
    let (mappings, ignored) = fit_mappings(mappings, packages.len());
    let mut notices = Vec::new();
    if !ignored.is_empty() {
        notices.push(Notice::ExcessMappings { ignored });
    }
    Reconciliation {
        targets: zip_targets(packages, &mappings),
        notices,
    }
}

fn delimited(packages: &str, mapping: &str, mapping_list: &[String]) -> Reconciliation {
    let packages = apkdeploy_env::split_list(packages);
    let (mut mappings, ignored) = fit_mappings(mapping_list, packages.len());
    for slot in mappings.iter_mut().filter(|m| m.is_empty()) {
        *slot = mapping.to_string();
    }
    let mut notices = Vec::new();
    if !ignored.is_empty() {
        notices.push(Notice::ExcessMappings { ignored });
    }
    Reconciliation {
        targets: zip_targets(&packages, &mappings),
        notices,
    }
}

fn merge(
    single_package: &str,
    package_list: &[String],
    single_mapping: &str,
    mapping_list: &[String],
) -> Reconciliation {
    let mut packages = package_list.to_vec();
    let (mut mappings, ignored) = fit_mappings(mapping_list, packages.len());
    let mut notices = Vec::new();
    if !ignored.is_empty() {
        notices.push(Notice::ExcessMappings { ignored });
    }

    if !single_package.is_empty() {
        match packages.iter().position(|p| p == single_package) {
            None => {
                packages.push(single_package.to_string());
                mappings.push(single_mapping.to_string());
            }
            Some(idx) if !single_mapping.is_empty() => {
                let existing = &mut mappings[idx];
                if existing.is_empty() {
                    *existing = single_mapping.to_string();
                } else if existing != single_mapping {
                    notices.push(Notice::MappingConflict {
                        package: single_package.to_string(),
                        kept: existing.clone(),
                        ignored: single_mapping.to_string(),
                    });
                }
            }
            Some(_) => {}
        }
    }

    Reconciliation {
        targets: zip_targets(&packages, &mappings),
        notices,
    }
}

fn zip_targets(packages: &[String], mappings: &[String]) -> Vec<UploadTarget> {
    packages
        .iter()
        .enumerate()
        .map(|(i, p)| UploadTarget::new(p.clone(), mappings.get(i).cloned().unwrap_or_default()))
        .collect()
}
