//! Read-only inspection of a layout: what apply would do, and whether it holds.

use crate::constants;
use crate::core::layout::Layout;
use crate::core::provision::Provisioner;
use crate::models::report::{Check, PlanReport, VerifyReport};
use crate::util::fs as prov_fs;
use crate::util::privilege::Privilege;
use std::path::{Path, PathBuf};

/// Entries listed in a failing permission check before eliding the rest.
const MAX_LISTED: usize = 5;

/// Nearest existing ancestor of `path` (itself included) when it is not a directory.
fn blocking_component(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .find(|a| a.exists())
        .filter(|a| !a.is_dir())
        .map(Path::to_path_buf)
}

pub fn plan(layout: &Layout, privilege: Privilege) -> PlanReport {
    let mut issues = Vec::new();

    if let Err(e) = Provisioner::new(layout, privilege).preflight() {
        issues.push(e.to_string());
    }

    let mut directories_to_create = Vec::new();
    for dir in layout.directories() {
        if dir.is_dir() {
            continue;
        }
        if let Some(blocker) = blocking_component(dir) {
            issues.push(format!(
                "{} is not a directory (blocks {})",
                blocker.display(),
                dir.display()
            ));
        }
        directories_to_create.push(dir.to_path_buf());
    }

    let placeholder_to_create = if layout.placeholder.exists() {
        if !layout.placeholder.is_file() {
            issues.push(format!(
                "{} exists but is not a regular file",
                layout.placeholder.display()
            ));
        }
        None
    } else {
        Some(layout.placeholder.clone())
    };

    let entries_to_relax = if layout.root.exists() {
        match prov_fs::scan_missing_bits(&layout.root, constants::RELAX_MODE_BITS, 0) {
            Ok(missing) => missing.count,
            Err(e) => {
                issues.push(format!("cannot inspect permissions: {:#}", e));
                0
            }
        }
    } else {
        0
    };

    PlanReport {
        root: layout.root.clone(),
        privilege,
        can_apply: issues.is_empty(),
        directories_to_create,
        placeholder_to_create,
        entries_to_relax,
        issues,
    }
}

pub fn verify(layout: &Layout) -> VerifyReport {
    let mut checks = Vec::new();

    for dir in layout.directories() {
        if dir.is_dir() {
            checks.push(Check::pass(format!("directory exists: {}", dir.display())));
        } else {
            checks.push(Check::fail(format!("directory missing: {}", dir.display())));
        }
    }

    if layout.placeholder.is_file() {
        checks.push(Check::pass(format!(
            "placeholder exists: {}",
            layout.placeholder.display()
        )));
    } else {
        checks.push(Check::fail(format!(
            "placeholder missing: {}",
            layout.placeholder.display()
        )));
    }

    match prov_fs::scan_missing_bits(&layout.root, constants::RELAX_MODE_BITS, MAX_LISTED) {
        Ok(missing) if missing.is_empty() => checks.push(Check::pass(format!(
            "all entries under {} carry g+rw,o+rw",
            layout.root.display()
        ))),
        Ok(missing) => {
            let mut listed: Vec<String> = missing
                .sample
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            if missing.count > listed.len() {
                listed.push(format!("... {} more", missing.count - listed.len()));
            }
            checks.push(Check::fail(format!(
                "{} entries lack g+rw,o+rw: {}",
                missing.count,
                listed.join(", ")
            )));
        }
        Err(e) => checks.push(Check::fail(format!("cannot inspect permissions: {:#}", e))),
    }

    VerifyReport {
        root: layout.root.clone(),
        checks,
    }
}
