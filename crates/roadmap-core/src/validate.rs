//! Semantic validation of a roadmap document
//!
//! Structural problems (missing `programs`, entities without `id` or `name`,
//! wrong JSON types) are rejected when the document is deserialized. This
//! module checks what the types cannot express: unique ids, references
//! between collections, and dates the timeline would silently drop.
//!
//! | Code | Severity | Meaning |
//! |------|----------|---------|
//! | E001 | error | Duplicate id within a collection |
//! | E002 | error | Empty id |
//! | W001 | warning | Product references an unknown program |
//! | W002 | warning | Product references an unknown material system |
//! | W003 | warning | Supplier references an unknown material system |
//! | W004 | warning | Material system references an unknown opportunity |
//! | W005 | warning | Opportunity relates to an unknown entity |
//! | W006 | warning | Unparseable date |
//! | W007 | warning | Product task without a recognized lane |
//! | W008 | warning | Task ends before it starts |

use std::collections::HashSet;

use serde::Serialize;

use crate::{parse_date, Document, EntityStore, Milestone, Task};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single validation finding
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    /// Path of the offending item, e.g. `products[P1].roadmap[2]`
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    fn error(code: &'static str, location: String, message: String) -> Self {
        Self {
            severity: Severity::Error,
            code,
            location,
            message,
        }
    }

    fn warning(code: &'static str, location: String, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            location,
            message,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}]: {} ({})",
            self.severity, self.code, self.message, self.location
        )
    }
}

/// True when any diagnostic is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Check a document, returning every finding (errors first, then warnings)
pub fn validate(doc: &Document) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    check_ids(&mut out, "programs", doc.programs.iter().map(|p| p.id.as_str()));
    check_ids(&mut out, "products", doc.products.iter().map(|p| p.id.as_str()));
    check_ids(
        &mut out,
        "materialSystems",
        doc.material_systems.iter().map(|m| m.id.as_str()),
    );
    check_ids(&mut out, "suppliers", doc.suppliers.iter().map(|s| s.id.as_str()));
    check_ids(
        &mut out,
        "cradOpportunities",
        doc.opportunities.iter().map(|o| o.id.as_str()),
    );

    for program in &doc.programs {
        if let Some(raw) = program.need_date.as_deref() {
            if parse_date(raw).is_none() {
                out.push(Diagnostic::warning(
                    "W006",
                    format!("programs[{}].needDate", program.id),
                    format!("unparseable need date {:?}", raw),
                ));
            }
        }
    }

    for product in &doc.products {
        let at = format!("products[{}]", product.id);
        for program_id in &product.programs {
            if doc.find_program(program_id).is_none() {
                out.push(Diagnostic::warning(
                    "W001",
                    format!("{}.programs", at),
                    format!("unknown program {:?}", program_id),
                ));
            }
        }
        for material_id in &product.material_systems {
            if doc.find_material_system(material_id).is_none() {
                out.push(Diagnostic::warning(
                    "W002",
                    format!("{}.materialSystems", at),
                    format!("unknown material system {:?}", material_id),
                ));
            }
        }
        for (i, task) in product.roadmap.iter().enumerate() {
            let task_at = format!("{}.roadmap[{}]", at, i);
            if task.lane_kind().is_none() {
                out.push(Diagnostic::warning(
                    "W007",
                    task_at.clone(),
                    format!(
                        "task {:?} has no recognized lane ({:?}); it will not be displayed",
                        task.label(),
                        task.lane.as_deref().unwrap_or("")
                    ),
                ));
            }
            check_task_dates(&mut out, &task_at, task);
        }
        check_milestones(&mut out, &at, &product.milestones);
    }

    for material in &doc.material_systems {
        let at = format!("materialSystems[{}]", material.id);
        for opp_id in &material.related_opportunities {
            if doc.find_opportunity(opp_id).is_none() {
                out.push(Diagnostic::warning(
                    "W004",
                    format!("{}.relatedOpportunities", at),
                    format!("unknown opportunity {:?}", opp_id),
                ));
            }
        }
        for (i, task) in material.roadmap.iter().enumerate() {
            check_task_dates(&mut out, &format!("{}.roadmap[{}]", at, i), task);
        }
        check_milestones(&mut out, &at, &material.milestones);
    }

    for supplier in &doc.suppliers {
        let at = format!("suppliers[{}]", supplier.id);
        for material_id in &supplier.materials {
            if doc.find_material_system(material_id).is_none() {
                out.push(Diagnostic::warning(
                    "W003",
                    format!("{}.materials", at),
                    format!("unknown material system {:?}", material_id),
                ));
            }
        }
        for (i, task) in supplier.roadmap_tasks().iter().enumerate() {
            check_task_dates(
                &mut out,
                &format!("{}.supplierRoadmap.tasks[{}]", at, i),
                task,
            );
        }
    }

    for opp in &doc.opportunities {
        if let Some(related) = opp.related_entity.as_deref() {
            if !related.is_empty() && doc.entity_kind(related).is_none() {
                out.push(Diagnostic::warning(
                    "W005",
                    format!("cradOpportunities[{}].relatedEntity", opp.id),
                    format!("unknown related entity {:?}", related),
                ));
            }
        }
    }

    // Stable: keeps document order within each severity
    out.sort_by(|a, b| b.severity.cmp(&a.severity));
    out
}

fn check_ids<'a>(out: &mut Vec<Diagnostic>, collection: &str, ids: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for (i, id) in ids.enumerate() {
        if id.trim().is_empty() {
            out.push(Diagnostic::error(
                "E002",
                format!("{}[{}]", collection, i),
                "empty id".into(),
            ));
        } else if !seen.insert(id) {
            out.push(Diagnostic::error(
                "E001",
                format!("{}[{}]", collection, i),
                format!("duplicate id {:?}", id),
            ));
        }
    }
}

fn check_task_dates(out: &mut Vec<Diagnostic>, at: &str, task: &Task) {
    let start = check_date(out, &format!("{}.start", at), task.start.as_deref());
    let end = check_date(out, &format!("{}.end", at), task.end.as_deref());
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            out.push(Diagnostic::warning(
                "W008",
                at.to_string(),
                format!("task {:?} ends ({}) before it starts ({})", task.label(), end, start),
            ));
        }
    }
}

fn check_milestones(out: &mut Vec<Diagnostic>, at: &str, milestones: &[Milestone]) {
    for (i, milestone) in milestones.iter().enumerate() {
        check_date(
            out,
            &format!("{}.milestones[{}].date", at, i),
            milestone.date.as_deref(),
        );
    }
}

fn check_date(out: &mut Vec<Diagnostic>, at: &str, raw: Option<&str>) -> Option<chrono::NaiveDate> {
    let parsed = raw.and_then(parse_date);
    if parsed.is_none() {
        out.push(Diagnostic::warning(
            "W006",
            at.to_string(),
            match raw {
                Some(raw) => format!("unparseable date {:?}", raw),
                None => "missing date".into(),
            },
        ));
    }
    parsed
}
