//! Product development status box
//!
//! Shown on each product's detail view, next to its timeline:
//! - TRL of the product and MRL of the active material system
//! - Material Systems, Design, Manufacturing and Quality quadrants
//!
//! Material-specific blocks carry `class="quad-material"` and a
//! `data-material-id`; only the active material's blocks are visible. The page
//! controller switches them when a facet button of the product's timeline is
//! pressed.
//!
//! Most of these fields are not part of the typed model and are read from the
//! entities' extra fields (`trl`, `mrl`, `designTools`, `qualifiedMachines`, ...).

use roadmap_core::{Document, EntityStore, Extra, MaterialSystem, Product};
use roadmap_layout::material_facets;
use serde_json::Value;

use crate::html_escape;
use crate::page::link;

const TRL_MAX: u64 = 9;
const MRL_MAX: u64 = 10;

/// Render the status box of `product` with `active` as the visible material
pub(crate) fn render_status_box(doc: &Document, product: &Product, active: Option<&str>) -> String {
    let materials: Vec<&MaterialSystem> = material_facets(doc, product)
        .iter()
        .filter_map(|facet| doc.find_material_system(&facet.id))
        .collect();

    let mut html = format!(
        "            <div class=\"status-box\" data-product-id=\"{}\">\n                <h3>Product Development Status</h3>\n                <div class=\"readiness\">\n",
        html_escape(&product.id)
    );
    html.push_str(&level_bar("TRL", "trl", level(&product.extra, "trl", TRL_MAX), TRL_MAX));
    if materials.is_empty() {
        html.push_str(&level_bar("MRL", "mrl", None, MRL_MAX));
    }
    for material in &materials {
        html.push_str(&material_block(
            material,
            active,
            &level_bar("MRL", "mrl", level(&material.extra, "mrl", MRL_MAX), MRL_MAX),
        ));
    }
    html.push_str("                </div>\n                <div class=\"quad-box\">\n");

    let mut section = String::new();
    for material in &materials {
        section.push_str(&material_block(material, active, &material_details(doc, material)));
    }
    html.push_str(&quadrant("Material Systems", "material-section", &section));

    let mut section = bullet_list("Design Tools", &extra_list(&product.extra, "designTools"));
    section.push_str(&bullet_list("Documentation", &extra_list(&product.extra, "documentation")));
    html.push_str(&quadrant("Design", "design-section", &section));

    let mut section = String::new();
    for material in &materials {
        section.push_str(&material_block(material, active, &manufacturing_details(doc, material)));
    }
    section.push_str(&bullet_list(
        "Product-Specific Machines",
        &extra_list(&product.extra, "relevantMachines"),
    ));
    section.push_str(&post_processing_suppliers(doc, product));
    html.push_str(&quadrant("Manufacturing", "manufacturing-section", &section));

    let mut section = String::new();
    for material in &materials {
        let ndt: Vec<String> = material.standard_ndt.iter().map(|s| html_escape(s)).collect();
        section.push_str(&material_block(material, active, &bullet_list("Standard NDT", &ndt)));
    }
    section.push_str(&bullet_list("Product Specific NDT", &extra_list(&product.extra, "specialNDT")));
    section.push_str(&bullet_list("Part Acceptance", &extra_list(&product.extra, "partAcceptance")));
    html.push_str(&quadrant("Quality", "quality-section", &section));

    html.push_str("                </div>\n            </div>\n");
    html
}

fn quadrant(title: &str, class: &str, content: &str) -> String {
    let content = if content.is_empty() {
        "                        <p class=\"quad-empty\">Nothing recorded</p>\n"
    } else {
        content
    };
    format!(
        "                    <div class=\"quad-section {}\">\n                        <h4>{}</h4>\n{}                    </div>\n",
        class, title, content
    )
}

/// Wrap material-specific content; hidden unless `material` is active
fn material_block(material: &MaterialSystem, active: Option<&str>, content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    let hidden = if active == Some(material.id.as_str()) { "" } else { " hidden" };
    format!(
        "                        <div class=\"quad-material\" data-material-id=\"{}\"{}>\n{}                        </div>\n",
        html_escape(&material.id),
        hidden,
        content
    )
}

fn level_bar(label: &str, class: &str, value: Option<u64>, max: u64) -> String {
    let (width, current) = match value {
        Some(value) => (value * 100 / max, value.to_string()),
        None => (0, "N/A".to_string()),
    };
    format!(
        r#"                    <div class="level">
                        <h4>{label}</h4>
                        <div class="level-track"><div class="level-bar {class}-level" style="width: {width}%;"><span class="level-current">{current}</span></div></div>
                        <div class="level-range"><span>1</span><span>{max}</span></div>
                    </div>
"#,
        label = label,
        class = class,
        width = width,
        current = current,
        max = max,
    )
}

fn material_details(doc: &Document, material: &MaterialSystem) -> String {
    let text = |value: Option<String>| value.map(|v| html_escape(&v)).unwrap_or_else(|| "N/A".into());
    let mut html = format!(
        "                            <h5>{}</h5>\n",
        link(doc, &material.id)
    );
    for (label, value) in [
        ("Process", text(extra_text(&material.extra, "process"))),
        ("Qualification", text(material.qualification.clone())),
        ("Qualification Class", text(material.qualification_class.clone())),
        ("Statistical Basis", text(extra_text(&material.extra, "statisticalBasis"))),
    ] {
        html.push_str(&format!(
            "                            <p><strong>{}:</strong> {}</p>\n",
            label, value
        ));
    }
    html.push_str(&bullet_list(
        "Post Processing",
        &extra_list(&material.extra, "postProcessing"),
    ));
    html
}

fn manufacturing_details(doc: &Document, material: &MaterialSystem) -> String {
    let mut html = bullet_list(
        "Qualified Machines",
        &extra_list(&material.extra, "qualifiedMachines"),
    );
    let suppliers: Vec<String> = doc
        .suppliers_of_material(&material.id)
        .iter()
        .map(|supplier| link(doc, &supplier.id))
        .collect();
    html.push_str(&bullet_list("Printing Suppliers", &suppliers));
    html
}

/// `postProcessingSuppliers: [{ "supplier": "SUP1", "process": "HIP" }]`
fn post_processing_suppliers(doc: &Document, product: &Product) -> String {
    let Some(Value::Array(entries)) = product.extra.get("postProcessingSuppliers") else {
        return String::new();
    };
    let items: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            let supplier = entry.get("supplier")?.as_str()?;
            let process = entry.get("process").map(value_text).unwrap_or_default();
            Some(if process.is_empty() {
                link(doc, supplier)
            } else {
                format!("{} ({})", link(doc, supplier), html_escape(&process))
            })
        })
        .collect();
    bullet_list("Post Processing Suppliers", &items)
}

/// A titled list of already-escaped items, empty when there are none
fn bullet_list(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut html = format!("                            <h5>{}</h5>\n                            <ul>\n", title);
    for item in items {
        html.push_str(&format!("                                <li>{}</li>\n", item));
    }
    html.push_str("                            </ul>\n");
    html
}

/// Plain text of a JSON value; strings unquoted, null empty
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn extra_text(extra: &Extra, key: &str) -> Option<String> {
    extra.get(key).map(value_text).filter(|s| !s.is_empty())
}

/// Escaped entries of a string array (a lone string counts as one entry)
fn extra_list(extra: &Extra, key: &str) -> Vec<String> {
    let values = match extra.get(key) {
        Some(Value::Array(items)) => items.iter().map(value_text).collect(),
        Some(value) => vec![value_text(value)],
        None => Vec::new(),
    };
    values
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(|s| html_escape(&s))
        .collect()
}

/// Readiness level in `1..=max`, from a number or a numeric string
fn level(extra: &Extra, key: &str, max: u64) -> Option<u64> {
    let value = match extra.get(key)? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (1..=max).contains(&value).then_some(value)
}

pub(crate) const STATUS_CSS: &str = r#"        .status-box { margin: 16px 0; }
        .readiness { display: grid; grid-template-columns: repeat(2, minmax(200px, 1fr)); gap: 16px; }
        .readiness .quad-material { display: contents; }
        .quad-material[hidden] { display: none; }
        .level h4 { margin: 0; }
        .level-track { height: 20px; background: #e9ecef; border-radius: 4px; margin: 6px 0; }
        .level-bar {
            height: 100%;
            min-width: 32px;
            border-radius: 4px;
            background: #0056b3;
            display: flex;
            align-items: center;
            justify-content: center;
        }
        .level-current { color: #fff; font-weight: 600; font-size: 12px; }
        .level-range { display: flex; justify-content: space-between; font-size: 12px; }
        .quad-box { display: grid; grid-template-columns: repeat(2, 1fr); gap: 12px; margin-top: 16px; }
        .quad-section {
            border: 1px solid #ddd;
            border-radius: 8px;
            padding: 12px;
            background: #f9f9f9;
            max-height: 350px;
            overflow: auto;
            font-size: 14px;
        }
        .quad-section h4 { margin: 0 0 8px; padding-bottom: 6px; border-bottom: 2px solid; }
        .quad-section h5 { margin: 10px 0 4px; }
        .quad-section ul { margin: 4px 0; padding-left: 20px; }
        .material-section h4 { color: #0056b3; border-color: #0056b3; }
        .design-section h4 { color: #2e7d32; border-color: #2e7d32; }
        .manufacturing-section h4 { color: #c2185b; border-color: #c2185b; }
        .quality-section h4 { color: #e65100; border-color: #e65100; }
        .quad-empty { color: #757575; font-style: italic; }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Document {
        let mut doc = Document::default();
        let mut product = Product::new("P1", "SatCom Terminal").material("MS1").material("MS2");
        product.extra.insert("trl".into(), json!(6));
        product.extra.insert("designTools".into(), json!(["CADPro", "<Sim>"]));
        product
            .extra
            .insert("postProcessingSuppliers".into(), json!([{ "supplier": "SUP1", "process": "HIP" }]));
        doc.products.push(product);

        let mut ti = MaterialSystem::new("MS1", "Ti-6Al-4V");
        ti.standard_ndt = vec!["CT".into()];
        ti.extra.insert("mrl".into(), json!("8"));
        ti.extra.insert("process".into(), json!("LPBF"));
        ti.extra.insert("qualifiedMachines".into(), json!(["EOS M290"]));
        doc.material_systems.push(ti);
        let mut inconel = MaterialSystem::new("MS2", "Inconel 718");
        inconel.extra.insert("mrl".into(), json!(12));
        doc.material_systems.push(inconel);

        let mut supplier = roadmap_core::Supplier::new("SUP1", "AeroSupplies Inc.");
        supplier.materials.push("MS1".into());
        doc.suppliers.push(supplier);
        doc
    }

    fn status(active: Option<&str>) -> String {
        let doc = document();
        render_status_box(&doc, &doc.products[0], active)
    }

    #[test]
    fn readiness_levels() {
        let html = status(Some("MS1"));
        assert!(html.contains(r#"class="level-bar trl-level" style="width: 66%;"><span class="level-current">6</span>"#));
        assert!(html.contains(r#"class="level-bar mrl-level" style="width: 80%;"><span class="level-current">8</span>"#));
        // Out of range counts as unknown
        assert!(html.contains(r#"class="level-bar mrl-level" style="width: 0%;"><span class="level-current">N/A</span>"#));
    }

    #[test]
    fn quadrants_follow_active_material() {
        let html = status(Some("MS2"));
        for title in ["Material Systems", "Design", "Manufacturing", "Quality"] {
            assert!(html.contains(&format!("<h4>{}</h4>", title)), "{title}");
        }
        assert_eq!(html.matches(r#"class="quad-material" data-material-id="MS1" hidden"#).count(), 4);
        assert_eq!(html.matches(r#"class="quad-material" data-material-id="MS2">"#).count(), 2);

        let html = status(Some("MS1"));
        assert!(!html.contains(r#"data-material-id="MS1" hidden"#));
        assert!(html.contains("<p><strong>Process:</strong> LPBF</p>"));
        assert!(html.contains("<li>EOS M290</li>"));
    }

    #[test]
    fn design_and_supplier_entries() {
        let html = status(Some("MS1"));
        assert!(html.contains("<li>&lt;Sim&gt;</li>"));
        assert!(html.contains(r#"data-target="suppliers:SUP1">AeroSupplies Inc.</a> (HIP)"#));
        assert!(html.contains("<h5>Printing Suppliers</h5>"));
    }

    #[test]
    fn product_without_materials() {
        let doc = Document::default();
        let html = render_status_box(&doc, &Product::new("P9", "Bare"), None);
        assert!(html.contains("<span class=\"level-current\">N/A</span>"));
        assert_eq!(html.matches("Nothing recorded").count(), 4);
        assert!(!html.contains("quad-material"));
    }
}
