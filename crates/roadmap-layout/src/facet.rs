//! Material facet selection for the M&P lane

use roadmap_core::{EntityStore, Lane, MaterialFacet, Product, TimelineLayout};

/// Material systems of `product` that resolve in `store`, in reference order,
/// without repeats
pub fn material_facets<S>(store: &S, product: &Product) -> Vec<MaterialFacet>
where
    S: EntityStore + ?Sized,
{
    let mut facets: Vec<MaterialFacet> = Vec::new();
    for id in &product.material_systems {
        if facets.iter().any(|f| &f.id == id) {
            continue;
        }
        if let Some(material) = store.find_material_system(id) {
            facets.push(MaterialFacet {
                id: material.id.clone(),
                name: material.name.clone(),
            });
        }
    }
    facets
}

/// The facet shown when none is requested: the first resolvable material
pub fn default_material_facet<S>(store: &S, product: &Product) -> Option<String>
where
    S: EntityStore + ?Sized,
{
    product
        .material_systems
        .iter()
        .find(|id| store.find_material_system(id).is_some())
        .cloned()
}

/// Show the M&P tasks of `material_id` and hide every other material's.
///
/// Only `visible` flags change; positions and stacking stay as computed.
pub fn set_active_material_facet(layout: &mut TimelineLayout, material_id: &str) {
    for lane in layout.lanes.iter_mut().filter(|l| l.lane == Lane::MaterialsAndProcesses) {
        for item in &mut lane.items {
            item.visible = item.material_id.as_deref() == Some(material_id);
        }
    }
    layout.active_material = Some(material_id.to_string());
}
