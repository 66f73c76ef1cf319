//! Read-only query surface over a roadmap document

use crate::{
    Document, EntityKind, MaterialSystem, Opportunity, Product, Program, Supplier, Task, TaskKey,
    TaskSource,
};

/// Lookup by id and cross-reference queries over the roadmap entities.
///
/// Only the raw collections are required; every query has a default
/// implementation on top of them.
pub trait EntityStore {
    fn programs(&self) -> &[Program];
    fn products(&self) -> &[Product];
    fn material_systems(&self) -> &[MaterialSystem];
    fn suppliers(&self) -> &[Supplier];
    fn opportunities(&self) -> &[Opportunity];

    fn find_program(&self, id: &str) -> Option<&Program> {
        self.programs().iter().find(|p| p.id == id)
    }

    fn find_product(&self, id: &str) -> Option<&Product> {
        self.products().iter().find(|p| p.id == id)
    }

    fn find_material_system(&self, id: &str) -> Option<&MaterialSystem> {
        self.material_systems().iter().find(|m| m.id == id)
    }

    fn find_supplier(&self, id: &str) -> Option<&Supplier> {
        self.suppliers().iter().find(|s| s.id == id)
    }

    fn find_opportunity(&self, id: &str) -> Option<&Opportunity> {
        self.opportunities().iter().find(|o| o.id == id)
    }

    /// Roadmap task addressed by `key`
    fn find_task(&self, key: &TaskKey) -> Option<&Task> {
        let roadmap = match &key.source {
            TaskSource::Product(id) => &self.find_product(id)?.roadmap,
            TaskSource::Material(id) => &self.find_material_system(id)?.roadmap,
        };
        roadmap.get(key.index)
    }

    /// Whether an entity of `kind` has this id
    fn has_entity(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Program => self.find_program(id).is_some(),
            EntityKind::Product => self.find_product(id).is_some(),
            EntityKind::MaterialSystem => self.find_material_system(id).is_some(),
            EntityKind::Supplier => self.find_supplier(id).is_some(),
            EntityKind::Opportunity => self.find_opportunity(id).is_some(),
        }
    }

    /// Kind of the entity with this id, searching collections in `EntityKind::ALL` order
    fn entity_kind(&self, id: &str) -> Option<EntityKind> {
        EntityKind::ALL.into_iter().find(|&kind| self.has_entity(kind, id))
    }

    /// Display name of any entity
    fn entity_name(&self, id: &str) -> Option<&str> {
        let kind = self.entity_kind(id)?;
        let name = match kind {
            EntityKind::Program => &self.find_program(id)?.name,
            EntityKind::Product => &self.find_product(id)?.name,
            EntityKind::MaterialSystem => &self.find_material_system(id)?.name,
            EntityKind::Supplier => &self.find_supplier(id)?.name,
            EntityKind::Opportunity => &self.find_opportunity(id)?.name,
        };
        Some(name.as_str())
    }

    /// Products that serve the program
    fn products_in_program(&self, program_id: &str) -> Vec<&Product> {
        self.products()
            .iter()
            .filter(|p| p.programs.iter().any(|id| id == program_id))
            .collect()
    }

    /// Products built from the material system
    fn products_using_material(&self, material_id: &str) -> Vec<&Product> {
        self.products()
            .iter()
            .filter(|p| p.material_systems.iter().any(|id| id == material_id))
            .collect()
    }

    /// Suppliers providing the material system
    fn suppliers_of_material(&self, material_id: &str) -> Vec<&Supplier> {
        self.suppliers()
            .iter()
            .filter(|s| s.materials.iter().any(|id| id == material_id))
            .collect()
    }

    /// Opportunities whose related entity is `entity_id`
    fn opportunities_for(&self, entity_id: &str) -> Vec<&Opportunity> {
        self.opportunities()
            .iter()
            .filter(|o| o.related_entity.as_deref() == Some(entity_id))
            .collect()
    }
}

impl EntityStore for Document {
    fn programs(&self) -> &[Program] {
        &self.programs
    }

    fn products(&self) -> &[Product] {
        &self.products
    }

    fn material_systems(&self) -> &[MaterialSystem] {
        &self.material_systems
    }

    fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    fn opportunities(&self) -> &[Opportunity] {
        &self.opportunities
    }
}
