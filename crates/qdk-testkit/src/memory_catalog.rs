use qdk_catalog::{CatalogError, CatalogReader, Product};

/// Table-backed catalog fake.
pub struct MemoryCatalog {
    rows: Vec<Product>,
}

impl MemoryCatalog {
    pub fn new(rows: Vec<Product>) -> Self {
        Self { rows }
    }
}

impl CatalogReader for MemoryCatalog {
    fn get_product(
        &self,
        internal_id: &str,
        city: &str,
    ) -> Result<Option<Product>, CatalogError> {
        Ok(self
            .rows
            .iter()
            .find(|p| p.internal_id == internal_id && p.city == city)
            .cloned())
    }

    fn list_by_city(&self, city: &str) -> Result<Vec<Product>, CatalogError> {
        let mut out: Vec<Product> = self
            .rows
            .iter()
            .filter(|p| p.city == city && p.active)
            .cloned()
            .collect();
        out.sort_by(|a, b| (a.order, &a.title).cmp(&(b.order, &b.title)));
        Ok(out)
    }

    fn list_by_code(&self, internal_id: &str) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .rows
            .iter()
            .filter(|p| p.internal_id == internal_id)
            .cloned()
            .collect())
    }
}
