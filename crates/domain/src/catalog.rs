//! Products and categories.

use common::{
    Category, CategoryDraft, CategoryId, CategoryUpdate, Product, ProductDraft, ProductId,
    ProductUpdate, StoreId,
};
use storage::{Storage, StorageExt};

use crate::error::{DomainError, Result};
use crate::validation::ValidationErrors;

/// Validates catalog writes and delegates to storage.
#[derive(Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S: Storage> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists products of one store, or of both when `store` is `None`.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, store: Option<StoreId>) -> Result<Vec<Product>> {
        Ok(self.store.list_products(store).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn create_product(&self, mut draft: ProductDraft) -> Result<Product> {
        draft.name = draft.name.trimmed();
        draft.description = draft.description.trimmed();
        draft.price = draft.price.round();

        let mut errors = ValidationErrors::new();
        errors.require_bilingual("name", &draft.name);
        errors.require_bilingual("description", &draft.description);
        errors.require_price("price", draft.price);
        if !self.store.category_exists(draft.category).await? {
            errors.add("category", "does not match an existing category");
        }
        errors.finish()?;

        let product = self.store.create_product(draft).await?;
        tracing::info!(product_id = %product.id, store = %product.store, "product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_product(&self, id: ProductId, mut update: ProductUpdate) -> Result<Product> {
        update.name = update.name.map(|n| n.trimmed());
        update.description = update.description.map(|d| d.trimmed());
        update.price = update.price.map(|p| p.round());

        let mut errors = ValidationErrors::new();
        if let Some(name) = &update.name {
            errors.require_bilingual("name", name);
        }
        if let Some(description) = &update.description {
            errors.require_bilingual("description", description);
        }
        if let Some(price) = update.price {
            errors.require_price("price", price);
        }
        if let Some(category) = update.category
            && !self.store.category_exists(category).await?
        {
            errors.add("category", "does not match an existing category");
        }
        errors.finish()?;

        self.store
            .update_product(id, update)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        if !self.store.delete_product(id).await? {
            return Err(DomainError::not_found("Product", id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    /// Creates a category. Slugs must match `^[a-z0-9-]+$` and be unique.
    #[tracing::instrument(skip(self, draft))]
    pub async fn create_category(&self, mut draft: CategoryDraft) -> Result<Category> {
        draft.name = draft.name.trimmed();
        draft.description = draft.description.map(|d| d.trimmed());
        draft.slug = draft.slug.trim().to_string();

        let mut errors = ValidationErrors::new();
        errors.require_bilingual("name", &draft.name);
        errors.require_slug("slug", &draft.slug);
        errors.finish()?;

        if self.store.get_category_by_slug(&draft.slug).await?.is_some() {
            return Err(slug_taken(&draft.slug));
        }

        let category = self.store.create_category(draft).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        mut update: CategoryUpdate,
    ) -> Result<Category> {
        update.name = update.name.map(|n| n.trimmed());
        update.description = update.description.map(|d| d.trimmed());
        update.slug = update.slug.map(|s| s.trim().to_string());

        let mut errors = ValidationErrors::new();
        if let Some(name) = &update.name {
            errors.require_bilingual("name", name);
        }
        if let Some(slug) = &update.slug {
            errors.require_slug("slug", slug);
        }
        errors.finish()?;

        if let Some(slug) = &update.slug
            && let Some(existing) = self.store.get_category_by_slug(slug).await?
            && existing.id != id
        {
            return Err(slug_taken(slug));
        }

        self.store
            .update_category(id, update)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    /// Deletes a category. Products that reference it are left as they are.
    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        if !self.store.delete_category(id).await? {
            return Err(DomainError::not_found("Category", id));
        }
        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }
}

fn slug_taken(slug: &str) -> DomainError {
    DomainError::Conflict(format!("A category with slug '{slug}' already exists"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Bilingual, Money};
    use storage::{BootstrapAdmin, JsonFileStore};

    fn service(dir: &tempfile::TempDir) -> CatalogService<JsonFileStore> {
        CatalogService::new(JsonFileStore::with_bootstrap_admin(
            dir.path(),
            BootstrapAdmin {
                bcrypt_cost: 4,
                ..BootstrapAdmin::default()
            },
        ))
    }

    fn category_draft(slug: &str) -> CategoryDraft {
        CategoryDraft {
            name: Bilingual::new("Nuts", "مكسرات"),
            description: None,
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn slug_with_spaces_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = service(&dir);

        let err = catalog
            .create_category(category_draft("Dairy Products"))
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.has("slug")),
            other => panic!("expected validation error, got {other:?}"),
        }

        let created = catalog
            .create_category(category_draft("roasted-nuts"))
            .await
            .unwrap();
        assert_eq!(created.slug, "roasted-nuts");
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = service(&dir);

        catalog.create_category(category_draft("nuts")).await.unwrap();
        let err = catalog
            .create_category(category_draft("nuts"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn renaming_a_category_to_its_own_slug_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = service(&dir);

        let created = catalog.create_category(category_draft("nuts")).await.unwrap();
        let updated = catalog
            .update_category(
                created.id,
                CategoryUpdate {
                    slug: Some("nuts".to_string()),
                    ..CategoryUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "nuts");
    }

    #[tokio::test]
    async fn product_needs_price_names_and_known_category() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = service(&dir);

        let err = catalog
            .create_product(ProductDraft {
                name: Bilingual::new("Almonds", ""),
                description: Bilingual::new("Raw almonds", "لوز نيء"),
                price: Money::zero(),
                image: None,
                category: CategoryId::new(),
                weight: None,
                origin: None,
                store: StoreId::Cilka,
            })
            .await
            .unwrap_err();

        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has("name.ar"));
        assert!(errors.has("price"));
        assert!(errors.has("category"));
        assert!(!errors.has("description.en"));
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = service(&dir);

        let err = catalog.get_product(ProductId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Product", .. }));
        let err = catalog.delete_product(ProductId::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
