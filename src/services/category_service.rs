use async_trait::async_trait;
use std::sync::Arc;

use crate::models::category::{
    Category, CreateCategoryRequest, DEFAULT_CATEGORY_COLOR, GENERAL_CATEGORY_ID,
    RenameCategoryRequest,
};
use crate::repositories::{CategoryRepository, RepositoryError};
use crate::validation::category_slug;

/// Category service errors
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("name is required")]
    NameRequired,

    #[error("a category with that name already exists")]
    DuplicateName,

    #[error("the general category cannot be changed")]
    GeneralIsProtected,

    #[error("category not found")]
    CategoryNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Trait defining category service operations
#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Create a category whose id is the slug of its name
    async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<Category, CategoryError>;

    /// Rename a category; `general` is protected
    async fn rename_category(
        &self,
        id: &str,
        request: RenameCategoryRequest,
    ) -> Result<(), CategoryError>;

    /// Delete a category, moving its concepts to `general` first
    async fn delete_category(&self, id: &str) -> Result<(), CategoryError>;
}

/// Implementation of CategoryService
pub struct CategoryServiceImpl {
    category_repository: Arc<dyn CategoryRepository>,
}

impl CategoryServiceImpl {
    pub fn new(category_repository: Arc<dyn CategoryRepository>) -> Self {
        Self {
            category_repository,
        }
    }

    async fn ensure_mutable(&self, id: &str) -> Result<(), CategoryError> {
        if id == GENERAL_CATEGORY_ID {
            return Err(CategoryError::GeneralIsProtected);
        }

        if self.category_repository.find_by_id(id).await?.is_none() {
            return Err(CategoryError::CategoryNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryService for CategoryServiceImpl {
    async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<Category, CategoryError> {
        let name = request.name.trim();
        let id = category_slug(name);
        if id.is_empty() {
            return Err(CategoryError::NameRequired);
        }

        let color = request
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY_COLOR);

        let category = Category {
            id,
            name: name.to_string(),
            color: color.to_string(),
        };

        self.category_repository
            .create(category)
            .await
            .map_err(|e| match e {
                RepositoryError::ConstraintViolation(_) => CategoryError::DuplicateName,
                other => other.into(),
            })
    }

    async fn rename_category(
        &self,
        id: &str,
        request: RenameCategoryRequest,
    ) -> Result<(), CategoryError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CategoryError::NameRequired);
        }

        self.ensure_mutable(id).await?;
        self.category_repository.rename(id, name).await?;
        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<(), CategoryError> {
        self.ensure_mutable(id).await?;
        self.category_repository
            .delete_reassigning(id, GENERAL_CATEGORY_ID)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    // Mock CategoryRepository for testing
    struct MockCategoryRepository {
        categories: Mutex<BTreeMap<String, Category>>,
        deletes: Mutex<Vec<(String, String)>>,
    }

    impl MockCategoryRepository {
        fn new() -> Self {
            let mut categories = BTreeMap::new();
            for (id, name) in [("general", "General"), ("servicios", "Servicios")] {
                categories.insert(
                    id.to_string(),
                    Category {
                        id: id.to_string(),
                        name: name.to_string(),
                        color: DEFAULT_CATEGORY_COLOR.to_string(),
                    },
                );
            }

            Self {
                categories: Mutex::new(categories),
                deletes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CategoryRepository for MockCategoryRepository {
        async fn find_by_id(&self, id: &str) -> Result<Option<Category>, RepositoryError> {
            Ok(self.categories.lock().unwrap().get(id).cloned())
        }

        async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
            let mut categories = self.categories.lock().unwrap();
            if categories.contains_key(&category.id) {
                return Err(RepositoryError::ConstraintViolation(
                    "duplicate".to_string(),
                ));
            }
            categories.insert(category.id.clone(), category.clone());
            Ok(category)
        }

        async fn rename(&self, id: &str, name: &str) -> Result<(), RepositoryError> {
            let mut categories = self.categories.lock().unwrap();
            let category = categories
                .get_mut(id)
                .ok_or(RepositoryError::NotFound("category"))?;
            category.name = name.to_string();
            Ok(())
        }

        async fn delete_reassigning(
            &self,
            id: &str,
            fallback_id: &str,
        ) -> Result<u64, RepositoryError> {
            self.categories
                .lock()
                .unwrap()
                .remove(id)
                .ok_or(RepositoryError::NotFound("category"))?;
            self.deletes
                .lock()
                .unwrap()
                .push((id.to_string(), fallback_id.to_string()));
            Ok(0)
        }
    }

    fn create_request(name: &str, color: Option<&str>) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.to_string(),
            color: color.map(str::to_string),
        }
    }

    fn rename_request(name: &str) -> RenameCategoryRequest {
        RenameCategoryRequest {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug_id() {
        let service = CategoryServiceImpl::new(Arc::new(MockCategoryRepository::new()));

        let category = service
            .create_category(create_request("  Gastos de  Casa ", Some("#111111")))
            .await
            .unwrap();

        assert_eq!(category.id, "gastos-de-casa");
        assert_eq!(category.name, "Gastos de  Casa");
        assert_eq!(category.color, "#111111");
    }

    #[tokio::test]
    async fn test_create_without_color_uses_default() {
        let service = CategoryServiceImpl::new(Arc::new(MockCategoryRepository::new()));

        let category = service
            .create_category(create_request("Agua", Some("  ")))
            .await
            .unwrap();

        assert_eq!(category.color, DEFAULT_CATEGORY_COLOR);
    }

    #[tokio::test]
    async fn test_create_blank_or_duplicate_is_rejected() {
        let service = CategoryServiceImpl::new(Arc::new(MockCategoryRepository::new()));

        let blank = service.create_category(create_request("   ", None)).await;
        assert!(matches!(blank, Err(CategoryError::NameRequired)));

        // Same slug as the seeded "Servicios"
        let duplicate = service.create_category(create_request("SERVICIOS", None)).await;
        assert!(matches!(duplicate, Err(CategoryError::DuplicateName)));
    }

    #[tokio::test]
    async fn test_general_cannot_be_renamed_or_deleted() {
        let repo = Arc::new(MockCategoryRepository::new());
        let service = CategoryServiceImpl::new(repo.clone());

        let rename = service
            .rename_category("general", rename_request("Otros"))
            .await;
        assert!(matches!(rename, Err(CategoryError::GeneralIsProtected)));

        let delete = service.delete_category("general").await;
        assert!(matches!(delete, Err(CategoryError::GeneralIsProtected)));

        assert!(repo.categories.lock().unwrap().contains_key("general"));
        assert_eq!(repo.categories.lock().unwrap()["general"].name, "General");
    }

    #[tokio::test]
    async fn test_missing_category_is_not_found() {
        let service = CategoryServiceImpl::new(Arc::new(MockCategoryRepository::new()));

        let rename = service.rename_category("ghost", rename_request("X")).await;
        assert!(matches!(rename, Err(CategoryError::CategoryNotFound)));

        let delete = service.delete_category("ghost").await;
        assert!(matches!(delete, Err(CategoryError::CategoryNotFound)));
    }

    #[tokio::test]
    async fn test_rename_trims_name() {
        let repo = Arc::new(MockCategoryRepository::new());
        let service = CategoryServiceImpl::new(repo.clone());

        service
            .rename_category("servicios", rename_request("  Suministros "))
            .await
            .unwrap();

        assert_eq!(repo.categories.lock().unwrap()["servicios"].name, "Suministros");
    }

    #[tokio::test]
    async fn test_delete_reassigns_to_general() {
        let repo = Arc::new(MockCategoryRepository::new());
        let service = CategoryServiceImpl::new(repo.clone());

        service.delete_category("servicios").await.unwrap();

        assert_eq!(
            *repo.deletes.lock().unwrap(),
            vec![("servicios".to_string(), "general".to_string())]
        );
    }
}
