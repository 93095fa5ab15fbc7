//! Product use cases.
//!
//! Each use case takes an open unit of work plus plain inputs and never
//! sees storage types. Mutating use cases commit on success; the caller
//! owns the scope and rolls back when an error escapes.

mod create_product;
mod delete_product;
mod get_product;
mod list_products;
mod update_product;

pub use create_product::{create_product, CreateProductInput};
pub use delete_product::{delete_product, DeleteProductInput};
pub use get_product::get_product;
pub use list_products::{list_products, ListProductsFilters};
pub use update_product::{update_product, UpdateProductInput};

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;

    use crate::errors::AppResult;
    use crate::infra::{
        MockProductRepository, MockUserRepository, ProductRepository, UnitOfWork, UserRepository,
    };

    /// Unit of work over mocks that counts scope endings.
    pub struct TestUnitOfWork {
        pub products: MockProductRepository,
        pub users: MockUserRepository,
        pub commits: usize,
        pub rollbacks: usize,
    }

    impl TestUnitOfWork {
        pub fn new(products: MockProductRepository) -> Self {
            Self {
                products,
                users: MockUserRepository::new(),
                commits: 0,
                rollbacks: 0,
            }
        }
    }

    #[async_trait]
    impl UnitOfWork for TestUnitOfWork {
        fn products(&self) -> &dyn ProductRepository {
            &self.products
        }

        fn users(&self) -> &dyn UserRepository {
            &self.users
        }

        async fn commit(&mut self) -> AppResult<()> {
            self.commits += 1;
            Ok(())
        }

        async fn rollback(&mut self) -> AppResult<()> {
            self.rollbacks += 1;
            Ok(())
        }
    }
}
