//! Catalog navigation: category, subcategory, and product lists.

use checkout::PaymentGateway;
use common::{CategoryId, SubCategoryId};
use store::ShopStore;

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::event::Incoming;
use crate::render;
use crate::transport::Messenger;

impl<S, P, M> Dispatcher<S, P, M>
where
    S: ShopStore,
    P: PaymentGateway,
    M: Messenger,
{
    pub(crate) async fn show_categories(&self, page: u64, incoming: &Incoming) -> Result<()> {
        let page = self.store.categories(page.max(1), self.page_size).await?;
        self.present(incoming.target, &render::categories(&page))
            .await
    }

    pub(crate) async fn show_subcategories(
        &self,
        category: CategoryId,
        page: u64,
        incoming: &Incoming,
    ) -> Result<()> {
        let page = self
            .store
            .subcategories(category, page.max(1), self.page_size)
            .await?;
        self.present(incoming.target, &render::subcategories(category, &page))
            .await
    }

    pub(crate) async fn show_products(
        &self,
        subcategory: SubCategoryId,
        page: u64,
        incoming: &Incoming,
    ) -> Result<()> {
        let subcategory = self
            .store
            .subcategory(subcategory)
            .await?
            .ok_or_else(|| Self::not_found("Subcategory"))?;
        let page = self
            .store
            .products(subcategory.id, page.max(1), self.page_size)
            .await?;
        self.present(incoming.target, &render::products(&subcategory, &page))
            .await
    }
}
