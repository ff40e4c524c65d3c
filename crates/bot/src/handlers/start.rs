//! Welcome screen and main menu.

use checkout::PaymentGateway;
use domain::User;
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
    pub(crate) async fn show_main_menu(&self, user: &User, incoming: &Incoming) -> Result<()> {
        let screen = render::main_menu(&user.display_name());
        self.present(incoming.target, &screen).await
    }
}
