//! Inbound event model: commands, actions, and free text, each carrying an
//! explicit render target.

use std::fmt;
use std::str::FromStr;

use common::{CategoryId, OrderId, ProductId, SubCategoryId, UserId};
use domain::UserProfile;
use thiserror::Error;

use crate::transport::{ChatRef, MessageRef};

/// Slash commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Catalog,
    Cart,
}

impl Command {
    /// Parses a slash command, ignoring any trailing bot mention.
    pub fn parse(text: &str) -> Option<Self> {
        let name = text.split_whitespace().next()?;
        let name = name.split('@').next()?;
        match name {
            "/start" => Some(Command::Start),
            "/catalog" => Some(Command::Catalog),
            "/cart" => Some(Command::Cart),
            _ => None,
        }
    }
}

/// A button-press action, decoded from its callback payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `main_menu`
    MainMenu,
    /// `noop` — the page-indicator button; acknowledged, never handled.
    Noop,
    /// `cat_page_{page}` — category list pagination.
    CategoryPage { page: u64 },
    /// `category_{id}_{page}` — open a category's subcategory list.
    Category { id: CategoryId, page: u64 },
    /// `subcat_page_{category}_{page}` — subcategory list pagination.
    SubcategoryPage { category: CategoryId, page: u64 },
    /// `subcategory_{id}_{page}` — open a subcategory's product list.
    Subcategory { id: SubCategoryId, page: u64 },
    /// `prod_page_{subcategory}_{page}` — product list pagination.
    ProductPage { subcategory: SubCategoryId, page: u64 },
    /// `product_{id}` — open a product detail screen.
    Product { id: ProductId },
    /// `inc:{id}` — bump the quantity selector.
    Increment { product: ProductId },
    /// `dec:{id}` — lower the quantity selector (floor 1).
    Decrement { product: ProductId },
    /// `add:{id}:{quantity}` — commit the selection to the cart.
    AddToCart { product: ProductId, quantity: u32 },
    /// `remove_item_{id}` — delete a cart line.
    RemoveItem { product: ProductId },
    /// `cart` — show the cart screen.
    ShowCart,
    /// `checkout` — start address collection.
    Checkout,
    /// `check_payment_{id}` — poll the provider for an order.
    CheckPayment { order: OrderId },
    /// `test_payment_{id}` — manual settlement, gated by configuration.
    TestPayment { order: OrderId },
    /// `payment_not_available` — pay control on an order without an intent.
    PaymentNotAvailable,
}

/// A callback payload that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed action payload {payload:?}")]
pub struct ActionParseError {
    pub payload: String,
}

impl ActionParseError {
    fn new(payload: &str) -> Self {
        Self {
            payload: payload.to_string(),
        }
    }
}

fn parse_id_page(rest: &str) -> Option<(i64, u64)> {
    let (id, page) = rest.rsplit_once('_')?;
    Some((id.parse().ok()?, page.parse().ok()?))
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let malformed = || ActionParseError::new(payload);

        match payload {
            "main_menu" => return Ok(Action::MainMenu),
            "noop" => return Ok(Action::Noop),
            "cart" => return Ok(Action::ShowCart),
            "checkout" => return Ok(Action::Checkout),
            "payment_not_available" => return Ok(Action::PaymentNotAvailable),
            _ => {}
        }

        // Longer prefixes first: `cat_page_` shadows `category_`,
        // `subcat_page_` shadows `subcategory_`, `prod_page_` shadows
        // `product_`.
        if let Some(rest) = payload.strip_prefix("cat_page_") {
            let page = rest.parse().map_err(|_| malformed())?;
            return Ok(Action::CategoryPage { page });
        }
        if let Some(rest) = payload.strip_prefix("subcat_page_") {
            let (id, page) = parse_id_page(rest).ok_or_else(malformed)?;
            return Ok(Action::SubcategoryPage {
                category: CategoryId::new(id),
                page,
            });
        }
        if let Some(rest) = payload.strip_prefix("prod_page_") {
            let (id, page) = parse_id_page(rest).ok_or_else(malformed)?;
            return Ok(Action::ProductPage {
                subcategory: SubCategoryId::new(id),
                page,
            });
        }
        if let Some(rest) = payload.strip_prefix("category_") {
            let (id, page) = parse_id_page(rest).ok_or_else(malformed)?;
            return Ok(Action::Category {
                id: CategoryId::new(id),
                page,
            });
        }
        if let Some(rest) = payload.strip_prefix("subcategory_") {
            let (id, page) = parse_id_page(rest).ok_or_else(malformed)?;
            return Ok(Action::Subcategory {
                id: SubCategoryId::new(id),
                page,
            });
        }
        if let Some(rest) = payload.strip_prefix("product_") {
            let id = rest.parse().map_err(|_| malformed())?;
            return Ok(Action::Product {
                id: ProductId::new(id),
            });
        }
        if let Some(rest) = payload.strip_prefix("inc:") {
            let id = rest.parse().map_err(|_| malformed())?;
            return Ok(Action::Increment {
                product: ProductId::new(id),
            });
        }
        if let Some(rest) = payload.strip_prefix("dec:") {
            let id = rest.parse().map_err(|_| malformed())?;
            return Ok(Action::Decrement {
                product: ProductId::new(id),
            });
        }
        if let Some(rest) = payload.strip_prefix("add:") {
            let (id, quantity) = rest.split_once(':').ok_or_else(malformed)?;
            return Ok(Action::AddToCart {
                product: ProductId::new(id.parse().map_err(|_| malformed())?),
                quantity: quantity.parse().map_err(|_| malformed())?,
            });
        }
        if let Some(rest) = payload.strip_prefix("remove_item_") {
            let id = rest.parse().map_err(|_| malformed())?;
            return Ok(Action::RemoveItem {
                product: ProductId::new(id),
            });
        }
        if let Some(rest) = payload.strip_prefix("check_payment_") {
            let id = rest.parse().map_err(|_| malformed())?;
            return Ok(Action::CheckPayment {
                order: OrderId::new(id),
            });
        }
        if let Some(rest) = payload.strip_prefix("test_payment_") {
            let id = rest.parse().map_err(|_| malformed())?;
            return Ok(Action::TestPayment {
                order: OrderId::new(id),
            });
        }

        Err(malformed())
    }
}

impl fmt::Display for Action {
    /// Encodes the action back into its callback payload; the inverse of
    /// [`FromStr`]. Button builders rely on this.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MainMenu => write!(f, "main_menu"),
            Action::Noop => write!(f, "noop"),
            Action::CategoryPage { page } => write!(f, "cat_page_{page}"),
            Action::Category { id, page } => write!(f, "category_{id}_{page}"),
            Action::SubcategoryPage { category, page } => {
                write!(f, "subcat_page_{category}_{page}")
            }
            Action::Subcategory { id, page } => write!(f, "subcategory_{id}_{page}"),
            Action::ProductPage { subcategory, page } => {
                write!(f, "prod_page_{subcategory}_{page}")
            }
            Action::Product { id } => write!(f, "product_{id}"),
            Action::Increment { product } => write!(f, "inc:{product}"),
            Action::Decrement { product } => write!(f, "dec:{product}"),
            Action::AddToCart { product, quantity } => write!(f, "add:{product}:{quantity}"),
            Action::RemoveItem { product } => write!(f, "remove_item_{product}"),
            Action::ShowCart => write!(f, "cart"),
            Action::Checkout => write!(f, "checkout"),
            Action::CheckPayment { order } => write!(f, "check_payment_{order}"),
            Action::TestPayment { order } => write!(f, "test_payment_{order}"),
            Action::PaymentNotAvailable => write!(f, "payment_not_available"),
        }
    }
}

/// The tagged inbound event union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command(Command),
    Action(Action),
    /// Only meaningful while the user's checkout session awaits an address.
    FreeText(String),
}

/// Where the response screen goes: a fresh message or an edit of the one
/// that carried the pressed button. Carried explicitly with every event,
/// never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    New(ChatRef),
    EditText(MessageRef),
    EditCaption(MessageRef),
}

impl RenderTarget {
    /// The conversation this event belongs to.
    pub fn chat(&self) -> ChatRef {
        match self {
            RenderTarget::New(chat) => *chat,
            RenderTarget::EditText(message) | RenderTarget::EditCaption(message) => message.chat,
        }
    }
}

/// One fully-classified inbound event.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub user: UserId,
    pub profile: UserProfile,
    pub target: RenderTarget,
    pub event: Inbound,
}
