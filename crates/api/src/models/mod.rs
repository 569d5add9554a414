//! Domain models for the food ordering API.
//!
//! Each entity has a read model (serialized as the JSON response, with
//! display names of related rows joined in) and input types for create and
//! update. Update inputs make every field optional; `None` keeps the stored
//! value.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod notification;
pub mod order;
pub mod product;
pub mod promotion;
pub mod review;
pub mod user;

/// Width of every `name` column.
pub const NAME_MAX: usize = 100;
/// Width of the free-text address columns.
pub const ADDRESS_MAX: usize = 255;

pub use address::{Address, AddressUpdate, NewAddress};
pub use cart::{CartItem, CartItemKey, NewCartItem};
pub use catalog::{
    Category, CategoryUpdate, NewCategory, NewPaymentMethod, NewSupplier, PaymentMethod,
    PaymentMethodUpdate, ProductSummary, Supplier, SupplierUpdate,
};
pub use notification::{NewNotification, Notification, NotificationUpdate};
pub use order::{
    NewOrder, NewOrderHistoryEntry, NewOrderItem, Order, OrderHistoryEntry, OrderHistoryUpdate,
    OrderItem, OrderItemUpdate, OrderUpdate,
};
pub use product::{NewProduct, Product, ProductChanges};
pub use promotion::{
    NewPromotion, NewPromotionProduct, NewPromotionType, Promotion, PromotionProduct,
    PromotionProductUpdate, PromotionSummary, PromotionType, PromotionTypeUpdate, PromotionUpdate,
};
pub use review::{NewReview, Review, ReviewUpdate};
pub use user::{NewUser, User, UserChanges};
