pub mod notification;
pub mod product;

pub use notification::{
    NotificationKind, PushMessage, PushTarget, CLICK_ACTION, DATA_CLICK_ACTION, DATA_PRODUCT_ID,
    DATA_PRODUCT_PRICE, DATA_PRODUCT_TITLE, DATA_TYPE, TYPE_HOME, TYPE_PRODUCT_DETAIL,
};
pub use product::Product;
