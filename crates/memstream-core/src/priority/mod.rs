//! Who a photo should be shared with, best candidate first.

mod contacts;
mod ranking;

pub use contacts::{ContactBook, PhotoContact, MAX_CHAT_ACTIVITIES};
pub use ranking::{
    parents_placeholder, public_placeholder, rank_recipients, Recipient, RecipientPriority,
    PARENTS_ID, PUBLIC_ID,
};
