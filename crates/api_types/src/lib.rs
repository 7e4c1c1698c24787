//! Wire types exchanged with the marketplace HTTP server.
//!
//! The storefront only reads these; it never builds an item or a category
//! itself.

use serde::{Deserialize, Serialize};

pub mod category {
    use super::*;

    /// A selectable item category, in server order.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Category {
        pub id: i64,
        pub name: String,
    }
}

pub mod item {
    use super::*;

    /// Lifecycle of a listed item.
    ///
    /// The server sends the status as an integer:
    /// - `1`: created but not yet listed.
    /// - `2`: on sale.
    /// - `3`: sold out.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(try_from = "u8", into = "u8")]
    pub enum ItemStatus {
        Initial,
        OnSale,
        SoldOut,
    }

    impl ItemStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Initial => "initial",
                Self::OnSale => "on sale",
                Self::SoldOut => "sold out",
            }
        }
    }

    impl TryFrom<u8> for ItemStatus {
        type Error = String;

        fn try_from(value: u8) -> Result<Self, Self::Error> {
            match value {
                1 => Ok(Self::Initial),
                2 => Ok(Self::OnSale),
                3 => Ok(Self::SoldOut),
                other => Err(format!("unknown item status {other}")),
            }
        }
    }

    impl From<ItemStatus> for u8 {
        fn from(status: ItemStatus) -> Self {
            match status {
                ItemStatus::Initial => 1,
                ItemStatus::OnSale => 2,
                ItemStatus::SoldOut => 3,
            }
        }
    }

    /// One row of a search result.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ItemSummary {
        pub id: i64,
        pub name: String,
        pub price: i64,
        pub status: ItemStatus,
        pub category_name: String,
    }
}

pub mod error {
    use super::*;

    /// Error payload returned on non-2xx responses.
    ///
    /// Handlers answer `{"message": ...}`; `error` is accepted as well.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        #[serde(alias = "error")]
        pub message: String,
    }
}
