/// Constants describing the catalog web endpoints.
pub mod pages {
    /// URL of the location directory page.
    pub const LOCATION_PAGE_URL: &str = "https://my.freshpoint.cz";
    /// Base URL of per-location product pages; the location id is appended.
    pub const PRODUCT_PAGE_URL_BASE: &str = "https://my.freshpoint.cz/device/product-list";
}

/// Constants used by admission defaults.
pub mod admission {
    /// Placeholder picture applied when a product carries no photo of its own.
    pub const DEFAULT_PRODUCT_PIC_URL: &str = "https://images.weserv.nl/?url=http://freshpoint.freshserver.cz/backend/web/media/photo/1_f587dd3fa21b22.jpg";
}

/// Constants describing the product-page markup conventions.
pub mod markup {
    /// CSS selector matching one product record element.
    pub const PRODUCT_SELECTOR: &str = "div.product";
    /// Class marking a product whose stock is empty.
    pub const SOLD_OUT_CLASS: &str = "sold-out";
    /// Attribute holding the product id.
    pub const ATTR_ID: &str = "data-id";
    /// Attribute holding the product name.
    pub const ATTR_NAME: &str = "data-name";
    /// Attribute flagging a vegetarian product (`"1"` when set).
    pub const ATTR_VEGETARIAN: &str = "data-veggie";
    /// Attribute flagging a gluten-free product (`"1"` when set).
    pub const ATTR_GLUTEN_FREE: &str = "data-glutenfree";
    /// Attribute flagging a promoted product (`"1"` when set).
    pub const ATTR_PROMO: &str = "data-ispromo";
    /// Attribute holding the free-form product details block.
    pub const ATTR_INFO: &str = "data-info";
    /// Attribute holding the product picture URL.
    pub const ATTR_PIC_URL: &str = "data-photourl";

    /// Pattern matching a normalized quantity span (`posledni kus`, `2 kusy`).
    pub const QUANTITY_PATTERN: &str = r"^((posledni)|(\d+))\s(kus|kusy|kusu)!?$";
    /// Marker inside a quantity span meaning exactly one piece remains.
    pub const LAST_PIECE_MARKER: &str = "posledn";
    /// Pattern matching a normalized price span (`59.90`).
    pub const PRICE_PATTERN: &str = r"^\d+\.\d+$";
    /// Pattern capturing the page id from the embedded script variable.
    pub const DEVICE_ID_PATTERN: &str = r#"deviceId\s*=\s*"(.*?)""#;
    /// Pattern capturing the double-encoded location directory payload.
    pub const DEVICES_PATTERN: &str = r#"devices\s*=\s*("\[.*\]");"#;
}

/// Constants used by the domain comparators.
pub mod compare {
    /// Scale factor keeping derived discount rates at two decimal places.
    pub const DISCOUNT_RATE_SCALE: f64 = 100.0;
}
