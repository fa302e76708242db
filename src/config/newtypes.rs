//! Validated newtype wrappers for configuration values.

use url::Url;

use crate::error::ConfigError;

/// A validated Shopify shop domain.
///
/// Validates and normalizes shop domains to the full `shop.myshopify.com`
/// format. Every API base URL is derived from this value, so the whole crate
/// can rely on it being well-formed.
///
/// # Accepted Formats
///
/// - `shop-name` - normalized to `shop-name.myshopify.com`
/// - `shop-name.myshopify.com` - used as-is
///
/// # Example
///
/// ```rust
/// use shopify_admin::ShopDomain;
///
/// let domain = ShopDomain::new("my-store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is invalid.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into();
        let domain = domain.trim().to_lowercase();

        if domain.is_empty() {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        let (shop_name, full_domain) = if let Some(shop_name) = domain.strip_suffix(Self::SUFFIX) {
            (shop_name.to_string(), domain)
        } else if domain.contains('.') {
            // A dot without the myshopify.com suffix is some other domain
            return Err(ConfigError::InvalidShopDomain { domain });
        } else {
            (domain.clone(), format!("{}{}", domain, Self::SUFFIX))
        };

        if !Self::is_valid_shop_name(&shop_name) {
            return Err(ConfigError::InvalidShopDomain {
                domain: full_domain,
            });
        }

        Ok(Self {
            shop_name_end: shop_name.len(),
            full_domain,
        })
    }

    /// Returns the shop name portion of the domain.
    ///
    /// For `my-store.myshopify.com`, this returns `my-store`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    /// Returns the HTTPS base URL for this shop.
    ///
    /// # Panics
    ///
    /// Does not panic in practice: the domain was validated on construction
    /// and always forms a parseable URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("https://{}/", self.full_domain))
            .expect("validated shop domain always forms a valid URL")
    }

    fn is_valid_shop_name(name: &str) -> bool {
        if name.is_empty() || name.starts_with('-') || name.ends_with('-') {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl std::fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_domain)
    }
}
