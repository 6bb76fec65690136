//! # Config Commands

use tracing::debug;

use crate::state::ConfigState;

/// Returns the active storefront configuration.
///
/// The app reads the currency symbol and the free-shipping threshold from
/// here to render "Add S$10.00 more for free shipping".
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_serializes_camel_case() {
        let json = serde_json::to_value(get_config(&ConfigState::default())).unwrap();
        assert_eq!(json["storeName"], "TopCare Fashion");
        assert_eq!(json["currencySymbol"], "S$");
        assert_eq!(json["pricing"]["freeShippingThreshold"], 5000);
        assert_eq!(json["pricing"]["promoMode"], "snapshot");
    }
}
