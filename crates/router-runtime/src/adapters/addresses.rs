//! Advertised addresses taken from configuration.

use crate::container::config::AddressConfig;
use gr_03_router_identity::AddressSource;
use shared_types::RouterAddress;

pub struct StaticAddressSource {
    addresses: Vec<RouterAddress>,
}

impl StaticAddressSource {
    pub fn new(config: &[AddressConfig]) -> Self {
        Self {
            addresses: config
                .iter()
                .map(|a| RouterAddress::new(a.style.clone(), a.host.clone(), a.port))
                .collect(),
        }
    }
}

impl AddressSource for StaticAddressSource {
    fn addresses(&self) -> Vec<RouterAddress> {
        self.addresses.clone()
    }
}
