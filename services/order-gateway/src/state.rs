use crate::accounts::AccountStore;
use crate::hub::Hub;
use atlas_bus::Producer;
use atlas_store::AwsConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountStore,
    /// Producer for `orders.commands`.
    pub commands: Arc<Producer>,
    pub hub: Hub,
    pub cfg: Arc<AwsConfig>,
}
