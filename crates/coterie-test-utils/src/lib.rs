pub mod assertions;
pub mod notifier;
pub mod server;
pub mod stores;

pub use assertions::{assert_api_error, assert_api_ok};
pub use notifier::{RecordingNotifier, SentEmail};
pub use server::{
    TEST_ACCESS_SECRET, TEST_PASSWORD, TEST_REFRESH_SECRET, create_active_member,
    create_test_app_state, create_test_config, create_test_router_and_stores, login_via_api,
    send_request,
};
pub use stores::{TestStores, create_test_stores};
