#![cfg(feature = "server")]

use fhub_domain::config::ApiConfig;
use fhub_domain::registry::{FeatureSlice, InitializedSlice};
use fhub_kernel::server::ApiState;
use fhub_vfs::Vfs;

#[derive(Debug)]
struct DemoSlice {
    label: &'static str,
}

impl FeatureSlice for DemoSlice {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[tokio::test]
async fn slices_round_trip_through_the_registry() {
    let temp = tempfile::tempdir().unwrap();
    let vfs = Vfs::builder().root(temp.path()).connect().await.unwrap();

    let state = ApiState::builder()
        .config(ApiConfig::default())
        .vfs(vfs)
        .register_slice(InitializedSlice::new(DemoSlice { label: "demo" }))
        .build()
        .unwrap();

    assert_eq!(state.try_get_slice::<DemoSlice>().unwrap().label, "demo");
}

#[tokio::test]
async fn missing_slice_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let vfs = Vfs::builder().root(temp.path()).connect().await.unwrap();

    let state = ApiState::builder().config(ApiConfig::default()).vfs(vfs).build().unwrap();
    assert!(state.try_get_slice::<DemoSlice>().is_err());
}

#[test]
fn builder_requires_config_and_vfs() {
    assert!(ApiState::builder().build().is_err());
}
