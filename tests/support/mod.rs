// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup and builders for names, images, and specs.

use dockhand::lifecycle::ContainerSpec;
use dockhand::runtime::PortMapping;
use dockhand::types::{ContainerName, ImageRef};
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("dockhand=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn name(s: &str) -> ContainerName {
    ContainerName::new(s).unwrap()
}

#[allow(dead_code)]
pub fn image(s: &str) -> ImageRef {
    ImageRef::parse(s).unwrap()
}

/// `pipelines` on `example/img:main`, publishing 9099.
#[allow(dead_code)]
pub fn pipelines_spec() -> ContainerSpec {
    let mut spec = ContainerSpec::new(name("pipelines"), image("example/img:main"));
    spec.ports.push(PortMapping {
        host_port: Some(9099),
        container_port: 9099,
        protocol: Default::default(),
        host_ip: None,
    });
    spec
}
