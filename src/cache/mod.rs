//! @acp:module "Manifest Cache"
//! @acp:summary "Unit manifests and the domain name registry"
//! @acp:domain build
//! @acp:layer model

mod types;

pub use types::{AssetEntry, Manifest, NameRegistry, NamespaceEntry, RouteEntry, TypeEntry};
