//! Asset keys.
//!
//! A [`ResourceKey`] is the bare location of an external resource
//! (`folder/name.extension`). An [`AssetKey`] adds the kind of asset and any
//! kind-specific loader metadata. Rehoming always goes through
//! [`AssetKey::rehome`] / [`AssetKey::with_location`], which build a fresh key
//! at the new location and carry the metadata over explicitly.

mod asset_key;
mod resource_key;

pub use asset_key::{AssetKey, KeyKind, TextureOptions};
pub use resource_key::{ResourceKey, normalize_asset_path};
