use crate::errors::Result;

use super::assets_model::Asset;

/// Read access to asset metadata. Implementations return plain value
/// objects; the engine never walks a live ORM graph.
pub trait AssetRepositoryTrait: Send + Sync {
    fn get_by_id(&self, asset_id: &str) -> Result<Asset>;
    fn list(&self) -> Result<Vec<Asset>>;
}
