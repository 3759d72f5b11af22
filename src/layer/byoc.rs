//! Bring Your Own Collection layers.
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::dataset::{DATASET_BYOC, Dataset};
use crate::core::processing::ProcessingDatasource;
use crate::error::{Error, Result};
use crate::layer::sh::{DatasetKind, LayerContext, SearchParameters, ShLayer, insert_opt};

pub type ByocLayer = ShLayer<Byoc>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Byoc {
    /// Taken from the layer's service settings when unset.
    pub collection_id: Option<String>,
}

impl Byoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection_id(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub async fn collection_id(&self, ctx: &LayerContext<'_>) -> Result<String> {
        if let Some(id) = &self.collection_id {
            return Ok(id.clone());
        }
        ctx.layer_params()
            .await?
            .defaults
            .collection_id
            .clone()
            .ok_or_else(|| Error::missing("BYOC collection id"))
    }

    async fn dataset_parameters(&self, ctx: &LayerContext<'_>) -> Result<Map<String, Value>> {
        let mut params = Map::new();
        insert_opt(&mut params, "type", self.dataset().dataset_parameters_type);
        params.insert(
            "collectionId".to_string(),
            Value::String(self.collection_id(ctx).await?),
        );
        Ok(params)
    }
}

#[async_trait]
impl DatasetKind for Byoc {
    fn dataset(&self) -> &'static Dataset {
        &DATASET_BYOC
    }

    async fn update_datasource(
        &self,
        ctx: &LayerContext<'_>,
        datasource: &mut ProcessingDatasource,
    ) -> Result<()> {
        datasource.data_filter.collection_id = Some(self.collection_id(ctx).await?);
        Ok(())
    }

    async fn search_parameters(&self, ctx: &LayerContext<'_>) -> Result<SearchParameters> {
        Ok(SearchParameters {
            max_cloud_coverage: None,
            dataset_parameters: Some(Value::Object(self.dataset_parameters(ctx).await?)),
        })
    }

    async fn find_dates_parameters(&self, ctx: &LayerContext<'_>) -> Result<Map<String, Value>> {
        let mut params = Map::new();
        params.insert(
            "datasetParameters".to_string(),
            Value::Object(self.dataset_parameters(ctx).await?),
        );
        Ok(params)
    }
}
