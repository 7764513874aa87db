use imob_core::format::{PT_BR, format_currency};
use imob_core::present::{property_detail, property_summary};
use rmcp::{
    handler::server::wrapper::Parameters,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::ImobMcp;
use crate::helpers::{self, NOT_CONFIGURED};

const PROPERTIES_PATH: &str = "/api/internal/properties";
const SEARCH_PAGE_SIZE: u32 = 15;

/// Parameters for searching properties.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchPropertiesParams {
    #[serde(default = "helpers::default_tenant_id")]
    pub tenant_id: i64,
    /// Free-text neighborhood filter.
    #[serde(default)]
    pub neighborhood: String,
    /// Property type, e.g. `casa` or `apartamento`.
    #[serde(default)]
    pub property_type: String,
    /// Maximum sale or rent value; ignored unless positive.
    #[serde(default)]
    pub max_value: Option<f64>,
}

/// Parameters for fetching a property by id.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetPropertyParams {
    pub property_id: i64,
    #[serde(default = "helpers::default_tenant_id")]
    pub tenant_id: i64,
}

impl SearchPropertiesParams {
    fn max_value(&self) -> Option<f64> {
        self.max_value.filter(|value| *value > 0.0)
    }

    fn has_filters(&self) -> bool {
        helpers::non_empty(&self.neighborhood).is_some()
            || helpers::non_empty(&self.property_type).is_some()
            || self.max_value().is_some()
    }

    fn describe(&self) -> String {
        format!(
            "Busca: bairro={}, tipo={}, valor_max={}.",
            helpers::non_empty(&self.neighborhood).unwrap_or("qualquer"),
            helpers::non_empty(&self.property_type).unwrap_or("qualquer"),
            self.max_value()
                .map_or_else(|| "não informado".to_string(), |value| format_currency(value, &PT_BR)),
        )
    }
}

#[tool_router(router = tool_router_properties, vis = "pub")]
impl ImobMcp {
    #[tool(description = "Search the tenant's properties by neighborhood, type and maximum value.")]
    async fn search_properties(
        &self,
        Parameters(params): Parameters<SearchPropertiesParams>,
    ) -> String {
        if !self.backend().is_configured() {
            return format!("{} {NOT_CONFIGURED}", params.describe());
        }

        let mut query = helpers::tenant_params(params.tenant_id);
        query.insert("limit".to_string(), json!(SEARCH_PAGE_SIZE));
        if let Some(neighborhood) = helpers::non_empty(&params.neighborhood) {
            query.insert("neighborhood".to_string(), json!(neighborhood));
        }
        if let Some(property_type) = helpers::non_empty(&params.property_type) {
            query.insert("type".to_string(), json!(property_type));
        }
        if let Some(max_value) = params.max_value() {
            query.insert("max_value".to_string(), json!(max_value));
        }

        let response = self.backend().get(PROPERTIES_PATH, &query).await;
        if !response.is_success() {
            return format!("Erro ao buscar imóveis (status {}).", response.status);
        }
        let Some(items) = response.as_list() else {
            return "Nenhum imóvel encontrado.".to_string();
        };
        let properties = helpers::records(items);
        if properties.is_empty() {
            return if params.has_filters() {
                "Nenhum imóvel encontrado com os filtros informados.".to_string()
            } else {
                "Nenhum imóvel cadastrado.".to_string()
            };
        }

        let lines: Vec<String> = properties.into_iter().map(property_summary).collect();
        helpers::counted_list("Imóveis encontrados", &lines)
    }

    #[tool(description = "Fetch a property by id: description, address, prices, rooms and area.")]
    async fn get_property(&self, Parameters(params): Parameters<GetPropertyParams>) -> String {
        if !self.backend().is_configured() {
            return format!("Imóvel id={}: {NOT_CONFIGURED}", params.property_id);
        }

        let path = format!("{PROPERTIES_PATH}/{}", params.property_id);
        let response = self
            .backend()
            .get(&path, &helpers::tenant_params(params.tenant_id))
            .await;
        if response.is_not_found() {
            return format!("Imóvel {} não encontrado.", params.property_id);
        }
        match response.as_record() {
            Some(property) if response.is_success() => property_detail(property),
            _ => format!("Erro ao buscar imóvel (status {}).", response.status),
        }
    }
}
