use imob_core::present::{contact_detail, contact_summary};
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

const CONTACTS_PATH: &str = "/api/internal/contacts";

/// Parameters for listing contacts.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListContactsParams {
    #[serde(default = "helpers::default_tenant_id")]
    pub tenant_id: i64,
    /// Maximum number of contacts (clamped to 1..=30).
    #[serde(default = "helpers::default_list_limit")]
    pub limit: i64,
}

/// Parameters for fetching a contact by id.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetContactParams {
    pub contact_id: i64,
    #[serde(default = "helpers::default_tenant_id")]
    pub tenant_id: i64,
}

#[tool_router(router = tool_router_contacts, vis = "pub")]
impl ImobMcp {
    #[tool(description = "List the tenant's contacts/leads (name, phone, email).")]
    async fn list_contacts(&self, Parameters(params): Parameters<ListContactsParams>) -> String {
        if !self.backend().is_configured() {
            return NOT_CONFIGURED.to_string();
        }

        let mut query = helpers::tenant_params(params.tenant_id);
        query.insert(
            "limit".to_string(),
            json!(helpers::list_limit(params.limit)),
        );

        let response = self.backend().get(CONTACTS_PATH, &query).await;
        if !response.is_success() {
            return format!("Erro ao listar contatos (status {}).", response.status);
        }
        let Some(items) = response.as_list() else {
            return "Nenhum contato encontrado.".to_string();
        };
        let contacts = helpers::records(items);
        if contacts.is_empty() {
            return "Nenhum contato cadastrado ainda.".to_string();
        }

        let lines: Vec<String> = contacts.into_iter().map(contact_summary).collect();
        helpers::counted_list("Contatos", &lines)
    }

    #[tool(description = "Fetch a contact by id (name, phone, email, source, notes).")]
    async fn get_contact(&self, Parameters(params): Parameters<GetContactParams>) -> String {
        if !self.backend().is_configured() {
            return NOT_CONFIGURED.to_string();
        }

        let path = format!("{CONTACTS_PATH}/{}", params.contact_id);
        let response = self
            .backend()
            .get(&path, &helpers::tenant_params(params.tenant_id))
            .await;
        if response.is_not_found() {
            return format!("Contato {} não encontrado.", params.contact_id);
        }
        match response.as_record() {
            Some(contact) if response.is_success() => contact_detail(contact),
            _ => format!("Erro ao buscar contato (status {}).", response.status),
        }
    }
}
