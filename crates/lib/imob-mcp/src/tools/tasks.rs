use chrono::{SecondsFormat, Utc};
use imob_core::fields;
use imob_core::present::task_summary;
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

const TASKS_PATH: &str = "/api/internal/tasks";
const DEFAULT_TASK_TITLE: &str = "Tarefa";
const MAX_TITLE_CHARS: usize = 255;

/// Parameters for listing tasks.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListTasksParams {
    #[serde(default = "helpers::default_tenant_id")]
    pub tenant_id: i64,
    /// Maximum number of tasks (clamped to 1..=30).
    #[serde(default = "helpers::default_list_limit")]
    pub limit: i64,
}

/// Parameters for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CreateTaskParams {
    #[serde(default = "helpers::default_tenant_id")]
    pub tenant_id: i64,
    /// Task title; truncated to 255 characters.
    #[serde(default = "default_task_title")]
    pub title: String,
    /// Task type, e.g. `visita`, `ligação` or `lembrete`.
    #[serde(default, rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub contact_id: Option<i64>,
    #[serde(default)]
    pub property_id: Option<i64>,
    /// Due date as ISO-8601.
    #[serde(default)]
    pub due_at: String,
    #[serde(default)]
    pub notes: String,
}

/// Parameters for completing a task.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CompleteTaskParams {
    pub task_id: i64,
    #[serde(default = "helpers::default_tenant_id")]
    pub tenant_id: i64,
}

fn default_task_title() -> String {
    DEFAULT_TASK_TITLE.to_string()
}

fn task_title(raw: &str) -> String {
    helpers::non_empty(raw)
        .unwrap_or(DEFAULT_TASK_TITLE)
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect()
}

#[tool_router(router = tool_router_tasks, vis = "pub")]
impl ImobMcp {
    #[tool(description = "List the tenant's tasks (title, type, due date, done or pending).")]
    async fn list_tasks(&self, Parameters(params): Parameters<ListTasksParams>) -> String {
        if !self.backend().is_configured() {
            return NOT_CONFIGURED.to_string();
        }

        let mut query = helpers::tenant_params(params.tenant_id);
        query.insert(
            "limit".to_string(),
            json!(helpers::list_limit(params.limit)),
        );

        let response = self.backend().get(TASKS_PATH, &query).await;
        if !response.is_success() {
            return format!("Erro ao listar tarefas (status {}).", response.status);
        }
        let Some(items) = response.as_list() else {
            return "Nenhuma tarefa encontrada.".to_string();
        };
        let tasks = helpers::records(items);
        if tasks.is_empty() {
            return "Nenhuma tarefa cadastrada.".to_string();
        }

        let lines: Vec<String> = tasks.into_iter().map(task_summary).collect();
        helpers::counted_list("Tarefas", &lines)
    }

    #[tool(description = "Create a CRM task (reminder, visit, call), optionally linked to a contact or property.")]
    async fn create_task(&self, Parameters(params): Parameters<CreateTaskParams>) -> String {
        if !self.backend().is_configured() {
            return NOT_CONFIGURED.to_string();
        }

        let title = task_title(&params.title);
        let mut body = helpers::tenant_params(params.tenant_id);
        body.insert("title".to_string(), json!(title));
        if let Some(task_type) = helpers::non_empty(&params.task_type) {
            body.insert("type".to_string(), json!(task_type));
        }
        if let Some(contact_id) = params.contact_id.filter(|id| *id > 0) {
            body.insert("contact_id".to_string(), json!(contact_id));
        }
        if let Some(property_id) = params.property_id.filter(|id| *id > 0) {
            body.insert("property_id".to_string(), json!(property_id));
        }
        if let Some(due_at) = helpers::non_empty(&params.due_at) {
            body.insert("due_at".to_string(), json!(due_at));
        }
        if let Some(notes) = helpers::non_empty(&params.notes) {
            body.insert("notes".to_string(), json!(notes));
        }

        let response = self.backend().post(TASKS_PATH, &body).await;
        if !matches!(response.status, 200 | 201) {
            return format!("Erro ao criar tarefa (status {}).", response.status);
        }
        match response.as_record() {
            Some(task) if fields::is_set(task, &["id"]) => {
                let id = fields::text(task, &["id"]).unwrap_or_default();
                let title = fields::text(task, &["title"]).unwrap_or(title);
                format!("Tarefa criada: \"{title}\" (id={id}).")
            }
            _ => "Tarefa criada.".to_string(),
        }
    }

    #[tool(description = "Mark a task as completed by id.")]
    async fn complete_task(&self, Parameters(params): Parameters<CompleteTaskParams>) -> String {
        if !self.backend().is_configured() {
            return NOT_CONFIGURED.to_string();
        }

        let mut body = helpers::tenant_params(params.tenant_id);
        body.insert(
            "completed_at".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );

        let path = format!("{TASKS_PATH}/{}", params.task_id);
        let response = self.backend().patch(&path, &body).await;
        if response.is_not_found() {
            return format!("Tarefa {} não encontrada.", params.task_id);
        }
        if !response.is_success() {
            return format!("Erro ao concluir tarefa (status {}).", response.status);
        }
        match response.as_record().and_then(|task| fields::text(task, &["title"])) {
            Some(title) => format!("Tarefa concluída: \"{title}\"."),
            None => "Tarefa concluída.".to_string(),
        }
    }
}
