//! MCP server implementation for imob-mcp.
//!
//! This crate wires the backend client into rmcp tool handlers, builds the
//! protocol runtime lazily and exposes the HTTP front door that answers health
//! probes without waiting on that runtime.

mod helpers;
mod tools;
pub mod runtime;
pub mod server;

use std::sync::Arc;

use imob_core::backend::BackendClient;
use rmcp::{
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool_handler,
};
use rmcp::model::{ServerCapabilities, ServerInfo};

pub use tools::contacts::{GetContactParams, ListContactsParams};
pub use tools::properties::{GetPropertyParams, SearchPropertiesParams};
pub use tools::tasks::{CompleteTaskParams, CreateTaskParams, ListTasksParams};

const SERVER_INSTRUCTIONS: &str = r"imob-mcp exposes the real-estate CRM of a tenant (properties, contacts and tasks).

Every tool accepts an optional `tenant_id` (default 1) and answers with plain text in Brazilian Portuguese.

Properties:
- `search_properties` filters by `neighborhood`, `property_type` and `max_value` (sale or rent).
- `get_property` returns the full description, address, prices and room facts.

Contacts:
- `list_contacts` lists leads with phone and email; `get_contact` adds source and notes.

Tasks:
- `list_tasks` shows pending (○) and completed (✓) tasks with type and due date.
- `create_task` needs a `title`; `type`, `contact_id`, `property_id`, `due_at` (ISO-8601) and `notes` are optional.
- `complete_task` marks a task as done by id.";

/// MCP server wrapper around the backend client and tool routers.
#[derive(Clone)]
pub struct ImobMcp {
    tool_router: ToolRouter<Self>,
    backend: Arc<BackendClient>,
}

impl ImobMcp {
    /// Creates a new server owning the backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    /// Creates a new server using a shared backend client.
    #[must_use]
    pub fn with_backend(backend: Arc<BackendClient>) -> Self {
        let tool_router = Self::tool_router_properties()
            + Self::tool_router_contacts()
            + Self::tool_router_tasks();
        Self {
            tool_router,
            backend,
        }
    }

    pub(crate) fn backend(&self) -> &BackendClient {
        &self.backend
    }
}

#[tool_handler]
impl ServerHandler for ImobMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
