//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{
    activity, agreements, auth, employees, health, infra, leads, links, projects, proposals,
    tasks, team,
};
use crate::api::types::PaginationMeta;
use crate::data::types::{LeadStatus, ProposalStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OpsDeck API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Small-business operations dashboard"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "leads", description = "Lead pipeline"),
        (name = "proposals", description = "Proposal tracking"),
        (name = "projects", description = "Projects and checklists"),
        (name = "tasks", description = "Standalone tasks"),
        (name = "infra", description = "Infrastructure assets"),
        (name = "team", description = "Team members and presence"),
        (name = "agreements", description = "Client agreements"),
        (name = "employees", description = "Employee records"),
        (name = "links", description = "Shared links"),
        (name = "activity", description = "Activity log")
    ),
    paths(
        // Health
        health::health,
        // Auth
        auth::request_otp,
        auth::login,
        auth::status,
        auth::logout,
        // Leads
        leads::list,
        leads::create,
        leads::get_one,
        leads::update,
        leads::delete,
        leads::convert,
        // Proposals
        proposals::list,
        proposals::create,
        proposals::get_one,
        proposals::update,
        proposals::delete,
        proposals::set_status,
        // Projects
        projects::list,
        projects::create,
        projects::get_one,
        projects::update,
        projects::delete,
        projects::list_checklist,
        projects::create_checklist,
        projects::update_checklist,
        projects::delete_checklist,
        projects::list_infra,
        projects::link_infra,
        projects::unlink_infra,
        // Tasks
        tasks::list,
        tasks::create,
        tasks::get_one,
        tasks::update,
        tasks::delete,
        tasks::list_subs,
        tasks::create_sub,
        tasks::update_sub,
        tasks::delete_sub,
        tasks::list_task_comments,
        tasks::post_comment,
        tasks::remove_comment,
        // Infra
        infra::list,
        infra::create,
        infra::get_one,
        infra::update,
        infra::delete,
        // Team
        team::list,
        team::create,
        team::get_one,
        team::update,
        team::delete,
        team::beat,
        team::sessions,
        // Agreements
        agreements::list,
        agreements::create,
        agreements::get_one,
        agreements::update,
        agreements::delete,
        // Employees
        employees::list,
        employees::create,
        employees::get_one,
        employees::update,
        employees::delete,
        // Links
        links::list,
        links::create,
        links::get_one,
        links::update,
        links::delete,
        // Activity
        activity::list,
        activity::create,
    ),
    components(schemas(
        // API types
        PaginationMeta,
        // Domain enums
        LeadStatus,
        ProposalStatus,
        // Health
        health::HealthResponse,
        // Auth
        auth::types::RequestOtpRequest,
        auth::types::RequestOtpResponse,
        auth::types::LoginRequest,
        auth::types::LoginResponse,
        auth::types::StatusResponse,
        // Leads
        leads::types::LeadDto,
        leads::types::CreateLeadRequest,
        leads::types::UpdateLeadRequest,
        leads::types::ConvertTo,
        leads::types::ConvertLeadRequest,
        leads::types::ListLeadsQuery,
        // Proposals
        proposals::types::ProposalDto,
        proposals::types::CreateProposalRequest,
        proposals::types::UpdateProposalRequest,
        proposals::types::SetProposalStatusRequest,
        proposals::types::ListProposalsQuery,
        // Projects
        projects::types::ProjectDto,
        projects::types::ProjectTaskDto,
        projects::types::CreateProjectRequest,
        projects::types::UpdateProjectRequest,
        projects::types::CreateProjectTaskRequest,
        projects::types::UpdateProjectTaskRequest,
        projects::types::ListProjectsQuery,
        // Tasks
        tasks::types::TaskDto,
        tasks::types::SubtaskDto,
        tasks::types::TaskCommentDto,
        tasks::types::CreateTaskRequest,
        tasks::types::UpdateTaskRequest,
        tasks::types::CreateSubtaskRequest,
        tasks::types::UpdateSubtaskRequest,
        tasks::types::CreateCommentRequest,
        tasks::types::ListTasksQuery,
        // Infra
        infra::types::InfraAssetDto,
        infra::types::CreateAssetRequest,
        infra::types::UpdateAssetRequest,
        infra::types::ListAssetsQuery,
        // Team
        team::types::TeamMemberDto,
        team::types::WorkSessionDto,
        team::types::CreateMemberRequest,
        team::types::UpdateMemberRequest,
        team::types::ListMembersQuery,
        // Agreements
        agreements::types::AgreementDto,
        agreements::types::CreateAgreementRequest,
        agreements::types::UpdateAgreementRequest,
        agreements::types::ListAgreementsQuery,
        // Employees
        employees::types::EmployeeDto,
        employees::types::CreateEmployeeRequest,
        employees::types::UpdateEmployeeRequest,
        employees::types::ListEmployeesQuery,
        // Links
        links::types::LinkDto,
        links::types::CreateLinkRequest,
        links::types::UpdateLinkRequest,
        links::types::ListLinksQuery,
        // Activity
        activity::types::ActivityDto,
        activity::types::CreateActivityRequest,
        activity::types::ListActivityQuery,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>OpsDeck API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builds_and_covers_core_paths() {
        let spec = ApiDoc::openapi();
        let paths = &spec.paths.paths;

        for expected in [
            "/api/health",
            "/api/auth/login",
            "/api/leads",
            "/api/leads/{id}/convert",
            "/api/proposals/{id}/status",
            "/api/projects/{id}/tasks/{child_id}",
            "/api/tasks/{id}/subtasks",
            "/api/team/{id}/heartbeat",
            "/api/activity",
        ] {
            assert!(paths.contains_key(expected), "missing path: {}", expected);
        }
    }
}
