use rmcp::Json;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    GetPromptRequestParams, GetPromptResult, ListPromptsResult, PaginatedRequestParams,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router};

pub mod domains;
pub mod error;
pub mod http;
pub mod logging;
pub mod policy;
pub mod services;
pub mod types;

mod prompts;
mod test_utils;

pub use error::{ProgressionError, ProgressionResult};
pub use policy::ProgressionPolicy;
pub use services::ProgressionService;
pub use types::{
    Confidence, ExerciseNameParam, ExerciseProgression, PerformanceSnapshot, PersonalRecords,
    ProgressionReviewParams, ProgressionSuggestion, SuggestionsReport, Trend, TrendResult,
    WarmupParams, WarmupPlan, WarmupSet,
};

#[derive(Clone)]
pub struct ProgressionMcpHandler {
    service: ProgressionService,
    tool_router: rmcp::handler::server::tool::ToolRouter<ProgressionMcpHandler>,
    prompt_router: rmcp::handler::server::router::prompt::PromptRouter<ProgressionMcpHandler>,
}

#[tool_router]
#[prompt_router]
impl ProgressionMcpHandler {
    pub fn new(service: ProgressionService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn service(&self) -> &ProgressionService {
        &self.service
    }

    pub fn tool_count(&self) -> usize {
        self.tool_router.list_all().len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompt_router.list_all().len()
    }

    #[tool(
        name = "get_progression_suggestions",
        description = "Suggest next-session weights for every logged exercise, ranked by confidence"
    )]
    async fn get_progression_suggestions(&self) -> Result<Json<SuggestionsReport>, String> {
        let report = self.service.suggestions().await?;
        Ok(Json(report))
    }

    #[tool(
        name = "get_exercise_progression",
        description = "Recent history, personal records and trend for one exercise"
    )]
    async fn get_exercise_progression(
        &self,
        params: Parameters<ExerciseNameParam>,
    ) -> Result<Json<ExerciseProgression>, String> {
        let report = self
            .service
            .exercise_progression(&params.0.exercise_name)
            .await?;
        Ok(Json(report))
    }

    #[tool(
        name = "calculate_warmup_sets",
        description = "Warm-up ramp (40/60/80%) rounded to 5 for a working weight"
    )]
    async fn calculate_warmup_sets(
        &self,
        params: Parameters<WarmupParams>,
    ) -> Result<Json<WarmupPlan>, String> {
        let p = params.0;
        let plan = self
            .service
            .warmup_plan(p.working_weight, p.exercise_name)?;
        Ok(Json(plan))
    }

    /// Guided review of progression suggestions and exercise history
    #[prompt(
        name = "progression-review",
        description = "Review training progress and decide next-session weights"
    )]
    async fn progression_review(
        &self,
        params: Parameters<ProgressionReviewParams>,
    ) -> GetPromptResult {
        prompts::progression_review_prompt(params.0.exercise_name.as_deref())
    }
}

#[tool_handler]
#[prompt_handler(router = self.prompt_router)]
impl rmcp::ServerHandler for ProgressionMcpHandler {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo::new(
            rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
        )
        .with_instructions(
            "GainTrack progression server - analyzes logged strength sessions and \
             suggests progressive-overload weights, exercise history and warm-up sets.",
        )
    }
}
